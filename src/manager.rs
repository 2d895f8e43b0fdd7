//! Asset registry: publishing and public URL lookup.
//!
//! # URL resolution
//!
//! ```text
//! url("pack", ["js/app.js"])
//!   → symlink   /site/public/static/js/app.js
//!   → resolve   /site/public/static/js/app.3f2a….js
//!   → server    directory "static" ↔ https://cdn.example.com/s
//!   → url       https://cdn.example.com/s/js/app.3f2a….js
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::iter;
use std::path::{Path, PathBuf};

use url::Url;

use crate::asset::Asset;
use crate::error::{Error, IoContext, Result};
use crate::path::{absolute, rewrite_path};
use crate::pattern::Pattern;
use crate::resource::SharedAlteration;
use crate::{debug, log};

/// Maps a directory (relative to the manager output) to a public URL prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Server {
    pub directory: PathBuf,
    pub url: String,
}

impl Server {
    pub fn new(directory: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            url: url.into(),
        }
    }

    /// Join `rest` (a path below the server directory) onto the URL prefix.
    ///
    /// The path component of the result is cleaned. URL prefixes without a
    /// scheme (`/static`) are treated as plain paths.
    pub fn url_for(&self, rest: &Path) -> Result<String> {
        let rest: Vec<_> = rest
            .iter()
            .map(|segment| segment.to_string_lossy())
            .collect();
        let joined = format!("{}/{}", self.url, rest.join("/"));

        match Url::parse(&joined) {
            Ok(mut url) => {
                let path = clean_url_path(url.path());
                url.set_path(&path);
                Ok(url.to_string())
            }
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(clean_url_path(&joined)),
            Err(err) => Err(err.into()),
        }
    }
}

/// An alteration applied to every output whose path matches `pattern`.
#[derive(Clone)]
pub struct Filter {
    pub pattern: Pattern,
    pub alteration: SharedAlteration,
}

impl Filter {
    pub fn new(pattern: Pattern, alteration: SharedAlteration) -> Self {
        Self {
            pattern,
            alteration,
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("pattern", &self.pattern)
            .field("alteration", &self.alteration.name())
            .finish()
    }
}

/// Owns every named asset and the directories they are published from/to.
///
/// Relative asset paths are anchored under `input`/`output` at dump time;
/// stored assets are never modified.
#[derive(Debug, Clone, Default)]
pub struct Manager {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Tried first when resolving URLs.
    pub server: Server,
    /// Tried in order after `server`.
    pub servers: Vec<Server>,
    /// Applied to every asset after its own alterations.
    pub filters: Vec<Filter>,
    pub assets: BTreeMap<String, Asset>,
}

impl Manager {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Self::default()
        }
    }

    pub fn with_server(mut self, server: Server) -> Self {
        self.server = server;
        self
    }

    pub fn with_fallback_server(mut self, server: Server) -> Self {
        self.servers.push(server);
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_asset(mut self, name: impl Into<String>, asset: impl Into<Asset>) -> Self {
        self.assets.insert(name.into(), asset.into());
        self
    }

    /// Publish every asset, in name order. Stops at the first failure.
    ///
    /// Returns the number of artifacts written.
    pub fn dump(&self) -> Result<usize> {
        let input = absolute(&self.input).at(&self.input)?;
        let output = absolute(&self.output).at(&self.output)?;

        let mut published = 0;
        for (name, asset) in &self.assets {
            let count = asset
                .rewrite_paths(&input, &output)
                .dump(&self.filters)
                .inspect_err(|err| log!("error"; "asset `{name}`: {err}"))?;
            debug!("build"; "asset `{name}`: {count} artifact(s)");
            published += count;
        }
        Ok(published)
    }

    /// Stable symlink path of an asset.
    ///
    /// Packs take the member path (relative to the pack) as `paths[0]`;
    /// single assets ignore `paths`. Nothing is checked on disk.
    pub fn symlink(&self, name: &str, paths: &[&str]) -> Result<PathBuf> {
        let asset = self
            .assets
            .get(name)
            .ok_or_else(|| Error::AssetNotFound(name.to_string()))?;

        match asset.rewrite_paths(&self.input, &self.output) {
            Asset::Pack(pack) => {
                let member = paths.first().copied().unwrap_or_default();
                pack.symlink(Path::new(member))
            }
            Asset::Single(single) => single.output_file(""),
        }
    }

    /// Resolve `symlink` to its artifact and map it to a URL.
    pub fn url_from_symlink(&self, symlink: &Path) -> Result<String> {
        let filename = fs::canonicalize(symlink).at(symlink)?;
        self.url_from_filename(&filename)
    }

    /// Map a published file to a URL through the first matching server.
    pub fn url_from_filename(&self, filename: &Path) -> Result<String> {
        let filename = absolute(filename).at(filename)?;

        for server in iter::once(&self.server).chain(&self.servers) {
            let dir = rewrite_path(&self.output, &server.directory);
            for root in server_roots(&dir) {
                if let Ok(rest) = filename.strip_prefix(&root)
                    && let Ok(url) = server.url_for(rest)
                {
                    return Ok(url);
                }
            }
        }
        Err(Error::NoServer(filename))
    }

    /// Public URL of an asset, or an empty string when it cannot be resolved.
    ///
    /// Meant for templates, where a failed lookup must not abort rendering.
    pub fn url(&self, name: &str, paths: &[&str]) -> String {
        self.symlink(name, paths)
            .and_then(|symlink| self.url_from_symlink(&symlink))
            .unwrap_or_else(|err| {
                debug!("url"; "`{name}`: {err}");
                String::new()
            })
    }
}

/// Candidate absolute forms of a server directory: lexical, then canonical.
fn server_roots(dir: &Path) -> Vec<PathBuf> {
    let mut roots = Vec::with_capacity(2);
    if let Ok(abs) = absolute(dir) {
        roots.push(abs);
    }
    if let Ok(canonical) = fs::canonicalize(dir)
        && !roots.contains(&canonical)
    {
        roots.push(canonical);
    }
    roots
}

/// Lexically clean a `/`-separated URL path.
fn clean_url_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut out: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match out.last() {
                Some(&last) if last != ".." => {
                    out.pop();
                }
                _ if rooted => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }

    let joined = out.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
