//! Configuration section definitions.
//!
//! # Example
//!
//! ```toml
//! [server]
//! directory = "."
//! url = "https://cdn.example.com/static"
//!
//! [[filters]]
//! pattern = { extensions = ["js"] }
//! alteration = { kind = "minify-js" }
//!
//! [assets.scripts]
//! kind = "pack"
//! input = "js"
//! output = "js"
//! pattern = { regex = '\.(js|ts)$' }
//! alterations = [{ kind = "typescript", bin = "node_modules/.bin/tsc" }]
//!
//! [assets.site-css]
//! kind = "single"
//! output = "css/site.css"
//! input = { files = ["css/reset.css", "css/main.css"] }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use super::ConfigError;
use crate::alteration::{Exec, JpegOptim, MinifyCss, MinifyJs, OptiPng, Stylus, TypeScript};
use crate::alteration::{UglifyCss, UglifyJs};
use crate::asset::{Asset, AssetPack, SingleAsset};
use crate::manager::{Filter, Server};
use crate::pattern::Pattern;
use crate::resource::{Resource, SharedAlteration};

// ============================================================================
// [server] / [[servers]]
// ============================================================================

/// A server directory (relative to `output`) and its public URL prefix.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub directory: PathBuf,
    pub url: String,
}

impl ServerConfig {
    pub fn build(&self) -> Server {
        Server::new(&self.directory, &self.url)
    }
}

// ============================================================================
// [[filters]]
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub pattern: PatternConfig,
    pub alteration: AlterationConfig,
}

impl FilterConfig {
    pub fn build(&self) -> Result<Filter, ConfigError> {
        Ok(Filter::new(self.pattern.build(), self.alteration.build()?))
    }
}

// ============================================================================
// Patterns
// ============================================================================

/// `{ regex = ".." }` or `{ extensions = [..] }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PatternConfig {
    Regex { regex: String },
    Extensions { extensions: Vec<String> },
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self::Regex {
            regex: String::new(),
        }
    }
}

impl PatternConfig {
    /// Malformed regexes are kept as-is and never match.
    pub fn build(&self) -> Pattern {
        match self {
            Self::Regex { regex } => Pattern::new(regex.as_str()),
            Self::Extensions { extensions } => Pattern::extensions(extensions.iter()),
        }
    }
}

// ============================================================================
// Resources
// ============================================================================

/// Content of a single asset. Paths are relative to the manager input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ResourceConfig {
    File { file: PathBuf },
    Files { files: Vec<PathBuf> },
    Content { content: String },
}

impl ResourceConfig {
    pub fn build(&self) -> Resource {
        match self {
            Self::File { file } => Resource::file(file),
            Self::Files { files } => Resource::collection(files.iter().map(Resource::file)),
            Self::Content { content } => Resource::string(content.as_str()),
        }
    }
}

// ============================================================================
// Alterations
// ============================================================================

/// An alteration, tagged by `kind`. An empty `bin` means the tool's usual name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AlterationConfig {
    Command {
        bin: String,
        #[serde(default)]
        args: Vec<String>,
    },
    #[serde(rename = "uglifyjs")]
    UglifyJs {
        #[serde(default)]
        bin: String,
    },
    #[serde(rename = "uglifycss")]
    UglifyCss {
        #[serde(default)]
        bin: String,
    },
    #[serde(rename = "typescript")]
    TypeScript {
        #[serde(default)]
        bin: String,
    },
    Stylus {
        #[serde(default)]
        bin: String,
    },
    #[serde(rename = "optipng")]
    OptiPng {
        #[serde(default)]
        bin: String,
        #[serde(default = "default_optipng_level")]
        level: u8,
    },
    #[serde(rename = "jpegoptim")]
    JpegOptim {
        #[serde(default)]
        bin: String,
        #[serde(default = "default_true")]
        strip_all: bool,
        #[serde(default = "default_jpeg_max")]
        max: u8,
    },
    MinifyJs,
    MinifyCss,
}

fn default_optipng_level() -> u8 {
    2
}

fn default_jpeg_max() -> u8 {
    85
}

fn default_true() -> bool {
    true
}

impl AlterationConfig {
    pub fn build(&self) -> Result<SharedAlteration, ConfigError> {
        let alteration: SharedAlteration = match self {
            Self::Command { bin, .. } if bin.trim().is_empty() => {
                return Err(ConfigError::validation("command alteration needs a `bin`"));
            }
            Self::Command { bin, args } => Arc::new(Exec::new(bin, args.iter().cloned())),
            Self::UglifyJs { bin } => Arc::new(UglifyJs::new(bin)),
            Self::UglifyCss { bin } => Arc::new(UglifyCss::new(bin)),
            Self::TypeScript { bin } => Arc::new(TypeScript::new(bin)),
            Self::Stylus { bin } => Arc::new(Stylus::new(bin)),
            Self::OptiPng { level, .. } if *level > 7 => {
                return Err(ConfigError::validation(format!(
                    "optipng level must be between 0 and 7, got {level}"
                )));
            }
            Self::OptiPng { bin, level } => Arc::new(OptiPng::new(bin, *level)),
            Self::JpegOptim { max, .. } if *max > 100 => {
                return Err(ConfigError::validation(format!(
                    "jpegoptim max must be between 0 and 100, got {max}"
                )));
            }
            Self::JpegOptim {
                bin,
                strip_all,
                max,
            } => Arc::new(JpegOptim::new(bin, *strip_all, *max)),
            Self::MinifyJs => Arc::new(MinifyJs),
            Self::MinifyCss => Arc::new(MinifyCss),
        };
        Ok(alteration)
    }
}

fn build_all(alterations: &[AlterationConfig]) -> Result<Vec<SharedAlteration>, ConfigError> {
    alterations.iter().map(AlterationConfig::build).collect()
}

// ============================================================================
// [assets.<name>]
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AssetConfig {
    Single {
        input: ResourceConfig,
        output: PathBuf,
        #[serde(default)]
        alterations: Vec<AlterationConfig>,
    },
    Pack {
        #[serde(default)]
        input: PathBuf,
        #[serde(default)]
        output: PathBuf,
        #[serde(default)]
        pattern: PatternConfig,
        #[serde(default)]
        alterations: Vec<AlterationConfig>,
    },
}

impl AssetConfig {
    pub fn build(&self, name: &str) -> Result<Asset, ConfigError> {
        match self {
            Self::Single { output, .. } if is_blank(output) => Err(ConfigError::validation(
                format!("asset `{name}`: single asset needs an `output` file"),
            )),
            Self::Single {
                input,
                output,
                alterations,
            } => {
                let alterations = build_all(alterations)?;
                let resource = if alterations.is_empty() {
                    input.build()
                } else {
                    Resource::altered(input.build(), alterations)
                };
                Ok(SingleAsset::new(resource, output).into())
            }
            Self::Pack {
                input,
                output,
                pattern,
                alterations,
            } => {
                let pack = build_all(alterations)?
                    .into_iter()
                    .fold(AssetPack::new(input, output), AssetPack::with_alteration)
                    .with_pattern(pattern.build());
                Ok(pack.into())
            }
        }
    }
}

fn is_blank(path: &Path) -> bool {
    path.as_os_str().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Alteration;

    #[derive(Deserialize)]
    struct Wrapper<T> {
        value: T,
    }

    fn parse<T: for<'de> Deserialize<'de>>(value: &str) -> T {
        toml::from_str::<Wrapper<T>>(&format!("value = {value}"))
            .unwrap()
            .value
    }

    #[test]
    fn test_pattern_config() {
        let regex: PatternConfig = parse(r#"{ regex = '\.js$' }"#);
        assert!(regex.build().matches("/a/app.js"));

        let ext: PatternConfig = parse(r#"{ extensions = ["png", "jpg"] }"#);
        assert_eq!(ext.build().as_str(), r"(\.png$)|(\.jpg$)");

        assert!(PatternConfig::default().build().matches("anything"));
    }

    #[test]
    fn test_resource_config() {
        let file: ResourceConfig = parse(r#"{ file = "a.js" }"#);
        assert_eq!(file.build().path(), Some(Path::new("a.js")));

        let files: ResourceConfig = parse(r#"{ files = ["a", "b"] }"#);
        assert!(matches!(files.build(), Resource::Collection(c) if c.len() == 2));

        let content: ResourceConfig = parse(r#"{ content = "inline" }"#);
        assert_eq!(content.build().dump().unwrap(), b"inline");
    }

    #[test]
    fn test_alteration_config_kinds() {
        let cases = [
            (r#"{ kind = "command", bin = "cat", args = ["{input}"] }"#, "command"),
            (r#"{ kind = "uglifyjs" }"#, "uglifyjs"),
            (r#"{ kind = "uglifycss", bin = "/bin/uglifycss" }"#, "uglifycss"),
            (r#"{ kind = "typescript" }"#, "typescript"),
            (r#"{ kind = "stylus" }"#, "stylus"),
            (r#"{ kind = "optipng", level = 5 }"#, "optipng"),
            (r#"{ kind = "jpegoptim", strip_all = false, max = 70 }"#, "jpegoptim"),
            (r#"{ kind = "minify-js" }"#, "minify-js"),
            (r#"{ kind = "minify-css" }"#, "minify-css"),
        ];
        for (toml, name) in cases {
            let config: AlterationConfig = parse(toml);
            assert_eq!(config.build().unwrap().name(), name, "{toml}");
        }
    }

    #[test]
    fn test_alteration_config_defaults() {
        let config: AlterationConfig = parse(r#"{ kind = "jpegoptim" }"#);
        assert_eq!(
            config,
            AlterationConfig::JpegOptim {
                bin: String::new(),
                strip_all: true,
                max: 85,
            }
        );
    }

    #[test]
    fn test_alteration_config_validation() {
        let level: AlterationConfig = parse(r#"{ kind = "optipng", level = 9 }"#);
        assert!(matches!(level.build(), Err(ConfigError::Validation(_))));

        let max: AlterationConfig = parse(r#"{ kind = "jpegoptim", max = 101 }"#);
        assert!(matches!(max.build(), Err(ConfigError::Validation(_))));

        let bin: AlterationConfig = parse(r#"{ kind = "command", bin = "" }"#);
        assert!(matches!(bin.build(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_asset_config() {
        let single: AssetConfig = parse(
            r#"{ kind = "single", output = "x.css", input = { content = "a" }, alterations = [{ kind = "minify-css" }] }"#,
        );
        match single.build("css").unwrap() {
            Asset::Single(asset) => {
                assert_eq!(asset.output, Path::new("x.css"));
                assert!(matches!(asset.input, Resource::Altered(_)));
            }
            Asset::Pack(_) => panic!("expected a single asset"),
        }

        let pack: AssetConfig = parse(
            r#"{ kind = "pack", input = "img", output = "img", pattern = { extensions = ["png"] } }"#,
        );
        match pack.build("img").unwrap() {
            Asset::Pack(pack) => {
                assert_eq!(pack.input, Path::new("img"));
                assert_eq!(pack.pattern.as_str(), r"(\.png$)");
                assert!(pack.alterations.is_empty());
            }
            Asset::Single(_) => panic!("expected a pack"),
        }
    }

    #[test]
    fn test_single_asset_requires_output() {
        let single: AssetConfig =
            parse(r#"{ kind = "single", output = "", input = { content = "a" } }"#);
        let err = single.build("broken").unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}
