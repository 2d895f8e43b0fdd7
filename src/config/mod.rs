//! Project configuration management for `statix.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section   # [server], [[filters]], [assets.*] definitions
//! ├── error     # ConfigError
//! └── mod.rs    # Config (this file)
//! ```
//!
//! # Sections
//!
//! | Section           | Purpose                                        |
//! |-------------------|------------------------------------------------|
//! | `input`, `output` | Base directories, relative to the config file  |
//! | `[server]`        | Primary URL mapping                            |
//! | `[[servers]]`     | Fallback URL mappings, tried in order          |
//! | `[[filters]]`     | Alterations applied to matching outputs        |
//! | `[assets.<name>]` | Named single assets and packs                  |

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{
    AlterationConfig, AssetConfig, FilterConfig, PatternConfig, ResourceConfig, ServerConfig,
};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::log;
use crate::manager::Manager;
use crate::path::rewrite_path;

/// Default config file name.
pub const CONFIG_FILE: &str = "statix.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing statix.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    pub input: PathBuf,
    pub output: PathBuf,
    pub server: ServerConfig,
    pub servers: Vec<ServerConfig>,
    pub filters: Vec<FilterConfig>,
    pub assets: BTreeMap<String, AssetConfig>,
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(content)?)
    }
}

impl Config {
    /// Load configuration from file path with unknown field detection.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("failed to parse `{}`", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    /// Locate `config_name` (see [`find_config_file`]) and load it.
    pub fn discover(config_name: &Path) -> Result<Self> {
        let path = find_config_file(config_name)
            .with_context(|| format!("`{}` not found", config_name.display()))?;
        Self::load(&path)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Validate and build the asset manager.
    ///
    /// Relative `input`/`output` are anchored at the config file directory.
    pub fn into_manager(self) -> Result<Manager, ConfigError> {
        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::validation("`output` must not be empty"));
        }

        let mut manager = Manager::new(
            rewrite_path(&self.root, &self.input),
            rewrite_path(&self.root, &self.output),
        )
        .with_server(self.server.build());

        for server in &self.servers {
            manager = manager.with_fallback_server(server.build());
        }
        for filter in &self.filters {
            manager = manager.with_filter(filter.build()?);
        }
        for (name, asset) in &self.assets {
            manager = manager.with_asset(name, asset.build(name)?);
        }
        Ok(manager)
    }
}

/// Find config file by searching upward from current directory
///
/// ```text
/// /home/user/site/assets/js/  ← cwd
/// /home/user/site/statix.toml ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.exists())
}
