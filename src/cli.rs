//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use statix::config::CONFIG_FILE;

/// Statix static asset publisher CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path, searched upward from the current directory
    #[arg(short = 'C', long, default_value = CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Publish every configured asset
    #[command(visible_alias = "b")]
    Build,

    /// Print the stable symlink path of an asset
    #[command(visible_alias = "s")]
    Symlink {
        #[command(flatten)]
        target: AssetArgs,
    },

    /// Print the public URL of an asset (empty when unresolvable)
    #[command(visible_alias = "u")]
    Url {
        #[command(flatten)]
        target: AssetArgs,
    },
}

/// Asset lookup arguments shared by `symlink` and `url`.
#[derive(clap::Args, Debug, Clone)]
pub struct AssetArgs {
    /// Asset name as declared in the config
    pub name: String,

    /// Member path inside a pack (ignored for single assets)
    pub path: Option<String>,
}

impl AssetArgs {
    pub fn paths(&self) -> Vec<&str> {
        self.path.as_deref().into_iter().collect()
    }
}
