//! Statix - content-addressed static asset publisher.

mod cli;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use statix::config::Config;
use statix::{Manager, log, logger};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let manager = load_manager(&cli)?;

    match &cli.command {
        Commands::Build => build(&manager),
        Commands::Symlink { target } => {
            let symlink = manager.symlink(&target.name, &target.paths())?;
            println!("{}", symlink.display());
            Ok(())
        }
        Commands::Url { target } => {
            // Unresolvable assets print an empty line, like template lookups
            println!("{}", manager.url(&target.name, &target.paths()));
            Ok(())
        }
    }
}

fn load_manager(cli: &Cli) -> Result<Manager> {
    let config = Config::discover(&cli.config)?;
    config
        .into_manager()
        .with_context(|| format!("invalid config `{}`", cli.config.display()))
}

fn build(manager: &Manager) -> Result<()> {
    let count = manager.dump().context("build failed")?;
    log!(
        "build";
        "published {} artifact(s) from {} asset(s) into {}",
        count,
        manager.assets.len(),
        manager.output.display()
    );
    Ok(())
}
