//! minwatch - minify and bundle JavaScript and CSS assets in place.

mod asset;
mod backend;
mod cli;
mod config;
mod core;
mod logger;
mod utils;
mod watch;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::Config;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Config::load(&cli)?;
    if let Some(path) = &config.config_path {
        crate::debug!("config"; "loaded {}", path.display());
    }

    // Single-threaded scheduler; minification uses the blocking pool.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async {
        match &cli.command {
            Commands::Build { .. } => cli::build::run_build(&cli, &config).await,
            Commands::Dev { .. } => cli::dev::run_dev(&cli, &config).await,
        }
    })
}
