//! emotecrop - fetch an emote catalog and cut every alias out of its sprite sheet.

mod catalog;
mod cli;
mod config;
mod core;
mod error;
mod geometry;
mod logger;
mod pipeline;
mod tagging;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, build::Stage};
use config::AppConfig;

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

    let config = AppConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => cli::build::run_pipeline(&config, Stage::All).map(drop),
        Commands::Fetch { .. } => cli::build::run_pipeline(&config, Stage::Fetch).map(drop),
        Commands::Render { .. } => cli::build::run_pipeline(&config, Stage::Render).map(drop),
        Commands::Tag { per_tag, .. } => cli::tag::tag_emotes(&config, *per_tag),
        Commands::Check { .. } => cli::check::check_catalog(&config),
    }
}
