//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Fetch an emote catalog and cut every alias out of its sprite sheet
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: emotecrop.toml)
    #[arg(short = 'C', long, default_value = "emotecrop.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Resolve the catalog, download missing images, render every alias
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        args: PipelineArgs,
    },

    /// Only download missing images into the cache
    #[command(visible_alias = "f")]
    Fetch {
        #[command(flatten)]
        args: PipelineArgs,
    },

    /// Only render outputs from images already in the cache
    #[command(visible_alias = "r")]
    Render {
        #[command(flatten)]
        args: PipelineArgs,
    },

    /// Upload rendered emotes to the tagging service
    #[command(visible_alias = "t")]
    Tag {
        #[command(flatten)]
        args: PipelineArgs,

        /// Maximum number of emotes uploaded per tag
        #[arg(short = 'n', long)]
        per_tag: Option<usize>,
    },

    /// Resolve the catalog and report what is cached and rendered
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        args: PipelineArgs,
    },
}

/// Shared arguments for every command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    /// Catalog file (JSON array of emote records)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub catalog: Option<PathBuf>,

    /// Download cache directory
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub cache_dir: Option<PathBuf>,

    /// Rendered emote directory
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,

    /// Worker count for both the fetch and the render pool
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Commands {
    pub const fn args(&self) -> &PipelineArgs {
        match self {
            Self::Build { args }
            | Self::Fetch { args }
            | Self::Render { args }
            | Self::Tag { args, .. }
            | Self::Check { args } => args,
        }
    }
}

impl Cli {
    pub const fn is_tag(&self) -> bool {
        matches!(self.command, Commands::Tag { .. })
    }
}
