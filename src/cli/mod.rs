//! Command-line interface module.

mod args;
pub mod build;
pub mod check;
pub mod tag;

pub use args::{Cli, Commands, PipelineArgs};
