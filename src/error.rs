//! Per-item pipeline errors.
//!
//! None of these abort a pool: workers log them at the point of failure and
//! move on to the next job. Re-running the pipeline is the only retry.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single fetch, decode, crop or write.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid background position `{spec}`")]
    InvalidPositionSpec { spec: String },

    #[error("failed to fetch {url}: {reason}")]
    FetchFailure { url: String, reason: String },

    #[error("failed to decode `{}`: {reason}", path.display())]
    DecodeFailure { path: PathBuf, reason: String },

    #[error("failed to write `{}`: {reason}", path.display())]
    WriteFailure { path: PathBuf, reason: String },

    #[error("crop for `{name}` is empty ({width}x{height} at {x},{y})")]
    EmptyCrop {
        name: String,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

impl PipelineError {
    pub fn invalid_position(spec: impl Into<String>) -> Self {
        Self::InvalidPositionSpec { spec: spec.into() }
    }

    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::FetchFailure {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DecodeFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::WriteFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
