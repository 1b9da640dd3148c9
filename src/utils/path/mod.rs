//! Path utilities.
//!
//! - [`fs`]: normalization and atomic writes into the cache/output directories

pub mod fs;

pub use fs::{normalize_path, write_atomically};
