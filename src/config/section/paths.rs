//! `[catalog]`, `[cache]` and `[output]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [catalog]
//! path = "emotes.json"        # JSON array of emote records
//!
//! [cache]
//! dir = "raw-images"          # Content-addressed downloads
//!
//! [output]
//! dir = "emotes"              # One file per alias
//! extension = "png"           # Encoding of cropped sprites
//! ```
//!
//! Relative paths are resolved against the directory holding `emotecrop.toml`.

use std::path::PathBuf;

use serde::Deserialize;

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    pub path: PathBuf,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            path: "emotes.json".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    pub dir: PathBuf,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            dir: "raw-images".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub dir: PathBuf,

    /// File extension of every output; also selects the crop encoder.
    pub extension: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: "emotes".into(),
            extension: "png".into(),
        }
    }
}

impl OutputSection {
    pub const EXTENSION: FieldPath = FieldPath::new("output.extension");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let ext = self.extension.trim_start_matches('.');
        if ext.is_empty() {
            diag.error(Self::EXTENSION, "must not be empty");
        } else if image::ImageFormat::from_extension(ext).is_none() {
            diag.error_with_hint(
                Self::EXTENSION,
                format!("unsupported image extension `{ext}`"),
                "use png, jpg, webp or gif",
            );
        }
    }
}
