//! `[tagging]` section configuration.
//!
//! Only the `tag` command reads this section.
//!
//! # Example
//!
//! ```toml
//! [tagging]
//! url = "https://vision.example/training/projects/<id>"
//! key_path = "~/.config/emotecrop/training-key"   # or: training_key = "..."
//! per_tag = 20                # Emotes uploaded per tag
//! tags = ["rainbowdash", "twilightsparkle"]
//! ```
//!
//! `EMOTECROP_TRAINING_KEY` in the environment wins over both key settings.
//! Never commit the key itself; prefer `key_path` outside the repository.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::config::{ConfigDiagnostics, ConfigError, FieldPath};

/// Environment variable overriding the training key.
pub const TRAINING_KEY_ENV: &str = "EMOTECROP_TRAINING_KEY";

/// Tags uploaded when the config does not list its own.
pub const DEFAULT_TAGS: &[&str] = &[
    "rainbowdash",
    "twilightsparkle",
    "pinkiepie",
    "fluttershy",
    "rarity",
    "applejack",
    "luna",
    "vinylscratch",
    "octavia",
    "lyra",
    "scootaloo",
    "sweetiebelle",
    "derpy",
    "celestia",
    "applebloom",
    "spike",
    "trixie",
    "berrypunch",
    "bonbon",
    "doctorwhooves",
    "cheerilee",
    "cloudchaser",
    "discord",
    "bigmac",
    "sunsetshimmer",
    "maud",
    "chrysalis",
    "colgate",
    "cadance",
    "pinkamina",
    "roseluck",
    "spitfire",
    "zecora",
    "braeburn",
    "littlepip",
    "shiningarmor",
    "blackjack",
    "flufflepuff",
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TaggingConfig {
    /// Project endpoint; request paths are appended to it.
    pub url: Option<String>,

    /// Inline key. Prefer `key_path` or the environment.
    pub training_key: Option<String>,

    /// File holding the key (tilde-expanded).
    pub key_path: Option<PathBuf>,

    pub per_tag: usize,

    pub tags: Vec<String>,
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            url: None,
            training_key: None,
            key_path: None,
            per_tag: 20,
            tags: DEFAULT_TAGS.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

impl TaggingConfig {
    pub const URL: FieldPath = FieldPath::new("tagging.url");
    pub const TRAINING_KEY: FieldPath = FieldPath::new("tagging.training_key");
    pub const KEY_PATH: FieldPath = FieldPath::new("tagging.key_path");
    pub const PER_TAG: FieldPath = FieldPath::new("tagging.per_tag");

    /// Resolve the key: environment, then inline value, then `key_path`.
    pub fn load_key(&self) -> Result<Option<String>, ConfigError> {
        if let Ok(key) = std::env::var(TRAINING_KEY_ENV)
            && !key.trim().is_empty()
        {
            return Ok(Some(key.trim().to_string()));
        }
        if let Some(key) = &self.training_key {
            return Ok(Some(key.trim().to_string()));
        }
        if let Some(path) = &self.key_path {
            let key =
                fs::read_to_string(path).map_err(|err| ConfigError::Io(path.clone(), err))?;
            return Ok(Some(key.trim().to_string()));
        }
        Ok(None)
    }

    /// Checks for the `tag` command.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        match self.url.as_deref() {
            None | Some("") => diag.error_with_hint(
                Self::URL,
                "required for `tag`",
                "set the project endpoint of the tagging service",
            ),
            Some(url) if url::Url::parse(url).is_err() => {
                diag.error(Self::URL, format!("invalid url `{url}`"));
            }
            Some(_) => {}
        }

        if let Some(path) = &self.key_path {
            if !path.is_file() {
                diag.error(
                    Self::KEY_PATH,
                    format!("key file not found: {}", path.display()),
                );
            }
        } else if self.training_key.is_none() && std::env::var_os(TRAINING_KEY_ENV).is_none() {
            diag.error_with_hint(
                Self::TRAINING_KEY,
                "required for `tag`",
                format!("set `key_path`, `training_key` or ${TRAINING_KEY_ENV}"),
            );
        }

        if self.per_tag == 0 {
            diag.error(Self::PER_TAG, "must be at least 1");
        }
    }
}
