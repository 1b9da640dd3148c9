//! Configuration management for `emotecrop.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── paths      # [catalog] [cache] [output]
//! │   ├── workers    # [fetch] [render]
//! │   └── tagging    # [tagging]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! ├── util           # find_config_file
//! └── mod.rs         # AppConfig (this file)
//! ```
//!
//! # Precedence
//!
//! CLI flags > environment (`EMOTECROP_TRAINING_KEY`) > `emotecrop.toml` > defaults.
//! A missing config file is not an error: every section has defaults.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    CacheSection, CatalogSection, FetchConfig, OutputSection, RenderConfig, TaggingConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    catalog::CatalogLayout,
    cli::{Cli, PipelineArgs},
    log,
};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing emotecrop.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Directory relative paths are resolved against (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub catalog: CatalogSection,

    #[serde(default)]
    pub cache: CacheSection,

    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub tagging: TaggingConfig,
}

impl AppConfig {
    /// Load configuration for the parsed command line.
    ///
    /// Searches upward from cwd for the config file. The root is the config
    /// file's directory, or cwd when there is none.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                config.config_path = Some(crate::utils::path::normalize_path(&path));
                config
            }
            None => {
                crate::debug!("config"; "no {} found, using defaults", cli.config.display());
                Self {
                    root: cwd,
                    ..Self::default()
                }
            }
        };

        config.apply_args(cli.command.args());
        config.normalize_paths();
        config.validate(cli.is_tag())?;

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply the shared command arguments.
    fn apply_args(&mut self, args: &PipelineArgs) {
        crate::logger::set_verbose(args.verbose);

        Self::update_option(&mut self.catalog.path, args.catalog.as_ref());
        Self::update_option(&mut self.cache.dir, args.cache_dir.as_ref());
        Self::update_option(&mut self.output.dir, args.output_dir.as_ref());
        Self::update_option(&mut self.fetch.workers, args.workers.as_ref());
        Self::update_option(&mut self.render.workers, args.workers.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Normalize all paths relative to the root directory.
    fn normalize_paths(&mut self) {
        let root = crate::utils::path::normalize_path(&self.root);

        self.catalog.path = crate::utils::path::normalize_path(&root.join(&self.catalog.path));
        self.cache.dir = crate::utils::path::normalize_path(&root.join(&self.cache.dir));
        self.output.dir = crate::utils::path::normalize_path(&root.join(&self.output.dir));
        self.output.extension = self.output.extension.trim_start_matches('.').to_string();

        if let Some(key_path) = self.tagging.key_path.take() {
            self.tagging.key_path = Some(Self::normalize_key_path(&key_path, &root));
        }

        self.root = root;
    }

    /// Normalize key path with tilde expansion.
    fn normalize_key_path(path: &Path, root: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path.to_str().unwrap_or_default()).into_owned();
        let path = PathBuf::from(expanded);
        let full_path = if path.is_relative() {
            root.join(&path)
        } else {
            path
        };
        crate::utils::path::normalize_path(&full_path)
    }

    // ========================================================================
    // derived values
    // ========================================================================

    /// Where the resolver places cache and output files.
    pub fn layout(&self) -> CatalogLayout {
        CatalogLayout {
            cache_dir: self.cache.dir.clone(),
            output_dir: self.output.dir.clone(),
            extension: self.output.extension.clone(),
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration; `tagging` adds the `[tagging]` requirements.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self, tagging: bool) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        self.output.validate(&mut diag);
        self.fetch.validate(&mut diag);
        self.render.validate(&mut diag);
        if tagging {
            self.tagging.validate(&mut diag);
        }

        diag.into_result().map_err(ConfigError::Diagnostics)
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> AppConfig {
    let (parsed, ignored) = AppConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_invalid_toml() {
        let result = AppConfig::parse_with_ignored("[fetch\nworkers = 3");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[fetch]\nworkers = 2\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = AppConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.fetch.workers, 2);
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = test_parse_config("[fetch]\nworkers = 2\n[cache]\ndir = \"dl\"");
        config.apply_args(&PipelineArgs {
            workers: Some(6),
            output_dir: Some("out".into()),
            ..Default::default()
        });

        assert_eq!(config.fetch.workers, 6);
        assert_eq!(config.render.workers, 6);
        assert_eq!(config.cache.dir, PathBuf::from("dl"));
        assert_eq!(config.output.dir, PathBuf::from("out"));
    }

    #[test]
    fn test_paths_resolved_against_root() {
        let dir = TempDir::new().unwrap();
        let mut config = test_parse_config("[output]\ndir = \"emotes\"\nextension = \".webp\"");
        config.root = dir.path().to_path_buf();
        config.normalize_paths();

        let root = crate::utils::path::normalize_path(dir.path());
        assert_eq!(config.output.dir, root.join("emotes"));
        assert_eq!(config.catalog.path, root.join("emotes.json"));

        let layout = config.layout();
        assert_eq!(layout.cache_dir, root.join("raw-images"));
        assert_eq!(layout.extension, "webp");
    }

    #[test]
    fn test_validate_collects_errors() {
        let config = test_parse_config("[fetch]\nworkers = 0\n[render]\nworkers = 0");
        let Err(ConfigError::Diagnostics(diag)) = config.validate(false) else {
            panic!("expected diagnostics");
        };
        assert_eq!(diag.len(), 2);

        // Tagging requirements only apply to `tag`
        assert!(test_parse_config("").validate(false).is_ok());
    }
}
