//! `[fetch]` and `[render]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [fetch]
//! workers = 10                # Concurrent downloads
//! timeout_secs = 30           # Per-request timeout
//! user_agent = "emotecrop/0.1.0"
//! max_size = 52428800         # Largest accepted image, in bytes
//!
//! [render]
//! workers = 10                # Concurrent crops
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::pipeline::{DEFAULT_WORKERS, HttpFetcher, fetch::DEFAULT_USER_AGENT};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub workers: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_size: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_size: 50 * 1024 * 1024,
        }
    }
}

impl FetchConfig {
    pub const WORKERS: FieldPath = FieldPath::new("fetch.workers");
    pub const TIMEOUT_SECS: FieldPath = FieldPath::new("fetch.timeout_secs");

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// HTTP fetcher with these settings.
    pub fn fetcher(&self) -> HttpFetcher {
        HttpFetcher::new()
            .with_timeout(self.timeout())
            .with_user_agent(self.user_agent.as_str())
            .with_max_size(self.max_size)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.workers == 0 {
            diag.error(Self::WORKERS, "must be at least 1");
        }
        if self.timeout_secs == 0 {
            diag.error(Self::TIMEOUT_SECS, "must be at least 1");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub workers: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

impl RenderConfig {
    pub const WORKERS: FieldPath = FieldPath::new("render.workers");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.workers == 0 {
            diag.error(Self::WORKERS, "must be at least 1");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_worker_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.fetch.workers, 10);
        assert_eq!(config.render.workers, 10);
        assert_eq!(config.fetch.timeout(), Duration::from_secs(30));
        assert_eq!(config.fetch.max_size, 52_428_800);
        assert!(config.fetch.user_agent.starts_with("emotecrop/"));
    }

    #[test]
    fn test_worker_sections() {
        let config = test_parse_config(
            "[fetch]\nworkers = 3\ntimeout_secs = 5\nuser_agent = \"bot\"\n[render]\nworkers = 7",
        );
        assert_eq!(config.fetch.workers, 3);
        assert_eq!(config.fetch.timeout_secs, 5);
        assert_eq!(config.fetch.user_agent, "bot");
        assert_eq!(config.render.workers, 7);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = test_parse_config("[fetch]\nworkers = 0\n[render]\nworkers = 0");
        let mut diag = ConfigDiagnostics::new();
        config.fetch.validate(&mut diag);
        config.render.validate(&mut diag);
        assert_eq!(diag.len(), 2);
        assert_eq!(diag.errors()[0].field, FetchConfig::WORKERS);
        assert_eq!(diag.errors()[1].field, RenderConfig::WORKERS);
    }
}
