//! Fetch Pool: populate the content-addressed cache.
//!
//! One job per distinct cache key, so a sheet shared by many assets (or an
//! asset with many aliases) is downloaded at most once per run. A job is a
//! no-op when its cache file already exists, which makes re-runs resume where
//! the last one stopped.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use rustc_hash::FxHashSet;

use crate::catalog::Asset;
use crate::error::{PipelineError, PipelineResult};
use crate::utils::path::write_atomically;
use crate::{debug, log};

use super::queue::run_queue;
use super::report::{Outcome, Phase, PhaseCounters, PhaseReport, PipelineObserver};

/// Default User-Agent for downloads.
pub const DEFAULT_USER_AGENT: &str = concat!("emotecrop/", env!("CARGO_PKG_VERSION"));

/// Source of raw image bytes.
pub trait Fetcher: Send + Sync {
    /// Stream the body of `url` into `sink`, returning the number of bytes.
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> PipelineResult<u64>;
}

// ============================================================================
// HTTP
// ============================================================================

/// Blocking HTTP(S) fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
    user_agent: String,
    max_size: u64,
}

impl HttpFetcher {
    /// Create a new HttpFetcher with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the maximum response size in bytes
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    fn agent(&self) -> ureq::Agent {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .build();
        config.into()
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_size: 50 * 1024 * 1024, // 50MB default limit
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> PipelineResult<u64> {
        let mut response = self
            .agent()
            .get(url)
            .header("User-Agent", self.user_agent.as_str())
            .call()
            .map_err(|e| PipelineError::fetch(url, e))?;

        let mut body = response
            .body_mut()
            .with_config()
            .limit(self.max_size)
            .reader();

        let written = io::copy(&mut body, sink).map_err(|e| PipelineError::fetch(url, e))?;
        if written == 0 {
            return Err(PipelineError::fetch(url, "empty response body"));
        }
        Ok(written)
    }
}

// ============================================================================
// Pool
// ============================================================================

/// Bounded set of download workers.
pub struct FetchPool<'a> {
    fetcher: &'a dyn Fetcher,
    workers: usize,
}

impl<'a> FetchPool<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, workers: usize) -> Self {
        Self { fetcher, workers }
    }

    /// Download every missing cache file. Returns after all workers finish.
    pub fn run(&self, assets: &[Asset], observer: &dyn PipelineObserver) -> PhaseReport {
        let counters = PhaseCounters::default();
        let jobs = plan_jobs(assets, &counters);

        observer.phase_started(Phase::Fetch, jobs.len());
        run_queue(jobs, self.workers, |asset| {
            let outcome = self.fetch_one(asset);
            counters.record(outcome);
            observer.item_finished(Phase::Fetch, outcome);
        });

        counters.snapshot()
    }

    fn fetch_one(&self, asset: &Asset) -> Outcome {
        let Some(cache_path) = asset.cache_file() else {
            return Outcome::Skipped;
        };

        if cache_path.exists() {
            debug!("fetch"; "{} already cached", asset.canonical_name);
            return Outcome::Skipped;
        }

        log!("fetch"; "downloading {}: {}", asset.canonical_name, asset.source_url);
        match download(self.fetcher, &asset.source_url, cache_path) {
            Ok(bytes) => {
                debug!("fetch"; "{} ({} bytes)", asset.canonical_name, bytes);
                Outcome::Completed
            }
            Err(e) => {
                log!("error"; "{}: {}", asset.canonical_name, e);
                Outcome::Failed
            }
        }
    }
}

/// First asset per distinct cache key, in catalog order.
///
/// Assets without artwork and later assets sharing a key are tallied as
/// skipped here and never reach a worker.
fn plan_jobs<'a>(assets: &'a [Asset], counters: &PhaseCounters) -> Vec<&'a Asset> {
    let mut seen = FxHashSet::default();
    let mut jobs = Vec::new();

    for asset in assets {
        let Some(key) = asset.cache_key else {
            log!("fetch"; "emote {} has no image", asset.canonical_name);
            counters.record(Outcome::Skipped);
            continue;
        };
        if seen.insert(key) {
            jobs.push(asset);
        } else {
            counters.record(Outcome::Skipped);
        }
    }

    jobs
}

/// Stream `url` into `dest`, visible under its final name only once complete.
fn download(fetcher: &dyn Fetcher, url: &str, dest: &Path) -> PipelineResult<u64> {
    let mut fetch_error = None;

    let result = write_atomically(dest, |part| {
        let mut writer = BufWriter::new(File::create(part)?);
        let bytes = match fetcher.fetch(url, &mut writer) {
            Ok(bytes) => bytes,
            Err(e) => {
                fetch_error = Some(e);
                return Err(io::Error::other("fetch failed"));
            }
        };
        writer.flush()?;
        writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        Ok(bytes)
    });

    match (result, fetch_error) {
        (Ok(bytes), _) => Ok(bytes),
        (Err(_), Some(e)) => Err(e),
        (Err(e), None) => Err(PipelineError::write(dest, e)),
    }
}
