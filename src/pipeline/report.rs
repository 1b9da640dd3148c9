//! Phase outcomes and the observer hooks the driver signals through.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::utils::plural_count;

/// Pipeline phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fetch,
    Render,
}

impl Phase {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Render => "render",
        }
    }
}

/// Result of one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Work was done (a download or an output file written).
    Completed,
    /// Nothing to do: already on disk, no artwork, or pass-through format.
    Skipped,
    /// Logged and abandoned until the next run.
    Failed,
}

/// Counts for one phase.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PhaseReport {
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl fmt::Display for PhaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} done, {} skipped, {}",
            self.completed,
            self.skipped,
            plural_count(self.failed, "failure")
        )
    }
}

/// Both phases of one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineReport {
    pub fetch: PhaseReport,
    pub render: PhaseReport,
}

impl PipelineReport {
    pub const fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Failures across both phases.
    pub const fn failed(&self) -> usize {
        self.fetch.failed + self.render.failed
    }
}

/// Hooks the pipeline signals through. All methods default to no-ops.
///
/// Called from worker threads, hence `Sync`.
pub trait PipelineObserver: Sync {
    /// A phase is about to process `jobs` items.
    fn phase_started(&self, _phase: Phase, _jobs: usize) {}

    /// One item of `phase` finished.
    fn item_finished(&self, _phase: Phase, _outcome: Outcome) {}

    /// Every fetch worker has finished.
    fn fetch_done(&self, _report: &PhaseReport) {}

    /// Every render worker has finished.
    fn render_done(&self, _report: &PhaseReport) {}
}

/// Observer that ignores everything.
impl PipelineObserver for () {}

/// Thread-safe tally, snapshotted into a [`PhaseReport`].
#[derive(Debug, Default)]
pub(super) struct PhaseCounters {
    completed: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
}

impl PhaseCounters {
    pub fn record(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Completed => &self.completed,
            Outcome::Skipped => &self.skipped,
            Outcome::Failed => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PhaseReport {
        PhaseReport {
            completed: self.completed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
