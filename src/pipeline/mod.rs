//! Fetch → render pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  Resolve (rayon)   RawRecord -> Asset    │
//! └──────────────────────────────────────────┘
//!                      │ all records valid
//! ┌──────────────────────────────────────────┐
//! │  Fetch Pool        url -> cache file     │  one job per cache key
//! └──────────────────────────────────────────┘
//!                      │ every worker joined, fetch_done
//! ┌──────────────────────────────────────────┐
//! │  Render Pool       cache -> outputs      │  one job per asset
//! └──────────────────────────────────────────┘
//!                      │ every worker joined, render_done
//! ```
//!
//! The two phases never overlap. Cache and output files on disk are the only
//! state carried between runs.

pub mod fetch;
mod queue;
pub mod render;
pub mod report;

pub use fetch::{FetchPool, Fetcher, HttpFetcher};
pub use render::RenderPool;
pub use report::{Outcome, Phase, PhaseReport, PipelineObserver, PipelineReport};

use crate::catalog::{Asset, CatalogError, CatalogLayout, RawRecord, resolve};
use crate::core::is_shutdown;
use crate::geometry::PositionGrammar;

/// Default width of each pool.
pub const DEFAULT_WORKERS: usize = 10;

/// Pipeline Driver.
pub struct Pipeline<'a> {
    fetcher: &'a dyn Fetcher,
    grammar: &'a PositionGrammar,
    fetch_workers: usize,
    render_workers: usize,
}

impl<'a> Pipeline<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, grammar: &'a PositionGrammar) -> Self {
        Self {
            fetcher,
            grammar,
            fetch_workers: DEFAULT_WORKERS,
            render_workers: DEFAULT_WORKERS,
        }
    }

    pub fn fetch_workers(mut self, workers: usize) -> Self {
        self.fetch_workers = workers;
        self
    }

    pub fn render_workers(mut self, workers: usize) -> Self {
        self.render_workers = workers;
        self
    }

    /// Fetch phase only.
    pub fn fetch(&self, assets: &[Asset], observer: &dyn PipelineObserver) -> PhaseReport {
        let report = FetchPool::new(self.fetcher, self.fetch_workers).run(assets, observer);
        observer.fetch_done(&report);
        report
    }

    /// Render phase only. Assets whose cache file is absent are skipped.
    pub fn render(&self, assets: &mut [Asset], observer: &dyn PipelineObserver) -> PhaseReport {
        let report = RenderPool::new(self.grammar, self.render_workers).run(assets, observer);
        observer.render_done(&report);
        report
    }

    /// Fetch to completion, then render to completion.
    ///
    /// An interrupted fetch phase leaves the render phase unstarted.
    pub fn run(&self, assets: &mut [Asset], observer: &dyn PipelineObserver) -> PipelineReport {
        let fetch = self.fetch(assets, observer);
        if is_shutdown() {
            return PipelineReport {
                fetch,
                ..Default::default()
            };
        }
        let render = self.render(assets, observer);
        PipelineReport { fetch, render }
    }

    /// Resolve raw records, then [`run`](Self::run).
    ///
    /// Nothing is fetched when any record is invalid.
    pub fn run_records(
        &self,
        records: &[RawRecord],
        layout: &CatalogLayout,
        observer: &dyn PipelineObserver,
    ) -> Result<(Vec<Asset>, PipelineReport), CatalogError> {
        let mut assets = resolve(records, layout)?;
        let report = self.run(&mut assets, observer);
        Ok((assets, report))
    }
}
