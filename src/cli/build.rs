//! `build`, `fetch` and `render` commands.
//!
//! Phases:
//! - **Load** - Read `emotes.json`, resolve every record (fails on any invalid one)
//! - **Fetch** - Download missing cache files
//! - **Render** - Copy or crop one output per alias
//!
//! `fetch` and `render` run a single phase over the same resolved catalog.

use std::path::Path;

use crate::{
    catalog::{Asset, load_catalog, load_records},
    config::AppConfig,
    core::is_shutdown,
    geometry::PositionGrammar,
    log,
    logger::ProgressLine,
    pipeline::{Outcome, Phase, PhaseReport, Pipeline, PipelineObserver, PipelineReport},
    utils::plural_count,
};
use anyhow::{Context, Result};
use parking_lot::RwLock;

/// Which phases a command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Fetch, then render
    All,
    Fetch,
    Render,
}

/// Resolve the catalog and run the requested phases.
pub fn run_pipeline(config: &AppConfig, stage: Stage) -> Result<PipelineReport> {
    let fetcher = config.fetch.fetcher();
    let grammar = PositionGrammar::new();
    let pipeline = Pipeline::new(&fetcher, &grammar)
        .fetch_workers(config.fetch.workers)
        .render_workers(config.render.workers);
    let observer = ProgressObserver::default();

    let report = match stage {
        Stage::All => {
            let path = &config.catalog.path;
            let records = load_records(path).with_context(|| load_context(path))?;
            log_catalog(records.len(), path);
            let (_, report) = pipeline
                .run_records(&records, &config.layout(), &observer)
                .with_context(|| load_context(path))?;
            report
        }
        Stage::Fetch => {
            let assets = load_assets(config)?;
            PipelineReport {
                fetch: pipeline.fetch(&assets, &observer),
                ..Default::default()
            }
        }
        Stage::Render => {
            let mut assets = load_assets(config)?;
            PipelineReport {
                render: pipeline.render(&mut assets, &observer),
                ..Default::default()
            }
        }
    };

    if is_shutdown() {
        log!("build"; "interrupted, re-run to continue");
    } else if report.has_failures() {
        log!("build"; "{}, re-run to retry", plural_count(report.failed(), "failure"));
    } else {
        log!("build"; "done");
    }
    Ok(report)
}

/// Load and resolve the configured catalog.
pub fn load_assets(config: &AppConfig) -> Result<Vec<Asset>> {
    let path = &config.catalog.path;
    let assets = load_catalog(path, &config.layout()).with_context(|| load_context(path))?;
    log_catalog(assets.len(), path);
    Ok(assets)
}

fn load_context(path: &Path) -> String {
    format!("failed to load catalog {}", path.display())
}

fn log_catalog(count: usize, path: &Path) {
    log!("catalog"; "{} from {}", plural_count(count, "emote"), path.display());
}

// ============================================================================
// Progress
// ============================================================================

/// Drives one `ProgressLine` per phase and prints the phase summary.
#[derive(Default)]
struct ProgressObserver {
    line: RwLock<Option<ProgressLine>>,
}

impl ProgressObserver {
    fn finish(&self, phase: Phase, report: &PhaseReport) {
        if let Some(line) = self.line.write().take() {
            line.finish();
        }
        log!(phase.name(); "{}", report);
    }
}

impl PipelineObserver for ProgressObserver {
    fn phase_started(&self, phase: Phase, jobs: usize) {
        *self.line.write() = Some(ProgressLine::new(phase.name(), &[(phase.name(), jobs)]));
    }

    fn item_finished(&self, phase: Phase, _outcome: Outcome) {
        if let Some(line) = self.line.read().as_ref() {
            line.inc(phase.name());
        }
    }

    fn fetch_done(&self, report: &PhaseReport) {
        self.finish(Phase::Fetch, report);
    }

    fn render_done(&self, report: &PhaseReport) {
        self.finish(Phase::Render, report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;
    use std::fs;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir, catalog: &str) -> AppConfig {
        let path = dir.path().join("emotes.json");
        fs::write(&path, catalog).unwrap();
        let mut config = AppConfig::default();
        config.catalog.path = path;
        config.cache.dir = dir.path().join("raw-images");
        config.output.dir = dir.path().join("emotes");
        config
    }

    #[test]
    fn test_load_assets() {
        let dir = TempDir::new().unwrap();
        let config = config_in(
            &dir,
            r#"[{"names": ["a", "b"], "background-image": "//cdn/a.png"}, {"names": ["c"]}]"#,
        );
        let assets = load_assets(&config).unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].output_paths[1], dir.path().join("emotes/b.png"));
        assert!(!assets[1].has_image());
    }

    #[test]
    fn test_invalid_catalog_is_reported() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, r#"[{"names": []}]"#);
        let err = load_assets(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CatalogError>(),
            Some(CatalogError::Invalid(_))
        ));
    }

    #[test]
    fn test_render_only_with_empty_cache() {
        let dir = TempDir::new().unwrap();
        let config = config_in(
            &dir,
            r#"[{"names": ["a"], "background-image": "//cdn/a.png"}]"#,
        );
        let report = run_pipeline(&config, Stage::Render).unwrap();
        assert_eq!(report.render.skipped, 1);
        assert_eq!(report.fetch, PhaseReport::default());
        assert!(!dir.path().join("emotes/a.png").exists());
    }

    #[test]
    fn test_build_rejects_invalid_record_before_fetching() {
        let dir = TempDir::new().unwrap();
        let config = config_in(
            &dir,
            r#"[{"names": ["a"], "background-image": "//cdn/a.png", "width": "wide"}]"#,
        );
        let err = run_pipeline(&config, Stage::All).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CatalogError>(),
            Some(CatalogError::Invalid(_))
        ));
        assert!(!dir.path().join("raw-images").exists());
    }
}
