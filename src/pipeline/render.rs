//! Render Pool: turn cached downloads into one file per alias.
//!
//! Runs strictly after the fetch phase. Each job owns one `Asset` (the crop is
//! written back into it), so there is no sharing between workers.
//!
//! Per output path:
//!
//! ```text
//! exists?            → skip
//! cache missing?     → skip (fetch failed earlier; next run retries)
//! actual == declared → copy cache file verbatim (an undeclared axis matches)
//! otherwise          → resolve crop once, cut, encode by output extension
//! ```

use std::fs;
use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};

use crate::catalog::Asset;
use crate::error::{PipelineError, PipelineResult};
use crate::geometry::{PositionGrammar, Size};
use crate::utils::path::write_atomically;
use crate::{debug, log};

use super::queue::run_queue;
use super::report::{Outcome, Phase, PhaseCounters, PhaseReport, PipelineObserver};

/// Bounded set of render workers.
pub struct RenderPool<'a> {
    grammar: &'a PositionGrammar,
    workers: usize,
}

impl<'a> RenderPool<'a> {
    pub fn new(grammar: &'a PositionGrammar, workers: usize) -> Self {
        Self { grammar, workers }
    }

    /// Produce every missing output file. Returns after all workers finish.
    ///
    /// Counts are per output file.
    pub fn run(&self, assets: &mut [Asset], observer: &dyn PipelineObserver) -> PhaseReport {
        let counters = PhaseCounters::default();

        let mut jobs = Vec::with_capacity(assets.len());
        for asset in assets.iter_mut() {
            if asset.is_animated {
                debug!("render"; "{} is animated, leaving as-is", asset.canonical_name);
                skip_all(asset, &counters);
            } else if !asset.has_image() {
                // Already reported by the fetch phase
                skip_all(asset, &counters);
            } else {
                jobs.push(asset);
            }
        }

        let outputs = jobs.iter().map(|a| a.output_paths.len()).sum();
        observer.phase_started(Phase::Render, outputs);

        run_queue(jobs, self.workers, |asset| {
            self.render_asset(asset, &mut |outcome| {
                counters.record(outcome);
                observer.item_finished(Phase::Render, outcome);
            });
        });

        counters.snapshot()
    }

    fn render_asset(&self, asset: &mut Asset, finish: &mut dyn FnMut(Outcome)) {
        let Some(cache_path) = asset.cache_path.clone() else {
            return;
        };

        // Decoded on first use, shared by the remaining aliases
        let mut image: Option<DynamicImage> = None;
        let outputs = asset.output_paths.clone();

        for (index, output) in outputs.iter().enumerate() {
            if output.exists() {
                debug!("render"; "{} exists", output.display());
                finish(Outcome::Skipped);
                continue;
            }

            if !cache_path.exists() {
                log!("render"; "{}: no cached image, skipping", asset.canonical_name);
                for _ in index..outputs.len() {
                    finish(Outcome::Skipped);
                }
                return;
            }

            if image.is_none() {
                match decode(&cache_path) {
                    Ok(decoded) => image = Some(decoded),
                    Err(e) => {
                        log!("error"; "{}: {}", asset.canonical_name, e);
                        for _ in index..outputs.len() {
                            finish(Outcome::Failed);
                        }
                        return;
                    }
                }
            }
            let Some(decoded) = image.as_ref() else {
                return;
            };

            match self.render_output(asset, decoded, &cache_path, output) {
                Ok(()) => finish(Outcome::Completed),
                Err(e) => {
                    log!("error"; "{}: {}", asset.canonical_name, e);
                    finish(Outcome::Failed);
                }
            }
        }
    }

    fn render_output(
        &self,
        asset: &mut Asset,
        image: &DynamicImage,
        cache_path: &Path,
        output: &Path,
    ) -> PipelineResult<()> {
        let (width, height) = image.dimensions();
        let actual = Size::new(width, height);

        if !asset.is_sprite_of(actual) {
            debug!("render"; "copying {}", output.display());
            write_atomically(output, |part| fs::copy(cache_path, part))
                .map_err(|e| PipelineError::write(output, e))?;
            return Ok(());
        }

        let rect = asset.resolve_crop_once(self.grammar, actual)?;
        if rect.is_empty() {
            return Err(PipelineError::EmptyCrop {
                name: asset.canonical_name.clone(),
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
            });
        }

        log!(
            "render";
            "chopping {} ({} at {},{} from {})",
            output.display(),
            rect.size(),
            rect.x,
            rect.y,
            actual
        );

        let format = ImageFormat::from_path(output).unwrap_or(ImageFormat::Png);
        let cropped = image.crop_imm(rect.x, rect.y, rect.width, rect.height);
        write_atomically(output, |part| {
            cropped
                .save_with_format(part, format)
                .map_err(std::io::Error::other)
        })
        .map_err(|e| PipelineError::write(output, e))
    }
}

fn skip_all(asset: &Asset, counters: &PhaseCounters) {
    for _ in &asset.output_paths {
        counters.record(Outcome::Skipped);
    }
}

/// Decode by content, not extension: every cache file is named `.png`.
fn decode(path: &Path) -> PipelineResult<DynamicImage> {
    ImageReader::open(path)
        .map_err(|e| PipelineError::decode(path, e))?
        .with_guessed_format()
        .map_err(|e| PipelineError::decode(path, e))?
        .decode()
        .map_err(|e| PipelineError::decode(path, e))
}
