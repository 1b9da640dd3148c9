//! `check` command: resolve the catalog without touching the network.

use std::fmt;

use anyhow::Result;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::{catalog::Asset, config::AppConfig, log};

use super::build::load_assets;

/// What a `build` would find on disk right now.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSummary {
    pub assets: usize,
    pub aliases: usize,
    pub without_image: usize,
    pub animated: usize,
    /// Assets declaring a dimension (cropped when the sheet differs).
    pub declared: usize,
    /// Distinct source images.
    pub sources: usize,
    pub cached: usize,
    pub rendered: usize,
}

impl CatalogSummary {
    pub fn collect(assets: &[Asset]) -> Self {
        let sources: FxHashMap<_, _> = assets
            .iter()
            .filter_map(|a| a.cache_key.zip(a.cache_file()))
            .collect();
        let cached = sources.par_iter().filter(|(_, path)| path.exists()).count();

        let rendered = assets
            .par_iter()
            .flat_map_iter(|a| a.output_paths.iter())
            .filter(|p| p.exists())
            .count();

        Self {
            assets: assets.len(),
            aliases: assets.iter().map(|a| a.aliases.len()).sum(),
            without_image: assets.iter().filter(|a| !a.has_image()).count(),
            animated: assets.iter().filter(|a| a.is_animated).count(),
            declared: assets.iter().filter(|a| a.has_declared_size()).count(),
            sources: sources.len(),
            cached,
            rendered,
        }
    }
}

impl fmt::Display for CatalogSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "emotes:    {} ({} aliases)", self.assets, self.aliases)?;
        writeln!(f, "no image:  {}", self.without_image)?;
        writeln!(f, "animated:  {}", self.animated)?;
        writeln!(f, "sized:     {}", self.declared)?;
        writeln!(f, "cached:    {}/{}", self.cached, self.sources)?;
        write!(f, "rendered:  {}", self.rendered)
    }
}

pub fn check_catalog(config: &AppConfig) -> Result<()> {
    let assets = load_assets(config)?;
    let summary = CatalogSummary::collect(&assets);
    for line in summary.to_string().lines() {
        log!("check"; "{}", line);
    }
    Ok(())
}
