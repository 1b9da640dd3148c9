//! Catalog Resolver: raw records → [`Asset`]s.
//!
//! Pure transform. Output order equals input order; every invalid record is
//! reported in one [`CatalogError::Invalid`] and nothing is returned for a
//! catalog with any invalid record.

use std::path::PathBuf;

use rayon::prelude::*;

use crate::geometry::{PositionSpec, parse_int_prefix};

use super::asset::Asset;
use super::error::{CatalogError, InvalidCatalogRecord, RecordDiagnostics};
use super::key::{CacheKey, normalize_url};
use super::record::{RawDimension, RawPosition, RawRecord};

/// Where cache files and finished outputs live.
#[derive(Debug, Clone)]
pub struct CatalogLayout {
    pub cache_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Extension of finished files, without the dot
    pub extension: String,
}

impl CatalogLayout {
    fn output_path(&self, alias: &str) -> PathBuf {
        self.output_dir.join(format!("{alias}.{}", self.extension))
    }
}

/// Resolve every record, in order.
pub fn resolve(records: &[RawRecord], layout: &CatalogLayout) -> Result<Vec<Asset>, CatalogError> {
    let results: Vec<_> = records
        .par_iter()
        .enumerate()
        .map(|(index, record)| resolve_record(index, record, layout))
        .collect();

    let mut diag = RecordDiagnostics::new();
    let mut assets = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(asset) => assets.push(asset),
            Err(e) => diag.push(e),
        }
    }

    diag.into_result()?;
    Ok(assets)
}

/// Resolve a single record.
pub fn resolve_record(
    index: usize,
    record: &RawRecord,
    layout: &CatalogLayout,
) -> Result<Asset, InvalidCatalogRecord> {
    let Some(canonical) = record.names.first() else {
        return Err(InvalidCatalogRecord::new(index, None, "`names` is empty"));
    };
    let invalid =
        |reason: String| InvalidCatalogRecord::new(index, Some(canonical.as_str()), reason);

    if let Some(blank) = record.names.iter().position(|n| n.trim().is_empty()) {
        return Err(invalid(format!("alias #{blank} is blank")));
    }
    if let Some(bad) = record.names.iter().find(|n| n.contains(['/', '\\'])) {
        return Err(invalid(format!("alias `{bad}` contains a path separator")));
    }

    let width = record
        .width
        .as_ref()
        .map(|d| coerce_dimension(d).ok_or_else(|| invalid(format!("invalid width {d:?}"))))
        .transpose()?;
    let height = record
        .height
        .as_ref()
        .map(|d| coerce_dimension(d).ok_or_else(|| invalid(format!("invalid height {d:?}"))))
        .transpose()?;

    let position = record
        .background_position
        .clone()
        .map(|p| position_spec(p).ok_or_else(|| invalid("invalid background-position".into())))
        .transpose()?;

    let mut asset = Asset::new(canonical.clone(), record.names.clone());
    asset.source_url = normalize_url(record.background_image.as_deref().unwrap_or_default());
    asset.declared_width = width;
    asset.declared_height = height;
    asset.position = position;
    asset.is_animated = record.apng_url.as_deref().is_some_and(|u| !u.is_empty());
    asset.tags = record.tags.clone();

    if asset.has_image() {
        let key = CacheKey::for_url(&asset.source_url);
        asset.cache_path = Some(key.cache_path(&layout.cache_dir));
        asset.cache_key = Some(key);
        asset.output_paths = record.names.iter().map(|n| layout.output_path(n)).collect();
    }

    Ok(asset)
}

/// Integer prefix of a dimension, with `parseInt` leniency (`"70px"` → 70).
fn coerce_dimension(raw: &RawDimension) -> Option<u32> {
    match raw {
        RawDimension::Number(n) => u32::try_from(*n).ok(),
        RawDimension::Text(s) => parse_int_prefix(s).and_then(|n| u32::try_from(n).ok()),
    }
}

/// One or two tokens; a missing Y token is `"0"`.
fn position_spec(raw: RawPosition) -> Option<PositionSpec> {
    let tokens: Vec<String> = match raw {
        RawPosition::Axes(tokens) => tokens.into_iter().map(|t| t.into_string()).collect(),
        RawPosition::Combined(s) => s.split_whitespace().map(str::to_string).collect(),
    };

    let mut tokens = tokens.into_iter();
    let x = tokens.next()?;
    let y = tokens.next().unwrap_or_else(|| "0".to_string());
    if tokens.next().is_some() {
        return None;
    }
    Some(PositionSpec::new(x, y))
}
