//! Normalized catalog entries.

use std::path::{Path, PathBuf};

use crate::error::PipelineResult;
use crate::geometry::{CropRect, PositionGrammar, PositionSpec, Size, resolve_crop};

use super::key::CacheKey;

/// One catalog entry, ready for the fetch and render pools.
#[derive(Debug, Clone)]
pub struct Asset {
    /// First declared alias.
    pub canonical_name: String,
    /// Every name this asset is written out as.
    pub aliases: Vec<String>,
    /// Normalized source URL; empty when the entry has no artwork.
    pub source_url: String,
    /// `None` exactly when `source_url` is empty.
    pub cache_key: Option<CacheKey>,
    /// Raw download location derived from `cache_key`.
    pub cache_path: Option<PathBuf>,
    /// One per alias, in alias order; empty when there is no artwork.
    pub output_paths: Vec<PathBuf>,
    /// Declared width, when the catalog gives one.
    pub declared_width: Option<u32>,
    /// Declared height, when the catalog gives one.
    pub declared_height: Option<u32>,
    /// Raw position tokens, when the catalog gives any.
    pub position: Option<PositionSpec>,
    /// Animated formats are passed through elsewhere and never cropped here.
    pub is_animated: bool,
    pub tags: Vec<String>,
    crop: Option<CropRect>,
}

impl Asset {
    pub fn new(canonical_name: impl Into<String>, aliases: Vec<String>) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            aliases,
            source_url: String::new(),
            cache_key: None,
            cache_path: None,
            output_paths: Vec::new(),
            declared_width: None,
            declared_height: None,
            position: None,
            is_animated: false,
            tags: Vec::new(),
            crop: None,
        }
    }

    /// Whether the entry has artwork to fetch and render.
    #[inline]
    pub fn has_image(&self) -> bool {
        !self.source_url.is_empty()
    }

    /// Cache file, if the asset has artwork.
    pub fn cache_file(&self) -> Option<&Path> {
        self.cache_path.as_deref()
    }

    /// Resolved crop, if the sprite path already ran for this asset.
    #[cfg(test)]
    pub fn crop(&self) -> Option<CropRect> {
        self.crop
    }

    /// Whether the catalog declares at least one dimension.
    pub fn has_declared_size(&self) -> bool {
        self.declared_width.is_some() || self.declared_height.is_some()
    }

    /// Declared size against a fetched image, a missing axis taking the
    /// image's own extent. `None` when neither axis is declared.
    pub fn declared_against(&self, actual: Size) -> Option<Size> {
        self.has_declared_size().then(|| {
            Size::new(
                self.declared_width.unwrap_or(actual.width),
                self.declared_height.unwrap_or(actual.height),
            )
        })
    }

    /// Whether a fetched image of `actual` size is a sprite sheet for this asset.
    ///
    /// Assets without any declared dimension are never treated as sprites.
    pub fn is_sprite_of(&self, actual: Size) -> bool {
        self.declared_against(actual)
            .is_some_and(|declared| declared != actual)
    }

    /// Resolve the crop rectangle against the fetched sheet, at most once.
    ///
    /// A successful resolution is stored and returned unchanged for every
    /// later output of the same asset. Failures are not stored.
    pub fn resolve_crop_once(
        &mut self,
        grammar: &PositionGrammar,
        actual: Size,
    ) -> PipelineResult<CropRect> {
        if let Some(rect) = self.crop {
            return Ok(rect);
        }

        let declared = self.declared_against(actual).unwrap_or(actual);
        let position = self.position.clone().unwrap_or_default();
        let rect = resolve_crop(grammar, &position, declared, actual)?;

        self.declared_width = Some(rect.width);
        self.declared_height = Some(rect.height);
        self.crop = Some(rect);
        Ok(rect)
    }
}
