//! Sprite-sheet crop rectangle resolution.

use crate::error::PipelineResult;

use super::position::{PositionGrammar, PositionSpec};

/// Pixel dimensions of an image or a declared asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Concrete rectangle cut out of a sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Extent of the rectangle.
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Resolve where an asset sits inside its sheet.
///
/// Offsets come from [`PositionGrammar::resolve_offset`] per axis; the extent
/// is the declared size clamped so the crop never runs past the sheet edge.
pub fn resolve_crop(
    grammar: &PositionGrammar,
    position: &PositionSpec,
    declared: Size,
    actual: Size,
) -> PipelineResult<CropRect> {
    let x = grammar.resolve_offset(&position.x, declared.width, actual.width)?;
    let y = grammar.resolve_offset(&position.y, declared.height, actual.height)?;

    Ok(CropRect {
        x,
        y,
        width: declared.width.min(actual.width.saturating_sub(x)),
        height: declared.height.min(actual.height.saturating_sub(y)),
    })
}
