//! Crop geometry for sprite sheets.
//!
//! - [`position`]: one-axis offset grammar (`120`, `50%`, `-30px`)
//! - [`crop`]: offset pair + declared size → clamped [`CropRect`]

pub mod crop;
pub mod position;

pub use crop::{CropRect, Size, resolve_crop};
pub use position::{PositionGrammar, PositionSpec, parse_int_prefix};
