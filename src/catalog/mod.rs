//! Emote catalog: raw records, normalized assets, tag grouping.
//!
//! # Module Structure
//!
//! ```text
//! catalog/
//! ├── record     # RawRecord serde schema
//! ├── load       # emotes.json → Vec<RawRecord>
//! ├── key        # url normalization, CacheKey
//! ├── resolve    # RawRecord → Asset (Catalog Resolver)
//! ├── asset      # Asset
//! ├── tags       # TagIndex
//! └── error      # CatalogError, RecordDiagnostics
//! ```

mod asset;
mod error;
mod key;
mod load;
mod record;
mod resolve;
mod tags;

pub use asset::Asset;
pub use error::CatalogError;
pub use load::load_records;
pub use record::RawRecord;
#[cfg(test)]
pub use record::{RawDimension, RawPosition, RawToken};
pub use resolve::{CatalogLayout, resolve};
pub use tags::TagIndex;

use std::path::Path;

/// Load `path` and resolve it against `layout`.
pub fn load_catalog(path: &Path, layout: &CatalogLayout) -> Result<Vec<Asset>, CatalogError> {
    let records = load_records(path)?;
    resolve(&records, layout)
}
