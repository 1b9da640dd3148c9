//! Configuration section definitions.
//!
//! Each module corresponds to one or more sections in `emotecrop.toml`:
//!
//! | Module    | TOML Section                         | Purpose                      |
//! |-----------|--------------------------------------|------------------------------|
//! | `paths`   | `[catalog]`, `[cache]`, `[output]`   | Input file and directories   |
//! | `workers` | `[fetch]`, `[render]`                | Pool widths, HTTP settings   |
//! | `tagging` | `[tagging]`                          | Tagging service upload       |

mod paths;
mod tagging;
mod workers;

pub use paths::{CacheSection, CatalogSection, OutputSection};
pub use tagging::TaggingConfig;
pub use workers::{FetchConfig, RenderConfig};
