//! Catalog file loading.
//!
//! The file is a JSON array. Each element is decoded on its own so one
//! malformed record is reported by index instead of failing the whole parse.

use std::fs;
use std::path::Path;

use serde_json::Value;

use super::error::{CatalogError, InvalidCatalogRecord, RecordDiagnostics};
use super::record::RawRecord;

/// Read and schema-check every record in `path`.
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>, CatalogError> {
    let content =
        fs::read_to_string(path).map_err(|err| CatalogError::Io(path.to_path_buf(), err))?;
    parse_records(&content).map_err(|err| match err {
        ParseError::Json(e) => CatalogError::Json(path.to_path_buf(), e),
        ParseError::Invalid(diag) => CatalogError::Invalid(diag),
    })
}

enum ParseError {
    Json(serde_json::Error),
    Invalid(RecordDiagnostics),
}

fn parse_records(content: &str) -> Result<Vec<RawRecord>, ParseError> {
    let values: Vec<Value> = serde_json::from_str(content).map_err(ParseError::Json)?;

    let mut diag = RecordDiagnostics::new();
    let mut records = Vec::with_capacity(values.len());

    for (index, value) in values.into_iter().enumerate() {
        let name = first_name(&value);
        match serde_json::from_value::<RawRecord>(value) {
            Ok(record) => records.push(record),
            Err(e) => diag.push(InvalidCatalogRecord::new(index, name.as_deref(), e.to_string())),
        }
    }

    if diag.is_empty() {
        Ok(records)
    } else {
        Err(ParseError::Invalid(diag))
    }
}

/// Best-effort canonical name for error messages.
fn first_name(value: &Value) -> Option<String> {
    value
        .get("names")?
        .as_array()?
        .first()?
        .as_str()
        .map(str::to_string)
}
