//! Catalog error types.

use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// CatalogError
// ============================================================================

/// Catalog loading and validation errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error when reading `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("catalog `{}` is not a JSON array of records", .0.display())]
    Json(PathBuf, #[source] serde_json::Error),

    // NOTE: No #[from] here - we don't want source() which causes duplicate output
    #[error("{0}")]
    Invalid(RecordDiagnostics),
}

// ============================================================================
// InvalidCatalogRecord
// ============================================================================

/// A record that failed schema or value validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCatalogRecord {
    /// Position in the catalog array
    pub index: usize,
    /// Canonical name, when the record got far enough to have one
    pub name: Option<String>,
    pub reason: String,
}

impl InvalidCatalogRecord {
    pub fn new(index: usize, name: Option<&str>, reason: impl Into<String>) -> Self {
        Self {
            index,
            name: name.map(str::to_string),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for InvalidCatalogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", "[".dimmed(), format!("#{}", self.index).cyan(), "]".dimmed())?;
        if let Some(name) = &self.name {
            write!(f, " {}", name.bold())?;
        }
        write!(f, " {} {}", "→".red(), self.reason)
    }
}

// ============================================================================
// RecordDiagnostics
// ============================================================================

/// Every invalid record found in one pass over the catalog.
#[derive(Debug, Default)]
pub struct RecordDiagnostics {
    errors: Vec<InvalidCatalogRecord>,
}

impl RecordDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: InvalidCatalogRecord) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[cfg(test)]
    pub fn errors(&self) -> &[InvalidCatalogRecord] {
        &self.errors
    }

    /// Convert to Result (returns Err if there are errors).
    pub fn into_result(self) -> Result<(), CatalogError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::Invalid(self))
        }
    }
}

impl fmt::Display for RecordDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}\n", "catalog validation failed:".red().bold())?;
        for (i, err) in self.errors.iter().enumerate() {
            write!(f, "{err}")?;
            if i + 1 < self.errors.len() {
                writeln!(f)?;
            }
        }
        if self.errors.len() > 1 {
            write!(
                f,
                "\n\n{} {} {}",
                "found".dimmed(),
                self.errors.len().to_string().red().bold(),
                "invalid records".dimmed()
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for RecordDiagnostics {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_catalog_error_display() {
        let io_err = CatalogError::Io(
            PathBuf::from("emotes.json"),
            Error::new(ErrorKind::NotFound, "file not found"),
        );
        let display = format!("{io_err}");
        assert!(display.contains("IO error"));
        assert!(display.contains("emotes.json"));
    }

    #[test]
    fn test_diagnostics_into_result() {
        assert!(RecordDiagnostics::new().into_result().is_ok());

        let mut diag = RecordDiagnostics::new();
        diag.push(InvalidCatalogRecord::new(3, Some("twibeam"), "bad width"));
        diag.push(InvalidCatalogRecord::new(7, None, "missing field `names`"));
        assert_eq!(diag.errors().len(), 2);

        let err = diag.into_result().unwrap_err();
        let display = format!("{err}");
        assert!(display.contains("#3"));
        assert!(display.contains("twibeam"));
        assert!(display.contains("missing field `names`"));
    }
}
