//! Drug catalog: loaded once at startup and shared read-only for the life
//! of the process.

use std::path::Path;

use thiserror::Error;

use crate::models::DrugEntry;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error reading catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog record {index} has an empty brand name")]
    MissingBrandName { index: usize },

    #[error("Catalog is empty")]
    Empty,
}

/// In-memory, read-only collection of drug records.
///
/// Entries keep their file order; the matcher relies on that order for
/// stable tie-breaking.
#[derive(Debug)]
pub struct DrugCatalog {
    entries: Vec<DrugEntry>,
}

impl DrugCatalog {
    /// Load the catalog from a JSON file containing a list of drug records
    /// (a single record object is also accepted, as in the source data).
    ///
    /// Fails when the file is missing or malformed, or when any record lacks
    /// a brand name — the catalog has no fallback and a broken one is fatal.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;

        let entries: Vec<DrugEntry> = match value {
            serde_json::Value::Array(_) => serde_json::from_value(value)?,
            other => vec![serde_json::from_value(other)?],
        };

        let catalog = Self::from_entries(entries)?;
        tracing::info!(drugs = catalog.len(), path = %path.display(), "Drug catalog loaded");
        Ok(catalog)
    }

    /// Build a catalog from already-parsed entries, validating each record.
    pub fn from_entries(entries: Vec<DrugEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        for (index, entry) in entries.iter().enumerate() {
            if entry.brand_name.trim().is_empty() {
                return Err(CatalogError::MissingBrandName { index });
            }
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[DrugEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
