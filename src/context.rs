//! Process-wide read-only state, constructed once at startup.

use std::sync::Arc;

use thiserror::Error;

use crate::catalog::{CatalogError, DrugCatalog};
use crate::config::Settings;
use crate::extractor::patterns::PatternMap;
use crate::extractor::{ConditionExtractor, PatternError};
use crate::matcher::DrugMatcher;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Drug catalog failed to load: {0}")]
    Catalog(#[from] CatalogError),

    #[error("ICD-10 pattern map failed to load: {0}")]
    Pattern(#[from] PatternError),
}

/// Catalog, matcher and extractor bundled behind one `Arc`.
///
/// Never mutated after construction; concurrent readers need no locking.
/// A hot reload would be a whole-context `Arc` swap, not in-place mutation.
pub struct AppContext {
    pub catalog: Arc<DrugCatalog>,
    pub matcher: DrugMatcher,
    pub extractor: ConditionExtractor,
}

impl AppContext {
    /// Load catalog + pattern map from the configured paths.
    /// A broken catalog is fatal; a missing pattern map falls back to the
    /// built-in table inside `PatternMap::load`.
    pub fn load(settings: &Settings) -> Result<Self, ContextError> {
        let catalog = Arc::new(DrugCatalog::load(&settings.catalog_path)?);
        let matcher = DrugMatcher::new(Arc::clone(&catalog));
        let extractor = ConditionExtractor::new(PatternMap::load(&settings.pattern_map_path)?)?;

        Ok(Self {
            catalog,
            matcher,
            extractor,
        })
    }

    /// Build a context from in-memory fixtures. Used by tests.
    pub fn from_parts(catalog: DrugCatalog, patterns: PatternMap) -> Result<Self, ContextError> {
        let catalog = Arc::new(catalog);
        let matcher = DrugMatcher::new(Arc::clone(&catalog));
        let extractor = ConditionExtractor::new(patterns)?;

        Ok(Self {
            catalog,
            matcher,
            extractor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DrugEntry;

    #[test]
    fn from_parts_wires_matcher_to_catalog() {
        let catalog = DrugCatalog::from_entries(vec![DrugEntry::named("Napa")]).unwrap();
        let ctx = AppContext::from_parts(catalog, PatternMap::builtin().unwrap()).unwrap();

        assert_eq!(ctx.catalog.len(), 1);
        assert!(!ctx.matcher.search("napa").is_empty());
    }
}
