use serde::{Deserialize, Serialize};

/// An extracted diagnosis candidate.
///
/// Two conditions are duplicates when their names are identical after
/// case-insensitive normalization; the extractor never emits duplicates
/// for a single drug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    pub icd10: Option<String>,
    /// Certainty of the extraction in [0, 1]. Not a calibrated probability.
    pub confidence: f32,
}

impl Condition {
    pub fn new(name: &str, icd10: Option<&str>, confidence: f32) -> Self {
        Self {
            name: name.to_string(),
            icd10: icd10.map(|c| c.to_string()),
            confidence,
        }
    }

    /// Normalized identity used for deduplication.
    pub fn dedup_key(&self) -> String {
        self.name.trim().to_lowercase()
    }
}
