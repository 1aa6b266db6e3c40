use serde::{Deserialize, Serialize};

/// A guideline passage as stored at ingestion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidelineChunk {
    /// Coarse condition label the chunk was collected under, e.g. "dengue".
    pub condition_tag: String,
    pub text: String,
    pub source_file: String,
    pub pmid: Option<String>,
    pub page: Option<u32>,
}

/// The plain-language output handed back to the patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientGuideline {
    pub summary: String,
    pub dos: Vec<String>,
    pub donts: Vec<String>,
    pub references: Vec<String>,
}
