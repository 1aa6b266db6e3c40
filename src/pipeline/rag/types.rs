use serde::{Deserialize, Serialize};

/// A guideline passage as returned by the retriever.
///
/// `score` is always higher-is-better by the time a chunk leaves the
/// retriever: rerank relevance when a reranker ran, negated vector distance
/// otherwise. Raw distances never escape the retrieval stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub source_file: String,
    pub page: Option<u32>,
    pub score: f32,
}
