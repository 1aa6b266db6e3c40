//! Guideline chunk retrieval with optional rerank fusion.

use super::rerank::Reranker;
use super::types::RetrievedChunk;
use super::RagError;
use crate::models::Condition;
use crate::pipeline::storage::types::{EmbeddingModel, VectorStore};

/// Default number of chunks returned per request.
pub const DEFAULT_TOP_K: usize = 5;

/// Retrieves guideline passages for a set of conditions.
///
/// Over-fetches `2 × top_k` candidates from the vector index so the rerank
/// stage has a larger pool to choose from.
pub struct GuidelineRetriever<'a> {
    embedder: &'a dyn EmbeddingModel,
    store: &'a dyn VectorStore,
    reranker: Option<&'a dyn Reranker>,
    top_k: usize,
}

impl<'a> GuidelineRetriever<'a> {
    pub fn new(
        embedder: &'a dyn EmbeddingModel,
        store: &'a dyn VectorStore,
        reranker: Option<&'a dyn Reranker>,
    ) -> Self {
        Self {
            embedder,
            store,
            reranker,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Retrieve up to `top_k` chunks for the given conditions.
    ///
    /// Output scores are uniformly higher-is-better: rerank relevance when a
    /// reranker is configured, negated cosine distance otherwise. This is
    /// the only place the index's lower-is-better convention is flipped.
    ///
    /// A collaborator failure aborts the whole retrieval; there is no
    /// partial or cached fallback.
    pub fn retrieve(&self, conditions: &[Condition]) -> Result<Vec<RetrievedChunk>, RagError> {
        let query = conditions
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .embed(&query)
            .map_err(|e| RagError::EmbeddingFailed(e.to_string()))?;

        let hits = self
            .store
            .query(&query_embedding, self.top_k * 2)
            .map_err(|e| RagError::VectorSearch(e.to_string()))?;

        // Candidates arrive best-first (ascending distance).
        let mut chunks: Vec<RetrievedChunk> = hits
            .into_iter()
            .map(|hit| RetrievedChunk {
                text: hit.text,
                source_file: hit.source,
                page: hit.page,
                score: -hit.distance,
            })
            .collect();

        if let Some(reranker) = self.reranker {
            let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
            let scores = reranker.score_batch(&query, &texts)?;

            for (chunk, score) in chunks.iter_mut().zip(scores) {
                chunk.score = score;
            }

            chunks.sort_by(|a, b| {
                b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        chunks.truncate(self.top_k);

        tracing::debug!(
            query = %query,
            returned = chunks.len(),
            reranked = self.reranker.is_some(),
            "Guideline retrieval complete"
        );

        Ok(chunks)
    }
}
