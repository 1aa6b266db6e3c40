//! Second-stage relevance scoring over the retriever's candidate pool.

use serde::{Deserialize, Serialize};

use super::RagError;

/// Rerank service abstraction: relevance of a candidate passage to a query,
/// higher = more relevant.
pub trait Reranker {
    fn score(&self, query: &str, candidate: &str) -> Result<f32, RagError>;

    /// Score a whole candidate pool. The default implementation loops
    /// `score`; batch-capable backends override it.
    fn score_batch(&self, query: &str, candidates: &[&str]) -> Result<Vec<f32>, RagError> {
        candidates.iter().map(|c| self.score(query, c)).collect()
    }
}

/// Cross-encoder reranker behind a TEI-style HTTP `/rerank` endpoint.
pub struct HttpReranker {
    endpoint: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpReranker {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    fn request(&self, query: &str, texts: &[&str]) -> Result<Vec<f32>, RagError> {
        let url = format!("{}/rerank", self.endpoint);
        let body = RerankRequest { query, texts };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                RagError::Rerank(format!("cannot reach reranker at {}", self.endpoint))
            } else if e.is_timeout() {
                RagError::Rerank(format!("request timed out after {}s", self.timeout_secs))
            } else {
                RagError::Rerank(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RagError::Rerank(format!("reranker returned {status}: {body}")));
        }

        let ranks: Vec<RerankEntry> = response
            .json()
            .map_err(|e| RagError::Rerank(format!("malformed response: {e}")))?;

        // The endpoint returns entries sorted by relevance; restore input order.
        let mut scores = vec![0.0f32; texts.len()];
        for entry in ranks {
            let slot = scores.get_mut(entry.index).ok_or_else(|| {
                RagError::Rerank(format!("reranker returned out-of-range index {}", entry.index))
            })?;
            *slot = entry.score;
        }

        Ok(scores)
    }
}

/// Request body for TEI-compatible POST /rerank
#[derive(Serialize)]
struct RerankRequest<'a> {
    query: &'a str,
    texts: &'a [&'a str],
}

/// One entry of the /rerank response
#[derive(Deserialize)]
struct RerankEntry {
    index: usize,
    score: f32,
}

impl Reranker for HttpReranker {
    fn score(&self, query: &str, candidate: &str) -> Result<f32, RagError> {
        Ok(self.request(query, &[candidate])?[0])
    }

    fn score_batch(&self, query: &str, candidates: &[&str]) -> Result<Vec<f32>, RagError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        self.request(query, candidates)
    }
}
