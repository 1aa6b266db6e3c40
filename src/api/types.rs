//! Shared state and request/response bodies for the API layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::matcher::MatchResult;
use crate::models::{Condition, PatientGuideline};
use crate::pipeline::rag::generate::LlmGenerate;
use crate::pipeline::rag::rerank::Reranker;
use crate::pipeline::storage::types::{EmbeddingModel, VectorStore};

/// Shared context for all API routes: the read-only app context plus the
/// pipeline collaborators, all behind `Arc` so request handlers can move
/// clones onto blocking worker threads.
#[derive(Clone)]
pub struct ApiContext {
    pub context: Arc<AppContext>,
    pub embedder: Arc<dyn EmbeddingModel + Send + Sync>,
    pub store: Arc<dyn VectorStore + Send + Sync>,
    pub reranker: Option<Arc<dyn Reranker + Send + Sync>>,
    pub llm: Arc<dyn LlmGenerate + Send + Sync>,
    pub top_k: usize,
}

// ── Request bodies ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DiagnoseRequest {
    pub medicines: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GuidelinesRequest {
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
pub struct AssistRequest {
    pub medicines: Vec<String>,
}

// ── Response bodies ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub catalog_size: usize,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DiagnoseResponse {
    pub matched_drugs: Vec<MatchResult>,
}

#[derive(Debug, Serialize)]
pub struct GuidelinesResponse {
    pub guideline: PatientGuideline,
    pub markdown: String,
}

/// Full-pipeline response. `status` is "ok" when a guideline was produced,
/// otherwise a short no-results marker the UI can render directly.
#[derive(Debug, Serialize)]
pub struct AssistResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<crate::pipeline::rag::orchestrator::GuidelineReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}
