//! Request handlers.
//!
//! Matching and extraction are cheap CPU work and run inline; anything that
//! calls a collaborator over HTTP runs on a blocking worker thread.

use axum::extract::State;
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{
    ApiContext, AssistRequest, AssistResponse, DiagnoseRequest, DiagnoseResponse,
    GuidelinesRequest, GuidelinesResponse, HealthResponse,
};
use crate::formatter::to_markdown;
use crate::pipeline::rag::generate::GuidelineGenerator;
use crate::pipeline::rag::orchestrator::{GuidelinePipeline, PipelineOutcome};
use crate::pipeline::rag::rerank::Reranker;
use crate::pipeline::rag::retrieval::GuidelineRetriever;

/// `GET /api/health` — liveness check.
pub async fn health(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok",
        catalog_size: ctx.context.catalog.len(),
        version: crate::config::APP_VERSION,
    }))
}

/// `POST /api/diagnose` — medicine names → matched drugs.
pub async fn diagnose(
    State(ctx): State<ApiContext>,
    Json(request): Json<DiagnoseRequest>,
) -> Result<Json<DiagnoseResponse>, ApiError> {
    if request.medicines.iter().all(|m| m.trim().is_empty()) {
        return Err(ApiError::BadRequest("no medicine names provided".to_string()));
    }

    let matched_drugs = request
        .medicines
        .iter()
        .flat_map(|name| ctx.context.matcher.search(name))
        .collect();

    Ok(Json(DiagnoseResponse { matched_drugs }))
}

/// `POST /api/guidelines` — conditions → retrieved chunks → guideline.
pub async fn guidelines(
    State(ctx): State<ApiContext>,
    Json(request): Json<GuidelinesRequest>,
) -> Result<Json<GuidelinesResponse>, ApiError> {
    if request.conditions.is_empty() {
        return Err(ApiError::BadRequest("no conditions provided".to_string()));
    }

    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, conditions = request.conditions.len(), "Guidelines request");

    let response = tokio::task::spawn_blocking(move || -> Result<GuidelinesResponse, ApiError> {
        let reranker = ctx.reranker.as_deref().map(|r| r as &dyn Reranker);
        let retriever =
            GuidelineRetriever::new(ctx.embedder.as_ref(), ctx.store.as_ref(), reranker)
                .with_top_k(ctx.top_k);

        let chunks = retriever
            .retrieve(&request.conditions)
            .map_err(|e| ApiError::Upstream(format!("retrieval: {e}")))?;

        let generator = GuidelineGenerator::new(ctx.llm.as_ref());
        let guideline = generator
            .generate(&request.conditions, &chunks)
            .map_err(|e| ApiError::Upstream(format!("generation: {e}")))?;

        let markdown = to_markdown(&guideline);
        Ok(GuidelinesResponse { guideline, markdown })
    })
    .await
    .map_err(|e| ApiError::Internal(format!("worker task failed: {e}")))??;

    Ok(Json(response))
}

/// `POST /api/assist` — the full pipeline in one call.
pub async fn assist(
    State(ctx): State<ApiContext>,
    Json(request): Json<AssistRequest>,
) -> Result<Json<AssistResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, medicines = request.medicines.len(), "Assist request");

    let outcome = tokio::task::spawn_blocking(move || {
        let reranker = ctx.reranker.as_deref().map(|r| r as &dyn Reranker);
        let pipeline = GuidelinePipeline::new(
            &ctx.context.matcher,
            &ctx.context.extractor,
            ctx.embedder.as_ref(),
            ctx.store.as_ref(),
            reranker,
            ctx.llm.as_ref(),
            ctx.top_k,
        );
        pipeline.run(&request.medicines)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("worker task failed: {e}")))?
    .map_err(ApiError::from)?;

    let response = match outcome {
        PipelineOutcome::Guideline(report) => AssistResponse {
            status: "ok",
            report: Some(*report),
            message: None,
        },
        PipelineOutcome::NoDrugMatches => AssistResponse {
            status: "no_drug_matches",
            report: None,
            message: Some("No matching drugs were found for the given medicine names."),
        },
        PipelineOutcome::NoConditions => AssistResponse {
            status: "no_conditions",
            report: None,
            message: Some("No medical conditions could be inferred from the matched drugs."),
        },
    };

    Ok(Json(response))
}
