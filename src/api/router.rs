//! API router.
//!
//! Routes are nested under `/api/`. CORS is permissive — the UI is served
//! from a different origin in every deployment this targets.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the API router from a pre-constructed `ApiContext`.
pub fn build_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health))
        .route("/diagnose", post(endpoints::diagnose))
        .route("/guidelines", post(endpoints::guidelines))
        .route("/assist", post(endpoints::assist))
        .with_state(ctx);

    Router::new().nest("/api", api).layer(CorsLayer::permissive())
}
