use std::process::ExitCode;
use std::sync::Arc;

use nirog::api::router::build_router;
use nirog::api::types::ApiContext;
use nirog::config::{Settings, APP_VERSION};
use nirog::context::AppContext;
use nirog::pipeline::rag::generate::OllamaGenerator;
use nirog::pipeline::rag::rerank::{HttpReranker, Reranker};
use nirog::pipeline::storage::embedder::OllamaEmbedder;
use nirog::pipeline::storage::vectordb::FileVectorStore;

/// Collaborator clients are `reqwest::blocking` and must be constructed
/// outside the async runtime; the runtime is entered only to serve.
fn main() -> ExitCode {
    nirog::init_tracing();
    tracing::info!("Nirog starting v{APP_VERSION}");

    let settings = Settings::from_env();

    // Catalog + pattern map are fatal when broken; the pattern map alone
    // falls back to its built-in table when the file is merely absent.
    let context = match AppContext::load(&settings) {
        Ok(context) => Arc::new(context),
        Err(e) => {
            tracing::error!(error = %e, "Startup data load failed");
            return ExitCode::FAILURE;
        }
    };

    let store = match FileVectorStore::open(&settings.index_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!(error = %e, "Vector index failed to open");
            return ExitCode::FAILURE;
        }
    };

    let embedder = Arc::new(OllamaEmbedder::new(
        &settings.ollama_url,
        &settings.embedding_model,
        settings.http_timeout_secs,
    ));
    let llm = Arc::new(OllamaGenerator::new(
        &settings.ollama_url,
        &settings.llm_model,
        settings.http_timeout_secs,
    ));
    let reranker: Option<Arc<dyn Reranker + Send + Sync>> =
        settings.rerank_url.as_deref().map(|url| {
            tracing::info!(url, "Reranker enabled");
            Arc::new(HttpReranker::new(url, settings.http_timeout_secs))
                as Arc<dyn Reranker + Send + Sync>
        });

    let ctx = ApiContext {
        context,
        embedder,
        store,
        reranker,
        llm,
        top_k: settings.top_k,
    };

    let app = build_router(ctx);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Tokio runtime failed to start");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(async {
        let listener = match tokio::net::TcpListener::bind(settings.bind_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                tracing::error!(addr = %settings.bind_addr, error = %e, "Cannot bind API server");
                return ExitCode::FAILURE;
            }
        };

        tracing::info!(addr = %settings.bind_addr, "API server listening");

        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "API server exited with error");
            return ExitCode::FAILURE;
        }

        ExitCode::SUCCESS
    })
}
