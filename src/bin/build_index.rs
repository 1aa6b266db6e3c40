//! Build the guideline vector index from a directory of processed chunks.
//!
//! Usage: build_index <chunk_dir>
//!
//! Reads every `*.json` file under `chunk_dir`, embeds the chunks through
//! the configured Ollama embedding model, and writes the index to the
//! configured index path.

use std::path::PathBuf;
use std::process::ExitCode;

use nirog::config::Settings;
use nirog::pipeline::storage::embedder::OllamaEmbedder;
use nirog::pipeline::storage::ingest::{build_index, load_guideline_chunks};
use nirog::pipeline::storage::vectordb::FileVectorStore;

fn main() -> ExitCode {
    nirog::init_tracing();

    let Some(chunk_dir) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("Usage: build_index <chunk_dir>");
        return ExitCode::FAILURE;
    };

    let settings = Settings::from_env();

    let chunks = match load_guideline_chunks(&chunk_dir) {
        Ok(chunks) => chunks,
        Err(e) => {
            tracing::error!(error = %e, dir = %chunk_dir.display(), "Chunk loading failed");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(chunks = chunks.len(), "Guideline chunks loaded");

    let embedder = OllamaEmbedder::new(
        &settings.ollama_url,
        &settings.embedding_model,
        settings.http_timeout_secs,
    );

    let store = match FileVectorStore::open(&settings.index_path) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "Vector index failed to open");
            return ExitCode::FAILURE;
        }
    };

    match build_index(&chunks, &embedder, &store) {
        Ok(stored) => {
            tracing::info!(stored, path = %settings.index_path.display(), "Index build complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Index build failed");
            ExitCode::FAILURE
        }
    }
}
