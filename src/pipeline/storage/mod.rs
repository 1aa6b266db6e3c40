pub mod embedder;
pub mod ingest;
pub mod types;
pub mod vectordb;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed chunk data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Vector store error: {0}")]
    VectorDb(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("No guideline chunks found under {0}")]
    EmptyChunks(std::path::PathBuf),
}
