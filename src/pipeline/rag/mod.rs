pub mod generate;
pub mod orchestrator;
pub mod prompt;
pub mod rerank;
pub mod retrieval;
pub mod types;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Vector search failed: {0}")]
    VectorSearch(String),

    #[error("Rerank failed: {0}")]
    Rerank(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}
