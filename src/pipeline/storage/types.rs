use super::StorageError;
use crate::models::GuidelineChunk;

/// Embedding model abstraction.
/// Deterministic for a given model version.
pub trait EmbeddingModel {
    fn embed(&self, text: &str) -> Result<Vec<f32>, StorageError>;
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, StorageError>;
    fn dimension(&self) -> usize;
}

/// Allow `Box<dyn EmbeddingModel>` to be used as `&impl EmbeddingModel`.
impl EmbeddingModel for Box<dyn EmbeddingModel> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, StorageError> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, StorageError> {
        (**self).embed_batch(texts)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }
}

/// One nearest-neighbour result from a vector store query.
/// `distance` is non-negative cosine distance: lower = more similar.
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub text: String,
    pub source: String,
    pub page: Option<u32>,
    pub distance: f32,
}

/// Vector store abstraction.
///
/// Implementations use interior mutability so a shared reference can serve
/// both the ingest path and concurrent query traffic.
pub trait VectorStore {
    /// Add chunks with their embeddings. Chunk and embedding counts must
    /// match.
    fn add_chunks(
        &self,
        chunks: &[GuidelineChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<usize, StorageError>;

    /// Return up to `n` nearest chunks, ordered by ascending distance.
    fn query(&self, embedding: &[f32], n: usize) -> Result<Vec<VectorHit>, StorageError>;

    /// Persist the store, if the backend has a durable form.
    fn save(&self) -> Result<(), StorageError>;
}
