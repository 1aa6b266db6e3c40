//! Vector store implementations.
//!
//! Both variants hold chunks in memory and answer queries with a
//! brute-force cosine-distance scan; `FileVectorStore` additionally
//! persists the index as a JSON document.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::types::{VectorHit, VectorStore};
use super::StorageError;
use crate::models::GuidelineChunk;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredChunk {
    condition_tag: String,
    text: String,
    source_file: String,
    pmid: Option<String>,
    page: Option<u32>,
    embedding: Vec<f32>,
}

fn store_chunks(
    entries: &Mutex<Vec<StoredChunk>>,
    chunks: &[GuidelineChunk],
    embeddings: &[Vec<f32>],
) -> Result<usize, StorageError> {
    if chunks.len() != embeddings.len() {
        return Err(StorageError::VectorDb(
            "Chunk count does not match embedding count".into(),
        ));
    }

    let mut entries = entries
        .lock()
        .map_err(|_| StorageError::VectorDb("store lock poisoned".into()))?;

    for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
        entries.push(StoredChunk {
            condition_tag: chunk.condition_tag.clone(),
            text: chunk.text.clone(),
            source_file: chunk.source_file.clone(),
            pmid: chunk.pmid.clone(),
            page: chunk.page,
            embedding: embedding.clone(),
        });
    }

    Ok(chunks.len())
}

fn nearest(
    entries: &Mutex<Vec<StoredChunk>>,
    embedding: &[f32],
    n: usize,
) -> Result<Vec<VectorHit>, StorageError> {
    let entries = entries
        .lock()
        .map_err(|_| StorageError::VectorDb("store lock poisoned".into()))?;

    let mut hits: Vec<VectorHit> = entries
        .iter()
        .map(|entry| VectorHit {
            text: entry.text.clone(),
            source: entry.source_file.clone(),
            page: entry.page,
            distance: cosine_distance(embedding, &entry.embedding),
        })
        .collect();

    hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
    hits.truncate(n);
    Ok(hits)
}

/// Cosine distance in [0, 2]: 0 = identical direction, lower = more similar.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// In-memory vector store for testing.
pub struct InMemoryVectorStore {
    entries: Mutex<Vec<StoredChunk>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorStore for InMemoryVectorStore {
    fn add_chunks(
        &self,
        chunks: &[GuidelineChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<usize, StorageError> {
        store_chunks(&self.entries, chunks, embeddings)
    }

    fn query(&self, embedding: &[f32], n: usize) -> Result<Vec<VectorHit>, StorageError> {
        nearest(&self.entries, embedding, n)
    }

    fn save(&self) -> Result<(), StorageError> {
        Ok(()) // nothing durable to write
    }
}

/// Production vector store persisted as a JSON document.
pub struct FileVectorStore {
    path: PathBuf,
    entries: Mutex<Vec<StoredChunk>>,
}

impl FileVectorStore {
    /// Open the store at `path`, loading any existing index. A missing file
    /// is an empty store; a malformed file is an error.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str(&raw)?
        } else {
            Vec::new()
        };

        tracing::info!(chunks = entries.len(), path = %path.display(), "Vector index opened");

        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    pub fn count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl VectorStore for FileVectorStore {
    fn add_chunks(
        &self,
        chunks: &[GuidelineChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<usize, StorageError> {
        store_chunks(&self.entries, chunks, embeddings)
    }

    fn query(&self, embedding: &[f32], n: usize) -> Result<Vec<VectorHit>, StorageError> {
        nearest(&self.entries, embedding, n)
    }

    fn save(&self) -> Result<(), StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::VectorDb("store lock poisoned".into()))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(&*entries)?;
        std::fs::write(&self.path, json)?;

        tracing::info!(chunks = entries.len(), path = %self.path.display(), "Vector index saved");
        Ok(())
    }
}
