//! Index build path: load processed guideline chunks from disk, embed them,
//! and fill a vector store.

use std::path::Path;

use serde::Deserialize;

use super::types::{EmbeddingModel, VectorStore};
use super::StorageError;
use crate::models::GuidelineChunk;

/// Embedding batch size for the build pass.
const EMBED_BATCH_SIZE: usize = 64;

/// Raw shape of one record in a processed guideline file. PubMed exports
/// carry the passage under `abstract`, scraped documents under `text`.
#[derive(Debug, Deserialize)]
struct RawChunk {
    #[serde(default)]
    condition_tag: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(default)]
    pmid: Option<String>,
    #[serde(default)]
    page: Option<u32>,
}

/// Load every `*.json` file under `dir` as a list of guideline chunks.
///
/// Records without usable text are skipped. The source file of each chunk
/// is the file it was read from.
pub fn load_guideline_chunks(dir: &Path) -> Result<Vec<GuidelineChunk>, StorageError> {
    let mut chunks = Vec::new();

    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    for path in paths {
        let raw = std::fs::read_to_string(&path)?;
        let records: Vec<RawChunk> = serde_json::from_str(&raw)?;
        let source_file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut kept = 0usize;
        for record in records {
            let text = record
                .abstract_text
                .filter(|t| !t.trim().is_empty())
                .or(record.text.filter(|t| !t.trim().is_empty()));

            let Some(text) = text else {
                continue;
            };

            kept += 1;
            chunks.push(GuidelineChunk {
                condition_tag: record.condition_tag.unwrap_or_else(|| "general".to_string()),
                text,
                source_file: source_file.clone(),
                pmid: record.pmid,
                page: record.page,
            });
        }

        tracing::debug!(file = %source_file, chunks = kept, "Loaded guideline file");
    }

    if chunks.is_empty() {
        return Err(StorageError::EmptyChunks(dir.to_path_buf()));
    }

    Ok(chunks)
}

/// Embed `chunks` in batches and add them to `store`, then save.
/// Returns the number of chunks stored.
pub fn build_index(
    chunks: &[GuidelineChunk],
    embedder: &dyn EmbeddingModel,
    store: &dyn VectorStore,
) -> Result<usize, StorageError> {
    let mut stored = 0usize;

    for batch in chunks.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts)?;
        stored += store.add_chunks(batch, &embeddings)?;
        tracing::debug!(stored, total = chunks.len(), "Index build progress");
    }

    store.save()?;
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::storage::embedder::MockEmbedder;
    use crate::pipeline::storage::vectordb::InMemoryVectorStore;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn loads_text_and_abstract_records() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "dengue.json",
            r#"[{"condition_tag": "dengue", "text": "fluid management"},
                {"abstract": "platelet monitoring", "pmid": "12345"}]"#,
        );

        let chunks = load_guideline_chunks(dir.path()).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].condition_tag, "dengue");
        assert_eq!(chunks[0].source_file, "dengue.json");
        assert_eq!(chunks[1].condition_tag, "general");
        assert_eq!(chunks[1].pmid.as_deref(), Some("12345"));
    }

    #[test]
    fn skips_records_without_text() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "sparse.json",
            r#"[{"condition_tag": "x"}, {"text": "   "}, {"text": "kept"}]"#,
        );

        let chunks = load_guideline_chunks(dir.path()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "kept");
    }

    #[test]
    fn empty_directory_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_guideline_chunks(dir.path()),
            Err(StorageError::EmptyChunks(_))
        ));
    }

    #[test]
    fn ignores_non_json_files() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "notes.txt", "not chunks");
        write_file(dir.path(), "real.json", r#"[{"text": "chunk"}]"#);

        let chunks = load_guideline_chunks(dir.path()).unwrap();
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn build_index_stores_every_chunk() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "who.json",
            r#"[{"text": "chunk one"}, {"text": "chunk two"}, {"text": "chunk three"}]"#,
        );

        let chunks = load_guideline_chunks(dir.path()).unwrap();
        let embedder = MockEmbedder::new();
        let store = InMemoryVectorStore::new();

        let stored = build_index(&chunks, &embedder, &store).unwrap();
        assert_eq!(stored, 3);
        assert_eq!(store.count(), 3);
    }
}
