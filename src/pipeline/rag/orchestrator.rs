//! End-to-end pipeline: medicines → drugs → conditions → chunks → guideline.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::generate::{GuidelineGenerator, LlmGenerate};
use super::rerank::Reranker;
use super::retrieval::GuidelineRetriever;
use super::types::RetrievedChunk;
use super::RagError;
use crate::extractor::ConditionExtractor;
use crate::formatter::to_markdown;
use crate::matcher::{DrugMatcher, MatchResult};
use crate::models::{Condition, PatientGuideline};
use crate::pipeline::storage::types::{EmbeddingModel, VectorStore};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Retrieval stage failed: {0}")]
    Retrieval(#[source] RagError),

    #[error("Generation stage failed: {0}")]
    Generation(#[source] RagError),
}

/// Successful pipeline output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidelineReport {
    pub matched_drugs: Vec<MatchResult>,
    pub conditions: Vec<Condition>,
    pub chunks: Vec<RetrievedChunk>,
    pub guideline: PatientGuideline,
    pub markdown: String,
}

/// Outcome of a pipeline run. Empty match/extraction results are valid
/// outcomes, not errors — the caller renders them as "no results".
#[derive(Debug)]
pub enum PipelineOutcome {
    Guideline(Box<GuidelineReport>),
    NoDrugMatches,
    NoConditions,
}

/// Composes the matcher, extractor, retriever and generator. Owns no state
/// of its own beyond call order and flattening.
pub struct GuidelinePipeline<'a> {
    matcher: &'a DrugMatcher,
    extractor: &'a ConditionExtractor,
    embedder: &'a dyn EmbeddingModel,
    store: &'a dyn VectorStore,
    reranker: Option<&'a dyn Reranker>,
    llm: &'a dyn LlmGenerate,
    top_k: usize,
}

impl<'a> GuidelinePipeline<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        matcher: &'a DrugMatcher,
        extractor: &'a ConditionExtractor,
        embedder: &'a dyn EmbeddingModel,
        store: &'a dyn VectorStore,
        reranker: Option<&'a dyn Reranker>,
        llm: &'a dyn LlmGenerate,
        top_k: usize,
    ) -> Self {
        Self {
            matcher,
            extractor,
            embedder,
            store,
            reranker,
            llm,
            top_k,
        }
    }

    /// Match the given medicine names and flatten the per-name results.
    pub fn match_drugs(&self, medicines: &[String]) -> Vec<MatchResult> {
        medicines
            .iter()
            .flat_map(|name| self.matcher.search(name))
            .collect()
    }

    /// Extract conditions from each matched drug and union the sets.
    /// First write wins across drugs, same as within one drug.
    pub fn extract_conditions(&self, matches: &[MatchResult]) -> Vec<Condition> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut conditions: Vec<Condition> = Vec::new();

        for result in matches {
            for condition in self.extractor.extract(&result.matched_drug) {
                if seen.insert(condition.dedup_key()) {
                    conditions.push(condition);
                }
            }
        }

        conditions
    }

    /// Execute the full pipeline for a list of medicine names.
    pub fn run(&self, medicines: &[String]) -> Result<PipelineOutcome, PipelineError> {
        // Step 1: Validate input
        if medicines.iter().all(|m| m.trim().is_empty()) {
            return Err(PipelineError::InvalidInput(
                "no medicine names provided".to_string(),
            ));
        }

        // Step 2: Match drugs and flatten
        let matched_drugs = self.match_drugs(medicines);
        if matched_drugs.is_empty() {
            tracing::info!(medicines = medicines.len(), "No drug matches above cutoff");
            return Ok(PipelineOutcome::NoDrugMatches);
        }

        // Step 3: Extract and union conditions
        let conditions = self.extract_conditions(&matched_drugs);
        if conditions.is_empty() {
            tracing::info!(drugs = matched_drugs.len(), "No conditions extracted");
            return Ok(PipelineOutcome::NoConditions);
        }

        // Step 4: Retrieve guideline chunks
        let retriever = GuidelineRetriever::new(self.embedder, self.store, self.reranker)
            .with_top_k(self.top_k);
        let chunks = retriever.retrieve(&conditions).map_err(PipelineError::Retrieval)?;

        // Step 5: Generate the patient guideline
        let generator = GuidelineGenerator::new(self.llm);
        let guideline = generator
            .generate(&conditions, &chunks)
            .map_err(PipelineError::Generation)?;

        // Step 6: Format for display
        let markdown = to_markdown(&guideline);

        Ok(PipelineOutcome::Guideline(Box::new(GuidelineReport {
            matched_drugs,
            conditions,
            chunks,
            guideline,
            markdown,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::catalog::DrugCatalog;
    use crate::extractor::patterns::PatternMap;
    use crate::models::{DrugEntry, GuidelineChunk};
    use crate::pipeline::storage::embedder::MockEmbedder;
    use crate::pipeline::storage::vectordb::InMemoryVectorStore;

    struct CannedLlm;

    impl LlmGenerate for CannedLlm {
        fn generate(&self, _system: &str, _prompt: &str) -> Result<String, RagError> {
            Ok("Manage your sugar and pressure.\n\
                - Do: Take medicines on time.\n\
                - Don't: Skip follow-up visits.\n"
                .to_string())
        }
    }

    struct OfflineLlm;

    impl LlmGenerate for OfflineLlm {
        fn generate(&self, _system: &str, _prompt: &str) -> Result<String, RagError> {
            Err(RagError::Generation("model offline".into()))
        }
    }

    fn entry(brand: &str, generic: &str, indications: Option<&str>) -> DrugEntry {
        DrugEntry {
            generic_name: Some(generic.to_string()),
            indications: indications.map(|s| s.to_string()),
            ..DrugEntry::named(brand)
        }
    }

    fn fixture_matcher() -> DrugMatcher {
        let catalog = DrugCatalog::from_entries(vec![
            entry("Glucomet", "Metformin", Some("type 2 diabetes mellitus, diabetic control")),
            entry("Amlovas", "Amlodipine", Some("hypertension and angina")),
            entry("Plainol", "Placebolol", None),
        ])
        .unwrap();
        DrugMatcher::new(Arc::new(catalog))
    }

    fn fixture_extractor() -> ConditionExtractor {
        ConditionExtractor::new(PatternMap::builtin().unwrap()).unwrap()
    }

    fn fixture_store() -> InMemoryVectorStore {
        let store = InMemoryVectorStore::new();
        let chunks: Vec<GuidelineChunk> = (0..8)
            .map(|i| GuidelineChunk {
                condition_tag: "general".to_string(),
                text: format!("guideline text {i}"),
                source_file: format!("who_{i}.pdf"),
                pmid: None,
                page: None,
            })
            .collect();
        let embedder = MockEmbedder::new();
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts).unwrap();
        store.add_chunks(&chunks, &embeddings).unwrap();
        store
    }

    #[test]
    fn full_round_trip_produces_guideline() {
        let matcher = fixture_matcher();
        let extractor = fixture_extractor();
        let embedder = MockEmbedder::new();
        let store = fixture_store();
        let llm = CannedLlm;

        let pipeline =
            GuidelinePipeline::new(&matcher, &extractor, &embedder, &store, None, &llm, 5);

        let outcome = pipeline
            .run(&["Glucomet".to_string(), "Amlovas".to_string()])
            .unwrap();

        let report = match outcome {
            PipelineOutcome::Guideline(report) => report,
            other => panic!("expected a guideline, got {other:?}"),
        };

        assert!(!report.matched_drugs.is_empty());
        let names: Vec<&str> = report.conditions.iter().map(|c| c.name.as_str()).collect();
        assert!(names.contains(&"Type 2 Diabetes Mellitus"));
        assert!(names.contains(&"Essential Hypertension"));
        assert!(report.chunks.len() <= 5);
        assert_eq!(report.guideline.dos, vec!["Take medicines on time."]);
        assert!(report.markdown.contains("Manage your sugar and pressure."));
    }

    #[test]
    fn all_blank_input_is_invalid() {
        let matcher = fixture_matcher();
        let extractor = fixture_extractor();
        let embedder = MockEmbedder::new();
        let store = InMemoryVectorStore::new();
        let llm = CannedLlm;

        let pipeline =
            GuidelinePipeline::new(&matcher, &extractor, &embedder, &store, None, &llm, 5);

        let result = pipeline.run(&["".to_string(), "   ".to_string()]);
        assert!(matches!(result, Err(PipelineError::InvalidInput(_))));

        let result = pipeline.run(&[]);
        assert!(matches!(result, Err(PipelineError::InvalidInput(_))));
    }

    #[test]
    fn unknown_medicine_short_circuits_without_error() {
        let matcher = fixture_matcher();
        let extractor = fixture_extractor();
        let embedder = MockEmbedder::new();
        let store = InMemoryVectorStore::new();
        let llm = CannedLlm;

        let pipeline =
            GuidelinePipeline::new(&matcher, &extractor, &embedder, &store, None, &llm, 5);

        let outcome = pipeline.run(&["xyzzynol".to_string()]).unwrap();
        assert!(matches!(outcome, PipelineOutcome::NoDrugMatches));
    }

    #[test]
    fn matched_drug_without_indications_short_circuits() {
        let matcher = fixture_matcher();
        let extractor = fixture_extractor();
        let embedder = MockEmbedder::new();
        let store = InMemoryVectorStore::new();
        let llm = CannedLlm;

        let pipeline =
            GuidelinePipeline::new(&matcher, &extractor, &embedder, &store, None, &llm, 5);

        let outcome = pipeline.run(&["Plainol".to_string()]).unwrap();
        assert!(matches!(outcome, PipelineOutcome::NoConditions));
    }

    #[test]
    fn conditions_deduplicate_across_drugs() {
        let matcher = fixture_matcher();
        let extractor = fixture_extractor();
        let embedder = MockEmbedder::new();
        let store = fixture_store();
        let llm = CannedLlm;

        let pipeline =
            GuidelinePipeline::new(&matcher, &extractor, &embedder, &store, None, &llm, 5);

        // Glucomet twice: diabetes conditions must appear once.
        let matches = pipeline.match_drugs(&["Glucomet".to_string(), "glucomet".to_string()]);
        let conditions = pipeline.extract_conditions(&matches);

        let mut keys: Vec<String> = conditions.iter().map(|c| c.dedup_key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), conditions.len());
    }

    #[test]
    fn generation_failure_names_the_stage() {
        let matcher = fixture_matcher();
        let extractor = fixture_extractor();
        let embedder = MockEmbedder::new();
        let store = fixture_store();
        let llm = OfflineLlm;

        let pipeline =
            GuidelinePipeline::new(&matcher, &extractor, &embedder, &store, None, &llm, 5);

        let result = pipeline.run(&["Glucomet".to_string()]);
        match result {
            Err(PipelineError::Generation(_)) => {}
            other => panic!("expected a generation-stage error, got {other:?}"),
        }
    }
}
