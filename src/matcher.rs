//! Fuzzy drug-name matching against the catalog.
//!
//! A query matches on either the brand or the generic name: each catalog
//! entry is compared through a precomputed `"brand|generic"` key, and the
//! similarity measure is substring-tolerant so that "aceclora" scores 1.0
//! against "aceclora tablet|aceclofenac".

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;

use crate::catalog::DrugCatalog;
use crate::models::DrugEntry;

/// Minimum similarity for a candidate to be reported.
pub const SCORE_CUTOFF: f64 = 0.75;

/// Default number of matches returned per query.
pub const DEFAULT_TOP_K: usize = 5;

/// One input name resolved to a catalog entry with a confidence score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// The normalized (lowercased, trimmed) query this match answers.
    pub input_drug: String,
    pub matched_drug: DrugEntry,
    /// Similarity in [0, 1]; at least `SCORE_CUTOFF`.
    pub confidence: f32,
}

/// Resolves free-text medicine names to catalog entries.
///
/// Comparison keys are precomputed at construction; each query is a full
/// scan over the catalog, acceptable at catalog sizes in the thousands.
pub struct DrugMatcher {
    catalog: Arc<DrugCatalog>,
    keys: Vec<String>,
}

impl DrugMatcher {
    pub fn new(catalog: Arc<DrugCatalog>) -> Self {
        let keys = catalog
            .entries()
            .iter()
            .map(|drug| {
                format!(
                    "{}|{}",
                    drug.brand_name.trim().to_lowercase(),
                    drug.generic_name.as_deref().unwrap_or("").trim().to_lowercase(),
                )
            })
            .collect();

        Self { catalog, keys }
    }

    /// Match a free-text medicine name, returning up to `DEFAULT_TOP_K`
    /// results ordered by descending confidence.
    pub fn search(&self, query: &str) -> Vec<MatchResult> {
        self.search_top(query, DEFAULT_TOP_K)
    }

    /// Match with an explicit result bound.
    ///
    /// A blank query yields an empty vec. Candidates below `SCORE_CUTOFF`
    /// are discarded; score ties keep catalog order (stable sort).
    pub fn search_top(&self, query: &str, k: usize) -> Vec<MatchResult> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<MatchResult> = self
            .keys
            .iter()
            .enumerate()
            .filter_map(|(idx, key)| {
                let score = partial_ratio(&query, key);
                if score >= SCORE_CUTOFF {
                    Some(MatchResult {
                        input_drug: query.clone(),
                        matched_drug: self.catalog.entries()[idx].clone(),
                        confidence: score as f32,
                    })
                } else {
                    None
                }
            })
            .collect();

        results.sort_by(|a, b| {
            b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);
        results
    }
}

/// Substring-tolerant similarity in [0, 1].
///
/// 1.0 when `query` occurs verbatim inside `target`; otherwise the best
/// normalized Levenshtein similarity between `query` and any query-length
/// window of `target`. Windows are over chars, not bytes.
fn partial_ratio(query: &str, target: &str) -> f64 {
    if query.is_empty() || target.is_empty() {
        return 0.0;
    }

    if target.contains(query) {
        return 1.0;
    }

    let target_chars: Vec<char> = target.chars().collect();
    let query_len = query.chars().count();

    if query_len >= target_chars.len() {
        return normalized_levenshtein(query, target);
    }

    target_chars
        .windows(query_len)
        .map(|window| {
            let window: String = window.iter().collect();
            normalized_levenshtein(query, &window)
        })
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DrugEntry;

    fn entry(brand: &str, generic: &str, indications: &str) -> DrugEntry {
        DrugEntry {
            generic_name: Some(generic.to_string()),
            indications: Some(indications.to_string()),
            ..DrugEntry::named(brand)
        }
    }

    fn test_matcher() -> DrugMatcher {
        let catalog = DrugCatalog::from_entries(vec![
            entry("Aceclora Tablet", "Aceclofenac", "pain and inflammation"),
            entry("Napa", "Paracetamol", "fever"),
            entry("Napa Extra", "Paracetamol + Caffeine", "fever and headache"),
            entry("Glucomet", "Metformin Hydrochloride", "type 2 diabetes"),
        ])
        .unwrap();
        DrugMatcher::new(Arc::new(catalog))
    }

    #[test]
    fn blank_query_returns_empty() {
        let matcher = test_matcher();
        assert!(matcher.search("").is_empty());
        assert!(matcher.search("   ").is_empty());
        assert!(matcher.search("\t\n").is_empty());
    }

    #[test]
    fn exact_substring_scores_full_confidence() {
        let matcher = test_matcher();
        let results = matcher.search("aceclora");

        assert!(!results.is_empty());
        assert_eq!(results[0].matched_drug.brand_name, "Aceclora Tablet");
        assert!((results[0].confidence - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn matches_on_generic_name() {
        let matcher = test_matcher();
        let results = matcher.search("Metformin");

        assert!(!results.is_empty());
        assert_eq!(results[0].matched_drug.brand_name, "Glucomet");
    }

    #[test]
    fn near_miss_still_matches_above_cutoff() {
        let matcher = test_matcher();
        // One-letter typo in an 8-letter query
        let results = matcher.search("acelcora");

        assert!(!results.is_empty());
        assert_eq!(results[0].matched_drug.brand_name, "Aceclora Tablet");
        assert!(results[0].confidence >= SCORE_CUTOFF as f32);
    }

    #[test]
    fn unrelated_query_returns_empty() {
        let matcher = test_matcher();
        assert!(matcher.search("zzzzqqqq").is_empty());
    }

    #[test]
    fn results_bounded_and_sorted_descending() {
        let matcher = test_matcher();
        let results = matcher.search_top("napa", 1);

        assert_eq!(results.len(), 1);

        let all = matcher.search("napa");
        assert!(all.len() <= DEFAULT_TOP_K);
        for pair in all.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn ties_keep_catalog_order() {
        // Both Napa entries contain "napa" verbatim → both score 1.0.
        let matcher = test_matcher();
        let results = matcher.search("napa");

        assert!(results.len() >= 2);
        assert_eq!(results[0].matched_drug.brand_name, "Napa");
        assert_eq!(results[1].matched_drug.brand_name, "Napa Extra");
    }

    #[test]
    fn query_is_normalized() {
        let matcher = test_matcher();
        let results = matcher.search("  ACECLORA  ");

        assert!(!results.is_empty());
        assert_eq!(results[0].input_drug, "aceclora");
    }

    #[test]
    fn partial_ratio_exact_substring() {
        assert_eq!(partial_ratio("aceclora", "aceclora tablet|aceclofenac"), 1.0);
    }

    #[test]
    fn partial_ratio_query_longer_than_target() {
        let score = partial_ratio("paracetamol extended", "napa|paracetamol");
        assert!(score < 1.0);
        assert!(score > 0.0);
    }

    #[test]
    fn partial_ratio_is_symmetric_on_empty() {
        assert_eq!(partial_ratio("", "napa"), 0.0);
        assert_eq!(partial_ratio("napa", ""), 0.0);
    }
}
