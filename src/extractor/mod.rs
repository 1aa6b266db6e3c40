//! Rule-based condition extraction from a drug's indications text.

pub mod patterns;

use std::collections::HashSet;

use regex::Regex;
use thiserror::Error;

use crate::models::{Condition, DrugEntry};
use self::patterns::{PatternMap, FUZZY_VARIANTS};

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("I/O error reading pattern map: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pattern map is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Pattern {pattern:?} does not compile: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

struct CompiledVariant {
    trigger: Regex,
    condition: &'static str,
    icd10: &'static str,
    confidence: f32,
}

/// Derives candidate conditions from indications text.
///
/// Two independent passes — the keyword pattern map at confidence 1.0 and a
/// fixed table of morphological variants at lower confidence — unioned with
/// first-write-wins deduplication by condition name.
pub struct ConditionExtractor {
    map: PatternMap,
    variants: Vec<CompiledVariant>,
}

impl ConditionExtractor {
    pub fn new(map: PatternMap) -> Result<Self, PatternError> {
        let variants = FUZZY_VARIANTS
            .iter()
            .map(|&(variant, condition, icd10, confidence)| {
                Ok(CompiledVariant {
                    trigger: patterns::word_boundary_regex(variant)?,
                    condition,
                    icd10,
                    confidence,
                })
            })
            .collect::<Result<Vec<_>, PatternError>>()?;

        Ok(Self { map, variants })
    }

    /// Extract conditions mentioned in the drug's indications.
    ///
    /// Blank or absent indications yield an empty vec. The output never
    /// contains two conditions with the same (case-insensitive) name; the
    /// first emission's confidence and code win.
    pub fn extract(&self, drug: &DrugEntry) -> Vec<Condition> {
        let text = match &drug.indications {
            Some(text) if !text.trim().is_empty() => text.to_lowercase(),
            _ => return Vec::new(),
        };

        let mut seen: HashSet<String> = HashSet::new();
        let mut results: Vec<Condition> = Vec::new();

        // Primary pass: keyword table, rule hits are maximally confident.
        for entry in self.map.entries() {
            if entry.triggers.iter().any(|re| re.is_match(&text)) {
                for name in &entry.conditions {
                    push_unique(
                        &mut results,
                        &mut seen,
                        Condition::new(name, Some(&entry.icd10), 1.0),
                    );
                }
            }
        }

        // Fallback pass: adjectival forms the keyword table does not list.
        for variant in &self.variants {
            if variant.trigger.is_match(&text) {
                push_unique(
                    &mut results,
                    &mut seen,
                    Condition::new(variant.condition, Some(variant.icd10), variant.confidence),
                );
            }
        }

        results
    }
}

fn push_unique(results: &mut Vec<Condition>, seen: &mut HashSet<String>, condition: Condition) {
    if seen.insert(condition.dedup_key()) {
        results.push(condition);
    }
}
