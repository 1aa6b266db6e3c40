//! ICD-10 keyword pattern map.
//!
//! Loaded once from a JSON mapping document; a keyword hit attaches that
//! entry's conditions and ICD-10 code directly, with no secondary lookup.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use super::PatternError;

/// Raw shape of one mapping-file entry:
/// `"diabetes": {"conditions": [...], "icd10": "E11.9", "patterns": [...]}`
#[derive(Debug, Deserialize)]
struct RawEntry {
    conditions: Vec<String>,
    icd10: String,
    #[serde(default)]
    patterns: Vec<String>,
}

/// One compiled mapping entry. The keyword and every extra trigger pattern
/// are held as word-boundary regexes over lowercased text.
#[derive(Debug)]
pub struct MappingEntry {
    pub keyword: String,
    pub conditions: Vec<String>,
    pub icd10: String,
    pub triggers: Vec<Regex>,
}

/// The full keyword → conditions mapping, compiled for matching.
#[derive(Debug)]
pub struct PatternMap {
    entries: Vec<MappingEntry>,
}

impl PatternMap {
    /// Load the mapping document, falling back to the built-in table when
    /// the file does not exist. A present-but-malformed file is an error.
    pub fn load(path: &Path) -> Result<Self, PatternError> {
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "ICD-10 mapping file not found, using built-in fallback table"
            );
            return Self::builtin();
        }

        let raw = std::fs::read_to_string(path)?;
        // BTreeMap keeps entry order deterministic across loads.
        let parsed: BTreeMap<String, RawEntry> = serde_json::from_str(&raw)?;

        let map = Self::compile(parsed)?;
        tracing::info!(entries = map.len(), path = %path.display(), "ICD-10 pattern map loaded");
        Ok(map)
    }

    /// Minimal 3-entry table used when no mapping document is available.
    pub fn builtin() -> Result<Self, PatternError> {
        let mut parsed = BTreeMap::new();
        parsed.insert(
            "diabetes".to_string(),
            RawEntry {
                conditions: vec!["Type 2 Diabetes Mellitus".to_string()],
                icd10: "E11.9".to_string(),
                patterns: vec![],
            },
        );
        parsed.insert(
            "hypertension".to_string(),
            RawEntry {
                conditions: vec!["Essential Hypertension".to_string()],
                icd10: "I10".to_string(),
                patterns: vec![],
            },
        );
        parsed.insert(
            "infection".to_string(),
            RawEntry {
                conditions: vec!["Bacterial Infection".to_string()],
                icd10: "A49.9".to_string(),
                patterns: vec![],
            },
        );

        Self::compile(parsed)
    }

    fn compile(parsed: BTreeMap<String, RawEntry>) -> Result<Self, PatternError> {
        let mut entries = Vec::with_capacity(parsed.len());

        for (keyword, raw) in parsed {
            let mut triggers = Vec::with_capacity(1 + raw.patterns.len());
            triggers.push(word_boundary_regex(&keyword)?);
            for pattern in &raw.patterns {
                triggers.push(word_boundary_regex(pattern)?);
            }

            entries.push(MappingEntry {
                keyword,
                conditions: raw.conditions,
                icd10: raw.icd10,
                triggers,
            });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compile a whole-word trigger over lowercased text.
/// "diabetes" must not match inside "prediabetesx".
pub(super) fn word_boundary_regex(pattern: &str) -> Result<Regex, PatternError> {
    let lowered = pattern.trim().to_lowercase();
    Regex::new(&format!(r"\b{}\b", regex::escape(&lowered))).map_err(|source| {
        PatternError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
    })
}

/// Morphological variants the keyword table does not enumerate, tested with
/// the same word-boundary rule: (variant, condition name, ICD-10, confidence).
pub(super) const FUZZY_VARIANTS: &[(&str, &str, &str, f32)] = &[
    ("diabetic", "Type 2 Diabetes Mellitus", "E11.9", 0.9),
    ("hypertensive", "Essential Hypertension", "I10", 0.9),
    ("infected", "Bacterial Infection", "A49.9", 0.8),
    ("inflammatory", "Inflammatory Disorder", "M79.9", 0.7),
    ("cardiac", "Cardiovascular Disease", "I51.9", 0.7),
    ("respiratory", "Respiratory Tract Disorder", "J98.9", 0.7),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_has_three_entries() {
        let map = PatternMap::builtin().unwrap();
        assert_eq!(map.len(), 3);

        let keywords: Vec<&str> = map.entries().iter().map(|e| e.keyword.as_str()).collect();
        assert!(keywords.contains(&"diabetes"));
        assert!(keywords.contains(&"hypertension"));
        assert!(keywords.contains(&"infection"));
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let map = PatternMap::load(Path::new("/nonexistent/icd10_keywords.json")).unwrap();
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn load_parses_mapping_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"dengue": {{"conditions": ["Dengue Fever"], "icd10": "A90",
                 "patterns": ["dengue fever", "breakbone fever"]}}}}"#
        )
        .unwrap();

        let map = PatternMap::load(file.path()).unwrap();
        assert_eq!(map.len(), 1);

        let entry = &map.entries()[0];
        assert_eq!(entry.keyword, "dengue");
        assert_eq!(entry.icd10, "A90");
        // keyword + 2 extra patterns
        assert_eq!(entry.triggers.len(), 3);
    }

    #[test]
    fn malformed_file_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json at all").unwrap();

        assert!(matches!(PatternMap::load(file.path()), Err(PatternError::Parse(_))));
    }

    #[test]
    fn word_boundary_rejects_embedded_match() {
        let re = word_boundary_regex("diabetes").unwrap();
        assert!(re.is_match("treats diabetes in adults"));
        assert!(!re.is_match("prediabetesx screening"));
    }

    #[test]
    fn word_boundary_matches_at_edges() {
        let re = word_boundary_regex("fever").unwrap();
        assert!(re.is_match("fever"));
        assert!(re.is_match("dengue fever."));
        assert!(!re.is_match("feverish"));
    }
}
