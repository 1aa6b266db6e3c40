use serde::{Deserialize, Serialize};

/// One catalog record for a marketed drug product.
///
/// Only `brand_name` is required; every other field is free text that may be
/// absent in the source data. Absence is `None` — never an empty string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugEntry {
    pub brand_name: String,
    pub generic_name: Option<String>,
    pub indications: Option<String>,
    pub dosage_and_administration: Option<String>,
    pub side_effects: Option<String>,
    pub pregnancy_and_lactation: Option<String>,
    pub precautions_and_warnings: Option<String>,
    pub overdose_effects: Option<String>,
    pub dosage_form: Option<String>,
    pub strength: Option<String>,
    pub unit_price: Option<String>,
}

impl DrugEntry {
    /// Minimal entry with just a brand name. Used by tests and fixtures.
    pub fn named(brand_name: &str) -> Self {
        Self {
            brand_name: brand_name.to_string(),
            generic_name: None,
            indications: None,
            dosage_and_administration: None,
            side_effects: None,
            pregnancy_and_lactation: None,
            precautions_and_warnings: None,
            overdose_effects: None,
            dosage_form: None,
            strength: None,
            unit_price: None,
        }
    }
}
