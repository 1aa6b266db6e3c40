//! Markdown rendering of a patient guideline.

use crate::models::PatientGuideline;

/// Render a `PatientGuideline` as plain-language markdown.
/// Sections with no items are omitted.
pub fn to_markdown(guideline: &PatientGuideline) -> String {
    let mut lines: Vec<String> = vec![format!("### 🏥 {}", guideline.summary), String::new()];

    if !guideline.dos.is_empty() {
        lines.push("**✅ Do:**".to_string());
        lines.extend(guideline.dos.iter().map(|d| format!("- {d}")));
        lines.push(String::new());
    }

    if !guideline.donts.is_empty() {
        lines.push("**❌ Don’t:**".to_string());
        lines.extend(guideline.donts.iter().map(|d| format!("- {d}")));
        lines.push(String::new());
    }

    if !guideline.references.is_empty() {
        lines.push("**📚 References:**".to_string());
        lines.extend(guideline.references.iter().map(|r| format!("- {r}")));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_sections() {
        let guideline = PatientGuideline {
            summary: "Dengue needs rest and fluids.".to_string(),
            dos: vec!["Drink fluids.".to_string()],
            donts: vec!["Take aspirin.".to_string()],
            references: vec!["WHO who_dengue.pdf".to_string()],
        };

        let md = to_markdown(&guideline);

        assert!(md.starts_with("### 🏥 Dengue needs rest and fluids."));
        assert!(md.contains("**✅ Do:**\n- Drink fluids."));
        assert!(md.contains("**❌ Don’t:**\n- Take aspirin."));
        assert!(md.contains("**📚 References:**\n- WHO who_dengue.pdf"));
    }

    #[test]
    fn omits_empty_sections() {
        let guideline = PatientGuideline {
            summary: "Short note.".to_string(),
            dos: vec![],
            donts: vec![],
            references: vec![],
        };

        let md = to_markdown(&guideline);

        assert!(!md.contains("Do:"));
        assert!(!md.contains("Don’t:"));
        assert!(!md.contains("References:"));
    }
}
