//! Prompt construction for the guideline generation step.

use crate::models::Condition;

use super::types::RetrievedChunk;

/// System prompt for the patient-facing guideline generator.
pub const GUIDELINE_SYSTEM_PROMPT: &str = "\
You are a friendly Bangladeshi doctor.
Explain the condition in 200 words or less, using bullet points for Do's and Don'ts.
Speak in 6th-grade English. Include 1 simple reference line at the end.
Format every Do as '- Do: ...' and every Don't as '- Don't: ...'.";

/// Build the generation prompt from retrieved context and condition names.
pub fn build_guideline_prompt(conditions: &[Condition], chunks: &[RetrievedChunk]) -> String {
    let context = chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let condition_names = conditions
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!("Context:\n{context}\n\nCondition: {condition_names}\nAnswer:")
}
