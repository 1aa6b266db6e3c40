//! Guideline generation: LLM collaborator plus reply parsing.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::prompt::{build_guideline_prompt, GUIDELINE_SYSTEM_PROMPT};
use super::types::RetrievedChunk;
use super::RagError;
use crate::models::{Condition, PatientGuideline};

/// LLM text generation abstraction.
pub trait LlmGenerate {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, RagError>;
}

/// Ollama HTTP client for local LLM inference.
pub struct OllamaGenerator {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaGenerator {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl LlmGenerate for OllamaGenerator {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, RagError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                RagError::Generation(format!("cannot reach Ollama at {}", self.base_url))
            } else if e.is_timeout() {
                RagError::Generation(format!("request timed out after {}s", self.timeout_secs))
            } else {
                RagError::Generation(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RagError::Generation(format!("Ollama returned {status}: {body}")));
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| RagError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }
}

/// Turns conditions + retrieved chunks into a `PatientGuideline`.
pub struct GuidelineGenerator<'a> {
    llm: &'a dyn LlmGenerate,
}

impl<'a> GuidelineGenerator<'a> {
    pub fn new(llm: &'a dyn LlmGenerate) -> Self {
        Self { llm }
    }

    pub fn generate(
        &self,
        conditions: &[Condition],
        chunks: &[RetrievedChunk],
    ) -> Result<PatientGuideline, RagError> {
        let prompt = build_guideline_prompt(conditions, chunks);
        let reply = self.llm.generate(GUIDELINE_SYSTEM_PROMPT, &prompt)?;

        let (dos, donts) = parse_dos_donts(&reply);

        Ok(PatientGuideline {
            summary: reply.lines().find(|l| !l.trim().is_empty()).unwrap_or("").to_string(),
            dos,
            donts,
            references: reference_lines(chunks),
        })
    }
}

/// Extract `- Do: ...` / `- Don't: ...` bullet lines from the model reply.
fn parse_dos_donts(reply: &str) -> (Vec<String>, Vec<String>) {
    // Tolerates ASCII and typographic apostrophes.
    let do_re = Regex::new(r"(?im)^\s*-\s*Do:\s*(.+)$").expect("static regex");
    let dont_re = Regex::new(r"(?im)^\s*-\s*Don(?:’|')?t:\s*(.+)$").expect("static regex");

    let dos = do_re
        .captures_iter(reply)
        .map(|cap| cap[1].trim().to_string())
        .collect();
    let donts = dont_re
        .captures_iter(reply)
        .map(|cap| cap[1].trim().to_string())
        .collect();

    (dos, donts)
}

/// One reference line per distinct source file, input order preserved.
fn reference_lines(chunks: &[RetrievedChunk]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    chunks
        .iter()
        .filter(|c| seen.insert(c.source_file.clone()))
        .map(|c| format!("WHO {}", c.source_file))
        .collect()
}
