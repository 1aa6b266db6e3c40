use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Nirog";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default log filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "info,nirog=debug".to_string()
}

/// Get the application data directory
/// ~/Nirog/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Nirog")
}

/// Runtime settings, resolved once at startup from environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Path to the drug catalog JSON (a list of drug records).
    pub catalog_path: PathBuf,
    /// Path to the ICD-10 keyword mapping JSON. Optional on disk — the
    /// extractor falls back to a built-in table when absent.
    pub pattern_map_path: PathBuf,
    /// Path the persistent vector index is saved to / loaded from.
    pub index_path: PathBuf,
    /// Base URL of the local Ollama instance.
    pub ollama_url: String,
    /// Ollama model used for query/chunk embeddings.
    pub embedding_model: String,
    /// Ollama model used for guideline generation.
    pub llm_model: String,
    /// Optional rerank endpoint (TEI-style `/rerank`). None disables reranking.
    pub rerank_url: Option<String>,
    /// Number of chunks the retriever returns.
    pub top_k: usize,
    /// HTTP timeout for collaborator calls, in seconds.
    pub http_timeout_secs: u64,
    /// Address the API server binds to.
    pub bind_addr: SocketAddr,
}

impl Settings {
    /// Resolve settings from `NIROG_*` environment variables with defaults
    /// rooted under the app data directory.
    pub fn from_env() -> Self {
        let data = app_data_dir();

        Self {
            catalog_path: env_path("NIROG_DRUG_DB", data.join("data/medex_data.json")),
            pattern_map_path: env_path(
                "NIROG_ICD10_MAP",
                data.join("data/mappings/icd10_keywords.json"),
            ),
            index_path: env_path("NIROG_INDEX", data.join("index/guidelines.json")),
            ollama_url: env_string("NIROG_OLLAMA_URL", "http://localhost:11434"),
            embedding_model: env_string("NIROG_EMBEDDING_MODEL", "nomic-embed-text"),
            llm_model: env_string("NIROG_LLM_MODEL", "medgemma"),
            rerank_url: std::env::var("NIROG_RERANK_URL").ok().filter(|v| !v.is_empty()),
            top_k: std::env::var("NIROG_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            http_timeout_secs: std::env::var("NIROG_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(120),
            bind_addr: std::env::var("NIROG_BIND_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8000))),
        }
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

fn env_path(key: &str, default: PathBuf) -> PathBuf {
    std::env::var(key).ok().filter(|v| !v.is_empty()).map(PathBuf::from).unwrap_or(default)
}
