use anyhow::{bail, Context, Result};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_LLM_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://resume_matcher.db?mode=rwc";

/// Application configuration loaded from environment variables.
///
/// API keys are optional here: a missing key is reported when the provider
/// is constructed, so the `setup` binary can still load a partial config.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_provider: String,
    pub gemini_api_key: Option<String>,
    pub embedding_api_key: Option<String>,
    pub llm_model: String,
    pub embedding_model: String,
    pub gemini_base_url: String,
    pub llm_timeout_secs: u64,
    pub database_url: String,
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let llm_provider = get("LLM_PROVIDER")
            .unwrap_or_else(|| "gemini".to_string())
            .to_lowercase();
        if llm_provider != "gemini" {
            bail!("Unsupported LLM_PROVIDER '{llm_provider}' (only 'gemini' is supported)");
        }

        let gemini_api_key = get("GEMINI_API_KEY").or_else(|| get("LLM_API_KEY"));
        let embedding_api_key = get("EMBEDDING_API_KEY").or_else(|| gemini_api_key.clone());

        Ok(Config {
            llm_provider,
            gemini_api_key,
            embedding_api_key,
            llm_model: get("LL_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            embedding_model: normalize_embedding_model(
                get("EMBEDDING_MODEL").as_deref().unwrap_or(DEFAULT_EMBEDDING_MODEL),
            ),
            gemini_base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            llm_timeout_secs: get("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|| "30".to_string())
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            allowed_origins: get("ALLOWED_ORIGINS")
                .unwrap_or_else(|| "http://localhost:3000,http://localhost:3001".to_string())
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            max_upload_bytes: get("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|| "2097152".to_string())
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            port: get("PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Gemini model ids are addressed without the `models/` resource prefix in URLs.
pub fn normalize_embedding_model(model: &str) -> String {
    let model = model.trim();
    model.strip_prefix("models/").unwrap_or(model).to_string()
}
