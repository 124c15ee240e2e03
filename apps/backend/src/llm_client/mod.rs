//! LLM client: the single point of entry for all Gemini API calls.
//!
//! No other module may call the provider directly. Handlers and services work
//! against the `CompletionProvider` / `EmbeddingProvider` traits, so tests can
//! substitute deterministic stubs.
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::Config;

pub mod gemini;
pub mod prompts;

pub use gemini::{GeminiEmbeddingProvider, GeminiProvider, GenerationOptions};

/// Dimension of `text-embedding-004` vectors.
pub const EMBEDDING_DIMENSION: usize = 768;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Gemini API key is missing")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No response from Gemini API")]
    EmptyContent,

    #[error("Invalid embedding response from Gemini")]
    InvalidEmbedding,

    #[error("Unsupported LLM provider: {0}")]
    UnsupportedProvider(String),
}

/// Text completion: one prompt in, one block of text out.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier, for logging and transparency in responses.
    fn model(&self) -> &str;
}

/// Text embedding: one text in, one fixed-length vector out.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError>;

    fn model(&self) -> &str;
}

/// Calls the provider and deserializes the text response as JSON.
/// The prompt must instruct the model to return valid JSON.
pub async fn complete_json<T: DeserializeOwned>(
    provider: &dyn CompletionProvider,
    prompt: &str,
) -> Result<T, LlmError> {
    let text = provider.complete(prompt).await?;
    if text.trim().is_empty() {
        return Err(LlmError::EmptyContent);
    }

    // Strip markdown code fences if the model wraps JSON in them
    let text = strip_json_fences(&text);

    serde_json::from_str(text).map_err(LlmError::Parse)
}

/// Builds the completion and embedding providers selected by `LLM_PROVIDER`.
pub fn build_providers(
    config: &Config,
) -> Result<(Arc<dyn CompletionProvider>, Arc<dyn EmbeddingProvider>), LlmError> {
    match config.llm_provider.as_str() {
        "gemini" => {
            let llm = GeminiProvider::from_config(config)?;
            let embedder = GeminiEmbeddingProvider::from_config(config)?;
            Ok((Arc::new(llm), Arc::new(embedder)))
        }
        other => Err(LlmError::UnsupportedProvider(other.to_string())),
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
