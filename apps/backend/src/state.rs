use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::llm_client::{CompletionProvider, EmbeddingProvider};
use crate::matching::analyzer::Analyzer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Completion backend. Default: Gemini `generateContent`.
    pub llm: Arc<dyn CompletionProvider>,
    /// Embedding backend. Default: Gemini `embedContent`.
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub config: Config,
}

impl AppState {
    pub fn analyzer(&self) -> Analyzer<'_> {
        Analyzer::new(self.llm.as_ref(), self.embedder.as_ref())
    }
}
