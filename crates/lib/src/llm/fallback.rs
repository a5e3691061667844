//! Model fallback chain for the conversational path.
//!
//! Candidates are tried strictly one at a time in priority order. Any failure (error status,
//! transport error, or a response without reply text) moves on to the next candidate; the same
//! candidate is never retried. Exhausting the list is a normal outcome with a fixed reply.

use std::sync::Arc;

use crate::config::ModelCandidate;
use crate::llm::chat_completions::LanguageModelAdapter;

/// Reply when no language-model token is configured.
pub const NOT_CONNECTED_REPLY: &str = "Bot ini belum terhubung dengan AI. Silakan hubungi admin.";

/// Reply when every candidate failed.
pub const ALL_MODELS_FAILED_REPLY: &str =
    "Maaf, semua model AI gagal merespons. Silakan coba lagi nanti.";

pub struct FallbackChain {
    backend: Arc<dyn LanguageModelAdapter>,
    /// Sorted by priority once at construction; ties keep configured order.
    models: Vec<ModelCandidate>,
    system_prompt: String,
}

impl FallbackChain {
    pub fn new(
        backend: Arc<dyn LanguageModelAdapter>,
        mut models: Vec<ModelCandidate>,
        system_prompt: impl Into<String>,
    ) -> Self {
        models.sort_by_key(|m| m.priority);
        Self {
            backend,
            models,
            system_prompt: system_prompt.into(),
        }
    }

    /// Model ids in the order they will be tried.
    pub fn model_order(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.id.as_str()).collect()
    }

    /// Return the first successful model reply, or a fixed apology. Never fails.
    pub async fn run(&self, input: &str) -> String {
        if !self.backend.is_configured() {
            log::error!("llm: no token configured, conversational replies disabled");
            return NOT_CONNECTED_REPLY.to_string();
        }
        for candidate in &self.models {
            log::info!("llm: trying model {}", candidate.id);
            match self
                .backend
                .complete(&self.system_prompt, input, &candidate.id)
                .await
            {
                Ok(res) => match res.reply_text() {
                    Some(text) => {
                        log::info!("llm: model {} replied", candidate.id);
                        return text.to_string();
                    }
                    None => {
                        log::warn!("llm: model {} returned no reply text", candidate.id);
                    }
                },
                Err(e) => {
                    log::warn!("llm: model {} failed: {}", candidate.id, e);
                }
            }
        }
        log::error!("llm: all {} model(s) failed", self.models.len());
        ALL_MODELS_FAILED_REPLY.to_string()
    }
}
