//! Collaborator trait definitions.
//!
//! Storage is implemented by `quizgate-store`, insight generation by
//! `quizgate-insights`. The core only ever talks to these traits.

use std::collections::BTreeSet;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{AttemptResult, QuizSet};

// ---------------------------------------------------------------------------
// Storage traits
// ---------------------------------------------------------------------------

/// Durable key-value store for quiz content.
pub trait QuizSetStore: Send + Sync {
    /// Fetch one set by id.
    fn get_set(&self, id: &str) -> Result<Option<QuizSet>>;

    /// All sets in insertion order.
    fn list_sets(&self) -> Result<Vec<QuizSet>>;

    /// Insert a new set or replace the one with the same id.
    fn save_set(&self, set: &QuizSet) -> Result<()>;

    /// Delete a set. Its attempts are orphaned, not removed.
    fn delete_set(&self, id: &str) -> Result<()>;
}

/// Append-only log of attempt records.
///
/// Ordering is insertion order. No uniqueness is enforced on
/// `(user, quiz_set_id, attempt_number)`; callers supply the number.
pub trait AttemptStore: Send + Sync {
    /// Append one record. Must be atomic with respect to other appends.
    fn append(&self, attempt: &AttemptResult) -> Result<()>;

    /// Every stored attempt.
    fn list_all(&self) -> Result<Vec<AttemptResult>>;

    /// Attempts for one quiz set.
    fn list_by_set(&self, quiz_set_id: &str) -> Result<Vec<AttemptResult>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|a| a.quiz_set_id == quiz_set_id)
            .collect())
    }

    /// Destroy every attempt for every set. Irreversible; callers confirm.
    fn clear_all(&self) -> Result<()>;
}

/// Global admin whitelist.
pub trait AdminStore: Send + Sync {
    /// Current admins, always including the root identity.
    fn list(&self) -> Result<BTreeSet<String>>;

    /// Add an admin. Adding an existing member is a no-op.
    fn add(&self, email: &str) -> Result<()>;

    /// Remove an admin. Removing the root identity is a no-op.
    fn remove(&self, email: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Insight generator trait
// ---------------------------------------------------------------------------

/// Trait for text-generation backends that summarize aggregated stats.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Human-readable backend name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Produce free text from a prompt. May be slow and may fail.
    async fn generate(&self, request: &InsightRequest) -> anyhow::Result<InsightResponse>;

    /// Models this backend offers.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Request to a text-generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightRequest {
    /// Model identifier (e.g. "gemini-2.5-flash").
    pub model: String,
    /// The full prompt.
    pub prompt: String,
    /// Optional system prompt override.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Response from a text-generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightResponse {
    /// Generated text.
    pub text: String,
    /// Model that actually answered.
    pub model: String,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
    /// Maximum context window size in tokens.
    pub max_context: u32,
}

/// Default system prompt for insight backends.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a senior English teacher analyzing student quiz performance. Be concise, encouraging and specific.";
