//! quizgate-insights — Text-generation backends for analytics summaries.
//!
//! Implements the `InsightGenerator` trait for Anthropic and Gemini, plus a
//! deterministic mock, and loads the `quizgate.toml` configuration that
//! selects between them.

pub mod anthropic;
pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;

pub use config::{create_generator, load_config, load_config_from, ProviderConfig, QuizgateConfig};
pub use error::InsightError;
