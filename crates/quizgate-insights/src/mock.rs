//! Deterministic backend for tests and offline use.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizgate_core::traits::{InsightGenerator, InsightRequest, InsightResponse, ModelInfo};

/// Returns a fixed text without any network access.
pub struct MockGenerator {
    response: String,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<InsightRequest>>,
}

impl MockGenerator {
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            response: response.to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_request(&self) -> Option<InsightRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::with_fixed_response(
            "Most errors cluster around verb tense. Review past continuous with timeline drills.",
        )
    }
}

#[async_trait]
impl InsightGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &InsightRequest) -> anyhow::Result<InsightResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(request.clone());

        Ok(InsightResponse {
            text: self.response.clone(),
            model: request.model.clone(),
            latency_ms: 0,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizgate_core::statistics::AdminQuestionStats;
    use quizgate_core::summary::{summarize, SummaryOptions};

    fn stats() -> Vec<AdminQuestionStats> {
        vec![AdminQuestionStats {
            question_id: "q3".into(),
            question_text: "The meeting was _____ due to the storm.".into(),
            original_index: 3,
            area: "Vocabulary".into(),
            error_count: 2,
            total_attempts: 5,
            wrong_options: vec![],
        }]
    }

    #[tokio::test]
    async fn fixed_response() {
        let generator = MockGenerator::with_fixed_response("Review synonyms.");
        let options = SummaryOptions {
            model: "mock-model".into(),
            max_tokens: 256,
            temperature: 0.0,
        };

        let text = summarize(&generator, &stats(), &options).await;
        assert_eq!(text, "Review synonyms.");
        assert_eq!(generator.call_count(), 1);

        let request = generator.last_request().unwrap();
        assert!(request.prompt.contains("40.0%"));
        assert!(request.prompt.contains("Vocabulary"));
    }
}
