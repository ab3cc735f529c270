//! Natural-language summaries of question stats.
//!
//! The generator call is best-effort: every failure turns into a fixed
//! message and nothing is propagated to the analytics view.

use serde::Serialize;

use crate::statistics::AdminQuestionStats;
use crate::traits::{InsightGenerator, InsightRequest, DEFAULT_SYSTEM_PROMPT};

/// Returned without calling the generator when no question has errors.
pub const NO_ERRORS_MESSAGE: &str =
    "No significant errors detected yet. Great job to the students!";

/// Returned when the generator answers with empty text.
pub const EMPTY_INSIGHT_MESSAGE: &str = "Could not generate insights.";

/// Returned when the generator call fails.
pub const UNAVAILABLE_MESSAGE: &str =
    "Unable to connect to AI service for insights. Please check API key configuration.";

#[derive(Debug, Serialize)]
struct ProblemQuestion<'a> {
    question: &'a str,
    area: &'a str,
    #[serde(rename = "errorRate")]
    error_rate: String,
}

/// Build the analysis prompt, or `None` if no question has errors.
pub fn build_insight_prompt(stats: &[AdminQuestionStats]) -> Option<String> {
    let problems: Vec<ProblemQuestion<'_>> = stats
        .iter()
        .filter(|s| s.error_count > 0)
        .map(|s| ProblemQuestion {
            question: &s.question_text,
            area: &s.area,
            error_rate: format!("{:.1}%", s.error_rate_percent()),
        })
        .collect();

    if problems.is_empty() {
        return None;
    }

    let data = serde_json::to_string_pretty(&problems).unwrap_or_default();
    Some(format!(
        "Here is a list of questions where students made the most mistakes:\n\n\
         {data}\n\n\
         Please provide a concise, encouraging summary for the teacher.\n\
         1. Identify the common grammatical or vocabulary theme causing issues.\n\
         2. Suggest one teaching tip to help students improve in these specific areas.\n\
         3. Keep the tone professional but insightful.\n\
         4. Output in Markdown format.\n"
    ))
}

/// Generation settings passed through to the backend.
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// Summarize problem questions through `generator`. Never fails.
pub async fn summarize(
    generator: &dyn InsightGenerator,
    stats: &[AdminQuestionStats],
    options: &SummaryOptions,
) -> String {
    let Some(prompt) = build_insight_prompt(stats) else {
        return NO_ERRORS_MESSAGE.to_string();
    };

    let request = InsightRequest {
        model: options.model.clone(),
        prompt,
        system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
        max_tokens: options.max_tokens,
        temperature: options.temperature,
    };

    match generator.generate(&request).await {
        Ok(response) if response.text.trim().is_empty() => EMPTY_INSIGHT_MESSAGE.to_string(),
        Ok(response) => {
            tracing::debug!(
                provider = generator.name(),
                model = %response.model,
                latency_ms = response.latency_ms,
                "insights generated"
            );
            response.text
        }
        Err(e) => {
            tracing::warn!(provider = generator.name(), "insight generation failed: {e:#}");
            UNAVAILABLE_MESSAGE.to_string()
        }
    }
}
