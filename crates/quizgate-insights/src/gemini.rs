//! Google Gemini `generateContent` backend.

use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizgate_core::traits::{
    InsightGenerator, InsightRequest, InsightResponse, ModelInfo, DEFAULT_SYSTEM_PROMPT,
};

use crate::error::InsightError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Model used when nothing else is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Gemini API backend.
pub struct GeminiGenerator {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiGenerator {
    pub fn new(api_key: &str, base_url: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    status: String,
}

impl ErrorBody {
    // Gemini reports a bad key as 400 INVALID_ARGUMENT.
    fn is_auth_failure(&self) -> bool {
        self.status == "UNAUTHENTICATED" || self.message.contains("API key not valid")
    }
}

#[async_trait]
impl InsightGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: &InsightRequest) -> anyhow::Result<InsightResponse> {
        let start = Instant::now();

        let system = request
            .system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT);
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: system }],
            },
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, request.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InsightError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    InsightError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(env) if env.error.is_auth_failure() => {
                    return Err(InsightError::AuthenticationFailed(env.error.message).into());
                }
                Ok(env) => env.error.message,
                Err(_) => body,
            };
            let error = InsightError::from_status(status, &request.model, message, retry_after);
            return Err(error.into());
        }

        let api_response: GenerateContentResponse =
            response.json().await.map_err(|e| InsightError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        let text = api_response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect::<Vec<_>>().join(""))
            .unwrap_or_default();

        Ok(InsightResponse {
            text,
            model: api_response
                .model_version
                .unwrap_or_else(|| request.model.clone()),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: DEFAULT_GEMINI_MODEL.into(),
                name: "Gemini 2.5 Flash".into(),
                provider: "gemini".into(),
                max_context: 1_048_576,
            },
            ModelInfo {
                id: "gemini-2.5-pro".into(),
                name: "Gemini 2.5 Pro".into(),
                provider: "gemini".into(),
                max_context: 1_048_576,
            },
        ]
    }
}
