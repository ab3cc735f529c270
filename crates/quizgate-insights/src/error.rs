//! Insight backend error types.

use thiserror::Error;

/// Errors that can occur when calling a text-generation backend.
#[derive(Debug, Error)]
pub enum InsightError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl InsightError {
    /// Map a non-success HTTP status to an error. `retry_after_secs` is only
    /// read for 429 responses.
    pub(crate) fn from_status(
        status: u16,
        model: &str,
        body: String,
        retry_after_secs: Option<u64>,
    ) -> Self {
        match status {
            429 => InsightError::RateLimited {
                retry_after_ms: retry_after_secs.unwrap_or(5) * 1000,
            },
            401 | 403 => InsightError::AuthenticationFailed(body),
            404 => InsightError::ModelNotFound(model.to_string()),
            _ => InsightError::ApiError {
                status,
                message: body,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let limited = InsightError::from_status(429, "m", String::new(), Some(2));
        assert_eq!(limited.to_string(), "rate limited, retry after 2000ms");
        assert!(matches!(
            InsightError::from_status(403, "m", "denied".into(), None),
            InsightError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            InsightError::from_status(500, "m", "boom".into(), None),
            InsightError::ApiError { status: 500, .. }
        ));
    }
}
