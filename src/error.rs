//! Counsel error types

use std::time::Duration;

use thiserror::Error;

/// Errors raised by a language model backend
#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the provider
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The call did not finish within the configured bound
    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),

    /// Retries exhausted with the provider still answering 429
    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    /// Provider answered without any text
    #[error("Model returned empty content")]
    EmptyContent,

    /// Provider payload could not be decoded
    #[error("Response decode error: {0}")]
    Decode(String),

    /// Backend was not configured
    #[error("Model backend unavailable: {0}")]
    Unavailable(String),
}

/// Model output could not be coerced into a JSON object.
///
/// Carries every attempt's error so the failure can be diagnosed from a
/// single log line. Raised instead of substituting any default output.
#[derive(Debug, Clone, Error, PartialEq)]
#[error(
    "Failed to parse model response. JSON error: {json_error}. \
     Parser error: {structured_error}. Content preview: {preview}"
)]
pub struct ParseError {
    /// Error from the direct parse of the fence-stripped text
    pub json_error: String,
    /// Error from the parse after comment and trailing-comma removal
    pub repair_error: Option<String>,
    /// Error from the schema-constrained object extraction
    pub structured_error: String,
    /// Leading slice of the offending content
    pub preview: String,
    /// Length of the fence-stripped content in characters
    pub content_len: usize,
}

/// Failure inside a single agent run
#[derive(Debug, Error)]
pub enum AgentError {
    /// Required inputs absent or empty
    #[error("Missing required inputs: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Model call failed
    #[error("Processing error: {0}")]
    Model(#[from] LlmError),

    /// Model answered with unparseable text
    #[error("Processing error: {0}")]
    Parse(#[from] ParseError),
}

impl AgentError {
    /// Short tag recorded in failed result metadata
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::Validation(_) => "validation",
            AgentError::Model(_) => "model",
            AgentError::Parse(_) => "parse",
        }
    }
}

/// Session store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session store backend error: {0}")]
    Backend(String),

    #[error("Session payload error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Top-level errors surfaced by the orchestrator
#[derive(Debug, Error)]
pub enum CounselError {
    #[error("No vertical selected. Please choose from: school_students, college_upskilling, career_transition")]
    NoVertical,

    /// Vertical-level required fields absent
    #[error("Missing required data for {vertical}: {}", .fields.join(", "))]
    MissingData { vertical: String, fields: Vec<String> },

    #[error("Session not found. Please start a new counseling session.")]
    SessionNotFound(String),

    #[error("Follow-up questions are not yet supported (session {0})")]
    FollowUpUnsupported(String),

    /// Vertical name not recognised
    #[error("Invalid vertical: {0}")]
    UnknownVertical(String),

    /// Vertical is known but has no fleet
    #[error("Agent fleet not available for vertical: {0}")]
    FleetUnavailable(String),

    /// Session store failed
    #[error("Session store error: {0}")]
    SessionStore(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_fields() {
        let err = AgentError::Validation(vec!["dbda_scores".into(), "cii_results".into()]);
        assert_eq!(
            err.to_string(),
            "Missing required inputs: dbda_scores, cii_results"
        );
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_parse_error_mentions_both_attempts() {
        let err = ParseError {
            json_error: "expected `,` at line 1".into(),
            repair_error: None,
            structured_error: "no complete JSON object found".into(),
            preview: "{\"a\": oops".into(),
            content_len: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("expected `,` at line 1"));
        assert!(msg.contains("no complete JSON object found"));
        assert!(msg.contains("oops"));
    }

    #[test]
    fn test_timeout_kind() {
        let err: AgentError = LlmError::Timeout(Duration::from_secs(3)).into();
        assert_eq!(err.kind(), "model");
        assert!(err.to_string().contains("timed out"));
    }
}
