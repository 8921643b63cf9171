//! Error types for the Gemini client.

use thiserror::Error;

/// Result type for Gemini client operations.
pub type Result<T> = std::result::Result<T, GeminiError>;

/// Gemini client errors.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (request never completed)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-retryable API error (4xx other than 429)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Rate limiting or server-side failure (429, 5xx)
    #[error("Upstream unavailable ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// 2xx response without answer text at `candidates[0].content.parts[0].text`
    #[error("Response did not contain answer text")]
    MissingText,

    /// 2xx response whose body is not a valid generateContent response
    #[error("Parse error: {0}")]
    Parse(String),

    /// Every attempt failed with a retryable error
    #[error("Analysis failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<GeminiError>,
    },

    /// The caller's cancellation token fired
    #[error("Request cancelled")]
    Cancelled,
}

impl GeminiError {
    /// Whether the retry loop should try again after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GeminiError::Network(_)
                | GeminiError::Upstream { .. }
                | GeminiError::MissingText
                | GeminiError::Parse(_)
        )
    }
}
