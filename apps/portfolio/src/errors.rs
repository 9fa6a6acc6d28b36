use thiserror::Error;

/// Error body value the chat endpoint uses when no model credential is configured.
pub const NO_API_KEY: &str = "No API key";

/// Failure talking to the portfolio backend.
/// Every remote call in the crate returns `Result<T, ApiError>`; the orchestrator
/// and chat session convert these into typed outcomes instead of propagating them.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error("Assistant backend has no API key configured")]
    MissingCredential,
}

impl ApiError {
    /// True for the credential-missing condition the chat widget renders differently.
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, ApiError::MissingCredential)
    }
}

/// Outcomes of the synchronization core that a caller must check before rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("Content for language '{language}' is unavailable: {reason}")]
    ContentUnavailable { language: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),
}
