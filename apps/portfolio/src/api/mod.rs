//! Portfolio backend API — the only way the core talks to the network.
//!
//! `PortfolioApi` is the seam: `HttpApi` is the production implementation, and
//! tests substitute scripted backends.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::models::{ContentPayload, Settings, Translations};

pub mod http;

pub use http::HttpApi;

pub const SETTINGS_PATH: &str = "/api/settings/";
pub const TRANSLATIONS_PATH: &str = "/api/translations/";
pub const RESUME_PATH: &str = "/api/resume/";
pub const CHAT_PATH: &str = "/api/ai/chat/";
pub const CSRF_PATH: &str = "/api/csrf/";

/// Role labels understood by the assistant endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Model,
}

/// One prior turn as sent in `chat_history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: HistoryRole,
    pub parts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub chat_history: Vec<HistoryEntry>,
    pub session_id: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub session_id: String,
}

/// Failure body shared by the backend endpoints: `{ "error": "..." }`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

#[async_trait]
pub trait PortfolioApi: Send + Sync {
    async fn fetch_settings(&self) -> Result<Settings, ApiError>;

    async fn fetch_translations(&self, language: &str) -> Result<Translations, ApiError>;

    async fn fetch_content(&self, language: &str) -> Result<ContentPayload, ApiError>;

    /// Submits one chat turn. A `"No API key"` error body maps to
    /// `ApiError::MissingCredential`.
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError>;
}
