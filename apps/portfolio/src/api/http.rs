use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::{
    ChatReply, ChatRequest, ErrorBody, PortfolioApi, CHAT_PATH, CSRF_PATH, RESUME_PATH,
    SETTINGS_PATH, TRANSLATIONS_PATH,
};
use crate::errors::{ApiError, NO_API_KEY};
use crate::models::{ContentPayload, Settings, Translations};

const CSRF_COOKIE: &str = "csrftoken";
const CSRF_HEADER: &str = "X-CSRFToken";

/// reqwest-backed client for the portfolio backend.
///
/// Holds one cookie jar for the whole page lifetime so the CSRF cookie set by
/// `GET /api/csrf/` is replayed on later requests.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    jar: Arc<Jar>,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;

        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        Ok(Self {
            client,
            jar,
            base_url,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let full = format!("{}{}", self.base_url, path);
        Url::parse(&full).map_err(|e| ApiError::InvalidUrl(format!("{full}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        language: Option<&str>,
    ) -> Result<T, ApiError> {
        let mut request = self.client.get(self.url(path)?);
        if let Some(lang) = language {
            request = request.query(&[("lang", lang)]);
        }

        let response = check_status(request.send().await?).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// The CSRF token currently held in the cookie jar, if any.
    pub fn csrf_token(&self) -> Option<String> {
        let url = self.url("/").ok()?;
        let header = self.jar.cookies(&url)?;
        let cookies = header.to_str().ok()?;
        cookies
            .split(';')
            .map(str::trim)
            .find_map(|pair| pair.strip_prefix(CSRF_COOKIE)?.strip_prefix('='))
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }

    /// Asks the backend to set the CSRF cookie. Failure is tolerated: the chat
    /// request then goes out without the header.
    pub async fn establish_csrf(&self) {
        let url = match self.url(CSRF_PATH) {
            Ok(url) => url,
            Err(e) => {
                warn!("Skipping CSRF setup: {e}");
                return;
            }
        };
        match self.client.get(url).send().await {
            Ok(response) => debug!("CSRF endpoint returned {}", response.status()),
            Err(e) => warn!("Failed to fetch CSRF token: {e}"),
        }
    }
}

#[async_trait]
impl PortfolioApi for HttpApi {
    async fn fetch_settings(&self) -> Result<Settings, ApiError> {
        self.get_json(SETTINGS_PATH, None).await
    }

    async fn fetch_translations(&self, language: &str) -> Result<Translations, ApiError> {
        self.get_json(TRANSLATIONS_PATH, Some(language)).await
    }

    async fn fetch_content(&self, language: &str) -> Result<ContentPayload, ApiError> {
        self.get_json(RESUME_PATH, Some(language)).await
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        if self.csrf_token().is_none() {
            self.establish_csrf().await;
        }

        let mut builder = self.client.post(self.url(CHAT_PATH)?).json(request);
        if let Some(token) = self.csrf_token() {
            builder = builder.header(CSRF_HEADER, token);
        }

        let response = check_status(builder.send().await?).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Converts a non-success response into `ApiError`, reading the `{ "error": ... }`
/// body when the backend sent one.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.error)
        .unwrap_or_else(|_| {
            if body.is_empty() {
                status.to_string()
            } else {
                body
            }
        });

    if message == NO_API_KEY {
        return Err(ApiError::MissingCredential);
    }

    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}
