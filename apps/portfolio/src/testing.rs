//! Scripted in-memory backend for unit tests.
//!
//! Every fetch can be held behind a named gate (`settings`, `translations:<code>`,
//! `content:<code>`, `chat`) so tests decide the order in which responses arrive.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::api::{ChatReply, ChatRequest, PortfolioApi};
use crate::errors::ApiError;
use crate::models::{ContentPayload, Settings, SiteLanguage, Translations};

#[derive(Default)]
pub(crate) struct FakeApi {
    settings: Mutex<Option<Settings>>,
    translations: Mutex<HashMap<String, Translations>>,
    content: Mutex<HashMap<String, ContentPayload>>,
    chat_replies: Mutex<VecDeque<Result<ChatReply, ApiError>>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    calls: Mutex<Vec<String>>,
    chat_requests: Mutex<Vec<ChatRequest>>,
}

impl FakeApi {
    /// Backend whose settings publish the given languages, each with a
    /// dictionary and a payload tagged by its language code.
    pub fn with_languages(codes: &[&str]) -> Self {
        let api = Self::default();
        let settings = Settings {
            site_languages: codes
                .iter()
                .map(|code| SiteLanguage {
                    code: code.to_string(),
                    name: code.to_uppercase(),
                    flag: String::new(),
                })
                .collect(),
            ..Default::default()
        };
        *api.settings.lock().unwrap() = Some(settings);
        for code in codes {
            api.add_language(code);
        }
        api
    }

    pub fn add_language(&self, code: &str) {
        self.translations
            .lock()
            .unwrap()
            .insert(code.to_string(), translations_for(code));
        self.content
            .lock()
            .unwrap()
            .insert(code.to_string(), content_for(code));
    }

    pub fn set_settings(&self, settings: Option<Settings>) {
        *self.settings.lock().unwrap() = settings;
    }

    pub fn remove_content(&self, code: &str) {
        self.content.lock().unwrap().remove(code);
    }

    pub fn remove_translations(&self, code: &str) {
        self.translations.lock().unwrap().remove(code);
    }

    pub fn push_chat_reply(&self, reply: Result<ChatReply, ApiError>) {
        self.chat_replies.lock().unwrap().push_back(reply);
    }

    pub fn hold(&self, gate: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(gate.to_string(), Arc::new(Semaphore::new(0)));
    }

    pub fn hold_language(&self, code: &str) {
        self.hold(&format!("translations:{code}"));
        self.hold(&format!("content:{code}"));
    }

    pub fn release(&self, gate: &str) {
        if let Some(sem) = self.gates.lock().unwrap().get(gate) {
            sem.add_permits(1);
        }
    }

    pub fn release_language(&self, code: &str) {
        self.release(&format!("translations:{code}"));
        self.release(&format!("content:{code}"));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().unwrap().clone()
    }

    async fn pass(&self, gate: &str) {
        self.calls.lock().unwrap().push(gate.to_string());
        let sem = self.gates.lock().unwrap().get(gate).cloned();
        if let Some(sem) = sem {
            // permits return on drop, so one release lets every waiter through
            let _permit = sem.acquire().await;
        }
    }
}

fn unavailable(what: &str) -> ApiError {
    ApiError::Status {
        status: 500,
        message: format!("{what} unavailable"),
    }
}

pub(crate) fn translations_for(code: &str) -> Translations {
    [
        ("about", format!("about[{code}]")),
        ("aiChatWelcome", format!("[{code}] Hi, I am the assistant of {{name}}.")),
        ("aiChatError", format!("[{code}] Something went wrong.")),
        ("aiChatNoApiKey", format!("[{code}] The assistant is not configured.")),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

pub(crate) fn content_for(code: &str) -> ContentPayload {
    ContentPayload {
        firstname: [("en", "Ada"), ("ru", "Ада")].into_iter().collect(),
        lastname: [("en", "Lovelace"), ("ru", "Лавлейс")].into_iter().collect(),
        resume_title: [(code, format!("title[{code}]"))].into_iter().collect(),
        ..Default::default()
    }
}

#[async_trait]
impl PortfolioApi for FakeApi {
    async fn fetch_settings(&self) -> Result<Settings, ApiError> {
        self.pass("settings").await;
        self.settings
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| unavailable("settings"))
    }

    async fn fetch_translations(&self, language: &str) -> Result<Translations, ApiError> {
        self.pass(&format!("translations:{language}")).await;
        self.translations
            .lock()
            .unwrap()
            .get(language)
            .cloned()
            .ok_or_else(|| unavailable("translations"))
    }

    async fn fetch_content(&self, language: &str) -> Result<ContentPayload, ApiError> {
        self.pass(&format!("content:{language}")).await;
        self.content
            .lock()
            .unwrap()
            .get(language)
            .cloned()
            .ok_or_else(|| unavailable("content"))
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.chat_requests.lock().unwrap().push(request.clone());
        self.pass("chat").await;
        let scripted = self.chat_replies.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(ChatReply {
                response: format!("echo: {}", request.message),
                session_id: request.session_id.clone(),
            })
        })
    }
}
