//! Assistant chat session — one conversation per widget lifetime.
//!
//! The transcript always starts with a localized welcome turn. That turn is
//! presentation only and is never sent to the backend as context.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::{ChatRequest, HistoryEntry, HistoryRole, PortfolioApi};
use crate::i18n::{CHAT_ERROR_KEY, CHAT_NO_API_KEY_KEY, WELCOME_KEY};
use crate::sync::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl From<Role> for HistoryRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => HistoryRole::User,
            Role::Assistant => HistoryRole::Model,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl Turn {
    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            at: Utc::now(),
        }
    }
}

/// Language-dependent texts the session needs, resolved from a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatLocale {
    pub language: String,
    pub welcome: String,
    pub error_message: String,
    pub no_api_key_message: String,
}

impl ChatLocale {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let t = snapshot.translator();
        Self {
            language: snapshot.active_language().to_string(),
            welcome: fill_welcome(&t.t(WELCOME_KEY), &snapshot.profile_name()),
            error_message: t.t(CHAT_ERROR_KEY),
            no_api_key_message: t.t(CHAT_NO_API_KEY_KEY),
        }
    }
}

/// Replaces every `{name}` placeholder; an unknown name leaves it empty.
pub fn fill_welcome(template: &str, name: &str) -> String {
    template.replace("{name}", name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatFailure {
    /// Backend reported `"No API key"`.
    MissingCredential,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Busy,
    EmptyInput,
    NoSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Replied,
    /// A localized error turn was appended instead of a reply.
    Failed(ChatFailure),
    /// Nothing was appended and no request was made.
    Rejected(RejectReason),
    /// The transcript was reset while the request was in flight; the reply was dropped.
    Discarded,
}

struct ChatState {
    session_id: Option<String>,
    transcript: Vec<Turn>,
    sending: bool,
    /// Bumped on every open/reset; replies from an older epoch are dropped.
    epoch: u64,
    locale: ChatLocale,
}

/// Stateful conversation against the assistant endpoint.
/// Clones share the same conversation.
#[derive(Clone)]
pub struct ChatSession {
    api: Arc<dyn PortfolioApi>,
    state: Arc<Mutex<ChatState>>,
}

impl ChatSession {
    pub fn new(api: Arc<dyn PortfolioApi>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(ChatState {
                session_id: None,
                transcript: Vec::new(),
                sending: false,
                epoch: 0,
                locale: ChatLocale::default(),
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, ChatState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Starts a new conversation: fresh session id, transcript = welcome turn.
    pub fn open(&self, locale: ChatLocale) {
        let mut state = self.state();
        let session_id = Uuid::new_v4().to_string();
        debug!("Opened chat session {session_id}");
        state.session_id = Some(session_id);
        Self::restart(&mut state, locale);
    }

    /// Re-localizes the conversation: transcript = new welcome turn, same session id.
    pub fn reset(&self, locale: ChatLocale) {
        let mut state = self.state();
        Self::restart(&mut state, locale);
    }

    fn restart(state: &mut ChatState, locale: ChatLocale) {
        state.epoch += 1;
        state.transcript = vec![Turn::new(Role::Assistant, locale.welcome.clone())];
        state.locale = locale;
    }

    /// Resets when the snapshot's language or welcome text differs from the
    /// session's. Returns true if a reset happened.
    pub fn observe(&self, snapshot: &Snapshot) -> bool {
        let locale = ChatLocale::from_snapshot(snapshot);
        let mut state = self.state();
        if state.locale == locale {
            return false;
        }
        Self::restart(&mut state, locale);
        true
    }

    pub fn session_id(&self) -> Option<String> {
        self.state().session_id.clone()
    }

    pub fn transcript(&self) -> Vec<Turn> {
        self.state().transcript.clone()
    }

    pub fn is_sending(&self) -> bool {
        self.state().sending
    }

    /// Sends one user turn. The user turn is appended before the request goes out;
    /// the reply, or a localized error turn, is appended when it resolves.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        let (request, epoch) = {
            let mut state = self.state();
            if state.sending {
                return SendOutcome::Rejected(RejectReason::Busy);
            }
            if text.is_empty() {
                return SendOutcome::Rejected(RejectReason::EmptyInput);
            }
            let Some(session_id) = state.session_id.clone() else {
                return SendOutcome::Rejected(RejectReason::NoSession);
            };

            // transcript[0] is the welcome turn
            let chat_history = state
                .transcript
                .iter()
                .skip(1)
                .map(|turn| HistoryEntry {
                    role: turn.role.into(),
                    parts: vec![turn.text.clone()],
                })
                .collect();

            state.transcript.push(Turn::new(Role::User, text));
            state.sending = true;

            let request = ChatRequest {
                message: text.to_string(),
                chat_history,
                session_id,
                language: state.locale.language.clone(),
            };
            (request, state.epoch)
        };

        let result = self.api.send_chat(&request).await;

        let mut state = self.state();
        state.sending = false;
        if state.epoch != epoch {
            debug!("Dropping chat reply for a transcript that was reset");
            return SendOutcome::Discarded;
        }

        match result {
            Ok(reply) => {
                state.transcript.push(Turn::new(Role::Assistant, reply.response));
                SendOutcome::Replied
            }
            Err(e) => {
                warn!("Chat request failed: {e}");
                let (failure, message) = if e.is_missing_credential() {
                    (
                        ChatFailure::MissingCredential,
                        state.locale.no_api_key_message.clone(),
                    )
                } else {
                    (ChatFailure::General, state.locale.error_message.clone())
                };
                state.transcript.push(Turn::new(Role::Assistant, message));
                SendOutcome::Failed(failure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiError;
    use crate::preferences::MemoryPreferences;
    use crate::sync::SyncOrchestrator;
    use crate::testing::FakeApi;

    fn locale(language: &str) -> ChatLocale {
        ChatLocale {
            language: language.to_string(),
            welcome: format!("welcome[{language}]"),
            error_message: format!("error[{language}]"),
            no_api_key_message: format!("nokey[{language}]"),
        }
    }

    fn texts(session: &ChatSession) -> Vec<(Role, String)> {
        session
            .transcript()
            .into_iter()
            .map(|turn| (turn.role, turn.text))
            .collect()
    }

    fn open_session(api: &Arc<FakeApi>) -> ChatSession {
        let session = ChatSession::new(api.clone());
        session.open(locale("en"));
        session
    }

    #[test]
    fn test_fill_welcome_replaces_every_placeholder() {
        assert_eq!(fill_welcome("{name} / {name}", "Ada"), "Ada / Ada");
        assert_eq!(fill_welcome("Hi, {name}!", ""), "Hi, !");
    }

    #[test]
    fn test_open_seeds_welcome_turn_and_session_id() {
        let api = Arc::new(FakeApi::default());
        let session = open_session(&api);

        assert!(session.session_id().is_some());
        assert_eq!(texts(&session), vec![(Role::Assistant, "welcome[en]".to_string())]);

        let first_id = session.session_id();
        session.open(locale("en"));
        assert_ne!(session.session_id(), first_id);
    }

    #[tokio::test]
    async fn test_blank_input_is_rejected_without_side_effects() {
        let api = Arc::new(FakeApi::default());
        let session = open_session(&api);

        assert_eq!(
            session.send("").await,
            SendOutcome::Rejected(RejectReason::EmptyInput)
        );
        assert_eq!(
            session.send(" \t\n").await,
            SendOutcome::Rejected(RejectReason::EmptyInput)
        );
        assert_eq!(session.transcript().len(), 1);
        assert!(api.chat_requests().is_empty());
    }

    #[tokio::test]
    async fn test_send_requires_open_session() {
        let api = Arc::new(FakeApi::default());
        let session = ChatSession::new(api.clone());

        assert_eq!(
            session.send("hello").await,
            SendOutcome::Rejected(RejectReason::NoSession)
        );
        assert!(session.transcript().is_empty());
        assert!(api.chat_requests().is_empty());
    }

    #[tokio::test]
    async fn test_history_excludes_welcome_and_grows_with_exchange() {
        let api = Arc::new(FakeApi::default());
        let session = open_session(&api);

        assert_eq!(session.send("  first  ").await, SendOutcome::Replied);
        assert_eq!(session.send("second").await, SendOutcome::Replied);

        let requests = api.chat_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].message, "first");
        assert!(requests[0].chat_history.is_empty());
        assert_eq!(requests[0].language, "en");
        assert_eq!(Some(requests[0].session_id.clone()), session.session_id());

        assert_eq!(
            requests[1].chat_history,
            vec![
                HistoryEntry {
                    role: HistoryRole::User,
                    parts: vec!["first".to_string()],
                },
                HistoryEntry {
                    role: HistoryRole::Model,
                    parts: vec!["echo: first".to_string()],
                },
            ]
        );
        assert_eq!(
            texts(&session),
            vec![
                (Role::Assistant, "welcome[en]".to_string()),
                (Role::User, "first".to_string()),
                (Role::Assistant, "echo: first".to_string()),
                (Role::User, "second".to_string()),
                (Role::Assistant, "echo: second".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_credential_gets_distinct_error_turn() {
        let api = Arc::new(FakeApi::default());
        api.push_chat_reply(Err(ApiError::MissingCredential));
        api.push_chat_reply(Err(ApiError::Status {
            status: 500,
            message: "AI service error".to_string(),
        }));
        let session = open_session(&api);

        assert_eq!(
            session.send("hi").await,
            SendOutcome::Failed(ChatFailure::MissingCredential)
        );
        assert_eq!(
            session.send("again").await,
            SendOutcome::Failed(ChatFailure::General)
        );

        let turns = texts(&session);
        assert_eq!(turns[2], (Role::Assistant, "nokey[en]".to_string()));
        assert_eq!(turns[4], (Role::Assistant, "error[en]".to_string()));
        assert!(!session.is_sending());
    }

    #[tokio::test]
    async fn test_second_send_while_outstanding_is_rejected() {
        let api = Arc::new(FakeApi::default());
        api.hold("chat");
        let session = open_session(&api);

        let (first, second) = tokio::join!(session.send("one"), async {
            tokio::task::yield_now().await;
            let outcome = session.send("two").await;
            api.release("chat");
            outcome
        });

        assert_eq!(first, SendOutcome::Replied);
        assert_eq!(second, SendOutcome::Rejected(RejectReason::Busy));
        assert_eq!(api.chat_requests().len(), 1);
        assert_eq!(session.transcript().len(), 3);
    }

    #[tokio::test]
    async fn test_reply_after_reset_is_discarded() {
        let api = Arc::new(FakeApi::default());
        api.hold("chat");
        let session = open_session(&api);

        let (outcome, ()) = tokio::join!(session.send("hello"), async {
            tokio::task::yield_now().await;
            session.reset(locale("ru"));
            api.release("chat");
        });

        assert_eq!(outcome, SendOutcome::Discarded);
        assert_eq!(texts(&session), vec![(Role::Assistant, "welcome[ru]".to_string())]);
        assert!(!session.is_sending());
    }

    #[tokio::test]
    async fn test_reset_after_language_change_keeps_session_id() {
        let api = Arc::new(FakeApi::with_languages(&["en", "ru"]));
        let orch = SyncOrchestrator::new(api.clone(), Arc::new(MemoryPreferences::new()));
        orch.bootstrap().await.unwrap();

        let session = ChatSession::new(api.clone());
        session.open(ChatLocale::from_snapshot(&orch.snapshot()));
        session.send("hello").await;
        let id = session.session_id();
        let english_welcome = session.transcript()[0].text.clone();
        assert_eq!(english_welcome, "[en] Hi, I am the assistant of Ada Lovelace.");

        orch.set_language("ru").await;
        assert!(session.observe(&orch.snapshot()));
        assert!(!session.observe(&orch.snapshot()));

        let transcript = session.transcript();
        assert_eq!(session.session_id(), id);
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].role, Role::Assistant);
        assert_ne!(transcript[0].text, english_welcome);
        assert_eq!(transcript[0].text, "[ru] Hi, I am the assistant of Ада Лавлейс.");
    }
}
