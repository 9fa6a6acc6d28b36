use std::sync::Arc;

use serde::Serialize;

use crate::errors::SyncError;
use crate::i18n::Translator;
use crate::models::settings::FALLBACK_LANGUAGE;
use crate::models::{ContentPayload, SiteLanguage, Translations};
use crate::theme::{DerivedTheme, Seed, ThemeMode};

/// Lifecycle of the orchestrator. `Ready` is entered the first time content loads
/// and stays set across later language switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Uninitialized,
    Bootstrapping,
    Ready,
}

/// Content is not optional: a failed load is an explicit state, never an empty payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentState {
    Pending,
    Loaded(Arc<ContentPayload>),
    Failed {
        error: SyncError,
        /// Last successfully loaded payload, possibly for another language.
        previous: Option<Arc<ContentPayload>>,
    },
}

impl ContentState {
    pub fn payload(&self) -> Option<&Arc<ContentPayload>> {
        match self {
            ContentState::Loaded(payload) => Some(payload),
            ContentState::Failed { previous, .. } => previous.as_ref(),
            ContentState::Pending => None,
        }
    }
}

/// Which fetches of the current load generation are still outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Loading {
    pub translations: bool,
    pub content: bool,
}

impl Loading {
    pub fn any(&self) -> bool {
        self.translations || self.content
    }
}

/// Immutable view of the synchronization core, published after every change.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub phase: Phase,
    /// Load generation the visible state belongs to.
    pub generation: u64,
    /// Most recently requested language; `None` until bootstrap resolves one.
    pub language: Option<String>,
    pub default_language: String,
    pub site_languages: Vec<SiteLanguage>,
    pub seed: Seed,
    /// `None` for preset seeds: the preset stylesheet applies with no overrides.
    pub derived_theme: Option<DerivedTheme>,
    pub mode: ThemeMode,
    /// Dictionary for the active language; `None` when absent or its fetch failed.
    pub translations: Option<Arc<Translations>>,
    pub content: ContentState,
    pub loading: Loading,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            phase: Phase::Uninitialized,
            generation: 0,
            language: None,
            default_language: FALLBACK_LANGUAGE.to_string(),
            site_languages: Vec::new(),
            seed: Seed::default(),
            derived_theme: None,
            mode: ThemeMode::default(),
            translations: None,
            content: ContentState::Pending,
            loading: Loading::default(),
        }
    }
}

impl Snapshot {
    /// Active language, or the default language while none is resolved yet.
    pub fn active_language(&self) -> &str {
        self.language.as_deref().unwrap_or(&self.default_language)
    }

    pub fn translator(&self) -> Translator<'_> {
        Translator::new(
            self.active_language(),
            &self.default_language,
            self.translations.as_deref(),
            self.content(),
        )
    }

    /// Shorthand for `translator().t(key)`.
    pub fn t(&self, key: &str) -> String {
        self.translator().t(key)
    }

    /// Payload to render, including the previous one kept after a failed load.
    pub fn content(&self) -> Option<&ContentPayload> {
        self.content.payload().map(Arc::as_ref)
    }

    /// Set when the latest content load failed; callers must check it before rendering.
    pub fn content_error(&self) -> Option<&SyncError> {
        match &self.content {
            ContentState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Profile full name in the active language, empty when content is unavailable.
    pub fn profile_name(&self) -> String {
        self.content()
            .map(|c| c.full_name(self.active_language(), &self.default_language))
            .unwrap_or_default()
    }
}
