//! Synchronization core — sequences settings → language → translations → content,
//! and re-sequences translations + content on every language change.
//!
//! # Load generations
//! Every language change bumps a monotonic generation counter and tags the fetches
//! it starts with that generation. A result is applied only if its tag still equals
//! the current counter when it resolves; anything else is a superseded result and
//! is dropped without being treated as a failure. In-flight requests are never
//! aborted (they are idempotent reads), so the latest requested language always wins
//! regardless of the order responses arrive in.
//!
//! All state lives behind one `std::sync::Mutex` that is never held across an
//! `.await`; snapshots are published through a `tokio::sync::watch` channel.

pub mod snapshot;

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::api::PortfolioApi;
use crate::errors::{ApiError, SyncError};
use crate::models::settings::FALLBACK_LANGUAGE;
use crate::models::{ContentPayload, Settings, Translations};
use crate::preferences::{PreferenceStore, LANGUAGE_KEY, THEME_KEY};
use crate::store::{ContentStore, TranslationStore};
use crate::theme::{self, Seed, ThemeMode};

pub use snapshot::{ContentState, Loading, Phase, Snapshot};

/// A language switch that has been accepted and tagged with its generation.
/// Pass it to [`SyncOrchestrator::load`] to perform the fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub language: String,
    fetch_translations: bool,
    fetch_content: bool,
}

impl LoadTicket {
    /// False when both pieces were served from the per-language caches.
    pub fn needs_fetch(&self) -> bool {
        self.fetch_translations || self.fetch_content
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The requested language was already active; nothing was fetched.
    Unchanged,
    /// Results belong to the current generation and are published.
    Applied,
    /// A newer language change overtook this one; its results were dropped.
    Superseded,
    /// Content failed for the current generation. Translations may still have applied.
    Failed(SyncError),
}

struct State {
    generation: u64,
    bootstrap_started: bool,
    /// Set once the user picks a seed, so late-arriving settings do not override it.
    seed_chosen: bool,
    snapshot: Snapshot,
    translations: TranslationStore,
    content: ContentStore,
}

impl State {
    /// Bumps the generation and makes `language` active, serving cached entries
    /// immediately and flagging the rest for fetching.
    fn begin_load(&mut self, language: &str) -> LoadTicket {
        self.generation += 1;
        let snapshot = &mut self.snapshot;
        snapshot.generation = self.generation;
        snapshot.language = Some(language.to_string());

        let cached_translations = self.translations.get(language);
        let fetch_translations = cached_translations.is_none();
        if let Some(map) = cached_translations {
            snapshot.translations = Some(map);
        }

        let cached_content = self.content.get(language);
        let fetch_content = cached_content.is_none();
        if let Some(payload) = cached_content {
            snapshot.content = ContentState::Loaded(payload);
            snapshot.phase = Phase::Ready;
        }

        snapshot.loading = Loading {
            translations: fetch_translations,
            content: fetch_content,
        };

        LoadTicket {
            generation: self.generation,
            language: language.to_string(),
            fetch_translations,
            fetch_content,
        }
    }

    fn apply_seed(&mut self, seed: Seed) {
        self.snapshot.derived_theme = theme::derive(&seed);
        self.snapshot.seed = seed;
    }

    /// Parses a raw theme value. Malformed literals fall back to the default preset,
    /// which clears any derived overrides.
    fn apply_theme_value(&mut self, raw: &str) {
        match raw.parse::<Seed>() {
            Ok(seed) => self.apply_seed(seed),
            Err(e) => {
                warn!("Ignoring theme value {raw:?}: {e}");
                self.apply_seed(Seed::default());
            }
        }
    }

    fn apply_settings(&mut self, settings: &Settings) {
        if !settings.site_languages.is_empty() {
            self.snapshot.site_languages = settings.site_languages.clone();
        }
        self.snapshot.default_language = settings.effective_default_language();
        if let Some(raw) = settings.theme.as_deref() {
            if self.seed_chosen {
                debug!("Keeping user-selected theme over settings theme {raw:?}");
            } else {
                self.apply_theme_value(raw);
            }
        }
    }
}

struct Shared {
    api: Arc<dyn PortfolioApi>,
    prefs: Arc<dyn PreferenceStore>,
    state: Mutex<State>,
    tx: watch::Sender<Snapshot>,
}

/// Process-wide state container for the portfolio page.
///
/// Cheap to clone; clones share state. Constructible and testable without any
/// rendering layer attached.
#[derive(Clone)]
pub struct SyncOrchestrator {
    inner: Arc<Shared>,
}

impl SyncOrchestrator {
    pub fn new(api: Arc<dyn PortfolioApi>, prefs: Arc<dyn PreferenceStore>) -> Self {
        let snapshot = Snapshot::default();
        let (tx, _rx) = watch::channel(snapshot.clone());
        Self {
            inner: Arc::new(Shared {
                api,
                prefs,
                state: Mutex::new(State {
                    generation: 0,
                    bootstrap_started: false,
                    seed_chosen: false,
                    snapshot,
                    translations: TranslationStore::new(),
                    content: ContentStore::new(),
                }),
                tx,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // State is always left consistent between statements, so a poisoned lock is usable.
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, state: &State) {
        self.inner.tx.send_replace(state.snapshot.clone());
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.inner.prefs.set(key, value) {
            warn!("Failed to persist preference {key}={value}: {e:#}");
        }
    }

    /// Current immutable view.
    pub fn snapshot(&self) -> Snapshot {
        self.state().snapshot.clone()
    }

    /// Receiver notified after every published change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.tx.subscribe()
    }

    /// Current load generation counter.
    pub fn generation(&self) -> u64 {
        self.state().generation
    }

    /// Runs once: reads persisted preferences, fetches settings, resolves the
    /// initial language and loads its translations and content.
    ///
    /// Settings failure is non-fatal (falls back to `en`). Content failure is
    /// returned as `SyncError::ContentUnavailable` and also recorded in the snapshot.
    pub async fn bootstrap(&self) -> Result<(), SyncError> {
        let (start_generation, persisted_language) = {
            let mut state = self.state();
            if state.bootstrap_started {
                warn!("bootstrap() called more than once; ignoring");
                return Ok(());
            }
            state.bootstrap_started = true;
            if state.snapshot.phase == Phase::Uninitialized {
                state.snapshot.phase = Phase::Bootstrapping;
            }

            let stored_mode = self.inner.prefs.get(THEME_KEY);
            state.snapshot.mode = ThemeMode::from_stored(stored_mode.as_deref());
            self.publish(&state);

            let persisted = self
                .inner
                .prefs
                .get(LANGUAGE_KEY)
                .filter(|code| !code.trim().is_empty());
            (state.generation, persisted)
        };

        let settings = match self.inner.api.fetch_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to fetch settings, falling back to '{FALLBACK_LANGUAGE}': {e}");
                Settings {
                    default_language: Some(FALLBACK_LANGUAGE.to_string()),
                    ..Default::default()
                }
            }
        };

        let ticket = {
            let mut state = self.state();
            state.apply_settings(&settings);

            let ticket = if state.generation != start_generation {
                debug!("Language changed during bootstrap; keeping the user's choice");
                None
            } else {
                let language =
                    persisted_language.unwrap_or_else(|| state.snapshot.default_language.clone());
                info!("Initial language resolved to '{language}'");
                Some(state.begin_load(&language))
            };
            self.publish(&state);
            ticket
        };

        match ticket {
            Some(ticket) => match self.load(ticket).await {
                LoadOutcome::Failed(err) => Err(err),
                _ => Ok(()),
            },
            None => Ok(()),
        }
    }

    /// Accepts a language change without waiting on the network.
    ///
    /// Returns `None` when `language` is blank or already active: the generation
    /// is not bumped, nothing is persisted and nothing is fetched. Otherwise persists
    /// the choice, publishes the new active language, and returns the ticket for
    /// [`load`](Self::load).
    pub fn request_language(&self, language: &str) -> Option<LoadTicket> {
        let language = language.trim();
        if language.is_empty() {
            warn!("Ignoring blank language code");
            return None;
        }
        let mut state = self.state();
        if state.snapshot.language.as_deref() == Some(language) {
            debug!("Language '{language}' already active");
            return None;
        }

        self.persist(LANGUAGE_KEY, language);
        let ticket = state.begin_load(language);
        debug!(
            "Language -> '{}' (generation {})",
            ticket.language, ticket.generation
        );
        self.publish(&state);
        Some(ticket)
    }

    /// Performs the fetches for a ticket concurrently and applies each result only
    /// if the ticket's generation is still current when it resolves.
    pub async fn load(&self, ticket: LoadTicket) -> LoadOutcome {
        if !ticket.needs_fetch() {
            return LoadOutcome::Applied;
        }

        let api = Arc::clone(&self.inner.api);
        let translations = async {
            if !ticket.fetch_translations {
                return true;
            }
            let result = api.fetch_translations(&ticket.language).await;
            self.apply_translations(&ticket, result)
        };
        let content = async {
            if !ticket.fetch_content {
                return None;
            }
            let result = api.fetch_content(&ticket.language).await;
            Some(self.apply_content(&ticket, result))
        };

        let (translations_current, content_outcome) = tokio::join!(translations, content);

        match content_outcome {
            Some(outcome) => outcome,
            None if translations_current => LoadOutcome::Applied,
            None => LoadOutcome::Superseded,
        }
    }

    /// `request_language` followed by `load`.
    pub async fn set_language(&self, language: &str) -> LoadOutcome {
        match self.request_language(language) {
            Some(ticket) => self.load(ticket).await,
            None => LoadOutcome::Unchanged,
        }
    }

    /// Returns false when the result was superseded.
    fn apply_translations(
        &self,
        ticket: &LoadTicket,
        result: Result<Translations, ApiError>,
    ) -> bool {
        let mut state = self.state();
        if state.generation != ticket.generation {
            debug!(
                "Dropping translations for '{}' from generation {} (current {})",
                ticket.language, ticket.generation, state.generation
            );
            return false;
        }

        match result {
            Ok(map) => {
                let map = state.translations.insert(&ticket.language, map);
                state.snapshot.translations = Some(map);
            }
            Err(e) => {
                warn!(
                    "Failed to fetch translations for '{}', using raw keys: {e}",
                    ticket.language
                );
                state.snapshot.translations = None;
            }
        }
        state.snapshot.loading.translations = false;
        self.publish(&state);
        true
    }

    fn apply_content(
        &self,
        ticket: &LoadTicket,
        result: Result<ContentPayload, ApiError>,
    ) -> LoadOutcome {
        let mut state = self.state();
        if state.generation != ticket.generation {
            debug!(
                "Dropping content for '{}' from generation {} (current {})",
                ticket.language, ticket.generation, state.generation
            );
            return LoadOutcome::Superseded;
        }

        state.snapshot.loading.content = false;
        let outcome = match result {
            Ok(payload) => {
                let payload = state.content.insert(&ticket.language, payload);
                state.snapshot.content = ContentState::Loaded(payload);
                if state.snapshot.phase != Phase::Ready {
                    info!("Content loaded for '{}'; ready", ticket.language);
                }
                state.snapshot.phase = Phase::Ready;
                LoadOutcome::Applied
            }
            Err(e) => {
                error!("Failed to fetch content for '{}': {e}", ticket.language);
                let err = SyncError::ContentUnavailable {
                    language: ticket.language.clone(),
                    reason: e.to_string(),
                };
                let previous = state.snapshot.content.payload().cloned();
                state.snapshot.content = ContentState::Failed {
                    error: err.clone(),
                    previous,
                };
                LoadOutcome::Failed(err)
            }
        };
        self.publish(&state);
        outcome
    }

    /// Replaces the color seed and republishes the derived palette. No network.
    pub fn set_theme_seed(&self, seed: Seed) {
        let mut state = self.state();
        state.seed_chosen = true;
        state.apply_seed(seed);
        self.publish(&state);
    }

    /// Like [`set_theme_seed`](Self::set_theme_seed) for an unparsed value; a
    /// malformed hex color clears the overrides instead of failing.
    pub fn set_theme_value(&self, raw: &str) {
        let mut state = self.state();
        state.seed_chosen = true;
        state.apply_theme_value(raw);
        self.publish(&state);
    }

    pub fn set_theme_mode(&self, mode: ThemeMode) {
        let mut state = self.state();
        state.snapshot.mode = mode;
        self.persist(THEME_KEY, mode.as_str());
        self.publish(&state);
    }

    /// Flips light/dark and returns the new mode.
    pub fn toggle_theme(&self) -> ThemeMode {
        let mode = self.state().snapshot.mode.toggled();
        self.set_theme_mode(mode);
        mode
    }
}
