//! State and synchronization core of a personal resume/portfolio page.
//!
//! - [`theme`] derives a full palette from one seed color.
//! - [`sync::SyncOrchestrator`] sequences settings, translations and content
//!   across language changes, keeping only the latest requested language.
//! - [`chat::ChatSession`] runs the assistant conversation.

pub mod api;
pub mod chat;
pub mod config;
pub mod errors;
pub mod i18n;
pub mod models;
pub mod preferences;
pub mod store;
pub mod sync;
pub mod theme;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{HttpApi, PortfolioApi};
pub use chat::ChatSession;
pub use errors::{ApiError, SyncError, ThemeError};
pub use sync::{LoadOutcome, Snapshot, SyncOrchestrator};
