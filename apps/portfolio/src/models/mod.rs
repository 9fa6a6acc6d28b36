pub mod content;
pub mod settings;

pub use content::{ContentPayload, LocalizedText};
pub use settings::{Settings, SiteLanguage};

use std::collections::HashMap;

/// Flat key → localized string dictionary for one language.
pub type Translations = HashMap<String, String>;
