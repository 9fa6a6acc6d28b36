//! Layered translation lookup.
//!
//! Sources are tried in order and the first hit wins:
//! 1. content-backed keys (`heroTitle`, `heroDescription`, `aboutDescription`)
//!    resolved from the loaded content payload;
//! 2. the active language's translation dictionary;
//! 3. the raw key itself.

use crate::models::{ContentPayload, LocalizedText, Translations};

pub const WELCOME_KEY: &str = "aiChatWelcome";
pub const CHAT_ERROR_KEY: &str = "aiChatError";
pub const CHAT_NO_API_KEY_KEY: &str = "aiChatNoApiKey";

/// Keys whose text lives in the content payload rather than the dictionary.
fn content_field<'a>(content: &'a ContentPayload, key: &str) -> Option<&'a LocalizedText> {
    match key {
        "heroTitle" => Some(&content.resume_title),
        "heroDescription" => Some(&content.resume_description),
        "aboutDescription" => Some(&content.about_me),
        _ => None,
    }
}

/// Borrowed view answering `t(key)` for one language.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    language: &'a str,
    default_language: &'a str,
    translations: Option<&'a Translations>,
    content: Option<&'a ContentPayload>,
}

impl<'a> Translator<'a> {
    pub fn new(
        language: &'a str,
        default_language: &'a str,
        translations: Option<&'a Translations>,
        content: Option<&'a ContentPayload>,
    ) -> Self {
        Self {
            language,
            default_language,
            translations,
            content,
        }
    }

    pub fn t(&self, key: &str) -> String {
        self.lookup(key).unwrap_or(key).to_string()
    }

    /// Like `t`, but `None` instead of the raw-key fallback.
    pub fn lookup(&self, key: &str) -> Option<&'a str> {
        let from_content = || {
            let content = self.content?;
            let field = content_field(content, key)?;
            Some(field.resolve(self.language, self.default_language))
        };
        let from_dictionary = || {
            self.translations?
                .get(key)
                .map(String::as_str)
                .filter(|value| !value.is_empty())
        };

        from_content().or_else(from_dictionary)
    }
}
