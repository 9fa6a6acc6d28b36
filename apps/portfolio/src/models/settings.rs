use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Language used when neither the user nor the backend picked one.
pub const FALLBACK_LANGUAGE: &str = "en";

/// A language the site is published in, as listed by `GET /api/settings/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteLanguage {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub flag: String,
}

/// Public site settings. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub default_language: Option<String>,
    #[serde(default)]
    pub site_languages: Vec<SiteLanguage>,
    /// Any other admin-defined settings, passed through untouched.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Settings {
    /// Default language per the backend: configured default, else the first
    /// published language, else `en`.
    pub fn effective_default_language(&self) -> String {
        self.default_language
            .as_deref()
            .filter(|code| !code.trim().is_empty())
            .or_else(|| self.site_languages.first().map(|l| l.code.as_str()))
            .unwrap_or(FALLBACK_LANGUAGE)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_settings_decode_partial_payload() {
        let settings: Settings = serde_json::from_value(json!({
            "theme": "#2563EB",
            "site_languages": [{"code": "ru", "name": "Русский", "flag": "🇷🇺"}],
            "contact_email": "me@example.com"
        }))
        .unwrap();

        assert_eq!(settings.theme.as_deref(), Some("#2563EB"));
        assert_eq!(settings.site_languages[0].code, "ru");
        assert_eq!(settings.extra["contact_email"], json!("me@example.com"));
    }

    #[test]
    fn test_effective_default_language_chain() {
        let mut settings = Settings::default();
        assert_eq!(settings.effective_default_language(), "en");

        settings.site_languages.push(SiteLanguage {
            code: "de".to_string(),
            name: "Deutsch".to_string(),
            flag: String::new(),
        });
        assert_eq!(settings.effective_default_language(), "de");

        settings.default_language = Some("ru".to_string());
        assert_eq!(settings.effective_default_language(), "ru");

        settings.default_language = Some("  ".to_string());
        assert_eq!(settings.effective_default_language(), "de");
    }
}
