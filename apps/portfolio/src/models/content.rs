use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A field carried in every site language at once: `{ "en": "...", "ru": "..." }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(pub HashMap<String, String>);

impl LocalizedText {
    /// Resolves the active language, then the default language, then the empty string.
    /// Empty strings count as missing, so an untranslated field falls through.
    pub fn resolve<'a>(&'a self, language: &str, default_language: &str) -> &'a str {
        [language, default_language]
            .into_iter()
            .filter_map(|code| self.0.get(code))
            .map(String::as_str)
            .find(|value| !value.is_empty())
            .unwrap_or("")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocalizedText {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpokenLanguage {
    pub id: Option<i64>,
    pub name: String,
    pub level: String,
    pub proficiency: i64,
    pub order: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    pub id: Option<i64>,
    pub name: String,
    pub order: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillCategory {
    pub id: Option<i64>,
    pub name: String,
    pub name_key: String,
    pub color: String,
    pub order: i64,
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub id: Option<i64>,
    pub company: String,
    pub position: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub order: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub id: Option<i64>,
    pub institution: String,
    pub location: String,
    pub degree: String,
    pub faculty: String,
    pub year: String,
    pub order: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certificate {
    pub id: Option<i64>,
    pub name: String,
    pub year: String,
    pub order: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: Option<i64>,
    pub code: String,
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub link: String,
    pub order: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    pub value: String,
    pub href: String,
    pub icon: Option<String>,
}

/// Headline numbers, pre-formatted by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub years_experience: String,
    pub projects_completed: String,
    pub languages_count: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageMeta {
    pub title: LocalizedText,
    pub description: LocalizedText,
}

/// The full resume dataset returned by `GET /api/resume/?lang=<code>`.
///
/// Sections arrive already in the requested language; the profile texts are
/// `LocalizedText` and are resolved on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentPayload {
    pub name: LocalizedText,
    pub firstname: LocalizedText,
    pub lastname: LocalizedText,
    pub about_me: LocalizedText,
    pub resume_description: LocalizedText,
    pub resume_title: LocalizedText,
    pub languages: Vec<SpokenLanguage>,
    pub skills: HashMap<String, Vec<String>>,
    pub skill_categories: Vec<SkillCategory>,
    pub experiences: Vec<Experience>,
    pub education: Vec<Education>,
    pub certificates: Vec<Certificate>,
    pub projects: Vec<Project>,
    pub contact_info: Vec<ContactInfo>,
    pub stats: Stats,
    pub meta: PageMeta,
}

impl ContentPayload {
    /// "First Last" in the given language, trimmed; empty when neither part is known.
    pub fn full_name(&self, language: &str, default_language: &str) -> String {
        let first = self.firstname.resolve(language, default_language);
        let last = self.lastname.resolve(language, default_language);
        format!("{first} {last}").trim().to_string()
    }
}
