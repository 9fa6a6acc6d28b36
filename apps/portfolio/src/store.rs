use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{ContentPayload, Translations};

/// Memoizing per-language cache. Entries are never evicted for the life of the page.
///
/// `get` returning `None` means "no fetch attempted, or it failed"; it says nothing
/// about individual keys inside a loaded entry.
#[derive(Debug)]
pub struct LocaleCache<T> {
    entries: HashMap<String, Arc<T>>,
}

impl<T> Default for LocaleCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> LocaleCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, language: &str) -> Option<Arc<T>> {
        self.entries.get(language).cloned()
    }

    /// Stores a freshly loaded value, replacing any earlier copy for the language.
    pub fn insert(&mut self, language: &str, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.entries.insert(language.to_string(), Arc::clone(&value));
        value
    }
}

pub type TranslationStore = LocaleCache<Translations>;
pub type ContentStore = LocaleCache<ContentPayload>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_until_inserted() {
        let mut store = TranslationStore::new();
        assert!(store.get("en").is_none());

        let map: Translations = [("about".to_string(), "About".to_string())].into();
        store.insert("en", map);

        assert_eq!(store.get("en").unwrap()["about"], "About");
        assert!(store.get("ru").is_none());
    }

    #[test]
    fn test_reinsert_replaces_entry_and_keeps_others() {
        let mut store = ContentStore::new();
        let first = store.insert("en", ContentPayload::default());
        store.insert("ru", ContentPayload::default());
        let second = store.insert("en", ContentPayload::default());

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&store.get("en").unwrap(), &second));
        assert!(store.get("ru").is_some());
    }
}
