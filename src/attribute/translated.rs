use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key under which the backend stores the untranslated value.
pub const RAW_VALUE_KEY: &str = "rawvalue";

const FALLBACK_LANGUAGES: [&str; 2] = ["en", "nl"];

/// A string with one entry per language, as the backend delivers it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslatedValue(BTreeMap<String, String>);

impl TranslatedValue {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self(entries)
    }

    /// The same text in every fallback language.
    pub fn untranslated(text: impl Into<String>) -> Self {
        let text = text.into();
        Self(
            FALLBACK_LANGUAGES
                .iter()
                .map(|lang| (lang.to_string(), text.clone()))
                .collect(),
        )
    }

    /// Look up `lang`, falling back to English, Dutch, then any entry.
    pub fn translate(&self, lang: &str) -> Option<&str> {
        self.0
            .get(lang)
            .or_else(|| FALLBACK_LANGUAGES.iter().find_map(|l| self.0.get(*l)))
            .or_else(|| {
                self.0
                    .iter()
                    .find(|(key, _)| key.as_str() != RAW_VALUE_KEY)
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
    }

    pub fn raw_value(&self) -> Option<&str> {
        self.0.get(RAW_VALUE_KEY).map(String::as_str)
    }

    /// True when no language carries non-empty text.
    pub fn is_blank(&self) -> bool {
        self.0.values().all(|v| v.trim().is_empty())
    }
}
