//! Persisted user flags: interface language and wallet-connected.

use crate::store::{KeyValueStore, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

pub const LANGUAGE_KEY: &str = "wm_lang";
pub const CONNECTED_KEY: &str = "wm_connected";

/// Supported interface languages, in language-picker order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "zh-CN")]
    ChineseSimplified,
    #[serde(rename = "zh-TW")]
    ChineseTraditional,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "ru")]
    Russian,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "vi")]
    Vietnamese,
    #[serde(rename = "tr")]
    Turkish,
    #[serde(rename = "id")]
    Indonesian,
    #[serde(rename = "th")]
    Thai,
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "uk")]
    Ukrainian,
}

impl Language {
    pub const ALL: [Language; 16] = [
        Language::English,
        Language::ChineseSimplified,
        Language::ChineseTraditional,
        Language::Spanish,
        Language::Russian,
        Language::French,
        Language::German,
        Language::Japanese,
        Language::Korean,
        Language::Portuguese,
        Language::Vietnamese,
        Language::Turkish,
        Language::Indonesian,
        Language::Thai,
        Language::Arabic,
        Language::Ukrainian,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::ChineseSimplified => "zh-CN",
            Language::ChineseTraditional => "zh-TW",
            Language::Spanish => "es",
            Language::Russian => "ru",
            Language::French => "fr",
            Language::German => "de",
            Language::Japanese => "ja",
            Language::Korean => "ko",
            Language::Portuguese => "pt",
            Language::Vietnamese => "vi",
            Language::Turkish => "tr",
            Language::Indonesian => "id",
            Language::Thai => "th",
            Language::Arabic => "ar",
            Language::Ukrainian => "uk",
        }
    }

    /// Name of the language in that language.
    pub fn native_label(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::ChineseSimplified => "简体中文",
            Language::ChineseTraditional => "繁體中文",
            Language::Spanish => "Español",
            Language::Russian => "Русский",
            Language::French => "Français",
            Language::German => "Deutsch",
            Language::Japanese => "日本語",
            Language::Korean => "한국어",
            Language::Portuguese => "Português",
            Language::Vietnamese => "Tiếng Việt",
            Language::Turkish => "Türkçe",
            Language::Indonesian => "Bahasa Indonesia",
            Language::Thai => "ภาษาไทย",
            Language::Arabic => "العربية",
            Language::Ukrainian => "Українська",
        }
    }

    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Arabic)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.code() == s)
            .ok_or_else(|| StoreError::UnsupportedLanguage(s.to_string()))
    }
}

/// Typed view over a shared `KeyValueStore`.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored language, or English when unset or unrecognised.
    pub fn language(&self) -> Result<Language, StoreError> {
        let Some(code) = self.store.get(LANGUAGE_KEY)? else {
            return Ok(Language::default());
        };
        match code.parse() {
            Ok(lang) => Ok(lang),
            Err(_) => {
                warn!(code = %code, "Unknown stored language, falling back to en");
                Ok(Language::default())
            }
        }
    }

    pub fn set_language(&self, lang: Language) -> Result<(), StoreError> {
        debug!(code = lang.code(), "Language changed");
        self.store.set(LANGUAGE_KEY, lang.code())
    }

    /// Only the exact value `"1"` counts as connected.
    pub fn wallet_connected(&self) -> Result<bool, StoreError> {
        Ok(self.store.get(CONNECTED_KEY)?.as_deref() == Some("1"))
    }

    /// Connecting writes `"1"`; disconnecting removes the key.
    pub fn set_wallet_connected(&self, connected: bool) -> Result<(), StoreError> {
        debug!(connected, "Wallet flag changed");
        if connected {
            self.store.set(CONNECTED_KEY, "1")
        } else {
            self.store.remove(CONNECTED_KEY)
        }
    }
}

impl fmt::Debug for Preferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preferences").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use proptest::prelude::*;

    fn prefs() -> (Arc<MemoryStore>, Preferences) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), Preferences::new(store))
    }

    #[test]
    fn test_default_language_is_english() {
        let (_, prefs) = prefs();
        assert_eq!(prefs.language().unwrap(), Language::English);
    }

    #[test]
    fn test_language_persists_code() {
        let (store, prefs) = prefs();
        prefs.set_language(Language::ChineseTraditional).unwrap();
        assert_eq!(store.get(LANGUAGE_KEY).unwrap().as_deref(), Some("zh-TW"));
        assert_eq!(prefs.language().unwrap(), Language::ChineseTraditional);
    }

    #[test]
    fn test_unknown_stored_language_falls_back() {
        let (store, prefs) = prefs();
        store.set(LANGUAGE_KEY, "xx").unwrap();
        assert_eq!(prefs.language().unwrap(), Language::English);
    }

    #[test]
    fn test_wallet_flag() {
        let (store, prefs) = prefs();
        assert!(!prefs.wallet_connected().unwrap());

        prefs.set_wallet_connected(true).unwrap();
        assert_eq!(store.get(CONNECTED_KEY).unwrap().as_deref(), Some("1"));
        assert!(prefs.wallet_connected().unwrap());

        prefs.set_wallet_connected(false).unwrap();
        assert!(store.get(CONNECTED_KEY).unwrap().is_none());
        assert!(!prefs.wallet_connected().unwrap());
    }

    #[test]
    fn test_other_connected_values_are_false() {
        let (store, prefs) = prefs();
        store.set(CONNECTED_KEY, "true").unwrap();
        assert!(!prefs.wallet_connected().unwrap());
    }

    #[test]
    fn test_sixteen_languages_unique_codes() {
        let mut codes: Vec<_> = Language::ALL.iter().map(|l| l.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 16);
        assert!(Language::Arabic.is_rtl());
        assert!(!Language::Japanese.is_rtl());
    }

    #[test]
    fn test_serde_uses_code() {
        let json = serde_json::to_string(&Language::ChineseSimplified).unwrap();
        assert_eq!(json, "\"zh-CN\"");
    }

    proptest! {
        #[test]
        fn prop_code_parse_roundtrip(idx in 0usize..16) {
            let lang = Language::ALL[idx];
            prop_assert_eq!(lang.code().parse::<Language>().unwrap(), lang);
        }
    }
}
