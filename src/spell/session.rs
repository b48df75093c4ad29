//! Spell-check session
//!
//! Owns the one active dictionary and lends it to the highlighter. The
//! dictionary is swapped as a whole when the language changes; a failed
//! switch leaves the previous dictionary in place.

use super::dictionary::Dictionary;
use super::highlighter::{self, MisspellRange};
use super::provider::DictionaryProvider;
use crate::error::Result;
use log::{info, warn};
use std::fmt;

pub struct SpellSession {
    provider: Box<dyn DictionaryProvider>,
    dictionary: Option<Box<dyn Dictionary>>,
    enabled: bool,
}

impl fmt::Debug for SpellSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpellSession")
            .field("language", &self.language())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl SpellSession {
    /// Create a session with no active dictionary.
    pub fn new(provider: Box<dyn DictionaryProvider>) -> Self {
        Self {
            provider,
            dictionary: None,
            enabled: true,
        }
    }

    /// Language tag of the active dictionary.
    pub fn language(&self) -> Option<&str> {
        self.dictionary.as_deref().map(|d| d.language_tag())
    }

    /// The dictionary highlighting runs against, `None` when disabled.
    pub fn dictionary(&self) -> Option<&dyn Dictionary> {
        if self.enabled {
            self.dictionary.as_deref()
        } else {
            None
        }
    }

    /// Load and activate the dictionary for `tag`.
    pub fn set_language(&mut self, tag: &str) -> Result<()> {
        match self.provider.load(tag) {
            Ok(dictionary) => {
                info!("Spell-check language set to {}", dictionary.language_tag());
                self.dictionary = Some(dictionary);
                Ok(())
            }
            Err(err) => {
                warn!("Keeping previous dictionary, cannot load {}: {}", tag, err);
                Err(err)
            }
        }
    }

    /// Languages offered to the user.
    pub fn available_languages(&self) -> Vec<String> {
        self.provider.available_languages()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn highlight(&self, text: &str) -> Vec<MisspellRange> {
        highlighter::highlight(text, self.dictionary())
    }

    pub fn suggest(&self, word: &str) -> Vec<String> {
        highlighter::suggest(word, self.dictionary())
    }

    /// Add a word to the active dictionary and to every one loaded later.
    ///
    /// Returns false when there is no active dictionary.
    pub fn add_word(&mut self, word: &str) -> bool {
        let Some(dictionary) = self.dictionary.as_mut() else {
            return false;
        };
        dictionary.add_word(word);
        self.provider.remember_word(word);
        info!("Added '{}' to the personal dictionary", word);
        true
    }

    /// Accept a word until the dictionary is replaced.
    pub fn ignore_word(&mut self, word: &str) -> bool {
        match self.dictionary.as_mut() {
            Some(dictionary) => {
                dictionary.ignore_word(word);
                true
            }
            None => false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::spell::testing::StaticProvider;

    fn session() -> SpellSession {
        SpellSession::new(Box::new(StaticProvider::english_and_german()))
    }

    #[test]
    fn test_no_dictionary_until_language_set() {
        let session = session();
        assert_eq!(session.language(), None);
        assert!(session.highlight("Thiss iz wrong").is_empty());
    }

    #[test]
    fn test_set_language() {
        let mut session = session();
        session.set_language("en_US").unwrap();
        assert_eq!(session.language(), Some("en_US"));
        assert_eq!(
            session.highlight("Thiss is a test."),
            vec![MisspellRange::new(0, 5)]
        );
    }

    #[test]
    fn test_switch_language_changes_vocabulary() {
        let mut session = session();
        session.set_language("en_US").unwrap();
        let text = "this ist a test";
        assert_eq!(session.highlight(text), vec![MisspellRange::new(5, 3)]);

        session.set_language("de_DE").unwrap();
        assert_eq!(
            session.highlight(text),
            vec![MisspellRange::new(0, 4), MisspellRange::new(9, 1)]
        );
    }

    #[test]
    fn test_failed_switch_keeps_previous_dictionary() {
        let mut session = session();
        session.set_language("en_US").unwrap();

        let err = session.set_language("fr_FR").unwrap_err();
        assert!(err.is_lookup());
        assert_eq!(session.language(), Some("en_US"));

        let err = session.set_language("not a tag").unwrap_err();
        assert!(matches!(err, Error::UnknownLanguage(_)));
        assert_eq!(session.language(), Some("en_US"));
    }

    #[test]
    fn test_disabled_session_flags_nothing() {
        let mut session = session();
        session.set_language("en_US").unwrap();
        session.set_enabled(false);
        assert!(session.highlight("Thiss").is_empty());
        assert!(session.suggest("tset").is_empty());
        session.set_enabled(true);
        assert_eq!(session.highlight("Thiss").len(), 1);
    }

    #[test]
    fn test_add_word_survives_language_switch() {
        let mut session = session();
        assert!(!session.add_word("egui"));

        session.set_language("en_US").unwrap();
        assert!(session.add_word("egui"));
        assert!(session.highlight("egui").is_empty());

        session.set_language("de_DE").unwrap();
        assert!(session.highlight("egui").is_empty());
    }

    #[test]
    fn test_ignore_word_is_per_dictionary() {
        let mut session = session();
        session.set_language("en_US").unwrap();
        assert!(session.ignore_word("Zorblax"));
        assert!(session.highlight("Zorblax").is_empty());

        session.set_language("de_DE").unwrap();
        assert_eq!(session.highlight("Zorblax").len(), 1);
    }

    #[test]
    fn test_suggest_uses_active_dictionary() {
        let mut session = session();
        session.set_language("en_US").unwrap();
        assert_eq!(session.suggest("tset").first().map(String::as_str), Some("test"));
    }

    #[test]
    fn test_available_languages() {
        assert_eq!(session().available_languages(), vec!["de_DE", "en_US"]);
    }
}
