//! Spell checking
//!
//! The tokenizer and highlighter are pure functions over text. Dictionaries
//! come from a [`DictionaryProvider`] and are owned by a [`SpellSession`].

mod affix;
mod dictionary;
mod highlighter;
mod provider;
mod session;
mod tokenizer;

pub use highlighter::{apply_correction, misspelling_at, MisspellRange};
pub use provider::{system_dictionary_dirs, DictionaryProvider, HunspellProvider};
pub use session::SpellSession;
