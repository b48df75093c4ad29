//! Word tokenizer for spell checking
//!
//! Splits text into maximal runs of word characters (Unicode letters,
//! digits, underscore) and apostrophes. Everything else is a separator.

use regex::Regex;
use std::sync::OnceLock;

/// Pattern for a single word: `\w` is Unicode-aware in the regex crate.
const WORD_PATTERN: &str = r"(?iu)[\w']+";

static WORD_REGEX: OnceLock<Regex> = OnceLock::new();

fn word_regex() -> &'static Regex {
    WORD_REGEX.get_or_init(|| Regex::new(WORD_PATTERN).expect("word pattern is valid"))
}

/// A word found in a line of text.
///
/// Offsets count characters (not bytes) from the start of the tokenized
/// text; `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// The literal text of the word
    pub text: &'a str,
    /// Character offset of the first character
    pub start: usize,
    /// Character offset one past the last character
    pub end: usize,
}

impl<'a> Token<'a> {
    /// Number of characters in the token.
    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Lazy iterator over the tokens of a text.
///
/// Cloning the iterator restarts nothing; it forks the scan at its current
/// position. Call [`tokenize`] again to start over.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    text: &'a str,
    /// Byte position where the next search starts
    byte_pos: usize,
    /// Character count of `text[..byte_pos]`
    char_pos: usize,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let found = word_regex().find_at(self.text, self.byte_pos)?;

        let start = self.char_pos + self.text[self.byte_pos..found.start()].chars().count();
        let word = found.as_str();
        let end = start + word.chars().count();

        self.byte_pos = found.end();
        self.char_pos = end;

        Some(Token {
            text: word,
            start,
            end,
        })
    }
}

/// Tokenize a line (or block) of text into words.
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens {
        text,
        byte_pos: 0,
        char_pos: 0,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
