//! Spell-check highlighting pass
//!
//! Each pass re-tokenizes the whole text and asks the dictionary about every
//! token. There is no caching between passes.

use super::dictionary::Dictionary;
use super::tokenizer::tokenize;
use crate::string_utils::char_range_to_byte_range;
use std::ops::Range;

/// A misspelled span of text, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MisspellRange {
    /// Character offset of the first character
    pub start: usize,
    /// Length in characters
    pub len: usize,
}

impl MisspellRange {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// Character offset one past the last character.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// Whether a cursor at `offset` touches this range (ends inclusive).
    pub fn touches(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end()
    }

    /// The misspelled word within `text`.
    pub fn text<'a>(&self, text: &'a str) -> &'a str {
        &text[char_range_to_byte_range(text, self.range())]
    }
}

/// Find the misspelled ranges of `text`.
///
/// Ranges come back in ascending order, one per rejected token. Without a
/// dictionary nothing is flagged.
pub fn highlight(text: &str, dictionary: Option<&dyn Dictionary>) -> Vec<MisspellRange> {
    let Some(dictionary) = dictionary else {
        return Vec::new();
    };

    tokenize(text)
        .filter(|token| !dictionary.is_correct(token.text))
        .map(|token| MisspellRange::new(token.start, token.len()))
        .collect()
}

/// Replacement candidates for `word`, best first.
pub fn suggest(word: &str, dictionary: Option<&dyn Dictionary>) -> Vec<String> {
    dictionary.map(|d| d.suggest(word)).unwrap_or_default()
}

/// The range under a cursor, if any. `ranges` must be sorted.
pub fn misspelling_at(ranges: &[MisspellRange], offset: usize) -> Option<MisspellRange> {
    let idx = ranges.partition_point(|r| r.end() < offset);
    ranges.get(idx).copied().filter(|r| r.touches(offset))
}

/// Replace the text of `range` with `replacement` in one edit.
///
/// Returns the character offset just after the inserted text, or `None`
/// if the range does not fit inside `text`.
pub fn apply_correction(text: &mut String, range: MisspellRange, replacement: &str) -> Option<usize> {
    if range.end() > text.chars().count() {
        return None;
    }
    let bytes = char_range_to_byte_range(text, range.range());
    text.replace_range(bytes, replacement);
    Some(range.start + replacement.chars().count())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spell::dictionary::WordListDictionary;
    use crate::spell::tokenizer::Token;

    fn english() -> WordListDictionary {
        WordListDictionary::from_words("en_US", ["this", "is", "a", "test", "of", "hello", "world"])
    }

    fn german() -> WordListDictionary {
        WordListDictionary::from_words("de_DE", ["das", "ist", "ein", "test", "grüße"])
    }

    // ─────────────────────────────────────────────────────────────────────────
    // highlight
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_single_misspelling() {
        let dict = WordListDictionary::from_words("en_US", ["is", "a", "test"]);
        let ranges = highlight("Thiss is a test.", Some(&dict));
        assert_eq!(ranges, vec![MisspellRange::new(0, 5)]);
    }

    #[test]
    fn test_known_words_only() {
        let dict = english();
        assert!(highlight("This is a test.\nHello, world!", Some(&dict)).is_empty());
    }

    #[test]
    fn test_no_dictionary() {
        assert!(highlight("Thiss iz nott checked", None).is_empty());
    }

    #[test]
    fn test_empty_text() {
        let dict = english();
        assert!(highlight("", Some(&dict)).is_empty());
    }

    #[test]
    fn test_ranges_match_rejected_tokens() {
        let dict = english();
        let text = "Helo wrld, this is a tst of naïvité";
        let ranges = highlight(text, Some(&dict));
        let tokens: Vec<Token> = tokenize(text).collect();

        assert_eq!(ranges.len(), 4);
        for range in &ranges {
            let token = tokens
                .iter()
                .find(|t| t.start == range.start && t.len() == range.len)
                .expect("range matches a token");
            assert!(!dict.is_correct(token.text));
        }
        for pair in ranges.windows(2) {
            assert!(pair[0].end() <= pair[1].start);
        }
        assert_eq!(ranges[3].text(text), "naïvité");
    }

    #[test]
    fn test_idempotent() {
        let dict = english();
        let text = "Thiss is a tset\nwith sevral erors";
        assert_eq!(highlight(text, Some(&dict)), highlight(text, Some(&dict)));
    }

    #[test]
    fn test_switching_dictionaries() {
        let text = "das ist a test";
        let en = english();
        let de = german();

        let en_ranges = highlight(text, Some(&en));
        let de_ranges = highlight(text, Some(&de));
        assert_eq!(en_ranges, vec![MisspellRange::new(0, 3), MisspellRange::new(4, 3)]);
        assert_eq!(de_ranges, vec![MisspellRange::new(8, 1)]);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Corrections
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_correction_removes_range() {
        let dict = english();
        let mut text = "Thiss is a tset.".to_string();
        let ranges = highlight(&text, Some(&dict));
        assert_eq!(ranges.len(), 2);

        let target = ranges[1];
        let suggestion = suggest(target.text(&text), Some(&dict))
            .into_iter()
            .next()
            .unwrap();
        assert_eq!(suggestion, "test");

        let cursor = apply_correction(&mut text, target, &suggestion).unwrap();
        assert_eq!(text, "Thiss is a test.");
        assert_eq!(cursor, 15);
        assert_eq!(highlight(&text, Some(&dict)), vec![MisspellRange::new(0, 5)]);
    }

    #[test]
    fn test_correction_with_multibyte_text() {
        let mut text = "Grüsse und Köln".to_string();
        let cursor = apply_correction(&mut text, MisspellRange::new(0, 6), "Grüße").unwrap();
        assert_eq!(text, "Grüße und Köln");
        assert_eq!(cursor, 5);
    }

    #[test]
    fn test_correction_out_of_bounds() {
        let mut text = "short".to_string();
        assert_eq!(apply_correction(&mut text, MisspellRange::new(3, 10), "x"), None);
        assert_eq!(text, "short");
    }

    #[test]
    fn test_suggest_without_dictionary() {
        assert!(suggest("tset", None).is_empty());
    }

    #[test]
    fn test_misspelling_at() {
        let ranges = vec![MisspellRange::new(0, 5), MisspellRange::new(11, 4)];
        assert_eq!(misspelling_at(&ranges, 3), Some(ranges[0]));
        assert_eq!(misspelling_at(&ranges, 5), Some(ranges[0]));
        assert_eq!(misspelling_at(&ranges, 8), None);
        assert_eq!(misspelling_at(&ranges, 11), Some(ranges[1]));
        assert_eq!(misspelling_at(&ranges, 20), None);
    }
}
