//! Character/byte index conversions
//!
//! Rust strings are indexed by UTF-8 byte offsets, while egui cursors and
//! the spell-check ranges count characters. Characters like `ø`, `ß` or
//! `中` are multi-byte in UTF-8, so the two never line up outside ASCII.
//! These helpers translate between the two without ever slicing inside a
//! character.

use std::ops::Range;

/// Convert a character index to a byte index.
///
/// Returns the string length if `char_index` is beyond the string.
pub fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Convert a character range to the equivalent byte range.
pub fn char_range_to_byte_range(s: &str, range: Range<usize>) -> Range<usize> {
    let start = char_index_to_byte_index(s, range.start);
    let end = start + char_index_to_byte_index(&s[start..], range.end.saturating_sub(range.start));
    start..end
}

/// Return the 1-indexed line number containing the given character index.
pub fn line_of_char_index(s: &str, char_index: usize) -> usize {
    1 + s.chars().take(char_index).filter(|&c| c == '\n').count()
}

/// Return the character index where the 1-indexed `line` starts.
///
/// Lines past the end map to the end of the string.
pub fn line_start_char_index(s: &str, line: usize) -> usize {
    if line <= 1 {
        return 0;
    }
    let mut newlines = 0;
    for (i, c) in s.chars().enumerate() {
        if c == '\n' {
            newlines += 1;
            if newlines == line - 1 {
                return i + 1;
            }
        }
    }
    s.chars().count()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
