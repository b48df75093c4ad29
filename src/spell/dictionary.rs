//! Dictionaries
//!
//! [`Dictionary`] is the word-recognition handle the highlighter queries.
//! [`WordListDictionary`] implements it over a plain word list or a hunspell
//! `.dic` file plus its affix rules.

use super::affix::{AffixRules, Flag};
use std::collections::{HashMap, HashSet};

/// Maximum number of suggestions returned for one word.
pub const MAX_SUGGESTIONS: usize = 8;

/// A loaded word list for one language.
pub trait Dictionary {
    /// Language tag this dictionary was loaded for (e.g. `en_US`).
    fn language_tag(&self) -> &str;

    /// Whether `word` is correctly spelled.
    fn is_correct(&self, word: &str) -> bool;

    /// Ordered replacement candidates for a misspelled word.
    fn suggest(&self, word: &str) -> Vec<String>;

    /// Accept `word` from now on (user dictionary).
    fn add_word(&mut self, word: &str);

    /// Accept `word` for the lifetime of this handle only.
    fn ignore_word(&mut self, word: &str);
}

/// Dictionary backed by an in-memory word table with optional affix rules.
#[derive(Debug, Clone)]
pub struct WordListDictionary {
    language_tag: String,
    words: HashMap<String, Vec<Flag>>,
    rules: AffixRules,
    /// Alphabet used for insertion/replacement suggestions
    alphabet: Vec<char>,
    ignored: HashSet<String>,
}

impl WordListDictionary {
    /// Build a dictionary from a plain list of words.
    pub fn from_words<I, S>(language_tag: &str, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .map(|w| (w, Vec::new()))
            .collect();
        Self::with_rules(language_tag, words, AffixRules::default())
    }

    /// Parse a plain word list: one word per line, `#` starts a comment line.
    pub fn from_word_list(language_tag: &str, text: &str) -> Self {
        Self::from_words(
            language_tag,
            text.lines()
                .map(str::trim)
                .filter(|line| !line.starts_with('#')),
        )
    }

    /// Parse a hunspell `.dic` file with the rules of its `.aff` file.
    pub fn from_hunspell(language_tag: &str, dic: &str, rules: AffixRules) -> Self {
        let mut words: HashMap<String, Vec<Flag>> = HashMap::new();
        let mut lines = dic.lines().peekable();

        // The first line is the approximate word count.
        if let Some(first) = lines.peek() {
            if first.trim().parse::<usize>().is_ok() {
                lines.next();
            }
        }

        for line in lines {
            let Some((word, flags)) = parse_dic_line(line) else {
                continue;
            };
            let flags = rules.flag_mode.parse_flags(flags);
            // Homonyms share an entry; their flags are merged.
            let entry = words.entry(word).or_default();
            for flag in flags {
                if !entry.contains(&flag) {
                    entry.push(flag);
                }
            }
        }

        Self::with_rules(language_tag, words, rules)
    }

    fn with_rules(language_tag: &str, words: HashMap<String, Vec<Flag>>, rules: AffixRules) -> Self {
        let alphabet = if rules.try_chars.is_empty() {
            derive_alphabet(words.keys())
        } else {
            let mut seen = HashSet::new();
            rules
                .try_chars
                .chars()
                .filter(|c| seen.insert(*c))
                .collect()
        };

        Self {
            language_tag: language_tag.to_string(),
            words,
            rules,
            alphabet,
            ignored: HashSet::new(),
        }
    }

    /// Number of stems in the word table.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Exact-case lookup of a word or one of its affixed forms.
    fn accepts(&self, word: &str) -> bool {
        if self.ignored.contains(word) {
            return true;
        }
        match self.words.get(word) {
            Some(flags) if self.rules.is_forbidden(flags) => return false,
            Some(flags) if self.rules.allows_standalone(flags) => return true,
            _ => {}
        }
        self.rules
            .check_affixed(word, |stem| self.words.get(stem).map(Vec::as_slice))
    }

    /// Generate candidate spellings in priority order, unfiltered.
    fn candidates(&self, word: &str) -> Vec<String> {
        let chars: Vec<char> = word.chars().collect();
        let mut out = Vec::new();

        // Replacement table
        for (from, to) in &self.rules.replacements {
            if from.is_empty() {
                continue;
            }
            for (idx, _) in word.match_indices(from.as_str()) {
                out.push(format!("{}{}{}", &word[..idx], to, &word[idx + from.len()..]));
            }
        }

        // Swapped neighbours
        for i in 0..chars.len().saturating_sub(1) {
            let mut swapped = chars.clone();
            swapped.swap(i, i + 1);
            out.push(swapped.into_iter().collect());
        }

        // One character replaced
        for i in 0..chars.len() {
            for &c in &self.alphabet {
                if c != chars[i] {
                    let mut replaced = chars.clone();
                    replaced[i] = c;
                    out.push(replaced.into_iter().collect());
                }
            }
        }

        // One character removed
        if chars.len() > 1 {
            for i in 0..chars.len() {
                let mut removed = chars.clone();
                removed.remove(i);
                out.push(removed.into_iter().collect());
            }
        }

        // One character inserted
        for i in 0..=chars.len() {
            for &c in &self.alphabet {
                let mut inserted = chars.clone();
                inserted.insert(i, c);
                out.push(inserted.into_iter().collect());
            }
        }

        out
    }
}

impl Dictionary for WordListDictionary {
    fn language_tag(&self) -> &str {
        &self.language_tag
    }

    fn is_correct(&self, word: &str) -> bool {
        let word = word.trim_matches('\'');
        if !word.chars().any(char::is_alphabetic) {
            return true;
        }
        if self.accepts(word) {
            return true;
        }

        match casing(word) {
            Casing::AllUpper => {
                let lower = word.to_lowercase();
                self.accepts(&capitalize(&lower)) || self.accepts(&lower)
            }
            Casing::Capitalized => self.accepts(&word.to_lowercase()),
            Casing::Lower | Casing::Mixed => false,
        }
    }

    fn suggest(&self, word: &str) -> Vec<String> {
        let capitalized = matches!(casing(word), Casing::Capitalized | Casing::AllUpper);
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for candidate in self.candidates(word) {
            let candidate = if capitalized {
                capitalize(&candidate)
            } else {
                candidate
            };
            if candidate == word || seen.contains(&candidate) {
                continue;
            }
            if self.is_correct(&candidate) {
                seen.insert(candidate.clone());
                out.push(candidate);
                if out.len() == MAX_SUGGESTIONS {
                    break;
                }
            }
        }
        out
    }

    fn add_word(&mut self, word: &str) {
        let word = word.trim();
        if !word.is_empty() {
            self.words.entry(word.to_string()).or_default();
        }
    }

    fn ignore_word(&mut self, word: &str) {
        let word = word.trim();
        if !word.is_empty() {
            self.ignored.insert(word.to_string());
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Split a `.dic` line into the word and its flag string.
///
/// Morphological fields after the first whitespace are dropped, and `\/`
/// escapes a slash inside the word.
fn parse_dic_line(line: &str) -> Option<(String, &str)> {
    let entry = line.split_whitespace().next()?;
    if entry.starts_with('#') {
        return None;
    }

    let mut word = String::with_capacity(entry.len());
    let mut flags = "";
    let mut chars = entry.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' if entry[i + 1..].starts_with('/') => {
                word.push('/');
                chars.next();
            }
            '/' => {
                flags = &entry[i + 1..];
                break;
            }
            other => word.push(other),
        }
    }

    (!word.is_empty()).then_some((word, flags))
}

/// Lowercase letters occurring in the word list, most frequent first.
fn derive_alphabet<'a>(words: impl Iterator<Item = &'a String>) -> Vec<char> {
    let mut counts: HashMap<char, usize> = HashMap::new();
    for word in words {
        for c in word.chars().filter(|c| c.is_alphabetic() || *c == '\'') {
            for lower in c.to_lowercase() {
                *counts.entry(lower).or_default() += 1;
            }
        }
    }
    let mut alphabet: Vec<(char, usize)> = counts.into_iter().collect();
    alphabet.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    alphabet.into_iter().map(|(c, _)| c).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Casing {
    Lower,
    Capitalized,
    AllUpper,
    Mixed,
}

fn casing(word: &str) -> Casing {
    let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
    let upper = letters.iter().filter(|c| c.is_uppercase()).count();
    match letters.first() {
        _ if upper == 0 => Casing::Lower,
        _ if upper == letters.len() && letters.len() > 1 => Casing::AllUpper,
        Some(first) if first.is_uppercase() && upper == 1 => Casing::Capitalized,
        _ => Casing::Mixed,
    }
}

/// Uppercase the first character, leave the rest as is.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const AFF: &str = "\
SET UTF-8
TRY esianrtolcdugmphbyfvkwz
REP 1
REP f ph
SFX S Y 1
SFX S   0     s          .
SFX D Y 2
SFX D   0     d          e
SFX D   0     ed         [^e]
";

    const DIC: &str = "\
6
test/SD
bake/D
Paris
NASA
is
a
";

    fn english() -> WordListDictionary {
        let rules = AffixRules::parse(AFF).unwrap();
        WordListDictionary::from_hunspell("en_US", DIC, rules)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_word_count_skips_header() {
        assert_eq!(english().word_count(), 6);
    }

    #[test]
    fn test_parse_dic_line() {
        assert_eq!(parse_dic_line("test/SD"), Some(("test".to_string(), "SD")));
        assert_eq!(parse_dic_line("word\tpo:noun"), Some(("word".to_string(), "")));
        assert_eq!(parse_dic_line("and\\/or/X"), Some(("and/or".to_string(), "X")));
        assert_eq!(parse_dic_line("   "), None);
    }

    #[test]
    fn test_word_list_ignores_comments_and_blanks() {
        let dict = WordListDictionary::from_word_list("en_US", "# header\nhello\n\n  world  \n");
        assert_eq!(dict.word_count(), 2);
        assert!(dict.is_correct("world"));
    }

    #[test]
    fn test_homonym_flags_are_merged() {
        let rules = AffixRules::parse(AFF).unwrap();
        let dict = WordListDictionary::from_hunspell("en_US", "2\nwalk/S\nwalk/D\n", rules);
        assert!(dict.is_correct("walks"));
        assert!(dict.is_correct("walked"));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Checking
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_known_and_affixed_words() {
        let dict = english();
        assert!(dict.is_correct("test"));
        assert!(dict.is_correct("tests"));
        assert!(dict.is_correct("tested"));
        assert!(dict.is_correct("baked"));
        assert!(!dict.is_correct("bakes"));
        assert!(!dict.is_correct("Thiss"));
    }

    #[test]
    fn test_casing_rules() {
        let dict = english();
        assert!(dict.is_correct("Test"));
        assert!(dict.is_correct("TEST"));
        assert!(dict.is_correct("Tests"));
        assert!(dict.is_correct("Paris"));
        assert!(dict.is_correct("PARIS"));
        assert!(!dict.is_correct("paris"));
        assert!(dict.is_correct("NASA"));
        assert!(!dict.is_correct("Nasa"));
        assert!(!dict.is_correct("tEsT"));
    }

    #[test]
    fn test_non_alphabetic_tokens_are_correct() {
        let dict = english();
        assert!(dict.is_correct("2024"));
        assert!(dict.is_correct("__"));
        assert!(dict.is_correct("'"));
    }

    #[test]
    fn test_surrounding_apostrophes_are_ignored() {
        let dict = english();
        assert!(dict.is_correct("'test'"));
    }

    #[test]
    fn test_add_and_ignore() {
        let mut dict = english();
        assert!(!dict.is_correct("yame"));
        dict.add_word("yame");
        assert!(dict.is_correct("yame"));
        assert!(dict.is_correct("Yame"));

        assert!(!dict.is_correct("Qwzx"));
        dict.ignore_word("Qwzx");
        assert!(dict.is_correct("Qwzx"));
        assert!(!dict.is_correct("qwzx"));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Suggestions
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_suggest_edit_distance_one() {
        let dict = english();
        let suggestions = dict.suggest("tset");
        assert_eq!(suggestions.first().map(String::as_str), Some("test"));
        assert!(dict.suggest("testt").contains(&"test".to_string()));
        assert!(dict.suggest("tst").contains(&"test".to_string()));
        assert!(dict.suggest("tezt").contains(&"test".to_string()));
    }

    #[test]
    fn test_suggest_preserves_capital() {
        let dict = english();
        let suggestions = dict.suggest("Tets");
        assert!(suggestions.contains(&"Test".to_string()));
        assert!(suggestions.iter().all(|s| s.starts_with(char::is_uppercase)));
    }

    #[test]
    fn test_suggest_uses_replacement_table() {
        let dict = WordListDictionary::from_hunspell(
            "en_US",
            "1\nphone\n",
            AffixRules::parse("REP 1\nREP f ph\n").unwrap(),
        );
        assert_eq!(dict.suggest("fone"), vec!["phone".to_string()]);
    }

    #[test]
    fn test_suggestions_are_unique_and_capped() {
        let words: Vec<String> = ('a'..='z').map(|c| format!("{}at", c)).collect();
        let dict = WordListDictionary::from_words("en_US", &words);
        let suggestions = dict.suggest("xxat");
        assert!(suggestions.len() <= MAX_SUGGESTIONS);
        let unique: HashSet<_> = suggestions.iter().collect();
        assert_eq!(unique.len(), suggestions.len());
        assert!(!suggestions.contains(&"xxat".to_string()));
    }

    #[test]
    fn test_casing_classification() {
        assert_eq!(casing("word"), Casing::Lower);
        assert_eq!(casing("Word"), Casing::Capitalized);
        assert_eq!(casing("WORD"), Casing::AllUpper);
        assert_eq!(casing("wOrd"), Casing::Mixed);
        assert_eq!(casing("I"), Casing::Capitalized);
    }
}
