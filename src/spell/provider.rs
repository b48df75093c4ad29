//! Dictionary discovery and loading
//!
//! Dictionaries are looked up by language tag in a list of directories.
//! A directory may hold a hunspell pair (`en_US.dic` + `en_US.aff`) or a
//! plain word list (`en_US.txt`). The first directory that has either wins.

use super::affix::{declared_encoding, AffixRules};
use super::dictionary::{Dictionary, WordListDictionary};
use crate::error::{Error, Result};
use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Language tags look like `en`, `en_US`, `de-DE` or `sr_Latn_RS`.
const TAG_PATTERN: &str = r"^[A-Za-z]{2,3}([_-][A-Za-z0-9]{2,8})*$";

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

/// Loads dictionaries for language tags.
pub trait DictionaryProvider {
    /// Load the dictionary for `language_tag`.
    ///
    /// Fails with a lookup error ([`Error::is_lookup`]) if the tag is
    /// malformed or no dictionary exists for it.
    fn load(&self, language_tag: &str) -> Result<Box<dyn Dictionary>>;

    /// Language tags this provider can load.
    fn available_languages(&self) -> Vec<String> {
        Vec::new()
    }

    /// Include `word` in dictionaries loaded from now on.
    fn remember_word(&mut self, _word: &str) {}
}

/// Validate a language tag and normalize `-` separators to `_`.
pub fn normalize_tag(tag: &str) -> Result<String> {
    let regex = TAG_REGEX.get_or_init(|| Regex::new(TAG_PATTERN).expect("tag pattern is valid"));
    let tag = tag.trim();
    if regex.is_match(tag) {
        Ok(tag.replace('-', "_"))
    } else {
        Err(Error::UnknownLanguage(tag.to_string()))
    }
}

/// System directories where distributions install hunspell dictionaries.
pub fn system_dictionary_dirs() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("/usr/share/hunspell"),
        PathBuf::from("/usr/share/myspell"),
        PathBuf::from("/usr/share/myspell/dicts"),
        PathBuf::from("/usr/local/share/hunspell"),
        PathBuf::from("/Library/Spelling"),
    ];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join("Library").join("Spelling"));
        paths.push(home.join(".local").join("share").join("hunspell"));
    }
    paths
}

/// Filesystem-backed provider for hunspell dictionaries and word lists.
#[derive(Debug, Clone, Default)]
pub struct HunspellProvider {
    search_dirs: Vec<PathBuf>,
    personal_words: Vec<String>,
}

impl HunspellProvider {
    /// Create a provider searching `search_dirs` in order.
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            search_dirs,
            personal_words: Vec::new(),
        }
    }

    /// Words added to every dictionary this provider loads.
    pub fn with_personal_words(mut self, words: Vec<String>) -> Self {
        self.personal_words = words;
        self
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    fn load_from_dir(&self, dir: &Path, tag: &str) -> Result<Option<WordListDictionary>> {
        let dic_path = dir.join(format!("{}.dic", tag));
        if dic_path.is_file() {
            let aff_path = dir.join(format!("{}.aff", tag));
            let (rules, encoding) = if aff_path.is_file() {
                let raw = read_raw(&aff_path)?;
                let encoding = declared_encoding(&raw);
                let text = decode(raw, encoding.as_deref(), &aff_path)?;
                let rules = AffixRules::parse(&text).map_err(|message| Error::DictionaryParse {
                    path: aff_path.clone(),
                    message,
                })?;
                (rules, encoding)
            } else {
                (AffixRules::default(), None)
            };

            let text = decode(read_raw(&dic_path)?, encoding.as_deref(), &dic_path)?;
            debug!(
                "Parsed affix file for {} with {} entries",
                tag,
                rules.entry_count()
            );
            return Ok(Some(WordListDictionary::from_hunspell(tag, &text, rules)));
        }

        let txt_path = dir.join(format!("{}.txt", tag));
        if txt_path.is_file() {
            let text = decode(read_raw(&txt_path)?, None, &txt_path)?;
            return Ok(Some(WordListDictionary::from_word_list(tag, &text)));
        }

        Ok(None)
    }
}

impl DictionaryProvider for HunspellProvider {
    fn load(&self, language_tag: &str) -> Result<Box<dyn Dictionary>> {
        let tag = normalize_tag(language_tag)?;

        for dir in &self.search_dirs {
            let Some(mut dictionary) = self.load_from_dir(dir, &tag)? else {
                continue;
            };
            for word in &self.personal_words {
                dictionary.add_word(word);
            }
            info!(
                "Loaded dictionary {} from {} ({} words)",
                tag,
                dir.display(),
                dictionary.word_count()
            );
            return Ok(Box::new(dictionary));
        }

        Err(Error::DictionaryNotFound {
            tag,
            searched: self.search_dirs.clone(),
        })
    }

    fn available_languages(&self) -> Vec<String> {
        let mut tags = BTreeSet::new();
        for dir in &self.search_dirs {
            let Ok(entries) = fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                let is_dictionary = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e == "dic" || e == "txt")
                    .unwrap_or(false);
                if !is_dictionary {
                    continue;
                }
                if let Some(tag) = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(|s| normalize_tag(s).ok())
                {
                    tags.insert(tag);
                }
            }
        }
        debug!("Discovered {} dictionaries", tags.len());
        tags.into_iter().collect()
    }

    fn remember_word(&mut self, word: &str) {
        if !self.personal_words.iter().any(|w| w == word) {
            self.personal_words.push(word.to_string());
        }
    }
}

fn read_raw(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode dictionary bytes using the encoding declared by the affix file.
///
/// Files without a `SET` line are UTF-8. A leading byte order mark is
/// dropped.
fn decode(raw: Vec<u8>, encoding: Option<&str>, path: &Path) -> Result<String> {
    let encoding = match encoding {
        None => UTF_8,
        Some(label) => resolve_encoding(label).ok_or_else(|| Error::DictionaryParse {
            path: path.to_path_buf(),
            message: format!("unsupported encoding {}", label),
        })?,
    };
    let (text, had_errors) = encoding.decode_with_bom_removal(&raw);
    if had_errors {
        return Err(Error::DictionaryParse {
            path: path.to_path_buf(),
            message: format!("file is not valid {}", encoding.name()),
        });
    }
    Ok(text.into_owned())
}

/// Map a hunspell `SET` value to an encoding.
fn resolve_encoding(label: &str) -> Option<&'static Encoding> {
    let label = label.trim();
    // Hunspell spells the Windows code pages `microsoft-cp125x`.
    let label = label
        .get(..10)
        .filter(|prefix| prefix.eq_ignore_ascii_case("microsoft-"))
        .map_or(label, |_| &label[10..]);
    Encoding::for_label(label.as_bytes())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &[u8]) {
        fs::write(dir.join(name), contents).unwrap();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tags
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("en_US").unwrap(), "en_US");
        assert_eq!(normalize_tag("de-DE").unwrap(), "de_DE");
        assert_eq!(normalize_tag("nb").unwrap(), "nb");
    }

    #[test]
    fn test_invalid_tags_are_lookup_errors() {
        for tag in ["", "x", "en US", "../etc/passwd", "en_"] {
            let err = normalize_tag(tag).unwrap_err();
            assert!(err.is_lookup(), "{:?} should be rejected", tag);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_load_hunspell_pair() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "en_US.aff", b"SET UTF-8\nSFX S Y 1\nSFX S 0 s .\n");
        write(dir.path(), "en_US.dic", b"2\ntest/S\nis\n");

        let provider = HunspellProvider::new(vec![dir.path().to_path_buf()]);
        let dict = provider.load("en-US").unwrap();
        assert_eq!(dict.language_tag(), "en_US");
        assert!(dict.is_correct("tests"));
        assert!(dict.is_correct("is"));
        assert!(!dict.is_correct("iss"));
    }

    #[test]
    fn test_load_latin1_dictionary() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "de_DE.aff", b"SET ISO8859-1\n");
        // "Gr\xfc\xdfe" is "Grüße" in ISO-8859-1
        write(dir.path(), "de_DE.dic", b"1\nGr\xfc\xdfe\n");

        let provider = HunspellProvider::new(vec![dir.path().to_path_buf()]);
        let dict = provider.load("de_DE").unwrap();
        assert!(dict.is_correct("Grüße"));
    }

    #[test]
    fn test_load_latin9_dictionary() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "de_DE.aff", b"SET ISO8859-15\n");
        // 0xA4 is the euro sign in ISO-8859-15
        write(dir.path(), "de_DE.dic", b"2\nGr\xfc\xdfe\n\xa4uro\n");

        let provider = HunspellProvider::new(vec![dir.path().to_path_buf()]);
        let dict = provider.load("de_DE").unwrap();
        assert!(dict.is_correct("Grüße"));
        assert!(dict.is_correct("€uro"));
    }

    #[test]
    fn test_load_koi8r_dictionary() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "ru_RU.aff", b"SET KOI8-R\n");
        // "\xcd\xc9\xd2" is "мир" in KOI8-R
        write(dir.path(), "ru_RU.dic", b"1\n\xcd\xc9\xd2\n");

        let provider = HunspellProvider::new(vec![dir.path().to_path_buf()]);
        let dict = provider.load("ru_RU").unwrap();
        assert!(dict.is_correct("мир"));
        assert!(!dict.is_correct("мор"));
    }

    #[test]
    fn test_windows_code_page_label() {
        assert_eq!(
            resolve_encoding("microsoft-cp1251").map(Encoding::name),
            Some("windows-1251")
        );
        assert_eq!(resolve_encoding("ISO8859-2").map(Encoding::name), Some("ISO-8859-2"));
    }

    #[test]
    fn test_unknown_encoding_is_parse_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "hi_IN.aff", b"SET ISCII-DEVANAGARI\n");
        write(dir.path(), "hi_IN.dic", b"0\n");
        let provider = HunspellProvider::new(vec![dir.path().to_path_buf()]);
        match provider.load("hi_IN") {
            Err(Error::DictionaryParse { message, .. }) => {
                assert!(message.contains("ISCII-DEVANAGARI"), "{}", message)
            }
            other => panic!("expected DictionaryParse, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_load_plain_word_list() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "eo.txt", "saluton\nmondo\n".as_bytes());

        let provider = HunspellProvider::new(vec![dir.path().to_path_buf()]);
        let dict = provider.load("eo").unwrap();
        assert!(dict.is_correct("mondo"));
        assert!(!dict.is_correct("world"));
    }

    #[test]
    fn test_first_directory_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write(first.path(), "en_US.txt", b"alpha\n");
        write(second.path(), "en_US.txt", b"beta\n");

        let provider =
            HunspellProvider::new(vec![first.path().to_path_buf(), second.path().to_path_buf()]);
        let dict = provider.load("en_US").unwrap();
        assert!(dict.is_correct("alpha"));
        assert!(!dict.is_correct("beta"));
    }

    #[test]
    fn test_personal_words_are_applied() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "en_US.txt", b"hello\n");

        let provider = HunspellProvider::new(vec![dir.path().to_path_buf()])
            .with_personal_words(vec!["egui".to_string()]);
        let dict = provider.load("en_US").unwrap();
        assert!(dict.is_correct("egui"));
    }

    #[test]
    fn test_missing_dictionary_is_lookup_error() {
        let dir = TempDir::new().unwrap();
        let provider = HunspellProvider::new(vec![dir.path().to_path_buf()]);
        match provider.load("fr_FR") {
            Err(err @ Error::DictionaryNotFound { .. }) => assert!(err.is_lookup()),
            other => panic!("expected DictionaryNotFound, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "en_US.dic", b"1\n\xff\xfe\n");
        let provider = HunspellProvider::new(vec![dir.path().to_path_buf()]);
        assert!(matches!(
            provider.load("en_US"),
            Err(Error::DictionaryParse { .. })
        ));
    }

    #[test]
    fn test_available_languages() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "en_US.dic", b"0\n");
        write(dir.path(), "en_US.aff", b"");
        write(dir.path(), "de_DE.txt", b"");
        write(dir.path(), "README.md", b"");
        write(dir.path(), "not a tag.txt", b"");

        let provider = HunspellProvider::new(vec![
            dir.path().to_path_buf(),
            PathBuf::from("/nonexistent/yame/dicts"),
        ]);
        assert_eq!(provider.available_languages(), vec!["de_DE", "en_US"]);
    }
}
