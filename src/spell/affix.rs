//! Hunspell affix rules
//!
//! Parses the subset of the hunspell `.aff` format needed to accept
//! inflected words: flag encoding, `TRY`, `REP`, `PFX`/`SFX` tables and the
//! `NEEDAFFIX`, `ONLYINCOMPOUND` and `FORBIDDENWORD` flags. Words are
//! checked by stripping affixes at lookup time rather than expanding the
//! whole word list up front.
//!
//! Compounding rules are not supported.

use std::collections::HashMap;

/// A dictionary flag, normalized to a number regardless of encoding.
pub type Flag = u32;

// ─────────────────────────────────────────────────────────────────────────────
// Flag encoding
// ─────────────────────────────────────────────────────────────────────────────

/// How flags are written in the `.dic` and `.aff` files (`FLAG` directive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagMode {
    /// One character per flag (the default, also used for `FLAG UTF-8`)
    #[default]
    Char,
    /// Two characters per flag (`FLAG long`)
    Long,
    /// Comma separated decimal numbers (`FLAG num`)
    Numeric,
}

impl FlagMode {
    /// Decode a flag string into individual flags.
    pub fn parse_flags(&self, s: &str) -> Vec<Flag> {
        match self {
            FlagMode::Char => s.chars().map(|c| c as Flag).collect(),
            FlagMode::Long => {
                let chars: Vec<char> = s.chars().collect();
                chars
                    .chunks(2)
                    .map(|pair| match pair {
                        [a, b] => ((*a as Flag) << 16) | (*b as Flag),
                        [a] => *a as Flag,
                        _ => 0,
                    })
                    .collect()
            }
            FlagMode::Numeric => s
                .split(',')
                .filter_map(|n| n.trim().parse::<Flag>().ok())
                .collect(),
        }
    }

    /// Decode a single flag (used by directives like `NEEDAFFIX`).
    fn parse_flag(&self, s: &str) -> Option<Flag> {
        self.parse_flags(s).into_iter().next()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conditions
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum CondUnit {
    Any,
    Char(char),
    Set { chars: Vec<char>, negated: bool },
}

impl CondUnit {
    fn matches(&self, c: char) -> bool {
        match self {
            CondUnit::Any => true,
            CondUnit::Char(expected) => *expected == c,
            CondUnit::Set { chars, negated } => chars.contains(&c) != *negated,
        }
    }
}

/// The character condition an affix entry places on the stem,
/// e.g. `[^aeiou]y` or `.`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Condition {
    units: Vec<CondUnit>,
}

impl Condition {
    /// Parse a condition pattern. `.` alone matches any stem.
    pub fn parse(pattern: &str) -> Result<Self, String> {
        if pattern == "." {
            return Ok(Self::default());
        }

        let mut units = Vec::new();
        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            match c {
                '.' => units.push(CondUnit::Any),
                '[' => {
                    let mut set = Vec::new();
                    let mut negated = false;
                    let mut closed = false;
                    for (i, c) in chars.by_ref().enumerate() {
                        match c {
                            '^' if i == 0 => negated = true,
                            ']' => {
                                closed = true;
                                break;
                            }
                            other => set.push(other),
                        }
                    }
                    if !closed {
                        return Err(format!("unterminated '[' in condition '{}'", pattern));
                    }
                    units.push(CondUnit::Set {
                        chars: set,
                        negated,
                    });
                }
                other => units.push(CondUnit::Char(other)),
            }
        }
        Ok(Self { units })
    }

    /// Check the condition against the start of a stem (prefix rules).
    pub fn matches_start(&self, stem: &str) -> bool {
        let mut chars = stem.chars();
        self.units
            .iter()
            .all(|unit| chars.next().map(|c| unit.matches(c)).unwrap_or(false))
    }

    /// Check the condition against the end of a stem (suffix rules).
    pub fn matches_end(&self, stem: &str) -> bool {
        let mut chars = stem.chars().rev();
        self.units
            .iter()
            .rev()
            .all(|unit| chars.next().map(|c| unit.matches(c)).unwrap_or(false))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Affix entries
// ─────────────────────────────────────────────────────────────────────────────

/// One line of a `PFX`/`SFX` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffixEntry {
    pub flag: Flag,
    pub cross_product: bool,
    /// Characters removed from the stem before adding the affix
    pub strip: String,
    /// Characters added to form the word
    pub add: String,
    pub condition: Condition,
}

/// Parsed affix file.
#[derive(Debug, Clone, Default)]
pub struct AffixRules {
    pub flag_mode: FlagMode,
    /// Declared character set (`SET`), upper-cased as written
    pub encoding: Option<String>,
    /// Characters tried when generating suggestions (`TRY`)
    pub try_chars: String,
    /// Common misspelling replacements (`REP`)
    pub replacements: Vec<(String, String)>,
    pub need_affix: Option<Flag>,
    pub only_in_compound: Option<Flag>,
    pub forbidden: Option<Flag>,
    /// Prefix entries keyed by the text they add
    prefixes: HashMap<String, Vec<AffixEntry>>,
    /// Suffix entries keyed by the text they add
    suffixes: HashMap<String, Vec<AffixEntry>>,
}

/// Peek at the `SET` directive of a raw affix file without decoding it.
pub fn declared_encoding(raw: &[u8]) -> Option<String> {
    raw.split(|&b| b == b'\n').find_map(|line| {
        let line = String::from_utf8_lossy(line);
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("SET"), Some(enc)) => Some(enc.to_ascii_uppercase()),
            _ => None,
        }
    })
}

impl AffixRules {
    /// Parse the text of an `.aff` file.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut rules = AffixRules::default();
        let mut cross_products: HashMap<(bool, Flag), bool> = HashMap::new();

        // FLAG must be known before any flag is decoded, and it may appear late.
        for line in text.lines() {
            let mut parts = line.split_whitespace();
            if let (Some("FLAG"), Some(mode)) = (parts.next(), parts.next()) {
                rules.flag_mode = match mode {
                    "long" => FlagMode::Long,
                    "num" => FlagMode::Numeric,
                    _ => FlagMode::Char,
                };
            }
        }

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();

            match parts[0] {
                "SET" if parts.len() > 1 => {
                    rules.encoding = Some(parts[1].to_ascii_uppercase());
                }
                "TRY" if parts.len() > 1 => {
                    rules.try_chars = parts[1].to_string();
                }
                "REP" if parts.len() >= 3 => {
                    let from = parts[1].trim_start_matches('^').trim_end_matches('$');
                    let to = parts[2];
                    rules
                        .replacements
                        .push((from.replace('_', " "), to.replace('_', " ")));
                }
                "NEEDAFFIX" | "PSEUDOROOT" if parts.len() > 1 => {
                    rules.need_affix = rules.flag_mode.parse_flag(parts[1]);
                }
                "ONLYINCOMPOUND" if parts.len() > 1 => {
                    rules.only_in_compound = rules.flag_mode.parse_flag(parts[1]);
                }
                "FORBIDDENWORD" if parts.len() > 1 => {
                    rules.forbidden = rules.flag_mode.parse_flag(parts[1]);
                }
                kind @ ("PFX" | "SFX") => {
                    let is_prefix = kind == "PFX";
                    if parts.len() < 4 {
                        return Err(format!("line {}: truncated {} entry", line_no + 1, kind));
                    }
                    let flag = rules.flag_mode.parse_flag(parts[1]).ok_or_else(|| {
                        format!("line {}: invalid flag '{}'", line_no + 1, parts[1])
                    })?;

                    let is_header = parts.len() == 4
                        && matches!(parts[2], "Y" | "N")
                        && parts[3].parse::<usize>().is_ok();
                    if is_header {
                        cross_products.insert((is_prefix, flag), parts[2] == "Y");
                        continue;
                    }

                    let strip = if parts[2] == "0" { "" } else { parts[2] };
                    // Continuation flags after '/' are not supported and dropped.
                    let add = parts[3].split('/').next().unwrap_or("");
                    let add = if add == "0" { "" } else { add };
                    let condition = Condition::parse(parts.get(4).copied().unwrap_or("."))
                        .map_err(|e| format!("line {}: {}", line_no + 1, e))?;

                    let entry = AffixEntry {
                        flag,
                        cross_product: cross_products
                            .get(&(is_prefix, flag))
                            .copied()
                            .unwrap_or(false),
                        strip: strip.to_string(),
                        add: add.to_string(),
                        condition,
                    };
                    let table = if is_prefix {
                        &mut rules.prefixes
                    } else {
                        &mut rules.suffixes
                    };
                    table.entry(entry.add.clone()).or_default().push(entry);
                }
                _ => {}
            }
        }

        Ok(rules)
    }

    /// Number of prefix and suffix entries.
    pub fn entry_count(&self) -> usize {
        self.prefixes.values().map(Vec::len).sum::<usize>()
            + self.suffixes.values().map(Vec::len).sum::<usize>()
    }

    /// Whether the flags of a bare dictionary word allow it on its own.
    pub fn allows_standalone(&self, flags: &[Flag]) -> bool {
        let blocked = [self.need_affix, self.only_in_compound, self.forbidden];
        !blocked
            .iter()
            .flatten()
            .any(|flag| flags.contains(flag))
    }

    /// Whether a word's flags mark it as forbidden.
    pub fn is_forbidden(&self, flags: &[Flag]) -> bool {
        self.forbidden.map(|f| flags.contains(&f)).unwrap_or(false)
    }

    /// Check whether `word` is an affixed form of a stem accepted by `lookup`.
    ///
    /// `lookup` returns the flags of a stem if it is in the word list.
    pub fn check_affixed<'d, F>(&self, word: &str, lookup: F) -> bool
    where
        F: Fn(&str) -> Option<&'d [Flag]>,
    {
        let has = |stem: &str, flag: Flag| -> bool {
            lookup(stem)
                .map(|flags| flags.contains(&flag) && !self.is_forbidden(flags))
                .unwrap_or(false)
        };

        // Suffix only
        for (stem, entry) in self.suffix_stems(word) {
            if has(&stem, entry.flag) {
                return true;
            }
        }

        // Prefix only, and prefix + suffix when both allow cross products
        for (after_prefix, prefix) in self.prefix_stems(word) {
            if has(&after_prefix, prefix.flag) {
                return true;
            }
            if !prefix.cross_product {
                continue;
            }
            for (root, suffix) in self.suffix_stems(&after_prefix) {
                if suffix.cross_product
                    && prefix.condition.matches_start(&root)
                    && has(&root, prefix.flag)
                    && has(&root, suffix.flag)
                {
                    return true;
                }
            }
        }

        false
    }

    /// All (stem, entry) pairs obtained by removing a suffix from `word`.
    fn suffix_stems<'a>(&'a self, word: &'a str) -> impl Iterator<Item = (String, &'a AffixEntry)> + 'a {
        char_boundaries(word).flat_map(move |split| {
            let (base, add) = word.split_at(split);
            self.suffixes
                .get(add)
                .into_iter()
                .flatten()
                .filter_map(move |entry| {
                    if base.is_empty() && entry.strip.is_empty() {
                        return None;
                    }
                    let stem = format!("{}{}", base, entry.strip);
                    entry.condition.matches_end(&stem).then_some((stem, entry))
                })
        })
    }

    /// All (stem, entry) pairs obtained by removing a prefix from `word`.
    fn prefix_stems<'a>(&'a self, word: &'a str) -> impl Iterator<Item = (String, &'a AffixEntry)> + 'a {
        char_boundaries(word).flat_map(move |split| {
            let (add, rest) = word.split_at(split);
            self.prefixes
                .get(add)
                .into_iter()
                .flatten()
                .filter_map(move |entry| {
                    if rest.is_empty() && entry.strip.is_empty() {
                        return None;
                    }
                    let stem = format!("{}{}", entry.strip, rest);
                    entry.condition.matches_start(&stem).then_some((stem, entry))
                })
        })
    }
}

/// Every byte offset in `s` that falls on a character boundary, including
/// both ends.
fn char_boundaries(s: &str) -> impl Iterator<Item = usize> + '_ {
    s.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(s.len()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
