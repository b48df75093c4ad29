//! User settings and preferences for YAME
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Theme Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Available color themes for the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Converter Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// The external program that turns Markdown into HTML.
///
/// The document is written to its stdin and HTML is read from its stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterSettings {
    /// Executable name or path
    pub program: String,
    /// Extra command-line arguments
    pub args: Vec<String>,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            program: String::from("markdown"),
            args: Vec::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Window Size Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Window size and position settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSize {
    /// Window width in pixels
    pub width: f32,
    /// Window height in pixels
    pub height: f32,
    /// Whether the window was maximized
    #[serde(default)]
    pub maximized: bool,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            maximized: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// User preferences and application settings.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Conversion
    // ─────────────────────────────────────────────────────────────────────────
    /// Markdown to HTML converter command
    pub converter: ConverterSettings,

    /// Whether the preview follows every edit
    pub preview_sync: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Spell Checking
    // ─────────────────────────────────────────────────────────────────────────
    /// Language tag of the active dictionary
    pub language: String,

    /// Languages always offered in the language picker
    pub languages: Vec<String>,

    /// Extra directories searched for dictionaries, before the defaults
    pub dictionary_dirs: Vec<PathBuf>,

    /// Words added with "Add to dictionary"
    pub personal_words: Vec<String>,

    /// Whether misspelled words are underlined
    pub spell_check_enabled: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Appearance
    // ─────────────────────────────────────────────────────────────────────────
    /// Color theme (light or dark)
    pub theme: Theme,

    /// Font size for the editor (in points)
    pub font_size: f32,

    /// Whether to enable word wrap
    pub word_wrap: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Outline Panel
    // ─────────────────────────────────────────────────────────────────────────
    /// Whether the outline panel is visible
    pub outline_enabled: bool,

    /// Width of the outline panel in pixels
    pub outline_width: f32,

    // ─────────────────────────────────────────────────────────────────────────
    // Session & History
    // ─────────────────────────────────────────────────────────────────────────
    /// Window size
    pub window_size: WindowSize,

    /// Recently opened files (most recent first)
    pub recent_files: Vec<PathBuf>,

    /// Maximum number of recent files to remember
    pub max_recent_files: usize,

    // ─────────────────────────────────────────────────────────────────────────
    // Export Settings
    // ─────────────────────────────────────────────────────────────────────────
    /// Last directory used for HTML export
    pub last_export_directory: Option<PathBuf>,

    /// Whether to open exported files after export
    pub open_after_export: bool,

    /// Whether HTML fragments are wrapped into a complete document on export
    pub export_standalone: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Conversion
            converter: ConverterSettings::default(),
            preview_sync: true,

            // Spell Checking
            language: String::from("en_US"),
            languages: vec![String::from("de_DE"), String::from("en_US")],
            dictionary_dirs: Vec::new(),
            personal_words: Vec::new(),
            spell_check_enabled: true,

            // Appearance
            theme: Theme::default(),
            font_size: 14.0,
            word_wrap: true,

            // Outline Panel
            outline_enabled: true,
            outline_width: 200.0,

            // Session & History
            window_size: WindowSize::default(),
            recent_files: Vec::new(),
            max_recent_files: 10,

            // Export Settings
            last_export_directory: None,
            open_after_export: false,
            export_standalone: true,
        }
    }
}

impl Settings {
    /// Add a file to the recent files list.
    ///
    /// If the file already exists in the list, it's moved to the front.
    /// The list is trimmed to `max_recent_files`.
    pub fn add_recent_file(&mut self, path: PathBuf) {
        self.recent_files.retain(|p| p != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(self.max_recent_files);
    }

    /// Remember a word for every dictionary. Returns false if it was known.
    pub fn add_personal_word(&mut self, word: &str) -> bool {
        let word = word.trim();
        if word.is_empty() || self.personal_words.iter().any(|w| w == word) {
            return false;
        }
        self.personal_words.push(word.to_string());
        true
    }

    /// Languages for the picker: the configured ones plus `discovered`,
    /// sorted and without duplicates.
    pub fn language_choices(&self, discovered: &[String]) -> Vec<String> {
        let mut choices: Vec<String> = self
            .languages
            .iter()
            .chain(discovered)
            .chain(std::iter::once(&self.language))
            .filter(|tag| !tag.trim().is_empty())
            .cloned()
            .collect();
        choices.sort();
        choices.dedup();
        choices
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    /// Minimum allowed font size.
    pub const MIN_FONT_SIZE: f32 = 8.0;
    /// Maximum allowed font size.
    pub const MAX_FONT_SIZE: f32 = 72.0;
    /// Minimum window dimension.
    pub const MIN_WINDOW_SIZE: f32 = 200.0;
    /// Maximum window dimension.
    pub const MAX_WINDOW_SIZE: f32 = 10000.0;
    /// Minimum outline panel width.
    pub const MIN_OUTLINE_WIDTH: f32 = 120.0;
    /// Maximum outline panel width.
    pub const MAX_OUTLINE_WIDTH: f32 = 500.0;

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        self.font_size = self
            .font_size
            .clamp(Self::MIN_FONT_SIZE, Self::MAX_FONT_SIZE);

        self.window_size.width = self
            .window_size
            .width
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);
        self.window_size.height = self
            .window_size
            .height
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);

        if self.max_recent_files == 0 {
            self.max_recent_files = 10;
        } else if self.max_recent_files > 100 {
            self.max_recent_files = 100;
        }
        self.recent_files.truncate(self.max_recent_files);

        self.outline_width = self
            .outline_width
            .clamp(Self::MIN_OUTLINE_WIDTH, Self::MAX_OUTLINE_WIDTH);

        self.converter.program = self.converter.program.trim().to_string();
        self.language = self.language.trim().to_string();
        self.personal_words.retain(|w| !w.trim().is_empty());
    }

    /// Load settings and sanitize them to ensure validity.
    ///
    /// This is a convenience method that deserializes and then sanitizes.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
