//! Application state management for YAME
//!
//! This module defines the [`Document`] being edited and the central
//! [`AppState`] that acts as the document controller: it owns the text,
//! keeps the outline and misspellings in step with it, drives the preview
//! worker and runs open/save/export.

use crate::config::{save_config_silent, Settings, Theme};
use crate::editor::{extract_outline, DocumentOutline};
use crate::error::{Error, Result};
use crate::export;
use crate::preview::{Converter, PreviewPane, PreviewWorker};
use crate::spell::{self, DictionaryProvider, MisspellRange, SpellSession};
use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Application name shown in the window title.
pub const APP_NAME: &str = "YAME";

// ─────────────────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────────────────

/// The text being edited and where it lives on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// File path (None for unsaved/new documents)
    path: Option<PathBuf>,
    /// Document content
    text: String,
    /// Whether there are edits since the last open or save
    dirty: bool,
}

impl Document {
    /// Create an empty, unsaved document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a UTF-8 text file.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            text,
            dirty: false,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// File name, or "Untitled" for a new document.
    pub fn display_name(&self) -> &str {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("Untitled")
    }

    /// Display name with a `*` marker when there are unsaved edits.
    pub fn title(&self) -> String {
        if self.dirty {
            format!("{}*", self.display_name())
        } else {
            self.display_name().to_string()
        }
    }

    /// Write the text to `path`, one line at a time, each with a trailing
    /// newline.
    fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, text_with_line_endings(&self.text)).map_err(|source| Error::FileWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The on-disk form of `text`: every line terminated by `\n`.
fn text_with_line_endings(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    for line in text.lines() {
        out.push_str(line);
        out.push('\n');
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// UI State
// ─────────────────────────────────────────────────────────────────────────────

/// UI-related state flags.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Whether a confirmation dialog is open (e.g., unsaved changes)
    pub show_confirm_dialog: bool,
    /// Message for the confirmation dialog
    pub confirm_dialog_message: String,
    /// Pending action after confirmation
    pub pending_action: Option<PendingAction>,
    /// Whether to show error modal
    pub show_error_modal: bool,
    /// Error message for modal
    pub error_message: String,
    /// Status bar message
    pub status_message: Option<String>,
    /// Temporary toast message (shown in the status bar)
    pub toast_message: Option<String>,
    /// When the toast message should expire (as seconds since app start)
    pub toast_expires_at: Option<f64>,
    /// Line the editor should scroll to on the next frame (1-indexed)
    pub scroll_to_line: Option<usize>,
    /// Line containing the editor cursor (1-indexed)
    pub cursor_line: usize,
    /// Exit was confirmed and the window may close
    pub exit_confirmed: bool,
}

/// Actions that discard unsaved edits and so need confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    /// Exit the application
    Exit,
    /// Open a file (replacing current)
    OpenFile(PathBuf),
    /// Create a new document
    NewDocument,
}

// ─────────────────────────────────────────────────────────────────────────────
// Application State
// ─────────────────────────────────────────────────────────────────────────────

/// Central application state struct.
///
/// Every edit funnels through [`AppState::text_changed`], which marks the
/// document dirty, rebuilds the outline and misspellings, and queues a
/// preview conversion when preview sync is on.
#[derive(Debug)]
pub struct AppState {
    document: Document,
    /// Outline of the current text
    outline: DocumentOutline,
    /// Misspelled ranges of the current text
    misspellings: Vec<MisspellRange>,
    /// Spell-check session with the active dictionary
    pub spell: SpellSession,
    /// Last rendered preview
    pub preview: PreviewPane,
    /// Converter used for export
    converter: Converter,
    /// Background preview conversion, absent until attached
    preview_worker: Option<PreviewWorker>,
    /// User settings (loaded from config)
    pub settings: Settings,
    /// UI-related state
    pub ui: UiState,
    /// Whether settings have been modified and need saving
    settings_dirty: bool,
}

impl AppState {
    /// Create the state for an empty document.
    ///
    /// The dictionary for `settings.language` is loaded right away. If it is
    /// missing, spell checking starts without a dictionary and the status
    /// bar says so.
    pub fn new(
        settings: Settings,
        converter: Converter,
        provider: Box<dyn DictionaryProvider>,
    ) -> Self {
        let mut spell = SpellSession::new(provider);
        spell.set_enabled(settings.spell_check_enabled);

        let mut ui = UiState {
            cursor_line: 1,
            ..UiState::default()
        };
        if let Err(e) = spell.set_language(&settings.language) {
            ui.status_message = Some(format!("Spell check unavailable: {}", e));
        }

        info!("AppState initialized");
        debug!(
            "Converter: {}, language: {:?}, preview sync: {}",
            converter.program(),
            spell.language(),
            settings.preview_sync
        );

        Self {
            document: Document::new(),
            outline: DocumentOutline::default(),
            misspellings: Vec::new(),
            spell,
            preview: PreviewPane::default(),
            converter,
            preview_worker: None,
            settings,
            ui,
            settings_dirty: false,
        }
    }

    /// Hand the background preview worker to the state.
    pub fn attach_preview_worker(&mut self, worker: PreviewWorker) {
        self.preview_worker = Some(worker);
        self.request_preview();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document Access
    // ─────────────────────────────────────────────────────────────────────────

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn text(&self) -> &str {
        self.document.text()
    }

    /// The editor's view of the state: mutable text plus the ranges and
    /// session it underlines with.
    ///
    /// Edits made through the text must be reported with
    /// [`AppState::text_changed`].
    pub fn editor_parts(&mut self) -> (&mut String, &[MisspellRange], &SpellSession) {
        (&mut self.document.text, &self.misspellings, &self.spell)
    }

    pub fn outline(&self) -> &DocumentOutline {
        &self.outline
    }

    pub fn misspellings(&self) -> &[MisspellRange] {
        &self.misspellings
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.document.is_dirty()
    }

    /// Window title in the form "notes.md* - YAME".
    pub fn window_title(&self) -> String {
        format!("{} - {}", self.document.title(), APP_NAME)
    }

    /// Line of the heading whose section contains the cursor.
    pub fn current_section(&self) -> Option<usize> {
        self.outline.find_current_section(self.ui.cursor_line)
    }

    /// Ask the editor to scroll to `line` (1-indexed).
    pub fn navigate_to_line(&mut self, line: usize) {
        debug!("Navigating to line {}", line);
        self.ui.scroll_to_line = Some(line);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Change Handling
    // ─────────────────────────────────────────────────────────────────────────

    /// Called after every edit of the document text.
    pub fn text_changed(&mut self) {
        self.document.dirty = true;
        self.refresh_outline();
        self.refresh_misspellings();
        self.request_preview();
    }

    /// Rebuild everything derived from the text after it was replaced.
    fn document_replaced(&mut self) {
        self.ui.cursor_line = 1;
        self.ui.scroll_to_line = Some(1);
        self.preview.clear();
        self.refresh_outline();
        self.refresh_misspellings();
        self.request_preview();
    }

    fn refresh_outline(&mut self) {
        self.outline = extract_outline(self.document.text());
    }

    fn refresh_misspellings(&mut self) {
        self.misspellings = self.spell.highlight(self.document.text());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Preview
    // ─────────────────────────────────────────────────────────────────────────

    /// Queue a conversion of the current text if preview sync is on.
    ///
    /// Returns `true` if a request was queued.
    pub fn request_preview(&mut self) -> bool {
        self.settings.preview_sync && self.refresh_preview()
    }

    /// Queue a conversion of the current text regardless of preview sync.
    ///
    /// Returns `true` if a request was queued.
    pub fn refresh_preview(&mut self) -> bool {
        let Some(worker) = self.preview_worker.as_mut() else {
            return false;
        };
        match worker.request(self.document.text.clone()) {
            Ok(generation) => {
                debug!("Queued preview generation {}", generation);
                true
            }
            Err(e) => {
                warn!("Could not queue preview: {}", e);
                self.preview.set_error(e.to_string());
                false
            }
        }
    }

    /// Collect a finished conversion, if any.
    ///
    /// Returns `true` if the preview changed.
    pub fn poll_preview(&mut self) -> bool {
        let Some(outcome) = self.preview_worker.as_mut().and_then(|w| w.poll()) else {
            return false;
        };
        match outcome {
            Ok(html) => self.preview.set_html(html),
            Err(e) => {
                warn!("Preview conversion failed: {}", e);
                self.preview.set_error(e.to_string());
            }
        }
        true
    }

    pub fn is_preview_pending(&self) -> bool {
        self.preview_worker
            .as_ref()
            .is_some_and(|w| w.is_pending())
    }

    /// Turn live preview on or off. Turning it on converts the current text.
    ///
    /// Returns the new state.
    pub fn toggle_preview_sync(&mut self) -> bool {
        self.settings.preview_sync = !self.settings.preview_sync;
        self.settings_dirty = true;
        info!("Preview sync: {}", self.settings.preview_sync);
        if self.settings.preview_sync {
            self.request_preview();
        }
        self.settings.preview_sync
    }

    /// Switch between the light and dark theme.
    pub fn toggle_theme(&mut self) -> Theme {
        self.settings.theme = self.settings.theme.toggle();
        self.settings_dirty = true;
        info!("Theme: {}", self.settings.theme.label());
        self.settings.theme
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Spell Checking
    // ─────────────────────────────────────────────────────────────────────────

    /// Turn misspelling underlines on or off.
    pub fn toggle_spell_check(&mut self) -> bool {
        let enabled = !self.spell.is_enabled();
        self.spell.set_enabled(enabled);
        self.settings.spell_check_enabled = enabled;
        self.settings_dirty = true;
        self.refresh_misspellings();
        enabled
    }

    /// Languages offered in the language picker.
    pub fn language_choices(&self) -> Vec<String> {
        self.settings
            .language_choices(&self.spell.available_languages())
    }

    /// Switch the spell-check language.
    ///
    /// On failure the previous dictionary stays active and an error is shown.
    pub fn change_language(&mut self, tag: &str) -> bool {
        match self.spell.set_language(tag) {
            Ok(()) => {
                if let Some(language) = self.spell.language() {
                    self.settings.language = language.to_string();
                }
                self.settings_dirty = true;
                self.ui.status_message = None;
                self.refresh_misspellings();
                true
            }
            Err(e) => {
                self.show_error(format!("Cannot switch language:\n{}", e));
                false
            }
        }
    }

    /// Replace a misspelled range with `replacement` as one edit.
    ///
    /// `word` is the text the range covered when the correction was chosen;
    /// if the document no longer holds it there, nothing is changed.
    /// Returns the character offset just past the inserted text.
    pub fn apply_correction(
        &mut self,
        range: MisspellRange,
        word: &str,
        replacement: &str,
    ) -> Option<usize> {
        let text = &self.document.text;
        if range.end() > text.chars().count() || range.text(text) != word {
            warn!(
                "Skipping stale correction of '{}' at {}..{}",
                word,
                range.start,
                range.end()
            );
            return None;
        }
        let end = spell::apply_correction(&mut self.document.text, range, replacement)?;
        debug!(
            "Replaced {}..{} with '{}'",
            range.start,
            range.end(),
            replacement
        );
        self.text_changed();
        Some(end)
    }

    /// Add a word to the dictionary and the persisted personal word list.
    pub fn add_to_dictionary(&mut self, word: &str) -> bool {
        if !self.spell.add_word(word) {
            return false;
        }
        if self.settings.add_personal_word(word) {
            self.settings_dirty = true;
        }
        self.refresh_misspellings();
        true
    }

    /// Accept a word for the rest of the session.
    pub fn ignore_word(&mut self, word: &str) -> bool {
        if !self.spell.ignore_word(word) {
            return false;
        }
        self.refresh_misspellings();
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // File Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the document with an empty one, discarding edits.
    pub fn new_document(&mut self) {
        info!("New document");
        self.document = Document::new();
        self.document_replaced();
    }

    /// Open `path`, discarding edits. On error the document is unchanged.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let document = Document::open(path)?;
        info!("Opened file: {}", path.display());
        self.document = document;
        self.settings.add_recent_file(path.to_path_buf());
        self.settings_dirty = true;
        self.document_replaced();
        Ok(())
    }

    /// Save to the current path.
    ///
    /// Returns `Error::NoDocumentPath` for a document that was never saved.
    pub fn save(&mut self) -> Result<()> {
        let path = self.document.path.clone().ok_or(Error::NoDocumentPath)?;
        self.document.write_to(&path)?;
        self.document.dirty = false;
        info!("Saved file: {}", path.display());
        Ok(())
    }

    /// Save to `path` and make it the document's path.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        self.document.write_to(path)?;
        self.document.path = Some(path.to_path_buf());
        self.document.dirty = false;

        self.settings.add_recent_file(path.to_path_buf());
        self.settings_dirty = true;

        info!("Saved file as: {}", path.display());
        Ok(())
    }

    /// Convert the document and write it as HTML to `path`.
    pub fn export_html(&mut self, path: &Path) -> Result<()> {
        let title = self
            .document
            .path()
            .and_then(|p| p.file_stem())
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled")
            .to_string();

        export::export_html(
            &self.converter,
            self.document.text(),
            path,
            &title,
            self.settings.export_standalone,
        )?;

        if let Some(dir) = path.parent() {
            self.settings.last_export_directory = Some(dir.to_path_buf());
            self.settings_dirty = true;
        }

        if self.settings.open_after_export {
            if let Err(e) = open::that(path) {
                warn!("Failed to open exported file: {}", e);
            }
        }
        Ok(())
    }

    /// Convert the document and put the HTML on the clipboard.
    pub fn copy_html(&self) -> Result<()> {
        export::copy_html_to_clipboard(&self.converter, self.document.text())
    }

    /// Start a new document, asking first if there are unsaved edits.
    pub fn request_new_document(&mut self) {
        if !self.confirm_discard(PendingAction::NewDocument) {
            self.new_document();
        }
    }

    /// Open `path`, asking first if there are unsaved edits.
    pub fn request_open(&mut self, path: PathBuf) {
        if !self.confirm_discard(PendingAction::OpenFile(path.clone())) {
            self.open_or_show_error(&path);
        }
    }

    fn open_or_show_error(&mut self, path: &Path) {
        if let Err(e) = self.open(path) {
            warn!("Failed to open {}: {}", path.display(), e);
            self.show_error(format!("Failed to open file:\n{}", e));
        }
    }

    /// Queue `action` behind a confirmation dialog if the document is dirty.
    ///
    /// Returns `true` if confirmation is needed.
    fn confirm_discard(&mut self, action: PendingAction) -> bool {
        if !self.document.is_dirty() {
            return false;
        }
        self.ui.confirm_dialog_message = match action {
            PendingAction::Exit => "You have unsaved changes. Exit anyway?",
            PendingAction::OpenFile(_) | PendingAction::NewDocument => {
                "You have unsaved changes. Discard them?"
            }
        }
        .to_string();
        self.ui.pending_action = Some(action);
        self.ui.show_confirm_dialog = true;
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Settings Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Update settings and mark as dirty.
    pub fn update_settings<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        f(&mut self.settings);
        self.settings_dirty = true;
    }

    /// Save settings to config file if modified.
    ///
    /// Returns `true` if settings were saved.
    pub fn save_settings_if_dirty(&mut self) -> bool {
        if self.settings_dirty {
            if save_config_silent(&self.settings) {
                self.settings_dirty = false;
                info!("Settings saved");
                return true;
            }
            warn!("Failed to save settings");
        }
        false
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Event Handling
    // ─────────────────────────────────────────────────────────────────────────

    /// Handle a confirmed pending action.
    pub fn handle_confirmed_action(&mut self) {
        if let Some(action) = self.ui.pending_action.take() {
            match action {
                PendingAction::Exit => {
                    debug!("Exit confirmed");
                    self.ui.exit_confirmed = true;
                }
                PendingAction::OpenFile(path) => self.open_or_show_error(&path),
                PendingAction::NewDocument => self.new_document(),
            }
        }
        self.ui.show_confirm_dialog = false;
        self.ui.confirm_dialog_message.clear();
    }

    /// Cancel the pending action.
    pub fn cancel_pending_action(&mut self) {
        self.ui.pending_action = None;
        self.ui.show_confirm_dialog = false;
        self.ui.confirm_dialog_message.clear();
    }

    /// Request application exit.
    ///
    /// Returns `true` if exit can proceed immediately, `false` if confirmation is needed.
    pub fn request_exit(&mut self) -> bool {
        self.ui.exit_confirmed || !self.confirm_discard(PendingAction::Exit)
    }

    /// Prepare state for application shutdown.
    pub fn shutdown(&mut self) {
        self.settings_dirty = true;
        self.save_settings_if_dirty();
        // Dropping the worker joins its thread.
        self.preview_worker = None;
        info!("AppState shutdown complete");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // UI State Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Show an error in a modal dialog.
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.ui.error_message = message.into();
        self.ui.show_error_modal = true;
    }

    /// Dismiss the error modal.
    pub fn dismiss_error(&mut self) {
        self.ui.show_error_modal = false;
        self.ui.error_message.clear();
    }

    /// Show a temporary toast message (disappears after duration).
    ///
    /// `current_time` should be the current app time in seconds.
    pub fn show_toast(&mut self, message: impl Into<String>, current_time: f64, duration: f64) {
        self.ui.toast_message = Some(message.into());
        self.ui.toast_expires_at = Some(current_time + duration);
    }

    /// Clear expired toasts. Call this each frame with the current time.
    pub fn update_toast(&mut self, current_time: f64) {
        if let Some(expires_at) = self.ui.toast_expires_at {
            if current_time >= expires_at {
                self.ui.toast_message = None;
                self.ui.toast_expires_at = None;
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spell::testing::StaticProvider;
    use tempfile::TempDir;

    fn state() -> AppState {
        let converter = Converter::new("cat", Vec::new()).unwrap();
        AppState::new(
            Settings::default(),
            converter,
            Box::new(StaticProvider::english_and_german()),
        )
    }

    fn set_text(state: &mut AppState, text: &str) {
        let (buffer, _, _) = state.editor_parts();
        *buffer = text.to_string();
        state.text_changed();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.path().is_none());
        assert!(!doc.is_dirty());
        assert_eq!(doc.title(), "Untitled");
    }

    #[test]
    fn test_document_title_marks_dirty() {
        let mut doc = Document::new();
        doc.dirty = true;
        assert_eq!(doc.title(), "Untitled*");
    }

    #[test]
    fn test_text_with_line_endings() {
        assert_eq!(text_with_line_endings("a\nb"), "a\nb\n");
        assert_eq!(text_with_line_endings("a\nb\n"), "a\nb\n");
        assert_eq!(text_with_line_endings("a\r\nb"), "a\nb\n");
        assert_eq!(text_with_line_endings(""), "");
        assert_eq!(text_with_line_endings("a\n\nb"), "a\n\nb\n");
    }

    #[test]
    fn test_document_open_rejects_non_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latin1.md");
        fs::write(&path, [0x47, 0x72, 0xfc, 0xdf, 0x65]).unwrap();
        assert!(matches!(
            Document::open(&path),
            Err(Error::FileRead { .. })
        ));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Change Handling Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_initial_state() {
        let state = state();
        assert_eq!(state.spell.language(), Some("en_US"));
        assert!(!state.has_unsaved_changes());
        assert!(state.outline().is_empty());
        assert_eq!(state.window_title(), "Untitled - YAME");
    }

    #[test]
    fn test_missing_startup_dictionary_sets_status() {
        let settings = Settings {
            language: "fr_FR".to_string(),
            ..Settings::default()
        };
        let state = AppState::new(
            settings,
            Converter::new("cat", Vec::new()).unwrap(),
            Box::new(StaticProvider::english_and_german()),
        );
        assert!(state.spell.language().is_none());
        assert!(state.ui.status_message.is_some());
        assert!(state.misspellings().is_empty());
    }

    #[test]
    fn test_text_changed_marks_dirty_and_rebuilds_outline() {
        let mut state = state();
        set_text(&mut state, "# A\n## B\n### C\n# D");

        assert!(state.has_unsaved_changes());
        assert_eq!(state.window_title(), "Untitled* - YAME");
        assert_eq!(state.outline().roots.len(), 2);
        assert_eq!(state.outline().heading_count(), 4);
    }

    #[test]
    fn test_text_changed_rehighlights() {
        let mut state = state();
        set_text(&mut state, "Thiss is a test.");
        assert_eq!(state.misspellings(), &[MisspellRange::new(0, 5)]);

        set_text(&mut state, "This is a test.");
        assert!(state.misspellings().is_empty());
    }

    #[test]
    fn test_current_section_follows_cursor() {
        let mut state = state();
        set_text(&mut state, "intro\n# One\ntext\n## Two\nmore");
        state.ui.cursor_line = 1;
        assert_eq!(state.current_section(), None);
        state.ui.cursor_line = 3;
        assert_eq!(state.current_section(), Some(2));
        state.ui.cursor_line = 5;
        assert_eq!(state.current_section(), Some(4));
    }

    #[test]
    fn test_navigate_to_line() {
        let mut state = state();
        state.navigate_to_line(7);
        assert_eq!(state.ui.scroll_to_line, Some(7));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Spell Checking Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_apply_correction_removes_range() {
        let mut state = state();
        set_text(&mut state, "Thiss is a test.");
        let range = spell::misspelling_at(state.misspellings(), 2).unwrap();

        let suggestions = state.spell.suggest(range.text(state.text()));
        assert_eq!(suggestions.first().map(String::as_str), Some("This"));

        let end = state.apply_correction(range, "Thiss", "This").unwrap();
        assert_eq!(end, 4);
        assert_eq!(state.text(), "This is a test.");
        assert!(state.misspellings().is_empty());
        assert!(state.has_unsaved_changes());
    }

    #[test]
    fn test_apply_correction_skips_stale_range() {
        let mut state = state();
        set_text(&mut state, "Thiss is a test.");
        let range = spell::misspelling_at(state.misspellings(), 2).unwrap();

        set_text(&mut state, "Oh, Thiss is a test.");
        assert_eq!(state.apply_correction(range, "Thiss", "This"), None);
        assert_eq!(state.text(), "Oh, Thiss is a test.");
        assert!(state.misspellings().contains(&MisspellRange::new(4, 5)));
    }

    #[test]
    fn test_apply_correction_skips_truncated_text() {
        let mut state = state();
        set_text(&mut state, "Thiss is a test.");
        let range = spell::misspelling_at(state.misspellings(), 2).unwrap();

        set_text(&mut state, "Th");
        assert_eq!(state.apply_correction(range, "Thiss", "This"), None);
        assert_eq!(state.text(), "Th");
    }

    #[test]
    fn test_change_language_switches_vocabulary() {
        let mut state = state();
        set_text(&mut state, "hallo world");
        assert_eq!(state.misspellings(), &[MisspellRange::new(0, 5)]);

        assert!(state.change_language("de-DE"));
        assert_eq!(state.settings.language, "de_DE");
        assert_eq!(state.misspellings(), &[MisspellRange::new(6, 5)]);
    }

    #[test]
    fn test_change_language_failure_keeps_dictionary() {
        let mut state = state();
        set_text(&mut state, "hello wrld");

        assert!(!state.change_language("xx_YY"));
        assert!(state.ui.show_error_modal);
        assert_eq!(state.spell.language(), Some("en_US"));
        assert_eq!(state.settings.language, "en_US");
        assert_eq!(state.misspellings().len(), 1);

        assert!(!state.change_language("not a tag!"));
        assert_eq!(state.spell.language(), Some("en_US"));
    }

    #[test]
    fn test_toggle_spell_check() {
        let mut state = state();
        set_text(&mut state, "Thiss is wrong");
        assert!(!state.misspellings().is_empty());

        assert!(!state.toggle_spell_check());
        assert!(state.misspellings().is_empty());
        assert!(!state.settings.spell_check_enabled);

        assert!(state.toggle_spell_check());
        assert_eq!(state.misspellings().len(), 2);
    }

    #[test]
    fn test_toggle_theme() {
        let mut state = state();
        assert_eq!(state.settings.theme, Theme::Light);
        assert_eq!(state.toggle_theme(), Theme::Dark);
        assert_eq!(state.toggle_theme(), Theme::Light);
        assert!(state.settings_dirty);
    }

    #[test]
    fn test_editor_parts_share_document() {
        let mut state = state();
        set_text(&mut state, "hello wrld");
        let (text, ranges, spell) = state.editor_parts();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].text(text), "wrld");
        assert!(spell.suggest("wrld").contains(&"world".to_string()));
        text.push_str(" test");
        state.text_changed();
        assert_eq!(state.text(), "hello wrld test");
        assert!(state.has_unsaved_changes());
    }

    #[test]
    fn test_add_to_dictionary_persists_word() {
        let mut state = state();
        set_text(&mut state, "hello egui");
        assert_eq!(state.misspellings().len(), 1);

        assert!(state.add_to_dictionary("egui"));
        assert!(state.misspellings().is_empty());
        assert_eq!(state.settings.personal_words, vec!["egui".to_string()]);

        // Personal words survive a language switch.
        assert!(state.change_language("de_DE"));
        assert!(state.change_language("en_US"));
        assert!(state.misspellings().is_empty());
    }

    #[test]
    fn test_ignore_word_is_not_persisted() {
        let mut state = state();
        set_text(&mut state, "hello egui");

        assert!(state.ignore_word("egui"));
        assert!(state.misspellings().is_empty());
        assert!(state.settings.personal_words.is_empty());

        assert!(state.change_language("en_US"));
        assert_eq!(state.misspellings().len(), 1);
    }

    #[test]
    fn test_language_choices_include_configured() {
        let state = state();
        let choices = state.language_choices();
        assert!(choices.contains(&"en_US".to_string()));
        assert!(choices.contains(&"de_DE".to_string()));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // File Operation Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_open_and_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "# Notes\nhello").unwrap();

        let mut state = state();
        state.open(&path).unwrap();
        assert_eq!(state.text(), "# Notes\nhello");
        assert!(!state.has_unsaved_changes());
        assert_eq!(state.outline().heading_count(), 1);
        assert_eq!(state.settings.recent_files.first(), Some(&path));

        set_text(&mut state, "# Notes\nhello\nworld");
        assert!(state.has_unsaved_changes());

        state.save().unwrap();
        assert!(!state.has_unsaved_changes());
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Notes\nhello\nworld\n");
    }

    #[test]
    fn test_open_missing_file_keeps_document() {
        let dir = TempDir::new().unwrap();
        let mut state = state();
        set_text(&mut state, "unsaved work");

        let result = state.open(&dir.path().join("missing.md"));
        assert!(matches!(result, Err(Error::FileRead { .. })));
        assert_eq!(state.text(), "unsaved work");
        assert!(state.has_unsaved_changes());
    }

    #[test]
    fn test_save_without_path() {
        let mut state = state();
        set_text(&mut state, "draft");
        assert!(matches!(state.save(), Err(Error::NoDocumentPath)));
        assert!(state.has_unsaved_changes());
    }

    #[test]
    fn test_save_as_sets_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("draft.md");
        let mut state = state();
        set_text(&mut state, "line one\nline two");

        state.save_as(&path).unwrap();
        assert_eq!(state.document().path(), Some(path.as_path()));
        assert!(!state.has_unsaved_changes());
        assert_eq!(state.window_title(), "draft.md - YAME");
        assert_eq!(fs::read_to_string(&path).unwrap(), "line one\nline two\n");
    }

    #[test]
    fn test_save_as_failure_keeps_state() {
        let dir = TempDir::new().unwrap();
        let mut state = state();
        set_text(&mut state, "text");

        let bad = dir.path().join("no-such-dir").join("file.md");
        assert!(matches!(state.save_as(&bad), Err(Error::FileWrite { .. })));
        assert!(state.document().path().is_none());
        assert!(state.has_unsaved_changes());
    }

    #[cfg(unix)]
    #[test]
    fn test_export_html_writes_standalone_document() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("notes.html");
        let mut state = state();
        set_text(&mut state, "<p>Grüße</p>");

        state.export_html(&out).unwrap();
        let html = fs::read_to_string(&out).unwrap();
        assert!(html.contains("<p>Grüße</p>"));
        assert!(html.contains("<title>Untitled</title>"));
        assert_eq!(state.settings.last_export_directory.as_deref(), Some(dir.path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_export_html_failure() {
        let dir = TempDir::new().unwrap();
        let mut state = AppState::new(
            Settings::default(),
            Converter::new("false", Vec::new()).unwrap(),
            Box::new(StaticProvider::english_and_german()),
        );
        set_text(&mut state, "# Title");

        let out = dir.path().join("out.html");
        assert!(matches!(
            state.export_html(&out),
            Err(Error::ConversionFailed { .. })
        ));
        assert!(!out.exists());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Confirmation Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_request_exit_clean() {
        let mut state = state();
        assert!(state.request_exit());
    }

    #[test]
    fn test_request_exit_with_changes() {
        let mut state = state();
        set_text(&mut state, "modified");

        assert!(!state.request_exit());
        assert!(state.ui.show_confirm_dialog);
        assert_eq!(state.ui.pending_action, Some(PendingAction::Exit));

        state.handle_confirmed_action();
        assert!(state.ui.exit_confirmed);
        assert!(state.request_exit());
    }

    #[test]
    fn test_request_new_document_confirms_when_dirty() {
        let mut state = state();
        set_text(&mut state, "# Keep me");

        state.request_new_document();
        assert_eq!(state.text(), "# Keep me");
        assert_eq!(state.ui.pending_action, Some(PendingAction::NewDocument));

        state.handle_confirmed_action();
        assert_eq!(state.text(), "");
        assert!(!state.has_unsaved_changes());
        assert!(state.outline().is_empty());
        assert!(!state.ui.show_confirm_dialog);
    }

    #[test]
    fn test_cancel_pending_open_leaves_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.md");
        fs::write(&path, "other").unwrap();

        let mut state = state();
        set_text(&mut state, "mine");
        state.request_open(path.clone());
        assert_eq!(state.ui.pending_action, Some(PendingAction::OpenFile(path)));

        state.cancel_pending_action();
        assert_eq!(state.text(), "mine");
        assert!(state.has_unsaved_changes());
        assert!(state.ui.pending_action.is_none());
    }

    #[test]
    fn test_request_open_clean_opens_immediately() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.md");
        fs::write(&path, "other").unwrap();

        let mut state = state();
        state.request_open(path);
        assert_eq!(state.text(), "other");
        assert!(!state.ui.show_confirm_dialog);
    }

    #[test]
    fn test_confirmed_open_of_missing_file_shows_error() {
        let dir = TempDir::new().unwrap();
        let mut state = state();
        set_text(&mut state, "mine");
        state.request_open(dir.path().join("gone.md"));

        state.handle_confirmed_action();
        assert!(state.ui.show_error_modal);
        assert_eq!(state.text(), "mine");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Preview Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_toggle_preview_sync() {
        let mut state = state();
        assert!(state.settings.preview_sync);
        assert!(!state.toggle_preview_sync());
        assert!(!state.request_preview());
        assert!(state.toggle_preview_sync());
    }

    #[test]
    fn test_request_preview_without_worker() {
        let mut state = state();
        assert!(!state.request_preview());
        assert!(!state.poll_preview());
        assert!(!state.is_preview_pending());
    }

    #[cfg(unix)]
    fn wait_for_preview(state: &mut AppState) -> bool {
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while std::time::Instant::now() < deadline {
            if state.poll_preview() && !state.is_preview_pending() {
                return true;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        false
    }

    #[cfg(unix)]
    #[test]
    fn test_text_change_updates_preview() {
        let mut state = state();
        let worker =
            PreviewWorker::spawn(Converter::new("cat", Vec::new()).unwrap(), Box::new(|| {}))
                .unwrap();
        state.attach_preview_worker(worker);

        set_text(&mut state, "<h1>Title</h1>");
        assert!(wait_for_preview(&mut state));
        assert_eq!(state.preview.html(), "<h1>Title</h1>");
        assert!(state.preview.error().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_preview_keeps_last_content() {
        let mut state = state();
        let converter = Converter::new(
            "sh",
            vec![
                "-c".to_string(),
                "input=$(cat); case \"$input\" in *fail*) exit 1;; esac; printf '%s' \"$input\""
                    .to_string(),
            ],
        )
        .unwrap();
        state.attach_preview_worker(PreviewWorker::spawn(converter, Box::new(|| {})).unwrap());

        set_text(&mut state, "<p>good</p>");
        assert!(wait_for_preview(&mut state));
        assert_eq!(state.preview.html(), "<p>good</p>");

        set_text(&mut state, "fail");
        assert!(wait_for_preview(&mut state));
        assert_eq!(state.preview.html(), "<p>good</p>");
        assert!(state.preview.error().is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_refresh_preview_ignores_sync() {
        let mut state = state();
        state.toggle_preview_sync();
        let worker =
            PreviewWorker::spawn(Converter::new("cat", Vec::new()).unwrap(), Box::new(|| {}))
                .unwrap();
        state.attach_preview_worker(worker);

        set_text(&mut state, "<p>manual</p>");
        assert!(!state.is_preview_pending());
        assert!(state.refresh_preview());
        assert!(wait_for_preview(&mut state));
        assert_eq!(state.preview.html(), "<p>manual</p>");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Toast Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_toast_expires() {
        let mut state = state();
        state.show_toast("Saved", 1.0, 2.0);
        state.update_toast(2.0);
        assert_eq!(state.ui.toast_message.as_deref(), Some("Saved"));
        state.update_toast(3.0);
        assert!(state.ui.toast_message.is_none());
    }
}
