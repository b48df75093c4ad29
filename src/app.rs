//! Main application module for YAME
//!
//! This module implements the eframe App trait for the main application,
//! handling window management, UI updates, and event processing. Menus,
//! toolbar and keyboard shortcuts all dispatch through the command table in
//! [`crate::commands`].

use crate::commands::{Command, Menu};
use crate::config::{Theme, WindowSize};
use crate::editor::{EditorWidget, SpellingAction};
use crate::error::Error;
use crate::files::dialogs::{
    export_file_name, export_html_dialog, is_markdown_file, open_file_dialog, save_file_dialog,
};
use crate::state::AppState;
use crate::ui::{show_preview_panel, OutlinePanel};
use eframe::egui;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Instant;

/// How long success toasts stay in the status bar, in seconds.
const TOAST_DURATION: f64 = 2.5;

/// Number of recent files listed in the File menu.
const RECENT_FILES_SHOWN: usize = 10;

/// The main application struct that holds all state and implements eframe::App.
pub struct YameApp {
    /// Central application state
    state: AppState,
    /// Outline panel component
    outline_panel: OutlinePanel,
    /// Last known inner window size (for detecting changes)
    last_window_size: Option<egui::Vec2>,
    /// Application start time for timing toast messages
    start_time: Instant,
}

impl YameApp {
    /// Create the application around an already configured state.
    ///
    /// Applies the saved theme to the egui context.
    pub fn new(cc: &eframe::CreationContext<'_>, state: AppState) -> Self {
        info!("Initializing YAME");

        apply_theme(&cc.egui_ctx, state.settings.theme);
        info!("Applied initial theme: {:?}", state.settings.theme);

        let outline_panel = OutlinePanel::new().with_width(state.settings.outline_width);

        Self {
            state,
            outline_panel,
            last_window_size: None,
            start_time: Instant::now(),
        }
    }

    /// Get elapsed time since app start in seconds.
    fn get_app_time(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    fn toast(&mut self, message: impl Into<String>) {
        let time = self.get_app_time();
        self.state.show_toast(message, time, TOAST_DURATION);
    }

    /// Update window size in settings if changed.
    fn update_window_state(&mut self, ctx: &egui::Context) {
        let (size, maximized) = ctx.input(|i| {
            (
                i.viewport().inner_rect.map(|r| r.size()),
                i.viewport().maximized.unwrap_or(false),
            )
        });
        let Some(size) = size else {
            return;
        };

        let changed = self
            .last_window_size
            .map(|s| (s - size).length() > 1.0)
            .unwrap_or(true);
        if !changed {
            return;
        }
        self.last_window_size = Some(size);

        let window_size = WindowSize {
            width: size.x,
            height: size.y,
            maximized,
        };
        if self.state.settings.window_size != window_size {
            debug!(
                "Window state updated: {}x{}, maximized: {}",
                size.x, size.y, maximized
            );
            self.state.update_settings(|s| s.window_size = window_size);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Command Dispatch
    // ─────────────────────────────────────────────────────────────────────────

    /// Run a command from the menu, toolbar or keyboard.
    fn execute(&mut self, command: Command, ctx: &egui::Context) {
        debug!("Command: {:?}", command);
        match command {
            Command::New => self.state.request_new_document(),
            Command::Open => self.handle_open_file(),
            Command::Save => self.handle_save_file(),
            Command::SaveAs => self.handle_save_as_file(),
            Command::ExportHtml => self.handle_export_html(),
            Command::Exit => {
                if self.state.request_exit() {
                    self.state.ui.exit_confirmed = true;
                }
            }
            Command::CopyHtml => self.handle_copy_as_html(),
            Command::TogglePreviewSync => {
                let on = self.state.toggle_preview_sync();
                self.toast(if on {
                    "Preview sync on"
                } else {
                    "Preview sync off"
                });
            }
            Command::ToggleSpellCheck => {
                let on = self.state.toggle_spell_check();
                self.toast(if on {
                    "Spell check on"
                } else {
                    "Spell check off"
                });
            }
            Command::ToggleOutline => self.handle_toggle_outline(),
            Command::ToggleTheme => {
                let theme = self.state.toggle_theme();
                apply_theme(ctx, theme);
            }
        }
    }

    /// Whether a toggle command is currently on.
    fn is_checked(&self, command: Command) -> bool {
        match command {
            Command::TogglePreviewSync => self.state.settings.preview_sync,
            Command::ToggleSpellCheck => self.state.spell.is_enabled(),
            Command::ToggleOutline => self.state.settings.outline_enabled,
            Command::ToggleTheme => self.state.settings.theme == Theme::Dark,
            _ => false,
        }
    }

    /// Collect key presses that match a command shortcut.
    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        let commands: Vec<Command> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        repeat: false,
                        modifiers,
                        ..
                    } => Command::from_key(*key, *modifiers),
                    _ => None,
                })
                .collect()
        });

        for command in commands {
            debug!("Keyboard shortcut: {:?}", command);
            self.execute(command, ctx);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // File Handlers
    // ─────────────────────────────────────────────────────────────────────────

    /// Directory the file dialogs start in: the document's folder, else the
    /// folder of the most recent file.
    fn initial_dir(&self) -> Option<PathBuf> {
        self.state
            .document()
            .path()
            .and_then(|p| p.parent())
            .or_else(|| {
                self.state
                    .settings
                    .recent_files
                    .first()
                    .and_then(|p| p.parent())
            })
            .map(|p| p.to_path_buf())
    }

    /// Handle the "File > Open" action.
    fn handle_open_file(&mut self) {
        let initial_dir = self.initial_dir();
        match open_file_dialog(initial_dir.as_deref()) {
            Some(path) => {
                info!("Opening file: {}", path.display());
                self.state.request_open(path);
            }
            None => debug!("File dialog cancelled"),
        }
    }

    /// Handle the "File > Save" action.
    ///
    /// A document that was never saved goes through "Save As" instead.
    fn handle_save_file(&mut self) {
        match self.state.save() {
            Ok(()) => {
                let name = self.state.document().display_name().to_string();
                self.toast(format!("Saved: {}", name));
            }
            Err(Error::NoDocumentPath) => self.handle_save_as_file(),
            Err(e) => {
                warn!("Failed to save file: {}", e);
                self.state.show_error(format!("Failed to save file:\n{}", e));
            }
        }
    }

    /// Handle the "File > Save As" action.
    fn handle_save_as_file(&mut self) {
        let initial_dir = self.initial_dir();
        let default_name = self
            .state
            .document()
            .path()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("untitled.md")
            .to_string();

        let Some(path) = save_file_dialog(initial_dir.as_deref(), Some(&default_name)) else {
            debug!("Save dialog cancelled");
            return;
        };

        info!("Saving file as: {}", path.display());
        match self.state.save_as(&path) {
            Ok(()) => self.toast(format!("Saved: {}", path.display())),
            Err(e) => {
                warn!("Failed to save file: {}", e);
                self.state.show_error(format!("Failed to save file:\n{}", e));
            }
        }
    }

    /// Handle exporting the current document as an HTML file.
    fn handle_export_html(&mut self) {
        let initial_dir = self
            .state
            .settings
            .last_export_directory
            .clone()
            .or_else(|| self.initial_dir());
        let default_name = export_file_name(self.state.document().path());

        let Some(path) = export_html_dialog(initial_dir.as_deref(), &default_name) else {
            debug!("Export dialog cancelled");
            return;
        };

        match self.state.export_html(&path) {
            Ok(()) => {
                info!("Exported HTML to: {}", path.display());
                self.toast(format!("Exported to {}", path.display()));
            }
            Err(e) => {
                warn!("Failed to export HTML: {}", e);
                self.state.show_error(format!("Export failed:\n{}", e));
            }
        }
    }

    /// Handle copying the current document as HTML to the clipboard.
    fn handle_copy_as_html(&mut self) {
        match self.state.copy_html() {
            Ok(()) => {
                info!("Copied HTML to clipboard");
                self.toast("HTML copied to clipboard");
            }
            Err(e) => {
                warn!("Failed to copy HTML to clipboard: {}", e);
                self.state.show_error(format!("Copy failed:\n{}", e));
            }
        }
    }

    fn handle_toggle_outline(&mut self) {
        let enabled = !self.state.settings.outline_enabled;
        self.state.update_settings(|s| s.outline_enabled = enabled);
        self.toast(if enabled {
            "Outline panel shown"
        } else {
            "Outline panel hidden"
        });
        debug!("Outline panel toggled: {}", enabled);
    }

    /// Open Markdown files dropped onto the window. Only the first one is
    /// used since there is a single document.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        let Some(path) = dropped.into_iter().next() else {
            return;
        };

        if is_markdown_file(&path) {
            info!("Opening dropped file: {}", path.display());
            self.state.request_open(path);
        } else {
            self.toast(format!("Not a Markdown file: {}", path.display()));
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    /// Render the main UI content.
    fn render_ui(&mut self, ctx: &egui::Context) {
        let mut pending: Vec<Command> = Vec::new();

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                for menu in Menu::ALL {
                    ui.menu_button(menu.label(), |ui| {
                        self.render_menu(ui, menu, &mut pending);
                    });
                }
            });
        });

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                self.render_toolbar(ui, &mut pending);
            });
        });

        self.render_status_bar(ctx);

        if self.state.settings.outline_enabled {
            self.outline_panel
                .set_current_section(self.state.current_section());
            let output = self.outline_panel.show(ctx, self.state.outline());
            if let Some(line) = output.scroll_to_line {
                self.state.navigate_to_line(line);
            }
            if let Some(width) = output.new_width {
                self.state.update_settings(|s| s.outline_width = width);
            }
            if output.close_requested {
                pending.push(Command::ToggleOutline);
            }
        }

        let pending_preview = self.state.is_preview_pending();
        let preview_output = show_preview_panel(
            ctx,
            &mut self.state.preview,
            self.state.settings.font_size,
            pending_preview,
            self.state.settings.preview_sync,
        );
        if preview_output.refresh_requested {
            self.state.refresh_preview();
        }

        self.render_editor(ctx);

        for command in pending {
            self.execute(command, ctx);
        }
    }

    fn render_menu(&mut self, ui: &mut egui::Ui, menu: Menu, pending: &mut Vec<Command>) {
        for command in Command::in_menu(menu) {
            if command == Command::Exit {
                self.render_recent_files(ui);
                ui.separator();
            }

            let shortcut = command
                .shortcut()
                .map(|s| s.label())
                .unwrap_or_default();
            let clicked = if command.is_toggle() {
                let mut checked = self.is_checked(command);
                ui.checkbox(&mut checked, command.label())
                    .on_hover_text(shortcut)
                    .clicked()
            } else {
                ui.add(egui::Button::new(command.label()).shortcut_text(shortcut))
                    .on_hover_text(command.tooltip())
                    .clicked()
            };

            if clicked {
                pending.push(command);
                ui.close_menu();
            }
        }
    }

    /// The "Open Recent" submenu.
    fn render_recent_files(&mut self, ui: &mut egui::Ui) {
        let recent: Vec<PathBuf> = self
            .state
            .settings
            .recent_files
            .iter()
            .take(RECENT_FILES_SHOWN)
            .cloned()
            .collect();

        ui.add_enabled_ui(!recent.is_empty(), |ui| {
            ui.menu_button("Open Recent", |ui| {
                for path in recent {
                    let name = path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("Unknown")
                        .to_string();
                    if ui
                        .button(name)
                        .on_hover_text(path.display().to_string())
                        .clicked()
                    {
                        ui.close_menu();
                        self.state.request_open(path);
                    }
                }
            });
        });
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui, pending: &mut Vec<Command>) {
        for command in [Command::New, Command::Open, Command::Save] {
            if ui
                .button(command.label().trim_end_matches('…'))
                .on_hover_text(command.tooltip())
                .clicked()
            {
                pending.push(command);
            }
        }
        ui.separator();

        let mut sync = self.state.settings.preview_sync;
        if ui
            .checkbox(&mut sync, "Sync")
            .on_hover_text(Command::TogglePreviewSync.tooltip())
            .clicked()
        {
            pending.push(Command::TogglePreviewSync);
        }
        if ui
            .button("Export")
            .on_hover_text(Command::ExportHtml.tooltip())
            .clicked()
        {
            pending.push(Command::ExportHtml);
        }
        ui.separator();

        let current = self.state.spell.language().unwrap_or("none").to_string();
        let mut chosen: Option<String> = None;
        egui::ComboBox::from_id_source("language")
            .selected_text(&current)
            .show_ui(ui, |ui| {
                for tag in self.state.language_choices() {
                    if ui.selectable_label(tag == current, &tag).clicked() {
                        chosen = Some(tag);
                    }
                }
            })
            .response
            .on_hover_text("Spell-check language");

        if let Some(tag) = chosen.filter(|t| *t != current) {
            info!("Switching language to {}", tag);
            if self.state.change_language(&tag) {
                self.toast(format!("Language: {}", tag));
            }
        }
    }

    fn render_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let path_display = self
                    .state
                    .document()
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "Untitled".to_string());
                ui.label(path_display);

                if let Some(toast) = &self.state.ui.toast_message {
                    ui.separator();
                    ui.label(egui::RichText::new(toast).strong());
                } else if let Some(status) = &self.state.ui.status_message {
                    ui.separator();
                    ui.label(egui::RichText::new(status).weak());
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("Ln {}", self.state.ui.cursor_line));
                    ui.separator();
                    let count = self.state.misspellings().len();
                    if self.state.spell.is_enabled() && count > 0 {
                        ui.label(format!("{} misspelled", count));
                    }
                });
            });
        });
    }

    fn render_editor(&mut self, ctx: &egui::Context) {
        let font_size = self.state.settings.font_size;
        let word_wrap = self.state.settings.word_wrap;
        let scroll_to_line = self.state.ui.scroll_to_line.take();

        let output = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let (text, misspellings, spell) = self.state.editor_parts();
                EditorWidget::new(text)
                    .misspellings(misspellings)
                    .spell_session(spell)
                    .font_size(font_size)
                    .word_wrap(word_wrap)
                    .id(egui::Id::new("main_editor"))
                    .scroll_to_line(scroll_to_line)
                    .show(ui)
            })
            .inner;

        if output.changed {
            self.state.text_changed();
        }
        if let Some(line) = output.cursor_line {
            self.state.ui.cursor_line = line;
        }
        if let Some(action) = output.spelling_action {
            self.handle_spelling_action(action);
        }
    }

    fn handle_spelling_action(&mut self, action: SpellingAction) {
        match action {
            SpellingAction::Replace {
                range,
                word,
                replacement,
            } => {
                if self.state.apply_correction(range, &word, &replacement).is_none() {
                    self.toast("Text changed; correction skipped");
                }
            }
            SpellingAction::AddWord(word) => {
                if self.state.add_to_dictionary(&word) {
                    self.toast(format!("Added \"{}\" to dictionary", word));
                }
            }
            SpellingAction::IgnoreWord(word) => {
                self.state.ignore_word(&word);
            }
        }
    }

    fn render_dialogs(&mut self, ctx: &egui::Context) {
        // Confirmation dialog for unsaved changes
        if self.state.ui.show_confirm_dialog {
            egui::Window::new("Unsaved Changes")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(&self.state.ui.confirm_dialog_message);
                    ui.separator();
                    ui.horizontal(|ui| {
                        if ui.button("Save").clicked() {
                            self.handle_save_file();
                            if self.state.has_unsaved_changes() {
                                // Save was cancelled or failed
                                self.state.cancel_pending_action();
                            } else {
                                self.state.handle_confirmed_action();
                            }
                        }

                        if ui.button("Discard").clicked() {
                            self.state.handle_confirmed_action();
                        }

                        if ui.button("Cancel").clicked() {
                            self.state.cancel_pending_action();
                        }
                    });
                });
        }

        // Error modal
        if self.state.ui.show_error_modal {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(egui::RichText::new("⚠").size(24.0));
                    ui.label(&self.state.ui.error_message);
                    ui.separator();
                    if ui.button("OK").clicked() {
                        self.state.dismiss_error();
                    }
                });
        }
    }
}

impl eframe::App for YameApp {
    /// Called each time the UI needs repainting.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Update toast message (clear if expired)
        let current_time = self.get_app_time();
        self.state.update_toast(current_time);
        if self.state.ui.toast_message.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }

        // Pick up a finished preview conversion
        self.state.poll_preview();

        ctx.send_viewport_cmd(egui::ViewportCommand::Title(self.state.window_title()));

        self.update_window_state(ctx);
        self.handle_dropped_files(ctx);

        // Handle close request from window
        if ctx.input(|i| i.viewport().close_requested()) && !self.state.request_exit() {
            // Cancel the close request - we need to show a confirmation dialog
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        }

        self.render_ui(ctx);
        self.handle_keyboard_shortcuts(ctx);
        self.render_dialogs(ctx);

        if self.state.ui.exit_confirmed {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    /// Called when the application is about to close.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application exiting");
        self.state.shutdown();
    }

    /// Save persistent state.
    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        debug!("Saving application state");
        self.state.save_settings_if_dirty();
    }

    /// Auto-save interval in seconds.
    fn auto_save_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(30)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Switch the egui visuals to match `theme`.
fn apply_theme(ctx: &egui::Context, theme: Theme) {
    let visuals = match theme {
        Theme::Light => egui::Visuals::light(),
        Theme::Dark => egui::Visuals::dark(),
    };
    ctx.set_visuals(visuals);
}
