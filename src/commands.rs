//! Command table for YAME
//!
//! Every user action reachable from the menu bar, the toolbar or a keyboard
//! shortcut is a [`Command`]. The UI builds its menus from [`Command::ALL`]
//! and dispatches key presses through [`Command::from_key`], so a label or
//! shortcut only ever lives in one place.

use eframe::egui::{Key, Modifiers};

// ─────────────────────────────────────────────────────────────────────────────
// Shortcuts
// ─────────────────────────────────────────────────────────────────────────────

/// A key combination bound to a command.
///
/// `command` means Ctrl on Windows/Linux and Cmd on macOS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortcut {
    pub command: bool,
    pub shift: bool,
    pub key: Key,
}

impl Shortcut {
    const fn ctrl(key: Key) -> Self {
        Self {
            command: true,
            shift: false,
            key,
        }
    }

    const fn ctrl_shift(key: Key) -> Self {
        Self {
            command: true,
            shift: true,
            key,
        }
    }

    const fn plain(key: Key) -> Self {
        Self {
            command: false,
            shift: false,
            key,
        }
    }

    /// Exact match: extra modifiers make a different shortcut.
    pub fn matches(&self, key: Key, modifiers: Modifiers) -> bool {
        self.key == key
            && self.command == modifiers.command
            && self.shift == modifiers.shift
            && !modifiers.alt
    }

    /// Human readable form, e.g. `Ctrl+Shift+S`.
    pub fn label(&self) -> String {
        let mut label = String::new();
        if self.command {
            label.push_str(if cfg!(target_os = "macos") {
                "Cmd+"
            } else {
                "Ctrl+"
            });
        }
        if self.shift {
            label.push_str("Shift+");
        }
        label.push_str(self.key.name());
        label
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level menu a command is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    File,
    Edit,
    View,
}

impl Menu {
    pub const ALL: [Menu; 3] = [Menu::File, Menu::Edit, Menu::View];

    pub fn label(&self) -> &'static str {
        match self {
            Menu::File => "File",
            Menu::Edit => "Edit",
            Menu::View => "View",
        }
    }
}

/// A named user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Start an empty document
    New,
    /// Pick a file and open it
    Open,
    /// Save to the current path
    Save,
    /// Pick a path and save there
    SaveAs,
    /// Convert and write an HTML file
    ExportHtml,
    /// Quit the application
    Exit,
    /// Convert and copy the HTML to the clipboard
    CopyHtml,
    /// Turn live preview conversion on or off
    TogglePreviewSync,
    /// Turn misspelling underlines on or off
    ToggleSpellCheck,
    /// Show or hide the outline panel
    ToggleOutline,
    /// Switch between the light and dark theme
    ToggleTheme,
}

impl Command {
    /// All commands in menu order.
    pub const ALL: [Command; 11] = [
        Command::New,
        Command::Open,
        Command::Save,
        Command::SaveAs,
        Command::ExportHtml,
        Command::Exit,
        Command::CopyHtml,
        Command::TogglePreviewSync,
        Command::ToggleSpellCheck,
        Command::ToggleOutline,
        Command::ToggleTheme,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Command::New => "New",
            Command::Open => "Open…",
            Command::Save => "Save",
            Command::SaveAs => "Save As…",
            Command::ExportHtml => "Export HTML…",
            Command::Exit => "Exit",
            Command::CopyHtml => "Copy as HTML",
            Command::TogglePreviewSync => "Preview Sync",
            Command::ToggleSpellCheck => "Spell Check",
            Command::ToggleOutline => "Outline",
            Command::ToggleTheme => "Dark Theme",
        }
    }

    /// Short text shown on toolbar buttons and as hover text.
    pub fn tooltip(&self) -> &'static str {
        match self {
            Command::New => "Create a new document",
            Command::Open => "Open a Markdown file",
            Command::Save => "Save the document",
            Command::SaveAs => "Save the document under a new name",
            Command::ExportHtml => "Export the converted HTML",
            Command::Exit => "Quit YAME",
            Command::CopyHtml => "Copy the converted HTML to the clipboard",
            Command::TogglePreviewSync => "Update the preview while typing",
            Command::ToggleSpellCheck => "Underline misspelled words",
            Command::ToggleOutline => "Show the document outline",
            Command::ToggleTheme => "Use the dark color theme",
        }
    }

    pub fn menu(&self) -> Menu {
        match self {
            Command::New
            | Command::Open
            | Command::Save
            | Command::SaveAs
            | Command::ExportHtml
            | Command::Exit => Menu::File,
            Command::CopyHtml | Command::TogglePreviewSync | Command::ToggleSpellCheck => {
                Menu::Edit
            }
            Command::ToggleOutline | Command::ToggleTheme => Menu::View,
        }
    }

    pub fn shortcut(&self) -> Option<Shortcut> {
        match self {
            Command::New => Some(Shortcut::ctrl(Key::N)),
            Command::Open => Some(Shortcut::ctrl(Key::O)),
            Command::Save => Some(Shortcut::ctrl(Key::S)),
            Command::SaveAs => Some(Shortcut::ctrl_shift(Key::S)),
            Command::ExportHtml => Some(Shortcut::ctrl(Key::E)),
            Command::Exit => Some(Shortcut::ctrl(Key::Q)),
            Command::CopyHtml => Some(Shortcut::ctrl_shift(Key::C)),
            Command::TogglePreviewSync => Some(Shortcut::ctrl(Key::T)),
            Command::ToggleSpellCheck => Some(Shortcut::plain(Key::F7)),
            Command::ToggleOutline => Some(Shortcut::ctrl_shift(Key::O)),
            Command::ToggleTheme => Some(Shortcut::ctrl_shift(Key::T)),
        }
    }

    /// Whether the command flips an on/off setting (shown as a checkbox).
    pub fn is_toggle(&self) -> bool {
        matches!(
            self,
            Command::TogglePreviewSync
                | Command::ToggleSpellCheck
                | Command::ToggleOutline
                | Command::ToggleTheme
        )
    }

    /// Commands listed under `menu`, in order.
    pub fn in_menu(menu: Menu) -> impl Iterator<Item = Command> {
        Self::ALL.into_iter().filter(move |c| c.menu() == menu)
    }

    /// The command bound to a key press, if any.
    pub fn from_key(key: Key, modifiers: Modifiers) -> Option<Command> {
        Self::ALL
            .into_iter()
            .find(|c| c.shortcut().is_some_and(|s| s.matches(key, modifiers)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
