//! Text editor widget for YAME
//!
//! This module implements the main text editor widget using egui's TextEdit,
//! with wavy underlines under misspelled words, a right-click menu offering
//! spelling suggestions, and scroll-to-line navigation for the outline.

use crate::spell::{misspelling_at, MisspellRange, SpellSession};
use crate::string_utils::{line_of_char_index, line_start_char_index};
use eframe::egui::{self, text::CCursor, FontId, Pos2, ScrollArea, TextEdit, Ui};
use log::debug;
use std::sync::Arc;

/// Half height of the misspelling squiggle.
const SQUIGGLE_AMPLITUDE: f32 = 1.5;

/// Horizontal distance between squiggle peaks.
const SQUIGGLE_PERIOD: f32 = 4.0;

/// Something the user picked from the spelling menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpellingAction {
    /// Replace the range, which held `word` when the menu opened, with a suggestion
    Replace {
        range: MisspellRange,
        word: String,
        replacement: String,
    },
    /// Add the word to the personal dictionary
    AddWord(String),
    /// Accept the word for this session
    IgnoreWord(String),
}

/// Result of showing the editor widget.
pub struct EditorOutput {
    /// Whether the content was modified.
    pub changed: bool,
    /// Line containing the cursor (1-indexed), if the editor has a cursor.
    pub cursor_line: Option<usize>,
    /// Entry chosen from the spelling menu.
    pub spelling_action: Option<SpellingAction>,
}

/// The misspelled word under the last right click, with its suggestions.
#[derive(Debug, Clone)]
struct SpellingMenu {
    range: MisspellRange,
    word: String,
    suggestions: Vec<String>,
}

/// A text editor widget with spell-check underlines.
///
/// # Example
///
/// ```ignore
/// EditorWidget::new(&mut text)
///     .misspellings(&ranges)
///     .spell_session(&session)
///     .font_size(settings.font_size)
///     .scroll_to_line(Some(42))
///     .show(ui);
/// ```
pub struct EditorWidget<'a> {
    /// The text being edited.
    text: &'a mut String,
    /// Misspelled ranges of `text` (character offsets).
    misspellings: &'a [MisspellRange],
    /// Session used for suggestions in the right-click menu.
    spell: Option<&'a SpellSession>,
    /// Font size for the editor.
    font_size: f32,
    /// Whether word wrap is enabled.
    word_wrap: bool,
    /// ID for the editor (for state persistence).
    id: Option<egui::Id>,
    /// Line number to scroll to (1-indexed, from outline navigation).
    scroll_to_line: Option<usize>,
}

impl<'a> EditorWidget<'a> {
    /// Create a new editor widget for the given text.
    pub fn new(text: &'a mut String) -> Self {
        Self {
            text,
            misspellings: &[],
            spell: None,
            font_size: 14.0,
            word_wrap: true,
            id: None,
            scroll_to_line: None,
        }
    }

    /// Set the misspelled ranges to underline.
    #[must_use]
    pub fn misspellings(mut self, ranges: &'a [MisspellRange]) -> Self {
        self.misspellings = ranges;
        self
    }

    /// Set the session used for suggestions.
    #[must_use]
    pub fn spell_session(mut self, spell: &'a SpellSession) -> Self {
        self.spell = Some(spell);
        self
    }

    /// Set the font size for the editor.
    #[must_use]
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Set whether word wrap is enabled.
    #[must_use]
    pub fn word_wrap(mut self, wrap: bool) -> Self {
        self.word_wrap = wrap;
        self
    }

    /// Set a custom ID for the editor.
    #[must_use]
    pub fn id(mut self, id: egui::Id) -> Self {
        self.id = Some(id);
        self
    }

    /// Set a line to scroll to (1-indexed, for outline navigation).
    #[must_use]
    pub fn scroll_to_line(mut self, line: Option<usize>) -> Self {
        self.scroll_to_line = line;
        self
    }

    /// Show the editor widget and return the output.
    pub fn show(self, ui: &mut Ui) -> EditorOutput {
        let id = self.id.unwrap_or_else(|| ui.id().with("editor"));
        let menu_id = id.with("spelling_menu");

        let original_content = self.text.clone();
        let font_size = self.font_size;
        let word_wrap = self.word_wrap;
        let misspellings = self.misspellings;
        let spell = self.spell;
        let scroll_to_line = self.scroll_to_line;

        let mut layouter = move |ui: &Ui, text: &str, wrap_width: f32| -> Arc<egui::Galley> {
            let font_id = FontId::monospace(font_size);
            let layout_job = if word_wrap {
                egui::text::LayoutJob::simple(
                    text.to_owned(),
                    font_id,
                    ui.visuals().text_color(),
                    wrap_width,
                )
            } else {
                egui::text::LayoutJob::simple_singleline(
                    text.to_owned(),
                    font_id,
                    ui.visuals().text_color(),
                )
            };
            ui.fonts(|f| f.layout_job(layout_job))
        };

        let content = &mut *self.text;
        let mut spelling_action = None;

        let scroll_output = ScrollArea::vertical()
            .id_source(id.with("scroll"))
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let text_output = TextEdit::multiline(content)
                    .id(id)
                    .frame(false)
                    .font(FontId::monospace(font_size))
                    .desired_width(f32::INFINITY)
                    .layouter(&mut layouter)
                    .show(ui);

                let galley = &text_output.galley;
                let galley_pos = text_output.galley_pos;

                // Ranges describe the text before this frame's edit.
                if *content == original_content {
                    let color = ui.visuals().error_fg_color;
                    let painter = ui.painter();
                    for range in misspellings {
                        for (x_start, x_end, y) in range_baselines(galley, *range) {
                            let points = squiggle_points(
                                galley_pos.x + x_start,
                                galley_pos.x + x_end,
                                galley_pos.y + y,
                            );
                            painter.add(egui::Shape::line(points, egui::Stroke::new(1.0, color)));
                        }
                    }
                }

                if let Some(line) = scroll_to_line {
                    let cursor = galley.from_ccursor(CCursor::new(line_start_char_index(
                        content, line,
                    )));
                    let rect = galley.pos_from_cursor(&cursor).translate(galley_pos.to_vec2());
                    ui.scroll_to_rect(rect, Some(egui::Align::Min));
                    debug!("Scrolling to line {}", line);
                }

                // Remember which word was right-clicked so the menu can show
                // its suggestions while it stays open.
                let response = text_output.response.clone();
                if response.secondary_clicked() {
                    let clicked = ui
                        .input(|i| i.pointer.interact_pos())
                        .map(|pos| galley.cursor_from_pos(pos - galley_pos).ccursor.index)
                        .and_then(|offset| misspelling_at(misspellings, offset));
                    let menu = clicked.map(|range| {
                        let word = range.text(content).to_string();
                        let suggestions = spell.map(|s| s.suggest(&word)).unwrap_or_default();
                        SpellingMenu {
                            range,
                            word,
                            suggestions,
                        }
                    });
                    ui.data_mut(|d| match menu {
                        Some(menu) => d.insert_temp(menu_id, menu),
                        None => d.remove::<SpellingMenu>(menu_id),
                    });
                }

                response.context_menu(|ui| {
                    let menu = ui.data(|d| d.get_temp::<SpellingMenu>(menu_id));
                    spelling_action = show_spelling_menu(ui, menu.as_ref());
                });

                text_output
            });

        let text_output = scroll_output.inner;
        let changed = *self.text != original_content;
        if changed {
            debug!("Editor content changed");
        }

        let cursor_line = text_output
            .cursor_range
            .map(|range| line_of_char_index(self.text, range.primary.ccursor.index));

        EditorOutput {
            changed,
            cursor_line,
            spelling_action,
        }
    }
}

/// Draw the spelling menu for the right-clicked word.
fn show_spelling_menu(ui: &mut Ui, menu: Option<&SpellingMenu>) -> Option<SpellingAction> {
    let Some(menu) = menu else {
        ui.weak("No spelling issue here");
        return None;
    };

    let mut action = None;
    if menu.suggestions.is_empty() {
        ui.weak("No suggestions");
    }
    for suggestion in &menu.suggestions {
        if ui.button(suggestion).clicked() {
            action = Some(SpellingAction::Replace {
                range: menu.range,
                word: menu.word.clone(),
                replacement: suggestion.clone(),
            });
        }
    }
    ui.separator();
    if ui.button(format!("Add \"{}\" to Dictionary", menu.word)).clicked() {
        action = Some(SpellingAction::AddWord(menu.word.clone()));
    }
    if ui.button("Ignore").clicked() {
        action = Some(SpellingAction::IgnoreWord(menu.word.clone()));
    }

    if action.is_some() {
        ui.close_menu();
    }
    action
}

/// Horizontal extents and baseline of a character range, one entry per
/// galley row it covers. Coordinates are relative to the galley.
fn range_baselines(galley: &egui::Galley, range: MisspellRange) -> Vec<(f32, f32, f32)> {
    let start = galley.from_ccursor(CCursor::new(range.start)).rcursor;
    let end = galley.from_ccursor(CCursor::new(range.end())).rcursor;

    (start.row..=end.row)
        .filter_map(|row_idx| {
            let row = galley.rows.get(row_idx)?;
            let x_start = if row_idx == start.row {
                row.x_offset(start.column)
            } else {
                0.0
            };
            let x_end = if row_idx == end.row {
                row.x_offset(end.column)
            } else {
                row.rect.max.x
            };
            (x_end > x_start).then_some((x_start, x_end, row.rect.max.y - 1.0))
        })
        .collect()
}

/// Zig-zag polyline from `x_start` to `x_end` around the baseline `y`.
fn squiggle_points(x_start: f32, x_end: f32, y: f32) -> Vec<Pos2> {
    let half = SQUIGGLE_PERIOD / 2.0;
    let mut points = Vec::new();
    let mut x = x_start;
    let mut up = true;
    while x < x_end {
        let dy = if up { -SQUIGGLE_AMPLITUDE } else { SQUIGGLE_AMPLITUDE };
        points.push(Pos2::new(x, y + dy));
        x += half;
        up = !up;
    }
    points.push(Pos2::new(x_end, y));
    points
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
