//! Document Outline Panel Component
//!
//! This module implements a side panel that displays a live-updating,
//! clickable tree of document headings with collapsible sections.

use crate::config::Settings;
use crate::editor::{DocumentOutline, OutlineNode};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui, Vec2};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Longest title shown before truncation, in characters.
const MAX_TITLE_CHARS: usize = 48;

// ─────────────────────────────────────────────────────────────────────────────
// OutlinePanelOutput
// ─────────────────────────────────────────────────────────────────────────────

/// Output from the outline panel indicating user actions.
#[derive(Debug, Clone, Default)]
pub struct OutlinePanelOutput {
    /// Line number to scroll to (1-indexed), if a heading was clicked
    pub scroll_to_line: Option<usize>,
    /// Whether the close button was clicked
    pub close_requested: bool,
    /// New panel width if resized
    pub new_width: Option<f32>,
}

// ─────────────────────────────────────────────────────────────────────────────
// OutlinePanel
// ─────────────────────────────────────────────────────────────────────────────

/// The document outline panel widget.
#[derive(Debug, Clone)]
pub struct OutlinePanel {
    /// Current panel width
    width: f32,
    /// Line of the heading containing the cursor
    current_section: Option<usize>,
}

impl Default for OutlinePanel {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlinePanel {
    /// Create a new outline panel.
    pub fn new() -> Self {
        Self {
            width: 200.0,
            current_section: None,
        }
    }

    /// Set the panel width.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width.clamp(Settings::MIN_OUTLINE_WIDTH, Settings::MAX_OUTLINE_WIDTH);
        self
    }

    /// Set the heading line to highlight.
    pub fn set_current_section(&mut self, section: Option<usize>) {
        self.current_section = section;
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Render the outline panel on the left side of the window.
    pub fn show(&mut self, ctx: &egui::Context, outline: &DocumentOutline) -> OutlinePanelOutput {
        let mut output = OutlinePanelOutput::default();

        egui::SidePanel::left("outline_panel")
            .resizable(true)
            .default_width(self.width)
            .min_width(Settings::MIN_OUTLINE_WIDTH)
            .max_width(Settings::MAX_OUTLINE_WIDTH)
            .show(ctx, |ui| {
                // Update width if resized
                let current_width = ui.available_width();
                if (current_width - self.width).abs() > 1.0 {
                    self.width = current_width;
                    output.new_width = Some(current_width);
                }

                ui.spacing_mut().item_spacing = Vec2::new(4.0, 2.0);

                ui.horizontal(|ui| {
                    ui.label(RichText::new("Outline").size(12.0).strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .add(egui::Button::new("×").frame(false))
                            .on_hover_text("Close outline")
                            .clicked()
                        {
                            output.close_requested = true;
                        }
                    });
                });

                if !outline.is_empty() {
                    ui.label(
                        RichText::new(format!("{} headings", outline.heading_count()))
                            .size(10.0)
                            .weak(),
                    );
                }
                ui.separator();

                ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        if outline.is_empty() {
                            ui.add_space(20.0);
                            ui.vertical_centered(|ui| {
                                ui.label(RichText::new("No headings found").size(11.0).italics());
                                ui.label(
                                    RichText::new("Add headings using # syntax")
                                        .size(10.0)
                                        .weak(),
                                );
                            });
                            return;
                        }
                        for node in &outline.roots {
                            self.show_node(ui, node, &mut output);
                        }
                    });
            });

        output
    }

    /// Render one heading and, if expanded, its children.
    fn show_node(&self, ui: &mut Ui, node: &OutlineNode, output: &mut OutlinePanelOutput) {
        let is_current = self.current_section == Some(node.line);
        let is_dark = ui.visuals().dark_mode;

        let mut text = RichText::new(truncate_title(node.label()))
            .size(11.0)
            .color(heading_level_color(node.level, is_dark));
        if node.level == 1 {
            text = text.strong();
        }

        let mut clicked = false;
        if node.children.is_empty() {
            ui.horizontal(|ui| {
                // Line up with the labels of headings that have a toggle.
                ui.add_space(ui.spacing().indent);
                clicked = heading_label(ui, text, is_current, node).clicked();
            });
        } else {
            let id = ui.make_persistent_id(("outline_node", node.line));
            egui::collapsing_header::CollapsingState::load_with_default_open(ui.ctx(), id, true)
                .show_header(ui, |ui| {
                    clicked = heading_label(ui, text, is_current, node).clicked();
                })
                .body(|ui| {
                    for child in &node.children {
                        self.show_node(ui, child, output);
                    }
                });
        }

        if clicked {
            log::debug!(
                "Outline: clicked heading '{}' at line {}",
                node.title,
                node.line
            );
            output.scroll_to_line = Some(node.line);
        }
    }
}

fn heading_label(
    ui: &mut Ui,
    text: RichText,
    is_current: bool,
    node: &OutlineNode,
) -> egui::Response {
    ui.selectable_label(is_current, text).on_hover_text(format!(
        "{}\nLine {} • Click to navigate",
        node.label(),
        node.line
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Get a color for a heading level.
fn heading_level_color(level: usize, is_dark: bool) -> Color32 {
    if is_dark {
        match level {
            1 => Color32::from_rgb(130, 180, 255), // Blue
            2 => Color32::from_rgb(150, 220, 150), // Green
            3 => Color32::from_rgb(220, 180, 120), // Orange
            _ => Color32::from_rgb(180, 180, 180), // Gray
        }
    } else {
        match level {
            1 => Color32::from_rgb(40, 100, 180),  // Blue
            2 => Color32::from_rgb(50, 140, 50),   // Green
            3 => Color32::from_rgb(180, 120, 40),  // Orange
            _ => Color32::from_rgb(100, 100, 100), // Gray
        }
    }
}

/// Shorten long titles, cutting on a character boundary.
fn truncate_title(title: &str) -> String {
    if title.chars().count() <= MAX_TITLE_CHARS {
        title.to_string()
    } else {
        let mut short: String = title.chars().take(MAX_TITLE_CHARS - 1).collect();
        short.push('…');
        short
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
