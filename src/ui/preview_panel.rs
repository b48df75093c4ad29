//! Preview Panel Component
//!
//! Right-hand side panel showing the converter's HTML, either rendered or
//! as source, with a banner when the latest conversion failed.

use crate::preview::{show_blocks, PreviewPane};
use eframe::egui::{self, Color32, RichText, ScrollArea, TextEdit};

/// Default width of the preview panel.
const DEFAULT_PANEL_WIDTH: f32 = 420.0;

/// Minimum width of the preview panel.
const MIN_PANEL_WIDTH: f32 = 200.0;

/// Output from the preview panel indicating user actions.
#[derive(Debug, Clone, Default)]
pub struct PreviewPanelOutput {
    /// The user asked for a conversion right now
    pub refresh_requested: bool,
}

/// Render the preview panel.
///
/// `pending` shows a spinner while a conversion is in flight; `sync` is
/// whether the preview follows edits.
pub fn show_preview_panel(
    ctx: &egui::Context,
    pane: &mut PreviewPane,
    font_size: f32,
    pending: bool,
    sync: bool,
) -> PreviewPanelOutput {
    let mut output = PreviewPanelOutput::default();

    egui::SidePanel::right("preview_panel")
        .resizable(true)
        .default_width(DEFAULT_PANEL_WIDTH)
        .min_width(MIN_PANEL_WIDTH)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("Preview").size(12.0).strong());
                if pending {
                    ui.spinner();
                } else if !sync {
                    ui.label(RichText::new("(sync off)").size(10.0).weak());
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.toggle_value(&mut pane.show_source, "</>")
                        .on_hover_text("Show HTML source");
                    if ui
                        .small_button("⟳")
                        .on_hover_text("Convert now")
                        .clicked()
                    {
                        output.refresh_requested = true;
                    }
                });
            });

            if let Some(error) = pane.error() {
                let fill = if ui.visuals().dark_mode {
                    Color32::from_rgb(90, 30, 30)
                } else {
                    Color32::from_rgb(255, 225, 225)
                };
                egui::Frame::none()
                    .fill(fill)
                    .inner_margin(6.0)
                    .rounding(3.0)
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(
                            RichText::new(format!("⚠ {}", error))
                                .size(11.0)
                                .color(ui.visuals().error_fg_color),
                        );
                    });
            }
            ui.separator();

            ScrollArea::vertical()
                .id_source("preview_scroll")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    if pane.is_empty() {
                        ui.weak("Nothing to preview yet");
                    } else if pane.show_source {
                        let mut source = pane.html();
                        ui.add(
                            TextEdit::multiline(&mut source)
                                .code_editor()
                                .desired_width(f32::INFINITY),
                        );
                    } else {
                        show_blocks(ui, pane.blocks(), font_size);
                    }
                });
        });

    output
}
