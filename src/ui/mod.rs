//! UI components for YAME
//!
//! Side panels shown around the central editor.

mod outline_panel;
mod preview_panel;

pub use outline_panel::OutlinePanel;
pub use preview_panel::show_preview_panel;
