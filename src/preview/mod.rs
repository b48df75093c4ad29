//! Live HTML preview
//!
//! The document is converted by an external program on a background thread
//! and the resulting HTML is shown next to the editor.

mod converter;
mod html_view;
mod pane;
mod worker;

pub use converter::Converter;
pub use html_view::show_blocks;
pub use pane::PreviewPane;
pub use worker::PreviewWorker;
