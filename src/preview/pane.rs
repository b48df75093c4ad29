//! Preview pane state
//!
//! Holds the last successfully rendered HTML. A failed conversion only sets
//! an error banner; the previous content stays visible.

use super::html_view::{parse_html, Block};

#[derive(Debug, Clone, Default)]
pub struct PreviewPane {
    html: String,
    blocks: Vec<Block>,
    error: Option<String>,
    /// Show the raw HTML instead of the rendered view
    pub show_source: bool,
}

impl PreviewPane {
    /// Replace the content with freshly converted HTML.
    pub fn set_html(&mut self, html: String) {
        self.blocks = parse_html(&html);
        self.html = html;
        self.error = None;
    }

    /// Record a failed conversion, keeping the last good content.
    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn clear(&mut self) {
        *self = Self {
            show_source: self.show_source,
            ..Self::default()
        };
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }
}
