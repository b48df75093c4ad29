//! Clipboard Operations for HTML Export
//!
//! Copies converted HTML to the system clipboard using the arboard crate.
//! Applications that understand rich text get the HTML; everything else
//! gets the Markdown source as the plain-text fallback.

use crate::error::{Error, Result};
use crate::preview::Converter;
use arboard::Clipboard;
use log::info;

/// Convert `markdown` and put the HTML on the clipboard.
pub fn copy_html_to_clipboard(converter: &Converter, markdown: &str) -> Result<()> {
    let html = converter.convert(markdown)?;
    copy_html_with_fallback(&html, markdown)
}

/// Put `html` on the clipboard with `plain_text` as the fallback flavor.
pub fn copy_html_with_fallback(html: &str, plain_text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
    clipboard
        .set_html(html, Some(plain_text))
        .map_err(|e| Error::Clipboard(e.to_string()))?;
    info!("Copied {} bytes of HTML to the clipboard", html.len());
    Ok(())
}
