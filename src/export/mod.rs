//! Export module for YAME
//!
//! Writes converter output to HTML files and copies it to the clipboard.

pub mod clipboard;
pub mod html;

pub use clipboard::copy_html_to_clipboard;
pub use html::export_html;
