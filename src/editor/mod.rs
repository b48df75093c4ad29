//! Editor module for YAME
//!
//! This module contains the text editor widget and the heading outline
//! derived from the document text.

mod outline;
mod widget;

pub use outline::{extract_outline, DocumentOutline, OutlineNode};
pub use widget::{EditorWidget, SpellingAction};
