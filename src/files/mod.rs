//! File operations module
//!
//! Native open/save/export dialogs.

pub mod dialogs;
