//! TUI widgets for QueryDeck.
//!
//! Contains reusable UI components.

pub mod diagnostics;
pub mod editor;
pub mod header;
pub mod sidebar;
pub mod spinner;
pub mod status;
pub mod table;
