//! User interface module for Gono.
//!
//! The only front end is a ratatui TUI that drives a
//! [`vault_core::Session`] from the keyboard.

pub mod tui;

// Re-export main types for convenience
pub use tui::{format_modified, map_key, App, KeyAction, TuiApp};
