//! # Gono Application Library
//!
//! Everything the `gono` binary needs around [`vault_core`]: configuration,
//! log file setup, the host folder picker and the terminal UI.
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and defaults
//! - [`logging`]: Rotated log file subscriber
//! - [`picker`]: Platform folder dialogs
//! - [`ui`]: Keyboard-driven TUI

pub mod config;
pub mod logging;
pub mod picker;
pub mod ui;

// Re-export core for convenience
pub use vault_core;

pub use config::{Config, ConfigError};
pub use picker::SystemPicker;
pub use ui::{App, TuiApp};
