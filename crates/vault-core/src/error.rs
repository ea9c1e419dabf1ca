//! Error types for the session state machine.

use std::path::PathBuf;

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::picker::PickerError;
use crate::registry::RegistryError;

/// Any failure a user intent can run into.
///
/// None of these are fatal: the session reports them in its status message
/// and stays on (or returns to) a stable screen.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Bad user input (blank name, disallowed characters, blank path).
    #[error("{0}")]
    Validation(String),

    /// A candidate path resolves outside the active vault.
    #[error("path escapes vault: {0}")]
    Containment(PathBuf),

    /// A path offered as a vault cannot be inspected.
    #[error("cannot access this path: {0}")]
    Inaccessible(PathBuf),

    /// A path offered as a vault is not a directory.
    #[error("path must point to a directory: {0}")]
    NotADirectory(PathBuf),

    /// The intent needs an open vault but none is active.
    #[error("no vault is open")]
    NoActiveVault,

    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] GatewayError),

    /// Registry storage failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Folder picker failure.
    #[error(transparent)]
    Picker(#[from] PickerError),
}

impl SessionError {
    /// Create a validation error with a user-facing message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this error is bad user input rather than a system failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
