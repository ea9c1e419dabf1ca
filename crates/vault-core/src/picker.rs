//! Folder picker capability.
//!
//! Asking the host for a directory is platform specific, so the session only
//! sees this trait. Every picker resolves to a chosen path, a cancellation,
//! or an error; an unavailable picker always errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a folder picker.
#[derive(Debug, Error)]
pub enum PickerError {
    /// No picker exists for this platform.
    #[error("folder picker is not supported on {0}")]
    Unsupported(String),

    /// The picker process could not be started or failed.
    #[error("cannot open folder picker: {0}")]
    Launch(String),
}

/// Result of a successful picker interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    /// The user chose a directory.
    Selected(PathBuf),
    /// The user dismissed the dialog.
    Cancelled,
}

/// Something that can ask the user for a directory.
pub trait FolderPicker {
    /// Show the picker and block until the user answers.
    fn pick_folder(&self) -> Result<PickerOutcome, PickerError>;
}

/// Picker for hosts without a folder dialog.
#[derive(Debug, Clone, Default)]
pub struct UnavailablePicker;

impl FolderPicker for UnavailablePicker {
    fn pick_folder(&self) -> Result<PickerOutcome, PickerError> {
        Err(PickerError::Unsupported(std::env::consts::OS.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_picker_errors() {
        let result = UnavailablePicker.pick_folder();
        assert!(matches!(result, Err(PickerError::Unsupported(_))));
    }

    #[test]
    fn test_unsupported_message_names_platform() {
        let err = UnavailablePicker.pick_folder().unwrap_err();
        assert!(err.to_string().contains(std::env::consts::OS));
    }
}
