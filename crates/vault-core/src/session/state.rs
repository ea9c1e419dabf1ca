//! Session state types.

use std::path::{Path, PathBuf};

use crate::gateway::Entry;
use crate::guard;

/// One row of the vault selection screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultListRow {
    /// A registered vault root.
    ExistingVault(PathBuf),
    /// "Create new vault" action.
    CreateNewAction,
    /// "Open vault by path" action.
    OpenByPathAction,
    /// "Open vault in explorer" action.
    OpenViaPickerAction,
}

impl VaultListRow {
    /// Returns the row title.
    pub fn title(&self) -> String {
        match self {
            Self::ExistingVault(path) => guard::base_name(path),
            Self::CreateNewAction => "+ Create new vault".to_string(),
            Self::OpenByPathAction => "+ Open vault by path".to_string(),
            Self::OpenViaPickerAction => "+ Open vault in explorer".to_string(),
        }
    }

    /// Returns the row description.
    pub fn description(&self) -> String {
        match self {
            Self::ExistingVault(path) => path.display().to_string(),
            Self::CreateNewAction => "Create a new directory and open it as vault".to_string(),
            Self::OpenByPathAction => "Open any existing directory as vault".to_string(),
            Self::OpenViaPickerAction => "Pick an existing directory in a folder dialog".to_string(),
        }
    }

    /// Returns the vault path for real vault rows.
    pub fn vault_path(&self) -> Option<&Path> {
        match self {
            Self::ExistingVault(path) => Some(path),
            _ => None,
        }
    }
}

/// One row of the file list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRow {
    /// Synthetic "go to parent" row, present below the vault root.
    Parent(PathBuf),
    /// A real directory entry.
    Entry(Entry),
}

impl FileRow {
    /// Returns the row title. Directories end with a separator.
    pub fn title(&self) -> String {
        match self {
            Self::Parent(_) => "..".to_string(),
            Self::Entry(entry) if entry.is_directory => {
                format!("{}{}", entry.name, std::path::MAIN_SEPARATOR)
            }
            Self::Entry(entry) => entry.name.clone(),
        }
    }

    /// Returns the entry if this is not the parent row.
    pub fn entry(&self) -> Option<&Entry> {
        match self {
            Self::Parent(_) => None,
            Self::Entry(entry) => Some(entry),
        }
    }
}

/// What a pending delete confirmation will remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    /// Path to remove.
    pub path: PathBuf,
    /// Label shown to the user.
    pub label: String,
    /// Remove recursively.
    pub is_directory: bool,
    /// Also unregister the vault after removal.
    pub is_vault_root: bool,
}

impl DeleteTarget {
    /// Returns the kind of thing being deleted, for prompts.
    pub fn noun(&self) -> &'static str {
        if self.is_vault_root {
            "vault"
        } else if self.is_directory {
            "directory"
        } else {
            "file"
        }
    }
}

/// The screen the session is on, with exactly the data that screen needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Choose a vault or an action.
    VaultSelect { rows: Vec<VaultListRow> },
    /// Prompt for a new vault name.
    VaultCreate,
    /// Prompt for an existing directory path.
    VaultOpenByPath,
    /// Browse the current directory of the open vault.
    FileList { rows: Vec<FileRow> },
    /// Prompt for a new note name.
    FileCreate,
    /// Prompt for a new directory name.
    DirectoryCreate,
    /// Edit a note.
    Editor { path: PathBuf, buffer: String },
    /// Confirm a permanent delete.
    ConfirmDelete { target: DeleteTarget },
}

impl ViewState {
    /// Returns the kind of this state, without its data.
    pub fn kind(&self) -> StateKind {
        match self {
            Self::VaultSelect { .. } => StateKind::VaultSelect,
            Self::VaultCreate => StateKind::VaultCreate,
            Self::VaultOpenByPath => StateKind::VaultOpenByPath,
            Self::FileList { .. } => StateKind::FileList,
            Self::FileCreate => StateKind::FileCreate,
            Self::DirectoryCreate => StateKind::DirectoryCreate,
            Self::Editor { .. } => StateKind::Editor,
            Self::ConfirmDelete { .. } => StateKind::ConfirmDelete,
        }
    }
}

/// Data-free discriminant of [`ViewState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    VaultSelect,
    VaultCreate,
    VaultOpenByPath,
    FileList,
    FileCreate,
    DirectoryCreate,
    Editor,
    ConfirmDelete,
}

impl StateKind {
    /// Whether this state shows a single-line text prompt.
    pub fn is_prompt(&self) -> bool {
        matches!(
            self,
            Self::VaultCreate | Self::VaultOpenByPath | Self::FileCreate | Self::DirectoryCreate
        )
    }

    /// Whether this state shows a selectable list.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::VaultSelect | Self::FileList)
    }
}

/// How a status message should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// Human-readable outcome of the last intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

impl Status {
    pub fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// A user intent, already decoupled from key bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Activate the row at this index.
    Select(usize),
    /// Stage the row at this index for deletion.
    Delete(usize),
    /// Start creating a vault.
    CreateVault,
    /// Start opening a vault by path.
    OpenByPath,
    /// Ask the folder picker for a vault.
    OpenViaPicker,
    /// Start creating a note.
    CreateFile,
    /// Start creating a directory.
    CreateDirectory,
    /// Go to the parent directory.
    Parent,
    /// Submit prompt input.
    Submit(String),
    /// Save the editor buffer.
    Save(String),
    /// Confirm the staged delete.
    Confirm,
    /// Decline the staged delete.
    Decline,
    /// Leave the current prompt, editor or confirmation.
    Cancel,
    /// Exit the tool.
    Quit,
}

/// Whether the session keeps running after an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_row_titles() {
        let row = VaultListRow::ExistingVault(PathBuf::from("/home/me/Notes"));
        assert_eq!(row.title(), "Notes");
        assert_eq!(row.vault_path(), Some(Path::new("/home/me/Notes")));
        assert_eq!(VaultListRow::CreateNewAction.title(), "+ Create new vault");
        assert!(VaultListRow::OpenViaPickerAction.vault_path().is_none());
    }

    #[test]
    fn test_file_row_titles() {
        let dir = FileRow::Entry(Entry {
            name: "journal".to_string(),
            path: PathBuf::from("/v/journal"),
            is_directory: true,
            modified: None,
        });
        assert_eq!(dir.title(), format!("journal{}", std::path::MAIN_SEPARATOR));
        assert_eq!(FileRow::Parent(PathBuf::from("/v")).title(), "..");
        assert!(FileRow::Parent(PathBuf::from("/v")).entry().is_none());
    }

    #[test]
    fn test_delete_target_noun() {
        let mut target = DeleteTarget {
            path: PathBuf::from("/v/a.md"),
            label: "a.md".to_string(),
            is_directory: false,
            is_vault_root: false,
        };
        assert_eq!(target.noun(), "file");
        target.is_directory = true;
        assert_eq!(target.noun(), "directory");
        target.is_vault_root = true;
        assert_eq!(target.noun(), "vault");
    }

    #[test]
    fn test_state_kinds() {
        assert!(StateKind::FileCreate.is_prompt());
        assert!(!StateKind::Editor.is_prompt());
        assert!(StateKind::VaultSelect.is_list());
        assert_eq!(ViewState::VaultCreate.kind(), StateKind::VaultCreate);
    }
}
