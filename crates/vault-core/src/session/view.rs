//! Render payload for the current state.
//!
//! A [`View`] is everything a front end needs to draw one frame: titles, the
//! body for the current screen, key hints and the status line. It borrows
//! from the [`Session`] and is rebuilt after every intent.

use crate::guard;

use super::machine::Session;
use super::state::{DeleteTarget, FileRow, Status, VaultListRow, ViewState};

const VAULT_SELECT_HINTS: &str =
    "Enter: open | Ctrl+N: create vault | Ctrl+O: open by path | Ctrl+P: open in explorer | Ctrl+X: delete vault | Ctrl+C: quit";
const FILE_LIST_HINTS: &str =
    "Enter: open | Backspace: up | Ctrl+N: new file | Ctrl+D: new dir | Ctrl+X: delete | Esc: vaults | Ctrl+C: quit";
const PROMPT_HINTS: &str = "Enter: confirm | Esc: cancel";
const EDITOR_HINTS: &str = "Ctrl+S: save | Esc: back";
const DELETE_HINTS: &str = "Y/Enter: delete permanently | N/Esc: cancel";

// Two-line variants for narrow terminals.
const VAULT_SELECT_HINTS_COMPACT: &str =
    "Ctrl+N create | Ctrl+O path\nCtrl+P explorer | Ctrl+X delete";
const FILE_LIST_HINTS_COMPACT: &str =
    "Enter open | Backspace up | Ctrl+N file\nCtrl+D dir | Ctrl+X delete | Esc vaults";
const DELETE_HINTS_COMPACT: &str = "Y/Enter: delete\nN/Esc: cancel";

/// Screen-specific part of a [`View`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewBody<'a> {
    /// Vault rows followed by the action rows.
    Vaults(&'a [VaultListRow]),
    /// Entries of the current directory.
    Files(&'a [FileRow]),
    /// Single-line input.
    Prompt { placeholder: &'static str },
    /// Note contents as last loaded or saved.
    Editor { buffer: &'a str },
    /// Pending delete.
    Confirm { target: &'a DeleteTarget },
}

/// Everything needed to draw the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View<'a> {
    pub title: String,
    pub subtitle: String,
    pub body: ViewBody<'a>,
    pub hints: &'static str,
    /// Hints for narrow terminals, possibly on two lines.
    pub compact_hints: &'static str,
    pub status: Option<&'a Status>,
}

impl Session {
    /// Build the render payload for the current state.
    pub fn view(&self) -> View<'_> {
        let (title, subtitle, body, (hints, compact_hints)) = match self.state() {
            ViewState::VaultSelect { rows } => (
                "Vaults".to_string(),
                format!("Storage: {}", self.storage_root().display()),
                ViewBody::Vaults(rows),
                (VAULT_SELECT_HINTS, VAULT_SELECT_HINTS_COMPACT),
            ),
            ViewState::VaultCreate => (
                "Create Vault".to_string(),
                "Enter name and press Enter".to_string(),
                ViewBody::Prompt {
                    placeholder: "New vault name",
                },
                (PROMPT_HINTS, PROMPT_HINTS),
            ),
            ViewState::VaultOpenByPath => (
                "Open Vault By Path".to_string(),
                "Enter full or relative folder path".to_string(),
                ViewBody::Prompt {
                    placeholder: "Vault path (absolute or relative)",
                },
                (PROMPT_HINTS, PROMPT_HINTS),
            ),
            ViewState::FileList { rows } => {
                let (title, subtitle) = match (self.vault_root(), self.current_directory()) {
                    (Some(root), Some(current)) => (
                        format!("Vault: {}", guard::base_name(root)),
                        format!("Path: {}", guard::rel_or_dot(root, current)),
                    ),
                    _ => ("Vault".to_string(), String::new()),
                };
                (
                    title,
                    subtitle,
                    ViewBody::Files(rows),
                    (FILE_LIST_HINTS, FILE_LIST_HINTS_COMPACT),
                )
            }
            ViewState::FileCreate => (
                "Create File".to_string(),
                "Use only letters and digits, .md is added automatically".to_string(),
                ViewBody::Prompt {
                    placeholder: "File name: letters and digits only",
                },
                (PROMPT_HINTS, PROMPT_HINTS),
            ),
            ViewState::DirectoryCreate => (
                "Create Directory".to_string(),
                "Enter a directory name".to_string(),
                ViewBody::Prompt {
                    placeholder: "New directory name (in current directory)",
                },
                (PROMPT_HINTS, PROMPT_HINTS),
            ),
            ViewState::Editor { path, buffer } => {
                let label = match self.vault_root() {
                    Some(root) => guard::rel_or_base(root, path),
                    None => guard::base_name(path),
                };
                (
                    format!("Editing: {label}"),
                    "Markdown editor".to_string(),
                    ViewBody::Editor { buffer },
                    (EDITOR_HINTS, EDITOR_HINTS),
                )
            }
            ViewState::ConfirmDelete { target } => (
                format!("Delete {}?", target.noun()),
                target.path.display().to_string(),
                ViewBody::Confirm { target },
                (DELETE_HINTS, DELETE_HINTS_COMPACT),
            ),
        };

        View {
            title,
            subtitle,
            body,
            hints,
            compact_hints,
            status: self.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::FilesystemGateway;
    use crate::picker::UnavailablePicker;
    use crate::registry::VaultRegistry;
    use crate::session::Intent;
    use std::fs;
    use tempfile::TempDir;

    fn make_session(home: &std::path::Path) -> Session {
        Session::new(
            VaultRegistry::new(home.join("vaults.json")),
            FilesystemGateway::new(),
            Box::new(UnavailablePicker),
            home.to_path_buf(),
        )
    }

    #[test]
    fn test_vault_select_view() {
        let home = TempDir::new().unwrap();
        let session = make_session(home.path());

        let view = session.view();
        assert_eq!(view.title, "Vaults");
        assert_eq!(view.subtitle, format!("Storage: {}", home.path().display()));
        assert!(matches!(view.body, ViewBody::Vaults(rows) if rows.len() == 3));
        assert!(view.hints.contains("Ctrl+N: create vault"));
        assert_eq!(view.compact_hints.lines().count(), 2);
    }

    #[test]
    fn test_file_list_and_editor_views() {
        let home = TempDir::new().unwrap();
        let vault = home.path().join("Notes");
        fs::create_dir_all(vault.join("daily")).unwrap();
        fs::write(vault.join("daily/today.md"), "# Today").unwrap();
        let mut session = make_session(home.path());

        session.dispatch(Intent::OpenByPath);
        session.dispatch(Intent::Submit(vault.display().to_string()));
        let view = session.view();
        assert_eq!(view.title, "Vault: Notes");
        assert_eq!(view.subtitle, "Path: .");
        assert_eq!(view.status.unwrap().text, "Vault selected: Notes");

        session.dispatch(Intent::Select(0));
        assert_eq!(session.view().subtitle, "Path: daily");

        session.dispatch(Intent::Select(1));
        let view = session.view();
        assert_eq!(view.title, "Editing: daily/today.md");
        assert_eq!(view.body, ViewBody::Editor { buffer: "# Today" });
        assert_eq!(view.hints, EDITOR_HINTS);
    }

    #[test]
    fn test_prompt_and_confirm_views() {
        let home = TempDir::new().unwrap();
        let vault = home.path().join("Notes");
        fs::create_dir_all(&vault).unwrap();
        fs::write(vault.join("a.md"), "").unwrap();
        let mut session = make_session(home.path());

        session.dispatch(Intent::CreateVault);
        assert_eq!(
            session.view().body,
            ViewBody::Prompt {
                placeholder: "New vault name"
            }
        );
        session.dispatch(Intent::Cancel);

        session.dispatch(Intent::OpenByPath);
        session.dispatch(Intent::Submit(vault.display().to_string()));
        session.dispatch(Intent::Delete(0));
        let view = session.view();
        assert_eq!(view.title, "Delete file?");
        assert!(matches!(view.body, ViewBody::Confirm { target } if target.label == "a.md"));
        assert_eq!(view.hints, DELETE_HINTS);
    }
}
