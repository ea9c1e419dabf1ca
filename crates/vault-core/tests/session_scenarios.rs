//! End-to-end scenarios for the Gono core.
//!
//! These tests drive a [`Session`] the way the terminal front end does and
//! check the effects on disk:
//! - Note lifecycle inside a vault
//! - Navigation limits
//! - Registry healing and vault deletion
//! - Containment of user-supplied names

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vault_core::{
    guard, FileRow, FilesystemGateway, Flow, Intent, Session, StateKind, StatusKind,
    UnavailablePicker, VaultListRow, VaultRegistry, ViewState,
};

/// Create a home directory with an empty vault `V` inside it.
fn create_test_home() -> (TempDir, PathBuf) {
    let home = TempDir::new().unwrap();
    let vault = home.path().join("V");
    fs::create_dir_all(&vault).unwrap();
    (home, vault)
}

fn registry_for(home: &Path) -> VaultRegistry {
    VaultRegistry::new(home.join(".gono_vaults.json"))
}

fn start_session(home: &Path) -> Session {
    Session::new(
        registry_for(home),
        FilesystemGateway::new(),
        Box::new(UnavailablePicker),
        home.to_path_buf(),
    )
}

fn open_by_path(session: &mut Session, vault: &Path) {
    assert_eq!(session.dispatch(Intent::OpenByPath), Flow::Continue);
    session.dispatch(Intent::Submit(vault.display().to_string()));
    assert_eq!(session.state().kind(), StateKind::FileList);
}

fn listing(session: &Session) -> Vec<String> {
    match session.state() {
        ViewState::FileList { rows } => rows.iter().map(FileRow::title).collect(),
        other => panic!("expected file list, got {:?}", other),
    }
}

fn vault_names(session: &Session) -> Vec<String> {
    match session.state() {
        ViewState::VaultSelect { rows } => rows
            .iter()
            .filter_map(VaultListRow::vault_path)
            .map(guard::base_name)
            .collect(),
        other => panic!("expected vault list, got {:?}", other),
    }
}

fn position(session: &Session, title: &str) -> usize {
    listing(session)
        .iter()
        .position(|t| t == title)
        .unwrap_or_else(|| panic!("{title} not listed"))
}

fn status_text(session: &Session) -> String {
    session
        .status()
        .map(|s| s.text.clone())
        .unwrap_or_default()
}

// =============================================================================
// Note Lifecycle Tests
// =============================================================================

#[test]
fn test_note_create_edit_reopen_delete() {
    let (home, vault) = create_test_home();
    let mut session = start_session(home.path());
    open_by_path(&mut session, &vault);
    assert!(listing(&session).is_empty());

    // Create
    session.dispatch(Intent::CreateFile);
    session.dispatch(Intent::Submit("Todo".to_string()));
    assert_eq!(listing(&session), vec!["Todo.md"]);
    assert_eq!(status_text(&session), "File created: Todo.md");

    // Edit and save
    session.dispatch(Intent::Select(position(&session, "Todo.md")));
    assert_eq!(session.state().kind(), StateKind::Editor);
    session.dispatch(Intent::Save("- buy milk".to_string()));
    assert_eq!(status_text(&session), "Saved: Todo.md");
    session.dispatch(Intent::Cancel);

    // Reopen
    session.dispatch(Intent::Select(position(&session, "Todo.md")));
    match session.state() {
        ViewState::Editor { buffer, .. } => assert_eq!(buffer, "- buy milk"),
        other => panic!("expected editor, got {:?}", other),
    }
    session.dispatch(Intent::Cancel);

    // Delete
    session.dispatch(Intent::Delete(position(&session, "Todo.md")));
    assert_eq!(session.state().kind(), StateKind::ConfirmDelete);
    session.dispatch(Intent::Confirm);

    assert!(listing(&session).is_empty());
    assert_eq!(status_text(&session), "Deleted: Todo.md");
    assert!(!vault.join("Todo.md").exists());
}

#[test]
fn test_notes_in_subdirectory() {
    let (home, vault) = create_test_home();
    let mut session = start_session(home.path());
    open_by_path(&mut session, &vault);

    session.dispatch(Intent::CreateDirectory);
    session.dispatch(Intent::Submit("journal".to_string()));
    let journal = format!("journal{}", std::path::MAIN_SEPARATOR);
    session.dispatch(Intent::Select(position(&session, &journal)));

    session.dispatch(Intent::CreateFile);
    session.dispatch(Intent::Submit("Day1".to_string()));

    assert_eq!(listing(&session), vec!["..", "Day1.md"]);
    assert_eq!(session.view().subtitle, "Path: journal");
    assert!(vault.join("journal/Day1.md").is_file());
}

#[test]
fn test_create_file_never_overwrites() {
    let (home, vault) = create_test_home();
    fs::write(vault.join("Todo.md"), "original").unwrap();
    let mut session = start_session(home.path());
    open_by_path(&mut session, &vault);

    session.dispatch(Intent::CreateFile);
    session.dispatch(Intent::Submit("Todo".to_string()));

    assert_eq!(session.status().unwrap().kind, StatusKind::Error);
    assert_eq!(fs::read_to_string(vault.join("Todo.md")).unwrap(), "original");
}

// =============================================================================
// Navigation Tests
// =============================================================================

#[test]
fn test_parent_at_vault_root_is_noop() {
    let (home, vault) = create_test_home();
    let mut session = start_session(home.path());
    open_by_path(&mut session, &vault);

    let before = session.state().clone();
    session.dispatch(Intent::Parent);

    assert_eq!(session.state(), &before);
    assert_eq!(session.current_directory(), session.vault_root());
}

#[test]
fn test_sibling_prefix_vault_is_not_inside() {
    let home = TempDir::new().unwrap();
    let notes = home.path().join("Notes");
    let archive = home.path().join("NotesArchive");
    fs::create_dir_all(&notes).unwrap();
    fs::create_dir_all(&archive).unwrap();

    assert!(guard::is_inside(&notes, &notes));
    assert!(guard::is_inside(&notes, &notes.join("a/b.md")));
    assert!(!guard::is_inside(&notes, &archive));
    assert!(!guard::is_inside(&notes, home.path()));
}

#[test]
fn test_file_names_are_validated() {
    let (home, vault) = create_test_home();
    let mut session = start_session(home.path());
    open_by_path(&mut session, &vault);
    session.dispatch(Intent::CreateFile);

    for rejected in ["my note", "note.txt", "../x"] {
        session.dispatch(Intent::Submit(rejected.to_string()));
        assert_eq!(session.state().kind(), StateKind::FileCreate, "{rejected}");
        assert_eq!(session.status().unwrap().kind, StatusKind::Warning);
    }
    assert!(fs::read_dir(&vault).unwrap().next().is_none());

    session.dispatch(Intent::Submit("Note1".to_string()));
    assert_eq!(listing(&session), vec!["Note1.md"]);
}

// =============================================================================
// Registry Tests
// =============================================================================

#[test]
fn test_removed_vault_heals_out_of_registry() {
    let (home, vault) = create_test_home();
    let registry = registry_for(home.path());
    registry.register(&vault).unwrap();

    fs::remove_dir_all(&vault).unwrap();

    let session = start_session(home.path());
    assert!(vault_names(&session).is_empty());

    let contents = fs::read_to_string(registry.path()).unwrap();
    assert!(!contents.contains("\"V\"") && !contents.contains(&*vault.to_string_lossy()));
    assert!(registry.load().unwrap().is_empty());
}

#[test]
fn test_reopening_registered_vault_does_not_duplicate() {
    let (home, vault) = create_test_home();
    let mut session = start_session(home.path());

    open_by_path(&mut session, &vault);
    session.dispatch(Intent::Cancel);
    open_by_path(&mut session, &vault);
    session.dispatch(Intent::Cancel);

    assert_eq!(vault_names(&session), vec!["V"]);
    assert_eq!(registry_for(home.path()).load().unwrap().len(), 1);
}

#[test]
fn test_vault_delete_unregisters_and_removes_tree() {
    let (home, vault) = create_test_home();
    fs::create_dir_all(vault.join("deep/er")).unwrap();
    fs::write(vault.join("deep/er/n.md"), "x").unwrap();
    let registry = registry_for(home.path());
    registry.register(&vault).unwrap();

    let mut session = start_session(home.path());
    assert_eq!(vault_names(&session), vec!["V"]);

    session.dispatch(Intent::Delete(0));
    match session.state() {
        ViewState::ConfirmDelete { target } => {
            assert!(target.is_vault_root);
            assert_eq!(target.noun(), "vault");
        }
        other => panic!("expected confirmation, got {:?}", other),
    }
    session.dispatch(Intent::Confirm);

    assert!(!vault.exists());
    assert!(vault_names(&session).is_empty());
    assert!(registry.load().unwrap().is_empty());
}

#[test]
fn test_created_vault_appears_after_closing() {
    let home = TempDir::new().unwrap();
    let mut session = start_session(home.path());

    session.dispatch(Intent::CreateVault);
    session.dispatch(Intent::Submit("Zettel".to_string()));
    assert_eq!(session.state().kind(), StateKind::FileList);

    session.dispatch(Intent::Cancel);
    assert_eq!(vault_names(&session), vec!["Zettel"]);
    assert_eq!(session.dispatch(Intent::Quit), Flow::Quit);
}
