//! The session state machine.
//!
//! A [`Session`] owns the current [`ViewState`], the open vault and the status
//! message. Each [`Intent`] is processed to completion before the next one:
//! containment is checked through [`guard`], then the filesystem or registry
//! is touched, then the next state is computed. Failures never escape
//! [`Session::dispatch`]; they become the status message and leave the
//! session on a stable screen.

use std::path::{Path, PathBuf};

use crate::error::{SessionError, SessionResult};
use crate::gateway::{FilesystemGateway, GatewayError};
use crate::guard;
use crate::picker::{FolderPicker, PickerOutcome};
use crate::registry::VaultRegistry;

use super::state::{
    DeleteTarget, FileRow, Flow, Intent, StateKind, Status, StatusKind, VaultListRow, ViewState,
};

/// Suffix appended to every new note name.
pub const NOTE_EXTENSION: &str = "md";

/// The vault currently open and where the user is inside it.
#[derive(Debug, Clone)]
struct ActiveVault {
    /// Resolved vault root.
    root: PathBuf,
    /// Current directory, always inside `root`.
    current: PathBuf,
}

/// Interactive session over the vault registry and one open vault.
pub struct Session {
    state: ViewState,
    active: Option<ActiveVault>,
    status: Option<Status>,
    registry: VaultRegistry,
    gateway: FilesystemGateway,
    picker: Box<dyn FolderPicker>,
    /// Directory new vaults are created in.
    storage_root: PathBuf,
}

impl Session {
    /// Create a session on the vault selection screen.
    ///
    /// Loads (and heals) the registry immediately; a registry failure leaves
    /// an empty vault list with the error in the status.
    pub fn new(
        registry: VaultRegistry,
        gateway: FilesystemGateway,
        picker: Box<dyn FolderPicker>,
        storage_root: PathBuf,
    ) -> Self {
        let mut session = Self {
            state: ViewState::VaultSelect { rows: Vec::new() },
            active: None,
            status: None,
            registry,
            gateway,
            picker,
            storage_root,
        };
        session.show_vaults();
        session
    }

    /// Returns the current view state.
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Returns the root of the open vault.
    pub fn vault_root(&self) -> Option<&Path> {
        self.active.as_ref().map(|a| a.root.as_path())
    }

    /// Returns the current directory inside the open vault.
    pub fn current_directory(&self) -> Option<&Path> {
        self.active.as_ref().map(|a| a.current.as_path())
    }

    /// Returns the last status message.
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Returns the directory new vaults are created in.
    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    /// Returns the registry this session reads and writes.
    pub fn registry(&self) -> &VaultRegistry {
        &self.registry
    }

    /// Process one intent.
    pub fn dispatch(&mut self, intent: Intent) -> Flow {
        if intent == Intent::Quit {
            tracing::debug!("Quit requested from {:?}", self.state.kind());
            return Flow::Quit;
        }

        let result = match (self.state.kind(), intent) {
            (StateKind::VaultSelect, Intent::Select(index)) => self.select_vault_row(index),
            (StateKind::VaultSelect, Intent::CreateVault) => {
                self.state = ViewState::VaultCreate;
                Ok(())
            }
            (StateKind::VaultSelect, Intent::OpenByPath) => {
                self.state = ViewState::VaultOpenByPath;
                Ok(())
            }
            (StateKind::VaultSelect, Intent::OpenViaPicker) => self.open_via_picker(),
            (StateKind::VaultSelect, Intent::Delete(index)) => self.stage_vault_delete(index),

            (StateKind::VaultCreate, Intent::Submit(name)) => self.create_vault(&name),
            (StateKind::VaultOpenByPath, Intent::Submit(raw)) => self.open_vault_input(&raw),

            (StateKind::FileList, Intent::Select(index)) => self.select_file_row(index),
            (StateKind::FileList, Intent::Parent) => self.go_parent(),
            (StateKind::FileList, Intent::CreateFile) => {
                self.state = ViewState::FileCreate;
                Ok(())
            }
            (StateKind::FileList, Intent::CreateDirectory) => {
                self.state = ViewState::DirectoryCreate;
                Ok(())
            }
            (StateKind::FileList, Intent::Delete(index)) => self.stage_file_delete(index),
            (StateKind::FileList, Intent::Cancel) => {
                self.close_vault();
                Ok(())
            }

            (StateKind::FileCreate, Intent::Submit(name)) => self.create_file(&name),
            (StateKind::DirectoryCreate, Intent::Submit(name)) => self.create_directory(&name),

            (StateKind::Editor, Intent::Save(buffer)) => self.save(buffer),
            (StateKind::Editor, Intent::Cancel) => {
                self.return_to_files();
                Ok(())
            }

            (StateKind::ConfirmDelete, Intent::Confirm) => self.confirm_delete(),
            (StateKind::ConfirmDelete, Intent::Decline | Intent::Cancel) => {
                self.return_to_list();
                Ok(())
            }

            (kind, Intent::Cancel) if kind.is_prompt() => {
                self.return_to_list();
                Ok(())
            }

            (kind, intent) => {
                tracing::trace!("Ignoring {:?} in {:?}", intent, kind);
                Ok(())
            }
        };

        if let Err(err) = result {
            self.report(err);
        }
        Flow::Continue
    }

    // ------------------------------------------------------------------
    // Vault selection
    // ------------------------------------------------------------------

    fn select_vault_row(&mut self, index: usize) -> SessionResult<()> {
        let row = match &self.state {
            ViewState::VaultSelect { rows } => rows.get(index).cloned(),
            _ => None,
        };

        match row {
            None => Ok(()),
            Some(VaultListRow::ExistingVault(path)) => self.open_vault(&path),
            Some(VaultListRow::CreateNewAction) => {
                self.state = ViewState::VaultCreate;
                Ok(())
            }
            Some(VaultListRow::OpenByPathAction) => {
                self.state = ViewState::VaultOpenByPath;
                Ok(())
            }
            Some(VaultListRow::OpenViaPickerAction) => self.open_via_picker(),
        }
    }

    fn stage_vault_delete(&mut self, index: usize) -> SessionResult<()> {
        let path = match &self.state {
            ViewState::VaultSelect { rows } => {
                rows.get(index).and_then(|r| r.vault_path()).map(Path::to_path_buf)
            }
            _ => None,
        };
        let Some(path) = path else {
            return Ok(());
        };

        self.state = ViewState::ConfirmDelete {
            target: DeleteTarget {
                label: guard::base_name(&path),
                path,
                is_directory: true,
                is_vault_root: true,
            },
        };
        Ok(())
    }

    fn create_vault(&mut self, name: &str) -> SessionResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::validation("Vault name cannot be empty"));
        }

        let candidate = resolve(&self.storage_root.join(name))?;
        if !guard::is_inside(&self.storage_root, &candidate)
            || guard::same_path(&self.storage_root, &candidate)
        {
            return Err(SessionError::Containment(candidate));
        }

        self.gateway.create_directory(&candidate)?;
        let root = candidate;
        tracing::info!("Created vault directory {:?}", root);

        if let Err(err) = self.registry.register(&root) {
            // The directory stays on disk; report the partial success.
            tracing::warn!("Vault {:?} created but not registered: {}", root, err);
            self.set_status(
                StatusKind::Warning,
                format!("Vault created, but registry update failed: {err}"),
            );
            return Ok(());
        }

        self.open_vault(&root)?;
        self.set_status(
            StatusKind::Success,
            format!("Vault created: {}", guard::base_name(&root)),
        );
        Ok(())
    }

    fn open_vault_input(&mut self, raw: &str) -> SessionResult<()> {
        let cleaned = raw.trim().trim_matches(|c| c == '"' || c == '\'');
        if cleaned.is_empty() {
            return Err(SessionError::validation("Vault path cannot be empty"));
        }
        self.open_existing_directory(Path::new(cleaned))
    }

    fn open_via_picker(&mut self) -> SessionResult<()> {
        match self.picker.pick_folder()? {
            PickerOutcome::Selected(path) => self.open_existing_directory(&path),
            PickerOutcome::Cancelled => {
                self.set_status(StatusKind::Info, "Vault selection canceled");
                Ok(())
            }
        }
    }

    /// Open an arbitrary existing directory as a vault and register it.
    fn open_existing_directory(&mut self, path: &Path) -> SessionResult<()> {
        let abs = resolve(path)?;
        match self.gateway.is_directory(&abs) {
            Ok(true) => {}
            Ok(false) => return Err(SessionError::NotADirectory(abs)),
            Err(_) => return Err(SessionError::Inaccessible(abs)),
        }

        self.open_vault(&abs)?;

        if let Err(err) = self.registry.register(&abs) {
            tracing::warn!("Opened vault {:?} but could not register it: {}", abs, err);
            self.set_status(
                StatusKind::Warning,
                format!("Vault opened, but registry update failed: {err}"),
            );
        }
        Ok(())
    }

    /// Enter the file list at the root of `path`.
    fn open_vault(&mut self, path: &Path) -> SessionResult<()> {
        let root = resolve(path)?;
        let rows = self.file_rows(&root, &root)?;

        tracing::info!("Opened vault {:?}", root);
        self.active = Some(ActiveVault {
            current: root.clone(),
            root: root.clone(),
        });
        self.state = ViewState::FileList { rows };
        self.set_status(
            StatusKind::Success,
            format!("Vault selected: {}", guard::base_name(&root)),
        );
        Ok(())
    }

    fn close_vault(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::info!("Closed vault {:?}", active.root);
        }
        self.show_vaults();
    }

    /// Heal the registry and show the vault list.
    fn show_vaults(&mut self) {
        let mut vaults = match self.registry.heal() {
            Ok(vaults) => vaults,
            Err(err) => {
                tracing::warn!("Could not load vault registry: {}", err);
                self.set_status(StatusKind::Error, format!("Error: {err}"));
                Vec::new()
            }
        };
        vaults.sort_by(|a, b| {
            guard::base_name(a)
                .to_lowercase()
                .cmp(&guard::base_name(b).to_lowercase())
                .then_with(|| a.cmp(b))
        });

        let mut rows: Vec<VaultListRow> =
            vaults.into_iter().map(VaultListRow::ExistingVault).collect();
        rows.push(VaultListRow::CreateNewAction);
        rows.push(VaultListRow::OpenByPathAction);
        rows.push(VaultListRow::OpenViaPickerAction);

        self.active = None;
        self.state = ViewState::VaultSelect { rows };
    }

    // ------------------------------------------------------------------
    // File browsing
    // ------------------------------------------------------------------

    fn select_file_row(&mut self, index: usize) -> SessionResult<()> {
        let row = match &self.state {
            ViewState::FileList { rows } => rows.get(index).cloned(),
            _ => None,
        };

        match row {
            None => Ok(()),
            Some(FileRow::Parent(_)) => self.go_parent(),
            Some(FileRow::Entry(entry)) if entry.is_directory => {
                self.enter_directory(&entry.path)
            }
            Some(FileRow::Entry(entry)) => self.open_editor(&entry.path),
        }
    }

    fn enter_directory(&mut self, path: &Path) -> SessionResult<()> {
        let root = self.active()?.root.clone();
        let path = self.confine(path)?;
        let rows = self.file_rows(&root, &path)?;

        tracing::debug!("Entered directory {:?}", path);
        self.set_current(path);
        self.state = ViewState::FileList { rows };
        Ok(())
    }

    fn go_parent(&mut self) -> SessionResult<()> {
        let active = self.active()?.clone();
        if guard::same_path(&active.current, &active.root) {
            return Ok(());
        }
        let Some(parent) = active.current.parent() else {
            return Ok(());
        };

        let parent = self.confine(parent)?;
        let rows = self.file_rows(&active.root, &parent)?;

        self.set_current(parent);
        self.state = ViewState::FileList { rows };
        Ok(())
    }

    fn create_file(&mut self, name: &str) -> SessionResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::validation("File name cannot be empty"));
        }
        if !is_valid_note_name(name) {
            return Err(SessionError::validation(
                "Invalid file name: use only letters and digits",
            ));
        }

        let current = self.active()?.current.clone();
        let path = self.confine(&current.join(format!("{name}.{NOTE_EXTENSION}")))?;
        self.gateway.create_file_exclusive(&path)?;

        tracing::info!("Created note {:?}", path);
        self.set_status(
            StatusKind::Success,
            format!("File created: {}", self.label(&path)),
        );
        self.return_to_files();
        Ok(())
    }

    fn create_directory(&mut self, name: &str) -> SessionResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::validation("Directory name cannot be empty"));
        }

        let current = self.active()?.current.clone();
        let path = self.confine(&current.join(name))?;
        self.gateway.create_directory_recursive(&path)?;

        tracing::info!("Created directory {:?}", path);
        self.set_status(
            StatusKind::Success,
            format!("Directory created: {}", self.label(&path)),
        );
        self.return_to_files();
        Ok(())
    }

    fn stage_file_delete(&mut self, index: usize) -> SessionResult<()> {
        let entry = match &self.state {
            ViewState::FileList { rows } => rows.get(index).and_then(|r| r.entry()).cloned(),
            _ => None,
        };
        let Some(entry) = entry else {
            return Ok(());
        };

        let root = self.active()?.root.clone();
        // A symlink entry is removed itself, not the directory it points to.
        self.confine(&entry.path)?;
        let path = entry.path;
        if guard::same_path(&root, &path) {
            return Err(SessionError::Containment(path));
        }

        self.state = ViewState::ConfirmDelete {
            target: DeleteTarget {
                label: self.label(&path),
                path,
                is_directory: entry.is_directory,
                is_vault_root: false,
            },
        };
        Ok(())
    }

    // ------------------------------------------------------------------
    // Editor
    // ------------------------------------------------------------------

    fn open_editor(&mut self, path: &Path) -> SessionResult<()> {
        let path = self.confine(path)?;
        let buffer = self.gateway.read_text(&path)?;

        tracing::debug!("Editing {:?} ({} bytes)", path, buffer.len());
        self.state = ViewState::Editor { path, buffer };
        Ok(())
    }

    fn save(&mut self, contents: String) -> SessionResult<()> {
        let path = match &self.state {
            ViewState::Editor { path, .. } => path.clone(),
            _ => return Ok(()),
        };
        let path = self.confine(&path)?;
        self.gateway.write_file(&path, contents.as_bytes())?;

        tracing::debug!("Saved {:?} ({} bytes)", path, contents.len());
        if let ViewState::Editor { buffer, .. } = &mut self.state {
            *buffer = contents;
        }
        self.set_status(StatusKind::Success, format!("Saved: {}", self.label(&path)));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Deletion
    // ------------------------------------------------------------------

    fn confirm_delete(&mut self) -> SessionResult<()> {
        let target = match &self.state {
            ViewState::ConfirmDelete { target } => target.clone(),
            _ => return Ok(()),
        };

        if let Err(err) = self.execute_delete(&target) {
            self.return_to_list();
            return Err(err);
        }

        if target.is_vault_root {
            match self.registry.unregister(&target.path) {
                Ok(()) => self.set_status(
                    StatusKind::Warning,
                    format!("Vault deleted: {}", target.label),
                ),
                Err(err) => {
                    tracing::warn!("Vault {:?} deleted but not unregistered: {}", target.path, err);
                    self.set_status(
                        StatusKind::Warning,
                        format!("Vault deleted, but registry update failed: {err}"),
                    );
                }
            }
            self.show_vaults();
        } else {
            self.set_status(StatusKind::Warning, format!("Deleted: {}", target.label));
            self.return_to_files();
        }
        Ok(())
    }

    fn execute_delete(&self, target: &DeleteTarget) -> SessionResult<()> {
        if target.is_vault_root {
            let registered = self.registry.load()?;
            if !registered.iter().any(|v| guard::same_path(v, &target.path)) {
                return Err(SessionError::Containment(target.path.clone()));
            }
        } else {
            self.confine(&target.path)?;
            if self.vault_root().is_some_and(|root| guard::same_path(root, &target.path)) {
                return Err(SessionError::Containment(target.path.clone()));
            }
        }

        self.gateway.delete_entry(&target.path, target.is_directory)?;
        tracing::info!("Deleted {} {:?}", target.noun(), target.path);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Leave a prompt or confirmation for the list it was entered from.
    fn return_to_list(&mut self) {
        let to_vaults = match &self.state {
            ViewState::VaultCreate | ViewState::VaultOpenByPath | ViewState::VaultSelect { .. } => {
                true
            }
            ViewState::ConfirmDelete { target } => target.is_vault_root,
            _ => self.active.is_none(),
        };

        if to_vaults {
            self.show_vaults();
        } else {
            self.return_to_files();
        }
    }

    /// Re-list the current directory and show it.
    ///
    /// If the listing fails the file list is shown with only the parent row
    /// and the error in the status.
    fn return_to_files(&mut self) {
        let Some(active) = self.active.clone() else {
            self.show_vaults();
            return;
        };

        let rows = match self.file_rows(&active.root, &active.current) {
            Ok(rows) => rows,
            Err(err) => {
                self.report(err);
                parent_row(&active.root, &active.current).into_iter().collect()
            }
        };
        self.state = ViewState::FileList { rows };
    }

    fn file_rows(&self, root: &Path, current: &Path) -> SessionResult<Vec<FileRow>> {
        if !guard::is_inside(root, current) {
            return Err(SessionError::Containment(current.to_path_buf()));
        }

        let entries = self.gateway.list_directory(current)?;
        let mut rows = Vec::with_capacity(entries.len() + 1);
        rows.extend(parent_row(root, current));
        rows.extend(entries.into_iter().map(FileRow::Entry));
        Ok(rows)
    }

    fn active(&self) -> SessionResult<&ActiveVault> {
        self.active.as_ref().ok_or(SessionError::NoActiveVault)
    }

    /// Check `candidate` against the open vault and return its resolved form.
    ///
    /// Callers hand the resolved path to the gateway so the kernel never
    /// re-walks symlinks or `..` that were only checked lexically.
    fn confine(&self, candidate: &Path) -> SessionResult<PathBuf> {
        let root = &self.active()?.root;
        let resolved = resolve(candidate)?;
        if guard::is_inside(root, &resolved) {
            Ok(resolved)
        } else {
            tracing::warn!("Rejected {:?}: outside vault {:?}", candidate, root);
            Err(SessionError::Containment(candidate.to_path_buf()))
        }
    }

    fn set_current(&mut self, path: PathBuf) {
        if let Some(active) = self.active.as_mut() {
            active.current = path;
        }
    }

    fn label(&self, path: &Path) -> String {
        match self.vault_root() {
            Some(root) => guard::rel_or_base(root, path),
            None => guard::base_name(path),
        }
    }

    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(Status::new(kind, text));
    }

    fn report(&mut self, err: SessionError) {
        if err.is_validation() {
            tracing::debug!("Rejected input: {}", err);
            self.set_status(StatusKind::Warning, err.to_string());
        } else {
            tracing::warn!("Intent failed in {:?}: {}", self.state.kind(), err);
            self.set_status(StatusKind::Error, format!("Error: {err}"));
        }
    }
}

/// Whether `name` is acceptable as a note name: letters and digits only.
pub fn is_valid_note_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(char::is_alphanumeric)
}

fn parent_row(root: &Path, current: &Path) -> Option<FileRow> {
    if guard::same_path(current, root) {
        return None;
    }
    current.parent().map(|p| FileRow::Parent(p.to_path_buf()))
}

fn resolve(path: &Path) -> SessionResult<PathBuf> {
    guard::resolve(path).map_err(|e| GatewayError::from_io(path, e).into())
}
