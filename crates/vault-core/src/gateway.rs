//! Raw filesystem operations used by the session state machine.
//!
//! The gateway trusts its input: callers must run every path through
//! [`crate::guard`] before handing it over. Failures are classified into
//! [`GatewayError`] variants that always carry the offending path.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;

/// Errors that can occur during filesystem operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The path does not exist.
    #[error("path does not exist: {0}")]
    NotFound(PathBuf),

    /// The path is not a directory.
    #[error("path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An exclusive create found something already at the path.
    #[error("already exists: {0}")]
    AlreadyExists(PathBuf),

    /// Permission denied.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The file content is not valid UTF-8 text.
    #[error("not a text file: {0}")]
    NotText(PathBuf),

    /// Any other IO error.
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GatewayError {
    /// Classify an IO error for `path`.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::AlreadyExists => Self::AlreadyExists(path.to_path_buf()),
            io::ErrorKind::NotADirectory => Self::NotADirectory(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Entry name (not full path).
    pub name: String,
    /// Full path as listed (not canonicalized).
    pub path: PathBuf,
    /// Whether the entry is a directory (symlinks are followed).
    pub is_directory: bool,
    /// Last modified time, files only.
    pub modified: Option<SystemTime>,
}

/// Synchronous filesystem operations.
#[derive(Debug, Clone)]
pub struct FilesystemGateway {
    /// Whether dot-files are included in listings.
    include_hidden: bool,
}

impl Default for FilesystemGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl FilesystemGateway {
    /// Create a gateway that lists hidden entries.
    pub fn new() -> Self {
        Self {
            include_hidden: true,
        }
    }

    /// Set whether entries starting with '.' are listed.
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// List the children of `path`, directories first, then files, each
    /// group sorted case-insensitively by name.
    pub fn list_directory(&self, path: &Path) -> Result<Vec<Entry>, GatewayError> {
        let metadata = fs::metadata(path).map_err(|e| GatewayError::from_io(path, e))?;
        if !metadata.is_dir() {
            return Err(GatewayError::NotADirectory(path.to_path_buf()));
        }

        let read_dir = fs::read_dir(path).map_err(|e| GatewayError::from_io(path, e))?;

        let mut entries = Vec::new();
        for entry_result in read_dir {
            let entry = match entry_result {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry in {:?}: {}", path, e);
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().to_string();
            if !self.include_hidden && name.starts_with('.') {
                continue;
            }

            let entry_path = entry.path();
            // Follow symlinks; fall back to the link itself when dangling.
            let metadata = match fs::metadata(&entry_path).or_else(|_| entry.metadata()) {
                Ok(m) => m,
                Err(_) => continue,
            };

            let is_directory = metadata.is_dir();
            let modified = if is_directory {
                None
            } else {
                metadata.modified().ok()
            };

            entries.push(Entry {
                name,
                path: entry_path,
                is_directory,
                modified,
            });
        }

        entries.sort_by(|a, b| match (a.is_directory, b.is_directory) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            _ => a
                .name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name)),
        });

        Ok(entries)
    }

    /// Read a whole file.
    pub fn read_file(&self, path: &Path) -> Result<Vec<u8>, GatewayError> {
        fs::read(path).map_err(|e| GatewayError::from_io(path, e))
    }

    /// Read a whole file as UTF-8 text.
    pub fn read_text(&self, path: &Path) -> Result<String, GatewayError> {
        let bytes = self.read_file(path)?;
        String::from_utf8(bytes).map_err(|_| GatewayError::NotText(path.to_path_buf()))
    }

    /// Overwrite a file with `contents`, creating it if needed.
    ///
    /// Not atomic: a crash mid-write can leave the file truncated.
    pub fn write_file(&self, path: &Path, contents: &[u8]) -> Result<(), GatewayError> {
        fs::write(path, contents).map_err(|e| GatewayError::from_io(path, e))
    }

    /// Create an empty file, failing if anything already exists at `path`.
    pub fn create_file_exclusive(&self, path: &Path) -> Result<(), GatewayError> {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map(drop)
            .map_err(|e| GatewayError::from_io(path, e))
    }

    /// Create a single directory, failing if it already exists.
    pub fn create_directory(&self, path: &Path) -> Result<(), GatewayError> {
        fs::create_dir(path).map_err(|e| GatewayError::from_io(path, e))
    }

    /// Create a directory and any missing parents. Succeeds if it exists.
    pub fn create_directory_recursive(&self, path: &Path) -> Result<(), GatewayError> {
        fs::create_dir_all(path).map_err(|e| GatewayError::from_io(path, e))
    }

    /// Permanently remove a file, or a directory with all its descendants.
    pub fn delete_entry(&self, path: &Path, is_directory: bool) -> Result<(), GatewayError> {
        let result = if is_directory {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        result.map_err(|e| GatewayError::from_io(path, e))
    }

    /// Whether `path` exists and is a directory.
    pub fn is_directory(&self, path: &Path) -> Result<bool, GatewayError> {
        fs::metadata(path)
            .map(|m| m.is_dir())
            .map_err(|e| GatewayError::from_io(path, e))
    }
}
