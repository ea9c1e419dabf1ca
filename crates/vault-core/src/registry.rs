//! Persistent registry of known vault roots.
//!
//! The registry is a single JSON document, `{"vaults": [...]}`, rewritten in
//! full on every save. Nothing is cached in memory: every operation reads the
//! file, and every mutation writes the whole snapshot back. There is no file
//! locking, so two concurrent instances can lose an update (last writer wins).

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::guard;

/// Errors that can occur reading or writing the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry file exists but could not be read.
    #[error("failed to read vault registry {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The registry file is not valid JSON of the expected shape.
    #[error("failed to parse vault registry {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The registry could not be serialized.
    #[error("failed to serialize vault registry: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The registry file could not be written.
    #[error("failed to write vault registry {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The registry stores paths as JSON strings, which must be UTF-8.
    #[error("vault path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// A vault path could not be resolved to an absolute path.
    #[error("cannot resolve vault path {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// On-disk shape of the registry.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryData {
    #[serde(default)]
    vaults: Vec<String>,
}

/// Handle to the registry file. Holds only its location.
#[derive(Debug, Clone)]
pub struct VaultRegistry {
    path: PathBuf,
}

impl VaultRegistry {
    /// Create a registry handle persisting to `path`.
    ///
    /// This does not touch the filesystem.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the path to the registry file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted vault list.
    ///
    /// A missing file yields an empty list. Entries are resolved to absolute
    /// paths, blanks are dropped and duplicates collapse to their first
    /// occurrence.
    pub fn load(&self) -> Result<Vec<PathBuf>, RegistryError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Vault registry not found at {:?}, starting empty", self.path);
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(RegistryError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let data: RegistryData =
            serde_json::from_str(&contents).map_err(|source| RegistryError::Parse {
                path: self.path.clone(),
                source,
            })?;

        Ok(clean(data.vaults.iter().map(String::as_str)))
    }

    /// Keep only the paths that still resolve to an existing directory.
    ///
    /// The caller is expected to [`save`](Self::save) the result so stale
    /// entries drop out of storage too.
    pub fn validate(paths: Vec<PathBuf>) -> Vec<PathBuf> {
        paths
            .into_iter()
            .filter(|p| match fs::metadata(p) {
                Ok(m) if m.is_dir() => true,
                _ => {
                    tracing::info!("Dropping stale vault {:?} from registry", p);
                    false
                }
            })
            .collect()
    }

    /// Overwrite the registry with `paths`.
    ///
    /// Paths are resolved, deduplicated and sorted case-insensitively before
    /// writing. Paths that are not UTF-8 cannot be stored and are skipped. Parent directories are created as needed.
    pub fn save(&self, paths: &[PathBuf]) -> Result<(), RegistryError> {
        let utf8 = paths.iter().filter_map(|p| {
            let s = p.to_str();
            if s.is_none() {
                tracing::warn!("Skipping non UTF-8 vault path {:?}", p);
            }
            s
        });
        let mut vaults: Vec<String> = clean(utf8)
            .into_iter()
            .filter_map(|p| p.to_str().map(str::to_string))
            .collect();
        vaults.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| RegistryError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let count = vaults.len();
        let contents = serde_json::to_string_pretty(&RegistryData { vaults })
            .map_err(RegistryError::Serialize)?;

        // Write to a sibling temp file, then rename over the registry.
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &contents).map_err(|source| RegistryError::Write {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|source| RegistryError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!("Saved {} vaults to {:?}", count, self.path);
        Ok(())
    }

    /// Load, drop stale entries, and persist the healed list.
    ///
    /// Returns the surviving vault roots.
    pub fn heal(&self) -> Result<Vec<PathBuf>, RegistryError> {
        let loaded = self.load()?;
        let before = loaded.len();
        let valid = Self::validate(loaded);
        self.save(&valid)?;
        if valid.len() != before {
            tracing::info!("Healed vault registry: {} -> {} entries", before, valid.len());
        }
        Ok(valid)
    }

    /// Add `path` to the registry unless an equivalent entry exists.
    pub fn register(&self, path: &Path) -> Result<(), RegistryError> {
        let abs = guard::resolve(path).map_err(|source| RegistryError::Resolve {
            path: path.to_path_buf(),
            source,
        })?;
        if abs.to_str().is_none() {
            return Err(RegistryError::NonUtf8Path(abs));
        }

        let mut vaults = self.load()?;
        if vaults.iter().any(|v| guard::same_path(v, &abs)) {
            tracing::debug!("Vault {:?} already registered", abs);
            return Ok(());
        }

        tracing::info!("Registering vault {:?}", abs);
        vaults.push(abs);
        self.save(&vaults)
    }

    /// Remove every entry equivalent to `path`.
    pub fn unregister(&self, path: &Path) -> Result<(), RegistryError> {
        let mut vaults = self.load()?;
        let before = vaults.len();
        vaults.retain(|v| !guard::same_path(v, path));

        tracing::info!(
            "Unregistering vault {:?} ({} entries removed)",
            path,
            before - vaults.len()
        );
        self.save(&vaults)
    }
}

/// Resolve, drop blanks and collapse duplicates, keeping first occurrences.
fn clean<I, S>(raw: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for entry in raw {
        let trimmed = entry.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        let abs = match guard::resolve(Path::new(trimmed)) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!("Skipping unresolvable vault path {:?}: {}", trimmed, e);
                continue;
            }
        };
        if seen.insert(abs.clone()) {
            out.push(abs);
        }
    }
    out
}
