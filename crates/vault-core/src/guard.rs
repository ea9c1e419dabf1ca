//! Path containment checks for vault roots.
//!
//! Every path is resolved to an absolute path one component at a time. Each
//! existing prefix is canonicalized through the filesystem before the next
//! component is applied, so `..` always steps out of the directory a symlink
//! actually points to. Components that do not exist yet (a note about to be
//! created) are appended lexically.
//!
//! Containment is decided by decomposing the relative path from the root to
//! the candidate, never by string prefix: `/vaults/NotesArchive` is not
//! inside `/vaults/Notes`.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Resolve `path` to an absolute path with symlinks followed.
///
/// Relative paths are interpreted against the current working directory.
/// Fails only if the path is empty or the working directory is unavailable.
pub fn resolve(path: &Path) -> io::Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty path"));
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // `out` is canonical up to here, so popping leaves the
                // directory the kernel would reach. `..` at the root stays put.
                out.pop();
            }
            Component::Normal(name) => {
                out.push(name);
                if let Ok(canonical) = fs::canonicalize(&out) {
                    out = canonical;
                }
            }
        }
    }
    Ok(out)
}

/// Relative path from `base` to `target`, both expected to be resolved.
///
/// Returns an empty path when they are equal and `None` when the two paths
/// share no root (different drive prefixes).
pub fn relative_path(base: &Path, target: &Path) -> Option<PathBuf> {
    let base: Vec<Component> = base.components().collect();
    let target: Vec<Component> = target.components().collect();

    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 && !base.is_empty() && !target.is_empty() {
        return None;
    }

    let mut rel = PathBuf::new();
    for _ in common..base.len() {
        rel.push(Component::ParentDir.as_os_str());
    }
    for component in &target[common..] {
        rel.push(component.as_os_str());
    }
    Some(rel)
}

/// Whether `candidate` lies inside `root` or is `root` itself.
///
/// Never fails: any resolution error is reported as "outside".
pub fn is_inside(root: &Path, candidate: &Path) -> bool {
    let (Ok(root), Ok(candidate)) = (resolve(root), resolve(candidate)) else {
        return false;
    };

    match relative_path(&root, &candidate) {
        Some(rel) => !matches!(rel.components().next(), Some(Component::ParentDir)),
        None => false,
    }
}

/// Whether `a` and `b` resolve to the same path.
pub fn same_path(a: &Path, b: &Path) -> bool {
    match (resolve(a), resolve(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Display label for `path` relative to `base`, falling back to the file name.
pub fn rel_or_base(base: &Path, path: &Path) -> String {
    match relative_path(base, path) {
        Some(rel) if !rel.as_os_str().is_empty() => rel.display().to_string(),
        _ => base_name(path),
    }
}

/// Display label for `path` relative to `base`, `.` when they are the same.
pub fn rel_or_dot(base: &Path, path: &Path) -> String {
    match relative_path(base, path) {
        Some(rel) if !rel.as_os_str().is_empty() => rel.display().to_string(),
        _ => ".".to_string(),
    }
}

/// Last component of `path` as a string, or the whole path if it has none.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
