//! Path helpers shared by the planner, the copy engine and the cleanup pass.

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Root file name prefixes owned by the external deployment tool.
pub const PROTECTED_PREFIXES: &[&str] = &["vortex.", "snapshot_"];

/// Comparison key for a path: `/` separators, lowercase.
pub fn path_key(path: &Utf8Path) -> String {
    path.as_str().replace('\\', "/").to_lowercase()
}

/// Set of paths with case-insensitive membership.
#[derive(Debug, Clone, Default)]
pub struct PathSet {
    paths: HashMap<String, Utf8PathBuf>,
}

impl PathSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a path; returns `false` if an equal path (ignoring case) was present.
    pub fn insert(&mut self, path: Utf8PathBuf) -> bool {
        let key = path_key(&path);
        if self.paths.contains_key(&key) {
            return false;
        }
        self.paths.insert(key, path);
        true
    }

    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.paths.contains_key(&path_key(path))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Paths sorted by comparison key.
    pub fn sorted(&self) -> Vec<&Utf8PathBuf> {
        let mut keys: Vec<&String> = self.paths.keys().collect();
        keys.sort();
        keys.into_iter().map(|k| &self.paths[k]).collect()
    }
}

impl FromIterator<Utf8PathBuf> for PathSet {
    fn from_iter<I: IntoIterator<Item = Utf8PathBuf>>(iter: I) -> Self {
        let mut set = Self::new();
        for path in iter {
            set.insert(path);
        }
        set
    }
}

/// Whether a loose file at the target root must be left alone.
pub fn is_protected_file_name(name: &str, protected_names: &[String]) -> bool {
    let lower = name.to_lowercase();
    protected_names.iter().any(|p| p.to_lowercase() == lower)
        || PROTECTED_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Clear the read-only flag of a file or directory so it can be replaced or removed.
#[allow(clippy::permissions_set_readonly_false)]
pub fn clear_readonly(path: &Utf8Path) -> std::io::Result<()> {
    let meta = std::fs::symlink_metadata(path.as_std_path())?;
    let mut perms = meta.permissions();
    if perms.readonly() {
        perms.set_readonly(false);
        std::fs::set_permissions(path.as_std_path(), perms)?;
    }
    Ok(())
}

/// Shared cancellation flag, checked by the engine at every per-file boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub(crate) fn check(&self) -> crate::Result<()> {
        if self.is_cancelled() {
            return Err(crate::Error::Cancelled);
        }
        Ok(())
    }
}
