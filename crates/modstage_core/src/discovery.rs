//! Mod discovery from a source root.
//!
//! Every immediate sub-directory of the source root (typically a Vortex
//! staging folder) is one mod version. Directories reserved for the
//! deployment tool are skipped.

use crate::entry::{ModEntry, ModList};
use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};

/// Directory names starting with this marker are never treated as mods.
pub const RESERVED_PREFIX: &str = "__";

/// Directory names that are never treated as mods (compared case-insensitively).
pub const EXCLUDED_DIRS: &[&str] = &[".git", ".vortex", "__MACOSX"];

/// Whether a directory name under the source root can be a mod.
pub fn is_mod_dir_name(name: &str) -> bool {
    !name.starts_with(RESERVED_PREFIX)
        && !EXCLUDED_DIRS
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(name))
}

/// Discover mods under `source_root`.
///
/// Entries are sorted by directory name, get provisional dense orders in that
/// sequence and start enabled. Loose files at the root are ignored.
pub fn discover(source_root: &Utf8Path) -> Result<ModList> {
    if !source_root.as_std_path().is_dir() {
        return Err(Error::SourceRootMissing(source_root.to_path_buf()));
    }

    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(source_root.as_std_path())? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let path = match Utf8PathBuf::from_path_buf(entry.path()) {
            Ok(p) => p,
            Err(p) => {
                tracing::warn!("Skipping non-UTF-8 mod directory: {}", p.display());
                continue;
            }
        };

        let Some(name) = path.file_name() else {
            continue;
        };
        if !is_mod_dir_name(name) {
            tracing::debug!("Skipping reserved directory '{}'", name);
            continue;
        }
        dirs.push(path);
    }

    dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let entries = dirs
        .into_iter()
        .enumerate()
        .map(|(idx, path)| ModEntry::new(path, idx as u32))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!("Discovered {} mod(s) in {}", entries.len(), source_root);
    ModList::from_entries(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_discover_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

        for name in ["Zeta", "Alpha", "__vortex_staging", ".git", "Mid"] {
            fs::create_dir_all(root.join(name)).unwrap();
        }
        fs::write(root.join("__vortex_staging_folder"), "").unwrap();
        fs::write(root.join("loose.txt"), "").unwrap();

        let list = discover(&root).unwrap();
        let names: Vec<&str> = list.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);

        for (idx, entry) in list.iter().enumerate() {
            assert_eq!(entry.order, idx as u32);
            assert!(entry.is_enabled);
            assert_eq!(entry.source_path, root.join(&entry.name));
        }
    }

    #[test]
    fn test_discover_missing_root() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().join("missing")).unwrap();
        assert!(matches!(discover(&root), Err(Error::SourceRootMissing(_))));
    }

    #[test]
    fn test_is_mod_dir_name() {
        assert!(is_mod_dir_name("SkyUI"));
        assert!(!is_mod_dir_name("__staging"));
        assert!(!is_mod_dir_name("__macosx"));
        assert!(!is_mod_dir_name(".GIT"));
    }
}
