//! Removal of everything in the target root that the required state does not
//! account for.
//!
//! Runs before the copy pass. Direct children of the target root are judged
//! first: unknown directories go away wholesale and loose files go away unless
//! they belong to the external deployment tool. Then each required directory is
//! pruned of files that are no longer wanted.

use crate::enumerate::walk_error_path;
use crate::error::{EntryFailure, EntryOperation, Result};
use crate::lock::LOCK_FILE_NAME;
use crate::plan::RequiredState;
use crate::utils::{clear_readonly, is_protected_file_name, CancelToken};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use walkdir::WalkDir;

#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Top-level directories removed from the target root.
    pub directories_removed: usize,
    /// Loose files removed from the target root.
    pub files_removed: usize,
    /// Stale files removed from inside required directories.
    pub files_pruned: usize,
    pub failures: Vec<EntryFailure>,
}

/// Remove stale content from `target_root`.
pub fn clean(
    target_root: &Utf8Path,
    required: &RequiredState,
    protected_file_names: &[String],
    cancel: &CancelToken,
) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();

    let mut children: Vec<(Utf8PathBuf, fs::FileType)> = Vec::new();
    for dir_entry in fs::read_dir(target_root.as_std_path())? {
        let dir_entry = dir_entry?;
        let Ok(path) = Utf8PathBuf::from_path_buf(dir_entry.path()) else {
            tracing::warn!("Skipping non-UTF-8 path: {}", dir_entry.path().display());
            continue;
        };
        children.push((path, dir_entry.file_type()?));
    }
    children.sort_by(|a, b| a.0.cmp(&b.0));

    for (path, file_type) in children {
        cancel.check()?;

        if is_directory_like(&path, &file_type) {
            if required.required_directories.contains(&path) {
                continue;
            }
            tracing::info!("Removing stale directory {}", path);
            match remove_tree(&path, &file_type) {
                Ok(()) => report.directories_removed += 1,
                Err(err) => report.failures.push(EntryFailure::new(
                    path,
                    EntryOperation::RemoveDirectory,
                    err,
                )),
            }
            continue;
        }

        let name = path.file_name().unwrap_or_default();
        if name.eq_ignore_ascii_case(LOCK_FILE_NAME)
            || is_protected_file_name(name, protected_file_names)
        {
            tracing::debug!("Keeping protected file {}", path);
            continue;
        }

        tracing::info!("Removing stray file {}", path);
        match remove_file(&path) {
            Ok(()) => report.files_removed += 1,
            Err(err) => report
                .failures
                .push(EntryFailure::new(path, EntryOperation::RemoveFile, err)),
        }
    }

    for dir in required.required_directories.sorted() {
        if required.incomplete_directories.contains(dir) {
            tracing::warn!("Not pruning {}: its source could not be fully read", dir);
            continue;
        }
        if dir.as_std_path().is_dir() {
            prune_directory(dir, required, cancel, &mut report)?;
        }
    }

    tracing::info!(
        "Cleanup: {} directories removed, {} files removed, {} files pruned, {} failures",
        report.directories_removed,
        report.files_removed,
        report.files_pruned,
        report.failures.len()
    );
    Ok(report)
}

fn is_directory_like(path: &Utf8Path, file_type: &fs::FileType) -> bool {
    if file_type.is_symlink() {
        return path.as_std_path().is_dir();
    }
    file_type.is_dir()
}

/// Delete files under `dir` that are not required, then any directories the
/// deletion left empty.
fn prune_directory(
    dir: &Utf8Path,
    required: &RequiredState,
    cancel: &CancelToken,
    report: &mut CleanupReport,
) -> Result<()> {
    for item in WalkDir::new(dir.as_std_path())
        .min_depth(1)
        .contents_first(true)
    {
        cancel.check()?;

        let item = match item {
            Ok(item) => item,
            Err(err) => {
                report.failures.push(EntryFailure::new(
                    walk_error_path(&err, dir),
                    EntryOperation::RemoveFile,
                    err,
                ));
                break;
            }
        };
        let Some(path) = Utf8Path::from_path(item.path()) else {
            continue;
        };

        if item.file_type().is_dir() {
            let is_empty = fs::read_dir(item.path())
                .map(|mut it| it.next().is_none())
                .unwrap_or(false);
            if is_empty {
                tracing::debug!("Removing empty directory {}", path);
                if let Err(err) = fs::remove_dir(item.path()) {
                    report.failures.push(EntryFailure::new(
                        path,
                        EntryOperation::RemoveDirectory,
                        err,
                    ));
                }
            }
            continue;
        }

        if required.required_files.contains(path) {
            continue;
        }

        tracing::debug!("Pruning stale file {}", path);
        match remove_file(path) {
            Ok(()) => report.files_pruned += 1,
            Err(err) => report
                .failures
                .push(EntryFailure::new(path, EntryOperation::RemoveFile, err)),
        }
    }
    Ok(())
}

fn remove_file(path: &Utf8Path) -> std::io::Result<()> {
    clear_readonly(path)?;
    fs::remove_file(path.as_std_path())
}

/// Remove a directory tree, or just the link when `path` is a symlink.
fn remove_tree(path: &Utf8Path, file_type: &fs::FileType) -> std::io::Result<()> {
    if file_type.is_symlink() {
        // Directory links need remove_dir on Windows.
        return fs::remove_file(path.as_std_path()).or_else(|_| fs::remove_dir(path.as_std_path()));
    }

    for item in WalkDir::new(path.as_std_path()) {
        let item = item.map_err(std::io::Error::from)?;
        if let Some(p) = Utf8Path::from_path(item.path()) {
            clear_readonly(p)?;
        }
    }
    fs::remove_dir_all(path.as_std_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::PathSet;
    use tempfile::tempdir;

    fn utf8_tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (dir, root)
    }

    fn required(dirs: &[Utf8PathBuf], files: &[Utf8PathBuf]) -> RequiredState {
        RequiredState {
            required_directories: dirs.iter().cloned().collect::<PathSet>(),
            required_files: files.iter().cloned().collect::<PathSet>(),
            incomplete_directories: PathSet::default(),
            failures: Vec::new(),
        }
    }

    #[test]
    fn test_removes_unknown_directories_and_loose_files() {
        let (_dir, root) = utf8_tempdir();
        fs::create_dir_all(root.join("AAA-Keep")).unwrap();
        fs::create_dir_all(root.join("AAB-Old/deep")).unwrap();
        fs::write(root.join("AAB-Old/deep/x.txt"), "x").unwrap();
        fs::write(root.join("stray.txt"), "s").unwrap();
        fs::write(root.join("vortex.deployment.json"), "{}").unwrap();
        fs::write(root.join("snapshot_001.json"), "{}").unwrap();
        fs::write(root.join("plugins.txt"), "p").unwrap();
        fs::write(root.join(LOCK_FILE_NAME), "").unwrap();

        let state = required(&[root.join("AAA-Keep")], &[]);
        let protected = vec!["Plugins.txt".to_string()];
        let report = clean(&root, &state, &protected, &CancelToken::new()).unwrap();

        assert_eq!(report.directories_removed, 1);
        assert_eq!(report.files_removed, 1);
        assert!(report.failures.is_empty());
        assert!(root.join("AAA-Keep").as_std_path().is_dir());
        assert!(!root.join("AAB-Old").as_std_path().exists());
        assert!(!root.join("stray.txt").as_std_path().exists());
        assert!(root.join("vortex.deployment.json").as_std_path().exists());
        assert!(root.join("snapshot_001.json").as_std_path().exists());
        assert!(root.join("plugins.txt").as_std_path().exists());
        assert!(root.join(LOCK_FILE_NAME).as_std_path().exists());
    }

    #[test]
    fn test_required_directory_matched_ignoring_case() {
        let (_dir, root) = utf8_tempdir();
        fs::create_dir_all(root.join("aaa-keep")).unwrap();

        let state = required(&[root.join("AAA-Keep")], &[]);
        let report = clean(&root, &state, &[], &CancelToken::new()).unwrap();
        assert_eq!(report.directories_removed, 0);
        assert!(root.join("aaa-keep").as_std_path().is_dir());
    }

    #[test]
    fn test_prunes_stale_files_inside_required_directory() {
        let (_dir, root) = utf8_tempdir();
        let keep = root.join("AAA-Keep");
        fs::create_dir_all(keep.join("old/empty")).unwrap();
        fs::create_dir_all(keep.join("live")).unwrap();
        fs::write(keep.join("a.txt"), "a").unwrap();
        fs::write(keep.join("b.txt"), "b").unwrap();
        fs::write(keep.join("old/gone.txt"), "g").unwrap();
        fs::write(keep.join("live/c.txt"), "c").unwrap();

        let state = required(
            &[keep.clone()],
            &[keep.join("a.txt"), keep.join("live/c.txt")],
        );
        let report = clean(&root, &state, &[], &CancelToken::new()).unwrap();

        assert_eq!(report.files_pruned, 2);
        assert!(keep.join("a.txt").as_std_path().exists());
        assert!(keep.join("live/c.txt").as_std_path().exists());
        assert!(!keep.join("b.txt").as_std_path().exists());
        assert!(!keep.join("old").as_std_path().exists());
        assert!(keep.as_std_path().is_dir());
    }

    #[test]
    fn test_incomplete_directory_is_not_pruned() {
        let (_dir, root) = utf8_tempdir();
        let partial = root.join("AAA-Partial");
        let whole = root.join("AAB-Whole");
        fs::create_dir_all(partial.join("locked")).unwrap();
        fs::create_dir_all(&whole).unwrap();
        fs::write(partial.join("a.txt"), "a").unwrap();
        fs::write(partial.join("locked/inner.txt"), "i").unwrap();
        fs::write(partial.join("z.txt"), "z").unwrap();
        fs::write(whole.join("stale.txt"), "s").unwrap();

        let mut state = required(&[partial.clone(), whole.clone()], &[partial.join("a.txt")]);
        state.incomplete_directories.insert(partial.clone());
        let report = clean(&root, &state, &[], &CancelToken::new()).unwrap();

        assert_eq!(report.files_pruned, 1);
        assert!(partial.join("locked/inner.txt").as_std_path().exists());
        assert!(partial.join("z.txt").as_std_path().exists());
        assert!(!whole.join("stale.txt").as_std_path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_removed_as_link() {
        let (_dir, root) = utf8_tempdir();
        let outside = root.join("outside");
        fs::create_dir_all(&outside).unwrap();
        fs::write(outside.join("precious.txt"), "p").unwrap();

        let target = root.join("target");
        fs::create_dir_all(&target).unwrap();
        std::os::unix::fs::symlink(&outside, target.join("AAZ-Link")).unwrap();

        let report = clean(&target, &required(&[], &[]), &[], &CancelToken::new()).unwrap();
        assert_eq!(report.directories_removed, 1);
        assert!(!target.join("AAZ-Link").as_std_path().exists());
        assert!(outside.join("precious.txt").as_std_path().exists());
    }

    #[test]
    fn test_cancelled_cleanup_stops() {
        let (_dir, root) = utf8_tempdir();
        fs::write(root.join("stray.txt"), "s").unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = clean(&root, &required(&[], &[]), &[], &cancel);
        assert!(matches!(result, Err(crate::Error::Cancelled)));
        assert!(root.join("stray.txt").as_std_path().exists());
    }
}
