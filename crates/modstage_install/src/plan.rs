//! Required-state planning.
//!
//! The required state is everything a correct install leaves behind: one
//! target directory per enabled mod and every enabled file inside it. It is
//! derived purely from the mod list and the source trees, and rebuilt on every
//! install.

use crate::enumerate::{walk_error_path, FileEnumerator};
use crate::error::{EntryFailure, EntryOperation, Result};
use crate::utils::PathSet;
use camino::Utf8Path;
use modstage_core::ModEntry;

#[derive(Debug, Clone, Default)]
pub struct RequiredState {
    /// `target_root/<prefix>-<name>` for every enabled mod.
    pub required_directories: PathSet,
    /// Absolute target path of every enabled file.
    pub required_files: PathSet,
    /// Target directories of mods whose source walk failed. Their file list
    /// is partial, so cleanup must not prune inside them.
    pub incomplete_directories: PathSet,
    /// Walk errors hit while enumerating sources.
    pub failures: Vec<EntryFailure>,
}

/// Build the required state for `enabled_mods`, which must be sorted by order.
///
/// A walk error stops enumeration of that mod and marks its target directory
/// incomplete. Files after the error are never listed, so the directory is
/// left unpruned until a later install can read the whole source again.
pub fn build_required_state(
    target_root: &Utf8Path,
    enabled_mods: &[&ModEntry],
) -> Result<RequiredState> {
    let mut state = RequiredState::default();

    for entry in enabled_mods {
        let target_dir = entry.target_dir(target_root)?;
        state.required_directories.insert(target_dir.clone());

        let mut file_count = 0usize;
        for item in FileEnumerator::new(entry.source_path.clone()).iter() {
            let rel = match item {
                Ok(rel) => rel,
                Err(err) => {
                    state.failures.push(EntryFailure::new(
                        walk_error_path(&err, &entry.source_path),
                        EntryOperation::Enumerate,
                        err,
                    ));
                    state.incomplete_directories.insert(target_dir.clone());
                    break;
                }
            };

            if !entry.is_file_enabled(rel.as_str()) {
                tracing::debug!("Mod={} file '{}' disabled by override", entry.name, rel);
                continue;
            }

            state.required_files.insert(target_dir.join(&rel));
            file_count += 1;
        }

        tracing::debug!(
            "Planned mod={} dir={} files={}",
            entry.name,
            target_dir,
            file_count
        );
    }

    tracing::info!(
        "Required state: {} directories, {} files",
        state.required_directories.len(),
        state.required_files.len()
    );
    Ok(state)
}
