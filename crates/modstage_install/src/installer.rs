//! Install orchestration.
//!
//! The [`Installer`] drives one full install of a mod list into a target root.
//!
//! # Install Algorithm
//!
//! 1. Ensure the target root exists, creating it if needed.
//! 2. Take the exclusive [`InstallLock`] for the target root.
//! 3. Keep the enabled mods and sort them by order.
//! 4. Build the [`RequiredState`](crate::plan::RequiredState): one prefixed
//!    directory per enabled mod and every enabled file inside it.
//! 5. Run the cleanup pass, removing everything the required state does not
//!    account for (protected root files excepted).
//! 6. Copy each enabled mod into its target directory, skipping files that
//!    are already up to date, and emit a progress event per mod.
//! 7. Emit a completion event and return an [`InstallSummary`].
//!
//! Nothing runs in parallel. Per-file problems are collected in the summary;
//! only the conditions listed on [`Error`](crate::Error) abort the install.

use crate::cleanup::clean;
use crate::error::{EntryFailure, EntryOperation, Error, Result};
use crate::lock::InstallLock;
use crate::plan::build_required_state;
use crate::sync::{copy_mod, FileComparison, SyncOptions};
use crate::utils::CancelToken;
use camino::{Utf8Path, Utf8PathBuf};
use modstage_core::ModEntry;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Progress information emitted during an install.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallProgress {
    pub stage: InstallStage,
    /// Mod being copied (set during `Copying`).
    pub current_mod: Option<String>,
    /// Mods fully processed so far.
    pub installed_count: u32,
    /// Enabled mods in this install.
    pub total: u32,
    /// `installed_count / total` as a whole percentage, rounded down.
    pub percentage: u32,
}

/// Stages of an install, emitted in order:
/// `Preparing` -> `Cleaning` -> `Copying` (once per mod) -> `Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InstallStage {
    Preparing,
    Cleaning,
    Copying,
    Complete,
}

/// Summary returned after an install completes.
#[derive(Debug, Default)]
pub struct InstallSummary {
    /// Enabled mods whose copy pass finished.
    pub installed_count: u32,
    pub total: u32,
    pub files_copied: usize,
    pub files_skipped: usize,
    pub directories_removed: usize,
    /// Loose root files plus stale files pruned from mod directories.
    pub files_removed: usize,
    /// Recovered per-entry failures, in the order they happened.
    pub failures: Vec<EntryFailure>,
    pub elapsed: Duration,
}

impl InstallSummary {
    pub fn error_count(&self) -> usize {
        self.failures.len()
    }
}

/// Whole-number percentage, rounded down; `0` for an empty install.
pub fn percentage(done: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((u64::from(done) * 100) / u64::from(total)) as u32
}

type ProgressCallback = Arc<dyn Fn(InstallProgress) + Send + Sync>;

/// Runs installs against one target root.
///
/// Configure with the `with_*` methods, then call [`install`](Self::install)
/// or [`spawn_install`](Self::spawn_install). The same installer can be used
/// for any number of installs.
pub struct Installer {
    target_root: Utf8PathBuf,
    progress_callback: Option<ProgressCallback>,
    comparison: FileComparison,
    protected_files: Vec<String>,
    cancel: CancelToken,
}

impl Installer {
    pub fn new(target_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            target_root: target_root.into(),
            progress_callback: None,
            comparison: FileComparison::default(),
            protected_files: Vec::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Register a progress callback. It is invoked synchronously on the
    /// thread running the install.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(InstallProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    pub fn with_comparison(mut self, comparison: FileComparison) -> Self {
        self.comparison = comparison;
        self
    }

    /// Extra root file names (matched ignoring case) that cleanup must keep,
    /// on top of the `vortex.` and `snapshot_` prefixes.
    pub fn with_protected_files(mut self, names: Vec<String>) -> Self {
        self.protected_files = names;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn target_root(&self) -> &Utf8Path {
        &self.target_root
    }

    /// A handle that cancels installs run by this installer.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Install `mods` into the target root. Disabled mods are ignored and
    /// their directories removed.
    pub fn install(&self, mods: &[ModEntry]) -> Result<InstallSummary> {
        let start_time = Instant::now();

        tracing::info!("Installing into {}", self.target_root);

        self.emit_progress(InstallProgress {
            stage: InstallStage::Preparing,
            current_mod: None,
            installed_count: 0,
            total: 0,
            percentage: 0,
        });

        std::fs::create_dir_all(self.target_root.as_std_path()).map_err(|source| {
            Error::TargetRoot {
                path: self.target_root.clone(),
                source,
            }
        })?;
        if !self.target_root.as_std_path().is_dir() {
            return Err(Error::TargetRoot {
                path: self.target_root.clone(),
                source: std::io::Error::other("not a directory"),
            });
        }

        let _lock = InstallLock::acquire(&self.target_root)?;

        let mut enabled: Vec<&ModEntry> = mods.iter().filter(|m| m.is_enabled).collect();
        enabled.sort_by_key(|m| m.order);
        let total = enabled.len() as u32;
        tracing::info!("Enabled mods: {} of {}", total, mods.len());

        let mut summary = InstallSummary {
            total,
            ..Default::default()
        };

        let required = build_required_state(&self.target_root, &enabled)?;
        summary.failures.extend(required.failures.iter().cloned());

        self.emit_progress(InstallProgress {
            stage: InstallStage::Cleaning,
            current_mod: None,
            installed_count: 0,
            total,
            percentage: 0,
        });

        let cleanup = clean(
            &self.target_root,
            &required,
            &self.protected_files,
            &self.cancel,
        )?;
        summary.directories_removed = cleanup.directories_removed;
        summary.files_removed = cleanup.files_removed + cleanup.files_pruned;
        summary.failures.extend(cleanup.failures);

        let options = SyncOptions {
            comparison: self.comparison,
        };

        for entry in &enabled {
            self.cancel.check()?;

            let target_dir = entry.target_dir(&self.target_root)?;
            std::fs::create_dir_all(target_dir.as_std_path())?;

            self.emit_progress(InstallProgress {
                stage: InstallStage::Copying,
                current_mod: Some(entry.name.clone()),
                installed_count: summary.installed_count,
                total,
                percentage: percentage(summary.installed_count, total),
            });

            tracing::info!("Copying mod={} into {}", entry.name, target_dir);
            let report = copy_mod(entry, &target_dir, &options, &self.cancel)?;
            summary.files_copied += report.copied;
            summary.files_skipped += report.skipped;
            // The planner already walked this source and recorded its walk errors.
            summary.failures.extend(report.failures.into_iter().filter(|failure| {
                !(failure.operation == EntryOperation::Enumerate
                    && required
                        .failures
                        .iter()
                        .any(|seen| seen.operation == failure.operation && seen.path == failure.path))
            }));
            summary.installed_count += 1;
        }

        self.emit_progress(InstallProgress {
            stage: InstallStage::Complete,
            current_mod: None,
            installed_count: summary.installed_count,
            total,
            percentage: percentage(summary.installed_count, total),
        });

        summary.elapsed = start_time.elapsed();
        tracing::info!(
            "Install complete: {}/{} mods, {} copied, {} skipped, {} removed, {} errors in {:?}",
            summary.installed_count,
            summary.total,
            summary.files_copied,
            summary.files_skipped,
            summary.directories_removed + summary.files_removed,
            summary.error_count(),
            summary.elapsed
        );
        Ok(summary)
    }

    /// Run [`install`](Self::install) on a dedicated worker thread.
    pub fn spawn_install(self, mods: Vec<ModEntry>) -> JoinHandle<Result<InstallSummary>> {
        std::thread::spawn(move || self.install(&mods))
    }

    fn emit_progress(&self, progress: InstallProgress) {
        if let Some(callback) = &self.progress_callback {
            callback(progress);
        }
    }
}
