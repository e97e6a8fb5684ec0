//! Incremental copy of one mod's source tree into its target folder.

use crate::enumerate::{walk_error_path, FileEnumerator};
use crate::error::{EntryFailure, EntryOperation, Result};
use crate::utils::{clear_readonly, CancelToken};
use camino::Utf8Path;
use modstage_core::ModEntry;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use xxhash_rust::xxh3::Xxh3;

/// How an existing target file is judged up to date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileComparison {
    /// Equal size and a target mtime no older than the source.
    ///
    /// A same-size target with different content but a newer mtime is
    /// treated as up to date.
    #[default]
    SizeAndMtime,
    /// Equal size and equal xxh3 digest of the contents.
    ContentHash,
}

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub comparison: FileComparison,
}

/// Counts for one mod's copy pass.
#[derive(Debug, Default)]
pub struct ModSyncReport {
    pub copied: usize,
    pub skipped: usize,
    pub failures: Vec<EntryFailure>,
}

/// Copy every enabled file of `entry` into `target_dir`, skipping files that
/// are already up to date.
///
/// Per-file failures are recorded and the pass continues. A walk error ends
/// the pass for this mod. Cancellation is checked before every file.
pub fn copy_mod(
    entry: &ModEntry,
    target_dir: &Utf8Path,
    options: &SyncOptions,
    cancel: &CancelToken,
) -> Result<ModSyncReport> {
    let mut report = ModSyncReport::default();

    for item in FileEnumerator::new(entry.source_path.clone()).iter() {
        cancel.check()?;

        let rel = match item {
            Ok(rel) => rel,
            Err(err) => {
                report.failures.push(EntryFailure::new(
                    walk_error_path(&err, &entry.source_path),
                    EntryOperation::Enumerate,
                    err,
                ));
                break;
            }
        };

        if !entry.is_file_enabled(rel.as_str()) {
            continue;
        }

        let src = entry.source_path.join(&rel);
        let dst = target_dir.join(&rel);

        match is_up_to_date(&src, &dst, options.comparison) {
            Ok(true) => {
                tracing::debug!("Up to date: {}", dst);
                report.skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(err) => {
                // Fall through to a copy; a real problem will surface there.
                tracing::debug!("Could not compare {} with {}: {}", src, dst, err);
            }
        }

        match copy_file(&src, &dst) {
            Ok(()) => report.copied += 1,
            Err(err) => report
                .failures
                .push(EntryFailure::new(dst, EntryOperation::Copy, err)),
        }
    }

    tracing::info!(
        "Mod={} copied={} skipped={} failed={}",
        entry.name,
        report.copied,
        report.skipped,
        report.failures.len()
    );
    Ok(report)
}

fn copy_file(src: &Utf8Path, dst: &Utf8Path) -> std::io::Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent.as_std_path())?;
    }
    if dst.as_std_path().exists() {
        clear_readonly(dst)?;
    }
    fs::copy(src.as_std_path(), dst.as_std_path())?;
    Ok(())
}

/// Whether `dst` already holds `src` under the given comparison mode.
///
/// A missing target is never up to date.
pub fn is_up_to_date(
    src: &Utf8Path,
    dst: &Utf8Path,
    comparison: FileComparison,
) -> std::io::Result<bool> {
    let dst_meta = match fs::metadata(dst.as_std_path()) {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    if !dst_meta.is_file() {
        return Ok(false);
    }

    let src_meta = fs::metadata(src.as_std_path())?;
    if src_meta.len() != dst_meta.len() {
        return Ok(false);
    }

    match comparison {
        FileComparison::SizeAndMtime => Ok(dst_meta.modified()? >= src_meta.modified()?),
        FileComparison::ContentHash => Ok(hash_file(src)? == hash_file(dst)?),
    }
}

fn hash_file(path: &Utf8Path) -> std::io::Result<u64> {
    let mut reader = BufReader::new(File::open(path.as_std_path())?);
    let mut hasher = Xxh3::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.digest())
}
