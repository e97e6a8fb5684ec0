//! Exclusive per-target install lock.
//!
//! An install holds `<target>/.modstage.lock` with an `flock`-style exclusive
//! lock for its whole run. A second install against the same target fails
//! fast with [`Error::InstallLocked`] instead of waiting.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use fs2::FileExt;
use std::fs::File;

/// Name of the lock file created in the target root.
pub const LOCK_FILE_NAME: &str = ".modstage.lock";

/// Held install lock. Released and deleted on drop.
#[derive(Debug)]
pub struct InstallLock {
    file: File,
    path: Utf8PathBuf,
}

impl InstallLock {
    /// Try to take the lock for `target_root` without blocking.
    ///
    /// A releasing holder unlinks the file before unlocking it, so a handle
    /// opened just before the unlink can lock a file that is no longer at
    /// `path`. Such a lock guards nothing and the open is retried.
    pub fn acquire(target_root: &Utf8Path) -> Result<Self> {
        let path = target_root.join(LOCK_FILE_NAME);

        for _ in 0..MAX_OPEN_ATTEMPTS {
            let file = File::create(path.as_std_path())?;

            match file.try_lock_exclusive() {
                Ok(()) => {}
                Err(err) if is_contended(&err) => {
                    tracing::warn!("Install lock already held at {}", path);
                    return Err(Error::InstallLocked(target_root.to_path_buf()));
                }
                Err(err) => return Err(err.into()),
            }

            if is_linked_at(&file, &path)? {
                tracing::debug!("Acquired install lock at {}", path);
                return Ok(Self { file, path });
            }
            tracing::debug!("Lock file at {} was replaced while locking, retrying", path);
        }

        Err(Error::InstallLocked(target_root.to_path_buf()))
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

const MAX_OPEN_ATTEMPTS: usize = 8;

/// Whether `path` still names the file behind the open handle.
#[cfg(unix)]
fn is_linked_at(file: &File, path: &Utf8Path) -> std::io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let held = file.metadata()?;
    match std::fs::metadata(path.as_std_path()) {
        Ok(current) => Ok(held.dev() == current.dev() && held.ino() == current.ino()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

// Open files cannot be unlinked here, so the handle always matches the path.
#[cfg(not(unix))]
fn is_linked_at(_file: &File, _path: &Utf8Path) -> std::io::Result<bool> {
    Ok(true)
}

fn is_contended(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

impl Drop for InstallLock {
    /// The file is unlinked while still locked. Windows cannot delete an open
    /// locked file, so there it is unlocked first.
    fn drop(&mut self) {
        #[cfg(not(windows))]
        self.remove_file();

        if let Err(err) = self.file.unlock() {
            tracing::warn!("Failed to unlock {}: {}", self.path, err);
        }

        #[cfg(windows)]
        self.remove_file();

        tracing::debug!("Released install lock at {}", self.path);
    }
}

impl InstallLock {
    fn remove_file(&self) {
        if let Err(err) = std::fs::remove_file(self.path.as_std_path()) {
            tracing::debug!("Failed to remove lock file {}: {}", self.path, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_second_acquire_is_rejected() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

        let lock = InstallLock::acquire(&root).unwrap();
        assert!(lock.path().as_std_path().exists());

        let second = InstallLock::acquire(&root);
        assert!(matches!(second, Err(Error::InstallLocked(_))));

        drop(lock);
        assert!(!root.join(LOCK_FILE_NAME).as_std_path().exists());

        let again = InstallLock::acquire(&root).unwrap();
        drop(again);
    }

    #[cfg(unix)]
    #[test]
    fn test_handle_to_released_lock_file_is_detected() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

        let lock = InstallLock::acquire(&root).unwrap();
        let stale = File::open(lock.path().as_std_path()).unwrap();
        assert!(is_linked_at(&stale, lock.path()).unwrap());

        drop(lock);
        let path = root.join(LOCK_FILE_NAME);
        assert!(!path.as_std_path().exists());

        // The stale handle can still be locked but no longer guards the path.
        stale.try_lock_exclusive().unwrap();
        assert!(!is_linked_at(&stale, &path).unwrap());

        let fresh = InstallLock::acquire(&root).unwrap();
        assert!(!is_linked_at(&stale, fresh.path()).unwrap());
        assert!(is_linked_at(&fresh.file, fresh.path()).unwrap());
    }
}
