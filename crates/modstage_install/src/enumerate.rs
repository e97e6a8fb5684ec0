//! Recursive file enumeration under a mod source root.
//!
//! Paths are yielded relative to the root with `/` separators, in sorted
//! file-name order so that two walks of the same tree agree. A root that does
//! not exist yields nothing: a mod whose source vanished simply has no files.

use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

/// Restartable enumerator over the files below a root directory.
#[derive(Debug, Clone)]
pub struct FileEnumerator {
    root: Utf8PathBuf,
}

impl FileEnumerator {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Start a fresh walk.
    ///
    /// Items are `Err` when the walk itself fails (e.g. a directory vanished or
    /// is unreadable); callers decide whether to stop.
    pub fn iter(&self) -> FileIter {
        let walker = if self.root.as_std_path().is_dir() {
            Some(
                WalkDir::new(self.root.as_std_path())
                    .min_depth(1)
                    .sort_by_file_name()
                    .into_iter(),
            )
        } else {
            tracing::debug!("Source root {} does not exist; no files", self.root);
            None
        };

        FileIter {
            root: self.root.clone(),
            walker,
        }
    }
}

impl<'a> IntoIterator for &'a FileEnumerator {
    type Item = walkdir::Result<Utf8PathBuf>;
    type IntoIter = FileIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The path a walk error refers to, or `fallback` when walkdir has none or it
/// is not UTF-8.
pub fn walk_error_path(err: &walkdir::Error, fallback: &Utf8Path) -> Utf8PathBuf {
    err.path()
        .and_then(Utf8Path::from_path)
        .map(Utf8Path::to_path_buf)
        .unwrap_or_else(|| fallback.to_path_buf())
}

/// Iterator returned by [`FileEnumerator::iter`].
pub struct FileIter {
    root: Utf8PathBuf,
    walker: Option<walkdir::IntoIter>,
}

impl Iterator for FileIter {
    type Item = walkdir::Result<Utf8PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        let walker = self.walker.as_mut()?;

        loop {
            let entry = match walker.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(err)),
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let Some(path) = Utf8Path::from_path(entry.path()) else {
                tracing::warn!("Skipping non-UTF-8 path: {}", entry.path().display());
                continue;
            };

            let Ok(rel) = path.strip_prefix(&self.root) else {
                continue;
            };

            let joined = rel
                .components()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join("/");
            return Some(Ok(Utf8PathBuf::from(joined)));
        }
    }
}
