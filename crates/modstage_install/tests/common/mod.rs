//! Shared fixtures for install integration tests.

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use modstage_core::ModList;
use std::fs;
use tempfile::TempDir;

/// A scratch source root and target root. Keep it alive for the whole test.
pub struct Fixture {
    _dir: TempDir,
    pub source: Utf8PathBuf,
    pub target: Utf8PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let source = root.join("source");
        let target = root.join("target");
        fs::create_dir_all(&source).unwrap();
        Self {
            _dir: dir,
            source,
            target,
        }
    }

    /// Create a mod folder under the source root with `(relative path, content)` files.
    pub fn add_mod(&self, name: &str, files: &[(&str, &str)]) -> Utf8PathBuf {
        let mod_dir = self.source.join(name);
        fs::create_dir_all(&mod_dir).unwrap();
        for (rel, content) in files {
            let path = mod_dir.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        mod_dir
    }

    pub fn discover(&self) -> ModList {
        modstage_core::discover(&self.source).unwrap()
    }

    /// Names of the direct children of the target root, sorted.
    pub fn target_children(&self) -> Vec<String> {
        list_names(&self.target)
    }
}

pub fn list_names(dir: &Utf8Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
