//! Persisted load order, keyed by mod name.
//!
//! The state survives re-discovery: mods are matched by name, so a mod that
//! moved on disk keeps its slot. Mods unknown to the saved state are appended
//! behind the known ones, enabled, in discovery sequence.
//!
//! # JSON format
//!
//! ```json
//! {
//!   "version": 1,
//!   "mods": [
//!     { "name": "SkyUI", "order": 0, "enabled": true, "fileOverrides": {} }
//!   ]
//! }
//! ```

use crate::entry::ModList;
use crate::error::Result;
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const STATE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedMod {
    pub name: String,
    pub order: u32,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub file_overrides: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadOrderState {
    pub version: u32,
    pub mods: Vec<SavedMod>,
}

impl Default for LoadOrderState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            mods: Vec::new(),
        }
    }
}

impl LoadOrderState {
    /// Snapshot the order, enabled flags and file overrides of a list.
    pub fn from_list(list: &ModList) -> Self {
        Self {
            version: STATE_VERSION,
            mods: list
                .iter()
                .map(|e| SavedMod {
                    name: e.name.clone(),
                    order: e.order,
                    enabled: e.is_enabled,
                    file_overrides: e.file_overrides.clone(),
                })
                .collect(),
        }
    }

    /// Load state from a file.
    ///
    /// Returns `Ok(None)` if the file doesn't exist and `Err` if it exists but
    /// cannot be parsed.
    pub fn load(path: &Utf8Path) -> Result<Option<Self>> {
        if !path.as_std_path().exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path.as_std_path())?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Save state to a file, creating parent directories if needed.
    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_str().is_empty() {
                std::fs::create_dir_all(parent.as_std_path())?;
            }
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_std_path(), contents)?;
        Ok(())
    }
}

impl ModList {
    /// Restore saved order, enabled flags and file overrides by name.
    ///
    /// Known mods come first in saved order; unknown mods follow in their
    /// current relative order and stay enabled. Saved names that are no longer
    /// present are ignored.
    pub fn apply_saved(&mut self, state: &LoadOrderState) {
        let mut saved: Vec<&SavedMod> = state.mods.iter().collect();
        saved.sort_by_key(|m| m.order);

        let mut known = Vec::with_capacity(saved.len());
        for saved_mod in saved {
            let Some(entry) = self.get_mut(&saved_mod.name) else {
                tracing::debug!("Saved mod '{}' no longer present", saved_mod.name);
                continue;
            };
            entry.is_enabled = saved_mod.enabled;
            entry.file_overrides.clear();
            for (rel_path, enabled) in &saved_mod.file_overrides {
                entry.set_file_override(rel_path, *enabled);
            }
            known.push(saved_mod.name.clone());
        }

        let unknown: Vec<String> = self
            .iter()
            .filter(|e| !known.contains(&e.name))
            .map(|e| e.name.clone())
            .collect();
        if !unknown.is_empty() {
            tracing::info!("Appending {} newly discovered mod(s)", unknown.len());
        }
        for name in &unknown {
            if let Some(entry) = self.get_mut(name) {
                entry.is_enabled = true;
            }
        }

        self.promote(&known);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::ModEntry;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn discovered(names: &[&str]) -> ModList {
        ModList::from_entries(
            names
                .iter()
                .enumerate()
                .map(|(i, n)| ModEntry::new(format!("/src/{}", n), i as u32).unwrap())
                .collect(),
        )
        .unwrap()
    }

    fn saved(name: &str, order: u32, enabled: bool) -> SavedMod {
        SavedMod {
            name: name.to_string(),
            order,
            enabled,
            file_overrides: BTreeMap::new(),
        }
    }

    #[test]
    fn test_apply_saved_appends_unknown() {
        let mut list = discovered(&["modA", "modB", "modC"]);
        let state = LoadOrderState {
            version: 1,
            mods: vec![saved("modA", 0, true), saved("modB", 1, true)],
        };

        list.apply_saved(&state);

        assert_eq!(list.get("modA").unwrap().order, 0);
        assert_eq!(list.get("modB").unwrap().order, 1);
        let mod_c = list.get("modC").unwrap();
        assert_eq!(mod_c.order, 2);
        assert!(mod_c.is_enabled);
    }

    #[test]
    fn test_apply_saved_restores_order_flags_and_overrides() {
        let mut list = discovered(&["a", "b", "c", "new"]);
        let mut b = saved("b", 0, false);
        b.file_overrides.insert("x.txt".to_string(), false);
        let state = LoadOrderState {
            version: 1,
            mods: vec![saved("c", 1, true), b, saved("gone", 2, true), saved("a", 3, true)],
        };

        list.apply_saved(&state);

        let names: Vec<&str> = list.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a", "new"]);
        for (idx, entry) in list.iter().enumerate() {
            assert_eq!(entry.order, idx as u32);
        }
        let b = list.get("b").unwrap();
        assert!(!b.is_enabled);
        assert!(!b.is_file_enabled("x.txt"));
    }

    #[test]
    fn test_apply_saved_normalizes_override_keys() {
        let mut list = discovered(&["a"]);
        let mut a = saved("a", 0, true);
        a.file_overrides.insert("textures\\A.dds".to_string(), false);
        a.file_overrides.insert("./plugin.esp".to_string(), false);
        let state = LoadOrderState {
            version: 1,
            mods: vec![a],
        };

        list.apply_saved(&state);

        let a = list.get("a").unwrap();
        assert!(!a.is_file_enabled("textures/a.dds"));
        assert!(!a.is_file_enabled("plugin.esp"));
        let keys: Vec<&str> = a.file_overrides.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["plugin.esp", "textures/A.dds"]);
    }

    #[test]
    fn test_round_trip_through_list() {
        let mut list = discovered(&["a", "b"]);
        list.reorder("b", 0).unwrap();
        list.set_enabled("a", false).unwrap();
        let state = LoadOrderState::from_list(&list);

        let mut fresh = discovered(&["a", "b"]);
        fresh.apply_saved(&state);
        assert_eq!(fresh, list);
    }

    #[test]
    fn test_save_and_load() {
        let temp = NamedTempFile::new().unwrap();
        let path = Utf8Path::from_path(temp.path()).unwrap();

        let state = LoadOrderState::from_list(&discovered(&["a", "b"]));
        state.save(path).unwrap();

        let loaded = LoadOrderState::load(path).unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_load_nonexistent() {
        let temp = NamedTempFile::new().unwrap();
        let std_path = temp.path().with_extension("nonexistent");
        let path = Utf8Path::from_path(&std_path).unwrap();
        assert!(LoadOrderState::load(path).unwrap().is_none());
    }

    #[test]
    fn test_load_invalid_json() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"{ not json").unwrap();
        temp.flush().unwrap();

        let path = Utf8Path::from_path(temp.path()).unwrap();
        assert!(LoadOrderState::load(path).is_err());
    }

    #[test]
    fn test_serialization_format() {
        let mut list = discovered(&["a"]);
        list.set_file_override("a", "b.txt", false).unwrap();
        let json = serde_json::to_string(&LoadOrderState::from_list(&list)).unwrap();

        assert!(json.contains("\"version\":1"));
        assert!(json.contains("\"fileOverrides\":{\"b.txt\":false}"));
    }
}
