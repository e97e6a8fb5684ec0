//! Mod entry model and the ordered working list.
//!
//! A [`ModEntry`] is one discovered mod version. The [`ModList`] owns the
//! ordering invariant: after every operation the entries are sorted by
//! `order` and the orders form the dense sequence `0..len`.

use crate::error::{Error, Result};
use crate::naming;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalize a mod-relative file path to the `/`-separated form used as the
/// key for file overrides.
pub fn normalize_rel_path(path: &str) -> String {
    let replaced = path.replace('\\', "/");
    let mut trimmed = replaced.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    trimmed.trim_start_matches('/').to_string()
}

/// One discovered mod version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModEntry {
    /// Absolute path to the mod's source directory.
    pub source_path: Utf8PathBuf,
    /// Identity key, taken from the source directory's leaf name.
    pub name: String,
    /// Installation priority; also selects the target folder prefix.
    pub order: u32,
    pub is_enabled: bool,
    /// Per-file enable flags keyed by `/`-separated relative path.
    /// Files without an entry are enabled.
    #[serde(default)]
    pub file_overrides: BTreeMap<String, bool>,
}

impl ModEntry {
    /// Create an enabled entry for a mod source directory.
    pub fn new(source_path: impl Into<Utf8PathBuf>, order: u32) -> Result<Self> {
        let source_path = source_path.into();
        let name = source_path
            .file_name()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::InvalidModDir(source_path.clone()))?
            .to_string();

        Ok(Self {
            source_path,
            name,
            order,
            is_enabled: true,
            file_overrides: BTreeMap::new(),
        })
    }

    /// `<prefix>-<name>` for the current order.
    pub fn target_folder_name(&self) -> Result<String> {
        naming::target_folder_name(self.order, &self.name)
    }

    /// Absolute directory this mod installs into under `target_root`.
    pub fn target_dir(&self, target_root: &Utf8Path) -> Result<Utf8PathBuf> {
        Ok(target_root.join(self.target_folder_name()?))
    }

    /// Whether a file of this mod is selected for installation.
    ///
    /// Override keys match ignoring case, like target paths do.
    pub fn is_file_enabled(&self, rel_path: &str) -> bool {
        self.override_key(rel_path)
            .and_then(|key| self.file_overrides.get(&key))
            .copied()
            .unwrap_or(true)
    }

    /// Set a file override, replacing any existing key that differs only in
    /// case or separators.
    pub fn set_file_override(&mut self, rel_path: &str, enabled: bool) {
        self.clear_file_override(rel_path);
        self.file_overrides
            .insert(normalize_rel_path(rel_path), enabled);
    }

    /// Drop the override for a file. Returns whether one existed.
    pub fn clear_file_override(&mut self, rel_path: &str) -> bool {
        match self.override_key(rel_path) {
            Some(key) => self.file_overrides.remove(&key).is_some(),
            None => false,
        }
    }

    fn override_key(&self, rel_path: &str) -> Option<String> {
        let wanted = normalize_rel_path(rel_path).to_lowercase();
        self.file_overrides
            .keys()
            .find(|key| key.to_lowercase() == wanted)
            .cloned()
    }
}

/// Ordered list of mods with dense, unique orders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModList {
    entries: Vec<ModEntry>,
}

impl ModList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from entries in any order.
    ///
    /// Entries are sorted by their current `order` (ties keep input order)
    /// and renumbered densely. Duplicate names are rejected.
    pub fn from_entries(mut entries: Vec<ModEntry>) -> Result<Self> {
        let mut names = std::collections::HashSet::new();
        for entry in &entries {
            if !names.insert(entry.name.as_str()) {
                return Err(Error::DuplicateMod(entry.name.clone()));
            }
        }

        entries.sort_by_key(|e| e.order);
        let mut list = Self { entries };
        list.normalize();
        Ok(list)
    }

    pub fn entries(&self) -> &[ModEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ModEntry> {
        self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ModEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Enabled mods, ascending by order.
    pub fn enabled_in_order(&self) -> Vec<&ModEntry> {
        self.entries.iter().filter(|e| e.is_enabled).collect()
    }

    /// Append a mod at the end of the order.
    pub fn push(&mut self, entry: ModEntry) -> Result<()> {
        if self.get(&entry.name).is_some() {
            return Err(Error::DuplicateMod(entry.name));
        }
        self.entries.push(entry);
        self.normalize();
        Ok(())
    }

    /// Remove a mod; the mods after it move up one slot.
    pub fn remove(&mut self, name: &str) -> Result<ModEntry> {
        let idx = self.position(name)?;
        let removed = self.entries.remove(idx);
        self.normalize();
        Ok(removed)
    }

    /// Move a mod to `new_index`, clamped to the end of the list.
    pub fn reorder(&mut self, name: &str, new_index: usize) -> Result<()> {
        let idx = self.position(name)?;
        let entry = self.entries.remove(idx);
        let target = new_index.min(self.entries.len());
        self.entries.insert(target, entry);
        self.normalize();
        Ok(())
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<()> {
        let idx = self.position(name)?;
        self.entries[idx].is_enabled = enabled;
        Ok(())
    }

    pub fn set_file_override(&mut self, name: &str, rel_path: &str, enabled: bool) -> Result<()> {
        let idx = self.position(name)?;
        self.entries[idx].set_file_override(rel_path, enabled);
        Ok(())
    }

    /// Drop a file override so the file falls back to enabled.
    /// Returns whether an override existed.
    pub fn clear_file_override(&mut self, name: &str, rel_path: &str) -> Result<bool> {
        let idx = self.position(name)?;
        Ok(self.entries[idx].clear_file_override(rel_path))
    }

    /// Move the named mods to the front in the given sequence; all others keep
    /// their relative order behind them. Names not in the list are ignored.
    pub(crate) fn promote(&mut self, names: &[String]) {
        let mut front = Vec::with_capacity(names.len());
        let mut rest = std::mem::take(&mut self.entries);

        for name in names {
            if let Some(idx) = rest.iter().position(|e| &e.name == name) {
                front.push(rest.remove(idx));
            }
        }

        front.extend(rest);
        self.entries = front;
        self.normalize();
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut ModEntry> {
        self.entries.iter_mut().find(|e| e.name == name)
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.entries
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| Error::ModNotFound(name.to_string()))
    }

    fn normalize(&mut self) {
        for (idx, entry) in self.entries.iter_mut().enumerate() {
            entry.order = idx as u32;
        }
    }
}

impl<'a> IntoIterator for &'a ModList {
    type Item = &'a ModEntry;
    type IntoIter = std::slice::Iter<'a, ModEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(names: &[&str]) -> ModList {
        let entries = names
            .iter()
            .enumerate()
            .map(|(i, n)| ModEntry::new(format!("/mods/{}", n), i as u32).unwrap())
            .collect();
        ModList::from_entries(entries).unwrap()
    }

    fn names(list: &ModList) -> Vec<&str> {
        list.iter().map(|e| e.name.as_str()).collect()
    }

    fn assert_dense(list: &ModList) {
        for (idx, entry) in list.iter().enumerate() {
            assert_eq!(entry.order, idx as u32);
        }
    }

    #[test]
    fn test_entry_name_from_leaf() {
        let entry = ModEntry::new("/staging/Better Armor-123", 4).unwrap();
        assert_eq!(entry.name, "Better Armor-123");
        assert_eq!(entry.order, 4);
        assert!(entry.is_enabled);
        assert_eq!(entry.target_folder_name().unwrap(), "AAE-Better Armor-123");
    }

    #[test]
    fn test_entry_without_leaf_rejected() {
        assert!(matches!(
            ModEntry::new("/", 0),
            Err(Error::InvalidModDir(_))
        ));
    }

    #[test]
    fn test_file_override_lookup_normalizes_separators() {
        let mut entry = ModEntry::new("/mods/a", 0).unwrap();
        entry
            .file_overrides
            .insert("textures/b.dds".to_string(), false);

        assert!(!entry.is_file_enabled("textures\\b.dds"));
        assert!(!entry.is_file_enabled("./textures/b.dds"));
        assert!(!entry.is_file_enabled("Textures\\B.DDS"));
        assert!(entry.is_file_enabled("textures/c.dds"));
    }

    #[test]
    fn test_file_override_ignores_case() {
        let mut list = list_of(&["Alpha"]);
        list.set_file_override("Alpha", "B.TXT", false).unwrap();

        let entry = list.get("Alpha").unwrap();
        assert!(!entry.is_file_enabled("b.txt"));
        assert!(!entry.is_file_enabled("B.txt"));
        assert!(entry.is_file_enabled("a.txt"));

        list.set_file_override("Alpha", "b.txt", true).unwrap();
        let entry = list.get("Alpha").unwrap();
        assert_eq!(entry.file_overrides.len(), 1);
        assert!(entry.is_file_enabled("B.TXT"));

        assert!(list.clear_file_override("Alpha", "B.txt").unwrap());
        assert!(list.get("Alpha").unwrap().file_overrides.is_empty());
    }

    #[test]
    fn test_from_entries_sorts_and_renumbers() {
        let entries = vec![
            ModEntry::new("/mods/b", 7).unwrap(),
            ModEntry::new("/mods/a", 2).unwrap(),
        ];
        let list = ModList::from_entries(entries).unwrap();
        assert_eq!(names(&list), vec!["a", "b"]);
        assert_dense(&list);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let entries = vec![
            ModEntry::new("/one/a", 0).unwrap(),
            ModEntry::new("/two/a", 1).unwrap(),
        ];
        assert!(matches!(
            ModList::from_entries(entries),
            Err(Error::DuplicateMod(name)) if name == "a"
        ));

        let mut list = list_of(&["a"]);
        assert!(list.push(ModEntry::new("/x/a", 0).unwrap()).is_err());
    }

    #[test]
    fn test_reorder_keeps_orders_dense() {
        let mut list = list_of(&["a", "b", "c", "d"]);

        list.reorder("d", 0).unwrap();
        assert_eq!(names(&list), vec!["d", "a", "b", "c"]);
        assert_dense(&list);

        list.reorder("d", 100).unwrap();
        assert_eq!(names(&list), vec!["a", "b", "c", "d"]);
        assert_dense(&list);

        list.reorder("a", 2).unwrap();
        assert_eq!(names(&list), vec!["b", "c", "a", "d"]);
        assert_dense(&list);
    }

    #[test]
    fn test_remove_and_push() {
        let mut list = list_of(&["a", "b", "c"]);
        let removed = list.remove("b").unwrap();
        assert_eq!(removed.name, "b");
        assert_eq!(names(&list), vec!["a", "c"]);
        assert_dense(&list);

        list.push(ModEntry::new("/mods/z", 0).unwrap()).unwrap();
        assert_eq!(list.get("z").unwrap().order, 2);
    }

    #[test]
    fn test_unknown_name_errors() {
        let mut list = list_of(&["a"]);
        assert!(matches!(list.reorder("x", 0), Err(Error::ModNotFound(_))));
        assert!(matches!(
            list.set_enabled("x", false),
            Err(Error::ModNotFound(_))
        ));
        assert!(matches!(list.remove("x"), Err(Error::ModNotFound(_))));
    }

    #[test]
    fn test_enabled_in_order_and_overrides() {
        let mut list = list_of(&["a", "b", "c"]);
        list.set_enabled("b", false).unwrap();
        list.set_file_override("c", "data\\x.esp", false).unwrap();

        let enabled: Vec<&str> = list
            .enabled_in_order()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(enabled, vec!["a", "c"]);
        assert!(!list.get("c").unwrap().is_file_enabled("data/x.esp"));

        assert!(list.clear_file_override("c", "data/x.esp").unwrap());
        assert!(!list.clear_file_override("c", "data/x.esp").unwrap());
        assert!(list.get("c").unwrap().is_file_enabled("data/x.esp"));
    }

    #[test]
    fn test_promote() {
        let mut list = list_of(&["a", "b", "c", "d"]);
        list.promote(&["c".to_string(), "missing".to_string(), "a".to_string()]);
        assert_eq!(names(&list), vec!["c", "a", "b", "d"]);
        assert_dense(&list);
    }
}
