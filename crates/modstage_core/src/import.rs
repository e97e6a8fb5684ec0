//! Best-effort import of an externally exported load order.
//!
//! Exported lists rarely spell mod names exactly the way the source folders
//! do: they may carry the install prefix (`AAB-SkyUI`), different casing or
//! punctuation, or a slightly different version suffix. Each imported name is
//! matched against the discovered mods with progressively looser rules, and
//! every mod is claimed at most once.
//!
//! The result only produces a new order; it never touches installation.

use crate::entry::ModList;
use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Minimum similarity ratio accepted by the fuzzy pass.
pub const SIMILARITY_THRESHOLD: f32 = 0.8;

/// Which rule resolved an imported name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Prefixed,
    Normalized,
    Similar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NameMatch {
    pub imported: String,
    pub mod_name: String,
    pub kind: MatchKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportResult {
    /// Matches in import sequence.
    pub matched: Vec<NameMatch>,
    /// Imported names that matched no remaining mod.
    pub unmatched: Vec<String>,
}

/// Parse an exported order file into a sequence of names.
///
/// Accepted shapes:
/// - JSON array of strings: `["SkyUI", "USSEP"]`
/// - JSON array of objects with a `name` field
/// - JSON object with a `mods` array of such objects (sorted by `order` when present)
/// - plain text, one name per line; blank lines and `#` comments are skipped
pub fn parse_order_file(text: &str) -> Result<Vec<String>> {
    let trimmed = text.trim_start_matches('\u{feff}').trim();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        let value: Value = serde_json::from_str(trimmed)?;
        return names_from_json(&value);
    }

    Ok(trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn names_from_json(value: &Value) -> Result<Vec<String>> {
    match value {
        Value::Array(items) => items.iter().map(name_of).collect(),
        Value::Object(map) => {
            let Some(Value::Array(items)) = map.get("mods") else {
                return Err(Error::InvalidOrderFile(
                    "expected an array or an object with a 'mods' array".to_string(),
                ));
            };
            let mut ordered: Vec<(u64, String)> = items
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    let order = item
                        .get("order")
                        .and_then(Value::as_u64)
                        .unwrap_or(idx as u64);
                    name_of(item).map(|name| (order, name))
                })
                .collect::<Result<_>>()?;
            ordered.sort_by_key(|(order, _)| *order);
            Ok(ordered.into_iter().map(|(_, name)| name).collect())
        }
        _ => Err(Error::InvalidOrderFile(
            "expected an array or an object".to_string(),
        )),
    }
}

fn name_of(item: &Value) -> Result<String> {
    match item {
        Value::String(s) => Ok(s.clone()),
        Value::Object(map) => map
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidOrderFile("entry without a 'name' field".to_string())),
        other => Err(Error::InvalidOrderFile(format!(
            "unsupported entry: {}",
            other
        ))),
    }
}

/// Match imported names against the mods in `list`.
pub fn match_names(imported: &[String], list: &ModList) -> ImportResult {
    let mut remaining: Vec<&str> = list.iter().map(|e| e.name.as_str()).collect();
    let mut result = ImportResult::default();

    for name in imported {
        match find_match(name, &remaining) {
            Some((idx, kind)) => {
                let mod_name = remaining.remove(idx).to_string();
                tracing::debug!("Import '{}' -> '{}' ({:?})", name, mod_name, kind);
                result.matched.push(NameMatch {
                    imported: name.clone(),
                    mod_name,
                    kind,
                });
            }
            None => {
                tracing::debug!("Import '{}' matched no mod", name);
                result.unmatched.push(name.clone());
            }
        }
    }

    result
}

fn find_match(name: &str, candidates: &[&str]) -> Option<(usize, MatchKind)> {
    if let Some(idx) = candidates.iter().position(|c| c.eq_ignore_ascii_case(name)) {
        return Some((idx, MatchKind::Exact));
    }

    let stripped = strip_install_prefix(name);
    if stripped != name {
        if let Some(idx) = candidates
            .iter()
            .position(|c| c.eq_ignore_ascii_case(stripped))
        {
            return Some((idx, MatchKind::Prefixed));
        }
    }

    let key = normalize_name(stripped);
    if key.is_empty() {
        return None;
    }
    if let Some(idx) = candidates.iter().position(|c| normalize_name(c) == key) {
        return Some((idx, MatchKind::Normalized));
    }

    candidates
        .iter()
        .enumerate()
        .map(|(idx, c)| (idx, similarity_ratio(&key, &normalize_name(c))))
        .filter(|(_, score)| *score >= SIMILARITY_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(idx, _)| (idx, MatchKind::Similar))
}

/// Strip an install prefix such as `AAB-` or `BAAA-` from an exported name.
pub fn strip_install_prefix(name: &str) -> &str {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    let re = PREFIX.get_or_init(|| Regex::new(r"^[A-Z]{3,4}-").expect("valid prefix regex"));
    match re.find(name) {
        Some(m) if m.end() < name.len() => &name[m.end()..],
        _ => name,
    }
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn similarity_ratio(a: &str, b: &str) -> f32 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (levenshtein(a, b) as f32 / max_len as f32)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, a_ch) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, b_ch) in b.iter().enumerate() {
            let cost = usize::from(a_ch != b_ch);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b.len()]
}

impl ModList {
    /// Move imported mods to the front in import sequence. Mods that were not
    /// matched keep their relative order behind them.
    pub fn apply_import(&mut self, result: &ImportResult) {
        let names: Vec<String> = result.matched.iter().map(|m| m.mod_name.clone()).collect();
        self.promote(&names);
    }
}
