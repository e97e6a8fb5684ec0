//! Application configuration management utilities.

use camino::Utf8PathBuf;
use modstage_install::FileComparison;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;

/// Application-wide configuration stored in config.toml.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding one sub-directory per mod.
    pub source_root: Option<Utf8PathBuf>,
    /// Directory the install mirrors enabled mods into.
    pub target_root: Option<Utf8PathBuf>,
    /// Where the load order is persisted. Defaults to load_order.json next to the executable.
    pub load_order_path: Option<Utf8PathBuf>,
    /// Extra loose files in the target root that an install must never delete.
    pub protected_files: Vec<String>,
    pub comparison: FileComparison,
}

impl AppConfig {
    pub fn load_order_path(&self) -> Option<Utf8PathBuf> {
        self.load_order_path
            .clone()
            .or_else(|| config_path("load_order.json"))
    }
}

/// Returns the directory where the current executable resides.
pub fn install_dir() -> Option<Utf8PathBuf> {
    let exe = env::current_exe().ok()?;
    let parent = exe.parent()?;
    Utf8PathBuf::from_path_buf(parent.to_path_buf()).ok()
}

/// Returns a config file path located next to the executable.
pub fn config_path(file_name: &str) -> Option<Utf8PathBuf> {
    install_dir().map(|dir| dir.join(file_name))
}

/// Returns the default configuration file path (config.toml).
pub fn default_config_path() -> Option<Utf8PathBuf> {
    config_path("config.toml")
}

/// Loads the application configuration from config.toml.
/// Returns default configuration if the file doesn't exist or cannot be parsed.
pub fn load_config() -> AppConfig {
    let Some(path) = default_config_path() else {
        return AppConfig::default();
    };
    if !path.as_std_path().exists() {
        return AppConfig::default();
    }

    match fs::read_to_string(&path).map(|content| parse_config(&content)) {
        Ok(Ok(cfg)) => cfg,
        Ok(Err(e)) => {
            tracing::warn!("Ignoring unreadable config {}: {}", path, e);
            AppConfig::default()
        }
        Err(e) => {
            tracing::warn!("Failed to read config {}: {}", path, e);
            AppConfig::default()
        }
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Saves the application configuration to config.toml.
pub fn save_config(cfg: &AppConfig) -> io::Result<()> {
    if let Some(path) = default_config_path() {
        let content = toml::to_string_pretty(cfg).map_err(io::Error::other)?;
        fs::write(path.as_str(), content)
    } else {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            "Could not determine config path",
        ))
    }
}
