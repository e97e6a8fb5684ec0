mod config;
mod install;
mod list;
mod order;

pub use config::*;
pub use install::*;
pub use list::*;
pub use order::*;

use crate::errors::CliError;
use crate::utils::config::{self as app_config, AppConfig};
use camino::Utf8PathBuf;
use miette::Result;
use modstage_core::{LoadOrderState, ModList};

/// The configured source root's mods with the saved load order applied.
pub struct Session {
    pub config: AppConfig,
    pub mods: ModList,
    pub load_order_path: Utf8PathBuf,
}

impl Session {
    pub fn open() -> Result<Self> {
        let config = app_config::load_config();
        let source_root = config
            .source_root
            .clone()
            .ok_or(CliError::SourceRootNotSet)?;
        let load_order_path = config
            .load_order_path()
            .ok_or(CliError::LoadOrderPathUnknown)?;

        let mut mods = modstage_core::discover(&source_root).map_err(CliError::from)?;
        if let Some(state) = LoadOrderState::load(&load_order_path).map_err(CliError::from)? {
            mods.apply_saved(&state);
        }

        tracing::debug!(
            "Session: {} mods from {}, order file {}",
            mods.len(),
            source_root,
            load_order_path
        );

        Ok(Self {
            config,
            mods,
            load_order_path,
        })
    }

    /// Persist the current order, enabled flags and file overrides.
    pub fn save(&self) -> Result<()> {
        LoadOrderState::from_list(&self.mods)
            .save(&self.load_order_path)
            .map_err(CliError::from)?;
        Ok(())
    }
}
