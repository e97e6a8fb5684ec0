//! Error types for mod list and load order operations.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failed (reading the source root, writing load order state).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse or serialize JSON (load order state, import files).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The order index cannot be expressed with a three-letter prefix.
    #[error("Order {order} exceeds the maximum supported order {max}")]
    OrderOutOfRange { order: u32, max: u32 },

    /// An operation referenced a mod name that is not in the list.
    #[error("Mod not found: {0}")]
    ModNotFound(String),

    /// A mod with the same name is already part of the list.
    #[error("Duplicate mod name: {0}")]
    DuplicateMod(String),

    /// A mod source directory has no usable leaf name.
    #[error("Invalid mod directory: {0}")]
    InvalidModDir(Utf8PathBuf),

    /// The source root to discover mods from does not exist.
    #[error("Source root not found: {0}")]
    SourceRootMissing(Utf8PathBuf),

    /// An order import file could not be understood.
    #[error("Invalid order file: {0}")]
    InvalidOrderFile(String),
}
