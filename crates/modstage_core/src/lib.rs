//! Core shared logic for modstage mod management.
//!
//! This crate provides the pieces used by both the `modstage_install` engine
//! and the `modstage` CLI:
//!
//! - [`naming`]: the order index to folder-prefix mapping (`AAA`, `AAB`, ...)
//! - [`entry`]: the [`ModEntry`] model and the [`ModList`] that keeps orders dense
//! - [`discovery`]: building a [`ModList`] from a source root
//! - [`load_order`]: the persisted [`LoadOrderState`] keyed by mod name
//! - [`import`]: best-effort matching of an externally exported order

pub mod discovery;
pub mod entry;
pub mod error;
pub mod import;
pub mod load_order;
pub mod naming;

pub use discovery::discover;
pub use entry::{normalize_rel_path, ModEntry, ModList};
pub use error::{Error, Result};
pub use load_order::LoadOrderState;
pub use naming::{prefix, target_folder_name, MAX_ORDER};
