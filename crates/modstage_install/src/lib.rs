//! Incremental mod installer for modstage.
//!
//! Mirrors every enabled mod of a load order into its own prefixed folder in a
//! target directory (`AAA-SkyUI`, `AAB-USSEP`, ...), so that alphabetical
//! folder order equals load order. Repeated installs are cheap:
//!
//! - **Incremental copy**: files already up to date in the target are skipped
//! - **Reconciliation**: directories of disabled or removed mods and stale files
//!   inside kept mods are deleted
//! - **Protected files**: loose root files owned by an external deployment tool
//!   (`vortex.*`, `snapshot_*`) are never touched
//! - **Exclusive**: a second install against the same target is rejected
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use modstage_install::{FileComparison, Installer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mods = modstage_core::discover(Utf8Path::new("C:/Games/Mods/source"))?;
//!
//! let summary = Installer::new("C:/Games/Mods/staging")
//!     .with_comparison(FileComparison::SizeAndMtime)
//!     .with_progress(|progress| {
//!         println!("{:?} {}%", progress.stage, progress.percentage);
//!     })
//!     .install(mods.entries())?;
//!
//! println!("Copied {}, skipped {}", summary.files_copied, summary.files_skipped);
//! # Ok(())
//! # }
//! ```

pub mod cleanup;
pub mod enumerate;
pub mod error;
pub mod installer;
pub mod lock;
pub mod plan;
pub mod sync;
pub mod utils;

// Re-export main types
pub use cleanup::{clean, CleanupReport};
pub use enumerate::FileEnumerator;
pub use error::{EntryFailure, EntryOperation, Error, Result};
pub use installer::{InstallProgress, InstallStage, InstallSummary, Installer};
pub use lock::{InstallLock, LOCK_FILE_NAME};
pub use plan::{build_required_state, RequiredState};
pub use sync::{copy_mod, FileComparison, ModSyncReport, SyncOptions};
pub use utils::CancelToken;
