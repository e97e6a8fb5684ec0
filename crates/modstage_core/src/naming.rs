//! Order index to folder prefix mapping.
//!
//! Every installed mod lives in a target sub-directory named
//! `<prefix>-<name>`, where the prefix is a three-letter base-26 code derived
//! from the mod's order. Sorting the target directory by name therefore
//! reproduces the load order, which is what the game loader relies on.
//!
//! ```
//! use modstage_core::naming::prefix;
//!
//! assert_eq!(prefix(0).unwrap(), "AAA");
//! assert_eq!(prefix(27).unwrap(), "ABB");
//! ```

use crate::error::{Error, Result};

/// Largest order that still fits in three letters (`ZZZ`).
pub const MAX_ORDER: u32 = 26 * 26 * 26 - 1;

/// Compute the sortable prefix for an order index.
///
/// The mapping is stable: the same order always yields the same prefix, which
/// lets a repeated install find the folders it wrote last time.
pub fn prefix(order: u32) -> Result<String> {
    if order > MAX_ORDER {
        return Err(Error::OrderOutOfRange {
            order,
            max: MAX_ORDER,
        });
    }

    let third = order % 26;
    let second = (order / 26) % 26;
    let first = order / 676;

    Ok([first, second, third]
        .iter()
        .map(|&digit| char::from(b'A' + digit as u8))
        .collect())
}

/// Folder name a mod is installed under: `<prefix>-<name>`.
pub fn target_folder_name(order: u32, name: &str) -> Result<String> {
    Ok(format!("{}-{}", prefix(order)?, name))
}
