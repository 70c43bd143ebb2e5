//! Locale-aware, numeric-aware name ordering.
//!
//! Names are compared with a French ICU collator at primary strength: case
//! and diacritics are ignored (`"échange"` sits with `"echange"`, `"Œuvres"`
//! with `"oeuvres"`), and runs of digits compare by numeric value (`"2"`
//! before `"10"`).

use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions, Numeric, Strength};
use icu_locid::locale;

use crate::error::{Result, SyncError};

/// Comparator for catalog display names.
pub struct NameCollator {
    collator: Collator,
}

impl NameCollator {
    pub fn new() -> Result<Self> {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Primary);
        options.numeric = Some(Numeric::On);

        let collator = Collator::try_new(&locale!("fr").into(), options)
            .map_err(|e| SyncError::Collation(e.to_string()))?;

        Ok(Self { collator })
    }

    /// Compare two display names.
    ///
    /// Names that differ only in case or accents compare equal, so a stable
    /// sort keeps their incoming order.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.collator.compare(a, b)
    }
}
