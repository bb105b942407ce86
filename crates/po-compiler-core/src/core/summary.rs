// crates/po-compiler-core/src/core/summary.rs
// ============================================================================
// Module: Catalog Summary
// Description: Translation progress counts derived from a catalog.
// Purpose: Provide a stable shape for progress reporting surfaces.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Summary`] is derived, never stored. `fuzzy` is reserved and always zero
//! because the catalog model does not track fuzzy flags.

use serde::Deserialize;
use serde::Serialize;

/// Translation progress for one catalog.
///
/// # Invariants
/// - `untranslated == total - translated - fuzzy`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Language tag from the catalog headers (may be empty).
    pub language: String,
    /// Number of content entries (metadata excluded).
    pub total: usize,
    /// Number of complete translations.
    pub translated: usize,
    /// Number of fuzzy translations (always zero).
    pub fuzzy: usize,
    /// Number of entries neither translated nor fuzzy.
    pub untranslated: usize,
}

impl Summary {
    /// Builds a summary from raw counts, deriving `untranslated`.
    #[must_use]
    pub fn from_counts(
        language: impl Into<String>,
        total: usize,
        translated: usize,
        fuzzy: usize,
    ) -> Self {
        Self {
            language: language.into(),
            total,
            translated,
            fuzzy,
            untranslated: total.saturating_sub(translated).saturating_sub(fuzzy),
        }
    }
}
