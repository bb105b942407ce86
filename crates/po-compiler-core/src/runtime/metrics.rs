// crates/po-compiler-core/src/runtime/metrics.rs
// ============================================================================
// Module: Metrics & Validator
// Description: Progress counts and structural warnings for parsed catalogs.
// Purpose: Report catalog health without encoding a binary table.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! Both reports read the catalog model directly. The metadata entry is never
//! counted, and a translation counts as translated only when every form in its
//! index range is non-empty. Validation never fails on content; it only
//! produces warnings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::Catalog;
use crate::core::Summary;

// ============================================================================
// SECTION: Warnings
// ============================================================================

/// Warning emitted when the catalog has no language tag.
pub const WARN_LANGUAGE_MISSING: &str = "Language header missing";
/// Warning emitted when the catalog has no plural rule.
pub const WARN_PLURAL_FORMS_MISSING: &str = "Plural-Forms header missing";

/// Validation outcome paired with the catalog summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Warnings sorted lexicographically.
    pub warnings: Vec<String>,
    /// Progress counts for the same catalog.
    pub summary: Summary,
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Computes progress counts for `catalog`.
#[must_use]
pub fn summarize(catalog: &Catalog) -> Summary {
    let mut total = 0;
    let mut translated = 0;
    for (_, translation) in catalog.content_entries() {
        total += 1;
        if translation.is_complete() {
            translated += 1;
        }
    }
    Summary::from_counts(catalog.language.clone(), total, translated, 0)
}

/// Returns structural warnings for `catalog`, sorted lexicographically.
#[must_use]
pub fn validate(catalog: &Catalog) -> Vec<String> {
    let mut warnings = Vec::new();
    if catalog.language.trim().is_empty() {
        warnings.push(WARN_LANGUAGE_MISSING.to_string());
    }
    if catalog.plural_forms.trim().is_empty() {
        warnings.push(WARN_PLURAL_FORMS_MISSING.to_string());
    }
    for (context, translation) in catalog.content_entries() {
        if translation.is_complete() {
            continue;
        }
        warnings.push(match context {
            Some(context) => format!("untranslated entry: {} (ctx: {context})", translation.id),
            None => format!("untranslated entry: {}", translation.id),
        });
    }
    warnings.sort();
    warnings
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use super::summarize;
    use super::validate;
    use crate::core::Catalog;
    use crate::core::Translation;

    #[test]
    fn summary_excludes_metadata_and_counts_incomplete() {
        let mut catalog = Catalog::new();
        catalog.set_metadata("Language: es\n");
        catalog.insert(None, Translation::new("Hello").with_form(0, "Hola"));
        catalog.insert(None, Translation::new("Bye"));
        let summary = summarize(&catalog);
        assert_eq!(summary.language, "es");
        assert_eq!(summary.total, 2);
        assert_eq!(summary.translated, 1);
        assert_eq!(summary.fuzzy, 0);
        assert_eq!(summary.untranslated, 1);
    }

    #[test]
    fn context_warning_names_context() {
        let mut catalog = Catalog::new();
        catalog.set_metadata("Language: es\nPlural-Forms: nplurals=2; plural=(n != 1);\n");
        catalog.insert(Some("menu"), Translation::new("Close").with_form(0, ""));
        assert_eq!(validate(&catalog), vec!["untranslated entry: Close (ctx: menu)".to_string()]);
    }

    #[test]
    fn warnings_are_sorted() {
        let mut catalog = Catalog::new();
        catalog.insert(None, Translation::new("Zeta"));
        catalog.insert(None, Translation::new("Alpha"));
        assert_eq!(
            validate(&catalog),
            vec![
                "Language header missing".to_string(),
                "Plural-Forms header missing".to_string(),
                "untranslated entry: Alpha".to_string(),
                "untranslated entry: Zeta".to_string(),
            ]
        );
    }
}
