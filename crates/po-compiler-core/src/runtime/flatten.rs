// crates/po-compiler-core/src/runtime/flatten.rs
// ============================================================================
// Module: Entry Flattener
// Description: Converts a nested catalog into sorted binary-ready records.
// Purpose: Produce the exact record order written into the binary table.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Flattening is a pure function of the catalog. The metadata entry maps to
//! the record with an empty key; every other entry maps to one record whose
//! key follows the composite layout in [`Record::composite_key`]. Records are
//! returned in byte-wise key order, which is also the on-disk order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Catalog;
use crate::core::Record;
use crate::core::Translation;

// ============================================================================
// SECTION: Flattening
// ============================================================================

/// Flattens `catalog` into records sorted by key.
#[must_use]
pub fn flatten(catalog: &Catalog) -> Vec<Record> {
    let mut records = Vec::with_capacity(catalog.content_len() + 1);
    if let Some(metadata) = catalog.metadata() {
        records.push(Record::new(Vec::new(), metadata.form(0).unwrap_or_default().as_bytes()));
    }
    for (context, translation) in catalog.content_entries() {
        records.push(entry_record(context, translation));
    }
    records.sort();
    records
}

/// Builds the record for one content entry.
fn entry_record(context: Option<&str>, translation: &Translation) -> Record {
    let key = Record::composite_key(context, &translation.id, &translation.plural_id);
    let value = if translation.is_plural() {
        Record::join_forms(&translation.dense_forms())
    } else {
        translation.singular().as_bytes().to_vec()
    };
    Record {
        key,
        value,
    }
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

    use super::flatten;
    use crate::core::Catalog;
    use crate::core::Translation;

    #[test]
    fn metadata_record_sorts_first_with_empty_key() {
        let mut catalog = Catalog::new();
        catalog.set_metadata("Language: es\n");
        catalog.insert(None, Translation::new("Hello").with_form(0, "Hola"));
        let records = flatten(&catalog);
        assert_eq!(records.len(), 2);
        assert!(records[0].is_metadata());
        assert_eq!(records[0].value, b"Language: es\n".to_vec());
        assert_eq!(records[1].key, b"Hello".to_vec());
        assert_eq!(records[1].value, b"Hola".to_vec());
    }

    #[test]
    fn untranslated_singular_maps_to_message_id() {
        let mut catalog = Catalog::new();
        catalog.insert(None, Translation::new("Goodbye").with_form(0, ""));
        let records = flatten(&catalog);
        assert_eq!(records[0].value, b"Goodbye".to_vec());
    }

    #[test]
    fn context_and_plural_keys_are_composite() {
        let mut catalog = Catalog::new();
        catalog.insert(Some("menu"), Translation::new("Open").with_form(0, "Abrir"));
        catalog.insert(
            None,
            Translation::plural("File", "Files").with_form(0, "Archivo").with_form(1, "Archivos"),
        );
        let records = flatten(&catalog);
        assert_eq!(records[0].key, b"File\x00Files".to_vec());
        assert_eq!(records[0].value, b"Archivo\x00Archivos".to_vec());
        assert_eq!(records[1].key, b"menu\x04Open".to_vec());
    }

    #[test]
    fn plural_without_forms_yields_empty_value() {
        let mut catalog = Catalog::new();
        catalog.insert(None, Translation::plural("day", "days"));
        let records = flatten(&catalog);
        assert!(records[0].value.is_empty());
    }

    #[test]
    fn flatten_does_not_mutate_catalog() {
        let mut catalog = Catalog::new();
        catalog.set_metadata("Language: de\n");
        catalog.insert(None, Translation::new("Yes").with_form(0, "Ja"));
        let before = catalog.clone();
        let _ = flatten(&catalog);
        assert_eq!(catalog, before);
    }
}
