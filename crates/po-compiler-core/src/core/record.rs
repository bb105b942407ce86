// crates/po-compiler-core/src/core/record.rs
// ============================================================================
// Module: Binary Records
// Description: Flattened key/value pairs written into the binary table.
// Purpose: Define the composite key layout shared by the flattener and codec.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Record`] is one binary-ready `(key, value)` pair. Composite keys follow
//! the gettext `.mo` convention consumed by downstream runtimes:
//! `context 0x04 msgid [0x00 msgid_plural]`.
//!
//! ## Preconditions
//! Identifiers must not contain raw `0x00` or `0x04` bytes; such input is not
//! sanitized and produces ambiguous keys.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Separator between a context tag and a message id.
pub const CONTEXT_SEPARATOR: u8 = 0x04;
/// Separator between singular and plural ids, and between plural forms.
pub const PLURAL_SEPARATOR: u8 = 0x00;

// ============================================================================
// SECTION: Record
// ============================================================================

/// Binary-ready key/value pair.
///
/// Ordering compares `key` first; keys are unique within one flattened set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Record {
    /// Composite lookup key bytes.
    pub key: Vec<u8>,
    /// Translation value bytes.
    pub value: Vec<u8>,
}

impl Record {
    /// Creates a record from raw key and value bytes.
    #[must_use]
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Builds a composite key from an optional context, a message id, and a
    /// plural id (empty when the message has no plural).
    #[must_use]
    pub fn composite_key(context: Option<&str>, id: &str, plural_id: &str) -> Vec<u8> {
        let context = context.filter(|context| !context.is_empty());
        let capacity = context.map_or(0, |context| context.len() + 1)
            + id.len()
            + if plural_id.is_empty() { 0 } else { plural_id.len() + 1 };
        let mut key = Vec::with_capacity(capacity);
        if let Some(context) = context {
            key.extend_from_slice(context.as_bytes());
            key.push(CONTEXT_SEPARATOR);
        }
        key.extend_from_slice(id.as_bytes());
        if !plural_id.is_empty() {
            key.push(PLURAL_SEPARATOR);
            key.extend_from_slice(plural_id.as_bytes());
        }
        key
    }

    /// Joins plural forms with the plural separator.
    #[must_use]
    pub fn join_forms(forms: &[&str]) -> Vec<u8> {
        let mut value = Vec::new();
        for (index, form) in forms.iter().enumerate() {
            if index > 0 {
                value.push(PLURAL_SEPARATOR);
            }
            value.extend_from_slice(form.as_bytes());
        }
        value
    }

    /// Returns true for the metadata record (empty key).
    #[must_use]
    pub const fn is_metadata(&self) -> bool {
        self.key.is_empty()
    }

    /// Returns a display view with lossy UTF-8 decoding and split components.
    #[must_use]
    pub fn view(&self) -> RecordView {
        let (context, rest) = match self.key.iter().position(|byte| *byte == CONTEXT_SEPARATOR) {
            Some(pos) => (Some(lossy(&self.key[.. pos])), &self.key[pos + 1 ..]),
            None => (None, self.key.as_slice()),
        };
        let (id, plural_id) = match rest.iter().position(|byte| *byte == PLURAL_SEPARATOR) {
            Some(pos) => (lossy(&rest[.. pos]), Some(lossy(&rest[pos + 1 ..]))),
            None => (lossy(rest), None),
        };
        let values = if plural_id.is_some() {
            self.value.split(|byte| *byte == PLURAL_SEPARATOR).map(lossy).collect()
        } else {
            vec![lossy(&self.value)]
        };
        RecordView {
            context,
            id,
            plural_id,
            values,
        }
    }
}

/// Human-readable record breakdown used by reporting surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordView {
    /// Context tag when the key is context-scoped.
    pub context: Option<String>,
    /// Singular message id (empty for the metadata record).
    pub id: String,
    /// Plural message id when the key carries one.
    pub plural_id: Option<String>,
    /// Value forms (one entry for non-plural records).
    pub values: Vec<String>,
}

/// Decodes bytes as UTF-8, replacing invalid sequences.
fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
