// crates/po-compiler-core/src/core/catalog.rs
// ============================================================================
// Module: Catalog Model
// Description: In-memory representation of a parsed translation catalog.
// Purpose: Hold plain, plural, and context-scoped translations plus headers.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Catalog`] is built once per compile/validate/summarize call and then
//! discarded. Plain entries are keyed by message id; context-scoped entries are
//! keyed by context tag and then message id. Both maps are ordered so every
//! traversal is deterministic.
//!
//! ## Invariants
//! - The empty message id in the plain map is the metadata (header) entry and
//!   never counts as content.
//! - Plural forms are a sparse index map; gaps are padded only when flattened.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Message id reserved for the catalog metadata entry.
pub const METADATA_ID: &str = "";
/// Header carrying the catalog language tag.
const LANGUAGE_HEADER: &str = "Language";
/// Header carrying the raw plural rule expression.
const PLURAL_FORMS_HEADER: &str = "Plural-Forms";

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translation state for a single message.
///
/// # Invariants
/// - `plural_id` is empty for non-plural messages.
/// - Index 0 holds the singular/base form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// Singular message id.
    pub id: String,
    /// Plural message id (empty when the message has no plural).
    #[serde(default)]
    pub plural_id: String,
    /// Translated forms keyed by plural index.
    #[serde(default)]
    pub forms: BTreeMap<u32, String>,
}

impl Translation {
    /// Creates a non-plural translation with no forms.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            plural_id: String::new(),
            forms: BTreeMap::new(),
        }
    }

    /// Creates a plural translation with no forms.
    #[must_use]
    pub fn plural(id: impl Into<String>, plural_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            plural_id: plural_id.into(),
            forms: BTreeMap::new(),
        }
    }

    /// Returns the translation with `value` stored at `index`.
    #[must_use]
    pub fn with_form(mut self, index: u32, value: impl Into<String>) -> Self {
        self.set_form(index, value);
        self
    }

    /// Stores `value` at plural `index`, replacing any previous form.
    pub fn set_form(&mut self, index: u32, value: impl Into<String>) {
        self.forms.insert(index, value.into());
    }

    /// Returns true when the translation carries a plural message id.
    #[must_use]
    pub const fn is_plural(&self) -> bool {
        !self.plural_id.is_empty()
    }

    /// Returns the form stored at `index`, if any.
    #[must_use]
    pub fn form(&self, index: u32) -> Option<&str> {
        self.forms.get(&index).map(String::as_str)
    }

    /// Returns the highest observed plural index, or 0 when no forms exist.
    #[must_use]
    pub fn max_index(&self) -> u32 {
        self.forms.keys().next_back().copied().unwrap_or(0)
    }

    /// Returns every form from index 0 through the highest observed index,
    /// with missing indices filled by empty strings.
    ///
    /// A translation with no forms yields a single empty form.
    #[must_use]
    pub fn dense_forms(&self) -> Vec<&str> {
        (0 ..= self.max_index()).map(|index| self.form(index).unwrap_or("")).collect()
    }

    /// Returns true when every form in the translation's index range is non-empty.
    ///
    /// Non-plural translations only consider index 0.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        if !self.is_plural() {
            return self.form(0).is_some_and(|form| !form.is_empty());
        }
        self.dense_forms().iter().all(|form| !form.is_empty())
    }

    /// Returns the singular translation, falling back to the message id when
    /// form 0 is missing or empty.
    #[must_use]
    pub fn singular(&self) -> &str {
        match self.form(0) {
            Some(form) if !form.is_empty() => form,
            _ => &self.id,
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Parsed translation catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Language tag from the `Language` header (may be empty).
    pub language: String,
    /// Raw `Plural-Forms` header value (may be empty).
    pub plural_forms: String,
    /// Header fields in declaration order.
    pub headers: Vec<(String, String)>,
    /// Plain (unscoped) translations keyed by message id.
    pub translations: BTreeMap<String, Translation>,
    /// Context-scoped translations keyed by context tag, then message id.
    pub contexts: BTreeMap<String, BTreeMap<String, Translation>>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a translation under an optional context.
    ///
    /// An empty context is treated as no context. A later insert for the same
    /// context and message id replaces the earlier one.
    pub fn insert(&mut self, context: Option<&str>, translation: Translation) {
        match context {
            Some(context) if !context.is_empty() => {
                self.contexts
                    .entry(context.to_string())
                    .or_default()
                    .insert(translation.id.clone(), translation);
            }
            _ => {
                self.translations.insert(translation.id.clone(), translation);
            }
        }
    }

    /// Stores the metadata entry and derives header fields from it.
    pub fn set_metadata(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.headers = parse_headers(&value);
        self.language = self.header(LANGUAGE_HEADER).unwrap_or_default().to_string();
        self.plural_forms = self.header(PLURAL_FORMS_HEADER).unwrap_or_default().to_string();
        self.translations
            .insert(METADATA_ID.to_string(), Translation::new(METADATA_ID).with_form(0, value));
    }

    /// Returns the metadata entry when present.
    #[must_use]
    pub fn metadata(&self) -> Option<&Translation> {
        self.translations.get(METADATA_ID)
    }

    /// Looks up a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over content entries (metadata excluded) as
    /// `(context, translation)` pairs: plain entries first, then context
    /// entries, each in key order.
    pub fn content_entries(&self) -> impl Iterator<Item = (Option<&str>, &Translation)> {
        let plain = self
            .translations
            .iter()
            .filter(|(id, _)| id.as_str() != METADATA_ID)
            .map(|(_, translation)| (None, translation));
        let scoped = self.contexts.iter().flat_map(|(context, entries)| {
            entries.values().map(move |translation| (Some(context.as_str()), translation))
        });
        plain.chain(scoped)
    }

    /// Returns the number of content entries (metadata excluded).
    #[must_use]
    pub fn content_len(&self) -> usize {
        self.content_entries().count()
    }
}

// ============================================================================
// SECTION: Header Parsing
// ============================================================================

/// Splits a metadata value into `Name: value` header pairs.
fn parse_headers(value: &str) -> Vec<(String, String)> {
    value
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
