// crates/po-compiler-core/src/runtime/codec.rs
// ============================================================================
// Module: Binary Table Codec
// Description: Encoder, decoder, and lookup view for gettext `.mo` tables.
// Purpose: Serialize sorted records into the on-disk layout and read it back.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The layout is a 28-byte header of `u32` fields, a key offset table, a value
//! offset table, and a string pool:
//!
//! | offset | field |
//! | --- | --- |
//! | 0 | magic `0x950412de` |
//! | 4 | revision |
//! | 8 | record count `N` |
//! | 12 | key table offset (`28`) |
//! | 16 | value table offset (`28 + 8N`) |
//! | 20 | hash table size (`0`) |
//! | 24 | hash table offset (`0`) |
//!
//! Each table holds `N` `(length, offset)` pairs. The pool stores every
//! record's key then value, each NUL-terminated, in record order.
//!
//! ## Invariants
//! - Encoding is a pure function of the record sequence.
//! - Encoded length is `28 + 16N + sum(len(key) + 1 + len(value) + 1)`.
//! - The encoder always writes little-endian; the decoder accepts both byte
//!   orders.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::PLURAL_SEPARATOR;
use crate::core::Record;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Magic number identifying a `.mo` table (as read in its native order).
pub const MO_MAGIC: u32 = 0x9504_12de;
/// Byte-swapped magic seen when a big-endian table is read little-endian.
const MO_MAGIC_SWAPPED: u32 = 0xde12_0495;
/// Size of the fixed header in bytes.
pub const MO_HEADER_SIZE: usize = 28;
/// Bytes per `(length, offset)` table slot.
const SLOT_SIZE: usize = 8;
/// Highest major revision understood by the decoder.
const MAX_MAJOR_REVISION: u32 = 1;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Binary table format errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Input ends before the fixed header.
    #[error("binary table truncated: {actual_bytes} bytes, header needs 28")]
    Truncated {
        /// Input size in bytes.
        actual_bytes: usize,
    },
    /// Magic number is not a `.mo` magic in either byte order.
    #[error("unrecognized magic number {0:#010x}")]
    BadMagic(u32),
    /// Major revision is newer than the decoder understands.
    #[error("unsupported revision {0:#x}")]
    UnsupportedRevision(u32),
    /// A table slot or string extends past the end of input.
    #[error("range {offset}+{length} exceeds input of {size} bytes")]
    OutOfBounds {
        /// Start offset of the range.
        offset: usize,
        /// Length of the range.
        length: usize,
        /// Input size in bytes.
        size: usize,
    },
    /// A string lacks its NUL terminator.
    #[error("string at offset {offset} is not NUL-terminated")]
    Unterminated {
        /// Start offset of the string.
        offset: usize,
    },
    /// Record count or an offset does not fit in a `u32`.
    #[error("binary table exceeds the 4 GiB offset limit")]
    TooLarge,
}

// ============================================================================
// SECTION: Encoding
// ============================================================================

/// Encodes records, in the given order, into a binary table.
///
/// # Errors
///
/// Returns [`FormatError::TooLarge`] when the record count or any offset would
/// overflow a `u32`.
pub fn encode(records: &[Record]) -> Result<Vec<u8>, FormatError> {
    let count = records.len();
    let tables_len = count.checked_mul(SLOT_SIZE * 2).ok_or(FormatError::TooLarge)?;
    let pool_start = MO_HEADER_SIZE.checked_add(tables_len).ok_or(FormatError::TooLarge)?;
    let total = records.iter().try_fold(pool_start, |acc, record| {
        acc.checked_add(record.key.len())?.checked_add(record.value.len())?.checked_add(2)
    });
    let total = total.ok_or(FormatError::TooLarge)?;
    to_u32(total)?;

    let value_table_offset = MO_HEADER_SIZE + count * SLOT_SIZE;
    let mut out = Vec::with_capacity(total);
    for field in [
        MO_MAGIC,
        0,
        to_u32(count)?,
        to_u32(MO_HEADER_SIZE)?,
        to_u32(value_table_offset)?,
        0,
        0,
    ] {
        out.extend_from_slice(&field.to_le_bytes());
    }

    let mut key_table = Vec::with_capacity(count * SLOT_SIZE);
    let mut value_table = Vec::with_capacity(count * SLOT_SIZE);
    let mut pool = Vec::with_capacity(total - pool_start);
    let mut cursor = pool_start;
    for record in records {
        push_slot(&mut key_table, record.key.len(), cursor)?;
        cursor += record.key.len() + 1;
        push_slot(&mut value_table, record.value.len(), cursor)?;
        cursor += record.value.len() + 1;
        pool.extend_from_slice(&record.key);
        pool.push(0);
        pool.extend_from_slice(&record.value);
        pool.push(0);
    }

    out.extend_from_slice(&key_table);
    out.extend_from_slice(&value_table);
    out.extend_from_slice(&pool);
    Ok(out)
}

/// Appends one little-endian `(length, offset)` slot.
fn push_slot(table: &mut Vec<u8>, length: usize, offset: usize) -> Result<(), FormatError> {
    table.extend_from_slice(&to_u32(length)?.to_le_bytes());
    table.extend_from_slice(&to_u32(offset)?.to_le_bytes());
    Ok(())
}

/// Narrows a size to `u32`.
fn to_u32(value: usize) -> Result<u32, FormatError> {
    u32::try_from(value).map_err(|_| FormatError::TooLarge)
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Decodes a binary table into records in table order.
///
/// # Errors
///
/// Returns [`FormatError`] when the header is truncated or unrecognized, or
/// when any table slot or string is out of bounds or unterminated.
pub fn decode(bytes: &[u8]) -> Result<Vec<Record>, FormatError> {
    let reader = TableReader::new(bytes)?;
    let count = reader.read_u32(8)? as usize;
    let key_table = reader.read_u32(12)? as usize;
    let value_table = reader.read_u32(16)? as usize;

    let mut records = Vec::with_capacity(count.min(bytes.len() / (SLOT_SIZE * 2)));
    for index in 0 .. count {
        let slot = index.checked_mul(SLOT_SIZE).ok_or(FormatError::TooLarge)?;
        let key = reader.read_string(key_table.saturating_add(slot))?;
        let value = reader.read_string(value_table.saturating_add(slot))?;
        records.push(Record::new(key, value));
    }
    Ok(records)
}

/// Byte-order aware view over an encoded table.
struct TableReader<'a> {
    /// Encoded bytes.
    bytes: &'a [u8],
    /// True when integers are stored big-endian.
    big_endian: bool,
}

impl<'a> TableReader<'a> {
    /// Validates the header and detects byte order.
    fn new(bytes: &'a [u8]) -> Result<Self, FormatError> {
        if bytes.len() < MO_HEADER_SIZE {
            return Err(FormatError::Truncated {
                actual_bytes: bytes.len(),
            });
        }
        let mut reader = Self {
            bytes,
            big_endian: false,
        };
        match reader.read_u32(0)? {
            MO_MAGIC => {}
            MO_MAGIC_SWAPPED => reader.big_endian = true,
            other => return Err(FormatError::BadMagic(other)),
        }
        let revision = reader.read_u32(4)?;
        if revision >> 16 > MAX_MAJOR_REVISION {
            return Err(FormatError::UnsupportedRevision(revision));
        }
        Ok(reader)
    }

    /// Returns `length` bytes starting at `offset`.
    fn slice(&self, offset: usize, length: usize) -> Result<&'a [u8], FormatError> {
        offset
            .checked_add(length)
            .and_then(|end| self.bytes.get(offset .. end))
            .ok_or(FormatError::OutOfBounds {
                offset,
                length,
                size: self.bytes.len(),
            })
    }

    /// Reads a `u32` in the table's byte order.
    fn read_u32(&self, offset: usize) -> Result<u32, FormatError> {
        let raw = self.slice(offset, 4)?;
        let array = <[u8; 4]>::try_from(raw).map_err(|_| FormatError::OutOfBounds {
            offset,
            length: 4,
            size: self.bytes.len(),
        })?;
        Ok(if self.big_endian { u32::from_be_bytes(array) } else { u32::from_le_bytes(array) })
    }

    /// Reads the NUL-terminated string described by the slot at `slot_offset`.
    fn read_string(&self, slot_offset: usize) -> Result<Vec<u8>, FormatError> {
        let length = self.read_u32(slot_offset)? as usize;
        let offset = self.read_u32(slot_offset.saturating_add(4))? as usize;
        let with_terminator = self.slice(offset, length.saturating_add(1))?;
        let Some((&terminator, body)) = with_terminator.split_last() else {
            return Err(FormatError::Unterminated {
                offset,
            });
        };
        if terminator != 0 {
            return Err(FormatError::Unterminated {
                offset,
            });
        }
        Ok(body.to_vec())
    }
}

// ============================================================================
// SECTION: Lookup View
// ============================================================================

/// Read-only lookup view over a decoded binary table.
///
/// Lookups build the same composite keys as the flattener, so a table produced
/// by this crate answers the queries a gettext runtime would issue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoTable {
    /// Raw key/value pairs.
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MoTable {
    /// Decodes `bytes` into a lookup view.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when decoding fails.
    pub fn parse(bytes: &[u8]) -> Result<Self, FormatError> {
        Ok(Self::from_records(decode(bytes)?))
    }

    /// Builds a lookup view from already decoded records.
    #[must_use]
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            entries: records.into_iter().map(|record| (record.key, record.value)).collect(),
        }
    }

    /// Returns the number of records, metadata included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the table holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the raw value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Looks up an unscoped singular message.
    #[must_use]
    pub fn gettext(&self, id: &str) -> Option<&str> {
        self.text(&Record::composite_key(None, id, ""))
    }

    /// Looks up a context-scoped singular message.
    #[must_use]
    pub fn pgettext(&self, context: &str, id: &str) -> Option<&str> {
        self.text(&Record::composite_key(Some(context), id, ""))
    }

    /// Returns every plural form of an unscoped plural message.
    #[must_use]
    pub fn plural_forms(&self, id: &str, plural_id: &str) -> Option<Vec<&str>> {
        self.forms(&Record::composite_key(None, id, plural_id))
    }

    /// Returns every plural form of a context-scoped plural message.
    #[must_use]
    pub fn npgettext_forms(&self, context: &str, id: &str, plural_id: &str) -> Option<Vec<&str>> {
        self.forms(&Record::composite_key(Some(context), id, plural_id))
    }

    /// Returns the metadata (header) text.
    #[must_use]
    pub fn header(&self) -> Option<&str> {
        self.text(b"")
    }

    /// Returns the UTF-8 value for `key`.
    fn text(&self, key: &[u8]) -> Option<&str> {
        self.get(key).and_then(|value| std::str::from_utf8(value).ok())
    }

    /// Returns the NUL-separated UTF-8 forms for `key`.
    fn forms(&self, key: &[u8]) -> Option<Vec<&str>> {
        let value = self.get(key)?;
        value.split(|byte| *byte == PLURAL_SEPARATOR).map(|form| std::str::from_utf8(form).ok()).collect()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
