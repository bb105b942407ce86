// crates/po-compiler-core/src/parser.rs
// ============================================================================
// Module: PO Parser
// Description: Line-oriented parser for gettext `.po` catalog text.
// Purpose: Build the catalog model consumed by the compiler stages.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The parser walks catalog text one line at a time. Comment lines (including
//! flags and obsolete `#~` entries) are skipped, keyword lines open or extend
//! the pending entry, and bare quoted lines continue the most recent keyword.
//! An entry is committed when the next `msgctxt`/`msgid` starts or at end of
//! input.
//!
//! ## Invariants
//! - Errors carry the 1-based line number where parsing stopped.
//! - The entry with an empty msgid and no context becomes catalog metadata.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

use crate::core::Catalog;
use crate::core::Translation;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Malformed catalog text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line number of the offending input.
    pub line: usize,
    /// Human-readable reason.
    pub message: String,
}

impl ParseError {
    /// Creates a parse error for the given line.
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Parses `.po` text into a [`Catalog`].
///
/// # Errors
///
/// Returns [`ParseError`] for unquoted or unterminated strings, unknown
/// keywords, malformed `msgstr[N]` indices, and keywords out of order.
pub fn parse(text: &str) -> Result<Catalog, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut catalog = Catalog::new();
    let mut pending = PendingEntry::default();
    let mut field: Option<Field> = None;

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if trimmed.starts_with('"') {
            let value = parse_quoted(trimmed, line)?;
            let Some(target) = field else {
                return Err(ParseError::new(line, "continuation string without a keyword"));
            };
            pending.append(target, &value);
            continue;
        }

        let split = trimmed.find(|ch: char| ch.is_whitespace() || ch == '"').unwrap_or(trimmed.len());
        let keyword = &trimmed[.. split];
        let value = parse_quoted(trimmed[split ..].trim_start(), line)?;

        match keyword {
            "msgctxt" => {
                if pending.id.is_some() {
                    std::mem::take(&mut pending).commit(&mut catalog)?;
                } else if pending.context.is_some() {
                    return Err(ParseError::new(line, "duplicate `msgctxt` before msgid"));
                }
                pending.line = line;
                pending.context = Some(value);
                field = Some(Field::Context);
            }
            "msgid" => {
                if pending.id.is_some() {
                    std::mem::take(&mut pending).commit(&mut catalog)?;
                    pending.line = line;
                } else if pending.context.is_none() {
                    pending.line = line;
                }
                pending.id = Some(value);
                field = Some(Field::Id);
            }
            "msgid_plural" => {
                pending.require_id(line, keyword)?;
                pending.plural_id = Some(value);
                field = Some(Field::PluralId);
            }
            "msgstr" => {
                pending.require_id(line, keyword)?;
                pending.insert_form(line, 0, value)?;
                field = Some(Field::Form(0));
            }
            _ => {
                let Some(form_index) = parse_form_index(keyword) else {
                    return Err(ParseError::new(line, format!("unknown keyword `{keyword}`")));
                };
                let form_index = form_index.map_err(|message| ParseError::new(line, message))?;
                pending.require_id(line, "msgstr[N]")?;
                pending.insert_form(line, form_index, value)?;
                field = Some(Field::Form(form_index));
            }
        }
    }

    if pending.id.is_some() || pending.context.is_some() {
        pending.commit(&mut catalog)?;
    }
    Ok(catalog)
}

// ============================================================================
// SECTION: Pending Entry
// ============================================================================

/// Keyword targeted by continuation strings.
#[derive(Debug, Clone, Copy)]
enum Field {
    /// `msgctxt`.
    Context,
    /// `msgid`.
    Id,
    /// `msgid_plural`.
    PluralId,
    /// `msgstr` / `msgstr[N]`.
    Form(u32),
}

/// Entry under construction.
#[derive(Debug, Default)]
struct PendingEntry {
    /// Line where the entry started.
    line: usize,
    /// Context tag.
    context: Option<String>,
    /// Singular message id.
    id: Option<String>,
    /// Plural message id.
    plural_id: Option<String>,
    /// Translated forms by plural index.
    forms: BTreeMap<u32, String>,
}

impl PendingEntry {
    /// Appends continuation text to the targeted field.
    fn append(&mut self, field: Field, value: &str) {
        let slot = match field {
            Field::Context => self.context.get_or_insert_with(String::new),
            Field::Id => self.id.get_or_insert_with(String::new),
            Field::PluralId => self.plural_id.get_or_insert_with(String::new),
            Field::Form(index) => self.forms.entry(index).or_default(),
        };
        slot.push_str(value);
    }

    /// Fails when a keyword appears before the entry's `msgid`.
    fn require_id(&self, line: usize, keyword: &str) -> Result<(), ParseError> {
        if self.id.is_none() {
            return Err(ParseError::new(line, format!("`{keyword}` without a preceding msgid")));
        }
        Ok(())
    }

    /// Stores a translated form; each index may appear once per entry.
    fn insert_form(&mut self, line: usize, index: u32, value: String) -> Result<(), ParseError> {
        match self.forms.entry(index) {
            Entry::Occupied(_) => {
                Err(ParseError::new(line, format!("duplicate msgstr for form {index}")))
            }
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
        }
    }

    /// Moves the entry into the catalog.
    fn commit(self, catalog: &mut Catalog) -> Result<(), ParseError> {
        let Some(id) = self.id else {
            return Err(ParseError::new(self.line, "entry is missing msgid"));
        };
        let context = self.context.filter(|context| !context.is_empty());
        if id.is_empty() && context.is_none() {
            catalog.set_metadata(self.forms.get(&0).cloned().unwrap_or_default());
            return Ok(());
        }
        let mut translation = Translation::plural(id, self.plural_id.unwrap_or_default());
        translation.forms = self.forms;
        catalog.insert(context.as_deref(), translation);
        Ok(())
    }
}

// ============================================================================
// SECTION: Lexing Helpers
// ============================================================================

/// Parses the index of a `msgstr[N]` keyword.
///
/// Returns `None` when the keyword is not a `msgstr[...]` form at all.
fn parse_form_index(keyword: &str) -> Option<Result<u32, String>> {
    let inner = keyword.strip_prefix("msgstr[")?;
    let Some(digits) = inner.strip_suffix(']') else {
        return Some(Err(format!("malformed plural index in `{keyword}`")));
    };
    Some(
        digits
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("malformed plural index in `{keyword}`")),
    )
}

/// Parses a double-quoted string, resolving escape sequences.
fn parse_quoted(input: &str, line: usize) -> Result<String, ParseError> {
    let mut chars = input.chars().peekable();
    if chars.next() != Some('"') {
        return Err(ParseError::new(line, "expected a quoted string"));
    }
    let mut bytes = Vec::with_capacity(input.len());
    loop {
        match chars.next() {
            None => return Err(ParseError::new(line, "unterminated string")),
            Some('"') => break,
            Some('\\') => unescape_into(&mut bytes, &mut chars, line)?,
            Some(ch) => push_char(&mut bytes, ch),
        }
    }
    if chars.any(|ch| !ch.is_whitespace()) {
        return Err(ParseError::new(line, "unexpected text after closing quote"));
    }
    String::from_utf8(bytes).map_err(|_| ParseError::new(line, "escaped bytes are not valid UTF-8"))
}

/// Resolves one escape sequence following a backslash.
fn unescape_into(
    bytes: &mut Vec<u8>,
    chars: &mut Peekable<Chars<'_>>,
    line: usize,
) -> Result<(), ParseError> {
    let Some(ch) = chars.next() else {
        return Err(ParseError::new(line, "unterminated string"));
    };
    match ch {
        'n' => bytes.push(b'\n'),
        't' => bytes.push(b'\t'),
        'r' => bytes.push(b'\r'),
        'a' => bytes.push(0x07),
        'b' => bytes.push(0x08),
        'f' => bytes.push(0x0c),
        'v' => bytes.push(0x0b),
        '"' => bytes.push(b'"'),
        '\\' => bytes.push(b'\\'),
        '0' ..= '7' => {
            let mut value = ch.to_digit(8).unwrap_or(0);
            for _ in 0 .. 2 {
                match chars.peek().and_then(|next| next.to_digit(8)) {
                    Some(digit) => {
                        value = value * 8 + digit;
                        chars.next();
                    }
                    None => break,
                }
            }
            let byte = u8::try_from(value)
                .map_err(|_| ParseError::new(line, "octal escape out of range"))?;
            bytes.push(byte);
        }
        'x' => {
            let mut value = 0u32;
            let mut digits = 0;
            while digits < 2 {
                match chars.peek().and_then(|next| next.to_digit(16)) {
                    Some(digit) => {
                        value = value * 16 + digit;
                        digits += 1;
                        chars.next();
                    }
                    None => break,
                }
            }
            if digits == 0 {
                bytes.extend_from_slice(b"\\x");
            } else {
                let byte = u8::try_from(value)
                    .map_err(|_| ParseError::new(line, "hex escape out of range"))?;
                bytes.push(byte);
            }
        }
        other => {
            bytes.push(b'\\');
            push_char(bytes, other);
        }
    }
    Ok(())
}

/// Appends the UTF-8 encoding of `ch`.
fn push_char(bytes: &mut Vec<u8>, ch: char) {
    let mut buf = [0u8; 4];
    bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
}

// ============================================================================
// SECTION: Tests
// ============================================================================
