// crates/po-compiler-core/tests/parser.rs
// ============================================================================
// Module: PO Parser Tests
// Description: Integration tests for catalog text parsing.
// Purpose: Validate multiline strings, comments, plurals, contexts, and errors.
// ============================================================================

//! PO parser integration tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use po_compiler_core::parse;

#[test]
fn multiline_strings_are_concatenated() {
    let catalog = parse(
        "msgid \"\"\n\"Long \"\n\"message\"\nmsgstr \"\"\n\"Mensaje \"\n\"largo\"\n",
    )
    .unwrap();
    let translation = catalog.translations.get("Long message").unwrap();
    assert_eq!(translation.form(0), Some("Mensaje largo"));
}

#[test]
fn comments_and_flags_are_skipped() {
    let catalog = parse(
        "# translator comment\n#. extracted\n#: src/main.rs:10\n#, fuzzy, c-format\nmsgid \"Hi\"\nmsgstr \"Hola\"\n\n#~ msgid \"Old\"\n#~ msgstr \"Viejo\"\n",
    )
    .unwrap();
    assert_eq!(catalog.content_len(), 1);
    assert!(catalog.translations.contains_key("Hi"));
}

#[test]
fn sparse_plural_indices_are_kept() {
    let catalog = parse("msgid \"day\"\nmsgid_plural \"days\"\nmsgstr[0] \"dia\"\nmsgstr[2] \"dias\"\n").unwrap();
    let translation = catalog.translations.get("day").unwrap();
    assert_eq!(translation.plural_id, "days");
    assert_eq!(translation.dense_forms(), vec!["dia", "", "dias"]);
}

#[test]
fn context_entries_are_scoped() {
    let catalog = parse(
        "msgctxt \"menu\"\nmsgid \"Open\"\nmsgstr \"Abrir\"\n\nmsgid \"Open\"\nmsgstr \"Abierto\"\n",
    )
    .unwrap();
    assert_eq!(catalog.translations.get("Open").unwrap().form(0), Some("Abierto"));
    assert_eq!(catalog.contexts.get("menu").unwrap().get("Open").unwrap().form(0), Some("Abrir"));
}

#[test]
fn empty_context_is_plain() {
    let catalog = parse("msgctxt \"\"\nmsgid \"Open\"\nmsgstr \"Abrir\"\n").unwrap();
    assert!(catalog.contexts.is_empty());
    assert!(catalog.translations.contains_key("Open"));
}

#[test]
fn later_duplicate_wins() {
    let catalog = parse("msgid \"A\"\nmsgstr \"one\"\n\nmsgid \"A\"\nmsgstr \"two\"\n").unwrap();
    assert_eq!(catalog.content_len(), 1);
    assert_eq!(catalog.translations.get("A").unwrap().form(0), Some("two"));
}

#[test]
fn entries_without_blank_separator_are_split() {
    let catalog = parse("msgid \"A\"\nmsgstr \"a\"\nmsgid \"B\"\nmsgstr \"b\"\n").unwrap();
    assert_eq!(catalog.content_len(), 2);
}

#[test]
fn crlf_line_endings_are_accepted() {
    let catalog = parse("msgid \"A\"\r\nmsgstr \"a\"\r\n").unwrap();
    assert_eq!(catalog.translations.get("A").unwrap().form(0), Some("a"));
}

#[test]
fn unknown_keyword_reports_line() {
    let err = parse("msgid \"A\"\nmsgstr \"a\"\n\nmsgfoo \"x\"\n").unwrap_err();
    assert_eq!(err.line, 4);
    assert!(err.message.contains("msgfoo"));
}

#[test]
fn unterminated_string_reports_line() {
    let err = parse("msgid \"A\"\nmsgstr \"a\n").unwrap_err();
    assert_eq!(err.line, 2);
}

#[test]
fn unquoted_value_is_rejected() {
    let err = parse("msgid A\n").unwrap_err();
    assert_eq!(err.line, 1);
}

#[test]
fn malformed_plural_index_is_rejected() {
    let err = parse("msgid \"a\"\nmsgid_plural \"b\"\nmsgstr[x] \"c\"\n").unwrap_err();
    assert_eq!(err.line, 3);
}

#[test]
fn orphan_continuation_is_rejected() {
    let err = parse("\"dangling\"\n").unwrap_err();
    assert_eq!(err.line, 1);
}

#[test]
fn msgstr_without_msgid_is_rejected() {
    let err = parse("msgstr \"a\"\n").unwrap_err();
    assert_eq!(err.line, 1);
}

#[test]
fn context_without_msgid_is_rejected() {
    let err = parse("msgid \"A\"\nmsgstr \"a\"\n\nmsgctxt \"menu\"\n").unwrap_err();
    assert_eq!(err.line, 4);
    assert!(err.message.contains("missing msgid"));
}

#[test]
fn repeated_msgstr_is_rejected() {
    let err = parse("msgid \"A\"\nmsgstr \"a\"\nmsgstr \"b\"\n").unwrap_err();
    assert_eq!(err.line, 3);
    assert!(err.message.contains("duplicate msgstr"));
}

#[test]
fn repeated_plural_form_is_rejected() {
    let err =
        parse("msgid \"a\"\nmsgid_plural \"b\"\nmsgstr[1] \"c\"\nmsgstr[1] \"d\"\n").unwrap_err();
    assert_eq!(err.line, 4);
}

#[test]
fn repeated_msgctxt_before_msgid_is_rejected() {
    let err = parse("msgctxt \"menu\"\nmsgctxt \"toolbar\"\nmsgid \"Open\"\nmsgstr \"Abrir\"\n")
        .unwrap_err();
    assert_eq!(err.line, 2);
    assert!(err.message.contains("msgctxt"));
}
