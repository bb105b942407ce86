// crates/po-compiler-cli/src/lib.rs
// ============================================================================
// Module: PO Compiler CLI Library
// Description: Shared helpers for the `po-compiler` binary.
// Purpose: Expose the CLI message catalog to the binary and its tests.
// Dependencies: Standard library only.
// ============================================================================

//! ## Overview
//! The binary routes every user-facing string through [`t!`], backed by the
//! catalog in [`i18n`].

pub mod i18n;
