// crates/po-compiler-core/src/lib.rs
// ============================================================================
// Module: PO Compiler Core Library
// Description: Public API surface for the PO compiler core.
// Purpose: Expose the catalog model, parser, binary codec, and compiler facade.
// Dependencies: crate::{core, interfaces, parser, runtime, tooling}
// ============================================================================

//! ## Overview
//! PO compiler core turns gettext `.po` catalog text into the binary `.mo`
//! lookup table and reports translation progress over the same catalog. It is
//! stateless: every operation builds its own catalog, derives its output, and
//! discards the intermediate state. Delivery of compiled artifacts to storage
//! goes through the [`ArtifactStore`] interface so hosts decide where bytes
//! land.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod parser;
pub mod runtime;
pub mod tooling;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::ArtifactLocation;
pub use interfaces::ArtifactStore;
pub use interfaces::StorageError;
pub use parser::ParseError;
pub use parser::parse;
pub use runtime::CompileError;
pub use runtime::CompileOutput;
pub use runtime::CompilerService;
pub use runtime::DEFAULT_MAX_INPUT_BYTES;
pub use runtime::Delivery;
pub use runtime::DeliveryMode;
pub use runtime::FormatError;
pub use runtime::MO_HEADER_SIZE;
pub use runtime::MO_MAGIC;
pub use runtime::MoTable;
pub use runtime::ValidationReport;
pub use runtime::decode;
pub use runtime::encode;
pub use runtime::flatten;
pub use runtime::summarize;
pub use runtime::validate;
pub use tooling::ToolName;
