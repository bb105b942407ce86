// crates/po-compiler-core/src/runtime/mod.rs
// ============================================================================
// Module: PO Compiler Runtime
// Description: Flattener, binary codec, metrics, and the compiler facade.
// Purpose: Turn parsed catalogs into binary tables and progress reports.
// Dependencies: crate::{core, interfaces, parser}, base64
// ============================================================================

//! ## Overview
//! Runtime modules implement the compile pipeline (flatten, encode, deliver)
//! and the read-only reports (summarize, validate). Every external surface
//! calls into [`CompilerService`] so the MCP server and the CLI share one code
//! path.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod codec;
pub mod compiler;
pub mod flatten;
pub mod metrics;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use codec::FormatError;
pub use codec::MO_HEADER_SIZE;
pub use codec::MO_MAGIC;
pub use codec::MoTable;
pub use codec::decode;
pub use codec::encode;
pub use compiler::CompileError;
pub use compiler::CompileOutput;
pub use compiler::CompilerService;
pub use compiler::DEFAULT_MAX_INPUT_BYTES;
pub use compiler::Delivery;
pub use compiler::DeliveryMode;
pub use flatten::flatten;
pub use metrics::ValidationReport;
pub use metrics::summarize;
pub use metrics::validate;
