// crates/po-compiler-contract/src/lib.rs
// ============================================================================
// Module: PO Compiler Contract Library
// Description: Canonical MCP tool contracts for the PO compiler.
// Purpose: Provide the single source of truth for tool listings and docs.
// Dependencies: po-compiler-core, serde, serde_json
// ============================================================================

//! ## Overview
//! The contract library defines the machine-readable MCP tool surface: tool
//! names, input and output JSON schemas, examples, and usage notes. The MCP
//! server lists tools from here and the CLI renders the same contracts as
//! markdown, so the two never drift.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod tooling;
pub mod types;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use tooling::tool_contracts;
pub use tooling::tool_definitions;
pub use tooling::tooling_markdown;
pub use types::ToolContract;
pub use types::ToolDefinition;
pub use types::ToolExample;
pub use types::ToolName;
