// crates/po-compiler-contract/src/types.rs
// ============================================================================
// Module: Contract Types
// Description: Shared data models for PO compiler tool contracts.
// Purpose: Provide canonical shapes for MCP tool listings and documentation.
// Dependencies: po-compiler-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Typed contract shapes serialized into `tools/list` responses and rendered
//! into tool documentation.

// ============================================================================
// SECTION: Imports
// ============================================================================

/// Canonical MCP tool names for the PO compiler.
pub use po_compiler_core::ToolName;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Tooling Contracts
// ============================================================================

/// Tool definition used by MCP tool listing.
///
/// # Invariants
/// - `name` is a stable MCP tool identifier.
/// - `input_schema` is a JSON Schema payload for the tool input shape and is
///   serialized as `inputSchema`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// MCP tool name.
    pub name: ToolName,
    /// Tool description for clients.
    pub description: String,
    /// JSON schema for tool input.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Tool contract with full request and response schemas.
///
/// # Invariants
/// - `input_schema` and `output_schema` are JSON Schema payloads.
/// - `examples` align with the schemas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolContract {
    /// Tool name.
    pub name: ToolName,
    /// Tool description.
    pub description: String,
    /// JSON schema for tool input payload.
    pub input_schema: Value,
    /// JSON schema for tool response payload.
    pub output_schema: Value,
    /// Example payloads for documentation.
    pub examples: Vec<ToolExample>,
    /// Notes describing tool usage.
    pub notes: Vec<String>,
}

/// Tool example with input/output payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolExample {
    /// Short example description.
    pub description: String,
    /// Example input payload.
    pub input: Value,
    /// Example output payload.
    pub output: Value,
}
