// crates/po-compiler-core/src/tooling.rs
// ============================================================================
// Module: Tooling Identifiers
// Description: Canonical MCP tool identifiers for the PO compiler.
// Purpose: Shared tool naming across contracts, the server, and the CLI.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Canonical tool identifiers used by the PO compiler MCP server.
//! These names are part of the external contract surface.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Canonical tool names for the PO compiler MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    /// Compile catalog text into a binary table.
    CompilePo,
    /// Report structural warnings and progress for catalog text.
    ValidatePo,
    /// Report translation progress for catalog text.
    SummarizePo,
}

impl ToolName {
    /// Returns the canonical string name for the tool.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CompilePo => "compile_po",
            Self::ValidatePo => "validate_po",
            Self::SummarizePo => "summarize_po",
        }
    }

    /// Returns all tool names in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::CompilePo, Self::ValidatePo, Self::SummarizePo]
    }

    /// Parses a tool name from its string representation.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "compile_po" => Some(Self::CompilePo),
            "validate_po" => Some(Self::ValidatePo),
            "summarize_po" => Some(Self::SummarizePo),
            _ => None,
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
