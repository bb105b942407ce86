// crates/po-compiler-mcp/src/tools.rs
// ============================================================================
// Module: MCP Tool Router
// Description: Typed dispatch from MCP tool calls to the compiler service.
// Purpose: Decode tool arguments, invoke the compiler, and encode results.
// Dependencies: po-compiler-contract, po-compiler-core, serde, serde_json
// ============================================================================

//! ## Overview
//! [`ToolRouter`] maps the three tool names onto [`CompilerService`]
//! operations. Arguments are decoded into typed requests; a malformed payload
//! is an invalid-params error, while a catalog that fails to compile is a
//! domain error the server reports as a tool error result.

// ============================================================================
// SECTION: Imports
// ============================================================================

use po_compiler_contract::ToolDefinition;
use po_compiler_contract::ToolName;
use po_compiler_contract::tool_definitions;
use po_compiler_core::CompileError;
use po_compiler_core::CompilerService;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Arguments for `compile_po`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompilePoRequest {
    /// Catalog text.
    pub po_content: String,
    /// Delivery mode label (`base64`, `inline`, `path`, `external`).
    #[serde(default, rename = "return")]
    pub return_mode: Option<String>,
}

/// Arguments for `validate_po` and `summarize_po`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoContentRequest {
    /// Catalog text.
    pub po_content: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Tool routing errors.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool name not recognized.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    /// Tool payload deserialization failed.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    /// The compiler rejected the catalog.
    #[error("{0}")]
    Compile(#[from] CompileError),
    /// Tool payload serialization failed.
    #[error("serialization failure: {0}")]
    Serialization(String),
}

impl ToolError {
    /// Returns a stable label for the error category.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownTool(_) => "unknown_tool",
            Self::InvalidParams(_) => "invalid_params",
            Self::Compile(err) => err.kind(),
            Self::Serialization(_) => "serialization",
        }
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Routes tool calls to the compiler service.
#[derive(Debug, Clone, Default)]
pub struct ToolRouter {
    /// Compiler facade.
    service: CompilerService,
}

impl ToolRouter {
    /// Creates a router over the given service.
    #[must_use]
    pub const fn new(service: CompilerService) -> Self {
        Self {
            service,
        }
    }

    /// Returns the compiler service.
    #[must_use]
    pub const fn service(&self) -> &CompilerService {
        &self.service
    }

    /// Lists the tool definitions advertised by `tools/list`.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    /// Handles a tool call by name with JSON arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when the tool is unknown, the arguments do not
    /// decode, or the compiler rejects the catalog.
    pub fn handle_tool_call(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let tool = ToolName::parse(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        match tool {
            ToolName::CompilePo => {
                let request: CompilePoRequest = decode(arguments)?;
                let mode = self.service.resolve_mode(request.return_mode.as_deref());
                encode(&self.service.compile(&request.po_content, mode)?)
            }
            ToolName::ValidatePo => {
                let request: PoContentRequest = decode(arguments)?;
                encode(&self.service.validate(&request.po_content)?)
            }
            ToolName::SummarizePo => {
                let request: PoContentRequest = decode(arguments)?;
                encode(&self.service.summarize(&request.po_content)?)
            }
        }
    }
}

/// Decodes a JSON value into a typed request payload.
fn decode<T: for<'de> Deserialize<'de>>(payload: Value) -> Result<T, ToolError> {
    let payload = if payload.is_null() { Value::Object(serde_json::Map::new()) } else { payload };
    serde_json::from_value(payload).map_err(|err| ToolError::InvalidParams(err.to_string()))
}

/// Encodes a typed response payload as JSON.
fn encode<T: Serialize>(response: &T) -> Result<Value, ToolError> {
    serde_json::to_value(response).map_err(|err| ToolError::Serialization(err.to_string()))
}
