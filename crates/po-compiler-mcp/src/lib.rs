// crates/po-compiler-mcp/src/lib.rs
// ============================================================================
// Module: PO Compiler MCP Library
// Description: MCP server and tool routing for the PO compiler.
// Purpose: Expose compile, validate, and summarize tools over JSON-RPC.
// Dependencies: po-compiler-config, po-compiler-contract, po-compiler-core
// ============================================================================

//! ## Overview
//! This crate wires the compiler facade into an MCP server. The server speaks
//! JSON-RPC 2.0 over stdio or HTTP, lists tools from the contract crate, and
//! routes calls through [`ToolRouter`]. External delivery writes compiled
//! tables through [`TempFileArtifactStore`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod server;
pub mod storage;
pub mod telemetry;
pub mod tools;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::McpAuditEvent;
pub use audit::McpAuditSink;
pub use audit::McpFileAuditSink;
pub use audit::McpNoopAuditSink;
pub use audit::McpStderrAuditSink;
pub use audit::ServerStartedEvent;
pub use server::MCP_PROTOCOL_VERSION;
pub use server::McpServer;
pub use server::McpServerError;
pub use server::SERVER_NAME;
pub use storage::TempFileArtifactStore;
pub use storage::compiler_service_from_config;
pub use telemetry::McpMethod;
pub use telemetry::McpMetricEvent;
pub use telemetry::McpMetrics;
pub use telemetry::McpOutcome;
pub use telemetry::NoopMetrics;
pub use tools::ToolError;
pub use tools::ToolRouter;
