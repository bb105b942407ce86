// crates/po-compiler-mcp/src/telemetry.rs
// ============================================================================
// Module: MCP Telemetry
// Description: Request counters and latency hooks for the compiler server.
// Purpose: Let embedders export request metrics without extra dependencies.
// Dependencies: po-compiler-config, po-compiler-contract
// ============================================================================

//! ## Overview
//! Every handled JSON-RPC message produces one [`McpMetricEvent`], passed to
//! [`McpMetrics::record_request`] and then [`McpMetrics::record_latency`].
//! The server defaults to [`NoopMetrics`]; embedders install their own sink
//! with [`crate::McpServer::with_metrics`]. Events carry labels and sizes only,
//! never catalog text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use po_compiler_config::ServerTransport;
use po_compiler_contract::ToolName;
use serde::Serialize;

// ============================================================================
// SECTION: Labels
// ============================================================================

/// Method label attached to metric and audit events.
///
/// # Invariants
/// - Labels returned by [`McpMethod::as_str`] never change between releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum McpMethod {
    /// `initialize`.
    Initialize,
    /// `ping`.
    Ping,
    /// `tools/list`.
    ToolsList,
    /// `tools/call`.
    ToolsCall,
    /// `initialized` or any `notifications/*` message.
    Notification,
    /// Payload that was not a usable JSON-RPC request.
    Invalid,
    /// Well-formed request naming an unknown method.
    Other,
}

impl McpMethod {
    /// Maps a JSON-RPC method name onto its label.
    #[must_use]
    pub fn classify(method: &str) -> Self {
        match method {
            "initialize" => Self::Initialize,
            "ping" => Self::Ping,
            "tools/list" => Self::ToolsList,
            "tools/call" => Self::ToolsCall,
            "initialized" => Self::Notification,
            other if other.starts_with("notifications/") => Self::Notification,
            _ => Self::Other,
        }
    }

    /// Label string for exporters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Ping => "ping",
            Self::ToolsList => "tools/list",
            Self::ToolsCall => "tools/call",
            Self::Notification => "notification",
            Self::Invalid => "invalid",
            Self::Other => "other",
        }
    }
}

/// Whether a message was answered successfully.
///
/// Tool results flagged `isError` count as [`McpOutcome::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum McpOutcome {
    /// Answered with a result, or a notification that needed no answer.
    Ok,
    /// Answered with a JSON-RPC error or an error tool result.
    Error,
}

impl McpOutcome {
    /// Label string for exporters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// One handled message as seen by a metrics sink.
#[derive(Debug, Clone)]
pub struct McpMetricEvent {
    /// Transport that carried the message.
    pub transport: ServerTransport,
    /// Method label.
    pub method: McpMethod,
    /// Tool invoked by `tools/call`, if it named a known tool.
    pub tool: Option<ToolName>,
    /// Outcome label.
    pub outcome: McpOutcome,
    /// JSON-RPC error code, if the answer was an error.
    pub error_code: Option<i64>,
    /// Tool or compiler error kind, if any.
    pub error_kind: Option<&'static str>,
    /// Bytes received.
    pub request_bytes: usize,
    /// Bytes written back; zero for notifications.
    pub response_bytes: usize,
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Receiver for per-message metric events.
pub trait McpMetrics: Send + Sync {
    /// Counts one handled message.
    fn record_request(&self, event: McpMetricEvent);
    /// Observes how long the message took to handle.
    fn record_latency(&self, event: McpMetricEvent, latency: Duration);
}

/// Sink that drops every event.
pub struct NoopMetrics;

impl McpMetrics for NoopMetrics {
    fn record_request(&self, _event: McpMetricEvent) {}

    fn record_latency(&self, _event: McpMetricEvent, _latency: Duration) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::McpMethod;
    use super::McpOutcome;

    #[test]
    fn classify_maps_known_methods_and_notifications() {
        assert_eq!(McpMethod::classify("tools/call"), McpMethod::ToolsCall);
        assert_eq!(McpMethod::classify("initialized"), McpMethod::Notification);
        assert_eq!(McpMethod::classify("notifications/cancelled"), McpMethod::Notification);
        assert_eq!(McpMethod::classify("resources/list"), McpMethod::Other);
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(McpMethod::ToolsList.as_str(), "tools/list");
        assert_eq!(McpMethod::Invalid.as_str(), "invalid");
        assert_eq!(McpOutcome::Error.as_str(), "error");
    }
}
