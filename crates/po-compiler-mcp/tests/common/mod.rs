// crates/po-compiler-mcp/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared fixtures for MCP router and server tests.
// Purpose: Provide sample catalogs, configs, and recording sinks.
// Dependencies: po-compiler-config, po-compiler-mcp
// ============================================================================

//! ## Overview
//! Shared helpers for building servers against a temporary output directory
//! and driving the stdio transport with in-memory streams.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use po_compiler_config::PoCompilerConfig;
use po_compiler_mcp::McpAuditEvent;
use po_compiler_mcp::McpAuditSink;
use po_compiler_mcp::McpMetricEvent;
use po_compiler_mcp::McpMetrics;
use po_compiler_mcp::McpServer;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Spanish catalog with one untranslated entry.
pub const SAMPLE_PO: &str = r#"# Spanish translations
msgid ""
msgstr ""
"Language: es\n"
"Plural-Forms: nplurals=2; plural=(n != 1);\n"

msgid "Hello"
msgstr "Hola"

msgctxt "menu"
msgid "File"
msgstr "Archivo"

msgid "apple"
msgid_plural "apples"
msgstr[0] "manzana"
msgstr[1] "manzanas"

msgid "Untranslated"
msgstr ""
"#;

/// Config writing artifacts into `dir` with audit logging disabled.
pub fn test_config(dir: &Path) -> PoCompilerConfig {
    let mut config = PoCompilerConfig::default();
    config.compiler.output_dir = Some(dir.to_string_lossy().into_owned());
    config.audit.enabled = false;
    config
}

/// Server built from [`test_config`].
pub fn test_server(dir: &Path) -> McpServer {
    McpServer::from_config(test_config(dir)).expect("server config")
}

/// Builds a JSON-RPC request.
pub fn rpc(id: u64, method: &str, params: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params })
}

/// Builds a `tools/call` request.
pub fn tool_call(id: u64, name: &str, arguments: Value) -> Value {
    rpc(id, "tools/call", json!({ "name": name, "arguments": arguments }))
}

/// Feeds raw stdio input to the server and returns the raw output.
pub fn run_raw(server: &McpServer, input: &[u8]) -> String {
    let mut output = Vec::new();
    server.serve_io(Cursor::new(input.to_vec()), &mut output).expect("serve io");
    String::from_utf8(output).expect("utf-8 output")
}

/// Sends newline-delimited messages and parses each response line.
pub fn run_lines(server: &McpServer, messages: &[Value]) -> Vec<Value> {
    let mut input = String::new();
    for message in messages {
        input.push_str(&message.to_string());
        input.push('\n');
    }
    run_raw(server, input.as_bytes())
        .lines()
        .map(|line| serde_json::from_str(line).expect("json response"))
        .collect()
}

/// Decodes the JSON text block of a `tools/call` result.
pub fn tool_text(response: &Value) -> String {
    response["result"]["content"][0]["text"].as_str().expect("text content").to_string()
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink that keeps events in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Recorded events.
    events: Mutex<Vec<McpAuditEvent>>,
}

impl RecordingAuditSink {
    /// Creates a shared sink.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns a snapshot of recorded events.
    pub fn events(&self) -> Vec<McpAuditEvent> {
        self.events.lock().expect("audit lock").clone()
    }
}

impl McpAuditSink for RecordingAuditSink {
    fn record(&self, event: &McpAuditEvent) {
        self.events.lock().expect("audit lock").push(event.clone());
    }
}

// ============================================================================
// SECTION: Metrics
// ============================================================================

/// Metrics sink that keeps request events and counts latency observations.
#[derive(Default)]
pub struct RecordingMetrics {
    /// Events passed to `record_request`.
    requests: Mutex<Vec<McpMetricEvent>>,
    /// Number of latency observations.
    latencies: Mutex<usize>,
}

impl RecordingMetrics {
    /// Creates a shared sink.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns a snapshot of recorded request events.
    pub fn requests(&self) -> Vec<McpMetricEvent> {
        self.requests.lock().expect("metrics lock").clone()
    }

    /// Returns the number of latency observations.
    pub fn latency_count(&self) -> usize {
        *self.latencies.lock().expect("metrics lock")
    }
}

impl McpMetrics for RecordingMetrics {
    fn record_request(&self, event: McpMetricEvent) {
        self.requests.lock().expect("metrics lock").push(event);
    }

    fn record_latency(&self, _event: McpMetricEvent, _latency: Duration) {
        *self.latencies.lock().expect("metrics lock") += 1;
    }
}
