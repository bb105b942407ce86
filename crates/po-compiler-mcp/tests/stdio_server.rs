// crates/po-compiler-mcp/tests/stdio_server.rs
// ============================================================================
// Module: Stdio Server Tests
// Description: JSON-RPC lifecycle and framing tests over in-memory streams.
// Purpose: Ensure the stdio transport answers every request exactly once.
// Dependencies: po-compiler-mcp, serde_json
// ============================================================================

//! ## Overview
//! Drives [`McpServer::serve_io`] with newline-delimited and
//! `Content-Length` framed input and checks the protocol surface: lifecycle
//! methods, tool results, error codes, and audit events.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use po_compiler_mcp::MCP_PROTOCOL_VERSION;
use po_compiler_mcp::McpMethod;
use po_compiler_mcp::McpOutcome;
use po_compiler_mcp::McpServer;
use po_compiler_mcp::SERVER_NAME;
use serde_json::Value;
use serde_json::json;

use crate::common::RecordingAuditSink;
use crate::common::RecordingMetrics;
use crate::common::SAMPLE_PO;
use crate::common::rpc;
use crate::common::run_lines;
use crate::common::run_raw;
use crate::common::test_config;
use crate::common::test_server;
use crate::common::tool_call;
use crate::common::tool_text;

#[test]
fn initialize_reports_protocol_and_server_info() {
    let dir = tempfile::tempdir().unwrap();
    let responses = run_lines(&test_server(dir.path()), &[rpc(1, "initialize", json!({}))]);
    assert_eq!(responses.len(), 1);
    let result = &responses[0]["result"];
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(result["protocolVersion"], MCP_PROTOCOL_VERSION);
    assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
    assert_eq!(result["serverInfo"]["version"], env!("CARGO_PKG_VERSION"));
    assert!(result["capabilities"]["tools"].is_object());
}

#[test]
fn notifications_get_no_response() {
    let dir = tempfile::tempdir().unwrap();
    let responses = run_lines(
        &test_server(dir.path()),
        &[
            json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
            json!({ "jsonrpc": "2.0", "method": "initialized" }),
            rpc(2, "ping", Value::Null),
        ],
    );
    assert_eq!(responses, vec![json!({ "jsonrpc": "2.0", "id": 2, "result": {} })]);
}

#[test]
fn tools_list_uses_camel_case_schema_key() {
    let dir = tempfile::tempdir().unwrap();
    let responses = run_lines(&test_server(dir.path()), &[rpc(3, "tools/list", json!({}))]);
    let tools = responses[0]["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 3);
    for tool in tools {
        assert!(tool["inputSchema"].is_object());
        assert!(tool["description"].is_string());
    }
}

#[test]
fn tools_call_returns_json_text_block() {
    let dir = tempfile::tempdir().unwrap();
    let responses = run_lines(
        &test_server(dir.path()),
        &[tool_call(4, "summarize_po", json!({ "po_content": SAMPLE_PO }))],
    );
    let result = &responses[0]["result"];
    assert_eq!(result["isError"], false);
    assert_eq!(result["content"][0]["type"], "text");
    let summary: Value = serde_json::from_str(&tool_text(&responses[0])).unwrap();
    assert_eq!(summary["language"], "es");
    assert_eq!(summary["untranslated"], 1);
}

#[test]
fn compiler_rejection_is_tool_error_result() {
    let dir = tempfile::tempdir().unwrap();
    let responses = run_lines(
        &test_server(dir.path()),
        &[
            tool_call(5, "compile_po", json!({ "po_content": "" })),
            tool_call(6, "validate_po", json!({ "po_content": "msgstr \"x\"" })),
        ],
    );
    assert_eq!(responses[0]["result"]["isError"], true);
    assert_eq!(tool_text(&responses[0]), "empty_input: empty po content");
    assert!(responses[0].get("error").is_none());
    assert_eq!(responses[1]["result"]["isError"], true);
    assert!(tool_text(&responses[1]).starts_with("parse: line 1:"));
}

#[test]
fn protocol_errors_use_json_rpc_codes() {
    let dir = tempfile::tempdir().unwrap();
    let server = test_server(dir.path());
    let output = run_raw(
        &server,
        concat!(
            "{not json\n",
            "{\"jsonrpc\":\"2.0\",\"id\":7}\n",
            "{\"jsonrpc\":\"1.0\",\"id\":8,\"method\":\"ping\"}\n",
            "{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"resources/list\"}\n",
            "{\"jsonrpc\":\"2.0\",\"id\":10,\"method\":\"tools/call\",\"params\":{\"arguments\":{}}}\n",
            "{\"jsonrpc\":\"2.0\",\"id\":11,\"method\":\"tools/call\",\"params\":{\"name\":\"nope\"}}\n",
            "{\"jsonrpc\":\"2.0\",\"id\":12,\"method\":\"tools/call\",\"params\":{\"name\":\"compile_po\",\"arguments\":{}}}\n",
        )
        .as_bytes(),
    );
    let responses: Vec<Value> =
        output.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
    let codes: Vec<(Value, i64)> = responses
        .iter()
        .map(|response| (response["id"].clone(), response["error"]["code"].as_i64().unwrap()))
        .collect();
    assert_eq!(
        codes,
        vec![
            (Value::Null, -32700),
            (json!(7), -32600),
            (json!(8), -32600),
            (json!(9), -32601),
            (json!(10), -32602),
            (json!(11), -32601),
            (json!(12), -32602),
        ]
    );
}

#[test]
fn framed_request_gets_framed_response() {
    let dir = tempfile::tempdir().unwrap();
    let body = rpc(13, "ping", json!({})).to_string();
    let input = format!("Content-Length: {}\r\n\r\n{body}", body.len());
    let output = run_raw(&test_server(dir.path()), input.as_bytes());
    let expected = r#"{"jsonrpc":"2.0","id":13,"result":{}}"#;
    assert_eq!(output, format!("Content-Length: {}\r\n\r\n{expected}", expected.len()));
}

#[test]
fn mixed_framing_on_one_stream() {
    let dir = tempfile::tempdir().unwrap();
    let framed = rpc(14, "ping", json!({})).to_string();
    let input = format!(
        "{}\nContent-Length: {}\r\n\r\n{framed}{}\n",
        rpc(15, "ping", json!({})),
        framed.len(),
        rpc(16, "ping", json!({})),
    );
    let output = run_raw(&test_server(dir.path()), input.as_bytes());
    assert!(output.starts_with("{\"jsonrpc\":\"2.0\",\"id\":15,\"result\":{}}\nContent-Length: "));
    assert!(output.ends_with("{\"jsonrpc\":\"2.0\",\"id\":16,\"result\":{}}\n"));
}

#[test]
fn end_of_input_stops_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(run_raw(&test_server(dir.path()), b""), "");
    assert_eq!(run_raw(&test_server(dir.path()), b"\n\n"), "");
}

#[test]
fn oversized_line_is_rejected_and_stream_continues() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.server.max_body_bytes = 128;
    let server = McpServer::from_config(config).unwrap();
    let big = tool_call(17, "summarize_po", json!({ "po_content": "x".repeat(512) }));
    let responses = run_lines(&server, &[big, rpc(18, "ping", json!({}))]);
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["error"]["code"], -32600);
    assert_eq!(responses[0]["id"], Value::Null);
    assert_eq!(responses[1]["id"], 18);
}

#[test]
fn audit_records_every_message_without_content() {
    let dir = tempfile::tempdir().unwrap();
    let sink = RecordingAuditSink::shared();
    let server = test_server(dir.path()).with_audit_sink(sink.clone());
    run_lines(
        &server,
        &[
            json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
            tool_call(19, "compile_po", json!({ "po_content": SAMPLE_PO })),
            tool_call(20, "compile_po", json!({ "po_content": " " })),
        ],
    );
    let events = sink.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].method, McpMethod::Notification);
    assert_eq!(events[0].response_bytes, 0);
    assert_eq!(events[1].method, McpMethod::ToolsCall);
    assert_eq!(events[1].request_id.as_deref(), Some("19"));
    assert_eq!(events[1].outcome, McpOutcome::Ok);
    assert_eq!(events[2].outcome, McpOutcome::Error);
    assert_eq!(events[2].error_kind, Some("empty_input"));
    for event in &events {
        let line = serde_json::to_string(event).unwrap();
        assert!(line.contains("\"event\":\"mcp_request\""));
        assert!(!line.contains("Hola"));
    }
}

#[test]
fn metrics_see_labels_for_every_message() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = RecordingMetrics::shared();
    let server = test_server(dir.path()).with_metrics(metrics.clone());
    run_lines(
        &server,
        &[
            rpc(21, "ping", json!({})),
            tool_call(22, "summarize_po", json!({ "po_content": SAMPLE_PO })),
            rpc(23, "resources/list", json!({})),
        ],
    );
    let events = metrics.requests();
    assert_eq!(events.len(), 3);
    assert_eq!(metrics.latency_count(), 3);
    let labels: Vec<&str> = events.iter().map(|event| event.method.as_str()).collect();
    assert_eq!(labels, vec!["ping", "tools/call", "other"]);
    assert_eq!(events[1].tool.map(|tool| tool.as_str()), Some("summarize_po"));
    assert_eq!(events[1].outcome.as_str(), "ok");
    assert_eq!(events[2].error_code, Some(-32601));
    assert!(events.iter().all(|event| event.response_bytes > 0));
}
