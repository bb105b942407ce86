// crates/po-compiler-mcp/tests/http_server.rs
// ============================================================================
// Module: HTTP Server Tests
// Description: JSON-RPC over HTTP against a live loopback listener.
// Purpose: Ensure the HTTP transport shares dispatch with stdio.
// Dependencies: po-compiler-mcp, reqwest, tokio
// ============================================================================

//! ## Overview
//! Binds the server to an ephemeral loopback port and issues real HTTP
//! requests against `/rpc`.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::net::SocketAddr;

use po_compiler_mcp::McpServer;
use serde_json::Value;
use serde_json::json;
use tokio::task::JoinHandle;

use crate::common::RecordingAuditSink;
use crate::common::SAMPLE_PO;
use crate::common::rpc;
use crate::common::test_config;
use crate::common::test_server;
use crate::common::tool_call;
use crate::common::tool_text;

async fn spawn_server(dir: &std::path::Path) -> (SocketAddr, JoinHandle<()>) {
    spawn(test_server(dir)).await
}

async fn spawn(server: McpServer) -> (SocketAddr, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let _ = server.serve_listener(listener).await;
    });
    (addr, handle)
}

#[tokio::test(flavor = "multi_thread")]
async fn http_initialize_and_tool_call() {
    let dir = tempfile::tempdir().unwrap();
    let (addr, handle) = spawn_server(dir.path()).await;
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/rpc");

    let response = client.post(&url).json(&rpc(1, "initialize", json!({}))).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["result"]["serverInfo"]["name"], "po-compiler");

    let response = client
        .post(&url)
        .json(&tool_call(2, "validate_po", json!({ "po_content": SAMPLE_PO })))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    let report: Value = serde_json::from_str(&tool_text(&body)).unwrap();
    assert_eq!(report["warnings"], json!(["untranslated entry: Untranslated"]));
    handle.abort();
}

#[tokio::test(flavor = "multi_thread")]
async fn http_notification_is_accepted_without_body() {
    let dir = tempfile::tempdir().unwrap();
    let (addr, handle) = spawn_server(dir.path()).await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/rpc"))
        .json(&json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 202);
    assert!(response.text().await.unwrap().is_empty());
    handle.abort();
}

#[tokio::test(flavor = "multi_thread")]
async fn http_malformed_body_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let (addr, handle) = spawn_server(dir.path()).await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/rpc"))
        .header("content-type", "application/json")
        .body("{oops")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32700);
    assert_eq!(body["id"], Value::Null);
    handle.abort();
}

#[tokio::test(flavor = "multi_thread")]
async fn http_oversized_body_is_json_rpc_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.server.max_body_bytes = 64;
    let audit = RecordingAuditSink::shared();
    let server = McpServer::from_config(config).unwrap().with_audit_sink(audit.clone());
    let (addr, handle) = spawn(server).await;
    let request = rpc(3, "ping", json!({ "padding": "x".repeat(200) }));
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/rpc"))
        .json(&request)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 413);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["error"]["code"], -32600);
    assert_eq!(body["error"]["message"], "request body too large");
    let events = audit.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].error_code, Some(-32600));
    assert!(events[0].request_bytes > 64);
    handle.abort();
}
