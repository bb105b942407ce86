// crates/po-compiler-mcp/src/server.rs
// ============================================================================
// Module: MCP Server
// Description: MCP server implementations for stdio and HTTP transports.
// Purpose: Expose the PO compiler tools via JSON-RPC 2.0.
// Dependencies: po-compiler-config, po-compiler-core, axum, tokio
// ============================================================================

//! ## Overview
//! The MCP server exposes the compiler tools using JSON-RPC 2.0 and always
//! routes calls through [`crate::tools::ToolRouter`]. The stdio transport
//! accepts newline-delimited messages and `Content-Length` framed messages on
//! the same stream, answering each in the framing it arrived with. The HTTP
//! transport accepts `POST /rpc`.
//!
//! Security posture: request bodies are untrusted and bounded by
//! `server.max_body_bytes`; HTTP binds to loopback unless explicitly opted in.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::BufRead;
use std::io::Read;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::DefaultBodyLimit;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::CONTENT_LENGTH;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::post;
use po_compiler_config::PoCompilerConfig;
use po_compiler_config::ServerTransport;
use po_compiler_contract::ToolDefinition;
use po_compiler_contract::ToolName;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::audit::McpAuditEvent;
use crate::audit::McpAuditEventParams;
use crate::audit::McpAuditSink;
use crate::audit::ServerStartedEvent;
use crate::audit::audit_sink_from_config;
use crate::storage::compiler_service_from_config;
use crate::telemetry::McpMethod;
use crate::telemetry::McpMetricEvent;
use crate::telemetry::McpMetrics;
use crate::telemetry::McpOutcome;
use crate::telemetry::NoopMetrics;
use crate::tools::ToolError;
use crate::tools::ToolRouter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// MCP protocol revision reported by `initialize`.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
/// Server name reported by `initialize`.
pub const SERVER_NAME: &str = "po-compiler";

/// JSON-RPC parse error code.
const CODE_PARSE_ERROR: i64 = -32700;
/// JSON-RPC invalid request code.
const CODE_INVALID_REQUEST: i64 = -32600;
/// JSON-RPC method not found code.
const CODE_METHOD_NOT_FOUND: i64 = -32601;
/// JSON-RPC invalid params code.
const CODE_INVALID_PARAMS: i64 = -32602;
/// JSON-RPC internal error code.
const CODE_INTERNAL_ERROR: i64 = -32603;

/// Response used when the response envelope itself cannot be serialized.
const SERIALIZATION_FAILED_PAYLOAD: &[u8] =
    br#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"serialization failed"}}"#;

// ============================================================================
// SECTION: MCP Server
// ============================================================================

/// MCP server instance.
pub struct McpServer {
    /// Server configuration.
    config: PoCompilerConfig,
    /// Shared dispatch state.
    state: ServerState,
}

impl McpServer {
    /// Builds a new MCP server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when the configuration is invalid or the
    /// audit log cannot be opened.
    pub fn from_config(config: PoCompilerConfig) -> Result<Self, McpServerError> {
        config.validate().map_err(|err| McpServerError::Config(err.to_string()))?;
        let service = compiler_service_from_config(&config.compiler);
        let audit = audit_sink_from_config(&config.audit)
            .map_err(|err| McpServerError::Init(format!("audit log: {err}")))?;
        let state = ServerState {
            router: ToolRouter::new(service),
            max_body_bytes: config.server.max_body_bytes,
            audit,
            metrics: Arc::new(NoopMetrics),
        };
        Ok(Self {
            config,
            state,
        })
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn McpAuditSink>) -> Self {
        self.state.audit = audit;
        self
    }

    /// Replaces the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn McpMetrics>) -> Self {
        self.state.metrics = metrics;
        self
    }

    /// Returns the tool router.
    #[must_use]
    pub const fn router(&self) -> &ToolRouter {
        &self.state.router
    }

    /// Serves requests using the configured transport.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when the server fails.
    pub async fn serve(self) -> Result<(), McpServerError> {
        match self.config.server.transport {
            ServerTransport::Stdio => {
                self.state.audit.record_started(&ServerStartedEvent::new(ServerTransport::Stdio, None));
                self.serve_io(io::stdin().lock(), io::stdout().lock())
            }
            ServerTransport::Http => {
                let bind = self
                    .config
                    .server
                    .bind
                    .as_deref()
                    .ok_or_else(|| McpServerError::Config("bind address required".to_string()))?;
                let addr: SocketAddr = bind
                    .trim()
                    .parse()
                    .map_err(|_| McpServerError::Config("invalid bind address".to_string()))?;
                let listener = tokio::net::TcpListener::bind(addr)
                    .await
                    .map_err(|err| McpServerError::Transport(format!("http bind failed: {err}")))?;
                self.serve_listener(listener).await
            }
        }
    }

    /// Serves JSON-RPC messages from `reader`, writing responses to `writer`.
    ///
    /// Returns when the reader reaches end of input between messages.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError::Transport`] when the stream breaks mid-message
    /// or a `Content-Length` header is malformed.
    pub fn serve_io<R: BufRead, W: Write>(
        &self,
        mut reader: R,
        mut writer: W,
    ) -> Result<(), McpServerError> {
        let context = RequestContext::stdio();
        loop {
            let (framing, payload) = match read_message(&mut reader, self.state.max_body_bytes)? {
                Inbound::Closed => return Ok(()),
                Inbound::Message {
                    payload,
                    framing,
                } => (framing, self.state.handle_payload(&context, &payload).1),
                Inbound::Oversized {
                    bytes,
                    framing,
                } => (framing, self.state.reject_oversized(&context, bytes).1),
            };
            if let Some(payload) = payload {
                match framing {
                    Framing::Line => write_line(&mut writer, &payload)?,
                    Framing::ContentLength => write_framed(&mut writer, &payload)?,
                }
            }
        }
    }

    /// Serves JSON-RPC requests over HTTP on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError::Transport`] when the HTTP server fails.
    pub async fn serve_listener(
        self,
        listener: tokio::net::TcpListener,
    ) -> Result<(), McpServerError> {
        let bind = listener.local_addr().ok().map(|addr| addr.to_string());
        self.state.audit.record_started(&ServerStartedEvent::new(ServerTransport::Http, bind));
        let max_body_bytes = self.state.max_body_bytes;
        let app = Router::new()
            .route("/rpc", post(handle_http))
            .layer(DefaultBodyLimit::max(max_body_bytes))
            .with_state(Arc::new(self.state));
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|err| McpServerError::Transport(format!("http server failed: {err}")))
    }
}

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// Handles HTTP JSON-RPC requests.
///
/// Bodies over the limit are answered as JSON-RPC errors like any other
/// rejected request.
async fn handle_http(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let context = RequestContext::http(peer);
    let (status, payload) = match body {
        Ok(bytes) => state.handle_payload(&context, &bytes),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            let declared = headers
                .get(CONTENT_LENGTH)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or_else(|| state.max_body_bytes.saturating_add(1));
            state.reject_oversized(&context, declared)
        }
        Err(_) => state.handle_payload(&context, &[]),
    };
    match payload {
        Some(body) => (status, [(CONTENT_TYPE, "application/json")], body).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

// ============================================================================
// SECTION: Dispatch State
// ============================================================================

/// Shared server state for all transports.
#[derive(Clone)]
struct ServerState {
    /// Tool router for request dispatch.
    router: ToolRouter,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
    /// Audit sink for request events.
    audit: Arc<dyn McpAuditSink>,
    /// Metrics sink for request counters and latency.
    metrics: Arc<dyn McpMetrics>,
}

/// Per-request transport metadata.
#[derive(Debug, Clone)]
struct RequestContext {
    /// Transport that carried the request.
    transport: ServerTransport,
    /// Peer IP address for HTTP requests.
    peer_ip: Option<String>,
}

impl RequestContext {
    /// Context for stdio requests.
    const fn stdio() -> Self {
        Self {
            transport: ServerTransport::Stdio,
            peer_ip: None,
        }
    }

    /// Context for HTTP requests.
    fn http(peer: SocketAddr) -> Self {
        Self {
            transport: ServerTransport::Http,
            peer_ip: Some(peer.ip().to_string()),
        }
    }
}

impl ServerState {
    /// Handles one raw JSON-RPC payload, returning the status and response
    /// bytes. Notifications produce no response bytes.
    fn handle_payload(&self, context: &RequestContext, bytes: &[u8]) -> (StatusCode, Option<Vec<u8>>) {
        let started = Instant::now();
        let reply = self.dispatch(bytes);
        self.finish(context, bytes.len(), reply, started)
    }

    /// Answers a payload that exceeded the body limit without parsing it.
    fn reject_oversized(
        &self,
        context: &RequestContext,
        request_bytes: usize,
    ) -> (StatusCode, Option<Vec<u8>>) {
        let started = Instant::now();
        let reply = Reply::error(
            StatusCode::PAYLOAD_TOO_LARGE,
            Value::Null,
            McpMethod::Invalid,
            CODE_INVALID_REQUEST,
            "request body too large".to_string(),
        );
        self.finish(context, request_bytes, reply, started)
    }

    /// Serializes the reply and records audit and metric events.
    fn finish(
        &self,
        context: &RequestContext,
        request_bytes: usize,
        reply: Reply,
        started: Instant,
    ) -> (StatusCode, Option<Vec<u8>>) {
        let payload = reply.response.as_ref().map(|response| {
            serde_json::to_vec(response).unwrap_or_else(|_| SERIALIZATION_FAILED_PAYLOAD.to_vec())
        });
        let response_bytes = payload.as_ref().map_or(0, Vec::len);
        let outcome = if reply.failed { McpOutcome::Error } else { McpOutcome::Ok };
        let event = McpMetricEvent {
            transport: context.transport,
            method: reply.method,
            tool: reply.tool,
            outcome,
            error_code: reply.error_code,
            error_kind: reply.error_kind,
            request_bytes,
            response_bytes,
        };
        self.metrics.record_request(event.clone());
        self.metrics.record_latency(event, started.elapsed());
        self.audit.record(&McpAuditEvent::new(McpAuditEventParams {
            request_id: reply.request_id,
            transport: context.transport,
            peer_ip: context.peer_ip.clone(),
            method: reply.method,
            tool: reply.tool,
            outcome,
            error_code: reply.error_code,
            error_kind: reply.error_kind,
            request_bytes,
            response_bytes,
        }));
        (reply.status, payload)
    }

    /// Parses and routes a JSON-RPC payload.
    fn dispatch(&self, bytes: &[u8]) -> Reply {
        if bytes.len() > self.max_body_bytes {
            return Reply::error(
                StatusCode::PAYLOAD_TOO_LARGE,
                Value::Null,
                McpMethod::Invalid,
                CODE_INVALID_REQUEST,
                "request body too large".to_string(),
            );
        }
        let Ok(value) = serde_json::from_slice::<Value>(bytes) else {
            return Reply::error(
                StatusCode::BAD_REQUEST,
                Value::Null,
                McpMethod::Invalid,
                CODE_PARSE_ERROR,
                "parse error".to_string(),
            );
        };
        let raw_id = value.get("id").cloned().unwrap_or(Value::Null);
        let Ok(request) = serde_json::from_value::<JsonRpcRequest>(value) else {
            return Reply::error(
                StatusCode::BAD_REQUEST,
                raw_id,
                McpMethod::Invalid,
                CODE_INVALID_REQUEST,
                "invalid json-rpc request".to_string(),
            );
        };
        let id = request.id.unwrap_or(Value::Null);
        if request.jsonrpc != "2.0" {
            return Reply::error(
                StatusCode::BAD_REQUEST,
                id,
                McpMethod::Invalid,
                CODE_INVALID_REQUEST,
                "invalid json-rpc version".to_string(),
            );
        }
        let method = McpMethod::classify(&request.method);
        match method {
            McpMethod::Notification => Reply::silent(),
            McpMethod::Initialize => Reply::success(id, method, initialize_result()),
            McpMethod::Ping => Reply::success(id, method, json!({})),
            McpMethod::ToolsList => {
                let tools = ToolListResult {
                    tools: self.router.list_tools(),
                };
                match serde_json::to_value(tools) {
                    Ok(value) => Reply::success(id, method, value),
                    Err(err) => Reply::error(
                        StatusCode::OK,
                        id,
                        method,
                        CODE_INTERNAL_ERROR,
                        format!("serialization failed: {err}"),
                    ),
                }
            }
            McpMethod::ToolsCall => self.call_tool(id, request.params),
            McpMethod::Invalid | McpMethod::Other => Reply::error(
                StatusCode::BAD_REQUEST,
                id,
                method,
                CODE_METHOD_NOT_FOUND,
                format!("method not found: {}", request.method),
            ),
        }
    }

    /// Handles `tools/call`.
    fn call_tool(&self, id: Value, params: Option<Value>) -> Reply {
        let params = params.unwrap_or(Value::Null);
        let Ok(call) = serde_json::from_value::<ToolCallParams>(params) else {
            return Reply::error(
                StatusCode::BAD_REQUEST,
                id,
                McpMethod::ToolsCall,
                CODE_INVALID_PARAMS,
                "invalid tool params".to_string(),
            );
        };
        let tool = ToolName::parse(&call.name);
        match call_tool_with_blocking(&self.router, &call.name, call.arguments) {
            Ok(output) => match serde_json::to_string(&output) {
                Ok(text) => tool_result(id, tool, text, false),
                Err(err) => tool_failure(id, tool, ToolError::Serialization(err.to_string())),
            },
            Err(err) => tool_failure(id, tool, err),
        }
    }
}

/// Executes a tool call, shifting to a blocking context when available.
fn call_tool_with_blocking(
    router: &ToolRouter,
    name: &str,
    arguments: Value,
) -> Result<Value, ToolError> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| router.handle_tool_call(name, arguments))
        }
        _ => router.handle_tool_call(name, arguments),
    }
}

/// Builds the `initialize` result payload.
fn initialize_result() -> Value {
    json!({
        "protocolVersion": MCP_PROTOCOL_VERSION,
        "capabilities": { "tools": {} },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

/// Builds a `tools/call` result carrying one text block.
fn tool_result(id: Value, tool: Option<ToolName>, text: String, is_error: bool) -> Reply {
    let result = ToolCallResult {
        content: vec![ToolContent::Text {
            text,
        }],
        is_error,
    };
    match serde_json::to_value(result) {
        Ok(value) => Reply::success(id, McpMethod::ToolsCall, value).with_tool(tool),
        Err(err) => Reply::error(
            StatusCode::OK,
            id,
            McpMethod::ToolsCall,
            CODE_INTERNAL_ERROR,
            format!("serialization failed: {err}"),
        )
        .with_tool(tool),
    }
}

/// Maps a tool failure onto a reply.
///
/// Compiler rejections are tool results with `isError` set; routing failures
/// are JSON-RPC errors.
fn tool_failure(id: Value, tool: Option<ToolName>, error: ToolError) -> Reply {
    let kind = error.kind();
    let (status, code, message) = match error {
        ToolError::Compile(err) => {
            let mut reply = tool_result(id, tool, format!("{}: {err}", err.kind()), true);
            reply.failed = true;
            reply.error_kind = Some(kind);
            return reply;
        }
        ToolError::UnknownTool(name) => {
            (StatusCode::BAD_REQUEST, CODE_METHOD_NOT_FOUND, format!("unknown tool: {name}"))
        }
        ToolError::InvalidParams(message) => (StatusCode::BAD_REQUEST, CODE_INVALID_PARAMS, message),
        ToolError::Serialization(message) => (StatusCode::OK, CODE_INTERNAL_ERROR, message),
    };
    let mut reply = Reply::error(status, id, McpMethod::ToolsCall, code, message).with_tool(tool);
    reply.error_kind = Some(kind);
    reply
}

// ============================================================================
// SECTION: JSON-RPC Types
// ============================================================================

/// Incoming JSON-RPC request payload.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// JSON-RPC protocol version.
    jsonrpc: String,
    /// Request identifier; absent for notifications.
    #[serde(default)]
    id: Option<Value>,
    /// Method name.
    method: String,
    /// Optional parameters payload.
    #[serde(default)]
    params: Option<Value>,
}

/// JSON-RPC response envelope.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    /// JSON-RPC protocol version.
    jsonrpc: &'static str,
    /// Request identifier.
    id: Value,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    /// Error payload when the request fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error payload.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    /// Error code.
    code: i64,
    /// Human-readable error message.
    message: String,
}

/// Tool call parameters for JSON-RPC requests.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Tool name.
    name: String,
    /// Raw JSON arguments.
    #[serde(default)]
    arguments: Value,
}

/// Tool list response payload.
#[derive(Debug, Serialize)]
struct ToolListResult {
    /// Registered tool definitions.
    tools: Vec<ToolDefinition>,
}

/// Tool call response payload.
#[derive(Debug, Serialize)]
struct ToolCallResult {
    /// Tool output content.
    content: Vec<ToolContent>,
    /// Whether the tool reported a domain error.
    #[serde(rename = "isError")]
    is_error: bool,
}

/// Tool output payloads for JSON-RPC responses.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ToolContent {
    /// Text block holding serialized JSON or an error message.
    Text {
        /// Text payload.
        text: String,
    },
}

/// Dispatch outcome for one message, with the labels used for telemetry.
struct Reply {
    /// HTTP status for the HTTP transport.
    status: StatusCode,
    /// Response envelope; `None` for notifications.
    response: Option<JsonRpcResponse>,
    /// Request identifier rendered for audit logs.
    request_id: Option<String>,
    /// Method classification.
    method: McpMethod,
    /// Tool name for `tools/call`.
    tool: Option<ToolName>,
    /// JSON-RPC error code when present.
    error_code: Option<i64>,
    /// Error kind label when present.
    error_kind: Option<&'static str>,
    /// Whether the request failed.
    failed: bool,
}

impl Reply {
    /// Successful result reply.
    fn success(id: Value, method: McpMethod, result: Value) -> Self {
        Self {
            status: StatusCode::OK,
            request_id: render_id(&id),
            response: Some(JsonRpcResponse {
                jsonrpc: "2.0",
                id,
                result: Some(result),
                error: None,
            }),
            method,
            tool: None,
            error_code: None,
            error_kind: None,
            failed: false,
        }
    }

    /// JSON-RPC error reply.
    fn error(status: StatusCode, id: Value, method: McpMethod, code: i64, message: String) -> Self {
        Self {
            status,
            request_id: render_id(&id),
            response: Some(JsonRpcResponse {
                jsonrpc: "2.0",
                id,
                result: None,
                error: Some(JsonRpcError {
                    code,
                    message,
                }),
            }),
            method,
            tool: None,
            error_code: Some(code),
            error_kind: None,
            failed: true,
        }
    }

    /// Reply for a notification: nothing is written back.
    const fn silent() -> Self {
        Self {
            status: StatusCode::ACCEPTED,
            response: None,
            request_id: None,
            method: McpMethod::Notification,
            tool: None,
            error_code: None,
            error_kind: None,
            failed: false,
        }
    }

    /// Attaches the tool label.
    fn with_tool(mut self, tool: Option<ToolName>) -> Self {
        self.tool = tool;
        self
    }
}

/// Renders a request id for audit logs.
fn render_id(id: &Value) -> Option<String> {
    match id {
        Value::Null => None,
        Value::String(value) => Some(value.clone()),
        other => Some(other.to_string()),
    }
}

// ============================================================================
// SECTION: Framing Helpers
// ============================================================================

/// Framing a stdio message arrived with; responses reuse it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    /// One JSON document per line.
    Line,
    /// `Content-Length` header block followed by the body.
    ContentLength,
}

/// One read from the stdio stream.
#[derive(Debug, PartialEq, Eq)]
enum Inbound {
    /// A complete message body.
    Message {
        /// Message bytes.
        payload: Vec<u8>,
        /// Framing the message arrived with.
        framing: Framing,
    },
    /// A message over the body limit; its bytes were discarded.
    Oversized {
        /// Bytes consumed for the message.
        bytes: usize,
        /// Framing the message arrived with.
        framing: Framing,
    },
    /// End of input between messages.
    Closed,
}

/// Reads the next stdio message, detecting its framing from the first
/// non-blank line.
fn read_message(
    reader: &mut impl BufRead,
    max_body_bytes: usize,
) -> Result<Inbound, McpServerError> {
    let limit = u64::try_from(max_body_bytes).unwrap_or(u64::MAX).saturating_add(2);
    loop {
        let mut line = Vec::new();
        let read = reader.by_ref().take(limit).read_until(b'\n', &mut line).map_err(read_failed)?;
        if read == 0 {
            return Ok(Inbound::Closed);
        }
        if !line.ends_with(b"\n") && u64::try_from(line.len()).unwrap_or(u64::MAX) >= limit {
            let skipped = discard_line(reader)?;
            return Ok(Inbound::Oversized {
                bytes: line.len().saturating_add(skipped),
                framing: Framing::Line,
            });
        }
        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            continue;
        }
        if is_header_line(trimmed) {
            return read_framed(reader, trimmed, max_body_bytes);
        }
        return Ok(Inbound::Message {
            payload: trimmed.to_vec(),
            framing: Framing::Line,
        });
    }
}

/// Returns true when a line opens a `Content-*` header block.
fn is_header_line(line: &[u8]) -> bool {
    const PREFIX: &[u8] = b"content-";
    line.len() >= PREFIX.len() && line[.. PREFIX.len()].eq_ignore_ascii_case(PREFIX)
}

/// Parses a `Content-Length` header value, if the line is that header.
fn content_length(line: &[u8]) -> Result<Option<usize>, McpServerError> {
    const NAME: &[u8] = b"content-length:";
    if line.len() < NAME.len() || !line[.. NAME.len()].eq_ignore_ascii_case(NAME) {
        return Ok(None);
    }
    std::str::from_utf8(&line[NAME.len() ..])
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .map(Some)
        .ok_or_else(|| McpServerError::Transport("invalid content length".to_string()))
}

/// Reads the rest of a header block and its body.
fn read_framed(
    reader: &mut impl BufRead,
    first_header: &[u8],
    max_body_bytes: usize,
) -> Result<Inbound, McpServerError> {
    let mut length = content_length(first_header)?;
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = reader.by_ref().take(8 * 1024).read_until(b'\n', &mut line).map_err(read_failed)?;
        if read == 0 {
            return Err(McpServerError::Transport("stdio closed inside headers".to_string()));
        }
        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            break;
        }
        if let Some(parsed) = content_length(trimmed)? {
            length = Some(parsed);
        }
    }
    let len =
        length.ok_or_else(|| McpServerError::Transport("missing content length".to_string()))?;
    if len > max_body_bytes {
        let wanted = u64::try_from(len).unwrap_or(u64::MAX);
        let skipped = io::copy(&mut reader.by_ref().take(wanted), &mut io::sink())
            .map_err(read_failed)?;
        if skipped < wanted {
            return Err(McpServerError::Transport("stdio closed inside body".to_string()));
        }
        return Ok(Inbound::Oversized {
            bytes: len,
            framing: Framing::ContentLength,
        });
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).map_err(read_failed)?;
    Ok(Inbound::Message {
        payload,
        framing: Framing::ContentLength,
    })
}

/// Consumes input through the next newline, returning the bytes skipped.
fn discard_line(reader: &mut impl BufRead) -> Result<usize, McpServerError> {
    let mut skipped = 0usize;
    loop {
        let buffer = reader.fill_buf().map_err(read_failed)?;
        if buffer.is_empty() {
            return Ok(skipped);
        }
        if let Some(position) = buffer.iter().position(|byte| *byte == b'\n') {
            reader.consume(position + 1);
            return Ok(skipped.saturating_add(position + 1));
        }
        let len = buffer.len();
        reader.consume(len);
        skipped = skipped.saturating_add(len);
    }
}

/// Maps a read failure to a transport error.
fn read_failed(err: io::Error) -> McpServerError {
    McpServerError::Transport(format!("stdio read failed: {err}"))
}

/// Writes a newline-delimited payload.
fn write_line(writer: &mut impl Write, payload: &[u8]) -> Result<(), McpServerError> {
    writer
        .write_all(payload)
        .and_then(|()| writer.write_all(b"\n"))
        .and_then(|()| writer.flush())
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))
}

/// Writes a framed stdio payload using MCP Content-Length headers.
fn write_framed(writer: &mut impl Write, payload: &[u8]) -> Result<(), McpServerError> {
    let header = format!("Content-Length: {}\r\n\r\n", payload.len());
    writer
        .write_all(header.as_bytes())
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer
        .write_all(payload)
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer.flush().map_err(|_| McpServerError::Transport("stdio write failed".to_string()))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// MCP server errors.
#[derive(Debug, thiserror::Error)]
pub enum McpServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        reason = "Test-only framing assertions."
    )]

    use std::io::BufReader;
    use std::io::Cursor;

    use super::Framing;
    use super::Inbound;
    use super::read_message;

    const PAYLOAD: &[u8] = br#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#;

    fn framed(payload: &[u8]) -> Vec<u8> {
        let mut bytes = format!("Content-Length: {}\r\n\r\n", payload.len()).into_bytes();
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn read_message_accepts_framed_payload_at_limit() {
        let mut reader = BufReader::new(Cursor::new(framed(PAYLOAD)));
        let inbound = read_message(&mut reader, PAYLOAD.len()).unwrap();
        assert_eq!(
            inbound,
            Inbound::Message {
                payload: PAYLOAD.to_vec(),
                framing: Framing::ContentLength,
            }
        );
        assert_eq!(read_message(&mut reader, PAYLOAD.len()).unwrap(), Inbound::Closed);
    }

    #[test]
    fn read_message_skips_framed_payload_over_limit() {
        let mut bytes = framed(PAYLOAD);
        bytes.extend_from_slice(b"\n{\"next\":true}\n");
        let mut reader = BufReader::new(Cursor::new(bytes));
        let inbound = read_message(&mut reader, PAYLOAD.len() - 1).unwrap();
        assert_eq!(
            inbound,
            Inbound::Oversized {
                bytes: PAYLOAD.len(),
                framing: Framing::ContentLength,
            }
        );
        let next = read_message(&mut reader, PAYLOAD.len()).unwrap();
        assert_eq!(
            next,
            Inbound::Message {
                payload: b"{\"next\":true}".to_vec(),
                framing: Framing::Line,
            }
        );
    }

    #[test]
    fn read_message_reads_lines_and_skips_blank_lines() {
        let mut bytes = b"\r\n\n".to_vec();
        bytes.extend_from_slice(PAYLOAD);
        bytes.extend_from_slice(b"\r\n");
        let mut reader = BufReader::new(Cursor::new(bytes));
        let inbound = read_message(&mut reader, 1024).unwrap();
        assert_eq!(
            inbound,
            Inbound::Message {
                payload: PAYLOAD.to_vec(),
                framing: Framing::Line,
            }
        );
        assert_eq!(read_message(&mut reader, 1024).unwrap(), Inbound::Closed);
    }

    #[test]
    fn read_message_discards_oversized_line() {
        let mut bytes = vec![b'x'; 64];
        bytes.push(b'\n');
        bytes.extend_from_slice(PAYLOAD);
        bytes.push(b'\n');
        let mut reader = BufReader::new(Cursor::new(bytes));
        let inbound = read_message(&mut reader, 16).unwrap();
        assert!(matches!(
            inbound,
            Inbound::Oversized {
                framing: Framing::Line,
                ..
            }
        ));
        let next = read_message(&mut reader, 1024).unwrap();
        assert!(matches!(next, Inbound::Message { framing: Framing::Line, .. }));
    }

    #[test]
    fn read_message_accepts_lowercase_header_and_extra_headers() {
        let mut bytes = format!(
            "content-type: application/json\r\ncontent-length: {}\r\n\r\n",
            PAYLOAD.len()
        )
        .into_bytes();
        bytes.extend_from_slice(PAYLOAD);
        let mut reader = BufReader::new(Cursor::new(bytes));
        let inbound = read_message(&mut reader, 1024).unwrap();
        assert_eq!(
            inbound,
            Inbound::Message {
                payload: PAYLOAD.to_vec(),
                framing: Framing::ContentLength,
            }
        );
    }

    #[test]
    fn read_message_rejects_bad_content_length() {
        let mut reader = BufReader::new(Cursor::new(b"Content-Length: abc\r\n\r\n{}".to_vec()));
        assert!(read_message(&mut reader, 1024).is_err());
    }

    #[test]
    fn read_message_rejects_truncated_body() {
        let mut reader = BufReader::new(Cursor::new(b"Content-Length: 10\r\n\r\n{}".to_vec()));
        assert!(read_message(&mut reader, 1024).is_err());
    }
}
