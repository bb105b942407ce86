// crates/po-compiler-contract/src/tooling.rs
// ============================================================================
// Module: MCP Tool Contracts
// Description: Canonical MCP tool definitions and schemas for the PO compiler.
// Purpose: Provide tool contracts for MCP listing and generated docs.
// Dependencies: serde_json, crate::types
// ============================================================================

//! ## Overview
//! This module defines the canonical MCP tool surface. Tool contracts drive
//! `tools/list` responses and the markdown reference rendered by the CLI.
//! Security posture: tool inputs are untrusted catalog text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde_json::Value;
use serde_json::json;

use crate::types::ToolContract;
use crate::types::ToolDefinition;
use crate::types::ToolExample;
use crate::types::ToolName;

// ============================================================================
// SECTION: Example Payloads
// ============================================================================

/// Minimal catalog used by the tool examples.
const EXAMPLE_PO: &str = "msgid \"\"\nmsgstr \"Language: es\\n\"\n\nmsgid \"Hello\"\nmsgstr \"Hola\"\n";
/// Base64 of the table compiled from [`EXAMPLE_PO`].
const EXAMPLE_BASE64: &str = "3hIElQAAAAACAAAAHAAAACwAAAAAAAAAAAAAAAAAAAA8AAAABQAAAEsAAAANAAAAPQAAAAQAAABRAAAAAExhbmd1YWdlOiBlcwoASGVsbG8ASG9sYQA=";
/// SHA-256 of the table compiled from [`EXAMPLE_PO`].
const EXAMPLE_DIGEST: &str = "dffb817442e445b8f4fcc623d5eccc18d5340fd9563a594212f70ee2383ffec3";
/// Size of the table compiled from [`EXAMPLE_PO`].
const EXAMPLE_SIZE: u64 = 86;

// ============================================================================
// SECTION: Tool Contracts
// ============================================================================

/// Returns the canonical MCP tool contracts.
///
/// The order matches [`ToolName::all`] and is preserved in `tools/list`.
#[must_use]
pub fn tool_contracts() -> Vec<ToolContract> {
    vec![compile_po_contract(), validate_po_contract(), summarize_po_contract()]
}

/// Returns tool definitions for MCP `tools/list`.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    tool_contracts()
        .into_iter()
        .map(|contract| ToolDefinition {
            name: contract.name,
            description: contract.description,
            input_schema: contract.input_schema,
        })
        .collect()
}

/// Builds the tool contract for `compile_po`.
fn compile_po_contract() -> ToolContract {
    build_tool_contract(
        ToolName::CompilePo,
        "Compile gettext .po catalog text into a binary .mo table, returned inline as base64 or \
         written to a file.",
        tool_input_schema(
            &json!({
                "po_content": schema_for_string("Full .po catalog text."),
                "return": {
                    "type": "string",
                    "enum": ["base64", "inline", "path", "external"],
                    "description": "Delivery mode: base64/inline returns the bytes, path/external \
                                    writes a file. Unknown values fall back to the server default."
                }
            }),
            &["po_content"],
        ),
        compile_output_schema(),
        vec![ToolExample {
            description: "Compile a one-entry Spanish catalog inline.".to_string(),
            input: json!({ "po_content": EXAMPLE_PO, "return": "base64" }),
            output: json!({
                "mode": "inline",
                "base64": EXAMPLE_BASE64,
                "summary": example_summary(),
                "digest": { "algorithm": "sha256", "value": EXAMPLE_DIGEST },
                "size_bytes": EXAMPLE_SIZE
            }),
        }],
        vec![
            "Output is byte-reproducible: the same catalog always yields the same digest."
                .to_string(),
            "External files are uniquely named, never overwritten, and never deleted by the server."
                .to_string(),
            "Untranslated singular entries map to their source text in the table.".to_string(),
            "Fails with empty_input, parse, or storage errors; no partial output.".to_string(),
        ],
    )
}

/// Builds the tool contract for `validate_po`.
fn validate_po_contract() -> ToolContract {
    build_tool_contract(
        ToolName::ValidatePo,
        "Report missing headers and untranslated entries for .po catalog text.",
        po_content_input_schema(),
        tool_output_schema(
            &json!({
                "warnings": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Warnings sorted lexicographically."
                },
                "summary": summary_schema()
            }),
            &["warnings", "summary"],
        ),
        vec![ToolExample {
            description: "Validate a catalog missing its Plural-Forms header.".to_string(),
            input: json!({ "po_content": EXAMPLE_PO }),
            output: json!({
                "warnings": ["Plural-Forms header missing"],
                "summary": example_summary()
            }),
        }],
        vec![
            "Content problems are warnings, never errors; only malformed text fails.".to_string(),
            "Plural entries are untranslated unless every form is non-empty.".to_string(),
        ],
    )
}

/// Builds the tool contract for `summarize_po`.
fn summarize_po_contract() -> ToolContract {
    build_tool_contract(
        ToolName::SummarizePo,
        "Count total, translated, fuzzy, and untranslated entries in .po catalog text.",
        po_content_input_schema(),
        with_schema(summary_schema()),
        vec![ToolExample {
            description: "Summarize a one-entry Spanish catalog.".to_string(),
            input: json!({ "po_content": EXAMPLE_PO }),
            output: example_summary(),
        }],
        vec!["The metadata (header) entry is never counted.".to_string()],
    )
}

// ============================================================================
// SECTION: Shared Schemas
// ============================================================================

/// Input schema shared by tools that only take catalog text.
fn po_content_input_schema() -> Value {
    tool_input_schema(
        &json!({ "po_content": schema_for_string("Full .po catalog text.") }),
        &["po_content"],
    )
}

/// Output schema for `compile_po`.
fn compile_output_schema() -> Value {
    let mut schema = tool_output_schema(
        &json!({
            "mode": {
                "type": "string",
                "enum": ["inline", "external"],
                "description": "Delivery mode actually used."
            },
            "base64": schema_for_string("Standard padded base64 of the table (inline mode)."),
            "path": schema_for_string("Absolute path of the written table (external mode)."),
            "summary": summary_schema(),
            "digest": {
                "type": "object",
                "required": ["algorithm", "value"],
                "properties": {
                    "algorithm": { "type": "string", "const": "sha256" },
                    "value": schema_for_string("Lowercase hex digest of the table bytes.")
                },
                "additionalProperties": false,
                "description": "Content digest of the encoded table."
            },
            "size_bytes": {
                "type": "integer",
                "minimum": 28,
                "description": "Encoded table size in bytes."
            }
        }),
        &["mode", "summary", "digest", "size_bytes"],
    );
    if let Value::Object(map) = &mut schema {
        map.insert(
            String::from("oneOf"),
            json!([
                { "required": ["base64"] },
                { "required": ["path"] }
            ]),
        );
    }
    schema
}

/// Schema for catalog progress summaries.
fn summary_schema() -> Value {
    let count = |description: &str| json!({ "type": "integer", "minimum": 0, "description": description });
    let mut schema = object_schema(
        &json!({
            "language": schema_for_string("Language header value (may be empty)."),
            "total": count("Content entries, metadata excluded."),
            "translated": count("Entries with every form translated."),
            "fuzzy": count("Fuzzy entries (always 0)."),
            "untranslated": count("total - translated - fuzzy.")
        }),
        &["language", "total", "translated", "fuzzy", "untranslated"],
    );
    if let Value::Object(map) = &mut schema {
        map.insert(
            String::from("description"),
            Value::String(String::from("Translation progress counts.")),
        );
    }
    schema
}

/// Summary shared by the tool examples.
fn example_summary() -> Value {
    json!({ "language": "es", "total": 1, "translated": 1, "fuzzy": 0, "untranslated": 0 })
}

// ============================================================================
// SECTION: Tooling Markdown
// ============================================================================

/// Builds markdown documentation for the tool contracts.
#[must_use]
pub fn tooling_markdown(contracts: &[ToolContract]) -> String {
    let mut out = String::new();
    out.push_str("# PO Compiler MCP Tools\n\n");
    out.push_str("Tools accept gettext `.po` catalog text and return JSON in a single text ");
    out.push_str("content block. Domain failures set `isError` and carry `<kind>: <message>`.\n\n");
    out.push_str("| Tool | Description |\n");
    out.push_str("| --- | --- |\n");
    for contract in contracts {
        out.push_str("| ");
        out.push_str(contract.name.as_str());
        out.push_str(" | ");
        out.push_str(&contract.description);
        out.push_str(" |\n");
    }
    out.push('\n');
    for contract in contracts {
        out.push_str("## ");
        out.push_str(contract.name.as_str());
        out.push_str("\n\n");
        out.push_str(&contract.description);
        out.push_str("\n\n### Inputs\n\n");
        render_schema_fields(&mut out, &contract.input_schema);
        out.push_str("\n### Outputs\n\n");
        render_schema_fields(&mut out, &contract.output_schema);
        out.push('\n');
        if !contract.notes.is_empty() {
            out.push_str("### Notes\n\n");
            for note in &contract.notes {
                out.push_str("- ");
                out.push_str(note);
                out.push('\n');
            }
            out.push('\n');
        }
        append_tool_examples(&mut out, &contract.examples);
    }
    out
}

/// Render top-level schema fields as markdown bullet points.
fn render_schema_fields(out: &mut String, schema: &Value) {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        out.push_str("_No fields._\n");
        return;
    };
    let required: BTreeSet<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let mut keys: Vec<&String> = properties.keys().collect();
    keys.sort();
    for key in keys {
        let value = &properties[key];
        let label = if required.contains(key.as_str()) { "required" } else { "optional" };
        let description = value
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| value.get("type").and_then(Value::as_str).map(|kind| format!("Type: {kind}.")))
            .unwrap_or_else(|| String::from("See schema for details."));
        out.push_str("- `");
        out.push_str(key);
        out.push_str("` (");
        out.push_str(label);
        out.push_str("): ");
        out.push_str(&description);
        out.push('\n');
    }
}

/// Append example input/output payloads for a tool, if defined.
fn append_tool_examples(out: &mut String, examples: &[ToolExample]) {
    if examples.is_empty() {
        return;
    }
    out.push_str("### Example\n\n");
    for example in examples {
        out.push_str(&example.description);
        out.push_str("\n\nInput:\n");
        render_json_block(out, &example.input);
        out.push_str("Output:\n");
        render_json_block(out, &example.output);
    }
    out.push('\n');
}

/// Render a JSON value in a fenced markdown code block.
fn render_json_block(out: &mut String, value: &Value) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|_| String::from("{}"));
    out.push_str("```json\n");
    out.push_str(&rendered);
    out.push_str("\n```\n");
}

// ============================================================================
// SECTION: Schema Helpers
// ============================================================================

/// Assembles a [`ToolContract`].
fn build_tool_contract(
    name: ToolName,
    description: &str,
    input_schema: Value,
    output_schema: Value,
    examples: Vec<ToolExample>,
    notes: Vec<String>,
) -> ToolContract {
    ToolContract {
        name,
        description: description.to_string(),
        input_schema,
        output_schema,
        examples,
        notes,
    }
}

/// Returns a JSON schema for strings.
fn schema_for_string(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description
    })
}

/// Builds a standard tool input schema wrapper.
fn tool_input_schema(properties: &Value, required: &[&str]) -> Value {
    with_schema(object_schema(properties, required))
}

/// Builds a standard tool output schema wrapper.
fn tool_output_schema(properties: &Value, required: &[&str]) -> Value {
    with_schema(object_schema(properties, required))
}

/// Builds a closed object schema.
fn object_schema(properties: &Value, required: &[&str]) -> Value {
    let required_values: Vec<Value> =
        required.iter().map(|value| Value::String((*value).to_string())).collect();
    json!({
        "type": "object",
        "required": required_values,
        "properties": properties,
        "additionalProperties": false
    })
}

/// Adds a `$schema` header to a top-level JSON schema.
fn with_schema(schema: Value) -> Value {
    let Value::Object(mut map) = schema else {
        return schema;
    };
    map.insert(
        String::from("$schema"),
        Value::String(String::from("https://json-schema.org/draft/2020-12/schema")),
    );
    Value::Object(map)
}
