// crates/po-compiler-config/tests/config_load.rs
// ============================================================================
// Module: Config Loading Tests
// Description: Defaults, overrides, and fail-closed validation.
// Purpose: Ensure po-compiler.toml semantics stay stable.
// Dependencies: po-compiler-config, tempfile
// ============================================================================

//! Configuration loading and validation tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::fs;

use po_compiler_config::ConfigError;
use po_compiler_config::DEFAULT_FILE_PREFIX;
use po_compiler_config::DEFAULT_MAX_BODY_BYTES;
use po_compiler_config::PoCompilerConfig;
use po_compiler_config::ServerTransport;
use po_compiler_core::DEFAULT_MAX_INPUT_BYTES;
use po_compiler_core::DeliveryMode;

#[test]
fn empty_document_yields_defaults() {
    let config = PoCompilerConfig::from_toml_str("").unwrap();
    assert_eq!(config.server.transport, ServerTransport::Stdio);
    assert_eq!(config.server.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    assert!(!config.server.allow_non_loopback);
    assert_eq!(config.compiler.file_prefix, DEFAULT_FILE_PREFIX);
    assert_eq!(config.compiler.max_input_bytes, DEFAULT_MAX_INPUT_BYTES);
    assert_eq!(config.compiler.delivery_mode(), DeliveryMode::Inline);
    assert!(config.compiler.output_dir.is_none());
    assert!(config.audit.enabled);
    assert!(config.audit.path.is_none());
}

#[test]
fn full_document_is_applied() {
    let config = PoCompilerConfig::from_toml_str(
        r#"
[server]
transport = "http"
bind = "127.0.0.1:8088"
max_body_bytes = 1048576

[compiler]
output_dir = "/var/tmp/mo"
file_prefix = "catalog-"
max_input_bytes = 65536
default_mode = "PATH"

[audit]
enabled = false
path = "/var/log/po-compiler.jsonl"
"#,
    )
    .unwrap();
    assert_eq!(config.server.transport, ServerTransport::Http);
    assert_eq!(config.server.bind.as_deref(), Some("127.0.0.1:8088"));
    assert_eq!(config.compiler.file_prefix, "catalog-");
    assert_eq!(config.compiler.delivery_mode(), DeliveryMode::External);
    assert!(!config.audit.enabled);
}

#[test]
fn http_without_bind_is_rejected() {
    let err = PoCompilerConfig::from_toml_str("[server]\ntransport = \"http\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn non_loopback_bind_requires_opt_in() {
    let text = "[server]\ntransport = \"http\"\nbind = \"0.0.0.0:8088\"\n";
    assert!(PoCompilerConfig::from_toml_str(text).is_err());
    let allowed = format!("{text}allow_non_loopback = true\n");
    assert!(PoCompilerConfig::from_toml_str(&allowed).is_ok());
}

#[test]
fn invalid_values_are_rejected() {
    for text in [
        "[server]\nmax_body_bytes = 0\n",
        "[compiler]\nmax_input_bytes = 0\n",
        "[compiler]\nfile_prefix = \"\"\n",
        "[compiler]\nfile_prefix = \"../escape\"\n",
        "[compiler]\nfile_prefix = \"a/b\"\n",
        "[compiler]\nfile_prefix = \" po-\"\n",
        "[compiler]\nfile_prefix = \"po- \"\n",
        "[compiler]\ndefault_mode = \"zip\"\n",
        "[compiler]\noutput_dir = \"  \"\n",
        "[audit]\npath = \"\"\n",
    ] {
        let err = PoCompilerConfig::from_toml_str(text).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "expected invalid for {text}: {err}");
    }
}

#[test]
fn unknown_fields_are_rejected() {
    let err = PoCompilerConfig::from_toml_str("[compiler]\nprefix = \"x\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn load_reads_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("po-compiler.toml");
    fs::write(&path, "[compiler]\nfile_prefix = \"fr-\"\n").unwrap();
    let config = PoCompilerConfig::load(Some(&path)).unwrap();
    assert_eq!(config.compiler.file_prefix, "fr-");
}

#[test]
fn load_fails_for_missing_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = PoCompilerConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn load_rejects_oversized_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.toml");
    fs::write(&path, format!("# {}\n", "x".repeat(1024 * 1024))).unwrap();
    let err = PoCompilerConfig::load(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("size limit"));
}
