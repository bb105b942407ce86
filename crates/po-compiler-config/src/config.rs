// crates/po-compiler-config/src/config.rs
// ============================================================================
// Module: PO Compiler Configuration
// Description: Configuration loading and validation for the PO compiler.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: po-compiler-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! An explicitly requested file (CLI flag or `PO_COMPILER_CONFIG`) must exist;
//! when the default `po-compiler.toml` is absent, defaults apply. Invalid
//! configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use po_compiler_core::DEFAULT_MAX_INPUT_BYTES;
use po_compiler_core::DeliveryMode;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "po-compiler.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "PO_COMPILER_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default maximum request body size for the HTTP transport.
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;
/// Upper bound for request body and catalog size limits.
pub const MAX_SIZE_LIMIT: usize = 64 * 1024 * 1024;
/// Default prefix for externally delivered files.
pub const DEFAULT_FILE_PREFIX: &str = "po-compiler-";
/// Maximum length of the external file prefix.
pub(crate) const MAX_FILE_PREFIX_LENGTH: usize = 64;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Root configuration for the PO compiler.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoCompilerConfig {
    /// MCP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Compiler limits and delivery settings.
    #[serde(default)]
    pub compiler: CompilerConfig,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl PoCompilerConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: `path`, then `PO_COMPILER_CONFIG`, then
    /// `po-compiler.toml` in the working directory. Only the last may be
    /// absent, in which case defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = match fs::read(&resolved) {
            Ok(bytes) => bytes,
            Err(err) if !explicit && err.kind() == io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(ConfigError::Io(format!("{}: {err}", resolved.display())));
            }
        };
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.compiler.validate()?;
        self.audit.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Server Config
// ============================================================================

/// Server configuration for MCP transports.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Transport type for MCP.
    #[serde(default)]
    pub transport: ServerTransport,
    /// Bind address for the HTTP transport.
    #[serde(default)]
    pub bind: Option<String>,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Permit binding the HTTP transport to a non-loopback address.
    #[serde(default)]
    pub allow_non_loopback: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: ServerTransport::Stdio,
            bind: None,
            max_body_bytes: default_max_body_bytes(),
            allow_non_loopback: false,
        }
    }
}

impl ServerConfig {
    /// Validates server transport configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_size_limit("server.max_body_bytes", self.max_body_bytes)?;
        match self.transport {
            ServerTransport::Http => {
                let bind = self.bind.as_deref().unwrap_or_default().trim();
                if bind.is_empty() {
                    return Err(ConfigError::Invalid(
                        "http transport requires bind address".to_string(),
                    ));
                }
                let addr: SocketAddr = bind
                    .parse()
                    .map_err(|_| ConfigError::Invalid("invalid bind address".to_string()))?;
                if !addr.ip().is_loopback() && !self.allow_non_loopback {
                    return Err(ConfigError::Invalid(
                        "non-loopback bind requires server.allow_non_loopback".to_string(),
                    ));
                }
            }
            ServerTransport::Stdio => {}
        }
        Ok(())
    }
}

/// MCP transport selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerTransport {
    /// Use stdin/stdout transport.
    #[default]
    Stdio,
    /// Use HTTP JSON-RPC transport.
    Http,
}

// ============================================================================
// SECTION: Compiler Config
// ============================================================================

/// Compiler limits and delivery settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    /// Directory for externally delivered files (system temp dir when unset).
    #[serde(default)]
    pub output_dir: Option<String>,
    /// File name prefix for externally delivered files.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// Maximum catalog text size in bytes.
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,
    /// Delivery mode used when a caller does not name a recognized one.
    #[serde(default = "default_mode_label")]
    pub default_mode: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            file_prefix: default_file_prefix(),
            max_input_bytes: default_max_input_bytes(),
            default_mode: default_mode_label(),
        }
    }
}

impl CompilerConfig {
    /// Returns the configured fallback delivery mode.
    ///
    /// Unrecognized labels resolve to inline; [`PoCompilerConfig::validate`]
    /// rejects them before they reach this point.
    #[must_use]
    pub fn delivery_mode(&self) -> DeliveryMode {
        DeliveryMode::parse(Some(&self.default_mode), DeliveryMode::Inline)
    }

    /// Validates compiler settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_size_limit("compiler.max_input_bytes", self.max_input_bytes)?;
        let prefix = self.file_prefix.as_str();
        if prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("compiler.file_prefix must be non-empty".to_string()));
        }
        if prefix.trim() != prefix {
            return Err(ConfigError::Invalid(
                "compiler.file_prefix must not have surrounding whitespace".to_string(),
            ));
        }
        if prefix.len() > MAX_FILE_PREFIX_LENGTH {
            return Err(ConfigError::Invalid("compiler.file_prefix exceeds max length".to_string()));
        }
        if prefix.contains(['/', '\\']) || prefix.contains("..") {
            return Err(ConfigError::Invalid(
                "compiler.file_prefix must not contain path separators".to_string(),
            ));
        }
        if let Some(dir) = &self.output_dir {
            validate_path_string("compiler.output_dir", dir)?;
        }
        if DeliveryMode::from_label(&self.default_mode).is_none() {
            return Err(ConfigError::Invalid(format!(
                "compiler.default_mode `{}` is not one of inline, base64, external, path",
                self.default_mode
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit Config
// ============================================================================

/// Structured audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default request body limit.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Default catalog text limit.
const fn default_max_input_bytes() -> usize {
    DEFAULT_MAX_INPUT_BYTES
}

/// Default external file prefix.
fn default_file_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_string()
}

/// Default delivery mode label.
fn default_mode_label() -> String {
    DeliveryMode::Inline.as_str().to_string()
}

/// Audit logging is on unless disabled.
const fn default_audit_enabled() -> bool {
    true
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path and whether it was explicitly requested.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a byte-size limit.
fn validate_size_limit(field: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid(format!("{field} must be greater than zero")));
    }
    if value > MAX_SIZE_LIMIT {
        return Err(ConfigError::Invalid(format!("{field} exceeds {MAX_SIZE_LIMIT} bytes")));
    }
    Ok(())
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
        reason = "Test-only assertions."
    )]

    use super::MAX_TOTAL_PATH_LENGTH;
    use super::validate_path_string;
    use super::validate_size_limit;

    #[test]
    fn validate_path_string_accepts_valid_path() {
        assert!(validate_path_string("test_path", "./out/mo").is_ok());
    }

    #[test]
    fn validate_path_string_rejects_whitespace_only() {
        let err = validate_path_string("test_path", "   ").unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn validate_path_string_rejects_exceeds_max_length() {
        let long_path = "a".repeat(MAX_TOTAL_PATH_LENGTH + 1);
        let err = validate_path_string("test_path", &long_path).unwrap_err();
        assert!(err.to_string().contains("max length"));
    }

    #[test]
    fn validate_size_limit_rejects_zero_and_oversize() {
        assert!(validate_size_limit("limit", 0).is_err());
        assert!(validate_size_limit("limit", usize::MAX).is_err());
        assert!(validate_size_limit("limit", 1024).is_ok());
    }
}
