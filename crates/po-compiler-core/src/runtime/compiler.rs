// crates/po-compiler-core/src/runtime/compiler.rs
// ============================================================================
// Module: Compiler Facade
// Description: Compile, validate, summarize, and inspect entry points.
// Purpose: Orchestrate parser, flattener, codec, and metrics for every surface.
// Dependencies: crate::{core, interfaces, parser, runtime}, base64, thiserror
// ============================================================================

//! ## Overview
//! [`CompilerService`] is stateless apart from its configuration and is cheap
//! to clone. Each call parses its own catalog, derives its output, and drops
//! the intermediate state. Compiled bytes are delivered either inline as
//! base64 or through an [`ArtifactStore`] that returns a file location.
//!
//! Security posture: catalog text is untrusted; input size is bounded before
//! parsing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Catalog;
use crate::core::DEFAULT_HASH_ALGORITHM;
use crate::core::HashDigest;
use crate::core::Record;
use crate::core::Summary;
use crate::core::hash_bytes;
use crate::interfaces::ArtifactStore;
use crate::interfaces::StorageError;
use crate::parser::ParseError;
use crate::parser::parse;
use crate::runtime::codec::FormatError;
use crate::runtime::codec::decode;
use crate::runtime::codec::encode;
use crate::runtime::flatten::flatten;
use crate::runtime::metrics::ValidationReport;
use crate::runtime::metrics::summarize;
use crate::runtime::metrics::validate;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum catalog text size in bytes.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Compiler facade errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling; see [`CompileError::kind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Catalog text is empty or whitespace-only.
    #[error("empty po content")]
    EmptyInput,
    /// Catalog text exceeds the configured size limit.
    #[error("po content too large: {actual_bytes} bytes exceeds limit of {max_bytes}")]
    InputTooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual input size in bytes.
        actual_bytes: usize,
    },
    /// Catalog text failed to parse.
    #[error("{0}")]
    Parse(#[from] ParseError),
    /// External delivery failed.
    #[error("{0}")]
    Storage(#[from] StorageError),
    /// Binary table encoding or decoding failed.
    #[error("{0}")]
    Format(#[from] FormatError),
}

impl CompileError {
    /// Returns a stable label for the error category.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::InputTooLarge {
                ..
            } => "input_too_large",
            Self::Parse(_) => "parse",
            Self::Storage(_) => "storage",
            Self::Format(_) => "format",
        }
    }
}

// ============================================================================
// SECTION: Delivery
// ============================================================================

/// How compiled bytes are handed back to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Base64 payload in the response.
    #[default]
    Inline,
    /// Path to a newly written file.
    External,
}

impl DeliveryMode {
    /// Parses a mode label, case-insensitively.
    ///
    /// Accepts `inline`/`base64` and `external`/`path`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "inline" | "base64" => Some(Self::Inline),
            "external" | "path" => Some(Self::External),
            _ => None,
        }
    }

    /// Parses an optional mode label, using `fallback` when the label is
    /// missing or unrecognized.
    #[must_use]
    pub fn parse(label: Option<&str>, fallback: Self) -> Self {
        label.and_then(Self::from_label).unwrap_or(fallback)
    }

    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::External => "external",
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivered artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Delivery {
    /// Inline base64 payload (standard alphabet, padded).
    Inline {
        /// Encoded table bytes.
        base64: String,
    },
    /// File written by the artifact store.
    External {
        /// Absolute path to the written file.
        path: String,
    },
}

/// Result of a successful compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOutput {
    /// Delivered artifact.
    #[serde(flatten)]
    pub delivery: Delivery,
    /// Progress counts for the compiled catalog.
    pub summary: Summary,
    /// Digest of the encoded bytes.
    pub digest: HashDigest,
    /// Size of the encoded table in bytes.
    pub size_bytes: usize,
}

// ============================================================================
// SECTION: Compiler Service
// ============================================================================

/// Stateless compiler facade shared by the MCP server and the CLI.
#[derive(Clone)]
pub struct CompilerService {
    /// Store used for external delivery.
    store: Option<Arc<dyn ArtifactStore>>,
    /// Maximum catalog text size in bytes.
    max_input_bytes: usize,
    /// Mode used when a caller does not name a recognized one.
    default_mode: DeliveryMode,
}

impl fmt::Debug for CompilerService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerService")
            .field("store", &self.store.is_some())
            .field("max_input_bytes", &self.max_input_bytes)
            .field("default_mode", &self.default_mode)
            .finish()
    }
}

impl Default for CompilerService {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilerService {
    /// Creates a service with no artifact store and default limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: None,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            default_mode: DeliveryMode::Inline,
        }
    }

    /// Attaches the store used for external delivery.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Overrides the catalog text size limit.
    #[must_use]
    pub fn with_max_input_bytes(mut self, max_input_bytes: usize) -> Self {
        self.max_input_bytes = max_input_bytes;
        self
    }

    /// Overrides the fallback delivery mode.
    #[must_use]
    pub fn with_default_mode(mut self, default_mode: DeliveryMode) -> Self {
        self.default_mode = default_mode;
        self
    }

    /// Returns the fallback delivery mode.
    #[must_use]
    pub const fn default_mode(&self) -> DeliveryMode {
        self.default_mode
    }

    /// Returns the catalog text size limit in bytes.
    #[must_use]
    pub const fn max_input_bytes(&self) -> usize {
        self.max_input_bytes
    }

    /// Resolves an optional caller-supplied mode label.
    #[must_use]
    pub fn resolve_mode(&self, label: Option<&str>) -> DeliveryMode {
        DeliveryMode::parse(label, self.default_mode)
    }

    /// Compiles catalog text into a binary table.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] when the input is blank or too large, fails to
    /// parse, cannot be encoded, or cannot be stored.
    pub fn compile(&self, text: &str, mode: DeliveryMode) -> Result<CompileOutput, CompileError> {
        let (bytes, summary) = self.compile_to_bytes(text)?;
        let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, &bytes);
        let delivery = match mode {
            DeliveryMode::Inline => Delivery::Inline {
                base64: STANDARD.encode(&bytes),
            },
            DeliveryMode::External => {
                let store = self.store.as_ref().ok_or_else(|| {
                    StorageError::Unavailable("no artifact store configured".to_string())
                })?;
                Delivery::External {
                    path: store.store(&bytes)?.path,
                }
            }
        };
        Ok(CompileOutput {
            delivery,
            summary,
            digest,
            size_bytes: bytes.len(),
        })
    }

    /// Compiles catalog text into raw table bytes plus its summary, leaving
    /// delivery to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] when the input is blank or too large, fails to
    /// parse, or cannot be encoded.
    pub fn compile_to_bytes(&self, text: &str) -> Result<(Vec<u8>, Summary), CompileError> {
        let catalog = self.load(text)?;
        let bytes = encode(&flatten(&catalog))?;
        Ok((bytes, summarize(&catalog)))
    }

    /// Validates catalog text and reports warnings with the summary.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] when the input is blank, too large, or fails to
    /// parse.
    pub fn validate(&self, text: &str) -> Result<ValidationReport, CompileError> {
        let catalog = self.load(text)?;
        Ok(ValidationReport {
            warnings: validate(&catalog),
            summary: summarize(&catalog),
        })
    }

    /// Summarizes translation progress for catalog text.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] when the input is blank, too large, or fails to
    /// parse.
    pub fn summarize(&self, text: &str) -> Result<Summary, CompileError> {
        Ok(summarize(&self.load(text)?))
    }

    /// Decodes a binary table into its records.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Format`] when the bytes are not a valid table.
    pub fn inspect(&self, bytes: &[u8]) -> Result<Vec<Record>, CompileError> {
        Ok(decode(bytes)?)
    }

    /// Checks input bounds and parses the catalog.
    fn load(&self, text: &str) -> Result<Catalog, CompileError> {
        if text.trim().is_empty() {
            return Err(CompileError::EmptyInput);
        }
        if text.len() > self.max_input_bytes {
            return Err(CompileError::InputTooLarge {
                max_bytes: self.max_input_bytes,
                actual_bytes: text.len(),
            });
        }
        Ok(parse(text)?)
    }
}
