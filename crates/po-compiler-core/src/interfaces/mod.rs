// crates/po-compiler-core/src/interfaces/mod.rs
// ============================================================================
// Module: PO Compiler Interfaces
// Description: Backend-agnostic storage interface for compiled artifacts.
// Purpose: Let hosts decide where externally delivered binary tables land.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The compiler never touches the filesystem directly. External delivery hands
//! the encoded bytes to an [`ArtifactStore`], which persists them and returns a
//! location the caller can read back. Implementations must create a fresh,
//! uniquely named artifact on every call and must leave it in place after the
//! call returns; cleanup is the caller's responsibility.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Artifact Store
// ============================================================================

/// Artifact storage errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The backing store failed to create or write the artifact.
    #[error("artifact io error: {0}")]
    Io(String),
    /// No store is configured for external delivery.
    #[error("artifact store unavailable: {0}")]
    Unavailable(String),
}

/// Location of a persisted artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLocation {
    /// Absolute path to the artifact.
    pub path: String,
}

/// Persists compiled artifacts for external delivery.
pub trait ArtifactStore: Send + Sync {
    /// Writes `bytes` to a new artifact and returns its location.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the artifact cannot be created or written.
    fn store(&self, bytes: &[u8]) -> Result<ArtifactLocation, StorageError>;
}
