// crates/po-compiler-core/src/core/mod.rs
// ============================================================================
// Module: PO Compiler Core Types
// Description: Catalog model, binary records, and progress summaries.
// Purpose: Provide stable, serializable types shared by every compiler stage.
// Dependencies: serde, sha2
// ============================================================================

//! ## Overview
//! Core types describe a parsed translation catalog, the flat key/value records
//! written into the binary table, and the derived progress summary. These types
//! are the canonical source of truth for the MCP and CLI surfaces.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod catalog;
pub mod hashing;
pub mod record;
pub mod summary;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::Catalog;
pub use catalog::METADATA_ID;
pub use catalog::Translation;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::hash_bytes;
pub use record::CONTEXT_SEPARATOR;
pub use record::PLURAL_SEPARATOR;
pub use record::Record;
pub use record::RecordView;
pub use summary::Summary;
