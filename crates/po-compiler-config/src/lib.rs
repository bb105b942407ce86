// crates/po-compiler-config/src/lib.rs
// ============================================================================
// Module: PO Compiler Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for po-compiler.toml semantics.
// Dependencies: po-compiler-core, serde, toml
// ============================================================================

//! ## Overview
//! `po-compiler-config` defines the configuration model shared by the MCP
//! server and the CLI. Validation is strict and fails closed.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
