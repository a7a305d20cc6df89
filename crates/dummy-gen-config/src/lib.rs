// crates/dummy-gen-config/src/lib.rs
// ============================================================================
// Module: Dummy Gen Config Library
// Description: Canonical config model and validation for dummy-gen.
// Purpose: Single source of truth for dummy-gen.toml semantics.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! `dummy-gen-config` defines the configuration model for the dummy object
//! generator: where the package export file lives, where dummy files are
//! written, per-backend file name overrides, and event logging. Loading is
//! strict and fails closed on oversized, non-UTF-8, or invalid input.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
