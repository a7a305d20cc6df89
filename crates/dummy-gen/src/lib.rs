// crates/dummy-gen/src/lib.rs
// ============================================================================
// Module: Dummy Generator Library
// Description: Deterministic generator for backend dummy object modules.
// Purpose: Classify package exports by backend guard and render stubs.
// Dependencies: dummy-gen-config, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This crate keeps a Python package's autogenerated dummy modules in sync
//! with its export file. Exports guarded by optional-backend checks such as
//! `if not (is_paddle_available() and is_paddlenlp_available()):` are grouped
//! per backend combination, and each group is rendered into a placeholder
//! module whose symbols raise a "missing backend" error when used.
//!
//! ### Design Notes
//! - Classification and rendering are pure string transforms; only the
//!   [`DummyChecker`] touches the filesystem.
//! - Output is byte-exact: formatting of the rendered modules is part of the
//!   contract because drift checks compare whole files.
//! - Class stubs expose a fixed list of factory methods
//!   ([`FACTORY_METHODS`]) instead of inspecting live classes.
//!
//! ## Index
//! - Classification: [`find_backend`], [`BackendKey`]
//! - Scanning: [`scan_init`], [`BackendObjects`]
//! - Rendering: [`create_dummy_object`], [`create_dummy_files`]
//! - Drift checks: [`DummyChecker`], [`CheckMode`], [`CheckReport`]
//! - Logging: [`EventSink`] and its stderr, file, and no-op sinks

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod backend;
pub mod checker;
pub mod events;
pub mod files;
pub mod render;
pub mod scanner;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use backend::BACKEND_SEPARATOR;
pub use backend::BackendKey;
pub use backend::find_backend;
pub use checker::CheckMode;
pub use checker::CheckReport;
pub use checker::DummyChecker;
pub use checker::DummyFileState;
pub use checker::DummyFileStatus;
pub use checker::PackageLayout;
pub use events::DummyEvent;
pub use events::DummyEventKind;
pub use events::EventSink;
pub use events::FileEventSink;
pub use events::NoopEventSink;
pub use events::StderrEventSink;
pub use events::sink_from_config;
pub use files::MAX_INIT_BYTES;
pub use render::DUMMY_FILE_HEADER;
pub use render::DUMMY_FILE_IMPORTS;
pub use render::FACTORY_METHODS;
pub use render::SymbolKind;
pub use render::create_dummy_file;
pub use render::create_dummy_files;
pub use render::create_dummy_object;
pub use scanner::BackendGroup;
pub use scanner::BackendObjects;
pub use scanner::scan_init;

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the dummy generator.
///
/// # Invariants
/// - Variant meanings are stable for automation and tests.
///
/// # Examples
/// ```
/// use dummy_gen::DummyGenError;
///
/// let err = DummyGenError::Scan("duplicate export".to_string());
/// assert!(matches!(err, DummyGenError::Scan(message) if message == "duplicate export"));
/// ```
#[derive(Debug, Error)]
pub enum DummyGenError {
    /// IO error while reading or writing files.
    #[error("io error: {0}")]
    Io(String),
    /// Export file could not be scanned into backend groups.
    #[error("scan error: {0}")]
    Scan(String),
    /// Dummy files on disk differ from the rendered output.
    #[error("{0}")]
    Drift(String),
    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),
    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(String),
}

impl From<dummy_gen_config::ConfigError> for DummyGenError {
    fn from(err: dummy_gen_config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests;
