// crates/dummy-gen/src/events.rs
// ============================================================================
// Module: Structured Events
// Description: JSON-line events for scans and dummy file checks.
// Purpose: Emit machine-readable logs without a logging framework.
// Dependencies: dummy-gen-config, serde, serde_json
// ============================================================================

//! ## Overview
//! Events describe what a run did: how many groups a scan produced, and
//! which dummy modules were in sync, drifted, or rewritten. Sinks serialize
//! each event as one JSON line; deployments pick stderr, a file, or nothing
//! through the `[logging]` config table.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use dummy_gen_config::LoggingConfig;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Event classification.
///
/// # Invariants
/// - Labels are stable for log consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DummyEventKind {
    /// Export file scanned into backend groups.
    InitScanned,
    /// Dummy module matches the rendered output.
    DummyInSync,
    /// Dummy module differs from the rendered output.
    DummyDrift,
    /// Dummy module rewritten with the rendered output.
    DummyUpdated,
}

/// Structured event payload.
#[derive(Debug, Clone, Serialize)]
pub struct DummyEvent {
    /// Event identifier.
    pub event: DummyEventKind,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Canonical backend key when the event concerns one group.
    pub backend: Option<String>,
    /// File the event concerns.
    pub path: Option<String>,
    /// Number of symbols (per group) or groups (per scan).
    pub count: usize,
}

impl DummyEvent {
    /// Creates a new event with the current timestamp.
    #[must_use]
    pub fn new(
        event: DummyEventKind,
        backend: Option<String>,
        path: Option<&Path>,
        count: usize,
    ) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            timestamp_ms,
            backend,
            path: path.map(|path| path.display().to_string()),
            count,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Sink for structured events.
pub trait EventSink: Send + Sync {
    /// Records an event.
    fn record(&self, event: &DummyEvent);
}

/// Sink that logs JSON lines to stderr.
pub struct StderrEventSink;

impl EventSink for StderrEventSink {
    fn record(&self, event: &DummyEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileEventSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileEventSink {
    /// Opens the event log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl EventSink for FileEventSink {
    fn record(&self, event: &DummyEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Sink that discards events.
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn record(&self, _event: &DummyEvent) {}
}

/// Builds the sink selected by the logging configuration.
///
/// Relative log paths resolve against `base`.
///
/// # Errors
///
/// Returns an error if the configured log file cannot be opened.
pub fn sink_from_config(config: &LoggingConfig, base: &Path) -> io::Result<Arc<dyn EventSink>> {
    if !config.enabled {
        return Ok(Arc::new(NoopEventSink));
    }
    match &config.path {
        Some(path) => Ok(Arc::new(FileEventSink::new(&base.join(path.trim()))?)),
        None => Ok(Arc::new(StderrEventSink)),
    }
}
