// crates/dummy-gen/src/checker.rs
// ============================================================================
// Module: Dummy Drift Checker
// Description: Compares rendered dummy modules against the files on disk.
// Purpose: Fail on stale dummy modules, or rewrite them in fix mode.
// Dependencies: dummy-gen-config
// ============================================================================

//! ## Overview
//! The checker resolves the package layout from configuration, scans the
//! export file, renders one dummy module per backend group, and compares
//! each against `<package>/<dummy_dir>/dummy_<short>_objects.py`. Missing
//! files compare as empty text.

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use dummy_gen_config::DummyGenConfig;

use crate::DummyGenError;
use crate::events::DummyEvent;
use crate::events::DummyEventKind;
use crate::events::EventSink;
use crate::files::MAX_INIT_BYTES;
use crate::files::read_existing;
use crate::files::read_source;
use crate::files::write_output;
use crate::render::create_dummy_files;
use crate::scanner::BackendObjects;
use crate::scanner::scan_init;

// ============================================================================
// SECTION: Layout
// ============================================================================

/// Resolved locations of the export file and dummy modules.
#[derive(Debug, Clone)]
pub struct PackageLayout {
    /// Package directory (repository root joined with the package root).
    package_dir: PathBuf,
    /// Export file name inside the package directory.
    init_file: String,
    /// Dummy module directory relative to the package directory.
    dummy_dir: String,
    /// Dotted package name used in messages.
    package_name: String,
    /// Backend key to file name overrides.
    short_names: BTreeMap<String, String>,
}

impl PackageLayout {
    /// Resolves the layout for a repository root.
    #[must_use]
    pub fn from_config(repo_root: &Path, config: &DummyGenConfig) -> Self {
        Self {
            package_dir: repo_root.join(config.package.root.trim()),
            init_file: config.package.init_file.trim().to_string(),
            dummy_dir: config.package.dummy_dir.trim().trim_end_matches('/').to_string(),
            package_name: config.package.package_name().to_string(),
            short_names: config.short_names.clone(),
        }
    }

    /// Returns the package directory.
    #[must_use]
    pub fn package_dir(&self) -> &Path {
        &self.package_dir
    }

    /// Returns the export file path.
    #[must_use]
    pub fn init_path(&self) -> PathBuf {
        self.package_dir.join(&self.init_file)
    }

    /// Returns the file name component for a backend key.
    #[must_use]
    pub fn short_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.short_names.get(key).map_or(key, String::as_str)
    }

    /// Returns the dummy module path for a backend key.
    #[must_use]
    pub fn dummy_file_path(&self, key: &str) -> PathBuf {
        self.package_dir.join(&self.dummy_dir).join(self.dummy_file_name(key))
    }

    /// Returns the dotted module name for a backend key, as used in messages.
    #[must_use]
    pub fn dummy_module(&self, key: &str) -> String {
        let dotted_dir = self.dummy_dir.replace(['/', '\\'], ".");
        format!("{}.{dotted_dir}.{}", self.package_name, self.dummy_file_name(key))
    }

    /// Returns `dummy_<short>_objects.py`.
    fn dummy_file_name(&self, key: &str) -> String {
        format!("dummy_{}_objects.py", self.short_name(key))
    }
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Whether a run only checks or also rewrites stale modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// Fail when any module is stale.
    Check,
    /// Rewrite stale modules.
    Fix,
}

/// Outcome for one dummy module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DummyFileState {
    /// On-disk module matches the rendered output.
    InSync,
    /// On-disk module is missing or stale.
    Drifted,
    /// Module was rewritten.
    Updated,
}

/// Status of one dummy module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DummyFileStatus {
    /// Canonical backend key.
    pub backend: String,
    /// Dotted module name.
    pub module: String,
    /// Module path.
    pub path: PathBuf,
    /// Check outcome.
    pub state: DummyFileState,
}

/// Result of a check or fix run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Per-module statuses in canonical key order.
    pub files: Vec<DummyFileStatus>,
}

impl CheckReport {
    /// Returns the modules rewritten by a fix run.
    pub fn updated(&self) -> impl Iterator<Item = &DummyFileStatus> {
        self.files.iter().filter(|status| status.state == DummyFileState::Updated)
    }

    /// Returns true when every module was already in sync.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.files.iter().all(|status| status.state == DummyFileState::InSync)
    }
}

// ============================================================================
// SECTION: Checker
// ============================================================================

/// Scans, renders, and checks dummy modules for one package.
pub struct DummyChecker {
    /// Package layout.
    layout: PackageLayout,
    /// Event sink for run events.
    sink: Arc<dyn EventSink>,
}

impl DummyChecker {
    /// Creates a checker for a package layout.
    #[must_use]
    pub fn new(layout: PackageLayout, sink: Arc<dyn EventSink>) -> Self {
        Self {
            layout,
            sink,
        }
    }

    /// Returns the package layout.
    #[must_use]
    pub const fn layout(&self) -> &PackageLayout {
        &self.layout
    }

    /// Reads and scans the export file.
    ///
    /// # Errors
    /// Returns [`DummyGenError`] when the file cannot be read or scanned.
    pub fn read_init(&self) -> Result<BackendObjects, DummyGenError> {
        let path = self.layout.init_path();
        let source = read_source(&path, MAX_INIT_BYTES)?;
        let objects = scan_init(&source)?;
        self.sink.record(&DummyEvent::new(
            DummyEventKind::InitScanned,
            None,
            Some(&path),
            objects.len(),
        ));
        Ok(objects)
    }

    /// Renders the dummy modules for the scanned export file.
    ///
    /// # Errors
    /// Returns [`DummyGenError`] when the export file cannot be scanned.
    pub fn create_dummy_files(&self) -> Result<BTreeMap<String, String>, DummyGenError> {
        Ok(create_dummy_files(&self.read_init()?))
    }

    /// Compares rendered modules with the files on disk.
    ///
    /// In [`CheckMode::Fix`], stale modules are rewritten atomically.
    ///
    /// # Errors
    /// Returns [`DummyGenError::Drift`] in [`CheckMode::Check`] when any
    /// module is stale, naming every stale module, and other variants for
    /// scan or IO failures.
    pub fn check(&self, mode: CheckMode) -> Result<CheckReport, DummyGenError> {
        let objects = self.read_init()?;
        let rendered = create_dummy_files(&objects);
        let mut report = CheckReport::default();
        let mut drift = Vec::new();
        for (key, contents) in &rendered {
            let path = self.layout.dummy_file_path(key);
            let module = self.layout.dummy_module(key);
            let count = objects.symbols(key).map_or(0, <[String]>::len);
            let existing = read_existing(&path)?;
            let state = if existing == *contents {
                DummyFileState::InSync
            } else {
                match mode {
                    CheckMode::Check => {
                        drift.push(format!(
                            "The main __init__ has objects that are not present in {module}. Run \
                             `make fix-copies` to fix this."
                        ));
                        DummyFileState::Drifted
                    }
                    CheckMode::Fix => {
                        write_output(&path, contents)?;
                        DummyFileState::Updated
                    }
                }
            };
            let kind = match state {
                DummyFileState::InSync => DummyEventKind::DummyInSync,
                DummyFileState::Drifted => DummyEventKind::DummyDrift,
                DummyFileState::Updated => DummyEventKind::DummyUpdated,
            };
            self.sink.record(&DummyEvent::new(kind, Some(key.clone()), Some(&path), count));
            report.files.push(DummyFileStatus {
                backend: key.clone(),
                module,
                path,
                state,
            });
        }
        if !drift.is_empty() {
            return Err(DummyGenError::Drift(drift.join(" ")));
        }
        Ok(report)
    }
}
