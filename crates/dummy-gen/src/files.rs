// crates/dummy-gen/src/files.rs
// ============================================================================
// Module: File Helpers
// Description: Bounded reads and atomic writes for source and dummy files.
// Purpose: Keep filesystem handling fail-closed and crash-safe.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Export files are read with a hard size cap and must be UTF-8. Dummy
//! modules are written to a temporary sibling first and then renamed into
//! place, so an interrupted run never leaves a truncated module behind.

use std::fs;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use crate::DummyGenError;

// ============================================================================
// CONSTANTS: Input limits and temporary output handling
// ============================================================================

/// Maximum export file size accepted by the scanner.
pub const MAX_INIT_BYTES: u64 = 4 * 1024 * 1024;

/// Attempts made to allocate a unique temporary file.
const TEMP_ATTEMPTS: usize = 16;
/// Counter making temporary file names unique within the process.
static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

// ============================================================================
// SECTION: Reading
// ============================================================================

/// Reads a UTF-8 source file, rejecting files larger than `limit` bytes.
///
/// # Errors
/// Returns [`DummyGenError::Io`] when the file cannot be read and
/// [`DummyGenError::Scan`] when it is too large or not UTF-8.
pub fn read_source(path: &Path, limit: u64) -> Result<String, DummyGenError> {
    let file = fs::File::open(path)
        .map_err(|err| DummyGenError::Io(format!("{}: {err}", path.display())))?;
    let metadata = file.metadata().map_err(|err| DummyGenError::Io(err.to_string()))?;
    if metadata.len() > limit {
        return Err(DummyGenError::Scan(format!(
            "{} exceeds {limit} bytes",
            path.display()
        )));
    }
    let mut bytes = Vec::new();
    let mut limited = file.take(limit + 1);
    limited.read_to_end(&mut bytes).map_err(|err| DummyGenError::Io(err.to_string()))?;
    let size = u64::try_from(bytes.len()).map_err(|_| {
        DummyGenError::Scan("source size exceeds addressable memory".to_string())
    })?;
    if size > limit {
        return Err(DummyGenError::Scan(format!(
            "{} exceeds {limit} bytes",
            path.display()
        )));
    }
    String::from_utf8(bytes)
        .map_err(|_| DummyGenError::Scan(format!("{} must be utf-8", path.display())))
}

/// Reads an existing dummy module, treating a missing file as empty.
///
/// # Errors
/// Returns [`DummyGenError::Io`] for read failures other than not-found.
pub fn read_existing(path: &Path) -> Result<String, DummyGenError> {
    match fs::read(path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(DummyGenError::Io(format!("{}: {err}", path.display()))),
    }
}

// ============================================================================
// SECTION: Writing
// ============================================================================

/// Writes the contents to the path via a temporary file and rename.
///
/// Parent directories are created when missing. On platforms without
/// atomic replace, this falls back to remove-and-rename.
///
/// # Errors
/// Returns [`DummyGenError::Io`] when any filesystem step fails.
pub fn write_output(path: &Path, contents: &str) -> Result<(), DummyGenError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| DummyGenError::Io(err.to_string()))?;
    }
    let (temp_path, mut file) = create_temp_output(path)?;
    if let Err(err) = file.write_all(contents.as_bytes()) {
        let _ = fs::remove_file(&temp_path);
        return Err(DummyGenError::Io(err.to_string()));
    }
    if let Err(err) = file.sync_all() {
        let _ = fs::remove_file(&temp_path);
        return Err(DummyGenError::Io(err.to_string()));
    }
    drop(file);
    persist_temp_output(&temp_path, path)
}

/// Creates a unique temporary output file alongside the destination.
fn create_temp_output(path: &Path) -> Result<(PathBuf, fs::File), DummyGenError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| DummyGenError::Io("output path does not include a file name".to_string()))?;
    for _ in 0 .. TEMP_ATTEMPTS {
        let attempt = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp_name = format!(".{file_name}.tmp.{}.{}", std::process::id(), attempt);
        let temp_path = parent.join(temp_name);
        match OpenOptions::new().write(true).create_new(true).open(&temp_path) {
            Ok(file) => return Ok((temp_path, file)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
            Err(err) => return Err(DummyGenError::Io(err.to_string())),
        }
    }
    Err(DummyGenError::Io("failed to allocate temporary output path".to_string()))
}

/// Moves the temporary output file to the final destination.
fn persist_temp_output(temp_path: &Path, path: &Path) -> Result<(), DummyGenError> {
    match fs::rename(temp_path, path) {
        Ok(()) => Ok(()),
        Err(err) => {
            if path.exists() {
                fs::remove_file(path).map_err(|err| DummyGenError::Io(err.to_string()))?;
                fs::rename(temp_path, path).map_err(|err| DummyGenError::Io(err.to_string()))?;
                return Ok(());
            }
            let _ = fs::remove_file(temp_path);
            Err(DummyGenError::Io(err.to_string()))
        }
    }
}
