// crates/dummy-gen-config/src/config.rs
// ============================================================================
// Module: Dummy Gen Configuration
// Description: Configuration loading and validation for dummy-gen.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! When no path is given and neither the environment override nor the
//! default file exists, [`DummyGenConfig::discover`] falls back to built-in
//! defaults that match the `ppdiffusers` source layout.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "dummy-gen.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "DUMMY_GEN_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of short name overrides.
pub(crate) const MAX_SHORT_NAMES: usize = 64;
/// Maximum length of a backend key or short name.
pub(crate) const MAX_NAME_LENGTH: usize = 128;
/// Default package directory relative to the repository root.
pub(crate) const DEFAULT_PACKAGE_ROOT: &str = "src/ppdiffusers";
/// Default export file inside the package directory.
pub(crate) const DEFAULT_INIT_FILE: &str = "__init__.py";
/// Default dummy file directory inside the package directory.
pub(crate) const DEFAULT_DUMMY_DIR: &str = "utils";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Dummy generator configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DummyGenConfig {
    /// Package layout configuration.
    #[serde(default)]
    pub package: PackageConfig,
    /// Backend key to dummy file name overrides (`paddle = "pd"`).
    #[serde(default)]
    pub short_names: BTreeMap<String, String>,
    /// Event logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Path the configuration was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl DummyGenConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        Self::load_resolved(&resolved)
    }

    /// Loads configuration like [`DummyGenConfig::load`], but returns the
    /// built-in defaults when no path or environment override is given and
    /// the default file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an existing config fails to load.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        if path.is_none() && env::var_os(CONFIG_ENV_VAR).is_none() {
            let default_path = Path::new(DEFAULT_CONFIG_NAME);
            if !default_path.exists() {
                return Ok(Self::default());
            }
        }
        Self::load(path)
    }

    /// Parses configuration from TOML text and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
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
        self.package.validate()?;
        self.logging.validate()?;
        validate_short_names(&self.short_names)
    }

    /// Reads and validates a config file at an already resolved path.
    fn load_resolved(resolved: &Path) -> Result<Self, ConfigError> {
        validate_path(resolved)?;
        let bytes = fs::read(resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.source_path = Some(resolved.to_path_buf());
        Ok(config)
    }
}

/// Package layout configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageConfig {
    /// Package directory relative to the repository root.
    #[serde(default = "default_package_root")]
    pub root: String,
    /// Export declaration file inside the package directory.
    #[serde(default = "default_init_file")]
    pub init_file: String,
    /// Directory inside the package holding the generated dummy files.
    #[serde(default = "default_dummy_dir")]
    pub dummy_dir: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            root: default_package_root(),
            init_file: default_init_file(),
            dummy_dir: default_dummy_dir(),
        }
    }
}

impl PackageConfig {
    /// Returns the dotted package name, taken from the last root component.
    #[must_use]
    pub fn package_name(&self) -> &str {
        Path::new(self.root.trim())
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(self.root.as_str())
    }

    /// Validates package layout paths.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("package.root", &self.root)?;
        validate_path_string("package.dummy_dir", &self.dummy_dir)?;
        validate_file_name("package.init_file", &self.init_file)?;
        if Path::new(self.dummy_dir.trim()).is_absolute() {
            return Err(ConfigError::Invalid("package.dummy_dir must be relative".to_string()));
        }
        if Path::new(self.dummy_dir.trim())
            .components()
            .any(|component| matches!(component, Component::ParentDir))
        {
            return Err(ConfigError::Invalid(
                "package.dummy_dir must stay inside the package".to_string(),
            ));
        }
        Ok(())
    }
}

/// Structured event logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable structured event logging.
    #[serde(default)]
    pub enabled: bool,
    /// Optional event log path (JSON lines). Events go to stderr when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl LoggingConfig {
    /// Validates logging configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("logging.path", path)?;
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
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
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
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates that a value is a single plain file name.
fn validate_file_name(field: &str, value: &str) -> Result<(), ConfigError> {
    validate_path_string(field, value)?;
    let mut components = Path::new(value.trim()).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ConfigError::Invalid(format!("{field} must be a plain file name"))),
    }
}

/// Validates short name overrides.
fn validate_short_names(short_names: &BTreeMap<String, String>) -> Result<(), ConfigError> {
    if short_names.len() > MAX_SHORT_NAMES {
        return Err(ConfigError::Invalid("too many short_names entries".to_string()));
    }
    for (key, short) in short_names {
        if !is_identifier(key) {
            return Err(ConfigError::Invalid(format!(
                "short_names key {key:?} must be a lowercase backend key"
            )));
        }
        if !is_identifier(short) {
            return Err(ConfigError::Invalid(format!(
                "short_names.{key} must be lowercase letters, digits, or underscores"
            )));
        }
    }
    Ok(())
}

/// Returns true for non-empty lowercase identifiers starting with a letter.
fn is_identifier(value: &str) -> bool {
    value.len() <= MAX_NAME_LENGTH
        && value.chars().next().is_some_and(|first| first.is_ascii_lowercase())
        && value.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
}

/// Default package directory.
fn default_package_root() -> String {
    DEFAULT_PACKAGE_ROOT.to_string()
}

/// Default export file name.
fn default_init_file() -> String {
    DEFAULT_INIT_FILE.to_string()
}

/// Default dummy file directory.
fn default_dummy_dir() -> String {
    DEFAULT_DUMMY_DIR.to_string()
}
