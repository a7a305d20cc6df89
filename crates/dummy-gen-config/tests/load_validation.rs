//! Config load validation tests for dummy-gen-config.
// crates/dummy-gen-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding, fields).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use dummy_gen_config::ConfigError;
use dummy_gen_config::DummyGenConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<DummyGenConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(content: &str) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content.as_bytes()).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(DummyGenConfig::load(Some(path)), "config path exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(DummyGenConfig::load(Some(path)), "config path component too long")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'a'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(DummyGenConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(DummyGenConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_rejects_unknown_fields() -> TestResult {
    let file = write_config("[package]\nroot = \"src/pkg\"\nflavour = \"x\"\n")?;
    assert_invalid(DummyGenConfig::load(Some(file.path())), "config parse error")
}

#[test]
fn load_rejects_nested_init_file() -> TestResult {
    let file = write_config("[package]\ninit_file = \"sub/__init__.py\"\n")?;
    assert_invalid(DummyGenConfig::load(Some(file.path())), "package.init_file must be a plain")
}

#[test]
fn load_rejects_escaping_dummy_dir() -> TestResult {
    let file = write_config("[package]\ndummy_dir = \"../outside\"\n")?;
    assert_invalid(DummyGenConfig::load(Some(file.path())), "must stay inside the package")
}

#[test]
fn load_rejects_invalid_short_name() -> TestResult {
    let file = write_config("[short_names]\npaddle = \"Pd-1\"\n")?;
    assert_invalid(DummyGenConfig::load(Some(file.path())), "short_names.paddle")
}

#[test]
fn load_applies_defaults_for_empty_file() -> TestResult {
    let file = write_config("")?;
    let config = DummyGenConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.package.root != "src/ppdiffusers" {
        return Err(format!("unexpected package root {}", config.package.root));
    }
    if config.package.init_file != "__init__.py" || config.package.dummy_dir != "utils" {
        return Err("unexpected package defaults".to_string());
    }
    if config.logging.enabled {
        return Err("logging should default to disabled".to_string());
    }
    if config.source_path.as_deref() != Some(file.path()) {
        return Err("source path should be recorded".to_string());
    }
    Ok(())
}

#[test]
fn load_reads_short_names_and_logging() -> TestResult {
    let file = write_config(
        "[package]\nroot = \"src/diffusers\"\n\n[short_names]\ntorch = \"pt\"\n\n[logging]\nenabled \
         = true\npath = \"dummy-gen.log\"\n",
    )?;
    let config = DummyGenConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.short_names.get("torch").map(String::as_str) != Some("pt") {
        return Err("short name override not applied".to_string());
    }
    if config.short_names.contains_key("torch_and_scipy") {
        return Err("unexpected short name entry".to_string());
    }
    if config.package.package_name() != "diffusers" {
        return Err(format!("unexpected package name {}", config.package.package_name()));
    }
    if !config.logging.enabled || config.logging.path.as_deref() != Some("dummy-gen.log") {
        return Err("logging config not applied".to_string());
    }
    Ok(())
}
