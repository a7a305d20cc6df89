// crates/dummy-gen/src/main.rs
// ============================================================================
// Module: Dummy Generator CLI
// Description: CLI entrypoint for scanning, rendering, and checking dummies.
// Purpose: Keep backend dummy modules in sync with the export file.
// Dependencies: clap, dummy-gen, dummy-gen-config
// ============================================================================

//! ## Overview
//! The dummy generator CLI scans a package's export file, prints the
//! backend grouping, renders individual dummy modules, and verifies or
//! rewrites the dummy modules on disk. IO failures and drift exit non-zero.

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use dummy_gen::BackendKey;
use dummy_gen::BackendObjects;
use dummy_gen::CheckMode;
use dummy_gen::DummyChecker;
use dummy_gen::DummyGenError;
use dummy_gen::PackageLayout;
use dummy_gen::create_dummy_files;
use dummy_gen::sink_from_config;
use dummy_gen_config::DummyGenConfig;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// CLI arguments for dummy generation.
#[derive(Debug, Parser)]
#[command(name = "dummy-gen", about = "Check and regenerate backend dummy objects.")]
struct Cli {
    /// Path to dummy-gen.toml.
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    /// Repository root the package paths are relative to.
    #[arg(long, value_name = "DIR", default_value = ".", global = true)]
    repo_root: PathBuf,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Supported CLI subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Print the backend to symbols mapping as JSON.
    Scan,
    /// Print the dummy module for the given symbols.
    Render {
        /// Canonical backend key, e.g. `paddle_and_paddlenlp`.
        #[arg(long, value_name = "KEY")]
        backend: String,
        /// Symbols to render, in order.
        #[arg(value_name = "NAME", required = true)]
        names: Vec<String>,
    },
    /// Fail when a dummy module is missing or stale.
    Check,
    /// Rewrite missing or stale dummy modules.
    Fix,
}

// ============================================================================
// SECTION: Command Dispatch
// ============================================================================

/// CLI entrypoint.
fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_error(&err),
    }
}

/// Dispatches the CLI command.
fn run() -> Result<(), DummyGenError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Scan => scan(cli.config.as_deref(), &cli.repo_root),
        Command::Render {
            backend,
            names,
        } => render(&backend, &names),
        Command::Check => check(cli.config.as_deref(), &cli.repo_root, CheckMode::Check),
        Command::Fix => check(cli.config.as_deref(), &cli.repo_root, CheckMode::Fix),
    }
}

/// Builds a checker from the resolved configuration.
fn build_checker(config: Option<&Path>, repo_root: &Path) -> Result<DummyChecker, DummyGenError> {
    let config = DummyGenConfig::discover(config)?;
    let sink = sink_from_config(&config.logging, repo_root)
        .map_err(|err| DummyGenError::Io(err.to_string()))?;
    Ok(DummyChecker::new(PackageLayout::from_config(repo_root, &config), sink))
}

/// Prints the scanned backend mapping.
fn scan(config: Option<&Path>, repo_root: &Path) -> Result<(), DummyGenError> {
    let checker = build_checker(config, repo_root)?;
    let objects = checker.read_init()?;
    let rendered = serde_json::to_string_pretty(&objects.to_json())
        .map_err(|err| DummyGenError::Json(err.to_string()))?;
    write_stdout_line(&rendered)
}

/// Prints one dummy module.
fn render(backend: &str, names: &[String]) -> Result<(), DummyGenError> {
    let key = BackendKey::parse(backend)?;
    let mut objects = BackendObjects::new();
    objects.insert_group(key.clone(), names)?;
    let files = create_dummy_files(&objects);
    let contents = files.get(&key.key()).map_or("", String::as_str);
    let mut stdout = std::io::stdout();
    stdout.write_all(contents.as_bytes()).map_err(|err| DummyGenError::Io(err.to_string()))
}

/// Checks or fixes dummy modules.
fn check(config: Option<&Path>, repo_root: &Path, mode: CheckMode) -> Result<(), DummyGenError> {
    let checker = build_checker(config, repo_root)?;
    let report = checker.check(mode)?;
    for status in report.updated() {
        write_stdout_line(&format!(
            "Updating {} as the main __init__ has new objects.",
            status.module
        ))?;
    }
    Ok(())
}

/// Writes one line to stdout.
fn write_stdout_line(line: &str) -> Result<(), DummyGenError> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{line}").map_err(|err| DummyGenError::Io(err.to_string()))
}

/// Reports a CLI error to stderr.
fn report_error(err: &DummyGenError) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "{err}");
    ExitCode::FAILURE
}
