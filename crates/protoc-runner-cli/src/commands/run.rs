//! Run command implementation
//!
//! Builds an invocation from a configuration file and launches protoc.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::process::ExitCode;
use std::time::Instant;

use protoc_runner::Launcher;

use super::{exit_code_from_status, load_invocation};

/// Result of a protoc run, as printed with `--json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunOutput {
    /// Exit status reported by protoc
    pub exit_code: i32,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

/// Run the run command
///
/// # Arguments
/// * `config_path` - Path to the JSON configuration file
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: protoc's own exit status
pub fn run(config_path: &str, json_output: bool) -> Result<ExitCode> {
    let invocation = load_invocation(config_path)?;
    invocation.log_execution_parameters();

    let start = Instant::now();
    let mut launcher = Launcher::new();
    let exit_code = launcher
        .launch(&invocation)
        .with_context(|| format!("Failed to run {}", invocation.executable().display()))?;

    let output = RunOutput {
        exit_code,
        stdout: launcher.output(),
        stderr: launcher.error(),
    };

    if json_output {
        let json =
            serde_json::to_string_pretty(&output).context("Failed to serialize run output")?;
        println!("{}", json);
    } else {
        print_human(&output, start.elapsed().as_millis())?;
    }

    Ok(ExitCode::from(exit_code_from_status(exit_code)))
}

fn print_human(output: &RunOutput, elapsed_ms: u128) -> Result<()> {
    std::io::stdout().write_all(output.stdout.as_bytes())?;
    std::io::stderr().write_all(output.stderr.as_bytes())?;

    if output.exit_code == 0 {
        eprintln!(
            "{} protoc finished in {}ms",
            "SUCCESS".green().bold(),
            elapsed_ms
        );
    } else {
        eprintln!(
            "{} protoc exited with status {}",
            "FAILED".red().bold(),
            output.exit_code
        );
    }
    Ok(())
}
