//! Doctor command implementation
//!
//! Checks that protoc can be found and started.

use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode, Stdio};

use protoc_runner::config::DEFAULT_EXECUTABLE;

/// Run the doctor command
///
/// Checks:
/// - protoc resolution (explicit path or `PATH` lookup)
/// - protoc version
///
/// # Returns
/// Exit code: 0 if protoc is usable, 1 otherwise
pub fn run(executable: Option<&str>) -> Result<ExitCode> {
    println!("{}", "Protoc Runner Doctor".cyan().bold());
    println!("{}", "====================".cyan());
    println!();

    println!("{}", "Versions:".bold());
    println!(
        "  {} protoc-runner v{}",
        "->".green(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("{}", "Dependencies:".bold());
    let requested = executable.unwrap_or(DEFAULT_EXECUTABLE);
    let all_ok = match check_protoc(requested) {
        ProtocStatus::Found { path, version } => {
            println!(
                "  {} protoc {} ({})",
                "ok".green(),
                version,
                path.display()
            );
            true
        }
        ProtocStatus::NotFound => {
            println!("  {} protoc not found: {}", "!!".red(), requested);
            println!(
                "     {}",
                "Install from https://github.com/protocolbuffers/protobuf/releases".dimmed()
            );
            false
        }
        ProtocStatus::Error(e) => {
            println!("  {} protoc check failed: {}", "!!".red(), e);
            false
        }
    };

    println!();

    if all_ok {
        println!("{} All checks passed!", "SUCCESS".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} Some checks failed. See above for details.",
            "WARNING".yellow().bold()
        );
        Ok(ExitCode::from(1))
    }
}

/// Status of the protoc installation check
enum ProtocStatus {
    Found { path: PathBuf, version: String },
    NotFound,
    Error(String),
}

/// Resolves `executable` the way the OS would: paths with a directory part
/// are taken as-is, bare names are looked up on `PATH`.
fn resolve_executable(executable: &str) -> Option<PathBuf> {
    let path = Path::new(executable);
    if path.components().count() > 1 {
        return path.is_file().then(|| path.to_path_buf());
    }
    which::which(executable).ok()
}

fn parse_protoc_version(output: &str) -> Option<String> {
    // "libprotoc 25.1"
    output
        .lines()
        .next()
        .and_then(|line| line.trim().strip_prefix("libprotoc "))
        .map(|v| v.trim().to_string())
}

fn check_protoc(executable: &str) -> ProtocStatus {
    let Some(path) = resolve_executable(executable) else {
        return ProtocStatus::NotFound;
    };

    let result = Command::new(&path)
        .arg("--version")
        .stdin(Stdio::null())
        .output();
    match result {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let version = parse_protoc_version(&stdout).unwrap_or_else(|| "unknown".to_string());
            ProtocStatus::Found { path, version }
        }
        Ok(output) => ProtocStatus::Error(format!("protoc exited with status: {}", output.status)),
        Err(e) => ProtocStatus::Error(e.to_string()),
    }
}
