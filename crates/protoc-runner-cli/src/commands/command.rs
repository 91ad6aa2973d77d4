//! Command command implementation
//!
//! Prints the protoc arguments a configuration file produces, without
//! running protoc.

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::ExitCode;

use super::load_invocation;

/// Run the command command
///
/// # Arguments
/// * `config_path` - Path to the JSON configuration file
/// * `json_output` - Print the tokens as a JSON array
///
/// # Returns
/// Exit code: 0 if the configuration is valid
pub fn run(config_path: &str, json_output: bool) -> Result<ExitCode> {
    let invocation = load_invocation(config_path)?;
    let command_line = invocation.command_line();

    if json_output {
        let json = serde_json::to_string_pretty(&command_line)
            .context("Failed to serialize command line")?;
        println!("{}", json);
    } else {
        eprintln!(
            "{} {}",
            "Executable:".cyan().bold(),
            invocation.executable().display()
        );
        for token in &command_line {
            println!("{}", token);
        }
    }

    Ok(ExitCode::SUCCESS)
}
