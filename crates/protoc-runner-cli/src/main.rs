//! Protoc Runner CLI - Command-line interface for running protoc
//!
//! This binary loads a declarative JSON configuration, validates it, and
//! either prints the protoc command line or runs protoc.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use protoc_runner_cli::commands;

/// Protoc Runner - Validated protoc invocations from a configuration file
#[derive(Parser)]
#[command(name = "protoc-runner")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the protoc arguments for a configuration without running protoc
    Command {
        /// Path to the configuration file (JSON)
        #[arg(short, long)]
        config: String,

        /// Output the arguments as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Run protoc as described by a configuration file
    Run {
        /// Path to the configuration file (JSON)
        #[arg(short, long)]
        config: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Check that protoc can be found and started
    Doctor {
        /// protoc executable to check (default: protoc on PATH)
        #[arg(short, long)]
        executable: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Command { config, json } => commands::command::run(&config, json),
        Commands::Run { config, json } => commands::run::run(&config, json),
        Commands::Doctor { executable } => commands::doctor::run(executable.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_command() {
        let cli = Cli::try_parse_from(["protoc-runner", "command", "--config", "protoc.json"])
            .unwrap();
        assert!(!cli.verbose);
        match cli.command {
            Commands::Command { config, json } => {
                assert_eq!(config, "protoc.json");
                assert!(!json);
            }
            _ => panic!("expected command command"),
        }
    }

    #[test]
    fn test_cli_parses_run_with_verbose() {
        let cli = Cli::try_parse_from([
            "protoc-runner",
            "run",
            "-c",
            "protoc.json",
            "--json",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Run { config, json } => {
                assert_eq!(config, "protoc.json");
                assert!(json);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_cli_parses_doctor() {
        let cli = Cli::try_parse_from(["protoc-runner", "doctor"]).unwrap();
        assert!(matches!(cli.command, Commands::Doctor { executable: None }));

        let cli =
            Cli::try_parse_from(["protoc-runner", "doctor", "--executable", "/opt/protoc"])
                .unwrap();
        match cli.command {
            Commands::Doctor { executable } => {
                assert_eq!(executable.as_deref(), Some("/opt/protoc"));
            }
            _ => panic!("expected doctor command"),
        }
    }

    #[test]
    fn test_cli_requires_config() {
        assert!(Cli::try_parse_from(["protoc-runner", "run"]).is_err());
    }

    #[test]
    fn test_cli_verify_app() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
