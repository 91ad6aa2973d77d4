//! CLI command implementations

pub mod command;
pub mod doctor;
pub mod run;

use std::path::Path;

use anyhow::{Context, Result};
use protoc_runner::{Invocation, InvocationConfig};
use tracing::debug;

/// Loads a configuration file and builds the invocation it describes.
pub(crate) fn load_invocation(config_path: &str) -> Result<Invocation> {
    let config = InvocationConfig::load(Path::new(config_path))
        .with_context(|| format!("Failed to load configuration: {}", config_path))?;
    let invocation = config
        .build()
        .with_context(|| format!("Invalid invocation in {}", config_path))?;
    debug!(
        config = config_path,
        proto_files = invocation.proto_files().len(),
        "Loaded invocation configuration"
    );
    Ok(invocation)
}

/// Maps a process exit status onto the CLI's own exit code.
pub(crate) fn exit_code_from_status(status: i32) -> u8 {
    u8::try_from(status).unwrap_or(1)
}
