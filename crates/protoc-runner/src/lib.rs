//! Protoc Runner
//!
//! This crate builds and runs invocations of `protoc`, the Protocol Buffers
//! compiler. It turns a declarative description of a code generation run
//! into a validated [`Invocation`], assembles the exact protoc command line,
//! and launches protoc with a bounded retry on transient process-creation
//! failures.
//!
//! # Overview
//!
//! 1. **Builder** - [`InvocationBuilder`] checks each setting as it is added
//!    (directories exist, proto files sit under a proto path root, the native
//!    plugin id does not shadow a built-in generator) and the whole
//!    configuration in [`InvocationBuilder::build`].
//! 2. **Command assembly** - [`command::build_protoc_command`] maps an
//!    invocation to protoc arguments in a fixed order.
//! 3. **Argument files** - with `use_argument_file`, arguments are written
//!    to a temporary file passed as `@<path>`.
//! 4. **Launch** - [`Launcher`] executes protoc, retrying up to three times
//!    with a one second pause when process creation fails transiently.
//!
//! # Example
//!
//! ```no_run
//! use protoc_runner::{Invocation, Launcher};
//!
//! # fn main() -> protoc_runner::InvocationResult<()> {
//! let mut builder = Invocation::builder("/usr/local/bin/protoc");
//! builder
//!     .add_proto_path("src/main/proto")?
//!     .add_proto_file("src/main/proto/addressbook.proto")?
//!     .java_output_directory("target/generated-sources")?;
//! let invocation = builder.build()?;
//!
//! invocation.log_execution_parameters();
//! let mut launcher = Launcher::new();
//! let exit_code = launcher.launch(&invocation)?;
//! if exit_code != 0 {
//!     eprintln!("protoc failed:\n{}", launcher.error());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Crate Structure
//!
//! - [`invocation`] - Invocation descriptor and builder
//! - [`proto_path`] - Proto path roots and membership checks
//! - [`parameter`] - Native plugin parameter normalization
//! - [`plugin`] - Plugin descriptors
//! - [`command`] - Command-line assembly
//! - [`argfile`] - Temporary argument files
//! - [`launcher`] - Process launch and retry
//! - [`output`] - Captured output decoding
//! - [`config`] - JSON configuration files
//! - [`error`] - Error types

pub mod argfile;
pub mod command;
pub mod config;
pub mod error;
pub mod invocation;
pub mod launcher;
pub mod output;
pub mod parameter;
pub mod plugin;
pub mod proto_path;

// Re-export main types at crate root
pub use argfile::ArgumentFile;
pub use command::build_protoc_command;
pub use config::InvocationConfig;
pub use error::{InvocationError, InvocationResult, LaunchError};
pub use invocation::{
    is_reserved_plugin_id, DescriptorSetOutput, Invocation, InvocationBuilder, OutputLanguage,
    DESCRIPTOR_SET_ID,
};
pub use launcher::{
    is_transient_launch_failure, Interrupt, LaunchState, Launcher, ProcessRequest, ProcessRunner,
    RetryPolicy, SystemRunner,
};
pub use output::{normalize_output, CapturedOutput};
pub use parameter::{normalize_plugin_parameter, normalize_plugin_parameter_with, Platform};
pub use plugin::ProtocPlugin;
pub use proto_path::ProtoPath;
