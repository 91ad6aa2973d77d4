//! Declarative invocation configuration.
//!
//! A JSON document describing a protoc run. Loading it replays every setting
//! through [`InvocationBuilder`], so the same validation applies as for code
//! that drives the builder directly.
//!
//! ```json
//! {
//!   "executable": "/usr/local/bin/protoc",
//!   "proto_paths": ["src/main/proto"],
//!   "proto_files": ["src/main/proto/addressbook.proto"],
//!   "java_out": "target/generated-sources/protobuf/java",
//!   "plugins": [{ "id": "grpc-java", "executable": "tools/protoc-gen-grpc-java" }],
//!   "descriptor_set": { "file": "target/addressbook.pb", "include_imports": true }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{InvocationError, InvocationResult};
use crate::invocation::{Invocation, InvocationBuilder};
use crate::plugin::ProtocPlugin;

/// Default protoc executable, resolved through `PATH` by the OS.
pub const DEFAULT_EXECUTABLE: &str = "protoc";

fn default_executable() -> PathBuf {
    PathBuf::from(DEFAULT_EXECUTABLE)
}

/// The externally supplied code generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NativePluginConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

/// Descriptor set output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DescriptorSetConfig {
    pub file: PathBuf,
    #[serde(default)]
    pub include_imports: bool,
    #[serde(default)]
    pub include_source_info: bool,
}

/// A protoc run as described in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvocationConfig {
    #[serde(default = "default_executable")]
    pub executable: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<PathBuf>,
    #[serde(default)]
    pub proto_paths: Vec<PathBuf>,
    #[serde(default)]
    pub proto_files: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub java_out: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpp_out: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_out: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csharp_out: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub js_out: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_out: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_directory: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<ProtocPlugin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_plugin: Option<NativePluginConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_args: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor_set: Option<DescriptorSetConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_directory: Option<PathBuf>,
    #[serde(default)]
    pub use_argument_file: bool,
}

impl InvocationConfig {
    /// Parses a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads a configuration file, resolving relative paths against its directory.
    pub fn load(path: &Path) -> InvocationResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            InvocationError::configuration(format!(
                "Failed to read configuration {}: {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_json(&content).map_err(|e| {
            InvocationError::configuration(format!(
                "Failed to parse configuration {}: {}",
                path.display(),
                e
            ))
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolve_relative_to(base))
    }

    /// Rebases every relative path onto `base`.
    ///
    /// A bare executable name (no directory part) is left alone so it is
    /// still looked up on `PATH`.
    pub fn resolve_relative_to(mut self, base: &Path) -> Self {
        let rebase = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        let rebase_opt = |path: &mut Option<PathBuf>| {
            if let Some(path) = path.as_mut() {
                rebase(path);
            }
        };

        if self.executable.components().count() > 1 {
            rebase(&mut self.executable);
        }
        rebase_opt(&mut self.working_directory);
        self.proto_paths.iter_mut().for_each(rebase);
        self.proto_files.iter_mut().for_each(rebase);
        rebase_opt(&mut self.java_out);
        rebase_opt(&mut self.cpp_out);
        rebase_opt(&mut self.python_out);
        rebase_opt(&mut self.csharp_out);
        rebase_opt(&mut self.js_out);
        rebase_opt(&mut self.custom_out);
        rebase_opt(&mut self.plugin_directory);
        for plugin in &mut self.plugins {
            rebase_opt(&mut plugin.executable);
        }
        if let Some(native) = self.native_plugin.as_mut() {
            rebase_opt(&mut native.executable);
        }
        if let Some(descriptor_set) = self.descriptor_set.as_mut() {
            rebase(&mut descriptor_set.file);
        }
        rebase_opt(&mut self.temp_directory);
        self
    }

    /// Replays the configuration through a builder.
    ///
    /// Proto paths are registered before proto files so membership checks see them.
    pub fn to_builder(&self) -> InvocationResult<InvocationBuilder> {
        let mut builder = Invocation::builder(self.executable.clone());
        if let Some(ref dir) = self.working_directory {
            builder.working_directory(dir)?;
        }
        builder.add_proto_paths(&self.proto_paths)?;
        builder.add_proto_files(&self.proto_files)?;

        if let Some(ref dir) = self.java_out {
            builder.java_output_directory(dir)?;
        }
        if let Some(ref dir) = self.cpp_out {
            builder.cpp_output_directory(dir)?;
        }
        if let Some(ref dir) = self.python_out {
            builder.python_output_directory(dir)?;
        }
        if let Some(ref dir) = self.csharp_out {
            builder.csharp_output_directory(dir)?;
        }
        if let Some(ref dir) = self.js_out {
            builder.javascript_output_directory(dir)?;
        }
        if let Some(ref dir) = self.custom_out {
            builder.custom_output_directory(dir)?;
        }

        if let Some(ref dir) = self.plugin_directory {
            builder.plugin_directory(dir)?;
        }
        builder.add_plugins(self.plugins.iter().cloned())?;

        if let Some(ref native) = self.native_plugin {
            if let Some(ref id) = native.id {
                builder.native_plugin_id(id.as_str())?;
            }
            if let Some(ref executable) = native.executable {
                builder.native_plugin_executable(executable)?;
            }
            if let Some(ref parameter) = native.parameter {
                builder.native_plugin_parameter(parameter)?;
            }
        }

        if let Some(ref extra_args) = self.extra_args {
            builder.extra_args(extra_args.as_str())?;
        }
        if let Some(ref descriptor_set) = self.descriptor_set {
            builder.descriptor_set_file(
                &descriptor_set.file,
                descriptor_set.include_imports,
                descriptor_set.include_source_info,
            )?;
        }
        if let Some(ref dir) = self.temp_directory {
            builder.temp_directory(dir)?;
        }
        builder.use_argument_file(self.use_argument_file);

        Ok(builder)
    }

    /// Builds the invocation described by this configuration.
    pub fn build(&self) -> InvocationResult<Invocation> {
        self.to_builder()?.build()
    }
}
