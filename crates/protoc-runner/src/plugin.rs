//! Protoc plugin descriptors.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{InvocationError, InvocationResult};

/// Prefix protoc expects for plugin executables.
pub const PLUGIN_NAME_PREFIX: &str = "protoc-gen-";

/// A protoc plugin wired in with `--plugin=protoc-gen-<id>=<path>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProtocPlugin {
    /// Plugin id, used in `protoc-gen-<id>` and `--<id>_out=`.
    pub id: String,
    /// Explicit path to the plugin executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
}

impl ProtocPlugin {
    /// Creates a plugin that lives in the plugin directory under its default name.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            executable: None,
        }
    }

    /// Creates a plugin with an explicit executable path.
    pub fn with_executable(id: impl Into<String>, executable: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            executable: Some(executable.into()),
        }
    }

    /// Returns the plugin id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the executable file name, e.g. `protoc-gen-grpc-java` (`.exe` on Windows).
    pub fn plugin_name(&self) -> String {
        format!(
            "{}{}{}",
            PLUGIN_NAME_PREFIX,
            self.id,
            std::env::consts::EXE_SUFFIX
        )
    }

    /// Resolves the plugin executable.
    ///
    /// An explicit executable wins. Otherwise the plugin is looked up by name
    /// in `plugin_directory`, or left as a bare name when there is none.
    pub fn executable_path(&self, plugin_directory: Option<&Path>) -> PathBuf {
        if let Some(ref executable) = self.executable {
            return executable.clone();
        }
        match plugin_directory {
            Some(dir) => dir.join(self.plugin_name()),
            None => PathBuf::from(self.plugin_name()),
        }
    }

    /// Checks that the descriptor is usable.
    pub fn validate(&self) -> InvocationResult<()> {
        if self.id.is_empty() {
            return Err(InvocationError::configuration("plugin 'id' is empty"));
        }
        if let Some(ref executable) = self.executable {
            if executable.as_os_str().is_empty() {
                return Err(InvocationError::configuration(format!(
                    "plugin '{}' has an empty 'executable'",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_name() {
        let plugin = ProtocPlugin::new("grpc-java");
        let expected = format!("protoc-gen-grpc-java{}", std::env::consts::EXE_SUFFIX);
        assert_eq!(plugin.plugin_name(), expected);
    }

    #[test]
    fn test_executable_path_resolution() {
        let plugin = ProtocPlugin::new("grpc-java");
        assert_eq!(
            plugin.executable_path(Some(Path::new("/opt/plugins"))),
            Path::new("/opt/plugins").join(plugin.plugin_name())
        );
        assert_eq!(
            plugin.executable_path(None),
            PathBuf::from(plugin.plugin_name())
        );

        let explicit = ProtocPlugin::with_executable("grpc-java", "/usr/bin/grpc");
        assert_eq!(
            explicit.executable_path(Some(Path::new("/opt/plugins"))),
            PathBuf::from("/usr/bin/grpc")
        );
    }

    #[test]
    fn test_validate() {
        assert!(ProtocPlugin::new("dump").validate().is_ok());
        assert!(ProtocPlugin::new("").validate().is_err());
        assert!(ProtocPlugin::with_executable("dump", "").validate().is_err());
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let plugin: ProtocPlugin =
            serde_json::from_str(r#"{"id": "grpc", "executable": "bin/grpc"}"#).unwrap();
        assert_eq!(plugin.executable, Some(PathBuf::from("bin/grpc")));

        assert!(serde_json::from_str::<ProtocPlugin>(r#"{"id": "grpc", "main": "x"}"#).is_err());
    }
}
