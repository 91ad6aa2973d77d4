//! Protoc invocation descriptor and its builder.
//!
//! [`InvocationBuilder`] validates every setting as it is supplied and runs
//! the cross-cutting checks in [`InvocationBuilder::build`]. The resulting
//! [`Invocation`] is immutable.

use std::path::{Path, PathBuf};

use tracing::{debug, Level};

use crate::command;
use crate::error::{InvocationError, InvocationResult};
use crate::parameter::normalize_plugin_parameter;
use crate::plugin::ProtocPlugin;
use crate::proto_path::{absolute_display, ProtoPath};

/// Plugin id protoc uses for descriptor set output.
pub const DESCRIPTOR_SET_ID: &str = "descriptor_set";

/// Built-in protoc code generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputLanguage {
    Java,
    Cpp,
    Python,
    CSharp,
    JavaScript,
}

impl OutputLanguage {
    /// All built-in generators, in command-line order.
    pub const ALL: [OutputLanguage; 5] = [
        OutputLanguage::Java,
        OutputLanguage::Cpp,
        OutputLanguage::Python,
        OutputLanguage::CSharp,
        OutputLanguage::JavaScript,
    ];

    /// Returns the protoc generator id (the `<id>` in `--<id>_out=`).
    pub fn id(&self) -> &'static str {
        match self {
            OutputLanguage::Java => "java",
            OutputLanguage::Cpp => "cpp",
            OutputLanguage::Python => "python",
            OutputLanguage::CSharp => "csharp",
            OutputLanguage::JavaScript => "js",
        }
    }

    /// Returns a human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            OutputLanguage::Java => "Java",
            OutputLanguage::Cpp => "C++",
            OutputLanguage::Python => "Python",
            OutputLanguage::CSharp => "C#",
            OutputLanguage::JavaScript => "JavaScript",
        }
    }

    fn setting_name(&self) -> &'static str {
        match self {
            OutputLanguage::Java => "java_output_directory",
            OutputLanguage::Cpp => "cpp_output_directory",
            OutputLanguage::Python => "python_output_directory",
            OutputLanguage::CSharp => "csharp_output_directory",
            OutputLanguage::JavaScript => "javascript_output_directory",
        }
    }
}

/// Returns true if `id` names a built-in generator or the descriptor set.
pub fn is_reserved_plugin_id(id: &str) -> bool {
    id == DESCRIPTOR_SET_ID || OutputLanguage::ALL.iter().any(|lang| lang.id() == id)
}

/// Request to emit a serialized `FileDescriptorSet`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSetOutput {
    /// Output file.
    pub file: PathBuf,
    /// Pass `--include_imports`.
    pub include_imports: bool,
    /// Pass `--include_source_info`.
    pub include_source_info: bool,
}

/// Per-language output directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct OutputDirectories {
    java: Option<PathBuf>,
    cpp: Option<PathBuf>,
    python: Option<PathBuf>,
    csharp: Option<PathBuf>,
    javascript: Option<PathBuf>,
}

impl OutputDirectories {
    fn get(&self, language: OutputLanguage) -> Option<&Path> {
        let dir = match language {
            OutputLanguage::Java => &self.java,
            OutputLanguage::Cpp => &self.cpp,
            OutputLanguage::Python => &self.python,
            OutputLanguage::CSharp => &self.csharp,
            OutputLanguage::JavaScript => &self.javascript,
        };
        dir.as_deref()
    }

    fn slot(&mut self, language: OutputLanguage) -> &mut Option<PathBuf> {
        match language {
            OutputLanguage::Java => &mut self.java,
            OutputLanguage::Cpp => &mut self.cpp,
            OutputLanguage::Python => &mut self.python,
            OutputLanguage::CSharp => &mut self.csharp,
            OutputLanguage::JavaScript => &mut self.javascript,
        }
    }

    fn is_empty(&self) -> bool {
        OutputLanguage::ALL.iter().all(|lang| self.get(*lang).is_none())
    }
}

/// A fully validated protoc invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    executable: PathBuf,
    working_directory: Option<PathBuf>,
    proto_path: Vec<PathBuf>,
    proto_files: Vec<PathBuf>,
    outputs: OutputDirectories,
    custom_output_directory: Option<PathBuf>,
    descriptor_set: Option<DescriptorSetOutput>,
    plugins: Vec<ProtocPlugin>,
    plugin_directory: Option<PathBuf>,
    native_plugin_id: Option<String>,
    native_plugin_executable: Option<PathBuf>,
    native_plugin_parameter: Option<String>,
    extra_args: Option<String>,
    temp_directory: Option<PathBuf>,
    use_argument_file: bool,
}

impl Invocation {
    /// Starts a builder for the given protoc executable.
    pub fn builder(executable: impl Into<PathBuf>) -> InvocationBuilder {
        InvocationBuilder::new(executable)
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn working_directory(&self) -> Option<&Path> {
        self.working_directory.as_deref()
    }

    /// Import search roots, in insertion order.
    pub fn proto_path(&self) -> &[PathBuf] {
        &self.proto_path
    }

    /// Proto files, in insertion order.
    pub fn proto_files(&self) -> &[PathBuf] {
        &self.proto_files
    }

    /// Returns the output directory for a built-in generator.
    pub fn output_directory(&self, language: OutputLanguage) -> Option<&Path> {
        self.outputs.get(language)
    }

    pub fn custom_output_directory(&self) -> Option<&Path> {
        self.custom_output_directory.as_deref()
    }

    pub fn descriptor_set(&self) -> Option<&DescriptorSetOutput> {
        self.descriptor_set.as_ref()
    }

    pub fn plugins(&self) -> &[ProtocPlugin] {
        &self.plugins
    }

    pub fn plugin_directory(&self) -> Option<&Path> {
        self.plugin_directory.as_deref()
    }

    pub fn native_plugin_id(&self) -> Option<&str> {
        self.native_plugin_id.as_deref()
    }

    pub fn native_plugin_executable(&self) -> Option<&Path> {
        self.native_plugin_executable.as_deref()
    }

    /// The native plugin parameter, already normalized.
    pub fn native_plugin_parameter(&self) -> Option<&str> {
        self.native_plugin_parameter.as_deref()
    }

    pub fn extra_args(&self) -> Option<&str> {
        self.extra_args.as_deref()
    }

    pub fn temp_directory(&self) -> Option<&Path> {
        self.temp_directory.as_deref()
    }

    pub fn use_argument_file(&self) -> bool {
        self.use_argument_file
    }

    /// Assembles the protoc arguments (the executable is not included).
    pub fn command_line(&self) -> Vec<String> {
        command::build_protoc_command(self)
    }

    /// Dumps the invocation at debug level.
    ///
    /// Nothing is computed unless debug logging is enabled.
    pub fn log_execution_parameters(&self) {
        if !tracing::enabled!(Level::DEBUG) {
            return;
        }

        debug!(executable = %self.executable.display(), "protoc executable");
        let working_directory = match self.working_directory {
            Some(ref dir) => absolute_display(dir),
            None => std::env::current_dir()
                .map(|dir| dir.display().to_string())
                .unwrap_or_default(),
        };
        debug!(%working_directory, "protoc working directory");

        for element in &self.proto_path {
            debug!(path = %element.display(), "protobuf import path");
        }

        for language in OutputLanguage::ALL {
            if let Some(dir) = self.outputs.get(language) {
                debug!(
                    language = language.display_name(),
                    directory = %dir.display(),
                    "output directory"
                );
                if language == OutputLanguage::Java {
                    for plugin in &self.plugins {
                        debug!(id = plugin.id(), "plugin for Java output");
                    }
                }
            }
        }

        if let Some(ref dir) = self.plugin_directory {
            debug!(directory = %dir.display(), "plugin directory");
        }
        if let Some(ref dir) = self.custom_output_directory {
            debug!(
                directory = %dir.display(),
                plugin = self.native_plugin_id.as_deref().unwrap_or_default(),
                "custom output directory"
            );
        }
        if let Some(ref descriptor_set) = self.descriptor_set {
            debug!(
                file = %descriptor_set.file.display(),
                include_imports = descriptor_set.include_imports,
                include_source_info = descriptor_set.include_source_info,
                "descriptor set output file"
            );
        }

        for proto_file in &self.proto_files {
            debug!(file = %proto_file.display(), "protobuf descriptor");
        }

        let command_line = self.command_line();
        if !command_line.is_empty() {
            debug!(options = %command_line.join(" "), "command line options");
        }
    }
}

/// Accumulates and validates protoc settings.
///
/// Setters check their own argument immediately and return `&mut Self` so
/// calls chain with `?`.
#[derive(Debug, Clone)]
pub struct InvocationBuilder {
    executable: PathBuf,
    working_directory: Option<PathBuf>,
    proto_path: ProtoPath,
    proto_files: Vec<PathBuf>,
    outputs: OutputDirectories,
    custom_output_directory: Option<PathBuf>,
    descriptor_set: Option<DescriptorSetOutput>,
    plugins: Vec<ProtocPlugin>,
    plugin_directory: Option<PathBuf>,
    native_plugin_id: Option<String>,
    native_plugin_executable: Option<PathBuf>,
    native_plugin_parameter: Option<String>,
    extra_args: Option<String>,
    temp_directory: Option<PathBuf>,
    use_argument_file: bool,
}

impl InvocationBuilder {
    /// Creates a new builder for the given protoc executable.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            working_directory: None,
            proto_path: ProtoPath::new(),
            proto_files: Vec::new(),
            outputs: OutputDirectories::default(),
            custom_output_directory: None,
            descriptor_set: None,
            plugins: Vec::new(),
            plugin_directory: None,
            native_plugin_id: None,
            native_plugin_executable: None,
            native_plugin_parameter: None,
            extra_args: None,
            temp_directory: None,
            use_argument_file: false,
        }
    }

    /// Sets the directory protoc runs from.
    pub fn working_directory(&mut self, dir: impl Into<PathBuf>) -> InvocationResult<&mut Self> {
        self.working_directory = Some(checked_directory("working_directory", dir.into())?);
        Ok(self)
    }

    /// Sets the directory the argument file is created in.
    pub fn temp_directory(&mut self, dir: impl Into<PathBuf>) -> InvocationResult<&mut Self> {
        self.temp_directory = Some(checked_directory("temp_directory", dir.into())?);
        Ok(self)
    }

    /// Sets the output directory for a built-in generator.
    pub fn output_directory(
        &mut self,
        language: OutputLanguage,
        dir: impl Into<PathBuf>,
    ) -> InvocationResult<&mut Self> {
        let dir = checked_directory(language.setting_name(), dir.into())?;
        *self.outputs.slot(language) = Some(dir);
        Ok(self)
    }

    /// Sets the directory into which Java sources (and plugin output) are generated.
    pub fn java_output_directory(&mut self, dir: impl Into<PathBuf>) -> InvocationResult<&mut Self> {
        self.output_directory(OutputLanguage::Java, dir)
    }

    /// Sets the directory into which C++ sources are generated.
    pub fn cpp_output_directory(&mut self, dir: impl Into<PathBuf>) -> InvocationResult<&mut Self> {
        self.output_directory(OutputLanguage::Cpp, dir)
    }

    /// Sets the directory into which Python sources are generated.
    pub fn python_output_directory(
        &mut self,
        dir: impl Into<PathBuf>,
    ) -> InvocationResult<&mut Self> {
        self.output_directory(OutputLanguage::Python, dir)
    }

    /// Sets the directory into which C# sources are generated.
    pub fn csharp_output_directory(
        &mut self,
        dir: impl Into<PathBuf>,
    ) -> InvocationResult<&mut Self> {
        self.output_directory(OutputLanguage::CSharp, dir)
    }

    /// Sets the directory into which JavaScript sources are generated.
    pub fn javascript_output_directory(
        &mut self,
        dir: impl Into<PathBuf>,
    ) -> InvocationResult<&mut Self> {
        self.output_directory(OutputLanguage::JavaScript, dir)
    }

    /// Sets the directory the native plugin writes to.
    pub fn custom_output_directory(
        &mut self,
        dir: impl Into<PathBuf>,
    ) -> InvocationResult<&mut Self> {
        let dir = checked_directory("custom_output_directory", dir.into())?;
        self.custom_output_directory = Some(dir);
        Ok(self)
    }

    /// Adds an import search root. Duplicates are ignored.
    pub fn add_proto_path(&mut self, dir: impl Into<PathBuf>) -> InvocationResult<&mut Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(InvocationError::configuration(format!(
                "Proto path element is not a directory: {}",
                absolute_display(&dir)
            )));
        }
        self.proto_path.insert(dir);
        Ok(self)
    }

    /// Adds several import search roots.
    pub fn add_proto_paths<I, P>(&mut self, dirs: I) -> InvocationResult<&mut Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for dir in dirs {
            self.add_proto_path(dir)?;
        }
        Ok(self)
    }

    /// Adds a proto file to compile.
    ///
    /// The file must already be reachable from a registered proto path root,
    /// so roots have to be added first.
    pub fn add_proto_file(&mut self, file: impl Into<PathBuf>) -> InvocationResult<&mut Self> {
        let file = file.into();
        if !file.is_file() {
            return Err(InvocationError::configuration(format!(
                "Proto file is not a file: {}",
                absolute_display(&file)
            )));
        }
        self.proto_path.check_proto_file(&file)?;
        self.proto_files.push(file);
        Ok(self)
    }

    /// Adds several proto files.
    pub fn add_proto_files<I, P>(&mut self, files: I) -> InvocationResult<&mut Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for file in files {
            self.add_proto_file(file)?;
        }
        Ok(self)
    }

    /// Adds a plugin whose output goes to the Java output directory.
    pub fn add_plugin(&mut self, plugin: ProtocPlugin) -> InvocationResult<&mut Self> {
        plugin.validate()?;
        self.plugins.push(plugin);
        Ok(self)
    }

    /// Adds several plugins.
    pub fn add_plugins<I>(&mut self, plugins: I) -> InvocationResult<&mut Self>
    where
        I: IntoIterator<Item = ProtocPlugin>,
    {
        for plugin in plugins {
            self.add_plugin(plugin)?;
        }
        Ok(self)
    }

    /// Sets the directory plugin executables are resolved against.
    pub fn plugin_directory(&mut self, dir: impl Into<PathBuf>) -> InvocationResult<&mut Self> {
        self.plugin_directory = Some(checked_directory("plugin_directory", dir.into())?);
        Ok(self)
    }

    /// Sets the native plugin id. Built-in generator ids are rejected.
    pub fn native_plugin_id(&mut self, id: impl Into<String>) -> InvocationResult<&mut Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(InvocationError::configuration("'native_plugin_id' is empty"));
        }
        if is_reserved_plugin_id(&id) {
            return Err(InvocationError::configuration(format!(
                "'native_plugin_id' matches one of the built-in protoc plugins: {}",
                id
            )));
        }
        self.native_plugin_id = Some(id);
        Ok(self)
    }

    /// Sets the native plugin executable.
    pub fn native_plugin_executable(
        &mut self,
        executable: impl Into<PathBuf>,
    ) -> InvocationResult<&mut Self> {
        let executable = executable.into();
        if executable.as_os_str().is_empty() {
            return Err(InvocationError::configuration(
                "'native_plugin_executable' is empty",
            ));
        }
        self.native_plugin_executable = Some(executable);
        Ok(self)
    }

    /// Sets the native plugin parameter, normalizing it for the current platform.
    pub fn native_plugin_parameter(
        &mut self,
        parameter: impl AsRef<str>,
    ) -> InvocationResult<&mut Self> {
        self.native_plugin_parameter = Some(normalize_plugin_parameter(parameter.as_ref())?);
        Ok(self)
    }

    /// Sets a raw string passed to protoc as one extra argument.
    pub fn extra_args(&mut self, extra_args: impl Into<String>) -> InvocationResult<&mut Self> {
        self.extra_args = Some(extra_args.into());
        Ok(self)
    }

    /// Requests a descriptor set. The file's parent directory must exist.
    pub fn descriptor_set_file(
        &mut self,
        file: impl Into<PathBuf>,
        include_imports: bool,
        include_source_info: bool,
    ) -> InvocationResult<&mut Self> {
        let file = file.into();
        let parent = match file.parent() {
            Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
            Some(parent) => parent,
            None => {
                return Err(InvocationError::configuration(format!(
                    "'descriptor_set_file' has no parent directory: {}",
                    file.display()
                )))
            }
        };
        if !parent.exists() {
            return Err(InvocationError::configuration(
                "Parent directory for 'descriptor_set_file' does not exist",
            ));
        }
        if !parent.is_dir() {
            return Err(InvocationError::configuration(
                "Parent for 'descriptor_set_file' is not a directory",
            ));
        }
        self.descriptor_set = Some(DescriptorSetOutput {
            file,
            include_imports,
            include_source_info,
        });
        Ok(self)
    }

    /// Passes arguments through an `@file` instead of the command line.
    pub fn use_argument_file(&mut self, use_argument_file: bool) -> &mut Self {
        self.use_argument_file = use_argument_file;
        self
    }

    fn validate_state(&self) -> InvocationResult<()> {
        if self.executable.as_os_str().is_empty() {
            return Err(InvocationError::configuration("'executable' is empty"));
        }
        if self.proto_files.is_empty() {
            return Err(InvocationError::configuration("No proto files specified"));
        }
        if self.outputs.is_empty()
            && self.custom_output_directory.is_none()
            && self.descriptor_set.is_none()
        {
            return Err(InvocationError::configuration(
                "At least one of these properties must be set: \
                 'java_output_directory', 'cpp_output_directory', \
                 'python_output_directory', 'csharp_output_directory', \
                 'javascript_output_directory', 'custom_output_directory', \
                 or 'descriptor_set_file'",
            ));
        }
        if self.custom_output_directory.is_some() && self.native_plugin_id.is_none() {
            return Err(InvocationError::configuration(
                "'custom_output_directory' requires 'native_plugin_id'",
            ));
        }
        Ok(())
    }

    /// Runs the whole-object checks and produces the invocation.
    pub fn build(&self) -> InvocationResult<Invocation> {
        self.validate_state()?;
        Ok(Invocation {
            executable: self.executable.clone(),
            working_directory: self.working_directory.clone(),
            proto_path: self.proto_path.roots().to_vec(),
            proto_files: self.proto_files.clone(),
            outputs: self.outputs.clone(),
            custom_output_directory: self.custom_output_directory.clone(),
            descriptor_set: self.descriptor_set.clone(),
            plugins: self.plugins.clone(),
            plugin_directory: self.plugin_directory.clone(),
            native_plugin_id: self.native_plugin_id.clone(),
            native_plugin_executable: self.native_plugin_executable.clone(),
            native_plugin_parameter: self.native_plugin_parameter.clone(),
            extra_args: self.extra_args.clone(),
            temp_directory: self.temp_directory.clone(),
            use_argument_file: self.use_argument_file,
        })
    }
}

fn checked_directory(name: &str, dir: PathBuf) -> InvocationResult<PathBuf> {
    if !dir.is_dir() {
        return Err(InvocationError::configuration(format!(
            "'{}' is not a directory: {}",
            name,
            absolute_display(&dir)
        )));
    }
    Ok(dir)
}
