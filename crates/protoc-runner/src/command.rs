//! Protoc command-line assembly.
//!
//! Tokens are emitted in a fixed order: proto path, built-in outputs with
//! their plugins, custom output, extra arguments, proto files, then the
//! descriptor set options.

use std::fmt::Display;

use crate::invocation::{Invocation, OutputLanguage};
use crate::plugin::{ProtocPlugin, PLUGIN_NAME_PREFIX};

/// Builds the protoc arguments for an invocation, executable excluded.
pub fn build_protoc_command(invocation: &Invocation) -> Vec<String> {
    let mut command = Vec::new();
    let parameter = invocation.native_plugin_parameter();

    for element in invocation.proto_path() {
        command.push(format!("--proto_path={}", element.display()));
    }

    if let Some(java_out) = invocation.output_directory(OutputLanguage::Java) {
        command.push(output_option("java", parameter, java_out.display()));

        // Every registered plugin writes into the Java output directory.
        for plugin in invocation.plugins() {
            command.push(plugin_option(plugin, invocation));
            command.push(format!("--{}_out={}", plugin.id(), java_out.display()));
        }
    }

    for language in [
        OutputLanguage::Cpp,
        OutputLanguage::Python,
        OutputLanguage::CSharp,
    ] {
        if let Some(dir) = invocation.output_directory(language) {
            command.push(format!("--{}_out={}", language.id(), dir.display()));
        }
    }

    if let Some(js_out) = invocation.output_directory(OutputLanguage::JavaScript) {
        command.push(output_option("js", parameter, js_out.display()));
    }

    if let Some(custom_out) = invocation.custom_output_directory() {
        let id = invocation.native_plugin_id().unwrap_or_default();
        if let Some(executable) = invocation.native_plugin_executable() {
            command.push(format!(
                "--plugin={}{}={}",
                PLUGIN_NAME_PREFIX,
                id,
                executable.display()
            ));
        }

        // A lone plugin is taken to be the native plugin's launcher.
        if let [plugin] = invocation.plugins() {
            command.push(plugin_option(plugin, invocation));
        }

        command.push(output_option(id, parameter, custom_out.display()));
    }

    if let Some(extra_args) = invocation.extra_args() {
        command.push(extra_args.to_string());
    }

    for proto_file in invocation.proto_files() {
        command.push(proto_file.display().to_string());
    }

    if let Some(descriptor_set) = invocation.descriptor_set() {
        command.push(format!(
            "--descriptor_set_out={}",
            descriptor_set.file.display()
        ));
        if descriptor_set.include_imports {
            command.push("--include_imports".to_string());
        }
        if descriptor_set.include_source_info {
            command.push("--include_source_info".to_string());
        }
    }

    command
}

/// `--<id>_out=[<parameter>:]<dir>`
fn output_option(id: &str, parameter: Option<&str>, dir: impl Display) -> String {
    match parameter {
        Some(parameter) => format!("--{}_out={}:{}", id, parameter, dir),
        None => format!("--{}_out={}", id, dir),
    }
}

/// `--plugin=protoc-gen-<id>=<path>`
fn plugin_option(plugin: &ProtocPlugin, invocation: &Invocation) -> String {
    format!(
        "--plugin={}{}={}",
        PLUGIN_NAME_PREFIX,
        plugin.id(),
        plugin
            .executable_path(invocation.plugin_directory())
            .display()
    )
}
