//! Command-line assembly tests.
//!
//! These build real invocations against a scratch project and check the
//! exact protoc arguments produced.

mod common;

use common::Project;
use pretty_assertions::assert_eq;
use protoc_runner::{Invocation, InvocationBuilder, ProtocPlugin};

fn arg(prefix: &str, path: impl AsRef<std::path::Path>) -> String {
    format!("{}{}", prefix, path.as_ref().display())
}

fn position(command: &[String], token: &str) -> usize {
    command
        .iter()
        .position(|t| t == token)
        .unwrap_or_else(|| panic!("missing token {token} in {command:?}"))
}

fn base_builder(project: &Project) -> InvocationBuilder {
    let file = project.proto("src/proto/a.proto");
    let mut builder = Invocation::builder("protoc");
    builder
        .add_proto_path(project.proto_root())
        .unwrap()
        .add_proto_file(file)
        .unwrap();
    builder
}

#[test]
fn test_assembly_is_deterministic() {
    let project = Project::new();
    let mut builder = base_builder(&project);
    builder
        .java_output_directory(project.out())
        .unwrap()
        .add_plugin(ProtocPlugin::new("grpc-java"))
        .unwrap();
    let invocation = builder.build().unwrap();

    assert_eq!(invocation.command_line(), invocation.command_line());
    assert_eq!(
        invocation.command_line(),
        builder.build().unwrap().command_line()
    );
}

#[test]
fn test_proto_paths_and_files_keep_insertion_order() {
    let project = Project::new();
    let second_root = project.dir("vendor/proto");
    let b = project.proto("vendor/proto/b.proto");
    let a = project.proto("src/proto/a.proto");
    let c = project.proto("src/proto/nested/c.proto");

    let mut builder = Invocation::builder("protoc");
    builder
        .add_proto_path(&second_root)
        .unwrap()
        .add_proto_path(project.proto_root())
        .unwrap()
        .add_proto_files([&b, &a, &c])
        .unwrap()
        .cpp_output_directory(project.out())
        .unwrap();
    let command = builder.build().unwrap().command_line();

    assert_eq!(
        command,
        vec![
            arg("--proto_path=", &second_root),
            arg("--proto_path=", project.proto_root()),
            arg("--cpp_out=", project.out()),
            arg("", &b),
            arg("", &a),
            arg("", &c),
        ]
    );
}

#[test]
fn test_java_plugins_follow_java_output() {
    let project = Project::new();
    let tools = project.dir("tools");
    let mut builder = base_builder(&project);
    builder
        .java_output_directory(project.out())
        .unwrap()
        .python_output_directory(project.out())
        .unwrap()
        .plugin_directory(&tools)
        .unwrap()
        .add_plugin(ProtocPlugin::new("grpc-java"))
        .unwrap()
        .add_plugin(ProtocPlugin::with_executable("kotlin", "/opt/bin/protoc-gen-kotlin"))
        .unwrap();
    let command = builder.build().unwrap().command_line();

    let java_out = arg("--java_out=", project.out());
    let grpc_plugin = format!(
        "--plugin=protoc-gen-grpc-java={}",
        tools
            .join(format!("protoc-gen-grpc-java{}", std::env::consts::EXE_SUFFIX))
            .display()
    );
    let grpc_out = arg("--grpc-java_out=", project.out());
    let kotlin_plugin = "--plugin=protoc-gen-kotlin=/opt/bin/protoc-gen-kotlin".to_string();
    let kotlin_out = arg("--kotlin_out=", project.out());
    let python_out = arg("--python_out=", project.out());

    let java = position(&command, &java_out);
    assert_eq!(
        &command[java..java + 6],
        &[
            java_out,
            grpc_plugin,
            grpc_out,
            kotlin_plugin,
            kotlin_out,
            python_out
        ]
    );
}

#[test]
fn test_plugins_ignored_without_java_output() {
    let project = Project::new();
    let mut builder = base_builder(&project);
    builder
        .cpp_output_directory(project.out())
        .unwrap()
        .add_plugin(ProtocPlugin::new("grpc-java"))
        .unwrap();
    let command = builder.build().unwrap().command_line();

    assert!(command.iter().all(|token| !token.starts_with("--plugin=")));
    assert!(command.iter().all(|token| !token.starts_with("--grpc-java_out=")));
}

#[test]
fn test_descriptor_set_tokens_come_last() {
    let project = Project::new();
    let set = project.out().join("set.pb");
    let mut builder = base_builder(&project);
    builder
        .javascript_output_directory(project.out())
        .unwrap()
        .extra_args("--experimental_allow_proto3_optional")
        .unwrap()
        .descriptor_set_file(&set, true, true)
        .unwrap();
    let command = builder.build().unwrap().command_line();

    let n = command.len();
    assert_eq!(
        &command[n - 3..],
        &[
            arg("--descriptor_set_out=", &set),
            "--include_imports".to_string(),
            "--include_source_info".to_string(),
        ]
    );
    assert!(
        position(&command, &arg("", project.proto_root().join("a.proto"))) < n - 3,
        "proto files precede descriptor set options"
    );
}

#[test]
fn test_descriptor_set_flags_are_optional() {
    let project = Project::new();
    let set = project.out().join("set.pb");
    let mut builder = base_builder(&project);
    builder.descriptor_set_file(&set, false, true).unwrap();
    let command = builder.build().unwrap().command_line();

    assert_eq!(
        command.last().map(String::as_str),
        Some("--include_source_info")
    );
    assert!(!command.contains(&"--include_imports".to_string()));
}

#[test]
fn test_extra_args_stay_one_token() {
    let project = Project::new();
    let mut builder = base_builder(&project);
    builder
        .cpp_output_directory(project.out())
        .unwrap()
        .extra_args("--fatal_warnings --experimental_allow_proto3_optional")
        .unwrap();
    let command = builder.build().unwrap().command_line();

    assert_eq!(
        command[2],
        "--fatal_warnings --experimental_allow_proto3_optional"
    );
    assert_eq!(command.len(), 4);
}

#[test]
fn test_native_plugin_parameter_prefixes_java_js_and_custom_outputs() {
    let project = Project::new();
    let mut builder = base_builder(&project);
    builder
        .java_output_directory(project.out())
        .unwrap()
        .cpp_output_directory(project.out())
        .unwrap()
        .javascript_output_directory(project.out())
        .unwrap()
        .native_plugin_id("dart")
        .unwrap()
        .native_plugin_parameter("generate_kythe_info")
        .unwrap()
        .custom_output_directory(project.out())
        .unwrap();
    let command = builder.build().unwrap().command_line();

    assert!(command.contains(&arg("--java_out=generate_kythe_info:", project.out())));
    assert!(command.contains(&arg("--cpp_out=", project.out())));
    assert!(command.contains(&arg("--js_out=generate_kythe_info:", project.out())));
    assert!(command.contains(&arg("--dart_out=generate_kythe_info:", project.out())));
}

#[test]
fn test_custom_output_with_native_executable() {
    let project = Project::new();
    let mut builder = base_builder(&project);
    builder
        .native_plugin_id("dart")
        .unwrap()
        .native_plugin_executable("/opt/dart/protoc-gen-dart")
        .unwrap()
        .custom_output_directory(project.out())
        .unwrap();
    let command = builder.build().unwrap().command_line();

    assert_eq!(
        &command[1..3],
        &[
            "--plugin=protoc-gen-dart=/opt/dart/protoc-gen-dart".to_string(),
            arg("--dart_out=", project.out()),
        ]
    );
}

// A single registered plugin is also emitted for the custom output, in
// front of the native `_out` token; with two or more plugins it is not.
#[test]
fn test_custom_output_with_single_plugin() {
    let project = Project::new();
    let mut builder = base_builder(&project);
    builder
        .native_plugin_id("swift")
        .unwrap()
        .custom_output_directory(project.out())
        .unwrap()
        .add_plugin(ProtocPlugin::with_executable("swift", "/usr/bin/protoc-gen-swift"))
        .unwrap();
    let command = builder.build().unwrap().command_line();

    assert_eq!(
        &command[1..3],
        &[
            "--plugin=protoc-gen-swift=/usr/bin/protoc-gen-swift".to_string(),
            arg("--swift_out=", project.out()),
        ]
    );

    builder
        .add_plugin(ProtocPlugin::with_executable("grpc-swift", "/usr/bin/protoc-gen-grpc-swift"))
        .unwrap();
    let command = builder.build().unwrap().command_line();
    assert!(command.iter().all(|token| !token.starts_with("--plugin=")));
}

#[test]
fn test_java_plugin_reused_as_native_launcher() {
    let project = Project::new();
    let mut builder = base_builder(&project);
    builder
        .java_output_directory(project.out())
        .unwrap()
        .add_plugin(ProtocPlugin::with_executable("j", "/opt/bin/protoc-gen-j"))
        .unwrap()
        .native_plugin_id("dart")
        .unwrap()
        .native_plugin_executable("/opt/dart/protoc-gen-dart")
        .unwrap()
        .custom_output_directory(project.out())
        .unwrap();
    let command = builder.build().unwrap().command_line();

    assert_eq!(
        &command[1..7],
        &[
            arg("--java_out=", project.out()),
            "--plugin=protoc-gen-j=/opt/bin/protoc-gen-j".to_string(),
            arg("--j_out=", project.out()),
            "--plugin=protoc-gen-dart=/opt/dart/protoc-gen-dart".to_string(),
            "--plugin=protoc-gen-j=/opt/bin/protoc-gen-j".to_string(),
            arg("--dart_out=", project.out()),
        ]
    );
    assert_eq!(command.len(), 8);
}
