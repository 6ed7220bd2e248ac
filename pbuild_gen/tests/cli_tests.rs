/* End-to-end tests for the pbuild-gen binary */

use prost::Message;
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

const BIN: &str = env!("CARGO_BIN_EXE_pbuild-gen");

const THING_YAML: &str = r#"
package: demo
messages:
  - name: Thing
    fields:
      - { name: x, number: 1, type: int64 }
      - { name: first, number: 4, type: message, type-name: Thing2 }
  - name: Thing2
    fields:
      - { name: z, number: 1, type: int64 }
"#;

const GROUP_YAML: &str = r#"
messages:
  - name: Legacy
    fields:
      - { name: g, number: 1, type: group }
"#;

fn write_schema(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_codegen_writes_builders() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "thing.yaml", THING_YAML);
    let out = dir.path().join("out");

    let output = Command::new(BIN)
        .args(["codegen", "-f"])
        .arg(&schema)
        .arg("-o")
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let code = fs::read_to_string(out.join("thing_builder.rs")).unwrap();
    assert!(code.contains("pub struct ThingBuilder<W>"));
    assert!(code.contains("pub struct Thing2Builder<W>"));
}

#[test]
fn test_codegen_keeps_going_after_a_failed_file() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write_schema(dir.path(), "legacy.yaml", GROUP_YAML);
    let good = write_schema(dir.path(), "thing.yaml", THING_YAML);
    let out = dir.path().join("out");

    let output = Command::new(BIN)
        .args(["codegen", "-f"])
        .arg(&bad)
        .arg("-f")
        .arg(&good)
        .arg("-o")
        .arg(&out)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported field type `group`"), "{stderr}");
    assert!(out.join("thing_builder.rs").exists());
    assert!(!out.join("legacy_builder.rs").exists());
}

#[test]
fn test_analyze_prints_ir() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "thing.yaml", THING_YAML);

    let output = Command::new(BIN)
        .args(["analyze", "--print-ir", "-f"])
        .arg(&schema)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Thing -> ThingBuilder"));
    assert!(stdout.contains("nested Thing2Builder (inline)"));
    assert!(stdout.contains("\"type_name\": \"ThingBuilder\""));
    assert!(stdout.contains("\"op\": \"populate-nested\""));
}

#[test]
fn test_plugin_protocol() {
    let request = CodeGeneratorRequest {
        file_to_generate: vec!["demo/thing.proto".to_string()],
        proto_file: vec![FileDescriptorProto {
            name: Some("demo/thing.proto".to_string()),
            package: Some("demo".to_string()),
            message_type: vec![DescriptorProto {
                name: Some("Thing2".to_string()),
                field: vec![FieldDescriptorProto {
                    name: Some("z".to_string()),
                    number: Some(1),
                    label: Some(Label::Optional as i32),
                    r#type: Some(Type::Int64 as i32),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }],
        ..Default::default()
    };

    let mut child = Command::new(BIN)
        .arg("plugin")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(&request.encode_to_vec())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let response = CodeGeneratorResponse::decode(output.stdout.as_slice()).unwrap();
    assert_eq!(response.error, None);
    assert_eq!(response.file[0].name(), "demo/thing_builder.rs");
    assert!(response.file[0].content().contains("pub struct Thing2Builder<W>"));
}
