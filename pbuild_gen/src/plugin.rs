/* protoc plugin protocol: CodeGeneratorRequest in, CodeGeneratorResponse out */

use crate::codegen::RustCodeGeneratorOptions;
use crate::descriptor::schema_from_file_descriptor;
use crate::generator::Generator;
use anyhow::{Context, Result};
use prost::Message;
use prost_types::compiler::code_generator_response::{Feature, File};
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use std::io::{Read, Write};
use tracing::{debug, warn};

/// Generates every file in `file_to_generate`. Failures end up in the
/// response's `error` field; files that did generate are still returned.
pub fn handle_request(request: &CodeGeneratorRequest) -> CodeGeneratorResponse {
    let mut response = CodeGeneratorResponse {
        supported_features: Some(Feature::Proto3Optional as u64),
        ..Default::default()
    };

    let options = match RustCodeGeneratorOptions::from_parameter(request.parameter()) {
        Ok(options) => options,
        Err(err) => {
            response.error = Some(format!("invalid plugin parameter: {}", err));
            return response;
        }
    };

    /* Every file in the request is in scope for references, dependencies
       included; only `file_to_generate` produces output. */
    let mut errors = Vec::new();
    let mut available = Vec::with_capacity(request.proto_file.len());
    for proto in &request.proto_file {
        match schema_from_file_descriptor(proto) {
            Ok(schema) => available.push(schema),
            Err(err) if request.file_to_generate.iter().any(|name| name == proto.name()) => {
                errors.push(err.to_string())
            }
            Err(err) => debug!(file = proto.name(), %err, "dependency left out of scope"),
        }
    }

    let mut targets = Vec::new();
    for name in &request.file_to_generate {
        if let Some(schema) = available.iter().find(|schema| &schema.name == name) {
            targets.push(schema.clone());
        } else if !request.proto_file.iter().any(|file| file.name() == name) {
            errors.push(format!("{}: not present in proto_file", name));
        }
    }

    let report = Generator::new(options).generate_requested(&targets, &available);
    for failure in &report.failed {
        errors.push(format!("{}: {}", failure.file, failure.error));
    }
    for file in report.generated {
        debug!(name = %file.name, "plugin output");
        response.file.push(File {
            name: Some(file.name),
            content: Some(file.content),
            ..Default::default()
        });
    }

    if !errors.is_empty() {
        warn!(count = errors.len(), "plugin request had failures");
        response.error = Some(errors.join("\n"));
    }
    response
}

pub fn run_stdio(mut input: impl Read, mut output: impl Write) -> Result<()> {
    let mut bytes = Vec::new();
    input
        .read_to_end(&mut bytes)
        .context("Failed to read CodeGeneratorRequest")?;
    let request = CodeGeneratorRequest::decode(bytes.as_slice()).context("Failed to decode CodeGeneratorRequest")?;
    let response = handle_request(&request);
    output
        .write_all(&response.encode_to_vec())
        .context("Failed to write CodeGeneratorResponse")?;
    output.flush().context("Failed to flush CodeGeneratorResponse")?;
    Ok(())
}
