// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Get protoc path
    let protoc_path = protoc_bin_vendored::protoc_bin_path()?;

    // export PROTOC to the environment
    unsafe {
        #[allow(clippy::disallowed_methods)]
        std::env::set_var("PROTOC", protoc_path);
    }

    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")?;
    let proto_dir = std::path::Path::new(&manifest_dir).join("proto/v1");
    let proto_file = proto_dir.join("videoin.proto");

    println!("cargo:rerun-if-changed={}", proto_file.display());

    // Messages are rendered as JSON by the call auditor, field names follow
    // the protobuf JSON mapping.
    tonic_build::configure()
        .type_attribute(
            ".videoin.v1",
            "#[derive(serde::Serialize)] #[serde(rename_all = \"camelCase\")]",
        )
        .compile_protos(&[proto_file], &[proto_dir])?;

    Ok(())
}
