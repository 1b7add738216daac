/// Builds the gRPC client and server code for the `tdd.proto` definition using
/// `tonic-prost-build`.
///
/// # Files and Paths
///
/// - Proto file: `proto/tdd.proto`
/// - Includes: `proto/`
///
/// `google.protobuf.Empty` is not compiled; prost maps it onto `()`.
///
/// # Output
///
/// Generated code is exposed through `tdd_grpc_core::proto`, together with
/// the encoded `FILE_DESCRIPTOR_SET` used by the reflection service.
///
/// # Panics
///
/// Panics if code generation fails.
use std::env;
use std::path::PathBuf;
fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("tdd_descriptor.bin");

    let mut config = tonic_prost_build::Config::new();
    config.file_descriptor_set_path(&descriptor_path);

    tonic_prost_build::configure()
        .compile_with_config(config, &["proto/tdd.proto"], &["proto"])
        .unwrap();
}
