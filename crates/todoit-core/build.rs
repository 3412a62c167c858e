/// Builds the gRPC client and server code for the `todoit.proto` definition
/// using `tonic-prost-build`.
///
/// The file descriptor set is written next to the generated code so the
/// server can register it with `tonic-reflection`.
///
/// # Files and Paths
///
/// - Proto file: `proto/todoit.proto`
/// - Includes: `proto/`
///
/// # Output
///
/// Generated code is accessible via:
///
/// ```rust
/// pub mod proto {
///     tonic::include_proto!("todoit");
/// }
/// ```
use std::env;
use std::path::PathBuf;
fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("todoit_descriptor.bin");

    let mut config = tonic_prost_build::Config::new();
    config.file_descriptor_set_path(&descriptor_path);

    tonic_prost_build::configure()
        .compile_with_config(config, &["proto/todoit.proto"], &["proto"])
        .unwrap();
}
