// Build script to generate Rust code from protobuf definitions

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/");

    tonic_build::configure()
        .build_client(true)
        // Server stubs are only exercised by the integration tests, which
        // stand up in-process backends.
        .build_server(true)
        .compile_protos(
            &[
                "proto/authentication.proto",
                "proto/upload.proto",
                "proto/video_catalog.proto",
                "proto/health.proto",
            ],
            &["proto/"],
        )?;

    Ok(())
}
