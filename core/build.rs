fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_build::configure().compile_protos(
        &[
            "../proto/info.proto",
            "../proto/v1alpha1.proto",
            "../proto/v1alpha2.proto",
        ],
        &["../proto"],
    )?;
    Ok(())
}
