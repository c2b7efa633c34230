// Embeds VERGEN_BUILD_TIMESTAMP and VERGEN_CARGO_TARGET_TRIPLE for
// `leetmate-render --version`. Missing metadata is not a build failure.
use vergen::{BuildBuilder, CargoBuilder, Emitter};

fn emit_version_metadata() -> Result<(), Box<dyn std::error::Error>> {
    let build = BuildBuilder::default().build_timestamp(true).build()?;
    let cargo = CargoBuilder::default().target_triple(true).build()?;
    Emitter::default()
        .add_instructions(&build)?
        .add_instructions(&cargo)?
        .emit()?;
    Ok(())
}

fn main() {
    if let Err(e) = emit_version_metadata() {
        println!("cargo:warning=build metadata unavailable: {e}");
    }
}
