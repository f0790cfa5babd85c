use vergen_gitcl::{Build, Cargo, Emitter, Gitcl, Rustc};

const PROTO_FILE: &str = "proto/profile/v1/profile.proto";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let build = Build::builder().build_timestamp(true).build();
    let cargo = Cargo::builder().build();
    let rustc = Rustc::builder().semver(true).build();
    let gitcl = Gitcl::builder().branch(true).sha(true).dirty(true).build();

    Emitter::default()
        .add_instructions(&build)?
        .add_instructions(&cargo)?
        .add_instructions(&rustc)?
        .add_instructions(&gitcl)?
        .emit()?;

    // Parsed in-process by protox; no system protoc.
    println!("cargo:rerun-if-changed={PROTO_FILE}");
    let descriptors = protox::compile([PROTO_FILE], ["proto"])?;
    tonic_build::configure()
        .build_server(false)
        .build_client(true)
        .type_attribute(".profile.v1.ProfileObject", "#[derive(serde::Serialize)]")
        .type_attribute(".profile.v1.ContactObject", "#[derive(serde::Serialize)]")
        .compile_fds(descriptors)?;

    Ok(())
}
