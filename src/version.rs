//! Build identity: crate, compiler and transport versions, plus git metadata
//! embedded by `build.rs`.

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of rustc that built this crate, or "unknown" if unavailable.
pub const RUSTC_SEMVER: &str = or_unknown(option_env!("VERGEN_RUSTC_SEMVER"));

/// Version line of the gRPC runtime (`tonic`) this crate is built against.
///
/// Keep in step with the `tonic` requirement in Cargo.toml.
pub const TRANSPORT_VERSION: &str = "0.13";

const GIT_BRANCH: &str = or_unknown(option_env!("VERGEN_GIT_BRANCH"));
const GIT_SHA: &str = or_unknown(option_env!("VERGEN_GIT_SHA"));
const GIT_DIRTY: bool = match option_env!("VERGEN_GIT_DIRTY") {
    Some(value) => matches!(value.as_bytes(), b"true"),
    None => false,
};

const fn or_unknown(value: Option<&'static str>) -> &'static str {
    match value {
        Some(value) => value,
        None => "unknown",
    }
}

/// Version with build metadata, e.g. `0.1.0+main.abc1234` or
/// `0.1.0+main.abc1234.dirty`. Shown by the CLI at startup.
pub fn version_string() -> String {
    let sha: String = GIT_SHA.chars().take(7).collect();
    let dirty = if GIT_DIRTY { ".dirty" } else { "" };
    format!("{PKG_VERSION}+{GIT_BRANCH}.{sha}{dirty}")
}
