//! Build script recording the version of the compiler building this crate.
//!
//! Reports carry it as `rustVersion`, the closest equivalent of a runtime
//! version for a compiled binary.

fn main() {
    let version = rustc_version::version()
        .map(|version| version.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=EXCEPTIONAL_RUSTC_VERSION={version}");
    println!("cargo:rerun-if-env-changed=RUSTC");
}
