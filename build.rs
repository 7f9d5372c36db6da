//! Purpose: Bake the libpython soname the plugin promotes into the crate at build time.
//! Role: Cargo build-script; reads the interpreter config pyo3 links against.
//! Invariants: Emits `PYRELINK_PYTHON_LIBRARY` via `cargo:rustc-env` exactly once.
//! Invariants: An explicit `PYRELINK_PYTHON_LIBRARY` in the build environment wins.
//! Invariants: Uses only Cargo-provided env vars plus that single override.
use std::env;

const OVERRIDE_VAR: &str = "PYRELINK_PYTHON_LIBRARY";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed={OVERRIDE_VAR}");

    let library = match env::var(OVERRIDE_VAR) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => linked_python_soname(),
    };

    println!("cargo:rustc-env={OVERRIDE_VAR}={library}");
}

fn linked_python_soname() -> String {
    let config = pyo3_build_config::get();
    if !config.shared {
        println!(
            "cargo:warning=linked Python is not a shared library; set {OVERRIDE_VAR} to the \
             soname the host process will have resident"
        );
    }
    match &config.lib_name {
        Some(name) => format!("lib{name}.so.1.0"),
        None => format!(
            "libpython{}.{}.so.1.0",
            config.version.major, config.version.minor
        ),
    }
}
