//! Purpose: C ABI entry point the Nix evaluator calls after loading this plugin.
//! Exports: `nix_plugin_entry`.
//! Role: Wires config, logging, and the visibility corrector; owns the exit policy.
//! Invariants: Runs its body at most once per process.
//! Invariants: A failed promotion prints the loader diagnostic and exits with status 1.
//! Invariants: That is the only fatal path; config problems are warnings.
//! Invariants: Nothing here inspects what the bootstrap statement did.
use std::process;
use std::sync::Once;

use crate::core::config::PluginConfig;
use crate::core::error::Error;
use crate::core::linker::Dlfcn;
use crate::core::relink::VisibilityCorrector;
use crate::core::runtime::PythonRuntime;
use crate::logging::init_tracing;

/// Exit status when the library cannot be promoted.
pub const RELINK_FAILURE_STATUS: i32 = 1;

static ENTRY: Once = Once::new();

#[unsafe(no_mangle)]
pub extern "C" fn nix_plugin_entry() {
    let mut first = false;
    ENTRY.call_once(|| {
        first = true;
        init_tracing();
        if let Err(err) = plugin_entry() {
            exit_with(err);
        }
    });
    if !first {
        tracing::debug!("nix_plugin_entry called again; already initialized");
    }
}

fn plugin_entry() -> Result<(), Error> {
    let config = PluginConfig::from_env();
    tracing::debug!(
        library = %config.library_name(),
        entry_module = config.entry_module(),
        "pyrelink plugin entry"
    );
    let mut runtime = PythonRuntime;
    VisibilityCorrector::new(&config).run(&Dlfcn, &mut runtime)
}

fn exit_with(err: Error) -> ! {
    tracing::debug!(kind = ?err.kind(), "pyrelink plugin entry failed");
    eprintln!("{}", describe(&err));
    process::exit(RELINK_FAILURE_STATUS);
}

fn describe(err: &Error) -> String {
    match err.library() {
        Some(library) => format!(
            "pyrelink: could not promote {library}: {}",
            err.message().unwrap_or("unknown loader error")
        ),
        None => format!("pyrelink: {err}"),
    }
}
