//! Purpose: Install stderr diagnostics for code running inside a foreign host process.
//! Exports: `init_tracing`, `LOG_VAR`.
//! Role: Called once from the plugin entry before any other work.
//! Invariants: Never replaces a subscriber the process already installed.
//! Invariants: Writes to stderr only; stdout belongs to the host and the embedded runtime.
use tracing_subscriber::EnvFilter;

pub const LOG_VAR: &str = "PYRELINK_LOG";

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
