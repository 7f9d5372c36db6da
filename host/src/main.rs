//! Purpose: `pyrelink-host`, a minimal stand-in for the Nix evaluator's plugin loading.
//! Role: Binary crate root; loads each plugin with local scope and calls its entry symbol.
//! Invariants: Plugins are processed in argument order; the first failure stops the run.
//! Invariants: Host errors go to stderr with exit status 1; a plugin may exit on its own terms.
//! Notes: Links neither libpython nor the plugin crate, so scope promotion is observable.
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod loader;

use loader::{HostError, Plugin};

#[derive(Parser, Debug)]
#[command(
    name = "pyrelink-host",
    version,
    about = "Load plugins with RTLD_LOCAL and call their entry symbol"
)]
struct Cli {
    /// Plugin shared objects, loaded in order.
    #[arg(required = true, value_name = "PLUGIN")]
    plugins: Vec<PathBuf>,

    /// Symbol called after each plugin is loaded.
    #[arg(long, default_value = "nix_plugin_entry")]
    entry_symbol: String,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("pyrelink-host: {err}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), HostError> {
    for path in &cli.plugins {
        let plugin = Plugin::open(path)?;
        let entry = plugin.entry(&cli.entry_symbol)?;
        info!(plugin = %plugin.path().display(), symbol = %cli.entry_symbol, "calling plugin entry");
        unsafe { entry() };
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
