//! Purpose: Promote the interpreter library to global scope, then boot the embedded runtime.
//! Exports: `VisibilityCorrector`.
//! Role: The linear startup sequence behind the plugin entry symbol.
//! Invariants: promote -> initialize -> run bootstrap, strictly in that order.
//! Invariants: A failed promotion returns `ErrorKind::Relink` before the runtime is touched.
//! Invariants: Bootstrap failures belong to the runtime and never surface here.
use tracing::{debug, warn};

use super::config::PluginConfig;
use super::error::Error;
use super::linker::DynamicLinker;
use super::runtime::EmbeddedRuntime;

pub struct VisibilityCorrector<'a> {
    config: &'a PluginConfig,
}

impl<'a> VisibilityCorrector<'a> {
    pub fn new(config: &'a PluginConfig) -> Self {
        Self { config }
    }

    pub fn run<L, R>(&self, linker: &L, runtime: &mut R) -> Result<(), Error>
    where
        L: DynamicLinker,
        R: EmbeddedRuntime,
    {
        let library = self.config.library();
        if linker.is_resident(library) {
            debug!(library = %self.config.library_name(), "upgrading resident library to global scope");
        } else {
            warn!(
                library = %self.config.library_name(),
                "library not resident yet; promotion will map a fresh copy"
            );
        }

        // The handle is dropped unclosed; the promotion outlives it.
        let _handle = linker.promote_global(library)?;
        debug!(library = %self.config.library_name(), "library promoted");

        runtime.initialize();
        debug!("embedded runtime initialized");

        let statement = self.config.bootstrap();
        debug!(statement = statement.source(), "running bootstrap statement");
        runtime.run_statement(&statement);
        Ok(())
    }
}
