//! Purpose: Nix plugin that re-exposes libpython with global symbol scope, then boots Python.
//! Exports: `core` (config, errors, linker and runtime seams, corrector), `abi` (entry symbol).
//! Role: Built as a `cdylib` for `nix --plugin-files`; the `rlib` exists for tests.
//! Invariants: The only C symbol exported is `nix_plugin_entry`.
//! Invariants: libpython is a link dependency, so it is resident before the entry runs.
pub mod abi;
pub mod core;
pub mod logging;
