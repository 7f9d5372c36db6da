// Core modules implementing scope promotion, runtime bootstrap, config, and error modeling.
pub mod config;
pub mod error;
pub mod linker;
pub mod relink;
pub mod runtime;
