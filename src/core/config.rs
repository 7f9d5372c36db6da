//! Purpose: Resolve which library to promote and which module the bootstrap imports.
//! Exports: `PluginConfig`, `BootstrapStatement`, default names and env var names.
//! Role: Single source for plugin-entry inputs; defaults are fixed at build time.
//! Invariants: Without overrides the config is exactly the build-time library + `plugin_entry`.
//! Invariants: Loading never fails; an invalid override is logged and the built-in value used.
//! Invariants: The bootstrap statement is only ever built from a validated dotted module path.
//! Invariants: Loading takes a lookup fn; nothing here reads or mutates the process env directly.
use std::ffi::{CStr, CString};

use tracing::warn;

use super::error::{Error, ErrorKind};

/// Soname of the libpython this crate was linked against, resolved by `build.rs`.
pub const DEFAULT_LIBRARY: &str = env!("PYRELINK_PYTHON_LIBRARY");
pub const DEFAULT_ENTRY_MODULE: &str = "plugin_entry";

const DEFAULT_LIBRARY_C: &CStr =
    match CStr::from_bytes_with_nul(concat!(env!("PYRELINK_PYTHON_LIBRARY"), "\0").as_bytes()) {
        Ok(name) => name,
        Err(_) => panic!("PYRELINK_PYTHON_LIBRARY must not contain NUL bytes"),
    };

pub const LIBRARY_VAR: &str = "PYRELINK_PYTHON_LIBRARY";
pub const ENTRY_MODULE_VAR: &str = "PYRELINK_ENTRY_MODULE";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PluginConfig {
    library: CString,
    entry_module: String,
}

impl PluginConfig {
    pub fn new(library: &str, entry_module: &str) -> Result<Self, Error> {
        let library = library_name(library)?;
        validate_module_path(entry_module)?;
        Ok(Self {
            library,
            entry_module: entry_module.to_string(),
        })
    }

    /// The compiled-in library and `plugin_entry`.
    pub fn builtin() -> Self {
        Self {
            library: DEFAULT_LIBRARY_C.to_owned(),
            entry_module: DEFAULT_ENTRY_MODULE.to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`. Unset or blank variables keep the built-in value;
    /// invalid ones are reported with `warn!` and also keep it.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::builtin();
        if let Some(value) = non_blank(lookup(LIBRARY_VAR)) {
            match library_name(&value) {
                Ok(library) => config.library = library,
                Err(err) => warn!(
                    var = LIBRARY_VAR,
                    error = %err,
                    fallback = DEFAULT_LIBRARY,
                    "ignoring invalid override; falling back to built-in library"
                ),
            }
        }
        if let Some(value) = non_blank(lookup(ENTRY_MODULE_VAR)) {
            match validate_module_path(&value) {
                Ok(()) => config.entry_module = value,
                Err(err) => warn!(
                    var = ENTRY_MODULE_VAR,
                    error = %err,
                    fallback = DEFAULT_ENTRY_MODULE,
                    "ignoring invalid override; falling back to built-in entry module"
                ),
            }
        }
        config
    }

    pub fn library(&self) -> &CStr {
        &self.library
    }

    pub fn library_name(&self) -> String {
        self.library.to_string_lossy().into_owned()
    }

    pub fn entry_module(&self) -> &str {
        &self.entry_module
    }

    pub fn bootstrap(&self) -> BootstrapStatement {
        BootstrapStatement {
            source: format!("import {}", self.entry_module),
        }
    }
}

/// One line of Python source submitted to the embedded interpreter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BootstrapStatement {
    source: String,
}

impl BootstrapStatement {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn to_c_string(&self) -> Result<CString, Error> {
        CString::new(self.source.as_str()).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("bootstrap statement contains NUL")
                .with_source(err)
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn library_name(library: &str) -> Result<CString, Error> {
    if library.trim().is_empty() {
        return Err(Error::new(ErrorKind::Usage).with_message("library name is empty"));
    }
    CString::new(library).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("library name contains an interior NUL byte")
            .with_source(err)
    })
}

fn validate_module_path(module: &str) -> Result<(), Error> {
    let valid = !module.is_empty() && module.split('.').all(is_identifier);
    if valid {
        Ok(())
    } else {
        Err(Error::new(ErrorKind::Usage)
            .with_message(format!("entry module `{module}` is not a dotted Python identifier")))
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|ch| ch == '_' || ch.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let config = PluginConfig::from_lookup(lookup(&[]));
        assert_eq!(config.library().to_str().unwrap(), DEFAULT_LIBRARY);
        assert_eq!(config.entry_module(), "plugin_entry");
        assert_eq!(
            config,
            PluginConfig::new(DEFAULT_LIBRARY, DEFAULT_ENTRY_MODULE).unwrap()
        );
    }

    #[test]
    fn builtin_library_is_a_versioned_soname() {
        let name = PluginConfig::builtin().library_name();
        assert!(!name.is_empty());
        assert!(name.starts_with("lib"));
        assert!(name.contains(".so"));
        assert_eq!(name, DEFAULT_LIBRARY);
    }

    #[test]
    fn default_bootstrap_imports_plugin_entry() {
        let statement = PluginConfig::builtin().bootstrap();
        assert_eq!(statement.source(), "import plugin_entry");
        assert_eq!(
            statement.to_c_string().unwrap().as_bytes(),
            b"import plugin_entry"
        );
    }

    #[test]
    fn overrides_are_honoured() {
        let config = PluginConfig::from_lookup(lookup(&[
            (LIBRARY_VAR, "libpython3.12.so.1.0"),
            (ENTRY_MODULE_VAR, "nixpy.entry"),
        ]));
        assert_eq!(config.library_name(), "libpython3.12.so.1.0");
        assert_eq!(config.bootstrap().source(), "import nixpy.entry");
    }

    #[test]
    fn blank_overrides_fall_back_to_builtin() {
        let config =
            PluginConfig::from_lookup(lookup(&[(LIBRARY_VAR, "  "), (ENTRY_MODULE_VAR, "")]));
        assert_eq!(config, PluginConfig::builtin());
    }

    #[test]
    fn invalid_overrides_fall_back_to_builtin() {
        let config = PluginConfig::from_lookup(lookup(&[
            (LIBRARY_VAR, "libpython\0.so"),
            (ENTRY_MODULE_VAR, "plugin_entry; import os"),
        ]));
        assert_eq!(config, PluginConfig::builtin());
    }

    #[test]
    fn invalid_module_override_keeps_valid_library_override() {
        let config = PluginConfig::from_lookup(lookup(&[
            (LIBRARY_VAR, "libpyrelink-missing.so.0"),
            (ENTRY_MODULE_VAR, "entry-point"),
        ]));
        assert_eq!(config.library_name(), "libpyrelink-missing.so.0");
        assert_eq!(config.entry_module(), DEFAULT_ENTRY_MODULE);
    }

    #[test]
    fn interior_nul_in_library_is_rejected() {
        let err = PluginConfig::new("libpython\0.so", "plugin_entry").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn empty_library_is_rejected() {
        let err = PluginConfig::new(" ", "plugin_entry").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn non_identifier_modules_are_rejected() {
        for module in [
            "plugin_entry; import os",
            "1entry",
            "pkg..mod",
            "pkg.",
            "entry-point",
        ] {
            let err = PluginConfig::new("libpython3.10.so.1.0", module).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Usage, "module {module:?}");
        }
    }

    #[test]
    fn dotted_and_underscored_modules_are_accepted() {
        for module in ["plugin_entry", "_private", "pkg.sub.mod", "entry2"] {
            assert!(PluginConfig::new("libpython3.10.so.1.0", module).is_ok());
        }
    }
}
