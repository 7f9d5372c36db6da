//! Purpose: Load a plugin the way the Nix evaluator does and call its entry symbol.
//! Exports: `Plugin`, `HostError`.
//! Role: The dlopen/dlsym half of the host harness.
//! Invariants: Plugins are opened `RTLD_NOW | RTLD_LOCAL`, never global.
//! Invariants: A loaded plugin stays mapped for the life of the process (no dlclose).
use std::ffi::{CStr, CString, c_void};
use std::fmt;
use std::path::{Path, PathBuf};

pub type PluginEntry = unsafe extern "C" fn();

#[derive(Debug)]
pub enum HostError {
    InvalidArgument(String),
    Open { path: PathBuf, reason: String },
    MissingSymbol { symbol: String, reason: String },
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            HostError::Open { path, reason } => {
                write!(f, "could not load plugin {}: {reason}", path.display())
            }
            HostError::MissingSymbol { symbol, reason } => {
                write!(f, "plugin has no entry symbol {symbol}: {reason}")
            }
        }
    }
}

impl std::error::Error for HostError {}

pub struct Plugin {
    path: PathBuf,
    handle: *mut c_void,
}

impl Plugin {
    pub fn open(path: &Path) -> Result<Self, HostError> {
        let c_path = CString::new(path.as_os_str().as_encoded_bytes()).map_err(|_| {
            HostError::InvalidArgument(format!("{} contains a NUL byte", path.display()))
        })?;
        let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
        if handle.is_null() {
            return Err(HostError::Open {
                path: path.to_path_buf(),
                reason: last_dl_error(),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            handle,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry(&self, symbol: &str) -> Result<PluginEntry, HostError> {
        let c_symbol = CString::new(symbol)
            .map_err(|_| HostError::InvalidArgument(format!("{symbol:?} contains a NUL byte")))?;
        // Reset any stale error so a NULL below is attributable to this lookup.
        let _ = unsafe { libc::dlerror() };
        let address = unsafe { libc::dlsym(self.handle, c_symbol.as_ptr()) };
        if address.is_null() {
            return Err(HostError::MissingSymbol {
                symbol: symbol.to_string(),
                reason: last_dl_error(),
            });
        }
        Ok(unsafe { std::mem::transmute::<*mut c_void, PluginEntry>(address) })
    }
}

fn last_dl_error() -> String {
    let message = unsafe { libc::dlerror() };
    if message.is_null() {
        return "unknown loader error".to_string();
    }
    unsafe { CStr::from_ptr(message) }
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::{HostError, Plugin};
    use std::path::Path;

    #[test]
    fn missing_plugin_reports_path_and_reason() {
        let err = match Plugin::open(Path::new("/nonexistent/pyrelink/plugin.so")) {
            Err(err) => err,
            Ok(_) => panic!("expected open failure"),
        };
        assert!(matches!(err, HostError::Open { .. }));
        let text = err.to_string();
        assert!(text.starts_with("could not load plugin /nonexistent/pyrelink/plugin.so: "));
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn symbols_resolve_through_local_handle() {
        let plugin = Plugin::open(Path::new("libc.so.6")).expect("libc");
        assert_eq!(plugin.path(), Path::new("libc.so.6"));
        assert!(plugin.entry("sync").is_ok());
        let err = match plugin.entry("pyrelink_no_such_symbol") {
            Err(err) => err,
            Ok(_) => panic!("expected missing symbol"),
        };
        assert!(matches!(err, HostError::MissingSymbol { .. }));
    }
}
