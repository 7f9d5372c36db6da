//! Purpose: Library scope promotion at the dynamic-linking boundary.
//! Exports: `DynamicLinker`, `Dlfcn`, `LibraryHandle`.
//! Role: The one audited escape hatch that re-opens a resident library with global scope.
//! Invariants: Promotion always requests `RTLD_NOW | RTLD_GLOBAL`; there is no lazy or local variant.
//! Invariants: Promotion handles are never closed; dropping a `LibraryHandle` leaves the refcount.
//! Invariants: The residency probe uses `RTLD_NOLOAD` and closes whatever it opened.
//! Notes: De-duplication of a resident library by name is a loader contract, not checked here.
use std::ffi::{CStr, c_void};

use super::error::{Error, ErrorKind};

/// Opaque result of a successful promotion. Holds the raw `dlopen` handle only so the
/// promotion has something to return; nothing reads it.
#[derive(Debug)]
pub struct LibraryHandle {
    _raw: *mut c_void,
}

impl LibraryHandle {
    pub(crate) fn from_raw(raw: *mut c_void) -> Self {
        Self { _raw: raw }
    }
}

pub trait DynamicLinker {
    /// Reports whether `library` is already mapped into this process.
    fn is_resident(&self, library: &CStr) -> bool;

    /// Re-opens `library` with immediate binding and global symbol scope.
    fn promote_global(&self, library: &CStr) -> Result<LibraryHandle, Error>;
}

/// `DynamicLinker` backed by the platform `dlopen`/`dlerror`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Dlfcn;

impl DynamicLinker for Dlfcn {
    fn is_resident(&self, library: &CStr) -> bool {
        let handle = unsafe { libc::dlopen(library.as_ptr(), libc::RTLD_LAZY | libc::RTLD_NOLOAD) };
        if handle.is_null() {
            // Clear the pending error so a later dlerror() reports the promotion, not the probe.
            let _ = last_dl_error();
            return false;
        }
        unsafe {
            libc::dlclose(handle);
        }
        true
    }

    fn promote_global(&self, library: &CStr) -> Result<LibraryHandle, Error> {
        let handle = unsafe { libc::dlopen(library.as_ptr(), libc::RTLD_NOW | libc::RTLD_GLOBAL) };
        if handle.is_null() {
            let reason = last_dl_error().unwrap_or_else(|| "dlopen returned NULL".to_string());
            return Err(Error::new(ErrorKind::Relink)
                .with_message(reason)
                .with_library(library.to_string_lossy()));
        }
        Ok(LibraryHandle::from_raw(handle))
    }
}

fn last_dl_error() -> Option<String> {
    let message = unsafe { libc::dlerror() };
    if message.is_null() {
        return None;
    }
    Some(
        unsafe { CStr::from_ptr(message) }
            .to_string_lossy()
            .into_owned(),
    )
}
