use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    Relink,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    library: Option<String>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            library: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn library(&self) -> Option<&str> {
        self.library.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_library(mut self, library: impl Into<String>) -> Self {
        self.library = Some(library.into());
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(library) = &self.library {
            write!(f, " (library: {library})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};
    use std::error::Error as StdError;

    #[test]
    fn display_includes_message_and_library() {
        let err = Error::new(ErrorKind::Relink)
            .with_message("libpython3.10.so.1.0: cannot open shared object file")
            .with_library("libpython3.10.so.1.0");
        assert_eq!(
            err.to_string(),
            "Relink: libpython3.10.so.1.0: cannot open shared object file \
             (library: libpython3.10.so.1.0)"
        );
    }

    #[test]
    fn source_is_exposed() {
        let nul = std::ffi::CString::new("a\0b").unwrap_err();
        let err = Error::new(ErrorKind::Usage)
            .with_message("library name contains NUL")
            .with_source(nul);
        assert!(err.source().is_some());
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(err.library(), None);
    }
}
