//! Purpose: Seam to the embedded Python interpreter.
//! Exports: `EmbeddedRuntime`, `PythonRuntime`.
//! Role: Opaque collaborator; owns its own lifecycle and error reporting.
//! Invariants: Statements go through `PyRun_SimpleString`, so failures print a traceback and are
//! not returned to the caller.
use super::config::BootstrapStatement;

pub trait EmbeddedRuntime {
    /// Establishes process-wide interpreter state. Repeat calls are the runtime's business.
    fn initialize(&mut self);

    /// Submits one statement. Whatever it raises is reported by the runtime itself.
    fn run_statement(&mut self, statement: &BootstrapStatement);
}

#[derive(Debug, Default)]
pub struct PythonRuntime;

impl EmbeddedRuntime for PythonRuntime {
    fn initialize(&mut self) {
        // Py_InitializeEx(0): SIGINT stays with the host.
        pyo3::prepare_freethreaded_python();
    }

    fn run_statement(&mut self, statement: &BootstrapStatement) {
        let source = match statement.to_c_string() {
            Ok(source) => source,
            Err(err) => {
                tracing::error!(error = %err, "bootstrap statement rejected");
                return;
            }
        };
        pyo3::Python::with_gil(|_py| {
            // -1 means the interpreter already printed the traceback.
            let _ = unsafe { pyo3::ffi::PyRun_SimpleString(source.as_ptr()) };
        });
    }
}
