//! Unified error types for ixctl
//!
//! Uses thiserror for ergonomic error definitions. External library
//! statuses are never reinterpreted; anything non-successful that
//! `libixml.so` returns is carried verbatim in [`IxmlError::Api`].

use thiserror::Error;

use crate::sys::types::{code_name, IxmlReturn, NVML_SUCCESS};

/// Errors surfaced by the IXML binding and wrapper layers
#[derive(Error, Debug)]
pub enum IxmlError {
    /// The shared library could not be opened
    #[error("Library '{0}' not found. Is the Iluvatar driver installed?")]
    LibraryNotFound(&'static str),

    /// A fixed export was missing from the opened library
    #[error("Symbol '{0}' not found in IXML library")]
    SymbolNotFound(&'static str),

    /// Releasing the library handle failed
    #[error("Failed to unload IXML library: {0}")]
    UnloadFailed(String),

    /// Device not found at index
    #[error("GPU device not found at index {0}")]
    DeviceNotFound(u32),

    /// Device not found by UUID
    #[error("GPU device not found with UUID: {0}")]
    DeviceNotFoundByUuid(String),

    /// Invalid argument passed to the wrapper
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Non-success status returned by the external library,
    /// propagated verbatim
    #[error("{call} failed: {} (status {code})", code_name(*.code))]
    Api { call: &'static str, code: IxmlReturn },

    /// IO error (output writing)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IxmlError {
    /// The raw status code, for callers that branch on pass-through
    /// statuses.
    pub fn raw_code(&self) -> Option<IxmlReturn> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Map a raw status to `Ok(())` or a pass-through [`IxmlError::Api`].
pub(crate) fn check(call: &'static str, code: IxmlReturn) -> Result<()> {
    if code == NVML_SUCCESS {
        Ok(())
    } else {
        Err(IxmlError::Api { call, code })
    }
}

/// Result type alias using IxmlError
pub type Result<T> = std::result::Result<T, IxmlError>;
