//! Error context utilities for verprobe
//!
//! Helpers for attaching context to errors and for deciding, by severity,
//! whether an error stops the current invocation.

use std::path::Path;
use crate::error::{ErrorSeverity, ProbeError, Result};

/// Extension trait for Result to add context to errors
pub trait ResultExt<T, E> {
    /// Add context to an error with a custom message
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;

    /// Add file context to an error
    fn with_file_context<P: AsRef<Path>>(self, path: P) -> Result<T>;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error + 'static,
{
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|err| ProbeError::Context {
            message: format!("{}: {}", context(), err),
        })
    }

    fn with_file_context<P: AsRef<Path>>(self, path: P) -> Result<T> {
        self.map_err(|err| ProbeError::directory_traversal_error(path.as_ref(), err.to_string()))
    }
}

/// Handle an error based on its severity
///
/// - Warning: print the message and return None
/// - Error: print the message and return None
/// - Critical: print the message and return Some(error)
pub fn handle_error(err: ProbeError) -> Option<ProbeError> {
    let message = err.user_message();

    match err.severity() {
        ErrorSeverity::Warning => {
            eprintln!("Warning: {}", message);
            None
        }
        ErrorSeverity::Error => {
            eprintln!("Error: {}", message);
            None
        }
        ErrorSeverity::Critical => {
            eprintln!("Critical Error: {}", message);
            Some(err)
        }
    }
}
