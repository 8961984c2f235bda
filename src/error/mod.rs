//! Error handling for verprobe
//!
//! Error types, result aliases, and error context utilities.

pub mod context;
pub mod types;

pub use context::{ResultExt, handle_error};
pub use types::{ErrorSeverity, ProbeError, Result};
