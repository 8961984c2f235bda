//! verprobe - a version probe for Windows modules
//!
//! Reads the version of managed assemblies (from CLR metadata) and native
//! DLL/EXE files (from the `VS_VERSIONINFO` resource) without loading them,
//! and writes the result as a small `Key=Value` report.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod output;
pub mod parsers;

// Re-export commonly used types
pub use crate::core::{extract, FileWalker, Processor, RunPlan};
pub use error::{handle_error, ErrorSeverity, ProbeError, Result, ResultExt};
pub use models::{
    config::Settings,
    module::{ExtractionMode, ExtractionOutcome, VersionDescriptor},
    outcome::{ErrorCode, RunOutcome},
    report::ReportRecord,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
