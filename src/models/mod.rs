//! Data models and structures for verprobe

pub mod config;
pub mod module;
pub mod outcome;
pub mod report;

pub use config::{PartialSettings, Settings};
pub use module::{
    ExtractionFailure, ExtractionMode, ExtractionOutcome, FailureKind, ModuleReference,
    VersionDescriptor, UNKNOWN_VERSION,
};
pub use outcome::{ErrorCode, ProcessingErrorCode, RunOutcome};
pub use report::ReportRecord;
