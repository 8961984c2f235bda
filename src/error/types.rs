//! Error types and definitions for verprobe
//!
//! This module provides the crate-wide error type, its severity classification,
//! and the mapping from errors to the processing error codes reported as exit codes.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::outcome::{ErrorCode, ProcessingErrorCode};

/// Error severity levels for different error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Warning level errors - operation can continue
    Warning,
    /// Error level - current file fails but the batch continues
    Error,
    /// Critical level - the current invocation should stop
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "WARNING"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Main error type for verprobe operations
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Standard IO errors
    #[error("IO error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Settings file not found, neither at the given path nor beside the executable
    #[error("Settings file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Settings file read errors
    #[error("Error reading settings file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file parse errors
    #[error("Error parsing settings file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Settings file parsed but lacks the options section
    #[error("The section '[{section}]' was not found in the settings file: {path}")]
    MissingOptionsSection { path: PathBuf, section: String },

    /// Empty input path
    #[error("Input file name is empty")]
    EmptyInputPath,

    /// Invalid path errors
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    /// Output directory could not be created
    #[error("Error creating output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Report file write errors
    #[error("Exception writing the version info to the output file at {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stdout write errors
    #[error("Error writing to stdout: {source}")]
    StdoutWrite {
        #[source]
        source: std::io::Error,
    },

    /// Glob pattern errors
    #[error("Glob pattern error: {source}")]
    GlobPattern {
        #[source]
        source: glob::PatternError,
    },

    /// Directory traversal errors
    #[error("Directory traversal error for {path}: {message}")]
    DirectoryTraversal { path: PathBuf, message: String },

    /// Errors with added context
    #[error("{message}")]
    Context { message: String },
}

impl ProbeError {
    /// Get the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ProbeError::DirectoryTraversal { .. } => ErrorSeverity::Warning,

            ProbeError::Config { .. } => ErrorSeverity::Critical,
            ProbeError::ConfigNotFound { .. } => ErrorSeverity::Critical,
            ProbeError::ConfigRead { .. } => ErrorSeverity::Critical,
            ProbeError::ConfigParse { .. } => ErrorSeverity::Critical,
            ProbeError::MissingOptionsSection { .. } => ErrorSeverity::Critical,
            ProbeError::GlobPattern { .. } => ErrorSeverity::Critical,

            _ => ErrorSeverity::Error,
        }
    }

    /// The processing error code this error sets on the run
    pub fn error_code(&self) -> ErrorCode {
        let code = match self {
            ProbeError::ConfigNotFound { .. } => ProcessingErrorCode::ParameterFileNotFound,
            ProbeError::ConfigRead { .. }
            | ProbeError::ConfigParse { .. }
            | ProbeError::MissingOptionsSection { .. }
            | ProbeError::Config { .. } => ProcessingErrorCode::InvalidParameterFile,
            ProbeError::EmptyInputPath | ProbeError::InvalidPath { .. } => {
                ProcessingErrorCode::InvalidInputFilePath
            }
            ProbeError::OutputDirectory { .. }
            | ProbeError::GlobPattern { .. }
            | ProbeError::DirectoryTraversal { .. } => ProcessingErrorCode::FilePathError,
            _ => return ErrorCode::UnspecifiedError,
        };
        ErrorCode::Processing(code)
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ProbeError::ConfigNotFound { path } => {
                format!("Settings file not found at '{}'. Check the path given with --settings.", path.display())
            }
            ProbeError::InvalidPath { path } => {
                format!("Invalid path: '{}'. Please provide an existing file, directory or wildcard.", path.display())
            }
            ProbeError::OutputDirectory { path, source } => {
                format!("Cannot create output directory '{}': {}", path.display(), source)
            }
            ProbeError::Io { source } => {
                format!("File system error: {}. Check disk space and permissions.", source)
            }
            _ => self.to_string(),
        }
    }

    /// Create an IO error
    pub fn io_error(source: std::io::Error) -> Self {
        ProbeError::Io { source }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        ProbeError::Config {
            message: message.into(),
        }
    }

    /// Create a report write error
    pub fn report_write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProbeError::ReportWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a directory traversal error
    pub fn directory_traversal_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ProbeError::DirectoryTraversal {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        ProbeError::io_error(err)
    }
}

impl From<glob::PatternError> for ProbeError {
    fn from(err: glob::PatternError) -> Self {
        ProbeError::GlobPattern { source: err }
    }
}

/// Result type alias for verprobe operations
pub type Result<T> = std::result::Result<T, ProbeError>;
