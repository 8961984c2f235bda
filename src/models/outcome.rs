//! Run-level outcome tracking
//!
//! A `RunOutcome` is owned by whoever drives a run and threaded through every
//! call to the processor. Its error code is sticky: once set it survives later
//! successful files until a caller explicitly resets it.

use std::fmt;

/// Error codes raised by the file-processing plumbing (input paths, settings files)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingErrorCode {
    InvalidInputFilePath,
    ParameterFileNotFound,
    InvalidParameterFile,
    FilePathError,
}

impl ProcessingErrorCode {
    /// Numeric value used as the process exit code
    pub fn value(&self) -> i32 {
        match self {
            ProcessingErrorCode::InvalidInputFilePath => 1,
            ProcessingErrorCode::ParameterFileNotFound => 4,
            ProcessingErrorCode::InvalidParameterFile => 8,
            ProcessingErrorCode::FilePathError => 16,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ProcessingErrorCode::InvalidInputFilePath => "Invalid input file path",
            ProcessingErrorCode::ParameterFileNotFound => "Parameter file not found",
            ProcessingErrorCode::InvalidParameterFile => "Invalid parameter file",
            ProcessingErrorCode::FilePathError => "General file path error",
        }
    }
}

/// The sticky error code of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorCode {
    #[default]
    NoError,
    /// The module exists but could not be read
    ErrorReadingInputFile,
    UnspecifiedError,
    Processing(ProcessingErrorCode),
}

impl ErrorCode {
    /// Numeric value used as the process exit code
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::NoError => 0,
            ErrorCode::ErrorReadingInputFile => 1,
            ErrorCode::UnspecifiedError => -1,
            ErrorCode::Processing(code) => code.value(),
        }
    }

    /// Message for the code; empty when there is no error
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::NoError => "",
            ErrorCode::ErrorReadingInputFile => "Error reading input file",
            ErrorCode::UnspecifiedError => "Unspecified localized error",
            ErrorCode::Processing(code) => code.description(),
        }
    }

    pub fn is_error(&self) -> bool {
        *self != ErrorCode::NoError
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::NoError => write!(f, "no error"),
            other => write!(f, "{} ({})", other.description(), other.exit_code()),
        }
    }
}

/// Aggregated result of one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    error_code: ErrorCode,
    files_processed: usize,
    files_failed: usize,
}

impl RunOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    pub fn set_error_code(&mut self, code: ErrorCode) {
        self.error_code = code;
    }

    pub fn reset_error_code(&mut self) {
        self.error_code = ErrorCode::NoError;
    }

    /// Count a processed file and whether it succeeded
    pub fn record_file(&mut self, success: bool) {
        self.files_processed += 1;
        if !success {
            self.files_failed += 1;
        }
    }

    pub fn files_processed(&self) -> usize {
        self.files_processed
    }

    pub fn files_failed(&self) -> usize {
        self.files_failed
    }

    pub fn exit_code(&self) -> i32 {
        self.error_code.exit_code()
    }
}
