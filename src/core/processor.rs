//! Per-file processing
//!
//! `Processor::process_file` runs one module through extraction and report
//! writing. It never panics or returns an error: every failure becomes a
//! message on the reporter, a code on the `RunOutcome` and a `false` result,
//! so one bad file cannot abort a batch.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ConfigSource, ParameterFile};
use crate::core::extractor::extract;
use crate::error::{ProbeError, Result};
use crate::models::module::{ExtractionMode, ExtractionOutcome, FailureKind, ModuleReference};
use crate::models::outcome::{ErrorCode, RunOutcome};
use crate::output::{ProgressReporter, ReportWriter};

/// Extracts and reports one module at a time
pub struct Processor {
    mode: ExtractionMode,
    settings_file: Option<PathBuf>,
    writer: ReportWriter,
    reporter: Arc<ProgressReporter>,
}

impl Processor {
    pub fn new(mode: ExtractionMode, writer: ReportWriter, reporter: Arc<ProgressReporter>) -> Self {
        Self {
            mode,
            settings_file: None,
            writer,
            reporter,
        }
    }

    /// Settings file consulted for a `GenericDLL` override on every call
    pub fn with_settings_file(mut self, settings_file: Option<PathBuf>) -> Self {
        self.settings_file = settings_file;
        self
    }

    pub fn reporter(&self) -> &ProgressReporter {
        &self.reporter
    }

    /// The configured mode, overridden by the settings file when it sets `GenericDLL`
    pub fn effective_mode(&self) -> Result<ExtractionMode> {
        match &self.settings_file {
            Some(path) => {
                let overrides = ParameterFile::with_path(path).load()?;
                Ok(overrides.mode.unwrap_or(self.mode))
            }
            None => Ok(self.mode),
        }
    }

    /// Process one module; true when its version was determined and written
    pub fn process_file(
        &self,
        input: &Path,
        output_dir: Option<&Path>,
        reset_error_code: bool,
        outcome: &mut RunOutcome,
    ) -> bool {
        if reset_error_code {
            outcome.reset_error_code();
        }

        let success = match self.try_process(input, output_dir, outcome) {
            Ok(success) => success,
            Err(err) => {
                outcome.set_error_code(err.error_code());
                self.reporter.print_error(&err.user_message());
                false
            }
        };

        outcome.record_file(success);
        success
    }

    fn try_process(&self, input: &Path, output_dir: Option<&Path>, outcome: &mut RunOutcome) -> Result<bool> {
        let mode = self.effective_mode().inspect_err(|_| {
            if let Some(path) = &self.settings_file {
                self.reporter
                    .print_error(&format!("Parameter file load error: {}", path.display()));
            }
        })?;

        if input.as_os_str().is_empty() {
            return Err(ProbeError::EmptyInputPath);
        }

        // Console runs never write into the output directory
        if let Some(dir) = output_dir.filter(|_| !self.writer.is_console()) {
            prepare_output_dir(dir)?;
        }

        let module = ModuleReference::resolve(input);
        self.reporter
            .print_verbose(&format!("Parsing {} ({} mode)", module.path.display(), mode));

        let extraction = extract(&module.path, mode);
        if let ExtractionOutcome::Failure(failure) = &extraction {
            let code = match failure.kind {
                FailureKind::Unreadable => ErrorCode::ErrorReadingInputFile,
                FailureKind::NotFound | FailureKind::Unparsable => ErrorCode::UnspecifiedError,
            };
            outcome.set_error_code(code);
            self.reporter.print_verbose(&failure.reason);
        }

        let written = match self.writer.write(&module.path, output_dir, &extraction) {
            Ok(destination) => {
                self.reporter
                    .print_verbose(&format!("Version info written to {}", destination));
                true
            }
            Err(err) => {
                outcome.set_error_code(ErrorCode::UnspecifiedError);
                self.reporter.print_error(&err.user_message());
                false
            }
        };

        Ok(written && extraction.is_success())
    }
}

fn prepare_output_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| ProbeError::OutputDirectory {
        path: dir.to_path_buf(),
        source,
    })
}
