//! Report destination selection and writing

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{ProbeError, Result, ResultExt};
use crate::models::module::ExtractionOutcome;
use crate::models::report::ReportRecord;
use crate::output::writers::create_writer;

/// Suffix of the default per-module report file name
pub const REPORT_SUFFIX: &str = "_VersionInfo.txt";

/// Where a record ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportDestination {
    Console,
    File(PathBuf),
}

impl fmt::Display for ReportDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportDestination::Console => write!(f, "standard output"),
            ReportDestination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Writes one `ReportRecord` per module to the console or a report file
#[derive(Debug, Clone, Default)]
pub struct ReportWriter {
    append: bool,
    console: bool,
    report_file_name: Option<String>,
    default_directory: Option<PathBuf>,
}

impl ReportWriter {
    pub fn new(append: bool, console: bool) -> Self {
        Self {
            append,
            console,
            ..Self::default()
        }
    }

    /// Use `name` for every report instead of `<stem>_VersionInfo.txt`
    pub fn with_report_file_name(mut self, name: Option<String>) -> Self {
        self.report_file_name = name.filter(|n| !n.trim().is_empty());
        self
    }

    /// Directory used when `write` is given none; defaults to the executable's directory
    pub fn with_default_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.default_directory = Some(directory.into());
        self
    }

    pub fn is_console(&self) -> bool {
        self.console
    }

    /// The report file a record for `module_path` is written to
    pub fn report_path(&self, module_path: &Path, destination_dir: Option<&Path>) -> Result<PathBuf> {
        let file_name = match &self.report_file_name {
            Some(name) => name.clone(),
            None => default_report_name(module_path),
        };

        let directory = match (destination_dir, &self.default_directory) {
            (Some(dir), _) => dir.to_path_buf(),
            (None, Some(dir)) => dir.clone(),
            (None, None) => executable_directory()?,
        };

        Ok(directory.join(file_name))
    }

    /// Render and write the record for one module
    pub fn write(
        &self,
        module_path: &Path,
        destination_dir: Option<&Path>,
        outcome: &ExtractionOutcome,
    ) -> Result<ReportDestination> {
        let record = ReportRecord::from_outcome(module_path, outcome);

        if self.console {
            create_writer(None::<&Path>, false).write(&record.render(false))?;
            return Ok(ReportDestination::Console);
        }

        let path = self.report_path(module_path, destination_dir)?;
        create_writer(Some(&path), self.append).write(&record.render(self.append))?;
        Ok(ReportDestination::File(path))
    }
}

/// `<stem>_VersionInfo.txt` for a module path
pub fn default_report_name(module_path: &Path) -> String {
    let stem = module_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}{}", stem, REPORT_SUFFIX)
}

fn executable_directory() -> Result<PathBuf> {
    let exe = env::current_exe().with_context(|| "Failed to resolve executable directory")?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| ProbeError::InvalidPath { path: exe.clone() })
}
