//! Run planning
//!
//! Turns the report path from the settings into an output directory and a
//! report file name, and decides whether records accumulate in one file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::walker::has_wildcard;
use crate::error::{ProbeError, Result};
use crate::models::config::Settings;

/// Destination decisions for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    /// Directory for report files; None means beside the executable
    pub output_dir: Option<PathBuf>,
    /// Shared report file name; None means one `<stem>_VersionInfo.txt` per module
    pub report_file_name: Option<String>,
    /// Accumulate every record into the shared report file
    pub append: bool,
}

impl RunPlan {
    pub fn from_settings(settings: &Settings) -> Self {
        let report = settings
            .report_file
            .as_ref()
            .map(|path| std::path::absolute(path).unwrap_or_else(|_| path.clone()));

        let output_dir = report
            .as_ref()
            .and_then(|path| path.parent())
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf);

        let report_file_name = report
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned());

        let multi_file = settings.recurse || has_wildcard(&settings.input_path);
        let append = multi_file && report_file_name.is_some() && !settings.console;

        Self {
            output_dir,
            report_file_name,
            append,
        }
    }

    /// The shared report file, if this run writes one
    pub fn report_path(&self) -> Option<PathBuf> {
        let name = self.report_file_name.as_ref()?;
        self.output_dir.as_ref().map(|dir| dir.join(name))
    }

    /// Remove a stale shared report so an accumulating run starts empty
    pub fn prepare(&self) -> Result<()> {
        if !self.append {
            return Ok(());
        }

        match self.report_path() {
            Some(path) if path.is_file() => {
                fs::remove_file(&path).map_err(|e| ProbeError::report_write_error(&path, e))
            }
            _ => Ok(()),
        }
    }
}
