//! Output writing functionality
//!
//! This module provides writers for the two report destinations.

use crate::error::{ProbeError, Result};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Trait for output writers
pub trait OutputWriter {
    /// Write content to the output destination
    fn write(&self, content: &str) -> Result<()>;
}

/// Writer for stdout output
#[derive(Debug)]
pub struct StdoutWriter;

impl OutputWriter for StdoutWriter {
    fn write(&self, content: &str) -> Result<()> {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(content.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|e| ProbeError::StdoutWrite { source: e })
    }
}

/// Writer for file output
///
/// The file is opened, written and closed on every call.
#[derive(Debug)]
pub struct FileWriter {
    path: PathBuf,
    append: bool,
}

impl FileWriter {
    /// Create a new file writer that truncates on each write
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            append: false,
        }
    }

    /// Append to the file instead of truncating it
    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }
}

impl OutputWriter for FileWriter {
    fn write(&self, content: &str) -> Result<()> {
        let mut options = OpenOptions::new();
        if self.append {
            options.append(true).create(true);
        } else {
            options.write(true).create(true).truncate(true);
        }

        let mut file = options
            .open(&self.path)
            .map_err(|e| ProbeError::report_write_error(&self.path, e))?;

        file.write_all(content.as_bytes())
            .map_err(|e| ProbeError::report_write_error(&self.path, e))
    }
}

/// Create an output writer: stdout when `path` is None, otherwise a file
pub fn create_writer(path: Option<impl AsRef<Path>>, append: bool) -> Box<dyn OutputWriter> {
    match path {
        Some(path) => Box::new(FileWriter::new(path).append(append)),
        None => Box::new(StdoutWriter),
    }
}
