//! The per-module report record

use std::path::Path;

use crate::models::module::{file_name_of, ExtractionOutcome, ModuleReference};

/// Fixed-order `Key=Value` block written for each module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRecord {
    pub file_name: String,
    pub path: String,
    pub version: String,
    /// Present only when extraction failed
    pub error: Option<String>,
}

impl ReportRecord {
    /// Build a record for `module_path`.
    ///
    /// When the file exists its absolute name and path are used; otherwise the
    /// literal input path and its last component are reported.
    pub fn from_outcome(module_path: &Path, outcome: &ExtractionOutcome) -> Self {
        let module = ModuleReference::resolve(module_path);

        let (file_name, path) = if module.exists {
            (module.file_name(), module.path.display().to_string())
        } else {
            (file_name_of(module_path), module_path.display().to_string())
        };

        let error = outcome
            .error_message()
            .filter(|message| !message.trim().is_empty())
            .map(str::to_string);

        Self {
            file_name,
            path,
            version: outcome.version_text(),
            error,
        }
    }

    /// The record as lines, without terminators
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("FileName={}", self.file_name),
            format!("Path={}", self.path),
            format!("Version={}", self.version),
        ];

        if let Some(error) = &self.error {
            lines.push(format!("Error={}", error));
        }

        lines
    }

    /// Render the record; append mode adds one blank separator line
    pub fn render(&self, with_separator: bool) -> String {
        let mut text = String::new();
        for line in self.lines() {
            text.push_str(&line);
            text.push('\n');
        }
        if with_separator {
            text.push('\n');
        }
        text
    }
}
