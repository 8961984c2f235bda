//! Settings validation

use crate::error::{ProbeError, Result};
use crate::models::config::Settings;

/// Settings validator for ensuring configuration is valid
pub struct SettingsValidator;

impl SettingsValidator {
    /// Validate settings and return errors if invalid
    pub fn validate(settings: &Settings) -> Result<()> {
        if settings.input_path.as_os_str().is_empty() {
            return Err(ProbeError::EmptyInputPath);
        }

        // The report path must name a file, not just a directory
        if let Some(report) = &settings.report_file {
            let names_file = report
                .file_name()
                .map(|name| !name.to_string_lossy().trim().is_empty())
                .unwrap_or(false);
            if !names_file {
                return Err(ProbeError::InvalidPath {
                    path: report.clone(),
                });
            }
        }

        if let Some(settings_file) = &settings.settings_file {
            if settings_file.as_os_str().is_empty() {
                return Err(ProbeError::config_error("Settings file path is empty"));
            }
        }

        Ok(())
    }
}
