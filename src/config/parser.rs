//! Settings file parsing utilities
//!
//! The settings file is TOML with a single options table:
//!
//! ```toml
//! [VersionProbeOptions]
//! GenericDLL = true
//! ```

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ProbeError, Result};

/// Name of the options table in a settings file
pub const OPTIONS_SECTION: &str = "VersionProbeOptions";

/// Values read from the options table
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProbeOptions {
    /// Use the native version resource instead of CLR metadata
    #[serde(rename = "GenericDLL", default)]
    pub generic_dll: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct SettingsDocument {
    #[serde(rename = "VersionProbeOptions")]
    options: Option<ProbeOptions>,
}

/// Locate a settings file.
///
/// A path that does not exist is retried as a file of the same name in the
/// executable's directory.
pub fn resolve_settings_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    if path.is_file() {
        return Ok(path.to_path_buf());
    }

    let beside_exe = path.file_name().and_then(|name| {
        env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(name)))
    });

    match beside_exe {
        Some(candidate) if candidate.is_file() => Ok(candidate),
        _ => Err(ProbeError::ConfigNotFound {
            path: path.to_path_buf(),
        }),
    }
}

/// Read and parse a settings file
pub fn parse_settings_file<P: AsRef<Path>>(path: P) -> Result<ProbeOptions> {
    let path = resolve_settings_path(path)?;

    let content = fs::read_to_string(&path).map_err(|e| ProbeError::ConfigRead {
        path: path.clone(),
        source: e,
    })?;

    parse_settings_content(&content, &path)
}

/// Parse settings file content; `path` is used for error messages
pub fn parse_settings_content<P: AsRef<Path>>(content: &str, path: P) -> Result<ProbeOptions> {
    let path = path.as_ref();

    let document: SettingsDocument = toml::from_str(content).map_err(|e| ProbeError::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    document.options.ok_or_else(|| ProbeError::MissingOptionsSection {
        path: path.to_path_buf(),
        section: OPTIONS_SECTION.to_string(),
    })
}
