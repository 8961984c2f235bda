//! Module identity and extraction result types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Version extraction strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionMode {
    /// Read the assembly manifest from CLR metadata
    #[default]
    Managed,
    /// Read the native `VS_VERSIONINFO` resource
    Native,
}

impl ExtractionMode {
    /// Map the `GenericDLL` flag onto a mode
    pub fn from_generic_flag(generic: bool) -> Self {
        if generic {
            ExtractionMode::Native
        } else {
            ExtractionMode::Managed
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMode::Managed => write!(f, "managed"),
            ExtractionMode::Native => write!(f, "native"),
        }
    }
}

/// One inspected binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReference {
    /// Absolute form of the input with `.` and `..` components folded away
    pub path: PathBuf,
    pub exists: bool,
}

impl ModuleReference {
    /// Resolve `input` to an absolute path and check that it names an existing file
    pub fn resolve(input: impl AsRef<Path>) -> Self {
        let input = input.as_ref();
        let absolute = std::path::absolute(input).unwrap_or_else(|_| input.to_path_buf());
        let path = normalize(&absolute);
        let exists = path.is_file();

        Self { path, exists }
    }

    /// File name including the extension
    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }

}

/// Fold `.` and `..` components without touching the filesystem
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = matches!(
                    normalized.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                );
                if !at_root {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Sentinel used when a native module carries no version string
pub const UNKNOWN_VERSION: &str = "??";

/// Result of a successful extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDescriptor {
    pub display_name: String,
    pub version: String,
}

impl VersionDescriptor {
    pub fn new(display_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for VersionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Version={}", self.display_name, self.version)
    }
}

/// Why an extraction failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    /// The file exists but reading it failed
    Unreadable,
    /// The file was read but is not a usable module
    Unparsable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionFailure {
    pub kind: FailureKind,
    pub reason: String,
}

/// Tagged result of `extract`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Success(VersionDescriptor),
    Failure(ExtractionFailure),
}

impl ExtractionOutcome {
    pub fn failure(kind: FailureKind, reason: impl Into<String>) -> Self {
        ExtractionOutcome::Failure(ExtractionFailure {
            kind,
            reason: reason.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionOutcome::Success(_))
    }

    /// Text for the `Version=` line; empty on failure
    pub fn version_text(&self) -> String {
        match self {
            ExtractionOutcome::Success(descriptor) => descriptor.to_string(),
            ExtractionOutcome::Failure(_) => String::new(),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ExtractionOutcome::Success(_) => None,
            ExtractionOutcome::Failure(failure) => Some(&failure.reason),
        }
    }
}
