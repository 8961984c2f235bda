//! Settings file and environment configuration sources

use std::path::{Path, PathBuf};

use super::{parser, ConfigSource};
use crate::error::Result;
use crate::models::config::PartialSettings;
use crate::models::module::ExtractionMode;

/// Default environment variable prefix
pub const ENV_PREFIX: &str = "VERPROBE";

/// Settings file source; only the extraction mode can be overridden from it
pub struct ParameterFile {
    path: PathBuf,
}

impl ParameterFile {
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ConfigSource for ParameterFile {
    fn load(&self) -> Result<PartialSettings> {
        let options = parser::parse_settings_file(&self.path)?;
        Ok(PartialSettings {
            mode: options.generic_dll.map(ExtractionMode::from_generic_flag),
            ..Default::default()
        })
    }

    // A named settings file is always consulted so that a missing one is reported
    fn is_available(&self) -> bool {
        !self.path.as_os_str().is_empty()
    }
}

/// Environment variable configuration source
pub struct EnvConfig {
    prefix: String,
}

impl EnvConfig {
    /// Create a new environment variable configuration source
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    fn var(&self, key: &str) -> Option<String> {
        std::env::var(format!("{}_{}", self.prefix, key)).ok()
    }

    fn flag(&self, key: &str) -> Option<bool> {
        self.var(key).and_then(|value| match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(ENV_PREFIX)
    }
}

impl ConfigSource for EnvConfig {
    fn load(&self) -> Result<PartialSettings> {
        let mut settings = PartialSettings::default();

        if let Some(generic) = self.flag("GENERIC") {
            settings.mode = Some(ExtractionMode::from_generic_flag(generic));
        }

        if let Some(console) = self.flag("CONSOLE") {
            settings.console = Some(console);
        }

        if let Some(path) = self.var("SETTINGS_FILE").filter(|p| !p.trim().is_empty()) {
            settings.settings_file = Some(PathBuf::from(path));
        }

        Ok(settings)
    }

    fn is_available(&self) -> bool {
        ["GENERIC", "CONSOLE", "SETTINGS_FILE"]
            .iter()
            .any(|key| self.var(key).is_some())
    }
}
