//! Configuration-related data structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::module::ExtractionMode;

/// Main configuration settings for verprobe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Module path, directory, or wildcard to inspect
    pub input_path: PathBuf,

    /// Report file path (directory + file name); defaults are applied per module when absent
    pub report_file: Option<PathBuf>,

    /// Managed (CLR metadata) or native (version resource) extraction
    pub mode: ExtractionMode,

    /// Write report records to stdout instead of a file
    pub console: bool,

    /// Search the input directory and its subdirectories
    pub recurse: bool,

    /// Maximum directory levels to descend when recursing; 0 means unlimited
    pub max_levels: usize,

    /// Optional TOML settings file that may override the mode
    pub settings_file: Option<PathBuf>,

    /// Whether to suppress non-essential output
    pub quiet: bool,

    /// Whether to show per-file progress messages
    pub verbose: bool,

    /// Whether to colour error and warning prefixes
    pub use_colors: bool,

    /// Whether to show a spinner during multi-file runs
    pub show_progress: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_path: PathBuf::new(),
            report_file: None,
            mode: ExtractionMode::Managed,
            console: false,
            recurse: false,
            max_levels: 0,
            settings_file: None,
            quiet: false,
            verbose: false,
            use_colors: true,
            show_progress: true,
        }
    }
}

/// Partial settings for configuration merging
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialSettings {
    pub input_path: Option<PathBuf>,
    pub report_file: Option<PathBuf>,
    pub mode: Option<ExtractionMode>,
    pub console: Option<bool>,
    pub recurse: Option<bool>,
    pub max_levels: Option<usize>,
    pub settings_file: Option<PathBuf>,
    pub quiet: Option<bool>,
    pub verbose: Option<bool>,
    pub use_colors: Option<bool>,
    pub show_progress: Option<bool>,
}

impl PartialSettings {
    /// Merge another PartialSettings into this one
    /// Fields from `other` take precedence over existing fields
    pub fn merge_from(&mut self, other: PartialSettings) {
        if other.input_path.is_some() {
            self.input_path = other.input_path;
        }
        if other.report_file.is_some() {
            self.report_file = other.report_file;
        }
        if other.mode.is_some() {
            self.mode = other.mode;
        }
        if other.console.is_some() {
            self.console = other.console;
        }
        if other.recurse.is_some() {
            self.recurse = other.recurse;
        }
        if other.max_levels.is_some() {
            self.max_levels = other.max_levels;
        }
        if other.settings_file.is_some() {
            self.settings_file = other.settings_file;
        }
        if other.quiet.is_some() {
            self.quiet = other.quiet;
        }
        if other.verbose.is_some() {
            self.verbose = other.verbose;
        }
        if other.use_colors.is_some() {
            self.use_colors = other.use_colors;
        }
        if other.show_progress.is_some() {
            self.show_progress = other.show_progress;
        }
    }

    /// Convert partial settings to full settings
    /// Uses defaults for any fields that are None
    pub fn to_settings(&self) -> Settings {
        let mut settings = Settings::default();

        if let Some(input_path) = &self.input_path {
            settings.input_path = input_path.clone();
        }
        if let Some(report_file) = &self.report_file {
            settings.report_file = Some(report_file.clone());
        }
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if let Some(console) = self.console {
            settings.console = console;
        }
        if let Some(recurse) = self.recurse {
            settings.recurse = recurse;
        }
        if let Some(max_levels) = self.max_levels {
            settings.max_levels = max_levels;
        }
        if let Some(settings_file) = &self.settings_file {
            settings.settings_file = Some(settings_file.clone());
        }
        if let Some(quiet) = self.quiet {
            settings.quiet = quiet;
        }
        if let Some(verbose) = self.verbose {
            settings.verbose = verbose;
        }
        if let Some(use_colors) = self.use_colors {
            settings.use_colors = use_colors;
        }
        if let Some(show_progress) = self.show_progress {
            settings.show_progress = show_progress;
        }

        settings
    }
}
