//! Command-line argument configuration source

use std::path::PathBuf;

use super::ConfigSource;
use crate::cli::args::Args;
use crate::error::Result;
use crate::models::config::PartialSettings;
use crate::models::module::ExtractionMode;

/// Command-line argument configuration source
#[derive(Debug)]
pub struct CliConfig {
    args: CliArgs,
}

/// Command-line arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub generic: bool,
    pub console: bool,
    /// Some when recursing; the value bounds the depth, 0 for unlimited
    pub recurse: Option<usize>,
    pub settings: Option<PathBuf>,
    pub quiet: bool,
    pub verbose: bool,
    pub no_colors: bool,
    pub no_progress: bool,
}

impl From<&Args> for CliArgs {
    fn from(args: &Args) -> Self {
        Self {
            input: args.input_path(),
            output: args.output.clone(),
            generic: args.generic,
            console: args.console,
            recurse: args.recurse,
            settings: args.settings.clone(),
            quiet: args.quiet,
            verbose: args.verbose,
            no_colors: args.no_colors,
            no_progress: args.no_progress,
        }
    }
}

impl CliConfig {
    /// Create a new CLI configuration source
    pub fn new(args: CliArgs) -> Self {
        Self { args }
    }
}

impl ConfigSource for CliConfig {
    fn load(&self) -> Result<PartialSettings> {
        let mut settings = PartialSettings::default();

        if let Some(input) = &self.args.input {
            settings.input_path = Some(input.clone());
        }

        if let Some(output) = &self.args.output {
            settings.report_file = Some(output.clone());
        }

        // Flags only override lower layers when they are set
        if self.args.generic {
            settings.mode = Some(ExtractionMode::Native);
        }
        if self.args.console {
            settings.console = Some(true);
        }

        if let Some(levels) = self.args.recurse {
            settings.recurse = Some(true);
            settings.max_levels = Some(levels);
        }

        if let Some(path) = &self.args.settings {
            settings.settings_file = Some(path.clone());
        }

        settings.quiet = Some(self.args.quiet);
        settings.verbose = Some(self.args.verbose);

        if self.args.no_colors {
            settings.use_colors = Some(false);
        }
        if self.args.no_progress {
            settings.show_progress = Some(false);
        }

        Ok(settings)
    }

    fn is_available(&self) -> bool {
        true
    }
}
