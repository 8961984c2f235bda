//! Command implementations

use std::sync::Arc;

use super::Args;
use crate::config::{load_config, CliArgs};
use crate::core::{FileWalker, Processor, RunPlan};
use crate::error::Result;
use crate::models::config::Settings;
use crate::models::outcome::RunOutcome;
use crate::output::{ProgressReporter, ReportWriter};

/// Available commands
#[derive(Debug)]
pub enum Command {
    /// Probe the modules named by the settings
    Probe(Settings),
}

impl Command {
    /// Create a command from parsed arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let settings = load_config(CliArgs::from(args))?;
        Ok(Command::Probe(settings))
    }

    /// Execute the command
    pub fn execute(&self) -> Result<RunOutcome> {
        match self {
            Command::Probe(settings) => Ok(run(settings)),
        }
    }
}

/// Probe every module the settings name and return the run's outcome
pub fn run(settings: &Settings) -> RunOutcome {
    // The spinner would interleave with report lines on the console
    let reporter = Arc::new(
        ProgressReporter::new(settings.quiet, settings.verbose, settings.use_colors)
            .with_progress(settings.show_progress && !settings.console),
    );

    let mut outcome = RunOutcome::new();
    let plan = RunPlan::from_settings(settings);
    if let Err(err) = plan.prepare() {
        outcome.set_error_code(err.error_code());
        reporter.print_error(&err.user_message());
        return outcome;
    }

    if settings.verbose {
        reporter.print_verbose(&format!(
            "{} v{}: {} ({} mode)",
            crate::NAME,
            crate::VERSION,
            settings.input_path.display(),
            settings.mode
        ));
    }

    let writer = ReportWriter::new(plan.append, settings.console)
        .with_report_file_name(plan.report_file_name.clone());
    let processor = Processor::new(settings.mode, writer, Arc::clone(&reporter))
        .with_settings_file(settings.settings_file.clone());

    let walker = FileWalker::new(&processor, settings.recurse, settings.max_levels);
    let succeeded = walker.run(&settings.input_path, plan.output_dir.as_deref(), &mut outcome);

    if !succeeded && outcome.error_code().is_error() {
        reporter.print_error(&format!("Error while processing: {}", outcome.error_code()));
    }

    outcome
}
