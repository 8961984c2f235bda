//! Progress reporting functionality
//!
//! Status output for long multi-file runs, with support for quiet and verbose
//! modes. All messages go to stderr so that console-mode reports on stdout
//! stay machine-readable.

use ansi_term::Colour::{Cyan, Red, Yellow};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Progress reporter for multi-file runs
pub struct ProgressReporter {
    quiet: bool,
    verbose: bool,
    use_colors: bool,
    show_progress: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new(quiet: bool, verbose: bool, use_colors: bool) -> Self {
        Self {
            quiet,
            verbose,
            use_colors,
            show_progress: true,
            spinner: Mutex::new(None),
        }
    }

    /// A reporter that prints nothing but errors
    pub fn silent() -> Self {
        Self::new(true, false, false).with_progress(false)
    }

    /// Enable or disable the spinner
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Start a spinner for a multi-file operation
    pub fn start(&self, message: &str) {
        if self.quiet || !self.show_progress {
            return;
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {pos} files {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(spinner);
        }
    }

    /// Advance the spinner by one file
    pub fn tick(&self, message: &str) {
        if let Ok(slot) = self.spinner.lock() {
            if let Some(spinner) = slot.as_ref() {
                spinner.inc(1);
                spinner.set_message(message.to_string());
            }
        }
    }

    /// Finish the progress operation
    pub fn finish(&self, message: &str) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(spinner) = slot.take() {
                spinner.finish_and_clear();
            }
        }

        if self.verbose {
            self.emit(&format!("Finished: {}", message));
        }
    }

    /// Print a verbose message (only in verbose mode)
    pub fn print_verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            let text = if self.use_colors {
                Cyan.paint(message).to_string()
            } else {
                message.to_string()
            };
            self.emit(&text);
        }
    }

    /// Print a warning message (always printed, even in quiet mode)
    pub fn print_warning(&self, message: &str) {
        let prefix = if self.use_colors {
            Yellow.bold().paint("Warning:").to_string()
        } else {
            "Warning:".to_string()
        };
        self.emit(&format!("{} {}", prefix, message));
    }

    /// Print an error message (always printed, even in quiet mode)
    pub fn print_error(&self, message: &str) {
        let prefix = if self.use_colors {
            Red.bold().paint("Error:").to_string()
        } else {
            "Error:".to_string()
        };
        self.emit(&format!("{} {}", prefix, message));
    }

    // Keep messages from tearing through an active spinner line
    fn emit(&self, text: &str) {
        match self.spinner.lock() {
            Ok(slot) => match slot.as_ref() {
                Some(spinner) => spinner.suspend(|| eprintln!("{}", text)),
                None => eprintln!("{}", text),
            },
            Err(_) => eprintln!("{}", text),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(false, false, true)
    }
}
