//! Report writing and console progress

mod progress;
mod report_writer;
mod writers;

pub use self::progress::ProgressReporter;
pub use self::report_writer::{default_report_name, ReportDestination, ReportWriter, REPORT_SUFFIX};
pub use self::writers::{create_writer, FileWriter, OutputWriter, StdoutWriter};
