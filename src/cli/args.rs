//! Command-line argument parsing

use clap::Parser;
use std::path::PathBuf;

/// verprobe - report the version of managed assemblies and native modules
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "verprobe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Report the version of managed assemblies and native DLL/EXE modules")]
#[command(long_about = "verprobe reads the version of a module without loading it. Managed assemblies are \
identified from their CLR metadata (assembly name and four-part version); with --generic the native \
VS_VERSIONINFO resource is used instead. Results are written as FileName/Path/Version[/Error] lines to a \
report file or to standard output.")]
#[command(after_help = "EXAMPLES:

    # Report the assembly version of a managed DLL next to verprobe
    verprobe ./bin/Contoso.Data.dll

    # Use the native version resource and print to the console
    verprobe -g -c C:\\Windows\\System32\\kernel32.dll

    # Every DLL and EXE under a directory, two levels deep, into one report
    verprobe -i ./bin -s=2 -o ./reports/versions.txt

    # Wildcards are expanded in the file's directory
    verprobe -i \"./plugins/*.dll\" -c

    # Take the mode from a settings file
    verprobe -i ./bin/tool.exe -p probe.toml

SETTINGS FILE (TOML):

    [VersionProbeOptions]
    GenericDLL = true
")]
pub struct Args {
    /// Module to inspect
    #[arg(value_name = "FILE", help = "Module file, directory or wildcard to inspect")]
    pub file: Option<PathBuf>,

    /// Module to inspect (alternative to the positional argument)
    #[arg(short, long, value_name = "FILE", conflicts_with = "file", help = "Module file, directory or wildcard to inspect")]
    pub input: Option<PathBuf>,

    /// Report file path
    #[arg(short, long, value_name = "FILE", help = "Report file (defaults to <module>_VersionInfo.txt beside verprobe)")]
    pub output: Option<PathBuf>,

    /// Native mode
    #[arg(short, long, help = "Read the native version resource instead of CLR assembly metadata")]
    pub generic: bool,

    /// Console mode
    #[arg(short, long, help = "Write report lines to standard output instead of a file")]
    pub console: bool,

    /// Recursive search with an optional depth bound
    #[arg(
        short = 's',
        long,
        value_name = "LEVELS",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "0",
        help = "Search subdirectories; LEVELS limits the depth (0 or omitted means unlimited)"
    )]
    pub recurse: Option<usize>,

    /// Settings file path
    #[arg(short = 'p', long, value_name = "FILE", help = "TOML settings file with a [VersionProbeOptions] table")]
    pub settings: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(short, long, help = "Suppress non-essential output")]
    pub quiet: bool,

    /// Show per-file progress
    #[arg(short, long, help = "Show per-file progress messages")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, help = "Disable colored error and warning prefixes")]
    pub no_colors: bool,

    /// Disable progress spinner
    #[arg(long, help = "Disable the progress spinner for multi-file runs")]
    pub no_progress: bool,
}

impl Args {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// The module path from `--input` or the positional argument
    pub fn input_path(&self) -> Option<PathBuf> {
        self.input
            .clone()
            .or_else(|| self.file.clone())
            .filter(|path| !path.as_os_str().is_empty())
    }
}
