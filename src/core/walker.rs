//! Candidate file discovery
//!
//! A run covers a single module, a wildcard expanded in one directory, or a
//! recursive walk below a root directory with an optional depth bound. Each
//! candidate is handed to the `Processor`; one failing file never stops the
//! rest of the run.

use glob::{MatchOptions, Pattern};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::processor::Processor;
use crate::error::{ProbeError, Result, ResultExt};
use crate::models::outcome::RunOutcome;

/// File extensions considered when no explicit file pattern is given
pub const MODULE_EXTENSIONS: [&str; 2] = ["dll", "exe"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Whether the last component of `path` contains wildcard characters
pub fn has_wildcard(path: &Path) -> bool {
    path.file_name()
        .map(|name| {
            let name = name.to_string_lossy();
            name.contains('*') || name.contains('?')
        })
        .unwrap_or(false)
}

/// Whether `name` has a module extension
pub fn is_module_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map(|ext| {
            MODULE_EXTENSIONS
                .iter()
                .any(|m| ext.to_string_lossy().eq_ignore_ascii_case(m))
        })
        .unwrap_or(false)
}

/// Split an input into the directory to search and the file-name pattern
pub fn split_search_root(input: &Path) -> (PathBuf, String) {
    if input.is_dir() {
        return (input.to_path_buf(), "*".to_string());
    }

    let root = match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let pattern = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "*".to_string());
    (root, pattern)
}

/// File-name matcher; bare `*` and `*.*` only select modules
struct CandidateMatcher {
    pattern: Pattern,
    modules_only: bool,
}

impl CandidateMatcher {
    fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Pattern::new(pattern)?,
            modules_only: pattern == "*" || pattern == "*.*",
        })
    }

    fn matches(&self, name: &OsStr) -> bool {
        let name = name.to_string_lossy();
        if self.modules_only {
            is_module_name(&name)
        } else {
            self.pattern.matches_with(&name, MATCH_OPTIONS)
        }
    }
}

/// Drives the processor over every candidate file of a run
pub struct FileWalker<'a> {
    processor: &'a Processor,
    recurse: bool,
    max_levels: usize,
}

impl<'a> FileWalker<'a> {
    pub fn new(processor: &'a Processor, recurse: bool, max_levels: usize) -> Self {
        Self {
            processor,
            recurse,
            max_levels,
        }
    }

    /// Process everything `input` names; true when every processed file succeeded
    pub fn run(&self, input: &Path, output_dir: Option<&Path>, outcome: &mut RunOutcome) -> bool {
        if self.recurse {
            self.run_recursive(input, output_dir, outcome)
        } else if has_wildcard(input) {
            self.run_wildcard(input, output_dir, outcome)
        } else {
            self.processor.process_file(input, output_dir, true, outcome)
        }
    }

    fn run_wildcard(&self, input: &Path, output_dir: Option<&Path>, outcome: &mut RunOutcome) -> bool {
        outcome.reset_error_code();

        let (dir, pattern) = split_search_root(input);
        let candidates = match self.expand_wildcard(&dir, &pattern) {
            Ok(candidates) => candidates,
            Err(err) => return self.fail(err, outcome),
        };

        if candidates.is_empty() {
            self.processor
                .reporter()
                .print_warning(&format!("No files match {}", input.display()));
            return true;
        }

        self.process_all(&candidates, output_dir, outcome)
    }

    fn run_recursive(&self, input: &Path, output_dir: Option<&Path>, outcome: &mut RunOutcome) -> bool {
        outcome.reset_error_code();

        let (root, pattern) = split_search_root(input);
        if !root.is_dir() {
            return self.fail(ProbeError::InvalidPath { path: root }, outcome);
        }

        let candidates = match self.collect_recursive(&root, &pattern) {
            Ok(candidates) => candidates,
            Err(err) => return self.fail(err, outcome),
        };

        self.process_all(&candidates, output_dir, outcome)
    }

    /// Matching files directly inside `dir`, sorted by name
    pub fn expand_wildcard(&self, dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(ProbeError::InvalidPath {
                path: dir.to_path_buf(),
            });
        }

        let matcher = CandidateMatcher::new(pattern)?;
        let mut candidates = Vec::new();
        for entry in fs::read_dir(dir).with_file_context(dir)? {
            match entry.with_file_context(dir) {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && matcher.matches(&entry.file_name()) {
                        candidates.push(path);
                    }
                }
                Err(err) => self.processor.reporter().print_warning(&err.user_message()),
            }
        }

        candidates.sort();
        Ok(candidates)
    }

    /// Matching files below `root` in traversal order
    pub fn collect_recursive(&self, root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let matcher = CandidateMatcher::new(pattern)?;

        let mut walker = WalkDir::new(root).sort_by_file_name();
        if self.max_levels > 0 {
            walker = walker.max_depth(self.max_levels);
        }

        let mut candidates = Vec::new();
        for entry in walker {
            match entry.with_file_context(root) {
                Ok(entry) => {
                    if entry.file_type().is_file() && matcher.matches(entry.file_name()) {
                        candidates.push(entry.into_path());
                    }
                }
                // Unreadable subdirectories are skipped
                Err(err) => self.processor.reporter().print_warning(&err.user_message()),
            }
        }

        Ok(candidates)
    }

    fn process_all(&self, candidates: &[PathBuf], output_dir: Option<&Path>, outcome: &mut RunOutcome) -> bool {
        let reporter = self.processor.reporter();
        reporter.start("Probing modules");

        let mut all_succeeded = true;
        for path in candidates {
            let succeeded = self.processor.process_file(path, output_dir, false, outcome);
            all_succeeded &= succeeded;
            reporter.tick(&path.file_name().unwrap_or_default().to_string_lossy());
        }

        reporter.finish(&format!("{} files processed", candidates.len()));
        all_succeeded
    }

    fn fail(&self, err: ProbeError, outcome: &mut RunOutcome) -> bool {
        outcome.set_error_code(err.error_code());
        self.processor.reporter().print_error(&err.user_message());
        false
    }
}
