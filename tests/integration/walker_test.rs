use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use verprobe::{
    output::{ProgressReporter, ReportWriter},
    ExtractionMode, FileWalker, Processor, RunOutcome,
};

use crate::pe_builder::PeBuilder;

/// bin/{a.dll, b.exe, notes.txt, lib/c.dll, lib/deep/d.dll}
fn module_tree() -> TempDir {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("bin");
    fs::create_dir_all(bin.join("lib").join("deep")).unwrap();

    for (path, name) in [
        (bin.join("a.dll"), "A"),
        (bin.join("b.exe"), "B"),
        (bin.join("lib").join("c.dll"), "C"),
        (bin.join("lib").join("deep").join("d.dll"), "D"),
    ] {
        PeBuilder::new().with_assembly(name, [1, 0, 0, 0]).write_to(&path).unwrap();
    }
    fs::write(bin.join("notes.txt"), "not a module").unwrap();
    dir
}

fn shared_processor() -> Processor {
    let writer = ReportWriter::new(true, false).with_report_file_name(Some("all.txt".to_string()));
    Processor::new(ExtractionMode::Managed, writer, Arc::new(ProgressReporter::silent()))
}

fn names(paths: &[std::path::PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

fn report_versions(report: &Path) -> Vec<String> {
    fs::read_to_string(report)
        .unwrap()
        .lines()
        .filter_map(|line| line.strip_prefix("Version="))
        .map(str::to_string)
        .collect()
}

#[test]
fn test_depth_levels() {
    let tree = module_tree();
    let bin = tree.path().join("bin");
    let processor = shared_processor();

    let unlimited = FileWalker::new(&processor, true, 0).collect_recursive(&bin, "*").unwrap();
    assert_eq!(names(&unlimited), vec!["a.dll", "b.exe", "c.dll", "d.dll"]);

    let root_only = FileWalker::new(&processor, true, 1).collect_recursive(&bin, "*").unwrap();
    assert_eq!(names(&root_only), vec!["a.dll", "b.exe"]);

    let two = FileWalker::new(&processor, true, 2).collect_recursive(&bin, "*").unwrap();
    assert_eq!(names(&two), vec!["a.dll", "b.exe", "c.dll"]);
}

#[test]
fn test_explicit_pattern_selects_any_extension() {
    let tree = module_tree();
    let bin = tree.path().join("bin");
    let processor = shared_processor();
    let walker = FileWalker::new(&processor, true, 0);

    assert_eq!(names(&walker.collect_recursive(&bin, "*.TXT").unwrap()), vec!["notes.txt"]);
    assert_eq!(names(&walker.collect_recursive(&bin, "?.dll").unwrap()), vec!["a.dll", "c.dll", "d.dll"]);
}

#[test]
fn test_wildcard_run_accumulates_records() {
    let tree = module_tree();
    let bin = tree.path().join("bin");
    let out = tree.path().join("out");
    let processor = shared_processor();

    let mut outcome = RunOutcome::new();
    let succeeded = FileWalker::new(&processor, false, 0).run(&bin.join("*.*"), Some(&out), &mut outcome);

    assert!(succeeded);
    assert_eq!(outcome.files_processed(), 2);
    assert_eq!(
        report_versions(&out.join("all.txt")),
        vec!["A, Version=1.0.0.0", "B, Version=1.0.0.0"]
    );
}

#[test]
fn test_wildcard_without_matches_succeeds() {
    let tree = module_tree();
    let processor = shared_processor();

    let mut outcome = RunOutcome::new();
    let succeeded = FileWalker::new(&processor, false, 0).run(
        &tree.path().join("bin").join("*.sys"),
        Some(tree.path()),
        &mut outcome,
    );

    assert!(succeeded);
    assert_eq!(outcome.files_processed(), 0);
    assert!(!tree.path().join("all.txt").exists());
}

#[test]
fn test_recursive_run_with_level_bound() {
    let tree = module_tree();
    let out = tree.path().join("out");
    let processor = shared_processor();

    let mut outcome = RunOutcome::new();
    let succeeded = FileWalker::new(&processor, true, 2).run(&tree.path().join("bin"), Some(&out), &mut outcome);

    assert!(succeeded);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(report_versions(&out.join("all.txt")).len(), 3);
}

#[test]
fn test_per_module_reports() {
    let tree = module_tree();
    let out = tree.path().join("out");
    let processor = Processor::new(
        ExtractionMode::Managed,
        ReportWriter::new(false, false),
        Arc::new(ProgressReporter::silent()),
    );

    let mut outcome = RunOutcome::new();
    FileWalker::new(&processor, true, 1).run(&tree.path().join("bin"), Some(&out), &mut outcome);

    assert!(out.join("a_VersionInfo.txt").is_file());
    assert!(out.join("b_VersionInfo.txt").is_file());
    assert!(!out.join("c_VersionInfo.txt").exists());
}
