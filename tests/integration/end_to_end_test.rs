use std::fs;
use std::path::Path;
use tempfile::tempdir;
use verprobe::{cli::run, ErrorCode, ExtractionMode, Settings};

use crate::pe_builder::PeBuilder;

fn settings(input: &Path, report: &Path) -> Settings {
    Settings {
        input_path: input.to_path_buf(),
        report_file: Some(report.to_path_buf()),
        quiet: true,
        use_colors: false,
        show_progress: false,
        ..Default::default()
    }
}

fn blocks(report: &Path) -> Vec<String> {
    fs::read_to_string(report)
        .unwrap()
        .split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn managed_module(path: &Path, name: &str, version: [u16; 4]) {
    PeBuilder::new().with_assembly(name, version).write_to(path).unwrap();
}

#[test]
fn test_managed_assembly_version() {
    let dir = tempdir().unwrap();
    let dll = dir.path().join("foo.dll");
    managed_module(&dll, "Foo", [1, 2, 3, 4]);
    let report = dir.path().join("foo.txt");

    let outcome = run(&settings(&dll, &report));

    assert_eq!(outcome.error_code(), ErrorCode::NoError);
    assert_eq!(outcome.exit_code(), 0);
    let content = fs::read_to_string(&report).unwrap();
    assert!(content.starts_with("FileName=foo.dll\n"));
    assert!(content.contains("Version=Foo, Version=1.2.3.4\n"));
    assert!(!content.contains("Error="));
}

#[test]
fn test_missing_module() {
    let dir = tempdir().unwrap();
    let dll = dir.path().join("bar.dll");
    let report = dir.path().join("bar.txt");

    let outcome = run(&settings(&dll, &report));

    assert_eq!(outcome.exit_code(), -1);
    assert_eq!(
        fs::read_to_string(&report).unwrap(),
        format!(
            "FileName=bar.dll\nPath={path}\nVersion=\nError=Error: File not found: {path}\n",
            path = dll.display()
        )
    );
}

#[test]
fn test_native_module_without_version_fields() {
    let dir = tempdir().unwrap();
    let dll = dir.path().join("native.dll");
    PeBuilder::new()
        .with_version_string("FileDescription", "Native Helper")
        .write_to(&dll)
        .unwrap();
    let report = dir.path().join("native.txt");

    let mut native = settings(&dll, &report);
    native.mode = ExtractionMode::Native;
    let outcome = run(&native);

    assert_eq!(outcome.exit_code(), 0);
    assert!(fs::read_to_string(&report)
        .unwrap()
        .contains("Version=Native Helper, Version=??\n"));
}

#[test]
fn test_native_mode_on_plain_file() {
    let dir = tempdir().unwrap();
    let dll = dir.path().join("plain.dll");
    fs::write(&dll, b"not a portable executable").unwrap();
    let report = dir.path().join("plain.txt");

    let mut native = settings(&dll, &report);
    native.mode = ExtractionMode::Native;
    let outcome = run(&native);

    assert_eq!(outcome.exit_code(), 0);
    assert!(fs::read_to_string(&report)
        .unwrap()
        .contains("Version=plain.dll, Version=??\n"));
}

#[test]
fn test_recursive_run_shares_report() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("bin");
    fs::create_dir_all(bin.join("sub")).unwrap();
    managed_module(&bin.join("a.dll"), "Alpha", [1, 0, 0, 0]);
    managed_module(&bin.join("b.exe"), "Beta", [2, 0, 0, 0]);
    managed_module(&bin.join("sub").join("c.dll"), "Gamma", [3, 0, 0, 0]);
    fs::write(bin.join("readme.txt"), "ignored").unwrap();
    let report = dir.path().join("all.txt");

    let mut recursive = settings(&bin, &report);
    recursive.recurse = true;
    let outcome = run(&recursive);

    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(outcome.files_processed(), 3);

    let blocks = blocks(&report);
    assert_eq!(blocks.len(), 3);
    assert!(blocks[0].contains("Version=Alpha, Version=1.0.0.0"));
    assert!(blocks[1].contains("Version=Beta, Version=2.0.0.0"));
    assert!(blocks[2].contains("Version=Gamma, Version=3.0.0.0"));
    assert!(fs::read_to_string(&report).unwrap().ends_with("\n\n"));
}

#[test]
fn test_rerun_replaces_shared_report() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("bin");
    fs::create_dir(&bin).unwrap();
    managed_module(&bin.join("a.dll"), "Alpha", [1, 0, 0, 0]);
    let report = dir.path().join("all.txt");

    let mut recursive = settings(&bin, &report);
    recursive.recurse = true;
    run(&recursive);
    run(&recursive);

    assert_eq!(blocks(&report).len(), 1);
}

#[test]
fn test_failure_is_sticky_across_files() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("bin");
    fs::create_dir(&bin).unwrap();
    fs::write(bin.join("a.dll"), b"garbage").unwrap();
    managed_module(&bin.join("b.dll"), "Beta", [2, 1, 0, 0]);
    let report = dir.path().join("all.txt");

    let mut recursive = settings(&bin, &report);
    recursive.recurse = true;
    let outcome = run(&recursive);

    assert_eq!(outcome.error_code(), ErrorCode::UnspecifiedError);
    assert_eq!(outcome.files_processed(), 2);
    assert_eq!(outcome.files_failed(), 1);

    let blocks = blocks(&report);
    assert_eq!(blocks.len(), 2);
    assert!(blocks[0].contains("Error=Exception determining Assembly info for a.dll"));
    assert!(blocks[1].contains("Version=Beta, Version=2.1.0.0"));
}

#[test]
fn test_missing_settings_file() {
    let dir = tempdir().unwrap();
    let dll = dir.path().join("foo.dll");
    managed_module(&dll, "Foo", [1, 0, 0, 0]);
    let report = dir.path().join("foo.txt");

    let mut with_settings = settings(&dll, &report);
    with_settings.settings_file = Some(dir.path().join("verprobe_missing_settings.toml"));
    let outcome = run(&with_settings);

    assert_eq!(outcome.exit_code(), 4);
    assert!(!report.exists());
}

#[test]
fn test_invalid_settings_file() {
    let dir = tempdir().unwrap();
    let dll = dir.path().join("foo.dll");
    managed_module(&dll, "Foo", [1, 0, 0, 0]);
    let report = dir.path().join("foo.txt");
    let toml = dir.path().join("probe.toml");
    fs::write(&toml, "[OtherOptions]\nGenericDLL = true\n").unwrap();

    let mut with_settings = settings(&dll, &report);
    with_settings.settings_file = Some(toml);
    let outcome = run(&with_settings);

    assert_eq!(outcome.exit_code(), 8);
}

#[test]
fn test_missing_recursion_root() {
    let dir = tempdir().unwrap();
    let report = dir.path().join("all.txt");

    let mut recursive = settings(&dir.path().join("nowhere").join("*.dll"), &report);
    recursive.recurse = true;
    let outcome = run(&recursive);

    assert_eq!(outcome.exit_code(), 1);
    assert!(!report.exists());
}

#[test]
fn test_relative_inputs_are_resolved() {
    let dir = tempfile::Builder::new().prefix("verprobe-e2e").tempdir_in(".").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    managed_module(&dir.path().join("foo.dll"), "Foo", [1, 0, 0, 0]);
    let name = dir.path().file_name().unwrap();
    let relative = Path::new(name);
    let root = std::env::current_dir().unwrap().join(name);

    let report = root.join("foo.txt");
    let outcome = run(&settings(&relative.join("sub").join("..").join("foo.dll"), &report));
    assert_eq!(outcome.exit_code(), 0);
    assert!(fs::read_to_string(&report)
        .unwrap()
        .contains(&format!("\nPath={}\n", root.join("foo.dll").display())));

    let report = root.join("bar.txt");
    let outcome = run(&settings(&relative.join("bar.dll"), &report));
    assert_eq!(outcome.exit_code(), -1);
    assert!(fs::read_to_string(&report).unwrap().contains(&format!(
        "Error=Error: File not found: {}\n",
        root.join("bar.dll").display()
    )));
}
