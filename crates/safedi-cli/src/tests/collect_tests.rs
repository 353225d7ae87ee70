use crate::args::SafeDiArgs;
use crate::collect::{MISSING_INPUT_MESSAGE, collect_input_files};
use clap::Parser;
use std::path::PathBuf;
use tempfile::TempDir;

fn args_from(arguments: &[&str]) -> SafeDiArgs {
    let mut full = vec!["safedi"];
    full.extend_from_slice(arguments);
    SafeDiArgs::try_parse_from(full).expect("args should parse")
}

#[test]
fn test_missing_input_source_is_a_configuration_error() {
    let error = collect_input_files(&args_from(&[])).expect_err("collection should fail");
    assert_eq!(error.to_string(), MISSING_INPUT_MESSAGE);
}

#[test]
fn test_csv_entries_are_split_on_commas_and_newlines() {
    let directory = TempDir::new().expect("temporary directory should be created");
    let csv_path = directory.path().join("sources.csv");
    std::fs::write(&csv_path, "a.safedi.json,b.safedi.json\nc.safedi.json\n")
        .expect("csv should be written");

    let args = args_from(&[csv_path.to_str().expect("path should be utf-8")]);
    let files = collect_input_files(&args).expect("collection should succeed");
    assert_eq!(
        files,
        [
            PathBuf::from("a.safedi.json"),
            PathBuf::from("b.safedi.json"),
            PathBuf::from("c.safedi.json"),
        ]
    );
}

#[test]
fn test_include_directory_scans_for_summary_files() {
    let directory = TempDir::new().expect("temporary directory should be created");
    let nested = directory.path().join("Feature");
    std::fs::create_dir(&nested).expect("nested directory should be created");
    std::fs::write(nested.join("A.safedi.json"), "{}").expect("file should be written");
    std::fs::write(nested.join("B.safedi.json"), "{}").expect("file should be written");
    std::fs::write(nested.join("README.md"), "docs").expect("file should be written");

    let args = args_from(&[
        "--include",
        directory.path().to_str().expect("path should be utf-8"),
    ]);
    let files = collect_input_files(&args).expect("collection should succeed");
    let names: Vec<String> = files
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["A.safedi.json", "B.safedi.json"]);
}

#[test]
fn test_unreachable_include_directory_is_a_configuration_error() {
    let args = args_from(&["--include", "/nonexistent/safedi-input"]);
    let error = collect_input_files(&args).expect_err("collection should fail");
    assert!(error.to_string().contains("not a reachable directory"));
}

#[test]
fn test_include_file_path_supplies_directories() {
    let directory = TempDir::new().expect("temporary directory should be created");
    let sources = directory.path().join("Sources");
    std::fs::create_dir(&sources).expect("sources directory should be created");
    std::fs::write(sources.join("App.safedi.json"), "{}").expect("file should be written");
    let include_csv = directory.path().join("includes.csv");
    std::fs::write(&include_csv, format!("{}\n", sources.display()))
        .expect("csv should be written");

    let args = args_from(&[
        "--include-file-path",
        include_csv.to_str().expect("path should be utf-8"),
    ]);
    let files = collect_input_files(&args).expect("collection should succeed");
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("App.safedi.json"));
}
