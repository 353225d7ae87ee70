use crate::args::SafeDiArgs;
use crate::driver::run;
use clap::Parser;
use safedi_common::{
    DeclarationKind, Dependency, Instantiable, ModuleSummary, Property, TypeDescription,
};
use std::path::Path;
use tempfile::TempDir;

fn provider(name: &str, dependencies: Vec<Dependency>) -> Instantiable {
    Instantiable {
        concrete_type: TypeDescription::simple(name),
        is_root: false,
        initializer: None,
        additional_fulfilled_types: Vec::new(),
        dependencies,
        declaration_kind: DeclarationKind::Class,
    }
}

fn write_summary(path: &Path, instantiables: Vec<Instantiable>) {
    let summary = ModuleSummary::new(instantiables, Vec::new());
    safedi_store::write(&summary, path).expect("summary should be written");
}

fn run_with(arguments: &[&str]) -> i32 {
    let mut full = vec!["safedi"];
    full.extend_from_slice(arguments);
    let args = SafeDiArgs::try_parse_from(full).expect("args should parse");
    run(&args).expect("driver should not fail fatally")
}

#[test]
fn test_valid_tree_generates_source_and_exits_zero() {
    let directory = TempDir::new().expect("temporary directory should be created");
    let input = directory.path().join("App.safedi.json");
    write_summary(
        &input,
        vec![
            provider(
                "Root",
                vec![Dependency::instantiated(Property::new(
                    "networkService",
                    TypeDescription::simple("NetworkService"),
                ))],
            ),
            provider("NetworkService", vec![]),
        ],
    );
    let csv = directory.path().join("sources.csv");
    std::fs::write(&csv, format!("{}\n", input.display())).expect("csv should be written");
    let output = directory.path().join("SafeDI.swift");

    let code = run_with(&[
        csv.to_str().unwrap(),
        "--dependency-tree-output",
        output.to_str().unwrap(),
    ]);
    assert_eq!(code, 0);

    let generated = std::fs::read_to_string(&output).expect("generated file should exist");
    assert!(generated.starts_with("// This file was generated by the SafeDI dependency injection tool."));
    assert!(generated.contains("extension Root {"));
    assert!(generated.contains("let networkService = NetworkService()"));
}

#[test]
fn test_diagnostics_exit_nonzero_and_write_no_output() {
    let directory = TempDir::new().expect("temporary directory should be created");
    let input = directory.path().join("App.safedi.json");
    // NetworkService has no provider anywhere.
    write_summary(
        &input,
        vec![provider(
            "Root",
            vec![Dependency::instantiated(Property::new(
                "networkService",
                TypeDescription::simple("NetworkService"),
            ))],
        )],
    );
    let csv = directory.path().join("sources.csv");
    std::fs::write(&csv, format!("{}\n", input.display())).expect("csv should be written");
    let output = directory.path().join("SafeDI.swift");
    let dot_output = directory.path().join("SafeDI.dot");

    let code = run_with(&[
        csv.to_str().unwrap(),
        "--dependency-tree-output",
        output.to_str().unwrap(),
        "--dot-file-output",
        dot_output.to_str().unwrap(),
    ]);
    assert_eq!(code, 1);
    assert!(!output.exists(), "no output may be written on diagnostics");
    assert!(!dot_output.exists(), "no dot file may be written on diagnostics");
}

#[test]
fn test_dependent_module_summaries_fulfill_current_module_receptions() {
    let directory = TempDir::new().expect("temporary directory should be created");
    let dependency_summary = directory.path().join("Networking.safedi.json");
    safedi_store::write(
        &ModuleSummary::new(vec![provider("NetworkService", vec![])], Vec::new()),
        &dependency_summary,
    )
    .expect("dependency summary should be written");

    let input = directory.path().join("App.safedi.json");
    write_summary(
        &input,
        vec![provider(
            "Root",
            vec![Dependency::instantiated(Property::new(
                "networkService",
                TypeDescription::simple("NetworkService"),
            ))],
        )],
    );
    let csv = directory.path().join("sources.csv");
    std::fs::write(&csv, format!("{}\n", input.display())).expect("csv should be written");
    let output = directory.path().join("SafeDI.swift");

    let code = run_with(&[
        csv.to_str().unwrap(),
        "--dependent-module-info-file-path",
        dependency_summary.to_str().unwrap(),
        "--dependency-tree-output",
        output.to_str().unwrap(),
    ]);
    assert_eq!(code, 0);
    assert!(output.exists());
}

#[test]
fn test_module_info_output_merges_input_files_deterministically() {
    let directory = TempDir::new().expect("temporary directory should be created");
    let first = directory.path().join("A.safedi.json");
    let second = directory.path().join("B.safedi.json");
    write_summary(&first, vec![provider("Alpha", vec![])]);
    write_summary(&second, vec![provider("Beta", vec![])]);
    let csv = directory.path().join("sources.csv");
    // Listed out of order; the merge sorts by path.
    std::fs::write(&csv, format!("{},{}\n", second.display(), first.display()))
        .expect("csv should be written");
    let module_info = directory.path().join("Module.safedi.json");

    let code = run_with(&[
        csv.to_str().unwrap(),
        "--module-info-output",
        module_info.to_str().unwrap(),
    ]);
    assert_eq!(code, 0);

    let merged = safedi_store::read(&module_info).expect("module info should be readable");
    let names: Vec<String> = merged
        .instantiables
        .iter()
        .map(|instantiable| instantiable.concrete_type.as_source())
        .collect();
    assert_eq!(names, ["Alpha", "Beta"]);
}

#[test]
fn test_nested_instantiables_surface_as_a_diagnostic() {
    let directory = TempDir::new().expect("temporary directory should be created");
    let input = directory.path().join("App.safedi.json");
    let mut summary = ModuleSummary::new(vec![provider("Root", vec![])], Vec::new());
    summary
        .nested_instantiables
        .push(TypeDescription::simple("InnerService"));
    safedi_store::write(&summary, &input).expect("summary should be written");
    let csv = directory.path().join("sources.csv");
    std::fs::write(&csv, format!("{}\n", input.display())).expect("csv should be written");
    let output = directory.path().join("SafeDI.swift");

    let code = run_with(&[
        csv.to_str().unwrap(),
        "--dependency-tree-output",
        output.to_str().unwrap(),
    ]);
    assert_eq!(code, 1);
    assert!(!output.exists());
}

#[test]
fn test_additional_imported_modules_reach_the_generated_source() {
    let directory = TempDir::new().expect("temporary directory should be created");
    let input = directory.path().join("App.safedi.json");
    write_summary(&input, vec![provider("Root", vec![])]);
    let csv = directory.path().join("sources.csv");
    std::fs::write(&csv, format!("{}\n", input.display())).expect("csv should be written");
    let output = directory.path().join("SafeDI.swift");

    let code = run_with(&[
        csv.to_str().unwrap(),
        "--additional-imported-modules",
        "UIKit,Foundation",
        "--dependency-tree-output",
        output.to_str().unwrap(),
    ]);
    assert_eq!(code, 0);
    let generated = std::fs::read_to_string(&output).expect("generated file should exist");
    assert!(generated.contains("#if canImport(Foundation)\nimport Foundation\n#endif"));
    assert!(generated.contains("#if canImport(UIKit)\nimport UIKit\n#endif"));
}

#[test]
fn test_show_version_short_circuits() {
    let code = run_with(&["--show-version"]);
    assert_eq!(code, 0);
}
