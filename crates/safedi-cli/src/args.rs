use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the safedi binary.
#[derive(Parser, Debug)]
#[command(
    name = "safedi",
    about = "Compile-time safe dependency injection: validate a dependency tree and generate \
             its initializer code"
)]
pub struct SafeDiArgs {
    /// Path to a CSV file containing the paths of the input summary files.
    #[arg(value_name = "sources-file-path")]
    pub sources_file_path: Option<PathBuf>,

    /// A directory or glob to scan for input summary files. May be repeated.
    #[arg(long)]
    pub include: Vec<String>,

    /// Path to a CSV file of directories or globs to scan for input summary
    /// files.
    #[arg(long = "include-file-path")]
    pub include_file_path: Option<PathBuf>,

    /// Output path for the combined summary of the current module.
    #[arg(long = "module-info-output")]
    pub module_info_output: Option<PathBuf>,

    /// Module summary of a dependency module. May be repeated; order is the
    /// dependency order, and the current module is always last.
    #[arg(long = "dependent-module-info-file-path")]
    pub dependent_module_info_file_path: Vec<PathBuf>,

    /// Output path for the generated dependency tree source.
    #[arg(long = "dependency-tree-output")]
    pub dependency_tree_output: Option<PathBuf>,

    /// Output path for a DOT visualization of the dependency tree.
    #[arg(long = "dot-file-output")]
    pub dot_file_output: Option<PathBuf>,

    /// Additional modules to import in the generated source.
    #[arg(long = "additional-imported-modules", value_delimiter = ',')]
    pub additional_imported_modules: Vec<String>,

    /// Path to a CSV file of additional modules to import in the generated
    /// source.
    #[arg(long = "additional-imported-modules-file-path")]
    pub additional_imported_modules_file_path: Option<PathBuf>,

    /// Print the tool version and exit.
    #[arg(long = "show-version")]
    pub show_version: bool,
}
