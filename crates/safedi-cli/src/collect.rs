//! Input file collection: the positional CSV list and `--include` globs.

use crate::args::SafeDiArgs;
use globset::GlobBuilder;
use safedi_common::GraphError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The suffix input summary files carry. The syntactic visitor writes one
/// such file per source file it extracts.
pub const SUMMARY_FILE_SUFFIX: &str = ".safedi.json";

pub const MISSING_INPUT_MESSAGE: &str =
    "Must provide 'sources-file-path', '--include', or '--include-file-path'.";

/// Resolves the input summary files from the positional CSV, or from the
/// include directories/globs when no CSV was given.
pub fn collect_input_files(args: &SafeDiArgs) -> Result<Vec<PathBuf>, GraphError> {
    if let Some(csv_path) = &args.sources_file_path {
        let entries = read_csv_file(csv_path)?;
        return Ok(entries.into_iter().map(PathBuf::from).collect());
    }

    let mut includes = args.include.clone();
    if let Some(path) = &args.include_file_path {
        includes.extend(read_csv_file(path)?);
    }
    if includes.is_empty() {
        return Err(GraphError::Configuration(MISSING_INPUT_MESSAGE.to_owned()));
    }

    let mut files = Vec::new();
    for include in &includes {
        files.extend(expand_include(include)?);
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// The additional modules to import, from the flag and/or its file form.
pub fn additional_imported_modules(args: &SafeDiArgs) -> Result<Vec<String>, GraphError> {
    let mut modules = args.additional_imported_modules.clone();
    if let Some(path) = &args.additional_imported_modules_file_path {
        modules.extend(read_csv_file(path)?);
    }
    Ok(modules)
}

fn read_csv_file(path: &Path) -> Result<Vec<String>, GraphError> {
    let text = std::fs::read_to_string(path).map_err(|error| {
        GraphError::Configuration(format!("failed to read {}: {error}", path.display()))
    })?;
    Ok(split_csv(&text))
}

fn split_csv(text: &str) -> Vec<String> {
    text.split([',', '\n', '\r'])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}

fn expand_include(include: &str) -> Result<Vec<PathBuf>, GraphError> {
    if include.contains(['*', '?', '[', '{']) {
        expand_glob(include)
    } else {
        let directory = Path::new(include);
        if !directory.is_dir() {
            return Err(GraphError::Configuration(format!(
                "include path is not a reachable directory: {include}"
            )));
        }
        Ok(summary_files_under(directory, |_| true))
    }
}

fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>, GraphError> {
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(false)
        .build()
        .map_err(|error| {
            GraphError::Configuration(format!("invalid include glob `{pattern}`: {error}"))
        })?
        .compile_matcher();

    // Walk from the longest literal prefix of the pattern.
    let literal_prefix: PathBuf = Path::new(pattern)
        .components()
        .take_while(|component| {
            !component
                .as_os_str()
                .to_string_lossy()
                .contains(['*', '?', '[', '{'])
        })
        .collect();
    let base = if literal_prefix.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        literal_prefix
    };
    if !base.is_dir() {
        return Err(GraphError::Configuration(format!(
            "include path is not a reachable directory: {pattern}"
        )));
    }
    Ok(summary_files_under(&base, |path| matcher.is_match(path)))
}

fn summary_files_under(base: &Path, keep: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    WalkDir::new(base)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().ends_with(SUMMARY_FILE_SUFFIX))
                .unwrap_or(false)
                && keep(path)
        })
        .collect()
}
