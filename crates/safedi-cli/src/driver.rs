//! The compilation driver: read summaries, analyze, emit.

use crate::args::SafeDiArgs;
use crate::{collect, reporter};
use anyhow::Context;
use rayon::prelude::*;
use safedi_common::{GraphError, GraphErrors, ImportStatement, ModuleSummary};
use std::path::PathBuf;
use tracing::{debug, info};

/// Runs the driver end to end and returns the process exit code. Diagnostics
/// are reported and yield a non-zero code without writing any output file;
/// I/O failures propagate as fatal errors.
pub fn run(args: &SafeDiArgs) -> anyhow::Result<i32> {
    if args.show_version {
        reporter::print_version();
        return Ok(0);
    }

    let input_files = match collect::collect_input_files(args) {
        Ok(files) => files,
        Err(error) => {
            reporter::report(&[error]);
            return Ok(1);
        }
    };
    info!(inputs = input_files.len(), "collected input summary files");

    // Dependent module summaries come first, in argument order; the current
    // module is always last so its declarations are authoritative.
    let mut summaries: Vec<ModuleSummary> = Vec::new();
    for path in &args.dependent_module_info_file_path {
        summaries.push(safedi_store::read(path)?);
    }

    let mut parts: Vec<(PathBuf, ModuleSummary)> = input_files
        .par_iter()
        .map(|path| safedi_store::read(path).map(|summary| (path.clone(), summary)))
        .collect::<Result<_, _>>()?;
    parts.sort_by(|left, right| left.0.cmp(&right.0));

    let mut current = ModuleSummary::default();
    for (_, part) in parts {
        current.merge(part);
    }
    let additional_modules = match collect::additional_imported_modules(args) {
        Ok(modules) => modules,
        Err(error) => {
            reporter::report(&[error]);
            return Ok(1);
        }
    };
    for module in additional_modules {
        current.imports.push(ImportStatement::wholesale(module));
    }

    if let Some(path) = &args.module_info_output {
        safedi_store::write(&current, path)?;
        debug!(path = %path.display(), "wrote module info");
    }
    summaries.push(current);

    let mut errors: Vec<GraphError> = Vec::new();
    let mut nested: Vec<String> = summaries
        .iter()
        .flat_map(|summary| summary.nested_instantiables.iter())
        .map(safedi_common::TypeDescription::as_source)
        .collect();
    if !nested.is_empty() {
        nested.sort();
        nested.dedup();
        errors.push(GraphError::NestedInstantiablesFound { types: nested });
    }

    match safedi_graph::analyze(&summaries) {
        Ok((_, graph)) if errors.is_empty() => {
            let imports: Vec<ImportStatement> = summaries
                .iter()
                .flat_map(|summary| summary.imports.iter().cloned())
                .collect();
            if let Some(path) = &args.dependency_tree_output {
                let generated = safedi_emitter::emit_dependency_tree(&graph, &imports);
                std::fs::write(path, generated)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), "wrote dependency tree");
            }
            if let Some(path) = &args.dot_file_output {
                std::fs::write(path, safedi_emitter::emit_dot(&graph))
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), "wrote dot file");
            }
            Ok(0)
        }
        Ok(_) => {
            reporter::report(GraphErrors::new(errors).errors());
            Ok(1)
        }
        Err(graph_errors) => {
            errors.extend(graph_errors.errors().iter().cloned());
            reporter::report(GraphErrors::new(errors).errors());
            Ok(1)
        }
    }
}
