//! DOT graph export for dependency tree visualization.

use safedi_common::DependencySource;
use safedi_graph::{ScopeGraph, ScopeId};

/// Renders the scope graph in DOT form: one edge per instantiated, aliased,
/// or forwarded relation, labeled with the child property's `label: type`
/// form. Root blocks are separated by a blank line.
pub fn emit_dot(graph: &ScopeGraph) -> String {
    let mut output = String::from("graph SafeDI {\n\tranksep=2\n");
    for (index, &root) in graph.roots.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }
        let root_node = graph.scope(root).type_source();
        let mut path = vec![root];
        render_edges(graph, root, &root_node, &mut output, &mut path);
    }
    output.push_str("}\n");
    output
}

fn render_edges(
    graph: &ScopeGraph,
    scope_id: ScopeId,
    parent_node: &str,
    output: &mut String,
    path: &mut Vec<ScopeId>,
) {
    let scope = graph.scope(scope_id);
    let mut children = scope.instantiated_children.iter();
    for dependency in &scope.instantiable.dependencies {
        match &dependency.source {
            DependencySource::Instantiated { .. } => {
                let child = children
                    .next()
                    .expect("instantiated dependencies and child edges stay in lockstep");
                let node = child.property.as_source();
                push_edge(output, parent_node, &node);
                if let Some(target) = child.scope {
                    if !path.contains(&target) {
                        path.push(target);
                        render_edges(graph, target, &node, output, path);
                        path.pop();
                    }
                }
            }
            DependencySource::Forwarded => {
                push_edge(output, parent_node, &dependency.property.as_source());
            }
            DependencySource::Aliased {
                fulfilling_property,
                ..
            } => {
                let node = format!(
                    "{} <- {}",
                    dependency.property.as_source(),
                    fulfilling_property.as_source()
                );
                push_edge(output, parent_node, &node);
            }
            DependencySource::Received { .. } => {}
        }
    }
}

fn push_edge(output: &mut String, from: &str, to: &str) {
    output.push_str(&format!("\t\"{from}\" -- \"{to}\"\n"));
}
