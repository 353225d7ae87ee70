//! Root discovery, reachability, and scope construction.

use crate::registry::TypeRegistry;
use crate::scope::{AliasEdge, PropertyToInstantiate, Scope, ScopeGraph, ScopeId};
use rustc_hash::{FxHashMap, FxHashSet};
use safedi_common::{Dependency, DependencySource, Instantiable, LazyKind, TypeDescription};
use tracing::debug;

/// The type an `@Instantiated` dependency actually constructs, and the
/// builder kind when the property is a lazy builder.
pub(crate) fn instantiated_target(dependency: &Dependency) -> (&TypeDescription, Option<LazyKind>) {
    let fulfilling_type = match &dependency.source {
        DependencySource::Instantiated {
            fulfilling_type, ..
        } => fulfilling_type.as_ref(),
        _ => None,
    };
    match dependency.property.type_description.lazy_builder() {
        Some(builder) => (fulfilling_type.unwrap_or(builder.target), Some(builder.kind)),
        None => (fulfilling_type.unwrap_or(&dependency.property.type_description), None),
    }
}

/// Builds the scope graph: discovers reachable providers from every possible
/// root, decides which of those are true roots, and materializes one scope
/// per reachable provider.
pub fn build(registry: &TypeRegistry) -> ScopeGraph {
    let mut possible_roots: Vec<&Instantiable> = registry
        .instantiables()
        .iter()
        .filter(|instantiable| instantiable.could_be_root())
        .collect();
    possible_roots.sort_by_key(|instantiable| instantiable.concrete_type.as_source());

    // Reachability over `@Instantiated` edges, lazy builder targets included.
    let mut discovered: Vec<&Instantiable> = Vec::new();
    let mut visited: FxHashSet<String> = FxHashSet::default();
    let mut unresolved: Vec<TypeDescription> = Vec::new();
    let mut unresolved_seen: FxHashSet<String> = FxHashSet::default();
    let mut child_types: FxHashSet<String> = FxHashSet::default();

    for &root in &possible_roots {
        if !visited.insert(root.concrete_type.as_source()) {
            continue;
        }
        discovered.push(root);
        let mut stack: Vec<&Instantiable> = vec![root];
        while let Some(current) = stack.pop() {
            for dependency in current
                .dependencies
                .iter()
                .filter(|dependency| dependency.is_instantiated())
            {
                let (target, _) = instantiated_target(dependency);
                match registry.lookup(target) {
                    Some(provider) => {
                        let provider_key = provider.concrete_type.as_source();
                        child_types.insert(provider_key.clone());
                        if visited.insert(provider_key) {
                            discovered.push(provider);
                            stack.push(provider);
                        }
                    }
                    None => {
                        if unresolved_seen.insert(target.as_source()) {
                            unresolved.push(target.clone());
                        }
                    }
                }
            }
        }
    }

    // Materialize one scope per reachable provider.
    let mut by_concrete_type: FxHashMap<String, ScopeId> = FxHashMap::default();
    for (index, instantiable) in discovered.iter().enumerate() {
        by_concrete_type.insert(
            instantiable.concrete_type.as_source(),
            ScopeId(index as u32),
        );
    }

    let scopes: Vec<Scope> = discovered
        .iter()
        .map(|instantiable| materialize(instantiable, registry, &by_concrete_type))
        .collect();

    let roots: Vec<ScopeId> = possible_roots
        .iter()
        .filter(|instantiable| !child_types.contains(&instantiable.concrete_type.as_source()))
        .map(|instantiable| by_concrete_type[&instantiable.concrete_type.as_source()])
        .collect();

    debug!(
        scopes = scopes.len(),
        roots = roots.len(),
        unresolved = unresolved.len(),
        "built scope graph"
    );
    ScopeGraph::new(scopes, by_concrete_type, roots, unresolved)
}

fn materialize(
    instantiable: &Instantiable,
    registry: &TypeRegistry,
    by_concrete_type: &FxHashMap<String, ScopeId>,
) -> Scope {
    let mut instantiated_children = Vec::new();
    let mut alias_edges = Vec::new();

    for dependency in &instantiable.dependencies {
        match &dependency.source {
            DependencySource::Instantiated {
                erased_to_concrete_existential,
                ..
            } => {
                let (target, lazy) = instantiated_target(dependency);
                let scope = registry
                    .lookup(target)
                    .and_then(|provider| by_concrete_type.get(&provider.concrete_type.as_source()))
                    .copied();
                instantiated_children.push(PropertyToInstantiate {
                    property: dependency.property.clone(),
                    lazy,
                    erased_to_concrete_existential: *erased_to_concrete_existential,
                    target_type: target.clone(),
                    scope,
                });
            }
            DependencySource::Aliased {
                fulfilling_property,
                erased_to_concrete_existential,
                only_if_available,
            } => {
                alias_edges.push(AliasEdge {
                    property: dependency.property.clone(),
                    fulfilling_property: fulfilling_property.clone(),
                    erased_to_concrete_existential: *erased_to_concrete_existential,
                    only_if_available: *only_if_available,
                });
            }
            DependencySource::Received { .. } | DependencySource::Forwarded => {}
        }
    }

    Scope {
        instantiable: (*instantiable).clone(),
        instantiated_children,
        alias_edges,
    }
}
