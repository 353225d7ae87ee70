//! Graph validation.
//!
//! The validator enforces every invariant the generated code relies on and
//! collects maximally informative diagnostics. It never stops at the first
//! violation: the full diagnostic set is gathered, then sorted by the caller
//! into a stable order.

use crate::builder::instantiated_target;
use crate::registry::TypeRegistry;
use crate::scope::{ScopeGraph, ScopeId};
use rustc_hash::{FxHashMap, FxHashSet};
use safedi_common::{
    Dependency, DependencySource, GraphError, LazyKind, Property, Suggestion, TypeDescription,
};
use tracing::debug;

/// Validates the scope graph against the registry. Returns every violation
/// found; an empty vector means the graph is sound and emission may proceed.
pub fn validate(registry: &TypeRegistry, graph: &ScopeGraph) -> Vec<GraphError> {
    let mut validator = Validator {
        registry,
        graph,
        errors: Vec::new(),
        reported: FxHashSet::default(),
        lazy_cycle_properties: FxHashSet::default(),
    };
    validator.check_unresolved_types();
    validator.check_eager_cycles();
    // Lazy cycles run before the reception walk so a cyclic builder reception
    // surfaces as the more specific cycle diagnostic, not as unfulfillable.
    validator.check_lazy_cycles();
    validator.check_reception();
    validator.check_root_constraints();
    validator.check_forwarding_generics();
    debug!(errors = validator.errors.len(), "validated scope graph");
    validator.errors
}

/// A frame of the in-construction stack: the property being instantiated and
/// the concrete type fulfilling it. Receiving either from inside its own
/// construction subtree is an error.
struct ConstructionFrame {
    property: Property,
    fulfilled_type: TypeDescription,
}

struct Validator<'a> {
    registry: &'a TypeRegistry,
    graph: &'a ScopeGraph,
    errors: Vec<GraphError>,
    /// Rendered-message dedup across roots that share subtrees.
    reported: FxHashSet<String>,
    /// Properties already reported as closing a lazy cycle; the reception
    /// walk skips these rather than stacking a second diagnostic on them.
    lazy_cycle_properties: FxHashSet<(ScopeId, Property)>,
}

impl<'a> Validator<'a> {
    fn push_once(&mut self, error: GraphError) {
        if self.reported.insert(error.to_string()) {
            self.errors.push(error);
        }
    }

    fn type_source(&self, scope: ScopeId) -> String {
        self.graph.scope(scope).type_source()
    }

    fn chain(&self, path: &[ScopeId]) -> Vec<String> {
        path.iter().map(|&scope| self.type_source(scope)).collect()
    }

    // ------------------------------------------------------------------
    // Unknown reachable types
    // ------------------------------------------------------------------

    fn check_unresolved_types(&mut self) {
        for type_description in &self.graph.unresolved {
            self.push_once(GraphError::NoInstantiableFound {
                type_source: type_description.as_source(),
            });
        }
    }

    // ------------------------------------------------------------------
    // Eager cycles
    // ------------------------------------------------------------------

    /// Detects cycles over non-lazy `@Instantiated` edges across the whole
    /// reachable graph. This runs independently of the per-root walk: a pure
    /// cycle has no root to be walked from.
    fn check_eager_cycles(&mut self) {
        let mut finished: FxHashSet<ScopeId> = FxHashSet::default();
        for (scope_id, _) in self.graph.scopes() {
            if !finished.contains(&scope_id) {
                let mut stack = Vec::new();
                self.eager_cycle_dfs(scope_id, &mut stack, &mut finished);
            }
        }
    }

    fn eager_cycle_dfs(
        &mut self,
        scope_id: ScopeId,
        stack: &mut Vec<ScopeId>,
        finished: &mut FxHashSet<ScopeId>,
    ) {
        stack.push(scope_id);
        let children = self.graph.scope(scope_id).instantiated_children.clone();
        for child in children {
            if child.lazy.is_some() {
                continue;
            }
            let Some(target) = child.scope else {
                continue;
            };
            if let Some(position) = stack.iter().position(|&id| id == target) {
                let mut path = self.chain(&stack[position..]);
                path.push(self.type_source(target));
                self.push_once(GraphError::DependencyCycle { path });
                continue;
            }
            if !finished.contains(&target) {
                self.eager_cycle_dfs(target, stack, finished);
            }
        }
        stack.pop();
        finished.insert(scope_id);
    }

    // ------------------------------------------------------------------
    // Reception and self-received chains
    // ------------------------------------------------------------------

    fn check_reception(&mut self) {
        for &root in &self.graph.roots.clone() {
            let mut full_path = vec![root];
            let mut construction = Vec::new();
            self.walk(root, &FxHashSet::default(), &mut full_path, &mut construction);
        }
    }

    fn walk(
        &mut self,
        scope_id: ScopeId,
        receivable: &FxHashSet<Property>,
        full_path: &mut Vec<ScopeId>,
        construction: &mut Vec<ConstructionFrame>,
    ) {
        let scope = self.graph.scope(scope_id);
        let dependencies = scope.instantiable.dependencies.clone();
        let declared: Vec<Property> = scope.declared_properties().cloned().collect();

        for dependency in &dependencies {
            match &dependency.source {
                DependencySource::Received { only_if_available } => {
                    self.check_received_property(
                        scope_id,
                        &dependency.property,
                        *only_if_available,
                        receivable,
                        None,
                        full_path,
                        construction,
                    );
                }
                DependencySource::Aliased {
                    fulfilling_property,
                    only_if_available,
                    ..
                } => {
                    self.check_received_property(
                        scope_id,
                        fulfilling_property,
                        *only_if_available,
                        receivable,
                        Some(&declared),
                        full_path,
                        construction,
                    );
                }
                _ => {}
            }
        }

        // Children see everything the chain received plus what this scope
        // declares and forwards.
        let mut child_receivable = receivable.clone();
        child_receivable.extend(declared.iter().cloned());
        child_receivable.extend(scope.forwarded_properties().cloned());

        let children = scope.instantiated_children.clone();
        for child in &children {
            let Some(target) = child.scope else {
                // Unresolved target, reported as NoInstantiableFound.
                continue;
            };
            if full_path.iter().any(|&id| id == target) {
                // A cycle: eager cycles are reported by the eager-cycle
                // checker, lazy cycle legality by the lazy-edge checker.
                continue;
            }

            full_path.push(target);
            if child.lazy.is_none() {
                construction.push(ConstructionFrame {
                    property: child.property.clone(),
                    fulfilled_type: child.target_type.clone(),
                });
                self.walk(target, &child_receivable, full_path, construction);
                construction.pop();
            } else {
                // A lazy builder constructs its subtree at call time: the
                // in-construction stack restarts inside the closure.
                let mut lazy_construction = Vec::new();
                self.walk(target, &child_receivable, full_path, &mut lazy_construction);
            }
            full_path.pop();
        }
    }

    fn check_received_property(
        &mut self,
        scope_id: ScopeId,
        property: &Property,
        only_if_available: bool,
        receivable: &FxHashSet<Property>,
        locally_declared: Option<&[Property]>,
        full_path: &[ScopeId],
        construction: &[ConstructionFrame],
    ) {
        // A builder reception that closes a lazy cycle already carries the
        // more specific cycle diagnostic.
        if self
            .lazy_cycle_properties
            .contains(&(scope_id, property.clone()))
        {
            return;
        }
        // Receiving a type whose own construction we are inside of can never
        // be satisfied, even though the property is nominally receivable.
        if let Some(frame) = construction
            .iter()
            .find(|frame| frame.fulfilled_type == property.type_description)
        {
            self.push_once(GraphError::DependencyReceivedInSameChain {
                property: frame.property.clone(),
                chain: self.chain(full_path),
            });
            return;
        }
        if receivable.contains(property) {
            return;
        }
        if let Some(declared) = locally_declared {
            if declared.contains(property) {
                return;
            }
        }
        if only_if_available {
            return;
        }
        let suggestions = self.build_suggestions(property, receivable);
        self.push_once(GraphError::UnfulfillableProperty {
            property: property.clone(),
            chain: self.chain(full_path),
            suggestions,
        });
    }

    fn build_suggestions(
        &self,
        property: &Property,
        receivable: &FxHashSet<Property>,
    ) -> Vec<Suggestion> {
        // Most specific first: an optional/IUO/existential near-miss beats a
        // generic label or type match, and suppresses it.
        match &property.type_description {
            TypeDescription::Optional { inner } | TypeDescription::ImplicitlyUnwrapped { inner } => {
                let candidate = Property::new(&property.label, (**inner).clone());
                if receivable.contains(&candidate) {
                    return vec![Suggestion::OnlyIfAvailable {
                        available: candidate,
                    }];
                }
            }
            other => {
                let candidate =
                    Property::new(&property.label, TypeDescription::optional(other.clone()));
                if receivable.contains(&candidate) {
                    return vec![Suggestion::OptionalAvailable {
                        available: candidate,
                    }];
                }
            }
        }
        let existential_candidate = match &property.type_description {
            TypeDescription::Any { inner } => Property::new(&property.label, (**inner).clone()),
            other => Property::new(&property.label, TypeDescription::any(other.clone())),
        };
        if receivable.contains(&existential_candidate) {
            return vec![Suggestion::ExistentialMismatch {
                available: existential_candidate,
            }];
        }

        let mut suggestions = Vec::new();
        let mut same_label: Vec<&Property> = self
            .registry
            .properties_with_label(&property.label)
            .iter()
            .filter(|candidate| {
                candidate.type_description != property.type_description
                    && receivable.contains(candidate)
            })
            .collect();
        same_label.sort();
        if let Some(candidate) = same_label.first() {
            suggestions.push(Suggestion::SameLabelDifferentType {
                available: (*candidate).clone(),
            });
        }
        let mut same_type: Vec<&Property> = self
            .registry
            .properties_with_type(&property.type_description)
            .iter()
            .filter(|candidate| candidate.label != property.label && receivable.contains(candidate))
            .collect();
        same_type.sort();
        if let Some(candidate) = same_type.first() {
            suggestions.push(Suggestion::SameTypeDifferentLabel {
                available: (*candidate).clone(),
            });
        }
        suggestions
    }

    // ------------------------------------------------------------------
    // Lazy cycles
    // ------------------------------------------------------------------

    fn check_lazy_cycles(&mut self) {
        // The lazy-edge graph: an edge from every builder-typed dependency to
        // the provider of its target, whatever the dependency's source.
        let mut edges: FxHashMap<ScopeId, Vec<ScopeId>> = FxHashMap::default();
        let mut closing_edges: Vec<(ScopeId, ScopeId, Dependency)> = Vec::new();

        for (scope_id, scope) in self.graph.scopes() {
            for dependency in &scope.instantiable.dependencies {
                let Some((target_scope, _)) = self.lazy_edge_target(dependency) else {
                    continue;
                };
                edges.entry(scope_id).or_default().push(target_scope);
                match &dependency.source {
                    DependencySource::Received { .. } | DependencySource::Aliased { .. } => {
                        closing_edges.push((scope_id, target_scope, dependency.clone()));
                    }
                    _ => {}
                }
            }
        }

        // A lazy cycle is permitted iff the node closing it declares the
        // cycling builder as @Instantiated. Every received/aliased builder
        // whose target can reach its declaring provider closes a cycle
        // illegally.
        for (closing, target, dependency) in closing_edges {
            let Some(path) = lazy_path(target, closing, &edges) else {
                continue;
            };
            let mut rendered = vec![self.type_source(closing)];
            rendered.extend(path.iter().map(|&scope| self.type_source(scope)));
            let property = match &dependency.source {
                DependencySource::Aliased {
                    fulfilling_property,
                    ..
                } => fulfilling_property.clone(),
                _ => dependency.property.clone(),
            };
            self.lazy_cycle_properties
                .insert((closing, property.clone()));
            self.push_once(GraphError::LazyDependencyCycle {
                path: rendered,
                property,
                closing_type: self.type_source(closing),
            });
        }
    }

    /// The scope a builder-typed dependency points at, with the builder kind.
    fn lazy_edge_target(&self, dependency: &Dependency) -> Option<(ScopeId, LazyKind)> {
        let type_description = match &dependency.source {
            DependencySource::Aliased {
                fulfilling_property,
                ..
            } => &fulfilling_property.type_description,
            _ => &dependency.property.type_description,
        };
        let builder = type_description.lazy_builder()?;
        let target = match &dependency.source {
            DependencySource::Instantiated {
                fulfilling_type: Some(fulfilling_type),
                ..
            } => fulfilling_type,
            _ => builder.target,
        };
        let provider = self.registry.lookup(target)?;
        let scope = self
            .graph
            .scope_for_concrete_type(&provider.concrete_type)?;
        Some((scope, builder.kind))
    }

    // ------------------------------------------------------------------
    // Root constraints
    // ------------------------------------------------------------------

    fn check_root_constraints(&mut self) {
        for instantiable in self.registry.instantiables() {
            if !instantiable.is_root {
                continue;
            }
            let instantiated: FxHashSet<&Property> = instantiable
                .dependencies
                .iter()
                .filter(|dependency| dependency.is_instantiated())
                .map(|dependency| &dependency.property)
                .collect();
            let violations: Vec<Dependency> = instantiable
                .dependencies
                .iter()
                .filter(|dependency| match &dependency.source {
                    DependencySource::Instantiated { .. } => false,
                    DependencySource::Aliased {
                        fulfilling_property,
                        ..
                    } => !instantiated.contains(fulfilling_property),
                    DependencySource::Received { .. } | DependencySource::Forwarded => true,
                })
                .cloned()
                .collect();
            if !violations.is_empty() {
                self.push_once(GraphError::CannotBeRoot {
                    type_source: instantiable.concrete_type.as_source(),
                    violations,
                });
            }
        }
    }

    // ------------------------------------------------------------------
    // Forwarded-type check for erased builders
    // ------------------------------------------------------------------

    fn check_forwarding_generics(&mut self) {
        for (_, scope) in self.graph.scopes() {
            for dependency in &scope.instantiable.dependencies {
                if !dependency.is_instantiated() {
                    continue;
                }
                let Some(builder) = dependency.property.type_description.lazy_builder() else {
                    continue;
                };
                if builder.kind != LazyKind::ErasedInstantiator {
                    continue;
                }
                let Some(forwarded_generic) = builder.forwarded else {
                    continue;
                };
                let (target, _) = instantiated_target(dependency);
                let Some(provider) = self.registry.lookup(target) else {
                    continue;
                };
                let forwarded = provider.sorted_forwarded_properties();
                if self.forwarded_generic_matches(forwarded_generic, provider, &forwarded) {
                    continue;
                }
                let expected = match forwarded.len() {
                    0 => format!("ErasedInstantiator<Void, {}>", builder.target.as_source()),
                    _ => format!(
                        "ErasedInstantiator<{}.ForwardedProperties, {}>",
                        provider.concrete_type.as_source(),
                        builder.target.as_source()
                    ),
                };
                self.push_once(GraphError::ForwardingInstantiatorGenericDoesNotMatch {
                    property: dependency.property.clone(),
                    expected,
                });
            }
        }
    }

    fn forwarded_generic_matches(
        &self,
        forwarded_generic: &TypeDescription,
        provider: &safedi_common::Instantiable,
        forwarded: &[&Property],
    ) -> bool {
        match forwarded {
            [] => forwarded_generic.is_void(),
            rest => {
                let forwarded_properties_alias = TypeDescription::nested(
                    "ForwardedProperties",
                    provider.concrete_type.clone(),
                );
                if *forwarded_generic == forwarded_properties_alias {
                    return true;
                }
                if let [sole] = rest {
                    if *forwarded_generic == sole.type_description {
                        return true;
                    }
                }
                let tuple = TypeDescription::Tuple {
                    elements: rest
                        .iter()
                        .map(|property| safedi_common::TupleElement {
                            label: Some(property.label.clone()),
                            type_description: property.type_description.clone(),
                        })
                        .collect(),
                };
                *forwarded_generic == tuple
            }
        }
    }
}

/// Shortest path from `from` to `to` over the lazy-edge graph, as the list of
/// visited scopes including both endpoints.
fn lazy_path(
    from: ScopeId,
    to: ScopeId,
    edges: &FxHashMap<ScopeId, Vec<ScopeId>>,
) -> Option<Vec<ScopeId>> {
    let mut predecessors: FxHashMap<ScopeId, ScopeId> = FxHashMap::default();
    let mut visited: FxHashSet<ScopeId> = FxHashSet::default();
    let mut queue = std::collections::VecDeque::new();
    visited.insert(from);
    queue.push_back(from);
    while let Some(current) = queue.pop_front() {
        if current == to {
            let mut path = vec![to];
            let mut cursor = to;
            while cursor != from {
                cursor = predecessors[&cursor];
                path.push(cursor);
            }
            path.reverse();
            return Some(path);
        }
        for &next in edges.get(&current).map_or(&[][..], Vec::as_slice) {
            if visited.insert(next) {
                predecessors.insert(next, current);
                queue.push_back(next);
            }
        }
    }
    None
}
