//! Per-provider scopes and the graph that owns them.
//!
//! Scopes are stored in an arena indexed by `ScopeId`; edges hold ids, never
//! back-references, so the graph stays a plain DAG rooted at each root and
//! traversals carry their path as an explicit stack.

use rustc_hash::FxHashMap;
use safedi_common::{Instantiable, LazyKind, Property, TypeDescription};

/// Index of a scope within its `ScopeGraph`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(pub(crate) u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An `@Instantiated` dependency edge: the property to construct and the
/// scope of the provider that fulfills it.
#[derive(Clone, Debug)]
pub struct PropertyToInstantiate {
    pub property: Property,
    /// Builder kind when the property is a lazy builder type.
    pub lazy: Option<LazyKind>,
    pub erased_to_concrete_existential: bool,
    /// The concrete type being constructed (the builder's target for lazy
    /// properties).
    pub target_type: TypeDescription,
    /// `None` when the registry cannot resolve the target; the validator
    /// reports those as `NoInstantiableFound`.
    pub scope: Option<ScopeId>,
}

/// An aliased reception: a renamed/retyped rebinding of an upstream property.
#[derive(Clone, Debug)]
pub struct AliasEdge {
    pub property: Property,
    pub fulfilling_property: Property,
    pub erased_to_concrete_existential: bool,
    pub only_if_available: bool,
}

/// The per-provider node in the analyzer's tree.
#[derive(Clone, Debug)]
pub struct Scope {
    pub instantiable: Instantiable,
    pub instantiated_children: Vec<PropertyToInstantiate>,
    pub alias_edges: Vec<AliasEdge>,
}

impl Scope {
    /// Properties this scope introduces itself, visible to its children.
    pub fn declared_properties(&self) -> impl Iterator<Item = &Property> {
        self.instantiable.declared_properties()
    }

    /// Properties supplied by the caller when this scope is built lazily.
    pub fn forwarded_properties(&self) -> impl Iterator<Item = &Property> {
        self.instantiable.forwarded_properties()
    }

    /// Properties this scope must receive from an ancestor.
    pub fn received_properties(&self) -> impl Iterator<Item = &Property> {
        self.instantiable
            .dependencies
            .iter()
            .filter(|dependency| dependency.is_received())
            .map(|dependency| &dependency.property)
    }

    pub fn type_source(&self) -> String {
        self.instantiable.concrete_type.as_source()
    }
}

/// All scopes reachable from any root, plus the roots themselves.
pub struct ScopeGraph {
    scopes: Vec<Scope>,
    by_concrete_type: FxHashMap<String, ScopeId>,
    /// Root scopes, sorted by the canonical source form of their type.
    pub roots: Vec<ScopeId>,
    /// Reachable `@Instantiated` target types with no registered provider,
    /// in discovery order, deduplicated.
    pub unresolved: Vec<TypeDescription>,
}

impl ScopeGraph {
    pub(crate) fn new(
        scopes: Vec<Scope>,
        by_concrete_type: FxHashMap<String, ScopeId>,
        roots: Vec<ScopeId>,
        unresolved: Vec<TypeDescription>,
    ) -> Self {
        ScopeGraph {
            scopes,
            by_concrete_type,
            roots,
            unresolved,
        }
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn scopes(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes
            .iter()
            .enumerate()
            .map(|(index, scope)| (ScopeId(index as u32), scope))
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// The scope of the provider whose concrete type matches, if reachable.
    pub fn scope_for_concrete_type(&self, type_description: &TypeDescription) -> Option<ScopeId> {
        self.by_concrete_type
            .get(&type_description.as_source())
            .copied()
    }
}
