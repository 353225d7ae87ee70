//! Provider declarations lifted from per-file syntactic findings.

use crate::dependency::{Dependency, DependencySource};
use crate::initializer::Initializer;
use crate::property::Property;
use crate::type_description::TypeDescription;
use serde::{Deserialize, Serialize};

/// The kind of declaration that was decorated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclarationKind {
    Class,
    Struct,
    Actor,
    /// An extension fulfilling an external type via a static `instantiate()`
    /// method.
    Extension,
}

/// A type annotated as capable of being constructed by the framework.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instantiable {
    pub concrete_type: TypeDescription,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_root: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<Initializer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_fulfilled_types: Vec<TypeDescription>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    pub declaration_kind: DeclarationKind,
}

impl Instantiable {
    /// The set of types this provider can satisfy: the concrete type plus any
    /// additional fulfilled types.
    pub fn fulfilled_types(&self) -> impl Iterator<Item = &TypeDescription> {
        std::iter::once(&self.concrete_type).chain(self.additional_fulfilled_types.iter())
    }

    /// Properties this provider introduces itself (`@Instantiated` and
    /// aliased receptions), visible to its children.
    pub fn declared_properties(&self) -> impl Iterator<Item = &Property> {
        self.dependencies
            .iter()
            .filter(|dependency| dependency.is_instantiated() || dependency.is_aliased())
            .map(|dependency| &dependency.property)
    }

    /// Properties supplied by the caller of a builder at construction time.
    pub fn forwarded_properties(&self) -> impl Iterator<Item = &Property> {
        self.dependencies
            .iter()
            .filter(|dependency| dependency.is_forwarded())
            .map(|dependency| &dependency.property)
    }

    /// Forwarded properties in the canonical (label-sorted) order used by
    /// builder closures and the `ForwardedProperties` tuple.
    pub fn sorted_forwarded_properties(&self) -> Vec<&Property> {
        let mut properties: Vec<&Property> = self.forwarded_properties().collect();
        properties.sort_by(|left, right| left.label.cmp(&right.label));
        properties
    }

    /// Whether every dependency is constructed locally, making this provider
    /// a possible root.
    pub fn could_be_root(&self) -> bool {
        self.dependencies.iter().all(|dependency| {
            matches!(
                dependency.source,
                DependencySource::Instantiated { .. } | DependencySource::Aliased { .. }
            )
        })
    }
}
