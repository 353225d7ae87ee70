//! Structural descriptions of Swift types as they appeared in source.
//!
//! `TypeDescription` is a tagged union with structural equality and a
//! canonical `as_source()` projection. Equality, hashing, and ordering all
//! derive from the canonical rendering, which gives two normalizations for
//! free: composition members compare as a set (they render sorted), and the
//! void spellings `()`, `(Void)`, and `Void` compare as identical.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// One element of a tuple type, optionally labeled.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TupleElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub type_description: TypeDescription,
}

/// A structural description of a named Swift type.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "case", rename_all = "camelCase")]
pub enum TypeDescription {
    /// A plain named type, e.g. `NetworkService` or `Instantiator<Foo>`.
    Simple {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        generics: Vec<TypeDescription>,
    },
    /// A type nested inside another, e.g. `Foo.Bar`.
    Nested {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        generics: Vec<TypeDescription>,
        parent: Box<TypeDescription>,
    },
    /// A protocol composition, e.g. `Foo & Bar`. Member order is not
    /// significant.
    Composition { members: Vec<TypeDescription> },
    /// `Inner?`
    Optional { inner: Box<TypeDescription> },
    /// `Inner!`
    ImplicitlyUnwrapped { inner: Box<TypeDescription> },
    /// `some Inner`
    Some { inner: Box<TypeDescription> },
    /// `any Inner`
    Any { inner: Box<TypeDescription> },
    /// `Inner.Type`
    Metatype { inner: Box<TypeDescription> },
    /// A type wrapped in specifiers and attributes, e.g.
    /// `inout @escaping () -> Void`.
    Attributed {
        inner: Box<TypeDescription>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        specifiers: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<String>,
    },
    /// `[Element]`
    Array { element: Box<TypeDescription> },
    /// `[Key: Value]`
    Dictionary {
        key: Box<TypeDescription>,
        value: Box<TypeDescription>,
    },
    /// `(label: A, B)`
    Tuple { elements: Vec<TupleElement> },
    /// `(A, B) async throws -> R`
    Closure {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        arguments: Vec<TypeDescription>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_async: bool,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        does_throw: bool,
        return_type: Box<TypeDescription>,
    },
    /// `Void`
    Void,
    /// Source text the visitor could not classify.
    Unknown { text: String },
}

/// The lazy builder types recognized by the analyzer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LazyKind {
    Instantiator,
    SendableInstantiator,
    ErasedInstantiator,
}

impl LazyKind {
    pub const fn name(self) -> &'static str {
        match self {
            LazyKind::Instantiator => "Instantiator",
            LazyKind::SendableInstantiator => "SendableInstantiator",
            LazyKind::ErasedInstantiator => "ErasedInstantiator",
        }
    }
}

/// A structurally recognized builder type: `Instantiator<T>`,
/// `SendableInstantiator<T>`, or `ErasedInstantiator<F, T>`.
#[derive(Clone, Copy, Debug)]
pub struct LazyBuilder<'a> {
    pub kind: LazyKind,
    /// The forwarded-argument generic `F` of an `ErasedInstantiator`.
    pub forwarded: Option<&'a TypeDescription>,
    /// The built type `T`.
    pub target: &'a TypeDescription,
}

impl TypeDescription {
    pub fn simple(name: impl Into<String>) -> Self {
        TypeDescription::Simple {
            name: name.into(),
            generics: Vec::new(),
        }
    }

    pub fn simple_with_generics(name: impl Into<String>, generics: Vec<TypeDescription>) -> Self {
        TypeDescription::Simple {
            name: name.into(),
            generics,
        }
    }

    pub fn nested(name: impl Into<String>, parent: TypeDescription) -> Self {
        TypeDescription::Nested {
            name: name.into(),
            generics: Vec::new(),
            parent: Box::new(parent),
        }
    }

    pub fn optional(inner: TypeDescription) -> Self {
        TypeDescription::Optional {
            inner: Box::new(inner),
        }
    }

    pub fn implicitly_unwrapped(inner: TypeDescription) -> Self {
        TypeDescription::ImplicitlyUnwrapped {
            inner: Box::new(inner),
        }
    }

    pub fn any(inner: TypeDescription) -> Self {
        TypeDescription::Any {
            inner: Box::new(inner),
        }
    }

    pub fn composition(members: Vec<TypeDescription>) -> Self {
        TypeDescription::Composition { members }
    }

    pub fn tuple(elements: Vec<(Option<&str>, TypeDescription)>) -> Self {
        TypeDescription::Tuple {
            elements: elements
                .into_iter()
                .map(|(label, type_description)| TupleElement {
                    label: label.map(str::to_owned),
                    type_description,
                })
                .collect(),
        }
    }

    /// The canonical textual form used in diagnostics and generated output.
    ///
    /// Compositions render with members sorted; the void spellings all render
    /// as `Void`; a single-element unlabeled tuple renders as its element.
    pub fn as_source(&self) -> String {
        match self {
            TypeDescription::Simple { name, generics } => render_named(name, generics),
            TypeDescription::Nested {
                name,
                generics,
                parent,
            } => format!("{}.{}", parent.as_source(), render_named(name, generics)),
            TypeDescription::Composition { members } => {
                let mut rendered: Vec<String> =
                    members.iter().map(TypeDescription::as_source).collect();
                rendered.sort();
                rendered.dedup();
                rendered.join(" & ")
            }
            TypeDescription::Optional { inner } => {
                format!("{}?", parenthesized_if_compound(inner))
            }
            TypeDescription::ImplicitlyUnwrapped { inner } => {
                format!("{}!", parenthesized_if_compound(inner))
            }
            TypeDescription::Some { inner } => format!("some {}", inner.as_source()),
            TypeDescription::Any { inner } => format!("any {}", inner.as_source()),
            TypeDescription::Metatype { inner } => {
                format!("{}.Type", parenthesized_if_compound(inner))
            }
            TypeDescription::Attributed {
                inner,
                specifiers,
                attributes,
            } => {
                let mut parts: Vec<String> = specifiers.clone();
                parts.extend(attributes.iter().map(|attribute| format!("@{attribute}")));
                parts.push(inner.as_source());
                parts.join(" ")
            }
            TypeDescription::Array { element } => format!("[{}]", element.as_source()),
            TypeDescription::Dictionary { key, value } => {
                format!("[{}: {}]", key.as_source(), value.as_source())
            }
            TypeDescription::Tuple { elements } => match elements.as_slice() {
                [] => "Void".to_owned(),
                [only] if only.label.is_none() => only.type_description.as_source(),
                _ => {
                    let rendered: Vec<String> = elements
                        .iter()
                        .map(|element| match &element.label {
                            Some(label) => {
                                format!("{label}: {}", element.type_description.as_source())
                            }
                            None => element.type_description.as_source(),
                        })
                        .collect();
                    format!("({})", rendered.join(", "))
                }
            },
            TypeDescription::Closure {
                arguments,
                is_async,
                does_throw,
                return_type,
            } => {
                let rendered: Vec<String> =
                    arguments.iter().map(TypeDescription::as_source).collect();
                let mut effects = String::new();
                if *is_async {
                    effects.push_str(" async");
                }
                if *does_throw {
                    effects.push_str(" throws");
                }
                format!(
                    "({}){} -> {}",
                    rendered.join(", "),
                    effects,
                    return_type.as_source()
                )
            }
            TypeDescription::Void => "Void".to_owned(),
            TypeDescription::Unknown { text } => text.clone(),
        }
    }

    /// The rendering used where a tuple value rather than a type is expected:
    /// void renders as `()`.
    pub fn as_value_source(&self) -> String {
        let source = self.as_source();
        if source == "Void" { "()".to_owned() } else { source }
    }

    /// Strips `Attributed`, `Optional`, and `ImplicitlyUnwrapped` wrappers.
    pub fn unwrapped(&self) -> &TypeDescription {
        match self {
            TypeDescription::Attributed { inner, .. }
            | TypeDescription::Optional { inner }
            | TypeDescription::ImplicitlyUnwrapped { inner } => inner.unwrapped(),
            other => other,
        }
    }

    /// Recognizes the builder types that introduce lazy edges into the
    /// dependency graph, looking through attributed and optional wrappers.
    pub fn lazy_builder(&self) -> Option<LazyBuilder<'_>> {
        let TypeDescription::Simple { name, generics } = self.unwrapped() else {
            return None;
        };
        match (name.as_str(), generics.as_slice()) {
            ("Instantiator", [target]) => Some(LazyBuilder {
                kind: LazyKind::Instantiator,
                forwarded: None,
                target,
            }),
            ("SendableInstantiator", [target]) => Some(LazyBuilder {
                kind: LazyKind::SendableInstantiator,
                forwarded: None,
                target,
            }),
            ("ErasedInstantiator", [forwarded, target]) => Some(LazyBuilder {
                kind: LazyKind::ErasedInstantiator,
                forwarded: Some(forwarded),
                target,
            }),
            _ => None,
        }
    }

    /// Whether this description is the canonical void type under §equality.
    pub fn is_void(&self) -> bool {
        self.as_source() == "Void"
    }
}

fn render_named(name: &str, generics: &[TypeDescription]) -> String {
    if generics.is_empty() {
        name.to_owned()
    } else {
        let rendered: Vec<String> = generics.iter().map(TypeDescription::as_source).collect();
        format!("{}<{}>", name, rendered.join(", "))
    }
}

// Compositions and closures bind looser than the postfix sigils, so they need
// parentheses when wrapped.
fn parenthesized_if_compound(inner: &TypeDescription) -> String {
    match inner {
        TypeDescription::Composition { .. } | TypeDescription::Closure { .. } => {
            format!("({})", inner.as_source())
        }
        _ => inner.as_source(),
    }
}

impl PartialEq for TypeDescription {
    fn eq(&self, other: &Self) -> bool {
        self.as_source() == other.as_source()
    }
}

impl Eq for TypeDescription {}

impl Hash for TypeDescription {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_source().hash(state);
    }
}

impl PartialOrd for TypeDescription {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeDescription {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_source().cmp(&other.as_source())
    }
}

impl PartialEq for TupleElement {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label && self.type_description == other.type_description
    }
}

impl Eq for TupleElement {}
