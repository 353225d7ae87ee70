//! Initializer declarations and dependency-list matching.

use crate::dependency::Dependency;
use crate::type_description::TypeDescription;
use serde::{Deserialize, Serialize};

/// One argument of an initializer or `instantiate` method.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argument {
    /// The external label, when it differs from the internal one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer_label: Option<String>,
    pub inner_label: String,
    pub type_description: TypeDescription,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_default_value: bool,
}

impl Argument {
    pub fn new(label: impl Into<String>, type_description: TypeDescription) -> Self {
        Argument {
            outer_label: None,
            inner_label: label.into(),
            type_description,
            has_default_value: false,
        }
    }

    /// The label call sites use.
    pub fn label(&self) -> &str {
        self.outer_label.as_deref().unwrap_or(&self.inner_label)
    }
}

/// A declared initializer on an `@Instantiable`-decorated type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initializer {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_public_or_open: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_optional: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_async: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub does_throw: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_generic_parameter: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_generic_where_clause: bool,
    #[serde(default)]
    pub arguments: Vec<Argument>,
}

impl Initializer {
    /// Whether this initializer can be invoked with exactly the given
    /// dependency list.
    ///
    /// Every dependency's `(label, type)` must appear among the arguments,
    /// and every argument without a default value must be consumed by some
    /// dependency. Closure arguments tolerate the `@escaping` attribute
    /// asymmetry.
    pub fn matches(&self, dependencies: &[Dependency]) -> bool {
        let mut consumed = vec![false; self.arguments.len()];
        for dependency in dependencies {
            let position = self.arguments.iter().position(|argument| {
                argument.label() == dependency.property.label
                    && types_match(
                        &argument.type_description,
                        &dependency.property.type_description,
                    )
            });
            match position {
                Some(index) => consumed[index] = true,
                None => return false,
            }
        }
        self.arguments
            .iter()
            .zip(&consumed)
            .all(|(argument, was_consumed)| *was_consumed || argument.has_default_value)
    }
}

fn types_match(argument: &TypeDescription, property: &TypeDescription) -> bool {
    argument == property || strip_escaping(argument) == strip_escaping(property)
}

// `@escaping` only exists at the argument position; a stored closure property
// compares equal to an escaping closure argument.
fn strip_escaping(type_description: &TypeDescription) -> TypeDescription {
    match type_description {
        TypeDescription::Attributed {
            inner,
            specifiers,
            attributes,
        } if matches!(**inner, TypeDescription::Closure { .. })
            && attributes.iter().any(|attribute| attribute == "escaping") =>
        {
            let remaining: Vec<String> = attributes
                .iter()
                .filter(|attribute| *attribute != "escaping")
                .cloned()
                .collect();
            if remaining.is_empty() && specifiers.is_empty() {
                (**inner).clone()
            } else {
                TypeDescription::Attributed {
                    inner: inner.clone(),
                    specifiers: specifiers.clone(),
                    attributes: remaining,
                }
            }
        }
        other => other.clone(),
    }
}
