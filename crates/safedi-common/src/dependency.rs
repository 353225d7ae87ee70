//! Dependencies: how a provider's properties are fulfilled.

use crate::property::Property;
use crate::type_description::TypeDescription;
use serde::{Deserialize, Serialize};

/// Where the value of an injected property comes from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "case", rename_all = "camelCase")]
pub enum DependencySource {
    /// The enclosing type constructs this dependency itself, optionally
    /// fulfilled by a concrete type and erased to the property's existential
    /// type at construction.
    Instantiated {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fulfilling_type: Option<TypeDescription>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        erased_to_concrete_existential: bool,
    },
    /// The value is provided by an ancestor provider.
    Received {
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        only_if_available: bool,
    },
    /// The value is supplied at construction time by the caller of a builder.
    Forwarded,
    /// A renamed/retyped reception whose value is taken from another named
    /// property further up the chain.
    Aliased {
        fulfilling_property: Property,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        erased_to_concrete_existential: bool,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        only_if_available: bool,
    },
}

impl DependencySource {
    /// The decorator spelling for diagnostics.
    pub const fn keyword(&self) -> &'static str {
        match self {
            DependencySource::Instantiated { .. } => "@Instantiated",
            DependencySource::Received { .. } => "@Received",
            DependencySource::Forwarded => "@Forwarded",
            DependencySource::Aliased { .. } => "@Received(fulfilledByPropertyNamed:)",
        }
    }
}

/// One injected field together with its fulfillment source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub property: Property,
    pub source: DependencySource,
}

impl Dependency {
    pub fn instantiated(property: Property) -> Self {
        Dependency {
            property,
            source: DependencySource::Instantiated {
                fulfilling_type: None,
                erased_to_concrete_existential: false,
            },
        }
    }

    pub fn received(property: Property) -> Self {
        Dependency {
            property,
            source: DependencySource::Received {
                only_if_available: false,
            },
        }
    }

    pub fn forwarded(property: Property) -> Self {
        Dependency {
            property,
            source: DependencySource::Forwarded,
        }
    }

    pub fn aliased(property: Property, fulfilling_property: Property) -> Self {
        Dependency {
            property,
            source: DependencySource::Aliased {
                fulfilling_property,
                erased_to_concrete_existential: false,
                only_if_available: false,
            },
        }
    }

    pub const fn is_instantiated(&self) -> bool {
        matches!(self.source, DependencySource::Instantiated { .. })
    }

    pub const fn is_received(&self) -> bool {
        matches!(self.source, DependencySource::Received { .. })
    }

    pub const fn is_forwarded(&self) -> bool {
        matches!(self.source, DependencySource::Forwarded)
    }

    pub const fn is_aliased(&self) -> bool {
        matches!(self.source, DependencySource::Aliased { .. })
    }

    /// The concrete type this dependency is fulfilled as: the fulfilling type
    /// when one was declared, the fulfilling property's type for aliases, and
    /// the property's own type otherwise.
    pub fn instantiated_type(&self) -> &TypeDescription {
        match &self.source {
            DependencySource::Instantiated {
                fulfilling_type: Some(fulfilling_type),
                ..
            } => fulfilling_type,
            DependencySource::Aliased {
                fulfilling_property,
                ..
            } => &fulfilling_property.type_description,
            _ => &self.property.type_description,
        }
    }
}
