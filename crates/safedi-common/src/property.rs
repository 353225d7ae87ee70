//! An injected field on a provider.

use crate::type_description::TypeDescription;
use serde::{Deserialize, Serialize};

/// A labeled, typed property of an `@Instantiable`-decorated type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub label: String,
    pub type_description: TypeDescription,
}

impl Property {
    pub fn new(label: impl Into<String>, type_description: TypeDescription) -> Self {
        Property {
            label: label.into(),
            type_description,
        }
    }

    /// Renders `label: Type`, the form used in diagnostics and generated
    /// argument lists.
    pub fn as_source(&self) -> String {
        format!("{}: {}", self.label, self.type_description.as_source())
    }
}
