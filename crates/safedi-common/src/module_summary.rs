//! The per-module summary exchanged between the syntactic visitor, the
//! summary store, and the analyzer.

use crate::imports::ImportStatement;
use crate::instantiable::Instantiable;
use crate::type_description::TypeDescription;
use serde::{Deserialize, Serialize};

/// Everything the analyzer needs to know about one module.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSummary {
    #[serde(default)]
    pub instantiables: Vec<Instantiable>,
    #[serde(default)]
    pub imports: Vec<ImportStatement>,
    /// Decorated declarations the visitor found nested inside other
    /// declarations. The visitor contract forbids them; the driver surfaces
    /// them as a diagnostic. Always empty in analyzer-produced summaries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested_instantiables: Vec<TypeDescription>,
}

impl ModuleSummary {
    pub fn new(instantiables: Vec<Instantiable>, imports: Vec<ImportStatement>) -> Self {
        ModuleSummary {
            instantiables,
            imports,
            nested_instantiables: Vec::new(),
        }
    }

    /// Folds another summary into this one, preserving order.
    pub fn merge(&mut self, other: ModuleSummary) {
        self.instantiables.extend(other.instantiables);
        self.imports.extend(other.imports);
        self.nested_instantiables.extend(other.nested_instantiables);
    }
}
