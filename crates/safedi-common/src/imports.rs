//! Import statements carried through module summaries into generated code.

use serde::{Deserialize, Serialize};

/// One `import` statement observed in an input module, e.g.
/// `@testable import struct Foundation.URL`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStatement {
    /// Attribute without the leading `@`, e.g. `testable`. Empty when absent.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub attribute: String,
    /// Import kind, e.g. `struct` or `class`. Empty when absent.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    pub module_name: String,
    /// The imported member for a partial import. Empty means the whole
    /// module is imported.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub type_name: String,
}

impl ImportStatement {
    /// A plain wholesale import of a module.
    pub fn wholesale(module_name: impl Into<String>) -> Self {
        ImportStatement {
            attribute: String::new(),
            kind: String::new(),
            module_name: module_name.into(),
            type_name: String::new(),
        }
    }

    pub fn is_wholesale(&self) -> bool {
        self.type_name.is_empty()
    }

    pub fn as_source(&self) -> String {
        let mut source = String::new();
        if !self.attribute.is_empty() {
            source.push('@');
            source.push_str(&self.attribute);
            source.push(' ');
        }
        source.push_str("import ");
        if !self.kind.is_empty() {
            source.push_str(&self.kind);
            source.push(' ');
        }
        source.push_str(&self.module_name);
        if !self.type_name.is_empty() {
            source.push('.');
            source.push_str(&self.type_name);
        }
        source
    }
}

/// Deduplicates imports for emission: modules sort alphabetically, each
/// distinct statement appears once, and a module imported both wholesale and
/// partially keeps only its wholesale imports.
pub fn deduplicated(imports: &[ImportStatement]) -> Vec<ImportStatement> {
    let mut modules: Vec<&str> = imports
        .iter()
        .map(|import| import.module_name.as_str())
        .collect();
    modules.sort_unstable();
    modules.dedup();

    let mut result = Vec::new();
    for module in modules {
        let of_module = || {
            imports
                .iter()
                .filter(move |import| import.module_name == module)
        };
        let has_wholesale = of_module().any(ImportStatement::is_wholesale);
        let mut kept: Vec<&ImportStatement> = of_module()
            .filter(|import| !has_wholesale || import.is_wholesale())
            .collect();
        kept.sort_by_key(|import| import.as_source());
        kept.dedup_by_key(|import| import.as_source());
        result.extend(kept.into_iter().cloned());
    }
    result
}
