//! Common types for the SafeDI dependency injection code generator.
//!
//! This crate provides the data model shared by every pipeline stage:
//! - Structural type descriptions (`TypeDescription`)
//! - Injected fields and their sources (`Property`, `Dependency`)
//! - Provider declarations (`Instantiable`, `Initializer`)
//! - Per-module summaries (`ModuleSummary`, `ImportStatement`)
//! - Analyzer diagnostics (`GraphError`, `GraphErrors`)

pub mod type_description;
pub use type_description::{LazyBuilder, LazyKind, TupleElement, TypeDescription};

pub mod property;
pub use property::Property;

pub mod dependency;
pub use dependency::{Dependency, DependencySource};

pub mod initializer;
pub use initializer::{Argument, Initializer};

pub mod instantiable;
pub use instantiable::{DeclarationKind, Instantiable};

pub mod imports;
pub use imports::ImportStatement;

pub mod module_summary;
pub use module_summary::ModuleSummary;

pub mod diagnostics;
pub use diagnostics::{GraphError, GraphErrors, Suggestion};

#[cfg(test)]
#[path = "tests/type_description_tests.rs"]
mod type_description_tests;
#[cfg(test)]
#[path = "tests/dependency_tests.rs"]
mod dependency_tests;
#[cfg(test)]
#[path = "tests/initializer_tests.rs"]
mod initializer_tests;
#[cfg(test)]
#[path = "tests/imports_tests.rs"]
mod imports_tests;
#[cfg(test)]
#[path = "tests/diagnostics_tests.rs"]
mod diagnostics_tests;
