//! The global fulfilled-type index.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use safedi_common::{GraphError, Instantiable, ModuleSummary, Property, TypeDescription};
use tracing::debug;

/// Maps every fulfilled type to the provider that fulfills it.
///
/// Built from an ordered list of module summaries with the current module
/// last, so its declarations are authoritative for anything the dependent
/// summaries did not claim first. Iteration order is insertion order, which
/// keeps downstream stages deterministic.
pub struct TypeRegistry {
    instantiables: Vec<Instantiable>,
    by_fulfilled_type: IndexMap<String, usize>,
    properties_by_label: FxHashMap<String, Vec<Property>>,
    properties_by_type: FxHashMap<String, Vec<Property>>,
}

impl TypeRegistry {
    /// Merges summaries into a registry, collecting a
    /// `DuplicateInstantiable` for every fulfilled type claimed more than
    /// once. The first claim wins so analysis can continue past the error.
    pub fn build(summaries: &[ModuleSummary]) -> (TypeRegistry, Vec<GraphError>) {
        let mut registry = TypeRegistry {
            instantiables: Vec::new(),
            by_fulfilled_type: IndexMap::new(),
            properties_by_label: FxHashMap::default(),
            properties_by_type: FxHashMap::default(),
        };
        let mut errors = Vec::new();
        let mut reported: FxHashSet<String> = FxHashSet::default();

        for summary in summaries {
            for instantiable in &summary.instantiables {
                registry.insert(instantiable, &mut errors, &mut reported);
            }
        }
        debug!(
            providers = registry.instantiables.len(),
            fulfilled_types = registry.by_fulfilled_type.len(),
            "built type registry"
        );
        (registry, errors)
    }

    fn insert(
        &mut self,
        instantiable: &Instantiable,
        errors: &mut Vec<GraphError>,
        reported: &mut FxHashSet<String>,
    ) {
        let index = self.instantiables.len();
        let mut inserted = false;
        for fulfilled in instantiable.fulfilled_types() {
            let key = fulfilled.as_source();
            if self.by_fulfilled_type.contains_key(&key) {
                if reported.insert(key.clone()) {
                    errors.push(GraphError::DuplicateInstantiable { type_source: key });
                }
            } else {
                self.by_fulfilled_type.insert(key, index);
                inserted = true;
            }
        }
        if !inserted {
            return;
        }
        for dependency in &instantiable.dependencies {
            let property = &dependency.property;
            let by_label = self
                .properties_by_label
                .entry(property.label.clone())
                .or_default();
            if !by_label.contains(property) {
                by_label.push(property.clone());
            }
            let by_type = self
                .properties_by_type
                .entry(property.type_description.as_source())
                .or_default();
            if !by_type.contains(property) {
                by_type.push(property.clone());
            }
        }
        self.instantiables.push(instantiable.clone());
    }

    /// Every registered provider, in insertion order.
    pub fn instantiables(&self) -> &[Instantiable] {
        &self.instantiables
    }

    /// The provider fulfilling the given type, under the unified structural
    /// equality rules.
    pub fn lookup(&self, type_description: &TypeDescription) -> Option<&Instantiable> {
        self.by_fulfilled_type
            .get(&type_description.as_source())
            .map(|&index| &self.instantiables[index])
    }

    /// All declared properties sharing a label, for suggestion generation.
    pub fn properties_with_label(&self, label: &str) -> &[Property] {
        self.properties_by_label
            .get(label)
            .map_or(&[], Vec::as_slice)
    }

    /// All declared properties sharing a type, for suggestion generation.
    pub fn properties_with_type(&self, type_description: &TypeDescription) -> &[Property] {
        self.properties_by_type
            .get(&type_description.as_source())
            .map_or(&[], Vec::as_slice)
    }
}
