use crate::fixtures::*;
use crate::registry::TypeRegistry;
use safedi_common::{Dependency, GraphError, TypeDescription};

#[test]
fn test_lookup_finds_provider_by_concrete_type() {
    let (registry, errors) = TypeRegistry::build(&[summary(vec![provider("NetworkService", vec![])])]);
    assert!(errors.is_empty());
    let found = registry.lookup(&ty("NetworkService"));
    assert!(found.is_some());
}

#[test]
fn test_lookup_finds_provider_by_additional_fulfilled_type() {
    let mut service = provider("NetworkService", vec![]);
    service
        .additional_fulfilled_types
        .push(TypeDescription::any(ty("Networking")));
    let (registry, errors) = TypeRegistry::build(&[summary(vec![service])]);
    assert!(errors.is_empty());

    let found = registry
        .lookup(&TypeDescription::any(ty("Networking")))
        .expect("existential fulfillment should resolve");
    assert_eq!(found.concrete_type, ty("NetworkService"));
    assert!(registry.lookup(&ty("Networking")).is_none());
}

#[test]
fn test_lookup_uses_composition_set_equality() {
    let mut service = provider("CombinedService", vec![]);
    service
        .additional_fulfilled_types
        .push(TypeDescription::composition(vec![ty("Foo"), ty("Bar")]));
    let (registry, _) = TypeRegistry::build(&[summary(vec![service])]);

    let reordered = TypeDescription::composition(vec![ty("Bar"), ty("Foo")]);
    assert!(registry.lookup(&reordered).is_some());
}

#[test]
fn test_duplicate_fulfillment_is_reported_once() {
    let summaries = vec![
        summary(vec![provider("NetworkService", vec![])]),
        summary(vec![provider("NetworkService", vec![])]),
        summary(vec![provider("NetworkService", vec![])]),
    ];
    let (registry, errors) = TypeRegistry::build(&summaries);
    assert_eq!(
        errors,
        vec![GraphError::DuplicateInstantiable {
            type_source: "NetworkService".to_owned(),
        }]
    );
    // The first claim wins so analysis can continue.
    assert!(registry.lookup(&ty("NetworkService")).is_some());
    assert_eq!(registry.instantiables().len(), 1);
}

#[test]
fn test_property_multimap_indexes_by_label_and_type() {
    let instantiables = vec![provider(
        "Root",
        vec![
            Dependency::instantiated(prop("networkService", ty("NetworkService"))),
            Dependency::received(prop("session", ty("Session"))),
        ],
    )];
    let (registry, _) = TypeRegistry::build(&[summary(instantiables)]);

    assert_eq!(registry.properties_with_label("networkService").len(), 1);
    assert_eq!(registry.properties_with_type(&ty("Session")).len(), 1);
    assert!(registry.properties_with_label("missing").is_empty());
}
