use crate::dependency::{Dependency, DependencySource};
use crate::property::Property;
use crate::type_description::TypeDescription;

#[test]
fn test_instantiated_type_defaults_to_property_type() {
    let dependency = Dependency::instantiated(Property::new(
        "networkService",
        TypeDescription::simple("NetworkService"),
    ));
    assert_eq!(
        dependency.instantiated_type(),
        &TypeDescription::simple("NetworkService")
    );
}

#[test]
fn test_instantiated_type_applies_fulfilling_type() {
    let dependency = Dependency {
        property: Property::new(
            "networkService",
            TypeDescription::any(TypeDescription::simple("Networking")),
        ),
        source: DependencySource::Instantiated {
            fulfilling_type: Some(TypeDescription::simple("NetworkService")),
            erased_to_concrete_existential: true,
        },
    };
    assert_eq!(
        dependency.instantiated_type(),
        &TypeDescription::simple("NetworkService")
    );
}

#[test]
fn test_instantiated_type_of_alias_is_the_fulfilling_property_type() {
    let dependency = Dependency::aliased(
        Property::new("renamed", TypeDescription::simple("Session")),
        Property::new("userSession", TypeDescription::simple("Session")),
    );
    assert_eq!(
        dependency.instantiated_type(),
        &TypeDescription::simple("Session")
    );
}

#[test]
fn test_source_keywords() {
    let property = Property::new("x", TypeDescription::simple("X"));
    assert_eq!(
        Dependency::instantiated(property.clone()).source.keyword(),
        "@Instantiated"
    );
    assert_eq!(
        Dependency::received(property.clone()).source.keyword(),
        "@Received"
    );
    assert_eq!(
        Dependency::forwarded(property).source.keyword(),
        "@Forwarded"
    );
}
