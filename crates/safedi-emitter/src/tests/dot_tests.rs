use crate::dot::emit_dot;
use safedi_common::{
    DeclarationKind, Dependency, Instantiable, ModuleSummary, Property, TypeDescription,
};
use safedi_graph::ScopeGraph;

fn ty(name: &str) -> TypeDescription {
    TypeDescription::simple(name)
}

fn prop(label: &str, type_description: TypeDescription) -> Property {
    Property::new(label, type_description)
}

fn provider(name: &str, dependencies: Vec<Dependency>) -> Instantiable {
    Instantiable {
        concrete_type: ty(name),
        is_root: false,
        initializer: None,
        additional_fulfilled_types: Vec::new(),
        dependencies,
        declaration_kind: DeclarationKind::Class,
    }
}

fn validated_graph(instantiables: Vec<Instantiable>) -> ScopeGraph {
    let summary = ModuleSummary::new(instantiables, Vec::new());
    let (_, graph) = safedi_graph::analyze(&[summary]).expect("fixture graph should validate");
    graph
}

#[test]
fn test_empty_graph_emits_skeleton_only() {
    let graph = validated_graph(vec![]);
    assert_eq!(emit_dot(&graph), "graph SafeDI {\n\tranksep=2\n}\n");
}

#[test]
fn test_instantiated_edges_use_property_form() {
    let graph = validated_graph(vec![
        provider(
            "Root",
            vec![Dependency::instantiated(prop(
                "networkService",
                ty("NetworkService"),
            ))],
        ),
        provider(
            "NetworkService",
            vec![Dependency::instantiated(prop("session", ty("Session")))],
        ),
        provider("Session", vec![]),
    ]);
    let rendered = emit_dot(&graph);
    assert!(rendered.contains("\t\"Root\" -- \"networkService: NetworkService\"\n"));
    assert!(
        rendered.contains("\t\"networkService: NetworkService\" -- \"session: Session\"\n")
    );
}

#[test]
fn test_alias_edges_show_source_property() {
    let graph = validated_graph(vec![
        provider(
            "Root",
            vec![
                Dependency::instantiated(prop("userSession", ty("Session"))),
                Dependency::instantiated(prop("child", ty("Child"))),
            ],
        ),
        provider("Session", vec![]),
        provider(
            "Child",
            vec![Dependency::aliased(
                prop("session", ty("Session")),
                prop("userSession", ty("Session")),
            )],
        ),
    ]);
    let rendered = emit_dot(&graph);
    assert!(
        rendered.contains("\t\"child: Child\" -- \"session: Session <- userSession: Session\"\n")
    );
}

#[test]
fn test_forwarded_properties_are_rendered_as_edges() {
    let graph = validated_graph(vec![
        provider(
            "Root",
            vec![Dependency::instantiated(prop(
                "builder",
                TypeDescription::simple_with_generics(
                    "Instantiator",
                    vec![ty("LoggedInViewController")],
                ),
            ))],
        ),
        provider(
            "LoggedInViewController",
            vec![Dependency::forwarded(prop("user", ty("User")))],
        ),
    ]);
    let rendered = emit_dot(&graph);
    assert!(
        rendered
            .contains("\t\"builder: Instantiator<LoggedInViewController>\" -- \"user: User\"\n")
    );
}

#[test]
fn test_root_blocks_are_separated_by_a_blank_line() {
    let graph = validated_graph(vec![
        provider(
            "Alpha",
            vec![Dependency::instantiated(prop("service", ty("Service")))],
        ),
        provider(
            "Beta",
            vec![Dependency::instantiated(prop("cache", ty("Cache")))],
        ),
        provider("Service", vec![]),
        provider("Cache", vec![]),
    ]);
    let rendered = emit_dot(&graph);
    assert!(rendered.contains("\"Alpha\" -- \"service: Service\"\n\n\t\"Beta\" -- \"cache: Cache\""));
}
