//! Per-root Swift initializer generation.

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use safedi_common::{
    DeclarationKind, Dependency, DependencySource, ImportStatement, Instantiable, Property,
    imports,
};
use safedi_graph::{AliasEdge, PropertyToInstantiate, Scope, ScopeGraph, ScopeId};
use tracing::debug;

const GENERATED_FILE_HEADER: &str = "\
// This file was generated by the SafeDI dependency injection tool.
// Any modifications to this file will be overwritten on the next build.
";

const NO_ROOTS_COMMENT: &str = "// No root @Instantiable-decorated types found.";

/// Renders the full generated source file: the generated-file header, the
/// deduplicated import block, then one extension per root separated by blank
/// lines. Byte-identical across runs for identical input.
pub fn emit_dependency_tree(graph: &ScopeGraph, import_statements: &[ImportStatement]) -> String {
    let mut output = String::from(GENERATED_FILE_HEADER);
    output.push('\n');

    let import_block = render_imports(import_statements);
    if !import_block.is_empty() {
        output.push_str(&import_block);
        output.push('\n');
    }

    if graph.roots.is_empty() {
        output.push_str(NO_ROOTS_COMMENT);
        output.push('\n');
        return output;
    }

    let root_blocks: Vec<String> = graph
        .roots
        .par_iter()
        .map(|&root| RootEmitter::new(graph).emit_root(root))
        .collect();
    debug!(roots = root_blocks.len(), "emitted dependency tree");
    output.push_str(&root_blocks.join("\n"));
    output
}

/// Every module imported once, wholesale winning over partial, each module's
/// imports guarded by a conditional-availability directive.
fn render_imports(import_statements: &[ImportStatement]) -> String {
    let deduplicated = imports::deduplicated(import_statements);
    let mut output = String::new();
    let mut index = 0;
    while index < deduplicated.len() {
        let module = deduplicated[index].module_name.clone();
        output.push_str(&format!("#if canImport({module})\n"));
        while index < deduplicated.len() && deduplicated[index].module_name == module {
            output.push_str(&deduplicated[index].as_source());
            output.push('\n');
            index += 1;
        }
        output.push_str("#endif\n");
    }
    output
}

/// Emits one root extension. Locals are declared in topological order by a
/// depth-first walk; sibling order within a scope is a modified insertion
/// sort that places each child directly after the latest sibling it can
/// receive from. Providers on a permitted lazy cycle are constructed through
/// nested factory functions so their builders can re-enter them recursively.
struct RootEmitter<'a> {
    graph: &'a ScopeGraph,
    used_names: FxHashSet<String>,
    required_cache: FxHashMap<ScopeId, FxHashSet<Property>>,
    required_in_progress: FxHashSet<ScopeId>,
    cyclic_cache: FxHashMap<ScopeId, bool>,
    /// Scopes whose construction is currently being emitted.
    emission_path: Vec<ScopeId>,
    /// Factory function names for in-progress cyclic constructions.
    factories: FxHashMap<ScopeId, String>,
}

impl<'a> RootEmitter<'a> {
    fn new(graph: &'a ScopeGraph) -> Self {
        RootEmitter {
            graph,
            used_names: FxHashSet::default(),
            required_cache: FxHashMap::default(),
            required_in_progress: FxHashSet::default(),
            cyclic_cache: FxHashMap::default(),
            emission_path: Vec::new(),
            factories: FxHashMap::default(),
        }
    }

    fn emit_root(mut self, root: ScopeId) -> String {
        let scope = self.graph.scope(root);
        let type_source = scope.instantiable.concrete_type.as_source();
        let init_keyword = match scope.instantiable.declaration_kind {
            DeclarationKind::Class => "public convenience init",
            _ => "public init",
        };

        self.emission_path.push(root);
        let mut environment: FxHashMap<Property, String> = FxHashMap::default();
        let mut body = String::new();
        self.emit_scope_interior(root, &mut environment, &mut body, 2);
        body.push_str(&indent(2));
        body.push_str(&format!(
            "self.init({})\n",
            argument_list(&scope.instantiable, &environment)
        ));

        format!("extension {type_source} {{\n    {init_keyword}() {{\n{body}    }}\n}}\n")
    }

    /// Emits the alias rebindings and child constructions of a scope,
    /// extending `environment` with every property the scope declares.
    fn emit_scope_interior(
        &mut self,
        scope_id: ScopeId,
        environment: &mut FxHashMap<Property, String>,
        output: &mut String,
        depth: usize,
    ) {
        let scope = self.graph.scope(scope_id);

        // Aliases whose source came from upstream rebind before any child;
        // an alias of a local instantiated property is emitted as soon as
        // its source binding exists.
        let mut deferred_aliases: Vec<&AliasEdge> = Vec::new();
        for alias in &scope.alias_edges {
            if environment.contains_key(&alias.fulfilling_property) {
                self.emit_alias(alias, environment, output, depth);
            } else {
                deferred_aliases.push(alias);
            }
        }

        for child in self.ordered_children(scope) {
            let Some(target) = child.scope else {
                continue;
            };
            self.emit_child(child, target, environment, output, depth);
            self.emit_enabled_aliases(&mut deferred_aliases, environment, output, depth);
        }

        // Whatever is left has no source anywhere: only-if-available
        // receptions whose value is absent.
        for alias in deferred_aliases {
            self.emit_alias(alias, environment, output, depth);
        }
    }

    fn emit_alias(
        &mut self,
        alias: &AliasEdge,
        environment: &mut FxHashMap<Property, String>,
        output: &mut String,
        depth: usize,
    ) {
        let local = self.allocate_name(&alias.property.label);
        let line = match environment.get(&alias.fulfilling_property) {
            Some(source_local) if alias.erased_to_concrete_existential => format!(
                "let {local} = {}({source_local})",
                alias.property.type_description.as_source()
            ),
            Some(source_local) => format!("let {local} = {source_local}"),
            // An only-if-available alias whose source is absent.
            None => format!(
                "let {local}: {} = nil",
                alias.property.type_description.as_source()
            ),
        };
        output.push_str(&indent(depth));
        output.push_str(&line);
        output.push('\n');
        environment.insert(alias.property.clone(), local);
    }

    /// Emits every deferred alias whose source has become available,
    /// rescanning so chained aliases resolve in one pass.
    fn emit_enabled_aliases(
        &mut self,
        deferred: &mut Vec<&'a AliasEdge>,
        environment: &mut FxHashMap<Property, String>,
        output: &mut String,
        depth: usize,
    ) {
        let mut index = 0;
        while index < deferred.len() {
            if environment.contains_key(&deferred[index].fulfilling_property) {
                let alias = deferred.remove(index);
                self.emit_alias(alias, environment, output, depth);
                index = 0;
            } else {
                index += 1;
            }
        }
    }

    fn emit_child(
        &mut self,
        child: &'a PropertyToInstantiate,
        target: ScopeId,
        environment: &mut FxHashMap<Property, String>,
        output: &mut String,
        depth: usize,
    ) {
        if self.emission_path.contains(&target) {
            // Only a lazy edge can legally re-enter a construction that is
            // in progress; its builder calls the in-progress factory.
            if child.lazy.is_some() {
                let factory_name = self.factories[&target].clone();
                self.emit_factory_call_binding(
                    child,
                    target,
                    &factory_name,
                    environment,
                    output,
                    depth,
                );
            }
            return;
        }
        if self.reaches_itself(target) {
            self.emit_factory(child, target, environment, output, depth);
        } else if child.lazy.is_none() {
            // Eager child: its own subtree first, then its binding.
            let mut child_environment = environment.clone();
            self.emission_path.push(target);
            self.emit_scope_interior(target, &mut child_environment, output, depth);
            self.emission_path.pop();
            let local = self.allocate_name(&child.property.label);
            let construction = self.construction_expression(target, child, &child_environment);
            output.push_str(&indent(depth));
            output.push_str(&format!("let {local} = {construction}\n"));
            environment.insert(child.property.clone(), local);
        } else {
            self.emit_lazy_child(target, child, environment, output, depth);
        }
    }

    /// A lazy builder captures the enclosing locals in a closure and builds
    /// its subtree at call time. Forwarded properties become the closure's
    /// parameters, in sorted label order.
    fn emit_lazy_child(
        &mut self,
        target: ScopeId,
        child: &'a PropertyToInstantiate,
        environment: &mut FxHashMap<Property, String>,
        output: &mut String,
        depth: usize,
    ) {
        let target_scope = self.graph.scope(target);
        let local = self.allocate_name(&child.property.label);
        let forwarded: Vec<Property> = target_scope
            .instantiable
            .sorted_forwarded_properties()
            .into_iter()
            .cloned()
            .collect();

        let builder_type = child.property.type_description.as_source();
        if forwarded.is_empty() {
            output.push_str(&indent(depth));
            output.push_str(&format!("let {local} = {builder_type} {{\n"));
        } else {
            let parameters: Vec<&str> = forwarded
                .iter()
                .map(|property| property.label.as_str())
                .collect();
            output.push_str(&indent(depth));
            output.push_str(&format!(
                "let {local} = {builder_type} {{ {} in\n",
                parameters.join(", ")
            ));
        }

        let mut closure_environment = environment.clone();
        for property in &forwarded {
            closure_environment.insert(property.clone(), property.label.clone());
        }
        self.emission_path.push(target);
        self.emit_scope_interior(target, &mut closure_environment, output, depth + 1);
        self.emission_path.pop();
        let construction = self.construction_expression(target, child, &closure_environment);
        output.push_str(&indent(depth + 1));
        output.push_str(&format!("return {construction}\n"));
        output.push_str(&indent(depth));
        output.push_str("}\n");
        environment.insert(child.property.clone(), local);
    }

    /// Constructs a provider that participates in a lazy cycle through a
    /// nested factory function, so builders inside its subtree can call back
    /// into it.
    fn emit_factory(
        &mut self,
        child: &'a PropertyToInstantiate,
        target: ScopeId,
        environment: &mut FxHashMap<Property, String>,
        output: &mut String,
        depth: usize,
    ) {
        let target_scope = self.graph.scope(target);
        let concrete = target_scope.instantiable.concrete_type.as_source();
        let factory_name = self.allocate_name(&format!("make{}", identifier_fragment(&concrete)));
        let forwarded: Vec<Property> = target_scope
            .instantiable
            .sorted_forwarded_properties()
            .into_iter()
            .cloned()
            .collect();

        let parameters: Vec<String> = forwarded
            .iter()
            .map(|property| property.as_source())
            .collect();
        output.push_str(&indent(depth));
        output.push_str(&format!(
            "func {factory_name}({}) -> {concrete} {{\n",
            parameters.join(", ")
        ));

        self.factories.insert(target, factory_name.clone());
        self.emission_path.push(target);
        let mut factory_environment = environment.clone();
        for property in &forwarded {
            factory_environment.insert(property.clone(), property.label.clone());
        }
        self.emit_scope_interior(target, &mut factory_environment, output, depth + 1);
        let arguments = argument_list(&target_scope.instantiable, &factory_environment);
        let callee = match target_scope.instantiable.declaration_kind {
            DeclarationKind::Extension => format!("{concrete}.instantiate"),
            _ => concrete.clone(),
        };
        output.push_str(&indent(depth + 1));
        output.push_str(&format!("return {callee}({arguments})\n"));
        self.emission_path.pop();
        self.factories.remove(&target);
        output.push_str(&indent(depth));
        output.push_str("}\n");

        self.emit_factory_call_binding(child, target, &factory_name, environment, output, depth);
    }

    /// Binds a property to a factory call: directly for an eager property,
    /// inside a builder closure for a lazy one.
    fn emit_factory_call_binding(
        &mut self,
        child: &'a PropertyToInstantiate,
        target: ScopeId,
        factory_name: &str,
        environment: &mut FxHashMap<Property, String>,
        output: &mut String,
        depth: usize,
    ) {
        let target_scope = self.graph.scope(target);
        let forwarded = target_scope.instantiable.sorted_forwarded_properties();
        let call_arguments: Vec<String> = forwarded
            .iter()
            .map(|property| format!("{}: {}", property.label, property.label))
            .collect();
        let call = format!("{factory_name}({})", call_arguments.join(", "));
        let wrapped = self.apply_erasure(child, call);

        let local = self.allocate_name(&child.property.label);
        let line = match child.lazy {
            None => format!("let {local} = {wrapped}"),
            Some(_) => {
                let builder_type = child.property.type_description.as_source();
                if forwarded.is_empty() {
                    format!("let {local} = {builder_type} {{ {wrapped} }}")
                } else {
                    let parameters: Vec<&str> = forwarded
                        .iter()
                        .map(|property| property.label.as_str())
                        .collect();
                    format!(
                        "let {local} = {builder_type} {{ {} in {wrapped} }}",
                        parameters.join(", ")
                    )
                }
            }
        };
        output.push_str(&indent(depth));
        output.push_str(&line);
        output.push('\n');
        environment.insert(child.property.clone(), local);
    }

    fn construction_expression(
        &self,
        target: ScopeId,
        child: &PropertyToInstantiate,
        environment: &FxHashMap<Property, String>,
    ) -> String {
        let scope = self.graph.scope(target);
        let concrete = scope.instantiable.concrete_type.as_source();
        let arguments = argument_list(&scope.instantiable, environment);
        let callee = match scope.instantiable.declaration_kind {
            DeclarationKind::Extension => format!("{concrete}.instantiate"),
            _ => concrete,
        };
        self.apply_erasure(child, format!("{callee}({arguments})"))
    }

    /// Wraps a construction in the existential's initializer when the
    /// dependency asks for erasure. The wrapper is the property's own type,
    /// or the builder's target generic for a lazy property.
    fn apply_erasure(&self, child: &PropertyToInstantiate, construction: String) -> String {
        if !child.erased_to_concrete_existential {
            return construction;
        }
        let wrapper = match child.property.type_description.lazy_builder() {
            Some(builder) => builder.target.as_source(),
            None => child.property.type_description.as_source(),
        };
        format!("{wrapper}({construction})")
    }

    /// Modified insertion sort: start with the first child; insert each
    /// subsequent child immediately after the latest already-placed sibling
    /// whose declared property it (transitively) requires, else prepend.
    fn ordered_children(&mut self, scope: &'a Scope) -> Vec<&'a PropertyToInstantiate> {
        let mut placed: Vec<&'a PropertyToInstantiate> = Vec::new();
        for child in &scope.instantiated_children {
            if placed.is_empty() {
                placed.push(child);
                continue;
            }
            let mut required = match child.scope {
                Some(target) => self.required_receivable(target),
                None => FxHashSet::default(),
            };
            // A requirement on one of this scope's aliases falls through to
            // the alias's source property, chains included, so a child that
            // consumes an alias of a sibling still sorts after that sibling.
            loop {
                let additions: Vec<Property> = scope
                    .alias_edges
                    .iter()
                    .filter(|alias| {
                        required.contains(&alias.property)
                            && !required.contains(&alias.fulfilling_property)
                    })
                    .map(|alias| alias.fulfilling_property.clone())
                    .collect();
                if additions.is_empty() {
                    break;
                }
                required.extend(additions);
            }
            match placed
                .iter()
                .rposition(|sibling| required.contains(&sibling.property))
            {
                Some(position) => placed.insert(position + 1, child),
                None => placed.insert(0, child),
            }
        }
        placed
    }

    /// The set of properties a scope's subtree must receive from outside:
    /// its own receptions and alias sources plus its children's, minus what
    /// the scope declares or forwards itself.
    fn required_receivable(&mut self, scope_id: ScopeId) -> FxHashSet<Property> {
        if let Some(cached) = self.required_cache.get(&scope_id) {
            return cached.clone();
        }
        if !self.required_in_progress.insert(scope_id) {
            // Cycle through lazy edges; the validator vouched for it.
            return FxHashSet::default();
        }
        let scope = self.graph.scope(scope_id);
        let mut required: FxHashSet<Property> = FxHashSet::default();
        for dependency in &scope.instantiable.dependencies {
            match &dependency.source {
                DependencySource::Received { .. } => {
                    required.insert(dependency.property.clone());
                }
                DependencySource::Aliased {
                    fulfilling_property,
                    ..
                } => {
                    required.insert(fulfilling_property.clone());
                }
                _ => {}
            }
        }
        for child in &scope.instantiated_children {
            if let Some(target) = child.scope {
                required.extend(self.required_receivable(target));
            }
        }
        for property in scope.declared_properties() {
            required.remove(property);
        }
        for property in scope.forwarded_properties() {
            required.remove(property);
        }
        self.required_in_progress.remove(&scope_id);
        self.required_cache.insert(scope_id, required.clone());
        required
    }

    /// Whether a scope can reach itself through its child edges, i.e. sits
    /// on a (lazy) construction cycle.
    fn reaches_itself(&mut self, scope_id: ScopeId) -> bool {
        if let Some(&cached) = self.cyclic_cache.get(&scope_id) {
            return cached;
        }
        let mut visited: FxHashSet<ScopeId> = FxHashSet::default();
        let mut stack: Vec<ScopeId> = child_targets(self.graph.scope(scope_id));
        let mut found = false;
        while let Some(current) = stack.pop() {
            if current == scope_id {
                found = true;
                break;
            }
            if visited.insert(current) {
                stack.extend(child_targets(self.graph.scope(current)));
            }
        }
        self.cyclic_cache.insert(scope_id, found);
        found
    }

    /// Local names come from property labels, uniquified with a numeric
    /// suffix when sibling subtrees reuse a label.
    fn allocate_name(&mut self, label: &str) -> String {
        if self.used_names.insert(label.to_owned()) {
            return label.to_owned();
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{label}{suffix}");
            if self.used_names.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

fn child_targets(scope: &Scope) -> Vec<ScopeId> {
    scope
        .instantiated_children
        .iter()
        .filter_map(|child| child.scope)
        .collect()
}

fn identifier_fragment(type_source: &str) -> String {
    type_source
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// Renders the argument list for a provider's initializer or `instantiate`
/// call. Argument order follows the declared initializer when one matches,
/// otherwise dependency declaration order. An absent only-if-available
/// reception is passed as `nil`.
fn argument_list(instantiable: &Instantiable, environment: &FxHashMap<Property, String>) -> String {
    let ordered: Vec<&Dependency> = match &instantiable.initializer {
        Some(initializer) if initializer.matches(&instantiable.dependencies) => initializer
            .arguments
            .iter()
            .filter_map(|argument| {
                instantiable
                    .dependencies
                    .iter()
                    .find(|dependency| dependency.property.label == argument.label())
            })
            .collect(),
        _ => instantiable.dependencies.iter().collect(),
    };
    let rendered: Vec<String> = ordered
        .iter()
        .map(|dependency| {
            let value = environment
                .get(&dependency.property)
                .cloned()
                .unwrap_or_else(|| "nil".to_owned());
            format!("{}: {value}", dependency.property.label)
        })
        .collect();
    rendered.join(", ")
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}
