//! Analyzer diagnostics.
//!
//! Every violation the validator can detect is a `GraphError`. The policy is
//! collect-don't-stop: the analyzer gathers every violation, sorts them into
//! a stable order, and surfaces them as one `GraphErrors` bundle so test
//! assertions can match exact strings regardless of iteration order.

use crate::dependency::Dependency;
use crate::property::Property;
use thiserror::Error;

/// A nearest-match hint attached to an unfulfillable property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Suggestion {
    /// The received property is optional but the chain provides the
    /// non-optional form.
    OnlyIfAvailable { available: Property },
    /// The received property is non-optional but the chain provides the
    /// optional form.
    OptionalAvailable { available: Property },
    /// A property with the same label but a different type is available.
    SameLabelDifferentType { available: Property },
    /// A property of the same type is available under a different label.
    SameTypeDifferentLabel { available: Property },
    /// The received property is existential (`any`) but the chain provides
    /// the concrete form, or vice versa.
    ExistentialMismatch { available: Property },
}

impl std::fmt::Display for Suggestion {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Suggestion::OnlyIfAvailable { available } => write!(
                formatter,
                "The non-optional `{}` is available in chain. Did you mean to decorate this \
                 property with `@Received(onlyIfAvailable: true)`?",
                available.as_source()
            ),
            Suggestion::OptionalAvailable { available } => write!(
                formatter,
                "The optional `{}` is available in chain. Did you mean to receive it as optional?",
                available.as_source()
            ),
            Suggestion::SameLabelDifferentType { available } => write!(
                formatter,
                "Did you mean `{}`? A property with the same label but a different type is \
                 available in chain.",
                available.as_source()
            ),
            Suggestion::SameTypeDifferentLabel { available } => write!(
                formatter,
                "Did you mean `{}`? A property of the same type is available in chain under a \
                 different label.",
                available.as_source()
            ),
            Suggestion::ExistentialMismatch { available } => write!(
                formatter,
                "`{}` is available in chain. Did you mean to match its existential erasure?",
                available.as_source()
            ),
        }
    }
}

/// A violation detected while building or validating the dependency graph.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("{0}")]
    Configuration(String),

    #[error(
        "@Instantiable-decorated types and extensions must have globally unique type names and \
         fulfill globally unique types. Found multiple types or extensions fulfilling \
         `{type_source}`"
    )]
    DuplicateInstantiable { type_source: String },

    #[error(
        "No `@Instantiable`-decorated type or extension found to fulfill `@Instantiated`-decorated \
         property with type `{type_source}`"
    )]
    NoInstantiableFound { type_source: String },

    #[error("{}", unfulfillable_message(.property, .chain, .suggestions))]
    UnfulfillableProperty {
        property: Property,
        /// Root-to-receiver chain of type source forms.
        chain: Vec<String>,
        suggestions: Vec<Suggestion>,
    },

    #[error("Dependency cycle detected: {}", render_chain(.path))]
    DependencyCycle { path: Vec<String> },

    #[error("{}", lazy_cycle_message(.path, .property, .closing_type))]
    LazyDependencyCycle {
        path: Vec<String>,
        /// The builder-typed property that closes the cycle.
        property: Property,
        /// The type that declares the closing property.
        closing_type: String,
    },

    #[error("{}", received_in_same_chain_message(.property, .chain))]
    DependencyReceivedInSameChain {
        property: Property,
        chain: Vec<String>,
    },

    #[error("{}", cannot_be_root_message(.type_source, .violations))]
    CannotBeRoot {
        type_source: String,
        violations: Vec<Dependency>,
    },

    #[error(
        "Property `{}` incorrectly configured. Property should instead be of type `{expected}`.",
        .property.as_source()
    )]
    ForwardingInstantiatorGenericDoesNotMatch { property: Property, expected: String },

    #[error(
        "@Instantiable-decorated types must be top-level declarations. Found nested \
         @Instantiable-decorated types: {}",
        render_backticked(.types)
    )]
    NestedInstantiablesFound { types: Vec<String> },
}

impl GraphError {
    /// Stable ordering: (root type source form, chain depth, property source
    /// form), ties broken by message text.
    fn sort_key(&self) -> (String, usize, String) {
        match self {
            GraphError::Configuration(_) => (String::new(), 0, String::new()),
            GraphError::DuplicateInstantiable { type_source }
            | GraphError::NoInstantiableFound { type_source } => {
                (type_source.clone(), 0, String::new())
            }
            GraphError::UnfulfillableProperty {
                property, chain, ..
            } => (
                chain.first().cloned().unwrap_or_default(),
                chain.len(),
                property.as_source(),
            ),
            GraphError::DependencyCycle { path } => (
                path.first().cloned().unwrap_or_default(),
                path.len(),
                String::new(),
            ),
            GraphError::LazyDependencyCycle { path, property, .. } => (
                path.first().cloned().unwrap_or_default(),
                path.len(),
                property.as_source(),
            ),
            GraphError::DependencyReceivedInSameChain { property, chain } => (
                chain.first().cloned().unwrap_or_default(),
                chain.len(),
                property.as_source(),
            ),
            GraphError::CannotBeRoot { type_source, .. } => {
                (type_source.clone(), 0, String::new())
            }
            GraphError::ForwardingInstantiatorGenericDoesNotMatch { property, .. } => {
                (String::new(), 0, property.as_source())
            }
            GraphError::NestedInstantiablesFound { types } => {
                (types.first().cloned().unwrap_or_default(), 0, String::new())
            }
        }
    }

    /// Sorts a diagnostic set into the stable surfacing order.
    pub fn sort(errors: &mut [GraphError]) {
        errors.sort_by(|left, right| {
            left.sort_key()
                .cmp(&right.sort_key())
                .then_with(|| left.to_string().cmp(&right.to_string()))
        });
    }
}

/// The full diagnostic set of one analyzer run, sorted.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{}", render_bundle(.errors))]
pub struct GraphErrors {
    errors: Vec<GraphError>,
}

impl GraphErrors {
    pub fn new(mut errors: Vec<GraphError>) -> Self {
        GraphError::sort(&mut errors);
        GraphErrors { errors }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[GraphError] {
        &self.errors
    }
}

fn render_chain(chain: &[String]) -> String {
    chain.join(" -> ")
}

fn render_backticked(items: &[String]) -> String {
    let rendered: Vec<String> = items.iter().map(|item| format!("`{item}`")).collect();
    rendered.join(", ")
}

fn unfulfillable_message(
    property: &Property,
    chain: &[String],
    suggestions: &[Suggestion],
) -> String {
    let mut message = format!(
        "@Received property `{}` is not @Instantiated or @Forwarded in chain: {}",
        property.as_source(),
        render_chain(chain)
    );
    for suggestion in suggestions {
        message.push(' ');
        message.push_str(&suggestion.to_string());
    }
    message
}

fn lazy_cycle_message(path: &[String], property: &Property, closing_type: &str) -> String {
    format!(
        "Lazy dependency cycle detected: {}. The cycle is closed by `{}`, which is @Received on \
         `{closing_type}`. Declare `{}` as @Instantiated on `{closing_type}` to break the cycle.",
        render_chain(path),
        property.as_source(),
        property.label
    )
}

fn received_in_same_chain_message(property: &Property, chain: &[String]) -> String {
    format!(
        "Dependency received in same chain: @Instantiated `{}` -> @Received `{}` in chain: {}",
        property.as_source(),
        property.as_source(),
        render_chain(chain)
    )
}

fn cannot_be_root_message(type_source: &str, violations: &[Dependency]) -> String {
    let rendered: Vec<String> = violations
        .iter()
        .map(|dependency| {
            format!(
                "`{}` ({})",
                dependency.property.as_source(),
                dependency.source.keyword()
            )
        })
        .collect();
    format!(
        "`{type_source}` is decorated as a root, but roots must be able to instantiate all of \
         their dependencies. The following dependencies are not @Instantiated or aliases of local \
         @Instantiated properties: {}",
        rendered.join(", ")
    )
}

fn render_bundle(errors: &[GraphError]) -> String {
    let rendered: Vec<String> = errors.iter().map(GraphError::to_string).collect();
    rendered.join("\n")
}
