//! Schema nodes that carry capability restrictions.
//!
//! The schema is built once at startup, validated, and then only read.
//! Request paths borrow its nodes, so every request shares the same
//! pre-parsed [`Capabilities`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Annotation, Capabilities, SchemaError, SchemaResult};

/// Whether a navigation source is an entity set or a singleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavigationSourceKind {
    /// A collection of entities addressed by key.
    EntitySet,
    /// A single, named entity.
    Singleton,
}

/// A navigation property declared on a navigation source, bound to the
/// navigation source it leads to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationProperty {
    /// Property name.
    pub name: String,
    /// Name of the navigation source the property is bound to.
    pub target: String,
    /// Whether the property yields a collection.
    #[serde(default)]
    pub collection: bool,
}

impl NavigationProperty {
    /// Create a single-valued navigation property bound to `target`.
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            collection: false,
        }
    }

    /// Create a collection-valued navigation property bound to `target`.
    pub fn collection(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            collection: true,
            ..Self::new(name, target)
        }
    }
}

/// An entity set or singleton of the entity container.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationSource {
    name: String,
    kind: NavigationSourceKind,
    navigation_properties: Vec<NavigationProperty>,
    capabilities: Capabilities,
}

impl NavigationSource {
    /// Create an entity set.
    pub fn entity_set(name: impl Into<String>) -> Self {
        Self::new(name, NavigationSourceKind::EntitySet)
    }

    /// Create a singleton.
    pub fn singleton(name: impl Into<String>) -> Self {
        Self::new(name, NavigationSourceKind::Singleton)
    }

    fn new(name: impl Into<String>, kind: NavigationSourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            navigation_properties: Vec::new(),
            capabilities: Capabilities::default(),
        }
    }

    /// Declare a navigation property.
    pub fn with_navigation_property(mut self, property: NavigationProperty) -> Self {
        self.navigation_properties.push(property);
        self
    }

    /// Replace the capabilities with typed restrictions.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Replace the capabilities with the ones read from raw annotations.
    pub fn with_annotations(self, annotations: &[Annotation]) -> Self {
        self.with_capabilities(Capabilities::from_annotations(annotations))
    }

    /// Name within the entity container.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name used as the root of navigation restriction paths. Sources live
    /// directly in the entity container, so this is the plain name.
    pub fn full_name(&self) -> &str {
        &self.name
    }

    /// Entity set or singleton.
    pub fn kind(&self) -> NavigationSourceKind {
        self.kind
    }

    /// Declared navigation properties.
    pub fn navigation_properties(&self) -> &[NavigationProperty] {
        &self.navigation_properties
    }

    /// Find a navigation property by name.
    pub fn navigation_property(&self, name: &str) -> Option<&NavigationProperty> {
        self.navigation_properties.iter().find(|p| p.name == name)
    }

    /// Restrictions attached to this source.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}

/// Whether an operation is an action or a function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Side-effecting operation, invoked with POST.
    Action,
    /// Side-effect free operation, invoked with GET.
    #[default]
    Function,
}

/// An action or function with its own `OperationRestrictions`.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    name: String,
    namespace: String,
    kind: OperationKind,
    bound: bool,
    capabilities: Capabilities,
}

impl Operation {
    /// Create an action.
    pub fn action(name: impl Into<String>) -> Self {
        Self::new(name, OperationKind::Action)
    }

    /// Create a function.
    pub fn function(name: impl Into<String>) -> Self {
        Self::new(name, OperationKind::Function)
    }

    fn new(name: impl Into<String>, kind: OperationKind) -> Self {
        Self {
            name: name.into(),
            namespace: String::new(),
            kind,
            bound: false,
            capabilities: Capabilities::default(),
        }
    }

    /// Mark the operation as bound to a type.
    pub fn bound(mut self) -> Self {
        self.bound = true;
        self
    }

    /// Replace the capabilities with typed restrictions.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Replace the capabilities with the ones read from raw annotations.
    pub fn with_annotations(self, annotations: &[Annotation]) -> Self {
        self.with_capabilities(Capabilities::from_annotations(annotations))
    }

    /// Unqualified name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace-qualified name.
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Action or function.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Whether the operation is bound to a type.
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Restrictions attached to this operation.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}

/// Immutable, validated schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    namespace: String,
    sources: BTreeMap<String, NavigationSource>,
    operations: BTreeMap<String, Operation>,
}

impl Schema {
    /// Start building a schema in `namespace`.
    pub fn builder(namespace: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            namespace: namespace.into(),
            sources: Vec::new(),
            operations: Vec::new(),
        }
    }

    /// Parse and validate a JSON [`SchemaDocument`].
    pub fn from_json(document: &str) -> SchemaResult<Self> {
        let document: SchemaDocument = serde_json::from_str(document)?;
        Self::try_from(document)
    }

    /// Schema namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Look up an entity set or singleton by name.
    pub fn navigation_source(&self, name: &str) -> Option<&NavigationSource> {
        self.sources.get(name)
    }

    /// Look up an entity set by name.
    pub fn entity_set(&self, name: &str) -> Option<&NavigationSource> {
        self.navigation_source(name)
            .filter(|source| source.kind() == NavigationSourceKind::EntitySet)
    }

    /// Look up a singleton by name.
    pub fn singleton(&self, name: &str) -> Option<&NavigationSource> {
        self.navigation_source(name)
            .filter(|source| source.kind() == NavigationSourceKind::Singleton)
    }

    /// Resolve a navigation property of `source` together with the source it
    /// leads to.
    pub fn navigation(
        &self,
        source: &str,
        property: &str,
    ) -> Option<(&NavigationProperty, &NavigationSource)> {
        let property = self.navigation_source(source)?.navigation_property(property)?;
        let target = self.navigation_source(&property.target)?;
        Some((property, target))
    }

    /// Look up an operation by unqualified or qualified name.
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        let name = name
            .strip_prefix(self.namespace.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(name);
        self.operations.get(name)
    }

    /// All navigation sources, ordered by name.
    pub fn navigation_sources(&self) -> impl Iterator<Item = &NavigationSource> {
        self.sources.values()
    }

    /// All operations, ordered by name.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }
}

/// Collects schema nodes and validates them on [`SchemaBuilder::build`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    namespace: String,
    sources: Vec<NavigationSource>,
    operations: Vec<Operation>,
}

impl SchemaBuilder {
    /// Add an entity set or singleton.
    pub fn source(mut self, source: NavigationSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Add an operation. It is placed in the schema namespace.
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Validate names and navigation bindings and produce the schema.
    pub fn build(self) -> SchemaResult<Schema> {
        let mut sources = BTreeMap::new();
        for source in self.sources {
            if sources.contains_key(source.name()) {
                return Err(SchemaError::DuplicateNavigationSource {
                    name: source.name,
                });
            }
            sources.insert(source.name.clone(), source);
        }

        for source in sources.values() {
            for property in source.navigation_properties() {
                if !sources.contains_key(&property.target) {
                    return Err(SchemaError::UnknownNavigationTarget {
                        source_name: source.name.clone(),
                        property: property.name.clone(),
                        target: property.target.clone(),
                    });
                }
            }
        }

        let mut operations = BTreeMap::new();
        for mut operation in self.operations {
            if operations.contains_key(operation.name()) {
                return Err(SchemaError::DuplicateOperation {
                    name: operation.name,
                });
            }
            operation.namespace = self.namespace.clone();
            operations.insert(operation.name.clone(), operation);
        }

        tracing::debug!(
            namespace = %self.namespace,
            sources = sources.len(),
            restricted = sources
                .values()
                .filter(|source| !source.capabilities().is_unrestricted())
                .count(),
            operations = operations.len(),
            "Built capability schema"
        );

        Ok(Schema {
            namespace: self.namespace,
            sources,
            operations,
        })
    }
}

/// Serialized form of a [`Schema`], as produced by a model reader.
///
/// ```json
/// {
///   "namespace": "Default",
///   "entitySets": [{
///     "name": "Customers",
///     "navigationProperties": [{ "name": "Products", "target": "Products", "collection": true }],
///     "annotations": [{ "term": "Org.OData.Capabilities.V1.ReadRestrictions", "value": { } }]
///   }],
///   "singletons": [],
///   "operations": [{ "name": "Rate", "kind": "Action", "bound": false, "annotations": [] }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    /// Namespace of the schema.
    pub namespace: String,
    /// Entity sets of the entity container.
    #[serde(default)]
    pub entity_sets: Vec<NavigationSourceDocument>,
    /// Singletons of the entity container.
    #[serde(default)]
    pub singletons: Vec<NavigationSourceDocument>,
    /// Actions and functions.
    #[serde(default)]
    pub operations: Vec<OperationDocument>,
}

/// Serialized entity set or singleton.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationSourceDocument {
    /// Name within the entity container.
    pub name: String,
    /// Navigation property bindings.
    #[serde(default)]
    pub navigation_properties: Vec<NavigationProperty>,
    /// Vocabulary annotations, in declaration order.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// Serialized action or function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDocument {
    /// Unqualified name.
    pub name: String,
    /// Action or function.
    #[serde(default)]
    pub kind: OperationKind,
    /// Whether the operation is bound.
    #[serde(default)]
    pub bound: bool,
    /// Vocabulary annotations, in declaration order.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl NavigationSourceDocument {
    fn into_source(self, kind: NavigationSourceKind) -> NavigationSource {
        let mut source = NavigationSource::new(self.name, kind).with_annotations(&self.annotations);
        source.navigation_properties = self.navigation_properties;
        source
    }
}

impl From<OperationDocument> for Operation {
    fn from(document: OperationDocument) -> Self {
        let operation = Operation::new(document.name, document.kind);
        let operation = if document.bound {
            operation.bound()
        } else {
            operation
        };
        operation.with_annotations(&document.annotations)
    }
}

impl TryFrom<SchemaDocument> for Schema {
    type Error = SchemaError;

    fn try_from(document: SchemaDocument) -> Result<Self, Self::Error> {
        let entity_sets = document
            .entity_sets
            .into_iter()
            .map(|source| source.into_source(NavigationSourceKind::EntitySet));
        let singletons = document
            .singletons
            .into_iter()
            .map(|source| source.into_source(NavigationSourceKind::Singleton));

        let builder = entity_sets
            .chain(singletons)
            .fold(Schema::builder(document.namespace), SchemaBuilder::source);

        document
            .operations
            .into_iter()
            .map(Operation::from)
            .fold(builder, SchemaBuilder::operation)
            .build()
    }
}
