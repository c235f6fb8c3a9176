//! Typed request paths.
//!
//! A [`RequestPath`] is the already-parsed form of a resource path such as
//! `Customers(1)/Products/$ref`. Every segment borrows the schema node it
//! was resolved to, so authorization reads the pre-built restrictions
//! directly.

use odata_capability::{NavigationProperty, NavigationSource, Operation, OperationKind, Schema};

use crate::{PathError, PathResult};

/// One segment of a request path.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment<'s> {
    /// An entity set, e.g. `Customers`.
    Collection(&'s NavigationSource),
    /// A singleton, e.g. `TopCustomer`.
    Singleton(&'s NavigationSource),
    /// A key lookup into the preceding collection, e.g. `(1)`. Carries the
    /// navigation source the key selects from.
    Key(&'s NavigationSource),
    /// A navigation property traversal, with the navigation source it leads
    /// to.
    Navigation {
        property: &'s NavigationProperty,
        target: &'s NavigationSource,
    },
    /// A navigation property addressed as a reference, i.e. `Products/$ref`.
    NavigationLink {
        property: &'s NavigationProperty,
        target: &'s NavigationSource,
    },
    /// A structural property, e.g. `Name`.
    Property(String),
    /// An operation bound to the preceding resource.
    BoundOperation(&'s Operation),
    /// An operation invoked from the service root.
    UnboundOperation(&'s Operation),
    /// A type cast, e.g. `Default.VipCustomer`.
    TypeCast(String),
    /// `$count`
    Count,
    /// `$value`
    Value,
    /// A bare `$ref`.
    Ref,
}

impl Segment<'_> {
    /// Whether the segment can carry a permission requirement of its own.
    pub fn is_significant(&self) -> bool {
        matches!(
            self,
            Segment::Collection(_)
                | Segment::Singleton(_)
                | Segment::Key(_)
                | Segment::Navigation { .. }
                | Segment::Property(_)
                | Segment::BoundOperation(_)
                | Segment::UnboundOperation(_)
        )
    }

    /// Whether the segment invokes an operation.
    pub fn is_operation(&self) -> bool {
        matches!(self, Segment::BoundOperation(_) | Segment::UnboundOperation(_))
    }

    /// Template name of the segment kind.
    pub fn template(&self) -> &'static str {
        match self {
            Segment::Collection(_) => "entityset",
            Segment::Singleton(_) => "singleton",
            Segment::Key(_) => "key",
            Segment::Navigation { .. } => "navigation",
            Segment::NavigationLink { .. } => "navigation",
            Segment::Property(_) => "property",
            Segment::BoundOperation(operation) => match operation.kind() {
                OperationKind::Action => "action",
                OperationKind::Function => "function",
            },
            Segment::UnboundOperation(operation) => match operation.kind() {
                OperationKind::Action => "unboundaction",
                OperationKind::Function => "unboundfunction",
            },
            Segment::TypeCast(_) => "cast",
            Segment::Count => "$count",
            Segment::Value => "$value",
            Segment::Ref => "$ref",
        }
    }
}

/// An ordered sequence of resolved segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestPath<'s> {
    segments: Vec<Segment<'s>>,
}

impl<'s> RequestPath<'s> {
    /// Create a path from resolved segments.
    pub fn new(segments: Vec<Segment<'s>>) -> Self {
        Self { segments }
    }

    /// Start resolving a path against `schema`.
    pub fn builder(schema: &'s Schema) -> PathBuilder<'s> {
        PathBuilder::new(schema)
    }

    /// The segments in order.
    pub fn segments(&self) -> &[Segment<'s>] {
        &self.segments
    }

    /// Segment at `index`.
    pub fn get(&self, index: usize) -> Option<&Segment<'s>> {
        self.segments.get(index)
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the path has no segments (the service root).
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether the path manipulates a relationship rather than the related
    /// resource, i.e. its template ends in `$ref`.
    pub fn is_reference_link(&self) -> bool {
        self.ends_in_link() || matches!(self.segments.last(), Some(Segment::Ref))
    }

    /// A navigation link in last position, or followed only by the key of
    /// the linked entity.
    fn ends_in_link(&self) -> bool {
        matches!(
            self.segments.as_slice(),
            [.., Segment::NavigationLink { .. }]
                | [.., Segment::NavigationLink { .. }, Segment::Key(_)]
        )
    }

    /// Path template such as `~/entityset/key/navigation/$ref`. A navigation
    /// link puts `$ref` at the end, after any key of the linked entity.
    pub fn template(&self) -> String {
        let mut template = String::from("~");
        for segment in &self.segments {
            template.push('/');
            template.push_str(segment.template());
        }
        if self.ends_in_link() {
            template.push_str("/$ref");
        }
        template
    }
}

impl<'s> FromIterator<Segment<'s>> for RequestPath<'s> {
    fn from_iter<T: IntoIterator<Item = Segment<'s>>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Resolves segment names against a [`Schema`] into a [`RequestPath`].
///
/// ```rust
/// use odata_authorization::RequestPath;
/// use odata_capability::{NavigationProperty, NavigationSource, Schema};
///
/// let schema = Schema::builder("Default")
///     .source(
///         NavigationSource::entity_set("Customers")
///             .with_navigation_property(NavigationProperty::collection("Products", "Products")),
///     )
///     .source(NavigationSource::entity_set("Products"))
///     .build()
///     .unwrap();
///
/// let path = RequestPath::builder(&schema)
///     .entity_set("Customers").unwrap()
///     .key().unwrap()
///     .link("Products").unwrap()
///     .build();
///
/// assert_eq!(path.template(), "~/entityset/key/navigation/$ref");
/// assert!(path.is_reference_link());
/// ```
#[derive(Debug, Clone)]
pub struct PathBuilder<'s> {
    schema: &'s Schema,
    current: Option<&'s NavigationSource>,
    segments: Vec<Segment<'s>>,
}

impl<'s> PathBuilder<'s> {
    /// Start an empty path.
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            current: None,
            segments: Vec::new(),
        }
    }

    /// Append an entity set.
    pub fn entity_set(mut self, name: &str) -> PathResult<Self> {
        let source = self
            .schema
            .entity_set(name)
            .ok_or_else(|| PathError::UnknownEntitySet {
                name: name.to_string(),
            })?;
        self.current = Some(source);
        self.segments.push(Segment::Collection(source));
        Ok(self)
    }

    /// Append a singleton.
    pub fn singleton(mut self, name: &str) -> PathResult<Self> {
        let source = self
            .schema
            .singleton(name)
            .ok_or_else(|| PathError::UnknownSingleton {
                name: name.to_string(),
            })?;
        self.current = Some(source);
        self.segments.push(Segment::Singleton(source));
        Ok(self)
    }

    /// Append a key lookup into the current navigation source.
    pub fn key(mut self) -> PathResult<Self> {
        let source = self.current_source("key")?;
        self.segments.push(Segment::Key(source));
        Ok(self)
    }

    /// Append a navigation property of the current navigation source.
    pub fn navigation(mut self, name: &str) -> PathResult<Self> {
        let (property, target) = self.resolve_navigation(name)?;
        self.current = Some(target);
        self.segments.push(Segment::Navigation { property, target });
        Ok(self)
    }

    /// Append a navigation property addressed by reference (`name/$ref`).
    pub fn link(mut self, name: &str) -> PathResult<Self> {
        let (property, target) = self.resolve_navigation(name)?;
        self.current = Some(target);
        self.segments.push(Segment::NavigationLink { property, target });
        Ok(self)
    }

    /// Append a structural property.
    pub fn property(mut self, name: impl Into<String>) -> Self {
        self.segments.push(Segment::Property(name.into()));
        self
    }

    /// Append a type cast.
    pub fn cast(mut self, type_name: impl Into<String>) -> Self {
        self.segments.push(Segment::TypeCast(type_name.into()));
        self
    }

    /// Append `$count`.
    pub fn count(mut self) -> Self {
        self.segments.push(Segment::Count);
        self
    }

    /// Append `$value`.
    pub fn value(mut self) -> Self {
        self.segments.push(Segment::Value);
        self
    }

    /// Append a bare `$ref`.
    pub fn reference(mut self) -> Self {
        self.segments.push(Segment::Ref);
        self
    }

    /// Append a bound operation.
    pub fn bound_operation(mut self, name: &str) -> PathResult<Self> {
        let operation = self.resolve_operation(name)?;
        self.segments.push(Segment::BoundOperation(operation));
        Ok(self)
    }

    /// Append an unbound operation.
    pub fn unbound_operation(mut self, name: &str) -> PathResult<Self> {
        let operation = self.resolve_operation(name)?;
        self.segments.push(Segment::UnboundOperation(operation));
        Ok(self)
    }

    /// Finish the path.
    pub fn build(self) -> RequestPath<'s> {
        RequestPath::new(self.segments)
    }

    fn current_source(&self, segment: &str) -> PathResult<&'s NavigationSource> {
        self.current.ok_or_else(|| PathError::MissingNavigationSource {
            segment: segment.to_string(),
        })
    }

    fn resolve_navigation(
        &self,
        name: &str,
    ) -> PathResult<(&'s NavigationProperty, &'s NavigationSource)> {
        let source = self.current_source(name)?;
        self.schema
            .navigation(source.name(), name)
            .ok_or_else(|| PathError::UnknownNavigationProperty {
                source_name: source.name().to_string(),
                property: name.to_string(),
            })
    }

    fn resolve_operation(&self, name: &str) -> PathResult<&'s Operation> {
        self.schema
            .operation(name)
            .ok_or_else(|| PathError::UnknownOperation {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    fn schema() -> Schema {
        Schema::builder("Default")
            .source(
                NavigationSource::entity_set("Customers").with_navigation_property(
                    NavigationProperty::collection("Products", "Products"),
                ),
            )
            .source(NavigationSource::entity_set("Products"))
            .source(NavigationSource::singleton("TopCustomer"))
            .operation(Operation::function("Best").bound())
            .operation(Operation::action("Rate"))
            .build()
            .expect("schema is valid")
    }

    #[test]
    fn it_renders_templates() -> TestResult {
        let schema = schema();

        let path = RequestPath::builder(&schema)
            .entity_set("Customers")?
            .key()?
            .navigation("Products")?
            .cast("Default.Gadget")
            .count()
            .build();
        assert_eq!(path.template(), "~/entityset/key/navigation/cast/$count");

        let path = RequestPath::builder(&schema)
            .singleton("TopCustomer")?
            .unbound_operation("Rate")?
            .build();
        assert_eq!(path.template(), "~/singleton/unboundaction");

        let path = RequestPath::builder(&schema)
            .entity_set("Customers")?
            .bound_operation("Default.Best")?
            .build();
        assert_eq!(path.template(), "~/entityset/function");
        Ok(())
    }

    #[test]
    fn it_detects_reference_links() -> TestResult {
        let schema = schema();

        let link = RequestPath::builder(&schema)
            .entity_set("Customers")?
            .key()?
            .link("Products")?
            .build();
        assert!(link.is_reference_link());

        let keyed_link = RequestPath::builder(&schema)
            .entity_set("Customers")?
            .key()?
            .link("Products")?
            .key()?
            .build();
        assert!(keyed_link.is_reference_link());
        assert_eq!(keyed_link.template(), "~/entityset/key/navigation/key/$ref");

        let bare = RequestPath::builder(&schema)
            .entity_set("Customers")?
            .key()?
            .reference()
            .build();
        assert!(bare.is_reference_link());

        let plain = RequestPath::builder(&schema)
            .entity_set("Customers")?
            .key()?
            .navigation("Products")?
            .build();
        assert!(!plain.is_reference_link());

        let property_of_link = RequestPath::builder(&schema)
            .entity_set("Customers")?
            .key()?
            .link("Products")?
            .property("Name")
            .build();
        assert!(!property_of_link.is_reference_link());
        assert_eq!(property_of_link.template(), "~/entityset/key/navigation/property");
        assert!(!RequestPath::default().is_reference_link());
        Ok(())
    }

    #[test]
    fn it_classifies_significant_segments() -> TestResult {
        let schema = schema();
        let path = RequestPath::builder(&schema)
            .entity_set("Customers")?
            .key()?
            .property("Name")
            .value()
            .build();

        let significant: Vec<_> = path.segments().iter().map(Segment::is_significant).collect();
        assert_eq!(significant, vec![true, true, true, false]);
        Ok(())
    }

    #[test]
    fn it_reports_unresolvable_segments() -> TestResult {
        let schema = schema();

        assert!(matches!(
            RequestPath::builder(&schema).entity_set("TopCustomer"),
            Err(PathError::UnknownEntitySet { .. })
        ));
        assert!(matches!(
            RequestPath::builder(&schema).key(),
            Err(PathError::MissingNavigationSource { .. })
        ));
        assert!(matches!(
            RequestPath::builder(&schema).entity_set("Customers")?.navigation("Orders"),
            Err(PathError::UnknownNavigationProperty { .. })
        ));
        assert!(matches!(
            RequestPath::builder(&schema).unbound_operation("Missing"),
            Err(PathError::UnknownOperation { .. })
        ));
        Ok(())
    }
}
