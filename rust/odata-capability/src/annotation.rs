//! Raw capability annotations as handed over by a model reader.
//!
//! Annotations arrive as loosely structured records (`serde_json::Value`)
//! keyed by their vocabulary term. This module knows the term names and how
//! to pull [`PermissionData`] out of those records. Anything that does not
//! have the expected shape is read as "no permission data".

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{PermissionData, ScopeEntry};

/// Namespace of the OData capabilities vocabulary.
pub const CAPABILITIES_NAMESPACE: &str = "Org.OData.Capabilities.V1";

/// Record property holding the permission list of a restriction.
pub const PERMISSIONS: &str = "Permissions";

/// The kinds of capability restriction understood by the authorizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestrictionKind {
    /// `ReadRestrictions`
    Read,
    /// `ReadRestrictions/ReadByKeyRestrictions`
    ReadByKey,
    /// `InsertRestrictions`
    Insert,
    /// `UpdateRestrictions`
    Update,
    /// `DeleteRestrictions`
    Delete,
    /// `NavigationRestrictions`
    Navigation,
    /// `OperationRestrictions`
    Operation,
}

impl RestrictionKind {
    /// Term kinds that can be attached directly to a schema node.
    pub const TERMS: [RestrictionKind; 6] = [
        RestrictionKind::Read,
        RestrictionKind::Insert,
        RestrictionKind::Update,
        RestrictionKind::Delete,
        RestrictionKind::Navigation,
        RestrictionKind::Operation,
    ];

    /// Record property name of this restriction, as used both for the term
    /// name and for nested records inside navigation restrictions.
    pub fn property_name(&self) -> &'static str {
        match self {
            RestrictionKind::Read => "ReadRestrictions",
            RestrictionKind::ReadByKey => "ReadByKeyRestrictions",
            RestrictionKind::Insert => "InsertRestrictions",
            RestrictionKind::Update => "UpdateRestrictions",
            RestrictionKind::Delete => "DeleteRestrictions",
            RestrictionKind::Navigation => "NavigationRestrictions",
            RestrictionKind::Operation => "OperationRestrictions",
        }
    }

    /// Fully qualified term name, or `None` for `ReadByKey` which only exists
    /// nested inside `ReadRestrictions`.
    pub fn term(&self) -> Option<String> {
        match self {
            RestrictionKind::ReadByKey => None,
            kind => Some(format!("{CAPABILITIES_NAMESPACE}.{}", kind.property_name())),
        }
    }

    /// Resolve a fully qualified term name.
    pub fn from_term(term: &str) -> Option<Self> {
        let name = term.strip_prefix(CAPABILITIES_NAMESPACE)?.strip_prefix('.')?;
        Self::TERMS
            .into_iter()
            .find(|kind| kind.property_name() == name)
    }
}

/// A vocabulary annotation attached to a schema node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Fully qualified term name.
    pub term: String,
    /// Annotation value; capability restrictions are records.
    #[serde(default)]
    pub value: Value,
}

impl Annotation {
    /// Create an annotation from a term name and its value.
    pub fn new(term: impl Into<String>, value: Value) -> Self {
        Self {
            term: term.into(),
            value,
        }
    }

    /// Create an annotation for a capabilities restriction kind.
    ///
    /// `ReadByKey` has no term of its own; it is emitted as a `ReadRestrictions`
    /// record nesting the given value.
    pub fn restriction(kind: RestrictionKind, value: Value) -> Self {
        match kind.term() {
            Some(term) => Self::new(term, value),
            None => {
                let mut record = Map::new();
                record.insert(kind.property_name().to_string(), value);
                Self::new(
                    RestrictionKind::Read.term().unwrap_or_default(),
                    Value::Object(record),
                )
            }
        }
    }

    /// The restriction kind of this annotation, if it is a capability term.
    pub fn kind(&self) -> Option<RestrictionKind> {
        RestrictionKind::from_term(&self.term)
    }
}

/// Find the first annotation of the given kind. Duplicates after the first
/// are ignored.
pub fn find_restriction(annotations: &[Annotation], kind: RestrictionKind) -> Option<&Annotation> {
    annotations
        .iter()
        .find(|annotation| annotation.kind() == Some(kind))
}

/// Look up a property of a record. Non-record values have no properties.
pub fn record_property<'a>(record: &'a Value, name: &str) -> Option<&'a Value> {
    record.as_object()?.get(name)
}

/// Read the `Permissions` collection of a restriction record.
///
/// A missing record, a missing property or a property that is not a
/// collection all read as an empty list. Collection elements that are not
/// records are skipped, as are permissions without a readable `Scopes`
/// collection.
pub fn permissions_of(record: Option<&Value>) -> Vec<PermissionData> {
    let Some(permissions) = record.and_then(|record| record_property(record, PERMISSIONS)) else {
        return Vec::new();
    };

    match permissions.as_array() {
        Some(items) => items.iter().filter_map(permission_data).collect(),
        None => {
            tracing::debug!(
                value = %permissions,
                "Ignoring capability permissions that are not a collection"
            );
            Vec::new()
        }
    }
}

fn permission_data(record: &Value) -> Option<PermissionData> {
    let fields = record.as_object()?;
    let scheme_name = fields
        .get("SchemeName")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let Some(items) = fields.get("Scopes").and_then(Value::as_array) else {
        tracing::debug!(%record, "Skipping permission without a scope collection");
        return None;
    };
    let scopes: Vec<ScopeEntry> = items.iter().filter_map(scope_entry).collect();
    // An explicit empty collection is satisfied by anyone; one whose entries
    // are all unreadable is not.
    if scopes.is_empty() && !items.is_empty() {
        tracing::debug!(%record, "Skipping permission without a readable scope");
        return None;
    }

    Some(PermissionData {
        scheme_name,
        scopes,
    })
}

fn scope_entry(record: &Value) -> Option<ScopeEntry> {
    let scope = record_property(record, "Scope")?.as_str()?;
    let restricted_properties = record_property(record, "RestrictedProperties")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(ScopeEntry {
        scope: scope.to_string(),
        restricted_properties,
    })
}
