//! Typed capability restrictions.
//!
//! [`Capabilities`] is built once per schema node from its raw
//! [`Annotation`]s and then answers restriction queries with plain field
//! access. A restriction that is present but declares no permissions is kept
//! as an empty list, which is different from the restriction being absent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Annotation, NavigationPath, PermissionData, RestrictionKind, find_restriction, permissions_of,
    record_property,
};

/// A restriction record carrying only permissions (`Insert`, `Update`,
/// `Delete`, `Operation`, `ReadByKey`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    /// Alternative permissions; holding any one of them is sufficient.
    pub permissions: Vec<PermissionData>,
}

impl Restriction {
    /// Create a restriction from its permissions.
    pub fn new(permissions: impl IntoIterator<Item = PermissionData>) -> Self {
        Self {
            permissions: permissions.into_iter().collect(),
        }
    }

    fn from_record(record: Option<&Value>) -> Self {
        Self {
            permissions: permissions_of(record),
        }
    }
}

/// `ReadRestrictions`, optionally nesting `ReadByKeyRestrictions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadRestriction {
    /// Permissions for reading the collection (or singleton).
    pub permissions: Vec<PermissionData>,
    /// Permissions for reading a single entity by key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_by_key: Option<Restriction>,
}

impl ReadRestriction {
    /// Create a read restriction without a by-key record.
    pub fn new(permissions: impl IntoIterator<Item = PermissionData>) -> Self {
        Self {
            permissions: permissions.into_iter().collect(),
            read_by_key: None,
        }
    }

    /// Attach a `ReadByKeyRestrictions` record.
    pub fn with_read_by_key(mut self, restriction: Restriction) -> Self {
        self.read_by_key = Some(restriction);
        self
    }

    fn from_record(record: Option<&Value>) -> Self {
        let read_by_key = record
            .and_then(|record| record_property(record, RestrictionKind::ReadByKey.property_name()))
            .map(|record| Restriction::from_record(Some(record)));

        Self {
            permissions: permissions_of(record),
            read_by_key,
        }
    }
}

/// Restrictions on one navigation property, as listed by a
/// `NavigationRestrictions` record of the owning navigation source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationPropertyRestriction {
    /// Path from the owning source to the restricted navigation property.
    pub navigation_property: NavigationPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<ReadRestriction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert: Option<Restriction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<Restriction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Restriction>,
}

impl NavigationPropertyRestriction {
    /// Create an entry for the given navigation path with no restrictions.
    pub fn new(navigation_property: impl Into<NavigationPath>) -> Self {
        Self {
            navigation_property: navigation_property.into(),
            ..Default::default()
        }
    }

    /// Set the read restriction.
    pub fn with_read(mut self, restriction: ReadRestriction) -> Self {
        self.read = Some(restriction);
        self
    }

    /// Set the insert restriction.
    pub fn with_insert(mut self, restriction: Restriction) -> Self {
        self.insert = Some(restriction);
        self
    }

    /// Set the update restriction.
    pub fn with_update(mut self, restriction: Restriction) -> Self {
        self.update = Some(restriction);
        self
    }

    /// Set the delete restriction.
    pub fn with_delete(mut self, restriction: Restriction) -> Self {
        self.delete = Some(restriction);
        self
    }

    fn from_record(record: &Value) -> Option<Self> {
        let Some(path) = record_property(record, "NavigationProperty").and_then(Value::as_str)
        else {
            tracing::debug!(%record, "Skipping restricted property without a navigation path");
            return None;
        };
        let nested = |kind: RestrictionKind| record_property(record, kind.property_name());

        Some(Self {
            navigation_property: NavigationPath::parse(path),
            read: nested(RestrictionKind::Read).map(|r| ReadRestriction::from_record(Some(r))),
            insert: nested(RestrictionKind::Insert).map(|r| Restriction::from_record(Some(r))),
            update: nested(RestrictionKind::Update).map(|r| Restriction::from_record(Some(r))),
            delete: nested(RestrictionKind::Delete).map(|r| Restriction::from_record(Some(r))),
        })
    }
}

/// `NavigationRestrictions` of a navigation source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRestriction {
    /// Per navigation property restrictions.
    pub restricted_properties: Vec<NavigationPropertyRestriction>,
}

impl NavigationRestriction {
    /// Create from a list of per-property entries.
    pub fn new(
        restricted_properties: impl IntoIterator<Item = NavigationPropertyRestriction>,
    ) -> Self {
        Self {
            restricted_properties: restricted_properties.into_iter().collect(),
        }
    }

    /// Entries whose declared path identifies `path`.
    pub fn matching<'a>(
        &'a self,
        path: &'a NavigationPath,
    ) -> impl Iterator<Item = &'a NavigationPropertyRestriction> + 'a {
        self.restricted_properties
            .iter()
            .filter(move |entry| path.matches(&entry.navigation_property))
    }

    fn from_record(record: &Value) -> Self {
        let restricted_properties = record_property(record, "RestrictedProperties")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(NavigationPropertyRestriction::from_record)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            restricted_properties,
        }
    }
}

/// All capability restrictions attached to one schema node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<ReadRestriction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert: Option<Restriction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<Restriction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Restriction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation: Option<NavigationRestriction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<Restriction>,
}

impl Capabilities {
    /// Build typed capabilities from raw annotations. The first annotation of
    /// each restriction kind wins; annotations of other vocabularies are
    /// ignored.
    pub fn from_annotations(annotations: &[Annotation]) -> Self {
        let value = |kind| find_restriction(annotations, kind).map(|a| &a.value);

        Self {
            read: value(RestrictionKind::Read).map(|v| ReadRestriction::from_record(Some(v))),
            insert: value(RestrictionKind::Insert).map(|v| Restriction::from_record(Some(v))),
            update: value(RestrictionKind::Update).map(|v| Restriction::from_record(Some(v))),
            delete: value(RestrictionKind::Delete).map(|v| Restriction::from_record(Some(v))),
            navigation: value(RestrictionKind::Navigation).map(NavigationRestriction::from_record),
            operation: value(RestrictionKind::Operation).map(|v| Restriction::from_record(Some(v))),
        }
    }

    /// Whether no restriction of any kind is declared.
    pub fn is_unrestricted(&self) -> bool {
        *self == Self::default()
    }

    /// Permissions declared for a restriction kind, `None` when the
    /// restriction itself is absent. `Navigation` has no flat permission
    /// list and always yields `None`.
    pub fn permissions(&self, kind: RestrictionKind) -> Option<&[PermissionData]> {
        match kind {
            RestrictionKind::Read => self.read.as_ref().map(|r| r.permissions.as_slice()),
            RestrictionKind::ReadByKey => self
                .read
                .as_ref()
                .and_then(|r| r.read_by_key.as_ref())
                .map(|r| r.permissions.as_slice()),
            RestrictionKind::Insert => self.insert.as_ref().map(|r| r.permissions.as_slice()),
            RestrictionKind::Update => self.update.as_ref().map(|r| r.permissions.as_slice()),
            RestrictionKind::Delete => self.delete.as_ref().map(|r| r.permissions.as_slice()),
            RestrictionKind::Operation => {
                self.operation.as_ref().map(|r| r.permissions.as_slice())
            }
            RestrictionKind::Navigation => None,
        }
    }

    /// Set the read restriction.
    pub fn with_read(mut self, restriction: ReadRestriction) -> Self {
        self.read = Some(restriction);
        self
    }

    /// Set the insert restriction.
    pub fn with_insert(mut self, restriction: Restriction) -> Self {
        self.insert = Some(restriction);
        self
    }

    /// Set the update restriction.
    pub fn with_update(mut self, restriction: Restriction) -> Self {
        self.update = Some(restriction);
        self
    }

    /// Set the delete restriction.
    pub fn with_delete(mut self, restriction: Restriction) -> Self {
        self.delete = Some(restriction);
        self
    }

    /// Set the navigation restrictions.
    pub fn with_navigation(mut self, restriction: NavigationRestriction) -> Self {
        self.navigation = Some(restriction);
        self
    }

    /// Set the operation restriction.
    pub fn with_operation(mut self, restriction: Restriction) -> Self {
        self.operation = Some(restriction);
        self
    }
}

impl From<&[Annotation]> for Capabilities {
    fn from(annotations: &[Annotation]) -> Self {
        Self::from_annotations(annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn oauth(scopes: &[&str]) -> serde_json::Value {
        json!({
            "SchemeName": "oauth",
            "Scopes": scopes.iter().map(|s| json!({ "Scope": s })).collect::<Vec<_>>()
        })
    }

    #[test]
    fn it_builds_capabilities_from_annotations() {
        let annotations = vec![
            Annotation::restriction(
                RestrictionKind::Read,
                json!({
                    "Permissions": [oauth(&["Customers.Read"])],
                    "ReadByKeyRestrictions": { "Permissions": [oauth(&["Customer.Read"])] }
                }),
            ),
            Annotation::restriction(RestrictionKind::Delete, json!({ "Permissions": [] })),
        ];

        let capabilities = Capabilities::from_annotations(&annotations);

        assert_eq!(
            capabilities,
            Capabilities::default()
                .with_read(
                    ReadRestriction::new([PermissionData::new("oauth", ["Customers.Read"])])
                        .with_read_by_key(Restriction::new([PermissionData::new(
                            "oauth",
                            ["Customer.Read"]
                        )]))
                )
                .with_delete(Restriction::default())
        );
    }

    #[test]
    fn it_distinguishes_absent_from_empty_restrictions() {
        let capabilities = Capabilities::from_annotations(&[Annotation::restriction(
            RestrictionKind::Update,
            json!({ "Updatable": false }),
        )]);

        assert_eq!(capabilities.permissions(RestrictionKind::Update), Some(&[][..]));
        assert_eq!(capabilities.permissions(RestrictionKind::Insert), None);
        assert_eq!(capabilities.permissions(RestrictionKind::ReadByKey), None);
        assert!(!capabilities.is_unrestricted());
        assert!(Capabilities::default().is_unrestricted());
    }

    #[test]
    fn it_treats_non_record_restriction_as_without_permissions() {
        let capabilities = Capabilities::from_annotations(&[Annotation::restriction(
            RestrictionKind::Operation,
            json!(["not", "a", "record"]),
        )]);

        assert_eq!(capabilities.permissions(RestrictionKind::Operation), Some(&[][..]));
    }

    #[test]
    fn it_reads_navigation_restrictions() {
        let capabilities = Capabilities::from_annotations(&[Annotation::restriction(
            RestrictionKind::Navigation,
            json!({
                "RestrictedProperties": [
                    {
                        "NavigationProperty": "Products",
                        "ReadRestrictions": {
                            "Permissions": [oauth(&["Products.Read"])],
                            "ReadByKeyRestrictions": { "Permissions": [oauth(&["Product.Read"])] }
                        },
                        "DeleteRestrictions": { "Permissions": [oauth(&["Products.Delete"])] }
                    },
                    { "ReadRestrictions": { "Permissions": [] } }
                ]
            }),
        )]);

        let navigation = capabilities.navigation.unwrap();
        assert_eq!(navigation.restricted_properties.len(), 1);

        let entry = &navigation.restricted_properties[0];
        assert_eq!(entry.navigation_property.to_string(), "Products");
        assert!(entry.insert.is_none());
        assert_eq!(
            entry.read.as_ref().and_then(|r| r.read_by_key.clone()),
            Some(Restriction::new([PermissionData::new("oauth", ["Product.Read"])]))
        );

        let path = NavigationPath::parse("Customers/{key}/Products");
        assert_eq!(navigation.matching(&path).count(), 1);
        let other = NavigationPath::parse("Customers/{key}/Orders");
        assert_eq!(navigation.matching(&other).count(), 0);
    }
}
