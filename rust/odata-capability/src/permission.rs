use serde::{Deserialize, Serialize};

/// A set of scopes under one authorization scheme that grants access to a
/// restricted operation.
///
/// Mirrors the `Capabilities.PermissionType` record: a scheme name (e.g. an
/// OAuth2 security scheme) plus the scopes the caller may present. Any one of
/// the listed scopes is sufficient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionData {
    /// Authorization scheme the scopes belong to.
    pub scheme_name: String,
    /// Scopes that satisfy this permission, in declaration order.
    pub scopes: Vec<ScopeEntry>,
}

impl PermissionData {
    /// Create a permission for `scheme_name` from plain scope names.
    pub fn new<I, S>(scheme_name: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scheme_name: scheme_name.into(),
            scopes: scopes.into_iter().map(ScopeEntry::new).collect(),
        }
    }

    /// Iterate over the declared scope names.
    pub fn scope_names(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(|entry| entry.scope.as_str())
    }
}

/// A single scope declared by a [`PermissionData`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeEntry {
    /// The literal scope string the caller must hold.
    pub scope: String,
    /// Comma separated properties this scope is limited to. Carried through
    /// untouched; authorization does not filter on it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restricted_properties: Option<String>,
}

impl ScopeEntry {
    /// Create an entry without a restricted-properties marker.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            restricted_properties: None,
        }
    }

    /// Attach a restricted-properties marker.
    pub fn with_restricted_properties(mut self, properties: impl Into<String>) -> Self {
        self.restricted_properties = Some(properties.into());
        self
    }
}
