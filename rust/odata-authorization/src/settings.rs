use serde::{Deserialize, Serialize};

use crate::DEFAULT_SCOPE_CLAIM;

/// Configuration of an [`Authorizer`](crate::Authorizer).
///
/// Deserializes from the host's configuration; missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthorizerSettings {
    /// Claim type the default scope source reads.
    pub scope_claim: String,
}

impl Default for AuthorizerSettings {
    fn default() -> Self {
        Self {
            scope_claim: DEFAULT_SCOPE_CLAIM.to_string(),
        }
    }
}

impl AuthorizerSettings {
    /// Create settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read scopes from claims of type `claim`.
    pub fn with_scope_claim(mut self, claim: impl Into<String>) -> Self {
        self.scope_claim = claim.into();
        self
    }
}
