//! Where the caller's scopes come from.
//!
//! The [`Authorizer`](crate::Authorizer) asks a [`ScopeSource`] for the
//! scopes of every request. Hosts with their own token formats plug in a
//! custom source; the default [`ClaimScopeSource`] reads space separated
//! scopes from the caller's claims.

use std::collections::BTreeMap;

use crate::{Identity, Method, ScopeSourceError};

/// Name of the claim the default scope source reads.
pub const DEFAULT_SCOPE_CLAIM: &str = "Scope";

/// The request being authorized, as far as a scope source needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// The request method.
    pub method: Method,
    /// Template of the request path, e.g. `~/entityset/key`.
    pub template: String,
    /// Host defined values, e.g. the tenant or the client address.
    pub properties: BTreeMap<String, String>,
}

impl RequestContext {
    /// Create a context without properties.
    pub fn new(method: Method, template: impl Into<String>) -> Self {
        Self {
            method,
            template: template.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Attach a host defined property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// Everything a [`ScopeSource`] may inspect.
#[derive(Debug, Clone, Copy)]
pub struct ScopeFinderContext<'a> {
    /// The authenticated caller.
    pub identity: &'a Identity,
    /// The request being authorized.
    pub request: &'a RequestContext,
}

impl<'a> ScopeFinderContext<'a> {
    /// Bundle an identity with its request.
    pub fn new(identity: &'a Identity, request: &'a RequestContext) -> Self {
        Self { identity, request }
    }
}

/// Produces the scopes held by the caller of a request.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use odata_authorization::{ScopeFinderContext, ScopeSource, ScopeSourceError};
///
/// struct Anonymous;
///
/// #[cfg_attr(not(target_arch = "wasm32"), async_trait)]
/// #[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
/// impl ScopeSource for Anonymous {
///     async fn find_scopes(
///         &self,
///         _context: &ScopeFinderContext<'_>,
///     ) -> Result<Vec<String>, ScopeSourceError> {
///         Ok(vec!["Public.Read".into()])
///     }
/// }
/// ```
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
pub trait ScopeSource: Send + Sync {
    /// Scopes held by the caller of `context.request`.
    async fn find_scopes(
        &self,
        context: &ScopeFinderContext<'_>,
    ) -> Result<Vec<String>, ScopeSourceError>;
}

/// Reads every claim of a configured type and splits each value on
/// whitespace, dropping empty tokens. A caller without such claims holds no
/// scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimScopeSource {
    claim: String,
}

impl ClaimScopeSource {
    /// Read scopes from claims of type `claim`.
    pub fn new(claim: impl Into<String>) -> Self {
        Self {
            claim: claim.into(),
        }
    }

    /// The claim type read.
    pub fn claim(&self) -> &str {
        &self.claim
    }

    /// Extract scopes from `identity` without a request.
    pub fn scopes_of(&self, identity: &Identity) -> Vec<String> {
        identity
            .find_all(&self.claim)
            .flat_map(str::split_whitespace)
            .map(str::to_string)
            .collect()
    }
}

impl Default for ClaimScopeSource {
    fn default() -> Self {
        Self::new(DEFAULT_SCOPE_CLAIM)
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
impl ScopeSource for ClaimScopeSource {
    async fn find_scopes(
        &self,
        context: &ScopeFinderContext<'_>,
    ) -> Result<Vec<String>, ScopeSourceError> {
        let scopes = self.scopes_of(context.identity);
        tracing::trace!(claim = %self.claim, count = scopes.len(), "Read scopes from claims");
        Ok(scopes)
    }
}
