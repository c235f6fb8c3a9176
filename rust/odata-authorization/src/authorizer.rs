//! The authorization gate.
//!
//! An [`Authorizer`] turns a request into its permission requirement, asks
//! its [`ScopeSource`] for the caller's scopes and decides. It holds no per
//! request state and can be shared across tasks.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::{
    AuthorizationResult, AuthorizerSettings, ClaimScopeSource, Identity, Method, RequestContext,
    RequestPath, ScopeFinderContext, ScopeSource, Scopes, ScopesEvaluator, extract_permissions,
};

/// Outcome of authorizing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// The caller holds sufficient scopes.
    Allow,
    /// The caller does not.
    Deny,
}

impl Decision {
    /// Whether the request may proceed.
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// Decides requests against the capability restrictions of the schema the
/// request paths were resolved in.
#[derive(Clone)]
pub struct Authorizer {
    source: Arc<dyn ScopeSource>,
}

impl Authorizer {
    /// An authorizer reading scopes from the claims named by `settings`.
    pub fn new(settings: AuthorizerSettings) -> Self {
        Self {
            source: Arc::new(ClaimScopeSource::new(settings.scope_claim)),
        }
    }

    /// Replace the scope source.
    pub fn with_scope_source(mut self, source: impl ScopeSource + 'static) -> Self {
        self.source = Arc::new(source);
        self
    }

    /// Authorize `method` on `path` for `identity`.
    ///
    /// Fails only when the scope source does; the error is passed through
    /// and it is up to the caller to treat it as a denial.
    pub async fn authorize(
        &self,
        identity: &Identity,
        method: &Method,
        path: &RequestPath<'_>,
    ) -> AuthorizationResult<Decision> {
        let request = RequestContext::new(method.clone(), path.template());
        self.authorize_request(identity, &request, path).await
    }

    /// Like [`Authorizer::authorize`], with a request context carrying host
    /// defined properties for the scope source. The method is taken from
    /// `request`.
    pub async fn authorize_request(
        &self,
        identity: &Identity,
        request: &RequestContext,
        path: &RequestPath<'_>,
    ) -> AuthorizationResult<Decision> {
        let context = ScopeFinderContext::new(identity, request);
        let scopes: Scopes = self.source.find_scopes(&context).await?.into_iter().collect();
        Ok(self.evaluate(&request.method, path, &scopes))
    }

    /// Decide `method` on `path` for a caller already known to hold `scopes`.
    pub fn evaluate(&self, method: &Method, path: &RequestPath<'_>, scopes: &Scopes) -> Decision {
        let requirements = extract_permissions(method, path);
        let decision = Decision::from(requirements.allows(scopes));
        match decision {
            Decision::Allow => tracing::debug!(
                %method,
                template = %path.template(),
                "Request allowed"
            ),
            Decision::Deny => tracing::warn!(
                %method,
                template = %path.template(),
                scopes = scopes.len(),
                "Request denied: insufficient scopes"
            ),
        }
        decision
    }
}

impl Default for Authorizer {
    fn default() -> Self {
        Self::new(AuthorizerSettings::default())
    }
}

impl Debug for Authorizer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odata_capability::{Capabilities, NavigationSource, PermissionData, ReadRestriction, Schema};
    use testresult::TestResult;

    fn schema() -> Schema {
        Schema::builder("Default")
            .source(NavigationSource::entity_set("Customers").with_capabilities(
                Capabilities::default().with_read(ReadRestriction::new([PermissionData::new(
                    "oauth",
                    ["Customers.Read"],
                )])),
            ))
            .build()
            .expect("valid schema")
    }

    #[test]
    fn it_evaluates_known_scopes() -> TestResult {
        let schema = schema();
        let path = RequestPath::builder(&schema).entity_set("Customers")?.build();
        let authorizer = Authorizer::default();

        let granted: Scopes = ["Customers.Read"].into_iter().collect();
        assert_eq!(authorizer.evaluate(&Method::Get, &path, &granted), Decision::Allow);
        assert_eq!(
            authorizer.evaluate(&Method::Get, &path, &Scopes::new()),
            Decision::Deny
        );
        Ok(())
    }

    #[test]
    fn it_converts_booleans() {
        assert!(Decision::from(true).is_allowed());
        assert!(!Decision::from(false).is_allowed());
    }
}
