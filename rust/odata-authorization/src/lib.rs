//! Scope-based authorization of OData-style requests.
//!
//! Given a request method and an already resolved [`RequestPath`], this
//! crate derives the permission requirement from the capability restrictions
//! declared on every schema node the path touches, and checks it against the
//! scopes the caller holds.
//!
//! # Quick Example
//!
//! ```rust
//! use odata_authorization::{Authorizer, Decision, Identity, Method, RequestPath};
//! use odata_capability::{
//!     Capabilities, NavigationSource, PermissionData, ReadRestriction, Schema,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Schema::builder("Default")
//!     .source(NavigationSource::entity_set("Customers").with_capabilities(
//!         Capabilities::default().with_read(ReadRestriction::new([
//!             PermissionData::new("oauth", ["Customers.Read"]),
//!         ])),
//!     ))
//!     .build()?;
//!
//! let path = RequestPath::builder(&schema).entity_set("Customers")?.build();
//! let caller = Identity::new().with_claim("Scope", "Profile.Read Customers.Read");
//!
//! let decision = Authorizer::default()
//!     .authorize(&caller, &Method::Get, &path)
//!     .await?;
//!
//! assert_eq!(decision, Decision::Allow);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! [`extract_permissions`] produces an [`AllOf`] with one [`AnyOf`] per
//! restricted path segment. Each `AnyOf` holds the declared permissions of
//! that segment as [`PermissionEvaluator`] leaves, and a leaf is satisfied
//! when the caller holds any one of its scopes. Nothing restricted means
//! nothing required; a restriction declared with no permissions can never be
//! satisfied.
//!
//! # Scopes
//!
//! The [`Authorizer`] gets the caller's scopes from a [`ScopeSource`]. The
//! default [`ClaimScopeSource`] splits the values of every `Scope` claim of
//! the [`Identity`] on whitespace.

mod error;
pub use error::*;

mod scopes;
pub use scopes::*;

mod evaluator;
pub use evaluator::*;

mod method;
pub use method::*;

mod path;
pub use path::*;

pub mod lookup;

mod extractor;
pub use extractor::*;

mod identity;
pub use identity::*;

mod scope_source;
pub use scope_source::*;

mod settings;
pub use settings::*;

mod authorizer;
pub use authorizer::*;
