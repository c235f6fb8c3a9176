//! Capability restrictions of an OData-style schema.
//!
//! Schema nodes (entity sets, singletons, operations) carry declarative
//! restrictions from the capabilities vocabulary, stating which permission
//! scopes a caller needs in order to read, insert, update, delete, navigate
//! or invoke them. This crate turns those annotations into a typed model.
//!
//! # Layers
//!
//! ```text
//! Annotation { term, value }        raw records from a model reader
//!   └── Capabilities                typed, first match per restriction kind
//!         ├── ReadRestriction       Permissions + optional ReadByKey
//!         ├── Restriction           Insert / Update / Delete / Operation
//!         └── NavigationRestriction per navigation path entries
//! Schema                            validated, immutable set of nodes
//! ```
//!
//! A restriction that is absent and a restriction that lists no permissions
//! are kept apart: [`Capabilities::permissions`] returns `None` for the
//! former and an empty slice for the latter. Authorizers rely on that
//! difference, since only the second one denies access.
//!
//! # Quick Example
//!
//! ```rust
//! use odata_capability::{Annotation, NavigationSource, RestrictionKind, Schema};
//! use serde_json::json;
//!
//! let customers = NavigationSource::entity_set("Customers").with_annotations(&[
//!     Annotation::restriction(
//!         RestrictionKind::Read,
//!         json!({
//!             "Permissions": [
//!                 { "SchemeName": "oauth", "Scopes": [{ "Scope": "Customers.Read" }] }
//!             ]
//!         }),
//!     ),
//! ]);
//!
//! let schema = Schema::builder("Default").source(customers).build().unwrap();
//! let read = schema
//!     .entity_set("Customers")
//!     .and_then(|set| set.capabilities().permissions(RestrictionKind::Read))
//!     .unwrap();
//!
//! assert_eq!(read[0].scope_names().collect::<Vec<_>>(), vec!["Customers.Read"]);
//! ```

mod error;
pub use error::*;

mod permission;
pub use permission::*;

mod annotation;
pub use annotation::*;

mod navigation;
pub use navigation::*;

mod restriction;
pub use restriction::*;

mod schema;
pub use schema::*;
