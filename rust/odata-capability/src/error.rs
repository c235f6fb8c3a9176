/// Errors raised while building a [`Schema`](crate::Schema).
///
/// Restriction content is never an error: malformed restrictions read as
/// restrictions without permissions. Only the shape of the schema itself is
/// validated.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema document is not valid JSON or does not have the expected
    /// structure.
    #[error("Invalid schema document: {0}")]
    Document(#[from] serde_json::Error),

    /// Two navigation sources share a name.
    #[error("Navigation source '{name}' is declared more than once")]
    DuplicateNavigationSource {
        /// The duplicated name.
        name: String,
    },

    /// Two operations share a name.
    #[error("Operation '{name}' is declared more than once")]
    DuplicateOperation {
        /// The duplicated name.
        name: String,
    },

    /// A navigation property is bound to a navigation source that does not
    /// exist.
    #[error("Navigation property '{source_name}/{property}' targets unknown source '{target}'")]
    UnknownNavigationTarget {
        /// Source declaring the navigation property.
        source_name: String,
        /// Name of the navigation property.
        property: String,
        /// The missing target.
        target: String,
    },
}

/// Result of schema construction.
pub type SchemaResult<T> = Result<T, SchemaError>;
