use std::error::Error;

/// Errors raised while resolving segment names into a
/// [`RequestPath`](crate::RequestPath).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// No entity set with this name.
    #[error("Unknown entity set '{name}'")]
    UnknownEntitySet {
        /// The requested name.
        name: String,
    },

    /// No singleton with this name.
    #[error("Unknown singleton '{name}'")]
    UnknownSingleton {
        /// The requested name.
        name: String,
    },

    /// The current navigation source has no such navigation property.
    #[error("Navigation source '{source_name}' has no navigation property '{property}'")]
    UnknownNavigationProperty {
        /// The navigation source being traversed.
        source_name: String,
        /// The requested property.
        property: String,
    },

    /// No operation with this name.
    #[error("Unknown operation '{name}'")]
    UnknownOperation {
        /// The requested name.
        name: String,
    },

    /// A segment needs a preceding entity set, singleton or navigation.
    #[error("Segment '{segment}' does not follow a navigation source")]
    MissingNavigationSource {
        /// The offending segment.
        segment: String,
    },
}

/// Result of path resolution.
pub type PathResult<T> = Result<T, PathError>;

/// Errors raised by a [`ScopeSource`](crate::ScopeSource).
#[derive(Debug, thiserror::Error)]
pub enum ScopeSourceError {
    /// The source could not be reached or refused to answer.
    #[error("Scope source unavailable: {0}")]
    Unavailable(String),

    /// The identity carries scope information that cannot be interpreted.
    #[error("Invalid scope claims: {0}")]
    InvalidClaims(String),

    /// Any other failure of a host supplied source.
    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

/// Errors raised while authorizing a request.
///
/// Building and evaluating the requirements never fails; the only failure is
/// the scope source, passed through as is.
#[derive(Debug, thiserror::Error)]
pub enum AuthorizationError {
    /// The scope source failed.
    #[error(transparent)]
    ScopeSource(#[from] ScopeSourceError),
}

/// Result of authorization.
pub type AuthorizationResult<T> = Result<T, AuthorizationError>;
