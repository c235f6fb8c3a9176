use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Placeholder standing in for a key lookup inside a navigation path.
pub const KEY_PLACEHOLDER: &str = "{key}";

/// Separator between navigation path segments.
pub const PATH_SEPARATOR: char = '/';

/// A chain of names from a restriction's owning navigation source to a
/// navigation property, e.g. `Customers/{key}/Products`.
///
/// Declared paths (from `NavigationRestrictions/RestrictedProperties`) are
/// usually written relative to the annotated source (`Products`); request
/// paths are built in full. [`NavigationPath::matches`] accepts either form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NavigationPath {
    segments: Vec<String>,
}

impl NavigationPath {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `/` separated path. Empty segments are dropped.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split(PATH_SEPARATOR)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Append a segment.
    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Append the key placeholder.
    pub fn push_key(&mut self) {
        self.push(KEY_PLACEHOLDER);
    }

    /// Path segments in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The path relative to its root: the first segment and every key
    /// placeholder removed.
    pub fn relative(&self) -> NavigationPath {
        Self {
            segments: self
                .segments
                .iter()
                .skip(1)
                .filter(|segment| segment.as_str() != KEY_PLACEHOLDER)
                .cloned()
                .collect(),
        }
    }

    /// Whether a declared path identifies this (full) request path, either
    /// literally or relative to the root.
    pub fn matches(&self, declared: &NavigationPath) -> bool {
        !declared.is_empty() && (declared == self || *declared == self.relative())
    }
}

impl Display for NavigationPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                write!(f, "{PATH_SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl From<&str> for NavigationPath {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for NavigationPath {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<NavigationPath> for String {
    fn from(value: NavigationPath) -> Self {
        value.to_string()
    }
}

impl<S: Into<String>> FromIterator<S> for NavigationPath {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_renders_with_separator() {
        let mut path = NavigationPath::new();
        path.push("Customers");
        path.push_key();
        path.push("Products");

        assert_eq!(path.to_string(), "Customers/{key}/Products");
        assert_eq!(NavigationPath::parse("/Customers//{key}/Products"), path);
    }

    #[test]
    fn it_strips_root_and_keys_for_relative_form() {
        let path = NavigationPath::parse("Customers/{key}/Orders/{key}/Items");
        assert_eq!(path.relative().to_string(), "Orders/Items");
    }

    #[test]
    fn it_matches_full_and_relative_declarations() {
        let path = NavigationPath::parse("Customers/{key}/Products");

        assert!(path.matches(&"Customers/{key}/Products".into()));
        assert!(path.matches(&"Products".into()));
        assert!(!path.matches(&"Orders".into()));
        assert!(!path.matches(&"Customers/Products".into()));
        assert!(!path.matches(&NavigationPath::new()));
    }

    #[test]
    fn it_serializes_as_string() {
        let path: NavigationPath = serde_json::from_str("\"Customers/{key}/Products\"").unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(
            serde_json::to_string(&path).unwrap(),
            "\"Customers/{key}/Products\""
        );
    }
}
