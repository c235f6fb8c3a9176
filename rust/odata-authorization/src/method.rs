use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// HTTP method of the request being authorized.
///
/// Parsing is case-sensitive: only the canonical uppercase verbs are
/// recognized; anything else is kept as [`Method::Other`] and carries no
/// CRUD requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `MERGE`
    Merge,
    /// `DELETE`
    Delete,
    /// Any other method, verbatim.
    Other(String),
}

impl Method {
    /// Parse a method name.
    pub fn parse(method: &str) -> Self {
        match method {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "PATCH" => Method::Patch,
            "MERGE" => Method::Merge,
            "DELETE" => Method::Delete,
            other => Method::Other(other.to_string()),
        }
    }

    /// Method name as sent on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Merge => "MERGE",
            Method::Delete => "DELETE",
            Method::Other(other) => other,
        }
    }

    /// PUT, PATCH or MERGE.
    pub fn is_update(&self) -> bool {
        matches!(self, Method::Put | Method::Patch | Method::Merge)
    }

    /// Any recognized method that changes state.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Method::Post | Method::Delete) || self.is_update()
    }
}

impl FromStr for Method {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Method {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
