use serde::{Deserialize, Serialize};

/// A single claim asserted about the caller, e.g. `("Scope", "Orders.Read")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// The claim type.
    pub kind: String,
    /// The claim value.
    pub value: String,
}

impl Claim {
    /// Create a new claim.
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// The authenticated caller, as the claims the host has established for it.
///
/// Claim types compare exactly and may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    claims: Vec<Claim>,
}

impl Identity {
    /// An identity without claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a claim.
    pub fn with_claim(mut self, kind: impl Into<String>, value: impl Into<String>) -> Self {
        self.claims.push(Claim::new(kind, value));
        self
    }

    /// All claims in insertion order.
    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// Values of every claim of type `kind`.
    pub fn find_all<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.claims
            .iter()
            .filter(move |claim| claim.kind == kind)
            .map(|claim| claim.value.as_str())
    }

    /// Value of the first claim of type `kind`.
    pub fn find_first(&self, kind: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|claim| claim.kind == kind)
            .map(|claim| claim.value.as_str())
    }
}

impl FromIterator<Claim> for Identity {
    fn from_iter<T: IntoIterator<Item = Claim>>(iter: T) -> Self {
        Self {
            claims: iter.into_iter().collect(),
        }
    }
}
