//! Composable predicates over a caller's scopes.
//!
//! Requirements are assembled as a tree: [`AllOf`] at the root (every
//! restricted path segment must pass), [`AnyOf`] per segment (any declared
//! alternative suffices) and [`PermissionEvaluator`] leaves. The vacuous
//! cases differ on purpose: an empty `AllOf` allows, an empty `AnyOf` denies.

use std::fmt::Debug;

use odata_capability::PermissionData;

use crate::Scopes;

/// Decides whether a set of scopes is sufficient.
pub trait ScopesEvaluator: Debug + Send + Sync {
    /// Whether `scopes` satisfy this requirement.
    fn allows(&self, scopes: &Scopes) -> bool;
}

/// Leaf requirement backed by one [`PermissionData`]: satisfied when the
/// caller holds any one of its scopes, or when it declares none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionEvaluator {
    permission: PermissionData,
}

impl PermissionEvaluator {
    /// Wrap a permission.
    pub fn new(permission: PermissionData) -> Self {
        Self { permission }
    }
}

impl ScopesEvaluator for PermissionEvaluator {
    fn allows(&self, scopes: &Scopes) -> bool {
        self.permission.scopes.is_empty() || scopes.contains_any(self.permission.scope_names())
    }
}

impl From<PermissionData> for PermissionEvaluator {
    fn from(permission: PermissionData) -> Self {
        Self::new(permission)
    }
}

/// Logical OR: satisfied when at least one child is. Denies when empty.
#[derive(Debug, Default)]
pub struct AnyOf {
    evaluators: Vec<Box<dyn ScopesEvaluator>>,
}

impl AnyOf {
    /// An empty combiner, which denies until children are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// One [`PermissionEvaluator`] per permission.
    pub fn permissions<'a>(permissions: impl IntoIterator<Item = &'a PermissionData>) -> Self {
        let mut any = Self::new();
        for permission in permissions {
            any.add(PermissionEvaluator::new(permission.clone()));
        }
        any
    }

    /// Add an alternative.
    pub fn add(&mut self, evaluator: impl ScopesEvaluator + 'static) {
        self.evaluators.push(Box::new(evaluator));
    }

    /// Number of alternatives.
    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    /// Whether there are no alternatives.
    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }
}

impl ScopesEvaluator for AnyOf {
    fn allows(&self, scopes: &Scopes) -> bool {
        self.evaluators.iter().any(|evaluator| evaluator.allows(scopes))
    }
}

impl<E: ScopesEvaluator + 'static> Extend<E> for AnyOf {
    fn extend<T: IntoIterator<Item = E>>(&mut self, iter: T) {
        for evaluator in iter {
            self.add(evaluator);
        }
    }
}

impl<E: ScopesEvaluator + 'static> FromIterator<E> for AnyOf {
    fn from_iter<T: IntoIterator<Item = E>>(iter: T) -> Self {
        let mut any = Self::new();
        any.extend(iter);
        any
    }
}

/// Logical AND: satisfied when every child is. Allows when empty.
#[derive(Debug, Default)]
pub struct AllOf {
    evaluators: Vec<Box<dyn ScopesEvaluator>>,
}

impl AllOf {
    /// An empty combiner, which allows until children are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a requirement.
    pub fn add(&mut self, evaluator: impl ScopesEvaluator + 'static) {
        self.evaluators.push(Box::new(evaluator));
    }

    /// Number of requirements.
    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    /// Whether there are no requirements.
    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }
}

impl ScopesEvaluator for AllOf {
    fn allows(&self, scopes: &Scopes) -> bool {
        self.evaluators.iter().all(|evaluator| evaluator.allows(scopes))
    }
}

impl<E: ScopesEvaluator + 'static> Extend<E> for AllOf {
    fn extend<T: IntoIterator<Item = E>>(&mut self, iter: T) {
        for evaluator in iter {
            self.add(evaluator);
        }
    }
}

impl<E: ScopesEvaluator + 'static> FromIterator<E> for AllOf {
    fn from_iter<T: IntoIterator<Item = E>>(iter: T) -> Self {
        let mut all = Self::new();
        all.extend(iter);
        all
    }
}

impl ScopesEvaluator for Box<dyn ScopesEvaluator> {
    fn allows(&self, scopes: &Scopes) -> bool {
        self.as_ref().allows(scopes)
    }
}
