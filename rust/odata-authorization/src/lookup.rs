//! Capability lookup: which declared restriction applies to a schema node
//! for a given method, turned into evaluators.
//!
//! Every function returns `None` when the applicable restriction is not
//! declared at all, and `Some` (possibly an empty, denying [`AnyOf`]) when
//! it is.

use odata_capability::{
    Capabilities, NavigationPath, NavigationPropertyRestriction, ReadRestriction, RestrictionKind,
};

use crate::{AnyOf, Method, Segment};

fn restriction(capabilities: &Capabilities, kind: RestrictionKind) -> Option<AnyOf> {
    capabilities
        .permissions(kind)
        .map(|permissions| AnyOf::permissions(permissions))
}

fn read_restriction(read: Option<&ReadRestriction>, by_key: bool) -> Option<AnyOf> {
    let read = read?;
    let mut any = AnyOf::new();
    any.add(AnyOf::permissions(&read.permissions));
    if by_key {
        if let Some(read_by_key) = &read.read_by_key {
            any.add(AnyOf::permissions(&read_by_key.permissions));
        }
    }
    Some(any)
}

/// CRUD requirement of a navigation source addressed as a whole: GET reads,
/// POST inserts, PUT/PATCH/MERGE update, DELETE deletes.
pub fn source_crud(capabilities: &Capabilities, method: &Method) -> Option<AnyOf> {
    let kind = match method {
        Method::Get => RestrictionKind::Read,
        Method::Post => RestrictionKind::Insert,
        Method::Put | Method::Patch | Method::Merge => RestrictionKind::Update,
        Method::Delete => RestrictionKind::Delete,
        Method::Other(_) => return None,
    };
    restriction(capabilities, kind)
}

/// CRUD requirement of a single entity addressed by key: GET reads (either
/// read or read-by-key permissions suffice), POST/PUT/PATCH/MERGE update,
/// DELETE deletes.
pub fn entity_crud(capabilities: &Capabilities, method: &Method) -> Option<AnyOf> {
    match method {
        Method::Get => read_restriction(capabilities.read.as_ref(), true),
        Method::Post | Method::Put | Method::Patch | Method::Merge => {
            restriction(capabilities, RestrictionKind::Update)
        }
        Method::Delete => restriction(capabilities, RestrictionKind::Delete),
        Method::Other(_) => None,
    }
}

/// Requirement for accessing a property (or reference) of a singleton: GET
/// reads, every mutation counts as an update of the singleton.
pub fn singleton_property(capabilities: &Capabilities, method: &Method) -> Option<AnyOf> {
    match method {
        Method::Get => restriction(capabilities, RestrictionKind::Read),
        method if method.is_mutating() => restriction(capabilities, RestrictionKind::Update),
        _ => None,
    }
}

/// Requirement for accessing a property (or reference) of an entity
/// addressed by key: GET reads by key, every mutation counts as an update.
pub fn entity_property(capabilities: &Capabilities, method: &Method) -> Option<AnyOf> {
    match method {
        Method::Get => read_restriction(capabilities.read.as_ref(), true),
        method if method.is_mutating() => restriction(capabilities, RestrictionKind::Update),
        _ => None,
    }
}

/// Requirement for invoking an operation. Independent of the method.
pub fn operation(capabilities: &Capabilities) -> Option<AnyOf> {
    restriction(capabilities, RestrictionKind::Operation)
}

/// Navigation path of the significant segments seen so far, rooted at the
/// first one. Keys become `{key}` except in last position.
pub fn navigation_path(segments: &[Segment<'_>]) -> NavigationPath {
    let mut path = NavigationPath::new();
    let last = segments.len().saturating_sub(1);
    for (index, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Collection(source) | Segment::Singleton(source) => {
                path.push(source.full_name());
            }
            Segment::Key(_) if index < last => path.push_key(),
            Segment::Navigation { property, .. } => path.push(property.name.as_str()),
            _ => {}
        }
    }
    path
}

fn nested(
    segments: &[Segment<'_>],
    select: impl Fn(&NavigationPropertyRestriction) -> Option<AnyOf>,
) -> Option<AnyOf> {
    if segments.len() <= 1 {
        return None;
    }
    let root = match segments.first() {
        Some(Segment::Collection(source) | Segment::Singleton(source)) => source,
        _ => return None,
    };
    let navigation = root.capabilities().navigation.as_ref()?;
    let path = navigation_path(segments);

    let matched: Vec<AnyOf> = navigation.matching(&path).filter_map(select).collect();
    tracing::trace!(
        root = root.name(),
        %path,
        matched = matched.len(),
        "Looked up navigation restrictions"
    );

    if matched.is_empty() {
        None
    } else {
        Some(matched.into_iter().collect())
    }
}

/// CRUD requirement declared by the root's `NavigationRestrictions` for the
/// navigation path formed by `segments`. With `by_key`, GET also accepts the
/// entry's read-by-key permissions.
pub fn nested_crud(segments: &[Segment<'_>], by_key: bool, method: &Method) -> Option<AnyOf> {
    nested(segments, |entry| {
        let kind = match method {
            Method::Get => return read_restriction(entry.read.as_ref(), by_key),
            Method::Post => entry.insert.as_ref(),
            Method::Put | Method::Patch | Method::Merge => entry.update.as_ref(),
            Method::Delete => entry.delete.as_ref(),
            Method::Other(_) => None,
        };
        kind.map(|restriction| AnyOf::permissions(&restriction.permissions))
    })
}

/// Property-level requirement declared by the root's
/// `NavigationRestrictions`: GET reads, every mutation is an update.
pub fn nested_property(segments: &[Segment<'_>], by_key: bool, method: &Method) -> Option<AnyOf> {
    nested(segments, |entry| match method {
        Method::Get => read_restriction(entry.read.as_ref(), by_key),
        method if method.is_mutating() => entry
            .update
            .as_ref()
            .map(|restriction| AnyOf::permissions(&restriction.permissions)),
        _ => None,
    })
}
