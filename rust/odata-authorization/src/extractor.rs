//! Derives the permission requirement of a request from the restrictions
//! declared on the schema nodes its path touches.
//!
//! Each significant segment contributes at most one [`AnyOf`] to the
//! resulting [`AllOf`]. A segment whose applicable restrictions are all
//! undeclared contributes nothing; a declared restriction with no
//! permissions contributes an empty `AnyOf`, which denies.
//!
//! Some segments defer to the segment that follows them: a collection or
//! navigation followed by a key is judged at the key, and anything followed
//! by an operation is judged by the operation alone.

use crate::lookup::{
    entity_crud, entity_property, nested_crud, nested_property, operation, singleton_property,
    source_crud,
};
use crate::{AllOf, AnyOf, Method, RequestPath, Segment};

/// Build the requirement `method` on `path` has to satisfy.
///
/// An empty result means nothing on the path is restricted.
pub fn extract_permissions(method: &Method, path: &RequestPath<'_>) -> AllOf {
    let segments = path.segments();
    let mut requirements = AllOf::new();
    if segments.is_empty() {
        return requirements;
    }

    let last = if path.is_reference_link() {
        reference_target(segments)
    } else {
        segments.len() - 1
    };

    let mut seen: Vec<Segment<'_>> = Vec::new();
    let mut previous: Option<&Segment<'_>> = None;

    for (index, segment) in segments.iter().enumerate().take(last + 1) {
        if !segment.is_significant() {
            continue;
        }
        let parent = previous.replace(segment);
        seen.push(segment.clone());

        let next_is_key = next_is(segments, index, |next| matches!(next, Segment::Key(_)));
        let next_is_operation = next_is(segments, index, Segment::is_operation);
        let property_access = next_is(segments, index, |next| {
            matches!(
                next,
                Segment::Property(_) | Segment::NavigationLink { .. } | Segment::Navigation { .. }
            )
        });

        let requirement = match segment {
            Segment::Collection(source) => {
                if next_is_key || next_is_operation {
                    continue;
                }
                nested_crud(&seen, false, method)
                    .or_else(|| source_crud(source.capabilities(), method))
            }
            Segment::Singleton(source) => {
                if next_is_operation {
                    continue;
                }
                if property_access {
                    singleton_property(source.capabilities(), method)
                } else {
                    source_crud(source.capabilities(), method)
                }
            }
            Segment::Key(source) => {
                if next_is_operation {
                    continue;
                }
                let own = if property_access {
                    entity_property(source.capabilities(), method)
                } else {
                    entity_crud(source.capabilities(), method)
                };
                let nested = match parent {
                    Some(Segment::Navigation { .. }) if property_access => {
                        nested_property(&seen, true, method)
                    }
                    Some(Segment::Navigation { .. }) => nested_crud(&seen, true, method),
                    _ => None,
                };
                either(own, nested)
            }
            Segment::Navigation { target, .. } => {
                if next_is_key || next_is_operation {
                    continue;
                }
                either(
                    source_crud(target.capabilities(), method),
                    nested_crud(&seen, false, method),
                )
            }
            Segment::BoundOperation(target) | Segment::UnboundOperation(target) => {
                operation(target.capabilities())
            }
            _ => None,
        };

        if let Some(requirement) = requirement {
            tracing::trace!(
                segment = segment.template(),
                alternatives = requirement.len(),
                "Segment is restricted"
            );
            requirements.add(requirement);
        }
    }

    tracing::debug!(
        %method,
        template = %path.template(),
        requirements = requirements.len(),
        "Extracted permission requirements"
    );
    requirements
}

/// For a `$ref` path, the index of the segment whose restrictions govern the
/// relationship: the nearest key, singleton or navigation before the last
/// segment.
fn reference_target(segments: &[Segment<'_>]) -> usize {
    let mut index = segments.len().saturating_sub(2);
    while index > 0
        && !matches!(
            segments[index],
            Segment::Key(_) | Segment::Singleton(_) | Segment::Navigation { .. }
        )
    {
        index -= 1;
    }
    index
}

/// Whether the segment after `index`, looking through one type cast,
/// satisfies `predicate`.
fn next_is<'s>(
    segments: &[Segment<'s>],
    index: usize,
    predicate: impl Fn(&Segment<'s>) -> bool,
) -> bool {
    match segments.get(index + 1) {
        Some(Segment::TypeCast(_)) => segments.get(index + 2).is_some_and(predicate),
        Some(next) => predicate(next),
        None => false,
    }
}

/// OR two optional requirements, keeping whichever are declared.
fn either(left: Option<AnyOf>, right: Option<AnyOf>) -> Option<AnyOf> {
    match (left, right) {
        (Some(left), Some(right)) => Some([left, right].into_iter().collect()),
        (left, None) => left,
        (None, right) => right,
    }
}
