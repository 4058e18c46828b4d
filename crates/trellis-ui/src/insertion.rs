//! Resolution of host insertion points across owning and non-owning
//! fragments.
//!
//! Only fragments owning a mounted host node can serve as an insertion
//! reference. Everything else is looked through: a non-owning fragment is
//! searched for its first owning mounted descendant, an unmounted owning
//! fragment is skipped entirely, and when a fragment yields nothing the
//! search moves on to its next sibling and finally to the parent's append
//! point.

use trellis_core::HostNodeId;

use crate::tree::{Arena, FragmentData, FragmentId, NodeKind};

/// Where a host node should be attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Position {
    /// Insert right before this host node.
    Before(HostNodeId),
    /// Append as the last child of this host element.
    Append(HostNodeId),
}

pub(crate) fn fragment(nodes: &Arena, id: FragmentId) -> Option<&FragmentData> {
    nodes.get(id)
}

/// Position for a host node that must land right before fragment `id`.
pub(crate) fn insert_position(
    nodes: &Arena,
    id: FragmentId,
) -> Option<Position> {
    let data = fragment(nodes, id)?;
    match &data.kind {
        NodeKind::Host(slot) if slot.mounted => return Some(Position::Before(slot.node)),
        NodeKind::Host(_) => {}
        NodeKind::Plain | NodeKind::Switch(_) => {
            if let Some(node) = first_host_descendant(nodes, id) {
                return Some(Position::Before(node));
            }
        }
    }
    position_after(nodes, id)
}

/// Position for a host node appended as the last content of fragment `id`.
pub(crate) fn append_position(
    nodes: &Arena,
    id: FragmentId,
) -> Option<Position> {
    let data = fragment(nodes, id)?;
    match &data.kind {
        NodeKind::Host(slot) => Some(Position::Append(slot.node)),
        NodeKind::Plain | NodeKind::Switch(_) => position_after(nodes, id),
    }
}

/// Position for content placed right after fragment `id`: in front of the
/// next sibling's content, or at the end of the parent.
pub(crate) fn position_after(
    nodes: &Arena,
    id: FragmentId,
) -> Option<Position> {
    let data = fragment(nodes, id)?;
    match data.next {
        Some(next) => insert_position(nodes, next),
        None => append_position(nodes, data.parent?),
    }
}

/// First mounted host node owned by a descendant of `id`, in order.
/// Owning children are never searched below.
pub(crate) fn first_host_descendant(
    nodes: &Arena,
    id: FragmentId,
) -> Option<HostNodeId> {
    let data = fragment(nodes, id)?;
    data.children.iter().find_map(|child| {
        let child_data = fragment(nodes, *child)?;
        match &child_data.kind {
            NodeKind::Host(slot) if slot.mounted => Some(slot.node),
            NodeKind::Host(_) => None,
            NodeKind::Plain | NodeKind::Switch(_) => first_host_descendant(nodes, *child),
        }
    })
}

#[cfg(test)]
#[path = "tests/insertion_tests.rs"]
mod tests;
