use thiserror::Error;

use super::NodeId;

/// Structural misuse of a [`LayoutTree`](super::LayoutTree).
///
/// These indicate a broken tree-building invariant, not bad input; callers
/// are expected to propagate them to the top and abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("node {child} already has a parent ({parent})")]
    AlreadyAttached { child: NodeId, parent: NodeId },

    #[error("node {0} is not a container and cannot hold children")]
    NotAContainer(NodeId),

    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("node {0} is not a content block")]
    NotABlock(NodeId),
}
