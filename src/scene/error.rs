//! Scene error types

use super::handle::{BehaviorId, GraphId, NodeId};

/// An attempt to attach something that already has a different owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    /// The behavior is attached to another node
    Behavior {
        /// Behavior being attached
        behavior: BehaviorId,
        /// Node that currently owns it
        owner: NodeId,
    },
    /// The node is registered in another graph
    Node {
        /// Node being registered
        node: NodeId,
        /// Graph that currently holds it
        graph: GraphId,
    },
}

/// Errors that can occur during scene operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    /// Target already belongs to a different owner
    OwnershipConflict(Conflict),
    /// Handle does not name a live node
    NoSuchNode(NodeId),
    /// Handle does not name a live behavior
    NoSuchBehavior(BehaviorId),
    /// Handle does not name a live graph
    NoSuchGraph(GraphId),
    /// The node's parent handle points at a despawned node
    DanglingParent {
        /// Node holding the stale handle
        node: NodeId,
        /// Despawned parent
        parent: NodeId,
    },
    /// Parenting would make a node its own ancestor
    HierarchyCycle {
        /// Node being parented
        node: NodeId,
        /// Requested parent
        parent: NodeId,
    },
    /// Parenting would exceed the configured hierarchy depth
    HierarchyTooDeep {
        /// Node being parented
        node: NodeId,
        /// Configured maximum depth
        limit: usize,
    },
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Behavior { behavior, owner } => {
                write!(f, "{behavior} is already attached to {owner}")
            }
            Self::Node { node, graph } => write!(f, "{node} is already added to {graph}"),
        }
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OwnershipConflict(c) => write!(f, "Ownership conflict: {c}"),
            Self::NoSuchNode(id) => write!(f, "No such node: {id}"),
            Self::NoSuchBehavior(id) => write!(f, "No such behavior: {id}"),
            Self::NoSuchGraph(id) => write!(f, "No such graph: {id}"),
            Self::DanglingParent { node, parent } => {
                write!(f, "{node} refers to despawned parent {parent}")
            }
            Self::HierarchyCycle { node, parent } => {
                write!(f, "Parenting {node} to {parent} would create a cycle")
            }
            Self::HierarchyTooDeep { node, limit } => {
                write!(f, "Parenting {node} would exceed the hierarchy depth limit of {limit}")
            }
        }
    }
}

impl std::error::Error for SceneError {}
