//! Graph registry of top-level nodes
//!
//! A [`SceneGraph`] is an ordered, duplicate-free list of node handles. The
//! registry and each node's membership back-reference are only ever changed
//! together by [`Scene`](super::Scene), so a node is in at most one graph.

use super::handle::NodeId;

/// Ordered registry of nodes
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    /// Display name, used in logs and snapshots
    pub name: String,
    pub(crate) objects: Vec<NodeId>,
}

impl SceneGraph {
    /// Create an empty registry.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Vec::new(),
        }
    }

    /// Registered nodes in insertion order.
    #[must_use]
    #[inline]
    pub fn objects(&self) -> &[NodeId] {
        &self.objects
    }

    /// Check if a node is registered here
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.objects.contains(&node)
    }

    /// Get the number of registered nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Remove `node`, returning whether it was present.
    pub(crate) fn remove(&mut self, node: NodeId) -> bool {
        if let Some(pos) = self.objects.iter().position(|&n| n == node) {
            self.objects.remove(pos);
            true
        } else {
            false
        }
    }
}
