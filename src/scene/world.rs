//! Scene arena built on hecs
//!
//! Nodes, behaviors and graph registries are all entities of one
//! [`hecs::World`]. Every relation between them (child → parent,
//! behavior → owner, node → graph) is a typed handle, so nothing keeps
//! anything else alive and a despawned target is detected on lookup.
//!
//! Mutations take `&mut self`. There is no interior locking; sharing a scene
//! across threads requires an outer lock.

use glam::{Mat4, Quat, Vec3};

use super::behavior::{Behavior, BehaviorLabel, BehaviorOwner};
use super::error::{Conflict, SceneError};
use super::graph::SceneGraph;
use super::handle::{BehaviorId, GraphId, NodeId};
use super::hierarchy::subtree_height;
use super::node::SceneNode;
use crate::core::SceneConfig;
use crate::math::SrtTransform;

/// Arena owning every node, behavior and graph of a scene
pub struct Scene {
    /// The underlying hecs world
    inner: hecs::World,
    config: SceneConfig,
}

impl Scene {
    /// Create an empty scene with the default configuration
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Create an empty scene
    pub fn with_config(config: SceneConfig) -> Self {
        log::info!("Creating scene: {}", config.name);
        Self {
            inner: hecs::World::new(),
            config,
        }
    }

    /// Get the scene configuration
    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Get the scene name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Despawn everything
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    // -------------------------------------------------------------------------
    // Nodes
    // -------------------------------------------------------------------------

    /// Spawn an unnamed, detached node with identity transforms
    pub fn spawn_node(&mut self) -> NodeId {
        self.spawn_named_node(String::new())
    }

    /// Spawn a detached node with identity transforms
    pub fn spawn_named_node(&mut self, name: impl Into<String>) -> NodeId {
        let node = NodeId(self.inner.spawn((SceneNode::new(name),)));
        log::debug!("Spawned {node}");
        node
    }

    /// Despawn a node.
    ///
    /// The node is removed from its graph and its behaviors are despawned with
    /// it. Children are left untouched: their parent handle dangles until they
    /// are reparented.
    pub fn despawn_node(&mut self, node: NodeId) -> Result<(), SceneError> {
        let (graph, behaviors) = {
            let n = self.node(node)?;
            (n.graph, n.behaviors.clone())
        };

        if let Some(graph) = graph {
            self.remove_object(graph, node)?;
        }
        for behavior in behaviors {
            if self.inner.despawn(behavior.0).is_err() {
                unreachable!("{node} lists {behavior}, which no longer exists");
            }
        }

        self.inner
            .despawn(node.0)
            .map_err(|_| SceneError::NoSuchNode(node))?;
        log::debug!("Despawned {node}");
        Ok(())
    }

    /// Check if a handle names a live node
    #[must_use]
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.inner.get::<&SceneNode>(node.0).is_ok()
    }

    /// Get a node
    pub fn node(&self, node: NodeId) -> Result<hecs::Ref<'_, SceneNode>, SceneError> {
        self.inner
            .get::<&SceneNode>(node.0)
            .map_err(|_| SceneError::NoSuchNode(node))
    }

    fn node_mut(&self, node: NodeId) -> Result<hecs::RefMut<'_, SceneNode>, SceneError> {
        self.inner
            .get::<&mut SceneNode>(node.0)
            .map_err(|_| SceneError::NoSuchNode(node))
    }

    /// Rename a node
    pub fn set_node_name(&mut self, node: NodeId, name: impl Into<String>) -> Result<(), SceneError> {
        self.node_mut(node)?.name = name.into();
        Ok(())
    }

    /// All live nodes, ordered by entity index
    #[must_use]
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self
            .inner
            .query::<&SceneNode>()
            .iter()
            .map(|(entity, _)| NodeId(entity))
            .collect();
        nodes.sort_by_key(|n| n.0.id());
        nodes
    }

    /// Get the number of live nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.query::<&SceneNode>().iter().count()
    }

    /// Every node paired with its parent handle, ordered by entity index
    pub(crate) fn parent_links(&self) -> Vec<(NodeId, Option<NodeId>)> {
        let mut links: Vec<(NodeId, Option<NodeId>)> = self
            .inner
            .query::<&SceneNode>()
            .iter()
            .map(|(entity, node)| (NodeId(entity), node.parent))
            .collect();
        links.sort_by_key(|(n, _)| n.0.id());
        links
    }

    // -------------------------------------------------------------------------
    // Hierarchy
    // -------------------------------------------------------------------------

    /// Get the parent handle of a node
    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>, SceneError> {
        Ok(self.node(node)?.parent)
    }

    /// Set or clear the parent of a node.
    ///
    /// The local transform is kept and the world transform is re-derived from
    /// the new parent. Descendants of `child` are not updated.
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> Result<(), SceneError> {
        self.node(child)?;

        if let Some(parent) = parent {
            self.node(parent)?;
            self.check_ancestry(child, parent)?;
        }

        self.node_mut(child)?.parent = parent;
        match parent {
            Some(parent) => log::debug!("Parented {child} to {parent}"),
            None => log::debug!("Unparented {child}"),
        }
        self.update_world_transform(child)
    }

    /// Reject parent chains that loop back to `child`, or that would push the
    /// deepest node under `child` past the depth limit.
    fn check_ancestry(&self, child: NodeId, parent: NodeId) -> Result<(), SceneError> {
        let mut ancestors = 0usize;
        let mut cursor = Some(parent);

        while let Some(current) = cursor {
            if current == child {
                return Err(SceneError::HierarchyCycle {
                    node: child,
                    parent,
                });
            }
            ancestors += 1;
            // A despawned ancestor ends the chain.
            cursor = self
                .inner
                .get::<&SceneNode>(current.0)
                .ok()
                .and_then(|n| n.parent);
        }

        let limit = self.config.max_hierarchy_depth;
        if ancestors + subtree_height(self, child) > limit {
            return Err(SceneError::HierarchyTooDeep { node: child, limit });
        }
        Ok(())
    }

    /// World transform of the node's parent, if it has one.
    fn parent_world(&self, node: NodeId) -> Result<Option<SrtTransform>, SceneError> {
        let parent = self.node(node)?.parent;
        match parent {
            Some(parent) => match self.inner.get::<&SceneNode>(parent.0) {
                Ok(p) => Ok(Some(p.world_transform())),
                Err(_) => Err(SceneError::DanglingParent { node, parent }),
            },
            None => Ok(None),
        }
    }

    // -------------------------------------------------------------------------
    // Transforms
    // -------------------------------------------------------------------------

    /// Get the local transform of a node
    pub fn local_transform(&self, node: NodeId) -> Result<SrtTransform, SceneError> {
        Ok(self.node(node)?.local_transform())
    }

    /// Get the cached world transform of a node
    pub fn world_transform(&self, node: NodeId) -> Result<SrtTransform, SceneError> {
        Ok(self.node(node)?.world_transform())
    }

    /// Get the cached world matrix of a node
    pub fn world_matrix(&self, node: NodeId) -> Result<Mat4, SceneError> {
        Ok(self.node(node)?.world_matrix())
    }

    /// Re-derive a node's world transform from its local transform and its
    /// parent's current world transform.
    ///
    /// This is the only way a child observes a change made to its parent.
    pub fn update_world_transform(&mut self, node: NodeId) -> Result<(), SceneError> {
        let parent_world = self.parent_world(node)?;
        self.node_mut(node)?
            .update_world_transform(parent_world.as_ref());
        Ok(())
    }

    fn write_node(
        &mut self,
        node: NodeId,
        write: impl FnOnce(&mut SceneNode, Option<&SrtTransform>) -> bool,
    ) -> Result<bool, SceneError> {
        let parent_world = self.parent_world(node)?;
        let mut target = self.node_mut(node)?;
        let changed = write(&mut *target, parent_world.as_ref());
        if changed {
            log::trace!(
                "{node} local {:?} world {:?}",
                target.local_transform(),
                target.world_transform()
            );
        }
        Ok(changed)
    }

    /// Set the world transform; returns whether anything was written
    pub fn set_world_transform(
        &mut self,
        node: NodeId,
        value: SrtTransform,
    ) -> Result<bool, SceneError> {
        self.write_node(node, |n, parent| n.set_world_transform(value, parent))
    }

    /// Set the world location; returns whether anything was written
    pub fn set_world_location(&mut self, node: NodeId, value: Vec3) -> Result<bool, SceneError> {
        self.write_node(node, |n, parent| n.set_world_location(value, parent))
    }

    /// Set the world rotation; returns whether anything was written
    pub fn set_world_rotation(&mut self, node: NodeId, value: Quat) -> Result<bool, SceneError> {
        self.write_node(node, |n, parent| n.set_world_rotation(value, parent))
    }

    /// Set the world scale.
    ///
    /// The write is skipped when `value` equals the node's current *local*
    /// scale.
    pub fn set_world_scale(&mut self, node: NodeId, value: Vec3) -> Result<bool, SceneError> {
        self.write_node(node, |n, parent| n.set_world_scale(value, parent))
    }

    /// Set the local transform; returns whether anything was written
    pub fn set_local_transform(
        &mut self,
        node: NodeId,
        value: SrtTransform,
    ) -> Result<bool, SceneError> {
        self.write_node(node, |n, parent| n.set_local_transform(value, parent))
    }

    /// Set the local location; returns whether anything was written
    pub fn set_local_location(&mut self, node: NodeId, value: Vec3) -> Result<bool, SceneError> {
        self.write_node(node, |n, parent| n.set_local_location(value, parent))
    }

    /// Set the local rotation; returns whether anything was written
    pub fn set_local_rotation(&mut self, node: NodeId, value: Quat) -> Result<bool, SceneError> {
        self.write_node(node, |n, parent| n.set_local_rotation(value, parent))
    }

    /// Set the local scale; returns whether anything was written
    pub fn set_local_scale(&mut self, node: NodeId, value: Vec3) -> Result<bool, SceneError> {
        self.write_node(node, |n, parent| n.set_local_scale(value, parent))
    }

    // -------------------------------------------------------------------------
    // Behaviors
    // -------------------------------------------------------------------------

    /// Store a behavior in the scene, unattached
    pub fn spawn_behavior<B: Behavior>(&mut self, behavior: B) -> BehaviorId {
        let label = BehaviorLabel(behavior.label());
        let id = BehaviorId(self.inner.spawn((behavior, BehaviorOwner(None), label)));
        log::debug!("Spawned {id}");
        id
    }

    /// Detach a behavior from its owner (if any) and despawn it
    pub fn despawn_behavior(&mut self, behavior: BehaviorId) -> Result<(), SceneError> {
        if let Some(owner) = self.behavior_owner(behavior)? {
            self.remove_behavior(owner, behavior)?;
        }
        self.inner
            .despawn(behavior.0)
            .map_err(|_| SceneError::NoSuchBehavior(behavior))?;
        log::debug!("Despawned {behavior}");
        Ok(())
    }

    /// Get a behavior's value
    pub fn behavior<B: Behavior>(&self, behavior: BehaviorId) -> Result<hecs::Ref<'_, B>, SceneError> {
        self.inner
            .get::<&B>(behavior.0)
            .map_err(|_| SceneError::NoSuchBehavior(behavior))
    }

    /// Get a behavior's value mutably
    pub fn behavior_mut<B: Behavior>(
        &mut self,
        behavior: BehaviorId,
    ) -> Result<hecs::RefMut<'_, B>, SceneError> {
        self.inner
            .get::<&mut B>(behavior.0)
            .map_err(|_| SceneError::NoSuchBehavior(behavior))
    }

    /// Get the node that owns a behavior
    pub fn behavior_owner(&self, behavior: BehaviorId) -> Result<Option<NodeId>, SceneError> {
        self.inner
            .get::<&BehaviorOwner>(behavior.0)
            .map(|owner| owner.node())
            .map_err(|_| SceneError::NoSuchBehavior(behavior))
    }

    /// Get the label recorded when the behavior was spawned
    pub fn behavior_label(&self, behavior: BehaviorId) -> Result<String, SceneError> {
        self.inner
            .get::<&BehaviorLabel>(behavior.0)
            .map(|label| label.0.to_string())
            .map_err(|_| SceneError::NoSuchBehavior(behavior))
    }

    fn owner_mut(&self, behavior: BehaviorId) -> Result<hecs::RefMut<'_, BehaviorOwner>, SceneError> {
        self.inner
            .get::<&mut BehaviorOwner>(behavior.0)
            .map_err(|_| SceneError::NoSuchBehavior(behavior))
    }

    /// Attach a behavior to a node.
    ///
    /// Attaching to the current owner is a no-op. Fails without changing
    /// anything if another node owns the behavior.
    pub fn add_behavior(&mut self, node: NodeId, behavior: BehaviorId) -> Result<(), SceneError> {
        self.node(node)?;
        match self.behavior_owner(behavior)? {
            Some(owner) if owner == node => return Ok(()),
            Some(owner) => {
                return Err(SceneError::OwnershipConflict(Conflict::Behavior {
                    behavior,
                    owner,
                }));
            }
            None => {}
        }

        self.node_mut(node)?.behaviors.push(behavior);
        self.owner_mut(behavior)?.0 = Some(node);
        log::debug!("Attached {behavior} to {node}");
        Ok(())
    }

    /// Detach a behavior from a node. No-op unless `node` owns it.
    pub fn remove_behavior(&mut self, node: NodeId, behavior: BehaviorId) -> Result<(), SceneError> {
        if self.behavior_owner(behavior)? != Some(node) {
            return Ok(());
        }

        {
            let mut owner = self.node_mut(node)?;
            let Some(pos) = owner.behaviors.iter().position(|&b| b == behavior) else {
                unreachable!("{behavior} names {node} as owner but is missing from its list");
            };
            owner.behaviors.remove(pos);
        }
        self.owner_mut(behavior)?.0 = None;
        log::debug!("Detached {behavior} from {node}");
        Ok(())
    }

    /// Detach every behavior from a node in one pass
    pub fn remove_all_behaviors(&mut self, node: NodeId) -> Result<(), SceneError> {
        let behaviors = std::mem::take(&mut self.node_mut(node)?.behaviors);
        for &behavior in &behaviors {
            match self.inner.get::<&mut BehaviorOwner>(behavior.0) {
                Ok(mut owner) => owner.0 = None,
                Err(_) => unreachable!("{node} lists {behavior}, which no longer exists"),
            }
        }
        log::debug!("Detached {} behaviors from {node}", behaviors.len());
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Graphs
    // -------------------------------------------------------------------------

    /// Create an empty graph registry
    pub fn spawn_graph(&mut self, name: impl Into<String>) -> GraphId {
        let graph = GraphId(self.inner.spawn((SceneGraph::new(name),)));
        log::debug!("Spawned {graph}");
        graph
    }

    /// Release every node from a graph and despawn it
    pub fn despawn_graph(&mut self, graph: GraphId) -> Result<(), SceneError> {
        self.remove_all_objects(graph)?;
        self.inner
            .despawn(graph.0)
            .map_err(|_| SceneError::NoSuchGraph(graph))?;
        log::debug!("Despawned {graph}");
        Ok(())
    }

    /// Get a graph registry
    pub fn graph(&self, graph: GraphId) -> Result<hecs::Ref<'_, SceneGraph>, SceneError> {
        self.inner
            .get::<&SceneGraph>(graph.0)
            .map_err(|_| SceneError::NoSuchGraph(graph))
    }

    fn graph_mut(&self, graph: GraphId) -> Result<hecs::RefMut<'_, SceneGraph>, SceneError> {
        self.inner
            .get::<&mut SceneGraph>(graph.0)
            .map_err(|_| SceneError::NoSuchGraph(graph))
    }

    /// All graphs, ordered by entity index
    #[must_use]
    pub fn graphs(&self) -> Vec<GraphId> {
        let mut graphs: Vec<GraphId> = self
            .inner
            .query::<&SceneGraph>()
            .iter()
            .map(|(entity, _)| GraphId(entity))
            .collect();
        graphs.sort_by_key(|g| g.0.id());
        graphs
    }

    /// Register a node in a graph.
    ///
    /// Registering twice in the same graph is a no-op. Fails without changing
    /// anything if the node belongs to another graph.
    pub fn add_object(&mut self, graph: GraphId, node: NodeId) -> Result<(), SceneError> {
        self.graph(graph)?;
        match self.node(node)?.graph {
            Some(current) if current == graph => return Ok(()),
            Some(current) => {
                return Err(SceneError::OwnershipConflict(Conflict::Node {
                    node,
                    graph: current,
                }));
            }
            None => {}
        }

        self.graph_mut(graph)?.objects.push(node);
        self.node_mut(node)?.graph = Some(graph);
        log::debug!("Added {node} to {graph}");
        Ok(())
    }

    /// Unregister a node. No-op unless the node belongs to `graph`.
    pub fn remove_object(&mut self, graph: GraphId, node: NodeId) -> Result<(), SceneError> {
        self.graph(graph)?;
        if self.node(node)?.graph != Some(graph) {
            return Ok(());
        }

        if !self.graph_mut(graph)?.remove(node) {
            unreachable!("{node} names {graph} as its graph but is missing from its registry");
        }
        self.node_mut(node)?.graph = None;
        log::debug!("Removed {node} from {graph}");
        Ok(())
    }

    /// Unregister every node of a graph in one pass
    pub fn remove_all_objects(&mut self, graph: GraphId) -> Result<(), SceneError> {
        let objects = std::mem::take(&mut self.graph_mut(graph)?.objects);
        for &node in &objects {
            match self.inner.get::<&mut SceneNode>(node.0) {
                Ok(mut n) => n.graph = None,
                Err(_) => unreachable!("{graph} lists {node}, which no longer exists"),
            }
        }
        log::debug!("Removed {} nodes from {graph}", objects.len());
        Ok(())
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
