//! Scene snapshots
//!
//! Captures node names, local transforms, parent links and graph membership
//! into a plain serializable value, and rebuilds a [`Scene`] from one.
//! Supports RON (Rusty Object Notation) and JSON. Behaviors are not captured.

use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::config::SceneConfig;
use crate::math::SrtTransform;
use crate::scene::{NodeId, Scene, SceneError, parent_first_order, update_hierarchy};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// A captured node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedNode {
    /// Node name
    #[serde(default)]
    pub name: String,
    /// Local transform
    #[serde(default)]
    pub local: SrtTransform,
    /// Index of the parent node in the snapshot (if any)
    #[serde(default)]
    pub parent_index: Option<usize>,
}

impl Default for SerializedNode {
    fn default() -> Self {
        Self {
            name: String::new(),
            local: SrtTransform::IDENTITY,
            parent_index: None,
        }
    }
}

/// A captured graph registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SerializedGraph {
    /// Graph name
    pub name: String,
    /// Indices of the registered nodes, in registration order
    #[serde(default)]
    pub objects: Vec<usize>,
}

/// A serializable scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Scene name
    pub name: String,
    /// Snapshot version for compatibility
    pub version: u32,
    /// All nodes, parents listed before their children
    pub nodes: Vec<SerializedNode>,
    /// All graph registries
    #[serde(default)]
    pub graphs: Vec<SerializedGraph>,
}

impl SceneSnapshot {
    /// Create a new empty snapshot
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: SNAPSHOT_VERSION,
            nodes: Vec::new(),
            graphs: Vec::new(),
        }
    }

    /// Add a node to the snapshot
    pub fn add_node(&mut self, node: SerializedNode) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        index
    }

    /// Capture the current state of a scene.
    ///
    /// Nodes whose parent handle dangles are captured as roots.
    pub fn capture(scene: &Scene) -> Result<Self, SnapshotError> {
        let order = parent_first_order(scene);

        let index: FxHashMap<NodeId, usize> =
            order.iter().enumerate().map(|(i, &n)| (n, i)).collect();

        let mut snapshot = Self::new(scene.name());
        for &id in &order {
            let node = scene.node(id)?;
            snapshot.add_node(SerializedNode {
                name: node.name.clone(),
                local: node.local_transform(),
                parent_index: node.parent().and_then(|p| index.get(&p).copied()),
            });
        }

        for graph_id in scene.graphs() {
            let graph = scene.graph(graph_id)?;
            snapshot.graphs.push(SerializedGraph {
                name: graph.name.clone(),
                objects: graph
                    .objects()
                    .iter()
                    .filter_map(|n| index.get(n).copied())
                    .collect(),
            });
        }

        log::debug!(
            "Captured snapshot of {}: {} nodes, {} graphs",
            snapshot.name,
            snapshot.nodes.len(),
            snapshot.graphs.len()
        );
        Ok(snapshot)
    }

    /// Build a new scene from this snapshot with the default configuration
    pub fn restore(&self) -> Result<(Scene, Vec<NodeId>), SnapshotError> {
        self.restore_with_config(SceneConfig::default())
    }

    /// Build a new scene from this snapshot.
    ///
    /// The scene takes the snapshot's name. Returns the scene and the node
    /// handles in snapshot order. World transforms are derived for every
    /// node before returning.
    pub fn restore_with_config(
        &self,
        config: SceneConfig,
    ) -> Result<(Scene, Vec<NodeId>), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            log::warn!(
                "Snapshot {} has version {}, expected {SNAPSHOT_VERSION}",
                self.name,
                self.version
            );
        }

        let mut scene = Scene::with_config(config.with_name(self.name.clone()));
        let nodes: Vec<NodeId> = self
            .nodes
            .iter()
            .map(|n| scene.spawn_named_node(n.name.clone()))
            .collect();

        for (serialized, &id) in self.nodes.iter().zip(&nodes) {
            scene.set_local_transform(id, serialized.local)?;
        }
        for (serialized, &id) in self.nodes.iter().zip(&nodes) {
            if let Some(parent) = serialized.parent_index {
                let parent = *nodes.get(parent).ok_or(SnapshotError::InvalidIndex(parent))?;
                scene.set_parent(id, Some(parent))?;
            }
        }

        for serialized in &self.graphs {
            let graph = scene.spawn_graph(serialized.name.clone());
            for &index in &serialized.objects {
                let node = *nodes.get(index).ok_or(SnapshotError::InvalidIndex(index))?;
                scene.add_object(graph, node)?;
            }
        }

        update_hierarchy(&mut scene)?;
        log::info!("Restored scene {} ({} nodes)", self.name, nodes.len());
        Ok((scene, nodes))
    }

    /// Serialize to a pretty-printed RON string
    pub fn to_ron_string(&self) -> Result<String, SnapshotError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SnapshotError::SerializeError(e.to_string()))
    }

    /// Parse a snapshot from RON text
    pub fn from_ron_str(text: &str) -> Result<Self, SnapshotError> {
        ron::from_str(text).map_err(|e| SnapshotError::DeserializeError(e.to_string()))
    }

    /// Serialize to a pretty-printed JSON string
    pub fn to_json_string(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::SerializeError(e.to_string()))
    }

    /// Parse a snapshot from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(text).map_err(|e| SnapshotError::DeserializeError(e.to_string()))
    }

    /// Save the snapshot to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let ron_string = self.to_ron_string()?;
        fs::write(path, ron_string).map_err(|e| SnapshotError::IoError(e.to_string()))
    }

    /// Load a snapshot from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let content = fs::read_to_string(path).map_err(|e| SnapshotError::IoError(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Save the snapshot to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let json_string = self.to_json_string()?;
        fs::write(path, json_string).map_err(|e| SnapshotError::IoError(e.to_string()))
    }

    /// Load a snapshot from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let content = fs::read_to_string(path).map_err(|e| SnapshotError::IoError(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Get the number of nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the snapshot is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for SceneSnapshot {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Errors that can occur while saving or restoring a snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// A parent or graph entry points past the node list
    InvalidIndex(usize),
    /// The scene rejected the snapshot's structure
    Scene(SceneError),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::InvalidIndex(i) => write!(f, "Node index {i} out of range"),
            Self::Scene(e) => write!(f, "Scene error: {e}"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Scene(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SceneError> for SnapshotError {
    fn from(e: SceneError) -> Self {
        Self::Scene(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    fn sample_scene() -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::with_config(SceneConfig::default().with_name("Test Scene"));
        let child = scene.spawn_named_node("Child");
        let root = scene.spawn_named_node("Root");
        scene.set_local_location(root, Vec3::new(10.0, 0.0, 0.0)).unwrap();
        scene
            .set_local_rotation(root, Quat::from_rotation_y(0.5))
            .unwrap();
        scene.set_local_location(child, Vec3::new(1.0, 2.0, 3.0)).unwrap();
        scene.set_parent(child, Some(root)).unwrap();

        let graph = scene.spawn_graph("Main");
        scene.add_object(graph, child).unwrap();
        scene.add_object(graph, root).unwrap();
        (scene, root, child)
    }

    #[test]
    fn test_capture_orders_parents_first() {
        let (scene, _, _) = sample_scene();
        let snapshot = SceneSnapshot::capture(&scene).unwrap();

        assert_eq!(snapshot.name, "Test Scene");
        assert_eq!(snapshot.node_count(), 2);
        assert_eq!(snapshot.nodes[0].name, "Root");
        assert_eq!(snapshot.nodes[0].parent_index, None);
        assert_eq!(snapshot.nodes[1].name, "Child");
        assert_eq!(snapshot.nodes[1].parent_index, Some(0));
        assert_eq!(snapshot.graphs.len(), 1);
        assert_eq!(snapshot.graphs[0].objects, vec![1, 0]);
    }

    #[test]
    fn test_restore_rebuilds_world_transforms() {
        let (mut scene, _, child) = sample_scene();
        update_hierarchy(&mut scene).unwrap();
        let expected = scene.world_transform(child).unwrap();

        let snapshot = SceneSnapshot::capture(&scene).unwrap();
        let (restored, nodes) = snapshot.restore().unwrap();

        assert_eq!(restored.name(), "Test Scene");
        assert_eq!(restored.node_count(), 2);
        assert_eq!(restored.parent(nodes[1]).unwrap(), Some(nodes[0]));
        let world = restored.world_transform(nodes[1]).unwrap();
        assert!(world.abs_diff_eq(&expected, 1e-5));

        let graphs = restored.graphs();
        assert_eq!(graphs.len(), 1);
        assert_eq!(restored.graph(graphs[0]).unwrap().objects(), &[nodes[1], nodes[0]]);
    }

    #[test]
    fn test_snapshot_serialization_ron() {
        let (scene, _, _) = sample_scene();
        let snapshot = SceneSnapshot::capture(&scene).unwrap();

        let ron_str = snapshot.to_ron_string().unwrap();
        assert!(ron_str.contains("Child"));

        let loaded = SceneSnapshot::from_ron_str(&ron_str).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_snapshot_serialization_json() {
        let mut snapshot = SceneSnapshot::new("JSON Test");
        snapshot.add_node(SerializedNode {
            name: "Enemy".to_string(),
            local: SrtTransform::from_location(Vec3::X),
            ..Default::default()
        });

        let json_str = snapshot.to_json_string().unwrap();
        let loaded = SceneSnapshot::from_json_str(&json_str).unwrap();
        assert_eq!(loaded.name, "JSON Test");
        assert_eq!(loaded.nodes[0].local.location, Vec3::X);
    }

    #[test]
    fn test_restore_rejects_bad_parent_index() {
        let mut snapshot = SceneSnapshot::new("Broken");
        snapshot.add_node(SerializedNode {
            parent_index: Some(7),
            ..Default::default()
        });
        assert_eq!(snapshot.restore().err(), Some(SnapshotError::InvalidIndex(7)));
    }

    #[test]
    fn test_restore_rejects_cycle() {
        let mut snapshot = SceneSnapshot::new("Loop");
        snapshot.add_node(SerializedNode {
            parent_index: Some(1),
            ..Default::default()
        });
        snapshot.add_node(SerializedNode {
            parent_index: Some(0),
            ..Default::default()
        });
        assert!(matches!(
            snapshot.restore().err(),
            Some(SnapshotError::Scene(SceneError::HierarchyCycle { .. }))
        ));
    }

    #[test]
    fn test_capture_dangling_subtree_keeps_parents_first() {
        let mut scene = Scene::new();
        let gone = scene.spawn_named_node("gone");
        // Spawned before its parent, so it has the lower entity index.
        let grandchild = scene.spawn_named_node("grandchild");
        let child = scene.spawn_named_node("child");
        scene.set_parent(child, Some(gone)).unwrap();
        scene.set_parent(grandchild, Some(child)).unwrap();
        scene.despawn_node(gone).unwrap();

        let snapshot = SceneSnapshot::capture(&scene).unwrap();
        assert_eq!(snapshot.node_count(), 2);
        assert_eq!(snapshot.nodes[0].name, "child");
        assert_eq!(snapshot.nodes[0].parent_index, None);
        assert_eq!(snapshot.nodes[1].name, "grandchild");
        assert_eq!(snapshot.nodes[1].parent_index, Some(0));

        let (restored, nodes) = snapshot.restore().unwrap();
        assert_eq!(restored.parent(nodes[1]).unwrap(), Some(nodes[0]));
    }

    #[test]
    fn test_capture_dangling_child_as_root() {
        let (mut scene, root, _) = sample_scene();
        scene.despawn_node(root).unwrap();

        let snapshot = SceneSnapshot::capture(&scene).unwrap();
        assert_eq!(snapshot.node_count(), 1);
        assert_eq!(snapshot.nodes[0].parent_index, None);
        assert_eq!(snapshot.graphs[0].objects, vec![0]);
    }
}
