//! Top-down transform propagation
//!
//! Nodes never push changes to their children. When a caller wants the
//! whole tree consistent again, these helpers call
//! [`Scene::update_world_transform`] on every node in level order, so each
//! parent is fresh before any of its children read it.
//!
//! Nodes whose parent handle dangles (the parent was despawned) cannot be
//! placed; they and everything below them are reported as skipped and keep
//! their cached transforms.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use super::error::SceneError;
use super::handle::NodeId;
use super::world::Scene;

/// Summary of a propagation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyUpdate {
    /// Number of nodes whose world transform was re-derived
    pub updated: usize,
    /// Nodes left untouched because an ancestor handle dangles
    pub skipped: Vec<NodeId>,
}

/// Child lists rebuilt from parent handles
struct Links {
    roots: Vec<NodeId>,
    /// Nodes whose parent handle names a despawned node
    detached: Vec<NodeId>,
    children: FxHashMap<NodeId, SmallVec<[NodeId; 8]>>,
    all: Vec<NodeId>,
}

impl Links {
    fn collect(scene: &Scene) -> Self {
        let links = scene.parent_links();
        let live: FxHashSet<NodeId> = links.iter().map(|&(node, _)| node).collect();
        let mut roots = Vec::new();
        let mut detached = Vec::new();
        let mut children: FxHashMap<NodeId, SmallVec<[NodeId; 8]>> = FxHashMap::default();
        let mut all = Vec::with_capacity(links.len());

        for &(node, parent) in &links {
            all.push(node);
            match parent {
                Some(parent) if live.contains(&parent) => {
                    children.entry(parent).or_default().push(node);
                }
                Some(_) => detached.push(node),
                None => roots.push(node),
            }
        }

        Self {
            roots,
            detached,
            children,
            all,
        }
    }

    /// Breadth-first batches starting from `start`.
    fn levels(&self, start: Vec<NodeId>) -> Vec<Vec<NodeId>> {
        let mut levels = Vec::new();
        let mut current = start;

        while !current.is_empty() {
            let mut next = Vec::new();
            for node in &current {
                if let Some(children) = self.children.get(node) {
                    next.extend(children.iter().copied());
                }
            }
            levels.push(current);
            current = next;
        }
        levels
    }
}

/// Nodes grouped by depth: roots first, then their children, and so on.
///
/// Nodes under a dangling parent handle are not included.
#[must_use]
pub fn level_order(scene: &Scene) -> Vec<Vec<NodeId>> {
    let links = Links::collect(scene);
    let roots = links.roots.clone();
    links.levels(roots)
}

/// Every node, parents before their children.
///
/// Rooted nodes come first in level order. Each subtree under a dangling
/// parent handle follows, walked as if its top node were a root.
pub(crate) fn parent_first_order(scene: &Scene) -> Vec<NodeId> {
    let links = Links::collect(scene);
    let mut order: Vec<NodeId> = links.levels(links.roots.clone()).into_iter().flatten().collect();
    order.extend(links.levels(links.detached.clone()).into_iter().flatten());
    order
}

/// Number of levels in the subtree under `root`, counting `root` itself.
pub(crate) fn subtree_height(scene: &Scene, root: NodeId) -> usize {
    Links::collect(scene).levels(vec![root]).len()
}

/// Re-derive every node's world transform, parents before children.
pub fn update_hierarchy(scene: &mut Scene) -> Result<HierarchyUpdate, SceneError> {
    let links = Links::collect(scene);
    let levels = links.levels(links.roots.clone());
    let updated = apply(scene, &levels)?;

    let mut skipped = Vec::new();
    if updated < links.all.len() {
        let visited: FxHashSet<NodeId> = levels.iter().flatten().copied().collect();
        skipped.extend(links.all.iter().copied().filter(|n| !visited.contains(n)));
        for node in &skipped {
            log::warn!("Skipping {node}: not reachable from a root");
        }
    }

    log::debug!(
        "Propagated transforms for {updated} nodes ({} skipped)",
        skipped.len()
    );
    Ok(HierarchyUpdate { updated, skipped })
}

/// Re-derive the world transform of `root` and every node below it.
///
/// # Errors
///
/// Fails if `root` does not exist or its own parent handle dangles.
pub fn update_subtree(scene: &mut Scene, root: NodeId) -> Result<HierarchyUpdate, SceneError> {
    scene.node(root)?;
    let links = Links::collect(scene);
    let levels = links.levels(vec![root]);
    let updated = apply(scene, &levels)?;
    Ok(HierarchyUpdate {
        updated,
        skipped: Vec::new(),
    })
}

fn apply(scene: &mut Scene, levels: &[Vec<NodeId>]) -> Result<usize, SceneError> {
    let mut updated = 0;
    for level in levels {
        for &node in level {
            scene.update_world_transform(node)?;
            updated += 1;
        }
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    const EPSILON: f32 = 1e-5;

    fn init_test_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn chain(scene: &mut Scene, len: usize) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        for i in 0..len {
            let node = scene.spawn_named_node(format!("n{i}"));
            scene.set_local_location(node, Vec3::X).unwrap();
            if let Some(&parent) = nodes.last() {
                scene.set_parent(node, Some(parent)).unwrap();
            }
            nodes.push(node);
        }
        nodes
    }

    #[test]
    fn test_level_order() {
        let mut scene = Scene::new();
        let root = scene.spawn_node();
        let a = scene.spawn_node();
        let b = scene.spawn_node();
        let leaf = scene.spawn_node();
        let other_root = scene.spawn_node();
        scene.set_parent(a, Some(root)).unwrap();
        scene.set_parent(b, Some(root)).unwrap();
        scene.set_parent(leaf, Some(b)).unwrap();

        let levels = level_order(&scene);
        assert_eq!(levels.len(), 3);
        assert_eq!(levels[0], vec![root, other_root]);
        assert_eq!(levels[1], vec![a, b]);
        assert_eq!(levels[2], vec![leaf]);
    }

    #[test]
    fn test_update_hierarchy_propagates_parent_move() {
        let mut scene = Scene::new();
        let nodes = chain(&mut scene, 4);
        update_hierarchy(&mut scene).unwrap();
        let tip = scene.world_transform(nodes[3]).unwrap();
        assert!(tip.location.abs_diff_eq(Vec3::new(4.0, 0.0, 0.0), EPSILON));

        scene.set_local_rotation(nodes[0], Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)).unwrap();
        // Nothing below the root moved yet.
        let stale = scene.world_transform(nodes[3]).unwrap();
        assert!(stale.location.abs_diff_eq(Vec3::new(4.0, 0.0, 0.0), EPSILON));

        let summary = update_hierarchy(&mut scene).unwrap();
        assert_eq!(summary.updated, 4);
        assert!(summary.skipped.is_empty());
        let tip = scene.world_transform(nodes[3]).unwrap();
        assert!(tip.location.abs_diff_eq(Vec3::new(1.0, 3.0, 0.0), 1e-4));
    }

    #[test]
    fn test_update_hierarchy_skips_dangling_subtree() {
        init_test_logging();
        let mut scene = Scene::new();
        let nodes = chain(&mut scene, 3);
        scene.despawn_node(nodes[0]).unwrap();

        let summary = update_hierarchy(&mut scene).unwrap();
        assert_eq!(summary.updated, 0);
        assert_eq!(summary.skipped, vec![nodes[1], nodes[2]]);
    }

    #[test]
    fn test_update_subtree() {
        let mut scene = Scene::new();
        let nodes = chain(&mut scene, 3);
        let unrelated = scene.spawn_node();
        update_hierarchy(&mut scene).unwrap();

        scene.set_local_location(nodes[1], Vec3::new(0.0, 5.0, 0.0)).unwrap();
        let summary = update_subtree(&mut scene, nodes[1]).unwrap();
        assert_eq!(summary.updated, 2);

        let tip = scene.world_transform(nodes[2]).unwrap();
        assert!(tip.location.abs_diff_eq(Vec3::new(2.0, 5.0, 0.0), EPSILON));
        assert_eq!(scene.world_transform(unrelated).unwrap().location, Vec3::ZERO);
    }

    #[test]
    fn test_update_subtree_unknown_root() {
        let mut scene = Scene::new();
        let node = scene.spawn_node();
        scene.despawn_node(node).unwrap();
        assert_eq!(
            update_subtree(&mut scene, node),
            Err(SceneError::NoSuchNode(node))
        );
    }
}
