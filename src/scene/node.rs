//! Scene node: cached local/world placement plus ownership back-references
//!
//! A node stores both of its transforms and derives one from the other on
//! every write. The parent's world transform is supplied by the caller (the
//! [`Scene`](super::Scene) arena looks it up through the parent handle), so a
//! node never reaches into another node.
//!
//! Nothing here notifies children. After a parent moves, each descendant
//! keeps its old world transform until
//! [`Scene::update_world_transform`](super::Scene::update_world_transform)
//! runs on it.

use glam::{Mat4, Quat, Vec3};
use smallvec::SmallVec;

use super::handle::{BehaviorId, GraphId, NodeId};
use crate::math::SrtTransform;

/// A placed object in the scene hierarchy
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Display name, used in logs and snapshots
    pub name: String,

    pub(crate) parent: Option<NodeId>,
    pub(crate) graph: Option<GraphId>,
    pub(crate) behaviors: SmallVec<[BehaviorId; 4]>,

    local_transform: SrtTransform,
    world_transform: SrtTransform,
    world_matrix: Mat4,
}

impl SceneNode {
    /// Create a detached node with identity transforms.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            graph: None,
            behaviors: SmallVec::new(),
            local_transform: SrtTransform::IDENTITY,
            world_transform: SrtTransform::IDENTITY,
            world_matrix: Mat4::IDENTITY,
        }
    }

    // -------------------------------------------------------------------------
    // Getters
    // -------------------------------------------------------------------------

    /// Parent handle. May name a despawned node.
    #[must_use]
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Graph this node is registered in.
    #[must_use]
    #[inline]
    pub fn graph(&self) -> Option<GraphId> {
        self.graph
    }

    /// Attached behaviors in attachment order.
    #[must_use]
    #[inline]
    pub fn behaviors(&self) -> &[BehaviorId] {
        &self.behaviors
    }

    /// Placement relative to the parent.
    #[must_use]
    #[inline]
    pub fn local_transform(&self) -> SrtTransform {
        self.local_transform
    }

    /// Cached placement relative to the scene root.
    #[must_use]
    #[inline]
    pub fn world_transform(&self) -> SrtTransform {
        self.world_transform
    }

    /// Cached `world_transform().to_matrix()`.
    #[must_use]
    #[inline]
    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    /// World matrix flattened column-major for buffer upload.
    #[must_use]
    pub fn world_matrix_data(&self) -> [f32; 16] {
        self.world_matrix.to_cols_array()
    }

    /// Scale-rotation matrix of the world transform, for normals.
    #[must_use]
    pub fn normal_matrix(&self) -> Mat4 {
        self.world_transform.to_normal_matrix()
    }

    // -------------------------------------------------------------------------
    // Derivation
    // -------------------------------------------------------------------------

    fn update_local_transform(&mut self, parent_world: Option<&SrtTransform>) {
        self.local_transform = match parent_world {
            Some(parent) => self.world_transform.relative_to(parent),
            None => self.world_transform,
        };
        self.update_world_matrix();
    }

    /// Re-derive the world transform from the local one. Always recomputes.
    pub(crate) fn update_world_transform(&mut self, parent_world: Option<&SrtTransform>) {
        self.world_transform = match parent_world {
            Some(parent) => self.local_transform.compose(parent),
            None => self.local_transform,
        };
        self.update_world_matrix();
    }

    fn update_world_matrix(&mut self) {
        self.world_matrix = self.world_transform.to_matrix();
    }

    // -------------------------------------------------------------------------
    // World setters
    //
    // Each returns whether anything was written.
    // -------------------------------------------------------------------------

    pub(crate) fn set_world_transform(
        &mut self,
        value: SrtTransform,
        parent_world: Option<&SrtTransform>,
    ) -> bool {
        if self.world_transform == value {
            return false;
        }
        self.world_transform = value;
        self.update_local_transform(parent_world);
        true
    }

    pub(crate) fn set_world_location(
        &mut self,
        value: Vec3,
        parent_world: Option<&SrtTransform>,
    ) -> bool {
        if self.world_transform.location == value {
            return false;
        }
        self.world_transform.location = value;
        self.update_local_transform(parent_world);
        true
    }

    pub(crate) fn set_world_rotation(
        &mut self,
        value: Quat,
        parent_world: Option<&SrtTransform>,
    ) -> bool {
        if self.world_transform.rotation == value {
            return false;
        }
        self.world_transform.rotation = value;
        self.update_local_transform(parent_world);
        true
    }

    /// The no-op check compares against the local scale, not the world scale.
    pub(crate) fn set_world_scale(
        &mut self,
        value: Vec3,
        parent_world: Option<&SrtTransform>,
    ) -> bool {
        if self.local_transform.scale == value {
            return false;
        }
        self.world_transform.scale = value;
        self.update_local_transform(parent_world);
        true
    }

    // -------------------------------------------------------------------------
    // Local setters
    // -------------------------------------------------------------------------

    pub(crate) fn set_local_transform(
        &mut self,
        value: SrtTransform,
        parent_world: Option<&SrtTransform>,
    ) -> bool {
        if self.local_transform == value {
            return false;
        }
        self.local_transform = value;
        self.update_world_transform(parent_world);
        true
    }

    pub(crate) fn set_local_location(
        &mut self,
        value: Vec3,
        parent_world: Option<&SrtTransform>,
    ) -> bool {
        if self.local_transform.location == value {
            return false;
        }
        self.local_transform.location = value;
        self.update_world_transform(parent_world);
        true
    }

    pub(crate) fn set_local_rotation(
        &mut self,
        value: Quat,
        parent_world: Option<&SrtTransform>,
    ) -> bool {
        if self.local_transform.rotation == value {
            return false;
        }
        self.local_transform.rotation = value;
        self.update_world_transform(parent_world);
        true
    }

    pub(crate) fn set_local_scale(
        &mut self,
        value: Vec3,
        parent_world: Option<&SrtTransform>,
    ) -> bool {
        if self.local_transform.scale == value {
            return false;
        }
        self.local_transform.scale = value;
        self.update_world_transform(parent_world);
        true
    }
}

impl Default for SceneNode {
    fn default() -> Self {
        Self::new(String::new())
    }
}
