//! Per-node uniform data for GPU upload

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::scene::{GraphId, NodeId, Scene, SceneError, SceneNode};

/// Uniform buffer for model transform
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ModelUniform {
    /// World matrix, column-major
    pub model: [[f32; 4]; 4],
    /// Scale-rotation matrix for normals, column-major
    pub normal: [[f32; 4]; 4],
}

impl ModelUniform {
    /// Create a uniform with identity model and normal matrices
    #[must_use]
    pub fn new() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            normal: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }

    /// Build from a node's cached world state.
    #[must_use]
    pub fn from_node(node: &SceneNode) -> Self {
        Self {
            model: node.world_matrix().to_cols_array_2d(),
            normal: node.normal_matrix().to_cols_array_2d(),
        }
    }

    /// Get the data as bytes for GPU upload
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl Default for ModelUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniforms for every node registered in `graph`, in registration order.
pub fn collect_uniforms(scene: &Scene, graph: GraphId) -> Result<Vec<ModelUniform>, SceneError> {
    let objects: Vec<NodeId> = scene.graph(graph)?.objects().to_vec();
    objects
        .into_iter()
        .map(|node| scene.node(node).map(|n| ModelUniform::from_node(&n)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn test_model_uniform_layout() {
        assert_eq!(std::mem::size_of::<ModelUniform>(), 128);
        assert_eq!(ModelUniform::default().as_bytes().len(), 128);
        assert_eq!(ModelUniform::default().model, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn test_from_node_drops_translation_from_normal() {
        let mut scene = Scene::new();
        let node = scene.spawn_node();
        scene.set_local_location(node, Vec3::new(1.0, 2.0, 3.0)).unwrap();
        scene.set_local_scale(node, Vec3::splat(2.0)).unwrap();

        let uniform = ModelUniform::from_node(&scene.node(node).unwrap());
        assert_eq!(uniform.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(uniform.normal[3], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(uniform.normal[0], [2.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_collect_uniforms_in_registration_order() {
        let mut scene = Scene::new();
        let graph = scene.spawn_graph("Main");
        let a = scene.spawn_node();
        let b = scene.spawn_node();
        scene.set_local_location(a, Vec3::X).unwrap();
        scene
            .set_local_rotation(b, Quat::from_rotation_z(1.0))
            .unwrap();
        scene.add_object(graph, b).unwrap();
        scene.add_object(graph, a).unwrap();

        let uniforms = collect_uniforms(&scene, graph).unwrap();
        assert_eq!(uniforms.len(), 2);
        assert_eq!(
            uniforms[0].model,
            scene.world_matrix(b).unwrap().to_cols_array_2d()
        );
        assert_eq!(uniforms[1].model[3], [1.0, 0.0, 0.0, 1.0]);
    }
}
