//! Hierarchical scene transforms
//!
//! This crate provides:
//! - Scale-rotation-translation transform algebra on glam types
//! - Scene nodes with cached local and world transforms, stored in a hecs arena
//! - Single-owner behavior lists and graph registries
//! - Top-down hierarchy propagation and GPU uniform hand-off
//! - Scene snapshots in RON and JSON

pub mod core;
pub mod math;
pub mod renderer;
pub mod scene;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::core::{SceneConfig, SceneSnapshot, init_logging};
    pub use crate::math::{SafeInverse, SafeRecip, SrtTransform};
    pub use crate::renderer::{ModelUniform, collect_uniforms};
    pub use crate::scene::{
        Behavior, BehaviorId, GraphId, NodeId, Scene, SceneError, SceneGraph, SceneNode,
        update_hierarchy,
    };
    pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
}
