//! Scene hierarchy
//!
//! Nodes with cached local/world transforms, single-owner behavior lists and
//! graph registries, all stored in a hecs-backed [`Scene`] arena.

mod behavior;
mod error;
mod graph;
mod handle;
mod hierarchy;
mod node;
mod world;

pub use behavior::{Behavior, BehaviorOwner};
pub use error::{Conflict, SceneError};
pub use graph::SceneGraph;
pub use handle::{BehaviorId, GraphId, NodeId};
pub(crate) use hierarchy::parent_first_order;
pub use hierarchy::{HierarchyUpdate, level_order, update_hierarchy, update_subtree};
pub use node::SceneNode;
pub use world::Scene;
