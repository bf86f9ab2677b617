//! Typed handles into the scene arena
//!
//! All three wrap a generational [`hecs::Entity`]. A handle never keeps its
//! target alive; once the target is despawned, lookups through a stale handle
//! fail instead of aliasing a newer object.

use hecs::Entity;

macro_rules! scene_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) Entity);

        impl $name {
            /// Get the underlying entity
            #[must_use]
            pub const fn entity(&self) -> Entity {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }
    };
}

scene_handle!(
    /// Handle to a [`SceneNode`](super::SceneNode)
    NodeId
);

scene_handle!(
    /// Handle to an attached [`Behavior`](super::Behavior)
    BehaviorId
);

scene_handle!(
    /// Handle to a [`SceneGraph`](super::SceneGraph) registry
    GraphId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_compare_by_entity() {
        let mut world = hecs::World::new();
        let a = world.spawn(());
        let b = world.spawn(());

        assert_eq!(NodeId(a), NodeId(a));
        assert_ne!(NodeId(a), NodeId(b));
        assert_eq!(GraphId(b).entity(), b);
        assert!(BehaviorId(a).to_string().starts_with("BehaviorId("));
    }
}
