//! Attached behaviors
//!
//! A behavior is any value stored in the scene arena alongside an
//! [`BehaviorOwner`] back-reference. Executing behaviors is left to the
//! caller; the scene only tracks which node owns which behavior.

use std::borrow::Cow;

use super::handle::NodeId;

/// Values that can be attached to a [`SceneNode`](super::SceneNode).
pub trait Behavior: Send + Sync + 'static {
    /// Human-readable label used in logs.
    fn label(&self) -> Cow<'static, str> {
        Cow::Borrowed(std::any::type_name::<Self>())
    }
}

/// Owner back-reference stored next to every behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BehaviorOwner(pub(crate) Option<NodeId>);

impl BehaviorOwner {
    /// Node that currently owns the behavior
    #[must_use]
    pub const fn node(&self) -> Option<NodeId> {
        self.0
    }
}

/// Label recorded when a behavior is spawned
#[derive(Debug, Clone)]
pub(crate) struct BehaviorLabel(pub(crate) Cow<'static, str>);
