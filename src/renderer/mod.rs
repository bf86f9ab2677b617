//! Rendering hand-off
//!
//! Packs cached node transforms into `Pod` uniforms ready for a GPU buffer.

mod uniform;

pub use uniform::{ModelUniform, collect_uniforms};
