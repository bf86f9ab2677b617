//! Core module
//!
//! Scene configuration, logging setup and snapshot persistence

mod config;
mod logging;
mod snapshot;

pub use config::{ConfigError, SceneConfig};
pub use logging::init_logging;
pub use snapshot::{
    SNAPSHOT_VERSION, SceneSnapshot, SerializedGraph, SerializedNode, SnapshotError,
};
