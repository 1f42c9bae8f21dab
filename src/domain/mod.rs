//! Domain - what a scene is made of, independent of how it is simulated

pub mod config;
pub mod label;

pub use config::{
    FadeStart, FieldConfig, FieldStyle, PhysicsConfig, RotationEase, SceneConfig, SpawnerConfig,
    TileConfig, MAX_PARTICLES, MIN_SPAWN_INTERVAL_MS,
};
pub use label::{format_label, label_for_timestamp_ms};
