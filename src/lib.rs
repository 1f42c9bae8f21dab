//! Timefall Engine - simulation core for the Timefall scene, in WASM
//!
//! A field of falling sand (or rain) behind a stream of timestamp tiles that
//! drop, settle on the floor, fade and disappear.
//!
//! Architecture:
//! - core/        - math, viewport, RNG, clock
//! - domain/      - configuration and label formatting
//! - systems/     - particle field, rigid bodies, tiles, spawner
//! - simulation/  - scene orchestration + wasm facade

pub mod core;
pub mod domain;
pub mod systems;
pub mod simulation;

// Compatibility re-exports (short paths for the common systems)
pub use systems::particle_field;
pub use systems::rigid_body;
pub use systems::rigid_body_system;
pub use systems::spawner;
pub use systems::tiles;

use wasm_bindgen::prelude::*;

// Re-export wasm-bindgen-rayon for thread pool initialization
#[cfg(feature = "parallel")]
pub use wasm_bindgen_rayon::init_thread_pool;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    #[cfg(target_arch = "wasm32")]
    {
        let level = if cfg!(debug_assertions) {
            log::Level::Debug
        } else {
            log::Level::Info
        };
        // Err only when a logger is already installed (repeated init).
        console_log::init_with_level(level).ok();
    }

    log::info!("Timefall engine {} initialized", env!("CARGO_PKG_VERSION"));
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Re-export main types
pub use domain::{SceneConfig, MAX_PARTICLES};
pub use simulation::{PerfStats, Scene, SceneCore, TILE_RECORD_STRIDE};
