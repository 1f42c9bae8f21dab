//! Core building blocks shared by every system
//!
//! - vec3:     small 3D vector + transform used by bodies and tiles
//! - viewport: host-owned visible area, read at the start of every tick
//! - random:   seeded RNG helpers (never panic on degenerate ranges)
//! - clock:    wall clock + perf timer (js Date on wasm32, std natively)

pub mod clock;
pub mod random;
pub mod vec3;
pub mod viewport;

pub use clock::{wall_clock_ms, PerfTimer};
pub use random::SimRng;
pub use vec3::{Transform, Vec3};
pub use viewport::ViewportMetrics;
