//! Simulation systems
//!
//! - particle_field:     fixed-population sand/rain background
//! - tiles:              timestamp tiles and their lifecycle
//! - spawner:            periodic spawn-intent schedule
//! - rigid_body:         body capability traits + point-mass body
//! - rigid_body_system:  in-crate physics backend

pub mod particle_field;
pub mod rigid_body;
pub mod rigid_body_system;
pub mod spawner;
pub mod tiles;
