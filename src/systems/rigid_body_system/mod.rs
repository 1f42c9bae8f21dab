//! RigidBodySystem - default physics backend
//!
//! Hands out `RigidBody` instances and carries the world gravity every body
//! integrates under. Bodies are owned by their tiles, not by the system, so
//! removing a tile releases its body with it.

mod system;

pub use system::RigidBodySystem;
