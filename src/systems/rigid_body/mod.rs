//! Rigid bodies - the physics collaborator behind each tile
//!
//! Tiles never touch a physics engine directly. They hold a `Box<dyn Body>`
//! created by a `PhysicsBackend`, and only use the capability methods below.
//! `RigidBody` is the in-crate implementation (point mass, linear + angular
//! damping); a host can plug in any other engine through the same traits.

mod body;

pub use body::RigidBody;

use crate::core::{Transform, Vec3};

/// Everything needed to create a body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyDesc {
    pub mass: f32,
    pub transform: Transform,
    /// Fraction of linear velocity lost per second
    pub linear_damping: f32,
    /// Fraction of angular velocity lost per second
    pub angular_damping: f32,
    /// Fraction of tangential velocity removed on floor contact (>= 0, 1 stops it)
    pub friction: f32,
    /// Fraction of impact speed returned as a bounce (0..=1)
    pub restitution: f32,
}

/// Opaque handle to a simulated body.
pub trait Body {
    /// Instantaneous change of momentum at the center of mass.
    fn apply_impulse(&mut self, impulse: Vec3);

    fn velocity(&self) -> Vec3;

    fn set_velocity(&mut self, velocity: Vec3);

    fn angular_velocity(&self) -> f32;

    fn set_angular_velocity(&mut self, angular_velocity: f32);

    /// Live position/rotation, read back every frame.
    fn transform(&self) -> Transform;

    fn set_transform(&mut self, transform: Transform);

    /// Contact material, read when the body meets the floor.
    fn friction(&self) -> f32;

    fn restitution(&self) -> f32;

    /// Advance `dt` seconds under a constant acceleration.
    fn step(&mut self, dt: f32, acceleration: Vec3);
}

/// Creates bodies and owns the shared world settings (gravity).
pub trait PhysicsBackend {
    fn create_body(&mut self, desc: &BodyDesc) -> Box<dyn Body>;

    fn gravity(&self) -> Vec3;

    fn set_gravity(&mut self, gravity: Vec3);
}
