use crate::core::{Transform, Vec3};

use super::{Body, BodyDesc};

/// Rigid Body - moves as a single unit
#[derive(Clone, Debug)]
pub struct RigidBody {
    /// Unique ID for this body
    pub id: u32,
    /// World position (center of mass)
    pub pos: Vec3,
    /// Velocity vector (units per second)
    pub velocity: Vec3,
    /// Rotation about the view axis (radians)
    pub angle: f32,
    /// Angular velocity (radians per second)
    pub angular_vel: f32,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub friction: f32,
    /// Bounciness (0.0 = no bounce, 1.0 = full elastic)
    pub restitution: f32,
}

impl RigidBody {
    pub fn new(desc: &BodyDesc, id: u32) -> Self {
        Self {
            id,
            pos: desc.transform.position,
            velocity: Vec3::zero(),
            angle: desc.transform.angle,
            angular_vel: 0.0,
            // Ensure minimum mass to avoid division issues
            mass: desc.mass.max(1e-4),
            linear_damping: desc.linear_damping.clamp(0.0, 1.0),
            angular_damping: desc.angular_damping.clamp(0.0, 1.0),
            friction: desc.friction.max(0.0),
            restitution: desc.restitution.clamp(0.0, 1.0),
        }
    }
}

/// Velocity multiplier after `dt` seconds of damping: `(1 - damping)^dt`.
#[inline]
fn damping_factor(damping: f32, dt: f32) -> f32 {
    (1.0 - damping).max(0.0).powf(dt)
}

impl Body for RigidBody {
    fn apply_impulse(&mut self, impulse: Vec3) {
        self.velocity = self.velocity + impulse * (1.0 / self.mass);
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn angular_velocity(&self) -> f32 {
        self.angular_vel
    }

    fn set_angular_velocity(&mut self, angular_velocity: f32) {
        self.angular_vel = angular_velocity;
    }

    fn transform(&self) -> Transform {
        Transform::new(self.pos, self.angle)
    }

    fn set_transform(&mut self, transform: Transform) {
        self.pos = transform.position;
        self.angle = transform.angle;
    }

    fn friction(&self) -> f32 {
        self.friction
    }

    fn restitution(&self) -> f32 {
        self.restitution
    }

    fn step(&mut self, dt: f32, acceleration: Vec3) {
        if dt <= 0.0 {
            return;
        }
        // Semi-implicit Euler: velocity first, then position with the new velocity.
        self.velocity = self.velocity + acceleration * dt;
        self.velocity = self.velocity * damping_factor(self.linear_damping, dt);
        self.pos = self.pos + self.velocity * dt;

        self.angular_vel *= damping_factor(self.angular_damping, dt);
        self.angle += self.angular_vel * dt;
    }
}
