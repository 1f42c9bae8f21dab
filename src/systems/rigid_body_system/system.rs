use crate::core::Vec3;
use crate::rigid_body::{Body, BodyDesc, PhysicsBackend, RigidBody};

/// Creates bodies for the scene and holds world gravity.
pub struct RigidBodySystem {
    gravity: Vec3,
    next_id: u32,
}

impl RigidBodySystem {
    pub fn new(gravity_y: f32) -> Self {
        Self {
            gravity: Vec3::new(0.0, gravity_y, 0.0),
            next_id: 1,
        }
    }

    /// Number of bodies created so far.
    pub fn created(&self) -> u32 {
        self.next_id - 1
    }
}

impl Default for RigidBodySystem {
    fn default() -> Self {
        Self::new(-9.81)
    }
}

impl PhysicsBackend for RigidBodySystem {
    fn create_body(&mut self, desc: &BodyDesc) -> Box<dyn Body> {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        Box::new(RigidBody::new(desc, id))
    }

    fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Transform;

    #[test]
    fn created_bodies_start_at_their_transform() {
        let mut system = RigidBodySystem::default();
        let desc = BodyDesc {
            mass: 1.0,
            transform: Transform::new(Vec3::new(1.0, 2.0, 3.0), 0.5),
            linear_damping: 0.1,
            angular_damping: 0.1,
            friction: 0.5,
            restitution: 0.0,
        };
        let body = system.create_body(&desc);
        assert_eq!(body.transform(), desc.transform);
        assert_eq!(body.velocity(), Vec3::zero());
        assert_eq!(system.created(), 1);
    }

    #[test]
    fn gravity_is_configurable() {
        let mut system = RigidBodySystem::new(-1.0);
        assert_eq!(system.gravity(), Vec3::new(0.0, -1.0, 0.0));
        system.set_gravity(Vec3::new(0.0, -20.0, 0.0));
        assert_eq!(system.gravity().y, -20.0);
    }
}
