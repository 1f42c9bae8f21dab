use serde::Serialize;

use crate::core::{Transform, Vec3};
use crate::systems::rigid_body::Body;

use super::text_fit::TextFit;

/// Creation wall-clock time in ms; also the identity and sort key.
pub type TileId = i64;

/// Lifecycle state. Only ever moves forward in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TileState {
    Falling,
    Settling,
    Fading,
    Removed,
}

pub struct Tile {
    pub id: TileId,
    pub label: String,
    /// Simulation clock (seconds) at creation
    pub spawn_time: f64,
    pub(crate) body: Box<dyn Body>,
    pub(crate) state: TileState,
    pub(crate) initial_angle: f32,
    pub(crate) spawn_y: f32,
    pub(crate) opacity: f32,
    pub(crate) fit: Option<TextFit>,
    /// Elapsed seconds when Settling began
    pub(crate) settled_at: Option<f32>,
    /// Elapsed seconds when Fading began
    pub(crate) fade_started_at: Option<f32>,
    /// Sitting on the floor (reached while Fading mid-air counts too)
    pub(crate) resting: bool,
}

impl Tile {
    /// A new tile in the Falling state. The spawn impulse is applied on creation.
    pub fn new(
        id: TileId,
        label: String,
        spawn_time: f64,
        mut body: Box<dyn Body>,
        fall_impulse: f32,
    ) -> Self {
        let transform = body.transform();
        body.apply_impulse(Vec3::new(0.0, -fall_impulse, 0.0));
        Self {
            id,
            label,
            spawn_time,
            body,
            state: TileState::Falling,
            initial_angle: transform.angle,
            spawn_y: transform.position.y,
            opacity: 1.0,
            fit: None,
            settled_at: None,
            fade_started_at: None,
            resting: false,
        }
    }

    pub fn state(&self) -> TileState {
        self.state
    }

    pub fn is_removed(&self) -> bool {
        self.state == TileState::Removed
    }

    pub fn transform(&self) -> Transform {
        self.body.transform()
    }

    pub fn position(&self) -> Vec3 {
        self.body.transform().position
    }

    pub fn rotation(&self) -> f32 {
        self.body.transform().angle
    }

    pub fn velocity(&self) -> Vec3 {
        self.body.velocity()
    }

    pub fn angular_velocity(&self) -> f32 {
        self.body.angular_velocity()
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn initial_angle(&self) -> f32 {
        self.initial_angle
    }

    /// Latest label layout, `None` until the label has been measured.
    pub fn fit(&self) -> Option<&TextFit> {
        self.fit.as_ref()
    }

    pub fn is_resting(&self) -> bool {
        self.resting
    }

    /// Seconds since spawn at simulation time `clock`.
    pub fn elapsed(&self, clock: f64) -> f32 {
        (clock - self.spawn_time).max(0.0) as f32
    }

    /// Half the backing box height, or of `default_height` before measurement.
    pub fn half_height(&self, default_height: f32) -> f32 {
        match &self.fit {
            Some(fit) => fit.box_size.y * 0.5,
            None => default_height * 0.5,
        }
    }

    pub(crate) fn advance_to(&mut self, next: TileState) {
        debug_assert!(next >= self.state, "tile state must not move backwards");
        if next > self.state {
            self.state = next;
        }
    }
}
