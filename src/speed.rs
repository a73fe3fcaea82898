//! Movement speed override for the local actor

use glam::{Vec2, Vec3};
use gnomium_camera::MovableEntity;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::input::{HostAction, HostInput};

/// Axis value contributed by one held direction key
const AXIS_STEP: f32 = 0.1;
/// Axes shorter than this count as no input
const DEAD_ZONE: f32 = 0.01;
const BOOST_STEP: f32 = 1.0;
const MIN_BOOST: f32 = 1.0;

/// Persisted speed tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedSettings {
    /// Walking speed (m/s)
    pub base_speed: f32,
    /// Speed while sprinting (m/s)
    pub boost_speed: f32,
}

impl Default for SpeedSettings {
    fn default() -> Self {
        Self {
            base_speed: 4.0,
            boost_speed: 6.0,
        }
    }
}

/// Overrides the game's own locomotion with fixed planar speeds
#[derive(Debug, Clone, Default)]
pub struct SpeedOverride {
    settings: SpeedSettings,
    speed_all: bool,
}

impl SpeedOverride {
    pub fn new(settings: SpeedSettings) -> Self {
        Self {
            settings,
            speed_all: false,
        }
    }

    pub fn settings(&self) -> &SpeedSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: SpeedSettings) {
        self.settings = settings;
        self.settings.boost_speed = self.settings.boost_speed.max(MIN_BOOST);
    }

    pub fn speed_all(&self) -> bool {
        self.speed_all
    }

    pub fn toggle_speed_all(&mut self) -> bool {
        self.speed_all = !self.speed_all;
        info!(
            "Speed-all mode {}",
            if self.speed_all { "ON" } else { "OFF" }
        );
        self.speed_all
    }

    pub fn raise_boost(&mut self) {
        self.settings.boost_speed += BOOST_STEP;
        info!("Boost speed => {:.1}", self.settings.boost_speed);
    }

    pub fn lower_boost(&mut self) {
        self.settings.boost_speed = (self.settings.boost_speed - BOOST_STEP).max(MIN_BOOST);
        info!("Boost speed => {:.1}", self.settings.boost_speed);
    }

    /// Speed for this frame
    pub fn current_speed(&self, sprinting: bool) -> f32 {
        if sprinting {
            self.settings.boost_speed
        } else {
            self.settings.base_speed
        }
    }

    /// Digital move axes (x = strafe, y = forward)
    pub fn move_axes(input: &HostInput) -> Vec2 {
        let mut axes = Vec2::ZERO;
        if input.is_held(HostAction::MoveForward) {
            axes.y += AXIS_STEP;
        }
        if input.is_held(HostAction::MoveBackward) {
            axes.y -= AXIS_STEP;
        }
        if input.is_held(HostAction::MoveRight) {
            axes.x += AXIS_STEP;
        }
        if input.is_held(HostAction::MoveLeft) {
            axes.x -= AXIS_STEP;
        }
        axes
    }

    /// Drive the actor from the move keys. Vertical velocity is left alone.
    pub fn apply(&self, actor: &mut dyn MovableEntity, input: &HostInput) {
        let axes = Self::move_axes(input);
        if axes.length() < DEAD_ZONE {
            actor.set_planar_velocity(Vec3::ZERO);
            return;
        }

        let direction = (actor.forward() * axes.y + actor.right() * axes.x).normalize_or_zero();
        let speed = self.current_speed(input.is_held(HostAction::Sprint));
        actor.set_planar_velocity(direction * speed);
    }

    /// Speed-all mode: shove the actor along its own facing
    pub fn push_forward(&self, actor: &mut dyn MovableEntity, sprinting: bool) {
        actor.set_planar_velocity(actor.forward() * self.current_speed(sprinting));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnomium_core::{EntityId, Transform};
    use rapier3d::prelude::ColliderHandle;

    struct Walker {
        id: EntityId,
        transform: Transform,
        velocity: Vec3,
    }

    impl Walker {
        fn facing(yaw_degrees: f32) -> Self {
            Self {
                id: EntityId::new(),
                transform: Transform::from_position_rotation(
                    Vec3::ZERO,
                    Transform::rotation_from_pitch_yaw_degrees(0.0, yaw_degrees),
                ),
                velocity: Vec3::new(0.0, -2.0, 0.0),
            }
        }
    }

    impl MovableEntity for Walker {
        fn id(&self) -> EntityId {
            self.id
        }

        fn name(&self) -> String {
            "walker".to_string()
        }

        fn transform(&self) -> Transform {
            self.transform
        }

        fn velocity(&self) -> Vec3 {
            self.velocity
        }

        fn set_planar_velocity(&mut self, velocity: Vec3) {
            self.velocity = Vec3::new(velocity.x, self.velocity.y, velocity.z);
        }

        fn colliders(&self) -> Vec<ColliderHandle> {
            Vec::new()
        }

        fn render_elements(&self) -> Vec<Box<dyn gnomium_camera::RenderElement>> {
            Vec::new()
        }
    }

    fn holding(actions: &[HostAction]) -> HostInput {
        let mut input = HostInput::new();
        for action in actions {
            input.press(*action);
        }
        input
    }

    #[test]
    fn test_forward_walk_keeps_vertical() {
        let speed = SpeedOverride::default();
        let mut walker = Walker::facing(0.0);
        speed.apply(&mut walker, &holding(&[HostAction::MoveForward]));

        assert!((walker.velocity.z - 4.0).abs() < 1e-4);
        assert!(walker.velocity.x.abs() < 1e-4);
        assert_eq!(walker.velocity.y, -2.0);
    }

    #[test]
    fn test_sprint_uses_boost() {
        let speed = SpeedOverride::default();
        let mut walker = Walker::facing(90.0);
        speed.apply(
            &mut walker,
            &holding(&[HostAction::MoveForward, HostAction::Sprint]),
        );

        // Facing +X after a 90 degree yaw
        assert!((walker.velocity.x - 6.0).abs() < 1e-4);
        assert!(walker.velocity.z.abs() < 1e-4);
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let speed = SpeedOverride::default();
        let mut walker = Walker::facing(0.0);
        speed.apply(
            &mut walker,
            &holding(&[HostAction::MoveForward, HostAction::MoveRight]),
        );

        let planar = Vec2::new(walker.velocity.x, walker.velocity.z);
        assert!((planar.length() - 4.0).abs() < 1e-4);
        assert!(walker.velocity.x > 0.0 && walker.velocity.z > 0.0);
    }

    #[test]
    fn test_no_input_stops_planar_motion() {
        let speed = SpeedOverride::default();
        let mut walker = Walker::facing(0.0);
        walker.velocity = Vec3::new(3.0, -1.0, 3.0);

        // Opposing keys cancel into the dead zone
        speed.apply(
            &mut walker,
            &holding(&[HostAction::MoveForward, HostAction::MoveBackward]),
        );
        assert_eq!(walker.velocity, Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_boost_floor() {
        let mut speed = SpeedOverride::default();
        speed.raise_boost();
        assert_eq!(speed.current_speed(true), 7.0);

        for _ in 0..10 {
            speed.lower_boost();
        }
        assert_eq!(speed.current_speed(true), MIN_BOOST);
        assert_eq!(speed.current_speed(false), 4.0);
    }

    #[test]
    fn test_push_forward() {
        let mut speed = SpeedOverride::default();
        assert!(speed.toggle_speed_all());

        let mut walker = Walker::facing(180.0);
        speed.push_forward(&mut walker, false);
        assert!((walker.velocity.z + 4.0).abs() < 1e-4);
        assert_eq!(walker.velocity.y, -2.0);
    }
}
