//! Character controller using rapier3d's kinematic character controller

use glam::Vec3;
use gnomium_core::EntityId;
use rapier3d::control::{CharacterAutostep, CharacterLength, KinematicCharacterController};
use rapier3d::prelude::*;

/// Character controller configuration
#[derive(Debug, Clone)]
pub struct CharacterControllerConfig {
    /// Capsule height (default: 1.8m)
    pub height: f32,
    /// Capsule radius (default: 0.4m)
    pub radius: f32,
    /// Maximum slope angle in degrees (default: 45)
    pub max_slope_angle: f32,
    /// Step height for climbing stairs (default: 0.25m)
    pub step_height: f32,
    /// Skin width for collision detection (default: 0.02m)
    pub skin_width: f32,
    /// Whether to snap to ground when walking down slopes
    pub snap_to_ground: bool,
    /// Maximum ground snap distance
    pub ground_snap_distance: f32,
    /// Gravity multiplier while airborne (1.0 = normal gravity)
    pub gravity_scale: f32,
}

impl Default for CharacterControllerConfig {
    fn default() -> Self {
        Self {
            height: 1.8,
            radius: 0.4,
            max_slope_angle: 45.0,
            step_height: 0.25,
            skin_width: 0.02,
            snap_to_ground: true,
            ground_snap_distance: 0.2,
            gravity_scale: 1.0,
        }
    }
}

/// Kinematic capsule body for a scene actor
pub struct CharacterController {
    /// Configuration
    pub config: CharacterControllerConfig,
    /// Current position (feet)
    pub position: Vec3,
    /// Current velocity
    pub velocity: Vec3,
    /// Whether the character is on the ground
    pub grounded: bool,
    /// The collider handle for this character
    pub collider_handle: Option<ColliderHandle>,
    controller: KinematicCharacterController,
}

impl CharacterController {
    /// Create a new character controller with default config
    pub fn new() -> Self {
        Self::with_config(CharacterControllerConfig::default())
    }

    /// Create a new character controller with custom config
    pub fn with_config(config: CharacterControllerConfig) -> Self {
        let mut controller = KinematicCharacterController::default();
        controller.max_slope_climb_angle = config.max_slope_angle.to_radians();
        controller.min_slope_slide_angle = config.max_slope_angle.to_radians();
        controller.autostep = Some(CharacterAutostep {
            max_height: CharacterLength::Absolute(config.step_height),
            min_width: CharacterLength::Relative(0.5),
            include_dynamic_bodies: true,
        });
        controller.snap_to_ground = if config.snap_to_ground {
            Some(CharacterLength::Absolute(config.ground_snap_distance))
        } else {
            None
        };
        controller.offset = CharacterLength::Absolute(config.skin_width);

        Self {
            config,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            grounded: false,
            collider_handle: None,
            controller,
        }
    }

    /// Spawn the character capsule, tagged as belonging to `owner`
    pub fn spawn(
        &mut self,
        physics: &mut crate::PhysicsWorld,
        position: Vec3,
        owner: EntityId,
    ) -> ColliderHandle {
        self.position = position;

        let half_height = (self.config.height - 2.0 * self.config.radius) / 2.0;
        let collider = ColliderBuilder::capsule_y(half_height.max(0.01), self.config.radius)
            .translation(vector![position.x, position.y + self.config.height / 2.0, position.z])
            .friction(0.0)
            .restitution(0.0)
            .user_data(owner.as_u128())
            .build();

        let handle = physics.add_static_collider(collider);
        self.collider_handle = Some(handle);
        handle
    }

    /// Move the character with collision detection
    pub fn move_character(
        &mut self,
        physics: &mut crate::PhysicsWorld,
        desired_translation: Vec3,
        dt: f32,
    ) {
        let Some(collider_handle) = self.collider_handle else {
            return;
        };

        let Some(collider) = physics.collider_set.get(collider_handle) else {
            return;
        };

        let shape = collider.shape();
        let own_tag = collider.user_data;
        // Colliders attached to the same owner travel with the character
        let not_attached =
            |_: ColliderHandle, other: &Collider| own_tag == 0 || other.user_data != own_tag;
        let current_pos = Isometry::translation(
            self.position.x,
            self.position.y + self.config.height / 2.0,
            self.position.z,
        );

        let movement = self.controller.move_shape(
            dt,
            &physics.rigid_body_set,
            &physics.collider_set,
            &physics.query_pipeline,
            shape,
            &current_pos,
            vector![desired_translation.x, desired_translation.y, desired_translation.z],
            QueryFilter::default()
                .exclude_collider(collider_handle)
                .exclude_sensors()
                .predicate(&not_attached),
            |_| {},
        );

        self.grounded = movement.grounded;

        let effective_translation = movement.translation;
        self.position.x += effective_translation.x;
        self.position.y += effective_translation.y;
        self.position.z += effective_translation.z;

        let center = self.center_position();
        physics.set_collider_translation(collider_handle, center);
    }

    /// Apply gravity and velocity, then move the character
    pub fn update(&mut self, physics: &mut crate::PhysicsWorld, dt: f32) {
        if !self.grounded {
            self.velocity.y += physics.config.gravity.y * self.config.gravity_scale * dt;
        } else if self.velocity.y < 0.0 {
            self.velocity.y = 0.0;
        }

        let translation = self.velocity * dt;
        self.move_character(physics, translation, dt);
    }

    /// Get the center position (middle of capsule)
    pub fn center_position(&self) -> Vec3 {
        Vec3::new(
            self.position.x,
            self.position.y + self.config.height / 2.0,
            self.position.z,
        )
    }

    /// Replace the horizontal velocity, keeping the vertical component
    pub fn set_planar_velocity(&mut self, x: f32, z: f32) {
        self.velocity.x = x;
        self.velocity.z = z;
    }
}

impl Default for CharacterController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PhysicsWorld;

    #[test]
    fn test_character_controller_config() {
        let config = CharacterControllerConfig::default();
        assert_eq!(config.height, 1.8);
        assert_eq!(config.radius, 0.4);
        assert_eq!(config.max_slope_angle, 45.0);
    }

    #[test]
    fn test_spawn_tags_owner() {
        let mut physics = PhysicsWorld::new();
        let owner = EntityId::new();
        let mut character = CharacterController::new();
        let handle = character.spawn(&mut physics, Vec3::ZERO, owner);

        assert_eq!(physics.collider_owner(handle), Some(owner));
        assert_eq!(physics.colliders_owned_by(owner), vec![handle]);
    }

    #[test]
    fn test_planar_velocity_keeps_vertical() {
        let mut character = CharacterController::new();
        character.velocity = Vec3::new(1.0, -2.0, 3.0);
        character.set_planar_velocity(4.0, 5.0);
        assert_eq!(character.velocity, Vec3::new(4.0, -2.0, 5.0));
    }

    #[test]
    fn test_walks_on_ground() {
        let mut physics = PhysicsWorld::new();
        physics.create_ground(0.0);
        let mut character = CharacterController::new();
        character.spawn(&mut physics, Vec3::new(0.0, 0.0, 0.0), EntityId::new());
        physics.update_queries();

        character.set_planar_velocity(0.0, 4.0);
        for _ in 0..30 {
            character.update(&mut physics, 1.0 / 60.0);
            physics.update_queries();
        }

        assert!(character.position.z > 1.0);
        assert!(character.position.y > -0.1);
    }

    #[test]
    fn test_attached_colliders_do_not_block() {
        let mut physics = PhysicsWorld::new();
        physics.create_ground(0.0);
        let owner = EntityId::new();
        let mut character = CharacterController::new();
        character.spawn(&mut physics, Vec3::ZERO, owner);

        // A box in the path, but tagged as part of the character
        let pack = physics.create_static_box(Vec3::new(0.5, 0.5, 0.1), Vec3::new(0.0, 0.9, 0.6));
        physics.set_collider_owner(pack, owner);
        physics.update_queries();

        character.set_planar_velocity(0.0, 4.0);
        for _ in 0..30 {
            character.update(&mut physics, 1.0 / 60.0);
            physics.update_queries();
        }

        assert!(character.position.z > 1.0);
    }
}
