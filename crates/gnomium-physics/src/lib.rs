//! Gnomium Physics - Scene collision using rapier3d
//!
//! Provides the collider world the camera rig queries, ownership tagging so
//! queries can tell an actor's own shapes apart from the level, and a
//! kinematic character controller for the tracked actor.

mod character_controller;
mod query;

pub use character_controller::{CharacterController, CharacterControllerConfig};
pub use query::{
    ColliderInfo, CollisionMask, SpatialQuery, SphereCastHit, OVERLAP_CAPACITY,
};

use glam::Vec3;
use gnomium_core::EntityId;
use nalgebra::Unit;
use rapier3d::prelude::*;

/// Physics world configuration
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Gravity vector (default: -9.81 on Y axis)
    pub gravity: Vec3,
    /// Physics timestep (default: 1/60)
    pub timestep: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            timestep: 1.0 / 60.0,
        }
    }
}

/// The main physics world containing all simulation state
pub struct PhysicsWorld {
    /// Configuration
    pub config: PhysicsConfig,

    /// Rigid body storage
    pub rigid_body_set: RigidBodySet,
    /// Collider storage
    pub collider_set: ColliderSet,
    /// Impulse joint storage
    pub impulse_joint_set: ImpulseJointSet,
    /// Multi-body joint storage
    pub multibody_joint_set: MultibodyJointSet,

    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    ccd_solver: CCDSolver,
    /// Query pipeline for overlaps and shape casts
    query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.timestep;

        Self {
            config,
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Step the physics simulation.
    ///
    /// Queries issued after this call see the post-step collider positions.
    pub fn step(&mut self) {
        let gravity = vector![self.config.gravity.x, self.config.gravity.y, self.config.gravity.z];

        self.physics_pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );

        self.update_queries();
    }

    /// Refresh the query acceleration structure without stepping
    pub fn update_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a static collider (ground, walls, props)
    pub fn add_static_collider(&mut self, collider: Collider) -> ColliderHandle {
        self.collider_set.insert(collider)
    }

    /// Tag a collider as belonging to a scene entity
    pub fn set_collider_owner(&mut self, handle: ColliderHandle, owner: EntityId) {
        if let Some(collider) = self.collider_set.get_mut(handle) {
            collider.user_data = owner.as_u128();
        }
    }

    /// Entity a collider was tagged with, if any
    pub fn collider_owner(&self, handle: ColliderHandle) -> Option<EntityId> {
        self.collider_set
            .get(handle)
            .and_then(|c| EntityId::from_u128(c.user_data))
    }

    /// All colliders tagged with the given owner
    pub fn colliders_owned_by(&self, owner: EntityId) -> Vec<ColliderHandle> {
        let tag = owner.as_u128();
        self.collider_set
            .iter()
            .filter(|(_, c)| c.user_data == tag)
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Move a collider without a parent body to a new translation
    pub fn set_collider_translation(&mut self, handle: ColliderHandle, position: Vec3) {
        if let Some(collider) = self.collider_set.get_mut(handle) {
            collider.set_translation(vector![position.x, position.y, position.z]);
        }
    }

    /// Create a ground plane collider
    pub fn create_ground(&mut self, y: f32) -> ColliderHandle {
        let normal = Unit::new_normalize(vector![0.0, 1.0, 0.0]);
        let ground = ColliderBuilder::halfspace(normal)
            .translation(vector![0.0, y, 0.0])
            .friction(0.7)
            .restitution(0.0)
            .build();
        self.add_static_collider(ground)
    }

    /// Create a static box collider
    pub fn create_static_box(&mut self, half_extents: Vec3, position: Vec3) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![position.x, position.y, position.z])
            .friction(0.7)
            .build();
        self.add_static_collider(collider)
    }

    /// Create a trigger volume that never blocks queries
    pub fn create_sensor_box(&mut self, half_extents: Vec3, position: Vec3) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![position.x, position.y, position.z])
            .sensor(true)
            .build();
        self.add_static_collider(collider)
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physics_world_creation() {
        let world = PhysicsWorld::new();
        assert_eq!(world.config.gravity, Vec3::new(0.0, -9.81, 0.0));
    }

    #[test]
    fn test_ground_creation() {
        let mut world = PhysicsWorld::new();
        let ground = world.create_ground(0.0);
        assert!(world.collider_set.get(ground).is_some());
        assert_eq!(world.collider_owner(ground), None);
    }

    #[test]
    fn test_owner_lookup() {
        let mut world = PhysicsWorld::new();
        let owner = EntityId::new();
        let a = world.create_static_box(Vec3::splat(0.5), Vec3::ZERO);
        let b = world.create_static_box(Vec3::splat(0.5), Vec3::X * 3.0);
        world.create_static_box(Vec3::splat(0.5), Vec3::X * 6.0);
        world.set_collider_owner(a, owner);
        world.set_collider_owner(b, owner);

        let mut owned = world.colliders_owned_by(owner);
        owned.sort_by_key(|h| h.into_raw_parts());
        let mut expected = vec![a, b];
        expected.sort_by_key(|h| h.into_raw_parts());
        assert_eq!(owned, expected);
    }
}
