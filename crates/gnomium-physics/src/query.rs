//! Spatial queries used by the camera rig
//!
//! The rig only needs two questions answered about the scene: what solid
//! colliders overlap a sphere, and where a swept sphere first touches one.

use glam::Vec3;
use gnomium_core::EntityId;
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::PhysicsWorld;

/// Maximum number of colliders reported by a single overlap query
pub const OVERLAP_CAPACITY: usize = 32;

/// Bit mask selecting which collider membership groups a query considers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollisionMask(pub u32);

impl CollisionMask {
    pub const ALL: CollisionMask = CollisionMask(u32::MAX);
    pub const NONE: CollisionMask = CollisionMask(0);

    /// Check whether a membership bit set intersects this mask
    pub fn matches(&self, memberships: u32) -> bool {
        self.0 & memberships != 0
    }

    /// Rapier interaction groups for a query using this mask
    pub fn interaction_groups(&self) -> InteractionGroups {
        InteractionGroups::new(Group::ALL, Group::from_bits_truncate(self.0))
    }
}

impl Default for CollisionMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// What a query reports about a collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderInfo {
    /// The collider itself
    pub handle: ColliderHandle,
    /// Scene entity this collider belongs to, if tagged
    pub owner: Option<EntityId>,
    /// Full size of the collider's world-space bounding box
    pub bounds_size: Vec3,
}

impl ColliderInfo {
    /// Read the query-facing description of a rapier collider
    pub fn from_collider(handle: ColliderHandle, collider: &Collider) -> Self {
        let extents = collider.compute_aabb().extents();
        Self {
            handle,
            owner: EntityId::from_u128(collider.user_data),
            bounds_size: Vec3::new(extents.x, extents.y, extents.z),
        }
    }
}

/// Result of a sphere cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereCastHit {
    /// The first accepted collider touched by the sphere
    pub collider: ColliderInfo,
    /// Distance travelled along the cast direction before contact
    pub distance: f32,
}

/// Sphere-based scene queries. Sensors (triggers) are never reported.
pub trait SpatialQuery {
    /// Collect solid colliders overlapping a sphere into `out`.
    ///
    /// `out` is cleared first and never grows past [`OVERLAP_CAPACITY`].
    fn overlap_sphere(
        &self,
        center: Vec3,
        radius: f32,
        mask: CollisionMask,
        out: &mut Vec<ColliderInfo>,
    );

    /// Sweep a sphere from `origin` along `direction` for up to
    /// `max_distance`, returning the nearest collider that `accept` admits.
    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: CollisionMask,
        accept: &dyn Fn(&ColliderInfo) -> bool,
    ) -> Option<SphereCastHit>;
}

impl SpatialQuery for PhysicsWorld {
    fn overlap_sphere(
        &self,
        center: Vec3,
        radius: f32,
        mask: CollisionMask,
        out: &mut Vec<ColliderInfo>,
    ) {
        out.clear();

        let ball = Ball::new(radius);
        let pos = Isometry::translation(center.x, center.y, center.z);
        let filter = QueryFilter::default()
            .exclude_sensors()
            .groups(mask.interaction_groups());

        self.query_pipeline.intersections_with_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &pos,
            &ball,
            filter,
            |handle| {
                if let Some(collider) = self.collider_set.get(handle) {
                    out.push(ColliderInfo::from_collider(handle, collider));
                }
                out.len() < OVERLAP_CAPACITY
            },
        );
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: CollisionMask,
        accept: &dyn Fn(&ColliderInfo) -> bool,
    ) -> Option<SphereCastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        let ball = Ball::new(radius);
        let pos = Isometry::translation(origin.x, origin.y, origin.z);
        let vel = vector![direction.x, direction.y, direction.z];
        let options = ShapeCastOptions {
            max_time_of_impact: max_distance,
            target_distance: 0.0,
            stop_at_penetration: false,
            compute_impact_geometry_on_penetration: false,
        };

        let predicate = |handle: ColliderHandle, collider: &Collider| {
            accept(&ColliderInfo::from_collider(handle, collider))
        };
        let filter = QueryFilter::default()
            .exclude_sensors()
            .groups(mask.interaction_groups())
            .predicate(&predicate);

        let (handle, hit) = self.query_pipeline.cast_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &pos,
            &vel,
            &ball,
            options,
            filter,
        )?;

        let collider = self.collider_set.get(handle)?;
        Some(SphereCastHit {
            collider: ColliderInfo::from_collider(handle, collider),
            distance: hit.time_of_impact,
        })
    }
}
