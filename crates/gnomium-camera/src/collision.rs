//! Obstacle classification for camera probes

use gnomium_physics::ColliderInfo;
use rapier3d::prelude::ColliderHandle;

use crate::handles::MovableEntity;

/// Decides which colliders count as camera obstacles for one actor
pub struct ObstacleFilter<'a> {
    actor: &'a dyn MovableEntity,
    actor_colliders: &'a [ColliderHandle],
    min_obstacle_size: f32,
}

impl<'a> ObstacleFilter<'a> {
    pub fn new(
        actor: &'a dyn MovableEntity,
        actor_colliders: &'a [ColliderHandle],
        min_obstacle_size: f32,
    ) -> Self {
        Self {
            actor,
            actor_colliders,
            min_obstacle_size,
        }
    }

    /// True if the collider belongs to the actor's own hierarchy
    pub fn is_self_collider(&self, info: &ColliderInfo) -> bool {
        if let Some(owner) = info.owner {
            if self.actor.contains(owner) {
                return true;
            }
        }
        self.actor_colliders.contains(&info.handle)
    }

    /// True if the collider is large enough to push the camera around
    pub fn is_big_obstacle(&self, info: &ColliderInfo) -> bool {
        info.bounds_size.length() >= self.min_obstacle_size
    }

    /// A collider the camera must avoid
    pub fn qualifies(&self, info: &ColliderInfo) -> bool {
        !self.is_self_collider(info) && self.is_big_obstacle(info)
    }
}
