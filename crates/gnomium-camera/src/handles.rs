//! Typed handles the host hands to the rig
//!
//! Each trait is a narrow capability over an object the host's scene owns.
//! Handles are cheap proxies: dropping one never destroys the scene object.

use glam::{Quat, Vec3};
use gnomium_core::{EntityId, LocalPose, ShadowCastingMode, Transform};
use rapier3d::prelude::ColliderHandle;

/// The tracked actor the camera orbits
pub trait MovableEntity {
    /// Stable identity of the actor's root node
    fn id(&self) -> EntityId;

    /// Display name, for logs
    fn name(&self) -> String;

    /// World transform of the actor's root node
    fn transform(&self) -> Transform;

    /// World position of the actor's feet
    fn position(&self) -> Vec3 {
        self.transform().position
    }

    /// Heading in degrees around the world up axis
    fn yaw_degrees(&self) -> f32 {
        self.transform().yaw_degrees()
    }

    /// Facing direction
    fn forward(&self) -> Vec3 {
        self.transform().forward()
    }

    /// Rightward direction
    fn right(&self) -> Vec3 {
        self.transform().right()
    }

    /// Current linear velocity
    fn velocity(&self) -> Vec3;

    /// Overwrite the horizontal (X/Z) velocity, keeping the vertical part
    fn set_planar_velocity(&mut self, velocity: Vec3);

    /// Whether `entity` is this actor or a node somewhere below it
    fn contains(&self, entity: EntityId) -> bool {
        entity == self.id()
    }

    /// Every collision shape attached to the actor's hierarchy
    fn colliders(&self) -> Vec<ColliderHandle>;

    /// Every renderer attached to the actor's hierarchy
    fn render_elements(&self) -> Vec<Box<dyn RenderElement>>;
}

/// The scene camera the rig drives in third person
pub trait CameraHandle {
    fn id(&self) -> EntityId;

    /// Parent and parent-relative pose
    fn local_pose(&self) -> LocalPose;

    /// Reattach and place the camera relative to its parent
    fn set_local_pose(&mut self, pose: LocalPose);

    /// Place the camera in world space, keeping its current parent
    fn set_world_pose(&mut self, position: Vec3, rotation: Quat);
}

/// A behavior that also moves the camera (cinematic brains and the like).
///
/// The rig only flips the enabled flag; it never owns the behavior.
pub trait CameraDriver {
    fn name(&self) -> String;
    fn is_enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
}

/// A renderer whose shadow casting can be switched
pub trait RenderElement {
    fn name(&self) -> String;
    fn shadow_mode(&self) -> ShadowCastingMode;
    fn set_shadow_mode(&mut self, mode: ShadowCastingMode);
}
