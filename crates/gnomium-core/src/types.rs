//! Core types used throughout Gnomium

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a scene entity (actor, camera, renderer owner)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Pack into a `u128` (used for physics `user_data` tags)
    pub fn as_u128(&self) -> u128 {
        self.0.as_u128()
    }

    /// Unpack from a `u128` tag. Zero means "untagged".
    pub fn from_u128(raw: u128) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(Self(Uuid::from_u128(raw)))
        }
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Transform with position, rotation, and scale.
///
/// Uses the game's axis convention: +Z is forward, +Y is up, +X is right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Rotation from pitch (about X) and yaw (about Y) in degrees, no roll.
    ///
    /// Yaw is applied first, then pitch in the yawed frame. Positive pitch
    /// tilts the forward vector downward.
    pub fn rotation_from_pitch_yaw_degrees(pitch: f32, yaw: f32) -> Quat {
        Quat::from_euler(EulerRot::YXZ, yaw.to_radians(), pitch.to_radians(), 0.0)
    }

    /// Forward direction (positive Z in local space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Right direction (positive X in local space)
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Heading around the world Y axis in degrees, in `[0, 360)`
    pub fn yaw_degrees(&self) -> f32 {
        let forward = self.forward();
        forward.x.atan2(forward.z).to_degrees().rem_euclid(360.0)
    }

    /// Map a point from this transform's local space into world space
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * (self.scale * local)
    }

    /// Map a world-space point into this transform's local space
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        (self.rotation.inverse() * (world - self.position)) / self.scale
    }
}

/// Parent-relative pose of a scene node.
///
/// Captured and restored verbatim, so equality is bitwise on the floats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalPose {
    /// Parent node, `None` when attached to the scene root
    pub parent: Option<EntityId>,
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for LocalPose {
    fn default() -> Self {
        Self {
            parent: None,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// How a renderer participates in shadow casting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShadowCastingMode {
    /// No shadows are cast
    Off,
    /// Shadows are cast and the renderer is visible
    #[default]
    On,
    /// Shadows are cast from both sides of faces
    TwoSided,
    /// Only the shadow is rendered, the mesh itself is hidden
    ShadowsOnly,
}

/// RGBA color with floating point components (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

    /// Create a color from RGB values (alpha = 1.0)
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from hue, saturation and value, each in `0.0..=1.0`
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let hue = hue.rem_euclid(1.0) * 6.0;
        let saturation = saturation.clamp(0.0, 1.0);
        let value = value.clamp(0.0, 1.0);

        let sector = hue.floor();
        let f = hue - sector;
        let p = value * (1.0 - saturation);
        let q = value * (1.0 - saturation * f);
        let t = value * (1.0 - saturation * (1.0 - f));

        match sector as u32 {
            0 => Self::rgb(value, t, p),
            1 => Self::rgb(q, value, p),
            2 => Self::rgb(p, value, t),
            3 => Self::rgb(p, q, value),
            4 => Self::rgb(t, p, value),
            _ => Self::rgb(value, p, q),
        }
    }

    /// Scale the RGB channels for emissive-style tints. Alpha becomes opaque.
    pub fn with_intensity(self, intensity: f32) -> Self {
        Self::rgb(self.r * intensity, self.g * intensity, self.b * intensity)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}
