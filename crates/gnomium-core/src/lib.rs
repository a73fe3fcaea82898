//! Gnomium Core - Shared types for the Gnomium camera rig and host
//!
//! This crate provides the foundational types used by every other crate:
//! - Mathematical primitives (re-exported from glam)
//! - Transform and parent-relative pose for scene nodes
//! - Entity identity, shadow modes, and colors

pub mod types;

pub use glam::{Quat, Vec2, Vec3};
pub use types::{Color, EntityId, LocalPose, ShadowCastingMode, Transform};
