//! Gnomium Camera - Third-person camera rig
//!
//! Orbits a tracked actor with smoothed zoom, debounced obstacle detection,
//! sphere-cast collision correction, and first/third-person switching that
//! hands the camera back exactly as it was found.

mod collision;
mod config;
mod handles;
mod input;
mod rig;
mod smoothing;

#[cfg(test)]
mod test_support;

pub use collision::ObstacleFilter;
pub use config::{
    CameraRigConfig, CAST_START_OFFSET, INITIAL_PITCH, PITCH_MAX, PITCH_MIN, SCROLL_EPSILON,
    SCROLL_SCALE,
};
pub use handles::{CameraDriver, CameraHandle, MovableEntity, RenderElement};
pub use input::LookInput;
pub use rig::{CameraRig, PoseFrame, ViewMode};
pub use smoothing::smooth_damp;
