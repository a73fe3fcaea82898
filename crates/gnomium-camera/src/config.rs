//! Camera rig configuration

use gnomium_physics::CollisionMask;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Lowest pitch the orbit camera may reach, in degrees (looking up)
pub const PITCH_MIN: f32 = -35.0;
/// Highest pitch the orbit camera may reach, in degrees (looking down)
pub const PITCH_MAX: f32 = 80.0;
/// Pitch the rig starts with
pub const INITIAL_PITCH: f32 = 15.0;
/// Raw scroll deltas are tiny, so each zoom step is scaled by this
pub const SCROLL_SCALE: f32 = 10.0;
/// Scroll deltas at or below this magnitude are ignored
pub const SCROLL_EPSILON: f32 = 1e-4;
/// The collision sweep starts this far behind the pivot
pub const CAST_START_OFFSET: f32 = 0.08;

/// Runtime tunables for the third-person camera rig.
///
/// Every field can be edited live from the config panel; call
/// [`CameraRigConfig::sanitized`] on user input before applying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraRigConfig {
    /// Height of the orbit pivot above the actor's feet
    pub cam_height: f32,
    /// Extra yaw added to the actor's heading, in degrees
    pub yaw_offset: f32,
    /// Degrees of pitch per unit of vertical look input
    pub mouse_sensitivity: f32,
    /// Zoom distance change per scroll tick (before scaling)
    pub zoom_step: f32,
    /// Closest zoom distance
    pub min_zoom: f32,
    /// Farthest zoom distance
    pub max_zoom: f32,
    /// Zoom distance when the rig is created
    pub default_zoom: f32,
    /// Invert the scroll wheel direction
    pub invert_scroll: bool,
    /// Hard floor on the camera's distance from the pivot
    pub min_absolute_distance: f32,
    /// Radius of the overlap and sweep probes
    pub sphere_radius: f32,
    /// Gap kept between the camera and a hit surface
    pub collision_buffer: f32,
    /// Smoothing time when the camera pulls in (seconds)
    pub zoom_in_time: f32,
    /// Smoothing time when the camera eases back out (seconds)
    pub zoom_out_time: f32,
    /// Consecutive blocked frames before collision correction engages
    pub overlap_frames_to_engage: u32,
    /// Obstacles with a smaller bounding-box diagonal are ignored
    pub min_obstacle_size: f32,
    /// Collider groups the probes consider
    pub collision_mask: CollisionMask,
}

impl Default for CameraRigConfig {
    fn default() -> Self {
        Self {
            cam_height: 1.5,
            yaw_offset: 0.0,
            mouse_sensitivity: 1.5,
            zoom_step: 0.2,
            min_zoom: 1.5,
            max_zoom: 4.5,
            default_zoom: 3.5,
            invert_scroll: false,
            min_absolute_distance: 0.9,
            sphere_radius: 0.22,
            collision_buffer: 0.20,
            zoom_in_time: 0.04,
            zoom_out_time: 0.12,
            overlap_frames_to_engage: 3,
            min_obstacle_size: 1.2,
            collision_mask: CollisionMask::ALL,
        }
    }
}

impl CameraRigConfig {
    /// Repair values a user edit could leave inconsistent.
    ///
    /// Swaps an inverted zoom range, makes distances and times non-negative,
    /// and keeps the debounce threshold at one frame or more.
    pub fn sanitized(mut self) -> Self {
        self.min_zoom = self.min_zoom.abs();
        self.max_zoom = self.max_zoom.abs();
        if self.min_zoom > self.max_zoom {
            warn!(
                "Camera zoom range inverted ({} > {}), swapping",
                self.min_zoom, self.max_zoom
            );
            std::mem::swap(&mut self.min_zoom, &mut self.max_zoom);
        }
        self.default_zoom = self.clamp_zoom(self.default_zoom.abs());
        self.zoom_step = self.zoom_step.max(0.0);
        self.min_absolute_distance = self.min_absolute_distance.max(0.0);
        self.sphere_radius = self.sphere_radius.max(0.0);
        self.collision_buffer = self.collision_buffer.max(0.0);
        self.zoom_in_time = self.zoom_in_time.max(0.0);
        self.zoom_out_time = self.zoom_out_time.max(0.0);
        self.overlap_frames_to_engage = self.overlap_frames_to_engage.max(1);
        self.min_obstacle_size = self.min_obstacle_size.max(0.0);
        self
    }

    /// Clamp an absolute zoom distance into `[min_zoom, max_zoom]`.
    ///
    /// Never panics, even if the range is inverted.
    pub fn clamp_zoom(&self, abs: f32) -> f32 {
        abs.max(self.min_zoom).min(self.max_zoom)
    }

    /// Distance the camera aims for before collision: the clamped zoom,
    /// floored at the absolute minimum
    pub fn target_distance(&self, zoom_abs: f32) -> f32 {
        self.clamp_zoom(zoom_abs).max(self.min_absolute_distance)
    }

    /// Smoothing time for moving from `current` toward `desired`
    pub fn smooth_time(&self, desired: f32, current: f32) -> f32 {
        if desired < current {
            self.zoom_in_time
        } else {
            self.zoom_out_time
        }
    }
}
