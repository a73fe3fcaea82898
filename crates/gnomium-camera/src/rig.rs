//! Third-person camera rig with collision-aware distance control
//!
//! The host drives the rig in two phases per simulation step:
//! [`CameraRig::tick_input`] before physics, and [`CameraRig::tick_pose`]
//! after physics so probes see current collider positions.
//!
//! Collision works in two stages. An overlap probe at the ideal camera
//! position counts consecutive blocked frames; only once that count reaches
//! the engage threshold does a sphere sweep from the pivot pick an exact
//! safe distance. The distance is then eased with a faster spring when
//! pulling in than when easing back out.

use glam::{Quat, Vec3};
use gnomium_core::{LocalPose, ShadowCastingMode, Transform};
use gnomium_physics::{ColliderInfo, SpatialQuery, OVERLAP_CAPACITY};
use rapier3d::prelude::ColliderHandle;
use tracing::{debug, info};

use crate::collision::ObstacleFilter;
use crate::config::{
    CameraRigConfig, CAST_START_OFFSET, INITIAL_PITCH, PITCH_MAX, PITCH_MIN, SCROLL_EPSILON,
    SCROLL_SCALE,
};
use crate::handles::{CameraDriver, CameraHandle, MovableEntity};
use crate::input::LookInput;
use crate::smoothing::smooth_damp;

/// Which pose source owns the camera transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// The game's own camera setup is in charge
    #[default]
    FirstPerson,
    /// The rig orbits the actor
    ThirdPerson,
}

impl ViewMode {
    /// Check if in third-person mode
    pub fn is_third_person(&self) -> bool {
        matches!(self, ViewMode::ThirdPerson)
    }
}

/// Accumulated orbit state
#[derive(Debug, Clone, Copy, PartialEq)]
struct OrbitState {
    /// Pitch in degrees, within [`PITCH_MIN`, `PITCH_MAX`]
    pitch: f32,
    /// Signed zoom offset; negative means behind the pivot
    zoom: f32,
    /// Eased distance actually used for the camera
    smoothed_distance: f32,
    /// Spring rate carried between frames
    smooth_velocity: f32,
}

/// What the pose phase computed on a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseFrame {
    /// Orbit center above the actor
    pub pivot: Vec3,
    /// Where the camera would sit with no obstacles
    pub ideal_position: Vec3,
    /// Clamped zoom distance
    pub target_distance: f32,
    /// A qualifying obstacle overlapped the ideal position
    pub ideal_blocked: bool,
    /// The corrective sweep ran this frame
    pub cast_fired: bool,
    /// Distance the spring is heading toward
    pub desired_distance: f32,
    /// Distance used for the final pose
    pub smoothed_distance: f32,
    /// Final camera position
    pub position: Vec3,
    /// Final camera rotation
    pub rotation: Quat,
}

/// Third-person camera rig
pub struct CameraRig {
    config: CameraRigConfig,
    mode: ViewMode,
    orbit: OrbitState,
    /// Consecutive frames the ideal position was blocked
    overlap_frames: u32,
    /// First-person pose captured on entering third person
    saved_pose: Option<LocalPose>,
    drivers: Vec<Box<dyn CameraDriver>>,
    camera: Option<Box<dyn CameraHandle>>,
    actor: Option<Box<dyn MovableEntity>>,
    actor_colliders: Vec<ColliderHandle>,
    overlap_buf: Vec<ColliderInfo>,
    /// Head shadow mode before the rig first touched it
    head_backup: Option<ShadowCastingMode>,
    input_reset_pending: bool,
    last_frame: Option<PoseFrame>,
}

impl CameraRig {
    /// Create a rig with the default tunables
    pub fn new() -> Self {
        Self::with_config(CameraRigConfig::default())
    }

    /// Create a rig with custom tunables
    pub fn with_config(config: CameraRigConfig) -> Self {
        let config = config.sanitized();
        let zoom = -config.default_zoom;
        let smoothed_distance = config.target_distance(config.default_zoom);

        Self {
            config,
            mode: ViewMode::FirstPerson,
            orbit: OrbitState {
                pitch: INITIAL_PITCH,
                zoom,
                smoothed_distance,
                smooth_velocity: 0.0,
            },
            overlap_frames: 0,
            saved_pose: None,
            drivers: Vec::new(),
            camera: None,
            actor: None,
            actor_colliders: Vec::new(),
            overlap_buf: Vec::with_capacity(OVERLAP_CAPACITY),
            head_backup: None,
            input_reset_pending: false,
            last_frame: None,
        }
    }

    pub fn config(&self) -> &CameraRigConfig {
        &self.config
    }

    /// Replace the tunables; the current zoom is re-clamped to the new range
    pub fn set_config(&mut self, config: CameraRigConfig) {
        self.config = config.sanitized();
        self.orbit.zoom = -self.config.clamp_zoom(self.orbit.zoom.abs());
        self.orbit.smoothed_distance = self
            .orbit
            .smoothed_distance
            .max(self.config.min_absolute_distance);
    }

    pub fn view_mode(&self) -> ViewMode {
        self.mode
    }

    pub fn is_third_person(&self) -> bool {
        self.mode.is_third_person()
    }

    pub fn has_camera(&self) -> bool {
        self.camera.is_some()
    }

    pub fn has_actor(&self) -> bool {
        self.actor.is_some()
    }

    /// Pitch in degrees
    pub fn pitch_degrees(&self) -> f32 {
        self.orbit.pitch
    }

    /// Set pitch directly, clamped to the orbit range
    pub fn set_pitch_degrees(&mut self, pitch: f32) {
        self.orbit.pitch = pitch.clamp(PITCH_MIN, PITCH_MAX);
    }

    /// Signed zoom offset (negative = behind the actor)
    pub fn zoom_distance(&self) -> f32 {
        self.orbit.zoom
    }

    pub fn smoothed_distance(&self) -> f32 {
        self.orbit.smoothed_distance
    }

    pub fn smooth_velocity(&self) -> f32 {
        self.orbit.smooth_velocity
    }

    pub fn overlap_frames(&self) -> u32 {
        self.overlap_frames
    }

    /// Result of the most recent pose phase that ran
    pub fn last_frame(&self) -> Option<&PoseFrame> {
        self.last_frame.as_ref()
    }

    /// The tracked actor, if any
    pub fn actor(&self) -> Option<&dyn MovableEntity> {
        self.actor.as_deref()
    }

    pub fn actor_mut(&mut self) -> Option<&mut (dyn MovableEntity + 'static)> {
        self.actor.as_deref_mut()
    }

    /// Number of camera drivers the rig manages
    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    /// Point the rig at a camera.
    ///
    /// Returns `false` without doing anything if it is the same camera.
    /// Switching cameras while in third person hands the old camera back to
    /// first person first.
    pub fn set_camera(&mut self, camera: Box<dyn CameraHandle>) -> bool {
        if self.camera.as_ref().is_some_and(|c| c.id() == camera.id()) {
            return false;
        }

        if self.mode.is_third_person() {
            self.exit_third_person();
        }

        info!("Camera rig bound to camera {:?}", camera.id());
        self.camera = Some(camera);
        self.sync_smoothed_distance();
        true
    }

    /// Replace the set of behaviors toggled alongside the view mode
    pub fn set_camera_drivers(&mut self, drivers: Vec<Box<dyn CameraDriver>>) {
        if !drivers.is_empty() {
            let names: Vec<String> = drivers.iter().map(|d| d.name()).collect();
            info!("Camera drivers: {}", names.join(", "));
        }
        self.drivers = drivers;
    }

    /// Track an actor. Returns `false` if it is already tracked.
    pub fn set_actor(&mut self, actor: Box<dyn MovableEntity>) -> bool {
        if self.actor.as_ref().is_some_and(|a| a.id() == actor.id()) {
            return false;
        }

        self.actor_colliders = actor.colliders();
        info!(
            "Camera rig tracking '{}' ({} colliders)",
            actor.name(),
            self.actor_colliders.len()
        );
        self.actor = Some(actor);
        self.head_backup = None;
        true
    }

    /// Forget every scene handle (the scene they lived in is gone).
    ///
    /// Drops to first person without restoring anything.
    pub fn clear_handles(&mut self) {
        self.mode = ViewMode::FirstPerson;
        self.saved_pose = None;
        self.drivers.clear();
        self.camera = None;
        self.actor = None;
        self.actor_colliders.clear();
        self.overlap_buf.clear();
        self.overlap_frames = 0;
        self.head_backup = None;
        self.last_frame = None;
    }

    /// Switch between first and third person. Needs both handles set.
    pub fn toggle_view(&mut self) -> ViewMode {
        if self.camera.is_none() || self.actor.is_none() {
            return self.mode;
        }

        match self.mode {
            ViewMode::FirstPerson => self.enter_third_person(),
            ViewMode::ThirdPerson => self.exit_third_person(),
        }
        self.mode
    }

    /// Returns `true` once after leaving third person; the host should then
    /// discard any look input it has buffered.
    pub fn take_input_reset(&mut self) -> bool {
        std::mem::take(&mut self.input_reset_pending)
    }

    fn enter_third_person(&mut self) {
        let Some(camera) = self.camera.as_deref() else {
            return;
        };

        self.saved_pose = Some(camera.local_pose());
        self.set_drivers_enabled(false);
        self.sync_smoothed_distance();
        self.overlap_frames = 0;
        self.mode = ViewMode::ThirdPerson;
        info!("Third-person camera ON");
    }

    fn exit_third_person(&mut self) {
        self.set_drivers_enabled(true);
        if let (Some(camera), Some(pose)) = (self.camera.as_deref_mut(), self.saved_pose.take()) {
            camera.set_local_pose(pose);
        }
        self.input_reset_pending = true;
        self.mode = ViewMode::FirstPerson;
        info!("Third-person camera OFF (first-person restored)");
    }

    fn set_drivers_enabled(&mut self, enabled: bool) {
        for driver in &mut self.drivers {
            driver.set_enabled(enabled);
        }
    }

    fn sync_smoothed_distance(&mut self) {
        self.orbit.smoothed_distance = self.config.target_distance(self.orbit.zoom.abs());
        self.orbit.smooth_velocity = 0.0;
    }

    /// Input phase: integrate pitch and scroll zoom
    pub fn tick_input(&mut self, input: &LookInput) {
        if !self.mode.is_third_person() || self.actor.is_none() || self.camera.is_none() {
            return;
        }

        let pitch = self.orbit.pitch - input.look_delta.y * self.config.mouse_sensitivity;
        self.orbit.pitch = pitch.clamp(PITCH_MIN, PITCH_MAX);

        let mut scroll = input.scroll;
        if scroll.abs() > SCROLL_EPSILON {
            if self.config.invert_scroll {
                scroll = -scroll;
            }

            let abs = self.orbit.zoom.abs() - scroll * self.config.zoom_step * SCROLL_SCALE;
            self.orbit.zoom = -self.config.clamp_zoom(abs);
        }
    }

    /// Pose phase: probe for obstacles, ease the distance, place the camera.
    ///
    /// Must run after the physics step. Returns `None` when the rig is not
    /// driving the camera this frame.
    pub fn tick_pose(&mut self, query: &dyn SpatialQuery, dt: f32) -> Option<PoseFrame> {
        if !self.mode.is_third_person() {
            return None;
        }
        let (Some(actor), Some(camera)) = (self.actor.as_deref(), self.camera.as_deref_mut())
        else {
            return None;
        };
        let config = &self.config;

        let rotation = Transform::rotation_from_pitch_yaw_degrees(
            self.orbit.pitch,
            actor.yaw_degrees() + config.yaw_offset,
        );
        let pivot = actor.position() + Vec3::Y * config.cam_height;
        let target_distance = config.target_distance(self.orbit.zoom.abs());
        let back = (rotation * Vec3::NEG_Z).normalize();
        let ideal_position = pivot + back * target_distance;

        let filter = ObstacleFilter::new(actor, &self.actor_colliders, config.min_obstacle_size);

        query.overlap_sphere(
            ideal_position,
            config.sphere_radius,
            config.collision_mask,
            &mut self.overlap_buf,
        );
        let ideal_blocked = self.overlap_buf.iter().any(|info| filter.qualifies(info));
        self.overlap_frames = if ideal_blocked {
            self.overlap_frames.saturating_add(1)
        } else {
            0
        };

        let mut desired_distance = target_distance;
        let cast_fired = self.overlap_frames >= config.overlap_frames_to_engage;
        if cast_fired {
            let start = pivot + back * CAST_START_OFFSET;
            let hit = query.sphere_cast(
                start,
                config.sphere_radius,
                back,
                target_distance,
                config.collision_mask,
                &|info: &ColliderInfo| filter.qualifies(info),
            );
            if let Some(hit) = hit {
                desired_distance =
                    (hit.distance - config.collision_buffer).max(config.min_absolute_distance);
                debug!(
                    "Camera blocked by {:?} at {:.2}, pulling in to {:.2}",
                    hit.collider.handle, hit.distance, desired_distance
                );
            }
        }

        let smooth_time = config.smooth_time(desired_distance, self.orbit.smoothed_distance);
        let smoothed_distance = smooth_damp(
            self.orbit.smoothed_distance,
            desired_distance,
            &mut self.orbit.smooth_velocity,
            smooth_time,
            dt,
        )
        .max(config.min_absolute_distance);
        self.orbit.smoothed_distance = smoothed_distance;

        let position = pivot + back * smoothed_distance;
        camera.set_world_pose(position, rotation);

        let frame = PoseFrame {
            pivot,
            ideal_position,
            target_distance,
            ideal_blocked,
            cast_fired,
            desired_distance,
            smoothed_distance,
            position,
            rotation,
        };
        self.last_frame = Some(frame);
        Some(frame)
    }

    /// Make the actor's head renderer cast a visible body in third person.
    ///
    /// The first call remembers the head's original shadow mode; later calls
    /// with `visible == false` put it back. Returns `false` if the actor has
    /// no renderer named like a head.
    pub fn force_head_visible(&mut self, visible: bool, actor: &dyn MovableEntity) -> bool {
        apply_head_visibility(&mut self.head_backup, visible, actor)
    }

    /// [`Self::force_head_visible`] on the tracked actor
    pub fn force_tracked_head_visible(&mut self, visible: bool) -> bool {
        match self.actor.as_deref() {
            Some(actor) => apply_head_visibility(&mut self.head_backup, visible, actor),
            None => false,
        }
    }
}

fn apply_head_visibility(
    backup: &mut Option<ShadowCastingMode>,
    visible: bool,
    actor: &dyn MovableEntity,
) -> bool {
    let head = actor
        .render_elements()
        .into_iter()
        .find(|r| r.name().to_ascii_lowercase().contains("head"));

    let Some(mut head) = head else {
        debug!("No head renderer found under '{}'", actor.name());
        return false;
    };

    let original = *backup.get_or_insert(head.shadow_mode());
    let mode = if visible {
        ShadowCastingMode::On
    } else {
        original
    };
    head.set_shadow_mode(mode);
    info!("Head '{}' shadow casting mode => {:?}", head.name(), mode);
    true
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new()
    }
}
