//! Frame-level glue between the game and the camera rig
//!
//! The game calls [`ModHost::on_update`] from its update pass, steps physics,
//! then calls [`ModHost::on_late_update`] once every body has moved.

use std::fmt;

use gnomium_camera::{CameraDriver, CameraHandle, CameraRig, MovableEntity, ViewMode};
use gnomium_core::Color;
use gnomium_physics::SpatialQuery;
use tracing::{error, info, warn};

use crate::error::HostError;
use crate::input::{HostAction, HostInput};
use crate::painter::{AppearancePainter, HatSettings};
use crate::settings::ModSettings;
use crate::speed::SpeedOverride;

/// Finds the scene objects the host cares about
pub trait SceneLocator {
    /// Camera currently rendering the player's view
    fn main_camera(&mut self) -> Option<Box<dyn CameraHandle>>;

    /// Behaviors that steer the main camera in first person
    fn camera_drivers(&mut self) -> Vec<Box<dyn CameraDriver>>;

    /// Actor the local player controls
    fn local_actor(&mut self) -> Option<Box<dyn MovableEntity>>;

    /// Every actor in the scene
    fn all_actors(&mut self) -> Vec<Box<dyn MovableEntity>>;
}

/// Snapshot shown in the status overlay
#[derive(Debug, Clone, PartialEq)]
pub struct HostStatus {
    pub scene: String,
    pub actor: Option<String>,
    pub speed: f32,
    pub view_mode: ViewMode,
    pub speed_all: bool,
    pub cam_height: f32,
    pub distance: f32,
    pub yaw_offset: f32,
    pub mouse_sensitivity: f32,
    pub zoom_step: f32,
    pub base_speed: f32,
    pub boost_speed: f32,
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scene: {}", self.scene)?;
        writeln!(f, "Actor: {}", self.actor.as_deref().unwrap_or("none"))?;
        writeln!(f, "Speed: {:.2} m/s", self.speed)?;
        writeln!(
            f,
            "View: {}",
            match self.view_mode {
                ViewMode::FirstPerson => "first person",
                ViewMode::ThirdPerson => "third person",
            }
        )?;
        writeln!(
            f,
            "Camera: height {:.2}  distance {:.2}  yaw {:.1}",
            self.cam_height, self.distance, self.yaw_offset
        )?;
        writeln!(
            f,
            "Mouse sens: {:.2}  zoom step: {:.2}",
            self.mouse_sensitivity, self.zoom_step
        )?;
        write!(
            f,
            "Base/boost: {:.1}/{:.1}{}",
            self.base_speed,
            self.boost_speed,
            if self.speed_all { "  [speed all]" } else { "" }
        )
    }
}

/// Owns the camera rig and the gameplay tweaks around it
pub struct ModHost {
    rig: CameraRig,
    speed: SpeedOverride,
    painter: Option<Box<dyn AppearancePainter>>,
    hat: HatSettings,
    /// Hat color changed with live apply on
    hat_pending: bool,
    tint_applied: bool,
    overlay_visible: bool,
    scene: String,
}

impl ModHost {
    pub fn new(settings: &ModSettings) -> Self {
        Self {
            rig: CameraRig::with_config(settings.camera.clone()),
            speed: SpeedOverride::new(settings.speed.clone()),
            painter: None,
            hat: settings.hat.clone(),
            hat_pending: false,
            tint_applied: false,
            overlay_visible: true,
            scene: String::new(),
        }
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn speed(&self) -> &SpeedOverride {
        &self.speed
    }

    pub fn set_painter(&mut self, painter: Box<dyn AppearancePainter>) {
        self.painter = Some(painter);
        self.tint_applied = false;
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    /// Replace the live tunables
    pub fn apply_settings(&mut self, settings: &ModSettings) {
        self.rig.set_config(settings.camera.clone());
        self.speed.set_settings(settings.speed.clone());
        if settings.hat != self.hat {
            self.hat = settings.hat.clone();
            self.hat_pending = self.hat.live_apply;
        }
    }

    /// Tunables as they stand now, for saving
    pub fn settings(&self) -> ModSettings {
        ModSettings {
            camera: self.rig.config().clone(),
            speed: self.speed.settings().clone(),
            hat: self.hat.clone(),
        }
    }

    /// Scene switch: every handle from the old scene is dead
    pub fn on_scene_loaded(&mut self, build_index: i32, name: &str) {
        info!("Scene loaded: {} ({})", name, build_index);
        self.scene = name.to_string();
        self.rig.clear_handles();
        self.tint_applied = false;
    }

    /// Update pass: runs before physics
    pub fn on_update(&mut self, scene: &mut dyn SceneLocator, input: &mut HostInput) {
        if let Err(e) = self.update(scene, input) {
            error!("Frame update failed: {}", e);
        }
    }

    /// Late-update pass: runs after physics has moved everything
    pub fn on_late_update(&mut self, query: &dyn SpatialQuery, dt: f32) {
        self.rig.tick_pose(query, dt);
    }

    fn update(
        &mut self,
        scene: &mut dyn SceneLocator,
        input: &mut HostInput,
    ) -> Result<(), HostError> {
        self.track_scene(scene);
        if !self.rig.has_actor() {
            return Ok(());
        }

        if input.is_just_pressed(HostAction::BoostUp) {
            self.speed.raise_boost();
        }
        if input.is_just_pressed(HostAction::BoostDown) {
            self.speed.lower_boost();
        }
        if input.is_just_pressed(HostAction::ToggleSpeedAll) {
            self.speed.toggle_speed_all();
        }

        let sprinting = input.is_held(HostAction::Sprint);
        if self.speed.speed_all() {
            for mut actor in scene.all_actors() {
                self.speed.push_forward(actor.as_mut(), sprinting);
            }
        } else if let Some(actor) = self.rig.actor_mut() {
            self.speed.apply(actor, input);
        }

        self.rig.tick_input(&input.look());

        if input.is_just_pressed(HostAction::DumpState) {
            self.dump_state();
        }

        if input.is_just_pressed(HostAction::ToggleView) {
            let mode = self.rig.toggle_view();
            self.rig.force_tracked_head_visible(mode.is_third_person());
        }

        if self.rig.take_input_reset() {
            input.clear_all();
        }

        if input.is_just_pressed(HostAction::ToggleOverlay) {
            self.overlay_visible = !self.overlay_visible;
        }

        if input.is_just_pressed(HostAction::ApplyTint) {
            self.painter()?.apply_tint(Color::RED)?;
            self.tint_applied = true;
            info!("Tint applied");
        }

        if input.is_just_pressed(HostAction::TintHat) || self.hat_pending {
            self.hat_pending = false;
            self.tint_hat()?;
        }

        if self.tint_applied && input.is_just_pressed(HostAction::ClearTint) {
            self.painter()?.clear_overrides()?;
            self.tint_applied = false;
            info!("Tint cleared");
        }

        Ok(())
    }

    /// Re-target the rig when the scene's camera or actor changed
    fn track_scene(&mut self, scene: &mut dyn SceneLocator) {
        if let Some(camera) = scene.main_camera() {
            if self.rig.set_camera(camera) {
                self.rig.set_camera_drivers(scene.camera_drivers());
            }
        }

        if let Some(actor) = scene.local_actor() {
            self.rig.set_actor(actor);
        }
    }

    fn tint_hat(&mut self) -> Result<(), HostError> {
        let color = self.hat.color();
        if self.painter()?.tint_hat(color)? {
            self.tint_applied = true;
            info!("Hat tinted {:?}", color);
        } else {
            warn!("No hat material on the local actor");
        }
        Ok(())
    }

    fn painter(&mut self) -> Result<&mut (dyn AppearancePainter + 'static), HostError> {
        self.painter
            .as_deref_mut()
            .ok_or(HostError::PainterUnavailable)
    }

    fn dump_state(&self) {
        let config = self.rig.config();
        info!(
            "Camera state: mode={:?} pitch={:.1} zoom={:.2} smoothed={:.2} overlap_frames={} height={:.2} sens={:.2}",
            self.rig.view_mode(),
            self.rig.pitch_degrees(),
            self.rig.zoom_distance(),
            self.rig.smoothed_distance(),
            self.rig.overlap_frames(),
            config.cam_height,
            config.mouse_sensitivity
        );
    }

    /// Overlay snapshot
    pub fn status(&self) -> HostStatus {
        let config = self.rig.config();
        let actor = self.rig.actor();
        HostStatus {
            scene: self.scene.clone(),
            actor: actor.map(|a| a.name()),
            speed: actor.map(|a| a.velocity().length()).unwrap_or(0.0),
            view_mode: self.rig.view_mode(),
            speed_all: self.speed.speed_all(),
            cam_height: config.cam_height,
            distance: self.rig.smoothed_distance(),
            yaw_offset: config.yaw_offset,
            mouse_sensitivity: config.mouse_sensitivity,
            zoom_step: config.zoom_step,
            base_speed: self.speed.settings().base_speed,
            boost_speed: self.speed.settings().boost_speed,
        }
    }
}
