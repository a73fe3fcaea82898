//! Host input snapshot
//!
//! The game's own input layer fills a [`HostInput`] each frame; the host only
//! reads actions and deltas from it.

use std::collections::HashSet;

use glam::Vec2;
use gnomium_camera::LookInput;
use serde::{Deserialize, Serialize};

/// Actions the host reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostAction {
    /// Move forward (W)
    MoveForward,
    /// Move backward (S)
    MoveBackward,
    /// Move left (A)
    MoveLeft,
    /// Move right (D)
    MoveRight,
    /// Sprint modifier, switches to the boost speed (Shift)
    Sprint,
    /// Switch first/third person (F7)
    ToggleView,
    /// Push every actor in the scene forward (F8)
    ToggleSpeedAll,
    /// Raise the boost speed (Keypad +)
    BoostUp,
    /// Lower the boost speed (Keypad -)
    BoostDown,
    /// Tint the local actor (F9)
    ApplyTint,
    /// Recolor the hat with the saved hat color (F12)
    TintHat,
    /// Drop tint overrides (F11)
    ClearTint,
    /// Log the camera rig state (F6)
    DumpState,
    /// Show or hide the status overlay (Insert)
    ToggleOverlay,
}

/// Input state for one frame
#[derive(Debug, Clone, Default)]
pub struct HostInput {
    /// Actions currently held down
    pub held: HashSet<HostAction>,
    /// Actions that were just pressed this frame
    pub just_pressed: HashSet<HostAction>,
    /// Mouse movement delta for this frame
    pub look_delta: Vec2,
    /// Scroll wheel delta for this frame
    pub scroll: f32,
}

impl HostInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an action is currently held
    pub fn is_held(&self, action: HostAction) -> bool {
        self.held.contains(&action)
    }

    /// Check if an action was just pressed this frame
    pub fn is_just_pressed(&self, action: HostAction) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Record a key going down this frame
    pub fn press(&mut self, action: HostAction) {
        if self.held.insert(action) {
            self.just_pressed.insert(action);
        }
    }

    pub fn release(&mut self, action: HostAction) {
        self.held.remove(&action);
    }

    /// Deltas handed to the camera rig
    pub fn look(&self) -> LookInput {
        LookInput::new(self.look_delta, self.scroll)
    }

    /// Clear frame-specific data (call at end of frame)
    pub fn clear_frame(&mut self) {
        self.just_pressed.clear();
        self.look_delta = Vec2::ZERO;
        self.scroll = 0.0;
    }

    /// Clear all input state
    pub fn clear_all(&mut self) {
        self.held.clear();
        self.just_pressed.clear();
        self.look_delta = Vec2::ZERO;
        self.scroll = 0.0;
    }
}
