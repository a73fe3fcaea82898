//! Per-frame look input

use glam::Vec2;

/// Raw look and scroll deltas for one frame.
///
/// The host samples its input devices and fills this in; the rig only reads
/// the vertical look axis and the scroll wheel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LookInput {
    /// Mouse movement this frame (x right, y up)
    pub look_delta: Vec2,
    /// Scroll wheel movement this frame, positive away from the user
    pub scroll: f32,
}

impl LookInput {
    pub fn new(look_delta: Vec2, scroll: f32) -> Self {
        Self { look_delta, scroll }
    }

    /// Scroll only, no look movement
    pub fn scroll(scroll: f32) -> Self {
        Self {
            look_delta: Vec2::ZERO,
            scroll,
        }
    }
}
