//! Appearance overrides on the local actor

use gnomium_core::Color;
use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// Applies and clears per-actor material tints
pub trait AppearancePainter {
    /// Tint every renderer of the local actor
    fn apply_tint(&mut self, color: Color) -> Result<(), HostError>;

    /// Tint only the hat material on the head renderer.
    ///
    /// Returns `Ok(false)` when the actor has no head renderer or the head
    /// carries no clothing material.
    fn tint_hat(&mut self, color: Color) -> Result<bool, HostError>;

    /// Drop every override applied so far
    fn clear_overrides(&mut self) -> Result<(), HostError>;
}

/// Persisted hat color, picked in HSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HatSettings {
    /// Re-tint as soon as the color changes
    pub live_apply: bool,
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
    /// Channel multiplier, so the hat can glow under bloom
    pub intensity: f32,
}

impl Default for HatSettings {
    fn default() -> Self {
        Self {
            live_apply: true,
            hue: 0.0,
            saturation: 1.0,
            value: 1.0,
            intensity: 2.0,
        }
    }
}

impl HatSettings {
    /// Color handed to the painter
    pub fn color(&self) -> Color {
        Color::from_hsv(self.hue, self.saturation, self.value).with_intensity(self.intensity)
    }
}

#[cfg(test)]
pub mod recording {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum PaintCall {
        Tint(Color),
        Hat(Color),
        Clear,
    }

    /// Painter that remembers what it was asked to do
    #[derive(Clone, Default)]
    pub struct RecordingPainter {
        pub calls: Rc<RefCell<Vec<PaintCall>>>,
        pub fail: bool,
        /// Pretend the head has no clothing material
        pub bare_head: bool,
    }

    impl RecordingPainter {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<PaintCall> {
            self.calls.borrow().clone()
        }
    }

    impl AppearancePainter for RecordingPainter {
        fn apply_tint(&mut self, color: Color) -> Result<(), HostError> {
            if self.fail {
                return Err(HostError::Painter("material missing".to_string()));
            }
            self.calls.borrow_mut().push(PaintCall::Tint(color));
            Ok(())
        }

        fn tint_hat(&mut self, color: Color) -> Result<bool, HostError> {
            if self.fail {
                return Err(HostError::Painter("material missing".to_string()));
            }
            if self.bare_head {
                return Ok(false);
            }
            self.calls.borrow_mut().push(PaintCall::Hat(color));
            Ok(true)
        }

        fn clear_overrides(&mut self) -> Result<(), HostError> {
            if self.fail {
                return Err(HostError::Painter("material missing".to_string()));
            }
            self.calls.borrow_mut().push(PaintCall::Clear);
            Ok(())
        }
    }
}
