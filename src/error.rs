//! Errors surfaced at the host boundary

use thiserror::Error;

/// Failures inside a host frame. Caught and logged by [`crate::host::ModHost`].
#[derive(Debug, Error)]
pub enum HostError {
    #[error("no appearance painter attached")]
    PainterUnavailable,

    #[error("appearance painter failed: {0}")]
    Painter(String),
}
