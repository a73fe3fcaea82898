//! Gnomium - third-person camera and gameplay tweaks
//!
//! Runs the host against a headless sandbox scene with a scripted player, so
//! the camera rig can be watched in the logs.

mod error;
mod host;
mod input;
mod painter;
mod sandbox;
mod settings;
mod speed;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::host::ModHost;
use crate::input::{HostAction, HostInput};
use crate::sandbox::Sandbox;
use crate::settings::ModSettings;

const FRAME_DT: f32 = 1.0 / 60.0;
const FRAMES: u32 = 600;

/// What the scripted player does on a given frame
fn scripted_input(frame: u32, input: &mut HostInput) {
    let tapped = script_tap(frame);
    for action in [
        HostAction::ToggleView,
        HostAction::ApplyTint,
        HostAction::TintHat,
        HostAction::ClearTint,
        HostAction::ToggleSpeedAll,
        HostAction::DumpState,
        HostAction::BoostUp,
    ] {
        if tapped == Some(action) {
            input.press(action);
        } else {
            input.release(action);
        }
    }

    // Back up toward the cottage
    if (30..60).contains(&frame) {
        input.press(HostAction::MoveBackward);
    } else {
        input.release(HostAction::MoveBackward);
    }

    if (90..100).contains(&frame) {
        input.scroll = 0.1;
    }
    if (110..130).contains(&frame) {
        input.look_delta.y = -2.0;
    }
}

fn script_tap(frame: u32) -> Option<HostAction> {
    match frame {
        1 | 480 => Some(HostAction::ToggleView),
        150 => Some(HostAction::ApplyTint),
        170 => Some(HostAction::TintHat),
        200 => Some(HostAction::ClearTint),
        270 => Some(HostAction::BoostUp),
        300 | 360 => Some(HostAction::ToggleSpeedAll),
        420 => Some(HostAction::DumpState),
        _ => None,
    }
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    info!("Starting Gnomium camera sandbox...");

    let settings = ModSettings::load();
    let mut host = ModHost::new(&settings);
    let mut sandbox = Sandbox::new();
    host.on_scene_loaded(sandbox.build_index(), sandbox.scene_name());
    host.set_painter(Box::new(sandbox.painter()));

    let mut input = HostInput::new();
    for frame in 0..FRAMES {
        scripted_input(frame, &mut input);

        if frame == 240 {
            sandbox.set_actor_yaw(90.0);
        }
        if frame == 540 {
            let (index, name) = sandbox.reload();
            host.on_scene_loaded(index, &name);
            host.set_painter(Box::new(sandbox.painter()));
        }

        host.on_update(&mut sandbox, &mut input);
        sandbox.step(FRAME_DT);
        host.on_late_update(sandbox.physics(), FRAME_DT);
        input.clear_frame();

        if frame % 60 == 0 && host.overlay_visible() {
            info!("Frame {}\n{}", frame, host.status());
            info!(
                "Camera at {:?} (blocked {} frames), actor at {:?}, wanderer at {:?}, tint {:?}, hat {:?}, driver {}, speed-all {}",
                sandbox.camera_world_position(),
                host.rig().overlap_frames(),
                sandbox.actor_position(),
                sandbox.npc_position(0),
                sandbox.actor_tint(),
                sandbox.actor_hat_tint(),
                if sandbox.driver_enabled() { "on" } else { "off" },
                host.speed().speed_all()
            );
        }
    }

    if std::env::args().any(|arg| arg == "--save-settings") {
        let path = host.settings().save().context("Failed to save settings")?;
        info!("Settings written to {:?}", path);
    }

    info!("Sandbox run finished");
    Ok(())
}
