//! Player-related small systems: ticking the simulation and following the
//! player with the camera.
use bevy::prelude::*;
use cavegame::settings::Settings;
use cavegame::sim::{SimPhase, Simulation};

/// Marks the camera that follows the player's eyes.
#[derive(Component)]
pub struct PlayerCamera;

/// Advance the simulation by the frame delta. Nothing happens while the
/// textures are loading; a failed start is reported once.
#[allow(clippy::needless_pass_by_value)]
pub fn tick_simulation(time: Res<Time>, mut sim: ResMut<Simulation>, mut reported: Local<bool>) {
    if *sim.phase() == SimPhase::AwaitingAssets {
        return;
    }
    if let Err(e) = sim.tick(time.delta_seconds())
        && !*reported
    {
        error!("{e}");
        *reported = true;
    }
}

/// Copy the player pose into the camera transform.
///
/// # Arguments
/// - `sim`: source of the pose.
/// - `cameras`: transforms tagged with `PlayerCamera` to update.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_camera(sim: Res<Simulation>, mut cameras: Query<&mut Transform, With<PlayerCamera>>) {
    let pose = sim.player().pose();
    for mut t in &mut cameras {
        t.translation = pose.position;
        t.rotation = Quat::from_euler(EulerRot::YXZ, pose.yaw, pose.pitch, 0.0);
    }
}

/// Hand reloaded settings to the simulation.
#[allow(clippy::needless_pass_by_value)]
pub fn apply_settings_changes(settings: Res<Settings>, mut sim: ResMut<Simulation>) {
    if settings.is_changed() && !settings.is_added() {
        sim.apply_settings(settings.clone());
    }
}
