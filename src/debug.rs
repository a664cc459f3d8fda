//! Debug utilities, including a system (F3 default) that dumps the simulation
//! state, frame timing and entity counts to a timestamped text file in
//! './debug-dumps/'.
//!
//! Useful for capturing what the player, the world and the crosshair target
//! looked like at a given moment without attaching a debugger.
use crate::block::BlockKind;
use crate::settings::Settings;
use crate::sim::Simulation;
use bevy::diagnostic::{Diagnostic, DiagnosticPath, DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory dumps are written to, relative to the working directory.
pub const DUMP_DIR: &str = "debug-dumps";

pub struct DebugDumpPlugin;

impl Plugin for DebugDumpPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, debug_input_system);
    }
}

/// Build the human-readable state report.
///
/// # Arguments
/// * `sim` - simulation to describe
/// * `at` - timestamp printed in the header
#[must_use]
pub fn state_report(sim: &Simulation, at: DateTime<Utc>) -> String {
    let world = sim.world();
    let dims = world.dimensions();
    let player = sim.player();
    let pose = player.pose();

    let mut counts = [0usize; BlockKind::ALL.len()];
    for (_, kind) in world.blocks() {
        counts[kind.texture_slot()] += 1;
    }

    let mut out = String::new();
    writeln!(out, "Debug dump: {}", at.timestamp()).ok();
    writeln!(out, "Timestamp: {}", at.format("%Y-%m-%d %H:%M:%S")).ok();
    writeln!(out, "Phase: {:?}", sim.phase()).ok();
    writeln!(out, "World: {}x{}x{} (surface y={})", dims.x, dims.y, dims.z, world.surface_y()).ok();
    writeln!(out, "Blocks: {} total", world.len()).ok();
    for kind in BlockKind::ALL {
        writeln!(out, "  {kind}: {}", counts[kind.texture_slot()]).ok();
    }
    writeln!(out, "Bottom layer: {}/{}", world.count_layer(0), dims.x * dims.z).ok();
    writeln!(
        out,
        "Player: pos=({:.3}, {:.3}, {:.3}) pitch={:.3} yaw={:.3}",
        pose.position.x, pose.position.y, pose.position.z, pose.pitch, pose.yaw
    )
    .ok();
    writeln!(
        out,
        "  vy={:.3} grounded={} air_time={:.3}",
        player.velocity_y, player.grounded, player.air_time
    )
    .ok();
    let _ = match sim.target() {
        Some(hit) => writeln!(out, "Target: {} at {} via {:?} ({:.2} away)", hit.kind, hit.coord, hit.face, hit.distance),
        None => writeln!(out, "Target: none"),
    };
    out
}

/// Write `report` to `dir/debug-<epoch secs>.txt`.
///
/// # Errors
/// Any I/O error from creating the directory or writing the file.
pub fn write_dump(dir: impl AsRef<Path>, report: &str, at: DateTime<Utc>) -> std::io::Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let fname = dir.join(format!("debug-{}.txt", at.timestamp()));
    fs::write(&fname, report)?;
    Ok(fname)
}

/// A Bevy system that listens for the (debug, default F3) key press and
/// writes a dump of the simulation state plus frame timing and entity count.
///
/// # Arguments
/// * `keys` - keyboard input, used to detect the dump key
/// * `settings` - key bindings
/// * `sim` - simulation whose state is dumped
/// * `diagnostics` - frame time diagnostics (FPS)
/// * `query_entities` - counts the total number of entities
#[allow(clippy::needless_pass_by_value)]
fn debug_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    sim: Option<Res<Simulation>>,
    diagnostics: Option<Res<DiagnosticsStore>>,
    query_entities: Query<Entity>,
) {
    if !keys.just_pressed(settings.key_for("dump_debug", KeyCode::F3)) {
        return;
    }
    let Some(sim) = sim else { return };

    let now = Utc::now();
    let mut out = state_report(&sim, now);

    let smoothed = |path: &DiagnosticPath| {
        diagnostics
            .as_ref()
            .and_then(|d| d.get(path))
            .and_then(Diagnostic::smoothed)
            .unwrap_or(0.0)
    };
    let fps = smoothed(&FrameTimeDiagnosticsPlugin::FPS);
    let frame_time = smoothed(&FrameTimeDiagnosticsPlugin::FRAME_TIME);
    writeln!(out, "FPS: {fps:.1}, frame_time: {frame_time:.2} ms").ok();
    writeln!(out, "Entities: {}", query_entities.iter().count()).ok();

    match write_dump(DUMP_DIR, &out, now) {
        Ok(path) => info!("wrote debug dump: {}", path.display()),
        Err(e) => error!("debug dump: failed to write into '{DUMP_DIR}': {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn report_describes_world_and_player() {
        let mut sim = Simulation::with_seed(Settings::defaults(), 0);
        sim.assets_ready().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let report = state_report(&sim, at);
        assert!(report.contains("Timestamp: 2024-05-01 12:30:00"));
        assert!(report.contains("Phase: Running"));
        assert!(report.contains("World: 128x32x128"));
        assert!(report.contains("grass: 16384"));
        assert!(report.contains("cobblestone: 98304"));
        assert!(report.contains("Bottom layer: 16384/16384"));
        assert!(report.contains("Target: none"));
    }

    #[test]
    fn dump_lands_in_timestamped_file() {
        let dir = std::env::temp_dir().join(format!("cavegame-dump-{}", std::process::id()));
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let path = write_dump(&dir, "hello", at).unwrap();
        assert_eq!(path.file_name().unwrap(), format!("debug-{}.txt", at.timestamp()).as_str());
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
        let _ = fs::remove_dir_all(&dir);
    }
}
