use bevy::diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use cavegame::debug::DebugDumpPlugin;
use cavegame::settings::loader as settings_loader;
use cavegame::sim::Simulation;
use cavegame::ui::render_target_outline;

mod app;
use app::{
    apply_settings_changes, dispatch_input_events, input_systems, load_block_textures,
    poll_block_textures, setup, sync_camera, sync_voxels, tick_simulation, PendingInput, VoxelEntities,
};

fn main() {
    let settings = settings_loader::load_settings_from_dir(settings_loader::SETTINGS_DIR);
    let settings_watcher = settings_loader::setup_settings_watcher(settings_loader::SETTINGS_DIR)
        .unwrap_or_else(|_| settings_loader::SettingsWatcher::stub());

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "cavegame".into(),
            position: WindowPosition::Centered(MonitorSelection::Primary),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }))
    .add_plugins(FrameTimeDiagnosticsPlugin)
    .add_plugins(LogDiagnosticsPlugin::default())
    .add_plugins(DebugDumpPlugin);

    app.insert_resource(Simulation::new(settings.clone()));
    app.insert_resource(settings);
    app.insert_resource(settings_watcher);
    app.insert_resource(PendingInput::default());
    app.insert_resource(VoxelEntities::default());

    app.add_systems(Startup, (setup, load_block_textures));
    app.add_systems(
        Update,
        (
            settings_loader::check_settings_changes,
            apply_settings_changes,
            poll_block_textures,
            input_systems(),
            tick_simulation,
            dispatch_input_events,
            sync_voxels,
            sync_camera,
            render_target_outline,
        )
            .chain(),
    );

    app.run();
}
