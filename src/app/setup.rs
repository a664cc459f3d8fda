//! Startup system spawning the camera, the lights and the crosshair.
use crate::app::player::PlayerCamera;
use bevy::prelude::*;
use cavegame::sim::Simulation;

/// Vertical field of view of the player camera.
const CAMERA_FOV_DEGREES: f32 = 75.0;

/// Spawn the player camera at the spawn pose, a sun, ambient light and the
/// crosshair. World geometry arrives later, once the textures are loaded.
///
/// # Arguments
/// - `commands`: Commands used to spawn entities and insert resources.
/// - `sim`: initial player pose.
#[allow(clippy::needless_pass_by_value)]
pub fn setup(mut commands: Commands, sim: Res<Simulation>) {
    let pose = sim.player().pose();

    commands.spawn((
        Camera3dBundle {
            transform: Transform::from_translation(pose.position)
                .with_rotation(Quat::from_euler(EulerRot::YXZ, pose.yaw, pose.pitch, 0.0)),
            projection: PerspectiveProjection {
                fov: CAMERA_FOV_DEGREES.to_radians(),
                ..default()
            }
            .into(),
            ..default()
        },
        PlayerCamera,
    ));

    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            shadows_enabled: false,
            illuminance: 8000.0,
            ..default()
        },
        transform: Transform::from_xyz(0.0, 10.0, 0.0).looking_at(Vec3::new(0.4, 0.0, -0.7), Vec3::Y),
        ..default()
    });

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
    });
    commands.insert_resource(ClearColor(Color::srgb(0.53, 0.81, 0.92)));

    cavegame::ui::spawn_crosshair(&mut commands);
}
