//! HUD helpers: the crosshair and the outline around the targeted block.
//!
//! The crosshair is a pair of UI bars centred on screen. The outline is drawn
//! with gizmos each frame from `Simulation::target`, so it always follows the
//! block a break or place would act on.

use crate::sim::Simulation;
use crate::world::RaycastHit;
use bevy::prelude::*;

/// Marker for the crosshair root node.
#[derive(Component)]
pub struct Crosshair;

/// Spawn a centred white crosshair.
///
/// # Arguments
/// * `commands` - `Commands` used to spawn the UI nodes
pub fn spawn_crosshair(commands: &mut Commands) {
    commands
        .spawn((
            NodeBundle {
                style: Style {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    ..default()
                },
                ..default()
            },
            Crosshair,
        ))
        .with_children(|p| {
            for (w, h) in [(20.0, 2.0), (2.0, 20.0)] {
                p.spawn(NodeBundle {
                    style: Style {
                        position_type: PositionType::Absolute,
                        width: Val::Px(w),
                        height: Val::Px(h),
                        ..default()
                    },
                    background_color: Color::WHITE.into(),
                    ..default()
                });
            }
        });
}

/// World-space box slightly larger than the hit cell, so the outline is not
/// hidden by the cube faces.
#[must_use]
pub fn outline_transform(hit: &RaycastHit) -> Transform {
    Transform::from_translation(hit.coord.as_vec3() + Vec3::splat(0.5)).with_scale(Vec3::splat(1.01))
}

/// Draw a wireframe cube around the block under the crosshair.
///
/// # Arguments
/// * `sim` - simulation providing the current target
/// * `gizmos` - gizmo drawing context
#[allow(clippy::needless_pass_by_value)]
pub fn render_target_outline(sim: Res<Simulation>, mut gizmos: Gizmos) {
    if !sim.is_running() {
        return;
    }
    if let Some(hit) = sim.target() {
        gizmos.cuboid(outline_transform(&hit), Color::BLACK);
    }
}
