//! Mirror the voxel map as cube entities.
//!
//! Only exposed voxels get an entity. The map is rebuilt from a snapshot when
//! the world reports `Generated`; after that each `Placed` or `Removed` event
//! touches the changed cell and its six neighbours, whose exposure may have
//! flipped.

use crate::app::assets::BlockMaterials;
use bevy::prelude::*;
use bevy::utils::HashMap;
use cavegame::sim::Simulation;
use cavegame::world::{VoxelWorld, WorldEvent};

const NEIGHBOURS: [IVec3; 6] = [IVec3::X, IVec3::NEG_X, IVec3::Y, IVec3::NEG_Y, IVec3::Z, IVec3::NEG_Z];

/// Marks a rendered voxel with its block coordinate.
#[derive(Component)]
pub struct VoxelCube(pub IVec3);

/// Rendered cube per block coordinate.
#[derive(Resource, Default)]
pub struct VoxelEntities(HashMap<IVec3, Entity>);

impl VoxelEntities {
    fn refresh(&mut self, commands: &mut Commands, world: &VoxelWorld, materials: &BlockMaterials, coord: IVec3) {
        let want = world.is_exposed(coord);
        match (self.0.get(&coord).copied(), want) {
            (Some(entity), false) => {
                commands.entity(entity).despawn();
                self.0.remove(&coord);
            }
            (None, true) => {
                if let Some(kind) = world.get_block(coord) {
                    let entity = commands
                        .spawn((
                            PbrBundle {
                                mesh: materials.mesh.clone(),
                                material: materials.for_kind(kind),
                                transform: Transform::from_translation(coord.as_vec3() + Vec3::splat(0.5)),
                                ..default()
                            },
                            VoxelCube(coord),
                        ))
                        .id();
                    self.0.insert(coord, entity);
                }
            }
            _ => {}
        }
    }

    fn refresh_around(&mut self, commands: &mut Commands, world: &VoxelWorld, materials: &BlockMaterials, coord: IVec3) {
        self.refresh(commands, world, materials, coord);
        for d in NEIGHBOURS {
            self.refresh(commands, world, materials, coord + d);
        }
    }
}

/// Apply the world's change events to the rendered cubes.
///
/// # Arguments
/// - `commands`: spawns and despawns cube entities.
/// - `sim`: source of the change events and the voxel map.
/// - `materials`: cube mesh and materials; events wait until they exist.
/// - `entities`: coordinate to entity index.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_voxels(
    mut commands: Commands,
    mut sim: ResMut<Simulation>,
    materials: Option<Res<BlockMaterials>>,
    mut entities: ResMut<VoxelEntities>,
) {
    let Some(materials) = materials else { return };
    let events = sim.drain_events();
    if events.is_empty() {
        return;
    }
    let world = sim.world();
    for event in events {
        match event {
            WorldEvent::Generated => {
                for entity in entities.0.values() {
                    commands.entity(*entity).despawn();
                }
                entities.0.clear();
                let exposed: Vec<IVec3> = world.blocks().map(|(c, _)| c).filter(|c| world.is_exposed(*c)).collect();
                for coord in exposed {
                    entities.refresh(&mut commands, world, &materials, coord);
                }
                info!("spawned {} voxel cubes", entities.0.len());
            }
            WorldEvent::Placed { coord, .. } | WorldEvent::Removed { coord, .. } => {
                entities.refresh_around(&mut commands, world, &materials, coord);
            }
        }
    }
}
