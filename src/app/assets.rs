//! Block texture loading and the asset gate.
//!
//! The three block textures are requested at startup and polled every frame.
//! Once all of them are loaded they get a nearest-filter sampler, the cube
//! materials are built, and the simulation is told to generate its world.
//! A single failure fails the simulation instead.

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::render::texture::{ImageAddressMode, ImageFilterMode, ImageSampler, ImageSamplerDescriptor};
use cavegame::block::BlockKind;
use cavegame::sim::Simulation;

/// Texture paths in `BlockKind::texture_slot` order.
pub const TEXTURE_PATHS: [&str; 3] = [
    "textures/blocks/grass.png",
    "textures/blocks/stone.png",
    "textures/blocks/bedrock.png",
];

#[derive(Resource)]
pub struct BlockTextures {
    pub handles: [Handle<Image>; 3],
    settled: bool,
}

/// Shared cube mesh and one material per block kind.
#[derive(Resource)]
pub struct BlockMaterials {
    pub mesh: Handle<Mesh>,
    pub materials: [Handle<StandardMaterial>; 3],
}

impl BlockMaterials {
    #[must_use]
    pub fn for_kind(&self, kind: BlockKind) -> Handle<StandardMaterial> {
        self.materials[kind.texture_slot()].clone()
    }
}

/// Request the block textures.
#[allow(clippy::needless_pass_by_value)]
pub fn load_block_textures(mut commands: Commands, asset_server: Res<AssetServer>) {
    let handles = TEXTURE_PATHS.map(|path| asset_server.load(path));
    commands.insert_resource(BlockTextures { handles, settled: false });
}

/// Wait for every block texture, then open the gate (or fail it).
///
/// # Arguments
/// - `commands`: inserts `BlockMaterials` once the textures are usable.
/// - `asset_server`: load states of the texture handles.
/// - `textures`: the handles requested at startup.
/// - `images`: image storage, to switch the samplers to nearest filtering.
/// - `meshes`, `materials`: storage for the shared cube mesh and per-kind materials.
/// - `sim`: the simulation to start or fail.
#[allow(clippy::needless_pass_by_value)]
pub fn poll_block_textures(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut textures: ResMut<BlockTextures>,
    mut images: ResMut<Assets<Image>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut sim: ResMut<Simulation>,
) {
    if textures.settled {
        return;
    }

    let failed = textures
        .handles
        .iter()
        .zip(TEXTURE_PATHS)
        .find(|(h, _)| matches!(asset_server.get_load_state(h.id()), Some(LoadState::Failed(_))))
        .map(|(_, path)| path);
    if let Some(path) = failed {
        // Logged by the simulation.
        let _ = sim.assets_failed(path);
        textures.settled = true;
        return;
    }
    let all_loaded = textures
        .handles
        .iter()
        .all(|h| matches!(asset_server.get_load_state(h.id()), Some(LoadState::Loaded)));
    if !all_loaded {
        return;
    }

    for handle in &textures.handles {
        if let Some(image) = images.get_mut(handle) {
            image.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
                address_mode_u: ImageAddressMode::ClampToEdge,
                address_mode_v: ImageAddressMode::ClampToEdge,
                mag_filter: ImageFilterMode::Nearest,
                min_filter: ImageFilterMode::Nearest,
                ..Default::default()
            });
        }
    }

    commands.insert_resource(BlockMaterials {
        mesh: meshes.add(Cuboid::new(1.0, 1.0, 1.0)),
        materials: textures.handles.clone().map(|texture| {
            materials.add(StandardMaterial {
                base_color_texture: Some(texture),
                perceptual_roughness: 0.9,
                ..default()
            })
        }),
    });

    textures.settled = true;
    if let Err(e) = sim.assets_ready() {
        error!("{e}");
    }
}
