pub mod assets;
pub mod input;
pub mod player;
pub mod render;
pub mod setup;

pub use assets::{load_block_textures, poll_block_textures};
pub use input::{dispatch_input_events, input_systems, PendingInput};
pub use player::{apply_settings_changes, sync_camera, tick_simulation};
pub use render::{sync_voxels, VoxelEntities};
pub use setup::setup;
