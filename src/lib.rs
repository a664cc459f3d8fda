pub mod block;
pub mod debug;
pub mod error;
pub mod player;
pub mod ron;
pub use crate::ron as ron_loader;
pub mod settings;
pub mod sim;
pub mod ui;
pub mod world;
