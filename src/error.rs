//! Error types for configuration and simulation lifecycle failures.
//!
//! Expected gameplay refusals (occupied cell, bedrock, cooldown, missed ray)
//! are plain `false`/`None` returns and never show up here.

/// A settings value that cannot describe a playable world.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("world dimension `{0}` must be positive")]
    NonPositiveDimension(&'static str),

    #[error("world dimension `{name}` must not exceed {max}")]
    DimensionTooLarge { name: &'static str, max: i32 },

    #[error("surface layer {surface_y} must lie below the world height {height}")]
    SurfaceAboveWorld { surface_y: i32, height: i32 },

    #[error("`{0}` must be a finite, positive number")]
    NonPositive(&'static str),

    #[error("`{0}` must be a finite, non-negative number")]
    Negative(&'static str),

    #[error("eye level {eye_level} must not exceed the player height {height}")]
    EyeAboveHead { eye_level: f32, height: f32 },

    #[error("rotation lerp factor {0} must be in (0, 1]")]
    LerpFactor(f32),

    #[error("max pitch {0} must be in (0, pi/2)")]
    MaxPitch(f32),

    #[error("failed to parse settings: {0}")]
    Parse(String),
}

/// Lifecycle failures surfaced to the host.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("simulation is not running (waiting for assets or failed)")]
    NotRunning,

    #[error("block textures failed to load: {0}")]
    AssetsFailed(String),
}
