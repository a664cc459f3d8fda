//! Settings loading and hot-reloading.
//!
//! Settings are loaded from RON files in the `data/settings` directory. If
//! multiple RON files are present, the first one (by file name) that parses
//! and validates is used. Otherwise the defaults are used.
use crate::ron_loader::{load_ron_files, setup_ron_watcher, RonWatcher};
use crate::settings::Settings;
use bevy::log::{info, warn};
use bevy::prelude::{Res, ResMut, Resource};
use std::path::{Path, PathBuf};

/// Directory scanned for settings files, relative to the working directory.
pub const SETTINGS_DIR: &str = "data/settings";

#[derive(Resource)]
pub struct SettingsWatcher {
    pub watcher: RonWatcher,
    pub dir: PathBuf,
}

/// Load settings from `path` (directory).
///
/// # Arguments
/// * `path` - The directory where settings RON files are located (e.g., "data/settings").
///
/// # Returns
/// The first valid `Settings` found, or `Settings::defaults()`.
///
/// # Example
/// ```
/// let settings = cavegame::settings::loader::load_settings_from_dir("data/settings");
/// assert!(settings.validate().is_ok());
/// ```
#[must_use]
pub fn load_settings_from_dir(path: impl AsRef<Path>) -> Settings {
    let items: Vec<Settings> = load_ron_files(path.as_ref());
    for candidate in items {
        match candidate.validate() {
            Ok(()) => return candidate,
            Err(e) => warn!("Ignoring invalid settings in {}: {e}", path.as_ref().display()),
        }
    }
    Settings::defaults()
}

/// Create a watcher for the settings directory (hot-reload).
///
/// # Errors
/// Returns the `notify::Error` raised while registering the watcher.
pub fn setup_settings_watcher(path: impl AsRef<Path>) -> Result<SettingsWatcher, notify::Error> {
    let dir = path.as_ref().to_path_buf();
    setup_ron_watcher(&dir).map(|watcher| SettingsWatcher { watcher, dir })
}

/// Check for changes and reload the settings resource when files change.
///
/// World dimensions in the reloaded file only take effect on the next start;
/// everything else is picked up by the simulation on the following frame.
#[allow(clippy::needless_pass_by_value)]
pub fn check_settings_changes(watcher: Res<SettingsWatcher>, mut settings: ResMut<Settings>) {
    if !watcher.watcher.take_changed() {
        return;
    }
    info!("Settings changed, reloading...");
    let reloaded = load_settings_from_dir(&watcher.dir);
    if reloaded != *settings {
        *settings = reloaded;
    }
}

impl SettingsWatcher {
    #[must_use]
    pub fn stub() -> Self {
        SettingsWatcher {
            watcher: RonWatcher::stub(),
            dir: PathBuf::from(SETTINGS_DIR),
        }
    }
}
