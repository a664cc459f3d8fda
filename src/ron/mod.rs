//! Utilities for loading RON files and watching directories for changes.
//!
//! `load_ron_files` reads every `.ron` file in a directory, in file-name order,
//! and `setup_ron_watcher` raises a shared flag whenever something under the
//! directory is modified. Together they back the hot-reloadable settings.

use bevy::log::warn;
use bevy::prelude::Resource;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// File-watcher resource for RON hot-reload.
#[derive(Resource)]
pub struct RonWatcher {
    changed: Arc<AtomicBool>,
    _watcher: Option<RecommendedWatcher>, // kept alive for as long as the resource lives
}

impl RonWatcher {
    /// Create a `RonWatcher` without an OS watcher behind it. Its flag only
    /// changes through [`RonWatcher::mark_changed`].
    #[must_use]
    pub fn stub() -> Self {
        RonWatcher {
            changed: Arc::new(AtomicBool::new(false)),
            _watcher: None,
        }
    }

    /// Return whether a change was observed since the last call, clearing the flag.
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::AcqRel)
    }

    /// Raise the change flag by hand.
    pub fn mark_changed(&self) {
        self.changed.store(true, Ordering::Release);
    }
}

/// Load all `.ron` files from a directory and deserialize them into `T`.
///
/// # Arguments
/// * `path` - Directory path to scan for `.ron` files.
///
/// # Return
/// A `Vec<T>` with every file that parsed, ordered by file name. Files that
/// fail to parse are skipped with a warning.
#[must_use]
pub fn load_ron_files<T: DeserializeOwned>(path: impl AsRef<Path>) -> Vec<T> {
    let Ok(entries) = std::fs::read_dir(path.as_ref()) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    files.sort();

    let mut items = Vec::new();
    for file in files {
        match std::fs::read_to_string(&file) {
            Ok(content) => match ron::from_str::<T>(&content) {
                Ok(item) => items.push(item),
                Err(e) => warn!("Failed to parse {}: {e}", file.display()),
            },
            Err(e) => warn!("Failed to read {}: {e}", file.display()),
        }
    }
    items
}

/// Create a `RonWatcher` that watches a directory for modifications.
///
/// # Arguments
/// * `path` - Directory path to watch for `.ron` file changes.
///
/// # Errors
/// Returns a `notify::Error` if the underlying file-watcher cannot be
/// created or the watcher cannot be registered for the provided path.
pub fn setup_ron_watcher(path: impl AsRef<Path>) -> Result<RonWatcher, notify::Error> {
    let path = path.as_ref();
    let changed = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&changed);
    let watched: PathBuf = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                let touches_dir = event.paths.iter().any(|p| {
                    std::fs::canonicalize(p)
                        .unwrap_or_else(|_| p.clone())
                        .starts_with(&watched)
                });
                if matches!(event.kind, notify::EventKind::Modify(_) | notify::EventKind::Create(_))
                    && touches_dir
                {
                    flag.store(true, Ordering::Release);
                }
            }
            Err(e) => warn!("Watch error: {e:?}"),
        },
        Config::default(),
    )?;

    watcher.watch(path, RecursiveMode::NonRecursive)?;
    Ok(RonWatcher { changed, _watcher: Some(watcher) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        value: i32,
    }

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cavegame-ron-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_ron_files_in_name_order_and_skips_bad_ones() {
        let dir = scratch_dir("load");
        std::fs::write(dir.join("b.ron"), "(value: 2)").unwrap();
        std::fs::write(dir.join("a.ron"), "(value: 1)").unwrap();
        std::fs::write(dir.join("c.ron"), "(value: ").unwrap();
        std::fs::write(dir.join("notes.txt"), "(value: 9)").unwrap();

        let items: Vec<Item> = load_ron_files(&dir);
        assert_eq!(items, vec![Item { value: 1 }, Item { value: 2 }]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_dir_yields_nothing() {
        let items: Vec<Item> = load_ron_files("/definitely/not/here");
        assert!(items.is_empty());
    }

    #[test]
    fn stub_flag_is_taken_once() {
        let w = RonWatcher::stub();
        assert!(!w.take_changed());
        w.mark_changed();
        assert!(w.take_changed());
        assert!(!w.take_changed());
    }
}
