// Change detection for sprite sheets on disk

use super::AssetError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Tracks sheet file modification times so edited sheets can be reloaded
#[derive(Debug)]
pub struct HotReloadWatcher {
    /// Last seen modification time per watched path
    file_times: HashMap<PathBuf, SystemTime>,

    /// Whether change detection is enabled
    enabled: bool,
}

impl HotReloadWatcher {
    pub fn new(enabled: bool) -> Self {
        Self {
            file_times: HashMap::new(),
            enabled,
        }
    }

    /// Register a file for watching, recording its current modification time
    pub fn watch_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), AssetError> {
        if !self.enabled {
            return Ok(());
        }

        let path = path.as_ref().to_path_buf();
        let mtime = Self::modification_time(&path)?;
        self.file_times.insert(path, mtime);

        Ok(())
    }

    /// Stop watching a file
    pub fn unwatch_file<P: AsRef<Path>>(&mut self, path: P) {
        self.file_times.remove(path.as_ref());
    }

    /// Check if a watched file was modified since the last check
    pub fn has_changed<P: AsRef<Path>>(&mut self, path: P) -> bool {
        if !self.enabled {
            return false;
        }

        let path = path.as_ref();
        let Ok(current) = Self::modification_time(path) else {
            return false;
        };

        match self.file_times.get_mut(path) {
            Some(last) if current > *last => {
                *last = current;
                true
            }
            _ => false,
        }
    }

    /// Check all watched files, returning the ones that changed
    pub fn check_all(&mut self) -> Vec<PathBuf> {
        if !self.enabled {
            return Vec::new();
        }

        let paths: Vec<PathBuf> = self.file_times.keys().cloned().collect();
        paths
            .into_iter()
            .filter(|path| self.has_changed(path))
            .collect()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of files being watched
    pub fn watched_count(&self) -> usize {
        self.file_times.len()
    }

    pub fn clear(&mut self) {
        self.file_times.clear();
    }

    fn modification_time(path: &Path) -> Result<SystemTime, AssetError> {
        Ok(std::fs::metadata(path)?.modified()?)
    }
}
