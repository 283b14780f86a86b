// Shared sprite sheet cache

use super::atlas::SlicePolicy;
use super::hot_reload::HotReloadWatcher;
use super::loader::SheetLoader;
use super::sheet::SpriteSheet;
use super::AssetError;
use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Identifies one slicing of one sheet file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetKey {
    pub name: String,
    pub frame_width: u32,
    pub frame_height: u32,
    pub policy: SlicePolicy,
}

impl SheetKey {
    pub fn new(name: &str, frame_width: u32, frame_height: u32, policy: SlicePolicy) -> Self {
        Self {
            name: name.to_string(),
            frame_width,
            frame_height,
            policy,
        }
    }
}

/// Caches decoded sheets so characters using the same file share one copy
///
/// Sheets are handed out as `Arc<SpriteSheet>`. A reload replaces the cached
/// `Arc`; characters holding the old one keep it until they are given the new
/// sheet.
#[derive(Debug)]
pub struct SheetStore {
    loader: SheetLoader,
    watcher: HotReloadWatcher,
    sheets: HashMap<SheetKey, Arc<SpriteSheet>>,
}

impl SheetStore {
    /// Create a store rooted at `base_path`, with change detection on or off
    pub fn new<P: AsRef<Path>>(base_path: P, watch: bool) -> Self {
        Self {
            loader: SheetLoader::new(base_path),
            watcher: HotReloadWatcher::new(watch),
            sheets: HashMap::new(),
        }
    }

    /// Load a sheet, or return the cached copy if it was already loaded
    pub fn load(
        &mut self,
        name: &str,
        frame_width: u32,
        frame_height: u32,
        policy: SlicePolicy,
    ) -> Result<Arc<SpriteSheet>, AssetError> {
        let key = SheetKey::new(name, frame_width, frame_height, policy);
        if let Some(sheet) = self.sheets.get(&key) {
            return Ok(Arc::clone(sheet));
        }

        let sheet = Arc::new(self.loader.load(name, frame_width, frame_height, policy)?);
        self.watcher.watch_file(self.loader.resolve_path(name))?;
        self.sheets.insert(key, Arc::clone(&sheet));

        Ok(sheet)
    }

    /// Get a previously loaded sheet
    pub fn get(&self, key: &SheetKey) -> Option<Arc<SpriteSheet>> {
        self.sheets.get(key).cloned()
    }

    /// Re-decode every cached sheet whose file changed on disk
    ///
    /// Returns the reloaded entries. A sheet that fails to reload keeps its
    /// previous contents.
    pub fn check_reload(&mut self) -> Vec<(SheetKey, Arc<SpriteSheet>)> {
        let changed: Vec<PathBuf> = self.watcher.check_all();
        if changed.is_empty() {
            return Vec::new();
        }

        let stale: Vec<SheetKey> = self
            .sheets
            .keys()
            .filter(|key| changed.contains(&self.loader.resolve_path(&key.name)))
            .cloned()
            .collect();

        let mut reloaded = Vec::new();
        for key in stale {
            match self
                .loader
                .load(&key.name, key.frame_width, key.frame_height, key.policy)
            {
                Ok(sheet) => {
                    debug!("Reloaded sprite sheet {}", key.name);
                    let sheet = Arc::new(sheet);
                    self.sheets.insert(key.clone(), Arc::clone(&sheet));
                    reloaded.push((key, sheet));
                }
                Err(e) => warn!("Keeping previous copy of {}: {}", key.name, e),
            }
        }

        reloaded
    }

    /// Drop a cached sheet
    pub fn unload(&mut self, key: &SheetKey) -> Option<Arc<SpriteSheet>> {
        let sheet = self.sheets.remove(key)?;
        if !self.sheets.keys().any(|other| other.name == key.name) {
            self.watcher.unwatch_file(self.loader.resolve_path(&key.name));
        }
        Some(sheet)
    }

    /// Number of cached sheets
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}
