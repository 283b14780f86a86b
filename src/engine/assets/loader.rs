// Sprite sheet file discovery and loading

use super::atlas::SlicePolicy;
use super::sheet::SpriteSheet;
use super::AssetError;
use std::path::{Path, PathBuf};

/// Loader responsible for finding and decoding sprite sheet files
#[derive(Debug, Clone)]
pub struct SheetLoader {
    base_path: PathBuf,
}

impl SheetLoader {
    /// Create a new loader with the given base path
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the full path for a sheet. Absolute names are used as-is.
    pub fn resolve_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    /// Load and slice a sheet
    pub fn load(
        &self,
        name: &str,
        frame_width: u32,
        frame_height: u32,
        policy: SlicePolicy,
    ) -> Result<SpriteSheet, AssetError> {
        let path = self.resolve_path(name);
        SpriteSheet::open(&path, frame_width, frame_height, policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_path_resolution() {
        let loader = SheetLoader::new("/game/assets");
        let path = loader.resolve_path("hero.png");

        assert_eq!(path, PathBuf::from("/game/assets/hero.png"));
    }

    #[test]
    fn test_loader_missing_sheet() {
        let loader = SheetLoader::new("/definitely/not/a/real/dir");
        let err = loader.load("hero.png", 64, 64, SlicePolicy::Strict).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
    }
}
