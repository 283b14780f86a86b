// Sprite sheet assets
//
// Loading, slicing, sharing and reloading of sprite sheets.

mod atlas;
mod hot_reload;
mod loader;
mod manager;
mod sheet;

pub use atlas::{slice, FrameIndex, FrameRect, FrameTable, SlicePolicy};
pub use hot_reload::HotReloadWatcher;
pub use loader::SheetLoader;
pub use manager::{SheetKey, SheetStore};
pub use sheet::{SheetId, SpriteSheet};

#[cfg(test)]
pub(crate) use sheet::tests::numbered_sheet;

/// Asset loading errors
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error(
        "Sheet of {width}x{height} is not a whole grid of {frame_width}x{frame_height} frames"
    )]
    InvalidSheetDimensions {
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    },

    #[error("Invalid frame size {frame_width}x{frame_height}")]
    InvalidFrameSize { frame_width: u32, frame_height: u32 },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_error_display() {
        let err = AssetError::NotFound("test.png".to_string());
        assert_eq!(err.to_string(), "Asset not found: test.png");

        let err = AssetError::InvalidSheetDimensions {
            width: 100,
            height: 64,
            frame_width: 64,
            frame_height: 64,
        };
        assert_eq!(
            err.to_string(),
            "Sheet of 100x64 is not a whole grid of 64x64 frames"
        );
    }
}
