// Decoded sprite sheet with its frame table

use super::atlas::{self, FrameIndex, FrameRect, FrameTable, SlicePolicy};
use super::AssetError;
use image::{imageops, DynamicImage, RgbaImage};
use log::info;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique identity of a decoded sheet
pub type SheetId = u64;

static NEXT_SHEET_ID: AtomicU64 = AtomicU64::new(1);

/// A decoded sprite sheet and the grid of frames cut from it
///
/// Sheets are immutable once built and are shared between characters
/// behind an `Arc`.
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    id: SheetId,
    image: RgbaImage,
    table: FrameTable,
}

impl SpriteSheet {
    /// Build a sheet from an already decoded image
    pub fn from_image(
        image: DynamicImage,
        frame_width: u32,
        frame_height: u32,
        policy: SlicePolicy,
    ) -> Result<Self, AssetError> {
        let image = image.to_rgba8();
        let table = atlas::slice(
            image.width(),
            image.height(),
            frame_width,
            frame_height,
            policy,
        )?;

        Ok(Self {
            id: NEXT_SHEET_ID.fetch_add(1, Ordering::Relaxed),
            image,
            table,
        })
    }

    /// Decode a sheet from encoded image bytes
    pub fn from_bytes(
        bytes: &[u8],
        frame_width: u32,
        frame_height: u32,
        policy: SlicePolicy,
    ) -> Result<Self, AssetError> {
        let image = image::load_from_memory(bytes)?;
        Self::from_image(image, frame_width, frame_height, policy)
    }

    /// Load and slice a sheet from disk
    pub fn open<P: AsRef<Path>>(
        path: P,
        frame_width: u32,
        frame_height: u32,
        policy: SlicePolicy,
    ) -> Result<Self, AssetError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AssetError::NotFound(path.display().to_string()));
        }

        let image = image::open(path)?;
        let sheet = Self::from_image(image, frame_width, frame_height, policy)?;

        info!(
            "Loaded sprite sheet {} ({}x{} frames, {} columns x {} rows)",
            path.display(),
            frame_width,
            frame_height,
            sheet.table.columns(),
            sheet.table.rows()
        );

        Ok(sheet)
    }

    /// Crop a single frame out of the sheet
    pub fn frame_image(&self, index: FrameIndex) -> Option<RgbaImage> {
        let rect = self.table.get(index)?;
        Some(self.crop(rect))
    }

    fn crop(&self, rect: &FrameRect) -> RgbaImage {
        imageops::crop_imm(&self.image, rect.x, rect.y, rect.width, rect.height).to_image()
    }

    /// Identity of this decoding; a reloaded file gets a new one
    pub fn id(&self) -> SheetId {
        self.id
    }

    /// The frame table for this sheet
    pub fn frames(&self) -> &FrameTable {
        &self.table
    }

    /// The full sheet image
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::Rgba;

    /// Build a sheet where every pixel encodes the frame it belongs to
    pub(crate) fn numbered_sheet(columns: u32, rows: u32, frame: u32) -> SpriteSheet {
        let image = RgbaImage::from_fn(columns * frame, rows * frame, |x, y| {
            let index = (y / frame) * columns + (x / frame) + 1;
            Rgba([index as u8, (x % frame) as u8, (y % frame) as u8, 255])
        });
        SpriteSheet::from_image(DynamicImage::ImageRgba8(image), frame, frame, SlicePolicy::Strict)
            .unwrap()
    }

    #[test]
    fn test_sheet_dimensions() {
        let sheet = numbered_sheet(4, 4, 8);
        assert_eq!(sheet.width(), 32);
        assert_eq!(sheet.height(), 32);
        assert_eq!(sheet.frames().len(), 16);
    }

    #[test]
    fn test_frame_image_crops_correct_cell() {
        let sheet = numbered_sheet(4, 2, 8);

        let frame = sheet.frame_image(6).unwrap();
        assert_eq!(frame.dimensions(), (8, 8));
        assert_eq!(frame.get_pixel(0, 0)[0], 6);
        assert_eq!(frame.get_pixel(7, 7)[0], 6);
        assert_eq!(frame.get_pixel(3, 5).0, [6, 3, 5, 255]);
    }

    #[test]
    fn test_frame_image_out_of_range() {
        let sheet = numbered_sheet(2, 2, 8);
        assert!(sheet.frame_image(0).is_none());
        assert!(sheet.frame_image(5).is_none());
    }

    #[test]
    fn test_from_image_rejects_uneven_sheet() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(30, 32));
        let err = SpriteSheet::from_image(image, 8, 8, SlicePolicy::Strict).unwrap_err();
        assert!(matches!(err, AssetError::InvalidSheetDimensions { .. }));
    }

    #[test]
    fn test_each_sheet_gets_its_own_id() {
        let a = numbered_sheet(2, 2, 8);
        let b = numbered_sheet(2, 2, 8);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn test_open_missing_file() {
        let err = SpriteSheet::open("definitely/not/here.png", 8, 8, SlicePolicy::Strict)
            .unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
    }
}
