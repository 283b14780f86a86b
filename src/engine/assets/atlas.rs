// Sprite sheet slicing into a fixed-size frame grid

use super::AssetError;
use serde::Deserialize;

/// 1-based frame number within a sprite sheet
pub type FrameIndex = u32;

/// A single frame rectangle within a sprite sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRect {
    /// 1-based frame number
    pub index: FrameIndex,

    /// Position in the sheet (pixels)
    pub x: u32,
    pub y: u32,

    /// Size of the frame (pixels)
    pub width: u32,
    pub height: u32,
}

impl FrameRect {
    /// Zero-based grid column of this frame
    pub fn column(&self) -> u32 {
        self.x / self.width
    }

    /// Zero-based grid row of this frame
    pub fn row(&self) -> u32 {
        self.y / self.height
    }
}

/// What to do when the sheet is not an exact multiple of the frame size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlicePolicy {
    /// Reject the sheet with `InvalidSheetDimensions`
    #[default]
    Strict,
    /// Drop the partial right column and bottom row
    Truncate,
}

/// Row-major table of every frame in a sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTable {
    frame_width: u32,
    frame_height: u32,
    columns: u32,
    rows: u32,
    frames: Vec<FrameRect>,
}

impl FrameTable {
    /// Look up a frame by its 1-based index
    pub fn get(&self, index: FrameIndex) -> Option<&FrameRect> {
        let slot = index.checked_sub(1)?;
        self.frames.get(slot as usize)
    }

    /// Check that a 1-based index exists in this table
    pub fn contains(&self, index: FrameIndex) -> bool {
        index >= 1 && index as usize <= self.frames.len()
    }

    /// 1-based index of the frame at a grid cell
    pub fn index_at(&self, column: u32, row: u32) -> Option<FrameIndex> {
        (column < self.columns && row < self.rows).then(|| row * self.columns + column + 1)
    }

    /// Get all frames in row-major order
    pub fn frames(&self) -> &[FrameRect] {
        &self.frames
    }

    /// Number of frames in the table
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn frame_width(&self) -> u32 {
        self.frame_width
    }

    pub fn frame_height(&self) -> u32 {
        self.frame_height
    }
}

/// Slice a sheet of the given pixel size into fixed-size frames
///
/// Frames are numbered from 1, left to right then top to bottom. With
/// [`SlicePolicy::Strict`] the sheet must be an exact multiple of the frame
/// size; with [`SlicePolicy::Truncate`] any remainder is ignored. A sheet that
/// cannot hold a single frame is rejected under both policies.
pub fn slice(
    sheet_width: u32,
    sheet_height: u32,
    frame_width: u32,
    frame_height: u32,
    policy: SlicePolicy,
) -> Result<FrameTable, AssetError> {
    if frame_width == 0 || frame_height == 0 {
        return Err(AssetError::InvalidFrameSize {
            frame_width,
            frame_height,
        });
    }

    let uneven = sheet_width % frame_width != 0 || sheet_height % frame_height != 0;
    let columns = sheet_width / frame_width;
    let rows = sheet_height / frame_height;

    if (uneven && policy == SlicePolicy::Strict) || columns == 0 || rows == 0 {
        return Err(AssetError::InvalidSheetDimensions {
            width: sheet_width,
            height: sheet_height,
            frame_width,
            frame_height,
        });
    }

    let mut frames = Vec::with_capacity((columns * rows) as usize);
    for row in 0..rows {
        for column in 0..columns {
            frames.push(FrameRect {
                index: row * columns + column + 1,
                x: column * frame_width,
                y: row * frame_height,
                width: frame_width,
                height: frame_height,
            });
        }
    }

    Ok(FrameTable {
        frame_width,
        frame_height,
        columns,
        rows,
        frames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_exact_grid() {
        let table = slice(256, 256, 64, 64, SlicePolicy::Strict).unwrap();

        assert_eq!(table.len(), 16);
        assert_eq!(table.columns(), 4);
        assert_eq!(table.rows(), 4);

        for (i, frame) in table.frames().iter().enumerate() {
            assert_eq!(frame.index as usize, i + 1);
        }
    }

    #[test]
    fn test_slice_row_major_order() {
        let table = slice(192, 128, 64, 64, SlicePolicy::Strict).unwrap();

        let first = table.get(1).unwrap();
        assert_eq!((first.x, first.y), (0, 0));

        let third = table.get(3).unwrap();
        assert_eq!((third.x, third.y), (128, 0));

        // First frame of the second row
        let fourth = table.get(4).unwrap();
        assert_eq!((fourth.x, fourth.y), (0, 64));
        assert_eq!(fourth.column(), 0);
        assert_eq!(fourth.row(), 1);
    }

    #[test]
    fn test_slice_uneven_strict() {
        let err = slice(250, 256, 64, 64, SlicePolicy::Strict).unwrap_err();
        assert!(matches!(err, AssetError::InvalidSheetDimensions { width: 250, .. }));
    }

    #[test]
    fn test_slice_uneven_truncate() {
        let table = slice(250, 200, 64, 64, SlicePolicy::Truncate).unwrap();
        assert_eq!(table.columns(), 3);
        assert_eq!(table.rows(), 3);
        assert_eq!(table.len(), 9);
    }

    #[test]
    fn test_slice_sheet_smaller_than_frame() {
        let err = slice(32, 32, 64, 64, SlicePolicy::Truncate).unwrap_err();
        assert!(matches!(err, AssetError::InvalidSheetDimensions { .. }));
    }

    #[test]
    fn test_slice_zero_frame_size() {
        let err = slice(64, 64, 0, 64, SlicePolicy::Strict).unwrap_err();
        assert!(matches!(err, AssetError::InvalidFrameSize { .. }));
    }

    #[test]
    fn test_table_lookup_bounds() {
        let table = slice(128, 64, 64, 64, SlicePolicy::Strict).unwrap();

        assert!(table.get(0).is_none());
        assert!(table.get(1).is_some());
        assert!(table.get(2).is_some());
        assert!(table.get(3).is_none());

        assert!(!table.contains(0));
        assert!(table.contains(2));
        assert!(!table.contains(3));
    }

    #[test]
    fn test_index_at() {
        let table = slice(256, 128, 64, 64, SlicePolicy::Strict).unwrap();
        assert_eq!(table.index_at(0, 0), Some(1));
        assert_eq!(table.index_at(3, 0), Some(4));
        assert_eq!(table.index_at(0, 1), Some(5));
        assert_eq!(table.index_at(4, 0), None);
    }
}
