// Facing direction and horizontal mirroring

use crate::engine::assets::{FrameIndex, SheetId};
use image::{imageops, RgbaImage};
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// How a character handles left/right facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionMode {
    /// Mirror frames when facing left; movement sets facing
    #[default]
    AutoFlip,
    /// Never mirror; facing is ignored for display
    NoFlip,
    /// Left and right use separate `<name>_left` / `<name>_right` clips
    SeparateDirections,
}

impl DirectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoFlip => "auto_flip",
            Self::NoFlip => "no_flip",
            Self::SeparateDirections => "separate_directions",
        }
    }
}

impl fmt::Display for DirectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical left/right orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Suffix used for direction-specific clip names
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Facing implied by a horizontal movement, if any
    pub fn from_delta(dx: f32) -> Option<Self> {
        if dx < 0.0 {
            Some(Self::Left)
        } else if dx > 0.0 {
            Some(Self::Right)
        } else {
            None
        }
    }
}

/// A frame of a particular sheet; clips with their own sheets share
/// frame numbers with the character's sheet
pub type FrameKey = (SheetId, FrameIndex);

/// Lazily filled per-frame image cache tagged with a geometry version
///
/// Entries are only ever dropped all at once, by [`FrameCache::invalidate`],
/// which also bumps the version.
#[derive(Debug, Clone, Default)]
pub struct FrameCache {
    version: u64,
    entries: HashMap<FrameKey, RgbaImage>,
}

impl FrameCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: FrameKey) -> Option<&RgbaImage> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: FrameKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Get an entry, building it on first use
    pub fn get_or_insert_with<F>(&mut self, key: FrameKey, build: F) -> &RgbaImage
    where
        F: FnOnce() -> RgbaImage,
    {
        self.entries.entry(key).or_insert_with(build)
    }

    /// Drop every entry and move to the next version
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.version += 1;
    }

    /// Number of invalidations so far
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Facing, mode and mirrored-frame cache for one character
#[derive(Debug, Clone, Default)]
pub struct DirectionState {
    mode: DirectionMode,
    facing: Facing,
    flipped: FrameCache,
}

impl DirectionState {
    pub fn new(mode: DirectionMode) -> Self {
        Self {
            mode,
            facing: Facing::Right,
            flipped: FrameCache::new(),
        }
    }

    pub fn mode(&self) -> DirectionMode {
        self.mode
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Explicitly set facing; valid in every mode
    pub fn set_facing(&mut self, facing: Facing) {
        self.facing = facing;
    }

    /// Update facing from a movement delta
    ///
    /// Only `AutoFlip` reacts to movement. Returns true when facing changed.
    pub fn on_move(&mut self, dx: f32) -> bool {
        if self.mode != DirectionMode::AutoFlip {
            return false;
        }

        match Facing::from_delta(dx) {
            Some(facing) if facing != self.facing => {
                self.facing = facing;
                true
            }
            _ => false,
        }
    }

    /// Whether the current frame should be mirrored
    pub fn should_flip(&self) -> bool {
        self.mode == DirectionMode::AutoFlip && self.facing == Facing::Left
    }

    /// Resolve the image to display for a frame
    ///
    /// Returns the cached mirror when the frame should be flipped, building it
    /// from `image` on first use; otherwise returns `image` itself.
    pub fn resolve<'a>(&'a mut self, key: FrameKey, image: &'a RgbaImage) -> &'a RgbaImage {
        if self.should_flip() {
            self.flipped
                .get_or_insert_with(key, || imageops::flip_horizontal(image))
        } else {
            image
        }
    }

    /// Previously built mirror of a frame
    pub fn flipped(&self, key: FrameKey) -> Option<&RgbaImage> {
        self.flipped.get(key)
    }

    /// Forget all mirrored frames (sheet or scale changed)
    pub fn invalidate(&mut self) {
        debug!(
            "Dropping {} mirrored frames (cache version {})",
            self.flipped.len(),
            self.flipped.version()
        );
        self.flipped.invalidate();
    }

    pub fn flip_cache(&self) -> &FrameCache {
        &self.flipped
    }
}
