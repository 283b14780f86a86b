// Animated character and character groups

use crate::core::math::{approx_equal, is_valid_scale, scaled_dimension, Rect};
use crate::engine::assets::{FrameIndex, FrameTable, SlicePolicy, SpriteSheet};
use glam::Vec2;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::debug;
use std::path::Path;
use std::sync::Arc;

use super::animation::{AnimationClip, AnimationController, ClipRegistry};
use super::config::CharacterSettings;
use super::direction::{DirectionMode, DirectionState, Facing, FrameCache, FrameKey};
use super::state::PlaybackStatus;
use super::AnimationError;

/// Unique identifier for a character within a group
pub type CharacterId = u32;

/// Frame picked by the last update, and whether it is shown mirrored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DisplayFrame {
    key: FrameKey,
    flipped: bool,
}

/// A sprite character: sheet, clips, playback, facing, position and scale
///
/// The sheet and clip registry are shared with any character created through
/// [`AnimatedCharacter::spawn_like`]; playback and facing are per character.
#[derive(Debug, Clone)]
pub struct AnimatedCharacter {
    /// Top-left corner in host coordinates
    position: Vec2,
    /// Display scale (1.0 = sheet pixels)
    scale: f32,

    sheet: Option<Arc<SpriteSheet>>,
    controller: AnimationController,
    direction: DirectionState,

    /// Cropped and scaled frames, unmirrored
    frames: FrameCache,
    display: Option<DisplayFrame>,

    /// Next unused zero-based slot for sequentially allocated clips
    next_slot: u32,
}

impl AnimatedCharacter {
    /// Create a character with no sheet or clips
    pub fn new(settings: CharacterSettings) -> Result<Self, AnimationError> {
        settings.validate()?;

        Ok(Self {
            position: settings.position,
            scale: settings.scale,
            sheet: None,
            controller: AnimationController::new(),
            direction: DirectionState::new(settings.direction_mode),
            frames: FrameCache::new(),
            display: None,
            next_slot: 0,
        })
    }

    /// Create another character at `(x, y)` sharing this one's sheet and clips
    ///
    /// The new character starts idle, facing right, with empty caches.
    pub fn spawn_like(&self, x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            scale: self.scale,
            sheet: self.sheet.clone(),
            controller: AnimationController::with_clips(self.controller.shared_clips()),
            direction: DirectionState::new(self.direction.mode()),
            frames: FrameCache::new(),
            display: None,
            next_slot: self.next_slot,
        }
    }

    /// Load a sheet from disk and make it this character's sheet
    ///
    /// Restarts sequential frame allocation at frame 1.
    pub fn load_sheet<P: AsRef<Path>>(
        &mut self,
        path: P,
        frame_width: u32,
        frame_height: u32,
        policy: SlicePolicy,
    ) -> Result<(), AnimationError> {
        let sheet = SpriteSheet::open(path, frame_width, frame_height, policy)?;
        self.set_sheet(Arc::new(sheet))?;
        self.next_slot = 0;
        Ok(())
    }

    /// Use a (possibly shared) sheet, e.g. after a reload
    ///
    /// Every defined clip must still fit the new sheet; otherwise the old
    /// sheet is kept. Cached frames are dropped.
    pub fn set_sheet(&mut self, sheet: Arc<SpriteSheet>) -> Result<(), AnimationError> {
        self.controller.clips().validate_all(sheet.frames())?;
        self.sheet = Some(sheet);
        self.invalidate_frames();
        Ok(())
    }

    fn table(&self) -> Result<&FrameTable, AnimationError> {
        self.sheet
            .as_deref()
            .map(SpriteSheet::frames)
            .ok_or(AnimationError::SheetNotLoaded)
    }

    fn define(&mut self, clip: AnimationClip) -> Result<(), AnimationError> {
        let sheet = self.sheet.clone().ok_or(AnimationError::SheetNotLoaded)?;
        self.controller.define(clip, sheet.frames())?;
        self.refresh_display();
        Ok(())
    }

    fn out_of_bounds(&self) -> AnimationError {
        AnimationError::FrameIndexOutOfBounds {
            index: FrameIndex::MAX,
            frame_count: self.table().map_or(0, FrameTable::len),
        }
    }

    /// Define a clip over an inclusive 1-based frame range
    pub fn define_from_range(
        &mut self,
        name: &str,
        start: FrameIndex,
        end: FrameIndex,
        speed: u32,
        looping: bool,
    ) -> Result<(), AnimationError> {
        let sheet = self.sheet.clone().ok_or(AnimationError::SheetNotLoaded)?;
        self.define(AnimationClip::from_range_in(
            sheet.frames(),
            name,
            start,
            end,
            speed,
            looping,
        )?)
    }

    /// Define a clip over an explicit list of frames
    pub fn define_from_frames(
        &mut self,
        name: &str,
        frames: &[FrameIndex],
        speed: u32,
        looping: bool,
    ) -> Result<(), AnimationError> {
        self.define(AnimationClip::new(name, frames.to_vec(), speed, looping)?)
    }

    /// Define `<base>_left` and `<base>_right` clips
    ///
    /// Only valid in [`DirectionMode::SeparateDirections`]. Either both clips
    /// are registered or neither is.
    pub fn define_directional(
        &mut self,
        base: &str,
        left: &[FrameIndex],
        right: &[FrameIndex],
        speed: u32,
        looping: bool,
    ) -> Result<(), AnimationError> {
        self.require_separate_directions()?;

        let clips = vec![
            AnimationClip::new(
                &ClipRegistry::directional_name(base, Facing::Left),
                left.to_vec(),
                speed,
                looping,
            )?,
            AnimationClip::new(
                &ClipRegistry::directional_name(base, Facing::Right),
                right.to_vec(),
                speed,
                looping,
            )?,
        ];

        let sheet = self.sheet.clone().ok_or(AnimationError::SheetNotLoaded)?;
        self.controller.define_all(clips, sheet.frames())?;
        self.refresh_display();
        Ok(())
    }

    /// Define a clip from the first `frame_count` frames of a grid row
    ///
    /// Rows are zero-based. A count wider than the row continues onto the
    /// following rows in reading order.
    pub fn define_row(
        &mut self,
        name: &str,
        row: u32,
        frame_count: u32,
        speed: u32,
        looping: bool,
    ) -> Result<(), AnimationError> {
        if frame_count == 0 {
            return Err(AnimationError::EmptyClip(name.to_string()));
        }

        let columns = self.table()?.columns();
        let range = row
            .checked_mul(columns)
            .and_then(|first| first.checked_add(1))
            .and_then(|start| Some((start, start.checked_add(frame_count - 1)?)));
        let Some((start, end)) = range else {
            return Err(self.out_of_bounds());
        };
        self.define_from_range(name, start, end, speed, looping)
    }

    /// Define a clip from the next `frame_count` unused frames of the sheet
    pub fn define_sequential(
        &mut self,
        name: &str,
        frame_count: u32,
        speed: u32,
        looping: bool,
    ) -> Result<(), AnimationError> {
        let columns = self.table()?.columns();
        self.define_sequential_packed(name, frame_count, columns, speed, looping)
    }

    /// Define a clip from the next `frame_count` unused slots, with clips
    /// packed `columns` slots per row
    ///
    /// Packing narrower than the sheet leaves its right-hand frames unused.
    pub fn define_sequential_packed(
        &mut self,
        name: &str,
        frame_count: u32,
        columns: u32,
        speed: u32,
        looping: bool,
    ) -> Result<(), AnimationError> {
        if frame_count == 0 {
            return Err(AnimationError::EmptyClip(name.to_string()));
        }
        if columns == 0 {
            return Err(AnimationError::InvalidColumns(columns));
        }

        let table = self.table()?;
        let mut frames = Vec::new();
        for offset in 0..frame_count {
            // Stops at the first slot past the sheet, so huge counts are cheap
            let index = self
                .next_slot
                .checked_add(offset)
                .and_then(|slot| table.index_at(slot % columns, slot / columns));
            match index {
                Some(index) => frames.push(index),
                None => return Err(self.out_of_bounds()),
            }
        }

        self.define(AnimationClip::new(name, frames, speed, looping)?)?;
        self.next_slot += frame_count;
        Ok(())
    }

    /// Define a clip that plays the first `frame_count` frames of its own sheet
    pub fn define_from_sheet(
        &mut self,
        name: &str,
        sheet: Arc<SpriteSheet>,
        frame_count: u32,
        speed: u32,
        looping: bool,
    ) -> Result<(), AnimationError> {
        let own = Arc::clone(&sheet);
        let clip = AnimationClip::from_sheet(name, sheet, frame_count, speed, looping)?;
        self.controller.define(clip, own.frames())?;
        self.refresh_display();
        Ok(())
    }

    /// Define `<base>_left` and `<base>_right` clips, each with its own sheet
    ///
    /// Only valid in [`DirectionMode::SeparateDirections`]. Either both clips
    /// are registered or neither is.
    pub fn define_directional_sheets(
        &mut self,
        base: &str,
        left: Arc<SpriteSheet>,
        right: Arc<SpriteSheet>,
        frame_count: u32,
        speed: u32,
        looping: bool,
    ) -> Result<(), AnimationError> {
        self.require_separate_directions()?;

        let own = Arc::clone(&left);
        let left = AnimationClip::from_sheet(
            &ClipRegistry::directional_name(base, Facing::Left),
            left,
            frame_count,
            speed,
            looping,
        )?;
        let right = AnimationClip::from_sheet(
            &ClipRegistry::directional_name(base, Facing::Right),
            right,
            frame_count,
            speed,
            looping,
        )?;

        self.controller.define_all(vec![left, right], own.frames())?;
        self.refresh_display();
        Ok(())
    }

    fn require_separate_directions(&self) -> Result<(), AnimationError> {
        let mode = self.direction.mode();
        if mode != DirectionMode::SeparateDirections {
            return Err(AnimationError::InvalidDirectionMode {
                expected: DirectionMode::SeparateDirections,
                actual: mode,
            });
        }
        Ok(())
    }

    /// Resolve the clip name `play` would use for the current facing
    fn resolve_clip_name(&self, name: &str) -> String {
        if self.direction.mode() == DirectionMode::SeparateDirections {
            let directional = ClipRegistry::directional_name(name, self.direction.facing());
            if self.controller.clips().contains(&directional) {
                return directional;
            }
        }
        name.to_string()
    }

    /// Play an animation by name
    ///
    /// In separate-directions mode `<name>_left` / `<name>_right` is preferred
    /// for the current facing, falling back to `name`. Playing the active,
    /// unfinished clip again does nothing.
    pub fn play(&mut self, name: &str) -> Result<(), AnimationError> {
        let resolved = self.resolve_clip_name(name);
        self.controller.play(&resolved).map_err(|e| match e {
            AnimationError::UnknownAnimation(_) => AnimationError::UnknownAnimation(name.to_string()),
            other => other,
        })?;
        self.refresh_display();
        Ok(())
    }

    /// Play an animation from its first frame, even if it is already active
    pub fn restart(&mut self, name: &str) -> Result<(), AnimationError> {
        let resolved = self.resolve_clip_name(name);
        self.controller.restart(&resolved).map_err(|e| match e {
            AnimationError::UnknownAnimation(_) => AnimationError::UnknownAnimation(name.to_string()),
            other => other,
        })?;
        self.refresh_display();
        Ok(())
    }

    /// Deselect the active animation
    pub fn stop(&mut self) {
        self.controller.stop();
        self.display = None;
    }

    /// Advance one tick and prepare the frame to display
    ///
    /// Call exactly once per host frame.
    pub fn update(&mut self) {
        self.controller.update();
        self.refresh_display();
    }

    /// Sheet the displayed frame comes from: the active clip's own sheet,
    /// else the character's
    fn active_sheet(&self) -> Option<&Arc<SpriteSheet>> {
        self.controller
            .current_clip()
            .and_then(AnimationClip::sheet)
            .or(self.sheet.as_ref())
    }

    /// Crop, scale and mirror the current frame into the caches
    fn refresh_display(&mut self) {
        let frame = self.controller.current_frame();
        let (Some(index), Some(sheet)) = (frame, self.active_sheet().cloned()) else {
            self.display = None;
            return;
        };
        let key = (sheet.id(), index);

        if !self.frames.contains(key) {
            let Some(mut image) = sheet.frame_image(index) else {
                self.display = None;
                return;
            };
            if !approx_equal(self.scale, 1.0, f32::EPSILON) {
                image = imageops::resize(
                    &image,
                    scaled_dimension(image.width(), self.scale),
                    scaled_dimension(image.height(), self.scale),
                    FilterType::Nearest,
                );
            }
            self.frames.get_or_insert_with(key, || image);
        }

        let flipped = self.direction.should_flip();
        if let Some(base) = self.frames.get(key) {
            self.direction.resolve(key, base);
        }

        self.display = Some(DisplayFrame { key, flipped });
    }

    fn invalidate_frames(&mut self) {
        self.frames.invalidate();
        self.direction.invalidate();
        self.refresh_display();
    }

    /// Image to draw for the current frame, as of the last update
    pub fn image(&self) -> Option<&RgbaImage> {
        let display = self.display?;
        if display.flipped {
            self.direction.flipped(display.key)
        } else {
            self.frames.get(display.key)
        }
    }

    /// Bounding box of the displayed frame in host coordinates
    pub fn rect(&self) -> Rect {
        let (width, height) = self
            .active_sheet()
            .map(|sheet| {
                let table = sheet.frames();
                (
                    scaled_dimension(table.frame_width(), self.scale),
                    scaled_dimension(table.frame_height(), self.scale),
                )
            })
            .unwrap_or((0, 0));

        Rect::new(self.position.x, self.position.y, width as f32, height as f32)
    }

    /// Move by a delta; in auto-flip mode horizontal movement sets facing
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.position += Vec2::new(dx, dy);
        self.direction.on_move(dx);
    }

    /// Set character position (for teleporting/respawning)
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
    }

    /// Change the display scale, rebuilding all cached frames
    pub fn set_scale(&mut self, scale: f32) -> Result<(), AnimationError> {
        if !is_valid_scale(scale) {
            return Err(AnimationError::InvalidScale(scale));
        }
        if scale != self.scale {
            debug!("Rescaling character from {} to {}", self.scale, scale);
            self.scale = scale;
            self.invalidate_frames();
        }
        Ok(())
    }

    /// Explicitly set facing (valid in every direction mode)
    pub fn set_facing(&mut self, facing: Facing) {
        self.direction.set_facing(facing);
    }

    /// Check if a non-looping animation ran past its last frame
    pub fn is_finished(&self) -> bool {
        self.controller.is_finished()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.controller.status()
    }

    /// Name of the active clip (direction suffix included)
    pub fn current_animation(&self) -> Option<&str> {
        self.controller.current_animation()
    }

    /// Sheet frame currently selected by playback
    pub fn current_frame(&self) -> Option<FrameIndex> {
        self.controller.current_frame()
    }

    pub fn controller(&self) -> &AnimationController {
        &self.controller
    }

    pub fn clips(&self) -> &ClipRegistry {
        self.controller.clips()
    }

    pub fn sheet(&self) -> Option<&Arc<SpriteSheet>> {
        self.sheet.as_ref()
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn facing(&self) -> Facing {
        self.direction.facing()
    }

    pub fn direction_mode(&self) -> DirectionMode {
        self.direction.mode()
    }

    /// Bumped every time cached frames are thrown away (sheet or scale change)
    pub fn geometry_version(&self) -> u64 {
        self.frames.version()
    }

    /// Number of mirrored frames currently cached
    pub fn cached_flips(&self) -> usize {
        self.direction.flip_cache().len()
    }
}

/// Manages a set of characters updated together
#[derive(Debug, Default)]
pub struct AnimatorGroup {
    members: Vec<(CharacterId, AnimatedCharacter)>,
    next_id: CharacterId,
}

impl AnimatorGroup {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            next_id: 0,
        }
    }

    /// Add a character, returning its id
    pub fn add(&mut self, character: AnimatedCharacter) -> CharacterId {
        let id = self.next_id;
        self.next_id += 1;
        self.members.push((id, character));
        id
    }

    pub fn get(&self, id: CharacterId) -> Option<&AnimatedCharacter> {
        self.members
            .iter()
            .find(|(member, _)| *member == id)
            .map(|(_, character)| character)
    }

    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut AnimatedCharacter> {
        self.members
            .iter_mut()
            .find(|(member, _)| *member == id)
            .map(|(_, character)| character)
    }

    /// Remove a character by ID
    pub fn remove(&mut self, id: CharacterId) -> Option<AnimatedCharacter> {
        let pos = self.members.iter().position(|(member, _)| *member == id)?;
        Some(self.members.remove(pos).1)
    }

    /// Advance every character by one tick
    pub fn update(&mut self) {
        for (_, character) in &mut self.members {
            character.update();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (CharacterId, &AnimatedCharacter)> {
        self.members.iter().map(|(id, character)| (*id, character))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (CharacterId, &mut AnimatedCharacter)> {
        self.members
            .iter_mut()
            .map(|(id, character)| (*id, character))
    }

    /// Image and bounding box of every character that has something to draw
    pub fn visible(&self) -> impl Iterator<Item = (CharacterId, &RgbaImage, Rect)> {
        self.members
            .iter()
            .filter_map(|(id, character)| character.image().map(|image| (*id, image, character.rect())))
    }

    /// Get the number of characters
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
