// Animation clips, clip registry and playback controller

use super::direction::Facing;
use super::state::{PlaybackState, PlaybackStatus};
use super::AnimationError;
use crate::engine::assets::{FrameIndex, FrameTable, SpriteSheet};
use log::{debug, trace};
use std::collections::HashMap;
use std::sync::Arc;

/// Default ticks each frame is held for
pub const DEFAULT_SPEED: u32 = 10;

/// A named sequence of sheet frames
#[derive(Debug, Clone)]
pub struct AnimationClip {
    /// Name of the animation (e.g., "idle", "walk", "jump")
    name: String,
    /// 1-based frame indices in playback order
    frames: Vec<FrameIndex>,
    /// Ticks each frame is held for
    speed: u32,
    /// Whether the animation loops
    looping: bool,
    /// Sheet of its own; `None` uses the character's sheet
    sheet: Option<Arc<SpriteSheet>>,
}

impl PartialEq for AnimationClip {
    fn eq(&self, other: &Self) -> bool {
        let same_sheet = match (&self.sheet, &other.sheet) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_sheet
            && self.name == other.name
            && self.frames == other.frames
            && self.speed == other.speed
            && self.looping == other.looping
    }
}

impl Eq for AnimationClip {}

impl AnimationClip {
    /// Create a clip from an explicit frame list
    pub fn new(
        name: &str,
        frames: Vec<FrameIndex>,
        speed: u32,
        looping: bool,
    ) -> Result<Self, AnimationError> {
        if frames.is_empty() {
            return Err(AnimationError::EmptyClip(name.to_string()));
        }
        if speed == 0 {
            return Err(AnimationError::InvalidSpeed(name.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            frames,
            speed,
            looping,
            sheet: None,
        })
    }

    /// Create a clip from an inclusive 1-based frame range
    pub fn from_range(
        name: &str,
        start: FrameIndex,
        end: FrameIndex,
        speed: u32,
        looping: bool,
    ) -> Result<Self, AnimationError> {
        if start > end {
            return Err(AnimationError::InvalidFrameRange { start, end });
        }
        Self::new(name, (start..=end).collect(), speed, looping)
    }

    /// Create a range clip, checking both ends against `table` before the
    /// frame list is built
    pub fn from_range_in(
        table: &FrameTable,
        name: &str,
        start: FrameIndex,
        end: FrameIndex,
        speed: u32,
        looping: bool,
    ) -> Result<Self, AnimationError> {
        if start > end {
            return Err(AnimationError::InvalidFrameRange { start, end });
        }
        if let Some(index) = [start, end].into_iter().find(|&i| !table.contains(i)) {
            return Err(AnimationError::FrameIndexOutOfBounds {
                index,
                frame_count: table.len(),
            });
        }
        Self::from_range(name, start, end, speed, looping)
    }

    /// Play the first `frame_count` frames of a sheet of its own
    pub fn from_sheet(
        name: &str,
        sheet: Arc<SpriteSheet>,
        frame_count: u32,
        speed: u32,
        looping: bool,
    ) -> Result<Self, AnimationError> {
        if frame_count == 0 {
            return Err(AnimationError::EmptyClip(name.to_string()));
        }
        let mut clip = Self::from_range_in(sheet.frames(), name, 1, frame_count, speed, looping)?;
        clip.sheet = Some(sheet);
        Ok(clip)
    }

    /// Create a looping animation
    pub fn looping(name: &str, frames: Vec<FrameIndex>, speed: u32) -> Result<Self, AnimationError> {
        Self::new(name, frames, speed, true)
    }

    /// Create a one-shot animation (plays once)
    pub fn one_shot(name: &str, frames: Vec<FrameIndex>, speed: u32) -> Result<Self, AnimationError> {
        Self::new(name, frames, speed, false)
    }

    /// Check that every frame exists in the clip's own sheet, or in `table`
    /// for clips drawn from the character's sheet
    pub fn validate_against(&self, table: &FrameTable) -> Result<(), AnimationError> {
        let table = self.sheet.as_deref().map_or(table, SpriteSheet::frames);
        match self.frames.iter().find(|&&index| !table.contains(index)) {
            Some(&index) => Err(AnimationError::FrameIndexOutOfBounds {
                index,
                frame_count: table.len(),
            }),
            None => Ok(()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sheet of its own, if the clip doesn't use the character's sheet
    pub fn sheet(&self) -> Option<&Arc<SpriteSheet>> {
        self.sheet.as_ref()
    }

    pub fn frames(&self) -> &[FrameIndex] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frame at a playback position, clamped to the last frame
    pub fn frame_at(&self, position: usize) -> FrameIndex {
        let last = self.frames.len() - 1;
        self.frames[position.min(last)]
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Ticks for one full pass over the clip
    pub fn total_ticks(&self) -> u64 {
        self.frames.len() as u64 * self.speed as u64
    }
}

/// Named clips available to a character
///
/// Registries are built once at setup and then shared read-only behind an
/// `Arc`.
#[derive(Debug, Clone, Default)]
pub struct ClipRegistry {
    clips: HashMap<String, AnimationClip>,
}

impl ClipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the clip registered for one facing of a directional animation
    pub fn directional_name(base: &str, facing: Facing) -> String {
        format!("{}_{}", base, facing.suffix())
    }

    /// Validate a clip against the sheet and register it, replacing any clip
    /// with the same name
    pub fn define(
        &mut self,
        clip: AnimationClip,
        table: &FrameTable,
    ) -> Result<Option<AnimationClip>, AnimationError> {
        clip.validate_against(table)?;
        Ok(self.insert(clip))
    }

    /// Register a clip over an inclusive 1-based frame range
    pub fn define_from_range(
        &mut self,
        table: &FrameTable,
        name: &str,
        start: FrameIndex,
        end: FrameIndex,
        speed: u32,
        looping: bool,
    ) -> Result<(), AnimationError> {
        let clip = AnimationClip::from_range_in(table, name, start, end, speed, looping)?;
        self.define(clip, table).map(|_| ())
    }

    /// Register a clip over an explicit frame list
    pub fn define_from_frames(
        &mut self,
        table: &FrameTable,
        name: &str,
        frames: &[FrameIndex],
        speed: u32,
        looping: bool,
    ) -> Result<(), AnimationError> {
        let clip = AnimationClip::new(name, frames.to_vec(), speed, looping)?;
        self.define(clip, table).map(|_| ())
    }

    /// Register a clip without checking it against a sheet
    pub fn insert(&mut self, clip: AnimationClip) -> Option<AnimationClip> {
        let previous = self.clips.insert(clip.name.clone(), clip);
        if let Some(old) = &previous {
            debug!("Replaced animation {}", old.name);
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    /// Check every clip against a (possibly new) sheet
    pub fn validate_all(&self, table: &FrameTable) -> Result<(), AnimationError> {
        self.clips
            .values()
            .try_for_each(|clip| clip.validate_against(table))
    }

    /// All clip names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clips.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

/// Drives playback of one clip at a time from a shared registry
#[derive(Debug, Clone, Default)]
pub struct AnimationController {
    clips: Arc<ClipRegistry>,
    state: PlaybackState,
}

impl AnimationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a controller over an existing, possibly shared, registry
    pub fn with_clips(clips: Arc<ClipRegistry>) -> Self {
        Self {
            clips,
            state: PlaybackState::new(),
        }
    }

    pub fn clips(&self) -> &ClipRegistry {
        &self.clips
    }

    /// Handle to the registry for sharing with other controllers
    pub fn shared_clips(&self) -> Arc<ClipRegistry> {
        Arc::clone(&self.clips)
    }

    /// Validate and register a clip
    ///
    /// Copies the registry first if it is shared. Redefining the active clip
    /// rewinds playback.
    pub fn define(&mut self, clip: AnimationClip, table: &FrameTable) -> Result<(), AnimationError> {
        clip.validate_against(table)?;
        self.insert_validated(clip);
        Ok(())
    }

    /// Validate several clips, then register all of them or none
    ///
    /// `table` only applies to clips without a sheet of their own.
    pub fn define_all(
        &mut self,
        clips: Vec<AnimationClip>,
        table: &FrameTable,
    ) -> Result<(), AnimationError> {
        for clip in &clips {
            clip.validate_against(table)?;
        }
        for clip in clips {
            self.insert_validated(clip);
        }
        Ok(())
    }

    fn insert_validated(&mut self, clip: AnimationClip) {
        let name = clip.name.clone();
        debug!(
            "Defined animation {} ({} frames, speed {}, looping {})",
            name,
            clip.frame_count(),
            clip.speed,
            clip.looping
        );

        Arc::make_mut(&mut self.clips).insert(clip);

        if self.state.clip() == Some(name.as_str()) {
            self.state.rewind();
        }
    }

    /// Play an animation by name
    ///
    /// Does nothing if it is already the active, unfinished clip; otherwise
    /// starts it from the first frame.
    pub fn play(&mut self, name: &str) -> Result<(), AnimationError> {
        if !self.clips.contains(name) {
            return Err(AnimationError::UnknownAnimation(name.to_string()));
        }

        if self.state.clip() == Some(name) && !self.state.is_finished() {
            return Ok(());
        }

        self.state.start(name);
        Ok(())
    }

    /// Play an animation from the beginning, even if it's the same
    pub fn restart(&mut self, name: &str) -> Result<(), AnimationError> {
        if !self.clips.contains(name) {
            return Err(AnimationError::UnknownAnimation(name.to_string()));
        }

        self.state.start(name);
        Ok(())
    }

    /// Deselect the active clip
    pub fn stop(&mut self) {
        self.state.clear();
    }

    /// Advance playback by one tick. Returns true when the frame changed.
    pub fn update(&mut self) -> bool {
        let Some(clip) = self.state.clip().and_then(|name| self.clips.get(name)) else {
            return false;
        };

        let advanced = self
            .state
            .tick(clip.frame_count(), clip.speed, clip.looping);

        if advanced {
            trace!(
                "{} advanced to position {} (frame {})",
                clip.name,
                self.state.position(),
                clip.frame_at(self.state.position())
            );
        }

        advanced
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.status()
    }

    /// Check if a non-looping animation ran past its last frame
    pub fn is_finished(&self) -> bool {
        self.state.status() == PlaybackStatus::Finished
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Name of the active animation
    pub fn current_animation(&self) -> Option<&str> {
        self.state.clip()
    }

    /// Get the clip info for the current animation
    pub fn current_clip(&self) -> Option<&AnimationClip> {
        self.state.clip().and_then(|name| self.clips.get(name))
    }

    /// Sheet frame currently displayed
    pub fn current_frame(&self) -> Option<FrameIndex> {
        self.current_clip()
            .map(|clip| clip.frame_at(self.state.position()))
    }
}
