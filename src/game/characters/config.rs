// Character settings and JSON character definitions

use super::animation::DEFAULT_SPEED;
use super::character::AnimatedCharacter;
use super::direction::DirectionMode;
use super::AnimationError;
use crate::core::math::is_valid_scale;
use crate::engine::assets::{FrameIndex, SheetStore, SlicePolicy};
use anyhow::{bail, ensure, Context, Result};
use glam::Vec2;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Construction-time options for a character
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterSettings {
    /// Initial top-left position
    pub position: Vec2,
    /// Display scale, must be finite and positive
    pub scale: f32,
    /// Facing policy, fixed for the character's lifetime
    pub direction_mode: DirectionMode,
}

impl Default for CharacterSettings {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: 1.0,
            direction_mode: DirectionMode::AutoFlip,
        }
    }
}

impl CharacterSettings {
    /// Settings at a position with default scale and mode
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::default()
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_direction_mode(mut self, mode: DirectionMode) -> Self {
        self.direction_mode = mode;
        self
    }

    /// Check every option is in range
    pub fn validate(&self) -> Result<(), AnimationError> {
        if !is_valid_scale(self.scale) {
            return Err(AnimationError::InvalidScale(self.scale));
        }
        Ok(())
    }
}

/// Sprite sheet section of a character definition
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SheetConfig {
    /// Path relative to the store's base directory
    pub path: String,
    pub frame_width: u32,
    pub frame_height: u32,
    #[serde(default)]
    pub policy: SlicePolicy,
}

fn default_speed() -> u32 {
    DEFAULT_SPEED
}

fn default_looping() -> bool {
    true
}

/// One clip of a character definition
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum ClipConfig {
    /// Inclusive 1-based frame range
    Range {
        name: String,
        start: FrameIndex,
        end: FrameIndex,
        #[serde(default = "default_speed")]
        speed: u32,
        #[serde(default = "default_looping")]
        looping: bool,
    },
    /// Explicit frame list
    Frames {
        name: String,
        frames: Vec<FrameIndex>,
        #[serde(default = "default_speed")]
        speed: u32,
        #[serde(default = "default_looping")]
        looping: bool,
    },
    /// `<name>_left` / `<name>_right` pair
    Directional {
        name: String,
        left: Vec<FrameIndex>,
        right: Vec<FrameIndex>,
        #[serde(default = "default_speed")]
        speed: u32,
        #[serde(default = "default_looping")]
        looping: bool,
    },
    /// Leading frames of a zero-based grid row
    Row {
        name: String,
        row: u32,
        count: u32,
        #[serde(default = "default_speed")]
        speed: u32,
        #[serde(default = "default_looping")]
        looping: bool,
    },
    /// Next unused frames of the sheet, optionally packed `columns` per row
    Sequential {
        name: String,
        count: u32,
        #[serde(default)]
        columns: Option<u32>,
        #[serde(default = "default_speed")]
        speed: u32,
        #[serde(default = "default_looping")]
        looping: bool,
    },
    /// Leading frames of a sheet file used only by this clip
    Sheet {
        name: String,
        path: String,
        frame_width: u32,
        frame_height: u32,
        #[serde(default)]
        policy: SlicePolicy,
        count: u32,
        #[serde(default = "default_speed")]
        speed: u32,
        #[serde(default = "default_looping")]
        looping: bool,
    },
    /// `<name>_left` / `<name>_right` pair, each from its own sheet file
    DirectionalSheets {
        name: String,
        left: String,
        right: String,
        frame_width: u32,
        frame_height: u32,
        #[serde(default)]
        policy: SlicePolicy,
        count: u32,
        #[serde(default = "default_speed")]
        speed: u32,
        #[serde(default = "default_looping")]
        looping: bool,
    },
}

impl ClipConfig {
    pub fn name(&self) -> &str {
        match self {
            Self::Range { name, .. }
            | Self::Frames { name, .. }
            | Self::Directional { name, .. }
            | Self::Row { name, .. }
            | Self::Sequential { name, .. }
            | Self::Sheet { name, .. }
            | Self::DirectionalSheets { name, .. } => name,
        }
    }

    /// Whether frames come from the character's sheet rather than a file of
    /// the clip's own
    pub fn uses_character_sheet(&self) -> bool {
        !matches!(self, Self::Sheet { .. } | Self::DirectionalSheets { .. })
    }

    /// Define this clip on a character, loading any sheets of its own
    /// through `store`
    pub fn apply(
        &self,
        character: &mut AnimatedCharacter,
        store: &mut SheetStore,
    ) -> Result<(), AnimationError> {
        match self {
            Self::Range {
                name,
                start,
                end,
                speed,
                looping,
            } => character.define_from_range(name, *start, *end, *speed, *looping),
            Self::Frames {
                name,
                frames,
                speed,
                looping,
            } => character.define_from_frames(name, frames, *speed, *looping),
            Self::Directional {
                name,
                left,
                right,
                speed,
                looping,
            } => character.define_directional(name, left, right, *speed, *looping),
            Self::Row {
                name,
                row,
                count,
                speed,
                looping,
            } => character.define_row(name, *row, *count, *speed, *looping),
            Self::Sequential {
                name,
                count,
                columns: Some(columns),
                speed,
                looping,
            } => character.define_sequential_packed(name, *count, *columns, *speed, *looping),
            Self::Sequential {
                name,
                count,
                columns: None,
                speed,
                looping,
            } => character.define_sequential(name, *count, *speed, *looping),
            Self::Sheet {
                name,
                path,
                frame_width,
                frame_height,
                policy,
                count,
                speed,
                looping,
            } => {
                let sheet = store.load(path, *frame_width, *frame_height, *policy)?;
                character.define_from_sheet(name, sheet, *count, *speed, *looping)
            }
            Self::DirectionalSheets {
                name,
                left,
                right,
                frame_width,
                frame_height,
                policy,
                count,
                speed,
                looping,
            } => {
                let left = store.load(left, *frame_width, *frame_height, *policy)?;
                let right = store.load(right, *frame_width, *frame_height, *policy)?;
                character.define_directional_sheets(name, left, right, *count, *speed, *looping)
            }
        }
    }
}

fn default_scale() -> f32 {
    1.0
}

/// A complete character definition, usually read from JSON
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CharacterConfig {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub direction_mode: DirectionMode,
    #[serde(default)]
    pub sheet: Option<SheetConfig>,
    #[serde(default)]
    pub clips: Vec<ClipConfig>,
    /// Clip to start playing once everything is defined
    #[serde(default)]
    pub play: Option<String>,
}

impl CharacterConfig {
    /// Parse a definition from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Invalid character definition")?;
        config.validate()?;
        Ok(config)
    }

    /// Read a definition from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("In {}", path.display()))
    }

    pub fn settings(&self) -> CharacterSettings {
        CharacterSettings {
            position: Vec2::new(self.x, self.y),
            scale: self.scale,
            direction_mode: self.direction_mode,
        }
    }

    /// Check the definition is self-consistent before touching any files
    pub fn validate(&self) -> Result<()> {
        self.settings().validate()?;

        if self.sheet.is_none() {
            if let Some(clip) = self.clips.iter().find(|clip| clip.uses_character_sheet()) {
                bail!("Clip {} needs a sheet but none is given", clip.name());
            }
        }

        let mut names = HashSet::new();
        for clip in &self.clips {
            if !names.insert(clip.name()) {
                bail!("Clip {} is defined more than once", clip.name());
            }
        }

        if let Some(play) = &self.play {
            ensure!(
                names.contains(play.as_str()),
                "Initial clip {} is not defined",
                play
            );
        }

        Ok(())
    }

    /// Build the character, loading its sheet through `store`
    pub fn build(&self, store: &mut SheetStore) -> Result<AnimatedCharacter> {
        self.validate()?;
        let mut character = AnimatedCharacter::new(self.settings())?;

        if let Some(sheet) = &self.sheet {
            let loaded = store
                .load(&sheet.path, sheet.frame_width, sheet.frame_height, sheet.policy)
                .with_context(|| format!("Failed to load sheet {}", sheet.path))?;
            character.set_sheet(loaded)?;
        }

        for clip in &self.clips {
            clip.apply(&mut character, store)
                .with_context(|| format!("Failed to define clip {}", clip.name()))?;
        }

        if let Some(play) = &self.play {
            character.play(play)?;
        }

        Ok(character)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = CharacterSettings::default();
        assert_eq!(settings.position, Vec2::ZERO);
        assert_eq!(settings.scale, 1.0);
        assert_eq!(settings.direction_mode, DirectionMode::AutoFlip);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_builders() {
        let settings = CharacterSettings::at(3.0, 4.0)
            .with_scale(2.0)
            .with_direction_mode(DirectionMode::NoFlip);
        assert_eq!(settings.position, Vec2::new(3.0, 4.0));
        assert_eq!(settings.scale, 2.0);
        assert_eq!(settings.direction_mode, DirectionMode::NoFlip);
    }

    #[test]
    fn test_settings_reject_bad_scale() {
        for scale in [0.0, -2.0, f32::NAN] {
            let settings = CharacterSettings::default().with_scale(scale);
            assert!(matches!(settings.validate(), Err(AnimationError::InvalidScale(_))));
        }
    }

    #[test]
    fn test_parse_full_definition() {
        let config = CharacterConfig::from_json_str(
            r#"{
                "x": 100, "y": 50, "scale": 2.0,
                "direction_mode": "separate_directions",
                "sheet": { "path": "hero.png", "frame_width": 64, "frame_height": 64, "policy": "truncate" },
                "clips": [
                    { "kind": "range", "name": "idle", "start": 1, "end": 4, "speed": 15 },
                    { "kind": "frames", "name": "hit", "frames": [10, 11, 12], "speed": 5, "looping": false },
                    { "kind": "directional", "name": "walk", "left": [5, 6], "right": [7, 8] },
                    { "kind": "row", "name": "run", "row": 2, "count": 4 },
                    { "kind": "sequential", "name": "jump", "count": 3 }
                ],
                "play": "idle"
            }"#,
        )
        .unwrap();

        assert_eq!(config.settings().position, Vec2::new(100.0, 50.0));
        assert_eq!(config.direction_mode, DirectionMode::SeparateDirections);
        assert_eq!(config.sheet.as_ref().unwrap().policy, SlicePolicy::Truncate);
        assert_eq!(config.clips.len(), 5);
        assert_eq!(
            config.clips[2],
            ClipConfig::Directional {
                name: "walk".to_string(),
                left: vec![5, 6],
                right: vec![7, 8],
                speed: DEFAULT_SPEED,
                looping: true,
            }
        );
    }

    #[test]
    fn test_parse_own_sheet_clips() {
        let config = CharacterConfig::from_json_str(
            r#"{
                "direction_mode": "separate_directions",
                "clips": [
                    { "kind": "sheet", "name": "idle", "path": "idle.png",
                      "frame_width": 64, "frame_height": 64, "count": 4, "speed": 15 },
                    { "kind": "directional_sheets", "name": "walk", "left": "walk_l.png",
                      "right": "walk_r.png", "frame_width": 64, "frame_height": 64, "count": 4 }
                ]
            }"#,
        )
        .unwrap();

        // No shared sheet needed when every clip brings its own
        assert!(config.sheet.is_none());
        assert!(config.clips.iter().all(|clip| !clip.uses_character_sheet()));
        assert_eq!(config.clips[1].name(), "walk");
        assert!(matches!(
            &config.clips[0],
            ClipConfig::Sheet { count: 4, speed: 15, looping: true, policy: SlicePolicy::Strict, .. }
        ));
    }

    #[test]
    fn test_parse_packed_sequential() {
        let config = CharacterConfig::from_json_str(
            r#"{
                "sheet": { "path": "all.png", "frame_width": 64, "frame_height": 64 },
                "clips": [
                    { "kind": "sequential", "name": "idle", "count": 4, "columns": 8 },
                    { "kind": "sequential", "name": "walk", "count": 8 }
                ]
            }"#,
        )
        .unwrap();
        assert!(matches!(&config.clips[0], ClipConfig::Sequential { columns: Some(8), .. }));
        assert!(matches!(&config.clips[1], ClipConfig::Sequential { columns: None, .. }));
    }

    #[test]
    fn test_parse_defaults() {
        let config = CharacterConfig::from_json_str("{}").unwrap();
        assert_eq!(config.scale, 1.0);
        assert_eq!(config.direction_mode, DirectionMode::AutoFlip);
        assert!(config.sheet.is_none());
        assert!(config.clips.is_empty());
    }

    #[test]
    fn test_rejects_unknown_option() {
        assert!(CharacterConfig::from_json_str(r#"{ "scael": 2.0 }"#).is_err());
    }

    #[test]
    fn test_rejects_negative_speed() {
        let result = CharacterConfig::from_json_str(
            r#"{
                "sheet": { "path": "hero.png", "frame_width": 64, "frame_height": 64 },
                "clips": [{ "kind": "range", "name": "idle", "start": 1, "end": 4, "speed": -1 }]
            }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_duplicate_clip_names() {
        let err = CharacterConfig::from_json_str(
            r#"{
                "sheet": { "path": "hero.png", "frame_width": 64, "frame_height": 64 },
                "clips": [
                    { "kind": "range", "name": "idle", "start": 1, "end": 4 },
                    { "kind": "range", "name": "idle", "start": 5, "end": 8 }
                ]
            }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_rejects_clips_without_sheet() {
        let err = CharacterConfig::from_json_str(
            r#"{ "clips": [{ "kind": "range", "name": "idle", "start": 1, "end": 4 }] }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("needs a sheet"));
    }

    #[test]
    fn test_rejects_unknown_initial_clip() {
        let err = CharacterConfig::from_json_str(
            r#"{
                "sheet": { "path": "hero.png", "frame_width": 64, "frame_height": 64 },
                "clips": [{ "kind": "range", "name": "idle", "start": 1, "end": 4 }],
                "play": "walk"
            }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("walk"));
    }

    #[test]
    fn test_rejects_bad_scale() {
        let err = CharacterConfig::from_json_str(r#"{ "scale": 0.0 }"#).unwrap_err();
        assert!(err.to_string().contains("Invalid scale"));
    }
}
