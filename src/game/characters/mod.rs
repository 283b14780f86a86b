// Character animation system
//
// This module contains everything needed to animate a sprite character:
// - Named clips over frames of a sliced sprite sheet
// - Tick-driven playback state machine
// - Facing and horizontal mirroring
// - The composed character and multi-character groups
// - JSON configuration and ready-made presets

pub mod animation;
pub mod character;
pub mod config;
pub mod direction;
pub mod presets;
pub mod state;

use crate::engine::assets::{AssetError, FrameIndex};

// Re-export commonly used types
pub use animation::{AnimationClip, AnimationController, ClipRegistry};
pub use character::{AnimatedCharacter, AnimatorGroup, CharacterId};
pub use config::{CharacterConfig, CharacterSettings, ClipConfig, SheetConfig};
pub use direction::{DirectionMode, DirectionState, Facing, FrameCache, FrameKey};
pub use state::{PlaybackState, PlaybackStatus};

/// Errors raised while defining or playing animations
#[derive(Debug, thiserror::Error)]
pub enum AnimationError {
    #[error("Frame {index} is outside the sheet's {frame_count} frames")]
    FrameIndexOutOfBounds {
        index: FrameIndex,
        frame_count: usize,
    },

    #[error("Invalid frame range {start}..={end}")]
    InvalidFrameRange { start: FrameIndex, end: FrameIndex },

    #[error("Animation {0} needs a speed of at least one tick per frame")]
    InvalidSpeed(String),

    #[error("Animation {0} has no frames")]
    EmptyClip(String),

    #[error("Unknown animation: {0}")]
    UnknownAnimation(String),

    #[error("Operation requires direction mode {expected}, character uses {actual}")]
    InvalidDirectionMode {
        expected: DirectionMode,
        actual: DirectionMode,
    },

    #[error("Invalid scale {0}")]
    InvalidScale(f32),

    #[error("Clips must be packed at least one column wide, got {0}")]
    InvalidColumns(u32),

    #[error("No sprite sheet loaded")]
    SheetNotLoaded,

    #[error(transparent)]
    Asset(#[from] AssetError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_error_display() {
        let err = AnimationError::UnknownAnimation("fly".to_string());
        assert_eq!(err.to_string(), "Unknown animation: fly");

        let err = AnimationError::InvalidDirectionMode {
            expected: DirectionMode::SeparateDirections,
            actual: DirectionMode::AutoFlip,
        };
        assert_eq!(
            err.to_string(),
            "Operation requires direction mode separate_directions, character uses auto_flip"
        );
    }

    #[test]
    fn test_asset_error_passthrough() {
        let err: AnimationError = AssetError::NotFound("hero.png".to_string()).into();
        assert_eq!(err.to_string(), "Asset not found: hero.png");
    }
}
