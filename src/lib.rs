// Sprite sheet animation for 2D characters
//
// - `core`: geometry helpers
// - `engine`: sheet slicing, loading, reloading and debug output
// - `game`: clips, playback, facing and characters

pub mod core;
pub mod engine;
pub mod game;

pub use engine::assets::{AssetError, FrameIndex, SheetStore, SlicePolicy, SpriteSheet};
pub use game::characters::{
    AnimatedCharacter, AnimationError, AnimatorGroup, CharacterConfig, CharacterSettings,
    DirectionMode, Facing, PlaybackStatus,
};
