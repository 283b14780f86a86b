// Game-side character animation

pub mod characters;
