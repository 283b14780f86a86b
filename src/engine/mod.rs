// Engine modules: sprite sheet assets and debug tooling

pub mod assets;
pub mod debug;
