//! Common infrastructure shared across the ROM, level and render layers

mod error;

pub use error::{EditorError, EditorResult, LevelLoadError};
