//! KDC Editor - level codec and tile composition for Kirby's Dream Course
//!
//! This library reads, edits and rewrites the course data of Kirby's Dream
//! Course (US/EU) and Kirby Bowl (JP) SNES ROM images. Special Tee Shot
//! images can be read but not saved.
//!
//! ## Architecture
//!
//! The editor is organized into:
//! - **ROM** (`rom/`): Version detection, address translation, bank-aware placement
//! - **Level** (`level/`): Tile grid model, ROM chunk load/save, edit operations, level and course files
//! - **Render** (`render/`): Metatile composition, isometric projection, clip tables
//! - **Game** (`game/`): Tile codes, sprite ranges, name catalogs, music and course settings
//! - **Driver** (`driver/`): Whole-ROM load and save sequencing
//! - **Common** (`common/`): Shared infrastructure (errors)
//!
//! Level data is compressed with the `halpack` crate.

pub mod common;
pub mod rom;
pub mod level;
pub mod render;
pub mod game;
pub mod driver;

// Re-exports for convenience
pub use common::{EditorError, EditorResult, LevelLoadError};
pub use driver::{LoadOptions, SaveOptions, SaveReport, Workspace, parse_level_id};
pub use level::{CourseFile, Level, LevelFile, LevelStore, Recovery, Region, Tile, TileInfo};
pub use render::{ClipTable, FragmentTables, Playfield};
pub use rom::{Game, RomFile, Version};
