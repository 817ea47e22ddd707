//! Isometric tilemap generation
//!
//! Turns the 2D tile grid into the two-layer playfield the game draws,
//! plus the clip table it uses to order overlapping diagonals.
//!
//! # Tile words
//!
//! Every playfield entry is a SNES tilemap word:
//!
//! | Bits  | Meaning          |
//! |-------|------------------|
//! | 0-9   | tile number      |
//! | 10-12 | palette row      |
//! | 13    | priority         |
//! | 14    | horizontal flip  |
//! | 15    | vertical flip    |
//!
//! A word whose tile number is 0 is transparent.

pub mod clip;
pub mod fragments;
pub mod isometric;
pub mod metatile;

pub use clip::{ClipEntry, ClipTable};
pub use fragments::FragmentTables;
pub use isometric::{FIELD_HEIGHT, FIELD_WIDTH, Playfield, SupportColumn, project};
pub use metatile::{Borders, Kind, Metatile, build_metatile, build_obstacle, find_metatile};

/// Priority bit
pub const PRI: u16 = 0x2000;
/// Horizontal flip
pub const FLIP_H: u16 = 0x4000;
/// Vertical flip
pub const FLIP_V: u16 = 0x8000;
pub const FLIP_BOTH: u16 = FLIP_H | FLIP_V;

/// Tile number of a tilemap word
pub const fn tile(word: u16) -> u16 {
    word & 0x3FF
}

/// Palette row bits for a tilemap word
pub const fn pal(row: u16) -> u16 {
    row << 10
}
