//! Game knowledge: tile codes, sprite sheets, names and course settings

pub mod course;
pub mod geometry;
pub mod names;
pub mod obstacle;
pub mod sprites;
