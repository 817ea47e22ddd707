//! Terrain shape codes
//!
//! Slope names give the direction the slope goes *down* towards.

/// Number of geometry codes
pub const COUNT: usize = 0x1C;

pub const NONE: u8 = 0x00;
pub const FLAT: u8 = 0x01;
/// Four slopes up towards the center
pub const SLOPES_UP: u8 = 0x02;
/// Four slopes down into the ground (unusable)
pub const SLOPES_DOWN: u8 = 0x03;

pub const SLOPE_SOUTH: u8 = 0x04;
pub const SLOPE_EAST: u8 = 0x05;
pub const SLOPE_NORTH: u8 = 0x06;
pub const SLOPE_WEST: u8 = 0x07;

pub const SOUTH_EAST_INNER: u8 = 0x08;
pub const NORTH_EAST_INNER: u8 = 0x09;
pub const NORTH_WEST_INNER: u8 = 0x0A;
pub const SOUTH_WEST_INNER: u8 = 0x0B;

pub const SOUTH_EAST_OUTER: u8 = 0x0C;
pub const NORTH_EAST_OUTER: u8 = 0x0D;
pub const NORTH_WEST_OUTER: u8 = 0x0E;
pub const SOUTH_WEST_OUTER: u8 = 0x0F;

pub const SOUTHEAST_UPPER: u8 = 0x10;
pub const NORTHEAST_UPPER: u8 = 0x11;
pub const NORTHWEST_UPPER: u8 = 0x12;
pub const SOUTHWEST_UPPER: u8 = 0x13;

pub const SOUTHEAST_LOWER: u8 = 0x14;
pub const NORTHEAST_LOWER: u8 = 0x15;
pub const NORTHWEST_LOWER: u8 = 0x16;
pub const SOUTHWEST_LOWER: u8 = 0x17;

pub const SOUTHEAST_FULL: u8 = 0x18;
pub const NORTHEAST_FULL: u8 = 0x19;
pub const NORTHWEST_FULL: u8 = 0x1A;
pub const SOUTHWEST_FULL: u8 = 0x1B;

/// First of the single-direction and corner slopes
pub const SLOPES: u8 = SLOPE_SOUTH;
/// First of the inner/outer corner slopes
pub const SLOPES_DOUBLE: u8 = SOUTH_EAST_INNER;
/// One past the corner slopes
pub const END_SLOPES: u8 = SOUTHEAST_UPPER;

/// Upper half of a diagonal slope
pub fn is_diagonal_upper(geometry: u8) -> bool {
    (SOUTHEAST_UPPER..SOUTHEAST_LOWER).contains(&geometry)
}

/// Lower half of a diagonal slope; drawn two rows lower than its origin
pub fn is_diagonal_lower(geometry: u8) -> bool {
    (SOUTHEAST_LOWER..SOUTHEAST_FULL).contains(&geometry)
}

/// Any slope (cardinal, corner or diagonal)
pub fn is_slope(geometry: u8) -> bool {
    geometry >= SLOPES
}

/// Single-direction slope, the only shapes slope-specific obstacles exist for
pub fn is_cardinal_slope(geometry: u8) -> bool {
    (SLOPES..SLOPES_DOUBLE).contains(&geometry)
}
