//! Obstacle codes

pub const NONE: u8 = 0x00;
pub const WHISPY_WOODS: u8 = 0x02;
pub const SAND: u8 = 0x04;
pub const SPIKES: u8 = 0x05;
pub const KIRBY: u8 = 0x0C;
pub const DEDEDE: u8 = 0x0D;

pub const CURRENT_SOUTH: u8 = 0x10;
pub const CURRENT_WEST: u8 = 0x13;
pub const ARROW_SOUTH: u8 = 0x14;
pub const BOOSTER_SOUTH: u8 = 0x18;
pub const VENT_NORTH_SOUTH: u8 = 0x1C;
pub const VENT_EAST_WEST: u8 = 0x1D;

/// Bounce pads; 0x20-0x23 sit on the four cardinal slopes
pub const BOUNCE: u8 = 0x20;
pub const BOUNCE_NORTH: u8 = 0x22;
pub const BOUNCE_WEST: u8 = 0x23;
pub const BOUNCE_FLAT: u8 = 0x24;

pub const BUMPER_NORTH_SOUTH: u8 = 0x28;
pub const BUMPER_SOUTH_EAST: u8 = 0x2D;

/// Flat conveyor belts, by direction: south, east, north, west
pub const BELTS: u8 = 0x30;
/// Conveyor belts on slopes
pub const BELT_SLOPES: u8 = 0x34;
pub const BELT_NORTH_UP: u8 = 0x34;
pub const BELT_SOUTH_DOWN: u8 = 0x35;
pub const BELT_WEST_UP: u8 = 0x36;
pub const BELT_EAST_DOWN: u8 = 0x37;
pub const BELT_SOUTH_UP: u8 = 0x38;
pub const BELT_NORTH_DOWN: u8 = 0x39;
pub const BELT_EAST_UP: u8 = 0x3A;
pub const BELT_WEST_DOWN: u8 = 0x3B;

pub const TRANSFORMER: u8 = 0x57;

pub const SWITCH_BRIGHT: u8 = 0x58;
pub const SWITCH_SHINE: u8 = 0x59;
pub const SWITCH_ROTATE_OFF: u8 = 0x5A;
pub const SWITCH_ROTATE_ON: u8 = 0x5B;
pub const SWITCH_WATER_ON: u8 = 0x5C;
pub const SWITCH_WATER_OFF: u8 = 0x5D;

/// Flat water hazard; 0x64-0x6F match slope geometry 0x04-0x0F
pub const WATER: u8 = 0x61;
pub const WATER_SOUTH: u8 = 0x64;
pub const WATER_EAST: u8 = 0x65;
pub const WATER_SOUTH_EAST_OUTER: u8 = 0x6C;
pub const WATER_NORTH_EAST_OUTER: u8 = 0x6D;
pub const WATER_SOUTH_WEST_OUTER: u8 = 0x6F;
pub const END_WATER: u8 = 0x70;

/// Rotating spaces; even codes turn clockwise
pub const ROTATE_CW: u8 = 0x70;
pub const ROTATE_CCW: u8 = 0x71;
/// Rotating spaces triggered opposite to the switch
pub const ROTATE_CW_OPPOSITE: u8 = 0x78;
pub const ROTATE_CCW_OPPOSITE: u8 = 0x79;
pub const END_ROTATE: u8 = 0x7C;

pub const GORDO: u8 = 0x80;

pub const WARP_SOUTH: u8 = 0xB0;
pub const WARP_SOUTH_2: u8 = 0xB4;
pub const WARP_WEST_2: u8 = 0xB7;
pub const WARP_RED: u8 = 0xB8;
pub const WARP_RED_2: u8 = 0xB9;

pub const START_LINE_WEST: u8 = 0xC0;
pub const START_LINE: u8 = 0xC1;
pub const START_LINE_EAST: u8 = 0xC2;
/// Kirby on the starting line (course 24-1 only)
pub const KIRBY_START_LINE: u8 = 0xC3;

/// Number of obstacle codes
pub const COUNT: usize = 0xC4;

/// Whether the obstacle is drawn as a standing character sprite rather
/// than flat on the ground
pub fn is_character(obstacle: u8) -> bool {
    matches!(
        obstacle,
        WHISPY_WOODS | KIRBY | KIRBY_START_LINE | DEDEDE | 0x40..=0x52 | TRANSFORMER | 0x80..=0x97 | 0xAC..=0xAE
    )
}

pub fn is_water(obstacle: u8) -> bool {
    (WATER..END_WATER).contains(&obstacle)
}

/// Conveyor belt for `belt` (0x30-0x33) laid on cardinal slope `geometry`,
/// or 0 where that combination does not exist
pub fn belt_on_slope(belt: u8, geometry: u8) -> u8 {
    // rows: belt south, east, north, west; columns: slope south, east, north, west
    const BELT_MAP: [[u8; 4]; 4] = [
        [BELT_SOUTH_DOWN, 0, BELT_SOUTH_UP, 0],
        [0, BELT_EAST_DOWN, 0, BELT_EAST_UP],
        [BELT_NORTH_UP, 0, BELT_NORTH_DOWN, 0],
        [0, BELT_WEST_UP, 0, BELT_WEST_DOWN],
    ];
    let row = usize::from(belt.wrapping_sub(BELTS));
    let col = usize::from(geometry.wrapping_sub(super::geometry::SLOPES));
    BELT_MAP
        .get(row)
        .and_then(|r| r.get(col))
        .copied()
        .unwrap_or(NONE)
}
