//! Display names for courses, palettes, music tracks and tile codes

use crate::rom::Game;

/// Foreground palettes, in ROM order
pub const PALETTE_NAMES: [&str; 10] = [
    "Course 1 (blue)",
    "Course 2 (green)",
    "Course 3 (purple)",
    "Course 4 (pink)",
    "Course 5 (tan)",
    "Course 6 (beige)",
    "Course 7 (grey)",
    "Course 8 (red)",
    "Extra course 7/8 (dark grey)",
    "Demo course (teal)",
];

const KIRBY_COURSES: [&str; 28] = [
    "1P Course 1",
    "1P Course 2",
    "1P Course 3",
    "1P Course 4",
    "1P Course 5",
    "1P Course 6",
    "1P Course 7",
    "1P Course 8",
    "1P Extra Course 1",
    "1P Extra Course 2",
    "1P Extra Course 3",
    "1P Extra Course 4",
    "1P Extra Course 5",
    "1P Extra Course 6",
    "1P Extra Course 7",
    "1P Extra Course 8",
    "2P Course 1",
    "2P Course 2",
    "2P Course 3",
    "2P Course 4",
    "Demo Course 1",
    "Demo Course 2",
    "Demo Course 3 / Test Course",
    "Test Course",
    "2P Extra Course 1",
    "2P Extra Course 2",
    "2P Extra Course 3",
    "2P Extra Course 4",
];

const TEE_SHOT_COURSES: [&str; 9] = [
    "Beginner Course",
    "Amateur Course",
    "Professional Course",
    "Master Course",
    "Extra Course 1",
    "Extra Course 2",
    "Extra Course 3",
    "Extra Course 4",
    "Gold Course",
];

/// Course names for a game, indexed by course number
pub fn course_names(game: Game) -> &'static [&'static str] {
    match game {
        Game::Kirby => &KIRBY_COURSES,
        Game::SpecialTeeShot => &TEE_SHOT_COURSES,
    }
}

/// Name of `course`, or `None` past the end of the course list
pub fn course_name(game: Game, course: usize) -> Option<&'static str> {
    course_names(game).get(course).copied()
}

/// Music tracks selectable for a course, by id
pub const MUSIC_NAMES: [(u8, &str); 25] = [
    (0x7E, "(none)"),
    (0x80, "Epilogue"),
    (0x82, "Title"),
    (0x83, "Opening demo (JP only)"),
    (0x84, "High scores"),
    (0x85, "Space Valley (course 2/7b)"),
    (0x86, "Over Water (course 1b)"),
    (0x87, "The Tricky Stuff (course 5b)"),
    (0x88, "Castles of Cake (course 6)"),
    (0x89, "Green Fields (course 5a/7a)"),
    (0x8A, "The First Hole (course 1a/3)"),
    (0x8B, "Iceberg Ocean (course 8)"),
    (0x8C, "Last Hole"),
    (0x8D, "Jigsaw Plains (course 4)"),
    (0x8F, "Continue?"),
    (0x92, "Final score"),
    (0x93, "2P course select"),
    (0x94, "Eyecatch"),
    (0x95, "Main menu"),
    (0x96, "1P course select"),
    (0x97, "Scorecard"),
    (0x9A, "Demo play"),
    (0x9B, "Dedede 1"),
    (0x9C, "Dedede 2"),
    (0x9F, "Game over"),
];

pub fn music_name(id: u8) -> Option<&'static str> {
    MUSIC_NAMES
        .binary_search_by_key(&id, |&(track, _)| track)
        .ok()
        .map(|i| MUSIC_NAMES[i].1)
}

/// Terrain shapes, indexed by geometry code; code 3 cannot be used
pub const GEOMETRY_NAMES: [&str; 28] = [
    "None",
    "Flat",
    "Four slopes up towards center",
    "(unused)",
    "Slope down towards south",
    "Slope down towards east",
    "Slope down towards north",
    "Slope down towards west",
    "Slopes down towards south and east (inner)",
    "Slopes down towards north and east (inner)",
    "Slopes down towards north and west (inner)",
    "Slopes down towards south and west (inner)",
    "Slopes down towards south and east (outer)",
    "Slopes down towards north and east (outer)",
    "Slopes down towards north and west (outer)",
    "Slopes down towards south and west (outer)",
    "Slope down towards southeast (top)",
    "Slope down towards northeast (top)",
    "Slope down towards northwest (top)",
    "Slope down towards southwest (top)",
    "Slope down towards southeast (bottom)",
    "Slope down towards northeast (bottom)",
    "Slope down towards northwest (bottom)",
    "Slope down towards southwest (bottom)",
    "Slope down towards southeast (middle)",
    "Slope down towards northeast (middle)",
    "Slope down towards northwest (middle)",
    "Slope down towards southwest (middle)",
];

pub fn geometry_name(geometry: u8) -> Option<&'static str> {
    GEOMETRY_NAMES.get(usize::from(geometry)).copied()
}

/// Obstacle names by code. Codes without an entry are not placeable.
pub const OBSTACLE_NAMES: &[(u8, &str)] = &[
    (0x00, "None"),
    (0x02, "Whispy Woods"),
    (0x04, "Sand trap"),
    (0x05, "Spike pit"),
    (0x0C, "Kirby"),
    (0x0D, "King Dedede (course 24-1 only)"),
    (0x10, "Current (south)"),
    (0x11, "Current (east)"),
    (0x12, "Current (north)"),
    (0x13, "Current (west)"),
    (0x14, "Arrow (south)"),
    (0x15, "Arrow (east)"),
    (0x16, "Arrow (north)"),
    (0x17, "Arrow (west)"),
    (0x18, "Booster (south)"),
    (0x19, "Booster (east)"),
    (0x1A, "Booster (north)"),
    (0x1B, "Booster (west)"),
    (0x1C, "Air vent (north-south)"),
    (0x1D, "Air vent (east-west)"),
    (0x20, "Bounce (use with tile 04)"),
    (0x21, "Bounce (use with tile 05)"),
    (0x22, "Bounce (use with tile 06)"),
    (0x23, "Bounce (use with tile 07)"),
    (0x24, "Bounce"),
    (0x28, "Bumper (north to south)"),
    (0x29, "Bumper (east to west)"),
    (0x2A, "Bumper (south to west)"),
    (0x2B, "Bumper (north to west)"),
    (0x2C, "Bumper (north to east)"),
    (0x2D, "Bumper (south to east)"),
    (0x30, "Conveyor belt (south)"),
    (0x31, "Conveyor belt (east)"),
    (0x32, "Conveyor belt (north)"),
    (0x33, "Conveyor belt (west)"),
    (0x34, "Conveyor belt (north, use with tile 04)"),
    (0x35, "Conveyor belt (south, use with tile 04)"),
    (0x36, "Conveyor belt (west, use with tile 05)"),
    (0x37, "Conveyor belt (east, use with tile 05)"),
    (0x38, "Conveyor belt (south, use with tile 06)"),
    (0x39, "Conveyor belt (north, use with tile 06)"),
    (0x3A, "Conveyor belt (east, use with tile 07)"),
    (0x3B, "Conveyor belt (west, use with tile 07)"),
    (0x40, "Waddle Dee"),
    (0x41, "Rocky"),
    (0x42, "Waddle Doo"),
    (0x43, "Flamer"),
    (0x44, "Spiney"),
    (0x45, "Twister"),
    (0x46, "Wheelie"),
    (0x47, "Sparky"),
    (0x48, "Starman"),
    (0x49, "Chilly"),
    (0x4A, "Broom Hatter"),
    (0x4B, "Squishy"),
    (0x4C, "Kabu"),
    (0x4D, "Gaspar"),
    (0x4E, "Pumpkin"),
    (0x4F, "UFO"),
    (0x50, "Gaspar (higher)"),
    (0x51, "Pumpkin (higher)"),
    (0x52, "UFO (higher)"),
    (0x57, "Transformer"),
    (0x58, "Mr. Bright switch"),
    (0x59, "Mr. Shine switch"),
    (0x5A, "Rotating space switch (off)"),
    (0x5B, "Rotating space switch (on)"),
    (0x5C, "Water switch (on)"),
    (0x5D, "Water switch (off)"),
    (0x61, "Water hazard"),
    (0x64, "Water hazard (use with tile 04)"),
    (0x65, "Water hazard (use with tile 05)"),
    (0x66, "Water hazard (use with tile 06)"),
    (0x67, "Water hazard (use with tile 07)"),
    (0x68, "Water hazard (use with tile 08)"),
    (0x69, "Water hazard (use with tile 09)"),
    (0x6A, "Water hazard (use with tile 0A)"),
    (0x6B, "Water hazard (use with tile 0B)"),
    (0x6C, "Water hazard (use with tile 0C)"),
    (0x6D, "Water hazard (use with tile 0D)"),
    (0x6E, "Water hazard (use with tile 0E)"),
    (0x6F, "Water hazard (use with tile 0F)"),
    (0x70, "Rotating space (clockwise, always on)"),
    (0x71, "Rotating space (counterclockwise, always on)"),
    (0x72, "Rotating space (clockwise, always on, slow)"),
    (0x73, "Rotating space (counterclockwise, always on, slow)"),
    (0x74, "Rotating space (clockwise, switch)"),
    (0x75, "Rotating space (counterclockwise, switch)"),
    (0x76, "Rotating space (clockwise, switch, slow)"),
    (0x77, "Rotating space (counterclockwise, switch, slow)"),
    (0x78, "Rotating space (clockwise, switch opposite)"),
    (0x79, "Rotating space (counterclockwise, switch opposite)"),
    (0x7A, "Rotating space (clockwise, switch opposite, slow)"),
    (0x7B, "Rotating space (counterclockwise, switch opposite, slow)"),
    (0x80, "Gordo (moves south, faces south)"),
    (0x81, "Gordo (moves south, faces east)"),
    (0x82, "Gordo (moves south, faces north)"),
    (0x83, "Gordo (moves south, faces west)"),
    (0x84, "Gordo (moves east, faces south)"),
    (0x85, "Gordo (moves east, faces east)"),
    (0x86, "Gordo (moves east, faces north)"),
    (0x87, "Gordo (moves east, faces west)"),
    (0x88, "Gordo (moves north, faces south)"),
    (0x89, "Gordo (moves north, faces east)"),
    (0x8A, "Gordo (moves north, faces north)"),
    (0x8B, "Gordo (moves north, faces west)"),
    (0x8C, "Gordo (moves west, faces south)"),
    (0x8D, "Gordo (moves west, faces east)"),
    (0x8E, "Gordo (moves west, faces north)"),
    (0x8F, "Gordo (moves west, faces west)"),
    (0x90, "Gordo (moves up/down, faces south)"),
    (0x91, "Gordo (moves up/down, faces east)"),
    (0x92, "Gordo (moves up/down, faces north)"),
    (0x93, "Gordo (moves up/down, faces west)"),
    (0x94, "Gordo (moves down/up, faces south)"),
    (0x95, "Gordo (moves down/up, faces east)"),
    (0x96, "Gordo (moves down/up, faces north)"),
    (0x97, "Gordo (moves down/up, faces west)"),
    (0x98, "Gordo path (north-south)"),
    (0x99, "Gordo path (east-west)"),
    (0x9A, "Gordo path (northwest corner)"),
    (0x9B, "Gordo path (southwest corner)"),
    (0x9C, "Gordo path (southeast corner)"),
    (0x9D, "Gordo path (northeast corner)"),
    (0x9E, "Gordo path (south end)"),
    (0x9F, "Gordo path (east end)"),
    (0xA0, "Gordo path (north end)"),
    (0xA1, "Gordo path (west end)"),
    (0xAC, "Kracko (no lightning)"),
    (0xAD, "Kracko (lightning 1)"),
    (0xAE, "Kracko (lightning 2)"),
    (0xB0, "Warp 1 (blue, south)"),
    (0xB1, "Warp 1 (blue, east)"),
    (0xB2, "Warp 1 (blue, north)"),
    (0xB3, "Warp 1 (blue, west)"),
    (0xB4, "Warp 2 (blue, south)"),
    (0xB5, "Warp 2 (blue, east)"),
    (0xB6, "Warp 2 (blue, north)"),
    (0xB7, "Warp 2 (blue, west)"),
    (0xB8, "Warp 1 (red)"),
    (0xB9, "Warp 2 (red)"),
    (0xC0, "Starting line (west end)"),
    (0xC1, "Starting line"),
    (0xC2, "Starting line (east end)"),
    (0xC3, "Kirby (course 24-1 only)"),
];

pub fn obstacle_name(obstacle: u8) -> Option<&'static str> {
    OBSTACLE_NAMES
        .binary_search_by_key(&obstacle, |&(code, _)| code)
        .ok()
        .map(|i| OBSTACLE_NAMES[i].1)
}
