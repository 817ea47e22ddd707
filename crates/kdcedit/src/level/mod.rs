//! Level data model
//!
//! A level is a rectangular grid of [`Tile`]s, up to 64x64 and never more
//! than [`MAX_2D_AREA`] tiles, plus a 28-byte header. Row 0 of the in-memory
//! grid is the northern edge; the ROM stores rows south to north.

mod edit;
mod files;
mod store;
mod tileinfo;

pub use edit::{Clipboard, Region, TileChange};
pub use files::{COURSE_FILE_MAGIC, COURSE_LEVELS, CourseFile, CourseImport, LEVEL_FILE_MAGIC, LevelFile};
pub use store::{EncodedLevel, LevelStore, PLAYFIELD_CAPACITY, PlayfieldOverflow, Recovery, SavedLevels};
pub use tileinfo::{HeightEdit, TileInfo};

use bitflags::bitflags;

/// Grid capacity in either direction
pub const MAX_2D_SIZE: usize = 64;
/// Maximum number of tiles in a level
pub const MAX_2D_AREA: usize = 2048;
/// Highest tile height the editor produces
pub const MAX_HEIGHT: u8 = 15;

bitflags! {
    /// Per-tile flag byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TileFlags: u8 {
        const BUMPER_SOUTH = 0x01;
        const BUMPER_EAST  = 0x02;
        const BUMPER_NORTH = 0x04;
        const BUMPER_WEST  = 0x08;
        /// Unused bits, kept so unedited tiles save unchanged
        const UNUSED       = 0x70;
        /// Tile belongs to the upper render layer
        const LAYER        = 0x80;
    }
}

/// One grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Tile {
    /// Terrain shape, 0 for no tile
    pub geometry: u8,
    /// Obstacle code, 0 for none
    pub obstacle: u8,
    pub height: u8,
    pub flags: TileFlags,
}

impl Tile {
    /// The empty tile
    pub const EMPTY: Tile = Tile {
        geometry: 0,
        obstacle: 0,
        height: 0,
        flags: TileFlags::empty(),
    };

    /// A flat tile with nothing on it
    pub fn flat(height: u8) -> Self {
        Self { geometry: 1, height, ..Self::EMPTY }
    }

    pub fn is_empty(&self) -> bool {
        self.geometry == 0
    }

    /// Render layer (0 or 1)
    pub fn layer(&self) -> u8 {
        u8::from(self.flags.contains(TileFlags::LAYER))
    }

    pub fn bumper_north(&self) -> bool {
        self.flags.contains(TileFlags::BUMPER_NORTH)
    }

    pub fn bumper_east(&self) -> bool {
        self.flags.contains(TileFlags::BUMPER_EAST)
    }

    pub fn bumper_south(&self) -> bool {
        self.flags.contains(TileFlags::BUMPER_SOUTH)
    }

    pub fn bumper_west(&self) -> bool {
        self.flags.contains(TileFlags::BUMPER_WEST)
    }

    /// Serialize as (geometry, obstacle, height, flags)
    pub fn to_bytes(self) -> [u8; 4] {
        [self.geometry, self.obstacle, self.height, self.flags.bits()]
    }

    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            geometry: bytes[0],
            obstacle: bytes[1],
            height: bytes[2],
            flags: TileFlags::from_bits_retain(bytes[3]),
        }
    }
}

/// Level header as stored in the ROM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    pub unknown1: u16,
    pub width: u16,
    pub length: u16,
    pub unknown2: u16,
    /// Playfield width in 8x8 tiles
    pub field_width: u16,
    /// Playfield height in 8x8 tiles
    pub field_height: u16,
    /// Sprite alignment offsets
    pub align_horiz: u16,
    pub align_vert: u16,
    pub map_id: [u8; 12],
}

impl Header {
    /// Serialized size in bytes
    pub const SIZE: usize = 28;

    pub fn from_bytes(bytes: &[u8; Self::SIZE]) -> Self {
        let word = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
        let mut map_id = [0; 12];
        map_id.copy_from_slice(&bytes[16..28]);
        Self {
            unknown1: word(0),
            width: word(2),
            length: word(4),
            unknown2: word(6),
            field_width: word(8),
            field_height: word(10),
            align_horiz: word(12),
            align_vert: word(14),
            map_id,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0; Self::SIZE];
        let words = [
            self.unknown1,
            self.width,
            self.length,
            self.unknown2,
            self.field_width,
            self.field_height,
            self.align_horiz,
            self.align_vert,
        ];
        for (i, word) in words.iter().enumerate() {
            bytes[i * 2..i * 2 + 2].copy_from_slice(&word.to_le_bytes());
        }
        bytes[16..28].copy_from_slice(&self.map_id);
        bytes
    }

    /// Whether the grid dimensions fit the fixed 64x64 capacity and the
    /// area limit
    pub fn size_is_valid(&self) -> bool {
        let (w, l) = (usize::from(self.width), usize::from(self.length));
        w <= MAX_2D_SIZE && l <= MAX_2D_SIZE && w * l <= MAX_2D_AREA
    }
}

/// Fixed-capacity tile grid
pub type TileGrid = [[Tile; MAX_2D_SIZE]; MAX_2D_SIZE];

/// An editable level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub header: Header,
    /// Indexed `[y][x]`, north to south then west to east
    pub tiles: Box<TileGrid>,
    /// Differs from what is stored in the ROM
    pub modified: bool,
    /// Changed since the last save
    pub modified_recently: bool,
    /// Music track id
    pub music: u8,
}

impl Level {
    /// Blank level of the given size; dimensions are clamped to the grid
    pub fn new(width: u16, length: u16) -> Self {
        let width = width.min(MAX_2D_SIZE as u16);
        let length = length.min(MAX_2D_SIZE as u16);
        Self {
            header: Header {
                width,
                length,
                ..Header::default()
            },
            tiles: Box::new([[Tile::EMPTY; MAX_2D_SIZE]; MAX_2D_SIZE]),
            modified: false,
            modified_recently: false,
            music: 0,
        }
    }

    /// Stand-in for a level that could not be loaded
    pub fn placeholder() -> Self {
        Self::new(10, 10)
    }

    pub fn width(&self) -> usize {
        usize::from(self.header.width).min(MAX_2D_SIZE)
    }

    pub fn length(&self) -> usize {
        usize::from(self.header.length).min(MAX_2D_SIZE)
    }

    /// Tile at column `x`, row `y`, or `None` outside the level
    pub fn tile(&self, x: usize, y: usize) -> Option<&Tile> {
        if x < self.width() && y < self.length() {
            Some(&self.tiles[y][x])
        } else {
            None
        }
    }

    pub fn tile_mut(&mut self, x: usize, y: usize) -> Option<&mut Tile> {
        if x < self.width() && y < self.length() {
            Some(&mut self.tiles[y][x])
        } else {
            None
        }
    }

    /// Tile at a signed position; anything outside the level reads as empty
    pub fn tile_or_empty(&self, x: isize, y: isize) -> Tile {
        match (usize::try_from(x), usize::try_from(y)) {
            (Ok(x), Ok(y)) => self.tile(x, y).copied().unwrap_or(Tile::EMPTY),
            _ => Tile::EMPTY,
        }
    }

    /// Iterate over the rows in use, north first
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        let width = self.width();
        self.tiles[..self.length()].iter().map(move |row| &row[..width])
    }

    /// Highest tile height in the level
    pub fn max_height(&self) -> u8 {
        self.rows()
            .flat_map(|row| row.iter().map(|t| t.height))
            .max()
            .unwrap_or(0)
    }

    /// Whether any tile holds a water hazard
    pub fn has_water(&self) -> bool {
        self.rows()
            .flatten()
            .any(|t| (0x61..0x70).contains(&t.obstacle))
    }

    /// Flag the level for rewriting on the next save
    pub fn mark_modified(&mut self) {
        self.modified = true;
        self.modified_recently = true;
    }

    /// Tiles in file order: north to south, 4 bytes each
    pub fn tile_bytes(&self) -> Vec<u8> {
        self.rows()
            .flat_map(|row| row.iter().flat_map(|t| t.to_bytes()))
            .collect()
    }

    /// Fill the grid from bytes in file order.
    ///
    /// `bytes` must hold at least `width * length * 4` bytes.
    pub(crate) fn set_tile_bytes(&mut self, bytes: &[u8]) {
        let width = self.width();
        for (i, chunk) in bytes.chunks_exact(4).take(width * self.length()).enumerate() {
            self.tiles[i / width][i % width] =
                Tile::from_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::placeholder()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_layout() {
        let header = Header {
            unknown1: 0xFFFF,
            width: 0x14,
            length: 0x20,
            unknown2: 0x1234,
            field_width: 0xD0,
            field_height: 0x70,
            align_horiz: 0,
            align_vert: 0x220,
            map_id: *b"COURSE1-1\0\0\0",
        };
        let bytes = header.to_bytes();
        assert_eq!(&bytes[..4], &[0xFF, 0xFF, 0x14, 0x00]);
        assert_eq!(&bytes[14..16], &[0x20, 0x02]);
        assert_eq!(&bytes[16..25], b"COURSE1-1");
        assert_eq!(Header::from_bytes(&bytes), header);
    }

    #[test]
    fn test_size_validation() {
        let mut header = Header { width: 64, length: 32, ..Header::default() };
        assert!(header.size_is_valid());
        header.length = 33;
        assert!(!header.size_is_valid());
        header.width = 65;
        header.length = 1;
        assert!(!header.size_is_valid());
    }

    #[test]
    fn test_flags_keep_unused_bits() {
        let tile = Tile::from_bytes([1, 0, 2, 0x95]);
        assert!(tile.bumper_south());
        assert!(!tile.bumper_east());
        assert_eq!(tile.layer(), 1);
        assert_eq!(tile.to_bytes(), [1, 0, 2, 0x95]);
    }

    #[test]
    fn test_max_height_and_water() {
        let mut level = Level::new(4, 3);
        assert_eq!(level.max_height(), 0);
        level.tiles[2][3] = Tile::flat(5);
        level.tiles[0][0] = Tile { obstacle: 0x65, ..Tile::flat(1) };
        assert_eq!(level.max_height(), 5);
        assert!(level.has_water());

        // tiles outside the level are ignored
        level.tiles[10][10] = Tile::flat(9);
        assert_eq!(level.max_height(), 5);
    }

    #[test]
    fn test_tile_bytes_are_north_first() {
        let mut level = Level::new(2, 2);
        level.tiles[0][1] = Tile::flat(3);
        let bytes = level.tile_bytes();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[4..8], &[1, 0, 3, 0]);

        let mut copy = Level::new(2, 2);
        copy.set_tile_bytes(&bytes);
        assert_eq!(copy.tiles, level.tiles);
    }

    #[test]
    fn test_out_of_bounds_reads_empty() {
        let level = Level::new(3, 3);
        assert_eq!(level.tile_or_empty(-1, 0), Tile::EMPTY);
        assert_eq!(level.tile_or_empty(3, 0), Tile::EMPTY);
        assert!(level.tile(0, 3).is_none());
    }
}
