//! Fragment tables used by metatile composition
//!
//! [`FragmentTables::builtin`] returns the tables compiled into the
//! editor. A full set can also be loaded from a dump file:
//!
//! ```text
//! "KDCF"
//! 9 x { u16 count, count x { i16 kind, i16 adjacent, 64 x u16 words } }
//! ```
//!
//! Tables appear in the order terrain, obstacles, then the south, east,
//! north, west, north-start, west-start and shared-corner borders. All
//! values are little-endian.

use super::metatile::{EXTRA, Kind, Metatile, NOTHING, TileBlock, WALL};
use super::{PRI, pal};
use crate::common::{EditorError, EditorResult};
use crate::game::{geometry, names, obstacle};
use std::sync::OnceLock;

pub const FRAGMENT_FILE_MAGIC: &[u8; 4] = b"KDCF";

const TABLE_COUNT: usize = 9;
const ENTRY_SIZE: usize = 4 + 64 * 2;

/// Every fragment table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentTables {
    pub terrain: Vec<Metatile>,
    pub obstacles: Vec<Metatile>,
    pub borders_south: Vec<Metatile>,
    pub borders_east: Vec<Metatile>,
    pub borders_north: Vec<Metatile>,
    pub borders_west: Vec<Metatile>,
    pub borders_north_start: Vec<Metatile>,
    pub borders_west_start: Vec<Metatile>,
    /// Shared corner borders for slopes bumpered on two sides
    pub borders_all: Vec<Metatile>,
}

impl FragmentTables {
    /// Built-in tables, created on first use
    pub fn builtin() -> &'static FragmentTables {
        static BUILTIN: OnceLock<FragmentTables> = OnceLock::new();
        BUILTIN.get_or_init(builtin::tables)
    }

    /// Whether these are the built-in tables (or an identical copy). Their
    /// art is drawn by the editor and does not match the game's.
    pub fn is_builtin(&self) -> bool {
        let builtin = Self::builtin();
        std::ptr::eq(self, builtin) || self == builtin
    }

    fn tables(&self) -> [&Vec<Metatile>; TABLE_COUNT] {
        [
            &self.terrain,
            &self.obstacles,
            &self.borders_south,
            &self.borders_east,
            &self.borders_north,
            &self.borders_west,
            &self.borders_north_start,
            &self.borders_west_start,
            &self.borders_all,
        ]
    }

    fn tables_mut(&mut self) -> [&mut Vec<Metatile>; TABLE_COUNT] {
        [
            &mut self.terrain,
            &mut self.obstacles,
            &mut self.borders_south,
            &mut self.borders_east,
            &mut self.borders_north,
            &mut self.borders_west,
            &mut self.borders_north_start,
            &mut self.borders_west_start,
            &mut self.borders_all,
        ]
    }

    /// Total number of fragments
    pub fn len(&self) -> usize {
        self.tables().iter().map(|t| t.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse a dump file
    pub fn from_bytes(bytes: &[u8]) -> EditorResult<Self> {
        let mut input = bytes
            .strip_prefix(FRAGMENT_FILE_MAGIC)
            .ok_or_else(|| EditorError::fragments("missing KDCF signature"))?;

        let mut result = Self::default();
        for (index, table) in result.tables_mut().into_iter().enumerate() {
            let (count, rest) = input
                .split_first_chunk::<2>()
                .ok_or_else(|| EditorError::fragments(format!("table {index} is truncated")))?;
            let count = usize::from(u16::from_le_bytes(*count));
            let size = count * ENTRY_SIZE;
            if rest.len() < size {
                return Err(EditorError::fragments(format!(
                    "table {index} needs {size} bytes, {} left",
                    rest.len()
                )));
            }

            table.extend(rest[..size].chunks_exact(ENTRY_SIZE).map(read_entry));
            input = &rest[size..];
        }

        if !input.is_empty() {
            return Err(EditorError::fragments(format!(
                "{} trailing bytes",
                input.len()
            )));
        }
        Ok(result)
    }

    /// Serialize as a dump file
    pub fn to_bytes(&self) -> EditorResult<Vec<u8>> {
        let mut out = Vec::with_capacity(4 + TABLE_COUNT * 2 + self.len() * ENTRY_SIZE);
        out.extend_from_slice(FRAGMENT_FILE_MAGIC);
        for table in self.tables() {
            let count = u16::try_from(table.len())
                .map_err(|_| EditorError::fragments("too many entries in one table"))?;
            out.extend_from_slice(&count.to_le_bytes());
            for entry in table {
                out.extend_from_slice(&entry.kind.to_le_bytes());
                out.extend_from_slice(&entry.adjacent.to_le_bytes());
                for word in entry.tiles.iter().flatten() {
                    out.extend_from_slice(&word.to_le_bytes());
                }
            }
        }
        Ok(out)
    }
}

fn read_entry(bytes: &[u8]) -> Metatile {
    let kind = i16::from_le_bytes([bytes[0], bytes[1]]);
    let adjacent = i16::from_le_bytes([bytes[2], bytes[3]]);
    let mut tiles = [[0; 8]; 8];
    for (i, word) in bytes[4..].chunks_exact(2).enumerate() {
        tiles[i / 8][i % 8] = u16::from_le_bytes([word[0], word[1]]);
    }
    Metatile::new(kind, adjacent, tiles)
}

/// The compiled-in fragment art.
///
/// Fragments are drawn on the 8x8 metatile grid: rows 0-3 hold the top
/// face diamond, rows 4-5 the tile's own side walls. Each border is a rail
/// along one edge of the diamond.
mod builtin {
    use super::*;
    use crate::render::tile;

    /// One bit per column, per row
    type Mask = [u8; 8];

    const FACE: Mask = [
        0b0011_1100,
        0b1111_1111,
        0b1111_1111,
        0b0011_1100,
        0b1111_1111,
        0b0011_1100,
        0,
        0,
    ];
    /// Face without its outline, used where a tile joins its neighbor
    const JOINED: Mask = [0, 0b0111_1110, 0b0111_1110, 0b0001_1000, 0b1111_1111, 0b0011_1100, 0, 0];
    /// Shading along a taller neighbor
    const SHADED: Mask = [0b0011_1100, 0b1100_0011, 0, 0, 0, 0, 0, 0];

    const WEST_EDGE: Mask = [0b0000_1100, 0b0000_0011, 0, 0, 0, 0, 0, 0];
    const NORTH_EDGE: Mask = [0b0011_0000, 0b1100_0000, 0, 0, 0, 0, 0, 0];
    const EAST_EDGE: Mask = [0, 0, 0b1100_0000, 0b0011_0000, 0, 0, 0, 0];
    const SOUTH_EDGE: Mask = [0, 0, 0b0000_0011, 0b0000_1100, 0, 0, 0, 0];

    const TERRAIN_BASE: u16 = 0x020;
    const JOIN_BASE: u16 = 0x1E0;
    const WALL_BASE: u16 = 0x230;
    const BORDER_BASE: u16 = 0x280;
    const OBSTACLE_BASE: u16 = 0x300;

    const TERRAIN_PALETTE: u16 = 1;
    const BORDER_PALETTE: u16 = 4;
    const OBSTACLE_PALETTE: u16 = 5;

    /// Shapes drawn with dedicated join and wall fragments
    const JOINABLE: [u8; 5] = [
        geometry::FLAT,
        geometry::SLOPE_SOUTH,
        geometry::SLOPE_EAST,
        geometry::SLOPE_NORTH,
        geometry::SLOPE_WEST,
    ];

    /// Obstacles that merge seamlessly with the same obstacle next to them
    fn joins_itself(code: u8) -> bool {
        obstacle::is_water(code)
            || (obstacle::BELTS..=obstacle::BELT_WEST_DOWN).contains(&code)
            || code == obstacle::START_LINE
            || code == obstacle::ROTATE_CW
            || code == obstacle::ROTATE_CCW
    }

    fn union(masks: &[Mask]) -> Mask {
        let mut out = [0; 8];
        for mask in masks {
            for (o, m) in out.iter_mut().zip(mask) {
                *o |= m;
            }
        }
        out
    }

    /// Two tiles per row, alternating by column
    fn draw(mask: Mask, base: u16, attributes: u16) -> TileBlock {
        let mut tiles = [[0; 8]; 8];
        for (y, row) in tiles.iter_mut().enumerate() {
            for (x, word) in row.iter_mut().enumerate() {
                if mask[y] & (1 << x) != 0 {
                    *word = (base + 2 * y as u16 + (x as u16 & 1)) | attributes;
                }
            }
        }
        tiles
    }

    /// A single tile repeated over the mask
    fn fill(mask: Mask, number: u16, attributes: u16) -> TileBlock {
        let mut tiles = [[0; 8]; 8];
        for (y, row) in tiles.iter_mut().enumerate() {
            for (x, word) in row.iter_mut().enumerate() {
                if mask[y] & (1 << x) != 0 {
                    *word = number | attributes;
                }
            }
        }
        tiles
    }

    fn terrain() -> Vec<Metatile> {
        let palette = pal(TERRAIN_PALETTE);
        let mut table: Vec<Metatile> = (1..geometry::COUNT as u8)
            .filter(|&g| g != geometry::SLOPES_DOWN)
            .map(|g| {
                let base = TERRAIN_BASE + 16 * u16::from(g);
                Metatile::new(Kind::from(g), NOTHING, draw(FACE, base, palette))
            })
            .collect();

        for (i, &g) in JOINABLE.iter().enumerate() {
            let i = i as u16;
            let face = draw(FACE, TERRAIN_BASE + 16 * u16::from(g), palette);
            let joined = draw(JOINED, JOIN_BASE + 16 * i, palette);
            table.push(Metatile::new(Kind::from(g), Kind::from(g), overlay(face, joined)));

            let shaded = draw(SHADED, WALL_BASE + 16 * i, palette);
            table.push(Metatile::new(Kind::from(g), WALL, overlay(face, shaded)));
        }
        table
    }

    fn overlay(mut under: TileBlock, over: TileBlock) -> TileBlock {
        for (row, top) in under.iter_mut().zip(over) {
            for (word, w) in row.iter_mut().zip(top) {
                if tile(w) != 0 {
                    *word = w;
                }
            }
        }
        under
    }

    fn borders(slot: u16, mask: Mask) -> Vec<Metatile> {
        let base = BORDER_BASE + 16 * slot;
        (1..geometry::COUNT as u8)
            .map(|g| Metatile::new(Kind::from(g), NOTHING, draw(mask, base, pal(BORDER_PALETTE) | PRI)))
            .collect()
    }

    fn obstacles() -> Vec<Metatile> {
        let palette = pal(OBSTACLE_PALETTE);
        let mut table = Vec::new();
        for &(code, _) in names::OBSTACLE_NAMES {
            if code == obstacle::NONE || obstacle::is_character(code) {
                continue;
            }
            let number = OBSTACLE_BASE + u16::from(code);
            let kind = Kind::from(code);
            table.push(Metatile::new(kind, NOTHING, fill(FACE, number, palette)));
            if joins_itself(code) {
                table.push(Metatile::new(kind, kind, fill(JOINED, number, palette)));
            }
        }

        // border-less variants for large areas of one obstacle
        for code in [obstacle::SPIKES, obstacle::BOUNCE_NORTH, obstacle::BOUNCE_WEST] {
            let number = OBSTACLE_BASE + u16::from(code);
            table.push(Metatile::new(
                Kind::from(code) | EXTRA,
                NOTHING,
                fill(JOINED, number, palette),
            ));
        }
        table
    }

    pub(super) fn tables() -> FragmentTables {
        FragmentTables {
            terrain: terrain(),
            obstacles: obstacles(),
            borders_south: borders(0, SOUTH_EDGE),
            borders_east: borders(1, EAST_EDGE),
            borders_north: borders(2, NORTH_EDGE),
            borders_west: borders(3, WEST_EDGE),
            borders_north_start: borders(4, union(&[NORTH_EDGE, [0, 0b0010_0000, 0, 0, 0, 0, 0, 0]])),
            borders_west_start: borders(5, union(&[WEST_EDGE, [0, 0b0000_0100, 0, 0, 0, 0, 0, 0]])),
            borders_all: borders(6, union(&[NORTH_EDGE, EAST_EDGE, SOUTH_EDGE, WEST_EDGE])),
        }
    }
}
