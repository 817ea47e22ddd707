//! Metatile composition
//!
//! A metatile is the 8x8 block of tilemap words drawn for one grid cell.
//! Columns 0-3 hold the tile's west half and its join with the west
//! neighbor; columns 4-7 hold the north half. Metatiles are assembled from
//! pre-drawn fragments looked up by `(kind, adjacent kind)`.

use super::fragments::FragmentTables;
use super::tile;
use crate::game::geometry::*;
use crate::game::obstacle;

/// Fragment lookup key: a geometry or obstacle code, or one of the
/// sentinels below
pub type Kind = i16;

/// No neighbor / touches nothing
pub const NOTHING: Kind = 0;
/// Neighbor is a taller wall
pub const WALL: Kind = -1;
/// Added to an obstacle code to select its border-less variant
pub const EXTRA: Kind = 0x100;

/// 8 rows of 8 tilemap words
pub type TileBlock = [[u16; 8]; 8];

/// A pre-drawn fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metatile {
    pub kind: Kind,
    /// Kind of the neighbor this fragment joins, or [`NOTHING`]
    pub adjacent: Kind,
    pub tiles: TileBlock,
}

impl Metatile {
    pub const BLANK: Metatile = Metatile {
        kind: NOTHING,
        adjacent: NOTHING,
        tiles: [[0; 8]; 8],
    };

    pub const fn new(kind: Kind, adjacent: Kind, tiles: TileBlock) -> Self {
        Self { kind, adjacent, tiles }
    }
}

static BLANK: Metatile = Metatile::BLANK;

/// Bumper edges of a tile, plus the two "start" edges used when a
/// bumper-less tile continues its neighbor's bumper
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Borders {
    pub north: bool,
    pub east: bool,
    pub south: bool,
    pub west: bool,
    pub north_start: bool,
    pub west_start: bool,
}

// Many shapes share visually identical edges; these map a shape onto the
// one whose fragments are used for that edge.

/// Edge of a west neighbor
const TRUE_LEFT: [u8; COUNT] = [
    NONE, FLAT, SLOPE_EAST, SOUTH_WEST_INNER,
    SLOPE_SOUTH, SLOPE_EAST, SLOPE_NORTH, SLOPE_WEST,
    SLOPE_SOUTH, SLOPE_NORTH, SLOPE_WEST, SOUTH_WEST_INNER,
    SLOPE_EAST, SLOPE_EAST, SLOPE_NORTH, SOUTH_WEST_OUTER,
    SOUTHEAST_FULL, NORTHEAST_FULL, FLAT, FLAT,
    FLAT, FLAT, FLAT, SOUTHWEST_FULL,
    SOUTHEAST_FULL, NORTHEAST_FULL, NORTHWEST_FULL, SOUTHWEST_FULL,
];

/// Edge of a north neighbor
const TRUE_RIGHT: [u8; COUNT] = [
    NONE, FLAT, SLOPE_SOUTH, NORTH_EAST_INNER,
    SLOPE_SOUTH, SLOPE_EAST, SLOPE_NORTH, SLOPE_WEST,
    SLOPE_EAST, NORTH_EAST_INNER, SLOPE_NORTH, SLOPE_WEST,
    SLOPE_SOUTH, NORTH_EAST_OUTER, SLOPE_WEST, SLOPE_SOUTH,
    SOUTHEAST_FULL, FLAT, FLAT, SOUTHWEST_FULL,
    FLAT, NORTHEAST_FULL, FLAT, FLAT,
    SOUTHEAST_FULL, NORTHEAST_FULL, NORTHWEST_FULL, SOUTHWEST_FULL,
];

/// West half of a tile
const TRUE_CENTER_LEFT: [u8; COUNT] = [
    NONE, FLAT, SOUTH_WEST_OUTER, SLOPE_EAST,
    SLOPE_SOUTH, SLOPE_EAST, SLOPE_NORTH, SLOPE_WEST,
    SLOPE_EAST, SLOPE_EAST, SLOPE_NORTH, SLOPE_SOUTH,
    SLOPE_SOUTH, NORTH_EAST_OUTER, SLOPE_WEST, SOUTH_WEST_OUTER,
    FLAT, FLAT, NONE, SOUTHWEST_FULL,
    SOUTHEAST_FULL, NORTHEAST_FULL, FLAT, FLAT,
    SOUTHEAST_FULL, NORTHEAST_FULL, NORTHWEST_FULL, SOUTHWEST_FULL,
];

/// North half of a tile
const TRUE_CENTER_RIGHT: [u8; COUNT] = [
    NONE, FLAT, NORTH_EAST_OUTER, SLOPE_SOUTH,
    SLOPE_SOUTH, SLOPE_EAST, SLOPE_NORTH, SLOPE_WEST,
    SLOPE_SOUTH, SLOPE_EAST, SLOPE_WEST, SLOPE_SOUTH,
    SLOPE_EAST, NORTH_EAST_OUTER, SLOPE_NORTH, SOUTH_WEST_OUTER,
    FLAT, NORTHEAST_FULL, NONE, FLAT,
    SOUTHEAST_FULL, FLAT, FLAT, SOUTHWEST_FULL,
    SOUTHEAST_FULL, NORTHEAST_FULL, NORTHWEST_FULL, SOUTHWEST_FULL,
];

/// Map `kind` through an edge table; sentinels pass through unchanged
fn map_edge(table: &[u8; COUNT], kind: Kind) -> Kind {
    match usize::try_from(kind) {
        Ok(i) => table.get(i).map_or(NOTHING, |&g| Kind::from(g)),
        Err(_) => kind,
    }
}

pub(crate) fn true_center_left(geometry: u8) -> u8 {
    TRUE_CENTER_LEFT.get(usize::from(geometry)).copied().unwrap_or(NONE)
}

pub(crate) fn true_center_right(geometry: u8) -> u8 {
    TRUE_CENTER_RIGHT.get(usize::from(geometry)).copied().unwrap_or(NONE)
}

/// Find the fragment for `kind` next to `adjacent`.
///
/// An entry matching `adjacent` exactly wins as soon as it is seen.
/// Otherwise the last entry for `kind` that touches nothing is used, and a
/// blank fragment if there is none.
pub fn find_metatile(table: &[Metatile], kind: Kind, adjacent: Kind) -> &Metatile {
    let mut found = &BLANK;
    if kind == NOTHING {
        return found;
    }
    for entry in table.iter().filter(|m| m.kind == kind) {
        if entry.adjacent == adjacent {
            return entry;
        }
        if entry.adjacent == NOTHING {
            found = entry;
        }
    }
    found
}

/// Compose the terrain metatile for a tile of shape `center` whose west and
/// north edges meet `left` and `right` (a geometry code, [`NOTHING`] or
/// [`WALL`]).
pub fn build_metatile(
    tables: &FragmentTables,
    center: u8,
    left: Kind,
    right: Kind,
    borders: Borders,
) -> TileBlock {
    let center_kind = Kind::from(center);
    let true_left = map_edge(&TRUE_LEFT, left);
    let true_right = map_edge(&TRUE_RIGHT, right);
    let center_left = map_edge(&TRUE_CENTER_LEFT, center_kind);
    let center_right = map_edge(&TRUE_CENTER_RIGHT, center_kind);

    let center_tile = find_metatile(&tables.terrain, center_kind, NOTHING);
    let left_tile = find_metatile(&tables.terrain, center_left, true_left);
    let right_tile = find_metatile(&tables.terrain, center_right, true_right);

    let (west, south) = if center == SLOPE_NORTH && borders.west && borders.south {
        let all = find_metatile(&tables.borders_all, center_left, true_right);
        (all, all)
    } else {
        let west = if borders.west_start {
            &tables.borders_west_start
        } else {
            &tables.borders_west
        };
        (
            find_metatile(west, center_left, true_right),
            find_metatile(
                &tables.borders_south,
                map_edge(&TRUE_RIGHT, center_kind),
                true_left,
            ),
        )
    };

    let (north, east) = if center == SLOPE_WEST && borders.north && borders.east {
        let all = find_metatile(&tables.borders_all, center_right, true_left);
        (all, all)
    } else {
        let north = if borders.north_start {
            &tables.borders_north_start
        } else {
            &tables.borders_north
        };
        (
            find_metatile(north, center_right, true_left),
            find_metatile(
                &tables.borders_east,
                map_edge(&TRUE_LEFT, center_kind),
                true_right,
            ),
        )
    };

    // lower halves of diagonal slopes sit two rows down, edges included
    let (left_offset, right_offset, border_offset) = if is_diagonal_lower(center) {
        (
            if left != NOTHING { 2 } else { 0 },
            if right != NOTHING { 2 } else { 0 },
            2,
        )
    } else {
        (0, 0, 0)
    };

    let mut result = [[0; 8]; 8];
    for (y, row) in result.iter_mut().enumerate() {
        for (x, word) in row.iter_mut().enumerate() {
            let pick = |enabled: bool, m: &Metatile, offset: usize| {
                (enabled && y >= offset)
                    .then(|| m.tiles[y - offset][x])
                    .filter(|&w| tile(w) != 0)
            };
            *word = pick(borders.south, south, border_offset)
                .or_else(|| pick(borders.east, east, border_offset))
                .or_else(|| pick(borders.north || borders.north_start, north, border_offset))
                .or_else(|| pick(borders.west || borders.west_start, west, border_offset))
                .or_else(|| pick(x < 4 && left != NOTHING, left_tile, left_offset))
                .or_else(|| pick(x >= 4 && right != NOTHING, right_tile, right_offset))
                .unwrap_or(center_tile.tiles[y][x]);
        }
    }
    result
}

/// Codes shared by every side of an obstacle lookup
fn canonical_shared(code: u8) -> u8 {
    use obstacle::*;
    match code {
        START_LINE..=KIRBY_START_LINE => START_LINE,
        ROTATE_CW..ROTATE_CW_OPPOSITE => ROTATE_CW | (code & 1),
        ROTATE_CW_OPPOSITE..END_ROTATE => ROTATE_CW_OPPOSITE | (code & 1),
        _ => code,
    }
}

/// Fragment kind an obstacle code is drawn with
pub fn canonical_obstacle(code: Kind) -> Kind {
    use obstacle::*;
    let Ok(byte) = u8::try_from(code) else {
        return code;
    };
    let canonical = match byte {
        WARP_SOUTH_2..=WARP_WEST_2 => byte - 4,
        WARP_RED_2 => WARP_RED,
        SWITCH_SHINE => SWITCH_BRIGHT,
        SWITCH_ROTATE_ON => SWITCH_ROTATE_OFF,
        SWITCH_WATER_OFF => SWITCH_WATER_ON,
        _ => canonical_shared(byte),
    };
    Kind::from(canonical)
}

fn canonical_left(code: u8) -> Kind {
    use obstacle::*;
    Kind::from(match code {
        WATER_SOUTH_EAST_OUTER | WATER_NORTH_EAST_OUTER => WATER_EAST,
        _ => canonical_shared(code),
    })
}

fn canonical_right(code: u8) -> Kind {
    use obstacle::*;
    Kind::from(match code {
        WATER_SOUTH_EAST_OUTER | WATER_SOUTH_WEST_OUTER => WATER_SOUTH,
        _ => canonical_shared(code),
    })
}

/// Compose the obstacle metatile for `center` (optionally with [`EXTRA`])
/// next to the west and north obstacles `left` and `right`
pub fn build_obstacle(tables: &FragmentTables, center: Kind, left: u8, right: u8) -> TileBlock {
    let true_center = canonical_obstacle(center);
    let true_left = canonical_left(left);
    let true_right = canonical_right(right);

    let center_tile = find_metatile(&tables.obstacles, true_center, NOTHING);
    let left_tile = find_metatile(&tables.obstacles, true_center, true_left);
    let right_tile = find_metatile(&tables.obstacles, true_center, true_right);

    let mut result = [[0; 8]; 8];
    for (y, row) in result.iter_mut().enumerate() {
        for x in 0..4 {
            let word = left_tile.tiles[y][x];
            row[x] = if true_left != NOTHING && tile(word) != 0 {
                word
            } else {
                center_tile.tiles[y][x]
            };

            let word = right_tile.tiles[y][x + 4];
            row[x + 4] = if true_right != NOTHING && tile(word) != 0 {
                word
            } else {
                center_tile.tiles[y][x + 4]
            };
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filled(word: u16) -> TileBlock {
        [[word; 8]; 8]
    }

    /// Fill only the given rows and column range
    fn patch(word: u16, rows: std::ops::Range<usize>, cols: std::ops::Range<usize>) -> TileBlock {
        let mut block = [[0; 8]; 8];
        for row in &mut block[rows] {
            for cell in &mut row[cols.clone()] {
                *cell = word;
            }
        }
        block
    }

    #[test]
    fn test_find_prefers_exact_neighbor() {
        let exact = Metatile::new(4, 5, filled(2));
        let generic = Metatile::new(4, 0, filled(1));

        for table in [[exact, generic], [generic, exact]] {
            assert_eq!(find_metatile(&table, 4, 5), &exact);
        }
    }

    #[test]
    fn test_find_falls_back_to_last_generic() {
        let table = [
            Metatile::new(4, 0, filled(1)),
            Metatile::new(4, 6, filled(2)),
            Metatile::new(4, 0, filled(3)),
            Metatile::new(5, 0, filled(4)),
        ];
        assert_eq!(find_metatile(&table, 4, 7).tiles, filled(3));
        assert_eq!(find_metatile(&table, 9, 0), &Metatile::BLANK);
        assert_eq!(find_metatile(&table, NOTHING, NOTHING), &Metatile::BLANK);
    }

    #[test]
    fn test_edge_tables() {
        assert_eq!(map_edge(&TRUE_LEFT, WALL), WALL);
        assert_eq!(map_edge(&TRUE_LEFT, Kind::from(SLOPES_UP)), Kind::from(SLOPE_EAST));
        assert_eq!(map_edge(&TRUE_RIGHT, Kind::from(SLOPES_UP)), Kind::from(SLOPE_SOUTH));
        assert_eq!(map_edge(&TRUE_RIGHT, 0x40), NOTHING);
        assert_eq!(true_center_left(NORTHWEST_UPPER), NONE);
        assert_eq!(true_center_right(SOUTHWEST_LOWER), SOUTHWEST_FULL);
    }

    #[test]
    fn test_lone_flat_tile_is_plain_center() {
        let tables = FragmentTables::builtin();
        let block = build_metatile(tables, FLAT, NOTHING, NOTHING, Borders::default());
        let center = find_metatile(&tables.terrain, Kind::from(FLAT), NOTHING);
        assert_eq!(block, center.tiles);
    }

    #[test]
    fn test_border_priority() {
        let tables = FragmentTables {
            terrain: vec![Metatile::new(1, 0, filled(1))],
            borders_south: vec![Metatile::new(1, 0, patch(2, 0..1, 0..8))],
            borders_east: vec![Metatile::new(1, 0, patch(3, 0..2, 0..8))],
            borders_west: vec![Metatile::new(1, 0, patch(4, 0..3, 0..8))],
            ..FragmentTables::default()
        };
        let borders = Borders {
            south: true,
            east: true,
            west: true,
            ..Borders::default()
        };
        let block = build_metatile(&tables, FLAT, NOTHING, NOTHING, borders);
        assert_eq!(block[0], [2; 8]);
        assert_eq!(block[1], [3; 8]);
        assert_eq!(block[2], [4; 8]);
        assert_eq!(block[3], [1; 8]);

        // disabled borders contribute nothing
        let block = build_metatile(&tables, FLAT, NOTHING, NOTHING, Borders::default());
        assert_eq!(block, filled(1));
    }

    #[test]
    fn test_half_fragments() {
        let tables = FragmentTables {
            terrain: vec![
                Metatile::new(1, 0, filled(1)),
                Metatile::new(1, 1, filled(5)),
                Metatile::new(1, WALL, filled(6)),
            ],
            ..FragmentTables::default()
        };
        let block = build_metatile(&tables, FLAT, Kind::from(FLAT), WALL, Borders::default());
        assert_eq!(block[0], [5, 5, 5, 5, 6, 6, 6, 6]);
    }

    #[test]
    fn test_diagonal_lower_shifts_edges() {
        let tables = FragmentTables {
            terrain: vec![
                Metatile::new(Kind::from(SOUTHEAST_LOWER), 0, filled(1)),
                Metatile::new(Kind::from(SOUTHEAST_FULL), WALL, patch(7, 0..1, 0..8)),
            ],
            ..FragmentTables::default()
        };
        let block = build_metatile(&tables, SOUTHEAST_LOWER, WALL, NOTHING, Borders::default());
        assert_eq!(block[0], [1; 8]);
        assert_eq!(block[2], [7, 7, 7, 7, 1, 1, 1, 1]);
    }

    #[test]
    fn test_shared_corner_border() {
        let tables = FragmentTables {
            terrain: vec![Metatile::new(6, 0, filled(1))],
            borders_all: vec![Metatile::new(6, 0, patch(9, 0..1, 0..8))],
            borders_west: vec![Metatile::new(6, 0, patch(4, 0..2, 0..8))],
            ..FragmentTables::default()
        };
        let borders = Borders {
            west: true,
            south: true,
            ..Borders::default()
        };
        let block = build_metatile(&tables, SLOPE_NORTH, NOTHING, NOTHING, borders);
        assert_eq!(block[0], [9; 8]);
        assert_eq!(block[1], [1; 8]);
    }

    #[test]
    fn test_obstacle_canonical_codes() {
        assert_eq!(canonical_obstacle(0xB6), 0xB2);
        assert_eq!(canonical_obstacle(0xB9), 0xB8);
        assert_eq!(canonical_obstacle(0x5B), 0x5A);
        assert_eq!(canonical_obstacle(0xC3), 0xC1);
        assert_eq!(canonical_obstacle(0xC0), 0xC0);
        assert_eq!(canonical_obstacle(0x105), 0x105);

        // clockwise and counterclockwise switch-slow rotators differ by parity
        let cw = canonical_obstacle(0x76);
        let ccw = canonical_obstacle(0x77);
        assert_eq!((cw, ccw), (0x70, 0x71));
        assert_eq!(canonical_obstacle(0x7A), 0x78);

        assert_eq!(canonical_left(0x6D), 0x65);
        assert_eq!(canonical_right(0x6F), 0x64);
        assert_eq!(canonical_right(0x6D), 0x6D);
    }

    #[test]
    fn test_obstacle_halves() {
        let tables = FragmentTables {
            obstacles: vec![
                Metatile::new(0x61, 0, filled(1)),
                Metatile::new(0x61, 0x61, patch(2, 0..8, 0..2)),
                Metatile::new(0x61, 0x64, patch(3, 0..8, 4..8)),
            ],
            ..FragmentTables::default()
        };
        let block = build_obstacle(&tables, 0x61, 0x61, 0x6C);
        assert_eq!(block[5], [2, 2, 1, 1, 3, 3, 3, 3]);

        let block = build_obstacle(&tables, 0x61, 0, 0);
        assert_eq!(block, filled(1));
    }
}
