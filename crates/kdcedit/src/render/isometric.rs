//! 2D grid to isometric playfield projection
//!
//! Tiles are drawn back to front (west to east, north to south within each
//! column) so nearer tiles overwrite farther ones. Each tile gets its
//! composed terrain metatile, the obstacle metatile on the other layer, and
//! a column of support tiles down to whatever lies south and east of it.

use super::fragments::FragmentTables;
use super::metatile::{
    Borders, EXTRA, Kind, NOTHING, WALL, build_metatile, build_obstacle, true_center_left,
    true_center_right,
};
use super::{FLIP_BOTH, PRI, pal, tile};
use crate::game::geometry::*;
use crate::game::obstacle;
use crate::level::{Level, Tile};

/// Playfield width in 8x8 tiles
pub const FIELD_WIDTH: usize = 384;
/// Playfield height in 8x8 tiles
pub const FIELD_HEIGHT: usize = 384;

const P7: u16 = pal(7);

/// Side wall repeated under a tile, two rows per height step
pub const STACK_TILE: [[u16; 8]; 2] = [
    [214 | P7, 203 | P7 | FLIP_BOTH, 205 | P7 | FLIP_BOTH, 1 | P7, 2 | P7, 202 | P7, 90 | P7, 215 | P7],
    [180 | P7, 205 | P7, 203 | P7, 203 | P7 | FLIP_BOTH, 90 | P7, 90 | P7 | FLIP_BOTH, 202 | P7 | FLIP_BOTH, 181 | P7],
];

/// Ground edge drawn where a support column reaches height 0
pub const BOTTOM_TILE: [[u16; 8]; 2] = [
    [16 | P7, 17 | P7, 1 | P7, 205 | P7, 202 | P7 | FLIP_BOTH, 2 | P7, 18 | P7, 19 | P7],
    [0, 0, 16 | P7, 17 | P7, 18 | P7, 19 | P7, 0, 0],
];

/// Two layers of tilemap words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playfield {
    layers: [Box<[u16]>; 2],
    field_width: u16,
    field_height: u16,
}

impl Playfield {
    /// Empty playfield whose used area is `field_width` x `field_height`
    pub fn new(field_width: u16, field_height: u16) -> Self {
        let blank = || vec![0; FIELD_WIDTH * FIELD_HEIGHT].into_boxed_slice();
        Self {
            layers: [blank(), blank()],
            field_width: field_width.min(FIELD_WIDTH as u16),
            field_height: field_height.min(FIELD_HEIGHT as u16),
        }
    }

    pub fn field_width(&self) -> u16 {
        self.field_width
    }

    pub fn field_height(&self) -> u16 {
        self.field_height
    }

    /// Word at `row`, `col` of `layer` (0 or 1); 0 outside the playfield
    pub fn get(&self, layer: usize, row: usize, col: usize) -> u16 {
        if row < FIELD_HEIGHT && col < FIELD_WIDTH {
            self.layers[layer & 1][row * FIELD_WIDTH + col]
        } else {
            0
        }
    }

    /// A full row of one layer
    pub fn row(&self, layer: usize, row: usize) -> &[u16] {
        &self.layers[layer & 1][row * FIELD_WIDTH..(row + 1) * FIELD_WIDTH]
    }

    /// Whether either layer has a visible tile at `row`, `col`
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        tile(self.get(0, row, col)) != 0 || tile(self.get(1, row, col)) != 0
    }

    /// Writes outside the playfield are dropped
    pub fn set(&mut self, layer: usize, row: i32, col: i32, word: u16) {
        if let (Ok(row), Ok(col)) = (usize::try_from(row), usize::try_from(col)) {
            if row < FIELD_HEIGHT && col < FIELD_WIDTH {
                self.layers[layer & 1][row * FIELD_WIDTH + col] = word;
            }
        }
    }
}

/// Playfield size for a level: (width, height) in 8x8 tiles
pub fn field_size(level: &Level) -> (u16, u16) {
    let (w, l) = (level.width(), level.length());
    let h = usize::from(level.max_height());
    let width = (4 * (w + l)).min(FIELD_WIDTH);
    let height = (2 * (h + w + l + 2)).min(FIELD_HEIGHT);
    (width as u16, height as u16)
}

/// Shape sets deciding whether a slope one step higher joins a tile or
/// walls it off
struct EdgeRules {
    /// Neighbors that always join
    joins: [u8; 3],
    /// Neighbors that wall off
    walls: [u8; 10],
    /// Own shapes that are walled off by any other neighbor
    walled: [u8; 3],
    /// Full diagonal that walls off tiles at the same height
    flush_wall: u8,
}

const WEST_RULES: EdgeRules = EdgeRules {
    joins: [SLOPE_EAST, SOUTH_EAST_OUTER, NORTH_EAST_OUTER],
    walls: [
        SLOPE_NORTH,
        SLOPE_WEST,
        SOUTH_WEST_INNER,
        NORTH_EAST_INNER,
        NORTH_WEST_INNER,
        NORTH_WEST_OUTER,
        SOUTHEAST_FULL,
        NORTHEAST_UPPER,
        NORTHWEST_UPPER,
        SOUTHWEST_UPPER,
    ],
    walled: [SLOPE_SOUTH, SOUTH_EAST_OUTER, SOUTH_WEST_INNER],
    flush_wall: SOUTHWEST_FULL,
};

const NORTH_RULES: EdgeRules = EdgeRules {
    joins: [SLOPE_SOUTH, SOUTH_EAST_OUTER, SOUTH_WEST_OUTER],
    walls: [
        SLOPE_NORTH,
        SLOPE_WEST,
        NORTH_WEST_INNER,
        NORTH_WEST_OUTER,
        NORTH_EAST_INNER,
        SOUTH_WEST_INNER,
        NORTHEAST_FULL,
        NORTHEAST_UPPER,
        NORTHWEST_UPPER,
        SOUTHWEST_UPPER,
    ],
    walled: [SLOPE_EAST, SOUTH_EAST_OUTER, NORTH_EAST_INNER],
    flush_wall: NORTHEAST_FULL,
};

/// What the edge between `this` and a west or north `neighbor` looks like:
/// the neighbor's shape when they join, [`WALL`] when the neighbor rises
/// above, [`NOTHING`] across a layer change
fn classify_edge(this: Tile, neighbor: Tile, rules: &EdgeRules) -> Kind {
    if this.layer() == 1 && neighbor.layer() == 0 {
        return NOTHING;
    }

    let rise = i32::from(neighbor.height) - i32::from(this.height);
    let walled = if neighbor.geometry >= SLOPES || neighbor.geometry == SLOPES_UP {
        rise > 1
            || (rise == 1
                && this.geometry < SOUTHEAST_LOWER
                && !rules.joins.contains(&neighbor.geometry)
                && (rules.walls.contains(&neighbor.geometry) || rules.walled.contains(&this.geometry)))
            || (rise == 0 && this.geometry < SOUTHEAST_FULL && neighbor.geometry == rules.flush_wall)
    } else {
        neighbor.geometry != NONE && rise > 0
    };

    if walled { WALL } else { Kind::from(neighbor.geometry) }
}

/// Whether a spike pit or slope bounce pad sits inside a larger area of the
/// same obstacle and should be drawn without internal borders
fn merges_with_neighbors(this: Tile, left: Tile, right: Tile, back: Tile) -> bool {
    let code = this.obstacle;
    match code {
        obstacle::SPIKES => left.obstacle == code && right.obstacle == code && back.obstacle == code,
        obstacle::BOUNCE_NORTH => left.obstacle == code && back.obstacle == code,
        obstacle::BOUNCE_WEST => right.obstacle == code && back.obstacle == code,
        _ => false,
    }
}

/// How far a tile's side walls reach down on its west-facing and
/// north-facing halves, in height steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportColumn {
    pub left_base: i32,
    pub right_base: i32,
    /// The tile's own height
    pub height: i32,
}

impl SupportColumn {
    /// Whether the west-facing half reaches the ground
    pub fn left_reaches_ground(&self) -> bool {
        self.left_base == self.height + 1
    }

    pub fn right_reaches_ground(&self) -> bool {
        self.right_base == self.height + 1
    }

    /// Stacked wall pairs left visible on the west-facing half
    pub fn left_stacked(&self) -> i32 {
        visible_pairs(self.left_base, self.left_reaches_ground())
    }

    pub fn right_stacked(&self) -> i32 {
        visible_pairs(self.right_base, self.right_reaches_ground())
    }
}

fn visible_pairs(base: i32, grounded: bool) -> i32 {
    // the lowest pair is covered by the ground edge
    (base - i32::from(grounded)).max(0)
}

/// One side of a support column, against the tile in front of it
fn support_base(this: Tile, front: Option<&Tile>) -> i32 {
    let z = i32::from(this.height);
    match front {
        Some(front) if !front.is_empty() => {
            let mut base = z - i32::from(front.height) + 1;
            if this.layer() < front.layer() && front.geometry >= SLOPES {
                base += 1;
            } else if this.layer() == 1 && front.layer() == 0 {
                // keep upper-layer walls from covering lower-layer tiles
                base -= 1;
            }
            base
        }
        _ => z + 1,
    }
}

/// Support column under the tile at `x`, `y`
pub fn support_column(level: &Level, x: usize, y: usize) -> SupportColumn {
    let this = level.tile(x, y).copied().unwrap_or(Tile::EMPTY);
    SupportColumn {
        left_base: support_base(this, level.tile(x, y + 1)),
        right_base: support_base(this, level.tile(x + 1, y)),
        height: i32::from(this.height),
    }
}

/// Render `level` into a fresh playfield
pub fn project(level: &Level, tables: &FragmentTables) -> Playfield {
    let (field_width, field_height) = field_size(level);
    let mut field = Playfield::new(field_width, field_height);

    let h = i32::from(level.max_height());
    let (w, l) = (level.width(), level.length());

    for x in 0..w {
        for y in 0..l {
            let this = level.tiles[y][x];
            if this.is_empty() {
                continue;
            }
            draw_tile(&mut field, level, tables, x, y, h);
        }
    }

    log::trace!(
        "projected {}x{} level into {}x{} playfield",
        w,
        l,
        field_width,
        field_height
    );
    field
}

fn draw_tile(field: &mut Playfield, level: &Level, tables: &FragmentTables, x: usize, y: usize, h: i32) {
    let this = level.tiles[y][x];
    let (xi, yi) = (x as isize, y as isize);
    // "left" is west, "right" is north
    let left = level.tile_or_empty(xi - 1, yi);
    let right = level.tile_or_empty(xi, yi - 1);
    let back = level.tile_or_empty(xi - 1, yi - 1);

    let z = i32::from(this.height);
    let start_x = 4 * (x as i32 + level.length() as i32 - y as i32 - 1);
    let start_y = 2 * (h + x as i32 + y as i32 - z);
    let obstacle_y = if is_diagonal_lower(this.geometry) { 2 } else { 0 };

    let left_edge = classify_edge(this, left, &WEST_RULES);
    let right_edge = classify_edge(this, right, &NORTH_RULES);

    let borders = Borders {
        north: this.bumper_north(),
        east: this.bumper_east(),
        south: this.bumper_south(),
        west: this.bumper_west(),
        north_start: !this.bumper_north() && left.bumper_north(),
        west_start: !this.bumper_west() && right.bumper_west(),
    };
    let meta = build_metatile(tables, this.geometry, left_edge, right_edge, borders);

    let left_obstacle = if left_edge == WALL { 0 } else { left.obstacle };
    let right_obstacle = if right_edge == WALL { 0 } else { right.obstacle };
    let mut center = Kind::from(this.obstacle);
    if merges_with_neighbors(this, left, right, back) {
        center |= EXTRA;
    }
    let obs = build_obstacle(tables, center, left_obstacle, right_obstacle);

    // edges moving up a layer are drawn on the upper layer so it does not
    // cover them
    let terrain_layer = usize::from(this.layer());
    let left_layer = if this.layer() == 0 && left.layer() == 1 { 1 } else { terrain_layer };
    let right_layer = if this.layer() == 0 && right.layer() == 1 { 1 } else { terrain_layer };
    let prio = |layer: usize| if layer == 1 { PRI } else { 0 };
    let terrain_prio = prio(terrain_layer);

    let left_edge_rows = if matches!(
        true_center_left(this.geometry),
        SLOPE_SOUTH | SOUTH_WEST_OUTER | SOUTH_WEST_INNER
    ) {
        6
    } else {
        4
    };
    let right_edge_rows = if matches!(
        true_center_right(this.geometry),
        SLOPE_EAST | NORTH_EAST_OUTER | NORTH_EAST_INNER
    ) {
        6
    } else {
        4
    };

    // support walls
    let support = support_column(level, x, y);
    let (left_base, right_base) = (support.left_base, support.right_base);
    let mut tile_y = 2;
    while tile_y <= 2 * left_base || tile_y < 2 * right_base {
        for tile_x in 0..4 {
            if tile_y <= 2 * left_base {
                for (r, stack) in STACK_TILE.iter().enumerate() {
                    field.set(
                        terrain_layer,
                        start_y + 4 + r as i32 + tile_y,
                        start_x + tile_x as i32,
                        stack[tile_x] | terrain_prio,
                    );
                }
            }
            if tile_y <= 2 * right_base {
                for (r, stack) in STACK_TILE.iter().enumerate() {
                    field.set(
                        terrain_layer,
                        start_y + 4 + r as i32 + tile_y,
                        start_x + 4 + tile_x as i32,
                        stack[tile_x + 4] | terrain_prio,
                    );
                }
            }
        }
        tile_y += 2;
    }

    for tile_x in 0..4 {
        for (r, bottom) in BOTTOM_TILE.iter().enumerate() {
            let row = start_y + 6 + r as i32 + 2 * z;
            if support.left_reaches_ground() {
                field.set(terrain_layer, row, start_x + tile_x as i32, bottom[tile_x] | terrain_prio);
            }
            if support.right_reaches_ground() {
                field.set(
                    terrain_layer,
                    row,
                    start_x + 4 + tile_x as i32,
                    bottom[tile_x + 4] | terrain_prio,
                );
            }
        }
    }

    // the tile itself, obstacle on the other layer
    for tile_y in 0..8 {
        for tile_x in 0..8 {
            let layer = if tile_y < left_edge_rows && tile_x < 4 {
                left_layer
            } else if tile_y < right_edge_rows {
                right_layer
            } else {
                terrain_layer
            };

            let (row, col) = (start_y + tile_y as i32, start_x + tile_x as i32);
            let word = meta[tile_y][tile_x];
            if tile(word) != 0 {
                field.set(layer, row, col, word | prio(layer));
            }
            let word = obs[tile_y][tile_x];
            if tile(word) != 0 {
                field.set(layer ^ 1, row + obstacle_y, col, word | PRI);
            }
        }
    }
}
