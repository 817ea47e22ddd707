//! Edit overlay applied uniformly across a region

use std::ops::RangeInclusive;

use super::edit::Region;
use super::{Level, MAX_HEIGHT, Tile, TileFlags};
use crate::game::{geometry, obstacle};

/// How an overlay changes tile heights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightEdit {
    /// Set every tile to this height
    Absolute(u8),
    /// Raise (or lower, if negative) every tile
    Relative(i16),
}

impl Default for HeightEdit {
    fn default() -> Self {
        HeightEdit::Relative(0)
    }
}

/// Tile fields to change; `None` leaves a field as it is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileInfo {
    pub geometry: Option<u8>,
    pub obstacle: Option<u8>,
    pub height: HeightEdit,
    pub bumper_north: Option<bool>,
    pub bumper_east: Option<bool>,
    pub bumper_south: Option<bool>,
    pub bumper_west: Option<bool>,
    pub layer: Option<u8>,
    /// Lowest height in the region the overlay was built from
    pub min_height: u8,
    pub max_height: u8,
}

fn common<T: PartialEq>(a: Option<T>, b: T) -> Option<T> {
    a.filter(|a| *a == b)
}

impl TileInfo {
    /// Describe the tiles in `region`: fields shared by every tile keep
    /// their value, mixed fields are left unchanged, and mixed heights
    /// become a relative edit
    pub fn from_region(level: &Level, region: Region) -> Self {
        let mut cells = region.cells().map(|(x, y)| level.tiles[y][x]);
        let Some(first) = cells.next() else {
            return Self::default();
        };

        let mut info = Self {
            geometry: Some(first.geometry),
            obstacle: Some(first.obstacle),
            height: HeightEdit::Absolute(first.height),
            bumper_north: Some(first.bumper_north()),
            bumper_east: Some(first.bumper_east()),
            bumper_south: Some(first.bumper_south()),
            bumper_west: Some(first.bumper_west()),
            layer: Some(first.layer()),
            min_height: first.height,
            max_height: first.height,
        };

        for tile in cells {
            info.geometry = common(info.geometry, tile.geometry);
            info.obstacle = common(info.obstacle, tile.obstacle);
            if info.height != HeightEdit::Absolute(tile.height) {
                info.height = HeightEdit::Relative(0);
            }
            info.bumper_north = common(info.bumper_north, tile.bumper_north());
            info.bumper_east = common(info.bumper_east, tile.bumper_east());
            info.bumper_south = common(info.bumper_south, tile.bumper_south());
            info.bumper_west = common(info.bumper_west, tile.bumper_west());
            info.layer = common(info.layer, tile.layer());
            info.min_height = info.min_height.min(tile.height);
            info.max_height = info.max_height.max(tile.height);
        }
        info
    }

    /// Heights (or height changes) that keep every tile within range
    pub fn height_range(&self) -> RangeInclusive<i16> {
        match self.height {
            HeightEdit::Absolute(_) => 0..=i16::from(MAX_HEIGHT),
            HeightEdit::Relative(_) => {
                -i16::from(self.min_height)..=i16::from(MAX_HEIGHT) - i16::from(self.max_height)
            }
        }
    }

    /// Apply the overlay to one tile. Returns whether the tile is still
    /// present afterwards.
    ///
    /// Empty tiles are left alone unless the overlay sets a shape, and
    /// setting shape 0 clears the tile. Water, bounce pads and conveyor
    /// belts pick the variant matching a sloped tile.
    pub fn apply(&self, tile: &mut Tile) -> bool {
        match self.geometry {
            None if tile.is_empty() => return false,
            Some(geometry::NONE) => {
                *tile = Tile::EMPTY;
                return false;
            }
            Some(geometry) => tile.geometry = geometry,
            None => {}
        }

        if let Some(code) = self.obstacle {
            let g = tile.geometry;
            tile.obstacle = if code == obstacle::WATER
                && (geometry::SLOPES..geometry::END_SLOPES).contains(&g)
            {
                obstacle::WATER - 1 + g
            } else if code == obstacle::BOUNCE_FLAT && geometry::is_cardinal_slope(g) {
                obstacle::BOUNCE + g - geometry::SLOPES
            } else if (obstacle::BELTS..obstacle::BELT_SLOPES).contains(&code)
                && geometry::is_cardinal_slope(g)
            {
                obstacle::belt_on_slope(code, g)
            } else {
                code
            };
        }

        for (value, flag) in [
            (self.bumper_north, TileFlags::BUMPER_NORTH),
            (self.bumper_east, TileFlags::BUMPER_EAST),
            (self.bumper_south, TileFlags::BUMPER_SOUTH),
            (self.bumper_west, TileFlags::BUMPER_WEST),
        ] {
            if let Some(value) = value {
                tile.flags.set(flag, value);
            }
        }

        tile.height = match self.height {
            HeightEdit::Absolute(height) => height.min(MAX_HEIGHT),
            HeightEdit::Relative(delta) => {
                (i16::from(tile.height) + delta).clamp(0, i16::from(MAX_HEIGHT)) as u8
            }
        };

        if let Some(layer) = self.layer {
            tile.flags.set(TileFlags::LAYER, layer != 0);
        }
        tile.flags.remove(TileFlags::UNUSED);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn slope(g: u8, height: u8) -> Tile {
        Tile { geometry: g, height, ..Tile::EMPTY }
    }

    #[test]
    fn test_from_uniform_region() {
        let mut level = Level::new(3, 3);
        for row in level.tiles.iter_mut().take(2) {
            row[..2].fill(Tile { flags: TileFlags::BUMPER_EAST, ..Tile::flat(4) });
        }
        let info = TileInfo::from_region(&level, Region::new(0, 0, 2, 2));
        assert_eq!(info.geometry, Some(geometry::FLAT));
        assert_eq!(info.height, HeightEdit::Absolute(4));
        assert_eq!(info.bumper_east, Some(true));
        assert_eq!(info.bumper_west, Some(false));
        assert_eq!(info.height_range(), 0..=15);
    }

    #[test]
    fn test_from_mixed_region() {
        let mut level = Level::new(2, 1);
        level.tiles[0][0] = Tile::flat(2);
        level.tiles[0][1] = Tile { flags: TileFlags::LAYER, ..slope(geometry::SLOPE_EAST, 5) };
        let info = TileInfo::from_region(&level, Region::new(0, 0, 2, 1));
        assert_eq!(info.geometry, None);
        assert_eq!(info.layer, None);
        assert_eq!(info.height, HeightEdit::Relative(0));
        assert_eq!(info.height_range(), -2..=10);
    }

    #[test]
    fn test_apply_to_empty() {
        let info = TileInfo { obstacle: Some(obstacle::SAND), ..TileInfo::default() };
        let mut tile = Tile::EMPTY;
        assert!(!info.apply(&mut tile));
        assert_eq!(tile, Tile::EMPTY);

        let info = TileInfo { geometry: Some(geometry::FLAT), ..info };
        assert!(info.apply(&mut tile));
        assert_eq!(tile.obstacle, obstacle::SAND);
    }

    #[test]
    fn test_apply_clears_tile() {
        let info = TileInfo { geometry: Some(0), obstacle: Some(obstacle::SAND), ..TileInfo::default() };
        let mut tile = Tile::flat(7);
        assert!(!info.apply(&mut tile));
        assert_eq!(tile, Tile::EMPTY);
    }

    #[test]
    fn test_slope_variants() {
        let apply = |code: u8, g: u8| {
            let mut tile = slope(g, 1);
            TileInfo { obstacle: Some(code), ..TileInfo::default() }.apply(&mut tile);
            tile.obstacle
        };
        assert_eq!(apply(obstacle::WATER, geometry::FLAT), obstacle::WATER);
        assert_eq!(apply(obstacle::WATER, geometry::SLOPE_SOUTH), obstacle::WATER_SOUTH);
        assert_eq!(apply(obstacle::WATER, geometry::SOUTH_EAST_OUTER), obstacle::WATER_SOUTH_EAST_OUTER);
        assert_eq!(apply(obstacle::BOUNCE_FLAT, geometry::SLOPE_NORTH), obstacle::BOUNCE_NORTH);
        assert_eq!(apply(obstacle::BOUNCE_FLAT, geometry::NORTH_EAST_INNER), obstacle::BOUNCE_FLAT);
        assert_eq!(apply(obstacle::BELTS, geometry::SLOPE_SOUTH), obstacle::BELT_SOUTH_DOWN);
        assert_eq!(apply(obstacle::BELTS, geometry::FLAT), obstacle::BELTS);
    }

    #[test]
    fn test_heights_clamped() {
        let mut tile = Tile::flat(14);
        TileInfo { height: HeightEdit::Relative(3), ..TileInfo::default() }.apply(&mut tile);
        assert_eq!(tile.height, MAX_HEIGHT);
        TileInfo { height: HeightEdit::Relative(-20), ..TileInfo::default() }.apply(&mut tile);
        assert_eq!(tile.height, 0);
        TileInfo { height: HeightEdit::Absolute(40), ..TileInfo::default() }.apply(&mut tile);
        assert_eq!(tile.height, MAX_HEIGHT);
    }

    #[test]
    fn test_flags() {
        let mut tile = Tile::from_bytes([1, 0, 0, 0x71]);
        let info = TileInfo {
            bumper_south: Some(false),
            bumper_west: Some(true),
            layer: Some(1),
            ..TileInfo::default()
        };
        info.apply(&mut tile);
        assert_eq!(tile.flags, TileFlags::BUMPER_WEST | TileFlags::LAYER);
    }
}
