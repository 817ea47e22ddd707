//! Rectangular edit operations with undo snapshots

use std::fmt;

use super::tileinfo::TileInfo;
use super::{Level, MAX_2D_SIZE, MAX_HEIGHT, Tile};

/// A rectangle of grid cells, always inside the 64x64 grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub length: usize,
}

impl Region {
    /// A region clipped to the grid
    pub fn new(x: usize, y: usize, width: usize, length: usize) -> Self {
        let x = x.min(MAX_2D_SIZE);
        let y = y.min(MAX_2D_SIZE);
        Self {
            x,
            y,
            width: width.min(MAX_2D_SIZE - x),
            length: length.min(MAX_2D_SIZE - y),
        }
    }

    /// Every tile of a level
    pub fn whole(level: &Level) -> Self {
        Self::new(0, 0, level.width(), level.length())
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.length == 0
    }

    /// Cell positions `(x, y)`, row by row
    pub fn cells(self) -> impl Iterator<Item = (usize, usize)> {
        (self.y..self.y + self.length)
            .flat_map(move |y| (self.x..self.x + self.width).map(move |x| (x, y)))
    }

    fn snapshot(self, level: &Level) -> Vec<Tile> {
        self.cells().map(|(x, y)| level.tiles[y][x]).collect()
    }

    fn restore(self, level: &mut Level, tiles: &[Tile]) {
        for ((x, y), &tile) in self.cells().zip(tiles) {
            level.tiles[y][x] = tile;
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) to ({}, {})",
            self.x,
            self.y,
            (self.x + self.width).saturating_sub(1),
            (self.y + self.length).saturating_sub(1)
        )
    }
}

/// A recorded change to one region: the tiles before and after
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileChange {
    label: &'static str,
    region: Region,
    before: Vec<Tile>,
    after: Vec<Tile>,
}

impl TileChange {
    /// Snapshot `region` ahead of an edit
    pub fn begin(level: &Level, region: Region, label: &'static str) -> Self {
        Self {
            label,
            region,
            before: region.snapshot(level),
            after: Vec::new(),
        }
    }

    /// Snapshot the edited region. Returns `None` when nothing changed,
    /// otherwise flags the level as modified.
    pub fn finish(mut self, level: &mut Level) -> Option<Self> {
        self.after = self.region.snapshot(level);
        if self.after == self.before {
            return None;
        }
        level.mark_modified();
        Some(self)
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn undo(&self, level: &mut Level) {
        self.region.restore(level, &self.before);
        level.mark_modified();
    }

    pub fn redo(&self, level: &mut Level) {
        self.region.restore(level, &self.after);
        level.mark_modified();
    }
}

impl fmt::Display for TileChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}", self.label, self.region)
    }
}

/// Tiles copied out of a level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clipboard {
    width: usize,
    length: usize,
    tiles: Vec<Tile>,
}

impl Clipboard {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tile at `x`, `y` within the copied block
    pub fn tile(&self, x: usize, y: usize) -> Option<&Tile> {
        if x < self.width {
            self.tiles.get(y * self.width + x)
        } else {
            None
        }
    }
}

impl Level {
    fn edit_region(
        &mut self,
        region: Region,
        label: &'static str,
        mut edit: impl FnMut(&mut Tile),
    ) -> Option<TileChange> {
        if region.is_empty() {
            return None;
        }
        let change = TileChange::begin(self, region, label);
        for (x, y) in region.cells() {
            edit(&mut self.tiles[y][x]);
        }
        change.finish(self)
    }

    /// Apply an edit overlay to every tile in `region`
    pub fn apply_info(&mut self, region: Region, info: &TileInfo) -> Option<TileChange> {
        self.edit_region(region, "edit", |tile| {
            info.apply(tile);
        })
    }

    pub fn delete_tiles(&mut self, region: Region) -> Option<TileChange> {
        self.edit_region(region, "delete", |tile| *tile = Tile::EMPTY)
    }

    /// Raise tiles by one, creating flat tiles in empty cells
    pub fn raise_tiles(&mut self, region: Region) -> Option<TileChange> {
        self.edit_region(region, "raise", |tile| {
            if tile.is_empty() {
                tile.geometry = 1;
                tile.height = 0;
            } else if tile.height < MAX_HEIGHT {
                tile.height += 1;
            }
        })
    }

    /// Lower tiles by one, removing tiles already at the bottom
    pub fn lower_tiles(&mut self, region: Region) -> Option<TileChange> {
        self.edit_region(region, "lower", |tile| {
            if tile.height > 0 {
                tile.height -= 1;
            } else if !tile.is_empty() {
                *tile = Tile::EMPTY;
            }
        })
    }

    pub fn copy_tiles(&self, region: Region) -> Clipboard {
        Clipboard {
            width: region.width,
            length: region.length,
            tiles: region.snapshot(self),
        }
    }

    /// Copy `region` then clear it
    pub fn cut_tiles(&mut self, region: Region) -> (Clipboard, Option<TileChange>) {
        let clipboard = self.copy_tiles(region);
        let change = self.edit_region(region, "cut", |tile| *tile = Tile::EMPTY);
        (clipboard, change)
    }

    /// Paste with the top-left corner at `x`, `y`; whatever falls outside
    /// the grid is dropped
    pub fn paste_tiles(&mut self, x: usize, y: usize, clipboard: &Clipboard) -> Option<TileChange> {
        let region = Region::new(x, y, clipboard.width, clipboard.length);
        if region.is_empty() || clipboard.is_empty() {
            return None;
        }
        let change = TileChange::begin(self, region, "paste");
        for (cx, cy) in region.cells() {
            if let Some(&tile) = clipboard.tile(cx - region.x, cy - region.y) {
                self.tiles[cy][cx] = tile;
            }
        }
        change.finish(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn level() -> Level {
        let mut level = Level::new(4, 4);
        for row in level.tiles.iter_mut().take(2) {
            row[..2].fill(Tile::flat(2));
        }
        level
    }

    #[test]
    fn test_region_clipped() {
        let region = Region::new(60, 62, 10, 10);
        assert_eq!(region, Region { x: 60, y: 62, width: 4, length: 2 });
        assert_eq!(region.cells().count(), 8);
        assert_eq!(region.to_string(), "(60, 62) to (63, 63)");
        assert!(Region::new(64, 0, 3, 3).is_empty());
    }

    #[test]
    fn test_raise_and_lower() {
        let mut level = level();
        let region = Region::new(1, 1, 2, 1);

        let change = level.raise_tiles(region).unwrap();
        assert_eq!(level.tiles[1][1].height, 3);
        assert_eq!(level.tiles[1][2], Tile::flat(0));
        assert!(level.modified && level.modified_recently);
        assert_eq!(change.to_string(), "raise from (1, 1) to (2, 1)");

        level.lower_tiles(region).unwrap();
        assert_eq!(level.tiles[1][1].height, 2);
        assert_eq!(level.tiles[1][2], Tile::EMPTY);
    }

    #[test]
    fn test_raise_at_max_height_is_no_change() {
        let mut level = Level::new(1, 1);
        level.tiles[0][0] = Tile::flat(MAX_HEIGHT);
        assert!(level.raise_tiles(Region::new(0, 0, 1, 1)).is_none());
        assert!(!level.modified);
    }

    #[test]
    fn test_undo_redo() {
        let mut level = level();
        let original = level.clone();
        let change = level.delete_tiles(Region::new(0, 0, 2, 2)).unwrap();
        let deleted = level.tiles.clone();
        assert!(level.rows().flatten().all(Tile::is_empty));

        change.undo(&mut level);
        assert_eq!(level.tiles, original.tiles);
        change.redo(&mut level);
        assert_eq!(level.tiles, deleted);
    }

    #[test]
    fn test_cut_and_paste() {
        let mut level = level();
        let (clipboard, change) = level.cut_tiles(Region::new(0, 0, 2, 1));
        assert!(change.is_some());
        assert_eq!((clipboard.width(), clipboard.length()), (2, 1));
        assert_eq!(level.tiles[0][0], Tile::EMPTY);

        level.paste_tiles(2, 3, &clipboard).unwrap();
        assert_eq!(level.tiles[3][2], Tile::flat(2));
        assert_eq!(level.tiles[3][3], Tile::flat(2));
    }

    #[test]
    fn test_paste_clipped_at_grid_edge() {
        let mut level = Level::new(64, 32);
        let clipboard = self::level().copy_tiles(Region::new(0, 0, 2, 2));
        let change = level.paste_tiles(63, 0, &clipboard).unwrap();
        assert_eq!(change.region(), Region { x: 63, y: 0, width: 1, length: 2 });
        assert_eq!(level.tiles[0][63], Tile::flat(2));
    }
}
