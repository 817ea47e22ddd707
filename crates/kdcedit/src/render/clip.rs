//! Z-clipping table
//!
//! The game keeps the ball drawn in front of or behind terrain by looking up
//! the gaps north and west of each tile. Gaps are bucketed by the diagonal
//! (`real_y + x`) they are seen from, where `real_y` counts rows from the
//! southern edge.

use crate::level::Level;

/// One gap in the terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipEntry {
    /// First column of the gap
    pub x_lower: u8,
    /// Column just past the gap
    pub x_upper: u8,
    /// 1 for the lower layer, 2 for the upper
    pub prio: u8,
    /// Index of the tile in south-to-north order
    pub zref: u16,
}

impl ClipEntry {
    /// Packed size in bytes
    pub const SIZE: usize = 5;

    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        let [lo, hi] = self.zref.to_le_bytes();
        [self.x_lower, self.x_upper, self.prio, lo, hi]
    }
}

/// Clip entries grouped by diagonal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipTable {
    buckets: Vec<Vec<ClipEntry>>,
}

impl ClipTable {
    pub fn build(level: &Level) -> Self {
        let (w, l) = (level.width() as isize, level.length() as isize);
        let mut buckets = vec![Vec::new(); (w + l) as usize];
        let geometry = |x: isize, y: isize| level.tile_or_empty(x, y).geometry;

        for y in 0..l {
            let real_y = l - y - 1;
            // column 0 never opens a gap
            let mut x = w - 1;
            while x > 0 {
                let prio = if level.tile_or_empty(x, y).layer() == 1 { 2 } else { 1 };
                let zref = (real_y * w + x) as u16;

                if y > 0 && geometry(x, y) > 0 && geometry(x, y - 1) == 0 {
                    let mut x_lower = x;
                    while x_lower >= 1 && geometry(x_lower - 1, y - 1) == 0 {
                        x_lower -= 1;
                    }
                    let entry = ClipEntry { x_lower: x_lower as u8, x_upper: (x + 1) as u8, prio, zref };
                    push(&mut buckets, real_y + x + 1, entry);
                }

                if geometry(x, y) > 0 && geometry(x - 1, y) == 0 {
                    let mut x_lower = x - 1;
                    while x_lower >= 1 && geometry(x_lower - 1, y) == 0 {
                        x_lower -= 1;
                    }
                    let entry = ClipEntry { x_lower: x_lower as u8, x_upper: x as u8, prio, zref };
                    push(&mut buckets, real_y + x - 1, entry);
                    // skip the rest of the gap
                    x = x_lower;
                }
                x -= 1;
            }
        }

        Self { buckets }
    }

    pub fn buckets(&self) -> &[Vec<ClipEntry>] {
        &self.buckets
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Serialize as the game's hash table: one u16 offset per bucket
    /// (0xFFFF for none), then a count byte and packed entries per bucket
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut index = Vec::with_capacity(2 * self.buckets.len());
        let mut data = Vec::new();
        let mut offset = 2 * self.buckets.len();

        for bucket in &self.buckets {
            if bucket.is_empty() {
                index.extend_from_slice(&0xFFFFu16.to_le_bytes());
                continue;
            }
            index.extend_from_slice(&(offset as u16).to_le_bytes());

            let count = bucket.len().min(usize::from(u8::MAX));
            if count < bucket.len() {
                log::warn!("clip bucket holds {} entries, keeping {}", bucket.len(), count);
            }
            data.push(count as u8);
            for entry in &bucket[..count] {
                data.extend_from_slice(&entry.to_bytes());
            }
            offset += 1 + count * ClipEntry::SIZE;
        }

        index.extend(data);
        index
    }
}

fn push(buckets: &mut [Vec<ClipEntry>], index: isize, entry: ClipEntry) {
    match usize::try_from(index).ok().and_then(|i| buckets.get_mut(i)) {
        Some(bucket) => bucket.push(entry),
        None => log::debug!("clip entry for diagonal {} dropped", index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{Tile, TileFlags};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_west_gap() {
        let mut level = Level::new(2, 1);
        level.tiles[0][1] = Tile::flat(0);
        let table = ClipTable::build(&level);

        let expected = ClipEntry { x_lower: 0, x_upper: 1, prio: 1, zref: 1 };
        assert_eq!(table.buckets(), &[vec![expected], vec![], vec![]]);
        assert_eq!(
            table.to_bytes(),
            vec![6, 0, 0xFF, 0xFF, 0xFF, 0xFF, 1, 0, 1, 1, 1, 0]
        );
    }

    #[test]
    fn test_north_gap() {
        let mut level = Level::new(2, 2);
        level.tiles[1][0] = Tile::flat(0);
        level.tiles[1][1] = Tile { flags: TileFlags::LAYER, ..Tile::flat(0) };
        let table = ClipTable::build(&level);

        let expected = ClipEntry { x_lower: 0, x_upper: 2, prio: 2, zref: 1 };
        assert_eq!(table.buckets()[2], vec![expected]);
        assert_eq!(table.buckets().iter().map(Vec::len).sum::<usize>(), 1);
    }

    #[test]
    fn test_gap_skipped_after_west_entry() {
        let mut level = Level::new(4, 1);
        level.tiles[0][3] = Tile::flat(0);
        let table = ClipTable::build(&level);
        // one entry spanning the whole gap, nothing for columns inside it
        let entries: Vec<_> = table.buckets().iter().flatten().copied().collect();
        assert_eq!(entries, vec![ClipEntry { x_lower: 0, x_upper: 3, prio: 1, zref: 3 }]);
        assert_eq!(table.buckets()[2].len(), 1);
    }

    #[test]
    fn test_scan_covers_last_column_only_down_to_column_one() {
        let mut level = Level::new(3, 2);
        level.tiles[0][..2].fill(Tile::flat(0));
        level.tiles[1][..3].fill(Tile::flat(0));
        let table = ClipTable::build(&level);

        let expected = ClipEntry { x_lower: 2, x_upper: 3, prio: 1, zref: 2 };
        assert_eq!(table.buckets()[3], vec![expected]);
        assert_eq!(table.buckets().iter().map(Vec::len).sum::<usize>(), 1);

        // a gap north of column 0 alone is not recorded
        let mut level = Level::new(1, 2);
        level.tiles[1][0] = Tile::flat(0);
        assert!(ClipTable::build(&level).is_empty());
    }

    #[test]
    fn test_solid_level_has_no_gaps() {
        let mut level = Level::new(3, 3);
        for row in level.tiles.iter_mut().take(3) {
            row[..3].fill(Tile::flat(1));
        }
        let table = ClipTable::build(&level);
        assert!(table.is_empty());
        assert_eq!(table.to_bytes(), vec![0xFF; 12]);
    }
}
