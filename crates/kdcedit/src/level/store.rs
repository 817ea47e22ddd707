//! Loading levels from and saving them to the ROM
//!
//! Each level is stored as eleven chunks reached through per-chunk pointer
//! tables. Tile chunks hold one byte per tile with the southern row first.
//! On save every chunk is regenerated: the tile chunks from the grid, the
//! playfield chunks from its isometric projection, and the clip table.
//!
//! Encoding is independent per level and runs in parallel. Placement is a
//! single pass in level order since each level starts where the previous
//! one ended.

use rayon::prelude::*;

use super::{Header, Level, Tile};
use crate::common::{EditorError, EditorResult, LevelLoadError};
use crate::render::isometric::field_size;
use crate::render::{ClipTable, FragmentTables, Playfield, project};
use crate::rom::{ChunkKind, Game, RomFile};

/// Playfield buffer capacity in tile words, shared by both layers' offsets
pub const PLAYFIELD_CAPACITY: usize = 13312;

/// What to do when a level cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Stop loading the ROM
    Abort,
    /// Substitute a blank 10x10 level and continue
    UseDefault,
}

/// A playfield too large for the game's buffer; rows past the limit were
/// saved empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayfieldOverflow {
    /// Bytes the full playfield needs
    pub needed: usize,
    /// Bytes available
    pub capacity: usize,
}

/// The eleven chunks of one level, ready to place
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedLevel {
    /// Chunk data in [`ChunkKind::ALL`] order; all but the header are packed
    pub chunks: [Vec<u8>; 11],
    /// Playfield size in bytes, counting rows that did not fit
    pub field_size: usize,
    pub overflow: Option<PlayfieldOverflow>,
}

/// Result of writing levels back to the ROM
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedLevels {
    /// Level numbers written, in order
    pub written: Vec<usize>,
    /// First free address after the last chunk
    pub end: u32,
    pub overflows: Vec<(usize, PlayfieldOverflow)>,
}

/// Row start, end and offset tables plus the packed layer data of a
/// playfield
struct PackedRows {
    starts: Vec<u16>,
    ends: Vec<u16>,
    offsets: Vec<u16>,
    layers: [Vec<u16>; 2],
    /// Words the playfield needs, including rows that did not fit
    words: usize,
}

const EMPTY_ROW: u16 = 0xFFFF;

/// Trim each playfield row to its occupied span and pack the spans one
/// after another
fn pack_rows(field: &Playfield) -> PackedRows {
    let width = usize::from(field.field_width());
    let height = usize::from(field.field_height());

    let mut rows = PackedRows {
        starts: vec![0; height],
        ends: vec![0; height],
        offsets: vec![0; height],
        layers: [vec![0; PLAYFIELD_CAPACITY], vec![0; PLAYFIELD_CAPACITY]],
        words: 0,
    };

    for row in 0..height {
        let start = (0..width)
            .find(|&col| field.is_occupied(row, col))
            .unwrap_or(width);
        let mut end = width.saturating_sub(1);
        while end > start && !field.is_occupied(row, end) {
            end -= 1;
        }
        let len = if start < width { end + 1 - start } else { 0 };
        let index = rows.words;

        if start != width && index + len < PLAYFIELD_CAPACITY {
            for (layer, out) in rows.layers.iter_mut().enumerate() {
                out[index..index + len].copy_from_slice(&field.row(layer, row)[start..=end]);
            }
            rows.starts[row] = start as u16;
            rows.ends[row] = end as u16;
            rows.offsets[row] = index as u16;
        } else {
            rows.starts[row] = EMPTY_ROW;
            rows.ends[row] = EMPTY_ROW;
            rows.offsets[row] = EMPTY_ROW;
        }
        rows.words += len;
    }

    let used = rows.words.min(PLAYFIELD_CAPACITY);
    for layer in &mut rows.layers {
        layer.truncate(used);
    }
    rows
}

fn word_bytes(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// Reads and writes level data using one set of composition tables
#[derive(Debug, Clone, Copy)]
pub struct LevelStore<'t> {
    tables: &'t FragmentTables,
}

impl Default for LevelStore<'static> {
    fn default() -> Self {
        Self::new(FragmentTables::builtin())
    }
}

impl<'t> LevelStore<'t> {
    pub fn new(tables: &'t FragmentTables) -> Self {
        Self { tables }
    }

    /// Read level `num`
    pub fn load_level(&self, rom: &RomFile, num: usize) -> Result<Level, LevelLoadError> {
        let version = rom.version();
        let header = match (version.chunk_pointer(ChunkKind::Header, num), version.size_tables()) {
            (Some(pointer), _) => {
                let bytes = rom
                    .read_pointer(pointer)
                    .and_then(|address| rom.read_bytes(address, Header::SIZE))
                    .map_err(|e| LevelLoadError::Header(Box::new(e)))?;
                let mut header = [0; Header::SIZE];
                header.copy_from_slice(bytes);
                Header::from_bytes(&header)
            }
            (None, Some((widths, lengths))) => {
                let read = |table: u32| {
                    rom.read_u8(table + 2 * num as u32)
                        .map_err(|e| LevelLoadError::Header(Box::new(e)))
                };
                Header {
                    width: u16::from(read(widths)?),
                    length: u16::from(read(lengths)?),
                    ..Header::default()
                }
            }
            (None, None) => {
                return Err(LevelLoadError::Header(Box::new(EditorError::unsupported(
                    "no level header table",
                ))));
            }
        };

        if !header.size_is_valid() {
            return Err(LevelLoadError::Size {
                width: header.width,
                length: header.length,
            });
        }

        let mut level = Level::new(header.width, header.length);
        level.header = header;
        let (width, length) = (level.width(), level.length());

        let chunk_error = |kind: ChunkKind| {
            move |e: EditorError| LevelLoadError::Chunk {
                chunk: kind.name(),
                source: Box::new(e),
            }
        };

        // levels already moved to the free area must be rewritten there
        if let Some(pointer) = version.chunk_pointer(ChunkKind::Terrain, num) {
            let address = rom.read_pointer(pointer).map_err(chunk_error(ChunkKind::Terrain))?;
            if address >= version.data_area() {
                level.modified = true;
            }
        }

        let mut chunks = Vec::with_capacity(4);
        for kind in [ChunkKind::Terrain, ChunkKind::Obstacle, ChunkKind::Height, ChunkKind::Flags] {
            let pointer = version
                .chunk_pointer(kind, num)
                .ok_or_else(|| chunk_error(kind)(EditorError::unsupported("no chunk table")))?;
            let mut data = rom.read_packed_from_pointer(pointer).map_err(chunk_error(kind))?;
            if data.len() < width * length {
                log::debug!(
                    "level {} {} chunk is short ({} of {} bytes)",
                    num,
                    kind,
                    data.len(),
                    width * length
                );
                data.resize(width * length, 0);
            }
            chunks.push(data);
        }

        // stored south row first
        for i in 0..length {
            for j in 0..width {
                let at = i * width + j;
                let bytes = [chunks[0][at], chunks[1][at], chunks[2][at], chunks[3][at]];
                level.tiles[length - i - 1][j] = Tile::from_bytes(bytes);
            }
        }
        Ok(level)
    }

    /// Read every level. `recovery` decides what happens to a level that
    /// cannot be read.
    pub fn load_all(
        &self,
        rom: &RomFile,
        mut recovery: impl FnMut(usize, &LevelLoadError) -> Recovery,
    ) -> EditorResult<Vec<Level>> {
        let count = rom.game().level_count();
        let mut levels = Vec::with_capacity(count);

        for num in 0..count {
            match self.load_level(rom, num) {
                Ok(level) => levels.push(level),
                Err(source) => match recovery(num, &source) {
                    Recovery::Abort => return Err(EditorError::LevelLoad { level: num, source }),
                    Recovery::UseDefault => {
                        log::warn!(
                            "level {}-{} could not be loaded ({}), using a blank level",
                            num / 8 + 1,
                            num % 8 + 1,
                            source
                        );
                        levels.push(Level::placeholder());
                    }
                },
            }
        }

        log::info!("loaded {} levels", levels.len());
        Ok(levels)
    }

    /// Bring the derived header fields up to date
    pub fn update_header(level: &mut Level) {
        let (field_width, field_height) = field_size(level);
        let (length, height) = (level.length() as u16, u16::from(level.max_height()));
        let header = &mut level.header;
        header.field_width = field_width;
        header.field_height = field_height;
        header.align_horiz = 0;
        header.align_vert = 16 * (length + height + 2);
        header.unknown1 = 0xFFFF;
        header.unknown2 = 0xFFFF;
    }

    /// Produce all chunks for a level, updating its header first
    pub fn encode_level(&self, level: &mut Level) -> EncodedLevel {
        Self::update_header(level);
        let level = &*level;
        let (width, length) = (level.width(), level.length());

        // south row first
        let tile_chunk = |field: fn(&Tile) -> u8| {
            let bytes: Vec<u8> = (0..length)
                .rev()
                .flat_map(|y| level.tiles[y][..width].iter().map(field))
                .collect();
            halpack::pack(&bytes)
        };

        let field = project(level, self.tables);
        let rows = pack_rows(&field);
        let field_size = rows.words * 2;
        let overflow = (field_size > PLAYFIELD_CAPACITY * 2).then_some(PlayfieldOverflow {
            needed: field_size,
            capacity: PLAYFIELD_CAPACITY * 2,
        });

        let clip = ClipTable::build(level).to_bytes();
        let [layer1, layer2] = &rows.layers;

        EncodedLevel {
            chunks: [
                level.header.to_bytes().to_vec(),
                tile_chunk(|t| t.geometry),
                tile_chunk(|t| t.obstacle),
                tile_chunk(|t| t.height),
                tile_chunk(|t| t.flags.bits()),
                halpack::pack(&word_bytes(&rows.starts)),
                halpack::pack(&word_bytes(&rows.ends)),
                halpack::pack(&word_bytes(&rows.offsets)),
                halpack::pack(&word_bytes(layer1)),
                halpack::pack(&word_bytes(layer2)),
                halpack::pack(&clip),
            ],
            field_size,
            overflow,
        }
    }

    /// Encode and place every modified level (every level if `all` is set)
    /// starting at the version's free data area. Written levels stay
    /// flagged as modified.
    pub fn save_all(&self, rom: &mut RomFile, levels: &mut [Level], all: bool) -> EditorResult<SavedLevels> {
        if rom.game() == Game::SpecialTeeShot {
            return Err(EditorError::unsupported("saving Special Tee Shot levels"));
        }
        let version = rom.version();

        let encoded: Vec<(usize, EncodedLevel)> = levels
            .par_iter_mut()
            .enumerate()
            .filter(|(_, level)| all || level.modified)
            .map(|(num, level)| (num, self.encode_level(level)))
            .collect();

        let mut saved = SavedLevels {
            end: version.data_area(),
            ..SavedLevels::default()
        };

        for (num, level) in encoded {
            if let Some(overflow) = level.overflow {
                log::warn!(
                    "level {}-{} playfield is too large ({} of {} bytes), lower rows are left empty",
                    num / 8 + 1,
                    num % 8 + 1,
                    overflow.needed,
                    overflow.capacity
                );
                saved.overflows.push((num, overflow));
            }

            for (kind, chunk) in ChunkKind::ALL.into_iter().zip(&level.chunks) {
                let pointer = version
                    .chunk_pointer(kind, num)
                    .ok_or_else(|| EditorError::unsupported(format!("no {kind} table")))?;
                log::debug!("level {} {} chunk: {} bytes", num, kind, chunk.len());
                saved.end = rom.write_to_pointer(pointer, saved.end, chunk)?;
            }
            // it now lives in the data area and must be rewritten on every save
            levels[num].modified = true;
            saved.written.push(num);
        }

        log::info!(
            "wrote {} levels, data ends at {:#08x}",
            saved.written.len(),
            saved.end
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::TileFlags;
    use crate::render::FIELD_WIDTH;
    use crate::rom::Version;
    use pretty_assertions::assert_eq;

    fn sample() -> Level {
        let mut level = Level::new(5, 3);
        level.tiles[0][0] = Tile::flat(2);
        level.tiles[0][1] = Tile { geometry: 5, height: 1, ..Tile::EMPTY };
        level.tiles[2][4] = Tile { obstacle: 0x04, flags: TileFlags::BUMPER_SOUTH, ..Tile::flat(0) };
        level.mark_modified();
        level
    }

    fn unpack_words(packed: &[u8]) -> Vec<u16> {
        halpack::unpack(packed)
            .unwrap()
            .data
            .chunks_exact(2)
            .map(|w| u16::from_le_bytes([w[0], w[1]]))
            .collect()
    }

    #[test]
    fn test_header_updated() {
        let mut level = sample();
        LevelStore::update_header(&mut level);
        let header = level.header;
        assert_eq!((header.field_width, header.field_height), (32, 24));
        assert_eq!((header.align_horiz, header.align_vert), (0, 16 * (3 + 2 + 2)));
        assert_eq!((header.unknown1, header.unknown2), (0xFFFF, 0xFFFF));
    }

    #[test]
    fn test_tile_chunks_south_first() {
        let mut level = sample();
        let encoded = LevelStore::default().encode_level(&mut level);
        let terrain = halpack::unpack(&encoded.chunks[1]).unwrap().data;
        assert_eq!(terrain, vec![0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 1, 5, 0, 0, 0]);
        let flags = halpack::unpack(&encoded.chunks[4]).unwrap().data;
        assert_eq!(flags[4], 0x01);
        assert_eq!(&encoded.chunks[0][..], &level.header.to_bytes()[..]);
    }

    #[test]
    fn test_row_tables() {
        let mut level = sample();
        let encoded = LevelStore::default().encode_level(&mut level);
        let starts = unpack_words(&encoded.chunks[5]);
        let ends = unpack_words(&encoded.chunks[6]);
        let offsets = unpack_words(&encoded.chunks[7]);
        assert_eq!(starts.len(), usize::from(level.header.field_height));

        let mut index = 0;
        for row in 0..starts.len() {
            if starts[row] == EMPTY_ROW {
                assert_eq!((ends[row], offsets[row]), (EMPTY_ROW, EMPTY_ROW));
                continue;
            }
            assert!(starts[row] <= ends[row]);
            assert_eq!(usize::from(offsets[row]), index);
            index += usize::from(ends[row] - starts[row]) + 1;
        }
        assert_eq!(encoded.field_size, index * 2);
        assert!(encoded.overflow.is_none());
        let layer1 = halpack::unpack(&encoded.chunks[8]).unwrap().data;
        assert_eq!(layer1.len(), encoded.field_size);
    }

    #[test]
    fn test_oversized_playfield_truncated() {
        let mut field = Playfield::new(FIELD_WIDTH as u16, 40);
        for row in 0..40 {
            for col in 0..FIELD_WIDTH as i32 {
                field.set(0, row, col, 1);
            }
        }
        let rows = pack_rows(&field);
        assert_eq!(rows.words, 40 * FIELD_WIDTH);
        // 34 full rows fit
        assert_eq!(rows.offsets[33], 33 * FIELD_WIDTH as u16);
        assert_eq!(rows.starts[34], EMPTY_ROW);
        assert_eq!(rows.ends[39], EMPTY_ROW);
        assert_eq!(rows.layers[0].len(), PLAYFIELD_CAPACITY);
    }

    #[test]
    fn test_empty_rows() {
        let mut field = Playfield::new(16, 4);
        field.set(1, 2, 5, 3);
        field.set(0, 2, 9, 4);
        let rows = pack_rows(&field);
        assert_eq!(rows.starts, vec![EMPTY_ROW, EMPTY_ROW, 5, EMPTY_ROW]);
        assert_eq!(rows.ends[2], 9);
        assert_eq!(rows.offsets[2], 0);
        assert_eq!(rows.layers[0], vec![0, 0, 0, 0, 4]);
        assert_eq!(rows.layers[1], vec![3, 0, 0, 0, 0]);
    }

    #[test]
    fn test_save_then_load() {
        let mut rom = RomFile::blank(Version::KirbyUs, 0x10_0000, false);
        let mut levels = vec![Level::new(4, 4), sample(), Level::new(2, 2)];
        levels[2].tiles[1][1] = Tile::flat(9);
        levels[2].mark_modified();

        let store = LevelStore::default();
        let saved = store.save_all(&mut rom, &mut levels, false).unwrap();
        assert_eq!(saved.written, vec![1, 2]);
        assert!(saved.end > Version::KirbyUs.data_area());

        for num in [1, 2] {
            let loaded = store.load_level(&rom, num).unwrap();
            assert_eq!(loaded.header, levels[num].header);
            assert_eq!(loaded.tiles, levels[num].tiles);
            assert!(loaded.modified);
        }
        assert!(matches!(store.load_level(&rom, 0), Err(LevelLoadError::Header(_))));
    }

    #[test]
    fn test_load_all_recovery() {
        let rom = RomFile::blank(Version::KirbyUs, 0x10_0000, false);
        let store = LevelStore::default();

        let mut asked = 0;
        let levels = store
            .load_all(&rom, |_, _| {
                asked += 1;
                Recovery::UseDefault
            })
            .unwrap();
        assert_eq!(levels.len(), 224);
        assert_eq!(asked, 224);
        assert_eq!((levels[5].width(), levels[5].length()), (10, 10));

        let result = store.load_all(&rom, |_, _| Recovery::Abort);
        assert!(matches!(result, Err(EditorError::LevelLoad { level: 0, .. })));
    }

    #[test]
    fn test_special_tee_shot_save_refused() {
        let mut rom = RomFile::blank(Version::SpecialTeeShot, 0x10_0000, false);
        let mut levels = vec![sample()];
        let result = LevelStore::default().save_all(&mut rom, &mut levels, true);
        assert!(matches!(result, Err(EditorError::Unsupported { .. })));
    }
}
