//! Exported level (`.kdcl`) and course (`.kdc`) files
//!
//! Both store tiles uncompressed, north row first, 4 bytes per tile. This
//! is the opposite row order from the ROM chunks.
//!
//! ```text
//! level file:  "KDCL\0"  game  music  header[28]  tiles...
//! course file: "KDC\0"  game  background  palette  water  music[8]
//!              offset[8] (u32 LE, 0xFFFFFFFF = slot absent)
//!              then header[28] + tiles for each present slot
//! ```

use super::{Header, Level};
use crate::common::{EditorError, EditorResult};
use crate::game::course::CourseSettings;
use crate::rom::Game;

pub const LEVEL_FILE_MAGIC: &[u8; 5] = b"KDCL\0";
pub const COURSE_FILE_MAGIC: &[u8; 4] = b"KDC\0";

/// Holes in a course file
pub const COURSE_LEVELS: usize = 8;

const ABSENT: u32 = 0xFFFF_FFFF;

/// Header and tiles of one level, as stored in both file formats
fn write_level(out: &mut Vec<u8>, level: &Level) {
    out.extend_from_slice(&level.header.to_bytes());
    out.extend(level.tile_bytes());
}

/// Parse a header and the tiles after it
fn read_level(bytes: &[u8]) -> Result<Level, String> {
    let (header, tiles) = bytes
        .split_first_chunk::<{ Header::SIZE }>()
        .ok_or("file ends inside the level header")?;
    let header = Header::from_bytes(header);
    if !header.size_is_valid() {
        return Err(format!(
            "level size {}x{} exceeds the editable area",
            header.width, header.length
        ));
    }

    let mut level = Level::new(header.width, header.length);
    level.header = header;
    let needed = level.width() * level.length() * 4;
    if tiles.len() < needed {
        return Err(format!("expected {} bytes of tile data, found {}", needed, tiles.len()));
    }
    level.set_tile_bytes(&tiles[..needed]);
    Ok(level)
}

/// A single exported level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelFile {
    /// Game id byte of the ROM the level came from
    pub game: u8,
    pub level: Level,
}

impl LevelFile {
    pub fn new(game: Game, level: Level) -> Self {
        Self { game: game.file_id(), level }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(LEVEL_FILE_MAGIC.len() + 2 + Header::SIZE);
        out.extend_from_slice(LEVEL_FILE_MAGIC);
        out.push(self.game);
        out.push(self.level.music);
        write_level(&mut out, &self.level);
        out
    }

    /// Parse a level file. The level comes back marked modified so it is
    /// written on the next save.
    pub fn from_bytes(bytes: &[u8]) -> EditorResult<Self> {
        let rest = bytes
            .strip_prefix(LEVEL_FILE_MAGIC)
            .ok_or_else(|| EditorError::level_file("bad magic"))?;
        let [game, music, rest @ ..] = rest else {
            return Err(EditorError::level_file("file ends before the level header"));
        };

        let mut level = read_level(rest).map_err(EditorError::level_file)?;
        level.music = *music;
        level.modified = true;
        if Game::from_file_id(*game).is_none() {
            log::warn!("level file has unknown game id {}", game);
        }
        Ok(Self { game: *game, level })
    }
}

/// Eight exported levels plus the course graphics settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseFile {
    pub game: u8,
    pub background: u8,
    pub palette: u8,
    pub water: u8,
    pub levels: [Option<Level>; COURSE_LEVELS],
}

/// A parsed course file and the slots that had to be skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseImport {
    pub course: CourseFile,
    /// Slots whose level data was unusable
    pub skipped: Vec<usize>,
}

impl CourseFile {
    pub const HEADER_SIZE: usize = 48;

    /// Collect course `course` from the loaded levels and settings
    pub fn from_course(game: Game, course: usize, levels: &[Level], settings: &CourseSettings) -> Self {
        let (background, palette, water) = settings.course(course).unwrap_or_default();
        let first = course * COURSE_LEVELS;
        Self {
            game: game.file_id(),
            background,
            palette,
            water,
            levels: std::array::from_fn(|i| levels.get(first + i).cloned()),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut header = Vec::with_capacity(Self::HEADER_SIZE);
        header.extend_from_slice(COURSE_FILE_MAGIC);
        header.extend_from_slice(&[self.game, self.background, self.palette, self.water]);
        header.extend(
            self.levels
                .iter()
                .map(|level| level.as_ref().map_or(0, |level| level.music)),
        );

        let mut body = Vec::new();
        for level in &self.levels {
            let offset = match level {
                Some(level) => {
                    let offset = (Self::HEADER_SIZE + body.len()) as u32;
                    write_level(&mut body, level);
                    offset
                }
                None => ABSENT,
            };
            header.extend_from_slice(&offset.to_le_bytes());
        }

        header.extend(body);
        header
    }

    /// Parse a course file.
    ///
    /// A bad magic number or truncated header rejects the whole file. A
    /// slot pointing at unusable data is skipped with a warning and listed
    /// in [`CourseImport::skipped`].
    pub fn from_bytes(bytes: &[u8]) -> EditorResult<CourseImport> {
        let header: &[u8; Self::HEADER_SIZE] = bytes
            .first_chunk()
            .ok_or_else(|| EditorError::course_file("file ends inside the course header"))?;
        if !header.starts_with(COURSE_FILE_MAGIC) {
            return Err(EditorError::course_file("bad magic"));
        }

        let music = &header[8..16];
        let mut skipped = Vec::new();
        let mut levels: [Option<Level>; COURSE_LEVELS] = Default::default();

        for (slot, (level, offset)) in levels
            .iter_mut()
            .zip(header[16..].chunks_exact(4))
            .enumerate()
        {
            let offset = u32::from_le_bytes([offset[0], offset[1], offset[2], offset[3]]);
            if offset == ABSENT {
                continue;
            }
            let parsed = bytes
                .get(offset as usize..)
                .ok_or_else(|| format!("offset {offset:#x} is past the end of the file"))
                .and_then(read_level);
            match parsed {
                Ok(mut parsed) => {
                    parsed.music = music[slot];
                    parsed.modified = true;
                    *level = Some(parsed);
                }
                Err(message) => {
                    log::warn!("skipping course file level {}: {}", slot + 1, message);
                    skipped.push(slot);
                }
            }
        }

        Ok(CourseImport {
            course: CourseFile {
                game: header[4],
                background: header[5],
                palette: header[6],
                water: header[7],
                levels,
            },
            skipped,
        })
    }
}
