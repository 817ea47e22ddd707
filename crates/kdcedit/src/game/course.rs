//! Per-course settings stored outside the level data
//!
//! Music selections (one byte per hole) and the course graphics: foreground
//! palette, water palette and, for the first eight courses, the background.
//! Special Tee Shot keeps these elsewhere and is not handled here.

use crate::common::{EditorError, EditorResult};
use crate::level::Level;
use crate::rom::{RomFile, Version};

/// Courses with their own foreground and water palettes
pub const NUM_COURSES: usize = 28;
/// Courses with a selectable background; later courses repeat these
pub const NUM_BACKGROUND_COURSES: usize = 8;
pub const NUM_FG_PALETTES: usize = 10;

const FG_PALETTE_SIZE: u16 = 0x20;
const WATER_PALETTE_SIZE: u16 = 0x120;
const BG_PALETTE_SIZE: u16 = 0x28;
/// Night palettes follow the day palette table after this many entries
const NIGHT_PALETTE_SLOT: u32 = 33;

/// One of the six course backgrounds, with per-version data (JP, US)
#[derive(Debug, Clone, Copy)]
pub struct Background {
    pub name: &'static str,
    palette: [u16; 2],
    tilemap1: [u32; 2],
    tilemap2: [u32; 2],
    animation: [u16; 2],
}

pub const BACKGROUNDS: [Background; 6] = [
    Background {
        name: "Background 1 (clouds)",
        palette: [0x8290, 0xC290],
        tilemap1: [0x92BEB1, 0x90A836],
        tilemap2: [0x94AC83, 0x928000],
        animation: [0xCD33, 0xCD52],
    },
    Background {
        name: "Background 2 (stars & moon)",
        palette: [0x83D0, 0xC3D0],
        tilemap1: [0x92D18C, 0x90B1B2],
        tilemap2: [0x94EDAB, 0x8EFB5F],
        animation: [0xCECA, 0xCEE9],
    },
    Background {
        name: "Background 3 (waterfalls)",
        palette: [0x8330, 0xC330],
        tilemap1: [0x93A043, 0x90ED83],
        tilemap2: [0x94967D, 0x91E7A2],
        animation: [0xCE79, 0xCE98],
    },
    Background {
        name: "Background 4 (jigsaw)",
        palette: [0x82E0, 0xC2E0],
        tilemap1: [0x93E286, 0x91AD5B],
        tilemap2: [0x93D5F8, 0x91A0CD],
        animation: [0xCE64, 0xCE83],
    },
    Background {
        name: "Background 5 (candy)",
        palette: [0x8380, 0xC380],
        tilemap1: [0x92AB0F, 0x909494],
        tilemap2: [0x93FA68, 0x91E20F],
        animation: [0xCFAE, 0xCFCD],
    },
    Background {
        name: "Background 6 (ocean)",
        palette: [0x85E0, 0xC5E0],
        tilemap1: [0x9398A1, 0x90E5E1],
        tilemap2: [0x94DA7C, 0x92B347],
        animation: [0xCFF3, 0xD012],
    },
];

/// ROM locations of the course tables for one version
struct CourseTables {
    column: usize,
    music: u32,
    new_music: u32,
    fg_palette: u32,
    fg_palette_base: u16,
    water: [u32; 2],
    water_base: [u16; 2],
    /// Palettes, tilemap 1, tilemap 2, animation
    background: [u32; 4],
}

fn tables(version: Version) -> EditorResult<CourseTables> {
    match version {
        Version::KirbyJapan => Ok(CourseTables {
            column: 0,
            music: 0x80C533,
            new_music: 0x80F440,
            fg_palette: 0x80D425,
            fg_palette_base: 0xD4A9,
            water: [0x8484AF, 0x8484F1],
            water_base: [0xA444, 0xA46E],
            background: [0x80D0AF, 0x80D304, 0x80D324, 0x84CD23],
        }),
        Version::KirbyUs => Ok(CourseTables {
            column: 1,
            music: 0x80C99D,
            new_music: 0x80F950,
            fg_palette: 0x80D869,
            fg_palette_base: 0xD8ED,
            water: [0x8484AF, 0x8484F1],
            water_base: [0xE030, 0xE05A],
            background: [0x80D517, 0x80D748, 0x80D768, 0x84CD42],
        }),
        Version::SpecialTeeShot => Err(EditorError::unsupported(
            "course settings are not supported for Special Tee Shot",
        )),
    }
}

/// Music track 0x83 was removed outside Japan and later ids shifted down
const REMOVED_TRACK: u8 = 0x83;

/// Read the music byte of every level, eight per course
pub fn read_music(rom: &RomFile, levels: &mut [Level]) -> EditorResult<()> {
    let tables = tables(rom.version())?;
    let shifted = !rom.version().has_opening_demo_track();

    for (course, holes) in levels.chunks_mut(8).enumerate() {
        let pointer = rom.read_u16(tables.music + 2 * course as u32)?;
        let base = 0x80_0000 | u32::from(pointer);
        for (hole, level) in holes.iter_mut().enumerate() {
            let mut music = rom.read_u8(base + hole as u32)?;
            if shifted && music >= REMOVED_TRACK {
                music += 1;
            }
            level.music = music;
        }
    }
    Ok(())
}

/// Write every level's music byte into a relocated table and repoint the
/// per-course pointers to it
pub fn write_music(rom: &mut RomFile, levels: &[Level]) -> EditorResult<()> {
    let tables = tables(rom.version())?;
    let shifted = !rom.version().has_opening_demo_track();

    for course in 0..levels.len().div_ceil(8) {
        let pointer = tables.new_music + 8 * course as u32;
        rom.write_u16(tables.music + 2 * course as u32, pointer as u16)?;
    }
    for (i, level) in levels.iter().enumerate() {
        let music = if shifted && level.music > REMOVED_TRACK {
            level.music - 1
        } else {
            level.music
        };
        rom.write_u8(tables.new_music + i as u32, music)?;
    }
    log::info!("wrote music table for {} levels", levels.len());
    Ok(())
}

/// Graphics selections for every course
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSettings {
    /// Foreground palette index per course
    pub palette: [u8; NUM_COURSES],
    /// Water palette index per course
    pub water: [u8; NUM_COURSES],
    /// Background index, first eight courses only
    pub background: [u8; NUM_BACKGROUND_COURSES],
}

impl Default for CourseSettings {
    fn default() -> Self {
        Self {
            palette: [0; NUM_COURSES],
            water: [0; NUM_COURSES],
            background: [0; NUM_BACKGROUND_COURSES],
        }
    }
}

impl CourseSettings {
    /// Recover the selections from the pointers stored in the ROM
    pub fn read(rom: &RomFile) -> EditorResult<Self> {
        let t = tables(rom.version())?;
        let mut settings = Self::default();

        for i in 0..NUM_COURSES {
            let pointer = rom.read_u16(t.fg_palette + 2 * i as u32)?;
            settings.palette[i] = (pointer.wrapping_sub(t.fg_palette_base) / FG_PALETTE_SIZE) as u8;

            let pointer = rom.read_u16(t.water[0] + 2 * i as u32)?;
            settings.water[i] = (pointer.wrapping_sub(t.water_base[0]) / WATER_PALETTE_SIZE) as u8;
        }

        // the palette pointer alone identifies the background
        for i in 0..NUM_BACKGROUND_COURSES {
            let pointer = rom.read_u16(t.background[0] + 2 * i as u32)?;
            if let Some(bg) = BACKGROUNDS
                .iter()
                .rposition(|bg| bg.palette[t.column] == pointer)
            {
                settings.background[i] = bg as u8;
            }
        }
        Ok(settings)
    }

    /// Store the selections, including night palettes and the background
    /// tilemap and animation pointers
    pub fn write(&self, rom: &mut RomFile) -> EditorResult<()> {
        let t = tables(rom.version())?;

        for (i, &selected) in self.background.iter().enumerate() {
            let bg = BACKGROUNDS.get(usize::from(selected)).ok_or_else(|| {
                EditorError::unsupported(format!("background {selected} does not exist"))
            })?;
            let i = i as u32;
            let palette = bg.palette[t.column];
            rom.write_u16(t.background[0] + 2 * i, palette)?;
            rom.write_u16(t.background[0] + 2 * i + 0x10, palette.wrapping_add(BG_PALETTE_SIZE))?;

            // long pointers are stored as bank word then address word
            for (table, pointer) in [(t.background[1], bg.tilemap1), (t.background[2], bg.tilemap2)] {
                let pointer = pointer[t.column];
                rom.write_u16(table + 4 * i, (pointer >> 16) as u16)?;
                rom.write_u16(table + 4 * i + 2, pointer as u16)?;
            }
            rom.write_u16(t.background[3] + 2 * i, bg.animation[t.column])?;
        }

        for i in 0..NUM_COURSES {
            let slot = i as u32;
            let palette = t
                .fg_palette_base
                .wrapping_add(u16::from(self.palette[i]).wrapping_mul(FG_PALETTE_SIZE));
            rom.write_u16(t.fg_palette + 2 * slot, palette)?;
            rom.write_u16(
                t.fg_palette + 2 * (slot + NIGHT_PALETTE_SLOT),
                palette.wrapping_add(NUM_FG_PALETTES as u16 * FG_PALETTE_SIZE),
            )?;

            for (table, base) in t.water.into_iter().zip(t.water_base) {
                let water = base.wrapping_add(u16::from(self.water[i]).wrapping_mul(WATER_PALETTE_SIZE));
                rom.write_u16(table + 2 * slot, water)?;
            }
        }
        Ok(())
    }

    /// Settings for one course: (background, palette, water)
    pub fn course(&self, course: usize) -> Option<(u8, u8, u8)> {
        let palette = *self.palette.get(course)?;
        let water = self.water[course];
        let background = self.background[course % NUM_BACKGROUND_COURSES];
        Some((background, palette, water))
    }

    /// Change the settings for one course. The background applies to every
    /// course sharing its slot.
    pub fn set_course(&mut self, course: usize, background: u8, palette: u8, water: u8) {
        if course < NUM_COURSES {
            self.palette[course] = palette;
            self.water[course] = water;
            self.background[course % NUM_BACKGROUND_COURSES] = background;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn blank(version: Version) -> RomFile {
        RomFile::blank(version, 0x20_0000, false)
    }

    #[test]
    fn test_music_round_trip() {
        for version in [Version::KirbyJapan, Version::KirbyUs] {
            let mut rom = blank(version);
            let mut levels: Vec<Level> = (0..16).map(|_| Level::new(4, 4)).collect();
            levels[0].music = 0x82;
            levels[1].music = 0x84;
            levels[9].music = 0x9F;
            write_music(&mut rom, &levels).unwrap();

            let mut reloaded: Vec<Level> = (0..16).map(|_| Level::new(4, 4)).collect();
            read_music(&rom, &mut reloaded).unwrap();
            let music: Vec<u8> = reloaded.iter().map(|l| l.music).collect();
            let expected: Vec<u8> = levels.iter().map(|l| l.music).collect();
            assert_eq!(music, expected);
        }
    }

    #[test]
    fn test_music_id_shift() {
        let mut rom = blank(Version::KirbyUs);
        let mut levels: Vec<Level> = (0..8).map(|_| Level::new(4, 4)).collect();
        levels[0].music = 0x8B;
        levels[1].music = 0x82;
        write_music(&mut rom, &levels).unwrap();

        assert_eq!(rom.read_u16(0x80C99D).unwrap(), 0xF950);
        assert_eq!(rom.read_u8(0x80F950).unwrap(), 0x8A);
        assert_eq!(rom.read_u8(0x80F951).unwrap(), 0x82);

        let mut rom = blank(Version::KirbyJapan);
        write_music(&mut rom, &levels).unwrap();
        assert_eq!(rom.read_u8(0x80F440).unwrap(), 0x8B);
    }

    #[test]
    fn test_settings_round_trip() {
        let mut rom = blank(Version::KirbyUs);
        let mut settings = CourseSettings::default();
        settings.set_course(0, 3, 2, 1);
        settings.set_course(9, 5, 9, 0);
        settings.set_course(27, 0, 7, 1);
        settings.write(&mut rom).unwrap();

        // night palette follows the day one
        assert_eq!(rom.read_u16(0x80D869 + 2 * 33).unwrap(), 0xD8ED + 2 * 0x20 + 10 * 0x20);
        // background 4 tilemap split into bank and address words
        assert_eq!(rom.read_u16(0x80D748).unwrap(), 0x91);
        assert_eq!(rom.read_u16(0x80D74A).unwrap(), 0xAD5B);

        let reloaded = CourseSettings::read(&rom).unwrap();
        assert_eq!(reloaded, settings);
        assert_eq!(reloaded.course(9), Some((5, 9, 0)));
        assert_eq!(reloaded.course(28), None);
    }

    #[test]
    fn test_special_tee_shot_refused() {
        let rom = blank(Version::SpecialTeeShot);
        assert!(matches!(
            CourseSettings::read(&rom),
            Err(EditorError::Unsupported { .. })
        ));
    }
}
