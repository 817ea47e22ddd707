//! Whole-ROM editing session
//!
//! A [`Workspace`] ties a ROM image to its decoded levels and course
//! settings, and runs the save sequence: level data, bank padding, music
//! table, course graphics.

use std::path::Path;

use crate::common::{EditorError, EditorResult};
use crate::game::course::{self, CourseSettings};
use crate::level::{
    COURSE_LEVELS, CourseFile, CourseImport, Level, LevelFile, LevelStore, PlayfieldOverflow, Recovery,
};
use crate::render::FragmentTables;
use crate::rom::{Game, RomFile};

/// Parse a level id: either `course-hole`, both counted from 1, or a
/// 0-based level index
pub fn parse_level_id(id: &str, game: Game) -> EditorResult<usize> {
    let invalid = || EditorError::unsupported(format!("invalid level id '{id}'"));

    let num = match id.split_once('-') {
        Some((course, hole)) => {
            let course: usize = course.trim().parse().map_err(|_| invalid())?;
            let hole: usize = hole.trim().parse().map_err(|_| invalid())?;
            if course == 0 || hole == 0 || hole > COURSE_LEVELS {
                return Err(invalid());
            }
            (course - 1) * COURSE_LEVELS + hole - 1
        }
        None => id.trim().parse().map_err(|_| invalid())?,
    };

    if num >= game.level_count() {
        return Err(EditorError::unsupported(format!(
            "level {} is out of range ({} has {} levels)",
            id,
            match game {
                Game::Kirby => "Kirby's Dream Course",
                Game::SpecialTeeShot => "Special Tee Shot",
            },
            game.level_count()
        )));
    }
    Ok(num)
}

/// How a ROM is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// What to do with levels that cannot be read
    pub on_corrupt_level: Recovery,
    /// Also accept Special Tee Shot images
    pub allow_special_tee_shot: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            on_corrupt_level: Recovery::Abort,
            allow_special_tee_shot: false,
        }
    }
}

/// What a save writes besides the modified levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    pub write_music: bool,
    pub write_course_settings: bool,
    /// Fill out the last bank written so it is fully mapped
    pub pad_final_bank: bool,
    /// Rewrite every level, not just modified ones
    pub all_levels: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            write_music: true,
            write_course_settings: true,
            pad_final_bank: true,
            all_levels: false,
        }
    }
}

/// Outcome of [`Workspace::save`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub levels_written: usize,
    /// First free address after the level data
    pub end_address: u32,
    /// Levels whose playfield was truncated
    pub overflows: Vec<(usize, PlayfieldOverflow)>,
    /// Playfields were composed from the built-in fragment art rather than
    /// tables dumped from the game
    pub builtin_fragments: bool,
}

/// A ROM and its decoded contents
#[derive(Debug, Clone)]
pub struct Workspace {
    pub rom: RomFile,
    pub levels: Vec<Level>,
    /// Course graphics; not available for Special Tee Shot
    pub settings: Option<CourseSettings>,
}

impl Workspace {
    pub fn open(path: impl AsRef<Path>, options: &LoadOptions) -> EditorResult<Self> {
        let rom = RomFile::open(path, options.allow_special_tee_shot)?;
        Self::from_rom(rom, options)
    }

    pub fn from_rom(rom: RomFile, options: &LoadOptions) -> EditorResult<Self> {
        let store = LevelStore::default();
        let mut levels = store.load_all(&rom, |_, _| options.on_corrupt_level)?;

        let settings = match rom.game() {
            Game::Kirby => {
                course::read_music(&rom, &mut levels)?;
                Some(CourseSettings::read(&rom)?)
            }
            Game::SpecialTeeShot => None,
        };

        Ok(Self { rom, levels, settings })
    }

    pub fn game(&self) -> Game {
        self.rom.game()
    }

    fn level_index(&self, num: usize) -> EditorResult<usize> {
        if num < self.levels.len() {
            Ok(num)
        } else {
            Err(EditorError::unsupported(format!(
                "level {} does not exist (ROM has {})",
                num,
                self.levels.len()
            )))
        }
    }

    fn course_range(&self, course: usize) -> EditorResult<std::ops::Range<usize>> {
        let first = course * COURSE_LEVELS;
        if first + COURSE_LEVELS <= self.levels.len() {
            Ok(first..first + COURSE_LEVELS)
        } else {
            Err(EditorError::unsupported(format!("course {} does not exist", course + 1)))
        }
    }

    pub fn export_level(&self, num: usize) -> EditorResult<LevelFile> {
        let num = self.level_index(num)?;
        Ok(LevelFile::new(self.game(), self.levels[num].clone()))
    }

    /// Replace level `num` with an imported one
    pub fn import_level(&mut self, num: usize, file: LevelFile) -> EditorResult<()> {
        let num = self.level_index(num)?;
        if Game::from_file_id(file.game) != Some(self.game()) {
            log::warn!("importing a level made for a different game");
        }
        let mut level = file.level;
        level.modified = true;
        level.modified_recently = false;
        self.levels[num] = level;
        Ok(())
    }

    pub fn export_course(&self, course: usize) -> EditorResult<CourseFile> {
        self.course_range(course)?;
        let settings = self.settings.clone().unwrap_or_default();
        Ok(CourseFile::from_course(self.game(), course, &self.levels, &settings))
    }

    /// Replace the levels and graphics of `course`. Slots absent from the
    /// file keep their current level. Returns the slots that were skipped
    /// as unusable.
    pub fn import_course(&mut self, course: usize, import: CourseImport) -> EditorResult<Vec<usize>> {
        let range = self.course_range(course)?;
        let CourseImport { course: file, skipped } = import;

        for (slot, level) in self.levels[range].iter_mut().zip(file.levels) {
            if let Some(mut imported) = level {
                imported.modified = true;
                *slot = imported;
            }
        }
        if let Some(settings) = &mut self.settings {
            settings.set_course(course, file.background, file.palette, file.water);
        }

        log::info!("imported course {} ({} slots skipped)", course + 1, skipped.len());
        Ok(skipped)
    }

    /// Write modified levels and the requested tables back into the image
    pub fn save(&mut self, tables: &FragmentTables, options: &SaveOptions) -> EditorResult<SaveReport> {
        let store = LevelStore::new(tables);
        let saved = store.save_all(&mut self.rom, &mut self.levels, options.all_levels)?;
        let builtin_fragments = !saved.written.is_empty() && tables.is_builtin();
        if builtin_fragments {
            log::warn!(
                "{} levels were drawn with the built-in fragment art, which differs from the game's",
                saved.written.len()
            );
        }

        if options.pad_final_bank {
            self.rom.pad_to_bank(saved.end)?;
        }
        if options.write_music {
            course::write_music(&mut self.rom, &self.levels)?;
        }
        if options.write_course_settings {
            if let Some(settings) = &self.settings {
                settings.write(&mut self.rom)?;
            }
        }

        for level in &mut self.levels {
            level.modified_recently = false;
        }

        Ok(SaveReport {
            levels_written: saved.written.len(),
            end_address: saved.end,
            overflows: saved.overflows,
            builtin_fragments,
        })
    }

    /// Write the image to disk
    pub fn write(&self, path: impl AsRef<Path>) -> EditorResult<()> {
        self.rom.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{Region, Tile};
    use crate::rom::Version;
    use pretty_assertions::assert_eq;

    fn blank_workspace() -> Workspace {
        let rom = RomFile::blank(Version::KirbyUs, 0x10_0000, false);
        let options = LoadOptions {
            on_corrupt_level: Recovery::UseDefault,
            ..LoadOptions::default()
        };
        Workspace::from_rom(rom, &options).unwrap()
    }

    #[test]
    fn test_blank_rom_needs_recovery() {
        let rom = RomFile::blank(Version::KirbyUs, 0x10_0000, false);
        let result = Workspace::from_rom(rom, &LoadOptions::default());
        assert!(matches!(result, Err(EditorError::LevelLoad { level: 0, .. })));
    }

    #[test]
    fn test_save_and_reopen() {
        let mut workspace = blank_workspace();
        assert_eq!(workspace.levels.len(), 224);

        workspace.levels[9].raise_tiles(Region::new(2, 3, 4, 2)).unwrap();
        workspace.levels[9].music = 0x86;
        for level in &mut workspace.levels {
            level.modified = true;
        }
        let report = workspace
            .save(FragmentTables::builtin(), &SaveOptions::default())
            .unwrap();
        assert_eq!(report.levels_written, 224);
        assert!(report.overflows.is_empty());
        assert!(!workspace.levels[9].modified_recently);

        let reopened = Workspace::from_rom(workspace.rom.clone(), &LoadOptions::default()).unwrap();
        assert_eq!(reopened.levels[9].tiles, workspace.levels[9].tiles);
        assert_eq!(reopened.levels[9].music, 0x86);
        assert_eq!(reopened.levels[9].tiles[3][2], Tile::flat(0));
    }

    #[test]
    fn test_course_import_keeps_absent_slots() {
        let mut workspace = blank_workspace();
        workspace.levels[8].tiles[0][0] = Tile::flat(4);

        let mut exported = workspace.export_course(1).unwrap();
        assert_eq!(exported.levels[0].as_ref().unwrap().tiles[0][0], Tile::flat(4));
        exported.levels[0] = None;
        let mut replacement = Level::new(3, 3);
        replacement.tiles[1][1] = Tile::flat(2);
        exported.levels[1] = Some(replacement.clone());
        exported.palette = 5;

        let import = CourseFile::from_bytes(&exported.to_bytes()).unwrap();
        let skipped = workspace.import_course(1, import).unwrap();
        assert!(skipped.is_empty());
        assert_eq!(workspace.levels[8].tiles[0][0], Tile::flat(4));
        assert_eq!(workspace.levels[9].tiles, replacement.tiles);
        assert!(workspace.levels[9].modified);
        assert_eq!(workspace.settings.as_ref().unwrap().palette[1], 5);
    }

    #[test]
    fn test_builtin_fragments_reported() {
        let mut workspace = blank_workspace();
        let report = workspace
            .save(FragmentTables::builtin(), &SaveOptions::default())
            .unwrap();
        // nothing was modified, so nothing was drawn
        assert_eq!(report.levels_written, 0);
        assert!(!report.builtin_fragments);

        workspace.levels[3].raise_tiles(Region::new(0, 0, 2, 2)).unwrap();
        let copy = FragmentTables::builtin().clone();
        let report = workspace.save(&copy, &SaveOptions::default()).unwrap();
        assert_eq!(report.levels_written, 1);
        assert!(report.builtin_fragments);

        let mut dumped = copy;
        dumped.terrain[0].tiles[0][0] ^= 1;
        let report = workspace.save(&dumped, &SaveOptions::default()).unwrap();
        assert!(!report.builtin_fragments);
    }

    #[test]
    fn test_parse_level_id() {
        assert_eq!(parse_level_id("1-1", Game::Kirby).unwrap(), 0);
        assert_eq!(parse_level_id("3-5", Game::Kirby).unwrap(), 20);
        assert_eq!(parse_level_id("223", Game::Kirby).unwrap(), 223);
        assert!(parse_level_id("224", Game::Kirby).is_err());
        assert!(parse_level_id("0-1", Game::Kirby).is_err());
        assert!(parse_level_id("2-9", Game::Kirby).is_err());
        assert!(parse_level_id("10-1", Game::SpecialTeeShot).is_err());
        assert!(parse_level_id("hole", Game::Kirby).is_err());
    }

    #[test]
    fn test_missing_level() {
        let workspace = blank_workspace();
        assert!(workspace.export_level(224).is_err());
        assert!(workspace.export_course(28).is_err());
    }
}
