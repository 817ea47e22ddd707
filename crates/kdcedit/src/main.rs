//! KDC Editor - level tool for Kirby's Dream Course ROMs
//!
//! Usage: kdcedit [OPTIONS] <COMMAND> <rom> ...

use anyhow::{Context, Result, bail};
use clap::{Args as ClapArgs, Parser, Subcommand};
use kdc_editor::game::course::BACKGROUNDS;
use kdc_editor::game::names;
use kdc_editor::level::{COURSE_LEVELS, CourseFile, LevelFile};
use kdc_editor::{
    FragmentTables, Game, LoadOptions, Recovery, SaveOptions, Workspace, parse_level_id,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser, Debug)]
#[command(name = "kdcedit")]
#[command(author = "KDCEdit Team")]
#[command(version)]
#[command(about = "Level editor for Kirby's Dream Course / Kirby Bowl ROMs", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the detected version and every level
    Info {
        rom: PathBuf,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Write one level to a .kdcl file
    ExportLevel {
        rom: PathBuf,
        /// Level as course-hole (e.g. 3-5) or 0-based index
        level: String,
        file: PathBuf,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Replace one level from a .kdcl file
    ImportLevel {
        rom: PathBuf,
        /// Level as course-hole (e.g. 3-5) or 0-based index
        level: String,
        file: PathBuf,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Write a course's eight levels and graphics to a .kdc file
    ExportCourse {
        rom: PathBuf,
        /// Course number, counted from 1
        course: usize,
        file: PathBuf,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Replace a course from a .kdc file
    ImportCourse {
        rom: PathBuf,
        /// Course number, counted from 1
        course: usize,
        file: PathBuf,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Regenerate and re-place level data
    Rebuild {
        rom: PathBuf,
        /// Rebuild every level, not only those needing it
        #[arg(long)]
        all: bool,
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct CommonArgs {
    /// Write the modified ROM here instead of over the input
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Substitute a blank level for any level that cannot be read
    #[arg(long)]
    keep_going: bool,

    /// Fragment table dump replacing the built-in composition tables
    #[arg(long)]
    fragments: Option<PathBuf>,

    /// Compose playfields with the built-in fragment art when no dump is given
    #[arg(long, conflicts_with = "fragments")]
    builtin_fragments: bool,

    /// Accept Special Tee Shot images (read-only)
    #[arg(long)]
    tee_shot: bool,
}

impl CommonArgs {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            on_corrupt_level: if self.keep_going {
                Recovery::UseDefault
            } else {
                Recovery::Abort
            },
            allow_special_tee_shot: self.tee_shot,
        }
    }

    fn open(&self, rom: &Path) -> Result<Workspace> {
        Workspace::open(rom, &self.load_options())
            .with_context(|| format!("failed to load {}", rom.display()))
    }

    fn fragments(&self) -> Result<Option<FragmentTables>> {
        let Some(path) = &self.fragments else {
            return Ok(None);
        };
        let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let tables = FragmentTables::from_bytes(&bytes)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(tables))
    }

    /// Save all pending changes and write the image out
    fn save(&self, workspace: &mut Workspace, rom: &Path, all_levels: bool) -> Result<()> {
        let loaded = self.fragments()?;
        let redraws = all_levels || workspace.levels.iter().any(|level| level.modified);
        if loaded.is_none() && redraws && !self.builtin_fragments {
            bail!(
                "saving levels needs the game's fragment tables: pass --fragments <dump> \
                 (or --builtin-fragments to use the editor's own art)"
            );
        }
        let tables: &FragmentTables = match &loaded {
            Some(tables) => tables,
            None => FragmentTables::builtin(),
        };
        let options = SaveOptions {
            all_levels,
            ..SaveOptions::default()
        };

        let report = workspace.save(tables, &options)?;
        if report.builtin_fragments {
            eprintln!(
                "warning: {} levels drawn with the built-in fragment art",
                report.levels_written
            );
        }
        for (level, overflow) in &report.overflows {
            eprintln!(
                "warning: level {} playfield truncated ({} of {} words)",
                level_label(*level),
                overflow.needed,
                overflow.capacity
            );
        }

        let output = self.output.as_deref().unwrap_or(rom);
        workspace
            .write(output)
            .with_context(|| format!("failed to write {}", output.display()))?;
        log::info!(
            "wrote {} levels, data ends at {:#08x}",
            report.levels_written,
            report.end_address
        );
        Ok(())
    }
}

fn main() {
    let args = Args::parse();

    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if let Err(e) = run(&args) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

fn level_label(num: usize) -> String {
    format!("{}-{}", num / COURSE_LEVELS + 1, num % COURSE_LEVELS + 1)
}

fn course_index(workspace: &Workspace, course: usize) -> Result<usize> {
    let count = workspace.game().course_count();
    if course == 0 || course > count {
        bail!("course {} is out of range (1-{})", course, count);
    }
    Ok(course - 1)
}

fn info(workspace: &Workspace) {
    let rom = &workspace.rom;
    println!("Version: {}", rom.version().name());
    println!(
        "Copier header: {}",
        if rom.address_map().headered() { "yes" } else { "no" }
    );
    println!("Size: {} bytes", rom.as_bytes().len());

    let game = workspace.game();
    for (course, levels) in workspace.levels.chunks(COURSE_LEVELS).enumerate() {
        println!();
        println!("{}", names::course_name(game, course).unwrap_or("(unnamed course)"));
        if let Some((bg, palette, water)) = workspace.settings.as_ref().and_then(|s| s.course(course)) {
            println!(
                "  {}, palette {}, water {}",
                BACKGROUNDS.get(usize::from(bg)).map_or("unknown background", |bg| bg.name),
                names::PALETTE_NAMES.get(usize::from(palette)).copied().unwrap_or("?"),
                water
            );
        }
        for (hole, level) in levels.iter().enumerate() {
            let num = course * COURSE_LEVELS + hole;
            print!(
                "  {:>5}  {:>2}x{:<2}  height {:>2}",
                level_label(num),
                level.width(),
                level.length(),
                level.max_height()
            );
            if game == Game::Kirby {
                print!(
                    "  music {:#04x} {}",
                    level.music,
                    names::music_name(level.music).unwrap_or("")
                );
            }
            println!();
        }
    }
}

fn run(args: &Args) -> Result<()> {
    match &args.command {
        Command::Info { rom, common } => {
            let workspace = common.open(rom)?;
            info(&workspace);
        }
        Command::ExportLevel { rom, level, file, common } => {
            let workspace = common.open(rom)?;
            let num = parse_level_id(level, workspace.game())?;
            let exported = workspace.export_level(num)?;
            fs::write(file, exported.to_bytes())
                .with_context(|| format!("failed to write {}", file.display()))?;
            log::info!("exported level {} to {}", level_label(num), file.display());
        }
        Command::ImportLevel { rom, level, file, common } => {
            let mut workspace = common.open(rom)?;
            let num = parse_level_id(level, workspace.game())?;
            let bytes = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
            let imported = LevelFile::from_bytes(&bytes)
                .with_context(|| format!("failed to parse {}", file.display()))?;
            workspace.import_level(num, imported)?;
            common.save(&mut workspace, rom, false)?;
        }
        Command::ExportCourse { rom, course, file, common } => {
            let workspace = common.open(rom)?;
            let course = course_index(&workspace, *course)?;
            let exported = workspace.export_course(course)?;
            fs::write(file, exported.to_bytes())
                .with_context(|| format!("failed to write {}", file.display()))?;
            log::info!("exported course {} to {}", course + 1, file.display());
        }
        Command::ImportCourse { rom, course, file, common } => {
            let mut workspace = common.open(rom)?;
            let course = course_index(&workspace, *course)?;
            let bytes = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
            let import = CourseFile::from_bytes(&bytes)
                .with_context(|| format!("failed to parse {}", file.display()))?;
            let skipped = workspace.import_course(course, import)?;
            for slot in skipped {
                eprintln!("warning: hole {} in {} was skipped", slot + 1, file.display());
            }
            common.save(&mut workspace, rom, false)?;
        }
        Command::Rebuild { rom, all, common } => {
            let mut workspace = common.open(rom)?;
            common.save(&mut workspace, rom, *all)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdc_editor::{Region, RomFile, Version};

    fn common(extra: &[&str]) -> CommonArgs {
        let mut argv = vec!["kdcedit", "rebuild", "in.sfc"];
        argv.extend_from_slice(extra);
        match Args::try_parse_from(argv).unwrap().command {
            Command::Rebuild { common, .. } => common,
            _ => unreachable!(),
        }
    }

    fn edited_workspace() -> Workspace {
        let rom = RomFile::blank(Version::KirbyUs, 0x10_0000, false);
        let options = LoadOptions {
            on_corrupt_level: Recovery::UseDefault,
            ..LoadOptions::default()
        };
        let mut workspace = Workspace::from_rom(rom, &options).unwrap();
        workspace.levels[0].raise_tiles(Region::new(0, 0, 3, 3)).unwrap();
        workspace
    }

    #[test]
    fn test_save_without_fragment_dump_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let rom = dir.path().join("course.sfc");
        let mut workspace = edited_workspace();

        let err = common(&[]).save(&mut workspace, &rom, false).unwrap_err();
        assert!(err.to_string().contains("--fragments"));
        assert!(!rom.exists());

        common(&["--builtin-fragments"]).save(&mut workspace, &rom, false).unwrap();
        assert!(rom.exists());
    }

    #[test]
    fn test_unmodified_save_needs_no_fragment_dump() {
        let dir = tempfile::tempdir().unwrap();
        let rom = dir.path().join("course.sfc");
        let rom_file = RomFile::blank(Version::KirbyUs, 0x10_0000, false);
        let options = LoadOptions {
            on_corrupt_level: Recovery::UseDefault,
            ..LoadOptions::default()
        };
        let mut workspace = Workspace::from_rom(rom_file, &options).unwrap();

        common(&[]).save(&mut workspace, &rom, false).unwrap();
        assert!(common(&[]).save(&mut workspace, &rom, true).is_err());
    }

    #[test]
    fn test_fragment_flags_conflict() {
        let argv = ["kdcedit", "rebuild", "in.sfc", "--fragments", "t.bin", "--builtin-fragments"];
        assert!(Args::try_parse_from(argv).is_err());
    }
}
