//! Game and version identification, and per-version ROM tables

use std::fmt;

/// Game family a ROM belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Game {
    /// Kirby Bowl / Kirby's Dream Course
    Kirby,
    /// Special Tee Shot (Satellaview)
    SpecialTeeShot,
}

impl Game {
    /// Number of levels stored in the ROM
    pub fn level_count(self) -> usize {
        match self {
            Game::Kirby => 28 * 8,
            Game::SpecialTeeShot => 9 * 8,
        }
    }

    /// Number of eight-hole courses
    pub fn course_count(self) -> usize {
        self.level_count() / 8
    }

    /// Identifier byte used in exported level and course files
    pub fn file_id(self) -> u8 {
        match self {
            Game::Kirby => 0,
            Game::SpecialTeeShot => 1,
        }
    }

    pub fn from_file_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Game::Kirby),
            1 => Some(Game::SpecialTeeShot),
            _ => None,
        }
    }
}

/// Specific ROM release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    /// Kirby Bowl (Japan)
    KirbyJapan,
    /// Kirby's Dream Course (North America and Europe share a layout)
    KirbyUs,
    /// Special Tee Shot (Japan)
    SpecialTeeShot,
}

/// The eleven per-level data chunks, in save order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    Header,
    Terrain,
    Obstacle,
    Height,
    Flags,
    RowStart,
    RowEnd,
    RowOffset,
    Layer1,
    Layer2,
    Clipping,
}

impl ChunkKind {
    pub const ALL: [ChunkKind; 11] = [
        ChunkKind::Header,
        ChunkKind::Terrain,
        ChunkKind::Obstacle,
        ChunkKind::Height,
        ChunkKind::Flags,
        ChunkKind::RowStart,
        ChunkKind::RowEnd,
        ChunkKind::RowOffset,
        ChunkKind::Layer1,
        ChunkKind::Layer2,
        ChunkKind::Clipping,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChunkKind::Header => "header",
            ChunkKind::Terrain => "terrain",
            ChunkKind::Obstacle => "obstacle",
            ChunkKind::Height => "height",
            ChunkKind::Flags => "flags",
            ChunkKind::RowStart => "row start",
            ChunkKind::RowEnd => "row end",
            ChunkKind::RowOffset => "row offset",
            ChunkKind::Layer1 => "layer 1",
            ChunkKind::Layer2 => "layer 2",
            ChunkKind::Clipping => "clipping",
        }
    }
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signatures checked when opening a ROM, in order
pub(crate) const SIGNATURES: [(u32, &[u8; 6], Version); 3] = [
    (0x8ECE, b"ninten", Version::KirbyJapan),
    (0x8ECC, b"ninten", Version::KirbyUs),
    // ROM title; may have been edited, so only checked on request
    (0xFFC0, b"\xBD\xCD\xDF\xBC\xAC\xD9", Version::SpecialTeeShot),
];

impl Version {
    pub fn game(self) -> Game {
        match self {
            Version::KirbyJapan | Version::KirbyUs => Game::Kirby,
            Version::SpecialTeeShot => Game::SpecialTeeShot,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Version::KirbyJapan => "Kirby Bowl (JP)",
            Version::KirbyUs => "Kirby's Dream Course (US/EU)",
            Version::SpecialTeeShot => "Special Tee Shot (JP)",
        }
    }

    /// Base address of the 3-byte pointer table for a chunk kind
    ///
    /// Special Tee Shot stores header fields in separate tables and has no
    /// header pointer table.
    pub fn chunk_table(self, kind: ChunkKind) -> Option<u32> {
        use ChunkKind as K;
        let table = match (self, kind) {
            (Version::KirbyJapan, K::Header) => 0x8A_A670,
            (Version::KirbyJapan, K::Terrain) => 0x8A_A970,
            (Version::KirbyJapan, K::Obstacle) => 0x8A_AC70,
            (Version::KirbyJapan, K::Height) => 0x8A_AF70,
            (Version::KirbyJapan, K::Flags) => 0x8A_B270,
            (Version::KirbyJapan, K::RowStart) => 0x8A_B570,
            (Version::KirbyJapan, K::RowEnd) => 0x8A_B870,
            (Version::KirbyJapan, K::RowOffset) => 0x8A_BB70,
            (Version::KirbyJapan, K::Layer1) => 0x8A_BE70,
            (Version::KirbyJapan, K::Layer2) => 0x8A_C170,
            (Version::KirbyJapan, K::Clipping) => 0x8A_C470,

            (Version::KirbyUs, K::Header) => 0x88_A770,
            (Version::KirbyUs, K::Terrain) => 0x88_AA70,
            (Version::KirbyUs, K::Obstacle) => 0x88_AD70,
            (Version::KirbyUs, K::Height) => 0x88_B070,
            (Version::KirbyUs, K::Flags) => 0x88_B370,
            (Version::KirbyUs, K::RowStart) => 0x88_B670,
            (Version::KirbyUs, K::RowEnd) => 0x88_B970,
            (Version::KirbyUs, K::RowOffset) => 0x88_BC70,
            (Version::KirbyUs, K::Layer1) => 0x88_BF70,
            (Version::KirbyUs, K::Layer2) => 0x88_C270,
            (Version::KirbyUs, K::Clipping) => 0x88_C570,

            (Version::SpecialTeeShot, K::Header) => return None,
            (Version::SpecialTeeShot, K::Terrain) => 0x85_DA80,
            (Version::SpecialTeeShot, K::Obstacle) => 0x85_DD08,
            (Version::SpecialTeeShot, K::Height) => 0x85_DB58,
            (Version::SpecialTeeShot, K::Flags) => 0x85_DC30,
            (Version::SpecialTeeShot, K::RowStart) => 0x85_DDE0,
            (Version::SpecialTeeShot, K::RowEnd) => 0x85_DEB8,
            (Version::SpecialTeeShot, K::RowOffset) => 0x85_DF90,
            (Version::SpecialTeeShot, K::Layer1) => 0x85_E068,
            (Version::SpecialTeeShot, K::Layer2) => 0x85_E140,
            (Version::SpecialTeeShot, K::Clipping) => 0x85_E218,
        };
        Some(table)
    }

    /// Address of the pointer to chunk `kind` of level `level`
    pub fn chunk_pointer(self, kind: ChunkKind, level: usize) -> Option<u32> {
        self.chunk_table(kind).map(|table| table + 3 * level as u32)
    }

    /// Start of the free area rewritten levels are placed in
    pub fn data_area(self) -> u32 {
        match self {
            Version::KirbyJapan => 0xA8_8000,
            Version::KirbyUs | Version::SpecialTeeShot => 0xA0_8000,
        }
    }

    /// Width and length byte tables (Special Tee Shot only), stride 2
    pub fn size_tables(self) -> Option<(u32, u32)> {
        match self {
            Version::SpecialTeeShot => Some((0x85_FA26, 0x85_FAB6)),
            _ => None,
        }
    }

    /// Whether music id 0x83 exists (it was removed outside Japan)
    pub fn has_opening_demo_track(self) -> bool {
        self == Version::KirbyJapan
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_counts() {
        assert_eq!(Game::Kirby.level_count(), 224);
        assert_eq!(Game::SpecialTeeShot.course_count(), 9);
    }

    #[test]
    fn test_chunk_pointer() {
        assert_eq!(
            Version::KirbyUs.chunk_pointer(ChunkKind::Terrain, 10),
            Some(0x88_AA70 + 30)
        );
        assert_eq!(Version::SpecialTeeShot.chunk_pointer(ChunkKind::Header, 0), None);
    }

    #[test]
    fn test_tables_are_disjoint() {
        for version in [Version::KirbyJapan, Version::KirbyUs] {
            let bases: Vec<u32> = ChunkKind::ALL
                .iter()
                .filter_map(|&k| version.chunk_table(k))
                .collect();
            for pair in bases.windows(2) {
                assert_eq!(pair[1] - pair[0], 3 * 256);
            }
        }
    }
}
