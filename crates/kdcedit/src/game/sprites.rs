//! Obstacle sprite lookup
//!
//! Maps obstacle codes to a frame on one of the editor's sprite sheets
//! through a sorted table of disjoint code ranges.

use std::cmp::Ordering;

/// Sprite sheets obstacle frames are cut from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteSheet {
    Bounce,
    Bumpers,
    Conveyor,
    Dedede,
    Enemies,
    Gordo,
    Movers,
    Player,
    Rotate,
    Switches,
    Traps,
    Warps,
    Water,
}

/// A single frame on a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub sheet: SpriteSheet,
    pub frame: u8,
}

#[derive(Debug, Clone, Copy)]
enum Frame {
    /// Same frame for the whole range
    Fixed(u8),
    /// `code - first + base`
    Linear(u8),
    /// Low bit of the code (rotation direction)
    Parity,
}

#[derive(Debug, Clone, Copy)]
struct SpriteRange {
    first: u8,
    last: u8,
    sheet: SpriteSheet,
    frame: Frame,
}

const fn range(first: u8, last: u8, sheet: SpriteSheet, frame: Frame) -> SpriteRange {
    SpriteRange { first, last, sheet, frame }
}

/// Sorted by `first`, no overlaps
const RANGES: [SpriteRange; 19] = [
    range(0x02, 0x02, SpriteSheet::Enemies, Frame::Fixed(0)),
    range(0x04, 0x04, SpriteSheet::Traps, Frame::Fixed(0)),
    range(0x05, 0x05, SpriteSheet::Traps, Frame::Fixed(1)),
    range(0x0C, 0x0C, SpriteSheet::Player, Frame::Fixed(0)),
    range(0x0D, 0x0D, SpriteSheet::Dedede, Frame::Fixed(0)),
    range(0x10, 0x1D, SpriteSheet::Movers, Frame::Linear(0)),
    range(0x20, 0x24, SpriteSheet::Bounce, Frame::Linear(0)),
    range(0x28, 0x2D, SpriteSheet::Bumpers, Frame::Linear(4)),
    range(0x30, 0x3B, SpriteSheet::Conveyor, Frame::Linear(0)),
    range(0x40, 0x52, SpriteSheet::Enemies, Frame::Linear(1)),
    range(0x57, 0x57, SpriteSheet::Enemies, Frame::Fixed(0x14)),
    range(0x58, 0x5D, SpriteSheet::Switches, Frame::Linear(0)),
    range(0x61, 0x6F, SpriteSheet::Water, Frame::Linear(0)),
    range(0x70, 0x7B, SpriteSheet::Rotate, Frame::Parity),
    range(0x80, 0x97, SpriteSheet::Gordo, Frame::Linear(0)),
    range(0xAC, 0xAE, SpriteSheet::Enemies, Frame::Linear(0x15)),
    range(0xB0, 0xB9, SpriteSheet::Warps, Frame::Linear(0)),
    range(0xC0, 0xC2, SpriteSheet::Dedede, Frame::Linear(1)),
    // Kirby standing on the starting line uses the player sprite
    range(0xC3, 0xC3, SpriteSheet::Player, Frame::Fixed(0)),
];

/// Sprite for an obstacle code, or `None` for codes drawn without one
pub fn sprite_for(obstacle: u8) -> Option<Sprite> {
    let index = RANGES
        .binary_search_by(|r| {
            if r.last < obstacle {
                Ordering::Less
            } else if r.first > obstacle {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
        .ok()?;
    let r = RANGES[index];
    let frame = match r.frame {
        Frame::Fixed(frame) => frame,
        Frame::Linear(base) => obstacle - r.first + base,
        Frame::Parity => obstacle & 1,
    };
    Some(Sprite { sheet: r.sheet, frame })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_sorted_and_disjoint() {
        for r in RANGES {
            assert!(r.first <= r.last);
        }
        for pair in RANGES.windows(2) {
            assert!(pair[0].last < pair[1].first);
        }
    }

    #[test]
    fn test_frames() {
        let enemy = |frame| Some(Sprite { sheet: SpriteSheet::Enemies, frame });
        assert_eq!(sprite_for(0x02), enemy(0));
        assert_eq!(sprite_for(0x40), enemy(1));
        assert_eq!(sprite_for(0x52), enemy(0x13));
        assert_eq!(sprite_for(0x57), enemy(0x14));
        assert_eq!(sprite_for(0xAD), enemy(0x16));

        assert_eq!(
            sprite_for(0x2A),
            Some(Sprite { sheet: SpriteSheet::Bumpers, frame: 6 })
        );
        assert_eq!(
            sprite_for(0x77),
            Some(Sprite { sheet: SpriteSheet::Rotate, frame: 1 })
        );
        assert_eq!(
            sprite_for(0xC2),
            Some(Sprite { sheet: SpriteSheet::Dedede, frame: 3 })
        );
        assert_eq!(sprite_for(0xC3).map(|s| s.sheet), Some(SpriteSheet::Player));
    }

    #[test]
    fn test_codes_without_sprites() {
        for code in [0x00, 0x03, 0x08, 0x1E, 0x60, 0x98, 0xA1, 0xBA, 0xC4, 0xFF] {
            assert_eq!(sprite_for(code), None, "code {code:#04x}");
        }
    }

    #[test]
    fn test_every_character_has_a_sprite() {
        for code in 0..=u8::MAX {
            if crate::game::obstacle::is_character(code) {
                assert!(sprite_for(code).is_some(), "code {code:#04x}");
            }
        }
    }
}
