//! LoROM address translation
//!
//! The games are mapped as "fast" LoROM: every 32 KiB page of the file shows
//! up in the upper half of a bank starting at `$80:8000`. A 512-byte copier
//! header, when present, sits in front of the first page.

/// Size of one ROM bank as seen in the file
pub const BANK_SIZE: u32 = 0x8000;

/// Size of a copier header
pub const COPIER_HEADER_SIZE: u32 = 0x200;

/// Largest file offset (excluding any header) LoROM can map
const MAX_MAPPED_OFFSET: u32 = 0x40_0000;

/// Converts between file offsets and CPU addresses for one ROM image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddressMap {
    headered: bool,
}

impl AddressMap {
    pub fn new(headered: bool) -> Self {
        Self { headered }
    }

    /// Guess the header state from the file size
    pub fn detect(file_len: usize) -> Self {
        Self::new(file_len % BANK_SIZE as usize == COPIER_HEADER_SIZE as usize)
    }

    /// Whether the image carries a copier header
    pub fn headered(&self) -> bool {
        self.headered
    }

    fn header_len(&self) -> u32 {
        if self.headered { COPIER_HEADER_SIZE } else { 0 }
    }

    /// Convert a file offset to a CPU address.
    ///
    /// Returns `None` for offsets past the mapped range or inside the copier
    /// header. Offsets from 0x400000 up are refused rather than folded onto
    /// lower banks by the bit mask.
    pub fn to_address(&self, offset: u32) -> Option<u32> {
        if offset >= 0x80_0000 {
            return None;
        }
        let offset = offset.checked_sub(self.header_len())?;
        if offset >= MAX_MAPPED_OFFSET {
            return None;
        }
        Some((offset & 0x7FFF) | 0x8000 | ((offset & 0x3F_8000) << 1) | 0x80_0000)
    }

    /// Convert a CPU address to a file offset.
    ///
    /// Returns `None` for addresses in the lower half of a bank, which
    /// LoROM does not map to cartridge ROM. The bit mask alone would alias
    /// them onto the upper half.
    pub fn to_offset(&self, address: u32) -> Option<u32> {
        if address & 0x8000 == 0 {
            return None;
        }
        Some(((address & 0x7FFF) | ((address & 0x7F_0000) >> 1)) + self.header_len())
    }

    /// Bytes left in the bank containing `address`
    pub fn bank_space(&self, address: u32) -> Option<u32> {
        let offset = self.to_offset(address)? - self.header_len();
        Some(BANK_SIZE - offset % BANK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unheadered_mapping() {
        let map = AddressMap::new(false);
        assert_eq!(map.to_address(0), Some(0x80_8000));
        assert_eq!(map.to_address(0x7FFF), Some(0x80_FFFF));
        assert_eq!(map.to_address(0x8000), Some(0x81_8000));
        assert_eq!(map.to_address(0x12_3456), Some(0xA4_B456));
        assert_eq!(map.to_offset(0x8A_A670), Some(0x05_2670));
    }

    #[test]
    fn test_headered_mapping() {
        let map = AddressMap::new(true);
        assert_eq!(map.to_address(0x1FF), None);
        assert_eq!(map.to_address(0x200), Some(0x80_8000));
        assert_eq!(map.to_offset(0x80_8000), Some(0x200));
    }

    #[test]
    fn test_invalid_values() {
        let map = AddressMap::new(false);
        assert_eq!(map.to_address(0x80_0000), None);
        assert_eq!(map.to_address(0x40_0000), None);
        assert_eq!(map.to_offset(0x80_1234), None);

        let map = AddressMap::new(true);
        assert_eq!(map.to_address(0x1FF), None);
        assert_eq!(map.to_address(0x40_0200), None);
        assert_eq!(map.to_address(0x40_01FF), Some(0xFF_FFFF));
    }

    #[test]
    fn test_round_trip_every_bank() {
        for headered in [false, true] {
            let map = AddressMap::new(headered);
            let base = map.header_len();
            for bank in 0..0x80u32 {
                for offset in [0, 1, 0x3FFF, 0x7FFE, 0x7FFF] {
                    let offset = base + bank * BANK_SIZE + offset;
                    let address = map.to_address(offset).unwrap();
                    assert_eq!(map.to_offset(address), Some(offset));
                }
            }
        }
    }

    #[test]
    fn test_header_detection() {
        assert!(AddressMap::detect(0x10_0200).headered());
        assert!(!AddressMap::detect(0x10_0000).headered());
    }

    #[test]
    fn test_bank_space() {
        let map = AddressMap::new(true);
        assert_eq!(map.bank_space(0xA0_8000), Some(0x8000));
        assert_eq!(map.bank_space(0xA0_FFF0), Some(0x10));
    }
}
