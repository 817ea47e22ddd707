//! ROM image access
//!
//! A [`RomFile`] holds the whole image in memory. Reads and writes are
//! addressed by CPU address and translated through an [`AddressMap`], so
//! callers never see copier headers or file offsets.

mod address;
mod allocator;
mod version;

pub use address::{AddressMap, BANK_SIZE, COPIER_HEADER_SIZE};
pub use allocator::Placement;
pub use version::{ChunkKind, Game, Version};

use crate::common::{EditorError, EditorResult};
use std::fs;
use std::path::Path;

/// Loaded ROM image
#[derive(Debug, Clone)]
pub struct RomFile {
    data: Vec<u8>,
    map: AddressMap,
    version: Version,
}

impl RomFile {
    /// Read and identify a ROM image from disk
    pub fn open(path: impl AsRef<Path>, allow_special_tee_shot: bool) -> EditorResult<Self> {
        let data = fs::read(path)?;
        Self::from_bytes(data, allow_special_tee_shot)
    }

    /// Identify a ROM image held in memory.
    ///
    /// Special Tee Shot is only recognised by its (editable) title, so it is
    /// matched only when `allow_special_tee_shot` is set.
    pub fn from_bytes(data: Vec<u8>, allow_special_tee_shot: bool) -> EditorResult<Self> {
        let map = AddressMap::detect(data.len());

        for (address, signature, version) in version::SIGNATURES {
            if version == Version::SpecialTeeShot && !allow_special_tee_shot {
                continue;
            }
            let found = map
                .to_offset(address)
                .and_then(|offset| data.get(offset as usize..offset as usize + signature.len()));
            if found == Some(&signature[..]) {
                log::info!(
                    "detected {} ({} bytes{})",
                    version,
                    data.len(),
                    if map.headered() { ", headered" } else { "" }
                );
                return Ok(Self { data, map, version });
            }
        }

        Err(EditorError::invalid_rom(
            "not a Kirby Bowl or Kirby's Dream Course ROM",
        ))
    }

    /// Create a zero-filled image of `len` bytes carrying the signature for
    /// `version`
    pub fn blank(version: Version, len: usize, headered: bool) -> Self {
        let map = AddressMap::new(headered);
        let header = if headered { COPIER_HEADER_SIZE as usize } else { 0 };
        let mut data = vec![0; len + header];

        for (address, signature, v) in version::SIGNATURES {
            if v == version {
                if let Some(offset) = map.to_offset(address) {
                    let offset = offset as usize;
                    data[offset..offset + signature.len()].copy_from_slice(signature);
                }
                break;
            }
        }

        Self { data, map, version }
    }

    /// Write the image back to disk
    pub fn save(&self, path: impl AsRef<Path>) -> EditorResult<()> {
        fs::write(path, &self.data)?;
        Ok(())
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn game(&self) -> Game {
        self.version.game()
    }

    pub fn address_map(&self) -> AddressMap {
        self.map
    }

    /// Raw image bytes, including any copier header
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, address: u32) -> EditorResult<usize> {
        self.map
            .to_offset(address)
            .map(|offset| offset as usize)
            .ok_or(EditorError::BadAddress { address })
    }

    /// Borrow `len` bytes starting at `address`
    pub fn read_bytes(&self, address: u32, len: usize) -> EditorResult<&[u8]> {
        let offset = self.offset(address)?;
        self.data
            .get(offset..offset + len)
            .ok_or(EditorError::ReadPastEnd { address, len })
    }

    pub fn read_u8(&self, address: u32) -> EditorResult<u8> {
        Ok(self.read_bytes(address, 1)?[0])
    }

    /// Read a little-endian word
    pub fn read_u16(&self, address: u32) -> EditorResult<u16> {
        let bytes = self.read_bytes(address, 2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a 3-byte little-endian long pointer
    pub fn read_pointer(&self, address: u32) -> EditorResult<u32> {
        let bytes = self.read_bytes(address, 3)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]))
    }

    /// Decompress the stream starting at `address`
    pub fn read_packed(&self, address: u32) -> EditorResult<Vec<u8>> {
        let offset = self.offset(address)?;
        let input = self
            .data
            .get(offset..)
            .ok_or(EditorError::ReadPastEnd { address, len: 1 })?;
        let unpacked =
            halpack::unpack(input).map_err(|source| EditorError::Unpack { address, source })?;
        Ok(unpacked.data)
    }

    /// Follow the long pointer at `pointer` and decompress what it points to
    pub fn read_packed_from_pointer(&self, pointer: u32) -> EditorResult<Vec<u8>> {
        let address = self.read_pointer(pointer)?;
        self.read_packed(address)
    }

    /// Write bytes at `address`, growing the image if needed
    pub fn write_bytes(&mut self, address: u32, bytes: &[u8]) -> EditorResult<()> {
        let offset = self.offset(address)?;
        let end = offset + bytes.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    pub fn write_u8(&mut self, address: u32, value: u8) -> EditorResult<()> {
        self.write_bytes(address, &[value])
    }

    pub fn write_u16(&mut self, address: u32, value: u16) -> EditorResult<()> {
        self.write_bytes(address, &value.to_le_bytes())
    }

    /// Write a 3-byte long pointer
    pub fn write_pointer(&mut self, address: u32, target: u32) -> EditorResult<()> {
        self.write_bytes(address, &target.to_le_bytes()[..3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_versions() {
        for version in [Version::KirbyJapan, Version::KirbyUs] {
            for headered in [false, true] {
                let rom = RomFile::blank(version, 0x10_0000, headered);
                let reopened = RomFile::from_bytes(rom.as_bytes().to_vec(), false).unwrap();
                assert_eq!(reopened.version(), version);
                assert_eq!(reopened.address_map().headered(), headered);
            }
        }
    }

    #[test]
    fn test_special_tee_shot_needs_opt_in() {
        let rom = RomFile::blank(Version::SpecialTeeShot, 0x10_0000, false);
        let bytes = rom.as_bytes().to_vec();
        assert!(RomFile::from_bytes(bytes.clone(), false).is_err());
        assert_eq!(
            RomFile::from_bytes(bytes, true).unwrap().game(),
            Game::SpecialTeeShot
        );
    }

    #[test]
    fn test_reject_unknown_image() {
        let err = RomFile::from_bytes(vec![0; 0x8000], false).unwrap_err();
        assert!(matches!(err, EditorError::InvalidRom { .. }));
    }

    #[test]
    fn test_pointer_round_trip() {
        let mut rom = RomFile::blank(Version::KirbyUs, 0x10_0000, true);
        rom.write_pointer(0x88_AA70, 0xA0_8123).unwrap();
        assert_eq!(rom.read_pointer(0x88_AA70).unwrap(), 0xA0_8123);
        assert_eq!(rom.read_u16(0x88_AA70).unwrap(), 0x8123);
    }

    #[test]
    fn test_write_grows_image() {
        let mut rom = RomFile::blank(Version::KirbyUs, 0x10_0000, false);
        rom.write_u8(0xA0_8000, 0x42).unwrap();
        assert_eq!(rom.as_bytes().len(), 0x10_0001);
        assert_eq!(rom.read_u8(0xA0_8000).unwrap(), 0x42);
    }

    #[test]
    fn test_packed_read() {
        let mut rom = RomFile::blank(Version::KirbyUs, 0x10_0000, false);
        let payload: Vec<u8> = (0..200u8).map(|i| i / 10).collect();
        rom.write_bytes(0x9F_8000, &halpack::pack(&payload)).unwrap();
        rom.write_pointer(0x88_AA70, 0x9F_8000).unwrap();
        assert_eq!(rom.read_packed_from_pointer(0x88_AA70).unwrap(), payload);
    }
}
