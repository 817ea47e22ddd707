//! Bank-aware placement of data chunks
//!
//! Chunks are laid out one after another starting at a running address.
//! A chunk never straddles a 32 KiB bank: if it does not fit in what is
//! left of the current bank, it starts at the next one.

use super::{BANK_SIZE, RomFile};
use crate::common::{EditorError, EditorResult};

/// Where a chunk was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Address of the first byte written
    pub start: u32,
    /// First free address after the chunk
    pub next: u32,
}

impl RomFile {
    fn address_of(&self, offset: u32) -> EditorResult<u32> {
        self.map.to_address(offset).ok_or(EditorError::BadOffset {
            offset: offset as usize,
        })
    }

    /// Write `data` at `address`, moving to the next bank when it would
    /// cross a bank boundary
    pub fn write_data(&mut self, address: u32, data: &[u8]) -> EditorResult<Placement> {
        if data.len() > BANK_SIZE as usize {
            return Err(EditorError::ChunkTooLarge { size: data.len() });
        }

        let mut offset = self
            .map
            .to_offset(address)
            .ok_or(EditorError::BadAddress { address })?;
        let space = self
            .map
            .bank_space(address)
            .ok_or(EditorError::BadAddress { address })?;
        if data.len() as u32 > space {
            offset += space;
        }

        let start = self.address_of(offset)?;
        self.write_bytes(start, data)?;
        let next = self.address_of(offset + data.len() as u32)?;

        log::debug!("placed {} bytes at {:#08x}", data.len(), start);
        Ok(Placement { start, next })
    }

    /// Write `data` via [`write_data`](Self::write_data), then store its
    /// final address as a long pointer at `pointer`.
    ///
    /// Returns the next free address.
    pub fn write_to_pointer(&mut self, pointer: u32, address: u32, data: &[u8]) -> EditorResult<u32> {
        let placement = self.write_data(address, data)?;
        self.write_pointer(pointer, placement.start)?;
        Ok(placement.next)
    }

    /// Extend the image to the end of the bank containing `address` so the
    /// last bank is fully mapped
    pub fn pad_to_bank(&mut self, address: u32) -> EditorResult<()> {
        let space = self
            .map
            .bank_space(address)
            .ok_or(EditorError::BadAddress { address })?;
        if space == BANK_SIZE {
            // already on a boundary
            return Ok(());
        }
        let last = self.address_of(self.offset(address)? as u32 + space - 1)?;
        if self.read_bytes(last, 1).is_err() {
            self.write_u8(last, 0)?;
        }
        Ok(())
    }
}
