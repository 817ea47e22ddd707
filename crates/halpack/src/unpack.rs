//! Stream decoder

use alloc::vec::Vec;
use core::fmt;

use crate::command::Command;
use crate::{END_OF_STREAM, MAX_UNPACKED_SIZE};

/// Result of decoding a packed stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unpacked {
    /// Decoded bytes
    pub data: Vec<u8>,
    /// Number of input bytes consumed, including the terminator
    pub packed_len: usize,
}

/// Errors produced while decoding a packed stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnpackError {
    /// Input ended before a terminator or inside a command
    Truncated { position: usize },
    /// A copy command referenced bytes that have not been decoded yet
    BadReference { position: usize, offset: usize },
    /// Output would grow past [`MAX_UNPACKED_SIZE`]
    TooLarge,
}

impl fmt::Display for UnpackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnpackError::Truncated { position } => {
                write!(f, "packed data truncated at byte {position}")
            }
            UnpackError::BadReference { position, offset } => {
                write!(f, "copy at byte {position} references undecoded offset {offset:#06x}")
            }
            UnpackError::TooLarge => {
                write!(f, "unpacked data exceeds {MAX_UNPACKED_SIZE} bytes")
            }
        }
    }
}

impl core::error::Error for UnpackError {}

struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn byte(&mut self) -> Result<u8, UnpackError> {
        let b = *self
            .input
            .get(self.pos)
            .ok_or(UnpackError::Truncated { position: self.pos })?;
        self.pos += 1;
        Ok(b)
    }

    fn offset(&mut self) -> Result<usize, UnpackError> {
        let hi = self.byte()?;
        let lo = self.byte()?;
        Ok(usize::from(u16::from_be_bytes([hi, lo])))
    }
}

/// Decode a packed stream.
///
/// Decoding stops at the first `0xFF` command byte; anything after it is
/// ignored, so callers may pass a slice running to the end of the ROM.
pub fn unpack(input: &[u8]) -> Result<Unpacked, UnpackError> {
    let mut reader = Reader { input, pos: 0 };
    let mut out: Vec<u8> = Vec::new();

    loop {
        let start = reader.pos;
        let head = reader.byte()?;
        if head == END_OF_STREAM {
            break;
        }

        let (command, len) = if head & 0xE0 == 0xE0 {
            let low = reader.byte()?;
            let len = ((usize::from(head & 0x03) << 8) | usize::from(low)) + 1;
            (Command::from_bits(head >> 2), len)
        } else {
            (Command::from_bits(head >> 5), usize::from(head & 0x1F) + 1)
        };

        let produced = if command == Command::Repeat16 { len * 2 } else { len };
        if out.len() + produced > MAX_UNPACKED_SIZE {
            return Err(UnpackError::TooLarge);
        }

        match command {
            Command::Literal => {
                for _ in 0..len {
                    out.push(reader.byte()?);
                }
            }
            Command::Repeat8 => {
                let b = reader.byte()?;
                out.resize(out.len() + len, b);
            }
            Command::Repeat16 => {
                let a = reader.byte()?;
                let b = reader.byte()?;
                for _ in 0..len {
                    out.push(a);
                    out.push(b);
                }
            }
            Command::Sequence => {
                let mut b = reader.byte()?;
                for _ in 0..len {
                    out.push(b);
                    b = b.wrapping_add(1);
                }
            }
            Command::CopyForward | Command::CopyReversed => {
                let offset = reader.offset()?;
                if offset >= out.len() {
                    return Err(UnpackError::BadReference { position: start, offset });
                }
                for i in 0..len {
                    // source may run into bytes produced by this same command
                    let b = out[offset + i];
                    out.push(if command == Command::CopyReversed { b.reverse_bits() } else { b });
                }
            }
            Command::CopyBackward => {
                let offset = reader.offset()?;
                if offset >= out.len() || offset + 1 < len {
                    return Err(UnpackError::BadReference { position: start, offset });
                }
                for i in 0..len {
                    let b = out[offset - i];
                    out.push(b);
                }
            }
        }
    }

    Ok(Unpacked { data: out, packed_len: reader.pos })
}
