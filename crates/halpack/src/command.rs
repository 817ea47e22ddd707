//! Command kinds and header encoding

use alloc::vec::Vec;

/// Longest run a short (one byte) header can describe
pub const SHORT_MAX_LEN: usize = 32;
/// Longest run any header can describe
pub const LONG_MAX_LEN: usize = 1024;

/// A single packed-stream command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Uncompressed bytes follow
    Literal = 0,
    /// One byte repeated
    Repeat8 = 1,
    /// Two bytes repeated
    Repeat16 = 2,
    /// Incrementing byte sequence
    Sequence = 3,
    /// Copy from earlier output
    CopyForward = 4,
    /// Copy from earlier output, bit-reversed
    CopyReversed = 5,
    /// Copy from earlier output, walking backwards
    CopyBackward = 6,
}

impl Command {
    /// Decode a 3-bit command field.
    ///
    /// Command 7 only exists in the long form and behaves like a forward copy.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 7 {
            0 => Command::Literal,
            1 => Command::Repeat8,
            2 => Command::Repeat16,
            3 => Command::Sequence,
            5 => Command::CopyReversed,
            6 => Command::CopyBackward,
            _ => Command::CopyForward,
        }
    }

    /// Size in bytes of the payload following the header
    pub fn payload_len(self, len: usize) -> usize {
        match self {
            Command::Literal => len,
            Command::Repeat8 | Command::Sequence => 1,
            Command::Repeat16
            | Command::CopyForward
            | Command::CopyReversed
            | Command::CopyBackward => 2,
        }
    }

    /// Whether this command reads from already decoded output
    pub fn is_copy(self) -> bool {
        matches!(
            self,
            Command::CopyForward | Command::CopyReversed | Command::CopyBackward
        )
    }
}

/// Size of a command header for a run of `len`
pub(crate) fn header_len(len: usize) -> usize {
    if len > SHORT_MAX_LEN { 2 } else { 1 }
}

/// Append a command header. `len` must be in `1..=LONG_MAX_LEN`.
pub(crate) fn push_header(out: &mut Vec<u8>, command: Command, len: usize) {
    debug_assert!((1..=LONG_MAX_LEN).contains(&len));
    let count = len - 1;
    let bits = command as u8;

    if len > SHORT_MAX_LEN {
        out.push(0xE0 | (bits << 2) | (count >> 8) as u8);
        out.push((count & 0xFF) as u8);
    } else {
        out.push((bits << 5) | count as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_short_header() {
        let mut out = Vec::new();
        push_header(&mut out, Command::Repeat8, 32);
        assert_eq!(out, vec![0x3F]);
    }

    #[test]
    fn test_long_header() {
        let mut out = Vec::new();
        push_header(&mut out, Command::CopyForward, 1024);
        assert_eq!(out, vec![0xF3, 0xFF]);

        out.clear();
        push_header(&mut out, Command::Literal, 33);
        assert_eq!(out, vec![0xE0, 0x20]);
    }

    #[test]
    fn test_long_form_never_collides_with_terminator() {
        let mut out = Vec::new();
        push_header(&mut out, Command::CopyBackward, LONG_MAX_LEN);
        assert_ne!(out[0], crate::END_OF_STREAM);
    }

    #[test]
    fn test_command_seven_is_forward_copy() {
        assert_eq!(Command::from_bits(7), Command::CopyForward);
        assert_eq!(Command::from_bits(2), Command::Repeat16);
    }
}
