//! # halpack - HAL Laboratory LZ codec
//!
//! The compression format used by HAL Laboratory's SNES titles for level
//! geometry, tilemaps and graphics.
//!
//! ## Format
//!
//! A packed stream is a sequence of commands terminated by `0xFF`. Each
//! command starts with a header byte:
//!
//! - `ccclllll` - command `c`, length `l + 1` (1..=32)
//! - `111cccll llllllll` - long form, command `c`, length `l + 1` (1..=1024)
//!
//! | Command | Payload | Output |
//! |---------|---------|--------|
//! | 0 | `n` bytes | the bytes, verbatim |
//! | 1 | 1 byte | the byte repeated `n` times |
//! | 2 | 2 bytes | the pair repeated `n` times |
//! | 3 | 1 byte | `b, b+1, b+2, ...` (`n` bytes) |
//! | 4 | 16-bit offset (big endian) | `n` bytes copied forward from earlier output |
//! | 5 | 16-bit offset | `n` bytes copied forward, each bit-reversed |
//! | 6 | 16-bit offset | `n` bytes copied backward from earlier output |
//!
//! Output is capped at [`MAX_UNPACKED_SIZE`] bytes.
//!
//! ## Example
//!
//! ```
//! let data = [7u8; 300];
//! let packed = halpack::pack(&data);
//! assert!(packed.len() < data.len());
//!
//! let unpacked = halpack::unpack(&packed).unwrap();
//! assert_eq!(unpacked.data, data);
//! assert_eq!(unpacked.packed_len, packed.len());
//! ```

#![no_std]

extern crate alloc;

mod command;
mod pack;
mod unpack;

pub use command::Command;
pub use pack::pack;
pub use unpack::{UnpackError, Unpacked, unpack};

/// Largest buffer a single stream can decode to
pub const MAX_UNPACKED_SIZE: usize = 0x10000;

/// Byte that ends every packed stream
pub const END_OF_STREAM: u8 = 0xFF;
