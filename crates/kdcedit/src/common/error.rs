//! Error types

use thiserror::Error;

/// Editor error
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Invalid ROM: {message}")]
    InvalidRom { message: String },

    #[error("Address {address:#08x} is not a mapped ROM address")]
    BadAddress { address: u32 },

    #[error("File offset {offset:#x} cannot be mapped to a ROM address")]
    BadOffset { offset: usize },

    #[error("Read of {len} bytes at {address:#08x} runs past the end of the ROM")]
    ReadPastEnd { address: u32, len: usize },

    #[error("Compressed data at {address:#08x} is corrupt: {source}")]
    Unpack {
        address: u32,
        source: halpack::UnpackError,
    },

    #[error("Chunk of {size} bytes is larger than a ROM bank")]
    ChunkTooLarge { size: usize },

    #[error("Unable to load level {}-{}: {source}", .level / 8 + 1, .level % 8 + 1)]
    LevelLoad {
        level: usize,
        source: LevelLoadError,
    },

    #[error("Invalid level file: {message}")]
    LevelFile { message: String },

    #[error("Invalid course file: {message}")]
    CourseFile { message: String },

    #[error("Invalid fragment table: {message}")]
    Fragments { message: String },

    #[error("Unsupported: {message}")]
    Unsupported { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditorError {
    pub fn invalid_rom(message: impl Into<String>) -> Self {
        Self::InvalidRom {
            message: message.into(),
        }
    }

    pub fn level_file(message: impl Into<String>) -> Self {
        Self::LevelFile {
            message: message.into(),
        }
    }

    pub fn course_file(message: impl Into<String>) -> Self {
        Self::CourseFile {
            message: message.into(),
        }
    }

    pub fn fragments(message: impl Into<String>) -> Self {
        Self::Fragments {
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }
}

pub type EditorResult<T> = Result<T, EditorError>;

/// Reasons a single level could not be read from the ROM
///
/// These are recoverable: the caller may abort the whole load or substitute
/// a blank grid for the level and carry on.
#[derive(Error, Debug)]
pub enum LevelLoadError {
    #[error("header pointer could not be read ({0})")]
    Header(Box<EditorError>),

    #[error("level size {width}x{length} exceeds the editable area")]
    Size { width: u16, length: u16 },

    #[error("{chunk} data could not be read ({source})")]
    Chunk {
        chunk: &'static str,
        source: Box<EditorError>,
    },
}
