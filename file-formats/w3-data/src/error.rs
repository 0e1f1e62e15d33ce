use thiserror::Error;

/// Errors raised by the binary cursor and the [`FourCC`](crate::FourCC) type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    /// A read needed more bytes than the buffer holds.
    #[error("out of data at offset {offset}: needed {needed} bytes, {available} available")]
    OutOfData {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("invalid element count {count} at offset {offset}")]
    InvalidCount { offset: usize, count: i32 },

    #[error("element count {0} does not fit the on-disk count field")]
    CountOverflow(usize),

    #[error("invalid FourCC: {0:?}")]
    InvalidFourCC(String),

    /// A null-terminated string cannot carry a NUL byte of its own.
    #[error("string contains an interior NUL byte at index {index}")]
    InteriorNul { index: usize },

    #[error("fixed-length field expected {expected} bytes, got {found}")]
    FixedLength { expected: usize, found: usize },

    #[error("character {0:?} is not representable in a single byte")]
    NonLatin1(char),
}

pub type Result<T> = std::result::Result<T, CursorError>;
