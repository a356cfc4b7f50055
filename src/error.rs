use thiserror::Error;

use crate::ControlSymbol;

/// Top-level error of archive operations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The byte stream is not a well-formed archive. Decoding stops at the first one.
    #[error("invalid file, expected archive-format file: {0}")]
    Corrupt(#[from] FormatError),

    /// The underlying byte source or sink failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A byte showed up on the second pass over an input that the first pass never saw
    #[error("input changed while it was being archived")]
    InputChanged,

    #[error("configuration error: {0}")]
    Config(String),
}

/// Ways an archive byte stream can be malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("archive ended while reading {field}")]
    Truncated { field: &'static str },

    #[error("symbol {0} is outside the archive alphabet")]
    UnknownSymbol(u32),

    #[error("block header declares no symbols")]
    EmptyCodeTable,

    #[error("block header does not describe a prefix code")]
    InvalidCodeTable,

    #[error("bit sequence does not match any code")]
    InvalidCode,

    #[error("control symbol {0:?} out of place")]
    MisplacedControl(ControlSymbol),
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
