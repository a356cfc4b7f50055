pub mod archive;
pub mod bitstreams;
pub mod error;
pub mod heap;
pub mod huffman;
pub mod properties;

pub use error::{ArchiveError, FormatError, Result};
pub use properties::Properties;

/// A member of the archive alphabet: a literal byte (0..=255) or a control symbol.
pub type Symbol = u16;

/// Number of symbols in the alphabet: 256 literal bytes plus three control symbols.
pub const ALPHABET_SIZE: usize = 259;

/// Width of a symbol identity (and of every header field) in the archive.
pub const SYMBOL_BITS: usize = 9;

/// Out-of-band symbols delimiting the structure of a block.
///
/// The numeric values are part of the archive format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ControlSymbol {
    FilenameEnd = 256,
    OneMoreFile = 257,
    ArchiveEnd = 258,
}

impl ControlSymbol {
    pub const ALL: [ControlSymbol; 3] = [
        ControlSymbol::FilenameEnd,
        ControlSymbol::OneMoreFile,
        ControlSymbol::ArchiveEnd,
    ];

    #[inline(always)]
    pub fn symbol(self) -> Symbol {
        self as Symbol
    }

    pub fn from_symbol(symbol: Symbol) -> Option<Self> {
        match symbol {
            256 => Some(ControlSymbol::FilenameEnd),
            257 => Some(ControlSymbol::OneMoreFile),
            258 => Some(ControlSymbol::ArchiveEnd),
            _ => None,
        }
    }
}
