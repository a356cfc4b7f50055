pub mod archive_decoder;
pub mod archive_encoder;

use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::{Component, Path, PathBuf},
};

use log::warn;
use serde::Serialize;

use crate::{
    bitstreams::{BitReader, BitWriter},
    huffman::{CodeTable, MAX_CODE_LENGTH},
    FormatError, Result, Symbol, SYMBOL_BITS,
};

pub use archive_decoder::Decoder;
pub use archive_encoder::Encoder;

/// Summary of one block written by [`Encoder::encode_file`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlockStats {
    pub name: String,
    pub content_bytes: u64,
    pub distinct_symbols: usize,
    pub max_code_length: usize,
    pub header_bits: usize,
    pub payload_bits: usize,
}

/// A file found in an archive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    pub name: String,
    pub size: u64,
}

/// Emits the restore information of a block: symbol count, symbols in canonical order,
/// then the number of codes of each length from 1 to the longest.
pub(crate) fn write_header<W: Write>(table: &CodeTable, writer: &mut BitWriter<W>) -> io::Result<()> {
    writer.write_some(table.len() as u32, SYMBOL_BITS)?;

    for (symbol, _) in table.entries() {
        writer.write_some(*symbol as u32, SYMBOL_BITS)?;
    }
    for count in table.length_histogram() {
        writer.write_some(count as u32, SYMBOL_BITS)?;
    }

    Ok(())
}

/// Reads a block header and rebuilds the code table it describes.
pub(crate) fn read_header<R: Read>(reader: &mut BitReader<R>) -> Result<CodeTable> {
    let symbol_count = read_field(reader, "symbol count")? as usize;
    if symbol_count == 0 {
        return Err(FormatError::EmptyCodeTable.into());
    }

    let mut symbols = Vec::with_capacity(symbol_count);
    for _ in 0..symbol_count {
        symbols.push(read_field(reader, "symbol")? as Symbol);
    }

    // Lengths are listed until they account for every symbol. No prefix code over the
    // alphabet has a code longer than ALPHABET_SIZE - 1 bits.
    let mut histogram = Vec::new();
    let mut total = 0;
    while total < symbol_count {
        if histogram.len() == MAX_CODE_LENGTH {
            return Err(FormatError::InvalidCodeTable.into());
        }
        let count = read_field(reader, "code length histogram")? as usize;
        histogram.push(count);
        total += count;
    }
    if total > symbol_count {
        return Err(FormatError::InvalidCodeTable.into());
    }

    Ok(CodeTable::from_header(&symbols, &histogram)?)
}

fn read_field<R: Read>(reader: &mut BitReader<R>, field: &'static str) -> Result<u32> {
    Ok(reader
        .read_some(SYMBOL_BITS)?
        .ok_or(FormatError::Truncated { field })?)
}

/// Destination of the files restored by a [`Decoder`].
///
/// Calls come in `begin_file`, `write_byte`*, `end_file` order, once per archived file.
pub trait FileSink {
    fn begin_file(&mut self, name: &str) -> io::Result<()>;
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;
    fn end_file(&mut self) -> io::Result<()>;
}

/// Creates every file under one directory, named exactly as stored in the archive.
/// A later file with the same name replaces an earlier one.
pub struct DirectorySink {
    directory: PathBuf,
    current: Option<BufWriter<File>>,
}

impl DirectorySink {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self { directory: directory.as_ref().to_path_buf(), current: None }
    }
}

impl FileSink for DirectorySink {
    fn begin_file(&mut self, name: &str) -> io::Result<()> {
        let stored = Path::new(name);
        if stored.components().any(|c| !matches!(c, Component::Normal(_))) {
            warn!("archived name {:?} is not a plain relative path", name);
        }

        let path = self.directory.join(stored);
        self.current = Some(BufWriter::new(File::create(path)?));
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        match self.current.as_mut() {
            Some(file) => file.write_all(&[byte]),
            None => Err(io::Error::new(io::ErrorKind::Other, "no extracted file is open")),
        }
    }

    fn end_file(&mut self) -> io::Result<()> {
        match self.current.take() {
            Some(mut file) => file.flush(),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractedFile {
    pub name: String,
    pub contents: Vec<u8>,
}

/// Keeps every extracted file in memory, duplicates included.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub files: Vec<ExtractedFile>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FileSink for MemorySink {
    fn begin_file(&mut self, name: &str) -> io::Result<()> {
        self.files.push(ExtractedFile { name: name.to_string(), contents: Vec::new() });
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        match self.files.last_mut() {
            Some(file) => {
                file.contents.push(byte);
                Ok(())
            }
            None => Err(io::Error::new(io::ErrorKind::Other, "no extracted file is open")),
        }
    }

    fn end_file(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Drops everything; used to walk an archive for its listing.
struct DiscardSink;

impl FileSink for DiscardSink {
    fn begin_file(&mut self, _name: &str) -> io::Result<()> {
        Ok(())
    }

    fn write_byte(&mut self, _byte: u8) -> io::Result<()> {
        Ok(())
    }

    fn end_file(&mut self) -> io::Result<()> {
        Ok(())
    }
}
