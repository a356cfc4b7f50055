use std::io::{Read, Seek, Write};

use log::{debug, info};

use crate::{
    bitstreams::{BitReader, BitWriter},
    huffman::{CodeTable, FrequencyTable},
    ArchiveError, ControlSymbol, Result, Symbol,
};

use super::{write_header, BlockStats};

/// Writes files one block at a time into a single archive stream.
pub struct Encoder<W: Write> {
    archive: BitWriter<W>,
    finished: bool,
}

impl<W: Write> Encoder<W> {
    pub fn new(archive: BitWriter<W>) -> Self {
        Self { archive, finished: false }
    }

    /// Whether the block marked as last has been written (and the stream flushed).
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn into_inner(self) -> W {
        self.archive.into_inner()
    }

    /// Appends one block holding `name` and the whole of `input`.
    ///
    /// `input` is read twice: once to count symbols, once, after a rewind, to emit their
    /// codes. With `is_last` the block ends the archive and the output is flushed;
    /// otherwise another block is announced.
    ///
    /// # Panics
    ///
    /// If called after a block marked as last.
    pub fn encode_file<R: Read + Seek>(
        &mut self,
        name: &str,
        input: &mut BitReader<R>,
        is_last: bool,
    ) -> Result<BlockStats> {
        assert!(!self.finished, "Cannot encode {:?}: the archive already ended", name);

        let mut frequencies = FrequencyTable::with_control_symbols();
        frequencies.add_bytes(name.as_bytes());

        let mut content_bytes = 0u64;
        while let Some(byte) = input.read_some(8)? {
            frequencies.add(byte as Symbol);
            content_bytes += 1;
        }

        let table = CodeTable::from_frequencies(&frequencies);

        let header_start = self.archive.written_bits();
        write_header(&table, &mut self.archive)?;
        let payload_start = self.archive.written_bits();

        input.restore()?;

        for &byte in name.as_bytes() {
            self.write_symbol(&table, byte as Symbol)?;
        }
        self.write_symbol(&table, ControlSymbol::FilenameEnd.symbol())?;

        while let Some(byte) = input.read_some(8)? {
            self.write_symbol(&table, byte as Symbol)?;
        }

        if is_last {
            self.write_symbol(&table, ControlSymbol::ArchiveEnd.symbol())?;
        } else {
            self.write_symbol(&table, ControlSymbol::OneMoreFile.symbol())?;
        }
        let payload_end = self.archive.written_bits();

        if is_last {
            self.archive.flush()?;
            self.finished = true;
        }

        let stats = BlockStats {
            name: name.to_string(),
            content_bytes,
            distinct_symbols: table.len(),
            max_code_length: table.max_code_length(),
            header_bits: payload_start - header_start,
            payload_bits: payload_end - payload_start,
        };

        debug!(
            "block {:?}: {} symbols, longest code {} bits, header {} bits, payload {} bits",
            stats.name, stats.distinct_symbols, stats.max_code_length, stats.header_bits, stats.payload_bits
        );
        info!("archived {} ({} bytes)", name, content_bytes);

        Ok(stats)
    }

    fn write_symbol(&mut self, table: &CodeTable, symbol: Symbol) -> Result<()> {
        let code = table.get(symbol).ok_or(ArchiveError::InputChanged)?;
        code.write_to(&mut self.archive)?;
        Ok(())
    }
}
