use std::io::Read;

use log::{debug, info};

use crate::{bitstreams::BitReader, huffman::DecodeTrie, ControlSymbol, FormatError, Result};

use super::{read_header, ArchiveEntry, DirectorySink, DiscardSink, FileSink};

/// Restores the files of an archive, block after block, until the archive end symbol.
pub struct Decoder<R: Read> {
    archive: BitReader<R>,
}

impl<R: Read> Decoder<R> {
    pub fn new(archive: BitReader<R>) -> Self {
        Self { archive }
    }

    pub fn into_inner(self) -> BitReader<R> {
        self.archive
    }

    /// Decodes every block into `sink` and returns what was extracted, in archive order.
    ///
    /// Any malformed or truncated block aborts the whole operation; files already handed
    /// to the sink stay there.
    pub fn decode<S: FileSink>(&mut self, sink: &mut S) -> Result<Vec<ArchiveEntry>> {
        let mut entries = Vec::new();

        loop {
            let table = read_header(&mut self.archive)?;
            let trie = DecodeTrie::from_table(&table)?;

            debug!(
                "block header: {} symbols, longest code {} bits",
                table.len(),
                table.max_code_length()
            );

            let mut name = Vec::new();
            let mut file_name: Option<String> = None;
            let mut size = 0u64;

            let is_last = loop {
                let symbol = trie.decode_symbol(&mut self.archive)?;

                match (ControlSymbol::from_symbol(symbol), file_name.is_some()) {
                    (None, false) => name.push(symbol as u8),
                    (None, true) => {
                        sink.write_byte(symbol as u8)?;
                        size += 1;
                    }
                    (Some(ControlSymbol::FilenameEnd), false) => {
                        let restored = String::from_utf8_lossy(&name).into_owned();
                        sink.begin_file(&restored)?;
                        file_name = Some(restored);
                    }
                    (Some(ControlSymbol::OneMoreFile), true) => break false,
                    (Some(ControlSymbol::ArchiveEnd), true) => break true,
                    (Some(control), _) => return Err(FormatError::MisplacedControl(control).into()),
                }
            };

            sink.end_file()?;

            let name = file_name.unwrap_or_default();
            info!("extracted {} ({} bytes)", name, size);
            entries.push(ArchiveEntry { name, size });

            if is_last {
                return Ok(entries);
            }
        }
    }

    /// Walks the whole archive without writing anything.
    pub fn list(&mut self) -> Result<Vec<ArchiveEntry>> {
        self.decode(&mut DiscardSink)
    }

    /// Extracts into `directory`, joining each stored name to it unchanged.
    pub fn decode_to_directory<P: AsRef<std::path::Path>>(&mut self, directory: P) -> Result<Vec<ArchiveEntry>> {
        self.decode(&mut DirectorySink::new(directory))
    }
}
