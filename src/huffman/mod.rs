pub mod tree;
pub mod trie;

use std::{fmt, io::{self, Write}};

use crate::{bitstreams::{BitWriter, MAX_REQUEST_BITS}, ControlSymbol, FormatError, Symbol, ALPHABET_SIZE};

pub use tree::HuffmanTree;
pub use trie::DecodeTrie;

/// Longest code a prefix code over the whole alphabet can assign.
pub const MAX_CODE_LENGTH: usize = ALPHABET_SIZE - 1;

/// Occurrence counts of every alphabet symbol within one block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: Box<[u64]>,
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self { counts: vec![0; ALPHABET_SIZE].into_boxed_slice() }
    }
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table where each control symbol already occurs once, so every block can
    /// encode its delimiters even if they end up unused.
    pub fn with_control_symbols() -> Self {
        let mut table = Self::new();
        for control in ControlSymbol::ALL {
            table.add(control.symbol());
        }
        table
    }

    #[inline(always)]
    pub fn add(&mut self, symbol: Symbol) {
        self.counts[symbol as usize] += 1;
    }

    pub fn add_count(&mut self, symbol: Symbol, count: u64) {
        self.counts[symbol as usize] += count;
    }

    pub fn add_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.add(b as Symbol);
        }
    }

    pub fn get(&self, symbol: Symbol) -> u64 {
        self.counts[symbol as usize]
    }

    /// Symbols with a nonzero count, in increasing symbol order.
    pub fn present(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as Symbol, count))
    }

    pub fn distinct(&self) -> usize {
        self.present().count()
    }
}

/// An explicit code: a sequence of bits, the first one being the first written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Codeword {
    bits: Vec<bool>,
}

impl Codeword {
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Emits the code in requests of at most 32 bits, so arbitrarily long codes fit.
    pub fn write_to<W: Write>(&self, writer: &mut BitWriter<W>) -> io::Result<()> {
        for chunk in self.bits.chunks(MAX_REQUEST_BITS) {
            let value = chunk.iter().fold(0u32, |acc, &bit| (acc << 1) | bit as u32);
            writer.write_some(value, chunk.len())?;
        }
        Ok(())
    }
}

impl From<&str> for Codeword {
    fn from(value: &str) -> Self {
        Self { bits: value.chars().map(|c| c == '1').collect() }
    }
}

impl fmt::Display for Codeword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in self.bits.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// The growing big-endian bit counter that hands out canonical codes.
struct CanonicalCounter {
    bits: Vec<bool>,
}

impl CanonicalCounter {
    fn new() -> Self {
        Self { bits: vec![false] }
    }

    /// Appends trailing zeros until the counter is `len` bits long.
    fn extend_to(&mut self, len: usize) {
        while self.bits.len() < len {
            self.bits.push(false);
        }
    }

    fn current(&self) -> Codeword {
        Codeword { bits: self.bits.clone() }
    }

    /// Adds one with carry, flipping bits from the least significant end.
    fn increment(&mut self) {
        for bit in self.bits.iter_mut().rev() {
            *bit = !*bit;
            if *bit {
                break;
            }
        }
    }
}

/// Canonical Huffman code table of one block.
///
/// Entries are ordered by `(code length, symbol)`; that order alone, together with the
/// number of codes of each length, determines every code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeTable {
    entries: Vec<(Symbol, Codeword)>,
    index: Box<[Option<usize>]>,
}

impl CodeTable {
    /// Assigns canonical codes to `(symbol, code length)` pairs given in any order.
    pub fn from_lengths(mut lengths: Vec<(Symbol, usize)>) -> Self {
        lengths.sort_by_key(|&(symbol, len)| (len, symbol));

        let mut counter = CanonicalCounter::new();
        let mut entries = Vec::with_capacity(lengths.len());

        for (symbol, len) in lengths {
            counter.extend_to(len);
            entries.push((symbol, counter.current()));
            counter.increment();
        }

        Self::from_entries(entries)
    }

    /// Builds the Huffman tree of `frequencies` and canonicalizes its code lengths.
    pub fn from_frequencies(frequencies: &FrequencyTable) -> Self {
        match HuffmanTree::build(frequencies) {
            Some(tree) => Self::from_lengths(tree.code_lengths()),
            None => Self::from_entries(Vec::new()),
        }
    }

    /// Rebuilds the table from the symbols in canonical order and the number of codes of
    /// each length, `histogram[0]` counting the codes of length 1. Histograms longer than
    /// [`MAX_CODE_LENGTH`] are rejected.
    pub fn from_header(symbols: &[Symbol], histogram: &[usize]) -> Result<Self, FormatError> {
        if histogram.len() > MAX_CODE_LENGTH {
            return Err(FormatError::InvalidCodeTable);
        }

        let mut remaining = histogram.to_vec();
        let mut length_pointer = 0;
        let mut counter = CanonicalCounter::new();
        let mut entries = Vec::with_capacity(symbols.len());
        let mut seen = vec![false; ALPHABET_SIZE];

        for &symbol in symbols {
            if (symbol as usize) >= ALPHABET_SIZE {
                return Err(FormatError::UnknownSymbol(symbol as u32));
            }
            if seen[symbol as usize] {
                return Err(FormatError::InvalidCodeTable);
            }
            seen[symbol as usize] = true;

            while remaining.get(length_pointer) == Some(&0) {
                length_pointer += 1;
            }
            if length_pointer >= remaining.len() {
                return Err(FormatError::InvalidCodeTable);
            }
            remaining[length_pointer] -= 1;

            counter.extend_to(length_pointer + 1);
            entries.push((symbol, counter.current()));
            counter.increment();
        }

        Ok(Self::from_entries(entries))
    }

    fn from_entries(entries: Vec<(Symbol, Codeword)>) -> Self {
        let mut index = vec![None; ALPHABET_SIZE].into_boxed_slice();
        for (i, (symbol, _)) in entries.iter().enumerate() {
            index[*symbol as usize] = Some(i);
        }

        Self { entries, index }
    }

    /// `(symbol, code)` pairs in canonical order.
    pub fn entries(&self) -> &[(Symbol, Codeword)] {
        &self.entries
    }

    pub fn get(&self, symbol: Symbol) -> Option<&Codeword> {
        self.index
            .get(symbol as usize)
            .copied()
            .flatten()
            .map(|i| &self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_code_length(&self) -> usize {
        self.entries.last().map_or(0, |(_, code)| code.len())
    }

    /// Number of codes of each length from 1 up to the longest one.
    pub fn length_histogram(&self) -> Vec<usize> {
        let mut histogram = vec![0; self.max_code_length()];
        for (_, code) in self.entries.iter() {
            histogram[code.len() - 1] += 1;
        }
        histogram
    }
}

#[cfg(test)]
mod tests;
