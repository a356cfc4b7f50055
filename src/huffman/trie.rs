use std::io::Read;

use crate::{bitstreams::BitReader, ArchiveError, FormatError, Symbol};

use super::{CodeTable, Codeword};

#[derive(Debug, PartialEq, Eq)]
enum TrieNode {
    Leaf(Symbol),
    /// `children[0]` is followed on a 0 bit, `children[1]` on a 1 bit.
    Branch { children: [Option<Box<TrieNode>>; 2] },
}

impl TrieNode {
    fn branch() -> Self {
        TrieNode::Branch { children: [None, None] }
    }
}

/// Binary decode trie mapping bit paths to symbols.
#[derive(Debug, PartialEq, Eq)]
pub struct DecodeTrie {
    root: TrieNode,
}

impl Default for DecodeTrie {
    fn default() -> Self {
        Self { root: TrieNode::branch() }
    }
}

impl DecodeTrie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_table(table: &CodeTable) -> Result<Self, FormatError> {
        let mut trie = Self::new();
        for (symbol, code) in table.entries() {
            trie.insert(*symbol, code)?;
        }
        Ok(trie)
    }

    /// Adds the path of `code` ending in a leaf for `symbol`.
    ///
    /// Fails if the code is empty, extends or is extended by an existing code.
    pub fn insert(&mut self, symbol: Symbol, code: &Codeword) -> Result<(), FormatError> {
        let (&last, path) = code.bits().split_last().ok_or(FormatError::InvalidCodeTable)?;

        let mut current = &mut self.root;
        for &bit in path {
            current = match current {
                TrieNode::Leaf(_) => return Err(FormatError::InvalidCodeTable),
                TrieNode::Branch { children } => {
                    &mut **children[bit as usize].get_or_insert_with(|| Box::new(TrieNode::branch()))
                }
            };
        }

        match current {
            TrieNode::Leaf(_) => Err(FormatError::InvalidCodeTable),
            TrieNode::Branch { children } => {
                let slot = &mut children[last as usize];
                if slot.is_some() {
                    return Err(FormatError::InvalidCodeTable);
                }
                *slot = Some(Box::new(TrieNode::Leaf(symbol)));
                Ok(())
            }
        }
    }

    /// Walks from the root one bit at a time until a leaf is reached.
    pub fn decode_symbol<R: Read>(&self, reader: &mut BitReader<R>) -> Result<Symbol, ArchiveError> {
        let mut current = &self.root;

        loop {
            match current {
                TrieNode::Leaf(symbol) => return Ok(*symbol),
                TrieNode::Branch { children } => {
                    let bit = reader
                        .read_some(1)?
                        .ok_or(FormatError::Truncated { field: "code" })?;
                    current = children[bit as usize]
                        .as_deref()
                        .ok_or(FormatError::InvalidCode)?;
                }
            }
        }
    }
}
