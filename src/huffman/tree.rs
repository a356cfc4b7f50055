use std::cmp::Ordering;

use log::trace;

use crate::{heap::MinHeap, Symbol};

use super::FrequencyTable;

/// Huffman tree of one block. Every internal node owns its two children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HuffmanTree {
    Leaf(Symbol),
    Internal {
        /// Smallest symbol below this node; only a tie-break key.
        representative: Symbol,
        left: Box<HuffmanTree>,
        right: Box<HuffmanTree>,
    },
}

impl HuffmanTree {
    pub fn merge(left: HuffmanTree, right: HuffmanTree) -> Self {
        HuffmanTree::Internal {
            representative: left.representative().min(right.representative()),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[inline(always)]
    pub fn representative(&self) -> Symbol {
        match self {
            HuffmanTree::Leaf(symbol) => *symbol,
            HuffmanTree::Internal { representative, .. } => *representative,
        }
    }

    /// Greedy Huffman construction over the symbols present in `frequencies`.
    ///
    /// Nodes are merged by increasing `(frequency, representative)`, the first extracted
    /// becoming the left child, so equal inputs always give the same shape. Returns `None`
    /// when no symbol occurs.
    pub fn build(frequencies: &FrequencyTable) -> Option<Self> {
        let mut queue = MinHeap::with_capacity(frequencies.distinct());
        for (symbol, frequency) in frequencies.present() {
            queue.insert(QueueEntry { frequency, tree: HuffmanTree::Leaf(symbol) });
        }

        trace!("building a Huffman tree over {} symbols", queue.len());

        while queue.len() > 1 {
            let left = queue.extract()?;
            let right = queue.extract()?;

            queue.insert(QueueEntry {
                frequency: left.frequency + right.frequency,
                tree: HuffmanTree::merge(left.tree, right.tree),
            });
        }

        queue.extract().map(|entry| entry.tree)
    }

    /// Depth of every leaf, in depth-first left-to-right order.
    ///
    /// A tree made of a single leaf still yields a one-bit code.
    pub fn code_lengths(&self) -> Vec<(Symbol, usize)> {
        let mut lengths = Vec::new();
        self.collect_lengths(0, &mut lengths);
        lengths
    }

    fn collect_lengths(&self, depth: usize, lengths: &mut Vec<(Symbol, usize)>) {
        match self {
            HuffmanTree::Leaf(symbol) => lengths.push((*symbol, depth.max(1))),
            HuffmanTree::Internal { left, right, .. } => {
                left.collect_lengths(depth + 1, lengths);
                right.collect_lengths(depth + 1, lengths);
            }
        }
    }
}

struct QueueEntry {
    frequency: u64,
    tree: HuffmanTree,
}

impl QueueEntry {
    fn key(&self) -> (u64, Symbol) {
        (self.frequency, self.tree.representative())
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QueueEntry {}
