//! Huffman code tree construction and code derivation.
//!
//! The tree lives in a flat arena and nodes refer to their children by index.
//! It is built once per encode or decode call and dropped afterwards.
//!
//! # Tie-breaking
//!
//! Candidates are ordered by `(weight, rank)`. A leaf's rank is its symbol
//! value and the k-th merged node gets rank `256 + k`, so two tables with
//! the same contents always produce the same tree regardless of how they were
//! populated. The first node taken from the queue becomes the left child.

use super::frequency::FrequencyTable;
use bitvec::prelude::*;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

/// Index of a node inside a [`CodeTree`].
pub type NodeId = usize;

/// A code word, most significant (first emitted) bit first.
pub type Code = BitVec<u8, Msb0>;

/// Rank given to the first internal node; leaves use their symbol value.
const FIRST_INTERNAL_RANK: u32 = 256;

/// Represents a node in the Huffman tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeNode {
    /// A leaf node holds a symbol and its frequency.
    Leaf { symbol: u8, weight: u64 },
    /// An internal node with left and right children and combined frequency.
    Internal {
        weight: u64,
        left: NodeId,
        right: NodeId,
    },
}

impl CodeNode {
    /// Returns the cumulative weight of the node.
    pub fn weight(&self) -> u64 {
        match self {
            CodeNode::Leaf { weight, .. } => *weight,
            CodeNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, CodeNode::Leaf { .. })
    }
}

/// Priority queue entry. The entry with the smallest `(weight, rank)` must
/// come out of the max-heap first, so the ordering is reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    weight: u64,
    rank: u32,
    node: NodeId,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| other.rank.cmp(&self.rank))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A Huffman tree stored as an arena of nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTree {
    nodes: Vec<CodeNode>,
    root: NodeId,
}

impl CodeTree {
    /// Build the Huffman tree for a frequency table.
    ///
    /// Returns `None` if the table is empty. A table with a single symbol
    /// yields a tree whose root is that symbol's leaf.
    pub fn build(table: &FrequencyTable) -> Option<Self> {
        let mut nodes = Vec::with_capacity(2 * table.len());
        let mut heap = BinaryHeap::with_capacity(table.len());

        for (symbol, weight) in table.iter() {
            heap.push(Candidate {
                weight,
                rank: u32::from(symbol),
                node: nodes.len(),
            });
            nodes.push(CodeNode::Leaf { symbol, weight });
        }

        let mut next_rank = FIRST_INTERNAL_RANK;
        let root = loop {
            let left = heap.pop()?;
            let Some(right) = heap.pop() else {
                break left.node;
            };

            // Sums never exceed the table total, which is known to fit in a u64.
            let weight = left.weight + right.weight;
            heap.push(Candidate {
                weight,
                rank: next_rank,
                node: nodes.len(),
            });
            nodes.push(CodeNode::Internal {
                weight,
                left: left.node,
                right: right.node,
            });
            next_rank += 1;
        };

        log::debug!(
            "built code tree: {} symbols, {} nodes, weight {}",
            table.len(),
            nodes.len(),
            nodes[root].weight()
        );

        Some(CodeTree { nodes, root })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the node stored at `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn node(&self, id: NodeId) -> &CodeNode {
        &self.nodes[id]
    }

    /// Total weight of the tree, equal to the number of symbols it encodes.
    pub fn weight(&self) -> u64 {
        self.nodes[self.root].weight()
    }

    /// Number of distinct symbols in the tree.
    pub fn symbol_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// True when the alphabet has exactly one symbol and the root is a leaf.
    pub fn is_single_symbol(&self) -> bool {
        self.nodes[self.root].is_leaf()
    }

    /// Derive the code table by walking every root-to-leaf path.
    ///
    /// Descending left appends `0`, descending right appends `1`. A lone
    /// root leaf has an empty path, so it is assigned the code `0`.
    pub fn code_table(&self) -> CodeTable {
        let mut codes = BTreeMap::new();
        let mut stack: Vec<(NodeId, Code)> = vec![(self.root, Code::new())];

        while let Some((id, path)) = stack.pop() {
            match self.nodes[id] {
                CodeNode::Leaf { symbol, .. } => {
                    let code = if path.is_empty() {
                        bitvec![u8, Msb0; 0]
                    } else {
                        path
                    };
                    codes.insert(symbol, code);
                }
                CodeNode::Internal { left, right, .. } => {
                    let mut right_path = path.clone();
                    right_path.push(true);
                    stack.push((right, right_path));

                    let mut left_path = path;
                    left_path.push(false);
                    stack.push((left, left_path));
                }
            }
        }

        CodeTable { codes }
    }
}

/// Mapping from symbol to its prefix-free code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<u8, Code>,
}

impl CodeTable {
    /// Code for `symbol`, if the symbol is part of the alphabet.
    pub fn get(&self, symbol: u8) -> Option<&BitSlice<u8, Msb0>> {
        self.codes.get(&symbol).map(|code| code.as_bitslice())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Iterates `(symbol, code)` pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitSlice<u8, Msb0>)> + '_ {
        self.codes
            .iter()
            .map(|(&symbol, code)| (symbol, code.as_bitslice()))
    }

    /// Number of payload bits needed to encode every symbol counted in
    /// `table`.
    ///
    /// Returns `None` if a symbol of `table` has no code or the sum
    /// overflows a `u64`.
    pub fn encoded_bit_len(&self, table: &FrequencyTable) -> Option<u64> {
        table.iter().try_fold(0u64, |acc, (symbol, count)| {
            let len = self.codes.get(&symbol)?.len() as u64;
            acc.checked_add(count.checked_mul(len)?)
        })
    }
}

/// Build the Huffman tree given a frequency table.
/// Returns `None` if the frequency table is empty.
pub fn build_code_tree(table: &FrequencyTable) -> Option<CodeTree> {
    CodeTree::build(table)
}

/// Build the code table mapping symbols to their Huffman codes.
pub fn build_code_table(tree: &CodeTree) -> CodeTable {
    tree.code_table()
}
