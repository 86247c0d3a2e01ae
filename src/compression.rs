//! Compression algorithms implementation.
//!
//! This module provides a lossless Huffman coder together with the container
//! format it is stored in:
//! - `huffman::frequency` counts byte occurrences
//! - `huffman::tree` builds the code tree and derives the prefix code
//! - `huffman::bitstream` packs and unpacks code words
//! - `huffman::container` frames the frequency table and payload
//!
//! # Examples
//!
//! ```rust
//! use huffpack::compression::{Compression, HuffmanCodec};
//!
//! let codec = HuffmanCodec;
//! let packed = codec.compress(b"abracadabra").unwrap();
//! assert_eq!(codec.decompress(&packed).unwrap(), b"abracadabra");
//! ```

pub use crate::error::Result;

/// Trait for compression algorithms
pub trait Compression {
    /// Compress the input data
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress the compressed data
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

pub mod huffman;
pub use huffman::{
    build_code_table, build_code_tree, build_frequency_table, decode, encode, huffman_decode,
    huffman_encode, CodeTree, Container, FrequencyTable, HuffmanCodec,
};
