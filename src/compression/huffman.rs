//! Huffman coding of byte streams.
//!
//! Compression counts byte frequencies, builds a code tree with a fixed
//! tie-break, packs the code words and frames them with the frequency table
//! in a [`Container`]. Decompression parses the container, rebuilds the
//! identical tree from the table and walks it over the payload bits.
//!
//! # Example
//!
//! ```
//! use huffpack::compression::huffman::{huffman_decode, huffman_encode};
//!
//! let compressed = huffman_encode(b"aaaabbbcc").unwrap();
//! assert!(compressed.starts_with(b"a4\nb3\nc2\nEND\n"));
//! assert_eq!(huffman_decode(&compressed).unwrap(), b"aaaabbbcc");
//! ```

pub mod bitstream;
pub mod container;
pub mod frequency;
pub mod tree;

pub use bitstream::{decode, encode, PackedBits};
pub use container::Container;
pub use frequency::{build_frequency_table, FrequencyTable};
pub use tree::{build_code_table, build_code_tree, Code, CodeNode, CodeTable, CodeTree, NodeId};

use crate::compression::Compression;
use crate::error::{Error, Result};

/// Huffman codec usable through the [`Compression`] trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct HuffmanCodec;

impl Compression for HuffmanCodec {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        huffman_encode(data)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        huffman_decode(data)
    }
}

/// Builds the container for `input`.
///
/// Empty input yields an empty table and an empty payload.
pub fn encode_container(input: &[u8]) -> Result<Container> {
    let table = build_frequency_table(input);
    let Some(tree) = build_code_tree(&table) else {
        return Ok(Container::new(table, PackedBits::default()));
    };

    let codes = build_code_table(&tree);
    let payload = encode(input, &codes)?;
    Ok(Container::new(table, payload))
}

/// Recovers the original bytes from a parsed container.
///
/// # Errors
///
/// Returns `Error::EmptyAlphabet` if the table is empty but the payload is
/// not, and `Error::MalformedContainer` if the payload bit count is not the
/// one the table implies or the payload does not decode cleanly.
pub fn decode_container(container: &Container) -> Result<Vec<u8>> {
    let table = container.table();
    let payload = container.payload();

    let Some(tree) = build_code_tree(table) else {
        if !payload.is_empty() {
            return Err(Error::EmptyAlphabet {
                payload_bits: payload.bit_len(),
            });
        }
        return Ok(Vec::new());
    };

    let codes = build_code_table(&tree);
    let expected_bits = codes.encoded_bit_len(table).ok_or_else(|| {
        Error::malformed("frequency table implies more payload bits than a u64 holds")
    })?;
    if expected_bits != payload.bit_len() {
        return Err(Error::malformed(format!(
            "declared {} payload bits but the frequency table implies {}",
            payload.bit_len(),
            expected_bits
        )));
    }

    decode(payload, &tree, table.total())
}

/// Convenience function: compresses `input` into serialized container bytes.
pub fn huffman_encode(input: &[u8]) -> Result<Vec<u8>> {
    let container = encode_container(input)?;
    log::debug!(
        "huffman encode: {} bytes in, {} symbols, {} payload bits",
        input.len(),
        container.table().len(),
        container.payload().bit_len()
    );
    Ok(container.to_bytes())
}

/// Convenience function: parses and decodes serialized container bytes.
pub fn huffman_decode(data: &[u8]) -> Result<Vec<u8>> {
    let container = Container::from_bytes(data)?;
    decode_container(&container)
}
