//! Bit packing of code words.
//!
//! Codes are appended most significant bit first and the stream is padded
//! with zero bits to a whole byte. Because padding could otherwise be walked
//! as extra code words, the number of meaningful bits always travels with
//! the bytes in [`PackedBits`] and decoding stops exactly there.

use super::tree::{CodeNode, CodeTable, CodeTree};
use crate::error::{Error, Result};
use bitvec::prelude::*;

/// A bit-packed payload together with its exact length in bits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedBits {
    bytes: Vec<u8>,
    bit_len: u64,
}

impl PackedBits {
    /// Pairs `bytes` with the number of meaningful bits they hold.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedContainer` unless `bytes` is exactly
    /// `ceil(bit_len / 8)` bytes long.
    pub fn new(bytes: Vec<u8>, bit_len: u64) -> Result<Self> {
        let expected = bit_len.div_ceil(8);
        if bytes.len() as u64 != expected {
            return Err(Error::malformed(format!(
                "declared {} payload bits need {} bytes, found {}",
                bit_len,
                expected,
                bytes.len()
            )));
        }
        Ok(PackedBits { bytes, bit_len })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of meaningful bits, excluding padding.
    pub fn bit_len(&self) -> u64 {
        self.bit_len
    }

    pub fn is_empty(&self) -> bool {
        self.bit_len == 0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Encode `input` by concatenating the code of every byte.
///
/// # Errors
///
/// Returns `Error::UnknownSymbol` if a byte of `input` has no code.
pub fn encode(input: &[u8], codes: &CodeTable) -> Result<PackedBits> {
    let mut bits: BitVec<u8, Msb0> = BitVec::with_capacity(input.len() * 2);
    for &byte in input {
        let code = codes.get(byte).ok_or(Error::UnknownSymbol(byte))?;
        bits.extend_from_bitslice(code);
    }

    let bit_len = bits.len() as u64;
    let padded_len = bits.len().div_ceil(8) * 8;
    bits.resize(padded_len, false);

    log::debug!(
        "packed {} symbols into {} bits ({} bytes)",
        input.len(),
        bit_len,
        padded_len / 8
    );

    Ok(PackedBits {
        bytes: bits.as_raw_slice().to_vec(),
        bit_len,
    })
}

/// Decode a packed payload by walking `tree` one bit at a time.
///
/// Every time a leaf is reached its symbol is emitted and the walk restarts
/// at the root. Only the first `packed.bit_len()` bits are read.
///
/// # Errors
///
/// Returns `Error::MalformedContainer` if a padding bit is set, if the
/// payload ends in the middle of a code word, if a single-symbol payload
/// contains a `1` bit, or if the number of decoded symbols differs from
/// `symbol_count`.
pub fn decode(packed: &PackedBits, tree: &CodeTree, symbol_count: u64) -> Result<Vec<u8>> {
    let bit_len = usize::try_from(packed.bit_len)
        .map_err(|_| Error::malformed("payload bit count exceeds addressable memory"))?;
    let (bits, padding) = packed.bytes.view_bits::<Msb0>().split_at(bit_len);
    if padding.any() {
        return Err(Error::malformed("padding bits are not zero"));
    }

    let mut output = Vec::with_capacity(symbol_count.min(packed.bit_len) as usize);
    let root = tree.root();

    match *tree.node(root) {
        CodeNode::Leaf { symbol, .. } => {
            // The only code is `0`, one bit per symbol.
            if let Some(position) = bits.first_one() {
                return Err(Error::malformed(format!(
                    "bit {} is set but the only code word is 0",
                    position
                )));
            }
            output.resize(bit_len, symbol);
        }
        CodeNode::Internal { .. } => {
            let mut current = root;
            for bit in bits.iter().by_vals() {
                if let CodeNode::Internal { left, right, .. } = *tree.node(current) {
                    current = if bit { right } else { left };
                }
                if let CodeNode::Leaf { symbol, .. } = *tree.node(current) {
                    output.push(symbol);
                    current = root;
                }
            }
            if current != root {
                return Err(Error::malformed("payload ends inside a code word"));
            }
        }
    }

    if output.len() as u64 != symbol_count {
        return Err(Error::malformed(format!(
            "decoded {} symbols but the frequency table declares {}",
            output.len(),
            symbol_count
        )));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::huffman::frequency::build_frequency_table;

    fn tree_for(input: &[u8]) -> CodeTree {
        CodeTree::build(&build_frequency_table(input)).unwrap()
    }

    #[test]
    fn test_encode_scenario() {
        let input = b"aaaabbbcc";
        let packed = encode(input, &tree_for(input).code_table()).unwrap();
        // 0000 11 11 11 10 10, then two padding zeros
        assert_eq!(packed.bit_len(), 14);
        assert_eq!(packed.bytes(), &[0b0000_1111, 0b1110_1000]);
    }

    #[test]
    fn test_encode_decode() {
        let input = b"huffman coding in rust is fun!";
        let tree = tree_for(input);
        let packed = encode(input, &tree.code_table()).unwrap();
        let decoded = decode(&packed, &tree, input.len() as u64).unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_padding_is_not_decoded() {
        // Both padding bits would walk to 'a' (code 0) if they were read.
        let input = b"aaaabbbcc";
        let tree = tree_for(input);
        let packed = encode(input, &tree.code_table()).unwrap();
        assert_eq!(decode(&packed, &tree, 9).unwrap(), input);

        let whole_bytes = PackedBits::new(packed.bytes().to_vec(), 16).unwrap();
        assert!(matches!(
            decode(&whole_bytes, &tree, 9),
            Err(Error::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_single_symbol() {
        let input = [b'z'; 10];
        let tree = tree_for(&input);
        let packed = encode(&input, &tree.code_table()).unwrap();
        assert_eq!(packed.bit_len(), 10);
        assert_eq!(packed.bytes(), &[0, 0]);
        assert_eq!(decode(&packed, &tree, 10).unwrap(), input);
    }

    #[test]
    fn test_single_symbol_rejects_one_bits() {
        let tree = tree_for(b"zzz");
        let packed = PackedBits::new(vec![0b0100_0000], 3).unwrap();
        assert!(matches!(
            decode(&packed, &tree, 3),
            Err(Error::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_empty_input() {
        let tree = tree_for(b"ab");
        let packed = encode(b"", &tree.code_table()).unwrap();
        assert!(packed.is_empty());
        assert!(packed.bytes().is_empty());
        assert_eq!(decode(&packed, &tree, 0).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_unknown_symbol() {
        let codes = tree_for(b"abc").code_table();
        assert!(matches!(
            encode(b"abd", &codes),
            Err(Error::UnknownSymbol(b'd'))
        ));
    }

    #[test]
    fn test_payload_ending_inside_code_word() {
        let input = b"aaaabbbcc";
        let tree = tree_for(input);
        let packed = encode(input, &tree.code_table()).unwrap();
        // Drop the final bit: the last code `10` is left as a dangling `1`.
        let cut = PackedBits::new(packed.bytes().to_vec(), 13).unwrap();
        assert!(matches!(
            decode(&cut, &tree, 9),
            Err(Error::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_nonzero_padding() {
        let input = b"aaaabbbcc";
        let tree = tree_for(input);
        let packed = PackedBits::new(vec![0b0000_1111, 0b1110_1001], 14).unwrap();
        assert!(matches!(
            decode(&packed, &tree, input.len() as u64),
            Err(Error::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_symbol_count_mismatch() {
        let input = b"abracadabra";
        let tree = tree_for(input);
        let packed = encode(input, &tree.code_table()).unwrap();
        assert!(matches!(
            decode(&packed, &tree, 12),
            Err(Error::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_packed_bits_length_check() {
        assert!(PackedBits::new(vec![0xff], 8).is_ok());
        assert!(PackedBits::new(vec![0x80], 1).is_ok());
        assert!(PackedBits::new(Vec::new(), 0).is_ok());
        assert!(matches!(
            PackedBits::new(vec![0xff], 9),
            Err(Error::MalformedContainer(_))
        ));
        assert!(matches!(
            PackedBits::new(vec![0xff, 0x00], 8),
            Err(Error::MalformedContainer(_))
        ));
    }
}
