//! Serialized form of a compressed stream.
//!
//! ```text
//! for each symbol, ascending:  <raw symbol byte><decimal count>\n
//! END\n
//! <payload bit count: u64, big-endian>
//! <payload: ceil(bit count / 8) bytes, MSB-first, zero-padded>
//! ```
//!
//! A record is always one raw byte followed by at least one ASCII digit, so
//! `END\n` at a record boundary can never be mistaken for a record, even for
//! the symbol `E`.

use super::bitstream::PackedBits;
use super::frequency::FrequencyTable;
use crate::error::{Error, Result};
use std::io::{self, Write};

/// Marks the end of the frequency records.
pub const TERMINATOR: &[u8; 4] = b"END\n";

/// Width in bytes of the payload bit count that follows the terminator.
pub const BIT_LEN_WIDTH: usize = 8;

/// A frequency table framed together with the payload it encodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    table: FrequencyTable,
    payload: PackedBits,
}

impl Container {
    pub fn new(table: FrequencyTable, payload: PackedBits) -> Self {
        Container { table, payload }
    }

    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }

    pub fn payload(&self) -> &PackedBits {
        &self.payload
    }

    pub fn into_parts(self) -> (FrequencyTable, PackedBits) {
        (self.table, self.payload)
    }

    /// Frequency records, terminator and bit count.
    fn header(&self) -> Vec<u8> {
        let mut header =
            Vec::with_capacity(self.table.len() * 8 + TERMINATOR.len() + BIT_LEN_WIDTH);
        for (symbol, count) in self.table.iter() {
            header.push(symbol);
            header.extend_from_slice(count.to_string().as_bytes());
            header.push(b'\n');
        }
        header.extend_from_slice(TERMINATOR);
        header.extend_from_slice(&self.payload.bit_len().to_be_bytes());
        header
    }

    /// Serializes the container into a fresh buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.header();
        bytes.extend_from_slice(self.payload.bytes());
        bytes
    }

    /// Writes the serialized container to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.header())?;
        writer.write_all(self.payload.bytes())
    }

    /// Parses a serialized container.
    ///
    /// Records are accepted in any order. Everything after the bit count is
    /// payload and its length must match the bit count exactly.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedContainer` if the terminator or bit count is
    /// missing, a record is unparsable or repeats a symbol, or the payload
    /// length disagrees with the bit count.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut table = FrequencyTable::new();
        let mut pos = 0;

        loop {
            let rest = &data[pos..];
            if rest.starts_with(TERMINATOR) {
                pos += TERMINATOR.len();
                break;
            }

            let Some((&symbol, tail)) = rest.split_first() else {
                return Err(Error::malformed("missing END terminator"));
            };
            let line_len = tail.iter().position(|&b| b == b'\n').ok_or_else(|| {
                Error::malformed(format!(
                    "record for symbol {:#04x} at offset {} is not newline-terminated",
                    symbol, pos
                ))
            })?;

            let count = parse_count(symbol, &tail[..line_len])?;
            table
                .insert(symbol, count)
                .map_err(|e| Error::malformed(e.to_string()))?;
            pos += 1 + line_len + 1;
        }

        let bit_len_field: [u8; BIT_LEN_WIDTH] = data
            .get(pos..pos + BIT_LEN_WIDTH)
            .and_then(|field| field.try_into().ok())
            .ok_or_else(|| Error::malformed("payload bit count is truncated"))?;
        pos += BIT_LEN_WIDTH;

        let bit_len = u64::from_be_bytes(bit_len_field);
        let payload = PackedBits::new(data[pos..].to_vec(), bit_len)?;

        log::debug!(
            "parsed container: {} symbols, {} header bytes, {} payload bits",
            table.len(),
            pos,
            bit_len
        );

        Ok(Container { table, payload })
    }
}

/// Parses the decimal count of a record. Counts must be non-empty runs of
/// ASCII digits that fit a `u64`; zero is rejected by the table itself.
fn parse_count(symbol: u8, digits: &[u8]) -> Result<u64> {
    let parsed = if digits.is_empty() {
        None
    } else {
        digits.iter().try_fold(0u64, |acc, &digit| {
            if !digit.is_ascii_digit() {
                return None;
            }
            acc.checked_mul(10)?.checked_add(u64::from(digit - b'0'))
        })
    };

    parsed.ok_or_else(|| {
        Error::malformed(format!(
            "record for symbol {:#04x} has invalid count {:?}",
            symbol,
            String::from_utf8_lossy(digits)
        ))
    })
}
