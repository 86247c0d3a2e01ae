//! Byte frequency model.
//!
//! Counts are kept in a map ordered by symbol value, so every traversal of a
//! table visits symbols in the same order no matter how the table was
//! populated. The tree builder depends on that to rebuild the exact tree the
//! encoder used.

use crate::error::{Error, Result};
use std::collections::btree_map::{BTreeMap, Entry};

/// Mapping from byte value to a positive occurrence count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<u8, u64>,
    /// Sum of all counts, i.e. the number of symbols the table describes
    total: u64,
}

impl FrequencyTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts every byte of `data`.
    ///
    /// An empty slice yields an empty table.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut histogram = [0u64; 256];
        for &byte in data {
            histogram[byte as usize] += 1;
        }

        let counts: BTreeMap<u8, u64> = histogram
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
            .collect();

        FrequencyTable {
            counts,
            total: data.len() as u64,
        }
    }

    /// Adds a symbol with its count.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidFrequency` if `count` is zero, if `symbol` is
    /// already present, or if the table total would overflow a `u64`.
    pub fn insert(&mut self, symbol: u8, count: u64) -> Result<()> {
        if count == 0 {
            return Err(Error::InvalidFrequency(format!(
                "symbol {:#04x} has a zero count",
                symbol
            )));
        }
        let total = self.total.checked_add(count).ok_or_else(|| {
            Error::InvalidFrequency(format!(
                "adding {} occurrences of {:#04x} overflows the table total",
                count, symbol
            ))
        })?;

        match self.counts.entry(symbol) {
            Entry::Occupied(_) => Err(Error::InvalidFrequency(format!(
                "symbol {:#04x} appears more than once",
                symbol
            ))),
            Entry::Vacant(slot) => {
                slot.insert(count);
                self.total = total;
                Ok(())
            }
        }
    }

    /// Count for `symbol`, if it occurs.
    pub fn get(&self, symbol: u8) -> Option<u64> {
        self.counts.get(&symbol).copied()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of symbols counted.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Iterates `(symbol, count)` pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts.iter().map(|(&symbol, &count)| (symbol, count))
    }
}

/// Build a frequency table mapping each byte in `input` to its count.
pub fn build_frequency_table(input: &[u8]) -> FrequencyTable {
    FrequencyTable::from_bytes(input)
}
