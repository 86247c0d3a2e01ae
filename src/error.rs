//! Error types shared by the codec, the container format and the transfer glue.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Errors surfaced by every fallible operation in the crate.
///
/// The codec holds no state across calls, so every variant is final for the
/// operation that produced it; nothing is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// A source could not be read or a destination could not be written.
    #[error("I/O unavailable: {context}")]
    IoUnavailable {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The container is truncated, has an unparsable header, or its declared
    /// bit count disagrees with the payload or the frequency table.
    #[error("malformed container: {0}")]
    MalformedContainer(String),

    /// The container's frequency table is empty but it still carries payload bits.
    #[error("empty alphabet: frequency table is empty but payload holds {payload_bits} bits")]
    EmptyAlphabet { payload_bits: u64 },

    /// A frequency table entry was rejected.
    #[error("invalid frequency: {0}")]
    InvalidFrequency(String),

    /// The input contains a byte that the code table has no code for.
    #[error("symbol {0:#04x} has no code in the code table")]
    UnknownSymbol(u8),

    /// The blob store failed to store or retrieve an object.
    #[error("transfer failed: {0}")]
    Transfer(String),
}

impl Error {
    /// Wraps an I/O failure on `path`.
    pub fn io(action: &str, path: &Path, source: io::Error) -> Self {
        Error::IoUnavailable {
            context: format!("failed to {} {}", action, path.display()),
            source,
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedContainer(msg.into())
    }
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
