//! # huffpack
//!
//! Lossless Huffman compression of byte streams, a self-describing container
//! format for the result, and the file and blob-store workflows around it.
//!
//! ```rust
//! use huffpack::{huffman_decode, huffman_encode};
//!
//! let packed = huffman_encode(b"mississippi").unwrap();
//! assert_eq!(huffman_decode(&packed).unwrap(), b"mississippi");
//! ```

pub mod compression;
pub mod error;
pub mod storage;
pub mod transfer;

pub use compression::{huffman_decode, huffman_encode, Compression, HuffmanCodec};
pub use error::{Error, Result};
pub use storage::{BlobStore, DirBlobStore};
pub use transfer::{TransferConfig, TransferReport};
