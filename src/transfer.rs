//! File-level compression workflows.
//!
//! Local files are read whole, run through the Huffman codec and written
//! through a temporary file that is renamed into place, so a failed call
//! never leaves a partial destination behind. The store workflows stage the
//! container in a temporary file that is removed once the transfer is over,
//! whether it succeeded or not.

use crate::compression::huffman::{decode_container, encode_container, Container};
use crate::error::{Error, Result};
use crate::storage::{BlobStore, DirBlobStore};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Where objects live and where transfers stage their temporary files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferConfig {
    /// Root directory of the bucket store
    pub store_root: PathBuf,
    /// Directory for staging files; `None` uses the system temp directory
    pub staging_dir: Option<PathBuf>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            store_root: PathBuf::from("buckets"),
            staging_dir: None,
        }
    }
}

impl TransferConfig {
    /// Opens the directory store this configuration points at.
    pub fn open_store(&self) -> DirBlobStore {
        DirBlobStore::new(&self.store_root)
    }

    fn staging_file(&self) -> Result<NamedTempFile> {
        match &self.staging_dir {
            Some(dir) => NamedTempFile::new_in(dir)
                .map_err(|e| Error::io("create staging file in", dir, e)),
            None => NamedTempFile::new()
                .map_err(|e| Error::io("create staging file in", &std::env::temp_dir(), e)),
        }
    }
}

/// Byte counts of one completed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReport {
    pub input_bytes: u64,
    pub output_bytes: u64,
}

impl TransferReport {
    /// Output size relative to input size; 0 for empty input.
    pub fn ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            0.0
        } else {
            self.output_bytes as f64 / self.input_bytes as f64
        }
    }
}

/// Compresses the file at `source` into a container at `destination`.
pub fn compress_file(source: &Path, destination: &Path) -> Result<TransferReport> {
    let input = fs::read(source).map_err(|e| Error::io("read", source, e))?;
    let container = encode_container(&input)?;
    let output_bytes = persist_with(destination, |file| container.write_to(file))?;

    let report = TransferReport {
        input_bytes: input.len() as u64,
        output_bytes,
    };
    log::info!(
        "compressed {} into {} ({} -> {} bytes)",
        source.display(),
        destination.display(),
        report.input_bytes,
        report.output_bytes
    );
    Ok(report)
}

/// Decompresses the container at `source` into `destination`.
pub fn decompress_file(source: &Path, destination: &Path) -> Result<TransferReport> {
    let data = fs::read(source).map_err(|e| Error::io("read", source, e))?;
    let output = decode_container(&Container::from_bytes(&data)?)?;
    persist_with(destination, |file| file.write_all(&output))?;

    let report = TransferReport {
        input_bytes: data.len() as u64,
        output_bytes: output.len() as u64,
    };
    log::info!(
        "decompressed {} into {} ({} -> {} bytes)",
        source.display(),
        destination.display(),
        report.input_bytes,
        report.output_bytes
    );
    Ok(report)
}

/// Compresses `source` and uploads the container as `bucket`/`key`.
pub fn compress_and_store<S: BlobStore + ?Sized>(
    store: &S,
    config: &TransferConfig,
    source: &Path,
    bucket: &str,
    key: &str,
) -> Result<TransferReport> {
    let input = fs::read(source).map_err(|e| Error::io("read", source, e))?;
    let container = encode_container(&input)?;

    let mut staged = config.staging_file()?;
    container
        .write_to(staged.as_file_mut())
        .and_then(|_| staged.as_file_mut().flush())
        .map_err(|e| Error::io("write", staged.path(), e))?;
    let output_bytes = file_len(staged.path())?;

    let stored = store.store(staged.path(), bucket, key);
    discard(staged);
    stored?;

    Ok(TransferReport {
        input_bytes: input.len() as u64,
        output_bytes,
    })
}

/// Downloads `bucket`/`key` and decompresses it into `destination`.
pub fn retrieve_and_decompress<S: BlobStore + ?Sized>(
    store: &S,
    config: &TransferConfig,
    bucket: &str,
    key: &str,
    destination: &Path,
) -> Result<TransferReport> {
    let staged = config.staging_file()?;
    let retrieved = store
        .retrieve(bucket, key, staged.path())
        .and_then(|_| fs::read(staged.path()).map_err(|e| Error::io("read", staged.path(), e)));
    discard(staged);
    let data = retrieved?;

    let output = decode_container(&Container::from_bytes(&data)?)?;
    persist_with(destination, |file| file.write_all(&output))?;

    Ok(TransferReport {
        input_bytes: data.len() as u64,
        output_bytes: output.len() as u64,
    })
}

/// Writes `destination` through a sibling temporary file that replaces it
/// only once `write` has succeeded. Returns the number of bytes written.
fn persist_with<F>(destination: &Path, write: F) -> Result<u64>
where
    F: FnOnce(&mut fs::File) -> io::Result<()>,
{
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged =
        NamedTempFile::new_in(dir).map_err(|e| Error::io("create temporary file in", dir, e))?;

    write(staged.as_file_mut())
        .and_then(|_| staged.as_file_mut().sync_all())
        .map_err(|e| Error::io("write", destination, e))?;
    let written = file_len(staged.path())?;

    staged
        .persist(destination)
        .map_err(|e| Error::io("replace", destination, e.error))?;
    Ok(written)
}

fn file_len(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|meta| meta.len())
        .map_err(|e| Error::io("stat", path, e))
}

fn discard(staged: NamedTempFile) {
    let path = staged.path().to_path_buf();
    if let Err(e) = staged.close() {
        log::warn!("failed to remove staging file {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> TransferConfig {
        let staging = dir.join("staging");
        fs::create_dir_all(&staging).unwrap();
        TransferConfig {
            store_root: dir.join("buckets"),
            staging_dir: Some(staging),
        }
    }

    fn staging_is_empty(config: &TransferConfig) -> bool {
        let dir = config.staging_dir.as_ref().unwrap();
        fs::read_dir(dir).unwrap().next().is_none()
    }

    #[test]
    fn test_default_config() {
        let config = TransferConfig::default();
        assert_eq!(config.store_root, PathBuf::from("buckets"));
        assert!(config.staging_dir.is_none());
        assert_eq!(config.open_store().root(), Path::new("buckets"));
    }

    #[test]
    fn test_compress_decompress_file() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("input.txt");
        let packed = dir.path().join("input.huff");
        let restored = dir.path().join("restored.txt");
        let text = b"a file worth compressing, a file worth restoring".repeat(20);
        fs::write(&source, &text).unwrap();

        let report = compress_file(&source, &packed).unwrap();
        assert_eq!(report.input_bytes, text.len() as u64);
        assert_eq!(report.output_bytes, fs::metadata(&packed).unwrap().len());
        assert!(report.ratio() < 1.0);

        let report = decompress_file(&packed, &restored).unwrap();
        assert_eq!(report.output_bytes, text.len() as u64);
        assert_eq!(fs::read(&restored).unwrap(), text);
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("empty");
        let packed = dir.path().join("empty.huff");
        let restored = dir.path().join("restored");
        fs::write(&source, b"").unwrap();

        let report = compress_file(&source, &packed).unwrap();
        assert_eq!(report.ratio(), 0.0);
        decompress_file(&packed, &restored).unwrap();
        assert_eq!(fs::read(&restored).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_unreadable_source_leaves_destination() {
        let dir = tempdir().unwrap();
        let destination = dir.path().join("out.huff");
        fs::write(&destination, b"previous").unwrap();

        let err = compress_file(&dir.path().join("missing"), &destination).unwrap_err();
        assert!(matches!(err, Error::IoUnavailable { .. }));
        assert_eq!(fs::read(&destination).unwrap(), b"previous");
    }

    #[test]
    fn test_malformed_container_writes_nothing() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("broken.huff");
        let destination = dir.path().join("out.txt");
        fs::write(&source, b"a4\nb3\nno terminator").unwrap();

        let err = decompress_file(&source, &destination).unwrap_err();
        assert!(matches!(err, Error::MalformedContainer(_)));
        assert!(!destination.exists());
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_store_round_trip() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let store = config.open_store();
        let source = dir.path().join("report.csv");
        let restored = dir.path().join("restored.csv");
        let text = b"id,value\n1,10\n2,20\n3,30\n".repeat(40);
        fs::write(&source, &text).unwrap();

        let up = compress_and_store(&store, &config, &source, "reports", "q1.huff").unwrap();
        assert_eq!(up.input_bytes, text.len() as u64);
        assert!(staging_is_empty(&config));

        let down =
            retrieve_and_decompress(&store, &config, "reports", "q1.huff", &restored).unwrap();
        assert_eq!(down.input_bytes, up.output_bytes);
        assert_eq!(fs::read(&restored).unwrap(), text);
        assert!(staging_is_empty(&config));
    }

    #[test]
    fn test_failed_upload_cleans_staging() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let source = dir.path().join("input");
        fs::write(&source, b"data").unwrap();

        let err = compress_and_store(&config.open_store(), &config, &source, "..", "key")
            .unwrap_err();
        assert!(matches!(err, Error::Transfer(_)));
        assert!(staging_is_empty(&config));
    }

    #[test]
    fn test_missing_object() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let destination = dir.path().join("out");

        let err = retrieve_and_decompress(
            &config.open_store(),
            &config,
            "reports",
            "absent.huff",
            &destination,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Transfer(_)));
        assert!(!destination.exists());
        assert!(staging_is_empty(&config));
    }
}
