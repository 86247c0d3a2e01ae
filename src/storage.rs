//! Blob storage collaborator.
//!
//! Compressed containers are handed to a [`BlobStore`] as local files and
//! fetched back the same way. The store only moves opaque bytes; it never
//! looks inside them. Failures are reported once and never retried.

use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Object storage keyed by name within a named bucket.
pub trait BlobStore {
    /// Uploads the file at `local_path` as object `key` in `bucket`.
    ///
    /// # Errors
    /// * `Error::IoUnavailable` - `local_path` cannot be read
    /// * `Error::Transfer` - the store rejects or fails the upload
    fn store(&self, local_path: &Path, bucket: &str, key: &str) -> Result<()>;

    /// Downloads object `key` of `bucket` into `local_path`.
    ///
    /// # Errors
    /// * `Error::Transfer` - the object does not exist or cannot be fetched
    /// * `Error::IoUnavailable` - `local_path` cannot be written
    fn retrieve(&self, bucket: &str, key: &str, local_path: &Path) -> Result<()>;
}

/// Blob store backed by a local directory.
///
/// Each bucket is a sub-directory of the root and each object a file named
/// after its key. Objects are published with a rename, so readers never see
/// a half-written object.
#[derive(Debug, Clone)]
pub struct DirBlobStore {
    root: PathBuf,
}

impl DirBlobStore {
    /// Creates a store rooted at `root`. The directory is created lazily on
    /// the first upload.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        DirBlobStore {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf> {
        validate_name("bucket", bucket)?;
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        validate_name("key", key)?;
        Ok(self.bucket_dir(bucket)?.join(key))
    }
}

impl BlobStore for DirBlobStore {
    fn store(&self, local_path: &Path, bucket: &str, key: &str) -> Result<()> {
        let object = self.object_path(bucket, key)?;
        let bucket_dir = self.bucket_dir(bucket)?;

        let mut source =
            fs::File::open(local_path).map_err(|e| Error::io("open", local_path, e))?;

        fs::create_dir_all(&bucket_dir)
            .map_err(|e| transfer_error("create bucket", bucket, key, e))?;
        let mut staged = NamedTempFile::new_in(&bucket_dir)
            .map_err(|e| transfer_error("stage upload", bucket, key, e))?;
        let size = io::copy(&mut source, staged.as_file_mut())
            .map_err(|e| transfer_error("upload", bucket, key, e))?;
        staged
            .persist(&object)
            .map_err(|e| transfer_error("publish", bucket, key, e.error))?;

        log::info!("stored {} bytes as {}/{}", size, bucket, key);
        Ok(())
    }

    fn retrieve(&self, bucket: &str, key: &str, local_path: &Path) -> Result<()> {
        let object = self.object_path(bucket, key)?;

        let mut source = match fs::File::open(&object) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::Transfer(format!(
                    "no object {}/{} in {}",
                    bucket,
                    key,
                    self.root.display()
                )));
            }
            Err(e) => return Err(transfer_error("download", bucket, key, e)),
        };

        let mut target =
            fs::File::create(local_path).map_err(|e| Error::io("create", local_path, e))?;
        let size = io::copy(&mut source, &mut target)
            .map_err(|e| transfer_error("download", bucket, key, e))?;

        log::info!(
            "retrieved {}/{} ({} bytes) into {}",
            bucket,
            key,
            size,
            local_path.display()
        );
        Ok(())
    }
}

fn transfer_error(action: &str, bucket: &str, key: &str, source: io::Error) -> Error {
    Error::Transfer(format!("failed to {} {}/{}: {}", action, bucket, key, source))
}

/// Bucket and key names must map to exactly one path component.
fn validate_name(kind: &str, name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(|c: char| matches!(c, '/' | '\\' | '\0'));
    if valid {
        Ok(())
    } else {
        Err(Error::Transfer(format!("invalid {} name {:?}", kind, name)))
    }
}
