//! Filesystem implementation of the BlobStore trait.
//!
//! Layout: `{root}/{h[0]}/{h[0..2]}/{h}` where `h` is the hex digest. The
//! two prefix levels keep any single directory small.
//!
//! Blobs are written to a temp file in their shard directory and renamed into
//! place, so readers never observe a partially written blob. Racing `put`s of
//! the same bytes both succeed and leave one file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use tracing::{debug, info};

use depot_core::Digest;

use crate::error::{Result, StoreError};
use crate::traits::BlobStore;

const TEMP_SUFFIX: &str = ".tmp";

/// Directory-backed blob store.
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
    temp_counter: AtomicU64,
}

impl FsBlobStore {
    /// Open (creating if needed) a blob directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        info!(root = %root.display(), "opened blob directory");
        Ok(Self {
            root,
            temp_counter: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final location of the blob with this digest.
    pub fn blob_path(&self, digest: &Digest) -> PathBuf {
        let hex = digest.to_hex();
        self.root.join(&hex[..1]).join(&hex[..2]).join(&hex)
    }

    fn temp_path(&self, path: &Path) -> PathBuf {
        let n = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        let name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!("{}.{}.{}{}", name, std::process::id(), n, TEMP_SUFFIX))
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, bytes: &[u8]) -> Result<Digest> {
        let digest = Digest::of(bytes);
        let path = self.blob_path(&digest);

        if path.is_file() {
            debug!(%digest, "blob already present");
            return Ok(digest);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path(&path);
        let written = File::create(&temp).and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&temp);
            return Err(StoreError::Io(e));
        }

        if let Err(e) = fs::rename(&temp, &path) {
            let _ = fs::remove_file(&temp);
            // Another writer got there first with the same content.
            if path.is_file() {
                return Ok(digest);
            }
            return Err(StoreError::Io(e));
        }

        debug!(%digest, len = bytes.len(), "stored blob");
        Ok(digest)
    }

    fn get(&self, digest: &Digest) -> Result<Bytes> {
        match fs::read(self.blob_path(digest)) {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::BlobNotFound(*digest)),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn contains(&self, digest: &Digest) -> Result<bool> {
        Ok(self.blob_path(digest).is_file())
    }

    fn len(&self) -> Result<usize> {
        let mut count = 0;
        for level1 in fs::read_dir(&self.root)? {
            let level1 = level1?;
            if !level1.file_type()?.is_dir() {
                continue;
            }
            for level2 in fs::read_dir(level1.path())? {
                let level2 = level2?;
                if !level2.file_type()?.is_dir() {
                    continue;
                }
                for blob in fs::read_dir(level2.path())? {
                    let blob = blob?;
                    let is_temp = blob.file_name().to_string_lossy().ends_with(TEMP_SUFFIX);
                    if blob.file_type()?.is_file() && !is_temp {
                        count += 1;
                    }
                }
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_sharded_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).unwrap();

        let digest = store.put(b"ABC").unwrap();
        let hex = digest.to_hex();
        let expected = dir.path().join(&hex[..1]).join(&hex[..2]).join(&hex);

        assert_eq!(store.blob_path(&digest), expected);
        assert!(expected.is_file());
        assert_eq!(fs::read(expected).unwrap(), b"ABC");
    }

    #[test]
    fn test_put_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).unwrap();

        let d1 = store.put(b"ABC").unwrap();
        let d2 = store.put(b"ABC").unwrap();
        store.put(b"other").unwrap();

        assert_eq!(d1, d2);
        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.get(&d1).unwrap().as_ref(), b"ABC");
    }

    #[test]
    fn test_get_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).unwrap();
        let digest = Digest::of(b"absent");

        assert!(!store.contains(&digest).unwrap());
        assert!(matches!(store.get(&digest), Err(StoreError::BlobNotFound(_))));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_empty_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).unwrap();

        let digest = store.put(b"").unwrap();
        assert!(store.get(&digest).unwrap().is_empty());
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_concurrent_puts_of_same_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FsBlobStore::open(dir.path()).unwrap());
        let payload = vec![7u8; 64 * 1024];

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let payload = payload.clone();
                std::thread::spawn(move || store.put(&payload).unwrap())
            })
            .collect();

        let digests: Vec<Digest> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(digests.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.get(&digests[0]).unwrap().as_ref(), payload.as_slice());
    }

    #[test]
    fn test_reopen_sees_existing_blobs() {
        let dir = tempfile::tempdir().unwrap();
        let digest = FsBlobStore::open(dir.path()).unwrap().put(b"persist").unwrap();

        let store = FsBlobStore::open(dir.path()).unwrap();
        assert!(store.contains(&digest).unwrap());
        assert_eq!(store.get(&digest).unwrap().as_ref(), b"persist");
    }
}
