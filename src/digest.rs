use crate::store::ObjectStore;
use log::error;
use md5::{Digest, Md5};
use std::path::Path;
use tokio::io::AsyncReadExt;

const DIGEST_CHUNK_SIZE: usize = 8192;

/// Computes the MD5 hex digest of a file, streamed in fixed-size chunks so a
/// multi-gigabyte grid never sits in memory at once.
///
/// MD5 is the store-side fingerprint: S3-compatible backends report the ETag
/// of a single-part upload as the object's MD5.
pub async fn file_md5(path: &Path) -> Result<String, std::io::Error> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; DIGEST_CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compares a local file's content digest against the remote side's.
///
/// Verification is advisory: any failure while resolving either digest is
/// logged and reported as a mismatch, never propagated.
pub struct Verifier<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: ObjectStore + ?Sized> Verifier<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Returns `true` iff the local and remote digests are byte-equal hex
    /// strings. The local digest is computed from `local_path` when not
    /// supplied; the remote digest is resolved via [`ObjectStore::stat`] when
    /// not supplied. A remote with no content fingerprint verifies `false`.
    pub async fn verify(
        &self,
        local_path: &Path,
        key: &str,
        local_digest: Option<&str>,
        remote_digest: Option<&str>,
    ) -> bool {
        let local = match local_digest {
            Some(d) => d.to_string(),
            None => match file_md5(local_path).await {
                Ok(d) => d,
                Err(e) => {
                    error!(
                        "Error computing digest for {}: {}",
                        local_path.display(),
                        e
                    );
                    return false;
                }
            },
        };

        let remote = match remote_digest {
            Some(d) => Some(d.to_string()),
            None => match self.store.stat(key).await {
                Ok(d) => d,
                Err(e) => {
                    error!("Error verifying file integrity for {key}: {e}");
                    return false;
                }
            },
        };

        match remote {
            Some(r) => r == local,
            None => false,
        }
    }
}
