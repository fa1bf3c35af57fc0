pub mod error;
pub mod http;
#[cfg(test)]
pub(crate) mod memory;

use crate::store::error::StoreError;
use async_trait::async_trait;
use std::path::Path;

/// One remote object as reported by an enumeration: its key and, when the
/// backend provides one, its ETag-equivalent content fingerprint (hex MD5 for
/// single-part S3 objects).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    pub key: String,
    pub digest: Option<String>,
}

/// The remote side of a transfer: an externally defined storage protocol
/// reduced to the four operations the engine needs.
///
/// Implementations must be shareable across worker tasks. Backends without a
/// content fingerprint (plain HTTP file servers) return `Ok(None)` from
/// [`stat`](ObjectStore::stat) and may reject [`list`](ObjectStore::list) or
/// [`put`](ObjectStore::put) with [`StoreError::Unsupported`].
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Enumerates the objects under `prefix`, with their digests.
    async fn list(&self, prefix: &str) -> Result<Vec<RemoteObject>, StoreError>;

    /// Fetches one object, writing its bytes to `local_path`.
    async fn get(&self, key: &str, local_path: &Path) -> Result<(), StoreError>;

    /// Stores a local file under `key`, returning the digest the backend
    /// reports for the stored object, if any.
    async fn put(&self, local_path: &Path, key: &str) -> Result<Option<String>, StoreError>;

    /// Looks up the content digest of one object without fetching it.
    async fn stat(&self, key: &str) -> Result<Option<String>, StoreError>;
}
