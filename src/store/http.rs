use crate::store::error::StoreError;
use crate::store::{ObjectStore, RemoteObject};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use log::{info, warn};
use reqwest::Client;
use std::io;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;

/// Read-only store over a plain HTTP file server such as the DWD open-data
/// mirror. Keys are resolved relative to the base URL and streamed to disk;
/// the server exposes no content fingerprint, so [`stat`](ObjectStore::stat)
/// always reports `None` and the engine falls back to presence checks.
///
/// Discovery of filenames (parsing the server's index page) is a separate
/// concern; this store only moves bytes for keys the caller already knows.
pub struct HttpFileStore {
    base_url: String,
    client: Client,
}

impl HttpFileStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            base_url,
            client: Client::new(),
        }
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}{}", self.base_url, key)
    }
}

#[async_trait]
impl ObjectStore for HttpFileStore {
    async fn list(&self, _prefix: &str) -> Result<Vec<RemoteObject>, StoreError> {
        // Index pages are HTML; link discovery happens outside the core.
        Err(StoreError::Unsupported("list"))
    }

    async fn get(&self, key: &str, local_path: &Path) -> Result<(), StoreError> {
        let url = self.url_for(key);
        info!("Downloading {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {url}: {e:?}");
                return Err(if let Some(status) = e.status() {
                    StoreError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    StoreError::NetworkRequest(url, e)
                });
            }
        };

        let stream = response
            .bytes_stream()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
        let mut reader = StreamReader::new(stream);

        let mut file = tokio::fs::File::create(local_path)
            .await
            .map_err(|e| StoreError::ObjectIo(key.to_string(), e))?;
        tokio::io::copy(&mut reader, &mut file)
            .await
            .map_err(|e| StoreError::ObjectIo(key.to_string(), e))?;
        file.flush()
            .await
            .map_err(|e| StoreError::ObjectIo(key.to_string(), e))?;

        Ok(())
    }

    async fn put(&self, _local_path: &Path, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unsupported("put"))
    }

    async fn stat(&self, _key: &str) -> Result<Option<String>, StoreError> {
        // No ETag-equivalent on a plain file server.
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let store = HttpFileStore::new("https://opendata.example/icon-d2");
        assert_eq!(
            store.url_for("00/t_2m/file.grib2.bz2"),
            "https://opendata.example/icon-d2/00/t_2m/file.grib2.bz2"
        );

        let slashed = HttpFileStore::new("https://opendata.example/icon-d2/");
        assert_eq!(slashed.url_for("a"), "https://opendata.example/icon-d2/a");
    }

    #[tokio::test]
    async fn list_and_put_are_unsupported() {
        let store = HttpFileStore::new("https://opendata.example/");
        assert!(matches!(
            store.list("").await,
            Err(StoreError::Unsupported("list"))
        ));
        assert!(matches!(
            store.put(Path::new("x"), "y").await,
            Err(StoreError::Unsupported("put"))
        ));
    }

    #[tokio::test]
    async fn stat_reports_no_fingerprint() {
        let store = HttpFileStore::new("https://opendata.example/");
        assert_eq!(store.stat("any").await.unwrap(), None);
    }
}
