//! In-memory store used by the transfer and verification tests: content is
//! held in a map, digests are real MD5s, and failures are injectable per key.

use crate::store::error::StoreError;
use crate::store::{ObjectStore, RemoteObject};
use async_trait::async_trait;
use md5::{Digest, Md5};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    // Remaining forced `get` failures per key.
    fail_gets: Mutex<HashMap<String, usize>>,
    // Keys whose reported digest is deliberately wrong.
    corrupt_digests: Mutex<HashSet<String>>,
    // When set, `list` and `stat` report no digest at all, like a plain
    // HTTP file server.
    digestless: AtomicBool,
    get_calls: AtomicUsize,
    put_calls: AtomicUsize,
}

fn md5_hex(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, key: &str, bytes: Vec<u8>) {
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
    }

    /// Makes the next `count` calls to `get` for `key` fail.
    pub(crate) fn fail_next_gets(&self, key: &str, count: usize) {
        self.fail_gets.lock().unwrap().insert(key.to_string(), count);
    }

    /// Makes `list` and `stat` report a bogus digest for `key`.
    pub(crate) fn corrupt_digest(&self, key: &str) {
        self.corrupt_digests.lock().unwrap().insert(key.to_string());
    }

    /// Makes the store stop reporting digests entirely.
    pub(crate) fn hide_digests(&self) {
        self.digestless.store(true, Ordering::SeqCst);
    }

    pub(crate) fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    fn digest_of(&self, key: &str, bytes: &[u8]) -> String {
        if self.corrupt_digests.lock().unwrap().contains(key) {
            "0000deadbeef0000".to_string()
        } else {
            md5_hex(bytes)
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list(&self, prefix: &str) -> Result<Vec<RemoteObject>, StoreError> {
        let objects = self.objects.lock().unwrap();
        let mut keys: Vec<&String> = objects.keys().filter(|k| k.starts_with(prefix)).collect();
        keys.sort();
        let digestless = self.digestless.load(Ordering::SeqCst);
        Ok(keys
            .into_iter()
            .map(|k| RemoteObject {
                key: k.clone(),
                digest: (!digestless).then(|| self.digest_of(k, &objects[k])),
            })
            .collect())
    }

    async fn get(&self, key: &str, local_path: &Path) -> Result<(), StoreError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(remaining) = self.fail_gets.lock().unwrap().get_mut(key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(StoreError::ObjectIo(
                    key.to_string(),
                    io::Error::other("injected failure"),
                ));
            }
        }

        let bytes = self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        tokio::fs::write(local_path, bytes)
            .await
            .map_err(|e| StoreError::ObjectIo(key.to_string(), e))
    }

    async fn put(&self, local_path: &Path, key: &str) -> Result<Option<String>, StoreError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);

        let bytes = tokio::fs::read(local_path)
            .await
            .map_err(|e| StoreError::ObjectIo(key.to_string(), e))?;
        let digest = self.digest_of(key, &bytes);
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(Some(digest))
    }

    async fn stat(&self, key: &str) -> Result<Option<String>, StoreError> {
        let objects = self.objects.lock().unwrap();
        let bytes = objects
            .get(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        if self.digestless.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(self.digest_of(key, bytes)))
    }
}
