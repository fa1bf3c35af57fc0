//! Concurrent transfer of a filtered file set between a local directory and a
//! remote object store, with per-item delay throttling, bounded retries, and
//! digest verification.

pub mod error;
mod report;
pub mod results;

use crate::digest::{file_md5, Verifier};
use crate::filter::advanced::advanced_filter;
use crate::filter::simple::simple_filter;
use crate::filter::spec::FilterSpec;
use crate::fsops;
use crate::store::{ObjectStore, RemoteObject};
use crate::transfer::error::TransferError;
use crate::transfer::report::write_report_files;
use crate::transfer::results::{RunReport, RunResults};
use bon::Builder;
use log::{error, info, warn};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Tuning knobs for a transfer run.
#[derive(Debug, Clone, Builder)]
pub struct TransferConfig {
    /// Number of concurrent transfer workers. 1 means fully sequential.
    #[builder(default = 1)]
    pub n_jobs: usize,

    /// Pause each worker observes before its network call, throttling load on
    /// a rate-limited server.
    #[builder(default)]
    pub delay: Duration,

    /// Additional sequential attempts for items that failed the parallel
    /// pass.
    #[builder(default)]
    pub retry: u32,

    /// Re-verify presence inside the worker just before transferring (the
    /// build pass already skips verified items; this guards against files
    /// appearing between the two).
    #[builder(default)]
    pub check_existing: bool,

    /// When set, one newline-delimited report file per result set is written
    /// here after each run.
    pub report_dir: Option<PathBuf>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            n_jobs: 1,
            delay: Duration::ZERO,
            retry: 0,
            check_existing: false,
            report_dir: None,
        }
    }
}

/// One unit of transfer work: a local/remote pair with whichever digests are
/// already known. Consumed by exactly one worker per attempt.
#[derive(Debug, Clone)]
pub struct TransferItem {
    pub key: String,
    pub local_path: PathBuf,
    pub local_digest: Option<String>,
    pub remote_digest: Option<String>,
}

/// The classified result of a single transfer attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Success,
    AlreadyPresent,
    Corrupted,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Download,
    Upload,
}

impl Operation {
    fn noun(self) -> &'static str {
        match self {
            Operation::Download => "download",
            Operation::Upload => "upload",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Operation::Download => "Downloaded",
            Operation::Upload => "Uploaded",
        }
    }
}

/// Orchestrates concurrent transfers between `files_path` and an
/// [`ObjectStore`].
///
/// The engine takes its collaborators by injection: the store is any
/// `ObjectStore` implementation and the configuration is a plain value, so
/// every piece is independently testable. A run never fails because of an
/// individual item; per-item faults are classified into the returned
/// [`RunReport`] and only scheduler-level faults (enumeration, destination
/// directory creation, worker pool) surface as errors.
///
/// # Examples
///
/// ```no_run
/// use dwdsync::{FilterSpec, HttpFileStore, TransferConfig, TransferEngine};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn run() -> Result<(), dwdsync::DwdsyncError> {
/// let store = Arc::new(HttpFileStore::new(
///     "https://opendata.dwd.de/weather/nwp/icon-d2/grib/00/t_2m/",
/// ));
/// let config = TransferConfig::builder()
///     .n_jobs(4)
///     .delay(Duration::from_secs(1))
///     .retry(3)
///     .build();
/// let engine = TransferEngine::new(store, "downloaded_files", config);
///
/// let filter = FilterSpec::builder()
///     .prefix("icon-d2_germany")
///     .suffix(".grib2.bz2")
///     .exclude(vec!["icosahedral".to_string()])
///     .build()
///     .with_timestep_range(Some(0), Some(12))?;
/// // Filenames come from an external link-discovery step; the plain HTTP
/// // server cannot enumerate itself.
/// let discovered = vec![
///     "icon-d2_germany_regular-lat-lon_single-level_2026082900_000_2d_t_2m.grib2.bz2".to_string(),
/// ];
/// let report = engine.download_keys(&discovered, &filter, None, None).await?;
/// println!("{} downloaded, {} failed", report.succeeded.len(), report.failed.len());
/// # Ok(())
/// # }
/// ```
pub struct TransferEngine<S> {
    store: Arc<S>,
    files_path: PathBuf,
    config: TransferConfig,
}

impl<S: ObjectStore + 'static> TransferEngine<S> {
    pub fn new(store: Arc<S>, files_path: impl Into<PathBuf>, config: TransferConfig) -> Self {
        Self {
            store,
            files_path: files_path.into(),
            config,
        }
    }

    /// Downloads the remote objects under `remote_prefix` that survive the
    /// simple and advanced filters, mirroring their keys below the engine's
    /// local directory.
    ///
    /// Items whose local copy already verifies against the remote digest are
    /// recorded as succeeded without a transfer, so re-running an unchanged
    /// sync moves no bytes.
    ///
    /// # Errors
    ///
    /// Only scheduler-level faults: remote enumeration, destination directory
    /// creation, a zero-sized worker pool, or a panicked worker.
    pub async fn download(
        &self,
        filter: &FilterSpec,
        categories: Option<&[String]>,
        patterns: Option<&HashMap<String, Vec<i64>>>,
        remote_prefix: &str,
    ) -> Result<RunReport, TransferError> {
        self.ensure_jobs()?;

        let remote = self
            .store
            .list(remote_prefix)
            .await
            .map_err(|source| TransferError::Enumerate {
                prefix: remote_prefix.to_string(),
                source,
            })?;
        self.download_objects(remote, filter, categories, patterns)
            .await
    }

    /// Like [`download`](Self::download), but for a caller-supplied candidate
    /// list instead of a remote enumeration. This is the entry point for
    /// stores that cannot enumerate themselves, such as an HTTP file server
    /// whose index pages were parsed by an external link-discovery step.
    ///
    /// # Errors
    ///
    /// Same as [`download`](Self::download), minus remote enumeration.
    pub async fn download_keys(
        &self,
        keys: &[String],
        filter: &FilterSpec,
        categories: Option<&[String]>,
        patterns: Option<&HashMap<String, Vec<i64>>>,
    ) -> Result<RunReport, TransferError> {
        self.ensure_jobs()?;

        let remote = keys
            .iter()
            .map(|k| RemoteObject {
                key: k.clone(),
                digest: None,
            })
            .collect();
        self.download_objects(remote, filter, categories, patterns)
            .await
    }

    async fn download_objects(
        &self,
        remote: Vec<RemoteObject>,
        filter: &FilterSpec,
        categories: Option<&[String]>,
        patterns: Option<&HashMap<String, Vec<i64>>>,
    ) -> Result<RunReport, TransferError> {
        let digests: HashMap<String, Option<String>> = remote
            .iter()
            .map(|o| (o.key.clone(), o.digest.clone()))
            .collect();
        let keys: Vec<String> = remote.into_iter().map(|o| o.key).collect();

        let selected = dedupe(advanced_filter(
            &simple_filter(&keys, filter),
            categories,
            patterns,
        ));
        if selected.is_empty() {
            info!("No files matched the download filters.");
            return Ok(RunReport::default());
        }

        let results = Arc::new(RunResults::default());
        let mut work = Vec::new();
        for key in &selected {
            let local_path = self.files_path.join(key);
            if let Some(parent) = local_path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    TransferError::DestinationDirCreation(parent.to_path_buf(), e)
                })?;
            }
            let remote_digest = digests.get(key).cloned().flatten();
            if already_present(
                self.store.as_ref(),
                &local_path,
                key,
                remote_digest.as_deref(),
                self.config.check_existing,
            )
            .await
            {
                info!("Skipping already downloaded file: {key}");
                results.record_success(key, &local_path);
                continue;
            }
            work.push(TransferItem {
                key: key.clone(),
                local_path,
                local_digest: None,
                remote_digest,
            });
        }

        if work.is_empty() {
            info!("All files are already downloaded and verified.");
            let report = results.snapshot();
            self.finish(Operation::Download, &report).await;
            return Ok(report);
        }

        info!("Starting download of {} files...", work.len());
        self.run_pool(Operation::Download, work.clone(), &results).await?;
        self.retry_failed(Operation::Download, &work, &results).await;

        let report = results.snapshot();
        self.finish(Operation::Download, &report).await;
        Ok(report)
    }

    /// Uploads the local files below the engine's directory that survive the
    /// simple and advanced filters, keyed by their relative path under
    /// `remote_prefix`.
    ///
    /// With `check_existing` set, files whose basename already exists
    /// remotely with a matching digest are recorded as succeeded without a
    /// transfer.
    ///
    /// # Errors
    ///
    /// Only scheduler-level faults: remote enumeration, an unreadable local
    /// file during digest pre-computation, a zero-sized worker pool, or a
    /// panicked worker.
    pub async fn upload(
        &self,
        filter: &FilterSpec,
        categories: Option<&[String]>,
        patterns: Option<&HashMap<String, Vec<i64>>>,
        remote_prefix: &str,
    ) -> Result<RunReport, TransferError> {
        self.ensure_jobs()?;

        let filenames = fsops::search_directory(&self.files_path, "");
        let selected = dedupe(advanced_filter(
            &simple_filter(&filenames, filter),
            categories,
            patterns,
        ));
        if selected.is_empty() {
            info!("No files to upload from '{}'.", self.files_path.display());
            return Ok(RunReport::default());
        }

        // Basename -> digest of what the bucket already holds.
        let existing: HashMap<String, Option<String>> = if self.config.check_existing {
            self.store
                .list(remote_prefix)
                .await
                .map_err(|source| TransferError::Enumerate {
                    prefix: remote_prefix.to_string(),
                    source,
                })?
                .into_iter()
                .filter_map(|o| {
                    Path::new(&o.key)
                        .file_name()
                        .map(|n| (n.to_string_lossy().to_string(), o.digest))
                })
                .collect()
        } else {
            HashMap::new()
        };

        let results = Arc::new(RunResults::default());
        let mut work = Vec::new();
        for path_str in &selected {
            let local_path = PathBuf::from(path_str);
            let local_digest = file_md5(&local_path)
                .await
                .map_err(|e| TransferError::LocalDigest(local_path.clone(), e))?;
            let key = self.remote_key_for(&local_path, remote_prefix);

            let basename = local_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if let Some(Some(remote_digest)) = existing.get(&basename) {
                if *remote_digest == local_digest {
                    info!("Skipping already uploaded file: {basename}");
                    results.record_success(&key, &local_path);
                    continue;
                }
            }

            work.push(TransferItem {
                key,
                local_path,
                local_digest: Some(local_digest),
                remote_digest: None,
            });
        }

        if work.is_empty() {
            info!("All files are already uploaded and verified.");
            let report = results.snapshot();
            self.finish(Operation::Upload, &report).await;
            return Ok(report);
        }

        info!("Starting upload of {} files...", work.len());
        self.run_pool(Operation::Upload, work.clone(), &results).await?;
        self.retry_failed(Operation::Upload, &work, &results).await;

        let report = results.snapshot();
        self.finish(Operation::Upload, &report).await;
        Ok(report)
    }

    /// Deletes the local files of succeeded items and prunes empty
    /// directories left behind. Intended to run after the caller has
    /// inspected the report.
    pub fn delete_transferred(&self, report: &RunReport) {
        fsops::delete_files_safely(&report.local_files, "transferred file");
        fsops::cleanup_empty_dirs(&self.files_path);
    }

    fn ensure_jobs(&self) -> Result<(), TransferError> {
        if self.config.n_jobs == 0 {
            return Err(TransferError::NoWorkers);
        }
        Ok(())
    }

    fn remote_key_for(&self, local_path: &Path, remote_prefix: &str) -> String {
        let rel = local_path.strip_prefix(&self.files_path).unwrap_or(local_path);
        let rel: String = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if remote_prefix.is_empty() {
            rel
        } else {
            format!("{}/{}", remote_prefix.trim_end_matches('/'), rel)
        }
    }

    async fn run_pool(
        &self,
        operation: Operation,
        work: Vec<TransferItem>,
        results: &Arc<RunResults>,
    ) -> Result<(), TransferError> {
        let semaphore = Arc::new(Semaphore::new(self.config.n_jobs));
        let mut tasks: JoinSet<()> = JoinSet::new();

        for item in work {
            let store = Arc::clone(&self.store);
            let results = Arc::clone(results);
            let semaphore = Arc::clone(&semaphore);
            let delay = self.config.delay;
            let recheck = self.config.check_existing;
            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    // The semaphore is never closed during a run.
                    Err(_) => return,
                };
                let key = item.key.clone();
                let local_path = item.local_path.clone();
                let outcome = transfer_one(store.as_ref(), operation, delay, recheck, item).await;
                record_outcome(&results, &key, &local_path, &outcome);
            });
        }

        while let Some(joined) = tasks.join_next().await {
            joined?;
        }
        Ok(())
    }

    /// Sequential on purpose: the remote already refused these items once, so
    /// the retry pass must not amplify load.
    async fn retry_failed(&self, operation: Operation, items: &[TransferItem], results: &RunResults) {
        if self.config.retry == 0 {
            return;
        }
        let failed = results.failed_keys();
        if failed.is_empty() {
            return;
        }

        warn!(
            "Retrying {} failed {}s up to {} times...",
            failed.len(),
            operation.noun(),
            self.config.retry
        );

        for key in failed {
            let Some(item) = items.iter().find(|i| i.key == key) else {
                continue;
            };
            for attempt in 1..=self.config.retry {
                info!("Retrying {} (attempt {}/{})...", key, attempt, self.config.retry);
                let outcome = transfer_one(
                    self.store.as_ref(),
                    operation,
                    self.config.delay,
                    self.config.check_existing,
                    item.clone(),
                )
                .await;
                match &outcome {
                    TransferOutcome::Failed(reason) => {
                        error!("Retry {attempt} failed for {key}: {reason}");
                    }
                    _ => {
                        record_outcome(results, &key, &item.local_path, &outcome);
                        break;
                    }
                }
            }
        }
    }

    async fn finish(&self, operation: Operation, report: &RunReport) {
        info!(
            "{} {} files successfully.",
            operation.verb(),
            report.succeeded.len()
        );
        if !report.corrupted.is_empty() {
            warn!("{} files may be corrupted.", report.corrupted.len());
        }
        if !report.failed.is_empty() {
            error!(
                "Failed to {} {} files after {} retries.",
                operation.noun(),
                report.failed.len(),
                self.config.retry
            );
        }
        if let Some(dir) = &self.config.report_dir {
            write_report_files(dir, operation.noun(), report).await;
        }
    }
}

fn dedupe(filenames: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    filenames
        .into_iter()
        .filter(|f| seen.insert(f.clone()))
        .collect()
}

/// True when the local file exists and matches the remote side. A digest is
/// always trusted when it verifies; for remotes without a content fingerprint
/// bare presence counts only when `trust_presence` is set, since a stale or
/// truncated local copy is indistinguishable from a complete one. A failed
/// metadata lookup errs toward re-transferring.
async fn already_present<S: ObjectStore + ?Sized>(
    store: &S,
    local_path: &Path,
    key: &str,
    remote_digest: Option<&str>,
    trust_presence: bool,
) -> bool {
    if tokio::fs::metadata(local_path).await.is_err() {
        return false;
    }
    let remote_digest = match remote_digest {
        Some(d) => Some(d.to_string()),
        None => match store.stat(key).await {
            Ok(d) => d,
            Err(_) => return false,
        },
    };
    match remote_digest {
        Some(d) => {
            Verifier::new(store)
                .verify(local_path, key, None, Some(&d))
                .await
        }
        None => trust_presence,
    }
}

async fn transfer_one<S: ObjectStore + ?Sized>(
    store: &S,
    operation: Operation,
    delay: Duration,
    recheck: bool,
    item: TransferItem,
) -> TransferOutcome {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    match operation {
        Operation::Download => download_one(store, recheck, item).await,
        Operation::Upload => upload_one(store, item).await,
    }
}

async fn download_one<S: ObjectStore + ?Sized>(
    store: &S,
    recheck: bool,
    item: TransferItem,
) -> TransferOutcome {
    if recheck
        && already_present(
            store,
            &item.local_path,
            &item.key,
            item.remote_digest.as_deref(),
            true,
        )
        .await
    {
        return TransferOutcome::AlreadyPresent;
    }

    match store.get(&item.key, &item.local_path).await {
        Ok(()) => {
            let remote_digest = match &item.remote_digest {
                Some(d) => Some(d.clone()),
                None => store.stat(&item.key).await.ok().flatten(),
            };
            match remote_digest {
                // No fingerprint to compare against; the bytes arrived.
                None => TransferOutcome::Success,
                Some(d) => {
                    if Verifier::new(store)
                        .verify(&item.local_path, &item.key, None, Some(&d))
                        .await
                    {
                        TransferOutcome::Success
                    } else {
                        TransferOutcome::Corrupted
                    }
                }
            }
        }
        Err(e) => TransferOutcome::Failed(e.to_string()),
    }
}

async fn upload_one<S: ObjectStore + ?Sized>(store: &S, item: TransferItem) -> TransferOutcome {
    let local_digest = match &item.local_digest {
        Some(d) => d.clone(),
        None => match file_md5(&item.local_path).await {
            Ok(d) => d,
            Err(e) => return TransferOutcome::Failed(e.to_string()),
        },
    };

    match store.put(&item.local_path, &item.key).await {
        Ok(reported) => {
            let remote_digest = match reported {
                Some(d) => Some(d),
                None => store.stat(&item.key).await.ok().flatten(),
            };
            match remote_digest {
                None => TransferOutcome::Success,
                Some(d) if d == local_digest => TransferOutcome::Success,
                Some(_) => TransferOutcome::Corrupted,
            }
        }
        Err(e) => TransferOutcome::Failed(e.to_string()),
    }
}

fn record_outcome(results: &RunResults, key: &str, local_path: &Path, outcome: &TransferOutcome) {
    match outcome {
        TransferOutcome::Success => {
            info!("Successfully transferred: {key}");
            results.record_success(key, local_path);
        }
        TransferOutcome::AlreadyPresent => {
            info!("Skipping already transferred file: {key}");
            results.record_success(key, local_path);
        }
        TransferOutcome::Corrupted => {
            warn!("Hash mismatch: {key} (possible corruption).");
            results.record_corrupted(key);
        }
        TransferOutcome::Failed(reason) => {
            error!("Failed to transfer {key}: {reason}");
            results.record_failure(key);
        }
    }
}
