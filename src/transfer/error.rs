use crate::filter::error::FilterError;
use crate::store::error::StoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Failed to enumerate remote objects under prefix '{prefix}'")]
    Enumerate {
        prefix: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to create destination directory '{0}'")]
    DestinationDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to read local file '{0}' for digest")]
    LocalDigest(PathBuf, #[source] std::io::Error),

    #[error("Transfer worker pool must have at least one job")]
    NoWorkers,

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
