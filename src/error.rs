use crate::filter::error::FilterError;
use crate::store::error::StoreError;
use crate::transfer::error::TransferError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DwdsyncError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}
