mod digest;
mod error;
mod filter;
mod fsops;
mod store;
mod transfer;

pub use error::DwdsyncError;

pub use filter::advanced::advanced_filter;
pub use filter::category::{category_of, numeric_tag};
pub use filter::error::FilterError;
pub use filter::simple::simple_filter;
pub use filter::spec::{FilterSpec, IncludeMode};
pub use filter::timestep::{timestep_tokens, DEFAULT_MAX_TIMESTEP, DEFAULT_MIN_TIMESTEP};

pub use store::error::StoreError;
pub use store::http::HttpFileStore;
pub use store::{ObjectStore, RemoteObject};

pub use transfer::error::TransferError;
pub use transfer::results::{RunReport, RunResults};
pub use transfer::{TransferConfig, TransferEngine, TransferItem, TransferOutcome};
