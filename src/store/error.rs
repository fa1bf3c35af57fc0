use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("I/O error for object '{0}'")]
    ObjectIo(String, #[source] std::io::Error),

    #[error("Remote object '{0}' not found")]
    NotFound(String),

    #[error("Operation '{0}' is not supported by this store")]
    Unsupported(&'static str),
}
