use std::path::PathBuf;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a single item. Recorded, never propagated out of a batch.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error("Invalid Url: {0}")]
    InvalidUrl(String),

    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server returned: {0}")]
    ServerStatus(String),

    #[error("Download url was not found!")]
    DownloadLinkNotFound,

    #[error("Title not found!")]
    TitleNotFound,

    #[error("Content-Length not provided")]
    SizeUnknown,

    #[error("cannot create {}: {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transfer to {} interrupted: {source}", .path.display())]
    TransferInterrupted {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("worker task failed: {0}")]
    Worker(String),
}

impl ItemError {
    pub(crate) fn fetch(url: &str, source: reqwest::Error) -> Self {
        ItemError::Fetch {
            url: url.to_string(),
            source,
        }
    }
}

/// Errors that stop a batch before any worker starts.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("failed to read url list {}: {source}", .path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no urls to download")]
    EmptyInput,

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("cannot determine default download directory: {0}")]
    NoDownloadDir(String),
}
