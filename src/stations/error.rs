use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    // Covers errors while streaming the response body
    #[error("Station list download failed")]
    DownloadIo(#[from] std::io::Error),

    #[error("Failed to read station list file '{0}'")]
    FileRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse station list")]
    CsvParse(#[source] PolarsError),

    #[error("Station list has {found} columns, expected at least {expected}")]
    SchemaMismatch { expected: usize, found: usize },

    #[error("Station list from {0} contains no usable stations")]
    EmptyCatalog(String),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("No station named '{city}' in '{country}'")]
    StationNotFound { country: String, city: String },

    #[error("Unknown country '{0}'")]
    UnknownCountry(String),
}
