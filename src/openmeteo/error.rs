use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to read metadata for cache file '{0}'")]
    CacheMetadataRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to read cache file '{0}'")]
    CacheRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to write cache file '{0}'")]
    CacheWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to build request URL from '{base}': {reason}")]
    InvalidUrl { base: String, reason: String },

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Provider rejected request {url} with status {status}: {reason}")]
    Provider {
        url: String,
        status: reqwest::StatusCode,
        reason: String,
    },

    #[error("Giving up on {url} after {attempts} attempts")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        last_error: Box<FetchError>,
    },

    #[error("Failed to parse provider response")]
    JsonParse(#[from] serde_json::Error),

    #[error("Response has no {resolution} section")]
    MissingSection { resolution: &'static str },

    #[error("Response is missing requested {resolution} variable '{variable}'")]
    MissingVariable {
        resolution: &'static str,
        variable: String,
    },

    #[error("{resolution} variable '{variable}' has {found} values but the time axis has {expected} ticks")]
    SeriesLengthMismatch {
        resolution: &'static str,
        variable: String,
        expected: usize,
        found: usize,
    },

    #[error("Timestamp {0} is outside the representable range")]
    TimestampOutOfRange(i64),

    #[error("Requested fetch window is empty")]
    EmptyWindow,

    #[error("Failed to build {resolution} DataFrame")]
    DataFrameBuild {
        resolution: &'static str,
        #[source]
        source: PolarsError,
    },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
