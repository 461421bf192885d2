use crate::openmeteo::error::FetchError;
use crate::transform::error::TransformError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GardenWeatherError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("Failed to read config file '{0}'")]
    ConfigRead(PathBuf, #[source] std::io::Error),

    #[error("Invalid config file '{0}'")]
    ConfigParse(PathBuf, #[source] serde_json::Error),

    #[error("Failed to create directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Path exists but is not a directory: '{0}'")]
    NotADirectory(PathBuf),

    #[error("Could not determine the system cache directory")]
    CacheDirResolution,
}
