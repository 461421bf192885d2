use crate::error::GardenWeatherError;
use log::info;
use std::io;
use std::path::{Path, PathBuf};

const CACHE_DIR_NAME: &str = "garden_weather_cache";

pub fn get_cache_dir() -> Result<PathBuf, GardenWeatherError> {
    dirs::cache_dir()
        .ok_or(GardenWeatherError::CacheDirResolution)
        .map(|p| p.join(CACHE_DIR_NAME))
}

/// Creates `path` if missing; fails if something other than a directory is there.
pub async fn ensure_dir_exists(path: &Path) -> Result<(), GardenWeatherError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(GardenWeatherError::NotADirectory(path.to_path_buf()));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating directory: {}", path.display());
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|e| GardenWeatherError::DirCreation(path.to_path_buf(), e))
        }
        Err(e) => Err(GardenWeatherError::DirCreation(path.to_path_buf(), e)),
    }
}
