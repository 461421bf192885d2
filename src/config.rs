//! Run parameters shared by every stage.

use crate::error::GardenWeatherError;
use crate::openmeteo::retry::RetryPolicy;
use crate::types::coordinate::LatLon;
use crate::types::units::Units;
use crate::utils::get_cache_dir;
use chrono::{Datelike, NaiveDate};
use log::info;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a pipeline run.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
///
/// # Examples
///
/// ```
/// use garden_weather::PipelineConfig;
///
/// let config = PipelineConfig::from_json_str(r#"{"past_days": 3}"#).unwrap();
/// assert_eq!(config.past_days, 3);
/// assert_eq!(config.forecast_days, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub location: LatLon,
    /// IANA zone name; dates and hours are reported in this zone. When a run
    /// has no explicit date, today is taken at the provider's UTC offset for
    /// this zone.
    pub timezone: String,
    pub units: Units,
    pub historical_start: NaiveDate,
    /// Last archive date of the historical table. `None` means December 31
    /// of the year before the run.
    pub historical_end: Option<NaiveDate>,
    /// Days before today included in the forecast request.
    pub past_days: u32,
    pub forecast_days: u32,
    pub output_dir: PathBuf,
    pub file_prefix: String,
    /// `None` resolves to a directory under the system cache.
    pub cache_dir: Option<PathBuf>,
    pub forecast_cache_ttl_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            location: LatLon(42.9675, -88.54972222),
            timezone: "America/Chicago".to_string(),
            units: Units::default(),
            historical_start: NaiveDate::from_ymd_opt(1940, 1, 1).unwrap_or(NaiveDate::MIN),
            historical_end: None,
            past_days: 2,
            forecast_days: 7,
            output_dir: PathBuf::from("."),
            file_prefix: "MKE Weather Data".to_string(),
            cache_dir: None,
            forecast_cache_ttl_secs: 3_600,
            retry: RetryPolicy::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub async fn from_json_file(path: &Path) -> Result<Self, GardenWeatherError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GardenWeatherError::ConfigRead(path.to_path_buf(), e))?;
        let config = Self::from_json_str(&json)
            .map_err(|e| GardenWeatherError::ConfigParse(path.to_path_buf(), e))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Explicit `historical_end`, or December 31 of the year before `run_date`.
    pub fn historical_end_for(&self, run_date: NaiveDate) -> NaiveDate {
        self.historical_end.unwrap_or_else(|| {
            NaiveDate::from_ymd_opt(run_date.year() - 1, 12, 31).unwrap_or(run_date)
        })
    }

    pub fn forecast_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.forecast_cache_ttl_secs)
    }

    pub fn resolved_cache_dir(&self) -> Result<PathBuf, GardenWeatherError> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => get_cache_dir(),
        }
    }

    /// `<output_dir>/<file_prefix> <suffix>.csv`
    pub fn output_path(&self, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{} {}.csv", self.file_prefix, suffix))
    }
}
