//! The three fetch stages and the provider contract of each.

use crate::config::PipelineConfig;
use crate::openmeteo::request::{Endpoint, WeatherRequest};
use crate::openmeteo::response_cache::CachePolicy;
use crate::types::column_spec::{AggregateSpec, ColumnFold};
use crate::types::data_source::DataSource;
use crate::types::fetch_window::FetchWindow;
use chrono::{Datelike, Days, NaiveDate};
use std::fmt;

const SOIL_LAYERS: [&str; 4] = ["0_to_7cm", "7_to_28cm", "28_to_100cm", "100_to_255cm"];

const ARCHIVE_DAILY: [&str; 7] = [
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "temperature_2m_mean",
    "precipitation_sum",
    "rain_sum",
    "snowfall_sum",
];

const FORECAST_HOURLY: [&str; 1] = ["temperature_2m"];

const FORECAST_DAILY: [&str; 10] = [
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "daylight_duration",
    "uv_index_max",
    "precipitation_sum",
    "rain_sum",
    "showers_sum",
    "snowfall_sum",
    "precipitation_probability_max",
];

fn soil_variables() -> Vec<String> {
    ["soil_temperature", "soil_moisture"]
        .iter()
        .flat_map(|kind| SOIL_LAYERS.iter().map(move |layer| format!("{kind}_{layer}")))
        .collect()
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Archive data from the configured start through the end of last year.
    Historical,
    /// Archive data from January 1 up to the day before the forecast window.
    YearToDate,
    /// Forecast data including a few recent past days.
    Prediction,
}

impl Stage {
    pub fn data_source(&self) -> DataSource {
        match self {
            Stage::Historical => DataSource::Historical,
            Stage::YearToDate => DataSource::YearToDate,
            Stage::Prediction => DataSource::Prediction,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            Stage::Historical | Stage::YearToDate => Endpoint::Archive,
            Stage::Prediction => Endpoint::Forecast,
        }
    }

    pub fn hourly_variables(&self) -> Vec<String> {
        match self {
            Stage::Historical | Stage::YearToDate => soil_variables(),
            Stage::Prediction => owned(&FORECAST_HOURLY),
        }
    }

    pub fn daily_variables(&self) -> Vec<String> {
        match self {
            Stage::Historical | Stage::YearToDate => owned(&ARCHIVE_DAILY),
            Stage::Prediction => owned(&FORECAST_DAILY),
        }
    }

    /// Per-date reductions of the hourly table.
    ///
    /// The forecast daily table has no mean air temperature, so the hourly
    /// mean takes the archive's column name.
    pub fn aggregates(&self) -> Vec<AggregateSpec> {
        match self {
            Stage::Historical | Stage::YearToDate => {
                soil_variables().into_iter().map(AggregateSpec::mean).collect()
            }
            Stage::Prediction => vec![AggregateSpec::mean_as(
                "temperature_2m",
                "temperature_2m_mean",
            )],
        }
    }

    /// Showers are counted as rain in the forecast table.
    pub fn folds(&self) -> Vec<ColumnFold> {
        match self {
            Stage::Historical | Stage::YearToDate => Vec::new(),
            Stage::Prediction => vec![ColumnFold::new("rain_sum", "showers_sum")],
        }
    }

    pub fn window(&self, config: &PipelineConfig, run_date: NaiveDate) -> FetchWindow {
        match self {
            Stage::Historical => FetchWindow::Range {
                start: config.historical_start,
                end: config.historical_end_for(run_date),
            },
            Stage::YearToDate => {
                let start = NaiveDate::from_ymd_opt(run_date.year(), 1, 1).unwrap_or(run_date);
                // The forecast repeats `past_days` before today; stop the day before those.
                let end = run_date
                    .checked_sub_days(Days::new(u64::from(config.past_days) + 1))
                    .unwrap_or(NaiveDate::MIN);
                FetchWindow::Range { start, end }
            }
            Stage::Prediction => FetchWindow::Recent {
                past_days: config.past_days,
                forecast_days: config.forecast_days,
            },
        }
    }

    pub fn request(&self, config: &PipelineConfig, run_date: NaiveDate) -> WeatherRequest {
        WeatherRequest {
            endpoint: self.endpoint(),
            location: config.location,
            window: self.window(config, run_date),
            hourly: self.hourly_variables(),
            daily: self.daily_variables(),
            units: config.units,
            timezone: config.timezone.clone(),
        }
    }

    pub fn cache_policy(&self, config: &PipelineConfig) -> CachePolicy {
        match self {
            Stage::Historical | Stage::YearToDate => CachePolicy::Forever,
            Stage::Prediction => CachePolicy::Ttl(config.forecast_cache_ttl()),
        }
    }

    pub fn output_path(&self, config: &PipelineConfig) -> std::path::PathBuf {
        config.output_path(self.data_source().file_suffix())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data_source())
    }
}
