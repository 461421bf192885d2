//! The provider's JSON response and its conversion into hourly and daily
//! DataFrames.
//!
//! Time columns are never read value by value. Each section's time axis is
//! reconstructed from its first timestamp, the nominal interval of the
//! resolution and the number of values, and one row is generated per tick
//! (end exclusive). Daily ticks are therefore always exactly 24 hours apart,
//! even across daylight saving changes. A daily tick is dated by the nearest
//! local midnight, so a tick one DST hour away from the response's fixed
//! offset still lands on its own date.

use crate::openmeteo::error::FetchError;
use crate::openmeteo::request::WeatherRequest;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use log::info;
use polars::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;

pub const HOURLY_TIME_COLUMN: &str = "datetime";
pub const DAILY_TIME_COLUMN: &str = "date";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    Hourly,
    Daily,
}

impl Resolution {
    pub fn name(&self) -> &'static str {
        match self {
            Resolution::Hourly => "hourly",
            Resolution::Daily => "daily",
        }
    }

    /// Nominal spacing between two ticks, in seconds.
    pub fn interval_seconds(&self) -> i64 {
        match self {
            Resolution::Hourly => 3_600,
            Resolution::Daily => 86_400,
        }
    }
}

/// One section (`hourly` or `daily`) of the response: a `time` array plus one
/// array per requested variable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SeriesBlock {
    pub time: Vec<i64>,
    #[serde(flatten)]
    pub values: HashMap<String, Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeatherResponse {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation: Option<f64>,
    #[serde(default)]
    pub utc_offset_seconds: i64,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub timezone_abbreviation: Option<String>,
    #[serde(default)]
    pub hourly: Option<SeriesBlock>,
    #[serde(default)]
    pub daily: Option<SeriesBlock>,
}

/// Evenly spaced timestamps in `[start, end)`, as Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeAxis {
    pub start: i64,
    pub end: i64,
    pub interval: i64,
}

impl TimeAxis {
    pub fn new(start: i64, end: i64, interval: i64) -> Self {
        Self {
            start,
            end,
            interval,
        }
    }

    /// Reconstructs the axis of a section from its first timestamp and length.
    pub fn for_block(block: &SeriesBlock, resolution: Resolution) -> Self {
        let interval = resolution.interval_seconds();
        let start = block.time.first().copied().unwrap_or_default();
        let end = start + interval * block.time.len() as i64;
        Self::new(start, end, interval)
    }

    /// One tick per interval, `end` excluded.
    pub fn ticks(&self) -> impl Iterator<Item = i64> {
        let Self {
            start,
            end,
            interval,
        } = *self;
        let count = if interval > 0 && end > start {
            ((end - start) + interval - 1) / interval
        } else {
            0
        };
        (0..count).map(move |i| start + i * interval)
    }

    pub fn len(&self) -> usize {
        self.ticks().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The two tables shaped from one response.
#[derive(Debug, Clone)]
pub struct WeatherTables {
    pub hourly: DataFrame,
    pub daily: DataFrame,
}

impl WeatherResponse {
    pub fn from_json(body: &str) -> Result<Self, FetchError> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn log_metadata(&self) {
        info!("Coordinates {}°N {}°E", self.latitude, self.longitude);
        if let Some(elevation) = self.elevation {
            info!("Elevation {} m asl", elevation);
        }
        info!(
            "Timezone {} {}",
            self.timezone.as_deref().unwrap_or("GMT"),
            self.timezone_abbreviation.as_deref().unwrap_or("")
        );
        info!("Timezone difference to GMT+0 {} s", self.utc_offset_seconds);
    }

    /// Shapes the response into an hourly table (`datetime` + hourly variables)
    /// and a daily table (`date` + daily variables), in the variable order of
    /// `request`. Timestamps are local wall-clock times of the requested timezone.
    pub fn into_tables(&self, request: &WeatherRequest) -> Result<WeatherTables, FetchError> {
        Ok(WeatherTables {
            hourly: self.build_frame(Resolution::Hourly, &request.hourly)?,
            daily: self.build_frame(Resolution::Daily, &request.daily)?,
        })
    }

    fn block(&self, resolution: Resolution) -> Option<&SeriesBlock> {
        match resolution {
            Resolution::Hourly => self.hourly.as_ref(),
            Resolution::Daily => self.daily.as_ref(),
        }
    }

    fn build_frame(
        &self,
        resolution: Resolution,
        variables: &[String],
    ) -> Result<DataFrame, FetchError> {
        let empty = SeriesBlock::default();
        let block = match self.block(resolution) {
            Some(block) => block,
            None if variables.is_empty() => &empty,
            None => {
                return Err(FetchError::MissingSection {
                    resolution: resolution.name(),
                })
            }
        };

        let axis = TimeAxis::for_block(block, resolution);
        let stamps = axis
            .ticks()
            .map(|tick| local_datetime(tick, self.utc_offset_seconds))
            .collect::<Result<Vec<_>, _>>()?;

        let mut columns: Vec<Column> = Vec::with_capacity(variables.len() + 1);
        columns.push(match resolution {
            Resolution::Hourly => Series::new(HOURLY_TIME_COLUMN.into(), stamps.as_slice()).into(),
            Resolution::Daily => {
                let dates: Vec<NaiveDate> = stamps.iter().map(|s| nearest_date(*s)).collect();
                Series::new(DAILY_TIME_COLUMN.into(), dates.as_slice()).into()
            }
        });

        for variable in variables {
            let values =
                block
                    .values
                    .get(variable)
                    .ok_or_else(|| FetchError::MissingVariable {
                        resolution: resolution.name(),
                        variable: variable.clone(),
                    })?;
            if values.len() != stamps.len() {
                return Err(FetchError::SeriesLengthMismatch {
                    resolution: resolution.name(),
                    variable: variable.clone(),
                    expected: stamps.len(),
                    found: values.len(),
                });
            }
            columns.push(Series::new(variable.as_str().into(), values.as_slice()).into());
        }

        DataFrame::new(columns).map_err(|e| FetchError::DataFrameBuild {
            resolution: resolution.name(),
            source: e,
        })
    }
}

fn local_datetime(unix_seconds: i64, utc_offset_seconds: i64) -> Result<NaiveDateTime, FetchError> {
    let shifted = unix_seconds + utc_offset_seconds;
    DateTime::from_timestamp(shifted, 0)
        .map(|dt| dt.naive_utc())
        .ok_or(FetchError::TimestampOutOfRange(shifted))
}

fn nearest_date(stamp: NaiveDateTime) -> NaiveDate {
    (stamp + TimeDelta::hours(12)).date()
}
