//! Describes one provider request: endpoint, location, time window, variable
//! lists and units.

use crate::openmeteo::error::FetchError;
use crate::types::coordinate::LatLon;
use crate::types::fetch_window::FetchWindow;
use crate::types::units::Units;
use std::fmt;

const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Reanalysis archive, addressed by explicit date range.
    Archive,
    /// Forecast model output, addressed by past/forecast day counts.
    Forecast,
}

impl Endpoint {
    pub fn base_url(&self) -> &'static str {
        match self {
            Endpoint::Archive => ARCHIVE_URL,
            Endpoint::Forecast => FORECAST_URL,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Archive => write!(f, "archive"),
            Endpoint::Forecast => write!(f, "forecast"),
        }
    }
}

/// Everything needed to issue a request. The order of `hourly` and `daily`
/// is the column order of the resulting tables.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRequest {
    pub endpoint: Endpoint,
    pub location: LatLon,
    pub window: FetchWindow,
    pub hourly: Vec<String>,
    pub daily: Vec<String>,
    pub units: Units,
    pub timezone: String,
}

impl WeatherRequest {
    /// Query parameters in a stable order, so identical requests map to the same cache entry.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("latitude", self.location.latitude().to_string()),
            ("longitude", self.location.longitude().to_string()),
        ];
        pairs.extend(self.window.query_pairs());
        if !self.hourly.is_empty() {
            pairs.push(("hourly", self.hourly.join(",")));
        }
        if !self.daily.is_empty() {
            pairs.push(("daily", self.daily.join(",")));
        }
        pairs.push(("temperature_unit", self.units.temperature.query_value().to_string()));
        pairs.push(("wind_speed_unit", self.units.wind_speed.query_value().to_string()));
        pairs.push(("precipitation_unit", self.units.precipitation.query_value().to_string()));
        pairs.push(("timezone", self.timezone.clone()));
        pairs.push(("timeformat", "unixtime".to_string()));
        pairs
    }

    /// The full request URL. Used for logging and as the cache key.
    pub fn url(&self) -> Result<reqwest::Url, FetchError> {
        reqwest::Url::parse_with_params(self.endpoint.base_url(), self.query_pairs()).map_err(
            |e| FetchError::InvalidUrl {
                base: self.endpoint.base_url().to_string(),
                reason: e.to_string(),
            },
        )
    }
}
