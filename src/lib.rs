mod config;
mod error;
mod openmeteo;
mod pipeline;
mod stage;
mod transform;
mod types;
mod utils;

pub use config::PipelineConfig;
pub use error::GardenWeatherError;
pub use pipeline::*;
pub use stage::Stage;

pub use openmeteo::client::{OpenMeteoClient, WeatherSource};
pub use openmeteo::error::FetchError;
pub use openmeteo::request::{Endpoint, WeatherRequest};
pub use openmeteo::response::{
    Resolution, SeriesBlock, TimeAxis, WeatherResponse, WeatherTables, DAILY_TIME_COLUMN,
    HOURLY_TIME_COLUMN,
};
pub use openmeteo::response_cache::{CachePolicy, ResponseCache};
pub use openmeteo::retry::RetryPolicy;

pub use transform::combiner::{
    combine, concat_sources, default_rolling_specs, with_relative_date, with_rolling_windows,
    with_weather_category, WEATHER_CATEGORY_COLUMN, WEATHER_CODE_COLUMN,
};
pub use transform::daily_aggregator::{
    aggregate_hourly, build_daily_table, fold_columns, merge_daily, with_calendar_columns,
    MONTH_COLUMN, YEAR_COLUMN,
};
pub use transform::error::TransformError;
pub use transform::table_io::{read_csv, write_csv};

pub use types::column_spec::{AggregateSpec, Aggregation, ColumnFold, RollingSpec};
pub use types::coordinate::LatLon;
pub use types::data_source::{DataSource, DATA_SOURCE_COLUMN};
pub use types::fetch_window::FetchWindow;
pub use types::relative_date::{RelativeDate, RELATIVE_DATE_COLUMN, UNKNOWN_LABEL};
pub use types::units::{PrecipitationUnit, TemperatureUnit, Units, WindSpeedUnit};
pub use types::weather_code::{category_for, WeatherCode};
