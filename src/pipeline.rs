//! Runs the fetch stages and the combination step against one configuration.

use crate::config::PipelineConfig;
use crate::error::GardenWeatherError;
use crate::openmeteo::client::{OpenMeteoClient, WeatherSource};
use crate::openmeteo::response::DAILY_TIME_COLUMN;
use crate::stage::Stage;
use crate::transform::combiner::{combine, default_rolling_specs};
use crate::transform::daily_aggregator::{build_daily_table, date_values};
use crate::transform::table_io::{read_csv, write_csv};
use crate::types::column_spec::RollingSpec;
use crate::utils::ensure_dir_exists;
use bon::bon;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use log::{info, warn};
use polars::prelude::{DataFrame, DataType, Series};
use std::path::PathBuf;

/// Suffix of the combined output file.
pub const CUMULATIVE_SUFFIX: &str = "CUMULATIVE";

/// Tables produced by one [`Pipeline::run`].
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_date: NaiveDate,
    pub historical: DataFrame,
    pub year_to_date: DataFrame,
    pub prediction: DataFrame,
    pub combined: DataFrame,
    pub combined_path: PathBuf,
}

/// Sequential orchestrator of the weather stages.
///
/// Stages share one [`PipelineConfig`] and one [`WeatherSource`]. Each stage
/// writes its own CSV file, and the run finishes by writing the cumulative
/// table.
///
/// # Examples
///
/// ```no_run
/// # use garden_weather::{GardenWeatherError, Pipeline, PipelineConfig};
/// # async fn run() -> Result<(), GardenWeatherError> {
/// let pipeline = Pipeline::new(PipelineConfig::default()).await?;
/// let summary = pipeline.run().refresh_historical(false).call().await?;
/// println!("{} rows", summary.combined.height());
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<S: WeatherSource = OpenMeteoClient> {
    source: S,
    config: PipelineConfig,
    rolling: Vec<RollingSpec>,
}

impl Pipeline<OpenMeteoClient> {
    /// Builds a pipeline backed by the Open-Meteo API, creating the response
    /// cache directory if needed.
    pub async fn new(config: PipelineConfig) -> Result<Self, GardenWeatherError> {
        let cache_dir = config.resolved_cache_dir()?;
        ensure_dir_exists(&cache_dir).await?;
        let client = OpenMeteoClient::new(&cache_dir, config.retry);
        Ok(Self::with_source(client, config))
    }
}

#[bon]
impl<S: WeatherSource> Pipeline<S> {
    pub fn with_source(source: S, config: PipelineConfig) -> Self {
        Self {
            source,
            config,
            rolling: default_rolling_specs(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fetches, aggregates and writes the table of one stage.
    ///
    /// A stage whose window is empty (year-to-date in the first days of
    /// January) yields a table with a `date` column and no rows.
    pub async fn run_stage(
        &self,
        stage: Stage,
        run_date: NaiveDate,
    ) -> Result<DataFrame, GardenWeatherError> {
        let request = stage.request(&self.config, run_date);
        let table = if request.window.is_empty() {
            warn!("{} window {:?} is empty, writing an empty table", stage, request.window);
            empty_daily_table()
        } else {
            info!("Fetching {} data from the {} endpoint", stage, request.endpoint);
            let response = self
                .source
                .fetch(&request, stage.cache_policy(&self.config))
                .await?;
            let tables = response.into_tables(&request)?;
            build_daily_table(
                &tables.hourly,
                &tables.daily,
                &stage.aggregates(),
                &stage.folds(),
            )?
        };

        write_csv(&table, &stage.output_path(&self.config)).await?;
        info!("{} stage produced {} daily rows", stage, table.height());
        Ok(table)
    }

    /// Reuses the historical CSV from a previous run unless `refresh` is set,
    /// the file is missing, or its dates no longer span the historical window
    /// of `run_date`.
    async fn historical_table(
        &self,
        run_date: NaiveDate,
        refresh: bool,
    ) -> Result<DataFrame, GardenWeatherError> {
        let path = Stage::Historical.output_path(&self.config);
        if !refresh && path.is_file() {
            let table = read_csv(&path).await?;
            let expected = (
                self.config.historical_start,
                self.config.historical_end_for(run_date),
            );
            match date_span(&table)? {
                Some(span) if span == expected => {
                    info!("Reusing historical table at {}", path.display());
                    return Ok(table);
                }
                Some((first, last)) => warn!(
                    "Historical table at {} covers {} to {}, expected {} to {}; fetching again",
                    path.display(),
                    first,
                    last,
                    expected.0,
                    expected.1
                ),
                None => warn!(
                    "Historical table at {} has no dates; fetching again",
                    path.display()
                ),
            }
        }
        self.run_stage(Stage::Historical, run_date).await
    }

    /// Today's date at the provider's UTC offset for the configured timezone.
    ///
    /// The offset comes from the forecast response, which the prediction
    /// stage fetches again from the response cache.
    async fn provider_today(&self) -> Result<NaiveDate, GardenWeatherError> {
        let now = Utc::now();
        let stage = Stage::Prediction;
        let request = stage.request(&self.config, now.date_naive());
        let response = self
            .source
            .fetch(&request, stage.cache_policy(&self.config))
            .await?;
        let today = today_at_offset(now, response.utc_offset_seconds);
        info!(
            "Run date {} at UTC offset {} s for {}",
            today, response.utc_offset_seconds, self.config.timezone
        );
        Ok(today)
    }

    /// Runs every stage in order and writes the cumulative table.
    ///
    /// `run_date` defaults to today in the configured timezone, as reported
    /// by the provider.
    #[builder]
    pub async fn run(
        &self,
        run_date: Option<NaiveDate>,
        refresh_historical: Option<bool>,
    ) -> Result<RunSummary, GardenWeatherError> {
        let run_date = match run_date {
            Some(date) => date,
            None => self.provider_today().await?,
        };
        let refresh_historical = refresh_historical.unwrap_or(false);
        info!("Starting run for {} at {}", run_date, self.config.location);

        ensure_dir_exists(&self.config.output_dir).await?;

        let historical = self.historical_table(run_date, refresh_historical).await?;
        let year_to_date = self.run_stage(Stage::YearToDate, run_date).await?;
        let prediction = self.run_stage(Stage::Prediction, run_date).await?;

        let combined = combine(
            &historical,
            &year_to_date,
            &prediction,
            run_date,
            &self.rolling,
        )?;
        let combined_path = self.config.output_path(CUMULATIVE_SUFFIX);
        write_csv(&combined, &combined_path).await?;

        Ok(RunSummary {
            run_date,
            historical,
            year_to_date,
            prediction,
            combined,
            combined_path,
        })
    }
}

fn empty_daily_table() -> DataFrame {
    DataFrame::new(vec![
        Series::new_empty(DAILY_TIME_COLUMN.into(), &DataType::Date).into(),
    ])
    .unwrap_or_default()
}

/// First and last non-null date of a daily table, `None` when it has no dates.
fn date_span(df: &DataFrame) -> Result<Option<(NaiveDate, NaiveDate)>, GardenWeatherError> {
    let dates: Vec<NaiveDate> = date_values(df)?.into_iter().flatten().collect();
    Ok(dates.iter().min().copied().zip(dates.iter().max().copied()))
}

fn today_at_offset(now: DateTime<Utc>, utc_offset_seconds: i64) -> NaiveDate {
    i32::try_from(utc_offset_seconds)
        .ok()
        .and_then(FixedOffset::east_opt)
        .map(|offset| now.with_timezone(&offset).date_naive())
        .unwrap_or_else(|| now.date_naive())
}
