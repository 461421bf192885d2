//! Reduces hourly readings to one row per calendar date and merges them onto
//! the provider's daily table.

use crate::openmeteo::response::{DAILY_TIME_COLUMN, HOURLY_TIME_COLUMN};
use crate::transform::error::TransformError;
use crate::types::column_spec::{AggregateSpec, ColumnFold};
use chrono::{DateTime, Duration, NaiveDate};
use log::debug;
use polars::prelude::*;

pub const MONTH_COLUMN: &str = "month";
pub const YEAR_COLUMN: &str = "year";

/// Fails with [`TransformError::MissingColumn`] unless every name is a column of `df`.
pub(crate) fn require_columns<'a>(
    df: &DataFrame,
    table: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<(), TransformError> {
    for name in names {
        if df.get_column_index(name).is_none() {
            return Err(TransformError::MissingColumn {
                table: table.to_string(),
                column: name.to_string(),
            });
        }
    }
    Ok(())
}

/// The `date` column as calendar dates, nulls kept in place.
pub(crate) fn date_values(df: &DataFrame) -> Result<Vec<Option<NaiveDate>>, TransformError> {
    require_columns(df, "daily", [DAILY_TIME_COLUMN])?;
    let epoch = DateTime::UNIX_EPOCH.date_naive();
    let days = df.column(DAILY_TIME_COLUMN)?.cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .into_iter()
        .map(|day| day.and_then(|d| epoch.checked_add_signed(Duration::days(i64::from(d)))))
        .collect())
}

/// Groups `hourly` by the calendar date of its `datetime` column and applies
/// each aggregate within the group.
///
/// Only dates with at least one hourly row appear in the output, sorted
/// ascending. Rows without a timestamp are ignored.
pub fn aggregate_hourly(
    hourly: &DataFrame,
    specs: &[AggregateSpec],
) -> Result<DataFrame, TransformError> {
    require_columns(
        hourly,
        "hourly",
        std::iter::once(HOURLY_TIME_COLUMN).chain(specs.iter().map(|s| s.source.as_str())),
    )?;

    let aggregations: Vec<Expr> = specs.iter().map(AggregateSpec::expr).collect();
    let aggregated = hourly
        .clone()
        .lazy()
        .filter(col(HOURLY_TIME_COLUMN).is_not_null())
        .with_column(
            col(HOURLY_TIME_COLUMN)
                .cast(DataType::Date)
                .alias(DAILY_TIME_COLUMN),
        )
        .group_by([col(DAILY_TIME_COLUMN)])
        .agg(aggregations)
        .sort([DAILY_TIME_COLUMN], SortMultipleOptions::default())
        .collect()?;

    debug!(
        "Aggregated {} hourly rows into {} days",
        hourly.height(),
        aggregated.height()
    );
    Ok(aggregated)
}

/// Adds integer `month` and `year` columns derived from `date`.
pub fn with_calendar_columns(daily: &DataFrame) -> Result<DataFrame, TransformError> {
    require_columns(daily, "daily", [DAILY_TIME_COLUMN])?;
    Ok(daily
        .clone()
        .lazy()
        .with_columns([
            col(DAILY_TIME_COLUMN)
                .dt()
                .month()
                .cast(DataType::Int32)
                .alias(MONTH_COLUMN),
            col(DAILY_TIME_COLUMN)
                .dt()
                .year()
                .cast(DataType::Int32)
                .alias(YEAR_COLUMN),
        ])
        .collect()?)
}

/// Inner-joins the per-date aggregates onto the daily table.
///
/// Dates present on only one side are dropped without notice. The result is
/// sorted by date and keeps the daily table's columns first.
pub fn merge_daily(daily: &DataFrame, aggregated: &DataFrame) -> Result<DataFrame, TransformError> {
    require_columns(daily, "daily", [DAILY_TIME_COLUMN])?;
    require_columns(aggregated, "aggregated", [DAILY_TIME_COLUMN])?;

    let merged = daily
        .clone()
        .lazy()
        .join(
            aggregated.clone().lazy(),
            [col(DAILY_TIME_COLUMN)],
            [col(DAILY_TIME_COLUMN)],
            JoinArgs::new(JoinType::Inner),
        )
        .sort([DAILY_TIME_COLUMN], SortMultipleOptions::default())
        .collect()?;

    let dropped = daily.height().saturating_sub(merged.height());
    if dropped > 0 {
        debug!("{} daily rows had no hourly counterpart", dropped);
    }
    Ok(merged)
}

/// Applies each fold: `target += addend`, then removes `addend`.
pub fn fold_columns(daily: DataFrame, folds: &[ColumnFold]) -> Result<DataFrame, TransformError> {
    let mut df = daily;
    for fold in folds {
        require_columns(&df, "daily", [fold.target.as_str(), fold.addend.as_str()])?;
        df = df
            .lazy()
            .with_column(
                (col(fold.target.as_str()) + col(fold.addend.as_str())).alias(fold.target.as_str()),
            )
            .collect()?
            .drop(fold.addend.as_str())?;
    }
    Ok(df)
}

/// The complete daily stage: calendar columns, hourly aggregation, inner join
/// and column folds, in that order.
pub fn build_daily_table(
    hourly: &DataFrame,
    daily: &DataFrame,
    aggregates: &[AggregateSpec],
    folds: &[ColumnFold],
) -> Result<DataFrame, TransformError> {
    let daily = with_calendar_columns(daily)?;
    let aggregated = aggregate_hourly(hourly, aggregates)?;
    let merged = merge_daily(&daily, &aggregated)?;
    fold_columns(merged, folds)
}
