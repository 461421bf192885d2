//! Stacks the three daily tables and derives the columns of the cumulative table.

use crate::transform::daily_aggregator::{date_values, require_columns};
use crate::transform::error::TransformError;
use crate::types::column_spec::RollingSpec;
use crate::types::data_source::{DataSource, DATA_SOURCE_COLUMN};
use crate::types::relative_date::{RelativeDate, RELATIVE_DATE_COLUMN, UNKNOWN_LABEL};
use crate::types::weather_code::category_for;
use chrono::NaiveDate;
use log::{debug, info, warn};
use polars::prelude::*;

pub const WEATHER_CODE_COLUMN: &str = "weather_code";
pub const WEATHER_CATEGORY_COLUMN: &str = "weather_code_category";

const SOIL_LAYERS: [&str; 4] = ["0_to_7cm", "7_to_28cm", "28_to_100cm", "100_to_255cm"];

/// Rolling statistics of the cumulative table.
///
/// 7 and 14 row means for air and soil temperature, 7 row sums for each kind
/// of precipitation.
pub fn default_rolling_specs() -> Vec<RollingSpec> {
    let mut specs = vec![
        RollingSpec::mean("temperature_2m_mean", "temperature_2m_7dayavg", 7),
        RollingSpec::mean("temperature_2m_mean", "temperature_2m_14dayavg", 14),
    ];
    for window in [7, 14] {
        specs.extend(SOIL_LAYERS.iter().map(|layer| {
            RollingSpec::mean(
                format!("soil_temperature_{layer}_mean"),
                format!("soil_temperature_{layer}_{window}dayavg"),
                window,
            )
        }));
    }
    specs.extend([
        RollingSpec::sum("precipitation_sum", "precipitation_sum_7day", 7),
        RollingSpec::sum("rain_sum", "rain_sum_7day", 7),
        RollingSpec::sum("snowfall_sum", "snow_sum_7day", 7),
    ]);
    specs
}

/// Tags each table with its provenance and stacks them in the given order.
///
/// Tables may have different column sets; the result has the union of all
/// columns, with nulls where a table lacks one.
pub fn concat_sources(tables: &[(DataSource, &DataFrame)]) -> Result<DataFrame, TransformError> {
    let tagged: Vec<LazyFrame> = tables
        .iter()
        .map(|(source, frame)| {
            (*frame)
                .clone()
                .lazy()
                .with_column(lit(source.label()).alias(DATA_SOURCE_COLUMN))
        })
        .collect();

    let combined = concat_lf_diagonal(
        tagged,
        UnionArgs {
            to_supertypes: true,
            ..Default::default()
        },
    )?
    .collect()?;

    let expected: usize = tables.iter().map(|(_, frame)| frame.height()).sum();
    debug!(
        "Concatenated {} tables into {} rows x {} columns",
        tables.len(),
        combined.height(),
        combined.width()
    );
    if combined.height() != expected {
        warn!(
            "Combined table has {} rows, expected {}",
            combined.height(),
            expected
        );
    }
    Ok(combined)
}

/// Adds `weather_code_category`. Codes outside the WMO table, fractional
/// codes and nulls all map to a null category.
pub fn with_weather_category(df: DataFrame) -> Result<DataFrame, TransformError> {
    require_columns(&df, "combined", [WEATHER_CODE_COLUMN])?;
    let mut df = df;
    let codes = df
        .column(WEATHER_CODE_COLUMN)?
        .cast(&DataType::Float64)?;
    let categories: StringChunked = codes
        .f64()?
        .into_iter()
        .map(|code| code.and_then(category_for))
        .collect();

    let unmapped = categories.null_count() - codes.null_count();
    if unmapped > 0 {
        debug!("{} rows carry a weather code with no category", unmapped);
    }
    df.with_column(
        categories
            .with_name(WEATHER_CATEGORY_COLUMN.into())
            .into_series(),
    )?;
    Ok(df)
}

/// Appends trailing window statistics computed over row order.
///
/// Windows are not partitioned by provenance, so a window straddling two
/// sources mixes them.
pub fn with_rolling_windows(
    df: DataFrame,
    specs: &[RollingSpec],
) -> Result<DataFrame, TransformError> {
    require_columns(&df, "combined", specs.iter().map(|s| s.source.as_str()))?;
    let windows: Vec<Expr> = specs.iter().map(RollingSpec::expr).collect();
    Ok(df.lazy().with_columns(windows).collect()?)
}

/// Adds `relative_date` by classifying each row's date against `run_date`.
/// Rows without a date are labelled `Unknown`.
pub fn with_relative_date(df: DataFrame, run_date: NaiveDate) -> Result<DataFrame, TransformError> {
    let mut df = df;
    let labels: StringChunked = date_values(&df)?
        .into_iter()
        .map(|date| {
            Some(match date {
                Some(date) => RelativeDate::classify(date, run_date).label(),
                None => UNKNOWN_LABEL,
            })
        })
        .collect();
    df.with_column(labels.with_name(RELATIVE_DATE_COLUMN.into()).into_series())?;
    Ok(df)
}

/// Counts rows whose date does not come after the previous row's date.
fn out_of_order_rows(df: &DataFrame) -> Result<usize, TransformError> {
    let mut previous: Option<NaiveDate> = None;
    let mut count = 0;
    for day in date_values(df)?.into_iter().flatten() {
        if previous.is_some_and(|p| day <= p) {
            count += 1;
        }
        previous = Some(day);
    }
    Ok(count)
}

/// Builds the cumulative table from the three stage outputs.
pub fn combine(
    historical: &DataFrame,
    year_to_date: &DataFrame,
    prediction: &DataFrame,
    run_date: NaiveDate,
    rolling: &[RollingSpec],
) -> Result<DataFrame, TransformError> {
    let tables: Vec<(DataSource, &DataFrame)> = DataSource::ORDER
        .into_iter()
        .zip([historical, year_to_date, prediction])
        .collect();
    let combined = concat_sources(&tables)?;

    let overlaps = out_of_order_rows(&combined)?;
    if overlaps > 0 {
        warn!(
            "{} rows repeat or precede an earlier date; rolling windows run over them as stacked",
            overlaps
        );
    }

    let combined = with_weather_category(combined)?;
    let combined = with_rolling_windows(combined, rolling)?;
    let combined = with_relative_date(combined, run_date)?;
    info!(
        "Combined table has {} rows and {} columns",
        combined.height(),
        combined.width()
    );
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn days_from(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
        start.iter_days().take(n).collect()
    }

    fn frame(dates: &[NaiveDate], column: &str, values: &[f64]) -> DataFrame {
        DataFrame::new(vec![
            Series::new("date".into(), dates).into(),
            Series::new(column.into(), values).into(),
        ])
        .unwrap()
    }

    fn f64_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name).unwrap().f64().unwrap().into_iter().collect()
    }

    fn str_values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        df.column(name)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn test_concat_keeps_order_and_length() -> Result<(), Box<dyn std::error::Error>> {
        let historical = frame(&days_from(date(2023, 12, 30), 2), "rain_sum", &[0.1, 0.2]);
        let ytd = frame(&days_from(date(2024, 1, 1), 3), "rain_sum", &[0.3, 0.4, 0.5]);
        let prediction = frame(&days_from(date(2024, 1, 4), 1), "rain_sum", &[0.6]);

        let combined = concat_sources(&[
            (DataSource::Historical, &historical),
            (DataSource::YearToDate, &ytd),
            (DataSource::Prediction, &prediction),
        ])?;

        assert_eq!(combined.height(), 6);
        assert_eq!(
            f64_values(&combined, "rain_sum"),
            vec![Some(0.1), Some(0.2), Some(0.3), Some(0.4), Some(0.5), Some(0.6)]
        );
        assert_eq!(
            str_values(&combined, DATA_SOURCE_COLUMN),
            ["Historical", "Historical", "YTD", "YTD", "YTD", "Prediction"]
                .iter()
                .map(|s| Some(s.to_string()))
                .collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn test_concat_fills_missing_columns_with_nulls() -> Result<(), Box<dyn std::error::Error>> {
        let historical = frame(&[date(2024, 1, 1)], "soil_temperature_0_to_7cm_mean", &[30.0]);
        let prediction = frame(&[date(2024, 1, 2)], "uv_index_max", &[2.5]);

        let combined = concat_sources(&[
            (DataSource::Historical, &historical),
            (DataSource::Prediction, &prediction),
        ])?;
        assert_eq!(combined.height(), 2);
        assert_eq!(
            f64_values(&combined, "soil_temperature_0_to_7cm_mean"),
            vec![Some(30.0), None]
        );
        assert_eq!(f64_values(&combined, "uv_index_max"), vec![None, Some(2.5)]);
        Ok(())
    }

    #[test]
    fn test_weather_category_lookup() -> Result<(), Box<dyn std::error::Error>> {
        let dates = days_from(date(2024, 3, 1), 4);
        let df = DataFrame::new(vec![
            Series::new("date".into(), &dates).into(),
            Series::new("weather_code".into(), &[Some(3.0), Some(4.0), None, Some(95.0)]).into(),
        ])?;

        let df = with_weather_category(df)?;
        assert_eq!(
            str_values(&df, WEATHER_CATEGORY_COLUMN),
            vec![
                Some("Overcast".to_string()),
                None,
                None,
                Some("Thunderstorm: Slight or moderate".to_string())
            ]
        );
        Ok(())
    }

    #[test]
    fn test_rolling_mean_needs_full_window() -> Result<(), Box<dyn std::error::Error>> {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let df = frame(&days_from(date(2024, 3, 1), 10), "temperature_2m_mean", &values);

        let df = with_rolling_windows(
            df,
            &[RollingSpec::mean("temperature_2m_mean", "temperature_2m_7dayavg", 7)],
        )?;
        let means = f64_values(&df, "temperature_2m_7dayavg");
        assert!(means[..6].iter().all(Option::is_none));
        // Rows [i-6, i] for i = 6..9 are 1..7, 2..8, 3..9, 4..10.
        assert_eq!(&means[6..], &[Some(4.0), Some(5.0), Some(6.0), Some(7.0)]);
        Ok(())
    }

    #[test]
    fn test_rolling_sum_and_long_window() -> Result<(), Box<dyn std::error::Error>> {
        let values = vec![1.0; 14];
        let df = frame(&days_from(date(2024, 3, 1), 14), "rain_sum", &values);

        let df = with_rolling_windows(
            df,
            &[
                RollingSpec::sum("rain_sum", "rain_sum_7day", 7),
                RollingSpec::mean("rain_sum", "rain_sum_14dayavg", 14),
            ],
        )?;
        let sums = f64_values(&df, "rain_sum_7day");
        assert!(sums[..6].iter().all(Option::is_none));
        assert!(sums[6..].iter().all(|s| *s == Some(7.0)));

        let long = f64_values(&df, "rain_sum_14dayavg");
        assert!(long[..13].iter().all(Option::is_none));
        assert_eq!(long[13], Some(1.0));
        Ok(())
    }

    #[test]
    fn test_rolling_window_spans_sources() -> Result<(), Box<dyn std::error::Error>> {
        let historical = frame(&days_from(date(2023, 12, 28), 4), "rain_sum", &[1.0; 4]);
        let ytd = frame(&days_from(date(2024, 1, 1), 3), "rain_sum", &[2.0; 3]);
        let combined = concat_sources(&[
            (DataSource::Historical, &historical),
            (DataSource::YearToDate, &ytd),
        ])?;

        let combined = with_rolling_windows(
            combined,
            &[RollingSpec::sum("rain_sum", "rain_sum_7day", 7)],
        )?;
        assert_eq!(f64_values(&combined, "rain_sum_7day")[6], Some(10.0));
        Ok(())
    }

    #[test]
    fn test_relative_date_labels() -> Result<(), Box<dyn std::error::Error>> {
        let df = DataFrame::new(vec![Series::new(
            "date".into(),
            &[
                Some(date(2024, 9, 30)),
                Some(date(2024, 10, 2)),
                Some(date(2024, 10, 3)),
                None,
            ],
        )
        .into()])?;

        let df = with_relative_date(df, date(2024, 10, 2))?;
        assert_eq!(
            str_values(&df, RELATIVE_DATE_COLUMN),
            ["Historical", "Current date", "Prediction", "Unknown"]
                .iter()
                .map(|s| Some(s.to_string()))
                .collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn test_missing_rolling_source_is_reported() {
        let df = frame(&[date(2024, 1, 1)], "rain_sum", &[1.0]);
        let result = with_rolling_windows(df, &default_rolling_specs());
        assert!(matches!(result, Err(TransformError::MissingColumn { .. })));
    }

    #[test]
    fn test_default_specs_cover_every_layer() {
        let specs = default_rolling_specs();
        assert_eq!(specs.len(), 13);
        assert!(specs
            .iter()
            .any(|s| s.target == "soil_temperature_100_to_255cm_14dayavg"
                && s.source == "soil_temperature_100_to_255cm_mean"));
        assert!(specs
            .iter()
            .any(|s| s.target == "snow_sum_7day" && s.source == "snowfall_sum"));
    }

    #[test]
    fn test_out_of_order_rows_counts_repeats() -> Result<(), Box<dyn std::error::Error>> {
        let dates = vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 2), date(2024, 1, 1)];
        let df = frame(&dates, "rain_sum", &[0.0; 4]);
        assert_eq!(out_of_order_rows(&df)?, 2);
        Ok(())
    }

    #[test]
    fn test_combine_adds_all_derived_columns() -> Result<(), Box<dyn std::error::Error>> {
        let daily = |start: NaiveDate, n: usize| {
            DataFrame::new(vec![
                Series::new("date".into(), days_from(start, n)).into(),
                Series::new("weather_code".into(), vec![3.0; n]).into(),
                Series::new("rain_sum".into(), vec![0.5; n]).into(),
            ])
            .unwrap()
        };
        let run_date = date(2024, 1, 10);
        let combined = combine(
            &daily(date(2023, 12, 25), 7),
            &daily(date(2024, 1, 1), 8),
            &daily(date(2024, 1, 9), 9),
            run_date,
            &[RollingSpec::sum("rain_sum", "rain_sum_7day", 7)],
        )?;

        assert_eq!(combined.height(), 24);
        let names: Vec<String> = combined
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(
            names,
            [
                "date",
                "weather_code",
                "rain_sum",
                DATA_SOURCE_COLUMN,
                WEATHER_CATEGORY_COLUMN,
                "rain_sum_7day",
                RELATIVE_DATE_COLUMN
            ]
        );
        let sources = str_values(&combined, DATA_SOURCE_COLUMN);
        assert_eq!(sources[0].as_deref(), Some(DataSource::Historical.label()));
        assert_eq!(sources[7].as_deref(), Some(DataSource::YearToDate.label()));
        assert_eq!(sources[15].as_deref(), Some(DataSource::Prediction.label()));

        let labels = str_values(&combined, RELATIVE_DATE_COLUMN);
        // Prediction rows start on 2024-01-09, the day before the run.
        assert_eq!(labels[15].as_deref(), Some("Historical"));
        assert_eq!(labels[16].as_deref(), Some("Current date"));
        assert_eq!(labels[17].as_deref(), Some("Prediction"));
        Ok(())
    }
}
