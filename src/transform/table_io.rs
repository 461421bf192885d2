//! CSV persistence of daily tables.

use crate::openmeteo::response::DAILY_TIME_COLUMN;
use crate::transform::daily_aggregator::{MONTH_COLUMN, YEAR_COLUMN};
use crate::transform::error::TransformError;
use log::{debug, info};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tokio::task;

/// Writes `df` to `path` with a header row, replacing any existing file.
pub async fn write_csv(df: &DataFrame, path: &Path) -> Result<(), TransformError> {
    let path_buf = path.to_path_buf();
    let mut df_clone = df.clone();
    task::spawn_blocking(move || {
        if let Some(parent) = path_buf.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| TransformError::CsvWriteIo(path_buf.clone(), e))?;
        }
        let mut file =
            File::create(&path_buf).map_err(|e| TransformError::CsvWriteIo(path_buf.clone(), e))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df_clone)
            .map_err(|e| TransformError::CsvWritePolars(path_buf.clone(), e))?;
        Ok::<(), TransformError>(())
    })
    .await??;

    info!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

/// Reads a daily table previously written by [`write_csv`].
///
/// `date` comes back as a date column and `month`/`year` as 32 bit integers.
/// Columns that were empty on disk are read as null floats so they stack with
/// freshly fetched tables.
pub async fn read_csv(path: &Path) -> Result<DataFrame, TransformError> {
    let path_buf: PathBuf = path.to_path_buf();
    let df = task::spawn_blocking(move || {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .map_parse_options(|options| options.with_try_parse_dates(true))
            .try_into_reader_with_file_path(Some(path_buf.clone()))
            .and_then(|reader| reader.finish())
            .map_err(|e| TransformError::CsvRead(path_buf, e))
    })
    .await??;

    let df = restore_dtypes(df)?;
    info!("Read {} rows from {}", df.height(), path.display());
    Ok(df)
}

fn restore_dtypes(mut df: DataFrame) -> Result<DataFrame, TransformError> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    for name in names {
        let column = df.column(&name)?;
        let target = if name == DAILY_TIME_COLUMN {
            DataType::Date
        } else if name == MONTH_COLUMN || name == YEAR_COLUMN {
            DataType::Int32
        } else if column.dtype().is_float() || column.dtype().is_integer() {
            DataType::Float64
        } else if column.null_count() == column.len() {
            DataType::Float64
        } else {
            continue;
        };
        if column.dtype() != &target {
            debug!("Casting column '{}' from {} to {}", name, column.dtype(), target);
            let cast = column.cast(&target)?;
            df.with_column(cast)?;
        }
    }
    Ok(df)
}
