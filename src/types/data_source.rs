//! Defines the provenance of a daily table: which of the three fetched ranges
//! a combined row came from.

use std::fmt;

/// Name of the column holding the provenance label in the combined table.
pub const DATA_SOURCE_COLUMN: &str = "Data Source";

/// The source range a daily table was fetched for.
///
/// The combined table is always concatenated in declaration order:
/// historical, then year-to-date, then prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataSource {
    /// Long-range archive data ending before the current year.
    Historical,
    /// Archive data from January 1 of the run year up to the forecast window.
    YearToDate,
    /// Forecast data, including the few past days the forecast endpoint repeats.
    Prediction,
}

impl DataSource {
    /// Concatenation order of the combined table.
    pub const ORDER: [DataSource; 3] = [
        DataSource::Historical,
        DataSource::YearToDate,
        DataSource::Prediction,
    ];

    /// The label written into the [`DATA_SOURCE_COLUMN`] column.
    pub fn label(&self) -> &'static str {
        match self {
            DataSource::Historical => "Historical",
            DataSource::YearToDate => "YTD",
            DataSource::Prediction => "Prediction",
        }
    }

    /// Suffix used when naming the stage's CSV file.
    pub(crate) fn file_suffix(&self) -> &'static str {
        self.label()
    }
}

/// Allows formatting a `DataSource` using its label.
///
/// # Examples
///
/// ```
/// use garden_weather::DataSource;
///
/// assert_eq!(DataSource::YearToDate.to_string(), "YTD");
/// ```
impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
