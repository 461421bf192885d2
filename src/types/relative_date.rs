//! Classification of a record's date relative to the day the pipeline runs.

use chrono::NaiveDate;
use std::cmp::Ordering;
use std::fmt;

pub const RELATIVE_DATE_COLUMN: &str = "relative_date";

/// Label for rows whose date is missing.
pub const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelativeDate {
    Historical,
    Current,
    Prediction,
}

impl RelativeDate {
    /// Classifies `date` against `run_date` using calendar order.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use garden_weather::RelativeDate;
    ///
    /// let run = NaiveDate::from_ymd_opt(2024, 10, 2).unwrap();
    /// let earlier = NaiveDate::from_ymd_opt(2024, 9, 30).unwrap();
    /// assert_eq!(RelativeDate::classify(earlier, run), RelativeDate::Historical);
    /// ```
    pub fn classify(date: NaiveDate, run_date: NaiveDate) -> Self {
        match date.cmp(&run_date) {
            Ordering::Less => RelativeDate::Historical,
            Ordering::Equal => RelativeDate::Current,
            Ordering::Greater => RelativeDate::Prediction,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RelativeDate::Historical => "Historical",
            RelativeDate::Current => "Current date",
            RelativeDate::Prediction => "Prediction",
        }
    }
}

impl fmt::Display for RelativeDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_classify_around_run_date() {
        let run = date(2024, 3, 1);
        assert_eq!(
            RelativeDate::classify(date(2024, 2, 29), run),
            RelativeDate::Historical
        );
        assert_eq!(RelativeDate::classify(run, run), RelativeDate::Current);
        assert_eq!(
            RelativeDate::classify(date(2024, 3, 2), run),
            RelativeDate::Prediction
        );
    }

    #[test]
    fn test_classify_uses_calendar_order_not_text_order() {
        // "2024-9-30" > "2024-10-02" as unpadded text, but September is earlier.
        let run = date(2024, 10, 2);
        assert_eq!(
            RelativeDate::classify(date(2024, 9, 30), run),
            RelativeDate::Historical
        );
        assert_eq!(
            RelativeDate::classify(date(2025, 1, 1), date(2024, 12, 31)),
            RelativeDate::Prediction
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(RelativeDate::Current.to_string(), "Current date");
        assert_eq!(RelativeDate::Historical.label(), "Historical");
        assert_eq!(RelativeDate::Prediction.label(), "Prediction");
    }
}
