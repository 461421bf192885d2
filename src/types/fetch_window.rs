use chrono::NaiveDate;

/// The time span a single request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchWindow {
    /// An explicit date range, both ends inclusive. Used against the archive endpoint.
    Range {
        start: NaiveDate,
        end: NaiveDate,
    },
    /// The most recent `past_days` plus `forecast_days` of forecast, counted from today
    /// in the requested timezone. Used against the forecast endpoint.
    Recent { past_days: u32, forecast_days: u32 },
}

impl FetchWindow {
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            FetchWindow::Range { start, end } => vec![
                ("start_date", start.format("%Y-%m-%d").to_string()),
                ("end_date", end.format("%Y-%m-%d").to_string()),
            ],
            FetchWindow::Recent {
                past_days,
                forecast_days,
            } => vec![
                ("past_days", past_days.to_string()),
                ("forecast_days", forecast_days.to_string()),
            ],
        }
    }

    /// `true` when `end` precedes `start`; such a range would be rejected by the provider.
    pub fn is_empty(&self) -> bool {
        match self {
            FetchWindow::Range { start, end } => end < start,
            FetchWindow::Recent {
                past_days,
                forecast_days,
            } => *past_days == 0 && *forecast_days == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_query_pairs() {
        let window = FetchWindow::Range {
            start: NaiveDate::from_ymd_opt(1940, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(),
        };
        assert_eq!(
            window.query_pairs(),
            vec![
                ("start_date", "1940-01-01".to_string()),
                ("end_date", "2022-12-31".to_string())
            ]
        );
        assert!(!window.is_empty());
    }

    #[test]
    fn test_recent_query_pairs() {
        let window = FetchWindow::Recent {
            past_days: 2,
            forecast_days: 7,
        };
        assert_eq!(
            window.query_pairs(),
            vec![
                ("past_days", "2".to_string()),
                ("forecast_days", "7".to_string())
            ]
        );
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let window = FetchWindow::Range {
            start: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        assert!(window.is_empty());
    }
}
