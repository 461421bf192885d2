//! Declarative descriptions of derived columns.
//!
//! The aggregation and combination stages loop over lists of these instead of
//! spelling out each soil layer or precipitation kind by hand.

use polars::prelude::{col, Expr, RollingOptionsFixedWindow};

/// How a group or window of values is reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregation {
    Mean,
    Sum,
}

/// Reduces an hourly column to one value per calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregateSpec {
    pub source: String,
    pub target: String,
    pub kind: Aggregation,
}

impl AggregateSpec {
    /// Daily mean of `source`, stored as `<source>_mean`.
    pub fn mean(source: impl Into<String>) -> Self {
        let source = source.into();
        let target = format!("{source}_mean");
        Self {
            source,
            target,
            kind: Aggregation::Mean,
        }
    }

    /// Daily mean of `source` stored under an explicit name.
    pub fn mean_as(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: Aggregation::Mean,
        }
    }

    pub(crate) fn expr(&self) -> Expr {
        let column = col(self.source.as_str());
        match self.kind {
            Aggregation::Mean => column.mean(),
            Aggregation::Sum => column.sum(),
        }
        .alias(self.target.as_str())
    }
}

/// A trailing window statistic over the row order of the combined table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RollingSpec {
    pub source: String,
    pub target: String,
    pub kind: Aggregation,
    pub window: usize,
}

impl RollingSpec {
    pub fn mean(source: impl Into<String>, target: impl Into<String>, window: usize) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: Aggregation::Mean,
            window,
        }
    }

    pub fn sum(source: impl Into<String>, target: impl Into<String>, window: usize) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: Aggregation::Sum,
            window,
        }
    }

    /// The first `window - 1` rows come out null: the window must be full.
    pub(crate) fn expr(&self) -> Expr {
        let options = RollingOptionsFixedWindow {
            window_size: self.window,
            min_periods: self.window,
            ..Default::default()
        };
        let column = col(self.source.as_str());
        match self.kind {
            Aggregation::Mean => column.rolling_mean(options),
            Aggregation::Sum => column.rolling_sum(options),
        }
        .alias(self.target.as_str())
    }
}

/// Adds `addend` into `target` and drops `addend` afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnFold {
    pub target: String,
    pub addend: String,
}

impl ColumnFold {
    pub fn new(target: impl Into<String>, addend: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            addend: addend.into(),
        }
    }
}
