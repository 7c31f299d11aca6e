// src/models.rs
use serde::Serialize;

/// One row of the input table: the index level at the end of `year`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub year: i32,
    pub price: f64,
}

/// Year-over-year return in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnRecord {
    pub year: i32,
    pub return_pct: f64,
}

/// Half-open interval `(low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    pub low: f64,
    pub high: f64,
}

impl Bin {
    pub fn contains(&self, value: f64) -> bool {
        self.low < value && value <= self.high
    }

    pub fn midpoint(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BinnedRecord {
    pub year: i32,
    pub return_pct: f64,
    pub bin: Bin,
}

/// A return that fell outside every configured bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnassignedReturn {
    pub year: i32,
    pub return_pct: f64,
}

/// Returns separated by year value into the historical series and the
/// highlighted current year.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    pub historical: Vec<ReturnRecord>,
    pub current: Option<ReturnRecord>,
}

impl ReturnSeries {
    /// Historical returns followed by the current year, if present.
    pub fn combined(&self) -> Vec<f64> {
        self.historical
            .iter()
            .chain(self.current.iter())
            .map(|r| r.return_pct)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.historical.len() + usize::from(self.current.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.historical.iter().chain(self.current.iter()).map(|r| r.year)
    }

    /// Earliest year present, current year included.
    pub fn first_year(&self) -> Option<i32> {
        self.years().min()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.years().max()
    }
}
