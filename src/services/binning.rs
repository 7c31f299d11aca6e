// src/services/binning.rs
use log::{info, warn};

use crate::error::{AnalysisError, Result};
use crate::models::{Bin, BinnedRecord, ReturnRecord, ReturnSeries, UnassignedReturn};

/// Decimal places a return is rounded to before it is compared with the
/// boundaries, so `(110 / 100 - 1) * 100` counts as exactly `10.0`.
pub const BINNING_DECIMALS: i32 = 9;

pub fn snap(value: f64) -> f64 {
    let scale = 10f64.powi(BINNING_DECIMALS);
    (value * scale).round() / scale
}

/// Ascending, contiguous bin boundaries. `n` boundaries make `n - 1` bins,
/// each half-open as `(low, high]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BinEdges {
    boundaries: Vec<f64>,
}

impl BinEdges {
    pub fn new(boundaries: Vec<f64>) -> Result<Self> {
        if boundaries.len() < 2 {
            return Err(AnalysisError::InvalidConfig(format!(
                "at least 2 bin boundaries are required, got {}",
                boundaries.len()
            )));
        }
        if let Some(bad) = boundaries.iter().find(|b| !b.is_finite()) {
            return Err(AnalysisError::InvalidConfig(format!(
                "bin boundary {} is not finite",
                bad
            )));
        }
        if let Some(pair) = boundaries.windows(2).find(|w| w[0] >= w[1]) {
            return Err(AnalysisError::InvalidConfig(format!(
                "bin boundaries must be strictly ascending ({} followed by {})",
                pair[0], pair[1]
            )));
        }
        Ok(BinEdges { boundaries })
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    pub fn min(&self) -> f64 {
        self.boundaries[0]
    }

    pub fn max(&self) -> f64 {
        self.boundaries[self.boundaries.len() - 1]
    }

    /// Boundaries strictly between the outer two.
    pub fn interior(&self) -> &[f64] {
        &self.boundaries[1..self.boundaries.len() - 1]
    }

    pub fn bins(&self) -> impl Iterator<Item = Bin> + '_ {
        self.boundaries.windows(2).map(|w| Bin { low: w[0], high: w[1] })
    }

    /// Never zero: construction requires two boundaries.
    pub fn bin_count(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Index of the bin with `low < value <= high` after [`snap`]. `None`
    /// outside the covered range, at exactly the lowest boundary, and for NaN.
    pub fn index_of(&self, value: f64) -> Option<usize> {
        let value = snap(value);
        self.bins().position(|bin| bin.contains(value))
    }

    pub fn assign(&self, value: f64) -> Option<Bin> {
        self.index_of(value).map(|i| Bin {
            low: self.boundaries[i],
            high: self.boundaries[i + 1],
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinnedSeries {
    /// Historical records that landed in a bin, chronological.
    pub historical: Vec<BinnedRecord>,
    pub current: Option<BinnedRecord>,
    pub unassigned: Vec<UnassignedReturn>,
}

/// Bin the historical series and the current year with the same edges.
pub fn bin_series(series: &ReturnSeries, edges: &BinEdges) -> BinnedSeries {
    let mut unassigned = Vec::new();

    let historical = series
        .historical
        .iter()
        .filter_map(|r| bin_record(r, edges, &mut unassigned))
        .collect::<Vec<_>>();
    let current = series
        .current
        .as_ref()
        .and_then(|r| bin_record(r, edges, &mut unassigned));

    info!(
        "Binned {} returns into {} bins ({} unassigned)",
        historical.len() + usize::from(current.is_some()),
        edges.bin_count(),
        unassigned.len()
    );

    BinnedSeries {
        historical,
        current,
        unassigned,
    }
}

fn bin_record(
    record: &ReturnRecord,
    edges: &BinEdges,
    unassigned: &mut Vec<UnassignedReturn>,
) -> Option<BinnedRecord> {
    match edges.assign(record.return_pct) {
        Some(bin) => Some(BinnedRecord {
            year: record.year,
            return_pct: record.return_pct,
            bin,
        }),
        None => {
            warn!(
                "Return {:.2}% for {} lies outside bins ({}, {}], not drawn",
                record.return_pct,
                record.year,
                edges.min(),
                edges.max()
            );
            unassigned.push(UnassignedReturn {
                year: record.year,
                return_pct: record.return_pct,
            });
            None
        }
    }
}
