// src/services/returns.rs
use log::{info, warn};

use crate::error::{AnalysisError, Result};
use crate::models::{Observation, ReturnRecord, ReturnSeries};

/// Year-over-year percentage returns. Record `i` belongs to the year of
/// observation `i + 1`; the first year has no predecessor and yields nothing.
pub fn calculate_returns(observations: &[Observation]) -> Result<Vec<ReturnRecord>> {
    if observations.len() < 2 {
        return Err(AnalysisError::InsufficientData(observations.len()));
    }

    let returns: Vec<ReturnRecord> = observations
        .windows(2)
        .map(|pair| ReturnRecord {
            year: pair[1].year,
            return_pct: (pair[1].price / pair[0].price - 1.0) * 100.0,
        })
        .collect();

    if let (Some(max), Some(min)) = (extreme(&returns, f64::max), extreme(&returns, f64::min)) {
        info!("Calculated {} returns, max {:.2}%, min {:.2}%", returns.len(), max, min);
    }

    Ok(returns)
}

fn extreme(returns: &[ReturnRecord], pick: fn(f64, f64) -> f64) -> Option<f64> {
    returns.iter().map(|r| r.return_pct).reduce(pick)
}

/// Partition by year value into the historical series (input order kept) and
/// the current-year record.
pub fn split_current_year(returns: Vec<ReturnRecord>, current_year: i32) -> ReturnSeries {
    let mut historical = Vec::with_capacity(returns.len());
    let mut current = None;

    for record in returns {
        if record.year == current_year && current.is_none() {
            current = Some(record);
        } else {
            if record.year == current_year {
                // Later duplicates stay in the stacks so every row is counted.
                warn!("Year {} appears more than once, highlighting the first only", current_year);
            }
            historical.push(record);
        }
    }

    if current.is_none() {
        warn!("Current year {} not found in data, skipping highlighted bar", current_year);
    }

    ReturnSeries { historical, current }
}

/// The year to highlight when none is configured.
pub fn default_current_year(returns: &[ReturnRecord]) -> Option<i32> {
    returns.last().map(|r| r.year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn obs(rows: &[(i32, f64)]) -> Vec<Observation> {
        rows.iter().map(|&(year, price)| Observation { year, price }).collect()
    }

    #[test]
    fn computes_percentage_returns() {
        let returns = calculate_returns(&obs(&[(2020, 100.0), (2021, 110.0), (2022, 99.0), (2023, 108.9)])).unwrap();
        let years: Vec<i32> = returns.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2021, 2022, 2023]);
        assert_abs_diff_eq!(returns[0].return_pct, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(returns[1].return_pct, -10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(returns[2].return_pct, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn rejects_fewer_than_two_rows() {
        assert!(matches!(
            calculate_returns(&obs(&[(2020, 100.0)])),
            Err(AnalysisError::InsufficientData(1))
        ));
        assert!(matches!(calculate_returns(&[]), Err(AnalysisError::InsufficientData(0))));
    }

    #[test]
    fn splits_by_year_value_not_position() {
        let returns = vec![
            ReturnRecord { year: 2021, return_pct: 1.0 },
            ReturnRecord { year: 2022, return_pct: 2.0 },
            ReturnRecord { year: 2023, return_pct: 3.0 },
        ];
        let series = split_current_year(returns, 2022);
        assert_eq!(series.current, Some(ReturnRecord { year: 2022, return_pct: 2.0 }));
        let years: Vec<i32> = series.historical.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2021, 2023]);
    }

    #[test]
    fn absent_current_year_keeps_everything_historical() {
        let returns = vec![
            ReturnRecord { year: 2021, return_pct: 1.0 },
            ReturnRecord { year: 2022, return_pct: 2.0 },
        ];
        let series = split_current_year(returns, 2030);
        assert!(series.current.is_none());
        assert_eq!(series.historical.len(), 2);
    }

    #[test]
    fn default_current_year_is_last_row() {
        let returns = vec![
            ReturnRecord { year: 2021, return_pct: 1.0 },
            ReturnRecord { year: 2022, return_pct: 2.0 },
        ];
        assert_eq!(default_current_year(&returns), Some(2022));
        assert_eq!(default_current_year(&[]), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn one_return_per_consecutive_pair(prices in prop::collection::vec(1.0f64..10_000.0, 2..60)) {
            let observations: Vec<Observation> = prices
                .iter()
                .enumerate()
                .map(|(i, &price)| Observation { year: 1970 + i as i32, price })
                .collect();
            let returns = calculate_returns(&observations).unwrap();
            prop_assert_eq!(returns.len(), observations.len() - 1);
            for (i, r) in returns.iter().enumerate() {
                let expected = (prices[i + 1] / prices[i] - 1.0) * 100.0;
                prop_assert!((r.return_pct - expected).abs() <= 1e-9);
                prop_assert_eq!(r.year, observations[i + 1].year);
            }
        }
    }
}
