// src/services/axis.rs
use serde::Serialize;

use super::binning::BinEdges;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub ticks: Vec<Tick>,
}

/// Percent label without a trailing `.0` for whole numbers: `-50%`, `12.5%`.
pub fn format_percent(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}%", value)
    } else {
        format!("{}%", value)
    }
}

/// Spans the whole bin domain with a tick at each interior boundary.
pub fn x_axis(edges: &BinEdges) -> Axis {
    Axis {
        min: edges.min(),
        max: edges.max(),
        ticks: edges
            .interior()
            .iter()
            .map(|&value| Tick {
                value,
                label: format_percent(value),
            })
            .collect(),
    }
}

/// `0..=deepest + 1`, with ticks `1..=deepest` labelled as count and share of
/// all observations, e.g. `3 (5.6%)`.
pub fn y_axis(deepest: u32, total_observations: usize) -> Axis {
    let ticks = (1..=deepest)
        .map(|k| {
            let share = if total_observations == 0 {
                f64::NAN
            } else {
                k as f64 / total_observations as f64 * 100.0
            };
            Tick {
                value: k as f64,
                label: format!("{} ({:.1}%)", k, share),
            }
        })
        .collect();

    Axis {
        min: 0.0,
        max: deepest.saturating_add(1) as f64,
        ticks,
    }
}
