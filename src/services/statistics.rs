// src/services/statistics.rs
use log::info;
use serde::Serialize;

use crate::models::ReturnSeries;

/// Descriptive statistics over the combined (historical + current) returns.
///
/// Values are kept unrounded; rounding happens only when the panel is
/// formatted. Anything undefined for the sample size is NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub count: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub mean: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
    pub std_dev: f64,
    pub skewness: f64,
    pub excess_kurtosis: f64,
}

impl SummaryStatistics {
    pub fn compute(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        SummaryStatistics {
            count: values.len(),
            positive_count: values.iter().filter(|&&v| v >= 0.0).count(),
            negative_count: values.iter().filter(|&&v| v < 0.0).count(),
            mean: mean(values),
            min: sorted.first().copied().unwrap_or(f64::NAN),
            p25: percentile(&sorted, 25.0),
            median: percentile(&sorted, 50.0),
            p75: percentile(&sorted, 75.0),
            max: sorted.last().copied().unwrap_or(f64::NAN),
            std_dev: sample_std_dev(values),
            skewness: skewness(values),
            excess_kurtosis: excess_kurtosis(values),
        }
    }

    /// Kurtosis as shown on the chart: the excess form with 3 added back.
    pub fn displayed_kurtosis(&self) -> f64 {
        self.excess_kurtosis + 3.0
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        f64::NAN
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Percentile `q` (0..=100) of an ascending slice, interpolating linearly
/// between the closest ranks.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let h = (n - 1) as f64 * q / 100.0;
            let lo = h.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
        }
    }
}

/// Standard deviation with the `n - 1` denominator.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Sums of squared, cubed and fourth-power deviations from the mean.
fn central_sums(values: &[f64]) -> (f64, f64, f64) {
    let m = mean(values);
    values.iter().fold((0.0, 0.0, 0.0), |(s2, s3, s4), v| {
        let d = v - m;
        let d2 = d * d;
        (s2 + d2, s3 + d2 * d, s4 + d2 * d2)
    })
}

/// Adjusted Fisher-Pearson skewness. Needs at least 3 values.
pub fn skewness(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return f64::NAN;
    }
    let nf = n as f64;
    let (s2, s3, _) = central_sums(values);
    if s2 == 0.0 {
        return 0.0;
    }
    let m2 = s2 / nf;
    let m3 = s3 / nf;
    (nf * (nf - 1.0)).sqrt() / (nf - 2.0) * m3 / m2.powf(1.5)
}

/// Unbiased excess kurtosis (0 for a normal distribution). Needs at least
/// 4 values.
pub fn excess_kurtosis(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 4 {
        return f64::NAN;
    }
    let nf = n as f64;
    let (s2, _, s4) = central_sums(values);
    if s2 == 0.0 {
        return 0.0;
    }
    let numer = nf * (nf + 1.0) * (nf - 1.0) * s4;
    let denom = (nf - 2.0) * (nf - 3.0) * s2 * s2;
    let adj = 3.0 * (nf - 1.0).powi(2) / ((nf - 2.0) * (nf - 3.0));
    numer / denom - adj
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelLine {
    pub label: String,
    pub value: String,
}

/// The statistics text box, anchored top-left at `position` in axes
/// fractions (0..1, origin bottom-left).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsPanel {
    pub position: (f64, f64),
    pub lines: Vec<PanelLine>,
}

impl StatsPanel {
    /// Labels left, values right-aligned in a second column.
    pub fn to_text(&self) -> String {
        let label_width = self.lines.iter().map(|l| l.label.chars().count()).max().unwrap_or(0);
        let value_width = self.lines.iter().map(|l| l.value.chars().count()).max().unwrap_or(0);
        self.lines
            .iter()
            .map(|l| {
                format!(
                    "{:<lw$}  {:>vw$}",
                    format!("{}:", l.label),
                    l.value,
                    lw = label_width + 1,
                    vw = value_width
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn pct(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn build_panel(series: &ReturnSeries, stats: &SummaryStatistics, index_name: &str) -> StatsPanel {
    let period = match (series.first_year(), series.last_year()) {
        (Some(first), Some(last)) => format!("{} - {}", first, last),
        _ => "-".to_string(),
    };

    let line = |label: &str, value: String| PanelLine {
        label: label.to_string(),
        value,
    };

    StatsPanel {
        position: (0.05, 0.95),
        lines: vec![
            line("Time period", period),
            line("Index", index_name.to_string()),
            line("Number of years", stats.count.to_string()),
            line("Number of pos. years", stats.positive_count.to_string()),
            line("Number of neg. years", stats.negative_count.to_string()),
            line("Mean", pct(stats.mean)),
            line("Minimum", pct(stats.min)),
            line("25% - Quartile", pct(stats.p25)),
            line("50% - Quartile (Median)", pct(stats.median)),
            line("75% - Quartile", pct(stats.p75)),
            line("Maximum", pct(stats.max)),
            line("Standard dev.", pct(stats.std_dev)),
            line("Skewness", pct(stats.skewness * 100.0)),
            line("Kurtosis", format!("{:.2}", stats.displayed_kurtosis())),
        ],
    }
}

pub fn summarize(series: &ReturnSeries) -> SummaryStatistics {
    let stats = SummaryStatistics::compute(&series.combined());
    info!(
        "Statistics over {} returns: mean {:.2}%, std dev {:.2}%",
        stats.count, stats.mean, stats.std_dev
    );
    stats
}
