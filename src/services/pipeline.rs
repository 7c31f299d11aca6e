// src/services/pipeline.rs
use chrono::{Datelike, Utc};
use log::{info, warn};

use super::binning::{bin_series, BinEdges};
use super::chart::build_chart;
use super::export::{write_report, ChartReport};
use super::loader::load_observations;
use super::returns::{calculate_returns, default_current_year, split_current_year};
use super::statistics::summarize;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::models::{Observation, ReturnSeries};

/// Load the configured input and split its returns around the current year.
pub fn prepare_series(config: &AnalysisConfig) -> Result<ReturnSeries> {
    let observations = load_observations(&config.input)?;
    series_from_observations(&observations, config.current_year)
}

pub fn series_from_observations(observations: &[Observation], current_year: Option<i32>) -> Result<ReturnSeries> {
    let returns = calculate_returns(observations)?;
    let current_year = match current_year.or_else(|| default_current_year(&returns)) {
        Some(year) => year,
        None => return Err(AnalysisError::InsufficientData(observations.len())),
    };

    if current_year > Utc::now().year() {
        warn!("Current year {} is in the future", current_year);
    }
    info!("Highlighting {}", current_year);

    Ok(split_current_year(returns, current_year))
}

/// Everything between loading and writing.
pub fn analyze(series: &ReturnSeries, edges: &BinEdges, config: &AnalysisConfig) -> Result<ChartReport> {
    config.current_offset.validate()?;
    let binned = bin_series(series, edges);
    let statistics = summarize(series);
    let chart = build_chart(series, &binned, edges, &statistics, config);

    Ok(ChartReport {
        generated_at: Utc::now(),
        chart,
        statistics,
        unassigned: binned.unassigned,
    })
}

/// Load, analyze and write the chart. Nothing is written if any stage fails.
pub fn run(config: &AnalysisConfig) -> Result<ChartReport> {
    // Validate bins before touching the input.
    let edges = BinEdges::new(config.boundaries.clone())?;

    let series = prepare_series(config)?;
    let report = analyze(&series, &edges, config)?;
    write_report(&report, &config.output, config.format)?;
    Ok(report)
}
