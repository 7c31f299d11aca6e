// src/services/chart.rs
use log::debug;
use serde::Serialize;

use super::axis::{x_axis, y_axis, Axis};
use super::binning::{BinEdges, BinnedSeries};
use super::statistics::{build_panel, StatsPanel, SummaryStatistics};
use crate::config::{AnalysisConfig, CurrentYearOffset};
use crate::models::{Bin, BinnedRecord, ReturnSeries};

pub const X_LABEL: &str = "Returns MSCI in %";
pub const Y_LABEL: &str = "Number of Observations\n(Probability in %)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fill {
    Historical,
    CurrentYear,
}

/// One unit-height rectangle, labelled with its year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub year: i32,
    pub x: f64,
    pub width: f64,
    pub bottom: u32,
    pub fill: Fill,
    pub label: String,
}

impl Bar {
    fn new(record: &BinnedRecord, bottom: u32, fill: Fill) -> Self {
        Bar {
            year: record.year,
            x: record.bin.midpoint(),
            width: record.bin.width(),
            bottom,
            fill,
            label: record.year.to_string(),
        }
    }

    pub fn top(&self) -> u32 {
        self.bottom.saturating_add(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackLayout {
    pub bars: Vec<Bar>,
    /// Historical stack height per bin, in bin order.
    pub heights: Vec<u32>,
    /// Highest bar top on the chart, current year included.
    pub deepest: u32,
}

fn bin_slot(edges: &BinEdges, bin: &Bin) -> Option<usize> {
    edges.bins().position(|b| b == *bin)
}

/// Stack historical records bottom-up in chronological order, then place the
/// current year according to `offset`.
pub fn layout_bars(binned: &BinnedSeries, edges: &BinEdges, offset: CurrentYearOffset) -> StackLayout {
    let mut heights = vec![0u32; edges.bin_count()];
    let mut bars = Vec::with_capacity(binned.historical.len() + 1);

    for record in &binned.historical {
        let Some(slot) = bin_slot(edges, &record.bin) else {
            continue;
        };
        let bottom = heights[slot];
        heights[slot] += 1;
        debug!("Bar {} at x={} bottom={}", record.year, record.bin.midpoint(), bottom);
        bars.push(Bar::new(record, bottom, Fill::Historical));
    }

    let tallest = heights.iter().copied().max().unwrap_or(0);
    let mut deepest = tallest;

    if let Some(current) = &binned.current {
        let bottom = match offset {
            CurrentYearOffset::Tallest => tallest,
            CurrentYearOffset::OwnBin => bin_slot(edges, &current.bin).map_or(0, |slot| heights[slot]),
            CurrentYearOffset::Fixed(n) => n,
        };
        debug!("Current year {} at x={} bottom={}", current.year, current.bin.midpoint(), bottom);
        let bar = Bar::new(current, bottom, Fill::CurrentYear);
        deepest = deepest.max(bar.top());
        bars.push(bar);
    }

    StackLayout {
        bars,
        heights,
        deepest,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub bars: Vec<Bar>,
    pub panel: StatsPanel,
}

pub fn build_chart(
    series: &ReturnSeries,
    binned: &BinnedSeries,
    edges: &BinEdges,
    stats: &SummaryStatistics,
    config: &AnalysisConfig,
) -> Chart {
    let layout = layout_bars(binned, edges, config.current_offset);

    let title = match (series.first_year(), series.last_year()) {
        (Some(first), Some(last)) => format!("{} {} to {}", config.index_title, first, last),
        _ => config.index_title.clone(),
    };

    Chart {
        title,
        x_label: X_LABEL.to_string(),
        y_label: Y_LABEL.to_string(),
        x_axis: x_axis(edges),
        y_axis: y_axis(layout.deepest, series.len()),
        bars: layout.bars,
        panel: build_panel(series, stats, &config.index_name),
    }
}
