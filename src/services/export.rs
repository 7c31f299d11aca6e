// src/services/export.rs
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use std::fs;
use std::path::Path;

use super::chart::{Chart, Fill};
use super::statistics::SummaryStatistics;
use crate::config::OutputFormat;
use crate::error::{AnalysisError, Result};
use crate::models::UnassignedReturn;

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 700.0;
const MARGIN_LEFT: f64 = 150.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 80.0;

const HISTORICAL_FILL: &str = "#0000ff";
const CURRENT_FILL: &str = "#ff0000";

const PANEL_FONT_SIZE: f64 = 10.0;
const PANEL_LINE_HEIGHT: f64 = 14.0;
const PANEL_PADDING: f64 = 8.0;
// Rough advance of one character at PANEL_FONT_SIZE.
const PANEL_CHAR_WIDTH: f64 = 6.0;

/// Everything produced by one run, as written by the JSON exporter.
#[derive(Debug, Clone, Serialize)]
pub struct ChartReport {
    pub generated_at: DateTime<Utc>,
    pub chart: Chart,
    pub statistics: SummaryStatistics,
    pub unassigned: Vec<UnassignedReturn>,
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

struct Frame {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Frame {
    fn plot_width() -> f64 {
        WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn plot_height() -> f64 {
        HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
    }

    fn px(&self, x: f64) -> f64 {
        MARGIN_LEFT + (x - self.x_min) / (self.x_max - self.x_min) * Self::plot_width()
    }

    fn py(&self, y: f64) -> f64 {
        MARGIN_TOP + Self::plot_height() - (y - self.y_min) / (self.y_max - self.y_min) * Self::plot_height()
    }
}

/// Draw the chart as a standalone SVG document.
pub fn render_svg(chart: &Chart) -> String {
    let frame = Frame {
        x_min: chart.x_axis.min,
        x_max: chart.x_axis.max,
        y_min: chart.y_axis.min,
        y_max: chart.y_axis.max,
    };
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\">\n",
        w = WIDTH,
        h = HEIGHT
    ));
    svg.push_str(&format!("<rect width=\"{}\" height=\"{}\" fill=\"white\"/>\n", WIDTH, HEIGHT));

    // Title
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"16\">{}</text>\n",
        MARGIN_LEFT + Frame::plot_width() / 2.0,
        MARGIN_TOP / 2.0 + 6.0,
        escape(&chart.title)
    ));

    // Bars
    for bar in &chart.bars {
        let fill = match bar.fill {
            Fill::Historical => HISTORICAL_FILL,
            Fill::CurrentYear => CURRENT_FILL,
        };
        let left = frame.px(bar.x - bar.width / 2.0);
        let right = frame.px(bar.x + bar.width / 2.0);
        let top = frame.py(bar.top() as f64);
        let bottom = frame.py(bar.bottom as f64);
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"white\" stroke-width=\"1\"/>\n",
            left,
            top,
            right - left,
            bottom - top,
            fill
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-size=\"9\" fill=\"white\">{}</text>\n",
            frame.px(bar.x),
            (top + bottom) / 2.0,
            escape(&bar.label)
        ));
    }

    // Plot frame
    svg.push_str(&format!(
        "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"none\" stroke=\"black\"/>\n",
        MARGIN_LEFT,
        MARGIN_TOP,
        Frame::plot_width(),
        Frame::plot_height()
    ));

    // x ticks
    let axis_y = frame.py(frame.y_min);
    for tick in &chart.x_axis.ticks {
        let x = frame.px(tick.value);
        svg.push_str(&format!(
            "<line x1=\"{x:.2}\" y1=\"{:.2}\" x2=\"{x:.2}\" y2=\"{:.2}\" stroke=\"black\"/>\n",
            axis_y,
            axis_y + 5.0,
        ));
        svg.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"11\">{}</text>\n",
            axis_y + 18.0,
            escape(&tick.label)
        ));
    }

    // y ticks
    for tick in &chart.y_axis.ticks {
        let y = frame.py(tick.value);
        svg.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{y:.2}\" x2=\"{:.2}\" y2=\"{y:.2}\" stroke=\"black\"/>\n",
            MARGIN_LEFT - 5.0,
            MARGIN_LEFT,
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{y:.2}\" text-anchor=\"end\" dominant-baseline=\"central\" font-size=\"11\">{}</text>\n",
            MARGIN_LEFT - 8.0,
            escape(&tick.label)
        ));
    }

    // Axis labels
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"12\">{}</text>\n",
        MARGIN_LEFT + Frame::plot_width() / 2.0,
        HEIGHT - MARGIN_BOTTOM / 2.0 + 10.0,
        escape(&chart.x_label)
    ));
    let y_label_x = 24.0;
    let y_label_y = MARGIN_TOP + Frame::plot_height() / 2.0;
    svg.push_str(&format!(
        "<text transform=\"translate({:.1},{:.1}) rotate(-90)\" text-anchor=\"middle\" font-size=\"12\">",
        y_label_x, y_label_y
    ));
    for (i, line) in chart.y_label.lines().enumerate() {
        let dy = if i == 0 { "0" } else { "1.2em" };
        svg.push_str(&format!("<tspan x=\"0\" dy=\"{}\">{}</tspan>", dy, escape(line)));
    }
    svg.push_str("</text>\n");

    push_panel(&mut svg, chart);

    svg.push_str("</svg>\n");
    svg
}

fn push_panel(svg: &mut String, chart: &Chart) {
    let panel = &chart.panel;
    if panel.lines.is_empty() {
        return;
    }

    let label_chars = panel.lines.iter().map(|l| l.label.chars().count() + 1).max().unwrap_or(0);
    let value_chars = panel.lines.iter().map(|l| l.value.chars().count()).max().unwrap_or(0);
    let box_width = (label_chars + value_chars + 3) as f64 * PANEL_CHAR_WIDTH + 2.0 * PANEL_PADDING;
    let box_height = panel.lines.len() as f64 * PANEL_LINE_HEIGHT + 2.0 * PANEL_PADDING;

    let (fx, fy) = panel.position;
    let left = MARGIN_LEFT + fx * Frame::plot_width();
    let top = MARGIN_TOP + (1.0 - fy) * Frame::plot_height();

    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"6\" fill=\"white\" stroke=\"black\"/>\n",
        left, top, box_width, box_height
    ));

    for (i, line) in panel.lines.iter().enumerate() {
        let baseline = top + PANEL_PADDING + (i as f64 + 0.8) * PANEL_LINE_HEIGHT;
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{}\">{}:</text>\n",
            left + PANEL_PADDING,
            baseline,
            PANEL_FONT_SIZE,
            escape(&line.label)
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\" font-size=\"{}\">{}</text>\n",
            left + box_width - PANEL_PADDING,
            baseline,
            PANEL_FONT_SIZE,
            escape(&line.value)
        ));
    }
}

pub fn render_json(report: &ChartReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write the report to `path` in the requested format.
pub fn write_report(report: &ChartReport, path: &Path, format: OutputFormat) -> Result<()> {
    let body = match format {
        OutputFormat::Svg => render_svg(&report.chart),
        OutputFormat::Json => render_json(report)?,
    };
    fs::write(path, body).map_err(|source| AnalysisError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote {:?} chart to {}", format, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::axis::{Axis, Tick};
    use crate::services::chart::Bar;
    use crate::services::statistics::{PanelLine, StatsPanel};

    fn sample_chart() -> Chart {
        Chart {
            title: "Index A&B 2021 to 2023".to_string(),
            x_label: "Returns in %".to_string(),
            y_label: "Count\n(Share)".to_string(),
            x_axis: Axis {
                min: -20.0,
                max: 20.0,
                ticks: vec![Tick { value: 0.0, label: "0%".to_string() }],
            },
            y_axis: Axis {
                min: 0.0,
                max: 3.0,
                ticks: vec![Tick { value: 1.0, label: "1 (33.3%)".to_string() }],
            },
            bars: vec![
                Bar { year: 2021, x: 5.0, width: 10.0, bottom: 0, fill: Fill::Historical, label: "2021".to_string() },
                Bar { year: 2023, x: 5.0, width: 10.0, bottom: 1, fill: Fill::CurrentYear, label: "2023".to_string() },
            ],
            panel: StatsPanel {
                position: (0.05, 0.95),
                lines: vec![PanelLine { label: "Mean".to_string(), value: "3.3%".to_string() }],
            },
        }
    }

    #[test]
    fn svg_contains_bars_labels_and_panel() {
        let svg = render_svg(&sample_chart());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Index A&amp;B 2021 to 2023"));
        assert_eq!(svg.matches(HISTORICAL_FILL).count(), 1);
        assert_eq!(svg.matches(CURRENT_FILL).count(), 1);
        assert!(svg.contains(">2021</text>"));
        assert!(svg.contains(">2023</text>"));
        assert!(svg.contains(">1 (33.3%)</text>"));
        assert!(svg.contains(">Mean:</text>"));
        assert!(svg.contains(">3.3%</text>"));
        assert!(svg.contains("<tspan x=\"0\" dy=\"1.2em\">(Share)</tspan>"));
    }

    #[test]
    fn bars_are_stacked_in_pixel_space() {
        let chart = sample_chart();
        let frame = Frame { x_min: -20.0, x_max: 20.0, y_min: 0.0, y_max: 3.0 };
        // Unit height is a third of the plot.
        let unit = frame.py(0.0) - frame.py(1.0);
        assert!((unit - Frame::plot_height() / 3.0).abs() < 1e-9);
        assert!((frame.px(chart.bars[0].x) - (MARGIN_LEFT + 0.625 * Frame::plot_width())).abs() < 1e-9);
    }

    #[test]
    fn json_report_serializes_nan_as_null() {
        let report = ChartReport {
            generated_at: Utc::now(),
            chart: sample_chart(),
            statistics: SummaryStatistics::compute(&[1.0]),
            unassigned: vec![UnassignedReturn { year: 2009, return_pct: 75.0 }],
        };
        let json = render_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["chart"]["bars"][1]["fill"], "current_year");
        assert!(value["statistics"]["std_dev"].is_null());
        assert_eq!(value["unassigned"][0]["year"], 2009);
    }
}
