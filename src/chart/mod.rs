//! Volatility cone charts
//!
//! Renders pipeline reports as static SVG documents:
//! - Realized: summary curves by window length, with realized volatility
//!   reference lines on a second y-axis
//! - Implied: rolling volatility by date, with per-window and implied
//!   volatility quantile lines

pub mod svg;

use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use crate::config::ChartConfig;
use crate::cone::{ImpliedConeReport, RealizedConeReport};
use crate::core::ConeResult;
use crate::stats::FiveNumberSummary;
use svg::{
    draw_legend, extent, nice_ticks, pad, Anchor, Dash, LegendEntry, LinearScale, Stroke, SvgDoc,
    LEGEND_ROW_HEIGHT,
};

const SERIES_COLORS: [&str; 5] = ["blue", "orange", "green", "red", "purple"];
const REALIZED_DASHES: [Dash; 5] = [Dash::Dashed, Dash::DashDot, Dash::Dotted, Dash::Dashed, Dash::DashDot];
const IMPLIED_COLOR: &str = "purple";
const GRID: Stroke = Stroke {
    color: "gray",
    width: 0.5,
    dash: Dash::Dashed,
    opacity: 0.7,
};
const AXIS: Stroke = Stroke {
    color: "#333",
    width: 1.0,
    dash: Dash::Solid,
    opacity: 1.0,
};

const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 90.0;
const MARGIN_TOP: f64 = 60.0;
const AXIS_BAND: f64 = 60.0;
const LEGEND_COLUMNS: usize = 3;

/// Pixel rectangle of the plotting area
#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl PlotArea {
    /// Plot area leaving room below for the axis and `legend_entries` rows
    fn new(doc: &SvgDoc, legend_entries: usize) -> Self {
        let legend_rows = legend_entries.div_ceil(LEGEND_COLUMNS) as f64;
        let bottom = (doc.height() - AXIS_BAND - legend_rows * LEGEND_ROW_HEIGHT - 10.0)
            .max(MARGIN_TOP + 50.0);
        Self {
            left: MARGIN_LEFT,
            right: doc.width() - MARGIN_RIGHT,
            top: MARGIN_TOP,
            bottom,
        }
    }

    fn x_scale(&self, domain: (f64, f64)) -> LinearScale {
        LinearScale::new(domain, (self.left, self.right))
    }

    fn y_scale(&self, domain: (f64, f64)) -> LinearScale {
        LinearScale::new(domain, (self.bottom, self.top))
    }

    fn hline(&self, doc: &mut SvgDoc, y: f64, stroke: Stroke) {
        doc.line(self.left, y, self.right, y, stroke);
    }

    fn frame(&self, doc: &mut SvgDoc) {
        doc.line(self.left, self.bottom, self.right, self.bottom, AXIS);
        doc.line(self.left, self.top, self.left, self.bottom, AXIS);
    }

    fn legend(&self, doc: &mut SvgDoc, entries: &[LegendEntry]) {
        let column_width = (self.right - self.left) / LEGEND_COLUMNS as f64;
        draw_legend(doc, entries, self.left, self.bottom + AXIS_BAND, column_width, LEGEND_COLUMNS);
    }
}

fn title(doc: &mut SvgDoc, text: &str) {
    let x = doc.width() / 2.0;
    doc.text(x, MARGIN_TOP / 2.0 + 6.0, text, 20.0, Anchor::Middle);
}

/// Horizontal grid lines and tick labels for a y-axis on the given side
fn y_axis(doc: &mut SvgDoc, area: &PlotArea, scale: &LinearScale, label: &str, right_side: bool, grid: bool) {
    let (x_axis, anchor, label_x) = if right_side {
        (area.right, Anchor::Start, area.right + MARGIN_RIGHT - 20.0)
    } else {
        (area.left, Anchor::End, area.left - MARGIN_LEFT + 20.0)
    };
    let tick_dx = if right_side { 6.0 } else { -6.0 };

    for tick in nice_ticks(scale.domain.0, scale.domain.1, 6) {
        let y = scale.map(tick);
        if grid {
            area.hline(doc, y, GRID);
        }
        doc.line(x_axis, y, x_axis + tick_dx, y, AXIS);
        doc.text(x_axis + tick_dx * 1.5, y + 4.0, &format_tick(tick), 11.0, anchor);
    }

    if right_side {
        doc.line(area.right, area.top, area.right, area.bottom, AXIS);
    }
    doc.vertical_text(label_x, (area.top + area.bottom) / 2.0, label, 13.0);
}

fn format_tick(value: f64) -> String {
    if value.abs() >= 100.0 || value.fract().abs() < 1e-9 {
        format!("{:.0}", value)
    } else if (value * 10.0).fract().abs() < 1e-9 {
        format!("{:.1}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Chart of the implied vs realized cone
pub fn render_realized_cone(report: &RealizedConeReport, config: &ChartConfig) -> String {
    let mut doc = SvgDoc::new(config.width, config.height);
    let n_legend = FiveNumberSummary::LABELS.len() + report.cones.len();
    let area = PlotArea::new(&doc, n_legend);

    title(&mut doc, "Volatility Cone: Implied vs Realized");

    let windows: Vec<f64> = report.cones.iter().map(|c| c.window as f64).collect();
    let x_domain = extent(windows.iter().copied()).map(|e| pad(e, 0.04)).unwrap_or((0.0, 1.0));
    let x = area.x_scale(x_domain);

    let implied_values = report.cones.iter().flat_map(|c| c.implied.as_array());
    let y_left = area.y_scale(extent(implied_values).map(|e| pad(e, 0.05)).unwrap_or((0.0, 1.0)));

    let realized_pct: Vec<f64> = report.cones.iter().map(|c| c.realized_mean * 100.0).collect();
    let y_right = area.y_scale(
        extent(realized_pct.iter().copied())
            .map(|(lo, hi)| (lo - 1.0, hi + 1.0))
            .unwrap_or((0.0, 1.0)),
    );

    // Grid and axes
    for &w in &windows {
        let px = x.map(w);
        doc.line(px, area.top, px, area.bottom, GRID);
        doc.line(px, area.bottom, px, area.bottom + 6.0, AXIS);
        doc.text(px, area.bottom + 20.0, &format!("{}", w as usize), 11.0, Anchor::Middle);
    }
    y_axis(&mut doc, &area, &y_left, "Annualized Implied Volatility (%)", false, true);
    y_axis(&mut doc, &area, &y_right, "Realized Volatility (%)", true, false);
    area.frame(&mut doc);
    doc.text(
        (area.left + area.right) / 2.0,
        area.bottom + 42.0,
        "Rolling Window Size (Days)",
        13.0,
        Anchor::Middle,
    );

    let mut legend = Vec::with_capacity(n_legend);

    // Implied summary curves, one per statistic
    for (i, label) in FiveNumberSummary::LABELS.iter().enumerate() {
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        let stroke = Stroke::solid(color, 2.0);
        let points: Vec<(f64, f64)> = report
            .cones
            .iter()
            .map(|c| (x.map(c.window as f64), y_left.map(c.implied.as_array()[i])))
            .filter(|(_, y)| y.is_finite())
            .collect();

        doc.polyline(&points, stroke);
        for &(px, py) in &points {
            doc.circle(px, py, 4.0, color);
        }
        legend.push(LegendEntry {
            label: format!("Implied {}", label),
            stroke,
            marker: true,
        });
    }

    // Realized reference lines on the right axis
    for (i, cone) in report.cones.iter().enumerate() {
        let stroke = Stroke::solid(SERIES_COLORS[i % SERIES_COLORS.len()], 1.5)
            .with_dash(REALIZED_DASHES[i % REALIZED_DASHES.len()])
            .with_opacity(0.7);
        let value = realized_pct[i];
        if value.is_finite() {
            area.hline(&mut doc, y_right.map(value), stroke);
        }
        legend.push(LegendEntry {
            label: format!("Realized Vol ({}-Day)", cone.window),
            stroke,
            marker: false,
        });
    }

    area.legend(&mut doc, &legend);
    doc.finish()
}

/// Chart of the rolling cone against live implied volatility quantiles
pub fn render_implied_cone(report: &ImpliedConeReport, config: &ChartConfig) -> String {
    let mut doc = SvgDoc::new(config.width, config.height);
    let n_windows = report.table.windows.len();
    let n_legend = n_windows * 4 + if report.implied_band.is_some() { 3 } else { 0 };
    let area = PlotArea::new(&doc, n_legend);

    title(
        &mut doc,
        &format!(
            "{} Volatility Cone with {} Implied Volatility",
            report.index_symbol.trim_start_matches('^'),
            report.underlying_symbol
        ),
    );

    let dates = &report.table.dates;
    let origin = dates.first().copied().unwrap_or_default();
    let day = |d: NaiveDate| (d - origin).num_days() as f64;
    let x = area.x_scale(match (dates.first(), dates.last()) {
        (Some(&first), Some(&last)) if last > first => (day(first), day(last)),
        _ => (0.0, 1.0),
    });

    let guide_values = report
        .bands
        .iter()
        .flat_map(|b| b.band.as_array())
        .chain(report.implied_band.iter().flat_map(|b| b.as_array()));
    let y = area.y_scale(
        extent(report.table.values.iter().copied().chain(guide_values))
            .map(|e| pad(e, 0.05))
            .unwrap_or((0.0, 1.0)),
    );

    // Date axis: about six evenly spaced labels
    if !dates.is_empty() {
        let step = dates.len().div_ceil(6).max(1);
        for d in dates.iter().step_by(step) {
            let px = x.map(day(*d));
            doc.line(px, area.top, px, area.bottom, GRID);
            doc.line(px, area.bottom, px, area.bottom + 6.0, AXIS);
            doc.text(px, area.bottom + 20.0, &d.format("%Y-%m").to_string(), 11.0, Anchor::Middle);
        }
    }
    y_axis(&mut doc, &area, &y, "Annualized Volatility", false, true);
    area.frame(&mut doc);
    doc.text((area.left + area.right) / 2.0, area.bottom + 42.0, "Date", 13.0, Anchor::Middle);

    let mut legend = Vec::with_capacity(n_legend);

    // Rolling volatility lines
    for (col, window) in report.table.windows.iter().enumerate() {
        let stroke = Stroke::solid(SERIES_COLORS[col % SERIES_COLORS.len()], 1.0);
        let points: Vec<(f64, f64)> = dates
            .iter()
            .enumerate()
            .map(|(row, d)| (x.map(day(*d)), y.map(report.table.values[[row, col]])))
            .collect();
        doc.polyline(&points, stroke);
        legend.push(LegendEntry {
            label: format!("{}-Day Rolling Volatility", window),
            stroke,
            marker: false,
        });
    }

    // Historical quantile lines per window
    for (i, wb) in report.bands.iter().enumerate() {
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        for (level, value) in quantile_lines(&wb.band.as_array()) {
            let stroke = quantile_stroke(color, level);
            area.hline(&mut doc, y.map(value), stroke);
            legend.push(LegendEntry {
                label: format!("{}% Quantile ({}-Day)", level, wb.window),
                stroke,
                marker: false,
            });
        }
    }

    // Live implied volatility quantiles
    if let Some(band) = &report.implied_band {
        for (level, value) in quantile_lines(&band.as_array()) {
            let stroke = quantile_stroke(IMPLIED_COLOR, level);
            if value.is_finite() {
                area.hline(&mut doc, y.map(value), stroke);
            }
            legend.push(LegendEntry {
                label: format!("{}% Implied Quantile ({})", level, report.underlying_symbol),
                stroke,
                marker: false,
            });
        }
    }

    area.legend(&mut doc, &legend);
    doc.finish()
}

/// (percent level, value) for a 10/50/90 band
fn quantile_lines(values: &[f64; 3]) -> [(u32, f64); 3] {
    [(10, values[0]), (50, values[1]), (90, values[2])]
}

/// Median solid, tails dashed
fn quantile_stroke(color: &'static str, level: u32) -> Stroke {
    let stroke = Stroke::solid(color, 1.5);
    if level == 50 {
        stroke
    } else {
        stroke.with_dash(Dash::Dashed)
    }
}

/// Write a rendered chart, creating parent directories as needed
pub fn write_chart(path: &Path, svg: &str) -> ConeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, svg)?;

    tracing::info!(path = %path.display(), bytes = svg.len(), "Chart written");
    Ok(())
}

/// Render and write the implied vs realized chart to the configured path
pub fn save_realized_cone(report: &RealizedConeReport, config: &ChartConfig) -> ConeResult<()> {
    write_chart(&config.output_path, &render_realized_cone(report, config))
}

/// Render and write the implied quantile chart to the configured path
pub fn save_implied_cone(report: &ImpliedConeReport, config: &ChartConfig) -> ConeResult<()> {
    write_chart(&config.output_path, &render_implied_cone(report, config))
}
