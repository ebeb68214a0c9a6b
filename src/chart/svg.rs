//! Minimal SVG drawing primitives
//!
//! Just enough for line charts with horizontal guides, a grid, twin y-axes
//! and a legend. Coordinates are pixels with the origin at the top left.

use std::fmt::Write;

/// Line dash pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dash {
    Solid,
    Dashed,
    DashDot,
    Dotted,
}

impl Dash {
    fn dasharray(&self) -> &'static str {
        match self {
            Dash::Solid => "0",
            Dash::Dashed => "8 4",
            Dash::DashDot => "8 3 2 3",
            Dash::Dotted => "2 3",
        }
    }
}

/// Stroke style for lines and polylines
#[derive(Debug, Clone, Copy)]
pub struct Stroke {
    pub color: &'static str,
    pub width: f64,
    pub dash: Dash,
    pub opacity: f64,
}

impl Stroke {
    pub fn solid(color: &'static str, width: f64) -> Self {
        Self {
            color,
            width,
            dash: Dash::Solid,
            opacity: 1.0,
        }
    }

    pub fn with_dash(mut self, dash: Dash) -> Self {
        self.dash = dash;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    fn attrs(&self) -> String {
        format!(
            r#"stroke="{}" stroke-width="{}" stroke-dasharray="{}" stroke-opacity="{}""#,
            self.color,
            self.width,
            self.dash.dasharray(),
            self.opacity
        )
    }
}

/// Text anchoring
#[derive(Debug, Clone, Copy)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(&self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// Maps a data interval onto a pixel interval
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if (d1 - d0).abs() < f64::EPSILON {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }
}

/// Finite min/max of `values`, widened when flat. `None` if nothing is finite.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;

    for v in values.into_iter().filter(|v| v.is_finite()) {
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }

    if !min_v.is_finite() || !max_v.is_finite() {
        return None;
    }

    if min_v == max_v {
        let adjust = if min_v == 0.0 { 1.0 } else { min_v.abs() * 0.1 };
        min_v -= adjust;
        max_v += adjust;
    }

    Some((min_v, max_v))
}

/// Pad an interval by a fraction of its span on both sides
pub fn pad(extent: (f64, f64), fraction: f64) -> (f64, f64) {
    let span = extent.1 - extent.0;
    (extent.0 - span * fraction, extent.1 + span * fraction)
}

/// Round tick positions covering `[min, max]`, roughly `target` of them
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    if !(min.is_finite() && max.is_finite()) || max <= min || target == 0 {
        return Vec::new();
    }

    let raw_step = (max - min) / target as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw_step)
        .unwrap_or(10.0 * magnitude);

    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

/// Escape text content for XML
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// An SVG document under construction
pub struct SvgDoc {
    width: f64,
    height: f64,
    body: String,
}

impl SvgDoc {
    pub fn new(width: u32, height: u32) -> Self {
        let mut doc = Self {
            width: width as f64,
            height: height as f64,
            body: String::new(),
        };
        doc.rect(0.0, 0.0, doc.width, doc.height, "white", None);
        doc
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, stroke: Option<Stroke>) {
        let stroke = stroke.map(|s| s.attrs()).unwrap_or_default();
        let _ = write!(
            self.body,
            r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{fill}" {stroke}/>"#
        );
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: Stroke) {
        let _ = write!(
            self.body,
            r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" {}/>"#,
            stroke.attrs()
        );
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], stroke: Stroke) {
        if points.is_empty() {
            return;
        }
        let coords = points
            .iter()
            .map(|(x, y)| format!("{x:.2},{y:.2}"))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = write!(
            self.body,
            r#"<polyline fill="none" {} points="{coords}"/>"#,
            stroke.attrs()
        );
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str) {
        let _ = write!(
            self.body,
            r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}" fill="{fill}"/>"#
        );
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, size: f64, anchor: Anchor) {
        let _ = write!(
            self.body,
            r##"<text x="{x:.2}" y="{y:.2}" font-size="{size}" text-anchor="{}" fill="#333">{}</text>"##,
            anchor.as_str(),
            escape(content)
        );
    }

    /// Text rotated -90 degrees around its anchor point
    pub fn vertical_text(&mut self, x: f64, y: f64, content: &str, size: f64) {
        let _ = write!(
            self.body,
            r##"<text x="{x:.2}" y="{y:.2}" font-size="{size}" text-anchor="middle" fill="#333" transform="rotate(-90 {x:.2} {y:.2})">{}</text>"##,
            escape(content)
        );
    }

    pub fn finish(self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><style>text{{font-family:Arial,sans-serif}}</style>{body}</svg>
"#,
            w = self.width,
            h = self.height,
            body = self.body
        )
    }
}

/// One legend row: a stroke sample with optional marker, and its label
#[derive(Debug, Clone)]
pub struct LegendEntry {
    pub label: String,
    pub stroke: Stroke,
    pub marker: bool,
}

/// Lay entries out in `columns` columns starting at (x, y)
pub fn draw_legend(doc: &mut SvgDoc, entries: &[LegendEntry], x: f64, y: f64, column_width: f64, columns: usize) {
    let columns = columns.max(1);
    for (i, entry) in entries.iter().enumerate() {
        let cx = x + (i % columns) as f64 * column_width;
        let cy = y + (i / columns) as f64 * LEGEND_ROW_HEIGHT;

        doc.line(cx, cy - 4.0, cx + 24.0, cy - 4.0, entry.stroke);
        if entry.marker {
            doc.circle(cx + 12.0, cy - 4.0, 3.5, entry.stroke.color);
        }
        doc.text(cx + 30.0, cy, &entry.label, 12.0, Anchor::Start);
    }
}

/// Vertical space per legend row
pub const LEGEND_ROW_HEIGHT: f64 = 18.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_scale() {
        // Inverted pixel range, as for a y-axis
        let scale = LinearScale::new((0.0, 10.0), (500.0, 100.0));
        assert_eq!(scale.map(0.0), 500.0);
        assert_eq!(scale.map(10.0), 100.0);
        assert_eq!(scale.map(5.0), 300.0);

        let flat = LinearScale::new((3.0, 3.0), (0.0, 100.0));
        assert_eq!(flat.map(3.0), 50.0);
    }

    #[test]
    fn test_extent() {
        assert_eq!(extent([3.0, f64::NAN, 1.0, 2.0]), Some((1.0, 3.0)));
        assert_eq!(extent([0.0, 0.0]), Some((-1.0, 1.0)));
        assert_eq!(extent([10.0]), Some((9.0, 11.0)));
        assert_eq!(extent([f64::NAN]), None);
        assert_eq!(extent(Vec::new()), None);
    }

    #[test]
    fn test_nice_ticks() {
        assert_eq!(nice_ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(nice_ticks(13.0, 27.0, 3), vec![15.0, 20.0, 25.0]);
        assert!(nice_ticks(1.0, 1.0, 5).is_empty());
        assert!(nice_ticks(f64::NAN, 1.0, 5).is_empty());
    }

    #[test]
    fn test_document() {
        let mut doc = SvgDoc::new(300, 200);
        doc.polyline(&[(0.0, 0.0), (10.0, 5.5)], Stroke::solid("blue", 2.0));
        doc.polyline(&[], Stroke::solid("red", 2.0));
        doc.text(5.0, 5.0, "S&P <500>", 10.0, Anchor::Start);
        let svg = doc.finish();

        assert!(svg.starts_with("<?xml"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r#"points="0.00,0.00 10.00,5.50""#));
        assert_eq!(svg.matches("<polyline").count(), 1);
        assert!(svg.contains("S&amp;P &lt;500&gt;"));
    }
}
