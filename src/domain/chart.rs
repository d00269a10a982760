//! Renderer-agnostic chart description.
//!
//! A `ChartSpec` is rebuilt from scratch on every render and is consumed by
//! the SVG renderer, the TUI and the JSON endpoint alike.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where a point's annotation text sits relative to the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelPosition {
    #[serde(rename = "top center")]
    TopCenter,
    #[serde(rename = "top left")]
    TopLeft,
}

/// Fixed visual theme shared by both panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub background: String,
    pub grid_color: String,
    pub font_family: String,
    pub font_size: u32,
    pub font_color: String,
    /// Annotation text size.
    pub label_size: u32,
    pub marker_size: u32,
    pub marker_line_width: u32,
    pub marker_line_color: String,
    /// Outer margin in pixels (all four sides).
    pub margin: u32,
    /// Gap between the two panels as a fraction of the chart width.
    pub horizontal_spacing: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: "white".to_string(),
            grid_color: "lightgray".to_string(),
            font_family: "Arial".to_string(),
            font_size: 12,
            font_color: "black".to_string(),
            label_size: 10,
            marker_size: 8,
            marker_line_width: 1,
            marker_line_color: "black".to_string(),
            margin: 50,
            horizontal_spacing: 0.1,
        }
    }
}

/// One scatter point: quantity on x, price on y.
///
/// Missing values are kept so the line breaks instead of bridging the gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
    /// Date annotation; empty for unlabelled points.
    pub label: String,
}

impl ChartPoint {
    /// `(quantity, price)` when both are present.
    pub fn xy(&self) -> Option<(f64, f64)> {
        Some((self.quantity?, self.price?))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    /// Trace name (`goods` / `services`).
    pub name: String,
    /// Subplot title shown above the panel.
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub label_position: LabelPosition,
    /// Points in ascending date order.
    pub points: Vec<ChartPoint>,
}

impl Panel {
    /// Consecutive runs of complete points; a missing value breaks the line.
    pub fn segments(&self) -> Vec<Vec<(f64, f64)>> {
        let mut out = Vec::new();
        let mut current = Vec::new();
        for point in &self.points {
            match point.xy() {
                Some(xy) => current.push(xy),
                None if !current.is_empty() => out.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            out.push(current);
        }
        out
    }

    /// `[min, max]` of quantity and price over complete points.
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let mut iter = self.points.iter().filter_map(ChartPoint::xy);
        let (x0, y0) = iter.next()?;
        let mut x = [x0, x0];
        let mut y = [y0, y0];
        for (px, py) in iter {
            x = [x[0].min(px), x[1].max(px)];
            y = [y[0].min(py), y[1].max(py)];
        }
        Some((x, y))
    }
}

/// Complete two-panel chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub theme: Theme,
    pub goods: Panel,
    pub services: Panel,
}

impl ChartSpec {
    /// Panels in display order (left to right).
    pub fn panels(&self) -> [&Panel; 2] {
        [&self.goods, &self.services]
    }
}
