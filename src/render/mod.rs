//! Plotters drawing of a single chart panel.
//!
//! The same routine draws into the SVG backend (web page, export) and into
//! the terminal (TUI); only the [`PanelStyle`] differs.

use std::ops::Range;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::domain::{LabelPosition, Panel, Theme};

pub mod svg;

/// Plotly's first two qualitative colors, used for the goods and services traces.
pub const TRACE_COLORS: [RGBColor; 2] = [RGBColor(0x63, 0x6e, 0xfa), RGBColor(0xef, 0x55, 0x3b)];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Marker {
    /// Outlined circle of the given radius.
    Circle { size: i32, outline: RGBColor, outline_width: u32 },
    /// Single pixel; the terminal backend maps circle radii poorly.
    Pixel,
}

/// How to draw a panel on a particular backend.
#[derive(Debug, Clone)]
pub struct PanelStyle<'a> {
    pub font_family: &'a str,
    pub font_size: u32,
    pub label_size: u32,
    pub foreground: RGBColor,
    /// Gridline color; `None` disables the mesh.
    pub grid: Option<RGBColor>,
    pub trace: RGBColor,
    pub marker: Marker,
    pub margin: u32,
    pub x_label_area: u32,
    pub y_label_area: u32,
    pub ticks: usize,
    pub show_title: bool,
    pub show_labels: bool,
}

impl<'a> PanelStyle<'a> {
    /// Full-resolution style derived from the chart theme.
    pub fn from_theme(theme: &'a Theme, trace: RGBColor) -> Self {
        Self {
            font_family: &theme.font_family,
            font_size: theme.font_size,
            label_size: theme.label_size,
            foreground: named_color(&theme.font_color),
            grid: Some(named_color(&theme.grid_color)),
            trace,
            marker: Marker::Circle {
                size: (theme.marker_size / 2).max(1) as i32,
                outline: named_color(&theme.marker_line_color),
                outline_width: theme.marker_line_width,
            },
            margin: 10,
            x_label_area: 50,
            y_label_area: 70,
            ticks: 8,
            show_title: true,
            show_labels: true,
        }
    }
}

/// Resolve the handful of color names the theme uses (or `#rrggbb`).
///
/// Unknown names fall back to black.
pub fn named_color(name: &str) -> RGBColor {
    let name = name.trim();
    if let Some(hex) = name.strip_prefix('#') {
        if hex.len() == 6 {
            if let Ok(v) = u32::from_str_radix(hex, 16) {
                return RGBColor((v >> 16) as u8, (v >> 8) as u8, v as u8);
            }
        }
        return BLACK;
    }
    match name.to_ascii_lowercase().as_str() {
        "white" => WHITE,
        "black" => BLACK,
        "lightgray" | "lightgrey" => RGBColor(211, 211, 211),
        "gray" | "grey" => RGBColor(128, 128, 128),
        _ => BLACK,
    }
}

/// Axis ranges covering every complete point, padded by 5%.
pub fn panel_ranges(panel: &Panel) -> (Range<f64>, Range<f64>) {
    match panel.bounds() {
        Some((x, y)) => (pad(x), pad(y)),
        None => (0.0..1.0, 0.0..1.0),
    }
}

fn pad([lo, hi]: [f64; 2]) -> Range<f64> {
    let span = hi - lo;
    if !(span.is_finite()) || span <= 0.0 {
        return (lo - 0.5)..(hi + 0.5);
    }
    let p = span * 0.05;
    (lo - p)..(hi + p)
}

/// Draw one panel: mesh, axis titles, connecting lines, markers and date labels.
pub fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    style: &PanelStyle<'_>,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let (x_range, y_range) = panel_ranges(panel);
    let font = (style.font_family, style.font_size)
        .into_font()
        .color(&style.foreground);

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(style.margin)
        .x_label_area_size(style.x_label_area)
        .y_label_area_size(style.y_label_area);
    if style.show_title {
        builder.caption(&panel.title, font.clone());
    }
    let mut chart = builder.build_cartesian_2d(x_range, y_range)?;

    let fmt_tick = |v: &f64| format!("{v:.1}");
    let mut mesh = chart.configure_mesh();
    mesh.x_desc(panel.x_title.as_str())
        .y_desc(panel.y_title.as_str())
        .x_labels(style.ticks)
        .y_labels(style.ticks)
        .x_label_formatter(&fmt_tick)
        .y_label_formatter(&fmt_tick)
        .label_style(font.clone())
        .axis_desc_style(font.clone())
        .axis_style(&style.foreground);
    match style.grid {
        Some(grid) => {
            mesh.bold_line_style(&grid).light_line_style(&TRANSPARENT);
        }
        None => {
            mesh.disable_x_mesh().disable_y_mesh();
        }
    }
    mesh.draw()?;

    for segment in panel.segments() {
        chart.draw_series(LineSeries::new(segment, style.trace.stroke_width(2)))?;
    }

    let points: Vec<(f64, f64)> = panel.points.iter().filter_map(|p| p.xy()).collect();
    match style.marker {
        Marker::Circle {
            size,
            outline,
            outline_width,
        } => {
            chart.draw_series(
                points
                    .iter()
                    .map(|&xy| Circle::new(xy, size, style.trace.filled())),
            )?;
            chart.draw_series(
                points
                    .iter()
                    .map(|&xy| Circle::new(xy, size, outline.stroke_width(outline_width))),
            )?;
        }
        Marker::Pixel => {
            chart.draw_series(points.iter().map(|&xy| Pixel::new(xy, style.trace)))?;
        }
    }

    if style.show_labels {
        let (anchor, offset) = match panel.label_position {
            LabelPosition::TopCenter => (Pos::new(HPos::Center, VPos::Bottom), (0, -6)),
            LabelPosition::TopLeft => (Pos::new(HPos::Right, VPos::Bottom), (-6, -6)),
        };
        let label_font = (style.font_family, style.label_size)
            .into_font()
            .color(&style.foreground)
            .pos(anchor);
        chart.draw_series(panel.points.iter().filter(|p| !p.label.is_empty()).filter_map(|p| {
            let xy = p.xy()?;
            Some(EmptyElement::at(xy) + Text::new(p.label.clone(), offset, label_font.clone()))
        }))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_theme_colors() {
        assert_eq!(named_color("white"), WHITE);
        assert_eq!(named_color("lightgray"), RGBColor(211, 211, 211));
        assert_eq!(named_color("#636efa"), TRACE_COLORS[0]);
        assert_eq!(named_color("no-such-color"), BLACK);
    }

    #[test]
    fn pads_degenerate_ranges() {
        assert_eq!(pad([2.0, 2.0]), 1.5..2.5);
        let r = pad([0.0, 10.0]);
        assert!((r.start + 0.5).abs() < 1e-12 && (r.end - 10.5).abs() < 1e-12);
    }
}
