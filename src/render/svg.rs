//! SVG rendering of a full [`ChartSpec`].

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::domain::ChartSpec;
use crate::error::AppError;
use crate::render::{PanelStyle, TRACE_COLORS, draw_panel, named_color};

/// Render both panels side by side into an SVG document.
pub fn render_svg(spec: &ChartSpec) -> Result<String, AppError> {
    let mut out = String::new();
    {
        let root = SVGBackend::with_string(&mut out, (spec.width, spec.height)).into_drawing_area();
        draw_chart(&root, spec)
            .and_then(|_| root.present())
            .map_err(|e| AppError::data(format!("Failed to render chart: {e}")))?;
    }
    Ok(out)
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let theme = &spec.theme;
    root.fill(&named_color(&theme.background))?;

    let title_font = (theme.font_family.as_str(), theme.font_size + 4)
        .into_font()
        .color(&named_color(&theme.font_color));
    let body = root.titled(&spec.title, title_font)?;

    let m = theme.margin as i32;
    let body = body.margin(m, m, m, m);

    let (width, _) = body.dim_in_pixel();
    let gap = (f64::from(width) * theme.horizontal_spacing).round() as i32;
    let panel_width = ((width as i32) - gap).max(2) / 2;
    let (left, rest) = body.split_horizontally(panel_width);
    let (_, right) = rest.split_horizontally(gap);

    for (area, (panel, trace)) in [left, right]
        .iter()
        .zip(spec.panels().into_iter().zip(TRACE_COLORS))
    {
        draw_panel(area, panel, &PanelStyle::from_theme(theme, trace))?;
    }
    Ok(())
}
