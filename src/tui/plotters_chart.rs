//! Plotters-powered panel widget for Ratatui.
//!
//! The panel is drawn with the same [`draw_panel`] routine as the SVG output,
//! rendered into the Ratatui buffer through `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::Panel;
use crate::render::{Marker, PanelStyle, draw_panel};

/// Render-only view of one chart panel.
pub struct PanelChart<'a> {
    pub panel: &'a Panel,
    pub trace: RGBColor,
}

/// Low-resolution style for terminal cells.
///
/// Titles go on the surrounding `Block`, and circles are replaced by pixels
/// because the terminal backend maps circle radii to huge canvas shapes.
pub fn terminal_style(trace: RGBColor) -> PanelStyle<'static> {
    PanelStyle {
        font_family: "sans-serif",
        font_size: 10,
        label_size: 10,
        foreground: WHITE,
        grid: None,
        trace,
        marker: Marker::Pixel,
        margin: 1,
        x_label_area: 3,
        y_label_area: 6,
        ticks: 5,
        show_title: false,
        show_labels: true,
    }
}

impl<'a> Widget for PanelChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters cannot lay out a mesh in a handful of cells.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        if self.panel.bounds().is_none() {
            buf.set_string(
                area.x,
                area.y,
                "No data in the selected range.",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let style = terminal_style(self.trace);
        let panel = self.panel;
        let widget = widget_fn(move |root| {
            draw_panel(&root, panel, &style)?;
            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LabelPosition;

    fn empty_panel() -> Panel {
        Panel {
            name: "Goods".to_string(),
            title: "Goods".to_string(),
            x_title: "Quantity".to_string(),
            y_title: "Price".to_string(),
            label_position: LabelPosition::TopCenter,
            points: Vec::new(),
        }
    }

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn tiny_area_renders_hint() {
        let panel = empty_panel();
        let area = Rect::new(0, 0, 50, 4);
        let mut buf = Buffer::empty(area);
        PanelChart { panel: &panel, trace: WHITE }.render(area, &mut buf);
        assert!(buffer_text(&buf).contains("too small"));
    }

    #[test]
    fn empty_panel_renders_hint() {
        let panel = empty_panel();
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        PanelChart { panel: &panel, trace: WHITE }.render(area, &mut buf);
        assert!(buffer_text(&buf).contains("No data"));
    }

    #[test]
    fn terminal_style_uses_pixels() {
        let style = terminal_style(RGBColor(1, 2, 3));
        assert_eq!(style.marker, Marker::Pixel);
        assert!(style.grid.is_none());
        assert!(!style.show_title);
    }
}
