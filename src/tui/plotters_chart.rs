//! Plotters-powered curve editor surface for Ratatui.
//!
//! The chart has no margins or label areas: the plotting area is exactly the
//! widget `Rect`, which keeps mouse translation (see `pointer`) a plain linear
//! map over the same cells.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// All series are computed outside the render call so `render()` only draws.
pub struct CurveChart<'a> {
    /// Sampled curve, already clipped into `y_bounds`.
    pub curve: &'a [(f64, f64)],
    /// Control points (sockets).
    pub points: &'a [(f64, f64)],
    /// The socket being dragged or selected, drawn on top.
    pub selected: Option<(f64, f64)>,
    /// Progress marker x-position in `[0, 1]`.
    pub marker: Option<f64>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl Widget for CurveChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 10 || area.height < 5 {
            buf.set_string(
                area.x,
                area.y,
                "Surface too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(0)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            let curve_color = RGBColor(0, 255, 255); // cyan
            let marker_color = RGBColor(255, 0, 255); // magenta
            let socket_color = WHITE;
            let selected_color = RGBColor(255, 255, 0); // yellow

            // 1) Progress marker as a vertical line behind everything else.
            if let Some(x) = self.marker {
                chart.draw_series(LineSeries::new([(x, y0), (x, y1)], &marker_color))?;
            }

            // 2) The fitted curve.
            chart.draw_series(LineSeries::new(self.curve.iter().copied(), &curve_color))?;

            // 3) Sockets. `Circle` radii are mis-scaled by the ratatui backend,
            // so sockets are single pixels.
            chart.draw_series(
                self.points
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), socket_color)),
            )?;
            if let Some((x, y)) = self.selected {
                chart.draw_series(std::iter::once(Pixel::new((x, y), selected_color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
