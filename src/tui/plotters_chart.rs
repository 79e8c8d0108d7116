//! Plotters-powered chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//! - histogram outlines and reference lines come for free
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
/// The widget is data-driven: all series and bounds are computed outside the
/// render call (see `ChartData` in the parent module), so one widget serves
/// every tab.
pub struct WindPlottersChart<'a> {
    /// Bars as `(lo, hi, height)`, drawn as outlines from zero.
    pub bars: &'a [(f64, f64, f64)],
    /// Scatter series (daily values, Q-Q points).
    pub points: &'a [(f64, f64)],
    /// Line series (fitted density, rolling mean, identity).
    pub line: &'a [(f64, f64)],
    /// Vertical reference (threshold on the distribution tab).
    pub vline: Option<f64>,
    /// Horizontal reference (threshold on the time series tab).
    pub hline: Option<f64>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// Axis labels (kept simple for terminal rendering).
    pub x_label: &'a str,
    pub y_label: &'a str,
    /// Formatting of tick labels.
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for WindPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let bar_color = RGBColor(100, 149, 237); // cornflower
            let points_color = WHITE;
            let line_color = RGBColor(255, 165, 0); // orange
            let marker_color = RGBColor(255, 0, 0); // red

            // 1) Bars. Filled rectangles render as solid blocks on the
            //    canvas backend, so outlines read better.
            for &(lo, hi, h) in self.bars {
                chart.draw_series(LineSeries::new(
                    [(lo, 0.0), (lo, h), (hi, h), (hi, 0.0)],
                    &bar_color,
                ))?;
            }

            // 2) Scatter. `Pixel` rather than `Circle`: the backend maps
            //    circle radii to canvas units and draws huge circles.
            chart.draw_series(
                self.points
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), points_color)),
            )?;

            // 3) Line.
            chart.draw_series(LineSeries::new(self.line.iter().copied(), &line_color))?;

            // 4) Reference lines.
            if let Some(x) = self.vline {
                chart.draw_series(LineSeries::new([(x, y0), (x, y1)], &marker_color))?;
            }
            if let Some(y) = self.hline {
                chart.draw_series(LineSeries::new([(x0, y), (x1, y)], &marker_color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
