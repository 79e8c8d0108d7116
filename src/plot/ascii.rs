//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks of a fit in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed histogram (density scale): `#` bars
//! - fitted Weibull density: `-` line
//! - pricing threshold: `|` column

use crate::models::WeibullModel;
use crate::report::{DEFAULT_BINS, HistogramBin, density_curve, histogram};

/// Headroom above the tallest bar or density peak.
const Y_HEADROOM: f64 = 1.1;

/// Render the histogram of `values` with the fitted density and threshold marker.
pub fn render_fit_plot(
    values: &[f64],
    model: &WeibullModel,
    threshold: f64,
    width: usize,
    height: usize,
) -> String {
    let bins = histogram(values, DEFAULT_BINS);
    let Some(last) = bins.last() else {
        return "Plot: no usable observations\n".to_string();
    };

    let threshold = threshold.is_finite().then_some(threshold);
    let x_max = threshold.map_or(last.hi, |t| t.max(last.hi));
    let curve = density_curve(model, x_max, width.max(2));
    render_plot(&bins, &curve, threshold, x_max, width, height)
}

fn render_plot(
    bins: &[HistogramBin],
    curve: &[(f64, f64)],
    threshold: Option<f64>,
    x_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let y_max = bins
        .iter()
        .map(|b| b.density)
        .chain(curve.iter().map(|&(_, y)| y))
        .fold(0.0_f64, f64::max);
    let y_top = if y_max > 0.0 { y_max * Y_HEADROOM } else { 1.0 };

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so it stays visible through the bars.
    draw_curve(&mut grid, curve, x_max, y_top);

    if let Some(t) = threshold {
        let x = map_x(t, x_max, width);
        for row in grid.iter_mut() {
            if row[x] == ' ' {
                row[x] = '|';
            }
        }
    }

    for (i, bin) in bins.iter().enumerate() {
        if bin.count == 0 {
            continue;
        }
        let start = map_x(bin.lo, x_max, width);
        let mut end = map_x(bin.hi, x_max, width);
        if i + 1 == bins.len() {
            end += 1;
        }
        let end = end.max(start + 1).min(width);
        let top = map_y(bin.density, y_top, height);
        for row in grid.iter_mut().skip(top) {
            for cell in &mut row[start..end] {
                if *cell == ' ' {
                    *cell = '#';
                }
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format!("Plot: wind=[0.0, {x_max:.1}] km/h | density=[0, {y_top:.3}]"));
    if let Some(t) = threshold {
        out.push_str(&format!(" | threshold {t:.1} km/h (|)"));
    }
    out.push('\n');

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn map_x(x: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = if x_max > 0.0 { (x / x_max).clamp(0.0, 1.0) } else { 0.0 };
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_top: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = (y / y_top).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_max: f64, y_top: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let xx = map_x(x, x_max, width);
        let yy = map_y(y, y_top, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, xx, yy, '-');
        } else {
            grid[yy][xx] = '-';
        }
        prev = Some((xx, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::weibull_draws;
    use crate::domain::WeibullParams;

    #[test]
    fn plot_golden_snapshot_small() {
        let bins = [
            HistogramBin { lo: 0.0, hi: 5.0, count: 2, density: 0.08 },
            HistogramBin { lo: 5.0, hi: 10.0, count: 1, density: 0.04 },
        ];
        let curve = [(0.0, 0.0), (5.0, 0.08), (10.0, 0.0)];

        let txt = render_plot(&bins, &curve, Some(8.0), 10.0, 11, 5);
        let expected = concat!(
            "Plot: wind=[0.0, 10.0] km/h | density=[0, 0.088] | threshold 8.0 km/h (|)\n",
            "#####-  |  \n",
            "####- - |  \n",
            "##--###--##\n",
            "#-######|-#\n",
            "-#######|#-\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn fit_plot_has_requested_shape_and_marks_the_threshold() {
        let values = weibull_draws(2.0, 20.0, 500, 5).unwrap();
        let model = WeibullModel::new(WeibullParams::new(2.0, 20.0).unwrap()).unwrap();

        let txt = render_fit_plot(&values, &model, 35.0, 60, 12);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 13);
        assert!(lines[1..].iter().all(|l| l.chars().count() == 60));
        assert!(txt.contains('#') && txt.contains('-') && txt.contains('|'));
    }

    #[test]
    fn empty_sample_renders_a_placeholder() {
        let model = WeibullModel::new(WeibullParams::new(2.0, 20.0).unwrap()).unwrap();
        assert_eq!(render_fit_plot(&[], &model, 35.0, 40, 10), "Plot: no usable observations\n");
    }
}
