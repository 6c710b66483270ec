//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - real series: `-` line
//! - predicted series: `*` line (drawn second, fills blank cells only)

use chrono::NaiveDate;

use crate::domain::PairedSeries;

/// Render both lines of a paired series over its date range.
///
/// `sample_step` keeps dense horizons readable: only every k-th day is
/// plotted (the last day is always included).
pub fn render_series_plot(
    series: &PairedSeries,
    dates: &[NaiveDate],
    width: usize,
    height: usize,
    sample_step: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let n = series.real.len().min(series.pred.len()).min(dates.len());
    if n == 0 {
        return format!("Serie: {} | sin datos\n", series.name);
    }

    let idx = sampled_indices(n, sample_step);
    let real: Vec<(f64, f64)> = idx.iter().map(|&i| (i as f64, series.real[i])).collect();
    let pred: Vec<(f64, f64)> = idx.iter().map(|&i| (i as f64, series.pred[i])).collect();

    let x_min = 0.0;
    let x_max = (n - 1).max(1) as f64;
    let (y_min, y_max) = y_range(&real, &pred).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    draw_polyline(&mut grid, &real, x_min, x_max, y_min, y_max, '-');
    draw_polyline(&mut grid, &pred, x_min, x_max, y_min, y_max, '*');

    let mut out = String::new();
    out.push_str(&format!(
        "Serie: {} | fechas=[{}, {}] | y=[{y_min:.2}, {y_max:.2}]\n",
        series.name,
        dates[0],
        dates[n - 1]
    ));
    out.push_str("real '-'  pred '*'\n");
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn sampled_indices(n: usize, step: usize) -> Vec<usize> {
    let step = step.max(1);
    let mut idx: Vec<usize> = (0..n).step_by(step).collect();
    if idx.last() != Some(&(n - 1)) {
        idx.push(n - 1);
    }
    idx
}

fn y_range(real: &[(f64, f64)], pred: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in real.iter().chain(pred.iter()) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(
    grid: &mut [Vec<char>],
    points: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    ch: char,
) {
    if points.is_empty() {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in points {
        let gx = map_x(x, x_min, x_max, width);
        let gy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, gx, gy, ch);
        } else if grid[gy][gx] == ' ' {
            grid[gy][gx] = ch;
        }
        prev = Some((gx, gy));
    }
}

/// Integer line drawing (Bresenham-ish). Writes blank cells only, so
/// whichever series is drawn first wins the overlaps.
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

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let series = PairedSeries {
            name: "Demanda_Total".to_string(),
            real: vec![100.0, 110.0],
            pred: vec![100.0, 100.0],
        };
        let txt = render_series_plot(&series, &dates(2), 10, 5, 1);
        let expected = concat!(
            "Serie: Demanda_Total | fechas=[2024-01-01, 2024-01-02] | y=[99.50, 110.50]\n",
            "real '-'  pred '*'\n",
            "        --\n",
            "      --  \n",
            "    --    \n",
            " ---      \n",
            "-*********\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_series_renders_placeholder() {
        let series = PairedSeries {
            name: "X".to_string(),
            real: vec![],
            pred: vec![],
        };
        let txt = render_series_plot(&series, &[], 40, 10, 1);
        assert!(txt.contains("sin datos"));
    }

    #[test]
    fn sampling_always_keeps_last_day() {
        assert_eq!(sampled_indices(10, 3), vec![0, 3, 6, 9]);
        assert_eq!(sampled_indices(11, 3), vec![0, 3, 6, 9, 10]);
        assert_eq!(sampled_indices(1, 5), vec![0]);
    }

    #[test]
    fn long_series_stays_within_grid() {
        let n = 590;
        let series = PairedSeries {
            name: "Demanda_Costa_Total_MBTUD".to_string(),
            real: (0..n).map(|i| 500_000.0 + (i as f64) * 10.0).collect(),
            pred: (0..n).map(|i| 500_000.0 - (i as f64) * 10.0).collect(),
        };
        let txt = render_series_plot(&series, &dates(n), 80, 20, 7);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 22);
        for line in &lines[2..] {
            assert_eq!(line.chars().count(), 80);
        }
    }
}
