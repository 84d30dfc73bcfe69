//! # Resampling Module
//!
//! Evenly spaced grids, piecewise-linear interpolation and envelope
//! resampling shared by the profile editor and the vibration synthesiser.

use crate::spline::{self, CubicSpline};
use crate::ControlPoint;
use crate::error::{Error, Result};

/// Minimum number of strictly increasing points for the spline path.
pub const SPLINE_MIN_POINTS: usize = 4;

/// Returns `n` evenly spaced values from `start` to `end` inclusive.
///
/// `n == 0` gives an empty vector and `n == 1` gives `[start]`.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Piecewise-linear interpolation of `(xs, ys)` at `x`.
///
/// `xs` must be sorted ascending. Positions outside the data range take the
/// nearest end value. Returns `0.0` for empty input.
pub fn interp(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return 0.0;
    }
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }

    let upper = xs[..n].partition_point(|&k| k <= x);
    let (x0, x1) = (xs[upper - 1], xs[upper]);
    let (y0, y1) = (ys[upper - 1], ys[upper]);
    if x1 == x0 {
        return y1;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Splits control points into separate x and y vectors.
pub fn unzip(points: &[ControlPoint]) -> (Vec<f64>, Vec<f64>) {
    points.iter().map(|p| (p.x, p.y)).unzip()
}

/// Resamples a curve through `points` onto `n` evenly spaced positions.
///
/// Uses a cubic spline (with the given smoothing factor) when there are at
/// least four points with strictly increasing x, otherwise linear
/// interpolation.
///
/// # Errors
/// * `NotEnoughPoints` - fewer than two points
pub fn curve(points: &[ControlPoint], n: usize, smoothing: f64) -> Result<Vec<ControlPoint>> {
    if points.len() < 2 {
        return Err(Error::NotEnoughPoints {
            needed: 2,
            found: points.len(),
        });
    }

    let (xs, ys) = unzip(points);
    let min_x = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max_x = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let grid = linspace(min_x, max_x, n);

    let values = if xs.len() >= SPLINE_MIN_POINTS && spline::is_strictly_increasing(&xs) {
        CubicSpline::fit(&xs, &ys, smoothing)?.eval_many(&grid)
    } else {
        grid.iter().map(|&x| interp(x, &xs, &ys)).collect()
    };

    Ok(grid
        .into_iter()
        .zip(values)
        .map(|(x, y)| ControlPoint::new(x, y))
        .collect())
}

/// Resamples the unsmoothed envelope through `points` onto `n` positions.
pub fn envelope(points: &[ControlPoint], n: usize) -> Result<Vec<ControlPoint>> {
    curve(points, n, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_both_ends() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(3.0, 7.0, 1), vec![3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn interp_clamps_outside_range() {
        let xs = [0.0, 10.0];
        let ys = [1.0, 3.0];
        assert_eq!(interp(-5.0, &xs, &ys), 1.0);
        assert_eq!(interp(15.0, &xs, &ys), 3.0);
        assert!((interp(5.0, &xs, &ys) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn short_curves_fall_back_to_linear() {
        let points = [
            ControlPoint::new(0.0, 0.0),
            ControlPoint::new(2.0, 4.0),
            ControlPoint::new(4.0, 0.0),
        ];
        let out = curve(&points, 5, 0.0).unwrap();
        let ys: Vec<f64> = out.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![0.0, 2.0, 4.0, 2.0, 0.0]);
    }

    #[test]
    fn duplicate_x_uses_linear_path() {
        let points = [
            ControlPoint::new(0.0, 0.0),
            ControlPoint::new(1.0, 1.0),
            ControlPoint::new(1.0, 2.0),
            ControlPoint::new(2.0, 0.0),
        ];
        let out = curve(&points, 3, 0.0).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[2].y, 0.0);
    }

    #[test]
    fn curve_needs_two_points() {
        let err = curve(&[ControlPoint::new(0.0, 0.0)], 10, 0.0).unwrap_err();
        assert!(matches!(err, Error::NotEnoughPoints { .. }));
    }
}
