//! # Cubic Spline Module
//!
//! Natural cubic splines used to draw, smooth and resample haptic profiles.
//!
//! A smoothing factor of zero gives the interpolating spline through every
//! control point. A positive factor `s` gives the Reinsch smoothing spline:
//! the smoothest natural cubic spline whose residual sum of squares against
//! the control points does not exceed `s`.

use crate::error::{Error, Result};

/// Bracketing and bisection limits for the smoothing parameter search.
const MAX_BRACKET_STEPS: usize = 60;
const BISECTION_STEPS: usize = 80;

/// A fitted natural cubic spline.
///
/// Stores the knot positions, the (possibly smoothed) knot values and the
/// second derivative at every knot. The second derivative is zero at both
/// ends, so evaluation outside the knot range continues along a straight line.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    xs: Vec<f64>,
    values: Vec<f64>,
    second_derivatives: Vec<f64>,
}

impl CubicSpline {
    /// Fits a spline through `(xs, ys)` with the given smoothing factor.
    ///
    /// # Errors
    /// * `NotEnoughPoints` - fewer than two samples, or mismatched lengths
    /// * `NonIncreasing` - `xs` is not strictly increasing
    pub fn fit(xs: &[f64], ys: &[f64], smoothing: f64) -> Result<Self> {
        if xs.len() < 2 || xs.len() != ys.len() {
            return Err(Error::NotEnoughPoints {
                needed: 2,
                found: xs.len().min(ys.len()),
            });
        }
        if !is_strictly_increasing(xs) {
            return Err(Error::NonIncreasing);
        }

        let system = SplineSystem::new(xs, ys);
        if smoothing <= 0.0 {
            return Ok(system.solve(0.0).into_spline(xs));
        }

        let line = least_squares_line(xs, ys);
        if line.rss(xs, ys) <= smoothing {
            return Ok(line.into_spline(xs));
        }

        // Residual grows monotonically with lambda, from 0 (interpolation)
        // towards the straight-line residual.
        let mean_h = (xs[xs.len() - 1] - xs[0]) / (xs.len() - 1) as f64;
        let mut hi = mean_h.powi(3).max(f64::MIN_POSITIVE);
        let mut steps = 0;
        while system.solve(hi).rss < smoothing {
            hi *= 10.0;
            steps += 1;
            if steps > MAX_BRACKET_STEPS {
                return Ok(line.into_spline(xs));
            }
        }
        let mut lo = hi;
        steps = 0;
        while system.solve(lo).rss > smoothing && steps <= MAX_BRACKET_STEPS {
            lo /= 10.0;
            steps += 1;
        }

        for _ in 0..BISECTION_STEPS {
            let mid = (lo * hi).sqrt();
            if system.solve(mid).rss > smoothing {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        Ok(system.solve(lo).into_spline(xs))
    }

    /// Fits the interpolating (unsmoothed) spline.
    pub fn interpolating(xs: &[f64], ys: &[f64]) -> Result<Self> {
        Self::fit(xs, ys, 0.0)
    }

    /// The spline's value at each knot.
    pub fn knot_values(&self) -> &[f64] {
        &self.values
    }

    /// Evaluates the spline at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.xs.len();
        let first = self.xs[0];
        let last = self.xs[n - 1];

        if x < first {
            return self.values[0] + self.start_slope() * (x - first);
        }
        if x > last {
            return self.values[n - 1] + self.end_slope() * (x - last);
        }

        // Index of the segment [xs[i], xs[i + 1]] containing x.
        let i = match self.xs.partition_point(|&k| k <= x) {
            0 => 0,
            p => (p - 1).min(n - 2),
        };

        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.values[i], self.values[i + 1]);
        let (m0, m1) = (self.second_derivatives[i], self.second_derivatives[i + 1]);
        let h = x1 - x0;
        let a = x1 - x;
        let b = x - x0;

        (a.powi(3) * m0 + b.powi(3) * m1) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }

    /// Evaluates the spline at every position in `xs`.
    pub fn eval_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.eval(x)).collect()
    }

    fn start_slope(&self) -> f64 {
        let h = self.xs[1] - self.xs[0];
        (self.values[1] - self.values[0]) / h - h * self.second_derivatives[1] / 6.0
    }

    fn end_slope(&self) -> f64 {
        let n = self.xs.len();
        let h = self.xs[n - 1] - self.xs[n - 2];
        (self.values[n - 1] - self.values[n - 2]) / h + h * self.second_derivatives[n - 2] / 6.0
    }
}

/// Returns `true` when every value is larger than the one before it.
pub fn is_strictly_increasing(xs: &[f64]) -> bool {
    xs.windows(2).all(|w| w[1] > w[0])
}

/// Banded form of `R + lambda * Q^T Q` and `Q^T y` for the interior knots.
struct SplineSystem<'a> {
    ys: &'a [f64],
    /// Entries of Q column j at rows j, j + 1, j + 2.
    q: Vec<[f64; 3]>,
    r_diag: Vec<f64>,
    r_off: Vec<f64>,
    qty: Vec<f64>,
}

struct SplineSolution {
    values: Vec<f64>,
    interior: Vec<f64>,
    rss: f64,
}

impl<'a> SplineSystem<'a> {
    fn new(xs: &[f64], ys: &'a [f64]) -> Self {
        let n = xs.len();
        let m = n.saturating_sub(2);
        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();

        let mut q = Vec::with_capacity(m);
        let mut r_diag = Vec::with_capacity(m);
        let mut r_off = Vec::with_capacity(m);
        let mut qty = Vec::with_capacity(m);

        for j in 0..m {
            let a = 1.0 / h[j];
            let c = 1.0 / h[j + 1];
            let b = -a - c;
            q.push([a, b, c]);
            r_diag.push((h[j] + h[j + 1]) / 3.0);
            r_off.push(h[j + 1] / 6.0);
            qty.push(a * ys[j] + b * ys[j + 1] + c * ys[j + 2]);
        }

        Self { ys, q, r_diag, r_off, qty }
    }

    /// Solves for the interior second derivatives at smoothing weight `lambda`.
    fn solve(&self, lambda: f64) -> SplineSolution {
        let m = self.q.len();
        let mut d0 = vec![0.0; m];
        let mut d1 = vec![0.0; m];
        let mut d2 = vec![0.0; m];

        for j in 0..m {
            let [a, b, c] = self.q[j];
            d0[j] = self.r_diag[j] + lambda * (a * a + b * b + c * c);
            if j + 1 < m {
                let [a1, b1, _] = self.q[j + 1];
                d1[j] = self.r_off[j] + lambda * (b * a1 + c * b1);
            }
            if j + 2 < m {
                let [a2, _, _] = self.q[j + 2];
                d2[j] = lambda * c * a2;
            }
        }

        let interior = solve_pentadiagonal(&d0, &d1, &d2, &self.qty);

        // g = y - lambda * Q * gamma
        let n = self.ys.len();
        let mut values = self.ys.to_vec();
        let mut rss = 0.0;
        if lambda > 0.0 {
            for (i, value) in values.iter_mut().enumerate() {
                let mut q_gamma = 0.0;
                if i < m {
                    q_gamma += self.q[i][0] * interior[i];
                }
                if i >= 1 && i - 1 < m {
                    q_gamma += self.q[i - 1][1] * interior[i - 1];
                }
                if i >= 2 && i - 2 < m {
                    q_gamma += self.q[i - 2][2] * interior[i - 2];
                }
                let residual = lambda * q_gamma;
                *value -= residual;
                rss += residual * residual;
            }
        }
        debug_assert_eq!(values.len(), n);

        SplineSolution { values, interior, rss }
    }
}

impl SplineSolution {
    fn into_spline(self, xs: &[f64]) -> CubicSpline {
        let mut second_derivatives = Vec::with_capacity(xs.len());
        second_derivatives.push(0.0);
        second_derivatives.extend(self.interior);
        second_derivatives.push(0.0);
        CubicSpline {
            xs: xs.to_vec(),
            values: self.values,
            second_derivatives,
        }
    }
}

/// Solves a symmetric pentadiagonal system by banded LDL^T factorisation.
///
/// `d0` is the diagonal, `d1[i]` the entry at (i, i + 1) and `d2[i]` the
/// entry at (i, i + 2).
fn solve_pentadiagonal(d0: &[f64], d1: &[f64], d2: &[f64], rhs: &[f64]) -> Vec<f64> {
    let m = d0.len();
    let mut d = vec![0.0; m];
    let mut l1 = vec![0.0; m];
    let mut l2 = vec![0.0; m];

    for i in 0..m {
        let mut di = d0[i];
        if i >= 1 {
            di -= l1[i - 1] * l1[i - 1] * d[i - 1];
        }
        if i >= 2 {
            di -= l2[i - 2] * l2[i - 2] * d[i - 2];
        }
        d[i] = di;

        let mut off = d1[i];
        if i >= 1 {
            off -= l1[i - 1] * l2[i - 1] * d[i - 1];
        }
        l1[i] = off / di;
        l2[i] = d2[i] / di;
    }

    let mut z = vec![0.0; m];
    for i in 0..m {
        let mut zi = rhs[i];
        if i >= 1 {
            zi -= l1[i - 1] * z[i - 1];
        }
        if i >= 2 {
            zi -= l2[i - 2] * z[i - 2];
        }
        z[i] = zi;
    }

    let mut x = vec![0.0; m];
    for i in (0..m).rev() {
        let mut xi = z[i] / d[i];
        if i + 1 < m {
            xi -= l1[i] * x[i + 1];
        }
        if i + 2 < m {
            xi -= l2[i] * x[i + 2];
        }
        x[i] = xi;
    }
    x
}

struct Line {
    slope: f64,
    intercept: f64,
}

fn least_squares_line(xs: &[f64], ys: &[f64]) -> Line {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let (sxy, sxx) = xs.iter().zip(ys).fold((0.0, 0.0), |(sxy, sxx), (&x, &y)| {
        (sxy + (x - mean_x) * (y - mean_y), sxx + (x - mean_x) * (x - mean_x))
    });
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    Line {
        slope,
        intercept: mean_y - slope * mean_x,
    }
}

impl Line {
    fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    fn rss(&self, xs: &[f64], ys: &[f64]) -> f64 {
        xs.iter().zip(ys).map(|(&x, &y)| (y - self.at(x)).powi(2)).sum()
    }

    fn into_spline(self, xs: &[f64]) -> CubicSpline {
        CubicSpline {
            xs: xs.to_vec(),
            values: xs.iter().map(|&x| self.at(x)).collect(),
            second_derivatives: vec![0.0; xs.len()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn interpolating_spline_passes_through_knots() {
        let xs = [0.0, 1.0, 2.5, 4.0, 5.0];
        let ys = [0.0, 2.0, -1.0, 3.0, 0.5];
        let spline = CubicSpline::interpolating(&xs, &ys).unwrap();
        for (&x, &y) in xs.iter().zip(&ys) {
            assert!((spline.eval(x) - y).abs() < EPS, "at {x}");
        }
    }

    #[test]
    fn two_points_give_a_straight_line() {
        let spline = CubicSpline::interpolating(&[0.0, 10.0], &[0.0, 5.0]).unwrap();
        assert!((spline.eval(4.0) - 2.0).abs() < EPS);
        assert!((spline.eval(12.0) - 6.0).abs() < EPS);
    }

    #[test]
    fn natural_spline_reproduces_a_line() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 * x - 1.0).collect();
        let spline = CubicSpline::interpolating(&xs, &ys).unwrap();
        assert!((spline.eval(2.7) - 7.1).abs() < EPS);
    }

    #[test]
    fn smoothing_respects_residual_bound() {
        let xs: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs
            .iter()
            .enumerate()
            .map(|(i, x)| (x * 0.4).sin() * 5.0 + if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        let s = 3.0;
        let spline = CubicSpline::fit(&xs, &ys, s).unwrap();
        let rss: f64 = spline
            .knot_values()
            .iter()
            .zip(&ys)
            .map(|(g, y)| (g - y).powi(2))
            .sum();
        assert!(rss <= s * 1.001, "rss {rss}");
        assert!(rss > s * 0.9, "rss {rss} should approach the bound");
    }

    #[test]
    fn large_smoothing_collapses_to_regression_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 2.0, 0.0, 2.0];
        let spline = CubicSpline::fit(&xs, &ys, 1e6).unwrap();
        // Least-squares line: y = 0.4x + 0.4
        assert!((spline.eval(1.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_unsorted_input() {
        let err = CubicSpline::interpolating(&[0.0, 2.0, 1.0], &[0.0, 1.0, 2.0]).unwrap_err();
        assert!(matches!(err, Error::NonIncreasing));
    }

    #[test]
    fn rejects_single_point() {
        let err = CubicSpline::interpolating(&[0.0], &[1.0]).unwrap_err();
        assert!(matches!(err, Error::NotEnoughPoints { needed: 2, found: 1 }));
    }
}
