//! # Profile Module
//!
//! The editable haptic profile: a sorted list of control points with undo
//! history, the originally loaded points, an optional interpolated
//! resampling and the current spline smoothing factor.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::resample::{self, SPLINE_MIN_POINTS};
use crate::spline;
use crate::ControlPoint;

/// Number of samples in the curve drawn through the control points.
pub const DISPLAY_CURVE_SAMPLES: usize = 500;

/// Points closer than this along x are flagged as problematic.
pub const CLOSE_POINT_TOLERANCE: f64 = 0.01;

/// An editable haptic profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    points: Vec<ControlPoint>,
    original_points: Vec<ControlPoint>,
    #[serde(skip)]
    history: Vec<Vec<ControlPoint>>,
    interpolated: Option<Vec<ControlPoint>>,
    smoothing: f64,
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}

impl Profile {
    /// Creates the blank profile with a single point at the origin.
    pub fn new() -> Self {
        Self {
            points: vec![ControlPoint::ORIGIN],
            original_points: vec![ControlPoint::ORIGIN],
            history: Vec::new(),
            interpolated: None,
            smoothing: 0.0,
        }
    }

    /// Creates a profile whose current and original points are `points`.
    pub fn from_points(points: Vec<ControlPoint>) -> Self {
        let mut profile = Self::new();
        profile.load(points);
        profile
    }

    /// Replaces the profile with freshly loaded points.
    ///
    /// Clears the undo history and any interpolation.
    pub fn load(&mut self, points: Vec<ControlPoint>) {
        self.points = points.clone();
        self.original_points = points;
        self.history.clear();
        self.interpolated = None;
        self.sort();
    }

    /// Current control points, sorted by `(x, y)`.
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Points as last loaded from a file; the target of [`reset`](Self::reset).
    pub fn original_points(&self) -> &[ControlPoint] {
        &self.original_points
    }

    /// Resampled points from the last [`interpolate`](Self::interpolate), if any.
    pub fn interpolated(&self) -> Option<&[ControlPoint]> {
        self.interpolated.as_deref()
    }

    /// Smoothing factor used by curves and interpolation. Zero means exact fit.
    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    /// True when [`undo`](Self::undo) has a step to restore.
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Inserts a point, keeping the points sorted. Records an undo step.
    ///
    /// # Arguments
    /// * `point` - The new control point
    pub fn add_point(&mut self, point: ControlPoint) {
        self.record_history();
        self.points.push(point);
        self.sort();
    }

    /// Removes `point` if present. Returns whether anything changed.
    pub fn delete_point(&mut self, point: ControlPoint) -> bool {
        match self.position_of(point) {
            Some(index) => {
                self.record_history();
                self.points.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replaces `old` with `new` if `old` is present. Returns whether anything changed.
    pub fn move_point(&mut self, old: ControlPoint, new: ControlPoint) -> bool {
        match self.position_of(old) {
            Some(index) => {
                self.record_history();
                self.points.remove(index);
                self.points.push(new);
                self.sort();
                true
            }
            None => false,
        }
    }

    /// Restores the points from before the last edit.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.points = previous;
                true
            }
            None => false,
        }
    }

    /// Discards edits and returns to the loaded points.
    pub fn reset(&mut self) {
        self.points = if self.original_points.is_empty() {
            vec![ControlPoint::ORIGIN]
        } else {
            self.original_points.clone()
        };
        self.sort();
    }

    /// Unloads the profile entirely, leaving a single origin point.
    pub fn clear(&mut self) {
        self.original_points.clear();
        self.points = vec![ControlPoint::ORIGIN];
        self.history.clear();
        self.interpolated = None;
    }

    /// The control point nearest to `(x, y)`.
    pub fn find_closest(&self, x: f64, y: f64) -> Option<ControlPoint> {
        self.points
            .iter()
            .copied()
            .min_by(|a, b| a.distance_sq(x, y).total_cmp(&b.distance_sq(x, y)))
    }

    /// Index pairs of points whose x positions are closer than `tolerance`.
    pub fn close_pairs(&self, tolerance: f64) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..self.points.len() {
            for j in (i + 1)..self.points.len() {
                if (self.points[i].x - self.points[j].x).abs() < tolerance {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    /// Sets the spline smoothing factor. Zero (or negative) disables smoothing.
    pub fn set_smoothing(&mut self, smoothing: f64) {
        self.smoothing = smoothing.max(0.0);
    }

    /// Resamples the profile with `points_per_unit` points per x unit.
    ///
    /// # Errors
    /// * `NotEnoughPoints` - fewer than four control points
    /// * `NonIncreasing` - two control points share an x position
    pub fn interpolate(&mut self, points_per_unit: f64) -> Result<&[ControlPoint]> {
        let source = if self.points.is_empty() {
            &self.original_points
        } else {
            &self.points
        };
        if source.len() < SPLINE_MIN_POINTS {
            return Err(Error::NotEnoughPoints {
                needed: SPLINE_MIN_POINTS,
                found: source.len(),
            });
        }

        let (xs, _) = resample::unzip(source);
        if !spline::is_strictly_increasing(&xs) {
            return Err(Error::NonIncreasing);
        }

        let span = xs[xs.len() - 1] - xs[0];
        let total = ((span * points_per_unit).floor().max(0.0) as usize).max(2);
        let points = resample::curve(source, total, self.smoothing)?;
        log::debug!("[PROFILE] Interpolated {} points into {}", source.len(), points.len());

        let stored = self.interpolated.insert(points);
        Ok(stored.as_slice())
    }

    /// Drops the interpolated points so exports and synthesis use the control points again.
    pub fn clear_interpolation(&mut self) {
        self.interpolated = None;
    }

    /// Keeps every `factor`-th original point.
    ///
    /// # Errors
    /// * `NoOriginalPoints` - nothing has been loaded
    /// * `InvalidFactor` - factor is zero, not smaller than the point count,
    ///   or leaves fewer than two points
    pub fn downsample(&mut self, factor: usize) -> Result<()> {
        let available = self.original_points.len();
        if available == 0 {
            return Err(Error::NoOriginalPoints);
        }
        if factor == 0 || factor >= available {
            return Err(Error::InvalidFactor { factor, available });
        }

        let kept: Vec<ControlPoint> = self.original_points.iter().copied().step_by(factor).collect();
        if kept.len() < 2 {
            return Err(Error::InvalidFactor { factor, available });
        }

        self.record_history();
        self.points = kept;
        self.sort();
        Ok(())
    }

    /// Points used as the basis for synthesis and export.
    ///
    /// The interpolated resampling when one exists, otherwise the control points.
    pub fn base_points(&self) -> &[ControlPoint] {
        match &self.interpolated {
            Some(points) if !points.is_empty() => points,
            _ => &self.points,
        }
    }

    /// The curve drawn through the control points.
    ///
    /// Empty when fewer than two points exist.
    pub fn display_curve(&self, samples: usize) -> Vec<ControlPoint> {
        if self.points.len() < 2 {
            return Vec::new();
        }
        match resample::curve(&self.points, samples, self.smoothing) {
            Ok(curve) => curve,
            Err(e) => {
                log::warn!("[PROFILE] Spline interpolation error: {}", e);
                Vec::new()
            }
        }
    }

    fn record_history(&mut self) {
        self.history.push(self.points.clone());
    }

    fn position_of(&self, point: ControlPoint) -> Option<usize> {
        self.points.iter().position(|p| *p == point)
    }

    fn sort(&mut self) {
        self.points.sort_by(ControlPoint::cmp_xy);
    }
}
