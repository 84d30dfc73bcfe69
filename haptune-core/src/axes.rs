//! # Axis Settings Module
//!
//! Plot limits, tick spacing and labels for the profile editor, including
//! automatic fitting of the axes to loaded data.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::{round2, ControlPoint};

/// Fraction of the axis span added on each side when displaying.
pub const DISPLAY_MARGIN: f64 = 0.05;

/// Allowed tick interval range.
pub const MIN_TICK: f64 = 0.01;
pub const MAX_TICK: f64 = 1000.0;

/// Upper bound on the tick marks generated for one axis.
pub const MAX_TICKS: usize = 1000;

/// Which axis a label or limit refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Limits, tick intervals and labels of the editor plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisSettings {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub x_tick: f64,
    pub y_tick: f64,
    pub x_label: String,
    pub y_label: String,
}

impl Default for AxisSettings {
    fn default() -> Self {
        Self {
            x_min: 0.0,
            x_max: 1000.0,
            y_min: -20.0,
            y_max: 20.0,
            x_tick: 100.0,
            y_tick: 5.0,
            x_label: "No.of Samples".to_string(),
            y_label: "Amplitude".to_string(),
        }
    }
}

/// A visible plot range: `(x_min, x_max, y_min, y_max)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRange {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl AxisSettings {
    /// Sets the axis limits.
    ///
    /// # Errors
    /// * `InvalidAxis` - a minimum is not below its maximum, or a value is not finite
    pub fn set_limits(&mut self, x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<()> {
        if ![x_min, x_max, y_min, y_max].iter().all(|v| v.is_finite()) {
            return Err(Error::InvalidAxis("limits must be finite".into()));
        }
        if x_min >= x_max {
            return Err(Error::InvalidAxis(format!("x min {x_min} must be below x max {x_max}")));
        }
        if y_min >= y_max {
            return Err(Error::InvalidAxis(format!("y min {y_min} must be below y max {y_max}")));
        }
        self.x_min = x_min;
        self.x_max = x_max;
        self.y_min = y_min;
        self.y_max = y_max;
        Ok(())
    }

    /// Sets the tick intervals. Each must lie in `[0.01, 1000]`.
    pub fn set_ticks(&mut self, x_tick: f64, y_tick: f64) -> Result<()> {
        for (name, tick) in [("x", x_tick), ("y", y_tick)] {
            if !(MIN_TICK..=MAX_TICK).contains(&tick) {
                return Err(Error::InvalidAxis(format!(
                    "{name} tick {tick} outside {MIN_TICK}..={MAX_TICK}"
                )));
            }
        }
        self.x_tick = x_tick;
        self.y_tick = y_tick;
        Ok(())
    }

    /// Renames an axis. Empty labels are ignored.
    pub fn set_label(&mut self, axis: Axis, label: &str) {
        let label = label.trim();
        if label.is_empty() {
            return;
        }
        match axis {
            Axis::X => self.x_label = label.to_string(),
            Axis::Y => self.y_label = label.to_string(),
        }
    }

    /// The limits widened by a 5 % margin on each side.
    pub fn display_range(&self) -> DisplayRange {
        let x_margin = (self.x_max - self.x_min) * DISPLAY_MARGIN;
        let y_margin = (self.y_max - self.y_min) * DISPLAY_MARGIN;
        DisplayRange {
            x_min: self.x_min - x_margin,
            x_max: self.x_max + x_margin,
            y_min: self.y_min - y_margin,
            y_max: self.y_max + y_margin,
        }
    }

    /// Fits limits and ticks to `points`. Does nothing for an empty slice.
    pub fn auto_adjust(&mut self, points: &[ControlPoint]) {
        if points.is_empty() {
            return;
        }

        let (mut x_min, mut x_max) = bounds(points.iter().map(|p| p.x));
        let (mut y_min, mut y_max) = bounds(points.iter().map(|p| p.y));

        let x_margin = if x_max != x_min { (x_max - x_min) * DISPLAY_MARGIN } else { 1.0 };
        let y_margin = if y_max != y_min { (y_max - y_min) * DISPLAY_MARGIN } else { 1.0 };
        x_min = round2(x_min - x_margin);
        x_max = round2(x_max + x_margin);
        y_min = round2(y_min - y_margin);
        y_max = round2(y_max + y_margin);

        self.x_min = x_min;
        self.x_max = x_max;
        self.y_min = y_min;
        self.y_max = y_max;
        self.x_tick = nice_tick(x_min, x_max).clamp(MIN_TICK, MAX_TICK);
        self.y_tick = nice_tick(y_min, y_max).clamp(MIN_TICK, MAX_TICK);
        log::debug!(
            "[AXES] Auto-adjusted to x {}..{} (tick {}), y {}..{} (tick {})",
            self.x_min, self.x_max, self.x_tick, self.y_min, self.y_max, self.y_tick
        );
    }

    /// Tick positions for one axis over the display range.
    ///
    /// # Arguments
    /// * `axis` - Which axis to compute ticks for
    ///
    /// # Returns
    /// * `Vec<f64>` - Multiples of the tick interval, at most [`MAX_TICKS`] of them
    pub fn ticks(&self, axis: Axis) -> Vec<f64> {
        let range = self.display_range();
        match axis {
            Axis::X => tick_positions(range.x_min, range.x_max, self.x_tick),
            Axis::Y => tick_positions(range.y_min, range.y_max, self.y_tick),
        }
    }
}

/// Multiples of `step` lying in `[lo, hi]`.
///
/// When `step` would produce more than [`MAX_TICKS`] marks it is widened by
/// powers of ten until it does not.
///
/// # Arguments
/// * `lo`, `hi` - Range to cover
/// * `step` - Requested tick interval
///
/// # Returns
/// * `Vec<f64>` - Ascending tick positions; empty for an invalid range or step
pub fn tick_positions(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    if !(lo.is_finite() && hi.is_finite() && step.is_finite()) || hi < lo || step <= 0.0 {
        return Vec::new();
    }
    let count = |step: f64| (hi / step).floor() - (lo / step).ceil() + 1.0;
    let mut step = step;
    while count(step) > MAX_TICKS as f64 {
        step *= 10.0;
    }
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

/// A rounded tick interval giving about ten ticks across `[min, max]`.
pub fn nice_tick(min: f64, max: f64) -> f64 {
    let raw = (max - min) / 10.0;
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    round2((raw / magnitude).round() * magnitude)
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_range_adds_five_percent() {
        let range = AxisSettings::default().display_range();
        assert_eq!(range.x_min, -50.0);
        assert_eq!(range.x_max, 1050.0);
        assert_eq!(range.y_min, -22.0);
        assert_eq!(range.y_max, 22.0);
    }

    #[test]
    fn limits_must_be_ordered() {
        let mut axes = AxisSettings::default();
        assert!(axes.set_limits(10.0, 5.0, 0.0, 1.0).is_err());
        assert!(axes.set_limits(0.0, 5.0, 1.0, 1.0).is_err());
        axes.set_limits(-1.0, 1.0, -2.0, 2.0).unwrap();
        assert_eq!((axes.x_min, axes.y_max), (-1.0, 2.0));
    }

    #[test]
    fn ticks_are_range_checked() {
        let mut axes = AxisSettings::default();
        assert!(axes.set_ticks(0.0, 1.0).is_err());
        assert!(axes.set_ticks(1.0, 5000.0).is_err());
        axes.set_ticks(0.5, 2.0).unwrap();
        assert_eq!((axes.x_tick, axes.y_tick), (0.5, 2.0));
    }

    #[test]
    fn nice_tick_rounds_to_leading_digit() {
        assert_eq!(nice_tick(0.0, 1000.0), 100.0);
        assert_eq!(nice_tick(0.0, 37.0), 4.0);
        assert_eq!(nice_tick(-2.0, 2.0), 0.4);
    }

    #[test]
    fn auto_adjust_wraps_data() {
        let mut axes = AxisSettings::default();
        axes.auto_adjust(&[ControlPoint::new(0.0, -5.0), ControlPoint::new(100.0, 5.0)]);
        assert_eq!((axes.x_min, axes.x_max), (-5.0, 105.0));
        assert_eq!((axes.y_min, axes.y_max), (-5.5, 5.5));
        assert_eq!(axes.x_tick, 10.0);
        assert_eq!(axes.y_tick, 1.0);
    }

    #[test]
    fn auto_adjust_single_point_uses_unit_margin() {
        let mut axes = AxisSettings::default();
        axes.auto_adjust(&[ControlPoint::new(3.0, 3.0)]);
        assert_eq!((axes.x_min, axes.x_max, axes.y_min, axes.y_max), (2.0, 4.0, 2.0, 4.0));
    }

    #[test]
    fn empty_labels_are_ignored() {
        let mut axes = AxisSettings::default();
        axes.set_label(Axis::X, "   ");
        axes.set_label(Axis::Y, "Force (N)");
        assert_eq!(axes.x_label, "No.of Samples");
        assert_eq!(axes.y_label, "Force (N)");
    }

    #[test]
    fn tick_count_is_bounded_for_wide_ranges() {
        let mut axes = AxisSettings::default();
        axes.set_limits(0.0, 1e7, -20.0, 20.0).unwrap();
        axes.set_ticks(1.0, 5.0).unwrap();
        let ticks = axes.ticks(Axis::X);
        assert!(ticks.len() <= MAX_TICKS, "{} ticks", ticks.len());
        assert!(ticks.len() > 100);
        assert!(ticks.contains(&0.0));
        assert_eq!(axes.ticks(Axis::Y).len(), 9);
    }

    #[test]
    fn tick_positions_reject_degenerate_input() {
        assert!(tick_positions(0.0, 1.0, 0.0).is_empty());
        assert!(tick_positions(1.0, 0.0, 0.1).is_empty());
        assert!(tick_positions(0.0, f64::INFINITY, 1.0).is_empty());
        assert_eq!(tick_positions(0.0, 1.0, 0.5), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn tick_positions_cover_display_range() {
        let axes = AxisSettings::default();
        let ticks = axes.ticks(Axis::Y);
        assert_eq!(ticks.first(), Some(&-20.0));
        assert_eq!(ticks.last(), Some(&20.0));
        assert_eq!(ticks.len(), 9);
    }
}
