// haptune-core/src/lib.rs

//! The core logic for the HapTune haptic signal designer.
//! This crate is responsible for profile editing, spline smoothing,
//! vibration synthesis, spectrum analysis, file export and audio
//! preview. It is completely headless and contains no GUI code.

pub mod axes;
pub mod config;
pub mod error;
pub mod io;
pub mod playback;
pub mod profile;
pub mod resample;
pub mod session;
pub mod spectrum;
pub mod spline;
pub mod vibration;

pub use error::{Error, Result};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single point of a haptic profile or signal.
///
/// `x` is the sample position (the horizontal axis of the editor) and `y`
/// the amplitude at that position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlPoint {
    pub x: f64,
    pub y: f64,
}

impl ControlPoint {
    pub const ORIGIN: ControlPoint = ControlPoint { x: 0.0, y: 0.0 };

    /// A point at `(x, y)`.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Total order by `x`, then by `y`.
    pub fn cmp_xy(&self, other: &Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }

    /// Squared Euclidean distance to `(x, y)`.
    pub fn distance_sq(&self, x: f64, y: f64) -> f64 {
        (self.x - x).powi(2) + (self.y - y).powi(2)
    }

    /// Mirrors the point across the horizontal axis.
    pub fn mirrored(&self) -> Self {
        Self::new(self.x, -self.y)
    }
}

impl From<(f64, f64)> for ControlPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Rounds to two decimal places, the precision used by every export format.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
