//! # Spectrum Module
//!
//! Single-sided DFT magnitude spectra of synthesised vibrations, used to
//! check which frequencies a haptic signal actually contains.
//!
//! ## Features
//! - Arbitrary-length FFT using RustFFT
//! - Amplitude-scaled magnitudes (`2/N * |X_k|`), so a sine of amplitude A
//!   shows a peak near A
//! - Optional Hann windowing for reduced spectral leakage

use rustfft::{num_complex::Complex, FftPlanner};

/// Window applied to the signal before the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    /// No windowing.
    #[default]
    Rectangular,
    /// Hann window, tapering the signal to zero at the edges.
    Hann,
}

/// Frequencies (Hz) and magnitudes of the bins from DC up to Nyquist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spectrum {
    pub frequencies: Vec<f64>,
    pub magnitudes: Vec<f64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// The `(frequency, magnitude)` of the strongest non-DC bin.
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.frequencies
            .iter()
            .zip(&self.magnitudes)
            .skip(1)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(&f, &m)| (f, m))
    }

    /// Highest magnitude in the spectrum, or zero when empty.
    pub fn max_magnitude(&self) -> f64 {
        self.magnitudes.iter().fold(0.0, |max, &m| m.max(max))
    }
}

/// Applies a Hann window to the buffer in place.
fn apply_hann_window(buffer: &mut [f64]) {
    let n = buffer.len();
    if n < 2 {
        return;
    }
    let n_minus_1 = (n - 1) as f64;
    for (i, sample) in buffer.iter_mut().enumerate() {
        let multiplier = 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / n_minus_1).cos());
        *sample *= multiplier;
    }
}

/// Computes the single-sided DFT of `samples` taken at `sampling_rate` Hz.
///
/// For N samples the result holds bins `k = 0..N/2` with frequency
/// `k * sampling_rate / N` and magnitude `2/N * |X_k|`.
pub fn dft(samples: &[f64], sampling_rate: u32) -> Spectrum {
    dft_windowed(samples, sampling_rate, Window::Rectangular)
}

/// As [`dft`], with the chosen window applied first.
pub fn dft_windowed(samples: &[f64], sampling_rate: u32, window: Window) -> Spectrum {
    let n = samples.len();
    if n == 0 {
        return Spectrum::default();
    }

    let mut processed = samples.to_vec();
    if window == Window::Hann {
        apply_hann_window(&mut processed);
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);

    let mut buffer: Vec<Complex<f64>> = processed
        .into_iter()
        .map(|sample| Complex { re: sample, im: 0.0 })
        .collect();
    fft.process(&mut buffer);

    let bins = n / 2;
    let scale = 2.0 / n as f64;
    let bin_width = sampling_rate as f64 / n as f64;

    Spectrum {
        frequencies: (0..bins).map(|k| k as f64 * bin_width).collect(),
        magnitudes: buffer.iter().take(bins).map(|c| c.norm() * scale).collect(),
    }
}
