//! # Vibration Synthesis Module
//!
//! Builds high-frequency vibration signals from a low-frequency profile.
//! The profile is resampled at the vibration sampling rate and used as an
//! amplitude envelope for a sum of sine tones.
//!
//! ## Signal model
//! - `n = floor((max_x - min_x) * sampling_rate / 1000)` output samples
//! - carrier(x) = sum of `amplitude * sin(2π * frequency * x / sampling_rate)`
//!   over the enabled tones, normalised to a peak of 1
//! - sample(x) = envelope(x) * carrier(x) * global_amplitude

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::RangeInclusive;

use crate::error::{Error, Result};
use crate::resample;
use crate::ControlPoint;

/// Accepted vibration sampling rates in Hz.
pub const SAMPLING_RATE_RANGE: RangeInclusive<u32> = 1..=50_000;
/// Accepted tone frequencies in Hz.
pub const FREQUENCY_RANGE: RangeInclusive<f64> = 1.0..=10_000.0;
/// Accepted tone and global amplitudes.
pub const AMPLITUDE_RANGE: RangeInclusive<f64> = 0.0..=10.0;

/// Number of samples in an envelope-only preview.
pub const ENVELOPE_ONLY_SAMPLES: usize = 1000;

/// One sine component of a vibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub frequency_hz: f64,
    pub amplitude: f64,
    pub enabled: bool,
}

impl Default for Tone {
    fn default() -> Self {
        Self::new(100.0, 1.0)
    }
}

impl Tone {
    /// An enabled tone with its frequency and amplitude clamped to the allowed ranges.
    pub fn new(frequency_hz: f64, amplitude: f64) -> Self {
        Self {
            frequency_hz: clamp(frequency_hz, &FREQUENCY_RANGE),
            amplitude: clamp(amplitude, &AMPLITUDE_RANGE),
            enabled: true,
        }
    }

    /// Sets the frequency, clamped to [`FREQUENCY_RANGE`].
    pub fn set_frequency(&mut self, frequency_hz: f64) {
        self.frequency_hz = clamp(frequency_hz, &FREQUENCY_RANGE);
    }

    /// Sets the amplitude, clamped to [`AMPLITUDE_RANGE`].
    pub fn set_amplitude(&mut self, amplitude: f64) {
        self.amplitude = clamp(amplitude, &AMPLITUDE_RANGE);
    }

    fn value_at(&self, x: f64, sampling_rate: f64) -> f64 {
        self.amplitude * (2.0 * PI * self.frequency_hz * x / sampling_rate).sin()
    }
}

/// Parameters of the multi-tone vibration synthesiser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VibrationSettings {
    pub sampling_rate: u32,
    pub global_amplitude: f64,
    pub tones: Vec<Tone>,
}

impl Default for VibrationSettings {
    fn default() -> Self {
        Self {
            sampling_rate: 1000,
            global_amplitude: 1.0,
            tones: vec![Tone::default(); 3],
        }
    }
}

impl VibrationSettings {
    /// Sets the sampling rate, clamped to [`SAMPLING_RATE_RANGE`].
    ///
    /// # Arguments
    /// * `rate` - Requested rate in Hz
    pub fn set_sampling_rate(&mut self, rate: u32) {
        self.sampling_rate = rate.clamp(*SAMPLING_RATE_RANGE.start(), *SAMPLING_RATE_RANGE.end());
    }

    /// Sets the amplitude applied to the whole signal, clamped to [`AMPLITUDE_RANGE`].
    pub fn set_global_amplitude(&mut self, amplitude: f64) {
        self.global_amplitude = clamp(amplitude, &AMPLITUDE_RANGE);
    }

    /// Appends a tone and returns its index.
    pub fn add_tone(&mut self, tone: Tone) -> usize {
        self.tones.push(tone);
        self.tones.len() - 1
    }

    /// Removes the tone at `index`.
    ///
    /// # Returns
    /// * `Option<Tone>` - The removed tone, or `None` if `index` is out of range
    pub fn remove_tone(&mut self, index: usize) -> Option<Tone> {
        (index < self.tones.len()).then(|| self.tones.remove(index))
    }

    pub fn enabled_tones(&self) -> impl Iterator<Item = &Tone> {
        self.tones.iter().filter(|t| t.enabled)
    }
}

/// A synthesised vibration together with the envelope that shaped it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VibrationSignal {
    pub sampling_rate: u32,
    pub envelope: Vec<ControlPoint>,
    pub samples: Vec<ControlPoint>,
}

impl VibrationSignal {
    /// The envelope mirrored below the axis.
    pub fn lower_envelope(&self) -> Vec<ControlPoint> {
        self.envelope.iter().map(ControlPoint::mirrored).collect()
    }

    /// Amplitude values only.
    pub fn amplitudes(&self) -> Vec<f64> {
        self.samples.iter().map(|p| p.y).collect()
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f64 {
        self.samples.iter().fold(0.0, |max, p| p.y.abs().max(max))
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sampling_rate as f64
    }
}

/// Synthesises a multi-tone vibration shaped by `base_points`.
///
/// # Errors
/// * `NoTones` - no tone is enabled
/// * `NotEnoughPoints` - fewer than two base points
/// * `SignalTooShort` - the profile span yields fewer than two samples
pub fn synthesize(base_points: &[ControlPoint], settings: &VibrationSettings) -> Result<VibrationSignal> {
    let tones: Vec<&Tone> = settings.enabled_tones().collect();
    if tones.is_empty() {
        return Err(Error::NoTones);
    }

    let rate = settings.sampling_rate as f64;
    let envelope = sampled_envelope(base_points, settings.sampling_rate)?;

    let mut carrier: Vec<f64> = envelope
        .iter()
        .map(|p| tones.iter().map(|t| t.value_at(p.x, rate)).sum())
        .collect();
    let peak = carrier.iter().fold(0.0f64, |max, v| v.abs().max(max));
    if peak > 0.0 {
        carrier.iter_mut().for_each(|v| *v /= peak);
    }

    let samples = envelope
        .iter()
        .zip(&carrier)
        .map(|(e, c)| ControlPoint::new(e.x, e.y * c * settings.global_amplitude))
        .collect();

    log::info!(
        "[VIBRATION] Synthesised {} samples from {} tones at {} Hz",
        envelope.len(),
        tones.len(),
        settings.sampling_rate
    );

    Ok(VibrationSignal {
        sampling_rate: settings.sampling_rate,
        envelope,
        samples,
    })
}

/// Synthesises a single-frequency vibration without carrier normalisation.
pub fn synthesize_tone(
    base_points: &[ControlPoint],
    frequency_hz: f64,
    amplitude_scale: f64,
    sampling_rate: u32,
) -> Result<VibrationSignal> {
    let rate = sampling_rate as f64;
    let envelope = sampled_envelope(base_points, sampling_rate)?;
    let samples = envelope
        .iter()
        .map(|e| {
            let carrier = (2.0 * PI * frequency_hz * e.x / rate).sin();
            ControlPoint::new(e.x, e.y * carrier * amplitude_scale)
        })
        .collect();

    Ok(VibrationSignal {
        sampling_rate,
        envelope,
        samples,
    })
}

/// A smooth envelope preview with no carrier.
pub fn envelope_only(base_points: &[ControlPoint]) -> Result<Vec<ControlPoint>> {
    resample::envelope(base_points, ENVELOPE_ONLY_SAMPLES)
}

/// Number of output samples for a profile spanning `span` x units.
pub fn sample_count(span: f64, sampling_rate: u32) -> usize {
    (span * sampling_rate as f64 / 1000.0).floor().max(0.0) as usize
}

fn sampled_envelope(base_points: &[ControlPoint], sampling_rate: u32) -> Result<Vec<ControlPoint>> {
    if base_points.len() < 2 {
        return Err(Error::NotEnoughPoints {
            needed: 2,
            found: base_points.len(),
        });
    }

    let (lo, hi) = base_points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
    let n = sample_count(hi - lo, sampling_rate);
    if n < 2 {
        return Err(Error::SignalTooShort { samples: n });
    }

    resample::envelope(base_points, n)
}

fn clamp(value: f64, range: &RangeInclusive<f64>) -> f64 {
    if value.is_nan() {
        *range.start()
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_profile(span: f64, level: f64) -> Vec<ControlPoint> {
        vec![ControlPoint::new(0.0, level), ControlPoint::new(span, level)]
    }

    #[test]
    fn default_settings_have_three_tones() {
        let settings = VibrationSettings::default();
        assert_eq!(settings.sampling_rate, 1000);
        assert_eq!(settings.tones.len(), 3);
        assert!(settings.tones.iter().all(|t| t.enabled && t.frequency_hz == 100.0));
    }

    #[test]
    fn setters_clamp_to_ranges() {
        let mut settings = VibrationSettings::default();
        settings.set_sampling_rate(0);
        assert_eq!(settings.sampling_rate, 1);
        settings.set_sampling_rate(90_000);
        assert_eq!(settings.sampling_rate, 50_000);
        settings.set_global_amplitude(42.0);
        assert_eq!(settings.global_amplitude, 10.0);

        let tone = Tone::new(0.0, -1.0);
        assert_eq!((tone.frequency_hz, tone.amplitude), (1.0, 0.0));
    }

    #[test]
    fn sample_count_scales_with_rate() {
        assert_eq!(sample_count(1000.0, 1000), 1000);
        assert_eq!(sample_count(500.0, 8000), 4000);
        assert_eq!(sample_count(1.0, 1000), 1);
    }

    #[test]
    fn flat_envelope_peaks_at_level_times_gain() {
        let mut settings = VibrationSettings::default();
        settings.set_global_amplitude(2.0);
        let signal = synthesize(&flat_profile(1000.0, 3.0), &settings).unwrap();
        assert_eq!(signal.samples.len(), 1000);
        // normalised carrier peaks at 1, so the signal peaks at 3 * 2
        assert!((signal.peak() - 6.0).abs() < 1e-6, "peak {}", signal.peak());
    }

    #[test]
    fn samples_never_exceed_envelope() {
        let profile = vec![
            ControlPoint::new(0.0, 0.0),
            ControlPoint::new(200.0, 5.0),
            ControlPoint::new(400.0, 2.0),
            ControlPoint::new(600.0, 0.0),
        ];
        let mut settings = VibrationSettings::default();
        settings.tones = vec![Tone::new(50.0, 1.0), Tone::new(120.0, 0.5)];
        let signal = synthesize(&profile, &settings).unwrap();
        for (s, e) in signal.samples.iter().zip(&signal.envelope) {
            assert!(s.y.abs() <= e.y.abs() + 1e-9);
        }
        assert_eq!(signal.lower_envelope()[10].y, -signal.envelope[10].y);
    }

    #[test]
    fn disabled_tones_are_rejected() {
        let mut settings = VibrationSettings::default();
        settings.tones.iter_mut().for_each(|t| t.enabled = false);
        let err = synthesize(&flat_profile(100.0, 1.0), &settings).unwrap_err();
        assert!(matches!(err, Error::NoTones));
    }

    #[test]
    fn tiny_profiles_are_too_short() {
        let err = synthesize(&flat_profile(1.0, 1.0), &VibrationSettings::default()).unwrap_err();
        assert!(matches!(err, Error::SignalTooShort { samples: 1 }));

        let err = synthesize(&[ControlPoint::ORIGIN], &VibrationSettings::default()).unwrap_err();
        assert!(matches!(err, Error::NotEnoughPoints { .. }));
    }

    #[test]
    fn single_tone_is_not_normalised() {
        let signal = synthesize_tone(&flat_profile(1000.0, 1.0), 100.0, 0.5, 1000).unwrap();
        assert!(signal.peak() <= 0.5 + 1e-9);
        assert!(signal.peak() > 0.49);
    }

    #[test]
    fn envelope_only_has_fixed_resolution() {
        let envelope = envelope_only(&flat_profile(10.0, 1.0)).unwrap();
        assert_eq!(envelope.len(), ENVELOPE_ONLY_SAMPLES);
    }

    #[test]
    fn remove_tone_bounds() {
        let mut settings = VibrationSettings::default();
        assert!(settings.remove_tone(5).is_none());
        assert!(settings.remove_tone(0).is_some());
        assert_eq!(settings.tones.len(), 2);
    }
}
