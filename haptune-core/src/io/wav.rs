//! WAV export of vibration signals, for driving voice-coil actuators from
//! an audio output.

use std::path::Path;

use crate::error::{Error, Result};
use crate::vibration::VibrationSignal;

/// Writes the vibration as a mono 32-bit float WAV at its own sampling rate.
///
/// With `normalize`, samples are scaled so the peak reaches full scale;
/// otherwise they are clamped to `[-1, 1]`.
pub fn export(path: &Path, signal: &VibrationSignal, normalize: bool) -> Result<()> {
    if signal.samples.is_empty() {
        return Err(Error::SignalTooShort { samples: 0 });
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: signal.sampling_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let peak = signal.peak();
    let gain = if normalize && peak > 0.0 { 1.0 / peak } else { 1.0 };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for point in &signal.samples {
        writer.write_sample((point.y * gain).clamp(-1.0, 1.0) as f32)?;
    }
    writer.finalize()?;

    log::info!(
        "[IO] Exported {} samples at {} Hz to {}",
        signal.samples.len(),
        signal.sampling_rate,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ControlPoint;

    #[test]
    fn round_trips_through_hound() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vibration.wav");
        let signal = VibrationSignal {
            sampling_rate: 2000,
            envelope: Vec::new(),
            samples: vec![
                ControlPoint::new(0.0, 0.0),
                ControlPoint::new(1.0, 4.0),
                ControlPoint::new(2.0, -2.0),
            ],
        };
        export(&path, &signal, true).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 2000);
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0.0, 1.0, -0.5]);
    }

    #[test]
    fn empty_signal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let signal = VibrationSignal {
            sampling_rate: 1000,
            envelope: Vec::new(),
            samples: Vec::new(),
        };
        assert!(export(&dir.path().join("x.wav"), &signal, false).is_err());
    }
}
