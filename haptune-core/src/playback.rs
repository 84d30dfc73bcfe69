//! # Playback Module
//!
//! Previews a vibration signal through the default audio output using CPAL,
//! so it can drive an actuator connected to the sound card.
//!
//! ## Features
//! - Automatic output device selection
//! - Linear resampling from the vibration rate to the device rate
//! - Mono signal duplicated to every output channel
//! - Dedicated worker thread owning the stream, stopped through a channel

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::error::{Error, Result};
use crate::vibration::VibrationSignal;

/// Handle to a running preview. Dropping it stops playback.
#[derive(Debug)]
pub struct PlaybackHandle {
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
    device_rate: u32,
}

impl PlaybackHandle {
    /// Sample rate of the output device.
    pub fn device_rate(&self) -> u32 {
        self.device_rate
    }

    /// Whether the signal has finished playing (or playback was stopped).
    pub fn is_finished(&self) -> bool {
        self.thread_handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Stops playback and waits for the worker thread to exit.
    pub fn stop(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            let _ = self.shutdown_tx.try_send(());
            if handle.join().is_err() {
                log::error!("[PLAYBACK] Playback thread panicked");
            }
        }
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Starts playing `signal` on the default output device.
///
/// The signal is scaled so its peak reaches `volume` (clamped to `[0, 1]`).
///
/// # Errors
/// * `SignalTooShort` - the signal has no samples
/// * `Audio` - no output device, unsupported format, or stream failure
pub fn play(signal: &VibrationSignal, volume: f32) -> Result<PlaybackHandle> {
    if signal.samples.is_empty() {
        return Err(Error::SignalTooShort { samples: 0 });
    }

    let peak = signal.peak();
    let gain = if peak > 0.0 { volume.clamp(0.0, 1.0) as f64 / peak } else { 0.0 };
    let samples: Vec<f32> = signal.samples.iter().map(|p| (p.y * gain) as f32).collect();
    let source_rate = signal.sampling_rate;

    let (ready_tx, ready_rx) = crossbeam_channel::bounded::<std::result::Result<u32, String>>(1);
    let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);

    let thread_handle = thread::spawn(move || {
        log::debug!("[PLAYBACK] Starting playback thread...");
        let (stream, finished_rx, device_rate) = match open_stream(samples, source_rate) {
            Ok(opened) => opened,
            Err(e) => {
                let _ = ready_tx.send(Err(e.to_string()));
                return;
            }
        };
        let _ = ready_tx.send(Ok(device_rate));

        crossbeam_channel::select! {
            recv(finished_rx) -> _ => log::info!("[PLAYBACK] Signal finished"),
            recv(shutdown_rx) -> _ => log::info!("[PLAYBACK] Received stop signal"),
        }

        if let Err(e) = stream.pause() {
            log::warn!("[PLAYBACK] Error pausing stream: {}", e);
        }
        drop(stream);
        log::debug!("[PLAYBACK] Playback thread finished");
    });

    match ready_rx.recv() {
        Ok(Ok(device_rate)) => Ok(PlaybackHandle {
            shutdown_tx,
            thread_handle: Some(thread_handle),
            device_rate,
        }),
        Ok(Err(message)) => {
            let _ = thread_handle.join();
            Err(Error::Audio(message))
        }
        Err(_) => {
            let _ = thread_handle.join();
            Err(Error::Audio("playback thread exited before starting".into()))
        }
    }
}

/// Opens and starts an output stream that plays `samples` once.
///
/// Returns the stream, a receiver signalled when the last sample has been
/// written, and the device sample rate.
fn open_stream(samples: Vec<f32>, source_rate: u32) -> Result<(cpal::Stream, Receiver<()>, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| Error::Audio("No output device available".into()))?;

    log::info!(
        "[PLAYBACK] Using audio output device: {}",
        device.name().unwrap_or_else(|_| "unknown".to_string())
    );

    let supported = device.default_output_config().map_err(audio_error)?;
    if supported.sample_format() != cpal::SampleFormat::F32 {
        return Err(Error::Audio(format!(
            "Unsupported output sample format {:?}",
            supported.sample_format()
        )));
    }

    let device_rate = supported.sample_rate().0;
    let channels = supported.channels().max(1) as usize;
    let config: cpal::StreamConfig = supported.into();
    let buffer = resample_linear(&samples, source_rate, device_rate);
    log::debug!(
        "[PLAYBACK] Resampled {} samples at {} Hz to {} at {} Hz",
        samples.len(),
        source_rate,
        buffer.len(),
        device_rate
    );

    let (finished_tx, finished_rx) = crossbeam_channel::bounded(1);
    let mut position = 0usize;
    let err_fn = |err| log::error!("[PLAYBACK] An error occurred on the audio stream: {}", err);

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let value = buffer.get(position).copied().unwrap_or(0.0);
                    frame.iter_mut().for_each(|sample| *sample = value);
                    if position < buffer.len() {
                        position += 1;
                    }
                }
                if position >= buffer.len() {
                    let _ = finished_tx.try_send(());
                }
            },
            err_fn,
            None,
        )
        .map_err(audio_error)?;

    stream.play().map_err(audio_error)?;
    Ok((stream, finished_rx, device_rate))
}

/// Linearly resamples `samples` from `from_rate` to `to_rate`.
pub fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if samples.len() < 2 || from_rate == to_rate || from_rate == 0 || to_rate == 0 {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let last = (samples.len() - 1) as f64;
    let out_len = (last / ratio).floor() as usize + 1;

    (0..out_len)
        .map(|i| {
            let position = (i as f64 * ratio).min(last);
            let index = position.floor() as usize;
            let frac = (position - index as f64) as f32;
            match samples.get(index + 1) {
                Some(&next) => samples[index] + (next - samples[index]) * frac,
                None => samples[index],
            }
        })
        .collect()
}

fn audio_error(e: impl std::fmt::Display) -> Error {
    Error::Audio(e.to_string())
}
