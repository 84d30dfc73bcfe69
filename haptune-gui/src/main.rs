//! # HapTune - Haptic Profile Editor
//!
//! This module contains the GUI application for designing haptic profiles.
//! Control points are placed on an interactive plot, smoothed, resampled and
//! exported; a vibration synthesiser turns the profile into a multi-tone
//! signal that can be inspected, exported and previewed on an audio output.
//!
//! ## Architecture
//! - **Main Thread**: Iced GUI application with dark theme
//! - **Session**: all editing state lives in `haptune_core::session::Session`
//! - **Playback Thread**: owned by `haptune_core::playback`, stopped through a channel
//! - **Updates**: a short timer runs only while a preview is playing

mod ui;
mod widgets;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};
use haptune_core::axes::Axis;
use haptune_core::config::AppConfig;
use haptune_core::playback::{self, PlaybackHandle};
use haptune_core::session::Session;
use haptune_core::spectrum::Window;
use haptune_core::vibration::Tone;
use haptune_core::ControlPoint;
use iced::{keyboard, Element, Subscription, Task, Theme};
use ui::main_display::create_main_view;

/// How often playback completion is polled while a preview is running.
const PLAYBACK_POLL: Duration = Duration::from_millis(100);
/// Peak level of the audio preview.
const PLAYBACK_VOLUME: f32 = 0.8;

pub fn main() -> anyhow::Result<()> {
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    if let Some(level) = config.level_filter().to_level() {
        simple_logger::init_with_level(level)?;
    }
    if let Some(e) = config_error {
        log::warn!("[MAIN] Ignoring unreadable configuration: {}", e);
    }

    log::info!("[MAIN] Starting HapTune...");
    iced::application("HapTune", HapTune::update, HapTune::view)
        .subscription(HapTune::subscription)
        .theme(HapTune::theme)
        .run_with(move || (HapTune::new(&config), Task::none()))
        .map_err(|e| anyhow::anyhow!("GUI error: {e}"))?;
    log::info!("[MAIN] Application finished");
    Ok(())
}

/// Application messages.
#[derive(Debug, Clone)]
pub enum Message {
    // Plot interaction
    AddPoint(f64, f64),
    SelectNear(f64, f64),
    DragSelected(f64, f64),
    DeleteSelected,
    Undo,

    // Data load row
    LoadPathChanged(String),
    LoadFile,
    UnloadAndReset,
    ResetEditing,

    // Processing
    SmoothingChanged(String),
    ApplySmoothing,
    RemoveSmoothing,
    InterpolationChanged(String),
    Interpolate,
    RemoveInterpolation,
    DownsampleChanged(String),
    Downsample,

    // Axes
    AxisFieldChanged(AxisField, String),
    ApplyAxes,
    AutoAxes,

    // Files
    SavePathChanged(String),
    SaveTable,
    SaveBrace,
    SaveSession,
    LoadSession,

    // Vibration
    ToggleVibrationPanel,
    SamplingRateChanged(String),
    GlobalAmplitudeChanged(String),
    ToneEnabled(usize, bool),
    ToneFrequencyChanged(usize, String),
    ToneAmplitudeChanged(usize, String),
    AddTone,
    RemoveTone(usize),
    GenerateVibration,
    ClearVibration,
    GenerateEnvelope,
    ClearEnvelope,
    EnvelopeVisible(bool),
    HannWindow(bool),
    VibrationPathChanged(String),
    SaveVibration,
    ExportWav,
    Play,
    Stop,

    Tick,
}

/// Editable axis fields of the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisField {
    XMin,
    XMax,
    YMin,
    YMax,
    XTick,
    YTick,
    XLabel,
    YLabel,
}

/// Last outcome reported in the status line.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// Text typed into one tone row.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneInput {
    pub enabled: bool,
    pub frequency: String,
    pub amplitude: String,
}

impl From<&Tone> for ToneInput {
    fn from(tone: &Tone) -> Self {
        Self {
            enabled: tone.enabled,
            frequency: tone.frequency_hz.to_string(),
            amplitude: tone.amplitude.to_string(),
        }
    }
}

/// Contents of every text field, parsed only when an action needs them.
#[derive(Debug, Clone, PartialEq)]
pub struct Inputs {
    pub load_path: String,
    pub save_path: String,
    pub vibration_path: String,
    pub smoothing: String,
    pub interpolation: String,
    pub downsample: String,
    pub x_min: String,
    pub x_max: String,
    pub y_min: String,
    pub y_max: String,
    pub x_tick: String,
    pub y_tick: String,
    pub x_label: String,
    pub y_label: String,
    pub sampling_rate: String,
    pub global_amplitude: String,
    pub tones: Vec<ToneInput>,
}

impl Inputs {
    fn from_session(session: &Session) -> Self {
        let mut inputs = Self {
            load_path: String::new(),
            save_path: "profile.csv".to_string(),
            vibration_path: "vibration.csv".to_string(),
            smoothing: session.smoothing_factor.to_string(),
            interpolation: session.interpolation_factor.to_string(),
            downsample: session.downsample_factor.to_string(),
            x_min: String::new(),
            x_max: String::new(),
            y_min: String::new(),
            y_max: String::new(),
            x_tick: String::new(),
            y_tick: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            sampling_rate: String::new(),
            global_amplitude: String::new(),
            tones: Vec::new(),
        };
        inputs.sync_axes(session);
        inputs.sync_vibration(session);
        inputs
    }

    fn sync_axes(&mut self, session: &Session) {
        let axes = &session.axes;
        self.x_min = axes.x_min.to_string();
        self.x_max = axes.x_max.to_string();
        self.y_min = axes.y_min.to_string();
        self.y_max = axes.y_max.to_string();
        self.x_tick = axes.x_tick.to_string();
        self.y_tick = axes.y_tick.to_string();
        self.x_label = axes.x_label.clone();
        self.y_label = axes.y_label.clone();
    }

    fn sync_vibration(&mut self, session: &Session) {
        let vibration = &session.vibration;
        self.sampling_rate = vibration.sampling_rate.to_string();
        self.global_amplitude = vibration.global_amplitude.to_string();
        self.tones = vibration.tones.iter().map(ToneInput::from).collect();
    }

    fn axis_field_mut(&mut self, field: AxisField) -> &mut String {
        match field {
            AxisField::XMin => &mut self.x_min,
            AxisField::XMax => &mut self.x_max,
            AxisField::YMin => &mut self.y_min,
            AxisField::YMax => &mut self.y_max,
            AxisField::XTick => &mut self.x_tick,
            AxisField::YTick => &mut self.y_tick,
            AxisField::XLabel => &mut self.x_label,
            AxisField::YLabel => &mut self.y_label,
        }
    }
}

/// UI-specific flags needed for rendering the interface.
#[derive(Debug, Clone)]
pub struct AppDisplayData {
    pub vibration_panel_visible: bool,
    pub playing: bool,
    pub status: Option<Status>,
}

/// Main application state.
struct HapTune {
    session: Session,
    playback: Option<PlaybackHandle>,
    inputs: Inputs,
    display_data: AppDisplayData,
}

impl HapTune {
    fn new(config: &AppConfig) -> Self {
        let session = Session::new(config);
        let inputs = Inputs::from_session(&session);
        Self {
            session,
            playback: None,
            inputs,
            display_data: AppDisplayData {
                vibration_panel_visible: false,
                playing: false,
                status: None,
            },
        }
    }

    fn update(&mut self, message: Message) {
        log::debug!("[UPDATE] Received message: {:?}", message);
        match self.handle(message) {
            Ok(Some(info)) => {
                log::info!("[MAIN] {}", info);
                self.display_data.status = Some(Status::Info(info));
            }
            Ok(None) => {}
            Err(e) => {
                log::error!("[MAIN] {:#}", e);
                self.display_data.status = Some(Status::Error(format!("{e:#}")));
            }
        }
    }

    /// Applies a message, returning a status line for actions worth reporting.
    fn handle(&mut self, message: Message) -> anyhow::Result<Option<String>> {
        match message {
            Message::AddPoint(x, y) => self.session.add_point(ControlPoint::new(x, y)),
            Message::SelectNear(x, y) => {
                self.session.select_near(x, y);
            }
            Message::DragSelected(x, y) => {
                self.session.drag_selected_to(x, y);
            }
            Message::DeleteSelected => {
                if self.session.delete_selected() {
                    return Ok(Some("Point deleted".into()));
                }
            }
            Message::Undo => {
                if !self.session.undo() {
                    return Ok(Some("Nothing to undo".into()));
                }
            }

            Message::LoadPathChanged(path) => self.inputs.load_path = path,
            Message::LoadFile => {
                let path = non_empty_path(&self.inputs.load_path, "file to load")?;
                let count = self
                    .session
                    .load_file(&path)
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                self.inputs.sync_axes(&self.session);
                return Ok(Some(format!("Loaded {count} points from {}", path.display())));
            }
            Message::UnloadAndReset => {
                self.stop_playback();
                self.session.unload_and_reset();
                return Ok(Some("Profile unloaded".into()));
            }
            Message::ResetEditing => {
                self.session.reset_editing();
                return Ok(Some("Edits discarded".into()));
            }

            Message::SmoothingChanged(value) => self.inputs.smoothing = value,
            Message::ApplySmoothing => {
                let factor: f64 = parse_field("Smoothing factor", &self.inputs.smoothing)?;
                if factor < 0.0 {
                    bail!("Smoothing factor must not be negative");
                }
                self.session.smoothing_factor = factor;
                self.session.apply_smoothing();
                return Ok(Some(format!("Smoothing factor {factor} applied")));
            }
            Message::RemoveSmoothing => self.session.remove_smoothing(),
            Message::InterpolationChanged(value) => self.inputs.interpolation = value,
            Message::Interpolate => {
                self.session.interpolation_factor =
                    parse_field("Interpolation factor", &self.inputs.interpolation)?;
                let count = self.session.interpolate().context("Interpolation failed")?;
                return Ok(Some(format!("Interpolated {count} points")));
            }
            Message::RemoveInterpolation => self.session.remove_interpolation(),
            Message::DownsampleChanged(value) => self.inputs.downsample = value,
            Message::Downsample => {
                self.session.downsample_factor = parse_field("Downsample factor", &self.inputs.downsample)?;
                let count = self.session.downsample().context("Downsampling failed")?;
                return Ok(Some(format!("Downsampled to {count} points")));
            }

            Message::AxisFieldChanged(field, value) => *self.inputs.axis_field_mut(field) = value,
            Message::ApplyAxes => {
                self.apply_axes()?;
                return Ok(Some("Axis settings applied".into()));
            }
            Message::AutoAxes => {
                self.session.axes.auto_adjust(self.session.profile.points());
                self.inputs.sync_axes(&self.session);
            }

            Message::SavePathChanged(path) => self.inputs.save_path = path,
            Message::SaveTable => {
                let path = non_empty_path(&self.inputs.save_path, "save path")?;
                let written = self.session.export_table(&path)?;
                let names: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
                return Ok(Some(format!("Saved {}", names.join(", "))));
            }
            Message::SaveBrace => {
                let path = non_empty_path(&self.inputs.save_path, "save path")?;
                self.session.export_brace(&path)?;
                return Ok(Some(format!("Saved {}", path.display())));
            }
            Message::SaveSession => {
                let path = non_empty_path(&self.inputs.save_path, "save path")?.with_extension("json");
                self.session.save_session(&path)?;
                return Ok(Some(format!("Session saved to {}", path.display())));
            }
            Message::LoadSession => {
                let path = non_empty_path(&self.inputs.save_path, "save path")?.with_extension("json");
                self.stop_playback();
                self.session
                    .load_session(&path)
                    .with_context(|| format!("Failed to load session {}", path.display()))?;
                self.inputs.smoothing = self.session.smoothing_factor.to_string();
                self.inputs.sync_axes(&self.session);
                self.inputs.sync_vibration(&self.session);
                return Ok(Some(format!("Session loaded from {}", path.display())));
            }

            Message::ToggleVibrationPanel => {
                self.display_data.vibration_panel_visible = !self.display_data.vibration_panel_visible;
            }
            Message::SamplingRateChanged(value) => self.inputs.sampling_rate = value,
            Message::GlobalAmplitudeChanged(value) => self.inputs.global_amplitude = value,
            Message::ToneEnabled(index, enabled) => {
                if let Some(tone) = self.inputs.tones.get_mut(index) {
                    tone.enabled = enabled;
                }
            }
            Message::ToneFrequencyChanged(index, value) => {
                if let Some(tone) = self.inputs.tones.get_mut(index) {
                    tone.frequency = value;
                }
            }
            Message::ToneAmplitudeChanged(index, value) => {
                if let Some(tone) = self.inputs.tones.get_mut(index) {
                    tone.amplitude = value;
                }
            }
            Message::AddTone => {
                let tone = Tone::default();
                self.session.vibration.add_tone(tone);
                self.inputs.tones.push(ToneInput::from(&tone));
            }
            Message::RemoveTone(index) => {
                if index < self.inputs.tones.len() {
                    self.inputs.tones.remove(index);
                    self.session.vibration.remove_tone(index);
                }
            }
            Message::GenerateVibration => {
                self.apply_vibration_settings()?;
                self.stop_playback();
                let signal = self
                    .session
                    .generate_vibration()
                    .context("Vibration generation failed")?;
                return Ok(Some(format!(
                    "Generated {} samples ({:.3} s)",
                    signal.samples.len(),
                    signal.duration_secs()
                )));
            }
            Message::ClearVibration => {
                self.stop_playback();
                self.session.clear_vibration();
            }
            Message::GenerateEnvelope => {
                self.stop_playback();
                let count = self
                    .session
                    .generate_envelope()
                    .context("Envelope generation failed")?
                    .len();
                return Ok(Some(format!("Envelope generated with {count} points")));
            }
            Message::ClearEnvelope => self.session.clear_envelope(),
            Message::EnvelopeVisible(visible) => self.session.envelope_visible = visible,
            Message::HannWindow(enabled) => {
                self.session.spectrum_window = if enabled { Window::Hann } else { Window::Rectangular };
            }
            Message::VibrationPathChanged(path) => self.inputs.vibration_path = path,
            Message::SaveVibration => {
                let path = non_empty_path(&self.inputs.vibration_path, "vibration path")?;
                self.session
                    .export_vibration_table(&path)
                    .context("No vibration to save")?;
                return Ok(Some(format!("Vibration saved to {}", path.display())));
            }
            Message::ExportWav => {
                let path = non_empty_path(&self.inputs.vibration_path, "vibration path")?.with_extension("wav");
                self.session
                    .export_vibration_wav(&path)
                    .context("No vibration to export")?;
                return Ok(Some(format!("WAV exported to {}", path.display())));
            }
            Message::Play => {
                self.stop_playback();
                let Some(signal) = self.session.signal() else {
                    bail!("Generate a vibration before playing it");
                };
                let handle = playback::play(signal, PLAYBACK_VOLUME)?;
                let rate = handle.device_rate();
                self.playback = Some(handle);
                self.display_data.playing = true;
                return Ok(Some(format!("Playing at {rate} Hz")));
            }
            Message::Stop => self.stop_playback(),

            Message::Tick => {
                if self.playback.as_ref().is_some_and(PlaybackHandle::is_finished) {
                    self.stop_playback();
                    return Ok(Some("Playback finished".into()));
                }
            }
        }
        Ok(None)
    }

    fn apply_axes(&mut self) -> anyhow::Result<()> {
        let inputs = &self.inputs;
        let limits = (
            parse_field("X min", &inputs.x_min)?,
            parse_field("X max", &inputs.x_max)?,
            parse_field("Y min", &inputs.y_min)?,
            parse_field("Y max", &inputs.y_max)?,
        );
        let ticks = (
            parse_field("X tick", &inputs.x_tick)?,
            parse_field("Y tick", &inputs.y_tick)?,
        );

        let mut axes = self.session.axes.clone();
        axes.set_limits(limits.0, limits.1, limits.2, limits.3)?;
        axes.set_ticks(ticks.0, ticks.1)?;
        axes.set_label(Axis::X, &inputs.x_label);
        axes.set_label(Axis::Y, &inputs.y_label);
        self.session.axes = axes;
        Ok(())
    }

    fn apply_vibration_settings(&mut self) -> anyhow::Result<()> {
        let inputs = &self.inputs;
        let rate: u32 = parse_field("Sampling rate", &inputs.sampling_rate)?;
        let amplitude: f64 = parse_field("Global amplitude", &inputs.global_amplitude)?;
        let tones = inputs
            .tones
            .iter()
            .enumerate()
            .map(|(i, input)| {
                let mut tone = Tone::new(
                    parse_field(&format!("Tone {} frequency", i + 1), &input.frequency)?,
                    parse_field(&format!("Tone {} amplitude", i + 1), &input.amplitude)?,
                );
                tone.enabled = input.enabled;
                Ok(tone)
            })
            .collect::<anyhow::Result<Vec<Tone>>>()?;

        let vibration = &mut self.session.vibration;
        vibration.set_sampling_rate(rate);
        vibration.set_global_amplitude(amplitude);
        vibration.tones = tones;
        self.inputs.sync_vibration(&self.session);
        Ok(())
    }

    fn stop_playback(&mut self) {
        if let Some(mut handle) = self.playback.take() {
            handle.stop();
        }
        self.display_data.playing = false;
    }

    fn view(&self) -> Element<'_, Message> {
        create_main_view(&self.session, &self.inputs, &self.display_data)
    }

    fn subscription(&self) -> Subscription<Message> {
        let keys = keyboard::on_key_press(shortcut);
        if self.playback.is_some() {
            Subscription::batch([keys, iced::time::every(PLAYBACK_POLL).map(|_| Message::Tick)])
        } else {
            keys
        }
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Delete removes the selected point; Ctrl+Z undoes the last edit.
fn shortcut(key: keyboard::Key, modifiers: keyboard::Modifiers) -> Option<Message> {
    match key.as_ref() {
        keyboard::Key::Named(keyboard::key::Named::Delete) => Some(Message::DeleteSelected),
        keyboard::Key::Character("z") if modifiers.command() => Some(Message::Undo),
        _ => None,
    }
}

fn parse_field<T>(name: &str, value: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{name} must be a number, got {value:?}"))
}

fn non_empty_path(value: &str, what: &str) -> anyhow::Result<PathBuf> {
    let value = value.trim();
    if value.is_empty() {
        bail!("Enter a {what} first");
    }
    Ok(PathBuf::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> HapTune {
        HapTune::new(&AppConfig::default())
    }

    #[test]
    fn parse_field_reports_the_field_name() {
        assert_eq!(parse_field::<u32>("Rate", " 800 ").unwrap(), 800);
        let err = parse_field::<f64>("X min", "abc").unwrap_err();
        assert!(err.to_string().contains("X min"));
    }

    #[test]
    fn shortcuts() {
        let delete = keyboard::Key::Named(keyboard::key::Named::Delete);
        assert!(matches!(
            shortcut(delete, keyboard::Modifiers::empty()),
            Some(Message::DeleteSelected)
        ));
        let z = keyboard::Key::Character("z".into());
        assert!(matches!(shortcut(z.clone(), keyboard::Modifiers::COMMAND), Some(Message::Undo)));
        assert!(shortcut(z, keyboard::Modifiers::empty()).is_none());
    }

    #[test]
    fn errors_land_in_the_status_line() {
        let mut app = app();
        app.update(Message::SamplingRateChanged("fast".into()));
        app.update(Message::GenerateVibration);
        assert!(matches!(app.display_data.status, Some(Status::Error(_))));
    }

    #[test]
    fn axis_fields_apply_together() {
        let mut app = app();
        app.update(Message::AxisFieldChanged(AxisField::XMax, "50".into()));
        app.update(Message::AxisFieldChanged(AxisField::YLabel, "Force".into()));
        app.update(Message::ApplyAxes);
        assert_eq!(app.session.axes.x_max, 50.0);
        assert_eq!(app.session.axes.y_label, "Force");

        app.update(Message::AxisFieldChanged(AxisField::XMin, "60".into()));
        app.update(Message::ApplyAxes);
        assert!(matches!(app.display_data.status, Some(Status::Error(_))));
        assert_eq!(app.session.axes.x_min, 0.0);
    }

    #[test]
    fn tone_rows_feed_the_synthesiser() {
        let mut app = app();
        app.session.profile.load(vec![ControlPoint::new(0.0, 1.0), ControlPoint::new(100.0, 1.0)]);
        app.update(Message::AddTone);
        app.update(Message::ToneFrequencyChanged(3, "250".into()));
        app.update(Message::ToneEnabled(0, false));
        app.update(Message::GenerateVibration);

        assert!(matches!(app.display_data.status, Some(Status::Info(_))));
        assert_eq!(app.session.vibration.tones.len(), 4);
        assert_eq!(app.session.vibration.tones[3].frequency_hz, 250.0);
        assert!(!app.session.vibration.tones[0].enabled);
        assert!(app.session.signal().is_some());
    }

    #[test]
    fn removing_a_tone_updates_the_settings() {
        let mut app = app();
        app.update(Message::AddTone);
        assert_eq!(app.session.vibration.tones.len(), 4);
        app.update(Message::ToneFrequencyChanged(1, "300".into()));
        app.update(Message::RemoveTone(0));
        assert_eq!(app.inputs.tones.len(), 3);
        assert_eq!(app.session.vibration.tones.len(), 3);
        assert_eq!(app.inputs.tones[0].frequency, "300");

        app.update(Message::RemoveTone(10));
        assert_eq!(app.session.vibration.tones.len(), 3);
    }

    #[test]
    fn hann_checkbox_selects_the_window() {
        let mut app = app();
        app.update(Message::HannWindow(true));
        assert_eq!(app.session.spectrum_window, Window::Hann);
        app.update(Message::HannWindow(false));
        assert_eq!(app.session.spectrum_window, Window::Rectangular);
    }

    #[test]
    fn plot_messages_edit_the_profile() {
        let mut app = app();
        app.update(Message::AddPoint(10.0, 2.0));
        app.update(Message::SelectNear(9.0, 2.0));
        app.update(Message::DragSelected(12.0, 3.0));
        assert_eq!(app.session.profile.points()[1], ControlPoint::new(12.0, 3.0));
        app.update(Message::DeleteSelected);
        assert_eq!(app.session.profile.points().len(), 1);
        app.update(Message::Undo);
        assert_eq!(app.session.profile.points().len(), 2);
    }
}
