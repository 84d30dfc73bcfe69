//! # Session Module
//!
//! The complete editing state behind the GUI: the profile being edited,
//! axis settings, vibration settings and the most recently computed
//! vibration or envelope preview. All user actions go through here so the
//! GUI only translates events and renders state.

use std::path::{Path, PathBuf};

use crate::axes::AxisSettings;
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::io::{self, session::SessionFile};
use crate::profile::Profile;
use crate::spectrum::{self, Spectrum, Window};
use crate::vibration::{self, VibrationSettings, VibrationSignal};
use crate::ControlPoint;

#[derive(Debug, Clone)]
pub struct Session {
    pub profile: Profile,
    pub axes: AxisSettings,
    pub vibration: VibrationSettings,
    pub envelope_visible: bool,
    pub spectrum_window: Window,
    pub smoothing_factor: f64,
    pub interpolation_factor: u32,
    pub downsample_factor: u32,
    signal: Option<VibrationSignal>,
    envelope: Option<Vec<ControlPoint>>,
    loaded_file: Option<PathBuf>,
    selected: Option<ControlPoint>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl Session {
    /// A blank session using the factors and settings from `config`.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            profile: Profile::new(),
            axes: config.axes.clone(),
            vibration: config.vibration.clone(),
            envelope_visible: config.envelope_visible,
            spectrum_window: Window::default(),
            smoothing_factor: config.smoothing_factor,
            interpolation_factor: config.interpolation_factor,
            downsample_factor: config.downsample_factor,
            signal: None,
            envelope: None,
            loaded_file: None,
            selected: None,
        }
    }

    /// The last generated vibration, if any.
    pub fn signal(&self) -> Option<&VibrationSignal> {
        self.signal.as_ref()
    }

    /// The envelope-only preview, if one was generated.
    pub fn envelope(&self) -> Option<&[ControlPoint]> {
        self.envelope.as_deref()
    }

    /// Path of the loaded profile or session file.
    pub fn loaded_file(&self) -> Option<&Path> {
        self.loaded_file.as_deref()
    }

    pub fn selected(&self) -> Option<ControlPoint> {
        self.selected
    }

    /// Label shown next to the load controls.
    pub fn loaded_file_label(&self) -> String {
        match self.loaded_file.as_deref().and_then(Path::file_name) {
            Some(name) => format!("Loaded file: {}", name.to_string_lossy()),
            None => "No file loaded".to_string(),
        }
    }

    /// Adds a control point and discards the envelope preview.
    pub fn add_point(&mut self, point: ControlPoint) {
        self.profile.add_point(point);
        self.clear_envelope();
    }

    /// Selects the control point nearest to `(x, y)`.
    pub fn select_near(&mut self, x: f64, y: f64) -> Option<ControlPoint> {
        self.selected = self.profile.find_closest(x, y);
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Moves the selected point to `(x, y)`, keeping it selected.
    pub fn drag_selected_to(&mut self, x: f64, y: f64) -> bool {
        let Some(old) = self.selected else {
            return false;
        };
        let new = ControlPoint::new(x, y);
        if !self.profile.move_point(old, new) {
            self.selected = None;
            return false;
        }
        self.selected = Some(new);
        self.clear_envelope();
        true
    }

    /// Deletes the selected point.
    ///
    /// # Returns
    /// * `bool` - Whether a point was removed; the selection is cleared either way
    pub fn delete_selected(&mut self) -> bool {
        let Some(point) = self.selected.take() else {
            return false;
        };
        let deleted = self.profile.delete_point(point);
        if deleted {
            self.clear_envelope();
        }
        deleted
    }

    /// Restores the previous point set and clears the selection.
    pub fn undo(&mut self) -> bool {
        self.selected = None;
        let undone = self.profile.undo();
        if undone {
            self.clear_envelope();
        }
        undone
    }

    /// Loads a profile file in either supported layout.
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let points = io::load_profile(path)?;
        let count = points.len();
        self.profile.load(points);
        self.axes.auto_adjust(self.profile.points());
        self.loaded_file = Some(path.to_path_buf());
        self.selected = None;
        self.signal = None;
        self.envelope = None;
        log::info!("[SESSION] Loaded {} points from {}", count, path.display());
        Ok(count)
    }

    /// Returns to the loaded points, dropping edits and derived data.
    pub fn reset_editing(&mut self) {
        self.profile.reset();
        self.profile.clear_interpolation();
        self.selected = None;
        self.signal = None;
        self.envelope = None;
    }

    /// Forgets the loaded file and starts from a blank profile.
    pub fn unload_and_reset(&mut self) {
        self.profile.clear();
        self.loaded_file = None;
        self.selected = None;
        self.signal = None;
        self.envelope = None;
        log::info!("[SESSION] Profile unloaded");
    }

    /// Applies `smoothing_factor` to the profile curve.
    pub fn apply_smoothing(&mut self) {
        self.profile.set_smoothing(self.smoothing_factor);
        self.clear_envelope();
    }

    pub fn remove_smoothing(&mut self) {
        self.profile.set_smoothing(0.0);
        self.clear_envelope();
    }

    /// Resamples the profile at the configured interpolation factor.
    pub fn interpolate(&mut self) -> Result<usize> {
        let count = self.profile.interpolate(self.interpolation_factor as f64)?.len();
        self.clear_envelope();
        Ok(count)
    }

    pub fn remove_interpolation(&mut self) {
        self.profile.clear_interpolation();
        self.clear_envelope();
    }

    /// Downsamples the loaded points by the configured factor.
    pub fn downsample(&mut self) -> Result<usize> {
        self.profile.downsample(self.downsample_factor as usize)?;
        self.selected = None;
        self.clear_envelope();
        Ok(self.profile.points().len())
    }

    /// Synthesises a vibration from the current base points.
    pub fn generate_vibration(&mut self) -> Result<&VibrationSignal> {
        let signal = vibration::synthesize(self.profile.base_points(), &self.vibration)?;
        self.envelope = None;
        let stored = self.signal.insert(signal);
        Ok(&*stored)
    }

    /// Discards the generated vibration.
    pub fn clear_vibration(&mut self) {
        self.signal = None;
    }

    /// Computes an envelope preview without any carrier.
    pub fn generate_envelope(&mut self) -> Result<&[ControlPoint]> {
        let envelope = vibration::envelope_only(self.profile.base_points())?;
        self.signal = None;
        let stored = self.envelope.insert(envelope);
        Ok(stored.as_slice())
    }

    pub fn clear_envelope(&mut self) {
        self.envelope = None;
    }

    /// Magnitude spectrum of the current vibration under `spectrum_window`.
    pub fn spectrum(&self) -> Option<Spectrum> {
        self.signal
            .as_ref()
            .map(|s| spectrum::dft_windowed(&s.amplitudes(), s.sampling_rate, self.spectrum_window))
    }

    /// Envelope curves to draw: the preview envelope, or the envelope of the
    /// current vibration. Empty when hidden.
    pub fn visible_envelope(&self) -> Option<&[ControlPoint]> {
        if !self.envelope_visible {
            return None;
        }
        self.envelope
            .as_deref()
            .or_else(|| self.signal.as_ref().map(|s| s.envelope.as_slice()))
    }

    /// Writes `<stem>_original.csv` and, if present, `<stem>_interpolated.csv`.
    pub fn export_table(&self, base: &Path) -> Result<Vec<PathBuf>> {
        io::table::export_profile(base, &self.profile)
    }

    /// Writes the base points in the brace layout.
    pub fn export_brace(&self, path: &Path) -> Result<()> {
        io::brace::write(path, self.profile.base_points())
    }

    /// Writes the vibration as a `Sample,Amplitude` CSV table.
    ///
    /// # Errors
    /// * `NoVibration` - nothing has been generated yet
    pub fn export_vibration_table(&self, path: &Path) -> Result<()> {
        io::table::export_vibration(path, self.require_signal()?)
    }

    /// Writes the vibration as a peak-normalised float WAV file.
    ///
    /// # Errors
    /// * `NoVibration` - nothing has been generated yet
    pub fn export_vibration_wav(&self, path: &Path) -> Result<()> {
        io::wav::export(path, self.require_signal()?, true)
    }

    /// Saves the profile, axes and vibration settings as JSON.
    ///
    /// # Arguments
    /// * `path` - Destination file
    ///
    /// # Errors
    /// * `Io` or `Json` - the file cannot be written
    pub fn save_session(&self, path: &Path) -> Result<()> {
        let file = SessionFile {
            version: io::session::SESSION_VERSION,
            profile: self.profile.clone(),
            axes: self.axes.clone(),
            vibration: self.vibration.clone(),
        };
        io::session::save(path, &file)
    }

    /// Restores a session saved by [`save_session`](Self::save_session).
    ///
    /// Generated vibrations and previews are not part of a session and are
    /// cleared. The smoothing factor is taken from the restored profile.
    ///
    /// # Errors
    /// * `Io` or `Json` - the file cannot be read or parsed; the session is left unchanged
    pub fn load_session(&mut self, path: &Path) -> Result<()> {
        let file = io::session::load(path)?;
        self.profile = file.profile;
        self.axes = file.axes;
        self.vibration = file.vibration;
        self.smoothing_factor = self.profile.smoothing();
        self.loaded_file = Some(path.to_path_buf());
        self.selected = None;
        self.signal = None;
        self.envelope = None;
        log::info!("[SESSION] Restored session from {}", path.display());
        Ok(())
    }

    fn require_signal(&self) -> Result<&VibrationSignal> {
        self.signal.as_ref().ok_or(Error::NoVibration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> ControlPoint {
        ControlPoint::new(x, y)
    }

    fn session_with(points: Vec<ControlPoint>) -> Session {
        let mut session = Session::default();
        session.profile.load(points);
        session
    }

    #[test]
    fn starts_from_config() {
        let config = AppConfig {
            downsample_factor: 4,
            envelope_visible: false,
            ..AppConfig::default()
        };
        let session = Session::new(&config);
        assert_eq!(session.downsample_factor, 4);
        assert!(!session.envelope_visible);
        assert_eq!(session.profile.points(), &[ControlPoint::ORIGIN]);
        assert_eq!(session.loaded_file_label(), "No file loaded");
    }

    #[test]
    fn select_drag_and_delete() {
        let mut session = session_with(vec![p(0.0, 0.0), p(10.0, 5.0)]);
        assert_eq!(session.select_near(9.0, 4.0), Some(p(10.0, 5.0)));
        assert!(session.drag_selected_to(8.0, 2.0));
        assert_eq!(session.selected(), Some(p(8.0, 2.0)));
        assert_eq!(session.profile.points(), &[p(0.0, 0.0), p(8.0, 2.0)]);

        assert!(session.delete_selected());
        assert_eq!(session.selected(), None);
        assert_eq!(session.profile.points(), &[p(0.0, 0.0)]);
        assert!(!session.delete_selected());

        assert!(session.undo());
        assert!(session.undo());
        assert_eq!(session.profile.points(), &[p(0.0, 0.0), p(10.0, 5.0)]);
    }

    #[test]
    fn edits_clear_the_envelope_preview() {
        let mut session = session_with(vec![p(0.0, 0.0), p(50.0, 2.0), p(100.0, 0.0)]);
        session.generate_envelope().unwrap();
        assert!(session.envelope().is_some());
        session.add_point(p(75.0, 1.0));
        assert!(session.envelope().is_none());
    }

    #[test]
    fn vibration_and_spectrum() {
        let mut session = session_with(vec![p(0.0, 1.0), p(1000.0, 1.0)]);
        assert!(session.spectrum().is_none());
        let len = session.generate_vibration().unwrap().samples.len();
        assert_eq!(len, 1000);

        let spectrum = session.spectrum().unwrap();
        let (freq, _) = spectrum.peak().unwrap();
        assert!((freq - 100.0).abs() < 1.5, "peak at {freq}");
        assert!(session.visible_envelope().is_some());

        session.envelope_visible = false;
        assert!(session.visible_envelope().is_none());

        session.clear_vibration();
        assert!(session.signal().is_none());
        let err = session.export_vibration_wav(Path::new("unused.wav")).unwrap_err();
        assert!(matches!(err, Error::NoVibration));
        assert_eq!(err.to_string(), "No vibration generated");
    }

    #[test]
    fn spectrum_follows_the_selected_window() {
        let mut session = session_with(vec![p(0.0, 1.0), p(1000.0, 1.0)]);
        session.generate_vibration().unwrap();
        let plain = session.spectrum().unwrap();
        session.spectrum_window = Window::Hann;
        let windowed = session.spectrum().unwrap();
        assert_eq!(plain.len(), windowed.len());
        assert!(windowed.max_magnitude() < plain.max_magnitude());
    }

    #[test]
    fn envelope_and_vibration_are_exclusive() {
        let mut session = session_with(vec![p(0.0, 1.0), p(100.0, 1.0)]);
        session.generate_vibration().unwrap();
        session.generate_envelope().unwrap();
        assert!(session.signal().is_none());
        session.generate_vibration().unwrap();
        assert!(session.envelope().is_none());
    }

    #[test]
    fn factors_drive_processing() {
        let points: Vec<ControlPoint> = (0..10).map(|i| p(i as f64, (i % 3) as f64)).collect();
        let mut session = session_with(points);
        session.interpolation_factor = 2;
        assert_eq!(session.interpolate().unwrap(), 18);
        session.remove_interpolation();
        assert!(session.profile.interpolated().is_none());

        session.downsample_factor = 5;
        assert_eq!(session.downsample().unwrap(), 2);

        session.smoothing_factor = 1.5;
        session.apply_smoothing();
        assert_eq!(session.profile.smoothing(), 1.5);
        session.remove_smoothing();
        assert_eq!(session.profile.smoothing(), 0.0);
    }

    #[test]
    fn reset_and_unload() {
        let mut session = session_with(vec![p(0.0, 0.0), p(5.0, 5.0)]);
        session.add_point(p(2.0, 9.0));
        session.reset_editing();
        assert_eq!(session.profile.points().len(), 2);

        session.unload_and_reset();
        assert_eq!(session.profile.points(), &[ControlPoint::ORIGIN]);
        assert!(session.loaded_file().is_none());
    }
}
