//! JSON session files.
//!
//! A session file captures the profile (current and original points,
//! interpolation and smoothing), the axis settings and the vibration
//! settings, so that a design can be reopened later exactly as it was left.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::axes::AxisSettings;
use crate::error::Result;
use crate::profile::Profile;
use crate::vibration::VibrationSettings;

/// Format version written into new session files.
pub const SESSION_VERSION: u32 = 1;

/// Serialisable snapshot of an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionFile {
    pub version: u32,
    pub profile: Profile,
    #[serde(default)]
    pub axes: AxisSettings,
    #[serde(default)]
    pub vibration: VibrationSettings,
}

/// Saves the session snapshot as pretty-printed JSON.
pub fn save(path: &Path, session: &SessionFile) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, session)?;
    writer.flush()?;
    log::info!("[IO] Session saved to {}", path.display());
    Ok(())
}

/// Loads a session snapshot saved by [`save`].
pub fn load(path: &Path) -> Result<SessionFile> {
    let reader = BufReader::new(File::open(path)?);
    let session: SessionFile = serde_json::from_reader(reader)?;
    if session.version > SESSION_VERSION {
        log::warn!(
            "[IO] Session {} has newer version {} (supported: {})",
            path.display(),
            session.version,
            SESSION_VERSION
        );
    }
    Ok(session)
}
