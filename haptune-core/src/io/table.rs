//! Two-column CSV tables of `(sample, amplitude)` rows.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use super::format_value;
use crate::error::{Error, Result};
use crate::profile::Profile;
use crate::vibration::VibrationSignal;
use crate::ControlPoint;

pub const PROFILE_HEADER: [&str; 2] = ["sample", "amplitude"];
pub const VIBRATION_HEADER: [&str; 2] = ["Sample", "Amplitude"];

/// Reads points from the first two columns of a CSV table.
///
/// A leading row whose first two cells are not numbers is treated as a header.
///
/// # Errors
/// * `Parse` - a row has fewer than two columns or a non-numeric cell
pub fn read_points<R: Read>(reader: R) -> Result<Vec<ControlPoint>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let line = index + 1;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        if record.len() < 2 {
            return Err(Error::Parse {
                line,
                message: "table must contain at least two columns (sample, amplitude)".into(),
            });
        }

        let x = record[0].parse::<f64>();
        let y = record[1].parse::<f64>();
        match (x, y) {
            (Ok(x), Ok(y)) => points.push(ControlPoint::new(x, y)),
            _ if index == 0 => continue,
            (Err(e), _) | (_, Err(e)) => {
                return Err(Error::Parse {
                    line,
                    message: e.to_string(),
                })
            }
        }
    }
    Ok(points)
}

/// Writes points under `header`, values rounded to two decimals.
pub fn write_points<W: Write>(writer: W, header: [&str; 2], points: &[ControlPoint]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(header)?;
    for point in points {
        csv_writer.write_record([format_value(point.x), format_value(point.y)])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Reads a two-column table from `path`.
///
/// # Arguments
/// * `path` - CSV file to read
///
/// # Returns
/// * `Vec<ControlPoint>` - Rows in file order
///
/// # Errors
/// * `Io` - the file cannot be opened
/// * `Parse` - see [`read_points`]
pub fn read(path: &Path) -> Result<Vec<ControlPoint>> {
    read_points(std::fs::File::open(path)?)
}

/// Writes `points` under `header` to `path`, replacing any existing file.
pub fn write(path: &Path, header: [&str; 2], points: &[ControlPoint]) -> Result<()> {
    write_points(std::fs::File::create(path)?, header, points)?;
    log::info!("[IO] Saved {} rows to {}", points.len(), path.display());
    Ok(())
}

/// Exports a profile next to `base`.
///
/// Writes `<stem>_original.csv` with the control points and, when the profile
/// has been interpolated, `<stem>_interpolated.csv`. Returns the written paths.
pub fn export_profile(base: &Path, profile: &Profile) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if let Some(points) = profile.interpolated().filter(|p| !p.is_empty()) {
        let path = sibling(base, "interpolated");
        write(&path, PROFILE_HEADER, points)?;
        written.push(path);
    } else {
        log::debug!("[IO] No interpolated data found, skipping that table");
    }

    let path = sibling(base, "original");
    write(&path, PROFILE_HEADER, profile.points())?;
    written.push(path);

    Ok(written)
}

/// Saves a vibration waveform as a `Sample,Amplitude` table.
pub fn export_vibration(path: &Path, signal: &VibrationSignal) -> Result<()> {
    write(path, VIBRATION_HEADER, &signal.samples)
}

fn sibling(base: &Path, suffix: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "profile".to_string());
    base.with_file_name(format!("{stem}_{suffix}.csv"))
}
