//! # File I/O
//!
//! Loading and exporting profiles and vibration signals.
//!
//! - [`brace`]: the two-line `angle [] = {..}` / `amplitude [] = {..}` format
//! - [`table`]: two-column CSV tables
//! - [`wav`]: mono float WAV export of vibrations
//! - [`session`]: JSON snapshots of a whole editing session

pub mod brace;
pub mod session;
pub mod table;
pub mod wav;

use std::path::Path;

use crate::error::{Error, Result};
use crate::ControlPoint;

/// On-disk layouts a profile can be loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileFormat {
    Brace,
    Table,
}

/// Guesses the layout of a profile file from its first line.
///
/// Brace files start with `name [] = ...`, braces optional; anything else is
/// treated as a table.
///
/// # Arguments
/// * `first_line` - First line of the file
pub fn detect_format(first_line: &str) -> ProfileFormat {
    if first_line.contains('=') {
        ProfileFormat::Brace
    } else {
        ProfileFormat::Table
    }
}

/// Loads profile points from either supported layout.
///
/// # Returns
/// * `Vec<ControlPoint>` - The points in file order, never empty
///
/// # Errors
/// * `Io` - the file cannot be read
/// * `Parse` - the contents are malformed or hold no points
pub fn load_profile(path: &Path) -> Result<Vec<ControlPoint>> {
    let text = std::fs::read_to_string(path)?;
    let first_line = text.lines().next().unwrap_or_default();
    let points = match detect_format(first_line) {
        ProfileFormat::Brace => brace::parse(&text)?,
        ProfileFormat::Table => table::read_points(text.as_bytes())?,
    };
    if points.is_empty() {
        return Err(Error::Parse {
            line: 1,
            message: "file contains no data points".into(),
        });
    }
    log::info!("[IO] Loaded {} points from {}", points.len(), path.display());
    Ok(points)
}

/// Formats a value rounded to two decimals, always with a fractional part.
pub(crate) fn format_value(value: f64) -> String {
    let rounded = crate::round2(value);
    // avoid printing "-0.0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    if rounded.fract() == 0.0 {
        format!("{rounded:.1}")
    } else {
        format!("{rounded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_keep_a_fraction() {
        assert_eq!(format_value(1.0), "1.0");
        assert_eq!(format_value(2.346), "2.35");
        assert_eq!(format_value(-0.001), "0.0");
        assert_eq!(format_value(-3.1), "-3.1");
    }

    #[test]
    fn header_only_table_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "sample,amplitude\n").unwrap();
        let err = load_profile(&path).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn format_detection() {
        assert_eq!(detect_format("angle [] = {1.0, 2.0}"), ProfileFormat::Brace);
        assert_eq!(detect_format("angle [] = 1.0, 2.0"), ProfileFormat::Brace);
        assert_eq!(detect_format("sample,amplitude"), ProfileFormat::Table);
        assert_eq!(detect_format("0.0,1.0"), ProfileFormat::Table);
    }
}
