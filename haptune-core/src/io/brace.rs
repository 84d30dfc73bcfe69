//! Brace-delimited profile files.
//!
//! ```text
//! angle [] = {0.0, 1.5, 2.0}
//! amplitude [] = {0.0, 3.25, -1.0}
//! ```
//!
//! The first line holds the sample positions and the second the amplitudes.
//! Values are written rounded to two decimals.

use std::fs;
use std::path::Path;

use super::format_value;
use crate::error::{Error, Result};
use crate::ControlPoint;

pub const POSITION_NAME: &str = "angle";
pub const AMPLITUDE_NAME: &str = "amplitude";

/// Renders points in the brace layout.
pub fn render(points: &[ControlPoint]) -> String {
    let join = |values: Vec<String>| values.join(", ");
    let positions = join(points.iter().map(|p| format_value(p.x)).collect());
    let amplitudes = join(points.iter().map(|p| format_value(p.y)).collect());
    format!("{POSITION_NAME} [] = {{{positions}}}\n{AMPLITUDE_NAME} [] = {{{amplitudes}}}\n")
}

/// Parses the brace layout. Braces around the values are optional.
///
/// # Errors
/// * `Parse` - fewer than two lines, an empty or unparsable value, or lines of different lengths
pub fn parse(text: &str) -> Result<Vec<ControlPoint>> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let positions = match lines.next() {
        Some(line) => parse_line(line, 1)?,
        None => return Err(parse_error(1, "missing position line")),
    };
    let amplitudes = match lines.next() {
        Some(line) => parse_line(line, 2)?,
        None => return Err(parse_error(2, "missing amplitude line")),
    };

    if positions.len() != amplitudes.len() {
        return Err(parse_error(
            2,
            format!(
                "{} positions but {} amplitudes",
                positions.len(),
                amplitudes.len()
            ),
        ));
    }

    Ok(positions
        .into_iter()
        .zip(amplitudes)
        .map(|(x, y)| ControlPoint::new(x, y))
        .collect())
}

/// Writes `points` to `path` in the brace layout, replacing any existing file.
pub fn write(path: &Path, points: &[ControlPoint]) -> Result<()> {
    fs::write(path, render(points))?;
    log::info!("[IO] Saved {} points to {}", points.len(), path.display());
    Ok(())
}

/// Reads a brace-layout file. See [`parse`] for the accepted syntax.
pub fn read(path: &Path) -> Result<Vec<ControlPoint>> {
    parse(&fs::read_to_string(path)?)
}

fn parse_line(line: &str, number: usize) -> Result<Vec<f64>> {
    let body = line.rsplit('=').next().unwrap_or(line);
    let body = body.trim().trim_start_matches('{').trim_end_matches('}');
    body.split(',')
        .map(|value| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|e| parse_error(number, format!("'{}': {}", value.trim(), e)))
        })
        .collect()
}

fn parse_error(line: usize, message: impl Into<String>) -> Error {
    Error::Parse {
        line,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_rounded_values() {
        let text = render(&[ControlPoint::new(0.0, 1.234), ControlPoint::new(10.5, -2.0)]);
        assert_eq!(text, "angle [] = {0.0, 10.5}\namplitude [] = {1.23, -2.0}\n");
    }

    #[test]
    fn parses_saved_layout() {
        let points = parse("angle [] = {0.0, 1.5, 2}\namplitude [] = {0.0, 3.25, -1.0}\n").unwrap();
        assert_eq!(
            points,
            vec![
                ControlPoint::new(0.0, 0.0),
                ControlPoint::new(1.5, 3.25),
                ControlPoint::new(2.0, -1.0),
            ]
        );
    }

    #[test]
    fn tolerates_missing_braces_and_spacing() {
        let points = parse("x=1,2\ny =3 , 4").unwrap();
        assert_eq!(points, vec![ControlPoint::new(1.0, 3.0), ControlPoint::new(2.0, 4.0)]);
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = parse("angle [] = {1.0, abc}\namplitude [] = {1.0, 2.0}").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn rejects_empty_value_lists() {
        let err = parse("angle [] = {}\namplitude [] = {}\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let err = parse("angle [] = {1.0, 2.0}\namplitude [] = {1.0}").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn rejects_single_line() {
        let err = parse("angle [] = {1.0}").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }
}
