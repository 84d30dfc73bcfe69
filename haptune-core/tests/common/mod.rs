use std::fs;
use std::path::PathBuf;

use haptune_core::ControlPoint;
use tempfile::TempDir;

/// A profile shaped like a smooth bump, sampled once per x unit.
pub fn bump(n: usize, height: f64) -> Vec<ControlPoint> {
    let span = (n - 1) as f64;
    (0..n)
        .map(|i| {
            let x = i as f64;
            ControlPoint::new(x, height * (std::f64::consts::PI * x / span).sin())
        })
        .collect()
}

/// Writes `contents` to `name` inside a fresh temporary directory.
pub fn write_fixture(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    (dir, path)
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}
