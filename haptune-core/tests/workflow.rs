mod common;

use std::fs;

use common::{assert_close, bump, write_fixture};
use haptune_core::io::{self, brace, table};
use haptune_core::session::Session;
use haptune_core::ControlPoint;

#[test]
fn brace_file_loads_and_adjusts_axes() {
    let (_dir, path) = write_fixture(
        "profile.csv",
        "angle [] = {0.0, 100.0, 200.0, 300.0}\namplitude [] = {0.0, 4.0, -2.0, 0.0}\n",
    );

    let mut session = Session::default();
    assert_eq!(session.load_file(&path).unwrap(), 4);
    assert_eq!(session.loaded_file_label(), "Loaded file: profile.csv");
    assert_eq!(session.profile.original_points().len(), 4);

    let range = session.axes.display_range();
    assert!(range.x_min < 0.0 && range.x_max > 300.0);
    assert!(range.y_min < -2.0 && range.y_max > 4.0);
}

#[test]
fn table_file_loads_with_header() {
    let (_dir, path) = write_fixture("table.csv", "sample,amplitude\n0,0\n10,1.5\n20,0\n");
    let mut session = Session::default();
    session.load_file(&path).unwrap();
    assert_eq!(
        session.profile.points(),
        &[
            ControlPoint::new(0.0, 0.0),
            ControlPoint::new(10.0, 1.5),
            ControlPoint::new(20.0, 0.0)
        ]
    );
}

#[test]
fn brace_file_without_braces_loads() {
    let (_dir, path) = write_fixture(
        "plain.csv",
        "angle [] = 0.0, 1.0, 2.0\namplitude [] = 1.0, 2.0, 3.0\n",
    );
    let mut session = Session::default();
    assert_eq!(session.load_file(&path).unwrap(), 3);
    assert_eq!(session.profile.points()[2], ControlPoint::new(2.0, 3.0));
}

#[test]
fn empty_brace_file_is_rejected() {
    let (_dir, path) = write_fixture("empty.csv", "angle [] = {}\namplitude [] = {}\n");
    let mut session = Session::default();
    assert!(session.load_file(&path).is_err());
    assert_eq!(session.profile.points(), &[ControlPoint::ORIGIN]);
    assert!(session.loaded_file().is_none());
}

#[test]
fn malformed_files_leave_the_session_untouched() {
    let (_dir, path) = write_fixture("bad.csv", "angle [] = {0.0, 1.0}\n");
    let mut session = Session::default();
    session.add_point(ControlPoint::new(3.0, 3.0));
    assert!(session.load_file(&path).is_err());
    assert_eq!(session.profile.points().len(), 2);
    assert!(session.loaded_file().is_none());
}

#[test]
fn interpolated_profile_exports_both_tables() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::default();
    session.profile.load(bump(11, 2.0));
    session.interpolation_factor = 3;
    assert_eq!(session.interpolate().unwrap(), 30);

    let written = session.export_table(&dir.path().join("design.csv")).unwrap();
    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["design_interpolated.csv", "design_original.csv"]);

    let interpolated = table::read(&written[0]).unwrap();
    assert_eq!(interpolated.len(), 30);
    let original = table::read(&written[1]).unwrap();
    assert_eq!(original.len(), 11);
    assert_close(original[5].y, 2.0, 0.005);
}

#[test]
fn brace_export_round_trips_rounded_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.csv");
    let mut session = Session::default();
    session.profile.load(vec![
        ControlPoint::new(0.0, 0.0),
        ControlPoint::new(1.234, 5.678),
        ControlPoint::new(2.0, -1.0),
    ]);
    session.export_brace(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("angle [] = {0.0, 1.23, 2.0}"));
    let points = brace::read(&path).unwrap();
    assert_eq!(points[1], ControlPoint::new(1.23, 5.68));
    assert_eq!(io::load_profile(&path).unwrap(), points);
}

#[test]
fn vibration_exports_table_and_wav() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::default();
    session.profile.load(vec![ControlPoint::new(0.0, 1.0), ControlPoint::new(500.0, 1.0)]);
    session.vibration.set_sampling_rate(2000);
    let samples = session.generate_vibration().unwrap().samples.len();
    assert_eq!(samples, 1000);

    let csv_path = dir.path().join("vibration.csv");
    session.export_vibration_table(&csv_path).unwrap();
    let text = fs::read_to_string(&csv_path).unwrap();
    assert!(text.starts_with("Sample,Amplitude\n"));
    assert_eq!(table::read(&csv_path).unwrap().len(), 1000);

    let wav_path = dir.path().join("vibration.wav");
    session.export_vibration_wav(&wav_path).unwrap();
    let reader = hound::WavReader::open(&wav_path).unwrap();
    assert_eq!(reader.spec().sample_rate, 2000);
    assert_eq!(reader.len(), 1000);
}

#[test]
fn session_files_restore_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("design.json");

    let mut session = Session::default();
    session.profile.load(bump(8, 1.0));
    session.add_point(ControlPoint::new(3.5, 4.0));
    session.smoothing_factor = 0.5;
    session.apply_smoothing();
    session.vibration.set_sampling_rate(4000);
    session.axes.set_limits(-1.0, 10.0, -5.0, 5.0).unwrap();
    session.save_session(&path).unwrap();

    let mut restored = Session::default();
    restored.load_session(&path).unwrap();
    assert_eq!(restored.profile.points().len(), 9);
    assert!(restored.profile.points().contains(&ControlPoint::new(3.5, 4.0)));
    assert_eq!(restored.profile.original_points().len(), 8);
    assert_eq!(restored.smoothing_factor, 0.5);
    assert_eq!(restored.vibration.sampling_rate, 4000);
    assert_eq!(restored.axes, session.axes);
    assert!(!restored.profile.can_undo());
}
