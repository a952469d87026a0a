use scd41_viz::{plot_sensor_data, Error, Outcome, ParseError};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HEADER: &str = "timestamp,Avg_CO2_ppm,Avg_Temp_C,Avg_Humidity_RH\n";

fn setup(csv: Option<&str>) -> (TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let csvin = dir.path().join("sensor_log.csv");
    let pngout = dir.path().join("sensor_plot.png");
    if let Some(content) = csv {
        fs::write(&csvin, content).unwrap();
    }
    (dir, csvin, pngout)
}

fn png_size(p: &Path) -> u64 {
    fs::metadata(p).map(|m| m.len()).unwrap_or(0)
}

#[test]
fn two_rows_are_plotted() {
    let csv = format!(
        "{}2024-01-01 00:00,450,21.5,40\n2024-01-01 00:05,452,21.6,41\n",
        HEADER
    );
    let (_dir, csvin, pngout) = setup(Some(&csv));
    match plot_sensor_data(&csvin, &pngout).unwrap() {
        Outcome::Saved { rows, path } => {
            assert_eq!(rows, 2);
            assert_eq!(path, pngout);
        }
        Outcome::Aborted(e) => panic!("aborted: {}", e),
    }
    assert!(png_size(&pngout) > 0);
    let bytes = fs::read(&pngout).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}

#[test]
fn second_run_replaces_the_image() {
    let csv = format!(
        "{}2024-01-01 00:00,450,21.5,40\n2024-01-01 00:05,452,21.6,41\n2024-01-01 00:10,460,21.4,43\n",
        HEADER
    );
    let (_dir, csvin, pngout) = setup(Some(&csv));
    fs::write(&pngout, b"stale").unwrap();
    for _ in 0..2 {
        match plot_sensor_data(&csvin, &pngout).unwrap() {
            Outcome::Saved { rows, .. } => assert_eq!(rows, 3),
            Outcome::Aborted(e) => panic!("aborted: {}", e),
        }
        assert!(png_size(&pngout) > 5);
    }
}

#[test]
fn single_row_and_missing_readings_still_plot() {
    let csv = format!("{}2024-01-01 00:00,450,,40\n", HEADER);
    let (_dir, csvin, pngout) = setup(Some(&csv));
    match plot_sensor_data(&csvin, &pngout).unwrap() {
        Outcome::Saved { rows, .. } => assert_eq!(rows, 1),
        Outcome::Aborted(e) => panic!("aborted: {}", e),
    }
    assert!(png_size(&pngout) > 0);
}

#[test]
fn gap_in_the_middle_of_a_channel() {
    let csv = format!(
        "{}2024-01-01 00:00,450,21.5,40\n2024-01-01 00:05,,21.6,41\n2024-01-01 00:10,455,21.7,42\n",
        HEADER
    );
    let (_dir, csvin, pngout) = setup(Some(&csv));
    assert!(matches!(
        plot_sensor_data(&csvin, &pngout).unwrap(),
        Outcome::Saved { rows: 3, .. }
    ));
}

#[test]
fn missing_file_is_reported() {
    let (_dir, csvin, pngout) = setup(None);
    match plot_sensor_data(&csvin, &pngout).unwrap() {
        Outcome::Aborted(Error::InputNotFound(p)) => assert_eq!(p, csvin),
        other => panic!("unexpected {:?}", other),
    }
    assert!(!pngout.exists());
}

#[test]
fn header_only_is_reported_as_empty() {
    let (_dir, csvin, pngout) = setup(Some(HEADER));
    match plot_sensor_data(&csvin, &pngout).unwrap() {
        Outcome::Aborted(e) => {
            assert!(matches!(e, Error::EmptyInput));
            assert_eq!(e.to_string(), "The CSV file is empty. No data to plot.");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(!pngout.exists());
}

#[test]
fn header_only_with_fewer_columns_is_reported_as_empty() {
    let (_dir, csvin, pngout) = setup(Some("timestamp,Avg_CO2_ppm\n"));
    assert!(matches!(
        plot_sensor_data(&csvin, &pngout),
        Ok(Outcome::Aborted(Error::EmptyInput))
    ));
    assert!(!pngout.exists());
}

#[test]
fn non_numeric_value_is_reported() {
    let csv = format!("{}2024-01-01 00:00,high,21.5,40\n", HEADER);
    let (_dir, csvin, pngout) = setup(Some(&csv));
    match plot_sensor_data(&csvin, &pngout).unwrap() {
        Outcome::Aborted(e @ Error::InputParse(ParseError::Value { .. })) => {
            let msg = e.to_string();
            assert!(msg.starts_with("An error occurred while reading the CSV file:"));
            assert!(msg.contains("'high'"));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(!pngout.exists());
}

#[test]
fn bad_date_is_reported() {
    let csv = format!("{}31.02.2024 25:00,450,21.5,40\n", HEADER);
    let (_dir, csvin, pngout) = setup(Some(&csv));
    assert!(matches!(
        plot_sensor_data(&csvin, &pngout).unwrap(),
        Outcome::Aborted(Error::InputParse(ParseError::Timestamp { line: 2, .. }))
    ));
    assert!(!pngout.exists());
}

#[test]
fn bad_input_keeps_an_older_image() {
    let csv = format!("{}2024-01-01 00:00,450,21.5\n", HEADER);
    let (_dir, csvin, pngout) = setup(Some(&csv));
    fs::write(&pngout, b"previous").unwrap();
    assert!(matches!(
        plot_sensor_data(&csvin, &pngout).unwrap(),
        Outcome::Aborted(Error::InputParse(_))
    ));
    assert_eq!(fs::read(&pngout).unwrap(), b"previous");
}

#[test]
fn missing_column_is_fatal() {
    let csv = "timestamp,Avg_CO2_ppm,Avg_Humidity_RH\n2024-01-01 00:00,450,40\n";
    let (_dir, csvin, pngout) = setup(Some(csv));
    match plot_sensor_data(&csvin, &pngout) {
        Err(Error::MissingColumn { column, path }) => {
            assert_eq!(column, "Avg_Temp_C");
            assert_eq!(path, csvin);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(!pngout.exists());
}

#[test]
fn unwritable_output_is_fatal() {
    let csv = format!("{}2024-01-01 00:00,450,21.5,40\n", HEADER);
    let (dir, csvin, _) = setup(Some(&csv));
    let pngout = dir.path().join("no_such_dir").join("sensor_plot.png");
    match plot_sensor_data(&csvin, &pngout) {
        Err(e @ Error::Drawing(_)) => {
            assert!(!e.is_reported());
            assert!(std::error::Error::source(&e).is_some());
        }
        other => panic!("unexpected {:?}", other),
    }
}
