//! Diagnostics export of the observation store as headerless CSV.
//!
//! - `X.csv`: one row per sampled point, comma-separated coordinates.
//! - `D.csv`: one row per preference, comma-separated column indices
//!   (preferred index first). Rows have varying length.
use crate::preference::{
    core::data::PreferenceData,
    errors::{PreferenceError, PreferenceResult},
};
use csv::{Writer, WriterBuilder};
use std::{fs::File, path::Path};

/// File name of the point dump written by [`dump_data`].
pub const POINTS_FILE: &str = "X.csv";
/// File name of the preference dump written by [`dump_data`].
pub const PREFERENCES_FILE: &str = "D.csv";

/// Write every sampled point as one CSV row.
///
/// # Errors
/// - [`PreferenceError::ExportFailed`] if the file cannot be created or written.
pub fn export_points_csv(data: &PreferenceData, path: &Path) -> PreferenceResult<()> {
    let mut wtr = open_writer(path)?;
    for column in data.points().columns() {
        let record: Vec<String> = column.iter().map(|v| v.to_string()).collect();
        wtr.write_record(&record).map_err(|err| export_error(path, err))?;
    }
    wtr.flush().map_err(|err| export_error(path, err))
}

/// Write every preference as one CSV row of indices.
///
/// # Errors
/// - [`PreferenceError::ExportFailed`] if the file cannot be created or written.
pub fn export_preferences_csv(data: &PreferenceData, path: &Path) -> PreferenceResult<()> {
    let mut wtr = open_writer(path)?;
    for preference in data.preferences() {
        let record: Vec<String> = preference.indices().iter().map(|i| i.to_string()).collect();
        wtr.write_record(&record).map_err(|err| export_error(path, err))?;
    }
    wtr.flush().map_err(|err| export_error(path, err))
}

/// Write [`POINTS_FILE`] and [`PREFERENCES_FILE`] into `dir`.
///
/// # Errors
/// - [`PreferenceError::ExportFailed`] if either file cannot be written.
pub fn dump_data(data: &PreferenceData, dir: &Path) -> PreferenceResult<()> {
    export_points_csv(data, &dir.join(POINTS_FILE))?;
    export_preferences_csv(data, &dir.join(PREFERENCES_FILE))
}

fn open_writer(path: &Path) -> PreferenceResult<Writer<File>> {
    WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|err| export_error(path, err))
}

fn export_error<E: std::fmt::Display>(path: &Path, err: E) -> PreferenceError {
    PreferenceError::ExportFailed { path: path.display().to_string(), reason: err.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preference::core::preference::Preference;
    use ndarray::array;
    use std::fs;

    fn store() -> PreferenceData {
        let points = array![[0.0, 0.5, 1.0], [0.25, 0.75, 0.125]];
        let prefs = vec![Preference::new(vec![1, 0, 2]).unwrap(), Preference::new(vec![2, 1]).unwrap()];
        PreferenceData::from_parts(points, prefs, None).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // The dump writes points row-wise and preferences as ragged index rows.
    //
    // Given
    // -----
    // - 3 points in 2 dimensions and preferences (1, 0, 2), (2, 1).
    //
    // Expect
    // ------
    // - X.csv has 3 rows of 2 coordinates; D.csv has rows "1,0,2" and "2,1".
    fn dump_writes_points_and_preferences() {
        let dir = tempfile::tempdir().unwrap();
        dump_data(&store(), dir.path()).unwrap();

        let x = fs::read_to_string(dir.path().join(POINTS_FILE)).unwrap();
        let rows: Vec<&str> = x.lines().collect();
        assert_eq!(rows, vec!["0,0.25", "0.5,0.75", "1,0.125"]);

        let d = fs::read_to_string(dir.path().join(PREFERENCES_FILE)).unwrap();
        assert_eq!(d.lines().collect::<Vec<_>>(), vec!["1,0,2", "2,1"]);
    }

    #[test]
    fn unwritable_path_reports_export_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no_such_dir").join("X.csv");
        assert!(matches!(
            export_points_csv(&store(), &missing),
            Err(PreferenceError::ExportFailed { .. })
        ));
    }
}
