//! Table store: loads the flat per-sequence tables from disk
//!
//! Layout: `{base_path}/{split}/sequence_{id}/{images,barometric_height,imu,init}.csv`
//! plus `groundtruth.csv` on the training split.

pub mod rows;

use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::error::{Result, SequenceError};
use crate::types::Split;

pub use rows::{BarometerRow, GroundTruthRow, ImageRow, ImuRow, InitRow, TableRow};

/// All tables of one sequence, fully materialized
#[derive(Clone, Debug, Default)]
pub struct SequenceTables {
    pub images: Vec<ImageRow>,
    pub barometer: Vec<BarometerRow>,
    pub imu: Vec<ImuRow>,
    pub init: Vec<InitRow>,
    pub ground_truth: Option<Vec<GroundTruthRow>>,
}

impl SequenceTables {
    /// Load every table in `dir`. Ground truth is read only when `split` has it.
    pub fn load(dir: &Path, split: Split) -> Result<Self> {
        if !dir.is_dir() {
            return Err(SequenceError::NotFound {
                path: dir.to_path_buf(),
            });
        }

        let ground_truth = if split.has_ground_truth() {
            Some(load_table::<GroundTruthRow>(dir)?)
        } else {
            None
        };

        Ok(Self {
            images: load_table(dir)?,
            barometer: load_table(dir)?,
            imu: load_table(dir)?,
            init: load_table(dir)?,
            ground_truth,
        })
    }
}

/// Load one table, checking its header for the required columns first
pub fn load_table<R: TableRow>(dir: &Path) -> Result<Vec<R>> {
    let file = dir.join(R::FILE);
    if !file.is_file() {
        return Err(SequenceError::NotFound { path: file });
    }

    let csv_error = |source: csv::Error| SequenceError::Csv {
        file: file.clone(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(&file)
        .map_err(csv_error)?;

    let headers = reader.headers().map_err(csv_error)?.clone();
    if let Some(missing) = R::COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(SequenceError::malformed(
            &file,
            format!("missing column '{}'", missing),
        ));
    }

    let rows = reader
        .deserialize::<R>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(csv_error)?;

    log::debug!("Loaded {} {} rows from {}", rows.len(), R::TABLE, file.display());
    Ok(rows)
}

/// Bounds-checked row access; an out-of-range index is a hard failure
pub fn row_at<'a, R: TableRow>(rows: &'a [R], index: usize) -> Result<&'a R> {
    rows.get(index).ok_or(SequenceError::IndexOutOfRange {
        table: R::TABLE,
        index,
        len: rows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;

    fn write_minimal(dir: &Path) {
        fs::write(dir.join("images.csv"), "image_index,timestamp\n0,1.0\n").unwrap();
        fs::write(
            dir.join("barometric_height.csv"),
            "index,barometric_height\n0,12.5\n",
        )
        .unwrap();
        fs::write(
            dir.join("imu.csv"),
            "timestamp,acceleration.x,acceleration.y,acceleration.z,gyroscope.x,gyroscope.y,gyroscope.z\n\
             1.0,0,0,9.81,0,0,0\n",
        )
        .unwrap();
        fs::write(
            dir.join("init.csv"),
            "latitude,longitude,altitude,velocity.x,velocity.y,velocity.z,angle.x,angle.y,angle.z\n\
             0,0,100,1,2,3,0.1,0.2,0.3\n",
        )
        .unwrap();
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = SequenceTables::load(&dir.path().join("sequence_9"), Split::Testing).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_testing_split_skips_ground_truth() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal(dir.path());

        let tables = SequenceTables::load(dir.path(), Split::Testing).unwrap();
        assert_eq!(tables.imu.len(), 1);
        assert_eq!(tables.barometer[0].barometric_height, 12.5);
        assert!(tables.ground_truth.is_none());
    }

    #[test]
    fn test_training_split_requires_ground_truth() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal(dir.path());

        let err = SequenceTables::load(dir.path(), Split::Training).unwrap_err();
        match err {
            SequenceError::NotFound { path } => assert!(path.ends_with("groundtruth.csv")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_column_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("images.csv"), "image_index,time\n0,1.0\n").unwrap();

        let err = load_table::<ImageRow>(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedData);
        assert!(err.to_string().contains("missing column 'timestamp'"));
    }

    #[test]
    fn test_row_at_out_of_range() {
        let rows = vec![GroundTruthRow {
            latitude: 1.0,
            longitude: 2.0,
            altitude: 3.0,
        }];
        assert!(row_at(&rows, 0).is_ok());
        let err = row_at(&rows, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Index);
    }
}
