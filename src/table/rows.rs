//! Typed rows of the per-sequence CSV tables
//!
//! Column names follow the recording layout, dotted axis suffixes included
//! (`acceleration.x`, `gyroscope.z`, ...). Columns not listed here are ignored.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};

use crate::types::{GroundTruthSample, ImuSample, Timestamp, Vec3};

/// A row type that lives in one conventionally named file
pub trait TableRow: DeserializeOwned {
    /// Short table name used in errors and logs
    const TABLE: &'static str;
    /// File name inside the sequence directory
    const FILE: &'static str;
    /// Columns that must be present in the header
    const COLUMNS: &'static [&'static str];
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ImageRow {
    #[serde(deserialize_with = "de_row_index")]
    pub image_index: u64,
    pub timestamp: Timestamp,
}

impl TableRow for ImageRow {
    const TABLE: &'static str = "images";
    const FILE: &'static str = "images.csv";
    const COLUMNS: &'static [&'static str] = &["image_index", "timestamp"];
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BarometerRow {
    #[serde(deserialize_with = "de_row_index")]
    pub index: u64,
    pub barometric_height: f64,
}

impl TableRow for BarometerRow {
    const TABLE: &'static str = "barometric_height";
    const FILE: &'static str = "barometric_height.csv";
    const COLUMNS: &'static [&'static str] = &["index", "barometric_height"];
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ImuRow {
    pub timestamp: Timestamp,
    #[serde(rename = "acceleration.x")]
    pub acceleration_x: f64,
    #[serde(rename = "acceleration.y")]
    pub acceleration_y: f64,
    #[serde(rename = "acceleration.z")]
    pub acceleration_z: f64,
    #[serde(rename = "gyroscope.x")]
    pub gyroscope_x: f64,
    #[serde(rename = "gyroscope.y")]
    pub gyroscope_y: f64,
    #[serde(rename = "gyroscope.z")]
    pub gyroscope_z: f64,
}

impl TableRow for ImuRow {
    const TABLE: &'static str = "imu";
    const FILE: &'static str = "imu.csv";
    const COLUMNS: &'static [&'static str] = &[
        "timestamp",
        "acceleration.x",
        "acceleration.y",
        "acceleration.z",
        "gyroscope.x",
        "gyroscope.y",
        "gyroscope.z",
    ];
}

impl ImuRow {
    /// Gyroscope columns hold angular velocity (rad/s)
    pub fn to_sample(&self) -> ImuSample {
        ImuSample {
            timestamp: self.timestamp,
            acceleration: Vec3::new(self.acceleration_x, self.acceleration_y, self.acceleration_z),
            angular_velocity: Vec3::new(self.gyroscope_x, self.gyroscope_y, self.gyroscope_z),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct InitRow {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    #[serde(rename = "velocity.x")]
    pub velocity_x: f64,
    #[serde(rename = "velocity.y")]
    pub velocity_y: f64,
    #[serde(rename = "velocity.z")]
    pub velocity_z: f64,
    #[serde(rename = "angle.x")]
    pub angle_x: f64,
    #[serde(rename = "angle.y")]
    pub angle_y: f64,
    #[serde(rename = "angle.z")]
    pub angle_z: f64,
}

impl TableRow for InitRow {
    const TABLE: &'static str = "init";
    const FILE: &'static str = "init.csv";
    const COLUMNS: &'static [&'static str] = &[
        "latitude",
        "longitude",
        "altitude",
        "velocity.x",
        "velocity.y",
        "velocity.z",
        "angle.x",
        "angle.y",
        "angle.z",
    ];
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GroundTruthRow {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl TableRow for GroundTruthRow {
    const TABLE: &'static str = "groundtruth";
    const FILE: &'static str = "groundtruth.csv";
    const COLUMNS: &'static [&'static str] = &["latitude", "longitude", "altitude"];
}

impl GroundTruthRow {
    pub fn to_sample(&self) -> GroundTruthSample {
        GroundTruthSample {
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
        }
    }
}

/// Integer row index, also accepting float-encoded integers such as `5.0`
fn de_row_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<u64>() {
        return Ok(value);
    }
    match raw.parse::<f64>() {
        Ok(value) if value >= 0.0 && value.fract() == 0.0 && value < u64::MAX as f64 => {
            Ok(value as u64)
        }
        _ => Err(D::Error::custom(format!("'{}' is not a row index", raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<R: TableRow>(text: &str) -> Result<Vec<R>, csv::Error> {
        csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes())
            .deserialize()
            .collect()
    }

    #[test]
    fn test_float_encoded_index() {
        let rows: Vec<ImageRow> = parse("image_index,timestamp\n5.0,1.5\n6,2.5\n").unwrap();
        assert_eq!(rows[0].image_index, 5);
        assert_eq!(rows[1].image_index, 6);
        assert_eq!(rows[1].timestamp, Timestamp::from(2.5));
    }

    #[test]
    fn test_fractional_index_rejected() {
        assert!(parse::<BarometerRow>("index,barometric_height\n1.5,10.0\n").is_err());
        assert!(parse::<BarometerRow>("index,barometric_height\n-1,10.0\n").is_err());
    }

    #[test]
    fn test_nanosecond_timestamps_parse_exactly() {
        let imu: Vec<ImuRow> = parse(
            "timestamp,acceleration.x,acceleration.y,acceleration.z,gyroscope.x,gyroscope.y,gyroscope.z\n\
             1700000000000000000,0,0,9.81,0,0,0\n",
        )
        .unwrap();
        let images: Vec<ImageRow> = parse("image_index,timestamp\n5,1700000000000000001\n").unwrap();

        assert_eq!(imu[0].timestamp.as_i64(), Some(1_700_000_000_000_000_000));
        assert_eq!(images[0].timestamp.as_i64(), Some(1_700_000_000_000_000_001));
        assert_ne!(imu[0].timestamp, images[0].timestamp);
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        assert!(parse::<ImageRow>("image_index,timestamp\n0,noon\n").is_err());
    }

    #[test]
    fn test_imu_row_ignores_extra_columns() {
        let text = "timestamp,acceleration.x,acceleration.y,acceleration.z,\
                    gyroscope.x,gyroscope.y,gyroscope.z,temperature\n\
                    0.5,1,2,3,0.1,0.2,0.3,21.0\n";
        let rows: Vec<ImuRow> = parse(text).unwrap();
        let sample = rows[0].to_sample();
        assert_eq!(sample.timestamp, Timestamp::from(0.5));
        assert_eq!(sample.acceleration, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(sample.angular_velocity, Vec3::new(0.1, 0.2, 0.3));
    }
}
