use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use nalgebra::Vector3;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::projection::PlanarProjection;

/// Three-component vector used for every measured or derived quantity
pub type Vec3 = Vector3<f64>;

/// Partition of the recordings. Only training sequences carry ground truth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Training,
    Testing,
}

impl Split {
    pub fn has_ground_truth(self) -> bool {
        matches!(self, Split::Training)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Split::Training => "training",
            Split::Testing => "testing",
        }
    }
}

impl Display for Split {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "training" => Ok(Split::Training),
            "testing" => Ok(Split::Testing),
            other => Err(format!("unknown split '{}'", other)),
        }
    }
}

/// One recording: split plus numeric id
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceId {
    pub split: Split,
    pub id: u32,
}

impl SequenceId {
    pub fn new(split: Split, id: u32) -> Self {
        Self { split, id }
    }

    /// Directory name of the sequence under its split folder
    pub fn dir_name(&self) -> String {
        format!("sequence_{}", self.id)
    }
}

impl Display for SequenceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.split, self.dir_name())
    }
}

/// Recording timestamp with exact equality.
///
/// Integer cells stay `i64`, so nanosecond stamps above 2^53 keep their
/// identity. Integral floats fold into the integer form, which makes `5`,
/// `5.0` and `-0.0`/`0` the same instant. NaN equals nothing.
#[derive(Clone, Copy, Debug)]
pub struct Timestamp(Repr);

#[derive(Clone, Copy, Debug)]
enum Repr {
    Int(i64),
    Float(f64),
}

impl Timestamp {
    pub fn from_i64(value: i64) -> Self {
        Self(Repr::Int(value))
    }

    pub fn from_f64(value: f64) -> Self {
        // 2^63 itself is out of range; -2^63 is exact
        if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
            Self(Repr::Int(value as i64))
        } else {
            Self(Repr::Float(value))
        }
    }

    /// Integer value, if the timestamp is integral
    pub fn as_i64(self) -> Option<i64> {
        match self.0 {
            Repr::Int(value) => Some(value),
            Repr::Float(_) => None,
        }
    }

    /// Lossy above 2^53
    pub fn as_f64(self) -> f64 {
        match self.0 {
            Repr::Int(value) => value as f64,
            Repr::Float(value) => value,
        }
    }

    pub fn is_nan(self) -> bool {
        matches!(self.0, Repr::Float(value) if value.is_nan())
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl From<f64> for Timestamp {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        match (self.0, other.0) {
            (Repr::Int(a), Repr::Int(b)) => a == b,
            (Repr::Float(a), Repr::Float(b)) => a == b,
            // Canonical form: an integral value is never stored as a float
            _ => false,
        }
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.0, other.0) {
            (Repr::Int(a), Repr::Int(b)) => Some(a.cmp(&b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Repr::Int(value) => write!(f, "{}", value),
            Repr::Float(value) => write!(f, "{}", value),
        }
    }
}

impl FromStr for Timestamp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if let Ok(value) = raw.parse::<i64>() {
            return Ok(Self::from_i64(value));
        }
        raw.parse::<f64>()
            .map(Self::from_f64)
            .map_err(|_| format!("'{}' is not a timestamp", raw))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Repr::Int(value) => serializer.serialize_i64(value),
            Repr::Float(value) => serializer.serialize_f64(value),
        }
    }
}

/// Parsed from the cell text, never through an intermediate `f64`
impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// IMU measurement. The IMU clock drives iteration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImuSample {
    pub timestamp: Timestamp,
    pub acceleration: Vec3,
    pub angular_velocity: Vec3,
}

/// Camera capture joined with the barometer reading taken alongside it
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CameraSample {
    pub image_index: u64,
    pub timestamp: Timestamp,
    pub barometric_height: f64,
}

/// Geodetic truth position, one per IMU step (training split only)
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroundTruthSample {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl GroundTruthSample {
    /// Planar position in the same frame as [`InitialState::position`]
    pub fn to_planar<P: PlanarProjection + ?Sized>(&self, projection: &P) -> crate::error::Result<Vec3> {
        let (x, y) = projection.project(self.latitude, self.longitude)?;
        Ok(Vec3::new(x, y, self.altitude))
    }
}

/// Starting state of the platform.
///
/// `position` is planar (x = easting, y = northing) plus altitude,
/// `orientation` holds the recorded angles as-is.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InitialState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub orientation: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ground_truth() {
        assert!(Split::Training.has_ground_truth());
        assert!(!Split::Testing.has_ground_truth());
    }

    #[test]
    fn test_split_parse_and_display() {
        assert_eq!("training".parse::<Split>(), Ok(Split::Training));
        assert_eq!("testing".parse::<Split>(), Ok(Split::Testing));
        assert!("validation".parse::<Split>().is_err());
        assert_eq!(Split::Testing.to_string(), "testing");
    }

    #[test]
    fn test_timestamp_large_integers_stay_distinct() {
        let imu: Timestamp = "1700000000000000000".parse().unwrap();
        let camera: Timestamp = "1700000000000000001".parse().unwrap();
        assert_ne!(imu, camera);
        assert!(imu < camera);
        assert_eq!(camera.as_i64(), Some(1_700_000_000_000_000_001));
    }

    #[test]
    fn test_timestamp_integral_float_folds_to_integer() {
        let int: Timestamp = "5".parse().unwrap();
        let float: Timestamp = "5.0".parse().unwrap();
        assert_eq!(int, float);
        assert_eq!(Timestamp::from(-0.0), Timestamp::from(0i64));
        assert_eq!(Timestamp::from(1.5).as_i64(), None);
        assert_eq!(Timestamp::from(1.5), " 1.5 ".parse().unwrap());
    }

    #[test]
    fn test_timestamp_nan_and_garbage() {
        let nan = Timestamp::from(f64::NAN);
        assert!(nan.is_nan());
        assert_ne!(nan, nan);
        assert!("12:00".parse::<Timestamp>().is_err());
    }

    #[test]
    fn test_timestamp_serializes_as_number() {
        assert_eq!(
            serde_json::to_string(&Timestamp::from(1_700_000_000_000_000_001i64)).unwrap(),
            "1700000000000000001"
        );
        assert_eq!(serde_json::to_string(&Timestamp::from(0.25)).unwrap(), "0.25");
    }

    #[test]
    fn test_ground_truth_to_planar() {
        use crate::projection::UtmProjection;

        let truth = GroundTruthSample {
            latitude: 0.0,
            longitude: 0.0,
            altitude: 12.0,
        };
        let planar = truth.to_planar(&UtmProjection::new()).unwrap();
        assert!((planar.x - 166_021.443_179_331_3).abs() < 1e-2);
        assert_eq!(planar.z, 12.0);
    }

    #[test]
    fn test_sequence_id_display() {
        let id = SequenceId::new(Split::Training, 4);
        assert_eq!(id.dir_name(), "sequence_4");
        assert_eq!(id.to_string(), "training/sequence_4");
    }
}
