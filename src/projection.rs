//! Geodetic to planar projection (WGS84 UTM)
//!
//! Zone selection, including the Norway and Svalbard exceptions, and the
//! transverse Mercator math come from the `utm` crate.

use crate::error::{Result, SequenceError};

/// Southern hemisphere northings are offset by this much
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Anything that maps (latitude, longitude) in degrees to planar (x, y) meters
pub trait PlanarProjection {
    fn project(&self, latitude: f64, longitude: f64) -> Result<(f64, f64)>;
}

/// Projected UTM position
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UtmCoordinate {
    pub easting: f64,
    pub northing: f64,
    pub zone_number: u8,
    pub zone_letter: char,
}

/// UTM projection, optionally pinned to one zone
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UtmProjection {
    forced_zone: Option<u8>,
}

impl UtmProjection {
    pub fn new() -> Self {
        Self { forced_zone: None }
    }

    /// Always project into `zone_number` (1..=60), even outside its strip
    pub fn with_zone(zone_number: u8) -> Self {
        Self {
            forced_zone: Some(zone_number),
        }
    }

    pub fn from_latlon(&self, latitude: f64, longitude: f64) -> Result<UtmCoordinate> {
        let out_of_range = SequenceError::ProjectionOutOfRange {
            latitude,
            longitude,
        };
        if !(-80.0..=84.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(out_of_range);
        }
        let zone_number = self
            .forced_zone
            .unwrap_or_else(|| utm::lat_lon_to_zone_number(latitude, longitude));
        if !(1..=60).contains(&zone_number) {
            return Err(out_of_range);
        }
        let zone_letter = utm::lat_to_zone_letter(latitude).ok_or(out_of_range)?;

        let (northing, easting, _convergence) = utm::to_utm_wgs84(latitude, longitude, zone_number);
        let northing = if northing < 0.0 {
            northing + FALSE_NORTHING_SOUTH
        } else {
            northing
        };

        Ok(UtmCoordinate {
            easting,
            northing,
            zone_number,
            zone_letter,
        })
    }
}

impl PlanarProjection for UtmProjection {
    fn project(&self, latitude: f64, longitude: f64) -> Result<(f64, f64)> {
        let utm = self.from_latlon(latitude, longitude)?;
        Ok((utm.easting, utm.northing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_origin_golden_value() {
        let utm = UtmProjection::new().from_latlon(0.0, 0.0).unwrap();
        assert_eq!(utm.zone_number, 31);
        assert_eq!(utm.zone_letter, 'N');
        assert_abs_diff_eq!(utm.easting, 166_021.443_179_331_3, epsilon = 1e-2);
        assert_abs_diff_eq!(utm.northing, 0.0, epsilon = 1e-2);
    }

    #[test]
    fn test_munich() {
        let utm = UtmProjection::new().from_latlon(48.137154, 11.576124).unwrap();
        assert_eq!(utm.zone_number, 32);
        assert_eq!(utm.zone_letter, 'U');
        assert_abs_diff_eq!(utm.easting, 691_650.366_858_578_2, epsilon = 1e-2);
        assert_abs_diff_eq!(utm.northing, 5_334_754.246_882_041, epsilon = 1e-2);
    }

    #[test]
    fn test_southern_hemisphere_false_northing() {
        let utm = UtmProjection::new().from_latlon(-33.8688, 151.2093).unwrap();
        assert_eq!(utm.zone_number, 56);
        assert_eq!(utm.zone_letter, 'H');
        assert_abs_diff_eq!(utm.easting, 334_368.633_646_400_8, epsilon = 1e-2);
        assert_abs_diff_eq!(utm.northing, 6_250_948.345_360_274, epsilon = 1e-2);
    }

    #[test]
    fn test_svalbard_zone() {
        let utm = UtmProjection::new().from_latlon(78.0, 15.0).unwrap();
        assert_eq!(utm.zone_number, 33);
        assert_abs_diff_eq!(utm.easting, 500_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(utm.northing, 8_658_369.586, epsilon = 1e-2);
    }

    #[test]
    fn test_forced_zone() {
        let natural = UtmProjection::new().from_latlon(0.0, 0.0).unwrap();
        let forced = UtmProjection::with_zone(30).from_latlon(0.0, 0.0).unwrap();
        assert_eq!(forced.zone_number, 30);
        // Zone 30's central meridian is 3°W, so the origin sits east of it
        assert!(forced.easting > 500_000.0);
        assert_abs_diff_eq!(forced.easting - 500_000.0, 500_000.0 - natural.easting, epsilon = 1e-6);
    }

    #[test]
    fn test_out_of_range() {
        let projection = UtmProjection::new();
        assert!(projection.from_latlon(85.0, 0.0).is_err());
        assert!(projection.from_latlon(-81.0, 0.0).is_err());
        assert!(projection.from_latlon(0.0, 181.0).is_err());
        assert!(projection.project(f64::NAN, 0.0).is_err());
        assert!(UtmProjection::with_zone(61).project(0.0, 0.0).is_err());
    }
}
