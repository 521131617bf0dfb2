//! Great-circle distance and walking-time estimates.
//!
//! Uses the Haversine formula on a spherical Earth. Both the radius and the
//! walking speed live in [`WalkingModel`] so they can be tuned together.

use crate::models::types::{Coordinate, TransitError};

/// Spherical Earth radius used by the Haversine formula (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Average walking speed: 5 km/h expressed in meters per minute
pub const WALKING_SPEED_M_PER_MIN: f64 = 5000.0 / 60.0;

/// Calculate Haversine distance between two coordinates in meters
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    haversine_distance_with_radius(a, b, EARTH_RADIUS_M)
}

pub fn haversine_distance_with_radius(a: Coordinate, b: Coordinate, radius_m: f64) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    // Rounding can push h a hair above 1 for antipodal points
    let h = h.min(1.0);

    2.0 * radius_m * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Estimated walking time in minutes at the default speed
pub fn walking_time_minutes(distance_m: f64) -> f64 {
    walking_time_with_speed(distance_m, WALKING_SPEED_M_PER_MIN)
}

pub fn walking_time_with_speed(distance_m: f64, speed_m_per_min: f64) -> f64 {
    if distance_m > 0.0 {
        distance_m / speed_m_per_min
    } else {
        // negative and NaN distances count as "already there"
        0.0
    }
}

/// Convert meters to degrees of arc on a sphere (for bounding box queries)
pub fn meters_to_degrees(meters: f64, radius_m: f64) -> f64 {
    (meters / radius_m).to_degrees()
}

/// Parameters that turn coordinates into distances and walking times.
///
/// Changing either value changes user-visible estimates, so the defaults are
/// kept next to the constants above.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WalkingModel {
    pub earth_radius_m: f64,
    pub speed_m_per_min: f64,
}

impl WalkingModel {
    pub fn from_speed_kmh(speed_kmh: f64) -> Self {
        Self {
            speed_m_per_min: speed_kmh * 1000.0 / 60.0,
            ..Self::default()
        }
    }

    pub fn distance(&self, a: Coordinate, b: Coordinate) -> f64 {
        haversine_distance_with_radius(a, b, self.earth_radius_m)
    }

    pub fn walking_time(&self, distance_m: f64) -> f64 {
        walking_time_with_speed(distance_m, self.speed_m_per_min)
    }

    /// Both values must be finite and positive
    pub fn validate(&self) -> Result<(), TransitError> {
        for (field, value) in [
            ("earth_radius_m", self.earth_radius_m),
            ("speed_m_per_min", self.speed_m_per_min),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TransitError::InvalidData(format!(
                    "walking model {field} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for WalkingModel {
    fn default() -> Self {
        Self {
            earth_radius_m: EARTH_RADIUS_M,
            speed_m_per_min: WALKING_SPEED_M_PER_MIN,
        }
    }
}
