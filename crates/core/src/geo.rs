//! Geographic positions and distance calculation
//!
//! Pure functions used to compare the vehicle's final position against the
//! oracle's expected end position.

use libm::{atan2, cos, sin, sqrt};
use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Global position (WGS84 degrees, altitude in meters).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPosition {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub alt_m: f64,
}

impl GeoPosition {
    pub const fn new(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        Self {
            lat_deg,
            lon_deg,
            alt_m,
        }
    }
}

/// Launch position of the vehicle, as configured by the test harness.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HomePosition {
    pub position: GeoPosition,
    pub heading_deg: f64,
}

impl HomePosition {
    pub const fn new(lat_deg: f64, lon_deg: f64, alt_m: f64, heading_deg: f64) -> Self {
        Self {
            position: GeoPosition::new(lat_deg, lon_deg, alt_m),
            heading_deg,
        }
    }
}

/// Great-circle ground distance between two positions using the Haversine formula
///
/// # Returns
///
/// Distance in meters, ignoring altitude
pub fn haversine_distance(a: &GeoPosition, b: &GeoPosition) -> f64 {
    const DEG_TO_RAD: f64 = core::f64::consts::PI / 180.0;

    let lat1_rad = a.lat_deg * DEG_TO_RAD;
    let lat2_rad = b.lat_deg * DEG_TO_RAD;
    let delta_lat = (b.lat_deg - a.lat_deg) * DEG_TO_RAD;
    let delta_lon = (b.lon_deg - a.lon_deg) * DEG_TO_RAD;

    let sin_dlat = sin(delta_lat / 2.0);
    let sin_dlon = sin(delta_lon / 2.0);
    let h = sin_dlat * sin_dlat + cos(lat1_rad) * cos(lat2_rad) * sin_dlon * sin_dlon;
    let c = 2.0 * atan2(sqrt(h), sqrt(1.0 - h));

    EARTH_RADIUS_M * c
}

/// Straight-line distance combining ground distance and altitude difference.
///
/// Both altitudes must share one reference frame. The oracle's end position
/// is either the home altitude or a waypoint's own `z`, so the vehicle
/// connection must report positions in the frame the mission was written
/// in; mixing AMSL and relative altitudes inflates the result by the
/// frame offset. Use [`haversine_distance`] when only ground distance is
/// meaningful.
pub fn distance_3d(a: &GeoPosition, b: &GeoPosition) -> f64 {
    let ground = haversine_distance(a, b);
    let vertical = b.alt_m - a.alt_m;
    sqrt(ground * ground + vertical * vertical)
}
