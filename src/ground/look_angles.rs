use nalgebra::Vector3;

use crate::{
    constants::{Degree, Kilometer, Radian, DPI, RADEG},
    epoch_time::EpochTime,
    gravity_model::GravityModel,
    propagation::StateVector,
};

use super::GeoCoordinate;

/// Topocentric position of a satellite seen from a site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngles {
    /// Distance from the site to the satellite (km)
    pub range: Kilometer,
    /// Azimuth, clockwise from north, in [0, 360) (°)
    pub azimuth: Degree,
    /// Elevation above the local horizon, in [-90, 90] (°)
    pub elevation: Degree,
}

/// Position of a geodetic coordinate in the inertial frame.
///
/// The site is placed on the oblate Earth of `gravity_model` (equatorial radius and flattening),
/// raised by its height along the local normal, then rotated by the sidereal time.
///
/// Arguments
/// ---------
/// * `coordinate`: the site; its longitude is not used, it is already part of the sidereal time
/// * `local_sidereal_time`: local mean sidereal time of the site in radians
/// * `gravity_model`: ellipsoid used for the conversion
///
/// Return
/// ------
/// * position vector (km)
///
/// See also
/// --------
/// * [`EpochTime::local_sidereal_time`] – sidereal time including the site longitude
pub fn to_eci(
    coordinate: &GeoCoordinate,
    local_sidereal_time: Radian,
    gravity_model: GravityModel,
) -> Vector3<f64> {
    let grav = gravity_model.constants();
    let f = grav.flattening;
    let a = grav.radius_earth_km;

    let (sin_lat, cos_lat) = (coordinate.latitude * RADEG).sin_cos();
    let (sin_srt, cos_srt) = local_sidereal_time.sin_cos();

    let c = 1.0 / (1.0 + f * (f - 2.0) * sin_lat * sin_lat).sqrt();
    let s = (1.0 - f) * (1.0 - f) * c;
    let achcp = (a * c + coordinate.height) * cos_lat;

    Vector3::new(
        achcp * cos_srt,
        achcp * sin_srt,
        (a * s + coordinate.height) * sin_lat,
    )
}

/// Range, azimuth and elevation of a satellite from a site.
///
/// The observer to satellite vector is rotated into the topocentric south-east-zenith frame.
///
/// Arguments
/// ---------
/// * `coordinate`: the site, placed with its own ellipsoid
/// * `time`: UTC time of the state vector
/// * `state_vector`: satellite position (km)
///
/// Return
/// ------
/// * the [`LookAngles`] of the satellite
pub fn look_angles(
    coordinate: &GeoCoordinate,
    time: &EpochTime,
    state_vector: &StateVector,
) -> LookAngles {
    let lst = time.local_sidereal_time(coordinate.longitude);
    let site = to_eci(coordinate, lst, coordinate.gravity_model);
    let v = state_vector.position - site;

    let (sin_lat, cos_lat) = (coordinate.latitude * RADEG).sin_cos();
    let (sin_srt, cos_srt) = lst.sin_cos();

    let rs = sin_lat * cos_srt * v.x + sin_lat * sin_srt * v.y - cos_lat * v.z;
    let re = -sin_srt * v.x + cos_srt * v.y;
    let rz = cos_lat * cos_srt * v.x + cos_lat * sin_srt * v.y + sin_lat * v.z;

    let range = (rs * rs + re * re + rz * rz).sqrt();
    let elevation = (rz / range).clamp(-1.0, 1.0).asin();
    let azimuth = re.atan2(-rs).rem_euclid(DPI);

    LookAngles {
        range,
        // rem_euclid can return 2π for tiny negative inputs
        azimuth: (azimuth / RADEG) % 360.0,
        elevation: elevation / RADEG,
    }
}

/// True when the satellite is at or above `min_elevation` degrees from the site.
pub fn is_visible(
    coordinate: &GeoCoordinate,
    min_elevation: Degree,
    time: &EpochTime,
    state_vector: &StateVector,
) -> bool {
    look_angles(coordinate, time, state_vector).elevation >= min_elevation
}
