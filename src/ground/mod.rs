//! # Ground station geometry (top-level module)
//!
//! This module composes the propagator output with a point on the Earth. It provides:
//!
//! - A [`GeoCoordinate`](crate::ground::GeoCoordinate) type storing the **geodetic** latitude,
//!   longitude and height of a site, together with the ellipsoid used to place it.
//! - The oblate-Earth geodetic → inertial transform ([`to_eci`](crate::ground::to_eci)).
//! - Topocentric **look angles** (range, azimuth, elevation) of a satellite seen from a site
//!   ([`look_angles`](crate::ground::look_angles)) and the matching visibility predicate
//!   ([`is_visible`](crate::ground::is_visible)).
//! - The **sub-satellite point** (geodetic latitude, longitude, height of the satellite)
//!   ([`sub_satellite_point`](crate::ground::sub_satellite_point)).
//! - A multi-day **pass search** ([`find_passes`](crate::ground::find_passes)), driven by
//!   [`PassSearchSettings`](crate::ground::PassSearchSettings).
//!
//! ## Frames & conventions
//!
//! - **TEME / ECI**: frame of the [`StateVector`](crate::propagation::StateVector) positions.
//!   The site is rotated into it with the **local mean sidereal time** (no nutation, no polar
//!   motion).
//! - **SEZ** (south, east, zenith): topocentric frame of the look angles.
//!
//! ```text
//! GeoCoordinate --(ellipsoid, LMST)--> site ECI ──┐
//!                                                 ├─> range vector --(rotation)--> SEZ --> (ρ, Az, El)
//! StateVector (TEME) ─────────────────────────────┘
//! ```
//!
//! ## Units
//!
//! - Latitude, longitude, azimuth, elevation: **degrees**. Longitudes are east positive.
//! - Heights, positions and ranges: **km**.
//! - Sidereal time: **radians**.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use sgp4track::epoch_time::EpochTime;
//! use sgp4track::ground::{find_passes, GeoCoordinate, PassSearchSettings};
//! use sgp4track::tle::parse_tle;
//!
//! let iss = parse_tle(
//!     "1 25544U 98067A   19356.46068278  .00000035  00000-0  86431-5 0  9990",
//!     "2 25544  51.6420 147.9381 0007793  61.6458  55.7201 15.50124783204461",
//!     Some("ISS (ZARYA)"),
//! )?;
//! let munich = GeoCoordinate::new(48.137, 11.575, 0.52);
//! let start = EpochTime::from_calendar(2019, 12, 22, 12, 0, 0.0)?;
//!
//! let passes = find_passes(&munich, &iss, &start, &PassSearchSettings::default(), || false)?;
//! for pass in &passes {
//!     println!("{pass}");
//! }
//! # Ok::<(), sgp4track::sgp4_errors::Sgp4Error>(())
//! ```
//!
//! ## See also
//! ------------
//! * [`EpochTime::local_sidereal_time`](crate::epoch_time::EpochTime::local_sidereal_time) – sidereal time of a site.
//! * [`propagate_at`](crate::propagation::propagate_at) – state vector at an absolute time.
mod look_angles;
mod passes;
mod sub_point;

use std::fmt;

use crate::{
    constants::{Degree, Kilometer},
    gravity_model::GravityModel,
};

pub use look_angles::{is_visible, look_angles, to_eci, LookAngles};
pub use passes::{find_passes, Pass, PassDetail, PassSearchError, PassSearchSettings};
pub use sub_point::sub_satellite_point;

/// Geodetic coordinate of a site, or of the sub-satellite point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    /// Geodetic latitude (°)
    pub latitude: Degree,
    /// East longitude (°)
    pub longitude: Degree,
    /// Height above the ellipsoid (km)
    pub height: Kilometer,
    /// Ellipsoid used to convert the coordinate
    pub gravity_model: GravityModel,
}

impl GeoCoordinate {
    /// Build a coordinate on the WGS-84 ellipsoid.
    ///
    /// Arguments
    /// ---------
    /// * `latitude`: geodetic latitude in degrees
    /// * `longitude`: east longitude in degrees
    /// * `height`: height above the ellipsoid in kilometers
    pub fn new(latitude: Degree, longitude: Degree, height: Kilometer) -> Self {
        GeoCoordinate {
            latitude,
            longitude,
            height,
            gravity_model: GravityModel::Wgs84,
        }
    }

    pub fn with_gravity_model(self, gravity_model: GravityModel) -> Self {
        GeoCoordinate {
            gravity_model,
            ..self
        }
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lat: {:.4}° Lon: {:.4}° Height: {:.3} km",
            self.latitude, self.longitude, self.height
        )
    }
}

#[cfg(test)]
mod ground_test {
    use super::*;

    #[test]
    fn test_geo_coordinate() {
        let site = GeoCoordinate::new(48.137, 11.575, 0.52);
        assert_eq!(site.gravity_model, GravityModel::Wgs84);
        assert_eq!(
            site.to_string(),
            "Lat: 48.1370° Lon: 11.5750° Height: 0.520 km"
        );

        let site72 = site.with_gravity_model(GravityModel::Wgs72);
        assert_eq!(site72.gravity_model, GravityModel::Wgs72);
        assert_eq!(site72.latitude, site.latitude);
    }
}
