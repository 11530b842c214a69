//! # Gravity models
//!
//! SGP4 is defined against a set of geopotential constants. Two models are supported:
//!
//! | Model  | Earth radius (km) | μ (km³/s²) | J2            | J3               | J4               |
//! |--------|-------------------|------------|---------------|------------------|------------------|
//! | WGS-72 | 6378.135          | 398600.8   | 0.001082616   | -0.00000253881   | -0.00000165597   |
//! | WGS-84 | 6378.137          | 398600.5   | 0.00108262998905 | -0.00000253215306 | -0.00000161098761 |
//!
//! The constants are immutable statics. A [`GravityModel`] is a plain `Copy` selector passed
//! explicitly to every operation that depends on it; nothing is ever switched globally.
use std::fmt;

use crate::constants::Kilometer;

/// Geopotential constants of one gravity model, plus the derived quantities used by SGP4.
#[derive(Debug, Clone, PartialEq)]
pub struct GravityConstants {
    /// Equatorial radius of the Earth (km)
    pub radius_earth_km: Kilometer,
    /// Gravitational parameter (km³/s²)
    pub mu: f64,
    pub j2: f64,
    pub j3: f64,
    pub j4: f64,
    /// Ellipsoid flattening
    pub flattening: f64,
    /// sqrt(GM) in Earth radii^1.5 per minute
    pub xke: f64,
    /// Minutes per canonical time unit (1 / xke)
    pub tumin: f64,
    pub j3oj2: f64,
}

impl GravityConstants {
    /// Velocity scale factor, canonical units → km/s
    pub fn velocity_km_per_sec(&self) -> f64 {
        self.radius_earth_km * self.xke / 60.0
    }
}

const WGS72_RADIUS: f64 = 6378.135;
const WGS72_MU: f64 = 398_600.8;
const WGS84_RADIUS: f64 = 6378.137;
const WGS84_MU: f64 = 398_600.5;

fn xke(radius: f64, mu: f64) -> f64 {
    60.0 / (radius * radius * radius / mu).sqrt()
}

fn build(radius: f64, mu: f64, j2: f64, j3: f64, j4: f64, flattening: f64) -> GravityConstants {
    let xke = xke(radius, mu);
    GravityConstants {
        radius_earth_km: radius,
        mu,
        j2,
        j3,
        j4,
        flattening,
        xke,
        tumin: 1.0 / xke,
        j3oj2: j3 / j2,
    }
}

static WGS72: std::sync::LazyLock<GravityConstants> = std::sync::LazyLock::new(|| {
    build(
        WGS72_RADIUS,
        WGS72_MU,
        0.001_082_616,
        -0.000_002_538_81,
        -0.000_001_655_97,
        1.0 / 298.26,
    )
});

static WGS84: std::sync::LazyLock<GravityConstants> = std::sync::LazyLock::new(|| {
    build(
        WGS84_RADIUS,
        WGS84_MU,
        0.001_082_629_989_05,
        -0.000_002_532_153_06,
        -0.000_001_610_987_61,
        1.0 / 298.257_223_563,
    )
});

/// Selector for the geopotential model used by initialization and ground geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GravityModel {
    /// World Geodetic System 1972, the model the published SGP4 test vectors use
    Wgs72,
    /// World Geodetic System 1984
    #[default]
    Wgs84,
}

impl GravityModel {
    /// Return the constants associated with this model.
    pub fn constants(self) -> &'static GravityConstants {
        match self {
            GravityModel::Wgs72 => &WGS72,
            GravityModel::Wgs84 => &WGS84,
        }
    }
}

impl fmt::Display for GravityModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GravityModel::Wgs72 => write!(f, "WGS-72"),
            GravityModel::Wgs84 => write!(f, "WGS-84"),
        }
    }
}

#[cfg(test)]
mod gravity_model_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_derived_constants() {
        let wgs72 = GravityModel::Wgs72.constants();
        assert_relative_eq!(wgs72.xke, 0.074_366_916_133_173_4, epsilon = 1e-12);
        assert_relative_eq!(wgs72.tumin * wgs72.xke, 1.0, epsilon = 1e-15);
        assert_relative_eq!(wgs72.j3oj2, -0.002_345_069_720_011_528, epsilon = 1e-12);

        let wgs84 = GravityModel::Wgs84.constants();
        assert_eq!(wgs84.radius_earth_km, 6378.137);
        assert_relative_eq!(wgs84.flattening, 0.003_352_810_664_747_48, epsilon = 1e-15);
    }

    #[test]
    fn test_default_is_wgs84() {
        assert_eq!(GravityModel::default(), GravityModel::Wgs84);
        assert_eq!(GravityModel::Wgs72.to_string(), "WGS-72");
    }
}
