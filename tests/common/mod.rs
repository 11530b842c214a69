#![allow(dead_code)]

use approx::assert_relative_eq;
use nalgebra::Vector3;
use sgp4track::orbital_elements::{ElementSetMetadata, MeanElements, OrbitalElementRecord};
use sgp4track::tle::parse_tle;

pub const ISS_LINE1: &str =
    "1 25544U 98067A   19356.46068278  .00000035  00000-0  86431-5 0  9990";
pub const ISS_LINE2: &str =
    "2 25544  51.6420 147.9381 0007793  61.6458  55.7201 15.50124783204461";

pub const VANGUARD_LINE1: &str =
    "1 00005U 58002B   00179.78495062  .00000023  00000-0  28098-4 0  4753";
pub const VANGUARD_LINE2: &str =
    "2 00005  34.2682 348.7242 1859667 331.7664  19.3264 10.82419157413667";

/// Geosynchronous, one-day resonance.
pub const GEO_28626_LINE1: &str =
    "1 28626U 05008A   06176.46683397 -.00000205  00000-0  10000-3 0  2190";
pub const GEO_28626_LINE2: &str =
    "2 28626   0.0019 286.9433 0000335  13.7918  55.6504  1.00270176  4891";

/// Molniya, half-day resonance.
pub const MOLNIYA_08195_LINE1: &str =
    "1 08195U 75081A   06176.33215444  .00000099  00000-0  11873-3 0   813";
pub const MOLNIYA_08195_LINE2: &str =
    "2 08195  64.1586 279.0717 6877146 264.7651  20.2257  2.00491383225656";

/// Low inclination transfer orbit, lunar/solar periodics through the Lyddane branch.
pub const GTO_23599_LINE1: &str =
    "1 23599U 95029B   06171.76535463  .00085586  12891-6  12956-2 0  2714";
pub const GTO_23599_LINE2: &str =
    "2 23599   6.9327   0.2849 5782022 274.4436  25.2425  4.47796565123555";

pub fn init_logger() {
    let _ = pretty_env_logger::try_init();
}

pub fn iss() -> OrbitalElementRecord {
    parse_tle(ISS_LINE1, ISS_LINE2, Some("ISS (ZARYA)")).unwrap()
}

pub fn vanguard() -> OrbitalElementRecord {
    parse_tle(VANGUARD_LINE1, VANGUARD_LINE2, None).unwrap()
}

/// Element set built directly from published values, epoch 2020 day 60.
pub fn synthetic(
    catalog_number: u32,
    mean_motion: f64,
    eccentricity: f64,
    inclination: f64,
    bstar: f64,
) -> OrbitalElementRecord {
    OrbitalElementRecord::from_mean_elements(
        ElementSetMetadata {
            catalog_number,
            ..Default::default()
        },
        &MeanElements {
            epoch_year: 2020,
            epoch_day: 60.25,
            mean_motion,
            mean_motion_dot: 0.0,
            mean_motion_ddot: 0.0,
            bstar,
            inclination,
            right_ascension: 120.0,
            eccentricity,
            argument_of_perigee: 270.0,
            mean_anomaly: 10.0,
        },
    )
}

pub fn geostationary() -> OrbitalElementRecord {
    synthetic(28626, 1.00272, 0.0002, 0.05, 0.0)
}

pub fn molniya() -> OrbitalElementRecord {
    synthetic(8195, 2.00563, 0.74, 63.4, 0.0001)
}

pub fn gps() -> OrbitalElementRecord {
    synthetic(24876, 2.00563, 0.005, 55.0, 0.0)
}

pub fn assert_vector_close(actual: &Vector3<f64>, expected: &Vector3<f64>, epsilon: f64) {
    assert_relative_eq!(actual.x, expected.x, epsilon = epsilon);
    assert_relative_eq!(actual.y, expected.y, epsilon = epsilon);
    assert_relative_eq!(actual.z, expected.z, epsilon = epsilon);
}
