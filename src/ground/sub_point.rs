use log::warn;

use crate::{
    constants::RADEG, epoch_time::EpochTime, gravity_model::GravityModel,
    kepler::wrap_degrees_180, propagation::StateVector,
};

use super::GeoCoordinate;

const LATITUDE_TOLERANCE: f64 = 1e-7;
const MAX_ITERATIONS: usize = 20;

/// Geodetic point below the satellite.
///
/// The geodetic latitude is found by fixed-point iteration on the oblate Earth, starting from
/// the geocentric latitude, until two successive values differ by less than 1e-7 rad (at most
/// 20 iterations). The longitude is the right ascension of the satellite minus the Greenwich
/// sidereal time.
///
/// Arguments
/// ---------
/// * `time`: UTC time of the state vector
/// * `state_vector`: satellite position (km)
/// * `gravity_model`: ellipsoid of the returned coordinate
///
/// Return
/// ------
/// * latitude in (-90, 90), longitude in (-180, 180], height above the ellipsoid (km)
pub fn sub_satellite_point(
    time: &EpochTime,
    state_vector: &StateVector,
    gravity_model: GravityModel,
) -> GeoCoordinate {
    let grav = gravity_model.constants();
    let a = grav.radius_earth_km;
    let f = grav.flattening;
    let e2 = f * (2.0 - f);

    let r = &state_vector.position;
    let r_xy = (r.x * r.x + r.y * r.y).sqrt();

    let longitude = r.y.atan2(r.x) - time.greenwich_sidereal_time();

    let mut latitude = r.z.atan2(r_xy);
    let mut c = 1.0;
    let mut converged = false;
    for _ in 0..MAX_ITERATIONS {
        let previous = latitude;
        let sin_lat = previous.sin();
        c = 1.0 / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        latitude = (r.z + a * c * e2 * sin_lat).atan2(r_xy);
        if (latitude - previous).abs() < LATITUDE_TOLERANCE {
            converged = true;
            break;
        }
    }
    if !converged {
        warn!("Sub-satellite latitude not converged after {MAX_ITERATIONS} iterations");
    }

    let height = r_xy / latitude.cos() - a * c;

    GeoCoordinate {
        latitude: latitude / RADEG,
        longitude: wrap_degrees_180(longitude / RADEG),
        height,
        gravity_model,
    }
}

#[cfg(test)]
mod sub_point_test {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use crate::ground::to_eci;

    #[test]
    fn test_round_trip_with_to_eci() {
        let time = EpochTime::from_calendar(2021, 6, 15, 3, 30, 0.0).unwrap();
        for (lat, lon, h) in [(48.1, 11.6, 420.0), (-33.9, -70.6, 35786.0), (0.0, 179.5, 800.0)] {
            let site = GeoCoordinate::new(lat, lon, h);
            let lst = time.local_sidereal_time(lon);
            let position = to_eci(&site, lst, GravityModel::Wgs84);
            let sv = StateVector {
                minutes_since_epoch: 0.0,
                position,
                velocity: Vector3::zeros(),
            };

            let point = sub_satellite_point(&time, &sv, GravityModel::Wgs84);
            assert_relative_eq!(point.latitude, lat, epsilon = 1e-4);
            assert_relative_eq!(point.longitude, lon, epsilon = 1e-9);
            assert_relative_eq!(point.height, h, epsilon = 1e-2);
        }
    }
}
