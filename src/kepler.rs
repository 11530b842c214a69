use std::f64::consts::PI;

use log::warn;

/// Wrap an angle in degrees into (-180, 180].
pub(crate) fn wrap_degrees_180(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Solve Kepler's equation for the eccentric (or hyperbolic, or parabolic) anomaly.
///
/// Newton-Raphson for the elliptic and hyperbolic cases, Barker's closed form for the parabolic
/// one. Circular orbits return the mean anomaly for both outputs.
///
/// Arguments
/// ---------
/// * `ecc`: eccentricity, any value ≥ 0
/// * `m`: mean anomaly (rad), in [-2π, 2π]
///
/// Return
/// ------
/// * `(e0, nu)`: eccentric anomaly and true anomaly (rad)
pub(crate) fn newtonm(ecc: f64, m: f64) -> (f64, f64) {
    const NUMITER: usize = 50;
    const SMALL: f64 = 1e-8;

    if (ecc - 1.0) > SMALL {
        // hyperbolic
        let mut e0 = if ecc < 1.6 {
            if (m < 0.0 && m > -PI) || m > PI {
                m - ecc
            } else {
                m + ecc
            }
        } else if ecc < 3.6 && m.abs() > PI {
            m - m.signum() * ecc
        } else {
            m / (ecc - 1.0)
        };

        let mut e1 = e0 + (m - ecc * e0.sinh() + e0) / (ecc * e0.cosh() - 1.0);
        let mut ktr = 1;
        while (e1 - e0).abs() > SMALL && ktr <= NUMITER {
            e0 = e1;
            e1 = e0 + (m - ecc * e0.sinh() + e0) / (ecc * e0.cosh() - 1.0);
            ktr += 1;
        }

        let denom = 1.0 - ecc * e1.cosh();
        let sinv = -((ecc * ecc - 1.0).sqrt() * e1.sinh()) / denom;
        let cosv = (e1.cosh() - ecc) / denom;
        (e1, sinv.atan2(cosv))
    } else if (ecc - 1.0).abs() < SMALL {
        // parabolic, real root of B³/3 + B - M = 0
        let b = 2.0 * ((1.5 * m).asinh() / 3.0).sinh();
        (b, 2.0 * b.atan())
    } else if ecc > SMALL {
        let mut e0 = if (m < 0.0 && m > -PI) || m > PI {
            m - ecc
        } else {
            m + ecc
        };

        let mut e1 = e0 + (m - e0 + ecc * e0.sin()) / (1.0 - ecc * e0.cos());
        let mut ktr = 1;
        while (e1 - e0).abs() > SMALL && ktr <= NUMITER {
            ktr += 1;
            e0 = e1;
            e1 = e0 + (m - e0 + ecc * e0.sin()) / (1.0 - ecc * e0.cos());
        }

        let denom = 1.0 - ecc * e1.cos();
        let sinv = ((1.0 - ecc * ecc).sqrt() * e1.sin()) / denom;
        let cosv = (e1.cos() - ecc) / denom;
        (e1, sinv.atan2(cosv))
    } else {
        // circular
        (m, m)
    }
}

/// Solve the modified Kepler equation of the SGP4 kernel for the eccentric longitude.
///
/// The equation is `u = E - axnl sin E + aynl cos E`, where `(axnl, aynl)` are the long-period
/// corrected eccentricity vector components. At most 10 Newton iterations are done and each
/// correction is clamped to ±0.95 rad.
///
/// Arguments
/// ---------
/// * `u`: mean longitude minus node (rad)
/// * `axnl`, `aynl`: components of the eccentricity vector
///
/// Return
/// ------
/// * `(sin E, cos E)` at the last iterate
pub(crate) fn solve_eccentric_longitude(u: f64, axnl: f64, aynl: f64) -> (f64, f64) {
    const MAX_ITER: usize = 10;
    const TOLERANCE: f64 = 1e-12;
    const MAX_STEP: f64 = 0.95;

    let mut eo1 = u;
    let mut sineo1 = eo1.sin();
    let mut coseo1 = eo1.cos();
    let mut tem5: f64 = 9999.9;
    let mut ktr = 0;

    while tem5.abs() >= TOLERANCE && ktr < MAX_ITER {
        sineo1 = eo1.sin();
        coseo1 = eo1.cos();
        tem5 = 1.0 - coseo1 * axnl - sineo1 * aynl;
        tem5 = (u - aynl * coseo1 + axnl * sineo1 - eo1) / tem5;
        if tem5.abs() >= MAX_STEP {
            tem5 = MAX_STEP.copysign(tem5);
        }
        eo1 += tem5;
        ktr += 1;
    }

    if tem5.abs() >= TOLERANCE {
        warn!("Kepler solve stopped after {MAX_ITER} iterations, last correction {tem5:e}");
    }

    (sineo1, coseo1)
}

#[cfg(test)]
mod kepler_test {

    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees_180(190.0), -170.0);
        assert_eq!(wrap_degrees_180(-180.0), 180.0);
        assert_eq!(wrap_degrees_180(180.0), 180.0);
        assert_eq!(wrap_degrees_180(-90.0), -90.0);
        assert_eq!(wrap_degrees_180(540.0), 180.0);
    }

    #[test]
    fn test_newtonm_elliptic() {
        let ecc = 0.1859667;
        let m = 0.33731588;
        let (e, nu) = newtonm(ecc, m);
        assert_relative_eq!(e - ecc * e.sin(), m, epsilon = 1e-9);

        let expected_nu =
            2.0 * (((1.0 + ecc) / (1.0 - ecc)).sqrt() * (e / 2.0).tan()).atan();
        assert_relative_eq!(nu, expected_nu, epsilon = 1e-9);
    }

    #[test]
    fn test_newtonm_other_branches() {
        let (e, nu) = newtonm(0.0, 1.2);
        assert_eq!((e, nu), (1.2, 1.2));

        let (h, _) = newtonm(1.5, 2.0);
        assert_relative_eq!(1.5 * h.sinh() - h, 2.0, epsilon = 1e-8);

        let (b, nu) = newtonm(1.0, 0.7);
        assert_relative_eq!(b * b * b / 3.0 + b, 0.7, epsilon = 1e-12);
        assert_relative_eq!(nu, 2.0 * b.atan(), epsilon = 1e-15);
    }

    #[test]
    fn test_eccentric_longitude() {
        // circular orbit: E = u
        let (s, c) = solve_eccentric_longitude(1.0, 0.0, 0.0);
        assert_relative_eq!(s, 1.0_f64.sin(), epsilon = 1e-15);
        assert_relative_eq!(c, 1.0_f64.cos(), epsilon = 1e-15);

        let (axnl, aynl, u) = (0.1, 0.05, 2.0);
        let (s, c) = solve_eccentric_longitude(u, axnl, aynl);
        let e = s.atan2(c);
        assert_relative_eq!(e - axnl * s + aynl * c, u, epsilon = 1e-10);
    }
}
