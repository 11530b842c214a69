//! Evaluation of an initialized session at a given time (`sgp4` of the 2006 revision).
use std::f64::consts::PI;

use log::warn;
use nalgebra::Vector3;

use crate::{constants::DPI, kepler::solve_eccentric_longitude, sgp4_errors::PropagationError};

use super::{deep_space::MeanState, PropagationState, StateVector};

const X2O3: f64 = 2.0 / 3.0;

/// Propagate the session to `t` minutes after epoch.
///
/// Arguments
/// ---------
/// * `state`: the session. Only the resonance checkpoint of deep-space orbits is modified.
/// * `t`: minutes since epoch, any sign
///
/// Return
/// ------
/// * the TEME position (km) and velocity (km/s), or the reason the elements degenerated at `t`
pub(crate) fn sgp4(state: &mut PropagationState, t: f64) -> Result<StateVector, PropagationError> {
    let grav = state.gravity.constants();
    let xke = grav.xke;
    let j2 = grav.j2;
    let mean = &state.mean;
    let ne = &state.near_earth;

    // ------------------- secular gravity and atmospheric drag -------------------
    let xmdf = mean.mo + ne.mdot * t;
    let argpdf = mean.argpo + ne.argpdot * t;
    let nodedf = mean.nodeo + ne.nodedot * t;
    let t2 = t * t;

    let mut argpm = argpdf;
    let mut mm = xmdf;
    let nodem = nodedf + ne.nodecf * t2;
    let mut tempa = 1.0 - ne.cc1 * t;
    let mut tempe = mean.bstar * ne.cc4 * t;
    let mut templ = ne.t2cof * t2;

    if !ne.isimp {
        let delomg = ne.omgcof * t;
        let delmtemp = 1.0 + ne.eta * xmdf.cos();
        let delm = ne.xmcof * (delmtemp * delmtemp * delmtemp - ne.delmo);
        let temp = delomg + delm;
        mm = xmdf + temp;
        argpm = argpdf - temp;
        let t3 = t2 * t;
        let t4 = t3 * t;
        tempa -= ne.d2 * t2 + ne.d3 * t3 + ne.d4 * t4;
        tempe += mean.bstar * ne.cc5 * (mm.sin() - ne.sinmao);
        templ += ne.t3cof * t3 + t4 * (ne.t4cof + t * ne.t5cof);
    }

    let mut sec = MeanState {
        ecc: mean.ecco,
        incl: mean.inclo,
        argp: argpm,
        node: nodem,
        mean_anomaly: mm,
        mean_motion: mean.no,
    };

    if let Some(ds) = state.deep_space.as_mut() {
        ds.apply_secular(t, &mut sec, mean.argpo, ne.argpdot, mean.no);
    }

    if sec.mean_motion <= 0.0 {
        return Err(PropagationError::NonPositiveMeanMotion {
            minutes: t,
            mean_motion: sec.mean_motion,
        });
    }

    let am = (xke / sec.mean_motion).powf(X2O3) * tempa * tempa;
    let nm = xke / am.powf(1.5);
    if !(nm > 0.0) || !nm.is_finite() {
        return Err(PropagationError::NonPositiveMeanMotion {
            minutes: t,
            mean_motion: nm,
        });
    }

    let mut em = sec.ecc - tempe;
    if em >= 1.0 || em < -0.001 || am < 0.95 {
        return Err(PropagationError::EccentricityOutOfBounds {
            minutes: t,
            eccentricity: em,
        });
    }
    if em < 0.0 {
        warn!("Eccentricity {em:e} clamped to 1e-6 at t = {t} min");
        em = 1.0e-6;
    }

    mm = sec.mean_anomaly + mean.no * templ;
    let xlm = mm + sec.argp + sec.node;
    let nodem = sec.node % DPI;
    let argpm = sec.argp % DPI;
    let xlm = xlm % DPI;
    mm = (xlm - argpm - nodem) % DPI;

    // ------------------------ lunar-solar periodics ------------------------
    let mut osc = MeanState {
        ecc: em,
        incl: sec.incl,
        argp: argpm,
        node: nodem,
        mean_anomaly: mm,
        mean_motion: nm,
    };

    let mut aycof = ne.aycof;
    let mut xlcof = ne.xlcof;
    let mut con41 = ne.con41;
    let mut x1mth2 = ne.x1mth2;
    let mut x7thm1 = ne.x7thm1;

    if let Some(ds) = state.deep_space.as_ref() {
        ds.apply_periodics(t, &mut osc);
        if osc.incl < 0.0 {
            osc.incl = -osc.incl;
            osc.node += PI;
            osc.argp -= PI;
        }
        if osc.ecc < 0.0 || osc.ecc > 1.0 {
            return Err(PropagationError::EccentricityOutOfBounds {
                minutes: t,
                eccentricity: osc.ecc,
            });
        }

        let (sinip, cosip) = osc.incl.sin_cos();
        aycof = -0.5 * grav.j3oj2 * sinip;
        let denom = if (cosip + 1.0).abs() > 1.5e-12 {
            1.0 + cosip
        } else {
            1.5e-12
        };
        xlcof = -0.25 * grav.j3oj2 * sinip * (3.0 + 5.0 * cosip) / denom;

        let cosisq = cosip * cosip;
        con41 = 3.0 * cosisq - 1.0;
        x1mth2 = 1.0 - cosisq;
        x7thm1 = 7.0 * cosisq - 1.0;
    }

    let ep = osc.ecc;
    let xincp = osc.incl;
    let argpp = osc.argp;
    let nodep = osc.node;
    let mp = osc.mean_anomaly;
    let (sinip, cosip) = xincp.sin_cos();

    // --------------------------- long period periodics --------------------------
    let axnl = ep * argpp.cos();
    let temp = 1.0 / (am * (1.0 - ep * ep));
    let aynl = ep * argpp.sin() + temp * aycof;
    let xl = mp + argpp + nodep + temp * xlcof * axnl;

    // -------------------------------- kepler --------------------------------
    let u = (xl - nodep) % DPI;
    let (sineo1, coseo1) = solve_eccentric_longitude(u, axnl, aynl);

    // ------------------------- short period preliminary -------------------------
    let ecose = axnl * coseo1 + aynl * sineo1;
    let esine = axnl * sineo1 - aynl * coseo1;
    let el2 = axnl * axnl + aynl * aynl;
    let pl = am * (1.0 - el2);
    if pl < 0.0 {
        return Err(PropagationError::DecayedOrbit { minutes: t });
    }

    let rl = am * (1.0 - ecose);
    let rdotl = am.sqrt() * esine / rl;
    let rvdotl = pl.sqrt() / rl;
    let betal = (1.0 - el2).sqrt();
    let temp = esine / (1.0 + betal);
    let sinu = am / rl * (sineo1 - aynl - axnl * temp);
    let cosu = am / rl * (coseo1 - axnl + aynl * temp);
    let mut su = sinu.atan2(cosu);
    let sin2u = (cosu + cosu) * sinu;
    let cos2u = 1.0 - 2.0 * sinu * sinu;
    let temp = 1.0 / pl;
    let temp1 = 0.5 * j2 * temp;
    let temp2 = temp1 * temp;

    // ----------------------------- short period terms ----------------------------
    let mrt = rl * (1.0 - 1.5 * temp2 * betal * con41) + 0.5 * temp1 * x1mth2 * cos2u;
    su -= 0.25 * temp2 * x7thm1 * sin2u;
    let xnode = nodep + 1.5 * temp2 * cosip * sin2u;
    let xinc = xincp + 1.5 * temp2 * cosip * sinip * cos2u;
    let mvt = rdotl - nm * temp1 * x1mth2 * sin2u / xke;
    let rvdot = rvdotl + nm * temp1 * (x1mth2 * cos2u + 1.5 * con41) / xke;

    // ---------------------------- orientation vectors ----------------------------
    let (sinsu, cossu) = su.sin_cos();
    let (snod, cnod) = xnode.sin_cos();
    let (sini, cosi) = xinc.sin_cos();
    let xmx = -snod * cosi;
    let xmy = cnod * cosi;
    let ux = Vector3::new(
        xmx * sinsu + cnod * cossu,
        xmy * sinsu + snod * cossu,
        sini * sinsu,
    );
    let vx = Vector3::new(
        xmx * cossu - cnod * sinsu,
        xmy * cossu - snod * sinsu,
        sini * cossu,
    );

    Ok(StateVector {
        minutes_since_epoch: t,
        position: ux * (mrt * grav.radius_earth_km),
        velocity: (ux * mvt + vx * rvdot) * grav.velocity_km_per_sec(),
    })
}

#[cfg(test)]
mod kernel_test {
    use super::*;
    use crate::{
        gravity_model::GravityModel,
        orbital_elements::{ElementSetMetadata, MeanElements, OrbitalElementRecord},
        propagation::initialize,
    };
    use approx::assert_relative_eq;

    fn leo() -> OrbitalElementRecord {
        OrbitalElementRecord::from_mean_elements(
            ElementSetMetadata::default(),
            &MeanElements {
                epoch_year: 19,
                epoch_day: 356.46068278,
                mean_motion: 15.50124783,
                mean_motion_dot: 0.00000035,
                mean_motion_ddot: 0.0,
                bstar: 0.86431e-5,
                inclination: 51.6420,
                right_ascension: 147.9381,
                eccentricity: 0.0007793,
                argument_of_perigee: 61.6458,
                mean_anomaly: 55.7201,
            },
        )
    }

    #[test]
    fn test_epoch_radius_and_speed() {
        let mut state = initialize(&leo(), GravityModel::Wgs72).unwrap();
        let sv = sgp4(&mut state, 0.0).unwrap();
        let r = sv.position.norm();
        let v = sv.velocity.norm();
        assert!(r > 6700.0 && r < 6850.0, "radius {r}");
        assert!(v > 7.5 && v < 7.8, "speed {v}");
        // near circular orbit: velocity nearly perpendicular to position
        assert!(sv.position.dot(&sv.velocity).abs() / (r * v) < 1e-2);
    }

    #[test]
    fn test_one_period_later() {
        let mut state = initialize(&leo(), GravityModel::Wgs72).unwrap();
        let period = DPI / state.mean_motion();
        let a = sgp4(&mut state, 0.0).unwrap();
        let b = sgp4(&mut state, period).unwrap();
        // nodal regression and drag move the satellite a bit, not more
        assert!((a.position - b.position).norm() < 300.0);
        assert_relative_eq!(a.position.norm(), b.position.norm(), max_relative = 5e-3);
    }

    #[test]
    fn test_negative_time() {
        let mut state = initialize(&leo(), GravityModel::Wgs72).unwrap();
        let sv = sgp4(&mut state, -90.0).unwrap();
        assert_eq!(sv.minutes_since_epoch, -90.0);
        assert!(sv.position.norm() > 6500.0);
    }
}
