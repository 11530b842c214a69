//! One-time derivation of the SGP4 coefficients from an element set.
//!
//! The initialization follows `initl` + `sgp4init` of the 2006 revision:
//!
//! 1. recover the original (un-Kozai) mean motion and semi-major axis,
//! 2. compute the drag (`cc1..cc5`) and oblateness (`con41`, `x1mth2`, `x7thm1`) coefficients and
//!    the secular rates of the mean anomaly, argument of perigee and node,
//! 3. select the deep-space branch for periods of 225 minutes or more and build its terms,
//! 4. otherwise, when the perigee is above 220 km, compute the higher order drag terms.
use crate::{
    constants::{DEEP_SPACE_PERIOD_THRESHOLD, DPI, JD_SGP4_EPOCH_ORIGIN},
    gravity_model::{GravityConstants, GravityModel},
    kepler::newtonm,
    orbital_elements::OrbitalElementRecord,
    sgp4_errors::InitError,
    time::gstime,
};

use super::{
    deep_space::{DeepSpaceInit, DeepSpaceTerms},
    PropagationState,
};

const X2O3: f64 = 2.0 / 3.0;

/// Mean elements at epoch, after recovery of the original mean motion.
#[derive(Debug, Clone)]
pub(crate) struct EpochMeanElements {
    /// Recovered mean motion (rad/min)
    pub(crate) no: f64,
    /// Recovered semi-major axis (earth radii)
    pub(crate) ao: f64,
    pub(crate) ecco: f64,
    pub(crate) inclo: f64,
    pub(crate) nodeo: f64,
    pub(crate) argpo: f64,
    pub(crate) mo: f64,
    pub(crate) bstar: f64,
    pub(crate) eccentric_anomaly: f64,
    pub(crate) true_anomaly: f64,
}

/// Near-earth coefficients. Also used by the deep-space branch for the secular rates and the
/// first order drag terms.
#[derive(Debug, Clone, Default)]
pub(crate) struct NearEarthTerms {
    /// Simplified drag: the `d2..d4` and `t3cof..t5cof` terms are not used
    pub(crate) isimp: bool,
    pub(crate) aycof: f64,
    pub(crate) xlcof: f64,
    pub(crate) con41: f64,
    pub(crate) x1mth2: f64,
    pub(crate) x7thm1: f64,
    pub(crate) cc1: f64,
    pub(crate) cc4: f64,
    pub(crate) cc5: f64,
    pub(crate) d2: f64,
    pub(crate) d3: f64,
    pub(crate) d4: f64,
    pub(crate) delmo: f64,
    pub(crate) eta: f64,
    pub(crate) sinmao: f64,
    pub(crate) omgcof: f64,
    pub(crate) xmcof: f64,
    pub(crate) nodecf: f64,
    pub(crate) t2cof: f64,
    pub(crate) t3cof: f64,
    pub(crate) t4cof: f64,
    pub(crate) t5cof: f64,
    /// Secular rate of the mean anomaly (rad/min)
    pub(crate) mdot: f64,
    /// Secular rate of the argument of perigee (rad/min)
    pub(crate) argpdot: f64,
    /// Secular rate of the node (rad/min)
    pub(crate) nodedot: f64,
}

/// Output of the mean motion recovery (`initl`).
struct RecoveredOrbit {
    no: f64,
    ao: f64,
    eccsq: f64,
    omeosq: f64,
    rteosq: f64,
    cosio: f64,
    cosio2: f64,
    sinio: f64,
    con41: f64,
    con42: f64,
    posq: f64,
    rp: f64,
}

/// Recover the original mean motion and the related orbit quantities.
///
/// The published mean motion is a Kozai mean motion; the SGP4 theory works with the Brouwer one,
/// obtained by removing the first order J2 effect.
fn recover_mean_motion(
    grav: &GravityConstants,
    no_kozai: f64,
    ecco: f64,
    inclo: f64,
) -> RecoveredOrbit {
    let eccsq = ecco * ecco;
    let omeosq = 1.0 - eccsq;
    let rteosq = omeosq.sqrt();
    let cosio = inclo.cos();
    let cosio2 = cosio * cosio;

    let ak = (grav.xke / no_kozai).powf(X2O3);
    let d1 = 0.75 * grav.j2 * (3.0 * cosio2 - 1.0) / (rteosq * omeosq);
    let del = d1 / (ak * ak);
    let adel = ak * (1.0 - del * del - del * (1.0 / 3.0 + 134.0 * del * del / 81.0));
    let del = d1 / (adel * adel);
    let no = no_kozai / (1.0 + del);

    let ao = (grav.xke / no).powf(X2O3);
    let po = ao * omeosq;
    let con42 = 1.0 - 5.0 * cosio2;

    RecoveredOrbit {
        no,
        ao,
        eccsq,
        omeosq,
        rteosq,
        cosio,
        cosio2,
        sinio: inclo.sin(),
        con41: -con42 - cosio2 - cosio2,
        con42,
        posq: po * po,
        rp: ao * (1.0 - ecco),
    }
}

/// Initialize a propagation session.
///
/// Arguments
/// ---------
/// * `elements`: element set in internal units
/// * `gravity`: gravity model of the session
///
/// Return
/// ------
/// * the session, or an [`InitError`] when the elements cannot be used
pub(crate) fn sgp4_init(
    elements: &OrbitalElementRecord,
    gravity: GravityModel,
) -> Result<PropagationState, InitError> {
    if !(elements.mean_motion > 0.0) || !elements.mean_motion.is_finite() {
        return Err(InitError::NonPositiveMeanMotion(elements.mean_motion));
    }
    if !(0.0..1.0).contains(&elements.eccentricity) {
        return Err(InitError::EccentricityOutOfRange(elements.eccentricity));
    }
    let epoch = elements.epoch_time().map_err(InitError::InvalidEpoch)?;

    let grav = gravity.constants();
    let re = grav.radius_earth_km;
    let j2 = grav.j2;

    let ecco = elements.eccentricity;
    let inclo = elements.inclination;
    let argpo = elements.argument_of_perigee;
    let mo = elements.mean_anomaly;
    let bstar = elements.bstar;

    // days since 1949-12-31 0h UT
    let epoch_days = epoch.to_julian_date() - JD_SGP4_EPOCH_ORIGIN;
    let gsto = gstime(epoch_days + JD_SGP4_EPOCH_ORIGIN);

    let (eccentric_anomaly, true_anomaly) = newtonm(ecco, mo);

    let orbit = recover_mean_motion(grav, elements.mean_motion, ecco, inclo);
    let no = orbit.no;
    let ao = orbit.ao;
    let cosio = orbit.cosio;
    let cosio2 = orbit.cosio2;
    let sinio = orbit.sinio;
    let omeosq = orbit.omeosq;
    let rteosq = orbit.rteosq;

    let ss = 78.0 / re + 1.0;
    let qzms2t = ((120.0 - 78.0) / re).powi(4);

    let mut ne = NearEarthTerms {
        isimp: orbit.rp < 220.0 / re + 1.0,
        con41: orbit.con41,
        ..Default::default()
    };

    // ------------------------- perigee dependent atmosphere -------------------------
    let mut sfour = ss;
    let mut qzms24 = qzms2t;
    let perige = (orbit.rp - 1.0) * re;
    if perige < 156.0 {
        sfour = if perige < 98.0 { 20.0 } else { perige - 78.0 };
        qzms24 = ((120.0 - sfour) / re).powi(4);
        sfour = sfour / re + 1.0;
    }
    let pinvsq = 1.0 / orbit.posq;

    // ----------------------------------- drag terms ---------------------------------
    let tsi = 1.0 / (ao - sfour);
    ne.eta = ao * ecco * tsi;
    let etasq = ne.eta * ne.eta;
    let eeta = ecco * ne.eta;
    let psisq = (1.0 - etasq).abs();
    let coef = qzms24 * tsi.powi(4);
    let coef1 = coef / psisq.powf(3.5);
    let cc2 = coef1
        * no
        * (ao * (1.0 + 1.5 * etasq + eeta * (4.0 + etasq))
            + 0.375 * j2 * tsi / psisq * ne.con41 * (8.0 + 3.0 * etasq * (8.0 + etasq)));
    ne.cc1 = bstar * cc2;
    let cc3 = if ecco > 1.0e-4 {
        -2.0 * coef * tsi * grav.j3oj2 * no * sinio / ecco
    } else {
        0.0
    };
    ne.x1mth2 = 1.0 - cosio2;
    ne.cc4 = 2.0
        * no
        * coef1
        * ao
        * omeosq
        * (ne.eta * (2.0 + 0.5 * etasq) + ecco * (0.5 + 2.0 * etasq)
            - j2 * tsi / (ao * psisq)
                * (-3.0 * ne.con41 * (1.0 - 2.0 * eeta + etasq * (1.5 - 0.5 * eeta))
                    + 0.75
                        * ne.x1mth2
                        * (2.0 * etasq - eeta * (1.0 + etasq))
                        * (2.0 * argpo).cos()));
    ne.cc5 = 2.0 * coef1 * ao * omeosq * (1.0 + 2.75 * (etasq + eeta) + eeta * etasq);

    // -------------------------------- secular rates ---------------------------------
    let cosio4 = cosio2 * cosio2;
    let temp1 = 1.5 * j2 * pinvsq * no;
    let temp2 = 0.5 * temp1 * j2 * pinvsq;
    let temp3 = -0.46875 * grav.j4 * pinvsq * pinvsq * no;
    ne.mdot = no
        + 0.5 * temp1 * rteosq * ne.con41
        + 0.0625 * temp2 * rteosq * (13.0 - 78.0 * cosio2 + 137.0 * cosio4);
    ne.argpdot = -0.5 * temp1 * orbit.con42
        + 0.0625 * temp2 * (7.0 - 114.0 * cosio2 + 395.0 * cosio4)
        + temp3 * (3.0 - 36.0 * cosio2 + 49.0 * cosio4);
    let xhdot1 = -temp1 * cosio;
    ne.nodedot = xhdot1
        + (0.5 * temp2 * (4.0 - 19.0 * cosio2) + 2.0 * temp3 * (3.0 - 7.0 * cosio2)) * cosio;
    let xpidot = ne.argpdot + ne.nodedot;

    ne.omgcof = bstar * cc3 * argpo.cos();
    ne.xmcof = if ecco > 1.0e-4 {
        -X2O3 * coef * bstar / eeta
    } else {
        0.0
    };
    ne.nodecf = 3.5 * omeosq * xhdot1 * ne.cc1;
    ne.t2cof = 1.5 * ne.cc1;

    // avoid the division by zero for inclinations of 180 degrees
    let denom = if (cosio + 1.0).abs() > 1.5e-12 {
        1.0 + cosio
    } else {
        1.5e-12
    };
    ne.xlcof = -0.25 * grav.j3oj2 * sinio * (3.0 + 5.0 * cosio) / denom;
    ne.aycof = -0.5 * grav.j3oj2 * sinio;
    ne.delmo = (1.0 + ne.eta * mo.cos()).powi(3);
    ne.sinmao = mo.sin();
    ne.x7thm1 = 7.0 * cosio2 - 1.0;

    // --------------------------------- deep space -----------------------------------
    let deep_space = if DPI / no >= DEEP_SPACE_PERIOD_THRESHOLD {
        ne.isimp = true;
        Some(DeepSpaceTerms::new(&DeepSpaceInit {
            epoch_days,
            gsto,
            xke: grav.xke,
            no,
            ecco,
            eccsq: orbit.eccsq,
            inclo,
            nodeo: elements.right_ascension,
            argpo,
            mo,
            mdot: ne.mdot,
            nodedot: ne.nodedot,
            xpidot,
        }))
    } else {
        None
    };

    // ------------------------------ higher order drag -------------------------------
    if !ne.isimp {
        let cc1sq = ne.cc1 * ne.cc1;
        ne.d2 = 4.0 * ao * tsi * cc1sq;
        let temp = ne.d2 * tsi * ne.cc1 / 3.0;
        ne.d3 = (17.0 * ao + sfour) * temp;
        ne.d4 = 0.5 * temp * ao * tsi * (221.0 * ao + 31.0 * sfour) * ne.cc1;
        ne.t3cof = ne.d2 + 2.0 * cc1sq;
        ne.t4cof = 0.25 * (3.0 * ne.d3 + ne.cc1 * (12.0 * ne.d2 + 10.0 * cc1sq));
        ne.t5cof = 0.2
            * (3.0 * ne.d4
                + 12.0 * ne.cc1 * ne.d3
                + 6.0 * ne.d2 * ne.d2
                + 15.0 * cc1sq * (2.0 * ne.d2 + cc1sq));
    }

    Ok(PropagationState {
        elements: elements.clone(),
        gravity,
        epoch,
        mean: EpochMeanElements {
            no,
            ao,
            ecco,
            inclo,
            nodeo: elements.right_ascension,
            argpo,
            mo,
            bstar,
            eccentric_anomaly,
            true_anomaly,
        },
        near_earth: ne,
        deep_space,
    })
}

#[cfg(test)]
mod initializer_test {
    use super::*;
    use crate::orbital_elements::{ElementSetMetadata, MeanElements};
    use approx::assert_relative_eq;

    fn record(mean_motion: f64, eccentricity: f64, inclination: f64) -> OrbitalElementRecord {
        OrbitalElementRecord::from_mean_elements(
            ElementSetMetadata::default(),
            &MeanElements {
                epoch_year: 20,
                epoch_day: 100.5,
                mean_motion,
                mean_motion_dot: 0.0,
                mean_motion_ddot: 0.0,
                bstar: 1e-4,
                inclination,
                right_ascension: 30.0,
                eccentricity,
                argument_of_perigee: 45.0,
                mean_anomaly: 10.0,
            },
        )
    }

    #[test]
    fn test_recovered_mean_motion() {
        let grav = GravityModel::Wgs72.constants();
        let rec = record(10.82419157, 0.1859667, 34.2682);
        let orbit = recover_mean_motion(grav, rec.mean_motion, rec.eccentricity, rec.inclination);

        // J2 makes the recovered mean motion slightly smaller for this inclination
        assert!(orbit.no < rec.mean_motion);
        assert_relative_eq!(orbit.no, rec.mean_motion, max_relative = 1e-3);
        assert_relative_eq!(
            orbit.ao,
            (grav.xke / orbit.no).powf(2.0 / 3.0),
            epsilon = 1e-15
        );
        assert_relative_eq!(orbit.con41, 3.0 * orbit.cosio2 - 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_method_selection() {
        let leo = sgp4_init(&record(15.5, 0.001, 51.6), GravityModel::Wgs84).unwrap();
        assert!(leo.deep_space.is_none());
        assert!(!leo.near_earth.isimp);
        assert!(leo.near_earth.d2 > 0.0);

        // ~190 km perigee: simplified drag
        let low = sgp4_init(&record(16.3, 0.0005, 51.6), GravityModel::Wgs84).unwrap();
        assert!(low.deep_space.is_none());
        assert!(low.near_earth.isimp);
        assert_eq!(low.near_earth.d2, 0.0);

        // 2π / n = 240 min
        let deep = sgp4_init(&record(6.0, 0.01, 20.0), GravityModel::Wgs84).unwrap();
        assert!(deep.deep_space.is_some());
        assert!(deep.near_earth.isimp);
        assert!(deep.resonance().is_none());
    }

    #[test]
    fn test_invalid_elements() {
        let mut bad = record(15.5, 0.001, 51.6);
        bad.mean_motion = 0.0;
        assert_eq!(
            sgp4_init(&bad, GravityModel::Wgs84).unwrap_err(),
            InitError::NonPositiveMeanMotion(0.0)
        );

        let mut bad = record(15.5, 0.001, 51.6);
        bad.eccentricity = 1.2;
        assert_eq!(
            sgp4_init(&bad, GravityModel::Wgs84).unwrap_err(),
            InitError::EccentricityOutOfRange(1.2)
        );

        let mut bad = record(15.5, 0.001, 51.6);
        bad.epoch_day = 400.0;
        assert!(matches!(
            sgp4_init(&bad, GravityModel::Wgs84),
            Err(InitError::InvalidEpoch(_))
        ));
    }
}
