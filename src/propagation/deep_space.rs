//! # Deep-space perturbations (SDP4)
//!
//! Orbits with a period of 225 minutes or more are perturbed by the Moon and the Sun, and some of
//! them are in resonance with the rotation of the Earth. This module provides:
//!
//! - the **common terms** (`dscom`): geometry of the lunar and solar orbits at epoch and the
//!   amplitudes of the long-period periodics,
//! - the **secular rates** and the **resonance coefficients** (`dsinit`),
//! - the **secular / resonance step** (`dspace`), called by the kernel before Kepler's equation,
//! - the **long-period periodics** (`dpper`), called by the kernel after the secular step.
//!
//! ## Resonances
//!
//! | Band      | Mean motion (rad/min)          | Condition  | Terms |
//! |-----------|--------------------------------|------------|-------|
//! | one day   | [0.0034906585, 0.0052359877)   |            | 3     |
//! | half day  | [0.00826, 0.00924]             | e ≥ 0.5    | 10    |
//!
//! The resonance terms are integrated numerically with a fixed 720 minute step. The integrator
//! checkpoint (time, mean motion, mean longitude) is kept between calls, so that successive
//! forward queries only integrate the remaining interval. The checkpoint is reset when the time
//! changes sign or moves back toward the epoch.
use std::f64::consts::PI;

use crate::constants::DPI;

// ------------------------------------------------------------------------------------------------
// Constants
// ------------------------------------------------------------------------------------------------

/// Eccentricity of the solar orbit
const ZES: f64 = 0.01675;
/// Eccentricity of the lunar orbit
const ZEL: f64 = 0.05490;
const C1SS: f64 = 2.9864797e-6;
const C1L: f64 = 4.7968065e-7;
const ZSINIS: f64 = 0.39785416;
const ZCOSIS: f64 = 0.91744867;
const ZCOSGS: f64 = 0.1945905;
const ZSINGS: f64 = -0.98088458;
/// Solar mean motion (rad/min)
const ZNS: f64 = 1.19459e-5;
/// Lunar mean motion (rad/min)
const ZNL: f64 = 1.5835218e-4;

/// Earth rotation rate (rad/min)
const RPTIM: f64 = 4.37526908801129966e-3;

const Q22: f64 = 1.7891679e-6;
const Q31: f64 = 2.1460748e-6;
const Q33: f64 = 2.2123015e-7;
const ROOT22: f64 = 1.7891679e-6;
const ROOT44: f64 = 7.3636953e-9;
const ROOT54: f64 = 2.1765803e-9;
const ROOT32: f64 = 3.7393792e-7;
const ROOT52: f64 = 1.1428639e-7;

const FASX2: f64 = 0.13130908;
const FASX4: f64 = 2.8843198;
const FASX6: f64 = 0.37448087;
const G22: f64 = 5.7686396;
const G32: f64 = 0.95240898;
const G44: f64 = 1.8014998;
const G52: f64 = 1.0508330;
const G54: f64 = 4.4108898;

/// Integrator step (min)
const STEPP: f64 = 720.0;
const STEPN: f64 = -720.0;
/// STEPP² / 2
const STEP2: f64 = 259_200.0;

/// Below this inclination the node terms are not computed
const SHALLOW_INCLINATION: f64 = 5.2359877e-2;

/// Resonance band of a deep-space orbit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResonanceBand {
    /// Geosynchronous orbits, period close to one sidereal day
    OneDay,
    /// Molniya type orbits, period close to half a sidereal day and e ≥ 0.5
    HalfDay,
}

/// Mean elements flowing through the deep-space steps of the kernel.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MeanState {
    pub(crate) ecc: f64,
    pub(crate) incl: f64,
    pub(crate) argp: f64,
    pub(crate) node: f64,
    pub(crate) mean_anomaly: f64,
    pub(crate) mean_motion: f64,
}

/// Inputs of the deep-space initialization.
pub(crate) struct DeepSpaceInit {
    /// Days since 1949-12-31 0h UT
    pub(crate) epoch_days: f64,
    /// Greenwich sidereal time at epoch (rad)
    pub(crate) gsto: f64,
    pub(crate) xke: f64,
    /// Recovered mean motion (rad/min)
    pub(crate) no: f64,
    pub(crate) ecco: f64,
    pub(crate) eccsq: f64,
    pub(crate) inclo: f64,
    pub(crate) nodeo: f64,
    pub(crate) argpo: f64,
    pub(crate) mo: f64,
    pub(crate) mdot: f64,
    pub(crate) nodedot: f64,
    pub(crate) xpidot: f64,
}

// ------------------------------------------------------------------------------------------------
// Lunar / solar common terms
// ------------------------------------------------------------------------------------------------

/// Orientation of the perturbing body orbit with respect to the satellite node.
struct BodyOrientation {
    cosg: f64,
    sing: f64,
    cosi: f64,
    sini: f64,
    cosh: f64,
    sinh: f64,
}

/// Trigonometric quantities of the satellite orbit at epoch.
struct OrbitGeometry {
    sinim: f64,
    cosim: f64,
    sinomm: f64,
    cosomm: f64,
    em: f64,
    emsq: f64,
    betasq: f64,
    rtemsq: f64,
    xnoi: f64,
}

/// `s` and `z` coefficients of one perturbing body.
#[derive(Debug, Clone, Copy)]
struct ThirdBodyTerms {
    s1: f64,
    s2: f64,
    s3: f64,
    s4: f64,
    s5: f64,
    s6: f64,
    s7: f64,
    z1: f64,
    z2: f64,
    z3: f64,
    z11: f64,
    z12: f64,
    z13: f64,
    z21: f64,
    z22: f64,
    z23: f64,
    z31: f64,
    z32: f64,
    z33: f64,
}

impl ThirdBodyTerms {
    fn compute(body: &BodyOrientation, cc: f64, orbit: &OrbitGeometry) -> Self {
        let a1 = body.cosg * body.cosh + body.sing * body.cosi * body.sinh;
        let a3 = -body.sing * body.cosh + body.cosg * body.cosi * body.sinh;
        let a7 = -body.cosg * body.sinh + body.sing * body.cosi * body.cosh;
        let a8 = body.sing * body.sini;
        let a9 = body.sing * body.sinh + body.cosg * body.cosi * body.cosh;
        let a10 = body.cosg * body.sini;
        let a2 = orbit.cosim * a7 + orbit.sinim * a8;
        let a4 = orbit.cosim * a9 + orbit.sinim * a10;
        let a5 = -orbit.sinim * a7 + orbit.cosim * a8;
        let a6 = -orbit.sinim * a9 + orbit.cosim * a10;

        let x1 = a1 * orbit.cosomm + a2 * orbit.sinomm;
        let x2 = a3 * orbit.cosomm + a4 * orbit.sinomm;
        let x3 = -a1 * orbit.sinomm + a2 * orbit.cosomm;
        let x4 = -a3 * orbit.sinomm + a4 * orbit.cosomm;
        let x5 = a5 * orbit.sinomm;
        let x6 = a6 * orbit.sinomm;
        let x7 = a5 * orbit.cosomm;
        let x8 = a6 * orbit.cosomm;

        let emsq = orbit.emsq;
        let z31 = 12.0 * x1 * x1 - 3.0 * x3 * x3;
        let z32 = 24.0 * x1 * x2 - 6.0 * x3 * x4;
        let z33 = 12.0 * x2 * x2 - 3.0 * x4 * x4;
        let z1 = 3.0 * (a1 * a1 + a2 * a2) + z31 * emsq;
        let z2 = 6.0 * (a1 * a3 + a2 * a4) + z32 * emsq;
        let z3 = 3.0 * (a3 * a3 + a4 * a4) + z33 * emsq;
        let z11 = -6.0 * a1 * a5 + emsq * (-24.0 * x1 * x7 - 6.0 * x3 * x5);
        let z12 = -6.0 * (a1 * a6 + a3 * a5)
            + emsq * (-24.0 * (x2 * x7 + x1 * x8) - 6.0 * (x3 * x6 + x4 * x5));
        let z13 = -6.0 * a3 * a6 + emsq * (-24.0 * x2 * x8 - 6.0 * x4 * x6);
        let z21 = 6.0 * a2 * a5 + emsq * (24.0 * x1 * x5 - 6.0 * x3 * x7);
        let z22 = 6.0 * (a4 * a5 + a2 * a6)
            + emsq * (24.0 * (x2 * x5 + x1 * x6) - 6.0 * (x4 * x7 + x3 * x8));
        let z23 = 6.0 * a4 * a6 + emsq * (24.0 * x2 * x6 - 6.0 * x4 * x8);

        let s3 = cc * orbit.xnoi;
        let s2 = -0.5 * s3 / orbit.rtemsq;
        let s4 = s3 * orbit.rtemsq;

        ThirdBodyTerms {
            s1: -15.0 * orbit.em * s4,
            s2,
            s3,
            s4,
            s5: x1 * x3 + x2 * x4,
            s6: x2 * x3 + x1 * x4,
            s7: x2 * x4 - x1 * x3,
            z1: z1 + z1 + orbit.betasq * z31,
            z2: z2 + z2 + orbit.betasq * z32,
            z3: z3 + z3 + orbit.betasq * z33,
            z11,
            z12,
            z13,
            z21,
            z22,
            z23,
            z31,
            z32,
            z33,
        }
    }
}

/// Long-period contributions of one body to e, i, M, ω (+ Ω cos i) and Ω sin i.
#[derive(Debug, Clone, Copy, Default)]
struct LongPeriodTerms {
    e: f64,
    i: f64,
    l: f64,
    gh: f64,
    h: f64,
}

/// Amplitudes of the long-period periodics of one perturbing body.
#[derive(Debug, Clone)]
struct PeriodicAmplitudes {
    e2: f64,
    e3: f64,
    i2: f64,
    i3: f64,
    l2: f64,
    l3: f64,
    l4: f64,
    gh2: f64,
    gh3: f64,
    gh4: f64,
    h2: f64,
    h3: f64,
}

/// Long-period model of one perturbing body: amplitudes and phase.
#[derive(Debug, Clone)]
struct PerturbingBody {
    amplitudes: PeriodicAmplitudes,
    /// Mean anomaly of the body at epoch (rad)
    mean_anomaly: f64,
    /// Mean motion of the body (rad/min)
    mean_motion: f64,
    eccentricity: f64,
}

impl PerturbingBody {
    fn new(
        terms: &ThirdBodyTerms,
        emsq: f64,
        eccentricity: f64,
        mean_anomaly: f64,
        mean_motion: f64,
    ) -> Self {
        let t = terms;
        PerturbingBody {
            amplitudes: PeriodicAmplitudes {
                e2: 2.0 * t.s1 * t.s6,
                e3: 2.0 * t.s1 * t.s7,
                i2: 2.0 * t.s2 * t.z12,
                i3: 2.0 * t.s2 * (t.z13 - t.z11),
                l2: -2.0 * t.s3 * t.z2,
                l3: -2.0 * t.s3 * (t.z3 - t.z1),
                l4: -2.0 * t.s3 * (-21.0 - 9.0 * emsq) * eccentricity,
                gh2: 2.0 * t.s4 * t.z32,
                gh3: 2.0 * t.s4 * (t.z33 - t.z31),
                gh4: -18.0 * t.s4 * eccentricity,
                h2: -2.0 * t.s2 * t.z22,
                h3: -2.0 * t.s2 * (t.z23 - t.z21),
            },
            mean_anomaly,
            mean_motion,
            eccentricity,
        }
    }

    fn long_period(&self, t: f64) -> LongPeriodTerms {
        let a = &self.amplitudes;
        let zm = self.mean_anomaly + self.mean_motion * t;
        let zf = zm + 2.0 * self.eccentricity * zm.sin();
        let sinzf = zf.sin();
        let f2 = 0.5 * sinzf * sinzf - 0.25;
        let f3 = -0.5 * sinzf * zf.cos();

        LongPeriodTerms {
            e: a.e2 * f2 + a.e3 * f3,
            i: a.i2 * f2 + a.i3 * f3,
            l: a.l2 * f2 + a.l3 * f3 + a.l4 * sinzf,
            gh: a.gh2 * f2 + a.gh3 * f3 + a.gh4 * sinzf,
            h: a.h2 * f2 + a.h3 * f3,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Resonance
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum ResonanceCoefficients {
    OneDay {
        del1: f64,
        del2: f64,
        del3: f64,
    },
    HalfDay {
        d2201: f64,
        d2211: f64,
        d3210: f64,
        d3222: f64,
        d4410: f64,
        d4422: f64,
        d5220: f64,
        d5232: f64,
        d5421: f64,
        d5433: f64,
    },
}

/// State of the resonance integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ResonanceCheckpoint {
    /// Integrated time (min)
    atime: f64,
    /// Mean motion at `atime`
    xni: f64,
    /// Mean longitude at `atime`
    xli: f64,
}

#[derive(Debug, Clone)]
struct Resonance {
    coefficients: ResonanceCoefficients,
    xfact: f64,
    xlamo: f64,
    checkpoint: ResonanceCheckpoint,
}

impl Resonance {
    /// Rates of the mean motion and of the mean longitude at the checkpoint.
    ///
    /// Return
    /// ------
    /// * `(xndt, xldot, xnddt)`
    fn derivatives(&self, argpo: f64, argpdot: f64) -> (f64, f64, f64) {
        let xli = self.checkpoint.xli;
        let xldot = self.checkpoint.xni + self.xfact;

        let (xndt, xnddt) = match &self.coefficients {
            ResonanceCoefficients::OneDay { del1, del2, del3 } => {
                let xndt = del1 * (xli - FASX2).sin()
                    + del2 * (2.0 * (xli - FASX4)).sin()
                    + del3 * (3.0 * (xli - FASX6)).sin();
                let xnddt = del1 * (xli - FASX2).cos()
                    + 2.0 * del2 * (2.0 * (xli - FASX4)).cos()
                    + 3.0 * del3 * (3.0 * (xli - FASX6)).cos();
                (xndt, xnddt)
            }
            ResonanceCoefficients::HalfDay {
                d2201,
                d2211,
                d3210,
                d3222,
                d4410,
                d4422,
                d5220,
                d5232,
                d5421,
                d5433,
            } => {
                let xomi = argpo + argpdot * self.checkpoint.atime;
                let x2omi = xomi + xomi;
                let x2li = xli + xli;
                let xndt = d2201 * (x2omi + xli - G22).sin()
                    + d2211 * (xli - G22).sin()
                    + d3210 * (xomi + xli - G32).sin()
                    + d3222 * (-xomi + xli - G32).sin()
                    + d4410 * (x2omi + x2li - G44).sin()
                    + d4422 * (x2li - G44).sin()
                    + d5220 * (xomi + xli - G52).sin()
                    + d5232 * (-xomi + xli - G52).sin()
                    + d5421 * (xomi + x2li - G54).sin()
                    + d5433 * (-xomi + x2li - G54).sin();
                let xnddt = d2201 * (x2omi + xli - G22).cos()
                    + d2211 * (xli - G22).cos()
                    + d3210 * (xomi + xli - G32).cos()
                    + d3222 * (-xomi + xli - G32).cos()
                    + d5220 * (xomi + xli - G52).cos()
                    + d5232 * (-xomi + xli - G52).cos()
                    + 2.0
                        * (d4410 * (x2omi + x2li - G44).cos()
                            + d4422 * (x2li - G44).cos()
                            + d5421 * (xomi + x2li - G54).cos()
                            + d5433 * (-xomi + x2li - G54).cos());
                (xndt, xnddt)
            }
        };

        (xndt, xldot, xnddt * xldot)
    }
}

// ------------------------------------------------------------------------------------------------
// Deep-space terms
// ------------------------------------------------------------------------------------------------

/// Lunar/solar secular rates (rad/min, 1/min for the eccentricity).
#[derive(Debug, Clone, Copy)]
struct SecularRates {
    dedt: f64,
    didt: f64,
    dmdt: f64,
    domdt: f64,
    dnodt: f64,
}

/// Everything the kernel needs for a deep-space orbit.
#[derive(Debug, Clone)]
pub(crate) struct DeepSpaceTerms {
    solar: PerturbingBody,
    lunar: PerturbingBody,
    rates: SecularRates,
    /// Greenwich sidereal time at epoch (rad)
    gsto: f64,
    resonance: Option<Resonance>,
}

impl DeepSpaceTerms {
    /// Build the deep-space terms of an orbit at its epoch.
    pub(crate) fn new(init: &DeepSpaceInit) -> Self {
        // ------------------------- orbit and body geometry ------------------------
        let (snodm, cnodm) = init.nodeo.sin_cos();
        let (sinomm, cosomm) = init.argpo.sin_cos();
        let (sinim, cosim) = init.inclo.sin_cos();
        let em = init.ecco;
        let emsq = em * em;
        let betasq = 1.0 - emsq;
        let orbit = OrbitGeometry {
            sinim,
            cosim,
            sinomm,
            cosomm,
            em,
            emsq,
            betasq,
            rtemsq: betasq.sqrt(),
            xnoi: 1.0 / init.no,
        };

        let day = init.epoch_days + 18261.5;
        let xnodce = (4.5236020 - 9.2422029e-4 * day) % DPI;
        let stem = xnodce.sin();
        let ctem = xnodce.cos();
        let zcosil = 0.91375164 - 0.03568096 * ctem;
        let zsinil = (1.0 - zcosil * zcosil).sqrt();
        let zsinhl = 0.089683511 * stem / zsinil;
        let zcoshl = (1.0 - zsinhl * zsinhl).sqrt();
        let gam = 5.8351514 + 0.0019443680 * day;
        let zx = 0.39785416 * stem / zsinil;
        let zy = zcoshl * ctem + 0.91744867 * zsinhl * stem;
        let zx = gam + zx.atan2(zy) - xnodce;

        let sun = BodyOrientation {
            cosg: ZCOSGS,
            sing: ZSINGS,
            cosi: ZCOSIS,
            sini: ZSINIS,
            cosh: cnodm,
            sinh: snodm,
        };
        let moon = BodyOrientation {
            cosg: zx.cos(),
            sing: zx.sin(),
            cosi: zcosil,
            sini: zsinil,
            cosh: zcoshl * cnodm + zsinhl * snodm,
            sinh: snodm * zcoshl - cnodm * zsinhl,
        };

        let ss = ThirdBodyTerms::compute(&sun, C1SS, &orbit);
        let s = ThirdBodyTerms::compute(&moon, C1L, &orbit);

        let zmol = (4.7199672 + 0.22997150 * day - gam) % DPI;
        let zmos = (6.2565837 + 0.017201977 * day) % DPI;

        let solar = PerturbingBody::new(&ss, emsq, ZES, zmos, ZNS);
        let lunar = PerturbingBody::new(&s, emsq, ZEL, zmol, ZNL);

        // ------------------------------ secular rates -----------------------------
        let ses = ss.s1 * ZNS * ss.s5;
        let sis = ss.s2 * ZNS * (ss.z11 + ss.z13);
        let sls = -ZNS * ss.s3 * (ss.z1 + ss.z3 - 14.0 - 6.0 * emsq);
        let sghs = ss.s4 * ZNS * (ss.z31 + ss.z33 - 6.0);
        let mut shs = -ZNS * ss.s2 * (ss.z21 + ss.z23);
        if init.inclo < SHALLOW_INCLINATION {
            shs = 0.0;
        }
        if sinim != 0.0 {
            shs /= sinim;
        }
        let sgs = sghs - cosim * shs;

        let dedt = ses + s.s1 * ZNL * s.s5;
        let didt = sis + s.s2 * ZNL * (s.z11 + s.z13);
        let dmdt = sls - ZNL * s.s3 * (s.z1 + s.z3 - 14.0 - 6.0 * emsq);
        let sghl = s.s4 * ZNL * (s.z31 + s.z33 - 6.0);
        let mut shll = -ZNL * s.s2 * (s.z21 + s.z23);
        if init.inclo < SHALLOW_INCLINATION {
            shll = 0.0;
        }
        let mut domdt = sgs + sghl;
        let mut dnodt = shs;
        if sinim != 0.0 {
            domdt -= cosim / sinim * shll;
            dnodt += shll / sinim;
        }
        let rates = SecularRates {
            dedt,
            didt,
            dmdt,
            domdt,
            dnodt,
        };

        let resonance = Self::init_resonance(init, &orbit, &rates);

        DeepSpaceTerms {
            solar,
            lunar,
            rates,
            gsto: init.gsto,
            resonance,
        }
    }

    /// Select the resonance band and compute its coefficients.
    fn init_resonance(
        init: &DeepSpaceInit,
        orbit: &OrbitGeometry,
        rates: &SecularRates,
    ) -> Option<Resonance> {
        let nm = init.no;
        let em = init.ecco;

        let band = if (8.26e-3..=9.24e-3).contains(&nm) && em >= 0.5 {
            ResonanceBand::HalfDay
        } else if (0.0034906585..0.0052359877).contains(&nm) {
            ResonanceBand::OneDay
        } else {
            return None;
        };

        let theta = init.gsto % DPI;
        let aonv = (nm / init.xke).powf(2.0 / 3.0);
        let sinim = orbit.sinim;
        let cosim = orbit.cosim;

        let (coefficients, xlamo, xfact) = match band {
            ResonanceBand::HalfDay => {
                let cosisq = cosim * cosim;
                let emsq = init.eccsq;
                let eoc = em * emsq;
                let g201 = -0.306 - (em - 0.64) * 0.440;

                let (g211, g310, g322, g410, g422, g520) = if em <= 0.65 {
                    (
                        3.616 - 13.2470 * em + 16.2900 * emsq,
                        -19.302 + 117.3900 * em - 228.4190 * emsq + 156.5910 * eoc,
                        -18.9068 + 109.7927 * em - 214.6334 * emsq + 146.5816 * eoc,
                        -41.122 + 242.6940 * em - 471.0940 * emsq + 313.9530 * eoc,
                        -146.407 + 841.8800 * em - 1629.014 * emsq + 1083.4350 * eoc,
                        -532.114 + 3017.977 * em - 5740.032 * emsq + 3708.2760 * eoc,
                    )
                } else {
                    let g520 = if em > 0.715 {
                        -5149.66 + 29936.92 * em - 54087.36 * emsq + 31324.56 * eoc
                    } else {
                        1464.74 - 4664.75 * em + 3763.64 * emsq
                    };
                    (
                        -72.099 + 331.819 * em - 508.738 * emsq + 266.724 * eoc,
                        -346.844 + 1582.851 * em - 2415.925 * emsq + 1246.113 * eoc,
                        -342.585 + 1554.908 * em - 2366.899 * emsq + 1215.972 * eoc,
                        -1052.797 + 4758.686 * em - 7193.992 * emsq + 3651.957 * eoc,
                        -3581.690 + 16178.110 * em - 24462.770 * emsq + 12422.520 * eoc,
                        g520,
                    )
                };

                let (g533, g521, g532) = if em < 0.7 {
                    (
                        -919.22770 + 4988.6100 * em - 9064.7700 * emsq + 5542.21 * eoc,
                        -822.71072 + 4568.6173 * em - 8491.4146 * emsq + 5337.524 * eoc,
                        -853.66600 + 4690.2500 * em - 8624.7700 * emsq + 5341.4 * eoc,
                    )
                } else {
                    (
                        -37995.780 + 161616.52 * em - 229838.20 * emsq + 109377.94 * eoc,
                        -51752.104 + 218913.95 * em - 309468.16 * emsq + 146349.42 * eoc,
                        -40023.880 + 170470.89 * em - 242699.48 * emsq + 115605.82 * eoc,
                    )
                };

                let sini2 = sinim * sinim;
                let f220 = 0.75 * (1.0 + 2.0 * cosim + cosisq);
                let f221 = 1.5 * sini2;
                let f321 = 1.875 * sinim * (1.0 - 2.0 * cosim - 3.0 * cosisq);
                let f322 = -1.875 * sinim * (1.0 + 2.0 * cosim - 3.0 * cosisq);
                let f441 = 35.0 * sini2 * f220;
                let f442 = 39.3750 * sini2 * sini2;
                let f522 = 9.84375
                    * sinim
                    * (sini2 * (1.0 - 2.0 * cosim - 5.0 * cosisq)
                        + 0.33333333 * (-2.0 + 4.0 * cosim + 6.0 * cosisq));
                let f523 = sinim
                    * (4.92187512 * sini2 * (-2.0 - 4.0 * cosim + 10.0 * cosisq)
                        + 6.56250012 * (1.0 + 2.0 * cosim - 3.0 * cosisq));
                let f542 = 29.53125
                    * sinim
                    * (2.0 - 8.0 * cosim + cosisq * (-12.0 + 8.0 * cosim + 10.0 * cosisq));
                let f543 = 29.53125
                    * sinim
                    * (-2.0 - 8.0 * cosim + cosisq * (12.0 + 8.0 * cosim - 10.0 * cosisq));

                let xno2 = nm * nm;
                let ainv2 = aonv * aonv;
                let mut temp1 = 3.0 * xno2 * ainv2;
                let mut temp = temp1 * ROOT22;
                let d2201 = temp * f220 * g201;
                let d2211 = temp * f221 * g211;
                temp1 *= aonv;
                temp = temp1 * ROOT32;
                let d3210 = temp * f321 * g310;
                let d3222 = temp * f322 * g322;
                temp1 *= aonv;
                temp = 2.0 * temp1 * ROOT44;
                let d4410 = temp * f441 * g410;
                let d4422 = temp * f442 * g422;
                temp1 *= aonv;
                temp = temp1 * ROOT52;
                let d5220 = temp * f522 * g520;
                let d5232 = temp * f523 * g532;
                temp = 2.0 * temp1 * ROOT54;
                let d5421 = temp * f542 * g521;
                let d5433 = temp * f543 * g533;

                let xlamo = (init.mo + init.nodeo + init.nodeo - theta - theta) % DPI;
                let xfact =
                    init.mdot + rates.dmdt + 2.0 * (init.nodedot + rates.dnodt - RPTIM) - init.no;

                (
                    ResonanceCoefficients::HalfDay {
                        d2201,
                        d2211,
                        d3210,
                        d3222,
                        d4410,
                        d4422,
                        d5220,
                        d5232,
                        d5421,
                        d5433,
                    },
                    xlamo,
                    xfact,
                )
            }
            ResonanceBand::OneDay => {
                let emsq = orbit.emsq;
                let g200 = 1.0 + emsq * (-2.5 + 0.8125 * emsq);
                let g310 = 1.0 + 2.0 * emsq;
                let g300 = 1.0 + emsq * (-6.0 + 6.60937 * emsq);
                let f220 = 0.75 * (1.0 + cosim) * (1.0 + cosim);
                let f311 = 0.9375 * sinim * sinim * (1.0 + 3.0 * cosim) - 0.75 * (1.0 + cosim);
                let mut f330 = 1.0 + cosim;
                f330 = 1.875 * f330 * f330 * f330;

                let del1 = 3.0 * nm * nm * aonv * aonv;
                let del2 = 2.0 * del1 * f220 * g200 * Q22;
                let del3 = 3.0 * del1 * f330 * g300 * Q33 * aonv;
                let del1 = del1 * f311 * g310 * Q31 * aonv;

                let xlamo = (init.mo + init.nodeo + init.argpo - theta) % DPI;
                let xfact = init.mdot + init.xpidot - RPTIM + rates.dmdt + rates.domdt
                    + rates.dnodt
                    - init.no;

                (
                    ResonanceCoefficients::OneDay { del1, del2, del3 },
                    xlamo,
                    xfact,
                )
            }
        };

        Some(Resonance {
            coefficients,
            xfact,
            xlamo,
            checkpoint: ResonanceCheckpoint {
                atime: 0.0,
                xni: init.no,
                xli: xlamo,
            },
        })
    }

    pub(crate) fn resonance_band(&self) -> Option<ResonanceBand> {
        self.resonance.as_ref().map(|r| match r.coefficients {
            ResonanceCoefficients::OneDay { .. } => ResonanceBand::OneDay,
            ResonanceCoefficients::HalfDay { .. } => ResonanceBand::HalfDay,
        })
    }

    /// Apply the lunar/solar secular drift and, for resonant orbits, advance the resonance
    /// integrator up to `t` (`dspace`).
    ///
    /// Arguments
    /// ---------
    /// * `t`: minutes since epoch
    /// * `mean`: mean elements after the near-earth secular update, updated in place
    /// * `argpo`, `argpdot`: argument of perigee at epoch and its secular rate
    /// * `no`: recovered mean motion at epoch
    pub(crate) fn apply_secular(
        &mut self,
        t: f64,
        mean: &mut MeanState,
        argpo: f64,
        argpdot: f64,
        no: f64,
    ) {
        let theta = (self.gsto + t * RPTIM) % DPI;
        mean.ecc += self.rates.dedt * t;
        mean.incl += self.rates.didt * t;
        mean.argp += self.rates.domdt * t;
        mean.node += self.rates.dnodt * t;
        mean.mean_anomaly += self.rates.dmdt * t;

        let Some(res) = self.resonance.as_mut() else {
            return;
        };

        let cp = res.checkpoint;
        if cp.atime == 0.0 || t * cp.atime <= 0.0 || t.abs() < cp.atime.abs() {
            res.checkpoint = ResonanceCheckpoint {
                atime: 0.0,
                xni: no,
                xli: res.xlamo,
            };
        }

        let delt = if t > 0.0 { STEPP } else { STEPN };
        let (ft, xndt, xldot, xnddt) = loop {
            let (xndt, xldot, xnddt) = res.derivatives(argpo, argpdot);
            if (t - res.checkpoint.atime).abs() >= STEPP {
                res.checkpoint.xli += xldot * delt + xndt * STEP2;
                res.checkpoint.xni += xndt * delt + xnddt * STEP2;
                res.checkpoint.atime += delt;
            } else {
                break (t - res.checkpoint.atime, xndt, xldot, xnddt);
            }
        };

        let nm = res.checkpoint.xni + xndt * ft + xnddt * ft * ft * 0.5;
        let xl = res.checkpoint.xli + xldot * ft + xndt * ft * ft * 0.5;
        mean.mean_anomaly = match res.coefficients {
            ResonanceCoefficients::OneDay { .. } => xl - mean.node - mean.argp + theta,
            ResonanceCoefficients::HalfDay { .. } => xl - 2.0 * mean.node + 2.0 * theta,
        };
        let dndt = nm - no;
        mean.mean_motion = no + dndt;
    }

    /// Add the lunar/solar long-period periodics at time `t` (`dpper`).
    ///
    /// Near-equatorial orbits (i < 0.2 rad) are corrected through the vector
    /// (sin i sin Ω, sin i cos Ω) to avoid the division by sin i. The node
    /// then follows the unwrapped node within ±π and may stay negative, as in
    /// the improved operation mode that also supplies the IAU-82 sidereal time.
    pub(crate) fn apply_periodics(&self, t: f64, osc: &mut MeanState) {
        let sun = self.solar.long_period(t);
        let moon = self.lunar.long_period(t);
        let pe = sun.e + moon.e;
        let pinc = sun.i + moon.i;
        let pl = sun.l + moon.l;
        let mut pgh = sun.gh + moon.gh;
        let mut ph = sun.h + moon.h;

        osc.incl += pinc;
        osc.ecc += pe;
        let sinip = osc.incl.sin();
        let cosip = osc.incl.cos();

        if osc.incl >= 0.2 {
            ph /= sinip;
            pgh -= cosip * ph;
            osc.argp += pgh;
            osc.node += ph;
            osc.mean_anomaly += pl;
        } else {
            let sinop = osc.node.sin();
            let cosop = osc.node.cos();
            let mut alfdp = sinip * sinop;
            let mut betdp = sinip * cosop;
            let dalf = ph * cosop + pinc * cosip * sinop;
            let dbet = -ph * sinop + pinc * cosip * cosop;
            alfdp += dalf;
            betdp += dbet;
            osc.node %= DPI;
            let mut xls = osc.mean_anomaly + osc.argp + cosip * osc.node;
            let dls = pl + pgh - pinc * osc.node * sinip;
            xls += dls;
            let xnoh = osc.node;
            osc.node = alfdp.atan2(betdp);
            if (xnoh - osc.node).abs() > PI {
                if osc.node < xnoh {
                    osc.node += DPI;
                } else {
                    osc.node -= DPI;
                }
            }
            osc.mean_anomaly += pl;
            osc.argp = xls - osc.mean_anomaly - cosip * osc.node;
        }
    }
}

#[cfg(test)]
mod deep_space_test {
    use super::*;

    fn init(no: f64, ecco: f64, inclo: f64) -> DeepSpaceInit {
        DeepSpaceInit {
            epoch_days: 25_000.0,
            gsto: 1.0,
            xke: 0.0743669161331734,
            no,
            ecco,
            eccsq: ecco * ecco,
            inclo,
            nodeo: 0.5,
            argpo: 4.7,
            mo: 0.3,
            mdot: no,
            nodedot: -1e-7,
            xpidot: 2e-7,
        }
    }

    #[test]
    fn test_resonance_bands() {
        let geo = DeepSpaceTerms::new(&init(0.004375, 0.0002, 0.001));
        assert_eq!(geo.resonance_band(), Some(ResonanceBand::OneDay));

        let molniya = DeepSpaceTerms::new(&init(0.00875, 0.7, 1.1));
        assert_eq!(molniya.resonance_band(), Some(ResonanceBand::HalfDay));

        // half-day mean motion but low eccentricity (GPS like)
        let gps = DeepSpaceTerms::new(&init(0.00875, 0.01, 0.96));
        assert_eq!(gps.resonance_band(), None);
    }

    #[test]
    fn test_periodics_small_at_epoch() {
        let terms = DeepSpaceTerms::new(&init(0.00875, 0.7, 1.1));
        let mut osc = MeanState {
            ecc: 0.7,
            incl: 1.1,
            argp: 4.7,
            node: 0.5,
            mean_anomaly: 0.3,
            mean_motion: 0.00875,
        };
        terms.apply_periodics(0.0, &mut osc);
        assert!((osc.ecc - 0.7).abs() < 1e-3);
        assert!((osc.incl - 1.1).abs() < 1e-3);
    }

    #[test]
    fn test_checkpoint_reset() {
        let mut terms = DeepSpaceTerms::new(&init(0.004375, 0.0002, 0.001));
        let mut mean = MeanState {
            ecc: 0.0002,
            incl: 0.001,
            argp: 4.7,
            node: 0.5,
            mean_anomaly: 0.3,
            mean_motion: 0.004375,
        };

        terms.apply_secular(2000.0, &mut mean, 4.7, 0.0, 0.004375);
        let atime = terms.resonance.as_ref().unwrap().checkpoint.atime;
        assert_eq!(atime, 1440.0);

        terms.apply_secular(-100.0, &mut mean, 4.7, 0.0, 0.004375);
        let cp = terms.resonance.as_ref().unwrap().checkpoint;
        assert_eq!(cp.atime, 0.0);
        assert_eq!(cp.xni, 0.004375);
    }
}
