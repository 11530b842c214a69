//! # SGP4 / SDP4 propagation
//!
//! This module implements the analytical SGP4 theory (Spacetrack Report #3, as revised by Vallado,
//! Crawford, Hujsak and Kelso in 2006), with the SDP4 deep-space extension for orbits whose period
//! is 225 minutes or longer.
//!
//! ## Pipeline
//!
//! 1. **Initialization** ([`initialize`]): the element set is converted into a
//!    [`PropagationState`]: recovered (un-Kozai) mean motion, drag and oblateness coefficients,
//!    and, for deep-space orbits, the lunar/solar terms and the optional resonance integrator.
//! 2. **Propagation** ([`propagate`], [`propagate_at`], [`propagate_range`]): the kernel applies
//!    the secular drift, the deep-space corrections, solves Kepler's equation and rebuilds the
//!    position and velocity in the TEME frame.
//!
//! ```text
//! OrbitalElementRecord ──initialize──▶ PropagationState ──propagate(t)──▶ StateVector
//!                                          │      ▲
//!                                          └──────┘ resonance checkpoint (deep space only)
//! ```
//!
//! ## Sessions
//!
//! A [`PropagationState`] is one propagation session. It is owned by a single caller and
//! propagated through `&mut self`, because resonant deep-space orbits keep an integrator checkpoint
//! so that successive forward queries reuse the previous integration. Querying an earlier time
//! resets the checkpoint; it never fails.
//!
//! Independent sessions do not share anything and can be run in parallel, see
//! [`propagate_batch`].
//!
//! ## Units
//!
//! - Time arguments: minutes since the element set epoch.
//! - Positions: km, velocities: km/s, TEME frame.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sgp4track::gravity_model::GravityModel;
//! use sgp4track::propagation::{initialize, propagate};
//! use sgp4track::tle::parse_tle;
//!
//! let record = parse_tle(
//!     "1 00005U 58002B   00179.78495062  .00000023  00000-0  28098-4 0  4753",
//!     "2 00005  34.2682 348.7242 1859667 331.7664  19.3264 10.82419157413667",
//!     None,
//! )?;
//! let mut state = initialize(&record, GravityModel::Wgs72)?;
//! let sv = propagate(&mut state, 360.0)?;
//! println!("r = {} km", sv.position.norm());
//! # Ok::<(), sgp4track::sgp4_errors::Sgp4Error>(())
//! ```
mod deep_space;
mod initializer;
mod kernel;

use std::fmt;

use log::debug;
use nalgebra::Vector3;
use rayon::prelude::*;

use crate::{
    constants::{Kilometer, Minutes},
    epoch_time::EpochTime,
    gravity_model::GravityModel,
    orbital_elements::OrbitalElementRecord,
    sgp4_errors::{InitError, PropagationError, Sgp4Error},
};

pub use deep_space::ResonanceBand;
use deep_space::DeepSpaceTerms;
use initializer::{EpochMeanElements, NearEarthTerms};

/// Propagation branch chosen at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationMethod {
    /// Orbital period below 225 minutes (SGP4)
    NearEarth,
    /// Orbital period of 225 minutes or more (SDP4)
    DeepSpace,
}

impl fmt::Display for PropagationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropagationMethod::NearEarth => write!(f, "near-earth"),
            PropagationMethod::DeepSpace => write!(f, "deep-space"),
        }
    }
}

/// Output of one propagation: TEME position (km) and velocity (km/s).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    /// Time of the sample, in minutes since the element set epoch
    pub minutes_since_epoch: Minutes,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

/// One propagation session, built by [`initialize`].
///
/// The near-earth coefficients are always present. The deep-space terms only exist for orbits
/// with a period of at least 225 minutes.
#[derive(Debug, Clone)]
pub struct PropagationState {
    elements: OrbitalElementRecord,
    gravity: GravityModel,
    epoch: EpochTime,
    mean: EpochMeanElements,
    near_earth: NearEarthTerms,
    deep_space: Option<DeepSpaceTerms>,
}

impl PropagationState {
    pub fn elements(&self) -> &OrbitalElementRecord {
        &self.elements
    }

    pub fn gravity_model(&self) -> GravityModel {
        self.gravity
    }

    /// Epoch of the element set, origin of the propagation time.
    pub fn epoch(&self) -> &EpochTime {
        &self.epoch
    }

    pub fn method(&self) -> PropagationMethod {
        if self.deep_space.is_some() {
            PropagationMethod::DeepSpace
        } else {
            PropagationMethod::NearEarth
        }
    }

    /// Resonance band matched by a deep-space orbit, if any.
    pub fn resonance(&self) -> Option<ResonanceBand> {
        self.deep_space.as_ref().and_then(|ds| ds.resonance_band())
    }

    /// True when the higher-order drag terms are skipped (perigee below 220 km, or deep space).
    pub fn uses_simplified_drag(&self) -> bool {
        self.near_earth.isimp
    }

    /// Recovered (un-Kozai) mean motion, rad/min.
    pub fn mean_motion(&self) -> f64 {
        self.mean.no
    }

    /// Recovered semi-major axis, km.
    pub fn semi_major_axis(&self) -> Kilometer {
        self.mean.ao * self.gravity.constants().radius_earth_km
    }

    /// Perigee altitude above the equatorial radius, km.
    pub fn perigee_altitude(&self) -> Kilometer {
        (self.mean.ao * (1.0 - self.mean.ecco) - 1.0) * self.gravity.constants().radius_earth_km
    }

    /// Apogee altitude above the equatorial radius, km.
    pub fn apogee_altitude(&self) -> Kilometer {
        (self.mean.ao * (1.0 + self.mean.ecco) - 1.0) * self.gravity.constants().radius_earth_km
    }

    /// Eccentric and true anomaly at epoch (rad).
    pub fn anomalies_at_epoch(&self) -> (f64, f64) {
        (self.mean.eccentric_anomaly, self.mean.true_anomaly)
    }
}

/// Build a propagation session from an element set.
///
/// Arguments
/// ---------
/// * `elements`: orbital elements in internal units
/// * `gravity`: gravity model used for the whole session
///
/// Return
/// ------
/// * the initialized [`PropagationState`], or an [`InitError`] for elements that cannot be
///   initialized (non-positive mean motion, eccentricity outside [0, 1), invalid epoch)
///
/// See also
/// --------
/// * [`propagate`] – evaluate the session at a given time
pub fn initialize(
    elements: &OrbitalElementRecord,
    gravity: GravityModel,
) -> Result<PropagationState, InitError> {
    let state = initializer::sgp4_init(elements, gravity)?;
    debug!(
        "Catalog {}: {} propagation with {}, resonance {:?}",
        elements.catalog_number(),
        state.method(),
        gravity,
        state.resonance()
    );
    Ok(state)
}

/// Evaluate the session at `minutes` after the element set epoch.
///
/// A failure only concerns this evaluation: the same session can be queried again at another
/// time.
pub fn propagate(
    state: &mut PropagationState,
    minutes: Minutes,
) -> Result<StateVector, PropagationError> {
    kernel::sgp4(state, minutes)
}

/// Evaluate the session at an absolute UTC time.
pub fn propagate_at(
    state: &mut PropagationState,
    time: &EpochTime,
) -> Result<StateVector, PropagationError> {
    let minutes = time.minutes_since(state.epoch());
    propagate(state, minutes)
}

/// Sample the session between two times at a fixed step.
///
/// Samples are taken at `start + k * step_minutes` for every `k` such that the sample time is
/// strictly before `stop + step_minutes`, so the last sample may lie slightly after `stop`.
///
/// Arguments
/// ---------
/// * `start`, `stop`: bounds of the interval (`stop` before `start` gives an empty result)
/// * `step_minutes`: sampling step, strictly positive
///
/// Return
/// ------
/// * the samples in time order, or the first propagation error encountered
pub fn propagate_range(
    state: &mut PropagationState,
    start: &EpochTime,
    stop: &EpochTime,
    step_minutes: Minutes,
) -> Result<Vec<StateVector>, PropagationError> {
    if !(step_minutes > 0.0) || !step_minutes.is_finite() {
        return Err(PropagationError::InvalidStep(step_minutes));
    }
    if stop < start {
        return Ok(Vec::new());
    }

    let t_start = start.minutes_since(state.epoch());
    let t_end = stop.minutes_since(state.epoch()) + step_minutes;

    (0..)
        .map(|k| t_start + k as f64 * step_minutes)
        .take_while(|t| *t < t_end)
        .map(|t| propagate(state, t))
        .collect()
}

/// Propagate many independent element sets over the same interval, in parallel.
///
/// Each element set gets its own session, initialized with `gravity`. A failure of one element
/// set does not affect the others.
///
/// Return
/// ------
/// * one result per input element set, in input order
pub fn propagate_batch(
    elements: &[OrbitalElementRecord],
    gravity: GravityModel,
    start: &EpochTime,
    stop: &EpochTime,
    step_minutes: Minutes,
) -> Vec<Result<Vec<StateVector>, Sgp4Error>> {
    elements
        .par_iter()
        .map(|record| {
            let mut state = initialize(record, gravity)?;
            Ok(propagate_range(&mut state, start, stop, step_minutes)?)
        })
        .collect()
}
