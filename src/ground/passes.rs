use std::fmt;

use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    constants::{Degree, Kilometer, SECONDS_PER_DAY},
    epoch_time::EpochTime,
    gravity_model::GravityModel,
    orbital_elements::OrbitalElementRecord,
    propagation::{initialize, propagate_at},
    sgp4_errors::{PropagationError, Sgp4Error},
};

use super::{look_angles, GeoCoordinate};

/// Settings of [`find_passes`].
#[derive(Debug, Clone, PartialEq)]
pub struct PassSearchSettings {
    /// Sampling step of the visibility signal (s)
    pub step_seconds: f64,
    /// Length of the search window (days)
    pub max_days: f64,
    /// Elevation at and above which the satellite is visible (°)
    pub min_elevation: Degree,
    /// Gravity model used to propagate the element set
    pub gravity_model: GravityModel,
}

impl Default for PassSearchSettings {
    fn default() -> Self {
        PassSearchSettings {
            step_seconds: 15.0,
            max_days: 5.0,
            min_elevation: 0.0,
            gravity_model: GravityModel::Wgs84,
        }
    }
}

/// One sample of a pass.
#[derive(Debug, Clone, Copy)]
pub struct PassDetail {
    pub time: EpochTime,
    /// Elevation (°)
    pub elevation: Degree,
    /// Azimuth (°)
    pub azimuth: Degree,
    /// Range (km)
    pub range: Kilometer,
}

impl fmt::Display for PassDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} : Elevation: {:.2}°, Azimuth {:.2}°, Range {:.3} km",
            self.time, self.elevation, self.azimuth, self.range
        )
    }
}

/// A contact window between a site and a satellite.
#[derive(Debug, Clone)]
pub struct Pass {
    observer: GeoCoordinate,
    rise: PassDetail,
    peak: PassDetail,
    set: PassDetail,
}

impl Pass {
    pub fn observer(&self) -> &GeoCoordinate {
        &self.observer
    }

    /// First visible sample.
    pub fn rise(&self) -> &PassDetail {
        &self.rise
    }

    /// Visible sample with the highest elevation.
    pub fn peak(&self) -> &PassDetail {
        &self.peak
    }

    /// Last visible sample.
    pub fn set(&self) -> &PassDetail {
        &self.set
    }

    pub fn start_epoch(&self) -> &EpochTime {
        &self.rise.time
    }

    pub fn end_epoch(&self) -> &EpochTime {
        &self.set.time
    }

    /// Duration between the rise and set samples (min).
    pub fn duration_minutes(&self) -> f64 {
        self.set.time.minutes_since(&self.rise.time)
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:\nStart: {}\nMax Elevation: {}\nEnd: {}",
            self.rise.time, self.rise, self.peak, self.set
        )
    }
}

/// Failure of [`find_passes`], with the passes closed before it.
#[derive(Error, Debug)]
#[error("Pass search stopped after {} closed passes: {source}", .passes.len())]
pub struct PassSearchError {
    /// Passes closed before the failure, in time order
    pub passes: Vec<Pass>,
    pub source: Sgp4Error,
}

impl PassSearchError {
    fn before_scan(source: impl Into<Sgp4Error>) -> Self {
        PassSearchError {
            passes: Vec::new(),
            source: source.into(),
        }
    }
}

impl From<PassSearchError> for Sgp4Error {
    fn from(err: PassSearchError) -> Self {
        err.source
    }
}

/// Pass being tracked by the search.
struct OpenPass {
    rise: PassDetail,
    peak: PassDetail,
    last: PassDetail,
}

/// Search the contact windows of a satellite over a site.
///
/// The element set is propagated from `start` every `settings.step_seconds` for
/// `settings.max_days`. A pass opens on the first visible sample (elevation at or above
/// `settings.min_elevation`), keeps the highest sample seen so far as its peak, and closes on the
/// first sample that is not visible, the last visible sample being its set.
///
/// Passes shorter than the step can be missed, and a pass still open at the end of the window is
/// not returned. A propagation failure (e.g. the orbit decays inside the window) stops the scan;
/// the pass open at that moment is dropped, the ones already closed are kept in the error.
///
/// Arguments
/// ---------
/// * `coordinate`: the site
/// * `elements`: element set of the satellite
/// * `start`: start of the search window (UTC)
/// * `settings`: step, window length, elevation mask and gravity model
/// * `cancel`: polled once per step, the search stops and returns the passes found so far as
///   soon as it returns `true`
///
/// Return
/// ------
/// * the closed passes in time order
/// * or a [`PassSearchError`] with the first initialization / propagation error and the passes
///   closed before it
///
/// See also
/// --------
/// * [`look_angles()`] – geometry of one sample
pub fn find_passes<F>(
    coordinate: &GeoCoordinate,
    elements: &OrbitalElementRecord,
    start: &EpochTime,
    settings: &PassSearchSettings,
    mut cancel: F,
) -> Result<Vec<Pass>, PassSearchError>
where
    F: FnMut() -> bool,
{
    if !(settings.step_seconds > 0.0) || !settings.step_seconds.is_finite() {
        return Err(PassSearchError::before_scan(PropagationError::InvalidStep(
            settings.step_seconds / 60.0,
        )));
    }

    let mut state =
        initialize(elements, settings.gravity_model).map_err(PassSearchError::before_scan)?;
    let n_steps = (settings.max_days * SECONDS_PER_DAY / settings.step_seconds).floor() as usize;

    let mut passes = Vec::new();
    let mut open: Option<OpenPass> = None;

    for k in 0..=n_steps {
        if cancel() {
            debug!("Pass search cancelled after {k} steps");
            break;
        }

        let time = start.shifted_by_seconds(k as f64 * settings.step_seconds);
        let sv = match propagate_at(&mut state, &time) {
            Ok(sv) => sv,
            Err(err) => {
                warn!(
                    "Pass search of catalog {} stopped at {time} after {} passes: {err}",
                    elements.catalog_number(),
                    passes.len()
                );
                return Err(PassSearchError {
                    passes,
                    source: err.into(),
                });
            }
        };
        let angles = look_angles(coordinate, &time, &sv);
        let detail = PassDetail {
            time,
            elevation: angles.elevation,
            azimuth: angles.azimuth,
            range: angles.range,
        };
        let visible = angles.elevation >= settings.min_elevation;

        open = match (open.take(), visible) {
            (None, true) => Some(OpenPass {
                rise: detail,
                peak: detail,
                last: detail,
            }),
            (Some(mut current), true) => {
                if detail.elevation > current.peak.elevation {
                    current.peak = detail;
                }
                current.last = detail;
                Some(current)
            }
            (Some(current), false) => {
                passes.push(Pass {
                    observer: *coordinate,
                    rise: current.rise,
                    peak: current.peak,
                    set: current.last,
                });
                None
            }
            (None, false) => None,
        };
    }

    info!(
        "Found {} passes of catalog {} over {} days from {}",
        passes.len(),
        elements.catalog_number(),
        settings.max_days,
        start
    );

    Ok(passes)
}
