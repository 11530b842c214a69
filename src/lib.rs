//! # sgp4track
//!
//! Analytical propagation of Earth satellites from mean element sets, and the ground geometry
//! built on top of it.
//!
//! ## Overview
//!
//! - [`tle`] and [`omm`]: read element sets from two-line element text or CCSDS OMM XML into an
//!   [`orbital_elements::OrbitalElementRecord`].
//! - [`propagation`]: SGP4 / SDP4 initialization and evaluation, producing TEME position and
//!   velocity vectors, sequentially or in parallel over many element sets.
//! - [`ground`]: sites on the oblate Earth, look angles, sub-satellite points and pass search.
//! - [`epoch_time`]: the UTC time representation shared by all of the above, with sidereal time.
//! - [`gravity_model`]: the WGS-72 and WGS-84 constant sets.
//!
//! ## Example
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
//! for pass in find_passes(&munich, &iss, &start, &PassSearchSettings::default(), || false)? {
//!     println!("{pass}");
//! }
//! # Ok::<(), sgp4track::sgp4_errors::Sgp4Error>(())
//! ```
pub mod constants;
pub mod epoch_time;
pub mod gravity_model;
pub mod ground;
mod kepler;
pub mod omm;
pub mod orbital_elements;
pub mod propagation;
pub mod sgp4_errors;
pub mod time;
pub mod tle;
