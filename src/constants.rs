//! # Constants and type definitions for sgp4track
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! definitions** used by the propagator, the time utilities and the ground geometry.
//!
//! ## Overview
//!
//! - Unit conversions (degrees ↔ radians, days ↔ minutes ↔ seconds, revs/day ↔ rad/min)
//! - Julian date reference points used by the SGP4 epoch conventions
//! - Core type aliases used across the crate
//!
//! The gravity-model constants (WGS-72 / WGS-84) live in [`crate::gravity_model`].

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of minutes in a day
pub const MINUTES_PER_DAY: f64 = 1_440.0;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Revolutions per day → radians per minute divisor (1440 / 2π)
pub const XPDOTP: f64 = MINUTES_PER_DAY / DPI;

/// Julian date of 2000-01-01 12:00:00 (J2000.0)
pub const JD_J2000: f64 = 2_451_545.0;

/// Days in a Julian century
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

/// Julian date of 1949-12-31 00:00:00 UT, origin of the SGP4 internal epoch
pub const JD_SGP4_EPOCH_ORIGIN: f64 = 2_433_281.5;

/// Ratio of sidereal to solar time (IAU 1982)
pub const SIDEREAL_RATE: f64 = 1.002_737_909_34;

/// Orbital period, in minutes, at or above which the deep-space (SDP4) branch is used
pub const DEEP_SPACE_PERIOD_THRESHOLD: f64 = 225.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;

/// Angle in radians
pub type Radian = f64;

/// Distance in kilometers
pub type Kilometer = f64;

/// Elapsed time in minutes
pub type Minutes = f64;

/// Julian date (days)
pub type JulianDate = f64;

/// NORAD satellite catalog number
pub type CatalogNumber = u32;
