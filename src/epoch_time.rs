//! # Epoch time
//!
//! [`EpochTime`] is the time representation driving the propagator. A point in time is kept
//! simultaneously as
//!
//! - a `(year, fractional day-of-year)` pair, the representation used by two-line element sets
//!   (day 1.0 is January 1st at 0h UTC), and
//! - decomposed calendar fields (month, day, hour, minute, second).
//!
//! Both representations are kept in agreement by every constructor and every mutation.
//!
//! ## Leap years
//!
//! The day-of-year uses the simplified `year % 4 == 0` rule (see [`crate::time::is_leap_year`]).
//! TLE epochs only span 1957–2056, where this rule matches the Gregorian calendar.
//!
//! ## Year rollover
//!
//! Adding time past the end of the year subtracts the length of that year from the day-of-year
//! and increments the year, so that `31.12.1999 12:00 + 6 days` lands on `04.01.2000 12:00`.
//! Negative additions roll backward symmetrically.
//!
//! ## Example
//!
//! ```rust
//! use sgp4track::epoch_time::EpochTime;
//!
//! let mut t = EpochTime::from_calendar(2020, 1, 1, 12, 0, 0.0).unwrap();
//! assert_eq!(t.day_of_year(), 1.5);
//! t.add_days(366.0);
//! assert_eq!(t.year(), 2021);
//! assert_eq!(t.to_string(), "01.01.2021-12:00:00");
//! ```
use std::cmp::Ordering;
use std::fmt;
use std::ops::Sub;

use hifitime::Epoch;

use crate::{
    constants::{Degree, JulianDate, Radian, DPI, RADEG, SECONDS_PER_DAY},
    sgp4_errors::TimeError,
    time::{
        days_in_year, days_since_1950, gmst, julian_day_at_midnight, month_lengths,
        normalize_year,
    },
};

/// A UTC instant expressed as TLE epoch (year, day-of-year) and as calendar fields.
#[derive(Debug, Clone, Copy)]
pub struct EpochTime {
    year: i32,
    day_of_year: f64,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: f64,
}

impl EpochTime {
    /// Build an epoch from calendar fields (UTC).
    ///
    /// Two-digit years are normalized with the TLE convention (`< 50` → 20xx, otherwise 19xx).
    ///
    /// Arguments
    /// ---------
    /// * `year`: four or two digit year
    /// * `month`: 1..=12
    /// * `day`: 1..=days of the month
    /// * `hour`, `minute`: 0..24, 0..60
    /// * `second`: fractional seconds in [0, 60)
    ///
    /// Return
    /// ------
    /// * the epoch, or [`TimeError::InvalidCalendarDate`] when a field is out of range
    pub fn from_calendar(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: f64,
    ) -> Result<Self, TimeError> {
        let year = normalize_year(year);
        let invalid = TimeError::InvalidCalendarDate {
            year,
            month,
            day,
            hour,
            minute,
            second,
        };

        if !(1..=12).contains(&month) {
            return Err(invalid);
        }
        let month_length = month_lengths(year)[(month - 1) as usize];
        if day == 0 || day > month_length || hour >= 24 || minute >= 60 {
            return Err(invalid);
        }
        if !second.is_finite() || !(0.0..60.0).contains(&second) {
            return Err(invalid);
        }

        let mut epoch = EpochTime {
            year,
            day_of_year: 0.0,
            month,
            day,
            hour,
            minute,
            second,
        };
        epoch.day_of_year = epoch.calendar_day_of_year();
        Ok(epoch)
    }

    /// Build an epoch from a hifitime UTC instant.
    pub fn from_utc(instant: Epoch) -> Result<Self, TimeError> {
        let (year, month, day, hour, minute, second, nanos) = instant.to_gregorian_utc();
        Self::from_calendar(
            year,
            month as u32,
            day as u32,
            hour as u32,
            minute as u32,
            second as f64 + nanos as f64 * 1e-9,
        )
    }

    /// Build an epoch from a TLE style epoch: year and fractional day-of-year.
    ///
    /// Arguments
    /// ---------
    /// * `year`: four or two digit year
    /// * `day_of_year`: fractional day of year in [1, days in year + 1)
    ///
    /// Return
    /// ------
    /// * the epoch, or [`TimeError::InvalidDayOfYear`]
    pub fn from_epoch(year: i32, day_of_year: f64) -> Result<Self, TimeError> {
        let year = normalize_year(year);
        let upper = days_in_year(year) as f64 + 1.0;
        if !day_of_year.is_finite() || day_of_year < 1.0 || day_of_year >= upper {
            return Err(TimeError::InvalidDayOfYear { year, day_of_year });
        }

        let mut epoch = EpochTime {
            year,
            day_of_year,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0.0,
        };
        epoch.update_calendar();
        Ok(epoch)
    }

    /// Convert back to a hifitime UTC instant.
    ///
    /// Return
    /// ------
    /// * the instant, or [`TimeError::InvalidCalendarDate`] for dates that only exist under the
    ///   `year % 4` leap rule (e.g. 2100-02-29)
    pub fn to_utc(&self) -> Result<Epoch, TimeError> {
        let whole = self.second.floor();
        let nanos = (((self.second - whole) * 1e9).round() as u32).min(999_999_999);
        Epoch::maybe_from_gregorian_utc(
            self.year,
            self.month as u8,
            self.day as u8,
            self.hour as u8,
            self.minute as u8,
            whole as u8,
            nanos,
        )
        .map_err(|_| TimeError::InvalidCalendarDate {
            year: self.year,
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
            second: self.second,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn second(&self) -> f64 {
        self.second
    }

    /// Fractional day of year, 1.0 being January 1st at 0h.
    pub fn day_of_year(&self) -> f64 {
        self.day_of_year
    }

    /// Calendar fields as `(year, month, day, hour, minute, second)`.
    pub fn to_date_time_fields(&self) -> (i32, u32, u32, u32, u32, f64) {
        (
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        )
    }

    /// Julian date of this epoch (UTC).
    ///
    /// Fliegel–Van Flandern day number of January 1st plus the elapsed fractional days, so the
    /// result does not go through the rounded calendar fields.
    pub fn to_julian_date(&self) -> JulianDate {
        julian_day_at_midnight(self.year, 1, 1) + self.day_of_year - 1.0
    }

    /// Greenwich Mean Sidereal Time, radians in [0, 2π).
    pub fn greenwich_sidereal_time(&self) -> Radian {
        gmst(self.to_julian_date())
    }

    /// Local Mean Sidereal Time for an observer at the given longitude.
    ///
    /// Arguments
    /// ---------
    /// * `longitude`: east longitude in degrees (0 gives the Greenwich value)
    ///
    /// Return
    /// ------
    /// * local sidereal time in radians, in [0, 2π)
    pub fn local_sidereal_time(&self, longitude: Degree) -> Radian {
        (self.greenwich_sidereal_time() + longitude * RADEG).rem_euclid(DPI)
    }

    pub fn add_seconds(&mut self, seconds: f64) {
        self.day_of_year += seconds / SECONDS_PER_DAY;
        self.roll_year();
        self.update_calendar();
    }

    pub fn add_minutes(&mut self, minutes: f64) {
        self.add_seconds(minutes * 60.0);
    }

    pub fn add_hours(&mut self, hours: f64) {
        self.add_minutes(hours * 60.0);
    }

    pub fn add_days(&mut self, days: f64) {
        self.add_hours(days * 24.0);
    }

    /// Copy of this epoch shifted by `seconds`.
    pub fn shifted_by_seconds(&self, seconds: f64) -> Self {
        let mut shifted = *self;
        shifted.add_seconds(seconds);
        shifted
    }

    /// Elapsed days from `earlier` to `self`.
    ///
    /// Return
    /// ------
    /// * the number of days, or [`TimeError::InvalidTimeOrder`] when `earlier` is after `self`
    pub fn elapsed_days_since(&self, earlier: &EpochTime) -> Result<f64, TimeError> {
        if self < earlier {
            return Err(TimeError::InvalidTimeOrder);
        }
        Ok(self.day_count() - earlier.day_count())
    }

    /// Signed minutes from `reference` to `self`, the time argument of the propagator.
    pub fn minutes_since(&self, reference: &EpochTime) -> f64 {
        (self.day_count() - reference.day_count()) * 1440.0
    }

    fn day_count(&self) -> f64 {
        days_since_1950(self.year, self.day_of_year)
    }

    fn calendar_day_of_year(&self) -> f64 {
        let months = month_lengths(self.year);
        let full_months: u32 = months[..(self.month - 1) as usize].iter().sum();
        let fraction =
            (self.hour as f64 + (self.minute as f64 + self.second / 60.0) / 60.0) / 24.0;
        (full_months + self.day) as f64 + fraction
    }

    fn roll_year(&mut self) {
        while self.day_of_year >= days_in_year(self.year) as f64 + 1.0 {
            self.day_of_year -= days_in_year(self.year) as f64;
            self.year += 1;
        }
        while self.day_of_year < 1.0 {
            self.year -= 1;
            self.day_of_year += days_in_year(self.year) as f64;
        }
    }

    fn update_calendar(&mut self) {
        let day_number = self.day_of_year.floor() as u32;
        let months = month_lengths(self.year);

        let mut month = 1;
        let mut elapsed = 0;
        while day_number > elapsed + months[month - 1] && month < 12 {
            elapsed += months[month - 1];
            month += 1;
        }
        self.month = month as u32;
        self.day = day_number - elapsed;

        let mut time = (self.day_of_year - day_number as f64) * 24.0;
        self.hour = time.floor() as u32;
        time = (time - self.hour as f64) * 60.0;
        self.minute = time.floor() as u32;
        self.second = (time - self.minute as f64) * 60.0;
    }
}

impl PartialEq for EpochTime {
    fn eq(&self, other: &Self) -> bool {
        self.year == other.year && self.day_of_year == other.day_of_year
    }
}

impl PartialOrd for EpochTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.year.cmp(&other.year) {
            Ordering::Equal => self.day_of_year.partial_cmp(&other.day_of_year),
            ord => Some(ord),
        }
    }
}

impl Sub for &EpochTime {
    type Output = Result<f64, TimeError>;

    fn sub(self, rhs: &EpochTime) -> Self::Output {
        self.elapsed_days_since(rhs)
    }
}

impl fmt::Display for EpochTime {
    /// `dd.MM.yyyy-HH:mm:ss`, seconds rounded to the nearest unit.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds_of_day = ((self.day_of_year - self.day_of_year.floor()) * SECONDS_PER_DAY)
            .round()
            .min(SECONDS_PER_DAY - 1.0) as u32;
        write!(
            f,
            "{:02}.{:02}.{}-{:02}:{:02}:{:02}",
            self.day,
            self.month,
            self.year,
            seconds_of_day / 3600,
            (seconds_of_day / 60) % 60,
            seconds_of_day % 60
        )
    }
}
