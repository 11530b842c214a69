//! # Calendar and sidereal time helpers
//!
//! Low level routines shared by [`crate::epoch_time::EpochTime`] and the propagator:
//!
//! - the simplified leap-year month table (`year % 4 == 0`, no centurial exception),
//! - the Fliegel–Van Flandern Julian day number,
//! - a day counter anchored on 1950 used to compute elapsed time between epochs,
//! - two Greenwich Mean Sidereal Time formulas (IAU 1982): [`gmst`] splits the date at 0h UT
//!   like an almanac does, [`gstime`] is the single-polynomial form used to initialize SGP4.
use crate::constants::{
    DAYS_PER_JULIAN_CENTURY, DPI, JD_J2000, JulianDate, Radian, RADEG, SECONDS_PER_DAY,
    SIDEREAL_RATE,
};

const MONTH_LENGTHS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Leap-year test used throughout the crate.
///
/// This is the simple Julian rule. It disagrees with the Gregorian calendar only in 1900 and
/// 2100, both outside the range of two-digit TLE epochs (1957–2056).
pub fn is_leap_year(year: i32) -> bool {
    year.rem_euclid(4) == 0
}

/// Month lengths of the given year, February adjusted by [`is_leap_year`].
pub fn month_lengths(year: i32) -> [u32; 12] {
    let mut months = MONTH_LENGTHS;
    if is_leap_year(year) {
        months[1] = 29;
    }
    months
}

/// Number of days in the given year (365 or 366).
pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Normalize a two-digit year with the TLE convention (`< 50` → 20xx, otherwise 19xx).
///
/// Years already expressed with four digits are returned unchanged.
pub fn normalize_year(year: i32) -> i32 {
    match year {
        0..=49 => year + 2000,
        50..=99 => year + 1900,
        _ => year,
    }
}

/// Julian date at 0h of the given calendar day (Fliegel–Van Flandern).
///
/// Arguments
/// ---------
/// * `year`: four digit year
/// * `month`: month in 1..=12
/// * `day`: day of month
///
/// Return
/// ------
/// * the Julian date of the start of the day (ends in .5)
pub fn julian_day_at_midnight(year: i32, month: u32, day: u32) -> JulianDate {
    let a = ((14.0 - month as f64) / 12.0).floor();
    let y = year as f64 + 4800.0 - a;
    let m = month as f64 + 12.0 * a - 3.0;
    day as f64 + ((153.0 * m + 2.0) / 5.0).floor() + 365.0 * y + (y / 4.0).floor()
        - (y / 100.0).floor()
        + (y / 400.0).floor()
        - 32045.0
        - 0.5
}

/// Days elapsed between 1950-01-00 and day `day_of_year` of `year`.
///
/// Uses the same `year % 4` rule as [`month_lengths`] so that differences are consistent with
/// the day-of-year representation.
pub fn days_since_1950(year: i32, day_of_year: f64) -> f64 {
    let years = (year - 1950) as f64;
    years * 365.0 + (year - 1949).div_euclid(4) as f64 + day_of_year
}

/// Greenwich Mean Sidereal Time in radians, IAU 1982, for a Julian date (UT).
///
/// The polynomial is evaluated at 0h UT and the fraction of the day is added with the
/// sidereal rate, as in the Astronomical Almanac.
///
/// Arguments
/// ---------
/// * `jd`: Julian date (UT)
///
/// Return
/// ------
/// * GMST in [0, 2π)
pub fn gmst(jd: JulianDate) -> Radian {
    // Polynomial coefficients for GMST at 0h UT (in seconds)
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    let ut = (jd + 0.5).rem_euclid(1.0);
    let t = (jd - ut - JD_J2000) / DAYS_PER_JULIAN_CENTURY;

    let gmst0 = ((C3 * t + C2) * t + C1) * t + C0;
    let gms = (gmst0 + SECONDS_PER_DAY * SIDEREAL_RATE * ut).rem_euclid(SECONDS_PER_DAY);

    DPI * gms / SECONDS_PER_DAY
}

/// Greenwich sidereal time used by SGP4 initialization (Vallado, `gstime`).
///
/// Arguments
/// ---------
/// * `jd_ut1`: Julian date (UT1)
///
/// Return
/// ------
/// * GMST in [0, 2π)
///
/// See also
/// --------
/// * [`gmst`] – same theory, split at 0h UT
pub fn gstime(jd_ut1: JulianDate) -> Radian {
    let tut1 = (jd_ut1 - JD_J2000) / DAYS_PER_JULIAN_CENTURY;
    let seconds = -6.2e-6 * tut1 * tut1 * tut1
        + 0.093104 * tut1 * tut1
        + (876_600.0 * 3600.0 + 8_640_184.812_866) * tut1
        + 67_310.548_41;

    // 360 / 86400 = 1 / 240 degree per second
    let mut temp = (seconds * RADEG / 240.0) % DPI;
    if temp < 0.0 {
        temp += DPI;
    }
    temp
}

#[cfg(test)]
mod time_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_leap_rule() {
        assert!(is_leap_year(2020));
        assert!(!is_leap_year(2019));
        // simplified rule, kept on purpose
        assert!(is_leap_year(2100));
        assert_eq!(days_in_year(2000), 366);
        assert_eq!(month_lengths(2019)[1], 28);
    }

    #[test]
    fn test_normalize_year() {
        assert_eq!(normalize_year(0), 2000);
        assert_eq!(normalize_year(49), 2049);
        assert_eq!(normalize_year(50), 1950);
        assert_eq!(normalize_year(99), 1999);
        assert_eq!(normalize_year(2024), 2024);
    }

    #[test]
    fn test_julian_day_at_midnight() {
        assert_eq!(julian_day_at_midnight(1995, 10, 1), 2449991.5);
        assert_eq!(julian_day_at_midnight(2000, 1, 1), 2451544.5);
        assert_eq!(julian_day_at_midnight(2020, 1, 12), 2458860.5);
    }

    #[test]
    fn test_days_since_1950() {
        assert_eq!(days_since_1950(1950, 1.0), 1.0);
        assert_eq!(days_since_1950(1953, 1.0), 3.0 * 365.0 + 1.0 + 1.0);
        // one leap year between the two dates
        let delta = days_since_1950(2021, 1.5) - days_since_1950(2020, 1.5);
        assert_eq!(delta, 366.0);
    }

    #[test]
    fn test_gmst() {
        // 1995-10-01 09:00:00 UT
        let jd = 2449991.5 + 9.0 / 24.0;
        assert_relative_eq!(gmst(jd), 2.524218267749319, epsilon = 1e-9);
    }

    #[test]
    fn test_gstime_matches_gmst() {
        let jd = 2458860.875;
        let diff = (gstime(jd) - gmst(jd)).abs();
        assert!(diff < 1e-8 || (DPI - diff) < 1e-8);
    }
}
