//! # Orbital element records
//!
//! [`OrbitalElementRecord`] is the immutable input of the propagator. Element sets are published
//! in degrees and revolutions per day (TLE, OMM); the record stores them in the internal SGP4
//! units instead:
//!
//! | Quantity            | Published unit | Stored unit   |
//! |---------------------|----------------|---------------|
//! | angles              | degrees        | radians       |
//! | mean motion         | rev/day        | rad/min       |
//! | ṅ / 2               | rev/day²       | rad/min²      |
//! | n̈ / 6               | rev/day³       | rad/min³      |
//! | BSTAR               | 1 / earth radii| unchanged     |
//!
//! The conversion is done in one place, [`OrbitalElementRecord::from_mean_elements`], shared by the
//! TLE and OMM parsers.
use std::fmt;

use crate::{
    constants::{CatalogNumber, Degree, Radian, DPI, MINUTES_PER_DAY, RADEG, XPDOTP},
    epoch_time::EpochTime,
    sgp4_errors::TimeError,
    time::normalize_year,
};

/// Security classification of an element set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Classification {
    #[default]
    Unclassified,
    Classified,
    Secret,
}

impl Classification {
    /// Decode the single character used by TLE line 1 and OMM `CLASSIFICATION_TYPE`.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'U' => Some(Classification::Unclassified),
            'C' => Some(Classification::Classified),
            'S' => Some(Classification::Secret),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Classification::Unclassified => 'U',
            Classification::Classified => 'C',
            Classification::Secret => 'S',
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Descriptive part of an element set. Not used by the propagation itself.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementSetMetadata {
    pub catalog_number: CatalogNumber,
    pub name: Option<String>,
    /// International designator, e.g. `98067A`
    pub international_designator: String,
    pub classification: Classification,
    pub ephemeris_type: u8,
    pub element_set_number: u32,
    /// Revolution number at epoch
    pub revolution_number: u32,
}

/// Mean elements as published, degrees and revolutions per day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanElements {
    /// Epoch year, two or four digits
    pub epoch_year: i32,
    /// Fractional day of year of the epoch (1.0 = January 1st, 0h UTC)
    pub epoch_day: f64,
    /// Mean motion (rev/day)
    pub mean_motion: f64,
    /// First derivative of the mean motion divided by two (rev/day²)
    pub mean_motion_dot: f64,
    /// Second derivative of the mean motion divided by six (rev/day³)
    pub mean_motion_ddot: f64,
    pub bstar: f64,
    pub inclination: Degree,
    pub right_ascension: Degree,
    pub eccentricity: f64,
    pub argument_of_perigee: Degree,
    pub mean_anomaly: Degree,
}

/// Orbital elements in SGP4 internal units.
///
/// Units:
/// * angles: radians
/// * `mean_motion`: rad/min
/// * `mean_motion_dot`: rad/min²
/// * `mean_motion_ddot`: rad/min³
/// * `epoch_year`: four digit year
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalElementRecord {
    pub metadata: ElementSetMetadata,
    pub epoch_year: i32,
    pub epoch_day: f64,
    pub mean_motion: f64,
    pub mean_motion_dot: f64,
    pub mean_motion_ddot: f64,
    pub bstar: f64,
    pub inclination: Radian,
    pub right_ascension: Radian,
    pub eccentricity: f64,
    pub argument_of_perigee: Radian,
    pub mean_anomaly: Radian,
}

impl OrbitalElementRecord {
    /// Build a record from published mean elements.
    ///
    /// Arguments
    /// ---------
    /// * `metadata`: descriptive fields of the element set
    /// * `elements`: mean elements in degrees and revolutions per day
    ///
    /// Return
    /// ------
    /// * the record in radians and radians per minute, with a four digit epoch year
    pub fn from_mean_elements(metadata: ElementSetMetadata, elements: &MeanElements) -> Self {
        OrbitalElementRecord {
            metadata,
            epoch_year: normalize_year(elements.epoch_year),
            epoch_day: elements.epoch_day,
            mean_motion: elements.mean_motion / XPDOTP,
            mean_motion_dot: elements.mean_motion_dot / (XPDOTP * MINUTES_PER_DAY),
            mean_motion_ddot: elements.mean_motion_ddot
                / (XPDOTP * MINUTES_PER_DAY * MINUTES_PER_DAY),
            bstar: elements.bstar,
            inclination: elements.inclination * RADEG,
            right_ascension: elements.right_ascension * RADEG,
            eccentricity: elements.eccentricity,
            argument_of_perigee: elements.argument_of_perigee * RADEG,
            mean_anomaly: elements.mean_anomaly * RADEG,
        }
    }

    pub fn catalog_number(&self) -> CatalogNumber {
        self.metadata.catalog_number
    }

    /// Epoch of the element set.
    pub fn epoch_time(&self) -> Result<EpochTime, TimeError> {
        EpochTime::from_epoch(self.epoch_year, self.epoch_day)
    }

    /// Anomalistic period from the published mean motion, in minutes.
    pub fn period_minutes(&self) -> f64 {
        DPI / self.mean_motion
    }

    /// Mean motion back in revolutions per day.
    pub fn mean_motion_rev_per_day(&self) -> f64 {
        self.mean_motion * XPDOTP
    }
}

#[cfg(test)]
mod orbital_elements_test {
    use super::*;
    use approx::assert_relative_eq;

    fn iss_elements() -> MeanElements {
        MeanElements {
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
        }
    }

    #[test]
    fn test_unit_conversion() {
        let record = OrbitalElementRecord::from_mean_elements(
            ElementSetMetadata {
                catalog_number: 25544,
                ..Default::default()
            },
            &iss_elements(),
        );

        assert_eq!(record.epoch_year, 2019);
        assert_eq!(record.catalog_number(), 25544);
        assert_relative_eq!(record.inclination, 51.6420_f64.to_radians(), epsilon = 1e-15);
        assert_relative_eq!(
            record.mean_motion,
            15.50124783 * DPI / 1440.0,
            epsilon = 1e-15
        );
        assert_relative_eq!(record.mean_motion_rev_per_day(), 15.50124783, epsilon = 1e-12);
        assert_relative_eq!(record.period_minutes(), 1440.0 / 15.50124783, epsilon = 1e-10);
        assert_relative_eq!(
            record.mean_motion_dot,
            0.00000035 / (XPDOTP * 1440.0),
            epsilon = 1e-20
        );
    }

    #[test]
    fn test_epoch_time() {
        let record = OrbitalElementRecord::from_mean_elements(
            ElementSetMetadata::default(),
            &iss_elements(),
        );
        let epoch = record.epoch_time().unwrap();
        assert_eq!(epoch.month(), 12);
        assert_eq!(epoch.day(), 22);
        assert_eq!(epoch.hour(), 11);
    }

    #[test]
    fn test_classification_code() {
        assert_eq!(Classification::from_code('S'), Some(Classification::Secret));
        assert_eq!(Classification::from_code('X'), None);
        assert_eq!(Classification::Classified.to_string(), "C");
        assert_eq!(Classification::default(), Classification::Unclassified);
    }
}
