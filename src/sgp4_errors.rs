use thiserror::Error;

/// Failure of a single propagation evaluation.
///
/// None of these is fatal to the session: the same [`crate::propagation::PropagationState`]
/// can be queried again at another time.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum PropagationError {
    #[error("Mean motion is zero or negative ({mean_motion}) at t = {minutes} min")]
    NonPositiveMeanMotion { minutes: f64, mean_motion: f64 },

    #[error("Eccentricity out of bounds (e = {eccentricity}) at t = {minutes} min")]
    EccentricityOutOfBounds { minutes: f64, eccentricity: f64 },

    #[error("Semi-latus rectum is negative at t = {minutes} min: the object has decayed")]
    DecayedOrbit { minutes: f64 },

    #[error("Invalid propagation step: {0} min")]
    InvalidStep(f64),
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum InitError {
    #[error("Mean motion must be strictly positive, got {0} rad/min")]
    NonPositiveMeanMotion(f64),

    #[error("Eccentricity must lie in [0, 1), got {0}")]
    EccentricityOutOfRange(f64),

    #[error("Invalid element set epoch: {0}")]
    InvalidEpoch(TimeError),
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TimeError {
    #[error("Invalid time order: the subtrahend is later than the minuend")]
    InvalidTimeOrder,

    #[error("Invalid calendar date {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second}")]
    InvalidCalendarDate {
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: f64,
    },

    #[error("Day of year {day_of_year} is out of range for year {year}")]
    InvalidDayOfYear { year: i32, day_of_year: f64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TleError {
    #[error("Checksum mismatch on line {line}: expected {expected}, computed {computed}")]
    Checksum {
        line: u8,
        expected: u32,
        computed: u32,
    },

    #[error("Unable to parse field '{field}' on line {line}: '{value}'")]
    FieldParse {
        line: u8,
        field: &'static str,
        value: String,
    },

    #[error("Line {line} is too short: {length} characters, expected 69")]
    LineLength { line: u8, length: usize },

    #[error("Line {line} has a non-ASCII character at column {column}")]
    InvalidCharacter { line: u8, column: usize },

    #[error("Line {line} does not start with its line number")]
    LineNumber { line: u8 },

    #[error("Catalog numbers of line 1 ({0}) and line 2 ({1}) differ")]
    CatalogMismatch(u32, u32),
}

#[derive(Error, Debug)]
pub enum OmmError {
    #[error("Unable to deserialize the OMM document: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("Missing mandatory OMM field {0}")]
    MissingField(&'static str),

    #[error("Unable to parse OMM field {field}: '{value}'")]
    FieldParse { field: &'static str, value: String },

    #[error("Unable to read OMM file: {0}")]
    IoError(#[from] std::io::Error),
}

/// Crate level error, every fallible public function can be lifted into it with `?`.
#[derive(Error, Debug)]
pub enum Sgp4Error {
    #[error("Element set initialization failed: {0}")]
    Init(#[from] InitError),

    #[error("Propagation failed: {0}")]
    Propagation(#[from] PropagationError),

    #[error("Time error: {0}")]
    Time(#[from] TimeError),

    #[error("TLE parsing error: {0}")]
    Tle(#[from] TleError),

    #[error("OMM parsing error: {0}")]
    Omm(#[from] OmmError),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),
}

impl PartialEq for OmmError {
    fn eq(&self, other: &Self) -> bool {
        use OmmError::*;
        match (self, other) {
            (FieldParse { field: a, value: x }, FieldParse { field: b, value: y }) => {
                a == b && x == y
            }

            (MissingField(a), MissingField(b)) => a == b,

            // not comparable, same variant is enough
            (Xml(_), Xml(_)) => true,
            (IoError(_), IoError(_)) => true,

            _ => false,
        }
    }
}

impl PartialEq for Sgp4Error {
    fn eq(&self, other: &Self) -> bool {
        use Sgp4Error::*;
        match (self, other) {
            (Init(a), Init(b)) => a == b,
            (Propagation(a), Propagation(b)) => a == b,
            (Time(a), Time(b)) => a == b,
            (Tle(a), Tle(b)) => a == b,
            (Omm(a), Omm(b)) => a == b,
            (IoError(_), IoError(_)) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod sgp4_errors_test {
    use super::*;

    #[test]
    fn test_error_lifting() {
        let err: Sgp4Error = PropagationError::DecayedOrbit { minutes: 12.0 }.into();
        assert_eq!(
            err,
            Sgp4Error::Propagation(PropagationError::DecayedOrbit { minutes: 12.0 })
        );
        assert_ne!(err, Sgp4Error::Time(TimeError::InvalidTimeOrder));

        let io = Sgp4Error::IoError(std::io::Error::other("a"));
        assert_eq!(io, Sgp4Error::IoError(std::io::Error::other("b")));
    }

    #[test]
    fn test_error_messages() {
        let err = TleError::Checksum {
            line: 1,
            expected: 5,
            computed: 3,
        };
        assert_eq!(
            err.to_string(),
            "Checksum mismatch on line 1: expected 5, computed 3"
        );
        assert_eq!(
            TleError::InvalidCharacter { line: 2, column: 9 }.to_string(),
            "Line 2 has a non-ASCII character at column 9"
        );
        assert_eq!(
            InitError::NonPositiveMeanMotion(0.0).to_string(),
            "Mean motion must be strictly positive, got 0 rad/min"
        );
    }
}
