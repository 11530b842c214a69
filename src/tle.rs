//! # Two-line element sets
//!
//! Fixed-column parser for the NORAD two-line element format, with an optional third line
//! carrying the object name:
//!
//! ```text
//! ISS (ZARYA)
//! 1 25544U 98067A   19356.46068278  .00000035  00000-0  86431-5 0  9990
//! 2 25544  51.6420 147.9381 0007793  61.6458  55.7201 15.50124783204461
//! ```
//!
//! | Line | Columns | Field                                                      |
//! |------|---------|------------------------------------------------------------|
//! | 1    | 3–7     | catalog number (digits, or Alpha-5 with a leading letter)  |
//! | 1    | 8       | classification (`U`, `C`, `S`)                             |
//! | 1    | 10–17   | international designator                                   |
//! | 1    | 19–32   | epoch: two-digit year and fractional day of year           |
//! | 1    | 34–43   | first derivative of the mean motion / 2 (rev/day²)         |
//! | 1    | 45–52   | second derivative of the mean motion / 6, implied decimal  |
//! | 1    | 54–61   | BSTAR drag term, implied decimal                           |
//! | 1    | 63      | ephemeris type                                             |
//! | 1    | 65–68   | element set number                                         |
//! | 2    | 9–16    | inclination (°)                                            |
//! | 2    | 18–25   | right ascension of the ascending node (°)                  |
//! | 2    | 27–33   | eccentricity, implied leading decimal point                |
//! | 2    | 35–42   | argument of perigee (°)                                    |
//! | 2    | 44–51   | mean anomaly (°)                                           |
//! | 2    | 53–63   | mean motion (rev/day)                                      |
//! | 2    | 64–68   | revolution number at epoch                                 |
//!
//! Column 69 of both lines is a modulo 10 checksum, see [`is_valid_checksum`].
//!
//! Implied decimal fields such as `" 86431-5"` read as `0.86431e-5`.
use camino::Utf8Path;
use nom::{
    bytes::complete::take,
    character::complete::{digit1, one_of, satisfy, u32 as parse_u32},
    combinator::{all_consuming, map_res, opt},
    number::complete::double,
    IResult, Parser,
};

use crate::{
    constants::CatalogNumber,
    orbital_elements::{Classification, ElementSetMetadata, MeanElements, OrbitalElementRecord},
    sgp4_errors::{Sgp4Error, TleError},
};

const LINE_LENGTH: usize = 69;

/// Checksum of a line: sum of its digits over the first 68 columns, `-` counting as 1, modulo 10.
fn compute_checksum(line: &str) -> u32 {
    line.chars()
        .take(LINE_LENGTH - 1)
        .map(|c| match c {
            '-' => 1,
            c => c.to_digit(10).unwrap_or(0),
        })
        .sum::<u32>()
        % 10
}

/// True when column 69 of the line holds the checksum of the first 68 columns.
///
/// Lines shorter than 69 characters are never valid.
pub fn is_valid_checksum(line: &str) -> bool {
    line.trim_end()
        .chars()
        .nth(LINE_LENGTH - 1)
        .and_then(|c| c.to_digit(10))
        .is_some_and(|expected| expected == compute_checksum(line))
}

// ------------------------------------------------------------------------------------------------
// Field parsers
// ------------------------------------------------------------------------------------------------

/// `[+-]ddddd[+-]d`, the mantissa being read as `0.ddddd`.
fn implied_decimal(input: &str) -> IResult<&str, f64> {
    let (input, sign) = opt(one_of("+-")).parse(input)?;
    let (input, mantissa) = leading_decimal(input)?;
    let (input, exponent) = opt((one_of("+-"), digit1)).parse(input)?;

    let exponent = match exponent {
        Some((s, d)) => {
            let e = d.parse::<i32>().unwrap_or(0);
            if s == '-' {
                -e
            } else {
                e
            }
        }
        None => 0,
    };
    let value = mantissa * 10f64.powi(exponent);
    Ok((input, if sign == Some('-') { -value } else { value }))
}

/// Eccentricity with its leading `0.` omitted.
fn leading_decimal(input: &str) -> IResult<&str, f64> {
    map_res(digit1, |d: &str| format!("0.{d}").parse::<f64>()).parse(input)
}

/// Two-digit year followed by the fractional day of year.
fn epoch(input: &str) -> IResult<&str, (i32, f64)> {
    (map_res(take(2usize), |y: &str| y.parse::<i32>()), double).parse(input)
}

fn classification(input: &str) -> IResult<&str, Classification> {
    map_res(take(1usize), |c: &str| {
        c.chars()
            .next()
            .and_then(Classification::from_code)
            .ok_or("unknown classification code")
    })
    .parse(input)
}

/// Catalog number, plain digits or Alpha-5 (`A0001` = 100001, letters `I` and `O` skipped).
fn catalog_number(input: &str) -> IResult<&str, CatalogNumber> {
    let (input, first) =
        opt(satisfy(|c| c.is_ascii_uppercase() && c != 'I' && c != 'O')).parse(input)?;
    let (input, rest) = parse_u32(input)?;
    let value = match first {
        Some(c) => {
            let mut index = c as u32 - 'A' as u32 + 10;
            if c > 'I' {
                index -= 1;
            }
            if c > 'O' {
                index -= 1;
            }
            index * 10_000 + rest
        }
        None => rest,
    };
    Ok((input, value))
}

/// Run a parser over one fixed-column field.
///
/// Surrounding blanks are ignored, a blank field reads as `default` when one is given.
fn field<'a, O, P>(
    line: u8,
    name: &'static str,
    raw: &'a str,
    default: Option<O>,
    parser: P,
) -> Result<O, TleError>
where
    P: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        if let Some(value) = default {
            return Ok(value);
        }
    }
    all_consuming(parser)
        .parse(trimmed)
        .map(|(_, value)| value)
        .map_err(|_| TleError::FieldParse {
            line,
            field: name,
            value: raw.to_string(),
        })
}

/// Check the line number, the length and the checksum of one line.
fn check_line(line: &str, number: u8) -> Result<&str, TleError> {
    let line = line.trim_end();
    if let Some(column) = line.chars().position(|c| !c.is_ascii()) {
        return Err(TleError::InvalidCharacter {
            line: number,
            column: column + 1,
        });
    }
    if line.len() < LINE_LENGTH {
        return Err(TleError::LineLength {
            line: number,
            length: line.len(),
        });
    }
    let expected_start = char::from(b'0' + number);
    if !line.starts_with(expected_start) || &line[1..2] != " " {
        return Err(TleError::LineNumber { line: number });
    }

    let expected = line[68..69]
        .parse::<u32>()
        .map_err(|_| TleError::FieldParse {
            line: number,
            field: "checksum",
            value: line[68..69].to_string(),
        })?;
    let computed = compute_checksum(line);
    if expected != computed {
        return Err(TleError::Checksum {
            line: number,
            expected,
            computed,
        });
    }
    Ok(line)
}

/// Normalize an optional name line: trimmed, without the `0 ` prefix of the three-line format.
fn clean_name(name: &str) -> Option<String> {
    let name = name.trim();
    let name = name.strip_prefix("0 ").unwrap_or(name).trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Parse one element set.
///
/// Arguments
/// ---------
/// * `line1`, `line2`: the two 69-column lines, trailing blanks and line terminators allowed
/// * `name`: optional object name (the first line of the three-line format)
///
/// Return
/// ------
/// * the element set in internal units, or the first [`TleError`] found
///
/// See also
/// --------
/// * [`OrbitalElementRecord::from_mean_elements`] – unit conversion
pub fn parse_tle(
    line1: &str,
    line2: &str,
    name: Option<&str>,
) -> Result<OrbitalElementRecord, TleError> {
    let l1 = check_line(line1, 1)?;
    let l2 = check_line(line2, 2)?;

    let catalog_1 = field(1, "catalog number", &l1[2..7], None, catalog_number)?;
    let classification = field(
        1,
        "classification",
        &l1[7..8],
        Some(Classification::Unclassified),
        classification,
    )?;
    let international_designator = l1[9..17].trim().to_string();
    let (epoch_year, epoch_day) = field(1, "epoch", &l1[18..32], None, epoch)?;
    let mean_motion_dot = field(1, "first derivative of mean motion", &l1[33..43], None, double)?;
    let mean_motion_ddot = field(
        1,
        "second derivative of mean motion",
        &l1[44..52],
        Some(0.0),
        implied_decimal,
    )?;
    let bstar = field(1, "bstar", &l1[53..61], Some(0.0), implied_decimal)?;
    let ephemeris_type = field(1, "ephemeris type", &l1[62..63], Some(0), parse_u32)?;
    let element_set_number = field(1, "element set number", &l1[64..68], Some(0), parse_u32)?;

    let catalog_2 = field(2, "catalog number", &l2[2..7], None, catalog_number)?;
    if catalog_1 != catalog_2 {
        return Err(TleError::CatalogMismatch(catalog_1, catalog_2));
    }
    let inclination = field(2, "inclination", &l2[8..16], None, double)?;
    let right_ascension = field(2, "right ascension", &l2[17..25], None, double)?;
    let eccentricity = field(2, "eccentricity", &l2[26..33], None, leading_decimal)?;
    let argument_of_perigee = field(2, "argument of perigee", &l2[34..42], None, double)?;
    let mean_anomaly = field(2, "mean anomaly", &l2[43..51], None, double)?;
    let mean_motion = field(2, "mean motion", &l2[52..63], None, double)?;
    let revolution_number = field(2, "revolution number", &l2[63..68], Some(0), parse_u32)?;

    let metadata = ElementSetMetadata {
        catalog_number: catalog_1,
        name: name.and_then(clean_name),
        international_designator,
        classification,
        ephemeris_type: ephemeris_type as u8,
        element_set_number,
        revolution_number,
    };

    Ok(OrbitalElementRecord::from_mean_elements(
        metadata,
        &MeanElements {
            epoch_year,
            epoch_day,
            mean_motion,
            mean_motion_dot,
            mean_motion_ddot,
            bstar,
            inclination,
            right_ascension,
            eccentricity,
            argument_of_perigee,
            mean_anomaly,
        },
    ))
}

/// Parse every element set of a text, in two-line or three-line format.
///
/// Blank lines are skipped. A line that does not start a `1`/`2` pair is taken as the name of
/// the next element set.
pub fn parse_tle_str(text: &str) -> Result<Vec<OrbitalElementRecord>, TleError> {
    let mut records = Vec::new();
    let mut name: Option<&str> = None;
    let mut lines = text.lines().filter(|l| !l.trim().is_empty()).peekable();

    while let Some(line) = lines.next() {
        let starts_pair = line.starts_with("1 ")
            && lines.peek().is_some_and(|next| next.starts_with("2 "));
        if starts_pair {
            if let Some(line2) = lines.next() {
                records.push(parse_tle(line, line2, name.take())?);
            }
        } else if line.starts_with("1 ") || line.starts_with("2 ") {
            // lone element line, let the line checks report it
            let (line1, line2) = if line.starts_with("1 ") {
                (line, lines.next().unwrap_or(""))
            } else {
                ("", line)
            };
            records.push(parse_tle(line1, line2, name.take())?);
        } else {
            name = Some(line);
        }
    }

    Ok(records)
}

/// Read and parse an element set file.
///
/// See also
/// --------
/// * [`parse_tle_str`] – accepted layout
pub fn parse_tle_file(path: &Utf8Path) -> Result<Vec<OrbitalElementRecord>, Sgp4Error> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_tle_str(&text)?)
}

#[cfg(test)]
mod tle_test {
    use super::*;
    use crate::constants::{RADEG, XPDOTP};
    use approx::assert_relative_eq;

    const ISS_1: &str = "1 25544U 98067A   19356.46068278  .00000035  00000-0  86431-5 0  9990";
    const ISS_2: &str = "2 25544  51.6420 147.9381 0007793  61.6458  55.7201 15.50124783204461";

    #[test]
    fn test_checksum() {
        assert!(is_valid_checksum(ISS_1));
        assert!(is_valid_checksum(ISS_2));
        assert_eq!(compute_checksum(ISS_1), 0);
        assert_eq!(compute_checksum(ISS_2), 1);

        let mutated = format!("{}1", &ISS_1[..68]);
        assert!(!is_valid_checksum(&mutated));
        assert!(!is_valid_checksum("1 25544U"));
    }

    #[test]
    fn test_implied_decimal() {
        assert_relative_eq!(implied_decimal("86431-5").unwrap().1, 0.86431e-5, epsilon = 1e-20);
        assert_relative_eq!(implied_decimal("-11606-4").unwrap().1, -0.11606e-4, epsilon = 1e-20);
        assert_relative_eq!(implied_decimal("+12345+1").unwrap().1, 1.2345, epsilon = 1e-15);
        assert_eq!(implied_decimal("00000-0").unwrap().1, 0.0);
        assert_eq!(implied_decimal("00000+0").unwrap().1, 0.0);
    }

    #[test]
    fn test_alpha5_catalog_number() {
        assert_eq!(catalog_number("25544").unwrap().1, 25544);
        assert_eq!(catalog_number("A0001").unwrap().1, 100001);
        assert_eq!(catalog_number("J2931").unwrap().1, 182931);
        assert_eq!(catalog_number("Z9999").unwrap().1, 339999);
    }

    #[test]
    fn test_parse_iss() {
        let record = parse_tle(ISS_1, ISS_2, Some("0 ISS (ZARYA)  ")).unwrap();
        let meta = &record.metadata;
        assert_eq!(meta.catalog_number, 25544);
        assert_eq!(meta.name.as_deref(), Some("ISS (ZARYA)"));
        assert_eq!(meta.international_designator, "98067A");
        assert_eq!(meta.classification, Classification::Unclassified);
        assert_eq!(meta.ephemeris_type, 0);
        assert_eq!(meta.element_set_number, 999);
        assert_eq!(meta.revolution_number, 20446);

        assert_eq!(record.epoch_year, 2019);
        assert_relative_eq!(record.epoch_day, 356.46068278, epsilon = 1e-12);
        assert_relative_eq!(record.bstar, 0.86431e-5, epsilon = 1e-18);
        assert_relative_eq!(record.inclination, 51.6420 * RADEG, epsilon = 1e-15);
        assert_relative_eq!(record.eccentricity, 0.0007793, epsilon = 1e-15);
        assert_relative_eq!(record.mean_motion * XPDOTP, 15.50124783, epsilon = 1e-12);
    }

    #[test]
    fn test_parse_errors() {
        let mutated = format!("{}5", &ISS_1[..68]);
        assert_eq!(
            parse_tle(&mutated, ISS_2, None).unwrap_err(),
            TleError::Checksum {
                line: 1,
                expected: 5,
                computed: 0
            }
        );

        assert_eq!(
            parse_tle(&ISS_1[..60], ISS_2, None).unwrap_err(),
            TleError::LineLength { line: 1, length: 60 }
        );

        assert_eq!(
            parse_tle(ISS_2, ISS_1, None).unwrap_err(),
            TleError::LineNumber { line: 1 }
        );

        // 69 characters but 70 bytes
        let accented = format!("{}é{}", &ISS_2[..8], &ISS_2[9..]);
        assert_eq!(accented.chars().count(), 69);
        assert_eq!(
            parse_tle(ISS_1, &accented, None).unwrap_err(),
            TleError::InvalidCharacter { line: 2, column: 9 }
        );
        assert_eq!(
            parse_tle("1 25544U ©", ISS_2, None).unwrap_err(),
            TleError::InvalidCharacter { line: 1, column: 10 }
        );

        // letter in the inclination, checksum adjusted (digit 4 → letter counts 0, so -4)
        let bad = "2 25544  51.6A20 147.9381 0007793  61.6458  55.7201 15.50124783204467";
        assert!(matches!(
            parse_tle(ISS_1, bad, None).unwrap_err(),
            TleError::FieldParse { line: 2, field: "inclination", .. }
        ));
    }

    #[test]
    fn test_parse_multi_record_text() {
        let text = format!("ISS (ZARYA)\n{ISS_1}\n{ISS_2}\n\n{ISS_1}\r\n{ISS_2}\r\n");
        let records = parse_tle_str(&text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].metadata.name.as_deref(), Some("ISS (ZARYA)"));
        assert_eq!(records[1].metadata.name, None);
        assert_eq!(records[0].mean_motion, records[1].mean_motion);
    }
}
