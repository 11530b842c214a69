//! # CCSDS Orbit Mean-Elements Messages (XML)
//!
//! Reader for OMM documents as distributed by public catalogs, either a single `<omm>` element or
//! an `<ndm>` container holding several of them:
//!
//! ```text
//! omm
//! └── body
//!     └── segment
//!         ├── metadata        OBJECT_NAME, OBJECT_ID, CENTER_NAME, REF_FRAME, TIME_SYSTEM, ...
//!         └── data
//!             ├── meanElements    EPOCH, MEAN_MOTION, ECCENTRICITY, INCLINATION, RA_OF_ASC_NODE,
//!             │                   ARG_OF_PERICENTER, MEAN_ANOMALY
//!             └── tleParameters   EPHEMERIS_TYPE, CLASSIFICATION_TYPE, NORAD_CAT_ID,
//!                                 ELEMENT_SET_NO, REV_AT_EPOCH, BSTAR, MEAN_MOTION_DOT,
//!                                 MEAN_MOTION_DDOT
//! ```
//!
//! The mean elements carry the same information as a two-line element set and produce the same
//! [`OrbitalElementRecord`]. The `EPOCH` is an ISO-8601 UTC date, parsed with `hifitime`.
//! Numeric values written without a leading zero (`.0007793`) are accepted.
use std::str::FromStr;

use camino::Utf8Path;
use hifitime::Epoch;
use log::warn;
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::{
    epoch_time::EpochTime,
    orbital_elements::{Classification, ElementSetMetadata, MeanElements, OrbitalElementRecord},
    sgp4_errors::{OmmError, Sgp4Error},
};

#[derive(Debug, Deserialize)]
struct Ndm {
    #[serde(rename = "omm", default)]
    omms: Vec<Omm>,
}

#[derive(Debug, Deserialize)]
struct Omm {
    body: Body,
}

#[derive(Debug, Deserialize)]
struct Body {
    segment: Segment,
}

#[derive(Debug, Deserialize)]
struct Segment {
    metadata: Metadata,
    data: Data,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct Metadata {
    object_name: Option<String>,
    object_id: Option<String>,
    ref_frame: Option<String>,
    time_system: Option<String>,
    mean_element_theory: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Data {
    #[serde(rename = "meanElements")]
    mean_elements: MeanElementsXml,
    #[serde(rename = "tleParameters")]
    tle_parameters: TleParametersXml,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct MeanElementsXml {
    epoch: Option<String>,
    mean_motion: Option<String>,
    eccentricity: Option<String>,
    inclination: Option<String>,
    ra_of_asc_node: Option<String>,
    arg_of_pericenter: Option<String>,
    mean_anomaly: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct TleParametersXml {
    ephemeris_type: Option<String>,
    classification_type: Option<String>,
    norad_cat_id: Option<String>,
    element_set_no: Option<String>,
    rev_at_epoch: Option<String>,
    bstar: Option<String>,
    mean_motion_dot: Option<String>,
    mean_motion_ddot: Option<String>,
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, OmmError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(OmmError::MissingField(field))
}

fn parse_number<T: FromStr>(raw: &str, field: &'static str) -> Result<T, OmmError> {
    let raw = raw.trim();
    let normalized = match raw.strip_prefix('.') {
        Some(rest) => format!("0.{rest}"),
        None => match raw.strip_prefix("-.") {
            Some(rest) => format!("-0.{rest}"),
            None => raw.to_string(),
        },
    };
    normalized.parse::<T>().map_err(|_| OmmError::FieldParse {
        field,
        value: raw.to_string(),
    })
}

fn required_number<T: FromStr>(value: &Option<String>, field: &'static str) -> Result<T, OmmError> {
    parse_number(required(value, field)?, field)
}

fn optional_number<T: FromStr + Default>(
    value: &Option<String>,
    field: &'static str,
) -> Result<T, OmmError> {
    match value.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_number(raw, field),
        _ => Ok(T::default()),
    }
}

/// Epoch field, ISO-8601 with an implicit UTC time scale.
fn parse_epoch(raw: &str) -> Result<EpochTime, OmmError> {
    let field_error = || OmmError::FieldParse {
        field: "EPOCH",
        value: raw.to_string(),
    };
    let trimmed = raw.trim().trim_end_matches('Z');
    let instant = Epoch::from_str(trimmed)
        .or_else(|_| Epoch::from_str(&format!("{trimmed} UTC")))
        .map_err(|_| field_error())?;
    EpochTime::from_utc(instant).map_err(|_| field_error())
}

impl Omm {
    fn into_record(self) -> Result<OrbitalElementRecord, OmmError> {
        let segment = self.body.segment;
        let meta = segment.metadata;
        let mean = segment.data.mean_elements;
        let tle = segment.data.tle_parameters;

        if let Some(system) = meta.time_system.as_deref() {
            if system.trim() != "UTC" {
                return Err(OmmError::FieldParse {
                    field: "TIME_SYSTEM",
                    value: system.to_string(),
                });
            }
        }

        if let Some(frame) = meta.ref_frame.as_deref().map(str::trim) {
            if frame != "TEME" {
                warn!("OMM reference frame is {frame}, the elements are used as TEME");
            }
        }
        if let Some(theory) = meta.mean_element_theory.as_deref().map(str::trim) {
            if !theory.starts_with("SGP4") {
                warn!("OMM mean element theory is {theory}, not SGP4");
            }
        }

        let epoch = parse_epoch(required(&mean.epoch, "EPOCH")?)?;

        let classification = match tle.classification_type.as_deref().map(str::trim) {
            None | Some("") => Classification::Unclassified,
            Some(code) => code
                .chars()
                .next()
                .and_then(Classification::from_code)
                .ok_or_else(|| OmmError::FieldParse {
                    field: "CLASSIFICATION_TYPE",
                    value: code.to_string(),
                })?,
        };

        let metadata = ElementSetMetadata {
            catalog_number: required_number(&tle.norad_cat_id, "NORAD_CAT_ID")?,
            name: meta.object_name.map(|n| n.trim().to_string()),
            international_designator: meta
                .object_id
                .map(|id| id.trim().to_string())
                .unwrap_or_default(),
            classification,
            ephemeris_type: optional_number(&tle.ephemeris_type, "EPHEMERIS_TYPE")?,
            element_set_number: optional_number(&tle.element_set_no, "ELEMENT_SET_NO")?,
            revolution_number: optional_number(&tle.rev_at_epoch, "REV_AT_EPOCH")?,
        };

        let elements = MeanElements {
            epoch_year: epoch.year(),
            epoch_day: epoch.day_of_year(),
            mean_motion: required_number(&mean.mean_motion, "MEAN_MOTION")?,
            mean_motion_dot: optional_number(&tle.mean_motion_dot, "MEAN_MOTION_DOT")?,
            mean_motion_ddot: optional_number(&tle.mean_motion_ddot, "MEAN_MOTION_DDOT")?,
            bstar: required_number(&tle.bstar, "BSTAR")?,
            inclination: required_number(&mean.inclination, "INCLINATION")?,
            right_ascension: required_number(&mean.ra_of_asc_node, "RA_OF_ASC_NODE")?,
            eccentricity: required_number(&mean.eccentricity, "ECCENTRICITY")?,
            argument_of_perigee: required_number(&mean.arg_of_pericenter, "ARG_OF_PERICENTER")?,
            mean_anomaly: required_number(&mean.mean_anomaly, "MEAN_ANOMALY")?,
        };

        Ok(OrbitalElementRecord::from_mean_elements(metadata, &elements))
    }
}

/// Parse every element set of an OMM XML document.
///
/// Arguments
/// ---------
/// * `xml`: a single `<omm>` document, or an `<ndm>` container of `<omm>` elements
///
/// Return
/// ------
/// * one record per `<omm>` element, in document order
pub fn parse_omm_str(xml: &str) -> Result<Vec<OrbitalElementRecord>, OmmError> {
    let omms = if xml.contains("<ndm") {
        from_str::<Ndm>(xml)?.omms
    } else {
        vec![from_str::<Omm>(xml)?]
    };

    omms.into_iter().map(Omm::into_record).collect()
}

/// Read and parse an OMM XML file.
pub fn parse_omm_file(path: &Utf8Path) -> Result<Vec<OrbitalElementRecord>, Sgp4Error> {
    let xml = std::fs::read_to_string(path)?;
    Ok(parse_omm_str(&xml)?)
}

#[cfg(test)]
mod omm_test {
    use super::*;
    use approx::assert_relative_eq;

    const ISS_OMM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<omm id="CCSDS_OMM_VERS" version="2.0">
  <header>
    <CREATION_DATE>2019-12-22T16:03:06</CREATION_DATE>
    <ORIGINATOR>18 SPCS</ORIGINATOR>
  </header>
  <body>
    <segment>
      <metadata>
        <OBJECT_NAME>ISS (ZARYA)</OBJECT_NAME>
        <OBJECT_ID>1998-067A</OBJECT_ID>
        <CENTER_NAME>EARTH</CENTER_NAME>
        <REF_FRAME>TEME</REF_FRAME>
        <TIME_SYSTEM>UTC</TIME_SYSTEM>
        <MEAN_ELEMENT_THEORY>SGP4</MEAN_ELEMENT_THEORY>
      </metadata>
      <data>
        <meanElements>
          <EPOCH>2019-12-22T11:03:22.992192</EPOCH>
          <MEAN_MOTION>15.50124783</MEAN_MOTION>
          <ECCENTRICITY>.0007793</ECCENTRICITY>
          <INCLINATION>51.6420</INCLINATION>
          <RA_OF_ASC_NODE>147.9381</RA_OF_ASC_NODE>
          <ARG_OF_PERICENTER>61.6458</ARG_OF_PERICENTER>
          <MEAN_ANOMALY>55.7201</MEAN_ANOMALY>
        </meanElements>
        <tleParameters>
          <EPHEMERIS_TYPE>0</EPHEMERIS_TYPE>
          <CLASSIFICATION_TYPE>U</CLASSIFICATION_TYPE>
          <NORAD_CAT_ID>25544</NORAD_CAT_ID>
          <ELEMENT_SET_NO>999</ELEMENT_SET_NO>
          <REV_AT_EPOCH>20446</REV_AT_EPOCH>
          <BSTAR>.86431e-5</BSTAR>
          <MEAN_MOTION_DOT>.00000035</MEAN_MOTION_DOT>
          <MEAN_MOTION_DDOT>0</MEAN_MOTION_DDOT>
        </tleParameters>
      </data>
    </segment>
  </body>
</omm>"#;

    #[test]
    fn test_parse_single_omm() {
        let records = parse_omm_str(ISS_OMM).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.catalog_number(), 25544);
        assert_eq!(record.metadata.name.as_deref(), Some("ISS (ZARYA)"));
        assert_eq!(record.metadata.international_designator, "1998-067A");
        assert_eq!(record.metadata.element_set_number, 999);
        assert_eq!(record.metadata.revolution_number, 20446);
        assert_eq!(record.epoch_year, 2019);
        assert_relative_eq!(record.epoch_day, 356.46068278, epsilon = 1e-9);
        assert_relative_eq!(record.eccentricity, 0.0007793, epsilon = 1e-15);
        assert_relative_eq!(record.bstar, 0.86431e-5, epsilon = 1e-18);
    }

    #[test]
    fn test_parse_ndm_container() {
        let body = ISS_OMM.trim_start_matches(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        let xml = format!("<ndm>{body}{body}</ndm>");
        let records = parse_omm_str(&xml).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], records[1]);
    }

    #[test]
    fn test_missing_and_malformed_fields() {
        let missing = ISS_OMM.replace("<MEAN_MOTION>15.50124783</MEAN_MOTION>", "");
        assert_eq!(
            parse_omm_str(&missing).unwrap_err(),
            OmmError::MissingField("MEAN_MOTION")
        );

        let malformed = ISS_OMM.replace(
            "<INCLINATION>51.6420</INCLINATION>",
            "<INCLINATION>5x</INCLINATION>",
        );
        assert_eq!(
            parse_omm_str(&malformed).unwrap_err(),
            OmmError::FieldParse {
                field: "INCLINATION",
                value: "5x".to_string()
            }
        );

        assert!(matches!(
            parse_omm_str("<omm><body></omm>"),
            Err(OmmError::Xml(_))
        ));
    }

    #[test]
    fn test_leading_decimal_numbers() {
        assert_eq!(parse_number::<f64>(".5", "X").unwrap(), 0.5);
        assert_eq!(parse_number::<f64>("-.25", "X").unwrap(), -0.25);
        assert_eq!(parse_number::<u32>(" 42 ", "X").unwrap(), 42);
    }
}
