//! Serde helpers for the temporal fields of the wire format.
//!
//! JSON has no date type, so dates travel as ISO-8601 text. Only fields the
//! schema declares as dates are routed through these helpers; any other string
//! is left alone even when it happens to look like a date.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serializer};

use crate::CoreError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Naive date-time layouts accepted for a date field. `%.f` also matches no fraction.
const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a calendar date.
///
/// Plain `YYYY-MM-DD` is the canonical form. A full date-time (RFC 3339, or a
/// naive `T`/space separated one) is accepted as well and truncated to its date.
pub fn parse_date(input: &str) -> Result<NaiveDate, CoreError> {
    let text = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(text) {
        return Ok(date_time.date_naive());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|date_time| date_time.date())
        .ok_or_else(|| CoreError::InvalidDate(input.to_string()))
}

/// `#[serde(with = "temporal::date")]` for required date fields.
pub mod date {
    use super::*;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_date(&text).map_err(serde::de::Error::custom)
    }
}

/// `#[serde(with = "temporal::date_option")]` for optional date fields.
pub mod date_option {
    use super::*;

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_some(&date.format(DATE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|text| parse_date(&text).map_err(serde::de::Error::custom))
            .transpose()
    }
}
