//! Date parsing shared by the wire model.
//!
//! The service emits dates either as plain `YYYY-MM-DD` or as ISO timestamps
//! (`2005-01-01T00:00:00`, `2005-01-01T09:00:00.000Z`). Only the calendar date
//! matters for verification, so both forms collapse to a `NaiveDate`.

use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(raw: &str) -> Result<NaiveDate, CoreError> {
    let trimmed = raw.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map_err(|e| CoreError::InvalidDate(raw.to_string(), e.to_string()))
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `#[serde(with = "core_types::dates::flexible")]`
pub mod flexible {
    use super::*;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_date(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).map_err(serde::de::Error::custom)
    }
}

/// Optional counterpart of [`flexible`].
pub mod flexible_option {
    use super::*;

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_some(&format_date(d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_date(s).map(Some).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_timestamp_forms() {
        let expected = NaiveDate::from_ymd_opt(2005, 1, 1).unwrap();
        assert_eq!(parse_date("2005-01-01").unwrap(), expected);
        assert_eq!(parse_date("2005-01-01T00:00:00").unwrap(), expected);
        assert_eq!(parse_date("2005-01-01T09:00:00.000Z").unwrap(), expected);
        assert!(parse_date("01/01/2005").is_err());
    }
}
