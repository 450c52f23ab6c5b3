use crate::enums::Frequency;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute keys the verification logic reads or writes.
pub mod attributes {
    pub const DEFAULT_MNEMONIC: &str = "default_mnemonic";
    pub const SCALE: &str = "scale";
    pub const DEFAULT_TARGET_SCALE: &str = "default_target_scale";
    pub const BASE_PERIOD: &str = "base_period";
    pub const WMM_BASE_PERIOD_START: &str = "WmmBasePeriodStart";
    pub const WMM_ANNUALIZED: &str = "WmmAnnualized";
    pub const WMM_DEFAULT_TARGET_SCALE: &str = "WmmDefaultTargetScale";
    pub const FREQUENCY: &str = "frequency";
    pub const UNIT: &str = "unit";
    pub const CURRENCY: &str = "currency";
}

/// A single dated observation. Missing values are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesValue {
    #[serde(with = "crate::dates::flexible")]
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl SeriesValue {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self { date, value }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeValue {
    pub value: String,
    pub display_name: String,
}

impl AttributeValue {
    pub fn new(value: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            display_name: display_name.into(),
        }
    }
}

/// One time series as returned by a grid, page or overview query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    #[serde(default)]
    pub id: String,
    pub frequency: Frequency,
    #[serde(default)]
    pub function: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<AttributeValue>>,
    #[serde(default)]
    pub values: Vec<SeriesValue>,
}

impl Series {
    pub fn new(id: impl Into<String>, frequency: Frequency, values: Vec<SeriesValue>) -> Self {
        Self {
            id: id.into(),
            frequency,
            function: String::new(),
            attributes: BTreeMap::new(),
            values,
        }
    }

    /// Builder-style attribute setter where value and display name coincide.
    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.set_attribute(key, value, value);
        self
    }

    pub fn set_attribute(&mut self, key: &str, value: &str, display_name: &str) {
        self.attributes
            .insert(key.to_string(), vec![AttributeValue::new(value, display_name)]);
    }

    /// First raw value of the attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .and_then(|values| values.first())
            .map(|v| v.value.as_str())
    }

    /// First display name of the attribute, which is what the grid shows.
    pub fn display_attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .and_then(|values| values.first())
            .map(|v| v.display_name.as_str())
    }

    pub fn mnemonic(&self) -> &str {
        self.attribute(attributes::DEFAULT_MNEMONIC).unwrap_or(&self.id)
    }

    /// True if any `default_mnemonic` value contains `mnemonic`.
    pub fn matches_mnemonic(&self, mnemonic: &str) -> bool {
        self.attributes
            .get(attributes::DEFAULT_MNEMONIC)
            .is_some_and(|values| values.iter().any(|v| v.value.contains(mnemonic)))
    }

    pub fn value_at(&self, date: NaiveDate) -> Option<&SeriesValue> {
        self.values.iter().find(|v| v.date == date)
    }

    /// Returns a copy with every present value passed through `f`.
    pub fn map_values<F>(&self, mut f: F) -> Series
    where
        F: FnMut(&SeriesValue, f64) -> f64,
    {
        let mut mapped = self.clone();
        for observation in mapped.values.iter_mut() {
            if let Some(v) = observation.value {
                observation.value = Some(f(observation, v));
            }
        }
        mapped
    }

    pub fn has_only_null_values(&self) -> bool {
        self.values.iter().all(|v| v.value.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_service_payload() {
        let payload = json!({
            "id": "42",
            "frequency": "Quarterly",
            "function": "Rescale",
            "attributes": {
                "default_mnemonic": [{ "value": "AFGN1CUX$.Q", "displayName": "AFGN1CUX$.Q" }],
                "scale": [{ "value": "THOU", "displayName": "Thousands" }]
            },
            "values": [
                { "date": "2020-01-01T00:00:00", "value": 1.5 },
                { "date": "2020-04-01T00:00:00", "value": null }
            ]
        });

        let series: Series = serde_json::from_value(payload).unwrap();
        assert_eq!(series.mnemonic(), "AFGN1CUX$.Q");
        assert_eq!(series.attribute(attributes::SCALE), Some("THOU"));
        assert_eq!(series.display_attribute(attributes::SCALE), Some("Thousands"));
        assert!(series.matches_mnemonic("AFGN1CUX$"));
        assert_eq!(series.values[1].value, None);
        assert_eq!(series.values[0].date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    }

    #[test]
    fn map_values_skips_missing_observations() {
        let d = |m| NaiveDate::from_ymd_opt(2020, m, 1).unwrap();
        let series = Series::new(
            "s",
            Frequency::Monthly,
            vec![SeriesValue::new(d(1), Some(2.0)), SeriesValue::new(d(2), None)],
        );
        let doubled = series.map_values(|_, v| v * 2.0);
        assert_eq!(doubled.values[0].value, Some(4.0));
        assert_eq!(doubled.values[1].value, None);
    }
}
