use crate::error::VerificationError;
use core_types::{attributes, CoreError, Scale, Series};
use tracing::debug;

/// Brings a series from its declared scale to its default target scale.
///
/// Both scales are read from the grid columns `scale` and
/// `default_target_scale` (their display names).
pub fn rescale(series: &Series) -> Result<Series, VerificationError> {
    let scale = read_scale(series, attributes::SCALE)?;
    let target = read_scale(series, attributes::DEFAULT_TARGET_SCALE)?;

    let divider = target.multiplier() / scale.multiplier();
    debug!(mnemonic = series.mnemonic(), ?scale, ?target, divider, "Rescaling series");

    Ok(series.map_values(|_, v| v / divider))
}

fn read_scale(series: &Series, key: &str) -> Result<Scale, VerificationError> {
    let raw = series.display_attribute(key).ok_or_else(|| {
        CoreError::InvalidInput(key.to_string(), format!("missing on {}", series.mnemonic()))
    })?;
    Ok(raw.parse::<Scale>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::{Frequency, SeriesValue};
    use pretty_assertions::assert_eq;

    fn scaled(scale: &str, target: &str) -> Series {
        Series::new(
            "AFGN1CUX$.A",
            Frequency::Annual,
            vec![
                SeriesValue::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), Some(10.0)),
                SeriesValue::new(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(), Some(20.0)),
            ],
        )
        .with_attribute(attributes::SCALE, scale)
        .with_attribute(attributes::DEFAULT_TARGET_SCALE, target)
    }

    fn values(series: &Series) -> Vec<Option<f64>> {
        series.values.iter().map(|v| v.value).collect()
    }

    #[test]
    fn thousands_to_millions() {
        let result = rescale(&scaled("Thousands", "Millions")).unwrap();
        assert_eq!(values(&result), vec![Some(0.01), Some(0.02)]);
    }

    #[test]
    fn equal_scales_are_identity() {
        let series = scaled("Billions", "Billions");
        assert_eq!(rescale(&series).unwrap(), series);
    }

    #[test]
    fn unknown_scale_is_a_fixture_error() {
        let err = rescale(&scaled("Hundreds", "Millions")).unwrap_err();
        assert_eq!(
            err,
            VerificationError::Fixture(CoreError::UnknownScale("Hundreds".to_string()))
        );
    }
}
