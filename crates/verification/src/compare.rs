use crate::error::VerificationError;
use core_types::Series;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds an observation to `decimal_places` using banker's rounding.
///
/// Values outside `Decimal`'s range (or non-finite ones) are kept as their
/// textual form so they still compare equal to themselves.
pub fn round_observation(value: Option<f64>, decimal_places: u32) -> Option<String> {
    value.map(|v| match Decimal::from_f64(v) {
        Some(d) => d
            .round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
            .normalize()
            .to_string(),
        None => v.to_string(),
    })
}

/// Compares a locally recalculated series with the server's, date by date.
pub fn verify_series_matches(
    expected: &Series,
    actual: &Series,
    decimal_places: u32,
    base_frequency: &str,
) -> Result<(), VerificationError> {
    let mnemonic = expected.mnemonic().to_string();

    if expected.values.len() != actual.values.len() {
        return Err(VerificationError::LengthMismatch {
            mnemonic,
            expected: expected.values.len(),
            actual: actual.values.len(),
            base_frequency: base_frequency.to_string(),
        });
    }

    for (manual, server) in expected.values.iter().zip(&actual.values) {
        if manual.date != server.date {
            return Err(VerificationError::DateMismatch {
                mnemonic,
                expected: manual.date.to_string(),
                actual: server.date.to_string(),
            });
        }

        let expected_value = round_observation(manual.value, decimal_places);
        let actual_value = round_observation(server.value, decimal_places);
        if expected_value != actual_value {
            return Err(VerificationError::ValueMismatch {
                mnemonic,
                date: server.date.to_string(),
                expected: expected_value,
                actual: actual_value,
                base_frequency: base_frequency.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::{Frequency, SeriesValue};

    fn series(values: &[Option<f64>]) -> Series {
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, v)| SeriesValue::new(NaiveDate::from_ymd_opt(2000 + i as i32, 1, 1).unwrap(), *v))
            .collect();
        Series::new("s", Frequency::Annual, observations)
    }

    #[test]
    fn rounding_hides_float_noise() {
        assert_eq!(round_observation(Some(0.1 + 0.2), 9), round_observation(Some(0.3), 9));
        assert_eq!(round_observation(Some(0.01), 9).as_deref(), Some("0.01"));
        assert_eq!(round_observation(None, 9), None);
    }

    #[test]
    fn ties_round_to_even() {
        assert_eq!(round_observation(Some(0.125), 2).as_deref(), Some("0.12"));
        assert_eq!(round_observation(Some(0.375), 2).as_deref(), Some("0.38"));
    }

    #[test]
    fn detects_value_and_length_mismatches() {
        let manual = series(&[Some(1.0), None]);
        assert!(verify_series_matches(&manual, &series(&[Some(1.0000000001), None]), 9, "Annual").is_ok());

        let err = verify_series_matches(&manual, &series(&[Some(1.0), Some(2.0)]), 9, "Annual").unwrap_err();
        assert!(matches!(err, VerificationError::ValueMismatch { .. }));

        let err = verify_series_matches(&manual, &series(&[Some(1.0)]), 9, "Annual").unwrap_err();
        assert!(matches!(err, VerificationError::LengthMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn shifted_dates_are_reported_as_date_mismatch() {
        let manual = series(&[Some(1.0), Some(2.0)]);
        let mut shifted = manual.clone();
        shifted.values[1].date = NaiveDate::from_ymd_opt(2002, 1, 1).unwrap();

        let err = verify_series_matches(&manual, &shifted, 9, "Annual").unwrap_err();
        assert_eq!(
            err,
            VerificationError::DateMismatch {
                mnemonic: "s".to_string(),
                expected: "2001-01-01".to_string(),
                actual: "2002-01-01".to_string(),
            }
        );
    }
}
