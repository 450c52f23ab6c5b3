//! Index and real-value rebasing.
//!
//! The service only rebases a series when the base frequency is compatible
//! with the series frequency; [`should_rebase`] encodes that policy and the
//! scenarios fall back to the untouched series when it says no.

use crate::error::VerificationError;
use crate::wmm::currency::base_period_start;
use chrono::{Datelike, NaiveDate};
use core_types::{attributes, CoreError, Frequency, Series};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebasingTarget {
    Indices,
    RealValues,
}

/// Whether the service applies a rebasing of `base` frequency to a series
/// of `series` frequency.
pub fn should_rebase(
    target: RebasingTarget,
    base: Frequency,
    series: Frequency,
) -> Result<bool, VerificationError> {
    match (target, base) {
        (_, Frequency::Annual) => Ok(true),
        (RebasingTarget::Indices, Frequency::Quarterly) => {
            Ok(matches!(series, Frequency::Quarterly | Frequency::Monthly))
        }
        (RebasingTarget::Indices, Frequency::Monthly) => Ok(series == Frequency::Monthly),
        (RebasingTarget::RealValues, Frequency::Quarterly) => Ok(series == Frequency::Quarterly),
        (RebasingTarget::RealValues, other) => Err(CoreError::InvalidInput(
            "real values base frequency".to_string(),
            format!("real monetary rebasing can be of Annual or Quarterly frequency, {other} is incorrect"),
        )
        .into()),
        (RebasingTarget::Indices, other) => Err(CoreError::InvalidInput(
            "indices base frequency".to_string(),
            format!("{other} is not a rebasing frequency"),
        )
        .into()),
    }
}

/// Average of the series over the base period starting at `base_period`.
///
/// Missing observations inside the period count as zero; the divisor is the
/// number of sub-periods the base frequency spans, not the number found.
pub fn base_period_average(
    series: &Series,
    base: Frequency,
    base_period: NaiveDate,
) -> Result<f64, VerificationError> {
    let divisor = match (series.frequency, base) {
        (s, b) if s == b => return single_base_value(series, base_period),
        (Frequency::Quarterly, Frequency::Annual) => 4.0,
        (Frequency::Monthly, Frequency::Annual) => 12.0,
        (Frequency::Monthly, Frequency::Quarterly) => 3.0,
        (s, b) => {
            return Err(CoreError::InvalidInput(
                "base frequency".to_string(),
                format!("cannot average a {s} series over a {b} base period"),
            )
            .into());
        }
    };

    let months = match base {
        Frequency::Annual => 1..=12,
        _ => quarter_months(base_period.month())?,
    };
    let sum: f64 = series
        .values
        .iter()
        .filter(|v| v.date.year() == base_period.year() && months.contains(&v.date.month()))
        .filter_map(|v| v.value)
        .sum();

    Ok(sum / divisor)
}

/// `value / base_average * target_base_value`.
pub fn rebase_indices(
    series: &Series,
    base: Frequency,
    base_period: NaiveDate,
    target_base_value: f64,
) -> Result<Series, VerificationError> {
    let average = base_period_average(series, base, base_period)?;
    if average == 0.0 {
        return Err(VerificationError::UnusableBaseValue {
            mnemonic: series.mnemonic().to_string(),
            date: base_period.to_string(),
        });
    }
    debug!(mnemonic = series.mnemonic(), %base, average, "Rebasing indices");
    Ok(series.map_values(|_, v| v / average * target_base_value))
}

/// `value * nominal[base] / target_base_period[base]`.
pub fn rebase_real_values(
    series: &Series,
    nominal: &Series,
    target_base_period: &Series,
    base_period: NaiveDate,
) -> Result<Series, VerificationError> {
    let nominal_value = single_base_value(nominal, base_period)?;
    let target_value = single_base_value(target_base_period, base_period)?;
    debug!(
        mnemonic = series.mnemonic(),
        nominal_value, target_value, "Rebasing real values"
    );
    Ok(series.map_values(|_, v| v * nominal_value / target_value))
}

/// The `base_period` label the service shows after rebasing.
pub fn base_period_label(base: Frequency, base_period: NaiveDate) -> Result<String, VerificationError> {
    let year = base_period.year();
    match base {
        Frequency::Annual => Ok(year.to_string()),
        Frequency::Quarterly => Ok(format!("{year}-Q{}", (base_period.month() - 1) / 3 + 1)),
        Frequency::Monthly => Ok(format!("{year}-{}", base_period.month())),
        other => Err(CoreError::UnknownRebasingCode(other.to_string()).into()),
    }
}

/// Checks the series' `base_period` attribute.
///
/// When rebasing applied it must name the requested base period; otherwise
/// it must be the year of the series' own `WmmBasePeriodStart`.
pub fn verify_base_period(
    series: &Series,
    rebased: bool,
    base: Frequency,
    base_period: NaiveDate,
) -> Result<(), VerificationError> {
    let expected = if rebased {
        base_period_label(base, base_period)?
    } else {
        base_period_start(series)?.year().to_string()
    };
    let actual = series.attribute(attributes::BASE_PERIOD).unwrap_or_default();

    if actual != expected {
        return Err(VerificationError::BasePeriodMismatch {
            mnemonic: series.mnemonic().to_string(),
            expected,
            actual: actual.to_string(),
            base_frequency: base.to_string(),
        });
    }
    Ok(())
}

fn single_base_value(series: &Series, date: NaiveDate) -> Result<f64, VerificationError> {
    let observation = series
        .value_at(date)
        .ok_or_else(|| VerificationError::MissingObservation {
            mnemonic: series.mnemonic().to_string(),
            date: date.to_string(),
        })?;
    observation.value.ok_or_else(|| VerificationError::UnusableBaseValue {
        mnemonic: series.mnemonic().to_string(),
        date: date.to_string(),
    })
}

fn quarter_months(first_month: u32) -> Result<std::ops::RangeInclusive<u32>, VerificationError> {
    match first_month {
        1 | 4 | 7 | 10 => Ok(first_month..=first_month + 2),
        other => Err(CoreError::InvalidInput(
            "quarterly base period".to_string(),
            format!("month {other} does not start a quarter"),
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::round_observation;
    use core_types::SeriesValue;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn quarterly(values: &[f64]) -> Series {
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, v)| SeriesValue::new(date(2005, 1 + 3 * i as u32), Some(*v)))
            .collect();
        Series::new("IDX.Q", Frequency::Quarterly, observations)
    }

    #[test]
    fn rebasing_policy() {
        use Frequency::*;
        use RebasingTarget::*;

        assert!(should_rebase(Indices, Annual, Monthly).unwrap());
        assert!(should_rebase(Indices, Quarterly, Monthly).unwrap());
        assert!(!should_rebase(Indices, Quarterly, Annual).unwrap());
        assert!(should_rebase(Indices, Monthly, Monthly).unwrap());
        assert!(!should_rebase(Indices, Monthly, Quarterly).unwrap());

        assert!(should_rebase(RealValues, Annual, Quarterly).unwrap());
        assert!(should_rebase(RealValues, Quarterly, Quarterly).unwrap());
        assert!(!should_rebase(RealValues, Quarterly, Annual).unwrap());
        assert!(should_rebase(RealValues, Monthly, Monthly).is_err());
        assert!(should_rebase(Indices, Daily, Daily).is_err());
    }

    #[test]
    fn quarterly_series_rebased_to_annual_base() {
        let series = quarterly(&[1.0, 2.0, 3.0, 4.0]);
        let rebased = rebase_indices(&series, Frequency::Annual, date(2005, 1), 100.0).unwrap();
        let rounded: Vec<_> = rebased
            .values
            .iter()
            .map(|v| round_observation(v.value, 9))
            .collect();
        assert_eq!(
            rounded,
            ["40", "80", "120", "160"].map(|v| Some(v.to_string())).to_vec()
        );
    }

    #[test]
    fn monthly_series_averaged_over_a_quarter() {
        let observations = (1..=6)
            .map(|m| SeriesValue::new(date(2005, m), Some(m as f64)))
            .collect();
        let monthly = Series::new("IDX.M", Frequency::Monthly, observations);

        assert_eq!(base_period_average(&monthly, Frequency::Quarterly, date(2005, 4)).unwrap(), 5.0);
        assert!(base_period_average(&monthly, Frequency::Quarterly, date(2005, 2)).is_err());
    }

    #[test]
    fn same_frequency_uses_the_base_value() {
        let series = quarterly(&[2.0, 4.0]);
        assert_eq!(base_period_average(&series, Frequency::Quarterly, date(2005, 4)).unwrap(), 4.0);
        assert!(matches!(
            base_period_average(&series, Frequency::Quarterly, date(2006, 1)),
            Err(VerificationError::MissingObservation { .. })
        ));
    }

    #[test]
    fn real_rebasing_keeps_nominal_level_at_base() {
        let real = quarterly(&[50.0, 60.0]);
        let nominal = quarterly(&[80.0, 90.0]);
        let target = quarterly(&[50.0, 70.0]);

        let rebased = rebase_real_values(&real, &nominal, &target, date(2005, 1)).unwrap();
        assert_eq!(rebased.values[0].value, Some(80.0));
    }

    #[test]
    fn base_period_labels() {
        assert_eq!(base_period_label(Frequency::Annual, date(2005, 1)).unwrap(), "2005");
        assert_eq!(base_period_label(Frequency::Quarterly, date(2005, 7)).unwrap(), "2005-Q3");
        assert_eq!(base_period_label(Frequency::Monthly, date(2005, 11)).unwrap(), "2005-11");
    }

    #[test]
    fn base_period_attribute_is_checked() {
        let series = quarterly(&[1.0])
            .with_attribute(attributes::BASE_PERIOD, "2010")
            .with_attribute(attributes::WMM_BASE_PERIOD_START, "2010-01-01T00:00:00");

        assert!(verify_base_period(&series, false, Frequency::Annual, date(2005, 1)).is_ok());
        assert!(matches!(
            verify_base_period(&series, true, Frequency::Annual, date(2005, 1)),
            Err(VerificationError::BasePeriodMismatch { .. })
        ));
    }
}
