//! Local replicas of the service's WMM recalculations.
//!
//! Each transform takes a series as fetched with the function switched off
//! and produces the series the service should return with it switched on.
//! Transforms never mutate their input.

pub mod annualize;
pub mod currency;
pub mod rebasing;
pub mod rescale;

pub use annualize::annualize;
pub use currency::{convert_currency, ConversionKind, ExchangeRates};
pub use rebasing::{
    base_period_average, base_period_label, rebase_indices, rebase_real_values, should_rebase,
    verify_base_period, RebasingTarget,
};
pub use rescale::rescale;

use crate::error::VerificationError;
use chrono::NaiveDate;
use core_types::{Annualization, Frequency, Series};

/// One step of a chained recalculation.
#[derive(Debug, Clone, Copy)]
pub enum Transform<'a> {
    Rescale,
    Annualize(Annualization),
    Currency {
        kind: ConversionKind,
        rates: ExchangeRates<'a>,
        base_period: Option<NaiveDate>,
    },
    RebaseIndices {
        base: Frequency,
        base_period: NaiveDate,
        target_base_value: f64,
    },
    RebaseRealValues {
        nominal: &'a Series,
        target_base_period: &'a Series,
        base: Frequency,
        base_period: NaiveDate,
    },
}

impl Transform<'_> {
    /// Applies the step. Rebasing steps that the service would skip for
    /// this series frequency return the input unchanged.
    pub fn apply(&self, series: &Series) -> Result<Series, VerificationError> {
        match *self {
            Transform::Rescale => rescale(series),
            Transform::Annualize(annualization) => Ok(annualize(series, annualization)),
            Transform::Currency {
                kind,
                rates,
                base_period,
            } => convert_currency(series, kind, rates, base_period),
            Transform::RebaseIndices {
                base,
                base_period,
                target_base_value,
            } => {
                if should_rebase(RebasingTarget::Indices, base, series.frequency)? {
                    rebase_indices(series, base, base_period, target_base_value)
                } else {
                    Ok(series.clone())
                }
            }
            Transform::RebaseRealValues {
                nominal,
                target_base_period,
                base,
                base_period,
            } => {
                if should_rebase(RebasingTarget::RealValues, base, series.frequency)? {
                    rebase_real_values(series, nominal, target_base_period, base_period)
                } else {
                    Ok(series.clone())
                }
            }
        }
    }
}

/// Applies `transforms` in order, feeding each result into the next step.
pub fn apply_all(series: &Series, transforms: &[Transform<'_>]) -> Result<Series, VerificationError> {
    transforms
        .iter()
        .try_fold(series.clone(), |current, transform| transform.apply(&current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{attributes, SeriesValue};
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn sequence_of_recalculations() {
        let real = Series::new(
            "ARGN1IFR.Q",
            Frequency::Quarterly,
            vec![
                SeriesValue::new(date(2005, 1), Some(1000.0)),
                SeriesValue::new(date(2005, 4), Some(2000.0)),
            ],
        )
        .with_attribute(attributes::SCALE, "Thousands")
        .with_attribute(attributes::DEFAULT_TARGET_SCALE, "Millions");
        let nominal = Series::new("ARGN1IF.Q", Frequency::Quarterly, vec![SeriesValue::new(date(2005, 1), Some(3.0))]);
        let target = Series::new("ARGN1IFR.Q", Frequency::Quarterly, vec![SeriesValue::new(date(2005, 1), Some(1.0))]);
        let usd = Series::new(
            "ARGN1RX.Q",
            Frequency::Quarterly,
            vec![SeriesValue::new(date(2005, 1), Some(2.0)), SeriesValue::new(date(2005, 4), Some(4.0))],
        );
        let khr = Series::new(
            "KHMN1RX.Q",
            Frequency::Quarterly,
            vec![SeriesValue::new(date(2005, 1), Some(10.0)), SeriesValue::new(date(2005, 4), Some(10.0))],
        );

        let steps = [
            Transform::Rescale,
            Transform::RebaseRealValues {
                nominal: &nominal,
                target_base_period: &target,
                base: Frequency::Quarterly,
                base_period: date(2005, 1),
            },
            Transform::Currency {
                kind: ConversionKind::Real,
                rates: ExchangeRates { source: Some(&usd), target: &khr },
                base_period: Some(date(2005, 1)),
            },
            Transform::Annualize(Annualization::Annualized),
        ];

        let result = apply_all(&real, &steps).unwrap();
        // 1000 thousands = 1 million; ×3 real rebasing; ×5 currency; ×4 annualized.
        let values: Vec<_> = result.values.iter().map(|v| v.value).collect();
        assert_eq!(values, vec![Some(60.0), Some(120.0)]);
        assert_eq!(result.attribute(attributes::WMM_ANNUALIZED), Some("Annualized"));
    }

    #[test]
    fn skipped_rebasing_returns_the_input() {
        let annual = Series::new("IDX.A", Frequency::Annual, vec![SeriesValue::new(date(2005, 1), Some(7.0))]);
        let step = Transform::RebaseIndices {
            base: Frequency::Monthly,
            base_period: date(2005, 1),
            target_base_value: 100.0,
        };
        assert_eq!(step.apply(&annual).unwrap(), annual);
    }
}
