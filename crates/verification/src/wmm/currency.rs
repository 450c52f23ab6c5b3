use crate::error::VerificationError;
use chrono::NaiveDate;
use core_types::{attributes, dates, CoreError, Series};
use tracing::debug;

/// How a series is converted into the target currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    /// Each observation uses the exchange rates of its own date.
    Nominal,
    /// Every observation uses the exchange rates of one base period.
    Real,
    /// The series is itself a USD exchange rate and is re-expressed against the target.
    ExchangeRate,
}

/// Exchange-rate series a conversion needs. Both are quoted per USD.
#[derive(Debug, Clone, Copy)]
pub struct ExchangeRates<'a> {
    /// Rate of the series' own currency; unused for `ExchangeRate`.
    pub source: Option<&'a Series>,
    pub target: &'a Series,
}

pub fn convert_currency(
    series: &Series,
    kind: ConversionKind,
    rates: ExchangeRates<'_>,
    base_period: Option<NaiveDate>,
) -> Result<Series, VerificationError> {
    debug!(mnemonic = series.mnemonic(), ?kind, "Converting currency");
    match kind {
        ConversionKind::Nominal => convert_nominal(series, required_source(series, rates)?, rates.target),
        ConversionKind::Real => {
            let base = match base_period {
                Some(date) => date,
                None => base_period_start(series)?,
            };
            convert_real(series, required_source(series, rates)?, rates.target, base)
        }
        ConversionKind::ExchangeRate => convert_exchange_rate(series, rates.target),
    }
}

/// `value / source[t] * target[t]` for every date `t`.
pub fn convert_nominal(
    series: &Series,
    source: &Series,
    target: &Series,
) -> Result<Series, VerificationError> {
    let mut converted = series.clone();
    for observation in converted.values.iter_mut() {
        let source_rate = rate_at(source, observation.date)?;
        let target_rate = rate_at(target, observation.date)?;
        observation.value = match (observation.value, source_rate, target_rate) {
            (Some(v), Some(s), Some(t)) => Some(v / s * t),
            _ => None,
        };
    }
    Ok(converted)
}

/// `value / source[base] * target[base]` with one pair of base-period rates.
pub fn convert_real(
    series: &Series,
    source: &Series,
    target: &Series,
    base_period: NaiveDate,
) -> Result<Series, VerificationError> {
    let source_rate = required_rate(source, base_period)?;
    let target_rate = required_rate(target, base_period)?;
    Ok(series.map_values(|_, v| v / source_rate * target_rate))
}

/// `value / target[t]` for every date `t`.
pub fn convert_exchange_rate(series: &Series, target: &Series) -> Result<Series, VerificationError> {
    let mut converted = series.clone();
    for observation in converted.values.iter_mut() {
        let target_rate = rate_at(target, observation.date)?;
        observation.value = match (observation.value, target_rate) {
            (Some(v), Some(t)) => Some(v / t),
            _ => None,
        };
    }
    Ok(converted)
}

/// The series' own base period, from its `WmmBasePeriodStart` attribute.
pub fn base_period_start(series: &Series) -> Result<NaiveDate, VerificationError> {
    let raw = series.attribute(attributes::WMM_BASE_PERIOD_START).ok_or_else(|| {
        CoreError::InvalidInput(
            attributes::WMM_BASE_PERIOD_START.to_string(),
            format!("missing on {}", series.mnemonic()),
        )
    })?;
    Ok(dates::parse_date(raw)?)
}

fn required_source<'a>(
    series: &Series,
    rates: ExchangeRates<'a>,
) -> Result<&'a Series, VerificationError> {
    rates.source.ok_or_else(|| {
        VerificationError::InvalidInput(format!(
            "conversion of {} needs a source exchange rate",
            series.mnemonic()
        ))
    })
}

fn rate_at(rates: &Series, date: NaiveDate) -> Result<Option<f64>, VerificationError> {
    rates
        .value_at(date)
        .map(|observation| observation.value)
        .ok_or_else(|| VerificationError::MissingObservation {
            mnemonic: rates.mnemonic().to_string(),
            date: date.to_string(),
        })
}

fn required_rate(rates: &Series, date: NaiveDate) -> Result<f64, VerificationError> {
    rate_at(rates, date)?.ok_or_else(|| VerificationError::UnusableBaseValue {
        mnemonic: rates.mnemonic().to_string(),
        date: date.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Frequency, SeriesValue};
    use pretty_assertions::assert_eq;

    fn year(y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, 1, 1).unwrap()
    }

    fn annual(id: &str, values: &[Option<f64>]) -> Series {
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, v)| SeriesValue::new(year(2004 + i as i32), *v))
            .collect();
        Series::new(id, Frequency::Annual, observations)
            .with_attribute(attributes::DEFAULT_MNEMONIC, id)
    }

    fn values(series: &Series) -> Vec<Option<f64>> {
        series.values.iter().map(|v| v.value).collect()
    }

    #[test]
    fn nominal_uses_rates_of_each_date() {
        let gdp = annual("AFGN1GDPCO.A", &[Some(100.0), Some(200.0), None]);
        let usd = annual("AFGN1RX.A", &[Some(50.0), Some(40.0), Some(30.0)]);
        let khr = annual("KHMN1RX.A", &[Some(4000.0), Some(4100.0), None]);

        let result = convert_nominal(&gdp, &usd, &khr).unwrap();
        assert_eq!(values(&result), vec![Some(8000.0), Some(20500.0), None]);
    }

    #[test]
    fn real_uses_a_single_base_period() {
        let gdp = annual("AFGN1GDPCR.A", &[Some(100.0), Some(200.0)])
            .with_attribute(attributes::WMM_BASE_PERIOD_START, "2005-01-01T00:00:00");
        let usd = annual("AFGN1RX.A", &[Some(50.0), Some(40.0)]);
        let khr = annual("KHMN1RX.A", &[Some(4000.0), Some(4000.0)]);

        let rates = ExchangeRates { source: Some(&usd), target: &khr };
        let result = convert_currency(&gdp, ConversionKind::Real, rates, None).unwrap();
        assert_eq!(values(&result), vec![Some(10000.0), Some(20000.0)]);

        let explicit = convert_currency(&gdp, ConversionKind::Real, rates, Some(year(2004))).unwrap();
        assert_eq!(values(&explicit), vec![Some(8000.0), Some(16000.0)]);
    }

    #[test]
    fn exchange_rate_divides_by_target() {
        let rx = annual("AFGN1RX.A", &[Some(50.0)]);
        let khr = annual("KHMN1RX.A", &[Some(4000.0)]);
        let result = convert_exchange_rate(&rx, &khr).unwrap();
        assert_eq!(values(&result), vec![Some(0.0125)]);
    }

    #[test]
    fn missing_rate_date_is_reported() {
        let gdp = annual("AFGN1GDPCO.A", &[Some(1.0), Some(2.0)]);
        let usd = annual("AFGN1RX.A", &[Some(1.0)]);
        let err = convert_nominal(&gdp, &usd, &usd).unwrap_err();
        assert!(matches!(err, VerificationError::MissingObservation { .. }));
    }

    #[test]
    fn nominal_without_source_rate_is_rejected() {
        let gdp = annual("AFGN1GDPCO.A", &[Some(1.0)]);
        let rates = ExchangeRates { source: None, target: &gdp };
        assert!(matches!(
            convert_currency(&gdp, ConversionKind::Nominal, rates, None),
            Err(VerificationError::InvalidInput(_))
        ));
    }
}
