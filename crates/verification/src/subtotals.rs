//! Subtotal and grand total verification.
//!
//! The service formats every total with two decimals and `,` thousands
//! separators. Totals are recomputed locally from the returned series and
//! compared as formatted strings.

use crate::error::VerificationError;
use chrono::NaiveDate;
use core_types::{dates, Series, Summaries};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

pub const GRAND_TOTAL: &str = "Grand Total";

/// Per-date totals as the service reports them.
pub type DatedTotals = BTreeMap<NaiveDate, String>;

/// Sums every series per date; missing observations count as zero.
pub fn sum_per_date(series: &[Series]) -> BTreeMap<NaiveDate, f64> {
    let mut sums = BTreeMap::new();
    for s in series {
        for observation in &s.values {
            *sums.entry(observation.date).or_insert(0.0) += observation.value.unwrap_or(0.0);
        }
    }
    sums
}

/// Formats like .NET's invariant `N2`: `1234.567` becomes `1,234.57`.
pub fn format_total(value: f64) -> String {
    let rounded = Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .map(|d| format!("{d:.2}"))
        .unwrap_or_else(|| format!("{value:.2}"));

    let (sign, unsigned) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // "-0.00" is printed without a sign.
    if sign == "-" && grouped.chars().all(|c| c == '0' || c == ',') && fraction == "00" {
        return format!("{grouped}.{fraction}");
    }
    format!("{sign}{grouped}.{fraction}")
}

/// Re-keys the service's date strings so they compare against local dates.
pub fn parse_totals(raw: &BTreeMap<String, String>) -> Result<DatedTotals, VerificationError> {
    raw.iter()
        .map(|(date, total)| Ok((dates::parse_date(date)?, total.clone())))
        .collect()
}

/// Every locally computed total must appear, with the same text, in `totals`.
///
/// `column` and the series range only label a failure.
pub fn verify_totals(
    series: &[Series],
    totals: &DatedTotals,
    column: &str,
    range: (usize, usize),
) -> Result<(), VerificationError> {
    for (date, sum) in sum_per_date(series) {
        let expected = format_total(sum);
        let actual = totals.get(&date);
        if actual != Some(&expected) {
            return Err(VerificationError::SubtotalMismatch {
                column: column.to_string(),
                from: range.0,
                to: range.1,
                date: date.to_string(),
                expected,
                actual: actual.cloned(),
            });
        }
    }
    Ok(())
}

/// Grand total over the whole result.
pub fn verify_grand_total(
    series: &[Series],
    totals: &BTreeMap<String, String>,
) -> Result<(), VerificationError> {
    if series.is_empty() {
        return Ok(());
    }
    verify_totals(series, &parse_totals(totals)?, GRAND_TOTAL, (0, series.len() - 1))
}

/// Subtotals of one grouped column, keyed by the index of the last series
/// each subtotal covers.
pub fn subtotals_for_column(
    summaries: &Summaries,
    column_key: &str,
) -> Result<BTreeMap<usize, DatedTotals>, VerificationError> {
    let mut subtotals = BTreeMap::new();
    for (index, by_date) in summaries {
        let mut totals = DatedTotals::new();
        for (date, groups) in by_date {
            for columns in groups.values() {
                if let Some(value) = columns.get(column_key) {
                    totals.insert(dates::parse_date(date)?, summary_text(value));
                }
            }
        }
        if totals.is_empty() {
            continue;
        }
        let last_series = index.parse::<usize>().map_err(|e| {
            VerificationError::InvalidInput(format!("summary key '{index}' is not a series index: {e}"))
        })?;
        subtotals.insert(last_series, totals);
    }
    Ok(subtotals)
}

/// Checks the subtotals of every grouped column against the series they cover.
///
/// Each subtotal closes a block: series `previous_end + 1 ..= last_series`.
pub fn verify_grouped_subtotals(
    grouped_columns: &[String],
    series: &[Series],
    summaries: &Summaries,
) -> Result<(), VerificationError> {
    for column in grouped_columns {
        let subtotals = subtotals_for_column(summaries, column)?;
        debug!(column = %column, blocks = subtotals.len(), "Verifying subtotals");

        let mut start = 0;
        for (last_series, totals) in subtotals {
            if last_series >= series.len() || last_series < start {
                return Err(VerificationError::InvalidInput(format!(
                    "subtotal for '{column}' closes at series {last_series}, outside {start}..{}",
                    series.len()
                )));
            }
            verify_totals(&series[start..=last_series], &totals, column, (start, last_series))?;
            start = last_series + 1;
        }
    }
    Ok(())
}

fn summary_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Frequency, SeriesValue};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn year(y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, 1, 1).unwrap()
    }

    fn series(values: &[Option<f64>]) -> Series {
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, v)| SeriesValue::new(year(2020 + i as i32), *v))
            .collect();
        Series::new("s", Frequency::Annual, observations)
    }

    #[test]
    fn formats_like_n2() {
        assert_eq!(format_total(1234.567), "1,234.57");
        assert_eq!(format_total(0.0), "0.00");
        assert_eq!(format_total(0.125), "0.13");
        assert_eq!(format_total(999999.999), "1,000,000.00");
        assert_eq!(format_total(-1234567.1), "-1,234,567.10");
        assert_eq!(format_total(-0.001), "0.00");
        assert_eq!(format_total(12.5), "12.50");
    }

    #[test]
    fn nulls_count_as_zero() {
        let sums = sum_per_date(&[series(&[Some(1.5), None]), series(&[Some(2.0), Some(3.0)])]);
        assert_eq!(sums.values().copied().collect::<Vec<_>>(), vec![3.5, 3.0]);
    }

    #[test]
    fn grand_total_matches_service_strings() {
        let rows = [series(&[Some(1000.0), None]), series(&[Some(234.567), Some(1.0)])];
        let totals = BTreeMap::from([
            ("2020-01-01T00:00:00".to_string(), "1,234.57".to_string()),
            ("2021-01-01T00:00:00".to_string(), "1.00".to_string()),
        ]);
        assert!(verify_grand_total(&rows, &totals).is_ok());

        let wrong = BTreeMap::from([
            ("2020-01-01T00:00:00".to_string(), "1,234.56".to_string()),
            ("2021-01-01T00:00:00".to_string(), "1.00".to_string()),
        ]);
        assert!(matches!(
            verify_grand_total(&rows, &wrong),
            Err(VerificationError::SubtotalMismatch { .. })
        ));
    }

    #[test]
    fn grouped_subtotals_split_at_summary_indices() {
        let rows = [
            series(&[Some(1.0)]),
            series(&[Some(2.0)]),
            series(&[Some(10.0)]),
        ];
        let summaries: Summaries = serde_json::from_value(json!({
            "1": { "2020-01-01": { "g0": { "region": "3.00", "other": "x" } } },
            "2": { "2020-01-01": { "g1": { "region": 10.0 } } }
        }))
        .unwrap();

        let blocks = subtotals_for_column(&summaries, "region").unwrap();
        assert_eq!(blocks.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(blocks[&2][&year(2020)], "10.0");

        // Numeric summary values are compared by their JSON text, so "10.0" != "10.00".
        let err = verify_grouped_subtotals(&["region".to_string()], &rows, &summaries).unwrap_err();
        assert!(matches!(err, VerificationError::SubtotalMismatch { from: 2, to: 2, .. }));

        let string_summaries: Summaries = serde_json::from_value(json!({
            "1": { "2020-01-01": { "g0": { "region": "3.00" } } },
            "2": { "2020-01-01": { "g1": { "region": "10.00" } } }
        }))
        .unwrap();
        assert!(verify_grouped_subtotals(&["region".to_string()], &rows, &string_summaries).is_ok());
    }
}
