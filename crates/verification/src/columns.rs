use core_types::Series;

/// Displayed value of `key` for every series that has the attribute.
pub fn column_values(series: &[Series], key: &str) -> Vec<String> {
    series
        .iter()
        .filter_map(|s| s.display_attribute(key))
        .map(str::to_string)
        .collect()
}

pub fn any_value_present(series: &[Series]) -> bool {
    series.iter().any(|s| s.values.iter().any(|v| v.value.is_some()))
}

pub fn any_series_all_null(series: &[Series]) -> bool {
    series.iter().any(Series::has_only_null_values)
}

/// True if any observation differs between `before` and `after`, pairing
/// series by position and observations by index.
pub fn any_value_changed(before: &[Series], after: &[Series]) -> bool {
    before.iter().zip(after).any(|(b, a)| {
        b.values.len() != a.values.len()
            || b.values.iter().zip(&a.values).any(|(x, y)| x.value != y.value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::{Frequency, SeriesValue};

    fn series(geo: Option<&str>, values: &[Option<f64>]) -> Series {
        let observations = values
            .iter()
            .map(|v| SeriesValue::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), *v))
            .collect();
        let s = Series::new("s", Frequency::Annual, observations);
        match geo {
            Some(g) => s.with_attribute("geography", g),
            None => s,
        }
    }

    #[test]
    fn extracts_only_series_with_the_attribute() {
        let rows = [series(Some("France"), &[]), series(None, &[]), series(Some("Chile"), &[])];
        assert_eq!(column_values(&rows, "geography"), vec!["France", "Chile"]);
    }

    #[test]
    fn value_predicates() {
        let empty = series(None, &[None, None]);
        let full = series(None, &[Some(1.0)]);
        assert!(any_series_all_null(&[full.clone(), empty.clone()]));
        assert!(!any_value_present(&[empty]));

        let changed = series(None, &[Some(2.0)]);
        assert!(any_value_changed(&[full.clone()], &[changed]));
        assert!(!any_value_changed(&[full.clone()], &[full]));
    }
}
