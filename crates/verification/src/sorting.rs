//! Multi-column sort/group verification.
//!
//! Columns are checked in precedence order. The first column must be ordered
//! over the whole result. Every later column only has to be ordered inside a
//! run: a stretch of rows where the preceding column holds the same value.

use crate::error::VerificationError;
use core_types::SortOrder;
use std::collections::HashMap;
use tracing::debug;

/// Canonical member order per column, consulted for `Tree` sorting.
#[derive(Debug, Clone, Default)]
pub struct TreeOrders {
    orders: HashMap<String, Vec<String>>,
}

impl TreeOrders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, order: Vec<String>) {
        self.orders.insert(column.into(), order);
    }

    /// Prepends custom aggregate names to a column's taxonomy order. The
    /// service lists a user's aggregates ahead of the regular members.
    pub fn prepend_custom_aggregates(&mut self, column: &str, aggregates: &[String]) {
        let entry = self.orders.entry(column.to_string()).or_default();
        let mut combined = aggregates.to_vec();
        combined.append(entry);
        *entry = combined;
    }

    pub fn get(&self, column: &str) -> Option<&[String]> {
        self.orders.get(column).map(Vec::as_slice)
    }
}

/// Checks that `columns` are sorted by `orders`, column by column.
///
/// `columns[i]` holds the displayed value of column `names[i]` for every row.
pub fn verify_multi_column_sort(
    columns: &[Vec<String>],
    orders: &[SortOrder],
    names: &[String],
    tree_orders: &TreeOrders,
) -> Result<(), VerificationError> {
    if columns.len() != orders.len() || columns.len() != names.len() {
        return Err(VerificationError::InvalidInput(format!(
            "{} columns, {} sort orders and {} names were supplied",
            columns.len(),
            orders.len(),
            names.len()
        )));
    }
    let Some(first) = columns.first() else {
        return Ok(());
    };
    if let Some(ragged) = columns.iter().position(|c| c.len() != first.len()) {
        return Err(VerificationError::InvalidInput(format!(
            "column '{}' has {} rows, expected {}",
            names[ragged],
            columns[ragged].len(),
            first.len()
        )));
    }

    for (index, column) in columns.iter().enumerate() {
        let boundaries = match index.checked_sub(1) {
            Some(previous) => run_boundaries(&columns[previous]),
            None => Vec::new(),
        };
        debug!(column = %names[index], runs = boundaries.len() + 1, "Verifying column order");

        let mut start = 0;
        for end in boundaries.iter().copied().chain(std::iter::once(column.len())) {
            check_run(&column[start..end], start, orders[index], &names[index], tree_orders)?;
            start = end;
        }
    }

    Ok(())
}

/// Row indices at which `column` changes value, ascending. Each index is
/// the first row of a new run.
pub fn run_boundaries(column: &[String]) -> Vec<usize> {
    column
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0] != pair[1])
        .map(|(row, _)| row + 1)
        .collect()
}

fn check_run(
    run: &[String],
    offset: usize,
    order: SortOrder,
    column: &str,
    tree_orders: &TreeOrders,
) -> Result<(), VerificationError> {
    match order {
        SortOrder::Asc | SortOrder::Desc => check_monotonic(run, offset, order, column),
        SortOrder::Tree => {
            let canonical = tree_orders
                .get(column)
                .ok_or_else(|| VerificationError::MissingTreeOrder(column.to_string()))?;
            check_tree_subsequence(run, offset, canonical, column)
        }
    }
}

fn check_monotonic(
    run: &[String],
    offset: usize,
    order: SortOrder,
    column: &str,
) -> Result<(), VerificationError> {
    for (i, pair) in run.windows(2).enumerate() {
        let in_order = match order {
            SortOrder::Desc => pair[0] >= pair[1],
            _ => pair[0] <= pair[1],
        };
        if !in_order {
            return Err(VerificationError::SortOrderViolation {
                column: column.to_string(),
                order,
                row: offset + i + 1,
                previous: pair[0].clone(),
                current: pair[1].clone(),
            });
        }
    }
    Ok(())
}

/// The run must appear in `canonical` order, possibly skipping members.
/// Repeated values keep the cursor where it is; it never moves backwards.
fn check_tree_subsequence(
    run: &[String],
    offset: usize,
    canonical: &[String],
    column: &str,
) -> Result<(), VerificationError> {
    let mut cursor = 0;
    for (i, value) in run.iter().enumerate() {
        match canonical[cursor..].iter().position(|member| member == value) {
            Some(step) => cursor += step,
            None => {
                return Err(VerificationError::TreeOrderViolation {
                    column: column.to_string(),
                    row: offset + i,
                    value: value.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn col(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{i}")).collect()
    }

    fn tree(column: &str, order: &[&str]) -> TreeOrders {
        let mut orders = TreeOrders::new();
        orders.insert(column, col(order));
        orders
    }

    #[test]
    fn ascending_and_descending_columns_pass() {
        let columns = vec![col(&["a", "a", "b", "c"]), col(&["z", "y", "x", "x"])];
        let result = verify_multi_column_sort(
            &columns,
            &[SortOrder::Asc, SortOrder::Desc],
            &names(2),
            &TreeOrders::new(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn single_out_of_order_pair_is_reported() {
        let columns = vec![col(&["a", "c", "b", "d"])];
        let err = verify_multi_column_sort(&columns, &[SortOrder::Asc], &names(1), &TreeOrders::new())
            .unwrap_err();
        assert_eq!(
            err,
            VerificationError::SortOrderViolation {
                column: "c0".to_string(),
                order: SortOrder::Asc,
                row: 2,
                previous: "c".to_string(),
                current: "b".to_string(),
            }
        );
    }

    #[test]
    fn secondary_column_is_checked_per_run_only() {
        // Second column restarts inside each run of the first.
        let columns = vec![col(&["a", "a", "b", "b"]), col(&["1", "2", "1", "2"])];
        assert!(
            verify_multi_column_sort(
                &columns,
                &[SortOrder::Asc, SortOrder::Asc],
                &names(2),
                &TreeOrders::new()
            )
            .is_ok()
        );

        let broken = vec![col(&["a", "a", "b", "b"]), col(&["2", "1", "1", "2"])];
        let err = verify_multi_column_sort(
            &broken,
            &[SortOrder::Asc, SortOrder::Asc],
            &names(2),
            &TreeOrders::new(),
        )
        .unwrap_err();
        assert!(matches!(err, VerificationError::SortOrderViolation { row: 1, .. }));
    }

    #[test]
    fn runs_follow_the_preceding_column_only() {
        // The first column never changes, so the third column is one run
        // even though the second column changes underneath it.
        let columns = vec![col(&["a", "b"]), col(&["x", "x"]), col(&["2", "1"])];
        assert!(run_boundaries(&columns[1]).is_empty());
        let err = verify_multi_column_sort(
            &columns,
            &[SortOrder::Asc, SortOrder::Asc, SortOrder::Asc],
            &names(3),
            &TreeOrders::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            VerificationError::SortOrderViolation { ref column, row: 1, .. } if column == "c2"
        ));

        let nested = vec![
            col(&["a", "a", "a", "a"]),
            col(&["x", "x", "y", "y"]),
            col(&["2", "3", "1", "4"]),
        ];
        assert_eq!(run_boundaries(&nested[1]), vec![2]);
        assert!(
            verify_multi_column_sort(
                &nested,
                &[SortOrder::Asc, SortOrder::Asc, SortOrder::Asc],
                &names(3),
                &TreeOrders::new()
            )
            .is_ok()
        );
    }

    #[test]
    fn no_change_means_no_boundaries() {
        assert!(run_boundaries(&col(&["a", "a", "a"])).is_empty());
        assert!(run_boundaries(&[]).is_empty());
        assert_eq!(run_boundaries(&col(&["a", "b", "b", "c"])), vec![1, 3]);
    }

    #[test]
    fn tree_order_accepts_forward_subsequences() {
        let orders = tree("c0", &["a", "b", "c"]);
        for run in [&["a", "b", "c"][..], &["a", "c"][..], &["a", "a", "b"][..]] {
            assert!(
                verify_multi_column_sort(&[col(run)], &[SortOrder::Tree], &names(1), &orders).is_ok(),
                "{run:?} should pass"
            );
        }
    }

    #[test]
    fn tree_order_rejects_backward_steps() {
        let orders = tree("c0", &["a", "b", "c"]);
        let err = verify_multi_column_sort(&[col(&["b", "a", "c"])], &[SortOrder::Tree], &names(1), &orders)
            .unwrap_err();
        assert!(matches!(err, VerificationError::TreeOrderViolation { row: 1, .. }));
    }

    #[test]
    fn tree_order_lists_custom_aggregates_first() {
        let mut orders = tree("c0", &["a", "b"]);
        orders.prepend_custom_aggregates("c0", &col(&["My Group"]));
        assert_eq!(orders.get("c0").unwrap(), col(&["My Group", "a", "b"]).as_slice());
        assert!(
            verify_multi_column_sort(&[col(&["My Group", "b"])], &[SortOrder::Tree], &names(1), &orders)
                .is_ok()
        );
    }

    #[test]
    fn tree_without_canonical_order_is_a_fixture_error() {
        let err = verify_multi_column_sort(&[col(&["a"])], &[SortOrder::Tree], &names(1), &TreeOrders::new())
            .unwrap_err();
        assert_eq!(err, VerificationError::MissingTreeOrder("c0".to_string()));
    }

    #[test]
    fn mismatched_inputs_are_rejected() {
        let ragged = vec![col(&["a", "b"]), col(&["a"])];
        assert!(matches!(
            verify_multi_column_sort(&ragged, &[SortOrder::Asc; 2], &names(2), &TreeOrders::new()),
            Err(VerificationError::InvalidInput(_))
        ));
        assert!(matches!(
            verify_multi_column_sort(&ragged, &[SortOrder::Asc], &names(2), &TreeOrders::new()),
            Err(VerificationError::InvalidInput(_))
        ));
    }
}
