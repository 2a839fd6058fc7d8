//! Benjamini-Hochberg false discovery rate correction

use crate::structs::{AdjustedPValues, CorrelationTable, Outcome, SignificantSubset};
use std::cmp::Ordering;

/// Benjamini-Hochberg step-up adjustment, returned in input order
///
/// NaN p-values are left out of the family size and stay NaN. Ties are
/// ranked by input position.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn benjamini_hochberg(pvalues: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..pvalues.len())
        .filter(|&i| !pvalues[i].is_nan())
        .collect();
    order.sort_by(|&i, &j| {
        pvalues[i]
            .partial_cmp(&pvalues[j])
            .unwrap_or(Ordering::Equal)
            .then(i.cmp(&j))
    });

    let m = order.len() as f64;
    let mut adjusted = vec![f64::NAN; pvalues.len()];
    let mut prev = 1.0_f64;
    for (rank0, &idx) in order.iter().enumerate().rev() {
        let rank = (rank0 + 1) as f64;
        let adj = (pvalues[idx] * m / rank).min(1.0);
        prev = prev.min(adj);
        adjusted[idx] = prev;
    }
    adjusted
}

/// Correct all weight and height p-values as one family and attach them to the table
///
/// The family is every weight p-value in taxon order followed by every
/// height p-value; the corrected sequence splits back at the taxon count.
#[must_use]
pub fn adjust_table(mut table: CorrelationTable, alpha: f64) -> CorrelationTable {
    let n = table.len();
    let flattened: Vec<f64> = table
        .records
        .iter()
        .map(|r| r.weight_p)
        .chain(table.records.iter().map(|r| r.height_p))
        .collect();

    let mut corrected = benjamini_hochberg(&flattened);
    if !table.is_empty() {
        log::debug!(
            "{} of {} hypotheses below FDR {alpha}",
            corrected.iter().filter(|&&q| q < alpha).count(),
            corrected.len()
        );
    }

    debug_assert_eq!(corrected.len(), 2 * n);
    let height = corrected.split_off(n);

    table.adjusted = Some(AdjustedPValues {
        weight: corrected,
        height,
    });
    table
}

/// Rows whose adjusted p-value for `outcome` is below `alpha`
#[must_use]
pub fn significant(table: &CorrelationTable, outcome: Outcome, alpha: f64) -> SignificantSubset {
    let rows = (0..table.len())
        .filter(|&i| table.p_adj(i, outcome) < alpha)
        .collect();
    SignificantSubset { outcome, rows }
}
