//! Per-taxon rank correlation against the growth outcomes

use crate::analysis::stats::spearman;
use crate::structs::{
    CorrelationRecord, CorrelationTable, Dataset, Outcome, SpearmanResult, TaxonColumns,
};

/// Compute Spearman correlations of every taxon column against weight and height z-scores
///
/// Records follow taxon order. Non-numeric taxon columns and absent outcome
/// columns produce NaN fields.
#[must_use]
pub fn find_growth_correlations(dataset: &Dataset, taxa: &TaxonColumns) -> CorrelationTable {
    let weight = dataset.numeric(Outcome::Weight.column());
    let height = dataset.numeric(Outcome::Height.column());

    let records = taxa
        .names
        .iter()
        .zip(&taxa.indices)
        .map(|(name, &index)| {
            let values = dataset.numeric_at(index);
            let w = correlate(name, values, weight, Outcome::Weight);
            let h = correlate(name, values, height, Outcome::Height);
            CorrelationRecord {
                taxon: name.clone(),
                weight_corr: w.coefficient,
                weight_p: w.p_value,
                height_corr: h.coefficient,
                height_p: h.p_value,
            }
        })
        .collect();

    CorrelationTable {
        records,
        adjusted: None,
    }
}

fn correlate(
    taxon: &str,
    values: Option<&[Option<f64>]>,
    outcome_values: Option<&[Option<f64>]>,
    outcome: Outcome,
) -> SpearmanResult {
    let (Some(values), Some(outcome_values)) = (values, outcome_values) else {
        return SpearmanResult::undefined(0);
    };

    let result = spearman(values, outcome_values);
    if result.is_undefined() {
        log::debug!(
            "{taxon} vs {}: correlation undefined ({} complete pairs)",
            outcome.column(),
            result.n
        );
    }
    result
}

/// Number of records with at least one undefined correlation
#[must_use]
pub fn count_undefined(table: &CorrelationTable) -> usize {
    table
        .records
        .iter()
        .filter(|r| {
            [r.weight_corr, r.weight_p, r.height_corr, r.height_p]
                .iter()
                .any(|v| v.is_nan())
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::CsvData;

    fn dataset(headers: &[&str], rows: &[Vec<String>]) -> Dataset {
        Dataset::from_csv(&CsvData {
            headers: headers.iter().map(|s| (*s).to_string()).collect(),
            rows: rows.to_vec(),
        })
    }

    fn growth_rows(n: usize) -> Vec<Vec<String>> {
        (0..n)
            .map(|i| {
                let w = i as f64 * 0.3 - 1.0;
                let h = ((i * 7) % n) as f64 * 0.2;
                vec![
                    w.to_string(),
                    h.to_string(),
                    (i * 2).to_string(),
                    "4".to_string(),
                    ((n - i) * 3).to_string(),
                ]
            })
            .collect()
    }

    const HEADERS: [&str; 5] = [
        "weight_z_score",
        "height_z_score",
        "bacterial_abundance_rising",
        "bacterial_abundance_flat",
        "bacterial_abundance_falling",
    ];

    #[test]
    fn test_one_record_per_taxon_in_order() {
        let ds = dataset(&HEADERS, &growth_rows(10));
        let taxa = ds.taxon_columns("bacterial_abundance_", true).expect("taxa");

        let table = find_growth_correlations(&ds, &taxa);

        let names: Vec<&str> = table.records.iter().map(|r| r.taxon.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "bacterial_abundance_rising",
                "bacterial_abundance_flat",
                "bacterial_abundance_falling"
            ]
        );
        assert!(table.adjusted.is_none());
    }

    #[test]
    fn test_perfect_and_constant_taxa() {
        let ds = dataset(&HEADERS, &growth_rows(10));
        let taxa = ds.taxon_columns("bacterial_abundance_", true).expect("taxa");

        let table = find_growth_correlations(&ds, &taxa);

        let rising = &table.records[0];
        assert!((rising.weight_corr - 1.0).abs() < 1e-12);
        assert!(rising.weight_p < 1e-6);

        let flat = &table.records[1];
        assert!(flat.weight_corr.is_nan());
        assert!(flat.weight_p.is_nan());
        assert!(flat.height_corr.is_nan());
        assert!(flat.height_p.is_nan());

        let falling = &table.records[2];
        assert!((falling.weight_corr + 1.0).abs() < 1e-12);

        assert_eq!(count_undefined(&table), 1);
    }

    #[test]
    fn test_complete_taxon_uses_every_sample() {
        let ds = dataset(&HEADERS, &growth_rows(12));
        let taxon = ds.numeric("bacterial_abundance_rising").expect("taxon");
        let weight = ds.numeric("weight_z_score").expect("weight");

        assert_eq!(spearman(taxon, weight).n, ds.n_rows());
    }

    #[test]
    fn test_infinite_abundance_still_uses_every_sample() {
        let headers = ["weight_z_score", "bacterial_abundance_spike"];
        let rows: Vec<Vec<String>> = ["0", "1", "2", "3", "inf"]
            .iter()
            .enumerate()
            .map(|(i, v)| vec![i.to_string(), (*v).to_string()])
            .collect();
        let ds = dataset(&headers, &rows);
        let taxon = ds.numeric("bacterial_abundance_spike").expect("taxon");
        let weight = ds.numeric("weight_z_score").expect("weight");

        assert_eq!(taxon[4], Some(f64::INFINITY));
        let r = spearman(taxon, weight);
        assert_eq!(r.n, ds.n_rows());
        assert!((r.coefficient - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_height_column_gives_nan_height() {
        let headers = ["weight_z_score", "bacterial_abundance_a"];
        let rows: Vec<Vec<String>> = (0..6)
            .map(|i| vec![i.to_string(), (i * i).to_string()])
            .collect();
        let ds = dataset(&headers, &rows);
        let taxa = ds.taxon_columns("bacterial_abundance_", true).expect("taxa");

        let table = find_growth_correlations(&ds, &taxa);

        assert!((table.records[0].weight_corr - 1.0).abs() < 1e-12);
        assert!(table.records[0].height_corr.is_nan());
        assert!(table.records[0].height_p.is_nan());
    }

    #[test]
    fn test_reordering_taxa_reorders_records() {
        let ds = dataset(&HEADERS, &growth_rows(10));
        let taxa = ds.taxon_columns("bacterial_abundance_", true).expect("taxa");
        let reversed = TaxonColumns {
            names: taxa.names.iter().rev().cloned().collect(),
            indices: taxa.indices.iter().rev().copied().collect(),
        };

        let forward = find_growth_correlations(&ds, &taxa);
        let backward = find_growth_correlations(&ds, &reversed);

        assert_eq!(forward.records[0].taxon, backward.records[2].taxon);
        assert_eq!(
            forward.records[0].weight_corr.to_bits(),
            backward.records[2].weight_corr.to_bits()
        );
        assert_eq!(
            forward.records[2].height_p.to_bits(),
            backward.records[0].height_p.to_bits()
        );
    }
}
