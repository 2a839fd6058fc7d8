//! Analysis pipeline that orchestrates loading, correlation, correction, and reporting

use crate::analysis::correlation::{count_undefined, find_growth_correlations};
use crate::analysis::fdr::{adjust_table, significant};
use crate::analysis::output::{write_report, ReportOptions};
use crate::structs::{
    AnalysisResult, ColumnStats, CsvData, Dataset, GrowthError, Outcome, ReportOutcome, Result,
    REQUIRED_COLUMNS,
};
use std::path::PathBuf;

/// Configuration for the analysis pipeline
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub tsv: bool,
    pub taxon_prefix: String,
    pub alpha: f64,
    pub require_taxa: bool,
    pub plot: bool,
    pub summary_json: bool,
}

impl AnalysisConfig {
    /// # Errors
    /// Returns `Config` if alpha is outside (0, 1) or the prefix is empty
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(GrowthError::Config(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        if self.taxon_prefix.is_empty() {
            return Err(GrowthError::Config("taxon prefix must not be empty".into()));
        }
        Ok(())
    }
}

/// Compute correlations, FDR correction, and significant subsets for a cleaned dataset
///
/// Missing required columns and undefined correlations are logged as
/// warnings; they never abort the run.
///
/// # Errors
/// Returns error only if taxon discovery fails under `require_taxa`
pub fn run_pipeline(dataset: &Dataset, config: &AnalysisConfig) -> Result<AnalysisResult> {
    let missing_columns = dataset.missing_columns(&REQUIRED_COLUMNS);
    if !missing_columns.is_empty() {
        log::warn!(
            "Missing columns {:?}. Analysis may be incomplete.",
            missing_columns
        );
    }

    let taxa = dataset.taxon_columns(&config.taxon_prefix, config.require_taxa)?;
    if !taxa.is_empty() {
        log::info!("Computing correlations for {} taxa...", taxa.len());
    }

    let table = find_growth_correlations(dataset, &taxa);
    let undefined_count = count_undefined(&table);
    if undefined_count > 0 {
        log::warn!(
            "{undefined_count} of {} taxa have undefined correlations (too few pairs or constant values)",
            table.len()
        );
    }

    let table = adjust_table(table, config.alpha);
    let significant_weight = significant(&table, Outcome::Weight, config.alpha);
    let significant_height = significant(&table, Outcome::Height, config.alpha);

    for subset in [&significant_weight, &significant_height] {
        log::info!(
            "Found {} taxa significantly correlated with {}.",
            subset.len(),
            subset.outcome.display_name()
        );
    }

    let column_stats = REQUIRED_COLUMNS
        .iter()
        .filter_map(|name| {
            dataset
                .numeric(name)
                .and_then(|values| ColumnStats::calculate(name, values))
        })
        .collect::<Vec<_>>();
    for stats in &column_stats {
        log::debug!("{}", stats.summary());
    }

    Ok(AnalysisResult {
        n_samples: dataset.n_rows(),
        n_features: dataset.n_cols(),
        taxa,
        table,
        significant_weight,
        significant_height,
        missing_columns,
        column_stats,
        undefined_count,
    })
}

/// Run every stage from the input file to the written artifacts
///
/// # Errors
/// Returns error if the input cannot be loaded, taxon discovery fails, or
/// the output directory cannot be created. Individual artifact failures are
/// reported in the returned `ReportOutcome`.
pub fn run_analysis(config: &AnalysisConfig) -> Result<(AnalysisResult, ReportOutcome)> {
    config.validate()?;

    let csv_data = CsvData::from_file(&config.input, config.tsv)?;
    log::info!(
        "Loaded dataset with {} samples and {} features.",
        csv_data.row_count(),
        csv_data.col_count()
    );

    let dataset = Dataset::from_csv(&csv_data).drop_missing_outcomes();
    let dropped = csv_data.row_count() - dataset.n_rows();
    if dropped > 0 {
        log::info!("Dropped {dropped} samples with missing growth z-scores.");
    }

    let result = run_pipeline(&dataset, config)?;

    let options = ReportOptions {
        input: &config.input,
        alpha: config.alpha,
        plot: config.plot,
        summary_json: config.summary_json,
    };
    let outcome = write_report(&config.output_dir, &result, &options)?;

    Ok((result, outcome))
}
