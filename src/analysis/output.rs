//! Result file writers for the reporting phase

use crate::analysis::plot::write_weight_plot;
use crate::structs::{
    AnalysisResult, ColumnStats, CorrelationTable, GrowthError, Outcome, ReportOutcome, Result,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CORRELATIONS_FILE: &str = "growth_correlations.csv";
pub const SIGNIFICANT_WEIGHT_FILE: &str = "significant_weight_taxa.csv";
pub const SIGNIFICANT_HEIGHT_FILE: &str = "significant_height_taxa.csv";
pub const WEIGHT_PLOT_FILE: &str = "weight_correlation_plot.png";
pub const SUMMARY_FILE: &str = "run_summary.json";

const TABLE_HEADER: [&str; 7] = [
    "taxon",
    "weight_corr",
    "weight_p",
    "height_corr",
    "height_p",
    "weight_p_adj",
    "height_p_adj",
];

/// What to write besides the three correlation tables
pub struct ReportOptions<'a> {
    pub input: &'a Path,
    pub alpha: f64,
    pub plot: bool,
    pub summary_json: bool,
}

/// Persist every artifact of a run under `output_dir`
///
/// Each artifact is attempted independently; failures are logged and
/// collected in the returned outcome rather than aborting the rest.
///
/// # Errors
/// Returns error only if the output directory cannot be created
pub fn write_report(
    output_dir: &Path,
    result: &AnalysisResult,
    options: &ReportOptions<'_>,
) -> Result<ReportOutcome> {
    fs::create_dir_all(output_dir).map_err(|e| GrowthError::output(output_dir, &e))?;

    let mut outcome = ReportOutcome::default();
    let all_rows: Vec<usize> = (0..result.table.len()).collect();

    attempt(&mut outcome, output_dir.join(CORRELATIONS_FILE), |path| {
        write_table(path, &result.table, &all_rows)
    });
    attempt(&mut outcome, output_dir.join(SIGNIFICANT_WEIGHT_FILE), |path| {
        write_table(path, &result.table, &result.significant_weight.rows)
    });
    attempt(&mut outcome, output_dir.join(SIGNIFICANT_HEIGHT_FILE), |path| {
        write_table(path, &result.table, &result.significant_height.rows)
    });

    if options.summary_json {
        attempt(&mut outcome, output_dir.join(SUMMARY_FILE), |path| {
            write_summary_json(path, result, options)
        });
    }

    if !outcome.written.is_empty() {
        log::info!("Results saved to '{}' directory.", output_dir.display());
    }

    if options.plot && !result.significant_weight.is_empty() {
        let path = output_dir.join(WEIGHT_PLOT_FILE);
        attempt(&mut outcome, path.clone(), |p| {
            write_weight_plot(p, &result.table, &result.significant_weight)
        });
        if outcome.written.last() == Some(&path) {
            log::info!("Plot saved as '{}'.", path.display());
            outcome.plot = Some(path);
        }
    }

    Ok(outcome)
}

fn attempt(outcome: &mut ReportOutcome, path: PathBuf, write: impl FnOnce(&Path) -> Result<()>) {
    match write(&path) {
        Ok(()) => outcome.written.push(path),
        Err(e) => {
            let err = GrowthError::output(&path, &e);
            log::error!("{err}");
            outcome.failures.push(err);
        }
    }
}

/// One CSV line of the correlation table; missing values serialize as empty fields
#[derive(Serialize)]
struct TableRow<'a> {
    taxon: &'a str,
    weight_corr: Option<f64>,
    weight_p: Option<f64>,
    height_corr: Option<f64>,
    height_p: Option<f64>,
    weight_p_adj: Option<f64>,
    height_p_adj: Option<f64>,
}

fn defined(value: f64) -> Option<f64> {
    (!value.is_nan()).then_some(value)
}

/// Write the selected table rows, header first even when no row is selected
///
/// # Errors
/// Returns error if file cannot be written
pub fn write_table(path: &Path, table: &CorrelationTable, rows: &[usize]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(TABLE_HEADER)?;

    for &i in rows {
        let Some(r) = table.records.get(i) else {
            continue;
        };
        writer.serialize(TableRow {
            taxon: &r.taxon,
            weight_corr: defined(r.weight_corr),
            weight_p: defined(r.weight_p),
            height_corr: defined(r.height_corr),
            height_p: defined(r.height_p),
            weight_p_adj: defined(table.p_adj(i, Outcome::Weight)),
            height_p_adj: defined(table.p_adj(i, Outcome::Height)),
        })?;
    }

    writer.flush()?;
    Ok(())
}

/// Write `run_summary.json` - machine-readable overview of the run
///
/// # Errors
/// Returns error if file cannot be written
pub fn write_summary_json(
    path: &Path,
    result: &AnalysisResult,
    options: &ReportOptions<'_>,
) -> Result<()> {
    let output = SummaryOutput {
        input: options.input.display().to_string(),
        sample_count: result.n_samples,
        column_count: result.n_features,
        taxon_count: result.taxa.len(),
        alpha: options.alpha,
        missing_columns: result.missing_columns.clone(),
        undefined_correlations: result.undefined_count,
        statistics: result.column_stats.iter().map(StatsEntry::from).collect(),
        significant_weight: result
            .significant_weight
            .taxa(&result.table)
            .into_iter()
            .map(String::from)
            .collect(),
        significant_height: result
            .significant_height
            .taxa(&result.table)
            .into_iter()
            .map(String::from)
            .collect(),
    };

    let json = serde_json::to_string_pretty(&output)?;
    fs::write(path, json)?;
    Ok(())
}

// JSON output structures

#[derive(Serialize)]
struct SummaryOutput {
    input: String,
    sample_count: usize,
    column_count: usize,
    taxon_count: usize,
    alpha: f64,
    missing_columns: Vec<String>,
    undefined_correlations: usize,
    statistics: Vec<StatsEntry>,
    significant_weight: Vec<String>,
    significant_height: Vec<String>,
}

#[derive(Serialize)]
struct StatsEntry {
    name: String,
    count: usize,
    mean: f64,
    std_dev: f64,
    min: f64,
    max: f64,
    q1: f64,
    median: f64,
    q3: f64,
    iqr: f64,
}

impl From<&ColumnStats> for StatsEntry {
    fn from(s: &ColumnStats) -> Self {
        Self {
            name: s.name.clone(),
            count: s.count,
            mean: s.mean,
            std_dev: s.std_dev,
            min: s.min,
            max: s.max,
            q1: s.q1,
            median: s.median,
            q3: s.q3,
            iqr: s.iqr,
        }
    }
}
