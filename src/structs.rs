//! Consolidated public types for the growth-taxa crate
//!
//! This module contains all public structs, enums, and error types used across the crate.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Column Names and Defaults
// ============================================================================

pub const AGE_COLUMN: &str = "infant_age_months";
pub const WEIGHT_COLUMN: &str = "weight_z_score";
pub const HEIGHT_COLUMN: &str = "height_z_score";

/// Columns the analysis expects; absence is reported but not fatal
pub const REQUIRED_COLUMNS: [&str; 3] = [AGE_COLUMN, WEIGHT_COLUMN, HEIGHT_COLUMN];

pub const DEFAULT_TAXON_PREFIX: &str = "bacterial_abundance_";
pub const DEFAULT_ALPHA: f64 = 0.05;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum GrowthError {
    #[error("cannot read input {}: {source}", path.display())]
    DataAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input is not valid tabular data: {0}")]
    Format(String),

    #[error("no columns found with taxon prefix '{prefix}'")]
    NoTaxa { prefix: String },

    #[error("failed to write {}: {message}", path.display())]
    OutputWrite { path: PathBuf, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Plot error: {0}")]
    Plot(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GrowthError {
    /// Wrap any error raised while persisting `path` as an output failure
    pub fn output(path: impl Into<PathBuf>, err: &impl std::fmt::Display) -> Self {
        Self::OutputWrite {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GrowthError>;

// ============================================================================
// CSV Types
// ============================================================================

/// Represents a parsed CSV/TSV file with headers and rows
#[derive(Debug, Clone)]
pub struct CsvData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

// ============================================================================
// Dataset Types
// ============================================================================

/// Values of one typed column; `None` marks a missing cell
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

/// Typed table of samples (rows) by features (columns)
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub columns: Vec<Column>,
    pub(crate) n_rows: usize,
}

/// Validated taxon columns, in dataset column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonColumns {
    pub names: Vec<String>,
    pub indices: Vec<usize>,
}

impl TaxonColumns {
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Growth outcome a taxon is correlated against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Weight,
    Height,
}

impl Outcome {
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Weight => WEIGHT_COLUMN,
            Self::Height => HEIGHT_COLUMN,
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Weight => "weight-for-age",
            Self::Height => "height-for-age",
        }
    }
}

// ============================================================================
// Statistics Types
// ============================================================================

/// Result of a Spearman rank correlation; NaN fields mean undefined
#[derive(Debug, Clone, Copy)]
pub struct SpearmanResult {
    pub coefficient: f64,
    pub p_value: f64,
    /// Number of complete pairs used
    pub n: usize,
}

impl SpearmanResult {
    #[must_use]
    pub fn undefined(n: usize) -> Self {
        Self {
            coefficient: f64::NAN,
            p_value: f64::NAN,
            n,
        }
    }

    #[must_use]
    pub fn is_undefined(&self) -> bool {
        self.coefficient.is_nan() || self.p_value.is_nan()
    }
}

/// Descriptive statistics for a numeric column
#[derive(Debug, Clone)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub iqr: f64,
}

impl ColumnStats {
    /// Format as a summary string
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: n={}, mean={:.2}, std={:.2}, min={:.2}, Q1={:.2}, median={:.2}, Q3={:.2}, max={:.2}",
            self.name, self.count, self.mean, self.std_dev, self.min, self.q1, self.median, self.q3, self.max
        )
    }
}

// ============================================================================
// Correlation Types
// ============================================================================

/// Correlations of one taxon against both growth outcomes
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationRecord {
    pub taxon: String,
    pub weight_corr: f64,
    pub weight_p: f64,
    pub height_corr: f64,
    pub height_p: f64,
}

/// FDR-adjusted p-values, one per record in table order
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustedPValues {
    pub weight: Vec<f64>,
    pub height: Vec<f64>,
}

/// Ordered per-taxon correlations, augmented with adjusted p-values after correction
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CorrelationTable {
    pub records: Vec<CorrelationRecord>,
    pub adjusted: Option<AdjustedPValues>,
}

impl CorrelationTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Adjusted p-value for a row, NaN before correction
    #[must_use]
    pub fn p_adj(&self, row: usize, outcome: Outcome) -> f64 {
        self.adjusted
            .as_ref()
            .and_then(|adj| match outcome {
                Outcome::Weight => adj.weight.get(row),
                Outcome::Height => adj.height.get(row),
            })
            .copied()
            .unwrap_or(f64::NAN)
    }
}

/// Read-only view of the table rows significant for one outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignificantSubset {
    pub outcome: Outcome,
    pub rows: Vec<usize>,
}

impl SignificantSubset {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Taxon names in table order
    #[must_use]
    pub fn taxa<'a>(&self, table: &'a CorrelationTable) -> Vec<&'a str> {
        self.rows
            .iter()
            .filter_map(|&i| table.records.get(i).map(|r| r.taxon.as_str()))
            .collect()
    }
}

// ============================================================================
// Run Result Types
// ============================================================================

/// Everything the reporter needs after computation
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Samples remaining after preprocessing
    pub n_samples: usize,
    pub n_features: usize,
    pub taxa: TaxonColumns,
    pub table: CorrelationTable,
    pub significant_weight: SignificantSubset,
    pub significant_height: SignificantSubset,
    pub missing_columns: Vec<String>,
    pub column_stats: Vec<ColumnStats>,
    pub undefined_count: usize,
}

/// Outcome of persisting the run's artifacts
#[derive(Debug, Default)]
pub struct ReportOutcome {
    pub written: Vec<PathBuf>,
    pub plot: Option<PathBuf>,
    pub failures: Vec<GrowthError>,
}

impl ReportOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
