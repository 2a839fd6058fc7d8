//! Column typing, numeric coercion, and outcome-based row filtering

use crate::structs::{
    Column, ColumnValues, CsvData, Dataset, GrowthError, Result, TaxonColumns, HEIGHT_COLUMN,
    WEIGHT_COLUMN,
};

/// Tokens read as a missing value rather than data
const MISSING_TOKENS: [&str; 13] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

fn is_missing(token: &str) -> bool {
    MISSING_TOKENS.contains(&token)
}

/// Parse a cell, mapping missing and non-numeric tokens to `None`
fn coerce_numeric(token: &str) -> Option<f64> {
    let token = token.trim();
    if is_missing(token) {
        return None;
    }
    token.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// A column is numeric if it is entirely missing or at least half of its
/// present tokens parse as numbers
#[allow(clippy::cast_precision_loss)]
fn is_numeric_column(cells: &[&str]) -> bool {
    let present: Vec<&str> = cells
        .iter()
        .map(|s| s.trim())
        .filter(|s| !is_missing(s))
        .collect();
    if present.is_empty() {
        return true;
    }
    let numeric_count = present
        .iter()
        .filter(|s| s.parse::<f64>().is_ok())
        .count();
    numeric_count as f64 / present.len() as f64 >= 0.5
}

impl Dataset {
    /// Type every column of the raw table, coercing unparseable cells in
    /// numeric columns to missing
    #[must_use]
    pub fn from_csv(csv: &CsvData) -> Self {
        let columns = csv
            .headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let cells = csv.column(i).unwrap_or_default();
                let values = if is_numeric_column(&cells) {
                    ColumnValues::Numeric(cells.iter().map(|s| coerce_numeric(s)).collect())
                } else {
                    ColumnValues::Text(
                        cells
                            .iter()
                            .map(|s| (!is_missing(s.trim())).then(|| (*s).to_string()))
                            .collect(),
                    )
                };
                Column {
                    name: name.clone(),
                    values,
                }
            })
            .collect();

        Self {
            columns,
            n_rows: csv.row_count(),
        }
    }

    /// Get number of samples (rows)
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Get number of features (columns)
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Values of a numeric column; `None` if absent or text-typed
    #[must_use]
    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        self.column_index(name)
            .and_then(|i| self.numeric_at(i))
    }

    #[must_use]
    pub fn numeric_at(&self, index: usize) -> Option<&[Option<f64>]> {
        match self.columns.get(index).map(|c| &c.values) {
            Some(ColumnValues::Numeric(values)) => Some(values),
            _ => None,
        }
    }

    /// Names from `required` that are not columns of this dataset
    #[must_use]
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.has_column(name))
            .map(|name| (*name).to_string())
            .collect()
    }

    /// Return a copy keeping only rows with both growth z-scores present
    ///
    /// Outcome columns absent from the dataset do not filter anything.
    #[must_use]
    pub fn drop_missing_outcomes(&self) -> Self {
        let outcome_indices: Vec<usize> = [WEIGHT_COLUMN, HEIGHT_COLUMN]
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();

        let keep: Vec<bool> = (0..self.n_rows)
            .map(|row| {
                outcome_indices
                    .iter()
                    .all(|&col| self.is_present(col, row))
            })
            .collect();

        self.retain_rows(&keep)
    }

    fn is_present(&self, col: usize, row: usize) -> bool {
        match &self.columns[col].values {
            ColumnValues::Numeric(v) => v.get(row).is_some_and(Option::is_some),
            ColumnValues::Text(v) => v.get(row).is_some_and(Option::is_some),
        }
    }

    fn retain_rows(&self, keep: &[bool]) -> Self {
        fn filter<T: Clone>(values: &[T], keep: &[bool]) -> Vec<T> {
            values
                .iter()
                .zip(keep)
                .filter(|(_, &k)| k)
                .map(|(v, _)| v.clone())
                .collect()
        }

        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: match &c.values {
                    ColumnValues::Numeric(v) => ColumnValues::Numeric(filter(v, keep)),
                    ColumnValues::Text(v) => ColumnValues::Text(filter(v, keep)),
                },
            })
            .collect();

        Self {
            columns,
            n_rows: keep.iter().filter(|&&k| k).count(),
        }
    }

    /// Discover the columns whose names start with `prefix`
    ///
    /// # Errors
    /// Returns `NoTaxa` if nothing matches and `require_nonempty` is set
    pub fn taxon_columns(&self, prefix: &str, require_nonempty: bool) -> Result<TaxonColumns> {
        let (indices, names): (Vec<usize>, Vec<String>) = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.name.starts_with(prefix))
            .map(|(i, c)| (i, c.name.clone()))
            .unzip();

        if names.is_empty() {
            if require_nonempty {
                return Err(GrowthError::NoTaxa {
                    prefix: prefix.to_string(),
                });
            }
            log::warn!("No columns start with '{prefix}'; correlation table will be empty");
        }

        Ok(TaxonColumns { names, indices })
    }
}
