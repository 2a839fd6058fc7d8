use crate::structs::{CsvData, GrowthError, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

impl CsvData {
    /// Parse a CSV or TSV file
    ///
    /// Short records are padded with empty cells; records longer than the
    /// header are rejected.
    ///
    /// # Errors
    /// Returns `DataAccess` if the file cannot be opened and `Format` if the
    /// content is not a well-formed table
    pub fn from_file(path: &Path, is_tsv: bool) -> Result<Self> {
        let file = File::open(path).map_err(|source| GrowthError::DataAccess {
            path: path.to_path_buf(),
            source,
        })?;
        let delimiter = if is_tsv { b'\t' } else { b',' };

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| format_error(&e))?
            .iter()
            .map(|s| s.trim().to_string())
            .collect();

        if headers.iter().all(String::is_empty) {
            return Err(GrowthError::Format(format!(
                "{} has no header row",
                path.display()
            )));
        }

        let width = headers.len();
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| format_error(&e))?;
            if record.len() > width {
                let line = record.position().map_or(0, csv::Position::line);
                return Err(GrowthError::Format(format!(
                    "line {line}: expected {width} fields, saw {}",
                    record.len()
                )));
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Get number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.headers.len()
    }

    /// Get a column as a vector of strings
    #[must_use]
    pub fn column(&self, index: usize) -> Option<Vec<&str>> {
        if index >= self.headers.len() {
            return None;
        }
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).map_or("", String::as_str))
                .collect(),
        )
    }
}

fn format_error(err: &csv::Error) -> GrowthError {
    GrowthError::Format(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(content.as_bytes()).expect("write content");
        file
    }

    #[test]
    fn test_parse_csv() {
        let csv_content = "sample,weight_z_score,height_z_score\ns1,0.5,1.0\ns2,-0.2,0.3\ns3,1.1,-0.4";
        let file = create_test_csv(csv_content);

        let data = CsvData::from_file(file.path(), false).expect("parse");

        assert_eq!(data.headers, vec!["sample", "weight_z_score", "height_z_score"]);
        assert_eq!(data.row_count(), 3);
        assert_eq!(data.col_count(), 3);
        assert_eq!(data.column(2).expect("column"), vec!["1.0", "0.3", "-0.4"]);
    }

    #[test]
    fn test_parse_tsv() {
        let file = create_test_csv("a\tb\n1\t2\n3\t4\n");

        let data = CsvData::from_file(file.path(), true).expect("parse");

        assert_eq!(data.headers, vec!["a", "b"]);
        assert_eq!(data.column(1).expect("column"), vec!["2", "4"]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let file = create_test_csv("a,b,c\n1,2\n4,5,6\n");

        let data = CsvData::from_file(file.path(), false).expect("parse");

        assert_eq!(data.rows[0], vec!["1", "2", ""]);
        assert_eq!(data.column(2).expect("column"), vec!["", "6"]);
    }

    #[test]
    fn test_long_row_is_format_error() {
        let file = create_test_csv("a,b\n1,2\n3,4,5\n");

        let err = CsvData::from_file(file.path(), false).expect_err("ragged row");

        assert!(matches!(err, GrowthError::Format(_)));
    }

    #[test]
    fn test_missing_file_is_data_access_error() {
        let dir = tempfile::TempDir::new().expect("create temp dir");
        let missing = dir.path().join("nope.csv");

        let err = CsvData::from_file(&missing, false).expect_err("missing file");

        assert!(matches!(err, GrowthError::DataAccess { .. }));
    }

    #[test]
    fn test_empty_file_is_format_error() {
        let file = create_test_csv("");

        let err = CsvData::from_file(file.path(), false).expect_err("empty file");

        assert!(matches!(err, GrowthError::Format(_)));
    }
}
