//! Table loading and default-value normalization
//!
//! Reads a report file into `Row` records. Two container formats are
//! accepted, selected by filename extension: `.csv` goes through the `csv`
//! crate, anything else is treated as an xlsx workbook and read with
//! `calamine`. Header names are matched case-insensitively.
//!
//! Default substitution for absent fields happens here, once, table-wide,
//! before any grouping. No other validation is performed: scores and case
//! ids stay as raw text and are parsed during aggregation.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, Xlsx};

use crate::error::{Error, Result};

/// Default for an absent `CITATION_RULE` field
pub const DEFAULT_CITATION_RULE: &str = "no specific rule";
/// Default for an absent `QUESTION` field
pub const DEFAULT_QUESTION: &str = "question text not found";
/// Default for an absent `GROUND_TRUTH` field
pub const DEFAULT_GROUND_TRUTH: &str = "no reference content";
/// Default for an absent `AUDIT_REASONING` field
pub const DEFAULT_AUDIT_REASONING: &str = "pending";
/// Default for an absent `MODEL_OUTPUT` field
pub const DEFAULT_MODEL_OUTPUT: &str = "[model output missing]";
/// Default for an absent `SOURCE_FILE` field
pub const DEFAULT_SOURCE_FILE: &str = "unknown source";

/// Columns that must be present in every input table
pub const REQUIRED_COLUMNS: [&str; 4] = ["CASE_ID", "SYSTEM", "TOTAL_SCORE", "S4_FATAL"];

/// One normalized source record
///
/// `case_id` and `total_score` are kept as raw text; the aggregator parses
/// them and a parse failure aborts the whole load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Case identifier, integer-coercible
    pub case_id: String,
    /// System-under-test identifier
    pub system: String,
    /// Question text shared by all systems for this case
    pub question: String,
    /// Citation rule used for judging
    pub citation_rule: String,
    /// Ground-truth answer
    pub ground_truth: String,
    /// Pre-computed score, numeric-coercible
    pub total_score: String,
    /// Fatal flag, compared case-insensitively to "YES"
    pub fatal_flag: String,
    /// Reason for the fatal flag, empty when not fatal
    pub fatal_reason: String,
    /// Raw model output
    pub model_output: String,
    /// Auditor's reasoning for the score
    pub audit_reasoning: String,
    /// File the case was sourced from
    pub source_file: String,
}

/// Container format of an input table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Delimited text, parsed with the `csv` crate
    Csv,
    /// Spreadsheet binary, parsed with `calamine`
    Xlsx,
}

impl TableFormat {
    /// Pick the parser from the filename extension: `.csv` is delimited
    /// text, everything else goes to the spreadsheet parser.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if is_csv { Self::Csv } else { Self::Xlsx }
    }
}

/// Raw cell grid before normalization. `None` cells are absent values.
struct RawTable {
    headers: Vec<String>,
    records: Vec<Vec<Option<String>>>,
}

/// Case-insensitive header lookup
struct HeaderIndex {
    lowered: Vec<String>,
}

impl HeaderIndex {
    fn new(headers: &[String]) -> Self {
        Self {
            lowered: headers.iter().map(|h| h.trim().to_lowercase()).collect(),
        }
    }

    fn get(&self, name: &str) -> Option<usize> {
        let wanted = name.to_lowercase();
        self.lowered.iter().position(|h| *h == wanted)
    }
}

/// Load rows from a file on disk.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be read, `Error::Load` if the
/// container cannot be parsed, or `Error::Schema` if a required column is
/// absent.
pub fn load_rows(path: &Path) -> Result<Vec<Row>> {
    let bytes = std::fs::read(path)?;
    load_rows_from_bytes(&bytes, TableFormat::from_path(path))
}

/// Load rows from in-memory file content.
///
/// # Errors
///
/// Returns `Error::Load` if the container cannot be parsed, or
/// `Error::Schema` if a required column is absent.
pub fn load_rows_from_bytes(bytes: &[u8], format: TableFormat) -> Result<Vec<Row>> {
    let table = match format {
        TableFormat::Csv => read_csv(bytes)?,
        TableFormat::Xlsx => read_xlsx(bytes)?,
    };
    rows_from_table(&table)
}

fn read_csv(bytes: &[u8]) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::Load(format!("CSV header error: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| Error::Load(format!("CSV parse error at row {idx}: {e}")))?;
        records.push(record.iter().map(csv_cell).collect());
    }

    Ok(RawTable { headers, records })
}

fn csv_cell(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

fn read_xlsx(bytes: &[u8]) -> Result<RawTable> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook =
        Xlsx::new(cursor).map_err(|e| Error::Load(format!("Failed to open workbook: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::Load("Workbook has no worksheets".to_string()))?
        .map_err(|e| Error::Load(format!("Failed to read worksheet: {e}")))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| Error::Load("Worksheet is empty".to_string()))?
        .iter()
        .map(|cell| cell_value(cell).unwrap_or_default())
        .collect();

    let records = rows
        .map(|cells| cells.iter().map(cell_value).collect())
        .collect();

    Ok(RawTable { headers, records })
}

/// Coerce a spreadsheet cell to text. Integral floats render without the
/// trailing `.0` so numeric CASE_ID columns round-trip as plain integers.
fn cell_value(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Data::Float(f) => Some(format_number(*f)),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Apply the schema check and table-wide default substitution.
fn rows_from_table(table: &RawTable) -> Result<Vec<Row>> {
    let index = HeaderIndex::new(&table.headers);

    for column in REQUIRED_COLUMNS {
        if index.get(column).is_none() {
            return Err(Error::Schema {
                column: column.to_string(),
            });
        }
    }

    let rows = table
        .records
        .iter()
        .map(|record| {
            let field = |name: &str, default: &str| -> String {
                index
                    .get(name)
                    .and_then(|i| record.get(i).cloned().flatten())
                    .unwrap_or_else(|| default.to_string())
            };

            Row {
                case_id: field("CASE_ID", ""),
                system: field("SYSTEM", ""),
                question: field("QUESTION", DEFAULT_QUESTION),
                citation_rule: field("CITATION_RULE", DEFAULT_CITATION_RULE),
                ground_truth: field("GROUND_TRUTH", DEFAULT_GROUND_TRUTH),
                total_score: field("TOTAL_SCORE", ""),
                fatal_flag: field("S4_FATAL", ""),
                fatal_reason: field("S4_REASON", ""),
                model_output: field("MODEL_OUTPUT", DEFAULT_MODEL_OUTPUT),
                audit_reasoning: field("AUDIT_REASONING", DEFAULT_AUDIT_REASONING),
                source_file: field("SOURCE_FILE", DEFAULT_SOURCE_FILE),
            }
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CSV: &str = "\
CASE_ID,SYSTEM,QUESTION,CITATION_RULE,GROUND_TRUTH,SOURCE_FILE,TOTAL_SCORE,S4_FATAL,S4_REASON,MODEL_OUTPUT,AUDIT_REASONING
1,alpha,What is 2+2?,rule A,4,q1.xlsx,95,NO,,The answer is 4,Correct and cited
1,beta,What is 2+2?,rule A,4,q1.xlsx,40,YES,hallucinated citation,The answer is 5,Wrong answer
2,alpha,Capital of France?,rule B,Paris,q2.xlsx,100,NO,,Paris,Exact match
";

    #[test]
    fn test_load_csv_rows() {
        let rows = load_rows_from_bytes(FULL_CSV.as_bytes(), TableFormat::Csv).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].case_id, "1");
        assert_eq!(rows[0].system, "alpha");
        assert_eq!(rows[0].total_score, "95");
        assert_eq!(rows[1].fatal_flag, "YES");
        assert_eq!(rows[1].fatal_reason, "hallucinated citation");
        assert_eq!(rows[2].ground_truth, "Paris");
    }

    #[test]
    fn test_empty_cells_get_defaults() {
        let csv = "\
CASE_ID,SYSTEM,QUESTION,TOTAL_SCORE,S4_FATAL,MODEL_OUTPUT
1,alpha,,80,NO,
";
        let rows = load_rows_from_bytes(csv.as_bytes(), TableFormat::Csv).unwrap();
        assert_eq!(rows[0].question, DEFAULT_QUESTION);
        assert_eq!(rows[0].model_output, DEFAULT_MODEL_OUTPUT);
    }

    #[test]
    fn test_absent_columns_get_defaults() {
        let csv = "CASE_ID,SYSTEM,TOTAL_SCORE,S4_FATAL\n1,alpha,80,NO\n";
        let rows = load_rows_from_bytes(csv.as_bytes(), TableFormat::Csv).unwrap();
        assert_eq!(rows[0].question, DEFAULT_QUESTION);
        assert_eq!(rows[0].citation_rule, DEFAULT_CITATION_RULE);
        assert_eq!(rows[0].ground_truth, DEFAULT_GROUND_TRUTH);
        assert_eq!(rows[0].audit_reasoning, DEFAULT_AUDIT_REASONING);
        assert_eq!(rows[0].model_output, DEFAULT_MODEL_OUTPUT);
        assert_eq!(rows[0].source_file, DEFAULT_SOURCE_FILE);
        assert_eq!(rows[0].fatal_reason, "");
    }

    #[test]
    fn test_missing_required_column_is_schema_error() {
        let csv = "CASE_ID,SYSTEM,TOTAL_SCORE\n1,alpha,80\n";
        let err = load_rows_from_bytes(csv.as_bytes(), TableFormat::Csv).unwrap_err();
        match err {
            Error::Schema { column } => assert_eq!(column, "S4_FATAL"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_headers_match_case_insensitively() {
        let csv = "case_id,System,total_Score,s4_fatal\n7,alpha,61.5,no\n";
        let rows = load_rows_from_bytes(csv.as_bytes(), TableFormat::Csv).unwrap();
        assert_eq!(rows[0].case_id, "7");
        assert_eq!(rows[0].total_score, "61.5");
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            TableFormat::from_path(Path::new("report.csv")),
            TableFormat::Csv
        );
        assert_eq!(
            TableFormat::from_path(Path::new("Report.CSV")),
            TableFormat::Csv
        );
        assert_eq!(
            TableFormat::from_path(Path::new("report.xlsx")),
            TableFormat::Xlsx
        );
        assert_eq!(
            TableFormat::from_path(Path::new("report")),
            TableFormat::Xlsx
        );
    }

    #[test]
    fn test_garbage_bytes_are_load_error() {
        let err = load_rows_from_bytes(b"not a zip archive", TableFormat::Xlsx).unwrap_err();
        assert!(matches!(err, Error::Load(_)));
    }

    #[test]
    fn test_cell_value_coercion() {
        assert_eq!(cell_value(&Data::Empty), None);
        assert_eq!(cell_value(&Data::String("  ".to_string())), None);
        assert_eq!(
            cell_value(&Data::String("alpha".to_string())),
            Some("alpha".to_string())
        );
        assert_eq!(cell_value(&Data::Float(7.0)), Some("7".to_string()));
        assert_eq!(cell_value(&Data::Float(61.5)), Some("61.5".to_string()));
        assert_eq!(cell_value(&Data::Int(42)), Some("42".to_string()));
        assert_eq!(cell_value(&Data::Bool(true)), Some("true".to_string()));
    }

    #[test]
    fn test_load_rows_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        std::fs::write(&path, FULL_CSV).unwrap();

        let rows = load_rows(&path).unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_load_rows_missing_file_is_io_error() {
        let err = load_rows(Path::new("/nonexistent/report.csv")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
