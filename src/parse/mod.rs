// src/parse/mod.rs
pub mod record;
pub mod value;

pub use record::Record;
pub use value::{infer_value, Value};

use anyhow::{bail, Result};
use csv::{ReaderBuilder, StringRecord, Terminator};
use serde::Serialize;
use tracing::{debug, trace, warn};

/// A data row dropped because its field count did not match the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based line in the input text.
    pub line: u64,
    pub expected: usize,
    pub found: usize,
}

/// Result of one `parse` call. Immutable once built.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Dataset {
    /// Trimmed header names, left to right.
    columns: Vec<String>,
    records: Vec<Record>,
    skipped: Vec<SkippedRow>,
}

/// Parse comma-separated `text` whose first non-blank line is the header.
///
/// - Lines that are blank after trimming are dropped.
/// - No quoting: `"` is an ordinary character and a `,` always splits.
/// - Every cell is trimmed and typed on its own (see [`infer_value`]).
/// - Rows whose field count differs from the header are skipped and
///   reported through [`Dataset::skipped`]; parsing never fails.
#[tracing::instrument(level = "debug", skip(text), fields(bytes = text.len()))]
pub fn parse(text: &str) -> Dataset {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(text.as_bytes());

    let mut columns: Option<Vec<String>> = None;
    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                // only reachable on a split inside a multi-byte char, which
                // a comma/newline split cannot produce; keep going regardless
                warn!(record = idx, error = %e, "unreadable row; skipping");
                continue;
            }
        };
        if is_blank(&row) {
            trace!(record = idx, "blank row");
            continue;
        }

        let Some(cols) = columns.as_ref() else {
            let header: Vec<String> = row.iter().map(|s| s.trim().to_string()).collect();
            debug!(columns = ?header, "header");
            columns = Some(header);
            continue;
        };

        if row.len() != cols.len() {
            let line = row
                .position()
                .map(|p| line_of(text, p.byte()))
                .unwrap_or(idx as u64 + 1);
            warn!(
                line,
                expected = cols.len(),
                found = row.len(),
                "skipping malformed row"
            );
            skipped.push(SkippedRow {
                line,
                expected: cols.len(),
                found: row.len(),
            });
            continue;
        }

        records.push(Record::from_cells(cols, row.iter()));
    }

    let columns = columns.unwrap_or_default();
    debug!(
        columns = columns.len(),
        records = records.len(),
        skipped = skipped.len(),
        "parsed"
    );
    Dataset {
        columns,
        records,
        skipped,
    }
}

/// Column names (header order) whose value is a number in the first record.
pub fn numeric_columns(dataset: &Dataset) -> Vec<String> {
    dataset.numeric_columns()
}

/// 1-based line holding byte `offset`. The reader's own line counter
/// ignores the blank lines it skips, so count newlines directly.
fn line_of(text: &str, offset: u64) -> u64 {
    let end = (offset as usize).min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() as u64 + 1
}

fn is_blank(row: &StringRecord) -> bool {
    row.len() <= 1 && row.get(0).map_or(true, |s| s.trim().is_empty())
}

impl Dataset {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn skipped(&self) -> &[SkippedRow] {
        &self.skipped
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped.len()
    }

    /// Only the first record is inspected, so a column that turns to text
    /// further down is still reported. See `numeric_columns_strict`.
    pub fn numeric_columns(&self) -> Vec<String> {
        let Some(first) = self.records.first() else {
            return Vec::new();
        };
        self.columns
            .iter()
            .filter(|c| first.get(c).is_some_and(Value::is_number))
            .cloned()
            .collect()
    }

    /// Columns holding a number in every record. Empty for an empty dataset.
    pub fn numeric_columns_strict(&self) -> Vec<String> {
        if self.records.is_empty() {
            return Vec::new();
        }
        self.columns
            .iter()
            .filter(|c| self.records.iter().all(|r| r.number(c).is_some()))
            .cloned()
            .collect()
    }

    /// Fail on the first named column that is absent from the header or
    /// holds a non-number in any record.
    pub fn require_numeric<S: AsRef<str>>(&self, required: &[S]) -> Result<()> {
        for col in required.iter().map(AsRef::as_ref) {
            if !self.columns.iter().any(|c| c == col) {
                bail!("required numeric column `{}` is missing from the header", col);
            }
            for (i, rec) in self.records.iter().enumerate() {
                if let Some(Value::Text(s)) = rec.get(col) {
                    bail!(
                        "column `{}` must be numeric but record {} holds {:?}",
                        col,
                        i,
                        s
                    );
                }
            }
        }
        Ok(())
    }

    /// (min, max) over the numeric values of `column`.
    pub fn column_extent(&self, column: &str) -> Option<(f64, f64)> {
        self.records
            .iter()
            .filter_map(|r| r.number(column))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,civcompass::parse=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn rec(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn parses_countries() {
        init_test_logging();
        let ds = parse("name,x,y\nSingapore,0.7,0.8\nChina,0.4,0.7\n");

        assert_eq!(ds.columns(), ["name", "x", "y"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.skipped_rows(), 0);
        assert_eq!(
            ds.records()[0],
            rec(&[
                ("name", Value::Text("Singapore".into())),
                ("x", Value::Number(0.7)),
                ("y", Value::Number(0.8)),
            ])
        );
        assert_eq!(
            ds.records()[1],
            rec(&[
                ("name", Value::Text("China".into())),
                ("x", Value::Number(0.4)),
                ("y", Value::Number(0.7)),
            ])
        );
    }

    #[test]
    fn short_row_is_skipped_and_counted() {
        init_test_logging();
        let ds = parse("name,x\nA,1\nB\n");

        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].text("name"), Some("A"));
        assert_eq!(ds.records()[0].number("x"), Some(1.0));
        assert_eq!(ds.skipped_rows(), 1);
        assert_eq!(ds.skipped()[0].expected, 2);
        assert_eq!(ds.skipped()[0].found, 1);
    }

    #[test]
    fn long_row_is_skipped_too() {
        let ds = parse("name,x\nA,1,\nB,2\n");
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].text("name"), Some("B"));
        assert_eq!(ds.skipped()[0].found, 3);
    }

    #[test]
    fn empty_input_is_empty_dataset() {
        for input in ["", "   ", "\n\n", " \r\n \n"] {
            let ds = parse(input);
            assert!(ds.is_empty());
            assert!(ds.columns().is_empty());
            assert_eq!(ds.skipped_rows(), 0);
            assert!(ds.numeric_columns().is_empty());
        }
    }

    #[test]
    fn header_only() {
        let ds = parse("name,x,y\n");
        assert_eq!(ds.columns(), ["name", "x", "y"]);
        assert!(ds.is_empty());
        assert!(ds.numeric_columns().is_empty());
    }

    #[test]
    fn blank_lines_anywhere_are_dropped() {
        let ds = parse("\n  \nname , x\n\nA, 1\n   \nB,2\n\n\n");
        assert_eq!(ds.columns(), ["name", "x"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.skipped_rows(), 0);
    }

    #[test]
    fn crlf_and_no_trailing_newline() {
        let ds = parse("name,x\r\nA,1\r\nB,2");
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[1].text("name"), Some("B"));
        assert_eq!(ds.records()[1].number("x"), Some(2.0));
    }

    #[test]
    fn lone_carriage_return_does_not_split() {
        let ds = parse("name,x\rA,1\n");
        assert_eq!(ds.columns(), ["name", "x\rA", "1"]);
        assert!(ds.is_empty());
        assert_eq!(ds.skipped_rows(), 0);
    }

    #[test]
    fn skipped_line_counts_blank_lines() {
        let ds = parse("name,x\n\nA,1\n\nB\n");
        assert_eq!(ds.len(), 1);
        assert_eq!(
            ds.skipped(),
            [SkippedRow {
                line: 5,
                expected: 2,
                found: 1
            }]
        );

        let ds = parse("\r\n  \r\nname,x\r\nA,1,2\r\n");
        assert_eq!(ds.skipped()[0].line, 4);
    }

    #[test]
    fn empty_cells_are_empty_text() {
        let ds = parse("name,x\n,\n");
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].text("name"), Some(""));
        assert_eq!(ds.records()[0].text("x"), Some(""));
    }

    #[test]
    fn quotes_are_not_special() {
        let ds = parse("name,x\n\"Korea, South\",1\n\"Chile\",2\n");
        // the embedded comma splits, so the first row has three fields
        assert_eq!(ds.skipped_rows(), 1);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].text("name"), Some("\"Chile\""));
    }

    #[test]
    fn every_record_has_every_header_key() {
        let ds = parse(" a ,b,c\n1,x,\n2,y,3\n4,z,5\n");
        for r in ds.records() {
            assert_eq!(r.len(), 3);
            assert_eq!(r.keys().collect::<Vec<_>>(), ["a", "b", "c"]);
        }
    }

    #[test]
    fn parse_is_idempotent() {
        let text = "name,x,y,z\nUSA,0.7,0.4,0.9\nIndia,N/A,0.2,-1e-2\nPeru,0.1\n";
        assert_eq!(parse(text), parse(text));
    }

    #[test]
    fn numeric_columns_from_first_record() {
        let ds = parse("name,x,y,z\nUSA,0.7,0.4,0.9\nChina,N/A,0.5,0.1\n");
        assert_eq!(numeric_columns(&ds), ["x", "y", "z"]);
        assert_eq!(ds.numeric_columns_strict(), ["y", "z"]);
    }

    #[test]
    fn numeric_columns_follow_header_order() {
        let ds = parse("z,label,a\n1,foo,2\n");
        assert_eq!(ds.numeric_columns(), ["z", "a"]);
    }

    #[test]
    fn require_numeric_reports_offender() {
        let ds = parse("name,x,y\nA,1,2\nB,oops,3\n");
        assert!(ds.require_numeric(&["y"]).is_ok());

        let err = ds.require_numeric(&["x", "y"]).unwrap_err().to_string();
        assert!(err.contains("`x`"), "{err}");
        assert!(err.contains("oops"), "{err}");

        let err = ds.require_numeric(&["z"]).unwrap_err().to_string();
        assert!(err.contains("missing"), "{err}");
    }

    #[test]
    fn extent_ignores_text() -> Result<()> {
        let ds = parse("name,x\nA,3\nB,-1.5\nC,n/a\nD,2\n");
        assert_eq!(ds.column_extent("x"), Some((-1.5, 3.0)));
        assert_eq!(ds.column_extent("name"), None);
        assert_eq!(ds.column_extent("nope"), None);
        Ok(())
    }

    #[test]
    fn dataset_serializes_to_json() -> Result<()> {
        let ds = parse("name,x\nA,1.5\n");
        let v = serde_json::to_value(&ds)?;
        assert_eq!(v["columns"], serde_json::json!(["name", "x"]));
        assert_eq!(v["records"][0]["x"], serde_json::json!(1.5));
        assert_eq!(v["records"][0]["name"], serde_json::json!("A"));
        Ok(())
    }
}
