// src/parse/record.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::value::{infer_value, Value};

/// One data row, keyed by header name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Pair `cells` positionally with `columns`, inferring each value.
    /// Caller guarantees equal lengths.
    pub(crate) fn from_cells<'a>(
        columns: &[String],
        cells: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let fields = columns
            .iter()
            .cloned()
            .zip(cells.into_iter().map(infer_value))
            .collect();
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_number)
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_text)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Column names, alphabetical. Use `Dataset::columns` for header order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_respect_type() {
        let cols = vec!["name".to_string(), "x".to_string()];
        let rec = Record::from_cells(&cols, ["USA", " 0.7 "]);
        assert_eq!(rec.len(), 2);
        assert_eq!(rec.text("name"), Some("USA"));
        assert_eq!(rec.number("name"), None);
        assert_eq!(rec.number("x"), Some(0.7));
        assert_eq!(rec.text("x"), None);
        assert!(rec.get("y").is_none());
    }
}
