// src/parse/value.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell, after type inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Number(_) => None,
            Value::Text(s) => Some(s),
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Trim the raw cell and decide its type on its own.
///
/// Anything `f64::from_str` accepts and that is finite becomes a number;
/// `"inf"`/`"NaN"` parse but stay text.
pub fn infer_value(raw: &str) -> Value {
    let v = raw.trim();
    match v.parse::<f64>() {
        Ok(n) if n.is_finite() => Value::Number(n),
        _ => Value::Text(v.to_string()),
    }
}
