pub mod chart;
pub mod config;
pub mod export;
pub mod parse;

pub use parse::{numeric_columns, parse, Dataset, Record, Value};
