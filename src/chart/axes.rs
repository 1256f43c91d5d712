// src/chart/axes.rs

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::debug;

use crate::parse::{Dataset, Record, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Which numeric column drives each axis. `z` sizes the points.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AxisSelection {
    pub x: Option<String>,
    pub y: Option<String>,
    pub z: Option<String>,
    /// Columns the axes may be set to.
    choices: Vec<String>,
}

impl AxisSelection {
    /// The first three numeric columns, in header order, become x, y and z.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        Self::from_choices(dataset.numeric_columns())
    }

    pub fn from_choices(choices: Vec<String>) -> Self {
        let mut it = choices.iter().cloned();
        Self {
            x: it.next(),
            y: it.next(),
            z: it.next(),
            choices,
        }
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Point `axis` at `column`, or clear it with `None`.
    pub fn set(&mut self, axis: Axis, column: Option<&str>) -> Result<()> {
        if let Some(c) = column {
            if !self.choices.iter().any(|k| k == c) {
                bail!("`{}` is not a numeric column (choices: {:?})", c, self.choices);
            }
        }
        let slot = match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        };
        *slot = column.map(str::to_string);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
    /// `y` squashed towards the top so small values stay visible.
    pub compressed_y: f64,
    pub size: Option<f64>,
}

/// Fourth-root compression relative to `max`. Sign is preserved.
pub fn compress(y: f64, max: f64) -> f64 {
    if !(max > 0.0) {
        return y;
    }
    let ratio = y / max;
    ratio.signum() * ratio.abs().powf(0.25) * max
}

/// Build scatter points for `sel`. Records without a numeric x and y are left out.
pub fn scatter_points(dataset: &Dataset, sel: &AxisSelection) -> Vec<ScatterPoint> {
    let (Some(xk), Some(yk)) = (sel.x.as_deref(), sel.y.as_deref()) else {
        return Vec::new();
    };

    let raw: Vec<(&Record, f64, f64)> = dataset
        .records()
        .iter()
        .filter_map(|r| Some((r, r.number(xk)?, r.number(yk)?)))
        .collect();

    let max_y = raw
        .iter()
        .map(|&(_, _, y)| y)
        .fold(f64::NEG_INFINITY, f64::max);
    debug!(x = xk, y = yk, points = raw.len(), max_y, "scatter");

    raw.into_iter()
        .map(|(rec, x, y)| ScatterPoint {
            label: label_of(dataset, rec),
            x,
            y,
            compressed_y: compress(y, max_y),
            size: sel.z.as_deref().and_then(|z| rec.number(z)),
        })
        .collect()
}

/// First text field in header order.
fn label_of(dataset: &Dataset, rec: &Record) -> Option<String> {
    dataset.columns().iter().find_map(|c| match rec.get(c) {
        Some(Value::Text(s)) => Some(s.clone()),
        _ => None,
    })
}
