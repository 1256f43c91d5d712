// src/chart/margins.rs

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

use crate::parse::{Dataset, Value};

/// One state's margin per election year. Positive favours the Democrat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginSeries {
    pub state: String,
    pub margins: Vec<f64>,
}

/// Year columns plus one series per state, in input order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MarginTable {
    pub years: Vec<String>,
    pub series: Vec<MarginSeries>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lean {
    Democrat,
    Republican,
    Swing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Default,
    Pastel,
    Monochrome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub democrat: &'static str,
    pub republican: &'static str,
    pub swing: &'static str,
    pub grid: &'static str,
    pub axis: &'static str,
    pub highlight: &'static str,
    pub connector: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub width: f32,
}

impl ColorScheme {
    pub fn palette(self) -> Palette {
        match self {
            ColorScheme::Default => Palette {
                democrat: "#3498db",
                republican: "#e74c3c",
                swing: "#2ecc71",
                grid: "rgba(255, 255, 255, 0.3)",
                axis: "white",
                highlight: "#ffd700",
                connector: "#f5f5dc",
            },
            ColorScheme::Pastel => Palette {
                democrat: "#90caf9",
                republican: "#ef9a9a",
                swing: "#a5d6a7",
                grid: "rgba(230, 230, 250, 0.3)",
                axis: "#E6E6FA",
                highlight: "#fffacd",
                connector: "#f5f5dc",
            },
            ColorScheme::Monochrome => Palette {
                democrat: "#808080",
                republican: "#404040",
                swing: "#606060",
                grid: "rgba(255, 255, 255, 0.2)",
                axis: "white",
                highlight: "#ffffff",
                connector: "#f5f5dc",
            },
        }
    }
}

impl Palette {
    pub fn lean_color(&self, lean: Lean) -> &'static str {
        match lean {
            Lean::Democrat => self.democrat,
            Lean::Republican => self.republican,
            Lean::Swing => self.swing,
        }
    }
}

impl MarginTable {
    /// Label column = first column that is not numeric in the first record;
    /// year columns = the numeric ones. Rows that do not fit are dropped.
    #[tracing::instrument(level = "debug", skip(dataset), fields(records = dataset.len()))]
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let years = dataset.numeric_columns();
        let Some(first) = dataset.records().first() else {
            return Self::default();
        };
        let label_col = dataset
            .columns()
            .iter()
            .find(|c| !first.get(c).is_some_and(Value::is_number));
        let Some(label_col) = label_col else {
            warn!("no state column; every column is numeric");
            return Self {
                years,
                series: Vec::new(),
            };
        };

        let mut series = Vec::with_capacity(dataset.len());
        for (i, rec) in dataset.records().iter().enumerate() {
            let Some(state) = rec.text(label_col) else {
                warn!(record = i, column = %label_col, "state name is not text; skipping");
                continue;
            };
            let margins: Option<Vec<f64>> = years.iter().map(|y| rec.number(y)).collect();
            match margins {
                Some(margins) => series.push(MarginSeries {
                    state: state.to_string(),
                    margins,
                }),
                None => warn!(record = i, state, "non-numeric margin; skipping"),
            }
        }
        debug!(states = series.len(), years = years.len(), "margin table");

        Self { years, series }
    }

    /// Highest latest margin first. States without margins go last.
    pub fn sort_by_latest(&mut self) {
        self.series
            .sort_by(|a, b| match (a.latest(), b.latest()) {
                (Some(x), Some(y)) => y.total_cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
    }

    pub fn get(&self, state: &str) -> Option<&MarginSeries> {
        self.series.iter().find(|s| s.state == state)
    }

    /// `"<year>: <margin>%"` lines for the details panel.
    pub fn details(&self, state: &str) -> Option<Vec<String>> {
        let s = self.get(state)?;
        Some(
            self.years
                .iter()
                .zip(&s.margins)
                .map(|(year, m)| format!("{}: {:.1}%", year, m))
                .collect(),
        )
    }
}

impl MarginSeries {
    pub fn latest(&self) -> Option<f64> {
        self.margins.last().copied()
    }

    /// Swing if the sign ever flips, otherwise decided by the first year.
    /// A first margin of exactly zero counts as Republican.
    pub fn lean(&self) -> Lean {
        let any_dem = self.margins.iter().any(|&m| m >= 0.0);
        let any_rep = self.margins.iter().any(|&m| m < 0.0);
        if any_dem && any_rep {
            Lean::Swing
        } else if self.margins.first().is_some_and(|&m| m > 0.0) {
            Lean::Democrat
        } else {
            Lean::Republican
        }
    }

    pub fn label(&self) -> String {
        match self.latest() {
            Some(m) => format!("{} ({:.1}%)", self.state, m),
            None => self.state.clone(),
        }
    }

    pub fn line_style(&self, active: Option<&str>, palette: &Palette) -> LineStyle {
        if active == Some(self.state.as_str()) {
            LineStyle {
                color: palette.highlight,
                width: 4.0,
            }
        } else {
            LineStyle {
                color: palette.lean_color(self.lean()),
                width: 2.0,
            }
        }
    }
}
