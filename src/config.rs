// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::info;

use crate::chart::ColorScheme;

/// Settings read from a YAML file. Every key is optional.
///
/// ```yaml
/// log_filter: "info,civcompass=debug"
/// color_scheme: pastel
/// background: "#4a4a4a"
/// rotation_speed: 0.001
/// show_grid_lines: false
/// require_numeric: [x, y, z]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub color_scheme: ColorScheme,
    pub background: String,
    pub rotation_speed: f64,
    pub show_grid_lines: bool,
    pub show_edges: bool,
    pub show_nodes: bool,
    /// Columns `inspect` checks are numeric in every row.
    pub require_numeric: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "info".into(),
            color_scheme: ColorScheme::Default,
            background: "#1a1a1a".into(),
            rotation_speed: 0.0002,
            show_grid_lines: true,
            show_edges: true,
            show_nodes: true,
            require_numeric: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing config YAML")
    }

    /// Read `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg = Self::from_yaml(&text).with_context(|| format!("in {}", path.display()))?;
        info!(path = %path.display(), "loaded config");
        Ok(cfg)
    }
}
