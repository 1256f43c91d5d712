// src/chart/view.rs

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::trace;

use super::margins::ColorScheme;
use crate::config::Config;

pub const MIN_ROTATION_SPEED: f64 = 0.0;
pub const MAX_ROTATION_SPEED: f64 = 0.01;

/// Backgrounds offered by the control panel.
pub const BACKGROUNDS: [&str; 3] = ["#1a1a1a", "#4a4a4a", "#5C544E"];

/// Hover and click state for the chart's labelled items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Interaction {
    active: Option<String>,
    selected: Option<String>,
}

impl Interaction {
    pub fn enter(&mut self, item: &str) {
        trace!(item, "enter");
        self.active = Some(item.to_string());
    }

    pub fn leave(&mut self) {
        self.active = None;
    }

    pub fn click(&mut self, item: &str) {
        trace!(item, "select");
        self.selected = Some(item.to_string());
    }

    pub fn close(&mut self) {
        self.selected = None;
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// What the details panel shows: a selection beats a hover.
    pub fn displayed(&self) -> Option<&str> {
        self.selected().or(self.active())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlPanel {
    pub open: bool,
    pub color_scheme: ColorScheme,
    background: String,
    rotation_speed: f64,
    pub show_grid_lines: bool,
    pub show_edges: bool,
    pub show_nodes: bool,
}

impl ControlPanel {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let mut panel = Self::unchecked(cfg);
        panel.set_background(&cfg.background)?;
        panel.set_rotation_speed(cfg.rotation_speed);
        Ok(panel)
    }

    fn unchecked(cfg: &Config) -> Self {
        Self {
            open: false,
            color_scheme: cfg.color_scheme,
            background: cfg.background.clone(),
            rotation_speed: cfg.rotation_speed,
            show_grid_lines: cfg.show_grid_lines,
            show_edges: cfg.show_edges,
            show_nodes: cfg.show_nodes,
        }
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    pub fn set_background(&mut self, color: &str) -> Result<()> {
        let Some(known) = BACKGROUNDS.iter().find(|b| b.eq_ignore_ascii_case(color)) else {
            bail!("unknown background `{}` (choices: {:?})", color, BACKGROUNDS);
        };
        self.background = known.to_string();
        Ok(())
    }

    pub fn rotation_speed(&self) -> f64 {
        self.rotation_speed
    }

    /// Clamped to the slider range; NaN resets to the minimum.
    pub fn set_rotation_speed(&mut self, speed: f64) {
        self.rotation_speed = if speed.is_nan() {
            MIN_ROTATION_SPEED
        } else {
            speed.clamp(MIN_ROTATION_SPEED, MAX_ROTATION_SPEED)
        };
    }
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::unchecked(&Config::default())
    }
}
