use anyhow::{Context, Result};
use civcompass::{
    chart::{scatter_points, Axis, AxisSelection, ControlPanel, Interaction, MarginTable},
    config::Config,
    export, parse, Dataset,
};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Load CSV datasets for the Civilisation Compass and electoral margin charts"
)]
struct Args {
    /// YAML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Columns, numeric columns, default axes and extents
    Inspect {
        csv: PathBuf,
        /// Columns that must be numeric in every row (overrides the config)
        #[arg(long, value_delimiter = ',')]
        require: Option<Vec<String>>,
    },
    /// Scatter points for the chosen axes
    Points {
        csv: PathBuf,
        #[arg(long)]
        x: Option<String>,
        #[arg(long)]
        y: Option<String>,
        #[arg(long)]
        z: Option<String>,
    },
    /// States sorted by latest margin, with lean and line style
    Margins {
        csv: PathBuf,
        /// Highlight this state as if hovered
        #[arg(long)]
        active: Option<String>,
        /// Open the details panel for this state
        #[arg(long)]
        select: Option<String>,
    },
    /// Write the parsed dataset to Parquet
    Export { csv: PathBuf, out: PathBuf },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = Config::load(args.config.as_deref())?;

    // ─── init logging ────────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_filter));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Inspect { csv, require } => {
            let ds = load(&csv)?;
            let required = require.unwrap_or_else(|| cfg.require_numeric.clone());
            if !required.is_empty() {
                ds.require_numeric(&required)
                    .with_context(|| format!("validating {}", csv.display()))?;
            }
            let numeric = ds.numeric_columns();
            let extents: BTreeMap<&str, (f64, f64)> = numeric
                .iter()
                .filter_map(|c| Some((c.as_str(), ds.column_extent(c)?)))
                .collect();
            let report = json!({
                "columns": ds.columns(),
                "records": ds.len(),
                "skipped": ds.skipped(),
                "numeric_columns": numeric,
                "axes": AxisSelection::for_dataset(&ds),
                "extents": extents,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::Points { csv, x, y, z } => {
            let ds = load(&csv)?;
            let mut sel = AxisSelection::for_dataset(&ds);
            for (axis, col) in [(Axis::X, x), (Axis::Y, y), (Axis::Z, z)] {
                if let Some(col) = col {
                    sel.set(axis, Some(col.as_str()))?;
                }
            }
            let points = scatter_points(&ds, &sel);
            info!(points = points.len(), "scatter ready");
            println!("{}", serde_json::to_string_pretty(&points)?);
        }

        Command::Margins {
            csv,
            active,
            select,
        } => {
            let ds = load(&csv)?;
            let panel = ControlPanel::from_config(&cfg)?;
            let palette = panel.color_scheme.palette();

            let mut ui = Interaction::default();
            if let Some(s) = &active {
                ui.enter(s);
            }
            if let Some(s) = &select {
                ui.click(s);
            }

            let mut table = MarginTable::from_dataset(&ds);
            table.sort_by_latest();
            let states: Vec<_> = table
                .series
                .iter()
                .map(|s| {
                    json!({
                        "state": s.state,
                        "lean": s.lean(),
                        "label": s.label(),
                        "style": s.line_style(ui.active(), &palette),
                    })
                })
                .collect();

            let details = ui.displayed().map(|state| {
                let lines = table.details(state);
                if lines.is_none() {
                    warn!(state, "no such state in the table");
                }
                json!({ "state": state, "margins": lines })
            });

            let report = json!({
                "years": table.years,
                "panel": panel,
                "states": states,
                "details": details,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::Export { csv, out } => {
            let ds = load(&csv)?;
            export::write_parquet(&ds, &out)?;
            println!("wrote {} rows to {}", ds.len(), out.display());
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<Dataset> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let ds = parse(&text);
    if ds.skipped_rows() > 0 {
        warn!(
            path = %path.display(),
            skipped = ds.skipped_rows(),
            "some rows did not match the header"
        );
    }
    info!(path = %path.display(), records = ds.len(), columns = ds.columns().len(), "loaded");
    Ok(ds)
}
