mod app;
mod renderer;

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use hcm_timeline_core::loader::load_dataset_json;
use hcm_timeline_core::model::iso_date;
use hcm_timeline_core::svg::render_svg;
use hcm_timeline_core::{
    Callbacks, DateRange, Granularity, RecordingSurface, TimelineConfig, TimelineDataset,
    TimelineView, time_periods,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "hcm-timeline", version, about = "Render HCM project timelines")]
struct Cli {
    /// Timeline config JSON (padding, row height, colors)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive terminal preview
    View {
        /// Dataset JSON, or an array of API rows
        dataset: PathBuf,
        /// Overrides the config's initial granularity
        #[arg(short, long)]
        granularity: Option<Granularity>,
        /// Show only these project ids (repeatable)
        #[arg(short, long)]
        project: Vec<i64>,
    },
    /// Render one frame to an SVG file
    ExportSvg {
        dataset: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value_t = 1200.0)]
        width: f64,
        #[arg(short, long)]
        granularity: Option<Granularity>,
        #[arg(short, long)]
        project: Vec<i64>,
        /// Pin the today marker, YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        today: Option<NaiveDate>,
    },
    /// Print the axis periods for a date range as JSON
    Periods {
        #[arg(value_parser = parse_date)]
        min_date: NaiveDate,
        #[arg(value_parser = parse_date)]
        max_date: NaiveDate,
        #[arg(short, long, default_value = "weekly")]
        granularity: Granularity,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    iso_date::parse(s).map_err(|e| e.to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("HCM_TIMELINE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "hcm_timeline=debug,info"
        } else {
            "hcm_timeline=info,warn"
        })
    });

    let format = env::var("HCM_TIMELINE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

fn load_dataset(path: &Path) -> Result<TimelineDataset> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let dataset = load_dataset_json(&json)
        .with_context(|| format!("failed to load timeline from {}", path.display()))?;
    info!(
        path = %path.display(),
        projects = dataset.projects.len(),
        "loaded dataset"
    );
    Ok(dataset)
}

fn load_config(path: Option<&Path>) -> Result<TimelineConfig> {
    let Some(path) = path else {
        return Ok(TimelineConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    TimelineConfig::from_json(&json)
        .with_context(|| format!("invalid config in {}", path.display()))
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::View {
            dataset,
            granularity,
            project,
        } => {
            let dataset = load_dataset(&dataset)?;
            let (columns, _) = crossterm::terminal::size().context("not a terminal")?;
            let mut app = app::App::new(dataset, config, columns)?;
            if let Some(granularity) = granularity {
                app.view.set_granularity(granularity);
            }
            if !project.is_empty() {
                app.view.filter_by_projects(project);
            }
            app::run(app)
        }
        Command::ExportSvg {
            dataset,
            output,
            width,
            granularity,
            project,
            today,
        } => {
            let dataset = load_dataset(&dataset)?;
            let mut view = TimelineView::new(
                RecordingSurface::new(width),
                dataset,
                config,
                Callbacks::default(),
            )?;
            if let Some(today) = today {
                view.set_today_provider(move || today);
            }
            if let Some(granularity) = granularity {
                view.set_granularity(granularity);
            }
            if !project.is_empty() {
                view.filter_by_projects(project);
            }
            let (commands, _) = view.build_frame();
            let svg = render_svg(&commands, &view.viewport());
            fs::write(&output, svg)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!(output = %output.display(), commands = commands.len(), "exported svg");
            Ok(())
        }
        Command::Periods {
            min_date,
            max_date,
            granularity,
        } => {
            let range = DateRange::new(min_date, max_date)?;
            let periods = time_periods(&range, granularity);
            let mut out = io::stdout().lock();
            serde_json::to_writer_pretty(&mut out, &periods)?;
            writeln!(out)?;
            Ok(())
        }
    }
}
