//! CLI entry point for the bike-share flow tool.
//!
//! Loads a month of trip records and renders the average-day station stock
//! animation and a single-station hourly profile chart.

use anyhow::{Context, Result};
use bikeflow::catalog::StationCatalog;
use bikeflow::config::{
    DEFAULT_BASEMAP_PATH, DEFAULT_FLOW_OUTPUT, DEFAULT_PROFILE_STATION, DEFAULT_TRIPS_PATH,
    Settings,
};
use bikeflow::inventory::simulate;
use bikeflow::loader::{Trip, load_trips};
use bikeflow::output::{print_json, print_pretty, save_catalog, save_stock_table};
use bikeflow::profile::StationProfile;
use bikeflow::render::chart::save_profile;
use bikeflow::render::{Basemap, FlowAnimator, MercatorViewport};
use bikeflow::threshold::ThresholdMask;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bikeflow")]
#[command(about = "Average-day bike inventory maps and station profiles from trip records", long_about = None)]
struct Cli {
    /// Trip-record CSV to load
    #[arg(short, long, global = true, default_value = DEFAULT_TRIPS_PATH)]
    trips: String,

    /// Optional JSON settings file overriding the model and render defaults
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the station catalog and optionally export it as CSV
    Stations {
        /// CSV file to write the catalog to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Render the animated city map of station stock
    Flow {
        /// Road-network shapefile used as the basemap
        #[arg(short, long, default_value = DEFAULT_BASEMAP_PATH)]
        basemap: String,

        /// Animated GIF to write
        #[arg(short, long, default_value = DEFAULT_FLOW_OUTPUT)]
        output: String,

        /// Optional CSV export of the stock table
        #[arg(long)]
        stock_csv: Option<String>,
    },
    /// Render the hourly borrow/return/stock chart for one station
    Profile {
        /// Station name to profile
        #[arg(short, long, default_value = DEFAULT_PROFILE_STATION)]
        station: String,

        /// PNG to write (defaults to the station name)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Run the map animation and the station profile with default outputs
    All {
        /// Road-network shapefile used as the basemap
        #[arg(short, long, default_value = DEFAULT_BASEMAP_PATH)]
        basemap: String,

        /// Station name to profile
        #[arg(short, long, default_value = DEFAULT_PROFILE_STATION)]
        station: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bikeflow.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bikeflow.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load_or_default(cli.config.as_deref())
        .with_context(|| format!("loading settings from {:?}", cli.config))?;

    let trips = load_trips(&cli.trips).with_context(|| format!("loading trips from {}", cli.trips))?;
    let catalog = StationCatalog::from_trips(&trips, &settings.excluded_station_name);

    match cli.command.unwrap_or(Commands::All {
        basemap: DEFAULT_BASEMAP_PATH.to_string(),
        station: DEFAULT_PROFILE_STATION.to_string(),
    }) {
        Commands::Stations { output } => {
            info!(stations = catalog.len(), "Catalog ready");
            if let Some(path) = output {
                save_catalog(&path, &catalog)?;
            }
        }
        Commands::Flow {
            basemap,
            output,
            stock_csv,
        } => {
            run_flow(&trips, &catalog, &settings, &basemap, &output, stock_csv.as_deref())?;
        }
        Commands::Profile { station, output } => {
            run_profile(&trips, &catalog, &settings, &station, output)?;
        }
        Commands::All { basemap, station } => {
            run_flow(&trips, &catalog, &settings, &basemap, DEFAULT_FLOW_OUTPUT, None)?;
            run_profile(&trips, &catalog, &settings, &station, None)?;
        }
    }

    Ok(())
}

/// Simulates station stock, masks healthy stations and writes the animation.
#[tracing::instrument(skip(trips, catalog, settings))]
fn run_flow(
    trips: &[Trip],
    catalog: &StationCatalog,
    settings: &Settings,
    basemap_path: &str,
    output: &str,
    stock_csv: Option<&str>,
) -> Result<()> {
    let table = simulate(trips, catalog, settings);
    if let Some(path) = stock_csv {
        save_stock_table(path, &table)?;
    }

    let mask = ThresholdMask::from_table(&table, settings.threshold_low, settings.threshold_high);
    info!(flagged = mask.flagged(), "Threshold mask computed");

    let viewport = MercatorViewport::new(settings.map_bounds, settings.map_lat_ts, settings.map_width_px)?;
    let basemap = Basemap::load(basemap_path)
        .with_context(|| format!("loading basemap {basemap_path}"))?
        .render(&viewport);

    let animator = FlowAnimator::new(&basemap, &viewport, catalog, &table, settings);
    animator.save(&table, &mask, settings.frame_interval_ms, output)?;
    Ok(())
}

/// Profiles one station by name and writes its chart.
#[tracing::instrument(skip(trips, catalog, settings))]
fn run_profile(
    trips: &[Trip],
    catalog: &StationCatalog,
    settings: &Settings,
    station_name: &str,
    output: Option<String>,
) -> Result<()> {
    let station = catalog.find_by_name(station_name)?;
    let profile = StationProfile::compute(trips, station, settings);
    print_pretty(&profile);
    print_json(&profile)?;

    let path = output.unwrap_or_else(|| profile.default_file_name());
    save_profile(&profile, settings, &path)?;
    Ok(())
}
