/// Offline arability runner: scores a boundary against a scene catalog on
/// disk and prints the result as JSON.
///
/// RUST_LOG=info shows the observation summary.

use anyhow::{Context, Result};
use arability_core::{
    compute_arability, compute_arability_report, ArabilityConfig, BoundaryGeometry, InMemoryProvider,
    TimeWindow,
};
use clap::Parser;
use std::fs;

#[derive(Parser, Debug)]
#[command(name = "arability", about = "Land-use percentages for a boundary over a date range")]
struct Args {
    /// Scene catalog JSON (`{"frames": [...]}`).
    #[arg(short, long)]
    scenes: String,

    /// Boundary as a GeoJSON Polygon or MultiPolygon geometry.
    #[arg(short, long)]
    boundary: String,

    /// First acquisition date, inclusive (YYYY-MM-DD).
    #[arg(long)]
    start: String,

    /// Last acquisition date, inclusive (YYYY-MM-DD).
    #[arg(long)]
    end: String,

    /// TOML config with sentinel, area unit and tracked classes.
    #[arg(short, long)]
    config: Option<String>,

    /// Print the full report (observation summary, areas) instead of
    /// percentages only.
    #[arg(long)]
    report: bool,

    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let window = TimeWindow::parse(&args.start, &args.end).context("invalid date range")?;

    let boundary_json = fs::read_to_string(&args.boundary)
        .with_context(|| format!("reading boundary {}", args.boundary))?;
    let boundary = BoundaryGeometry::from_geojson_str(&boundary_json)
        .with_context(|| format!("parsing boundary {}", args.boundary))?;

    let config = match &args.config {
        Some(path) => ArabilityConfig::from_file(path).with_context(|| format!("loading config {path}"))?,
        None => ArabilityConfig::default(),
    };

    let provider = InMemoryProvider::from_file(&args.scenes)
        .with_context(|| format!("loading scene catalog {}", args.scenes))?;
    log::debug!("{} frame(s) in catalog {}", provider.len(), args.scenes);

    let out = if args.report {
        let report = compute_arability_report(&provider, &window, &boundary, &config)?;
        log::info!(
            "classified area {:.2} {}",
            report.area_unit.convert_m2(report.total_area_m2),
            report.area_unit.symbol()
        );
        to_json(&report, args.pretty)?
    } else {
        let result = compute_arability(&provider, &window, &boundary, &config.classes, config.sentinel)?;
        to_json(&result, args.pretty)?
    };
    println!("{out}");
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let s = if pretty { serde_json::to_string_pretty(value)? } else { serde_json::to_string(value)? };
    Ok(s)
}
