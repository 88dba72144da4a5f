//! geofence: keep the customers that live within range of a reference point.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use geofence_geo::{
    haversine_distance, load_registry, save_registry, vincenty_distance_with_iterations, Coordinate,
};
use geofence_telemetry::timed;
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod output;

use config::{Config, ConfigSchema};
use output::{format_count, format_distance, Status};

/// Filter customer records by ellipsoidal distance
#[derive(Parser)]
#[command(name = "geofence")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Method {
    /// Ellipsoidal (WGS-84), iterative
    Vincenty,
    /// Spherical approximation
    Haversine,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep only records within a radius of the reference point
    Filter {
        /// Input file, one JSON record per line
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reference latitude in degrees
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Reference longitude in degrees
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Radius in kilometers (inclusive)
        #[arg(short, long, allow_negative_numbers = true)]
        radius: Option<f64>,
    },

    /// Print the distance between two points
    Distance {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lon1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        lon2: f64,

        /// Distance formula
        #[arg(short, long, value_enum, default_value_t = Method::Vincenty)]
        method: Method,

        /// Iteration budget for Vincenty
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        max_iterations: Option<i32>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Status::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let mut logging = config.schema.logging.clone();
    if cli.verbose {
        logging = logging.verbose();
    }
    geofence_telemetry::init_with_config(logging)?;

    match cli.command {
        Commands::Filter {
            input,
            output,
            lat,
            lon,
            radius,
        } => {
            let reference = match (lat, lon) {
                (Some(lat), Some(lon)) => Coordinate::new("Reference", lat, lon)?,
                _ => config
                    .schema
                    .reference
                    .to_coordinate()
                    .context("Invalid reference point in configuration")?,
            };
            let request = FilterRequest {
                input: input.unwrap_or_else(|| config.schema.paths.input.clone()),
                output: output.unwrap_or_else(|| config.schema.paths.output.clone()),
                radius_km: radius.unwrap_or(config.schema.filter.radius_km),
                reference,
            };
            run_filter(&request, cli.format)
        }

        Commands::Distance {
            lat1,
            lon1,
            lat2,
            lon2,
            method,
            max_iterations,
        } => {
            let from = Coordinate::new("From", lat1, lon1)?;
            let to = Coordinate::new("To", lat2, lon2)?;
            run_distance(&config.schema, &from, &to, method, max_iterations, cli.format)
        }
    }
}

struct FilterRequest {
    input: PathBuf,
    output: PathBuf,
    radius_km: f64,
    reference: Coordinate,
}

fn run_filter(request: &FilterRequest, format: OutputFormat) -> anyhow::Result<()> {
    let mut registry = timed("load", || load_registry(&request.input)).map_err(|e| {
        let input = request.input.display();
        if e.is_ingestion_failure() {
            anyhow::Error::new(e).context(format!("Rejected input file {}", input))
        } else {
            anyhow::Error::new(e).context(format!("Failed to load records from {}", input))
        }
    })?;
    let total = registry.len();

    let removed = timed("filter", || {
        registry.filter_by_radius(&request.reference, request.radius_km)
    });

    save_registry(&registry, &request.output)
        .with_context(|| format!("Failed to write results to {}", request.output.display()))?;

    match format {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "reference": request.reference,
                "radius_km": request.radius_km,
                "input": request.input,
                "output": request.output,
                "total": total,
                "kept": registry.len(),
                "removed": removed,
                "user_ids": registry.ids().collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            Status::header(&format!(
                "Within {} of {}",
                format_distance(request.radius_km),
                request.reference.name()
            ));
            Status::info(&format!(
                "Read {} from {}",
                format_count(total, "record", "records"),
                request.input.display()
            ));
            Status::success(&format!(
                "Kept {}, dropped {} -> {}",
                format_count(registry.len(), "record", "records"),
                removed,
                request.output.display()
            ));
        }
    }

    Ok(())
}

fn run_distance(
    schema: &ConfigSchema,
    from: &Coordinate,
    to: &Coordinate,
    method: Method,
    max_iterations: Option<i32>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let distance_km = match method {
        Method::Vincenty => {
            let steps = max_iterations.unwrap_or(schema.distance.max_iterations);
            vincenty_distance_with_iterations(from, to, steps)?
        }
        Method::Haversine => haversine_distance(from, to),
    };

    match format {
        OutputFormat::Json => {
            let result = serde_json::json!({
                "method": method_name(method),
                "from": from,
                "to": to,
                "distance_km": distance_km,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Text => {
            println!("{:.6} km ({})", distance_km, method_name(method));
        }
    }

    Ok(())
}

fn method_name(method: Method) -> &'static str {
    match method {
        Method::Vincenty => "vincenty",
        Method::Haversine => "haversine",
    }
}
