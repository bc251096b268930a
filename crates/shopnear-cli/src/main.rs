mod host;
mod location;
mod nearby;
mod page;

use clap::{Parser, Subcommand};
use shopnear_core::{Position, ResultKind};
use tracing_subscriber::EnvFilter;

use crate::location::LocationCommands;

#[derive(Debug, Parser)]
#[command(name = "shopnear-cli")]
#[command(about = "Discover shops and products near you")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List nearby shops or products and show them on the map
    Nearby {
        /// What to search for (shops or products)
        #[arg(long, default_value = "shops")]
        kind: ResultKind,
        /// Search radius in km (clamped to 1-50)
        #[arg(long)]
        radius_km: Option<f64>,
        /// Device latitude; overrides the configured device position
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Device longitude; overrides the configured device position
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
        /// Retry acquisition once if the location could not be determined
        #[arg(long)]
        retry_location: bool,
    },
    /// Keep the nearby view open and re-query as radius values arrive on stdin
    Watch {
        #[arg(long, default_value = "shops")]
        kind: ResultKind,
        #[arg(long)]
        radius_km: Option<f64>,
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
    },
    /// Manage the cached location
    Location {
        #[command(subcommand)]
        command: LocationCommands,
    },
}

fn device_position(lat: Option<f64>, lng: Option<f64>) -> anyhow::Result<Option<Position>> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Ok(Some(Position::new(lat, lng)?)),
        _ => Ok(None),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = shopnear_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, api_url = %config.api_url, "configuration loaded");

    match cli.command {
        Commands::Nearby {
            kind,
            radius_km,
            lat,
            lng,
            retry_location,
        } => {
            let position = device_position(lat, lng)?;
            nearby::run_nearby(&config, kind, radius_km, position, retry_location).await?;
        }
        Commands::Watch {
            kind,
            radius_km,
            lat,
            lng,
        } => {
            let position = device_position(lat, lng)?;
            nearby::run_watch(&config, kind, radius_km, position).await?;
        }
        Commands::Location { command } => match command {
            LocationCommands::Show => location::run_location_show(&config)?,
            LocationCommands::Set { lat, lng } => location::run_location_set(&config, lat, lng)?,
            LocationCommands::Clear => location::run_location_clear(&config)?,
        },
    }

    Ok(())
}
