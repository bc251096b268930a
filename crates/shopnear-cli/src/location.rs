//! `location` command handlers: inspect and manage the cached position.

use clap::Subcommand;
use shopnear_core::{AppConfig, Position};

use crate::host::build_provider;

/// Sub-commands available under `location`.
#[derive(Debug, Subcommand)]
pub enum LocationCommands {
    /// Show the cached location and whether it is still fresh
    Show,
    /// Store a position as if it had just been acquired
    Set {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
    /// Remove the cached location
    Clear,
}

pub(crate) fn run_location_show(config: &AppConfig) -> anyhow::Result<()> {
    let provider = build_provider(config, None);
    let Some(cached) = provider.cache().read()? else {
        println!("No cached location.");
        return Ok(());
    };

    let fresh = provider.load_cached_location().is_some();
    println!("Position:    {}", cached.position);
    println!("Captured at: {}", cached.captured_at.to_rfc3339());
    println!("Fresh:       {}", if fresh { "yes" } else { "no (expired)" });
    Ok(())
}

pub(crate) fn run_location_set(config: &AppConfig, lat: f64, lng: f64) -> anyhow::Result<()> {
    let position = Position::new(lat, lng)?;
    build_provider(config, None).override_location(position)?;
    tracing::info!(%position, path = %config.storage_path.display(), "location stored");
    println!("Location set to {position}.");
    Ok(())
}

pub(crate) fn run_location_clear(config: &AppConfig) -> anyhow::Result<()> {
    build_provider(config, None).clear_cached_location()?;
    println!("Cached location cleared.");
    Ok(())
}
