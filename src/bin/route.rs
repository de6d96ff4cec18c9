use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use sentinel_rs::config::SentinelConfig;

#[derive(Parser, Debug)]
#[command(name = "route")]
#[command(about = "Resolve report recipients for a position and plate", long_about = None)]
struct Args {
    /// Event latitude
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Event longitude
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// Vehicle registration plate, e.g. MH12AB1234
    #[arg(long)]
    plate: String,

    /// Supplementary contacts file (.json or .json.gz)
    #[arg(long)]
    contacts: Option<PathBuf>,

    /// Places table for the offline geocoder (.json or .json.gz)
    #[arg(long)]
    places: Option<PathBuf>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print JSON instead of audit lines
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut config = SentinelConfig::load_or_default(args.config.as_deref())
        .context("loading configuration")?;
    if args.contacts.is_some() {
        config.routing.contacts_file = args.contacts.clone();
    }
    if args.places.is_some() {
        config.routing.places_file = args.places.clone();
    }

    let engine = config.routing.build_engine();
    let result = engine.resolve(args.lat, args.lon, &args.plate);

    if args.json {
        let mut value = serde_json::to_value(&result)?;
        value["warning"] = serde_json::json!(result.warning());
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Routing (directory {}):", engine.directory().version());
        println!("{}", result);
    }

    if let Some(warning) = result.warning() {
        eprintln!("WARNING: {}", warning);
    }
    Ok(())
}
