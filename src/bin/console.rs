use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::net::SocketAddr;
use std::path::PathBuf;

use sentinel_rs::config::SentinelConfig;
use sentinel_rs::dashboard::{self, AppState};
use sentinel_rs::{LatestTelemetry, StopFlag, TelemetryReceiver};

#[derive(Parser, Debug)]
#[command(name = "console")]
#[command(about = "Telemetry receiver and report routing API", long_about = None)]
struct Args {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Telemetry listen address (overrides config)
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// HTTP API address
    #[arg(long, default_value = "127.0.0.1:8081")]
    http: SocketAddr,

    /// Supplementary contacts file (.json or .json.gz)
    #[arg(long)]
    contacts: Option<PathBuf>,

    /// Places table for the offline geocoder (.json or .json.gz)
    #[arg(long)]
    places: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = SentinelConfig::load_or_default(args.config.as_deref())
        .context("loading configuration")?;
    if let Some(listen) = args.listen {
        config.telemetry.addr = listen;
    }
    if args.contacts.is_some() {
        config.routing.contacts_file = args.contacts.clone();
    }
    if args.places.is_some() {
        config.routing.places_file = args.places.clone();
    }

    let engine = config.routing.build_engine();
    info!(
        "Contact directory {} with {} authorities",
        engine.directory().version(),
        engine.directory().len()
    );

    let stop = StopFlag::new();
    let ctrl_c_stop = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_stop.stop();
        }
    });

    let latest = LatestTelemetry::new();

    let receive_latest = latest.clone();
    let receive_stop = stop.clone();
    let listen_addr = config.telemetry.addr;
    let idle_wait = config.telemetry.idle_wait();
    let receive_task = tokio::spawn(async move {
        let receiver = TelemetryReceiver::bind_with_retry(listen_addr, &receive_stop).await;
        match receiver {
            Some(receiver) => receiver.run(receive_latest, receive_stop, idle_wait).await,
            None => warn!("Telemetry receiver never started"),
        }
    });

    let state = AppState {
        latest,
        engine,
        stale_after: config.telemetry.stale_after(),
    };
    let served = dashboard::serve(state, args.http, stop.clone()).await;

    // API gone (stopped or failed to bind): bring the receiver down too
    stop.stop();
    if let Err(e) = receive_task.await {
        warn!("Receive task ended abnormally: {}", e);
    }
    served.context("serving API")?;
    Ok(())
}
