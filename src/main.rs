use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use log::info;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use sentinel_rs::config::SentinelConfig;
use sentinel_rs::sampling::{ReplaySource, SampleSource, SamplingLoop, SimulatedSource};
use sentinel_rs::{BrakeEventDetector, StopFlag, TelemetrySender};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    /// Synthetic drive with periodic harsh braking
    Sim,
    /// Recorded JSON-lines session
    Replay,
}

#[derive(Parser, Debug)]
#[command(name = "sentinel")]
#[command(about = "Harsh braking detector and telemetry publisher", long_about = None)]
struct Args {
    /// Duration in seconds (0 = continuous)
    #[arg(value_name = "SECONDS", default_value = "0")]
    duration: u64,

    /// Motion vector source
    #[arg(long, value_enum, default_value = "sim")]
    source: SourceKind,

    /// Session file for --source replay (.jsonl or .jsonl.gz)
    #[arg(long)]
    replay: Option<PathBuf>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Telemetry destination (overrides config)
    #[arg(long)]
    target: Option<SocketAddr>,

    /// Live status JSON written every few seconds
    #[arg(long)]
    status_file: Option<PathBuf>,

    /// Simulated drive origin latitude
    #[arg(long, default_value = "18.5204", allow_hyphen_values = true)]
    origin_lat: f64,

    /// Simulated drive origin longitude
    #[arg(long, default_value = "73.8567", allow_hyphen_values = true)]
    origin_lon: f64,
}

async fn run<S: SampleSource>(
    source: S,
    config: &SentinelConfig,
    args: &Args,
    stop: StopFlag,
) -> Result<()> {
    let mut sampler = SamplingLoop::new(
        source,
        BrakeEventDetector::new(config.detector),
        TelemetrySender::new(config.telemetry.addr),
        &config.telemetry,
    );
    if let Some(path) = &args.status_file {
        sampler = sampler.with_status_file(path.clone());
    }

    let duration = (args.duration > 0).then(|| Duration::from_secs(args.duration));
    let status = sampler.run(stop, duration).await;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = SentinelConfig::load_or_default(args.config.as_deref())
        .context("loading configuration")?;
    if let Some(target) = args.target {
        config.telemetry.addr = target;
    }

    info!("[{}] Sentinel starting", ts_now());
    info!("  Duration: {} seconds (0=continuous)", args.duration);
    info!("  Source: {:?}", args.source);
    info!("  Telemetry: {}", config.telemetry.addr);
    info!(
        "  Threshold: {:.2} m/s², cooldown {:.1}s",
        config.detector.dynamic_threshold, config.detector.cooldown_secs
    );

    let stop = StopFlag::new();
    let ctrl_c_stop = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_stop.stop();
        }
    });

    match args.source {
        SourceKind::Sim => {
            let source = SimulatedSource::new(
                args.origin_lat,
                args.origin_lon,
                config.telemetry.sample_interval_secs,
            );
            run(source, &config, &args, stop).await?;
        }
        SourceKind::Replay => {
            let Some(path) = &args.replay else {
                bail!("--source replay needs --replay FILE");
            };
            let source = ReplaySource::open(path)?;
            run(source, &config, &args, stop).await?;
        }
    }

    info!("[{}] Sentinel stopped", ts_now());
    Ok(())
}

fn ts_now() -> String {
    Utc::now().format("%H:%M:%S").to_string()
}
